use core::time::Duration;

use parkassist_core::*;

fn main() {
    let config_result = ClassifierConfig::new(
        Distance::from_cm(200.0),
        Distance::from_cm(65.0),
        Distance::from_cm(100.0),
        Duration::from_millis(30_000),
    );

    // (distance cm, time ms)
    let samples = [
        (250.0, 0),
        (100.0, 100),
        (50.0, 5_000),
        (50.0, 20_000),
        (50.0, 40_000),
        (50.0, 50_000),
        (250.0, 51_000),
        (40.0, 52_000),
    ];

    match config_result {
        Ok(config) => {
            let classifier = ProximityClassifier::from(&config);
            let mut state = ClassifierState::new();
            let thresholds = config.thresholds(Distance::ZERO);

            println!("Replaying approach...");
            println!("  Thresholds:     {}", thresholds);
            println!("  Parked timeout: {:?}", config.parked_led_ontime());

            for (cm, ms) in samples {
                let at = Timestamp::from_millis(ms);
                let result = classifier.classify(&mut state, Distance::from_cm(cm), at, &thresholds);
                match result.command {
                    Some(IndicatorCommand::SetColor(color)) => {
                        println!("{:>10}: {:>8} -> {:<6} set {}", at, Distance::from_cm(cm), result.zone, color)
                    }
                    None => println!("{:>10}: {:>8} -> {:<6} (no change)", at, Distance::from_cm(cm), result.zone),
                }
            }

            println!("Final state: {:?}", state);
        }
        Err(e) => {
            eprintln!("Invalid classifier configuration: {}", e);
        }
    }
}
