mod blackboard; // brings `blackboard.rs` in as `crate::blackboard`
mod bus; // brings `bus.rs` in as `crate::bus`
mod config; // brings `config.rs` in as `crate::config`
mod graphics; // brings `graphics.rs` in as `crate::graphics`
mod sim; // brings `sim.rs` in as `crate::sim`

use anyhow::Context;
use blackboard::{Blackboard, clear_fault, raise_fault, record_cycle, snapshot};
use bus::Topic;
use graphics::window_conf;
use parkassist_core::{ClassifierConfig, Controller, Cycle, Distance};
use sim::{DialHandle, LoggedIndicator, MonotonicClock, SimulatedDial, SimulatedSensor, SimulatedVehicle};

use spin_sleep::SpinSleeper;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{self, EnvFilter};

const SENSOR_STALLED: &str = "sensor stalled";

/// Everything the render loop needs once startup has succeeded.
struct App {
    // Keeps the watchdog alive for as long as the window is open.
    _runtime: tokio::runtime::Runtime,
    cycle_rx: tokio::sync::broadcast::Receiver<Arc<Cycle>>,
    bb: Blackboard,
    dial: DialHandle,
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Parking assist (Macroquad Frontend) Started. Loading configuration and spawning sampler...");

    let app = match start() {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return;
        }
    };

    let App { _runtime, cycle_rx, bb, dial } = app;
    graphics::run_visualization_loop(cycle_rx, bb, dial).await;
}

fn start() -> anyhow::Result<App> {
    let settings = config::load_settings().context("loading configuration")?;
    let classifier_config = settings
        .classifier_config()
        .context("validating classifier configuration")?;
    info!(thresholds = %classifier_config.base_thresholds(), max_offset = %classifier_config.max_offset(), "Classifier configured");

    let bb: Blackboard = Arc::default();
    let cycle_topic: Topic<Cycle> = Topic::new(64);
    let cycle_rx = cycle_topic.subscribe();

    let dial = DialHandle::new(settings.dial.initial_raw, settings.dial.adc_resolution_bits);
    let clock = MonotonicClock::new();
    let controller = Controller::new(
        SimulatedSensor::new(
            SimulatedVehicle::new(&settings.simulation),
            clock.clone(),
            settings.simulation.no_echo_every,
        ),
        SimulatedDial::new(
            dial.clone(),
            settings.dial.adc_resolution_bits,
            classifier_config.max_offset(),
        ),
        LoggedIndicator::new(Arc::clone(&bb)),
        clock,
        classifier_config,
    );

    spawn_sampler(controller, Arc::clone(&bb), cycle_topic, settings.sample_interval())?;

    let runtime = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let watchdog_timeout = settings.watchdog_timeout();
    let bb_for_watchdog = Arc::clone(&bb);
    runtime.spawn(async move {
        if let Err(e) = watchdog(bb_for_watchdog, watchdog_timeout).await {
            error!("Watchdog failed: {:?}", e);
        }
    });

    Ok(App {
        _runtime: runtime,
        cycle_rx,
        bb,
        dial,
    })
}

type SimController = Controller<
    SimulatedSensor<MonotonicClock>,
    SimulatedDial,
    LoggedIndicator,
    MonotonicClock,
>;

fn spawn_sampler(
    mut controller: SimController,
    bb: Blackboard,
    cycle_topic: Topic<Cycle>,
    interval: Duration,
) -> anyhow::Result<()> {
    info!(?interval, "Spawning sampler thread...");
    std::thread::Builder::new()
        .name("sampler".into())
        .spawn(move || {
            info!("Sampler thread started.");
            let sleeper = SpinSleeper::new(10_000);
            let mut last_offset = Distance::ZERO;
            loop {
                match controller.step() {
                    Ok(cycle) => {
                        log_cycle(&cycle, &mut last_offset, controller.config());
                        record_cycle(&bb, &cycle);
                        cycle_topic.publish(cycle);
                    }
                    Err(e) => {
                        warn!(error = %e, "Sampling cycle failed, skipping.");
                    }
                }
                sleeper.sleep(interval);
            }
        })
        .context("spawning sampler thread")?;
    Ok(())
}

fn log_cycle(cycle: &Cycle, last_offset: &mut Distance, config: &ClassifierConfig) {
    if cycle.offset != *last_offset {
        info!(offset_cm = cycle.offset.as_cm(), max_offset_cm = config.max_offset().as_cm(), thresholds = %cycle.thresholds, "Offset dial moved");
        *last_offset = cycle.offset;
    }
    if cycle.timed_out {
        info!(elapsed = ?config.parked_led_ontime(), "Vehicle presumed parked, indicator dimmed");
    } else if cycle.command.is_some() {
        info!(distance_cm = cycle.distance.as_cm(), offset_cm = cycle.offset.as_cm(), zone = %cycle.zone, "Zone changed");
    } else {
        debug!(distance_cm = cycle.distance.as_cm(), zone = %cycle.zone, at = %cycle.at, "Sample");
    }
}

async fn watchdog(bb: Blackboard, timeout: Duration) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let mut tick = tokio::time::interval(Duration::from_millis(250));
    loop {
        tick.tick().await;
        let age = snapshot(&bb).last_sample_ts.elapsed();
        if age > timeout {
            if raise_fault(&bb, SENSOR_STALLED) {
                warn!(?age, "No distance sample within watchdog timeout!");
            }
        } else if clear_fault(&bb, SENSOR_STALLED) {
            info!(?age, "Sampler recovered.");
        }
    }
}
