//! The proximity classifier state machine.
//!
//! Each sample is classified into a [`Zone`] by [`Thresholds::zone_for`], then
//! [`ClassifierState::decide`] works out the next state and the indicator
//! command, if any. Executing the command is left to the caller.

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::thresholds::{ClassifierConfig, Thresholds};
use crate::units::{Distance, Timestamp};
use crate::zone::{Color, IndicatorCommand, Zone};

/// Tracks how long the vehicle has been in the close zone.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParkedTimer {
    started_at: Option<Timestamp>,
    timed_out: bool,
}

impl ParkedTimer {
    /// A timer started at `at` that has not yet timed out.
    pub const fn started(at: Timestamp) -> Self {
        ParkedTimer {
            started_at: Some(at),
            timed_out: false,
        }
    }

    /// When the vehicle last entered the close zone, if ever.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Whether the indicator has already been switched off for this stay.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Mark the timer expired if more than `ontime` has passed since it
    /// started. Returns `true` only on the call that expires it.
    fn expire(&mut self, at: Timestamp, ontime: Duration) -> bool {
        match self.started_at {
            Some(start) if !self.timed_out && at.elapsed_since(start) > ontime => {
                self.timed_out = true;
                true
            }
            _ => false,
        }
    }
}

/// The complete mutable state of the classifier.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierState {
    current_zone: Zone,
    parked_timer: ParkedTimer,
}

impl ClassifierState {
    /// Startup state: zone unknown, timer unset.
    pub const fn new() -> Self {
        ClassifierState {
            current_zone: Zone::Unknown,
            parked_timer: ParkedTimer {
                started_at: None,
                timed_out: false,
            },
        }
    }

    /// Returns the zone of the last classified sample.
    pub fn current_zone(&self) -> Zone {
        self.current_zone
    }

    /// Returns the parked timer.
    pub fn parked_timer(&self) -> ParkedTimer {
        self.parked_timer
    }

    /// Decide the next state and indicator command for a freshly classified zone.
    ///
    /// This does not modify `self`. A transition into `Close` restarts the
    /// parked timer, so it can never fire the timeout in the same call.
    /// `Zone::Unknown` as input leaves the state unchanged.
    ///
    /// # Arguments
    ///
    /// * `zone`: Zone of the current sample.
    /// * `at`: Time the sample was taken.
    /// * `parked_led_ontime`: How long the close color stays lit.
    ///
    /// # Returns
    ///
    /// The next state, the command to execute, and whether this call fired the
    /// parked timeout.
    pub fn decide(
        &self,
        zone: Zone,
        at: Timestamp,
        parked_led_ontime: Duration,
    ) -> (ClassifierState, Option<IndicatorCommand>, bool) {
        let mut next = *self;
        let mut command = None;

        if zone != self.current_zone {
            let Some(color) = zone.color() else {
                return (next, None, false);
            };
            if zone == Zone::Close {
                next.parked_timer = ParkedTimer::started(at);
            }
            command = Some(IndicatorCommand::SetColor(color));
            next.current_zone = zone;
        }

        let mut fired = false;
        if next.current_zone == Zone::Close && next.parked_timer.expire(at, parked_led_ontime) {
            command = Some(IndicatorCommand::SetColor(Color::Off));
            fired = true;
        }

        (next, command, fired)
    }
}

/// Outcome of classifying one sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyResult {
    /// Zone of the sample.
    pub zone: Zone,
    /// Indicator command to execute, `None` if the indicator is already correct.
    pub command: Option<IndicatorCommand>,
    /// `true` if this sample fired the parked timeout.
    pub timed_out: bool,
}

/// Converts distance samples into indicator commands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityClassifier {
    parked_led_ontime: Duration,
}

impl ProximityClassifier {
    /// Construct a classifier with the given parked timeout.
    pub const fn new(parked_led_ontime: Duration) -> Self {
        ProximityClassifier { parked_led_ontime }
    }

    /// Returns the parked timeout.
    pub fn parked_led_ontime(&self) -> Duration {
        self.parked_led_ontime
    }

    /// Classify one sample and advance `state`.
    ///
    /// At most one command is produced per call, and never one that repeats the
    /// color already commanded.
    ///
    /// # Arguments
    ///
    /// * `state`: Classifier state owned by the sampling loop.
    /// * `sample`: Measured distance, taken as-is.
    /// * `at`: Sample time, non-decreasing between calls.
    /// * `thresholds`: Offset-adjusted thresholds for this cycle.
    pub fn classify(
        &self,
        state: &mut ClassifierState,
        sample: Distance,
        at: Timestamp,
        thresholds: &Thresholds,
    ) -> ClassifyResult {
        let zone = thresholds.zone_for(sample);
        let (next, command, timed_out) = state.decide(zone, at, self.parked_led_ontime);
        *state = next;
        ClassifyResult {
            zone,
            command,
            timed_out,
        }
    }
}

impl From<&ClassifierConfig> for ProximityClassifier {
    fn from(config: &ClassifierConfig) -> Self {
        ProximityClassifier::new(config.parked_led_ontime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ONTIME: Duration = Duration::from_millis(30_000);

    fn thresholds() -> Thresholds {
        Thresholds::new(Distance::from_cm(200.0), Distance::from_cm(65.0)).unwrap()
    }

    fn step(
        classifier: &ProximityClassifier,
        state: &mut ClassifierState,
        cm: f32,
        ms: u64,
    ) -> Option<Color> {
        classifier
            .classify(state, Distance::from_cm(cm), Timestamp::from_millis(ms), &thresholds())
            .command
            .map(IndicatorCommand::color)
    }

    #[test]
    fn test_initial_state() {
        let state = ClassifierState::new();
        assert_eq!(state, ClassifierState::default());
        assert_eq!(state.current_zone(), Zone::Unknown);
        assert_eq!(state.parked_timer().started_at(), None);
        assert!(!state.parked_timer().timed_out());
    }

    #[test]
    fn test_parking_scenario() {
        let classifier = ProximityClassifier::new(ONTIME);
        let mut state = ClassifierState::new();

        assert_eq!(step(&classifier, &mut state, 250.0, 0), Some(Color::Far));
        assert_eq!(state.current_zone(), Zone::Far);
        assert_eq!(step(&classifier, &mut state, 100.0, 100), Some(Color::Near));
        assert_eq!(step(&classifier, &mut state, 50.0, 5_000), Some(Color::Close));
        assert_eq!(
            state.parked_timer().started_at(),
            Some(Timestamp::from_millis(5_000))
        );
        // Elapsed 15000 ms, still lit.
        assert_eq!(step(&classifier, &mut state, 50.0, 20_000), None);
        // Elapsed 35000 ms, timed out.
        assert_eq!(step(&classifier, &mut state, 50.0, 40_000), Some(Color::Off));
        assert!(state.parked_timer().timed_out());
        assert_eq!(step(&classifier, &mut state, 50.0, 50_000), None);
        assert_eq!(step(&classifier, &mut state, 250.0, 51_000), Some(Color::Far));
        assert_eq!(step(&classifier, &mut state, 40.0, 52_000), Some(Color::Close));
        assert_eq!(
            state.parked_timer().started_at(),
            Some(Timestamp::from_millis(52_000))
        );
        assert!(!state.parked_timer().timed_out());
    }

    #[test]
    fn test_first_sample_always_emits() {
        let classifier = ProximityClassifier::new(ONTIME);
        for cm in [0.0, 30.0, 100.0, 500.0] {
            let mut state = ClassifierState::new();
            assert!(step(&classifier, &mut state, cm, 0).is_some());
        }
    }

    #[test]
    fn test_stable_input_is_idempotent() {
        let classifier = ProximityClassifier::new(ONTIME);
        let mut state = ClassifierState::new();
        assert_eq!(step(&classifier, &mut state, 120.0, 0), Some(Color::Near));
        for i in 1..50 {
            assert_eq!(step(&classifier, &mut state, 120.0, i * 1_000), None);
        }
    }

    #[test]
    fn test_timeout_fires_once_on_strict_excess() {
        let classifier = ProximityClassifier::new(ONTIME);
        let mut state = ClassifierState::new();
        assert_eq!(step(&classifier, &mut state, 10.0, 1_000), Some(Color::Close));
        // Exactly ontime elapsed is not enough.
        assert_eq!(step(&classifier, &mut state, 10.0, 31_000), None);
        let result = classifier.classify(
            &mut state,
            Distance::from_cm(10.0),
            Timestamp::from_millis(31_001),
            &thresholds(),
        );
        assert_eq!(result.command, Some(IndicatorCommand::SetColor(Color::Off)));
        assert!(result.timed_out);
        for ms in [31_002, 60_000, 1_000_000] {
            assert_eq!(step(&classifier, &mut state, 10.0, ms), None);
        }
    }

    #[test]
    fn test_no_timeout_outside_close() {
        let classifier = ProximityClassifier::new(ONTIME);
        let mut state = ClassifierState::new();
        step(&classifier, &mut state, 100.0, 0);
        assert_eq!(step(&classifier, &mut state, 100.0, 1_000_000), None);
    }

    #[test]
    fn test_reentry_restarts_window() {
        let classifier = ProximityClassifier::new(ONTIME);
        let mut state = ClassifierState::new();
        step(&classifier, &mut state, 50.0, 0);
        assert_eq!(step(&classifier, &mut state, 50.0, 31_000), Some(Color::Off));

        assert_eq!(step(&classifier, &mut state, 100.0, 32_000), Some(Color::Near));
        assert_eq!(step(&classifier, &mut state, 50.0, 33_000), Some(Color::Close));
        // The old window has long expired; the new one has not.
        assert_eq!(step(&classifier, &mut state, 50.0, 60_000), None);
        assert_eq!(step(&classifier, &mut state, 50.0, 63_001), Some(Color::Off));
    }

    #[test]
    fn test_staying_close_does_not_reset_timer() {
        let classifier = ProximityClassifier::new(ONTIME);
        let mut state = ClassifierState::new();
        step(&classifier, &mut state, 60.0, 0);
        step(&classifier, &mut state, 20.0, 10_000);
        step(&classifier, &mut state, 5.0, 20_000);
        assert_eq!(state.parked_timer().started_at(), Some(Timestamp::from_millis(0)));
        assert_eq!(step(&classifier, &mut state, 40.0, 30_001), Some(Color::Off));
    }

    #[test]
    fn test_decide_is_pure() {
        let state = ClassifierState::new();
        let (next, command, fired) = state.decide(Zone::Close, Timestamp::from_millis(7), ONTIME);
        assert_eq!(state, ClassifierState::new());
        assert_eq!(next.current_zone(), Zone::Close);
        assert_eq!(command, Some(IndicatorCommand::SetColor(Color::Close)));
        assert!(!fired);
    }

    #[test]
    fn test_decide_ignores_unknown() {
        let state = ClassifierState::new();
        let (next, command, _) = state.decide(Zone::Unknown, Timestamp::from_millis(0), ONTIME);
        assert_eq!(next, state);
        assert_eq!(command, None);
    }

    #[test]
    fn test_no_echo_sample_reads_far() {
        let classifier = ProximityClassifier::new(ONTIME);
        let mut state = ClassifierState::new();
        assert_eq!(step(&classifier, &mut state, 50.0, 0), Some(Color::Close));
        assert_eq!(step(&classifier, &mut state, 1.0e6, 100), Some(Color::Far));
    }

    proptest! {
        #[test]
        fn prop_never_repeats_last_color(
            samples in proptest::collection::vec((0.0f32..400.0, 0u64..20_000), 1..200)
        ) {
            let classifier = ProximityClassifier::new(ONTIME);
            let mut state = ClassifierState::new();
            let mut now = 0u64;
            let mut last: Option<Color> = None;
            for (cm, dt) in samples {
                now += dt;
                if let Some(color) = step(&classifier, &mut state, cm, now) {
                    prop_assert_ne!(Some(color), last);
                    last = Some(color);
                }
            }
        }

        #[test]
        fn prop_repeated_sample_emits_once(
            cm in 0.0f32..400.0,
            n in 2usize..100,
        ) {
            let classifier = ProximityClassifier::new(ONTIME);
            let mut state = ClassifierState::new();
            prop_assert!(step(&classifier, &mut state, cm, 0).is_some());
            for i in 1..n {
                // Stay inside the parked window.
                let ms = (i as u64 * 30_000) / n as u64;
                prop_assert_eq!(step(&classifier, &mut state, cm, ms), None);
            }
        }
    }
}
