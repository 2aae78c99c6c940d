//! One sampling cycle: read the shims, classify, drive the indicator.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierState, ProximityClassifier};
use crate::error::ControllerError;
use crate::shim::{Clock, Indicator, OffsetDial, RangeSensor};
use crate::thresholds::{ClassifierConfig, Thresholds};
use crate::units::{Distance, Timestamp};
use crate::zone::{IndicatorCommand, Zone};

/// Report of a single sampling cycle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    /// When the cycle started.
    pub at: Timestamp,
    /// Raw distance from the sensor.
    pub distance: Distance,
    /// Offset read from the dial, after clamping to `[0, max_offset]`.
    pub offset: Distance,
    /// Thresholds used for this cycle.
    pub thresholds: Thresholds,
    /// Zone the distance fell in.
    pub zone: Zone,
    /// Command written to the indicator, if any.
    pub command: Option<IndicatorCommand>,
    /// `true` if this cycle fired the parked timeout.
    pub timed_out: bool,
}

/// Owns the shims and the classifier state and runs sampling cycles.
pub struct Controller<S, D, I, C> {
    sensor: S,
    dial: D,
    indicator: I,
    clock: C,
    config: ClassifierConfig,
    classifier: ProximityClassifier,
    state: ClassifierState,
}

impl<S, D, I, C> Controller<S, D, I, C>
where
    S: RangeSensor,
    D: OffsetDial,
    I: Indicator,
    C: Clock,
{
    /// Construct a controller in the startup state.
    pub fn new(sensor: S, dial: D, indicator: I, clock: C, config: ClassifierConfig) -> Self {
        Self {
            sensor,
            dial,
            indicator,
            clock,
            classifier: ProximityClassifier::from(&config),
            config,
            state: ClassifierState::new(),
        }
    }

    /// Returns the classifier state.
    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    /// Returns the classifier configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Returns the indicator shim.
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Run one sampling cycle.
    ///
    /// # Errors
    ///
    /// Returns `Err(ControllerError::Sensor)` or `Err(ControllerError::Dial)` if
    /// a reading fails; the classifier state is left untouched in that case.
    /// Returns `Err(ControllerError::Indicator)` if the command could not be
    /// written. The state is not advanced either, so the next cycle issues the
    /// command again.
    pub fn step(&mut self) -> Result<Cycle, ControllerError<S::Error, D::Error, I::Error>> {
        let at = self.clock.now();
        let distance = self.sensor.measure().map_err(ControllerError::Sensor)?;
        let raw_offset = self.dial.read().map_err(ControllerError::Dial)?;
        let (offset, thresholds) = self.config.apply_offset(raw_offset);

        let mut next = self.state;
        let result = self
            .classifier
            .classify(&mut next, distance, at, &thresholds);

        if let Some(IndicatorCommand::SetColor(color)) = result.command {
            self.indicator
                .set(color)
                .map_err(ControllerError::Indicator)?;
        }
        self.state = next;

        Ok(Cycle {
            at,
            distance,
            offset,
            thresholds,
            zone: result.zone,
            command: result.command,
            timed_out: result.timed_out,
        })
    }
}
