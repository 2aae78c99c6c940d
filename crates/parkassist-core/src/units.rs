//! Distance and time units shared by the classifier and the hardware shims.

use core::fmt;
use core::ops::Add;
use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Speed of sound in centimeters per microsecond.
pub const SOUND_SPEED_CM_PER_US: f32 = 0.034;

/// A non-negative distance in centimeters.
///
/// Readings are taken as-is: a sensor that hears no echo may report zero or an
/// implausibly large value, and both are still ordinary distances here.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Distance(f32);

impl Distance {
    /// Zero centimeters.
    pub const ZERO: Distance = Distance(0.0);

    /// Construct a distance from centimeters.
    pub const fn from_cm(cm: f32) -> Self {
        Distance(cm)
    }

    /// Returns the distance in centimeters.
    pub const fn as_cm(self) -> f32 {
        self.0
    }

    /// Convert an ultrasonic echo pulse width into the distance to the target.
    ///
    /// The pulse covers the round trip, so the travelled distance is halved.
    ///
    /// # Arguments
    ///
    /// * `echo`: Time the echo pin was held high.
    pub fn from_echo(echo: Duration) -> Self {
        let duration_us = echo.as_micros() as f32;
        Distance(duration_us * SOUND_SPEED_CM_PER_US / 2.0)
    }

    /// Inverse of [`Distance::from_echo`]: the echo width a target at this
    /// distance would produce.
    pub fn to_echo(self) -> Duration {
        let duration_us = (self.0.max(0.0) * 2.0 / SOUND_SPEED_CM_PER_US) as u64;
        Duration::from_micros(duration_us)
    }

    /// Clamp the distance to `[min, max]`.
    pub fn clamp(self, min: Distance, max: Distance) -> Self {
        Distance(self.0.max(min.0).min(max.0))
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Distance) -> Distance {
        Distance(self.0 + rhs.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} cm", self.0)
    }
}

/// A monotonic timestamp with millisecond resolution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Construct a timestamp from milliseconds since an arbitrary epoch.
    pub const fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    /// Milliseconds since the clock's epoch.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed between `earlier` and `self`, saturating at zero.
    pub fn elapsed_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} ms", self.0)
    }
}
