//! Error types for the parking-assist library.
//!
//! Classification itself never fails. These errors cover configuration that is
//! validated once at startup and failures reported by the hardware shims.

use core::fmt;

/// Errors raised while validating classifier configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The warn distance is not a positive, finite number of centimeters.
    InvalidWarnDistance(&'static str),
    /// The stop distance is not a positive, finite number of centimeters.
    InvalidStopDistance(&'static str),
    /// The stop distance lies beyond the warn distance.
    InvertedThresholds(&'static str),
    /// The maximum dial offset is negative or not finite.
    InvalidMaxOffset(&'static str),
    /// The parked timeout is zero.
    InvalidParkedTimeout(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWarnDistance(msg) => write!(f, "Invalid warn distance: {}", msg),
            ConfigError::InvalidStopDistance(msg) => write!(f, "Invalid stop distance: {}", msg),
            ConfigError::InvertedThresholds(msg) => write!(f, "Inverted thresholds: {}", msg),
            ConfigError::InvalidMaxOffset(msg) => write!(f, "Invalid maximum offset: {}", msg),
            ConfigError::InvalidParkedTimeout(msg) => {
                write!(f, "Invalid parked timeout: {}", msg)
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Errors surfaced by [`Controller::step`](crate::Controller::step).
///
/// Each variant wraps the error type of the shim that failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerError<SE, DE, IE> {
    /// The ranging sensor failed to produce a reading.
    Sensor(SE),
    /// The offset dial could not be sampled.
    Dial(DE),
    /// The indicator rejected a color write.
    Indicator(IE),
}

impl<SE, DE, IE> fmt::Display for ControllerError<SE, DE, IE>
where
    SE: fmt::Debug,
    DE: fmt::Debug,
    IE: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Sensor(e) => write!(f, "Ranging sensor failure: {:?}", e),
            ControllerError::Dial(e) => write!(f, "Offset dial failure: {:?}", e),
            ControllerError::Indicator(e) => write!(f, "Indicator failure: {:?}", e),
        }
    }
}

impl<SE, DE, IE> core::error::Error for ControllerError<SE, DE, IE>
where
    SE: fmt::Debug,
    DE: fmt::Debug,
    IE: fmt::Debug,
{
}
