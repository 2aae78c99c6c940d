//! Hardware shim traits.
//!
//! These are the thin boundaries between the classifier and the board: the
//! ultrasonic rangefinder, the offset dial, the RGB indicator and the clock.
//! None of them carry state the classifier depends on.

use crate::units::{Distance, Timestamp};
use crate::zone::Color;

/// An ultrasonic rangefinder.
pub trait RangeSensor {
    /// Error reported when a measurement cannot be taken at all.
    type Error;

    /// Trigger a ping and return the measured distance.
    ///
    /// A missing echo is not an error: implementations return whatever
    /// distance the echo width implies, typically zero or very large.
    fn measure(&mut self) -> Result<Distance, Self::Error>;
}

/// The manual offset dial.
pub trait OffsetDial {
    /// Error reported when the dial cannot be sampled.
    type Error;

    /// Sample the dial and return the offset it selects.
    fn read(&mut self) -> Result<Distance, Self::Error>;
}

/// The tri-color indicator light.
pub trait Indicator {
    /// Error reported when the indicator cannot be driven.
    type Error;

    /// Drive the indicator to `color`.
    fn set(&mut self, color: Color) -> Result<(), Self::Error>;
}

/// A monotonic millisecond clock.
pub trait Clock {
    /// Current time.
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
