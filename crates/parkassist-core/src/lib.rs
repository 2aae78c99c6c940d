#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for ultrasonic parking-assist indicators."]
#![doc = ""]
#![doc = "This crate classifies distance samples into proximity zones, decides when the"]
#![doc = "tri-color indicator must change, and dims it once the vehicle is presumed parked."]

pub mod classifier;
pub mod controller;
pub mod error;
pub mod shim;
pub mod thresholds;
pub mod units;
pub mod zone;

pub use classifier::{ClassifierState, ClassifyResult, ParkedTimer, ProximityClassifier};
pub use controller::{Controller, Cycle};
pub use error::{ConfigError, ControllerError};
pub use shim::{Clock, Indicator, OffsetDial, RangeSensor};
pub use thresholds::{ClassifierConfig, Thresholds, offset_from_adc};
pub use units::{Distance, SOUND_SPEED_CM_PER_US, Timestamp};
pub use zone::{Color, IndicatorCommand, Rgb, Zone};
