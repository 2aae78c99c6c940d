//! Zone thresholds and the dial offset that shifts them.
//!
//! The offset is only ever added to both thresholds. A larger offset moves the
//! stop boundary farther from the sensor, never closer.

use core::fmt;
use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::units::Distance;
use crate::zone::Zone;

/// Offset-adjusted warn and stop distances.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    warn_distance: Distance,
    stop_distance: Distance,
}

impl Thresholds {
    /// Construct thresholds.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError::InvalidWarnDistance)` or
    /// `Err(ConfigError::InvalidStopDistance)` if a distance is not positive and finite.
    /// Returns `Err(ConfigError::InvertedThresholds)` if `stop_distance > warn_distance`.
    pub fn new(warn_distance: Distance, stop_distance: Distance) -> Result<Self, ConfigError> {
        let warn = warn_distance.as_cm();
        let stop = stop_distance.as_cm();
        if !warn.is_finite() || warn <= 0.0 {
            return Err(ConfigError::InvalidWarnDistance("must be positive and finite"));
        }
        if !stop.is_finite() || stop <= 0.0 {
            return Err(ConfigError::InvalidStopDistance("must be positive and finite"));
        }
        if stop > warn {
            return Err(ConfigError::InvertedThresholds(
                "stop distance must not exceed warn distance",
            ));
        }
        Ok(Thresholds {
            warn_distance,
            stop_distance,
        })
    }

    /// Returns the warn distance.
    pub fn warn_distance(&self) -> Distance {
        self.warn_distance
    }

    /// Returns the stop distance.
    pub fn stop_distance(&self) -> Distance {
        self.stop_distance
    }

    /// Shift both thresholds outwards by `offset`.
    ///
    /// Negative or NaN offsets are treated as zero.
    pub fn with_offset(self, offset: Distance) -> Self {
        let offset = if offset.as_cm() > 0.0 { offset } else { Distance::ZERO };
        Thresholds {
            warn_distance: self.warn_distance + offset,
            stop_distance: self.stop_distance + offset,
        }
    }

    /// Classify a distance sample. First match wins:
    ///
    /// 1. `sample > warn` is `Far`
    /// 2. `stop < sample <= warn` is `Near`
    /// 3. `sample <= stop` is `Close`
    ///
    /// A NaN sample compares false everywhere and lands in `Far`.
    pub fn zone_for(&self, sample: Distance) -> Zone {
        if sample > self.warn_distance {
            Zone::Far
        } else if sample > self.stop_distance {
            Zone::Near
        } else if sample <= self.stop_distance {
            Zone::Close
        } else {
            // NaN
            Zone::Far
        }
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warn: {}, stop: {}", self.warn_distance, self.stop_distance)
    }
}

/// Validated classifier configuration, fixed for the lifetime of the process.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierConfig {
    base: Thresholds,
    max_offset: Distance,
    parked_led_ontime: Duration,
}

impl ClassifierConfig {
    /// Validate and construct a classifier configuration.
    ///
    /// # Arguments
    ///
    /// * `warn_distance`: Distance at which the indicator switches from far to near.
    /// * `stop_distance`: Distance at which the indicator switches to close.
    /// * `max_offset`: Upper bound for the dial offset.
    /// * `parked_led_ontime`: How long the close color stays lit before going dark.
    ///
    /// # Errors
    ///
    /// Propagates threshold errors from [`Thresholds::new`].
    /// Returns `Err(ConfigError::InvalidMaxOffset)` if `max_offset` is negative or not finite.
    /// Returns `Err(ConfigError::InvalidParkedTimeout)` if `parked_led_ontime` is zero.
    pub fn new(
        warn_distance: Distance,
        stop_distance: Distance,
        max_offset: Distance,
        parked_led_ontime: Duration,
    ) -> Result<Self, ConfigError> {
        let base = Thresholds::new(warn_distance, stop_distance)?;
        let max = max_offset.as_cm();
        if !max.is_finite() || max < 0.0 {
            return Err(ConfigError::InvalidMaxOffset("must be non-negative and finite"));
        }
        if parked_led_ontime.is_zero() {
            return Err(ConfigError::InvalidParkedTimeout("must be positive"));
        }
        Ok(ClassifierConfig {
            base,
            max_offset,
            parked_led_ontime,
        })
    }

    /// Thresholds with no offset applied.
    pub fn base_thresholds(&self) -> Thresholds {
        self.base
    }

    /// Returns the maximum dial offset.
    pub fn max_offset(&self) -> Distance {
        self.max_offset
    }

    /// Returns the parked timeout.
    pub fn parked_led_ontime(&self) -> Duration {
        self.parked_led_ontime
    }

    /// Clamp `offset` to `[0, max_offset]` and apply it to the base thresholds.
    pub fn thresholds(&self, offset: Distance) -> Thresholds {
        self.apply_offset(offset).1
    }

    /// Like [`thresholds`](Self::thresholds), also returning the offset that
    /// was actually applied.
    pub fn apply_offset(&self, offset: Distance) -> (Distance, Thresholds) {
        let offset = offset.clamp(Distance::ZERO, self.max_offset);
        (offset, self.base.with_offset(offset))
    }
}

/// Map a raw ADC code from the offset dial onto `[0, max_offset]`.
///
/// Codes above full scale are clamped. A zero-bit resolution always yields zero.
///
/// # Arguments
///
/// * `raw`: Raw conversion result.
/// * `resolution_bits`: ADC resolution, e.g. 12 for a 0..=4095 range.
/// * `max_offset`: Offset produced at full scale.
pub fn offset_from_adc(raw: u16, resolution_bits: u8, max_offset: Distance) -> Distance {
    if resolution_bits == 0 {
        return Distance::ZERO;
    }
    let full_scale = (1u32 << resolution_bits.min(16)) - 1;
    let raw = (raw as u32).min(full_scale);
    let fraction = raw as f32 / full_scale as f32;
    Distance::from_cm(fraction * max_offset.as_cm().max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cm(v: f32) -> Distance {
        Distance::from_cm(v)
    }

    #[test]
    fn test_zone_boundaries() {
        let t = Thresholds::new(cm(200.0), cm(65.0)).unwrap();
        assert_eq!(t.zone_for(cm(200.1)), Zone::Far);
        assert_eq!(t.zone_for(cm(200.0)), Zone::Near);
        assert_eq!(t.zone_for(cm(65.1)), Zone::Near);
        assert_eq!(t.zone_for(cm(65.0)), Zone::Close);
        assert_eq!(t.zone_for(Distance::ZERO), Zone::Close);
    }

    #[test]
    fn test_implausible_samples() {
        let t = Thresholds::new(cm(200.0), cm(50.0)).unwrap();
        assert_eq!(t.zone_for(cm(1.0e9)), Zone::Far);
        assert_eq!(t.zone_for(cm(f32::INFINITY)), Zone::Far);
        assert_eq!(t.zone_for(cm(f32::NAN)), Zone::Far);
    }

    #[test]
    fn test_equal_thresholds_have_no_near_zone() {
        let t = Thresholds::new(cm(80.0), cm(80.0)).unwrap();
        assert_eq!(t.zone_for(cm(80.5)), Zone::Far);
        assert_eq!(t.zone_for(cm(80.0)), Zone::Close);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(matches!(
            Thresholds::new(cm(50.0), cm(200.0)),
            Err(ConfigError::InvertedThresholds(_))
        ));
        assert!(matches!(
            Thresholds::new(cm(0.0), cm(0.0)),
            Err(ConfigError::InvalidWarnDistance(_))
        ));
        assert!(matches!(
            Thresholds::new(cm(200.0), cm(-1.0)),
            Err(ConfigError::InvalidStopDistance(_))
        ));
        assert!(matches!(
            Thresholds::new(cm(f32::NAN), cm(10.0)),
            Err(ConfigError::InvalidWarnDistance(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let ontime = Duration::from_secs(60);
        assert!(ClassifierConfig::new(cm(200.0), cm(50.0), cm(100.0), ontime).is_ok());
        assert!(ClassifierConfig::new(cm(200.0), cm(50.0), Distance::ZERO, ontime).is_ok());
        assert!(matches!(
            ClassifierConfig::new(cm(200.0), cm(50.0), cm(-1.0), ontime),
            Err(ConfigError::InvalidMaxOffset(_))
        ));
        assert!(matches!(
            ClassifierConfig::new(cm(200.0), cm(50.0), cm(100.0), Duration::ZERO),
            Err(ConfigError::InvalidParkedTimeout(_))
        ));
        assert!(matches!(
            ClassifierConfig::new(cm(10.0), cm(50.0), cm(100.0), ontime),
            Err(ConfigError::InvertedThresholds(_))
        ));
    }

    #[test]
    fn test_offset_is_added_to_both() {
        let config =
            ClassifierConfig::new(cm(200.0), cm(50.0), cm(100.0), Duration::from_secs(60)).unwrap();
        let t = config.thresholds(cm(30.0));
        assert_eq!(t.warn_distance(), cm(230.0));
        assert_eq!(t.stop_distance(), cm(80.0));
    }

    #[test]
    fn test_offset_is_clamped() {
        let config =
            ClassifierConfig::new(cm(200.0), cm(50.0), cm(100.0), Duration::from_secs(60)).unwrap();
        assert_eq!(config.thresholds(cm(500.0)).stop_distance(), cm(150.0));
        // A negative offset must never pull the stop boundary in.
        assert_eq!(config.thresholds(cm(-40.0)).stop_distance(), cm(50.0));
        assert_eq!(
            config.base_thresholds().with_offset(cm(-40.0)).stop_distance(),
            cm(50.0)
        );
    }

    #[test]
    fn test_apply_offset_reports_clamped_value() {
        let config =
            ClassifierConfig::new(cm(200.0), cm(50.0), cm(100.0), Duration::from_secs(60)).unwrap();
        let (offset, t) = config.apply_offset(cm(500.0));
        assert_eq!(offset, cm(100.0));
        assert_eq!(t, config.thresholds(cm(500.0)));
        let (offset, t) = config.apply_offset(cm(-40.0));
        assert_eq!(offset, Distance::ZERO);
        assert_eq!(t, config.base_thresholds());
    }

    #[test]
    fn test_offset_from_adc() {
        let max = cm(100.0);
        assert_eq!(offset_from_adc(0, 12, max), Distance::ZERO);
        assert_eq!(offset_from_adc(4095, 12, max), max);
        assert_eq!(offset_from_adc(u16::MAX, 12, max), max);
        assert!((offset_from_adc(2048, 12, max).as_cm() - 50.012).abs() < 1e-2);
        assert_eq!(offset_from_adc(1000, 0, max), Distance::ZERO);
    }

    proptest! {
        #[test]
        fn prop_close_boundary_grows_with_offset(
            warn in 10.0f32..400.0,
            stop_frac in 0.05f32..1.0,
            max_offset in 0.0f32..200.0,
            a in -50.0f32..300.0,
            b in -50.0f32..300.0,
        ) {
            let stop = warn * stop_frac;
            let config = ClassifierConfig::new(cm(warn), cm(stop), cm(max_offset), Duration::from_secs(1)).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let t_lo = config.thresholds(cm(lo));
            let t_hi = config.thresholds(cm(hi));
            prop_assert!(t_hi.stop_distance() >= t_lo.stop_distance());
            prop_assert!(t_hi.warn_distance() >= t_lo.warn_distance());
            prop_assert!(t_lo.stop_distance() >= cm(stop));
        }

        #[test]
        fn prop_close_under_small_offset_stays_close(
            sample in 0.0f32..400.0,
            lo in 0.0f32..100.0,
            extra in 0.0f32..100.0,
        ) {
            let config = ClassifierConfig::new(cm(200.0), cm(50.0), cm(200.0), Duration::from_secs(1)).unwrap();
            if config.thresholds(cm(lo)).zone_for(cm(sample)) == Zone::Close {
                prop_assert_eq!(config.thresholds(cm(lo + extra)).zone_for(cm(sample)), Zone::Close);
            }
        }
    }
}
