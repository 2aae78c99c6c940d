//! Simulated board: a scripted vehicle in front of an HC-SR04 style sensor,
//! a potentiometer on an ADC channel, and an RGB LED.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

use parkassist_core::{
    Clock, Color, Distance, Indicator, OffsetDial, RangeSensor, Timestamp, offset_from_adc,
};
use tracing::info;

use crate::blackboard::{Blackboard, record_lit};
use crate::config::SimulationSettings;

/// Milliseconds since the controller started.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.origin.elapsed().as_millis() as u64)
    }
}

/// Vehicle that drives in, stays parked, reverses out and waits before the
/// next approach.
#[derive(Debug, Clone)]
pub struct SimulatedVehicle {
    start_cm: f32,
    park_cm: f32,
    speed_cm_s: f32,
    dwell_s: f32,
}

/// Seconds the driveway stays empty between visits.
const EMPTY_S: f32 = 5.0;

/// Width of the echo pulse an HC-SR04 emits when nothing answers the ping.
const NO_ECHO_PULSE: Duration = Duration::from_millis(38);

impl SimulatedVehicle {
    pub fn new(settings: &SimulationSettings) -> Self {
        Self {
            start_cm: settings.start_distance_cm.max(settings.park_distance_cm),
            park_cm: settings.park_distance_cm.max(0.0),
            speed_cm_s: settings.approach_speed_cm_s.max(1.0),
            dwell_s: settings.dwell_s.max(0.0),
        }
    }

    fn travel_s(&self) -> f32 {
        (self.start_cm - self.park_cm) / self.speed_cm_s
    }

    /// Distance from the sensor `t_s` seconds after startup.
    pub fn distance_at(&self, t_s: f32) -> Distance {
        let travel = self.travel_s();
        let period = 2.0 * travel + self.dwell_s + EMPTY_S;
        let t = t_s.max(0.0) % period;

        let cm = if t < travel {
            self.start_cm - t * self.speed_cm_s
        } else if t < travel + self.dwell_s {
            self.park_cm
        } else if t < 2.0 * travel + self.dwell_s {
            self.park_cm + (t - travel - self.dwell_s) * self.speed_cm_s
        } else {
            self.start_cm
        };
        Distance::from_cm(cm)
    }
}

/// Ranging sensor watching a [`SimulatedVehicle`].
///
/// The distance goes through an echo pulse width and back, so readings carry
/// the same microsecond quantization as the real sensor.
pub struct SimulatedSensor<C> {
    vehicle: SimulatedVehicle,
    clock: C,
    no_echo_every: u32,
    pings: u32,
}

impl<C: Clock> SimulatedSensor<C> {
    pub fn new(vehicle: SimulatedVehicle, clock: C, no_echo_every: u32) -> Self {
        Self {
            vehicle,
            clock,
            no_echo_every,
            pings: 0,
        }
    }
}

impl<C: Clock> RangeSensor for SimulatedSensor<C> {
    type Error = Infallible;

    fn measure(&mut self) -> Result<Distance, Self::Error> {
        self.pings = self.pings.wrapping_add(1);
        let t_s = self.clock.now().as_millis() as f32 / 1000.0;

        let echo = if self.no_echo_every > 0 && self.pings % self.no_echo_every == 0 {
            NO_ECHO_PULSE
        } else {
            self.vehicle.distance_at(t_s).to_echo()
        };
        Ok(Distance::from_echo(echo))
    }
}

/// Shared raw ADC code of the offset potentiometer.
#[derive(Debug, Clone)]
pub struct DialHandle {
    raw: Arc<AtomicU16>,
    full_scale: u16,
}

impl DialHandle {
    pub fn new(initial_raw: u16, resolution_bits: u8) -> Self {
        let bits = resolution_bits.min(16) as u32;
        let full_scale = ((1u32 << bits) - 1) as u16;
        Self {
            raw: Arc::new(AtomicU16::new(initial_raw.min(full_scale))),
            full_scale,
        }
    }

    pub fn raw(&self) -> u16 {
        self.raw.load(Ordering::Relaxed)
    }

    pub fn full_scale(&self) -> u16 {
        self.full_scale
    }

    /// Turn the dial by `delta` codes, saturating at either end.
    pub fn nudge(&self, delta: i32) {
        let full_scale = self.full_scale as i32;
        let _ = self
            .raw
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |raw| {
                Some((raw as i32 + delta).clamp(0, full_scale) as u16)
            });
    }
}

pub struct SimulatedDial {
    handle: DialHandle,
    resolution_bits: u8,
    max_offset: Distance,
}

impl SimulatedDial {
    pub fn new(handle: DialHandle, resolution_bits: u8, max_offset: Distance) -> Self {
        Self {
            handle,
            resolution_bits,
            max_offset,
        }
    }
}

impl OffsetDial for SimulatedDial {
    type Error = Infallible;

    fn read(&mut self) -> Result<Distance, Self::Error> {
        Ok(offset_from_adc(
            self.handle.raw(),
            self.resolution_bits,
            self.max_offset,
        ))
    }
}

/// RGB LED that logs each change and mirrors it on the blackboard.
pub struct LoggedIndicator {
    bb: Blackboard,
}

impl LoggedIndicator {
    pub fn new(bb: Blackboard) -> Self {
        Self { bb }
    }
}

impl Indicator for LoggedIndicator {
    type Error = Infallible;

    fn set(&mut self, color: Color) -> Result<(), Self::Error> {
        let rgb = color.rgb();
        info!(r = rgb.r, g = rgb.g, b = rgb.b, "{}", color);
        record_lit(&self.bb, color);
        Ok(())
    }
}
