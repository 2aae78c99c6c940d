//! Proximity zones and the indicator colors that represent them.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Discrete proximity classification of a distance sample.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// No sample classified yet. Never re-entered after the first sample.
    #[default]
    Unknown,
    /// Beyond the warn distance.
    Far,
    /// Between the stop and warn distances.
    Near,
    /// At or inside the stop distance.
    Close,
}

impl Zone {
    /// Indicator color shown while the vehicle is in this zone.
    ///
    /// `Unknown` has no color of its own.
    pub fn color(self) -> Option<Color> {
        match self {
            Zone::Unknown => None,
            Zone::Far => Some(Color::Far),
            Zone::Near => Some(Color::Near),
            Zone::Close => Some(Color::Close),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Unknown => "unknown",
            Zone::Far => "far",
            Zone::Near => "near",
            Zone::Close => "close",
        };
        f.write_str(name)
    }
}

/// A color the tri-color indicator can show.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Vehicle is far away (green).
    Far,
    /// Vehicle is approaching (blue).
    Near,
    /// Vehicle should stop (red).
    Close,
    /// Indicator dark, vehicle presumed parked.
    Off,
}

impl Color {
    /// PWM duty cycles for the red, green and blue channels.
    pub const fn rgb(self) -> Rgb {
        match self {
            Color::Far => Rgb::new(0, 255, 0),
            Color::Near => Rgb::new(0, 0, 255),
            Color::Close => Rgb::new(255, 0, 0),
            Color::Off => Rgb::new(0, 0, 0),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Far => "LONG",
            Color::Near => "MEDIUM",
            Color::Close => "SHORT",
            Color::Off => "TIMEOUT : LED off",
        };
        f.write_str(name)
    }
}

/// 8-bit PWM duty cycle per LED channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red channel duty (0 = off, 255 = full).
    pub r: u8,
    /// Green channel duty.
    pub g: u8,
    /// Blue channel duty.
    pub b: u8,
}

impl Rgb {
    /// Construct a duty triple.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// A command for the indicator shim.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCommand {
    /// Switch the indicator to the given color.
    SetColor(Color),
}

impl IndicatorCommand {
    /// The color this command lights.
    pub const fn color(self) -> Color {
        match self {
            IndicatorCommand::SetColor(color) => color,
        }
    }
}
