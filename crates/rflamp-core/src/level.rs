//! Conversion between external scales and device levels.
//!
//! Brightness uses the 1-255 scale, color temperature uses Kelvin. The
//! forward and reverse formulas round differently and are not exact inverses;
//! values already reported to users depend on both, so they stay as they are.

use crate::config::kelvin;

/// Convert a 1-255 brightness to a level in `[1, levels]`.
pub fn brightness_to_level(brightness: u8, levels: u8) -> u8 {
    let scaled = (i32::from(brightness) - 1) * i32::from(levels);
    let level = scaled.div_euclid(254) + 1;
    level.clamp(1, i32::from(levels)) as u8
}

/// Convert a level to the reported 1-255 brightness.
///
/// Returns `None` when brightness is unsupported or the lamp is off.
pub fn level_to_brightness(level: u8, levels: Option<u8>, is_on: bool) -> Option<u8> {
    let levels = levels?;
    if !is_on {
        return None;
    }

    let brightness = (f64::from(level) / f64::from(levels) * 255.0).round_ties_even();
    Some(brightness.clamp(1.0, 255.0) as u8)
}

/// Convert a Kelvin value to a color temperature level in `[1, levels]`.
///
/// Values outside the supported range are clamped first.
pub fn kelvin_to_level(temp_kelvin: u16, levels: u8) -> u8 {
    let temp_kelvin = temp_kelvin.clamp(kelvin::MIN, kelvin::MAX);
    let ratio = f64::from(temp_kelvin - kelvin::MIN) / f64::from(kelvin::MAX - kelvin::MIN);
    let level = (ratio * f64::from(levels.saturating_sub(1))).round_ties_even() as i32 + 1;
    level.clamp(1, i32::from(levels)) as u8
}

/// Convert a color temperature level to the reported Kelvin value.
///
/// Returns `None` when color temperature is unsupported or the lamp is off.
pub fn level_to_kelvin(level: u8, levels: Option<u8>, is_on: bool) -> Option<u16> {
    let levels = levels?;
    if !is_on || levels < 2 {
        return None;
    }

    let ratio = f64::from(level.saturating_sub(1)) / f64::from(levels - 1);
    let offset = (ratio * f64::from(kelvin::MAX - kelvin::MIN)).floor() as u16;
    Some(kelvin::MIN + offset)
}
