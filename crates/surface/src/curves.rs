//! Value mappings between 7-bit controller positions and host parameters.

/// The host's fixed-point representation of 0 dB on a mixer volume or EQ
/// gain parameter.
pub const ZERO_DB_GAIN: f32 = 0.85;

/// Center dead zone half-width: 5% of the 127-step range.
const DEAD_ZONE: f32 = 6.35;
const CENTER: f32 = 63.5;

/// Linear fader scale: 0 -> 0.0, 127 -> 127/128 of 0 dB (~0.84335).
pub fn fader_to_gain(value: u8) -> f32 {
    f32::from(value.min(127)) / 128.0 * ZERO_DB_GAIN
}

/// Three-segment EQ gain curve.
///
/// The dead zone around center pins the knob to exactly 0 dB so jitter
/// around the detent never moves the parameter. Below it the left
/// half-range runs linearly down to the -inf representation (0.0); above it
/// the right half-range runs linearly up to +6 dB (1.0).
pub fn eq_knob_to_gain(value: u8) -> f32 {
    let v = f32::from(value.min(127));
    let low_edge = CENTER - DEAD_ZONE;
    let high_edge = CENTER + DEAD_ZONE;
    if v < low_edge {
        v / low_edge * ZERO_DB_GAIN
    } else if v > high_edge {
        ZERO_DB_GAIN + (v - high_edge) / (127.0 - high_edge) * (1.0 - ZERO_DB_GAIN)
    } else {
        ZERO_DB_GAIN
    }
}

/// Decode the K2's relative encoder convention: 1 = +1 tick, 127 = -1 tick
/// (7-bit two's complement; fast turns send larger magnitudes).
pub fn relative_delta(value: u8) -> i32 {
    let v = i32::from(value & 0x7F);
    if v < 64 {
        v
    } else {
        v - 128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fader_endpoints() {
        assert_eq!(fader_to_gain(0), 0.0);
        // 127/128 * 0.85
        assert!((fader_to_gain(127) - 0.84335).abs() < 1e-4);
    }

    #[test]
    fn test_fader_monotonic() {
        for v in 0..127u8 {
            assert!(fader_to_gain(v + 1) >= fader_to_gain(v));
        }
    }

    #[test]
    fn test_eq_knob_endpoints() {
        assert_eq!(eq_knob_to_gain(0), 0.0);
        assert_eq!(eq_knob_to_gain(127), 1.0);
    }

    #[test]
    fn test_eq_knob_dead_zone_is_exact_zero_db() {
        // 63.5 +/- 6.35 covers integer positions 58..=69
        for v in 58..=69u8 {
            assert_eq!(eq_knob_to_gain(v), ZERO_DB_GAIN);
        }
        assert!(eq_knob_to_gain(57) < ZERO_DB_GAIN);
        assert!(eq_knob_to_gain(70) > ZERO_DB_GAIN);
    }

    #[test]
    fn test_eq_knob_monotonic() {
        for v in 0..127u8 {
            assert!(eq_knob_to_gain(v + 1) >= eq_knob_to_gain(v));
        }
    }

    #[test]
    fn test_relative_delta() {
        assert_eq!(relative_delta(1), 1);
        assert_eq!(relative_delta(127), -1);
        assert_eq!(relative_delta(2), 2);
        assert_eq!(relative_delta(126), -2);
        assert_eq!(relative_delta(0), 0);
    }
}
