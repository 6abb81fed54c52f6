//! Register-level value codecs.
//!
//! Floats cross the wire as IEEE-754 single precision split over two
//! consecutive holding registers, high word first. Gas mixture percentages
//! are fixed point with two implied decimals (25.5 % travels as 2550).

/// Splits a float into the `[high, low]` register pair it occupies on the
/// wire.
pub fn encode_f32(value: f32) -> [u16; 2] {
    let bits = value.to_bits();
    #[allow(clippy::cast_possible_truncation)]
    [(bits >> 16) as u16, (bits & 0xFFFF) as u16]
}

/// Reassembles a float from its `[high, low]` register pair.
pub fn decode_f32(words: [u16; 2]) -> f32 {
    f32::from_bits((u32::from(words[0]) << 16) | u32::from(words[1]))
}

/// Converts a mixture percentage to its 100x scaled register value.
///
/// Out-of-range inputs are clamped to 0..=100 before scaling; rounding is
/// half away from zero. NaN encodes as 0, the same value a clamped negative
/// input produces.
pub fn encode_gas_percent(percent: f32) -> u16 {
    if percent.is_nan() {
        return 0;
    }
    let clamped = percent.clamp(0.0, 100.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (clamped * 100.0).round() as u16
    }
}

/// Converts a 100x scaled register value back to a percentage.
pub fn decode_gas_percent(raw: u16) -> f32 {
    f32::from(raw) / 100.0
}

#[cfg(test)]
mod tests {
    use super::{decode_f32, decode_gas_percent, encode_f32, encode_gas_percent};

    #[test]
    fn float_round_trips_through_register_pair() {
        for value in [0.0_f32, 1.0, -1.0, 19.53, 250.0, f32::MIN_POSITIVE, 1e30] {
            assert_eq!(decode_f32(encode_f32(value)), value);
        }
    }

    #[test]
    fn float_high_word_carries_sign_and_exponent() {
        // 1.0f32 is 0x3F80_0000
        assert_eq!(encode_f32(1.0), [0x3F80, 0x0000]);
        assert_eq!(decode_f32([0x3F80, 0x0000]), 1.0);
    }

    #[test]
    fn nan_payload_survives_the_round_trip() {
        let nan = f32::from_bits(0x7FC0_0001);
        assert_eq!(decode_f32(encode_f32(nan)).to_bits(), 0x7FC0_0001);
    }

    #[test]
    fn percent_scales_by_one_hundred() {
        assert_eq!(encode_gas_percent(50.0), 5000);
        assert_eq!(encode_gas_percent(25.5), 2550);
        assert_eq!(encode_gas_percent(0.0), 0);
        assert_eq!(encode_gas_percent(100.0), 10000);
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(encode_gas_percent(33.335), 3334);
        assert_eq!(encode_gas_percent(33.334), 3333);
    }

    #[test]
    fn percent_clamps_out_of_range_input() {
        assert_eq!(encode_gas_percent(-5.0), 0);
        assert_eq!(encode_gas_percent(120.0), 10000);
    }

    #[test]
    fn nan_percent_encodes_as_zero() {
        assert_eq!(encode_gas_percent(f32::NAN), 0);
        assert_eq!(encode_gas_percent(-f32::NAN), 0);
    }

    #[test]
    fn percent_decodes_back_to_fractional_value() {
        assert_eq!(decode_gas_percent(2550), 25.5);
        assert_eq!(decode_gas_percent(0), 0.0);
        assert_eq!(decode_gas_percent(10000), 100.0);
    }
}
