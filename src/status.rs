use crate::constants::{
    STATUS_BIT_ADC_ERROR, STATUS_BIT_FLOW_OVERFLOW_DURING_TOTALIZE, STATUS_BIT_MASS_OVERFLOW,
    STATUS_BIT_MASS_UNDERFLOW, STATUS_BIT_MEASUREMENT_ABORTED, STATUS_BIT_OVER_PRESSURE_LIMIT,
    STATUS_BIT_PID_EXHAUST, STATUS_BIT_PID_LOOP_IN_HOLD, STATUS_BIT_PRESSURE_OVERFLOW,
    STATUS_BIT_TEMPERATURE_OVERFLOW, STATUS_BIT_TEMPERATURE_UNDERFLOW,
    STATUS_BIT_TOTALIZER_OVERFLOW, STATUS_BIT_VOLUMETRIC_OVERFLOW,
    STATUS_BIT_VOLUMETRIC_UNDERFLOW,
};

/// Decoded view of the device status register.
///
/// One flag per status bit; `any_error` is set whenever the raw word is
/// non-zero. Decoding is stateless, every query yields a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusFlags {
    pub temperature_overflow: bool,
    pub temperature_underflow: bool,
    pub volumetric_overflow: bool,
    pub volumetric_underflow: bool,
    pub mass_overflow: bool,
    pub mass_underflow: bool,
    pub pressure_overflow: bool,
    pub totalizer_overflow: bool,
    pub pid_loop_in_hold: bool,
    pub adc_error: bool,
    pub pid_exhaust: bool,
    pub over_pressure_limit: bool,
    pub flow_overflow_during_totalize: bool,
    pub measurement_aborted: bool,
    pub any_error: bool,
}

impl StatusFlags {
    pub const fn decode(raw: u16) -> Self {
        Self {
            temperature_overflow: raw & STATUS_BIT_TEMPERATURE_OVERFLOW != 0,
            temperature_underflow: raw & STATUS_BIT_TEMPERATURE_UNDERFLOW != 0,
            volumetric_overflow: raw & STATUS_BIT_VOLUMETRIC_OVERFLOW != 0,
            volumetric_underflow: raw & STATUS_BIT_VOLUMETRIC_UNDERFLOW != 0,
            mass_overflow: raw & STATUS_BIT_MASS_OVERFLOW != 0,
            mass_underflow: raw & STATUS_BIT_MASS_UNDERFLOW != 0,
            pressure_overflow: raw & STATUS_BIT_PRESSURE_OVERFLOW != 0,
            totalizer_overflow: raw & STATUS_BIT_TOTALIZER_OVERFLOW != 0,
            pid_loop_in_hold: raw & STATUS_BIT_PID_LOOP_IN_HOLD != 0,
            adc_error: raw & STATUS_BIT_ADC_ERROR != 0,
            pid_exhaust: raw & STATUS_BIT_PID_EXHAUST != 0,
            over_pressure_limit: raw & STATUS_BIT_OVER_PRESSURE_LIMIT != 0,
            flow_overflow_during_totalize: raw & STATUS_BIT_FLOW_OVERFLOW_DURING_TOTALIZE != 0,
            measurement_aborted: raw & STATUS_BIT_MEASUREMENT_ABORTED != 0,
            any_error: raw != 0,
        }
    }

    /// Names of the flags currently raised, for display.
    pub fn active(&self) -> Vec<&'static str> {
        let flags = [
            (self.temperature_overflow, "temperature overflow"),
            (self.temperature_underflow, "temperature underflow"),
            (self.volumetric_overflow, "volumetric overflow"),
            (self.volumetric_underflow, "volumetric underflow"),
            (self.mass_overflow, "mass overflow"),
            (self.mass_underflow, "mass underflow"),
            (self.pressure_overflow, "pressure overflow"),
            (self.totalizer_overflow, "totalizer overflow"),
            (self.pid_loop_in_hold, "PID loop in hold"),
            (self.adc_error, "ADC error"),
            (self.pid_exhaust, "PID exhaust"),
            (self.over_pressure_limit, "over pressure limit"),
            (
                self.flow_overflow_during_totalize,
                "flow overflow during totalize",
            ),
            (self.measurement_aborted, "measurement aborted"),
        ];
        flags
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::StatusFlags;

    #[test]
    fn zero_word_decodes_to_no_flags() {
        let flags = StatusFlags::decode(0x0000);
        assert_eq!(flags, StatusFlags::default());
        assert!(!flags.any_error);
        assert!(flags.active().is_empty());
    }

    #[test]
    fn pressure_and_temperature_overflow_word() {
        let flags = StatusFlags::decode(0x0041);
        assert!(flags.temperature_overflow);
        assert!(flags.pressure_overflow);
        assert!(!flags.temperature_underflow);
        assert!(!flags.adc_error);
        assert!(flags.any_error);
        assert_eq!(
            flags.active(),
            vec!["temperature overflow", "pressure overflow"]
        );
    }

    #[test]
    fn each_bit_maps_to_exactly_one_flag() {
        for shift in 0..14_u16 {
            let flags = StatusFlags::decode(1 << shift);
            assert_eq!(flags.active().len(), 1, "bit {shift}");
            assert!(flags.any_error, "bit {shift}");
        }
    }

    #[test]
    fn high_bits_beyond_the_map_still_mark_an_error() {
        let flags = StatusFlags::decode(0x4000);
        assert!(flags.any_error);
        assert!(flags.active().is_empty());
    }

    #[test]
    fn all_bits_set_raises_every_flag() {
        let flags = StatusFlags::decode(0x3FFF);
        assert_eq!(flags.active().len(), 14);
    }
}
