use std::fmt;

use clap::ValueEnum;

/// Alicat instrument variant. Fixed per client instance; decides which
/// operations are legal and which statistic slot holds which quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceType {
    MassFlowController,
    LiquidController,
    MassFlowMeter,
    PsidController,
    GaugePressureController,
}

impl DeviceType {
    /// Meters and controllers that measure mass flow (gas instruments).
    pub const fn is_mass_flow(self) -> bool {
        matches!(self, Self::MassFlowController | Self::MassFlowMeter)
    }

    /// Devices with a control valve and a setpoint.
    pub const fn is_controller(self) -> bool {
        matches!(
            self,
            Self::PsidController | Self::GaugePressureController | Self::MassFlowController
        )
    }

    /// Controllers whose controlled variable is a pressure.
    pub const fn is_pressure_controller(self) -> bool {
        matches!(self, Self::PsidController | Self::GaugePressureController)
    }

    /// Liquid instruments (no gas table, no mass statistics).
    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::LiquidController)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MassFlowController => "mass flow controller",
            Self::LiquidController => "liquid controller",
            Self::MassFlowMeter => "mass flow meter",
            Self::PsidController => "PSID controller",
            Self::GaugePressureController => "gauge pressure controller",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceType;

    const ALL: [DeviceType; 5] = [
        DeviceType::MassFlowController,
        DeviceType::LiquidController,
        DeviceType::MassFlowMeter,
        DeviceType::PsidController,
        DeviceType::GaugePressureController,
    ];

    #[test]
    fn mass_flow_covers_meters_and_gas_controllers() {
        for device in ALL {
            let expected = matches!(
                device,
                DeviceType::MassFlowController | DeviceType::MassFlowMeter
            );
            assert_eq!(device.is_mass_flow(), expected, "{device}");
        }
    }

    #[test]
    fn controller_excludes_meters_and_liquid() {
        assert!(DeviceType::MassFlowController.is_controller());
        assert!(DeviceType::PsidController.is_controller());
        assert!(DeviceType::GaugePressureController.is_controller());
        assert!(!DeviceType::MassFlowMeter.is_controller());
        assert!(!DeviceType::LiquidController.is_controller());
    }

    #[test]
    fn pressure_controller_is_psid_or_gauge_only() {
        for device in ALL {
            let expected = matches!(
                device,
                DeviceType::PsidController | DeviceType::GaugePressureController
            );
            assert_eq!(device.is_pressure_controller(), expected, "{device}");
        }
    }

    #[test]
    fn liquid_is_only_the_liquid_controller() {
        for device in ALL {
            assert_eq!(
                device.is_liquid(),
                device == DeviceType::LiquidController,
                "{device}"
            );
        }
    }
}
