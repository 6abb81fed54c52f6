//! Special command vocabulary.
//!
//! A special command is one block write of `(command id, argument)` to the
//! command register pair followed by one read of the argument register, which
//! by then holds a status code. Classification of that code is the only
//! acknowledgement the instrument gives.

use thiserror::Error;

/// Command executed without a fault.
pub const STATUS_CODE_SUCCESS: u16 = 0;
pub const STATUS_CODE_INVALID_COMMAND_ID: u16 = 32769;
pub const STATUS_CODE_INVALID_SETTING: u16 = 32770;
pub const STATUS_CODE_UNSUPPORTED_FEATURE: u16 = 32771;
/// Mass-flow devices only.
pub const STATUS_CODE_INVALID_GAS_MIX_INDEX: u16 = 32772;
/// Mass-flow devices only.
pub const STATUS_CODE_INVALID_GAS_MIX_CONSTITUENT: u16 = 32773;
/// Mass-flow devices only.
pub const STATUS_CODE_INVALID_GAS_MIX_PERCENTAGE: u16 = 32774;

/// Command ids accepted in the command id register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SpecialCommand {
    ChangeGasNumber = 1,
    CreateCustomGasMixture = 2,
    DeleteCustomGasMixture = 3,
    Tare = 4,
    ResetTotalizer = 5,
    ValveSetting = 6,
    DisplayLock = 7,
    ChangeProportionalGain = 8,
    ChangeDerivativeGain = 9,
    ChangeIntegralGain = 10,
    ChangeControlLoopVariable = 11,
    SaveSetpointToMemory = 12,
    ChangeLoopAlgorithm = 13,
    ReadPidValue = 14,
    ValveControlOverride = 16,
    ChangeSetpointSource = 18,
    ChangeModbusId = 32767,
    ChangeSerialBaudRate = 32768,
}

impl SpecialCommand {
    /// Wire value written to the command id register.
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// Argument of the tare command. Pressure variants need a pressure
/// controller; volume needs a mass-flow or liquid device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TareKind {
    Pressure = 0,
    AbsolutePressure = 1,
    Volume = 2,
}

impl TareKind {
    pub const fn argument(self) -> u16 {
        self as u16
    }
}

/// Argument of the valve setting command. `Exhaust` needs a dual-valve
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ValveSetting {
    Cancel = 0,
    HoldClosed = 1,
    HoldCurrent = 2,
    Exhaust = 3,
}

impl ValveSetting {
    pub const fn argument(self) -> u16 {
        self as u16
    }
}

/// PID coefficient selector. Setting each coefficient is its own command;
/// reading goes through the value-poll command with a selector argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidTerm {
    Proportional,
    Derivative,
    Integral,
}

impl PidTerm {
    /// Command id that sets this coefficient.
    pub const fn set_command(self) -> SpecialCommand {
        match self {
            Self::Proportional => SpecialCommand::ChangeProportionalGain,
            Self::Derivative => SpecialCommand::ChangeDerivativeGain,
            Self::Integral => SpecialCommand::ChangeIntegralGain,
        }
    }

    /// Argument selecting this coefficient for the read command.
    pub const fn read_argument(self) -> u16 {
        match self {
            Self::Proportional => 0,
            Self::Derivative => 1,
            Self::Integral => 2,
        }
    }
}

/// Argument of the control loop variable command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ControlLoopVariable {
    MassFlow = 0,
    VolumetricFlow = 1,
    DifferentialPressure = 2,
    AbsolutePressure = 3,
    GaugePressure = 4,
}

impl ControlLoopVariable {
    pub const fn argument(self) -> u16 {
        self as u16
    }
}

/// Argument of the loop control algorithm command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum LoopAlgorithm {
    Pd = 1,
    Pddi = 2,
}

impl LoopAlgorithm {
    pub const fn argument(self) -> u16 {
        self as u16
    }
}

/// Argument of the setpoint source command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SetpointSource {
    Digital = 0,
    Analog = 1,
}

impl SetpointSource {
    pub const fn argument(self) -> u16 {
        self as u16
    }
}

/// Fault reported back in the argument register after a special command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandFault {
    #[error("invalid command id")]
    InvalidCommandId,
    #[error("invalid setting")]
    InvalidSetting,
    #[error("requested feature is unsupported")]
    UnsupportedFeature,
    #[error("invalid gas mix index")]
    InvalidGasMixIndex,
    #[error("invalid gas mix constituent")]
    InvalidGasMixConstituent,
    #[error("invalid gas mix percentage")]
    InvalidGasMixPercentage,
    #[error("unknown status code {0}")]
    UnknownStatusCode(u16),
}

impl CommandFault {
    /// Wire code this fault travels as.
    pub const fn code(self) -> u16 {
        match self {
            Self::InvalidCommandId => STATUS_CODE_INVALID_COMMAND_ID,
            Self::InvalidSetting => STATUS_CODE_INVALID_SETTING,
            Self::UnsupportedFeature => STATUS_CODE_UNSUPPORTED_FEATURE,
            Self::InvalidGasMixIndex => STATUS_CODE_INVALID_GAS_MIX_INDEX,
            Self::InvalidGasMixConstituent => STATUS_CODE_INVALID_GAS_MIX_CONSTITUENT,
            Self::InvalidGasMixPercentage => STATUS_CODE_INVALID_GAS_MIX_PERCENTAGE,
            Self::UnknownStatusCode(raw) => raw,
        }
    }
}

/// Maps the post-command argument register word to a command outcome.
pub const fn classify_status(raw: u16) -> Result<(), CommandFault> {
    match raw {
        STATUS_CODE_SUCCESS => Ok(()),
        STATUS_CODE_INVALID_COMMAND_ID => Err(CommandFault::InvalidCommandId),
        STATUS_CODE_INVALID_SETTING => Err(CommandFault::InvalidSetting),
        STATUS_CODE_UNSUPPORTED_FEATURE => Err(CommandFault::UnsupportedFeature),
        STATUS_CODE_INVALID_GAS_MIX_INDEX => Err(CommandFault::InvalidGasMixIndex),
        STATUS_CODE_INVALID_GAS_MIX_CONSTITUENT => Err(CommandFault::InvalidGasMixConstituent),
        STATUS_CODE_INVALID_GAS_MIX_PERCENTAGE => Err(CommandFault::InvalidGasMixPercentage),
        other => Err(CommandFault::UnknownStatusCode(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        classify_status, CommandFault, ControlLoopVariable, LoopAlgorithm, PidTerm,
        SetpointSource, SpecialCommand, TareKind, ValveSetting,
    };

    #[test]
    fn command_codes_match_the_wire_table() {
        assert_eq!(SpecialCommand::ChangeGasNumber.code(), 1);
        assert_eq!(SpecialCommand::Tare.code(), 4);
        assert_eq!(SpecialCommand::ReadPidValue.code(), 14);
        assert_eq!(SpecialCommand::ValveControlOverride.code(), 16);
        assert_eq!(SpecialCommand::ChangeSetpointSource.code(), 18);
        assert_eq!(SpecialCommand::ChangeModbusId.code(), 32767);
        assert_eq!(SpecialCommand::ChangeSerialBaudRate.code(), 32768);
    }

    #[test]
    fn success_classifies_as_ok() {
        assert_eq!(classify_status(0), Ok(()));
    }

    #[test]
    fn fault_codes_classify_to_their_fault() {
        assert_eq!(classify_status(32769), Err(CommandFault::InvalidCommandId));
        assert_eq!(classify_status(32770), Err(CommandFault::InvalidSetting));
        assert_eq!(
            classify_status(32771),
            Err(CommandFault::UnsupportedFeature)
        );
        assert_eq!(
            classify_status(32772),
            Err(CommandFault::InvalidGasMixIndex)
        );
        assert_eq!(
            classify_status(32773),
            Err(CommandFault::InvalidGasMixConstituent)
        );
        assert_eq!(
            classify_status(32774),
            Err(CommandFault::InvalidGasMixPercentage)
        );
    }

    #[test]
    fn unrecognized_codes_classify_as_unknown() {
        assert_eq!(
            classify_status(9999),
            Err(CommandFault::UnknownStatusCode(9999))
        );
        assert_eq!(
            classify_status(40000),
            Err(CommandFault::UnknownStatusCode(40000))
        );
    }

    #[test]
    fn fault_code_round_trips_through_classify() {
        let faults = [
            CommandFault::InvalidCommandId,
            CommandFault::InvalidSetting,
            CommandFault::UnsupportedFeature,
            CommandFault::InvalidGasMixIndex,
            CommandFault::InvalidGasMixConstituent,
            CommandFault::InvalidGasMixPercentage,
            CommandFault::UnknownStatusCode(12345),
        ];
        for fault in faults {
            assert_eq!(classify_status(fault.code()), Err(fault));
        }
    }

    #[test]
    fn tare_arguments_follow_the_manual() {
        assert_eq!(TareKind::Pressure.argument(), 0);
        assert_eq!(TareKind::AbsolutePressure.argument(), 1);
        assert_eq!(TareKind::Volume.argument(), 2);
    }

    #[test]
    fn valve_setting_arguments_follow_the_manual() {
        assert_eq!(ValveSetting::Cancel.argument(), 0);
        assert_eq!(ValveSetting::HoldClosed.argument(), 1);
        assert_eq!(ValveSetting::HoldCurrent.argument(), 2);
        assert_eq!(ValveSetting::Exhaust.argument(), 3);
    }

    #[test]
    fn pid_terms_map_to_set_commands_and_read_arguments() {
        assert_eq!(
            PidTerm::Proportional.set_command(),
            SpecialCommand::ChangeProportionalGain
        );
        assert_eq!(
            PidTerm::Derivative.set_command(),
            SpecialCommand::ChangeDerivativeGain
        );
        assert_eq!(
            PidTerm::Integral.set_command(),
            SpecialCommand::ChangeIntegralGain
        );
        assert_eq!(PidTerm::Proportional.read_argument(), 0);
        assert_eq!(PidTerm::Derivative.read_argument(), 1);
        assert_eq!(PidTerm::Integral.read_argument(), 2);
    }

    #[test]
    fn loop_arguments_follow_the_manual() {
        assert_eq!(ControlLoopVariable::MassFlow.argument(), 0);
        assert_eq!(ControlLoopVariable::GaugePressure.argument(), 4);
        assert_eq!(LoopAlgorithm::Pd.argument(), 1);
        assert_eq!(LoopAlgorithm::Pddi.argument(), 2);
        assert_eq!(SetpointSource::Digital.argument(), 0);
        assert_eq!(SetpointSource::Analog.argument(), 1);
    }
}
