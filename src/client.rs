//! Alicat protocol adapter over a holding-register transport.
//!
//! One adapter instance talks to one instrument. Every operation validates
//! its arguments and the device's capabilities first, then performs at most
//! one block write and/or one block read. Nothing is cached and nothing is
//! retried: a failed exchange surfaces as an error and leaves the adapter
//! ready for the next call.

use crate::codec::{decode_f32, decode_gas_percent, encode_f32, encode_gas_percent};
use crate::command::{
    classify_status, CommandFault, ControlLoopVariable, LoopAlgorithm, PidTerm, SetpointSource,
    SpecialCommand, TareKind, ValveSetting,
};
use crate::constants::{
    CUSTOM_MIXTURE_INDEX_MAX, CUSTOM_MIXTURE_INDEX_MIN, DEFAULT_REGISTER_OFFSET, GAS_INDEX_MAX,
    MIXTURE_SLOT_MAX, MIXTURE_SLOT_MIN, REG_ANALOG_SCALE_FACTOR, REG_COMMAND_ARGUMENT,
    REG_COMMAND_ID, REG_DEVICE_STATISTIC_1_VALUE, REG_DEVICE_STATUS, REG_GAS_NUMBER,
    REG_MASS_FLOW_UNITS, REG_MIXTURE_GAS_1_INDEX, REG_SETPOINT, REG_VOLUMETRIC_FLOW_UNITS,
    STATISTIC_FLOW_TEMPERATURE, STATISTIC_MASS_FLOW, STATISTIC_MASS_TOTAL_CONTROLLER,
    STATISTIC_MASS_TOTAL_METER, STATISTIC_PRESSURE, STATISTIC_SETPOINT_MASS_FLOW,
    STATISTIC_SETPOINT_PRESSURE, STATISTIC_SLOT_MAX, STATISTIC_SLOT_MIN,
    STATISTIC_VOLUMETRIC_FLOW,
};
use crate::device::DeviceType;
use crate::diag::DiagnosticSink;
use crate::error::{Error, Result};
use crate::status::StatusFlags;
use crate::transport::{RegisterIo, TransportError};

/// Register pair of one gas-mixture constituent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixtureRegisters {
    pub index: u16,
    pub percent: u16,
}

/// One constituent of a gas mixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureGas {
    pub gas: u16,
    pub percent: f32,
}

/// Adapter for one Alicat instrument on the bus.
///
/// The transport can be owned or lent: `&mut T` and boxed transports
/// implement [`RegisterIo`] too.
pub struct Alicat<T> {
    transport: T,
    modbus_id: u8,
    device_type: DeviceType,
    register_offset: i32,
    verbose: bool,
    diagnostics: Option<Box<dyn DiagnosticSink + Send>>,
}

impl<T: RegisterIo> Alicat<T> {
    /// Adapter for the device answering at `modbus_id`.
    ///
    /// The register offset starts at -1, the shift the instruments apply
    /// between documented register numbers and wire addresses.
    pub fn new(transport: T, modbus_id: u8, device_type: DeviceType) -> Self {
        Self {
            transport,
            modbus_id,
            device_type,
            register_offset: DEFAULT_REGISTER_OFFSET,
            verbose: false,
            diagnostics: None,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn modbus_id(&self) -> u8 {
        self.modbus_id
    }

    /// Retargets subsequent exchanges at another bus id.
    pub fn set_modbus_id(&mut self, modbus_id: u8) {
        self.modbus_id = modbus_id;
    }

    pub fn register_offset(&self) -> i32 {
        self.register_offset
    }

    pub fn set_register_offset(&mut self, register_offset: i32) {
        self.register_offset = register_offset;
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Installs a sink for verbose traces. Traces are emitted only while
    /// verbose is on and never affect the outcome of an operation.
    pub fn set_diagnostics<S: DiagnosticSink + Send + 'static>(&mut self, sink: S) {
        self.diagnostics = Some(Box::new(sink));
    }

    /// Applies the register offset to a documented register number.
    ///
    /// The sum is widened to `i64` so any configurable offset resolves
    /// without wrapping.
    pub fn offset_register(&self, address: u16) -> i64 {
        i64::from(address) + i64::from(self.register_offset)
    }

    fn physical(&self, address: u16) -> Result<u16> {
        let resolved = self.offset_register(address);
        u16::try_from(resolved)
            .map_err(|_| Error::Transport(TransportError::InvalidAddress(resolved)))
    }

    fn trace(&mut self, message: impl FnOnce() -> String) {
        if !self.verbose {
            return;
        }
        if let Some(sink) = self.diagnostics.as_mut() {
            sink.emit(&message());
        }
    }

    fn require(&mut self, operation: &'static str, allowed: bool) -> Result<()> {
        if allowed {
            return Ok(());
        }
        let device_type = self.device_type;
        self.trace(|| format!("{operation} is not supported by a {device_type}"));
        Err(Error::Unsupported {
            operation,
            device_type,
        })
    }

    /// Reads one holding register at a documented register number.
    pub fn read_register(&mut self, address: u16) -> Result<u16> {
        let physical = self.physical(address)?;
        let words = self
            .transport
            .read_holding_registers(self.modbus_id, physical, 1)?;
        let value = words.first().copied().ok_or(TransportError::Length {
            expected: 1,
            actual: 0,
        })?;
        self.trace(|| format!("read register {address} -> {value}"));
        Ok(value)
    }

    /// Writes one holding register at a documented register number.
    pub fn write_register(&mut self, address: u16, value: u16) -> Result<()> {
        let physical = self.physical(address)?;
        self.transport
            .write_holding_registers(self.modbus_id, physical, &[value])?;
        self.trace(|| format!("write register {address} <- {value}"));
        Ok(())
    }

    /// Reads the float spanning `address` and the following register.
    pub fn read_float(&mut self, address: u16) -> Result<f32> {
        let physical = self.physical(address)?;
        let words = self
            .transport
            .read_holding_registers(self.modbus_id, physical, 2)?;
        if words.len() != 2 {
            return Err(Error::Transport(TransportError::Length {
                expected: 2,
                actual: words.len(),
            }));
        }
        let value = decode_f32([words[0], words[1]]);
        self.trace(|| format!("read float {address} -> {value}"));
        Ok(value)
    }

    /// Writes a float across `address` and the following register.
    pub fn write_float(&mut self, address: u16, value: f32) -> Result<()> {
        let physical = self.physical(address)?;
        let words = encode_f32(value);
        self.transport
            .write_holding_registers(self.modbus_id, physical, &words)?;
        self.trace(|| format!("write float {address} <- {value}"));
        Ok(())
    }

    /// Reads the float value of a device statistic slot.
    pub fn read_statistic(&mut self, slot: u8) -> Result<f32> {
        let register = statistic_register(slot)?;
        self.read_float(register)
    }

    /// Current pressure. Every device type publishes statistic slot 1.
    pub fn pressure(&mut self) -> Result<f32> {
        self.read_statistic(STATISTIC_PRESSURE)
    }

    /// Gas temperature at the flow body.
    pub fn flow_temperature(&mut self) -> Result<f32> {
        self.require(
            "flow temperature",
            self.device_type.is_mass_flow() || self.device_type.is_liquid(),
        )?;
        self.read_statistic(STATISTIC_FLOW_TEMPERATURE)
    }

    pub fn volumetric_flow(&mut self) -> Result<f32> {
        self.require(
            "volumetric flow",
            self.device_type.is_mass_flow() || self.device_type.is_liquid(),
        )?;
        self.read_statistic(STATISTIC_VOLUMETRIC_FLOW)
    }

    pub fn mass_flow(&mut self) -> Result<f32> {
        self.require("mass flow", self.device_type.is_mass_flow())?;
        self.read_statistic(STATISTIC_MASS_FLOW)
    }

    /// Accumulated mass. Controllers publish it one slot after meters.
    pub fn mass_total(&mut self) -> Result<f32> {
        self.require("mass total", self.device_type.is_mass_flow())?;
        let slot = if self.device_type.is_controller() {
            STATISTIC_MASS_TOTAL_CONTROLLER
        } else {
            STATISTIC_MASS_TOTAL_METER
        };
        self.read_statistic(slot)
    }

    /// Reads the commanded setpoint back from its statistic slot.
    pub fn setpoint(&mut self) -> Result<f32> {
        self.require("setpoint", self.device_type.is_controller())?;
        let slot = if self.device_type.is_mass_flow() {
            STATISTIC_SETPOINT_MASS_FLOW
        } else {
            STATISTIC_SETPOINT_PRESSURE
        };
        self.read_statistic(slot)
    }

    /// Writes the setpoint register. The value is in the device's current
    /// engineering units.
    pub fn set_setpoint(&mut self, setpoint: f32) -> Result<()> {
        self.require("set setpoint", self.device_type.is_controller())?;
        self.write_float(REG_SETPOINT, setpoint)
    }

    /// Decoded device status register.
    pub fn status_flags(&mut self) -> Result<StatusFlags> {
        let raw = self.read_register(REG_DEVICE_STATUS)?;
        let flags = StatusFlags::decode(raw);
        self.trace(|| {
            let names = flags.active();
            if names.is_empty() {
                format!("status 0x{raw:04X}")
            } else {
                format!("status 0x{raw:04X}: {}", names.join(", "))
            }
        });
        Ok(flags)
    }

    /// Index of the selected gas in the standard gas table.
    pub fn gas_number(&mut self) -> Result<u16> {
        self.require("gas number", self.device_type.is_mass_flow())?;
        self.read_register(REG_GAS_NUMBER)
    }

    /// Selects a gas by writing the gas number register directly.
    pub fn set_gas_number(&mut self, gas: u16) -> Result<()> {
        self.require("set gas number", self.device_type.is_mass_flow())?;
        check_gas_index("gas number", gas)?;
        self.write_register(REG_GAS_NUMBER, gas)
    }

    /// Reads one constituent of the staged gas mixture.
    pub fn mixture_gas(&mut self, slot: u8) -> Result<MixtureGas> {
        self.require("mixture gas", self.device_type.is_mass_flow())?;
        let registers = mixture_registers(slot)?;
        let gas = self.read_register(registers.index)?;
        let raw = self.read_register(registers.percent)?;
        Ok(MixtureGas {
            gas,
            percent: decode_gas_percent(raw),
        })
    }

    /// Stages one constituent of a gas mixture: the constituent's gas
    /// number first, then its percentage scaled by 100.
    pub fn set_mixture_gas(&mut self, slot: u8, gas: u16, percent: f32) -> Result<()> {
        self.require("set mixture gas", self.device_type.is_mass_flow())?;
        let registers = mixture_registers(slot)?;
        check_gas_index("gas index", gas)?;
        if !(0.0..=100.0).contains(&percent) {
            return Err(Error::OutOfRange {
                parameter: "gas percent",
                value: f64::from(percent),
                allowed: "0.0..=100.0",
            });
        }
        self.write_register(registers.index, gas)?;
        self.write_register(registers.percent, encode_gas_percent(percent))
    }

    pub fn set_mass_flow_units(&mut self, units: u16) -> Result<()> {
        self.require("set mass flow units", self.device_type.is_mass_flow())?;
        self.write_register(REG_MASS_FLOW_UNITS, units)
    }

    pub fn set_volumetric_flow_units(&mut self, units: u16) -> Result<()> {
        self.require(
            "set volumetric flow units",
            self.device_type.is_mass_flow() || self.device_type.is_liquid(),
        )?;
        self.write_register(REG_VOLUMETRIC_FLOW_UNITS, units)
    }

    pub fn set_analog_scale_factor(&mut self, factor: f32) -> Result<()> {
        self.write_float(REG_ANALOG_SCALE_FACTOR, factor)
    }

    /// Executes one special command handshake and classifies the returned
    /// status code.
    pub fn special_command(&mut self, command: SpecialCommand, argument: u16) -> Result<()> {
        let code = command.code();
        let status = self.command_exchange(code, argument)?;
        self.trace(|| format!("command {code} argument {argument} -> status {status}"));
        classify_status(status)?;
        Ok(())
    }

    fn command_exchange(&mut self, code: u16, argument: u16) -> Result<u16> {
        let physical = self.physical(REG_COMMAND_ID)?;
        self.transport
            .write_holding_registers(self.modbus_id, physical, &[code, argument])?;
        self.read_register(REG_COMMAND_ARGUMENT)
    }

    /// Selects a gas through the command protocol instead of the gas
    /// number register.
    pub fn change_gas_number(&mut self, gas: u16) -> Result<()> {
        self.require("change gas number", self.device_type.is_mass_flow())?;
        check_gas_index("gas number", gas)?;
        self.special_command(SpecialCommand::ChangeGasNumber, gas)
    }

    /// Saves the staged mixture slots as a custom gas at `index`; 0 lets
    /// the device assign the next free index.
    pub fn create_custom_gas_mixture(&mut self, index: u16) -> Result<()> {
        self.require("create custom gas mixture", self.device_type.is_mass_flow())?;
        if index != 0 && !(CUSTOM_MIXTURE_INDEX_MIN..=CUSTOM_MIXTURE_INDEX_MAX).contains(&index) {
            return Err(Error::OutOfRange {
                parameter: "gas mixture index",
                value: f64::from(index),
                allowed: "0 or 236..=255",
            });
        }
        self.special_command(SpecialCommand::CreateCustomGasMixture, index)
    }

    pub fn delete_custom_gas_mixture(&mut self, index: u16) -> Result<()> {
        self.require("delete custom gas mixture", self.device_type.is_mass_flow())?;
        self.special_command(SpecialCommand::DeleteCustomGasMixture, index)
    }

    /// Zeroes a measurement baseline. Which targets are legal depends on
    /// the device type.
    pub fn tare(&mut self, kind: TareKind) -> Result<()> {
        let allowed = match kind {
            TareKind::Pressure | TareKind::AbsolutePressure => {
                self.device_type.is_pressure_controller()
            }
            TareKind::Volume => self.device_type.is_mass_flow() || self.device_type.is_liquid(),
        };
        self.require("tare", allowed)?;
        self.special_command(SpecialCommand::Tare, kind.argument())
    }

    pub fn reset_totalizer(&mut self) -> Result<()> {
        self.require(
            "reset totalizer",
            self.device_type.is_mass_flow() || self.device_type.is_liquid(),
        )?;
        self.special_command(SpecialCommand::ResetTotalizer, 0)
    }

    pub fn valve(&mut self, setting: ValveSetting) -> Result<()> {
        self.require("valve setting", self.device_type.is_controller())?;
        self.special_command(SpecialCommand::ValveSetting, setting.argument())
    }

    /// Locks or unlocks the front panel.
    pub fn display_lock(&mut self, locked: bool) -> Result<()> {
        self.special_command(SpecialCommand::DisplayLock, u16::from(locked))
    }

    pub fn set_pid(&mut self, term: PidTerm, value: u16) -> Result<()> {
        self.require("set PID value", self.device_type.is_controller())?;
        self.special_command(term.set_command(), value)
    }

    /// Polls one PID coefficient. The device answers through the argument
    /// register: a recognized fault code is an error, any other word is
    /// the coefficient value.
    pub fn read_pid(&mut self, term: PidTerm) -> Result<u16> {
        self.require("read PID value", self.device_type.is_controller())?;
        let word =
            self.command_exchange(SpecialCommand::ReadPidValue.code(), term.read_argument())?;
        match classify_status(word) {
            Err(fault) if !matches!(fault, CommandFault::UnknownStatusCode(_)) => {
                Err(fault.into())
            }
            _ => Ok(word),
        }
    }

    pub fn set_control_loop(&mut self, variable: ControlLoopVariable) -> Result<()> {
        self.special_command(SpecialCommand::ChangeControlLoopVariable, variable.argument())
    }

    pub fn save_setpoint_to_memory(&mut self) -> Result<()> {
        self.require("save setpoint to memory", self.device_type.is_controller())?;
        self.special_command(SpecialCommand::SaveSetpointToMemory, 0)
    }

    pub fn set_loop_algorithm(&mut self, algorithm: LoopAlgorithm) -> Result<()> {
        self.require("set loop algorithm", self.device_type.is_controller())?;
        self.special_command(SpecialCommand::ChangeLoopAlgorithm, algorithm.argument())
    }

    pub fn valve_control_override(&mut self, value: u16) -> Result<()> {
        self.require("valve control override", self.device_type.is_controller())?;
        self.special_command(SpecialCommand::ValveControlOverride, value)
    }

    pub fn set_setpoint_source(&mut self, source: SetpointSource) -> Result<()> {
        self.require("set setpoint source", self.device_type.is_controller())?;
        self.special_command(SpecialCommand::ChangeSetpointSource, source.argument())
    }

    /// Reassigns the device's bus id. The adapter keeps addressing the old
    /// id until [`Alicat::set_modbus_id`] is called.
    pub fn change_modbus_id(&mut self, id: u16) -> Result<()> {
        self.special_command(SpecialCommand::ChangeModbusId, id)
    }

    pub fn change_serial_baud_rate(&mut self, baud: u16) -> Result<()> {
        self.special_command(SpecialCommand::ChangeSerialBaudRate, baud)
    }
}

fn check_gas_index(parameter: &'static str, gas: u16) -> Result<()> {
    if gas > GAS_INDEX_MAX {
        return Err(Error::OutOfRange {
            parameter,
            value: f64::from(gas),
            allowed: "0..=210",
        });
    }
    Ok(())
}

/// Register holding the float value of a device statistic slot.
fn statistic_register(slot: u8) -> Result<u16> {
    if !(STATISTIC_SLOT_MIN..=STATISTIC_SLOT_MAX).contains(&slot) {
        return Err(Error::OutOfRange {
            parameter: "statistic slot",
            value: f64::from(slot),
            allowed: "1..=20",
        });
    }
    Ok(REG_DEVICE_STATISTIC_1_VALUE + 2 * u16::from(slot - 1))
}

/// Register pair of a mixture constituent slot. Slots are two registers
/// apart on both the index and the percent side.
fn mixture_registers(slot: u8) -> Result<MixtureRegisters> {
    if !(MIXTURE_SLOT_MIN..=MIXTURE_SLOT_MAX).contains(&slot) {
        return Err(Error::OutOfRange {
            parameter: "mixture slot",
            value: f64::from(slot),
            allowed: "1..=5",
        });
    }
    let index = REG_MIXTURE_GAS_1_INDEX + 2 * u16::from(slot - 1);
    Ok(MixtureRegisters {
        index,
        percent: index + 1,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::{mixture_registers, statistic_register, Alicat};
    use crate::command::{
        CommandFault, LoopAlgorithm, PidTerm, SetpointSource, SpecialCommand, TareKind,
        ValveSetting,
    };
    use crate::constants::{REG_DEVICE_STATUS, REG_MASS_FLOW};
    use crate::device::DeviceType;
    use crate::error::Error;
    use crate::transport::{RegisterIo, TransportError};

    #[derive(Default)]
    struct Recording {
        reads: Vec<(u16, u16)>,
        writes: Vec<(u16, Vec<u16>)>,
        replies: VecDeque<Vec<u16>>,
    }

    impl Recording {
        fn exchanges(&self) -> usize {
            self.reads.len() + self.writes.len()
        }
    }

    impl RegisterIo for Recording {
        fn read_holding_registers(
            &mut self,
            _device: u8,
            start: u16,
            count: u16,
        ) -> Result<Vec<u16>, TransportError> {
            self.reads.push((start, count));
            Ok(self
                .replies
                .pop_front()
                .unwrap_or_else(|| vec![0; count as usize]))
        }

        fn write_holding_registers(
            &mut self,
            _device: u8,
            start: u16,
            values: &[u16],
        ) -> Result<(), TransportError> {
            self.writes.push((start, values.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn statistic_slots_are_two_registers_apart() {
        assert_eq!(
            statistic_register(1).expect("slot 1 should resolve"),
            1203
        );
        assert_eq!(
            statistic_register(4).expect("slot 4 should resolve"),
            REG_MASS_FLOW
        );
        assert_eq!(
            statistic_register(20).expect("slot 20 should resolve"),
            1241
        );
        assert!(statistic_register(0).is_err());
        assert!(statistic_register(21).is_err());
    }

    #[test]
    fn mixture_slot_three_resolves_to_1054_and_1055() {
        let registers = mixture_registers(3).expect("slot 3 should resolve");
        assert_eq!(registers.index, 1054);
        assert_eq!(registers.percent, 1055);

        let first = mixture_registers(1).expect("slot 1 should resolve");
        assert_eq!(first.index, 1050);
        assert_eq!(first.percent, 1051);

        assert!(mixture_registers(0).is_err());
        assert!(mixture_registers(6).is_err());
    }

    #[test]
    fn default_offset_shifts_reads_down_by_one() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowMeter);
        client
            .read_register(REG_DEVICE_STATUS)
            .expect("status read should succeed");
        assert_eq!(transport.reads, vec![(1200, 1)]);
    }

    #[test]
    fn zero_offset_reads_the_documented_address() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowMeter);
        client.set_register_offset(0);
        client
            .read_register(REG_DEVICE_STATUS)
            .expect("status read should succeed");
        assert_eq!(transport.reads, vec![(1201, 1)]);
    }

    #[test]
    fn unaddressable_offset_result_fails_without_traffic() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowMeter);
        let err = client.read_register(0).expect_err("address -1 cannot frame");
        assert!(matches!(
            err,
            Error::Transport(TransportError::InvalidAddress(-1))
        ));
        assert_eq!(transport.exchanges(), 0);
    }

    #[test]
    fn offset_beyond_the_register_space_fails_without_traffic() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowMeter);
        client.set_register_offset(i32::MAX);
        let err = client
            .read_register(1)
            .expect_err("address past u16::MAX cannot frame");
        assert!(matches!(
            err,
            Error::Transport(TransportError::InvalidAddress(2_147_483_648))
        ));
        assert_eq!(transport.exchanges(), 0);
    }

    #[test]
    fn capability_gates_reject_before_any_traffic() {
        let cases: [(DeviceType, fn(&mut Alicat<&mut Recording>) -> bool); 27] = [
            (DeviceType::GaugePressureController, |client| {
                client.mass_flow().is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.mass_total().is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.gas_number().is_err()
            }),
            (DeviceType::PsidController, |client| {
                client.set_gas_number(8).is_err()
            }),
            (DeviceType::GaugePressureController, |client| {
                client.mixture_gas(1).is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.set_mixture_gas(1, 7, 50.0).is_err()
            }),
            (DeviceType::PsidController, |client| {
                client.set_mass_flow_units(5).is_err()
            }),
            (DeviceType::GaugePressureController, |client| {
                client.change_gas_number(7).is_err()
            }),
            (DeviceType::PsidController, |client| {
                client.create_custom_gas_mixture(0).is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.delete_custom_gas_mixture(240).is_err()
            }),
            (DeviceType::GaugePressureController, |client| {
                client.flow_temperature().is_err()
            }),
            (DeviceType::PsidController, |client| {
                client.volumetric_flow().is_err()
            }),
            (DeviceType::GaugePressureController, |client| {
                client.set_volumetric_flow_units(7).is_err()
            }),
            (DeviceType::PsidController, |client| {
                client.reset_totalizer().is_err()
            }),
            (DeviceType::MassFlowMeter, |client| {
                client.setpoint().is_err()
            }),
            (DeviceType::MassFlowMeter, |client| {
                client.set_setpoint(1.0).is_err()
            }),
            (DeviceType::MassFlowMeter, |client| {
                client.valve(ValveSetting::HoldClosed).is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.valve(ValveSetting::Exhaust).is_err()
            }),
            (DeviceType::MassFlowMeter, |client| {
                client.set_pid(PidTerm::Proportional, 200).is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.read_pid(PidTerm::Integral).is_err()
            }),
            (DeviceType::MassFlowMeter, |client| {
                client.save_setpoint_to_memory().is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.set_loop_algorithm(LoopAlgorithm::Pd).is_err()
            }),
            (DeviceType::MassFlowMeter, |client| {
                client.valve_control_override(0).is_err()
            }),
            (DeviceType::LiquidController, |client| {
                client.set_setpoint_source(SetpointSource::Digital).is_err()
            }),
            (DeviceType::PsidController, |client| {
                client.tare(TareKind::Volume).is_err()
            }),
            (DeviceType::MassFlowController, |client| {
                client.tare(TareKind::Pressure).is_err()
            }),
            (DeviceType::MassFlowMeter, |client| {
                client.tare(TareKind::AbsolutePressure).is_err()
            }),
        ];
        for (device_type, operation) in cases {
            let mut transport = Recording::default();
            let mut client = Alicat::new(&mut transport, 1, device_type);
            assert!(operation(&mut client), "{device_type} should reject");
            assert_eq!(transport.exchanges(), 0, "{device_type} sent traffic");
        }
    }

    #[test]
    fn liquid_controller_has_no_setpoint_access() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::LiquidController);
        assert!(matches!(
            client.setpoint(),
            Err(Error::Unsupported { operation: "setpoint", .. })
        ));
        assert_eq!(transport.exchanges(), 0);
    }

    #[test]
    fn out_of_range_arguments_reject_before_any_traffic() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);

        assert!(matches!(
            client.set_gas_number(300),
            Err(Error::OutOfRange { parameter: "gas number", .. })
        ));
        assert!(matches!(
            client.set_mixture_gas(6, 7, 50.0),
            Err(Error::OutOfRange { parameter: "mixture slot", .. })
        ));
        assert!(matches!(
            client.set_mixture_gas(1, 7, 120.0),
            Err(Error::OutOfRange { parameter: "gas percent", .. })
        ));
        assert!(matches!(
            client.create_custom_gas_mixture(100),
            Err(Error::OutOfRange { parameter: "gas mixture index", .. })
        ));
        assert!(matches!(
            client.read_statistic(21),
            Err(Error::OutOfRange { parameter: "statistic slot", .. })
        ));
        assert_eq!(transport.exchanges(), 0);
    }

    #[test]
    fn custom_mixture_index_zero_and_reserved_band_are_accepted() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        client
            .create_custom_gas_mixture(0)
            .expect("auto-assign index should pass validation");
        client
            .create_custom_gas_mixture(240)
            .expect("reserved band index should pass validation");
        assert_eq!(transport.writes.len(), 2);
    }

    #[test]
    fn setpoint_write_is_one_float_block() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        client
            .set_setpoint(2.5)
            .expect("setpoint write should succeed");
        // 2.5f32 is 0x40200000; logical 1010 lands at 1009
        assert_eq!(transport.writes, vec![(1009, vec![0x4020, 0x0000])]);
    }

    #[test]
    fn setpoint_readback_uses_the_per_type_statistic_slot() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        client.setpoint().expect("setpoint read should succeed");
        // mass-flow controllers publish the setpoint in slot 5: 1211 - 1
        assert_eq!(transport.reads, vec![(1210, 2)]);

        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::GaugePressureController);
        client.setpoint().expect("setpoint read should succeed");
        // pressure controllers publish it in slot 2: 1205 - 1
        assert_eq!(transport.reads, vec![(1204, 2)]);
    }

    #[test]
    fn mass_total_slot_depends_on_controller_capability() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        client.mass_total().expect("mass total should succeed");
        assert_eq!(transport.reads, vec![(1212, 2)]);

        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowMeter);
        client.mass_total().expect("mass total should succeed");
        assert_eq!(transport.reads, vec![(1210, 2)]);
    }

    #[test]
    fn special_command_writes_the_pair_then_polls_the_argument() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        client
            .display_lock(true)
            .expect("display lock should succeed");
        assert_eq!(transport.writes, vec![(999, vec![7, 1])]);
        assert_eq!(transport.reads, vec![(1000, 1)]);
    }

    #[test]
    fn fault_status_maps_to_a_command_error() {
        let mut transport = Recording::default();
        transport.replies.push_back(vec![32772]);
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        let err = client
            .special_command(SpecialCommand::CreateCustomGasMixture, 300)
            .expect_err("fault code should surface");
        assert!(matches!(
            err,
            Error::Command(CommandFault::InvalidGasMixIndex)
        ));
    }

    #[test]
    fn read_pid_returns_the_polled_word_as_the_value() {
        let mut transport = Recording::default();
        transport.replies.push_back(vec![150]);
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        let value = client
            .read_pid(PidTerm::Proportional)
            .expect("poll should succeed");
        assert_eq!(value, 150);
        assert_eq!(transport.writes, vec![(999, vec![14, 0])]);
    }

    #[test]
    fn read_pid_zero_is_a_value_not_a_status() {
        let mut transport = Recording::default();
        transport.replies.push_back(vec![0]);
        let mut client = Alicat::new(&mut transport, 1, DeviceType::PsidController);
        let value = client
            .read_pid(PidTerm::Integral)
            .expect("poll should succeed");
        assert_eq!(value, 0);
    }

    #[test]
    fn read_pid_surfaces_recognized_fault_codes() {
        let mut transport = Recording::default();
        transport.replies.push_back(vec![32770]);
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        let err = client
            .read_pid(PidTerm::Derivative)
            .expect_err("fault should surface");
        assert!(matches!(err, Error::Command(CommandFault::InvalidSetting)));
    }

    #[test]
    fn mixture_write_order_is_index_then_percent() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowController);
        client
            .set_mixture_gas(3, 7, 25.5)
            .expect("mixture write should succeed");
        assert_eq!(
            transport.writes,
            vec![(1053, vec![7]), (1054, vec![2550])]
        );
    }

    #[test]
    fn gas_number_register_access_honors_the_offset() {
        let mut transport = Recording::default();
        transport.replies.push_back(vec![7]);
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowMeter);
        let gas = client.gas_number().expect("gas number should read");
        assert_eq!(gas, 7);
        assert_eq!(transport.reads, vec![(1199, 1)]);
    }

    #[test]
    fn verbose_traces_reach_the_sink() {
        let mut transport = Recording::default();
        let mut client = Alicat::new(&mut transport, 1, DeviceType::MassFlowMeter);
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink_log = std::sync::Arc::clone(&seen);
        client.set_diagnostics(move |message: &str| {
            if let Ok(mut log) = sink_log.lock() {
                log.push(message.to_owned());
            }
        });
        client.set_verbose(true);
        client
            .read_register(REG_DEVICE_STATUS)
            .expect("read should succeed");
        client.set_verbose(false);
        client
            .read_register(REG_DEVICE_STATUS)
            .expect("read should succeed");
        let log = seen.lock().expect("log mutex should not be poisoned");
        assert_eq!(log.len(), 1, "only the verbose read should trace");
        assert!(log[0].contains("1201"), "{}", log[0]);
    }
}
