//! In-memory instrument for tests and the monitor's simulation mode.
//!
//! The simulator keeps a holding-register bank keyed by wire addresses and
//! applies the same register offset quirk as real hardware. Writes to the
//! command block run a device-side command engine that answers through the
//! argument register, mirroring how the instruments acknowledge commands.

use std::collections::HashMap;

use crate::codec::{decode_f32, encode_f32};
use crate::command::{
    SpecialCommand, STATUS_CODE_INVALID_COMMAND_ID, STATUS_CODE_INVALID_GAS_MIX_INDEX,
    STATUS_CODE_INVALID_SETTING, STATUS_CODE_SUCCESS, STATUS_CODE_UNSUPPORTED_FEATURE,
};
use crate::constants::{
    CUSTOM_MIXTURE_INDEX_MAX, CUSTOM_MIXTURE_INDEX_MIN, DEFAULT_REGISTER_OFFSET, GAS_INDEX_MAX,
    REG_COMMAND_ARGUMENT, REG_COMMAND_ID, REG_DEVICE_STATISTIC_1_VALUE, REG_DEVICE_STATUS,
    REG_GAS_NUMBER, REG_SETPOINT, STATISTIC_FLOW_TEMPERATURE, STATISTIC_MASS_FLOW,
    STATISTIC_MASS_TOTAL_CONTROLLER, STATISTIC_MASS_TOTAL_METER, STATISTIC_PRESSURE,
    STATISTIC_SETPOINT_MASS_FLOW, STATISTIC_SETPOINT_PRESSURE, STATISTIC_VOLUMETRIC_FLOW,
};
use crate::device::DeviceType;
use crate::transport::{RegisterIo, TransportError};

pub struct SimDevice {
    modbus_id: u8,
    device_type: DeviceType,
    register_offset: i32,
    bank: HashMap<u16, u16>,
    pid: [u16; 3],
    dynamics: bool,
    pending_modbus_id: Option<u8>,
}

impl SimDevice {
    /// Instrument answering at `modbus_id`, with the default register
    /// offset.
    pub fn new(modbus_id: u8, device_type: DeviceType) -> Self {
        Self::with_register_offset(modbus_id, device_type, DEFAULT_REGISTER_OFFSET)
    }

    pub fn with_register_offset(
        modbus_id: u8,
        device_type: DeviceType,
        register_offset: i32,
    ) -> Self {
        let mut sim = Self {
            modbus_id,
            device_type,
            register_offset,
            bank: HashMap::new(),
            pid: [200, 0, 0],
            dynamics: false,
            pending_modbus_id: None,
        };
        sim.seed();
        sim
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    /// Enables the first-order flow response. One status poll advances the
    /// model by one step.
    pub fn enable_dynamics(&mut self) {
        self.dynamics = true;
    }

    /// Raw register at a wire address.
    pub fn register(&self, physical: u16) -> u16 {
        self.bank.get(&physical).copied().unwrap_or(0)
    }

    pub fn set_register(&mut self, physical: u16, value: u16) {
        self.bank.insert(physical, value);
    }

    /// Float value of a statistic slot.
    pub fn statistic(&self, slot: u8) -> f32 {
        self.float_logical(statistic_value_register(slot))
    }

    /// Seeds the float value of a statistic slot.
    pub fn set_statistic(&mut self, slot: u8, value: f32) {
        self.write_float_logical(statistic_value_register(slot), value);
    }

    pub fn set_status(&mut self, raw: u16) {
        let physical = self.physical(REG_DEVICE_STATUS);
        self.bank.insert(physical, raw);
    }

    fn seed(&mut self) {
        // idle instrument at one atmosphere
        self.set_statistic(STATISTIC_PRESSURE, 14.696);
        if self.device_type.is_mass_flow() || self.device_type.is_liquid() {
            self.set_statistic(STATISTIC_FLOW_TEMPERATURE, 21.0);
            self.set_statistic(STATISTIC_VOLUMETRIC_FLOW, 0.0);
        }
        if self.device_type.is_mass_flow() {
            self.set_statistic(STATISTIC_MASS_FLOW, 0.0);
            let gas_register = self.physical(REG_GAS_NUMBER);
            self.bank.insert(gas_register, 0);
        }
    }

    fn physical(&self, logical: u16) -> u16 {
        let resolved = i64::from(logical) + i64::from(self.register_offset);
        u16::try_from(resolved).unwrap_or(u16::MAX)
    }

    fn float_logical(&self, logical: u16) -> f32 {
        let physical = self.physical(logical);
        decode_f32([
            self.register(physical),
            self.register(physical.wrapping_add(1)),
        ])
    }

    fn write_float_logical(&mut self, logical: u16, value: f32) {
        let physical = self.physical(logical);
        let [high, low] = encode_f32(value);
        self.bank.insert(physical, high);
        self.bank.insert(physical.wrapping_add(1), low);
    }

    fn setpoint_slot(&self) -> u8 {
        if self.device_type.is_mass_flow() {
            STATISTIC_SETPOINT_MASS_FLOW
        } else {
            STATISTIC_SETPOINT_PRESSURE
        }
    }

    fn mass_total_slot(&self) -> u8 {
        if self.device_type.is_controller() {
            STATISTIC_MASS_TOTAL_CONTROLLER
        } else {
            STATISTIC_MASS_TOTAL_METER
        }
    }

    /// One step of the flow model: the controlled variable approaches the
    /// setpoint, the totalizer accumulates while gas moves.
    fn step(&mut self) {
        if !self.device_type.is_controller() {
            return;
        }
        let target = self.statistic(self.setpoint_slot());
        if self.device_type.is_mass_flow() {
            let flow = self.statistic(STATISTIC_MASS_FLOW);
            let next = flow + (target - flow) * 0.2;
            self.set_statistic(STATISTIC_MASS_FLOW, next);
            self.set_statistic(STATISTIC_VOLUMETRIC_FLOW, next * 1.05);
            let total_slot = self.mass_total_slot();
            let total = self.statistic(total_slot);
            self.set_statistic(total_slot, total + next * 0.01);
        } else {
            let pressure = self.statistic(STATISTIC_PRESSURE);
            self.set_statistic(STATISTIC_PRESSURE, pressure + (target - pressure) * 0.2);
        }
    }

    fn execute_command(&mut self, code: u16, argument: u16) {
        let status = self.run_command(code, argument);
        let physical = self.physical(REG_COMMAND_ARGUMENT);
        self.bank.insert(physical, status);
    }

    fn run_command(&mut self, code: u16, argument: u16) -> u16 {
        const CHANGE_GAS_NUMBER: u16 = SpecialCommand::ChangeGasNumber.code();
        const CREATE_MIXTURE: u16 = SpecialCommand::CreateCustomGasMixture.code();
        const DELETE_MIXTURE: u16 = SpecialCommand::DeleteCustomGasMixture.code();
        const TARE: u16 = SpecialCommand::Tare.code();
        const RESET_TOTALIZER: u16 = SpecialCommand::ResetTotalizer.code();
        const VALVE_SETTING: u16 = SpecialCommand::ValveSetting.code();
        const DISPLAY_LOCK: u16 = SpecialCommand::DisplayLock.code();
        const SET_P: u16 = SpecialCommand::ChangeProportionalGain.code();
        const SET_D: u16 = SpecialCommand::ChangeDerivativeGain.code();
        const SET_I: u16 = SpecialCommand::ChangeIntegralGain.code();
        const CONTROL_LOOP: u16 = SpecialCommand::ChangeControlLoopVariable.code();
        const SAVE_SETPOINT: u16 = SpecialCommand::SaveSetpointToMemory.code();
        const LOOP_ALGORITHM: u16 = SpecialCommand::ChangeLoopAlgorithm.code();
        const READ_PID: u16 = SpecialCommand::ReadPidValue.code();
        const VALVE_OVERRIDE: u16 = SpecialCommand::ValveControlOverride.code();
        const SETPOINT_SOURCE: u16 = SpecialCommand::ChangeSetpointSource.code();
        const CHANGE_MODBUS_ID: u16 = SpecialCommand::ChangeModbusId.code();
        const CHANGE_BAUD: u16 = SpecialCommand::ChangeSerialBaudRate.code();

        match code {
            CHANGE_GAS_NUMBER => {
                if !self.device_type.is_mass_flow() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if argument > GAS_INDEX_MAX {
                    return STATUS_CODE_INVALID_SETTING;
                }
                let register = self.physical(REG_GAS_NUMBER);
                self.bank.insert(register, argument);
                STATUS_CODE_SUCCESS
            }
            CREATE_MIXTURE => {
                if !self.device_type.is_mass_flow() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if argument != 0
                    && !(CUSTOM_MIXTURE_INDEX_MIN..=CUSTOM_MIXTURE_INDEX_MAX).contains(&argument)
                {
                    return STATUS_CODE_INVALID_GAS_MIX_INDEX;
                }
                STATUS_CODE_SUCCESS
            }
            DELETE_MIXTURE => {
                if !self.device_type.is_mass_flow() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if !(CUSTOM_MIXTURE_INDEX_MIN..=CUSTOM_MIXTURE_INDEX_MAX).contains(&argument) {
                    return STATUS_CODE_INVALID_GAS_MIX_INDEX;
                }
                STATUS_CODE_SUCCESS
            }
            TARE => match argument {
                0 | 1 if self.device_type.is_pressure_controller() => {
                    self.set_statistic(STATISTIC_PRESSURE, 0.0);
                    STATUS_CODE_SUCCESS
                }
                2 if self.device_type.is_mass_flow() || self.device_type.is_liquid() => {
                    self.set_statistic(STATISTIC_VOLUMETRIC_FLOW, 0.0);
                    STATUS_CODE_SUCCESS
                }
                _ => STATUS_CODE_INVALID_SETTING,
            },
            RESET_TOTALIZER => {
                if !self.device_type.is_mass_flow() && !self.device_type.is_liquid() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if self.device_type.is_mass_flow() {
                    let slot = self.mass_total_slot();
                    self.set_statistic(slot, 0.0);
                }
                STATUS_CODE_SUCCESS
            }
            VALVE_SETTING => {
                if !self.device_type.is_controller() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if argument > 3 {
                    return STATUS_CODE_INVALID_SETTING;
                }
                STATUS_CODE_SUCCESS
            }
            DISPLAY_LOCK => {
                if argument > 1 {
                    return STATUS_CODE_INVALID_SETTING;
                }
                STATUS_CODE_SUCCESS
            }
            SET_P | SET_D | SET_I => {
                if !self.device_type.is_controller() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                self.pid[usize::from(code - SET_P)] = argument;
                STATUS_CODE_SUCCESS
            }
            CONTROL_LOOP => {
                if argument > 4 {
                    return STATUS_CODE_INVALID_SETTING;
                }
                STATUS_CODE_SUCCESS
            }
            SAVE_SETPOINT | VALVE_OVERRIDE => {
                if !self.device_type.is_controller() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                STATUS_CODE_SUCCESS
            }
            LOOP_ALGORITHM => {
                if !self.device_type.is_controller() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if argument != 1 && argument != 2 {
                    return STATUS_CODE_INVALID_SETTING;
                }
                STATUS_CODE_SUCCESS
            }
            READ_PID => {
                if !self.device_type.is_controller() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if argument > 2 {
                    return STATUS_CODE_INVALID_SETTING;
                }
                self.pid[usize::from(argument)]
            }
            SETPOINT_SOURCE => {
                if !self.device_type.is_controller() {
                    return STATUS_CODE_UNSUPPORTED_FEATURE;
                }
                if argument > 1 {
                    return STATUS_CODE_INVALID_SETTING;
                }
                STATUS_CODE_SUCCESS
            }
            CHANGE_MODBUS_ID => match u8::try_from(argument) {
                Ok(id) if (1..=247).contains(&id) => {
                    // takes effect after the acknowledgement poll
                    self.pending_modbus_id = Some(id);
                    STATUS_CODE_SUCCESS
                }
                _ => STATUS_CODE_INVALID_SETTING,
            },
            CHANGE_BAUD => STATUS_CODE_SUCCESS,
            _ => STATUS_CODE_INVALID_COMMAND_ID,
        }
    }

    fn after_write(&mut self, start: u16, values: &[u16]) {
        if start == self.physical(REG_COMMAND_ID) && values.len() == 2 {
            self.execute_command(values[0], values[1]);
        }
        if start == self.physical(REG_SETPOINT)
            && values.len() == 2
            && self.device_type.is_controller()
        {
            let setpoint = decode_f32([values[0], values[1]]);
            let slot = self.setpoint_slot();
            self.set_statistic(slot, setpoint);
        }
    }

    fn check_device(&self, device: u8) -> Result<(), TransportError> {
        if device == self.modbus_id {
            Ok(())
        } else {
            // nothing on the bus answers, the master gives up waiting
            Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::TimedOut,
            )))
        }
    }
}

impl RegisterIo for SimDevice {
    fn read_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        self.check_device(device)?;
        let status_register = self.physical(REG_DEVICE_STATUS);
        let covers_status = start <= status_register
            && u32::from(status_register) < u32::from(start) + u32::from(count);
        if self.dynamics && covers_status {
            self.step();
        }
        let mut words = Vec::with_capacity(usize::from(count));
        let mut address = start;
        for _ in 0..count {
            words.push(self.register(address));
            address = address.wrapping_add(1);
        }
        if let Some(id) = self.pending_modbus_id.take() {
            self.modbus_id = id;
        }
        Ok(words)
    }

    fn write_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        values: &[u16],
    ) -> Result<(), TransportError> {
        self.check_device(device)?;
        if values.is_empty() {
            return Err(TransportError::Frame("empty write".into()));
        }
        let mut address = start;
        for value in values {
            self.bank.insert(address, *value);
            address = address.wrapping_add(1);
        }
        self.after_write(start, values);
        Ok(())
    }
}

fn statistic_value_register(slot: u8) -> u16 {
    REG_DEVICE_STATISTIC_1_VALUE + 2 * u16::from(slot.saturating_sub(1))
}
