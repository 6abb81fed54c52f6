//! Alicat Modbus RTU register map and wire constants.
//!
//! Addresses are logical; every access goes through the client's register
//! offset first (most firmware revisions shift the map by -1). Values are
//! taken from the Alicat Modbus RTU manual and must match the device
//! firmware exactly.

/// Special command id, paired with [`REG_COMMAND_ARGUMENT`]. Read/write, all devices.
pub const REG_COMMAND_ID: u16 = 1000;
/// Special command argument; reused by the device as the command status register.
pub const REG_COMMAND_ARGUMENT: u16 = 1001;
/// Setpoint as a float pair. Write, controllers. The MPL manual says R/W but
/// reads only work through the statistic slots.
pub const REG_SETPOINT: u16 = 1010;
pub const REG_SETPOINT_2: u16 = 1012;
pub const REG_BATCH_SIZE: u16 = 1015;
pub const REG_DIRECT_VALVE_DRIVE: u16 = 1018;
/// First mixture slot's gas index. Slot n lives at `+ 2*(n-1)`, mass-flow devices.
pub const REG_MIXTURE_GAS_1_INDEX: u16 = 1050;
/// First mixture slot's gas percent (100x fixed point), at index register + 1.
pub const REG_MIXTURE_GAS_1_PERCENT: u16 = 1051;
pub const REG_EXP_FILTER_ALPHA_GAIN: u16 = 1110;
pub const REG_STP_DENSITY: u16 = 1112;
pub const REG_PROPORTIONAL_GAIN: u16 = 1120;
pub const REG_INTEGRAL_GAIN: u16 = 1122;
pub const REG_DERIVATIVE_GAIN: u16 = 1124;
pub const REG_VALVE_OFFSET: u16 = 1126;
pub const REG_POWER_UP_SETPOINT: u16 = 1128;
pub const REG_MASS_FLOW_UNITS: u16 = 1134;
pub const REG_VOLUMETRIC_FLOW_UNITS: u16 = 1135;
pub const REG_TOTALIZER_SELECT: u16 = 1137;
pub const REG_TOTALIZER_UNITS: u16 = 1138;
pub const REG_STP_TEMP: u16 = 1139;
/// Gas select address printed in the MPL manual. The RTU manual (and shipped
/// firmware) use [`REG_GAS_NUMBER`] instead; kept for the record, used by nothing.
pub const REG_GAS_NUMBER_MPL: u16 = 1141;
pub const REG_ANALOG_SCALE_FACTOR: u16 = 1142;
pub const REG_STP_VOLUMETRIC_FLOW_UNITS: u16 = 1144;
/// Gas table select. Read/write, mass-flow devices.
pub const REG_GAS_NUMBER: u16 = 1200;
/// Status bitmask, decoded by [`crate::status::StatusFlags`]. Read, all devices.
pub const REG_DEVICE_STATUS: u16 = 1201;
/// First statistic slot's value (float pair). Slot n lives at `+ 2*(n-1)`.
pub const REG_DEVICE_STATISTIC_1_VALUE: u16 = 1203;
pub const REG_MASS_FLOW: u16 = 1209;

/// Temperature overflow (TOV), mass-flow and liquid devices.
pub const STATUS_BIT_TEMPERATURE_OVERFLOW: u16 = 0x0001;
/// Temperature underflow (TOV), mass-flow and liquid devices.
pub const STATUS_BIT_TEMPERATURE_UNDERFLOW: u16 = 0x0002;
/// Volumetric overflow (VOV), mass-flow and liquid devices.
pub const STATUS_BIT_VOLUMETRIC_OVERFLOW: u16 = 0x0004;
/// Volumetric underflow (VOV), mass-flow devices.
pub const STATUS_BIT_VOLUMETRIC_UNDERFLOW: u16 = 0x0008;
/// Mass overflow (MOV), mass-flow devices.
pub const STATUS_BIT_MASS_OVERFLOW: u16 = 0x0010;
/// Mass underflow (MOV), mass-flow devices.
pub const STATUS_BIT_MASS_UNDERFLOW: u16 = 0x0020;
/// Pressure overflow (POV), all devices.
pub const STATUS_BIT_PRESSURE_OVERFLOW: u16 = 0x0040;
/// Totalizer overflow (OVR), mass-flow and liquid devices.
pub const STATUS_BIT_TOTALIZER_OVERFLOW: u16 = 0x0080;
/// PID loop in hold (HLD), controllers.
pub const STATUS_BIT_PID_LOOP_IN_HOLD: u16 = 0x0100;
/// ADC error (ADC), all devices.
pub const STATUS_BIT_ADC_ERROR: u16 = 0x0200;
/// PID exhaust (EXH), dual-valve controllers.
pub const STATUS_BIT_PID_EXHAUST: u16 = 0x0400;
/// Over pressure limit (OPL), custom OPL devices.
pub const STATUS_BIT_OVER_PRESSURE_LIMIT: u16 = 0x0800;
/// Flow overflow during totalize (TMF), mass-flow and liquid devices.
pub const STATUS_BIT_FLOW_OVERFLOW_DURING_TOTALIZE: u16 = 0x1000;
/// Measurement was aborted, all devices.
pub const STATUS_BIT_MEASUREMENT_ABORTED: u16 = 0x2000;

/// Statistic slot carrying pressure, every device type.
pub const STATISTIC_PRESSURE: u8 = 1;
/// Statistic slot carrying flow temperature on mass-flow and liquid devices,
/// and the setpoint readback on pressure controllers.
pub const STATISTIC_FLOW_TEMPERATURE: u8 = 2;
pub const STATISTIC_SETPOINT_PRESSURE: u8 = 2;
pub const STATISTIC_VOLUMETRIC_FLOW: u8 = 3;
pub const STATISTIC_MASS_FLOW: u8 = 4;
/// Setpoint readback slot on mass-flow controllers; mass total on meters.
pub const STATISTIC_SETPOINT_MASS_FLOW: u8 = 5;
pub const STATISTIC_MASS_TOTAL_METER: u8 = 5;
pub const STATISTIC_MASS_TOTAL_CONTROLLER: u8 = 6;

pub const STATISTIC_SLOT_MIN: u8 = 1;
pub const STATISTIC_SLOT_MAX: u8 = 20;

pub const MIXTURE_SLOT_MIN: u8 = 1;
pub const MIXTURE_SLOT_MAX: u8 = 5;

/// Gas table indices run 0..=210; everything above is reserved or custom-mix space.
pub const GAS_INDEX_MAX: u16 = 210;
/// Custom gas mixtures occupy table slots 236..=255; 0 asks the device to pick one.
pub const CUSTOM_MIXTURE_INDEX_MIN: u16 = 236;
pub const CUSTOM_MIXTURE_INDEX_MAX: u16 = 255;

/// Register offset most firmware expects (the Modbus "off by one" convention).
pub const DEFAULT_REGISTER_OFFSET: i32 = -1;

pub const MASS_FLOW_UNIT_LB_PER_MINUTE: u16 = 26;
pub const MASS_FLOW_UNIT_LB_PER_HOUR: u16 = 25;
pub const MASS_FLOW_UNIT_OZ_PER_SECOND: u16 = 23;
pub const MASS_FLOW_UNIT_OZ_PER_MINUTE: u16 = 20;
pub const MASS_FLOW_UNIT_MG_PER_SECOND: u16 = 17;
pub const MASS_FLOW_UNIT_MG_PER_MINUTE: u16 = 14;
pub const MASS_FLOW_UNIT_KG_PER_SECOND: u16 = 11;
pub const MASS_FLOW_UNIT_KG_PER_MINUTE: u16 = 8;
pub const MASS_FLOW_UNIT_G_PER_SECOND: u16 = 5;
pub const MASS_FLOW_UNIT_G_PER_MINUTE: u16 = 2;
pub const MASS_FLOW_UNIT_G_PER_HOUR: u16 = 0;

pub const VOLUMETRIC_FLOW_UNIT_ML_PER_SECOND: u16 = 29;
pub const VOLUMETRIC_FLOW_UNIT_L_PER_SECOND: u16 = 28;
pub const VOLUMETRIC_FLOW_UNIT_L_PER_MINUTE: u16 = 27;
pub const VOLUMETRIC_FLOW_UNIT_L_PER_HOUR: u16 = 0;
pub const VOLUMETRIC_FLOW_UNIT_GL_PER_MINUTE: u16 = 25;
pub const VOLUMETRIC_FLOW_UNIT_GL_PER_HOUR: u16 = 24;
pub const VOLUMETRIC_FLOW_UNIT_CM3_PER_SECOND: u16 = 9;
pub const VOLUMETRIC_FLOW_UNIT_CM3_PER_MINUTE: u16 = 8;
pub const VOLUMETRIC_FLOW_UNIT_CM3_PER_HOUR: u16 = 7;
pub const VOLUMETRIC_FLOW_UNIT_M3_PER_MINUTE: u16 = 16;
pub const VOLUMETRIC_FLOW_UNIT_M3_PER_HOUR: u16 = 15;
pub const VOLUMETRIC_FLOW_UNIT_M3_PER_DAY: u16 = 14;
pub const VOLUMETRIC_FLOW_UNIT_IN3_PER_MINUTE: u16 = 12;
pub const VOLUMETRIC_FLOW_UNIT_FT3_PER_MINUTE: u16 = 10;

// Totalizer unit codes overlap between the mass and volume tables; which one
// applies depends on the totalizer select register.
pub const TOTALIZER_UNIT_G: u16 = 0;
pub const TOTALIZER_UNIT_L: u16 = 0;
pub const TOTALIZER_UNIT_USTON: u16 = 27;
pub const TOTALIZER_UNIT_GALLON: u16 = 27;
pub const TOTALIZER_UNIT_MG: u16 = 11;
pub const TOTALIZER_UNIT_CM3: u16 = 11;
pub const TOTALIZER_UNIT_LB: u16 = 16;
pub const TOTALIZER_UNIT_M3: u16 = 16;
pub const TOTALIZER_UNIT_KG: u16 = 10;
pub const TOTALIZER_UNIT_OZ: u16 = 12;
pub const TOTALIZER_UNIT_IN3: u16 = 14;
pub const TOTALIZER_UNIT_FT3: u16 = 13;
pub const TOTALIZER_UNIT_ML: u16 = 34;
pub const TOTALIZER_UNIT_UL: u16 = 33;
