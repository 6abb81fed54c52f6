use std::collections::VecDeque;

use alicat_rtu::DeviceType;

use crate::worker::TelemetrySnapshot;

const HISTORY_DEPTH: usize = 120;
const DIAGNOSTIC_DEPTH: usize = 50;
pub const SETPOINT_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Setpoint,
    GasNumber,
}

#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppState {
    pub device_type: DeviceType,
    pub telemetry: Option<TelemetrySnapshot>,
    pub connected: bool,
    pub process_history: VecDeque<(f64, f64)>,
    pub setpoint_history: VecDeque<(f64, f64)>,
    pub pressure_history: VecDeque<(f64, f64)>,
    pub diagnostics: VecDeque<String>,
    pub setpoint_target: f32,
    pub tick: u32,
    pub should_quit: bool,
    pub simulate: bool,
    pub read_only: bool,
    pub show_diagnostics: bool,
    pub input_field: Option<InputField>,
    pub input_buffer: String,
}

impl AppState {
    pub fn new(device_type: DeviceType, simulate: bool, read_only: bool) -> Self {
        Self {
            device_type,
            telemetry: None,
            connected: false,
            process_history: VecDeque::with_capacity(HISTORY_DEPTH),
            setpoint_history: VecDeque::with_capacity(HISTORY_DEPTH),
            pressure_history: VecDeque::with_capacity(HISTORY_DEPTH),
            diagnostics: VecDeque::with_capacity(DIAGNOSTIC_DEPTH),
            setpoint_target: 0.0,
            tick: 0,
            should_quit: false,
            simulate,
            read_only,
            show_diagnostics: false,
            input_field: None,
            input_buffer: String::new(),
        }
    }

    /// Label of the main chart variable.
    pub fn process_label(&self) -> &'static str {
        if self.device_type.is_mass_flow() {
            "Mass Flow"
        } else if self.device_type.is_liquid() {
            "Volumetric Flow"
        } else {
            "Pressure"
        }
    }

    /// The pressure pane only makes sense when pressure is not already
    /// the main chart.
    pub fn shows_pressure_chart(&self) -> bool {
        self.device_type.is_mass_flow() || self.device_type.is_liquid()
    }

    pub fn current_process_value(&self) -> Option<f32> {
        self.telemetry
            .as_ref()
            .map(|telemetry| Self::process_value(telemetry, self.device_type))
    }

    pub fn update_telemetry(&mut self, telemetry: TelemetrySnapshot) {
        if let Some(setpoint) = telemetry.setpoint {
            self.setpoint_target = setpoint;
        }
        self.connected = true;
        self.push_history(&telemetry);
        self.telemetry = Some(telemetry);
    }

    pub fn push_diagnostic(&mut self, message: String) {
        self.diagnostics.push_back(message);
        while self.diagnostics.len() > DIAGNOSTIC_DEPTH {
            self.diagnostics.pop_front();
        }
    }

    fn process_value(telemetry: &TelemetrySnapshot, device_type: DeviceType) -> f32 {
        if device_type.is_mass_flow() {
            telemetry.mass_flow.unwrap_or(0.0)
        } else if device_type.is_liquid() {
            telemetry.volumetric_flow.unwrap_or(0.0)
        } else {
            telemetry.pressure
        }
    }

    fn push_history(&mut self, telemetry: &TelemetrySnapshot) {
        let tick = f64::from(self.tick);
        let process = Self::process_value(telemetry, self.device_type);
        self.process_history.push_back((tick, f64::from(process)));
        if let Some(setpoint) = telemetry.setpoint {
            self.setpoint_history.push_back((tick, f64::from(setpoint)));
        }
        self.pressure_history
            .push_back((tick, f64::from(telemetry.pressure)));
        self.tick = self.tick.wrapping_add(1);
        while self.process_history.len() > HISTORY_DEPTH {
            self.process_history.pop_front();
        }
        while self.setpoint_history.len() > HISTORY_DEPTH {
            self.setpoint_history.pop_front();
        }
        while self.pressure_history.len() > HISTORY_DEPTH {
            self.pressure_history.pop_front();
        }
    }
}
