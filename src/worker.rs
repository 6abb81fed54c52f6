//! Instrument worker thread. Owns the adapter and the transport, polls
//! telemetry on a fixed interval and applies UI commands between polls.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use color_eyre::eyre::{self, WrapErr};

use alicat_rtu::{
    Alicat, DeviceType, DiagnosticSink, Error, RegisterIo, SerialRtuTransport, SimDevice,
    StatusFlags, TareKind,
};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub port: Option<String>,
    pub baud: u32,
    pub address: u8,
    pub device_type: DeviceType,
    pub register_offset: i32,
    pub poll_interval: Duration,
    pub read_only: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorCommand {
    SetSetpoint(f32),
    SetGasNumber(u16),
    Tare,
    ResetTotalizer,
    Terminate,
}

#[derive(Debug)]
pub enum MonitorEvent {
    Telemetry(TelemetrySnapshot),
    Connection(bool),
    Diagnostic(String),
    Error(eyre::Report),
}

/// One poll cycle's readings. Fields the device type does not publish
/// stay `None`.
#[derive(Debug, Clone)]
pub struct TelemetrySnapshot {
    pub pressure: f32,
    pub flow_temperature: Option<f32>,
    pub volumetric_flow: Option<f32>,
    pub mass_flow: Option<f32>,
    pub mass_total: Option<f32>,
    pub setpoint: Option<f32>,
    pub gas_number: Option<u16>,
    pub status: StatusFlags,
}

/// Forwards adapter wire diagnostics into the event channel.
struct ChannelSink {
    events: Sender<MonitorEvent>,
}

impl DiagnosticSink for ChannelSink {
    fn emit(&mut self, message: &str) {
        self.events
            .send(MonitorEvent::Diagnostic(message.to_string()))
            .ok();
    }
}

pub fn spawn_worker(
    config: WorkerConfig,
    command_rx: Receiver<MonitorCommand>,
    event_tx: Sender<MonitorEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(err) = run_worker(&config, &command_rx, &event_tx) {
            event_tx.send(MonitorEvent::Error(err)).ok();
        }
    })
}

fn run_worker(
    config: &WorkerConfig,
    command_rx: &Receiver<MonitorCommand>,
    event_tx: &Sender<MonitorEvent>,
) -> eyre::Result<()> {
    let transport = build_transport(config)?;
    let mut client = Alicat::new(transport, config.address, config.device_type);
    client.set_register_offset(config.register_offset);
    if config.verbose {
        client.set_verbose(true);
        client.set_diagnostics(ChannelSink {
            events: event_tx.clone(),
        });
    }
    run_worker_loop(&mut client, config, command_rx, event_tx)
}

fn build_transport(config: &WorkerConfig) -> eyre::Result<Box<dyn RegisterIo + Send>> {
    match &config.port {
        Some(port) => {
            let transport = SerialRtuTransport::open(port, config.baud)
                .wrap_err_with(|| format!("open serial port {port}"))?;
            Ok(Box::new(transport))
        }
        None => {
            let mut sim = SimDevice::new(config.address, config.device_type);
            sim.enable_dynamics();
            Ok(Box::new(sim))
        }
    }
}

fn run_worker_loop<T: RegisterIo>(
    client: &mut Alicat<T>,
    config: &WorkerConfig,
    command_rx: &Receiver<MonitorCommand>,
    event_tx: &Sender<MonitorEvent>,
) -> eyre::Result<()> {
    loop {
        match command_rx.recv_timeout(config.poll_interval) {
            Ok(MonitorCommand::Terminate) => return Ok(()),
            Ok(command) => {
                if config.read_only {
                    continue;
                }
                if let Err(err) = apply_command(client, &command) {
                    match err {
                        Error::Transport(_) => {
                            event_tx.send(MonitorEvent::Connection(false)).ok();
                        }
                        other => {
                            event_tx
                                .send(MonitorEvent::Diagnostic(other.to_string()))
                                .ok();
                        }
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => match poll_telemetry(client) {
                Ok(snapshot) => {
                    event_tx.send(MonitorEvent::Telemetry(snapshot)).ok();
                    event_tx.send(MonitorEvent::Connection(true)).ok();
                }
                Err(err) => {
                    event_tx
                        .send(MonitorEvent::Diagnostic(format!("poll failed: {err}")))
                        .ok();
                    event_tx.send(MonitorEvent::Connection(false)).ok();
                }
            },
            Err(RecvTimeoutError::Disconnected) => {
                return Err(eyre::eyre!("command channel closed"));
            }
        }
    }
}

fn apply_command<T: RegisterIo>(
    client: &mut Alicat<T>,
    command: &MonitorCommand,
) -> alicat_rtu::Result<()> {
    match command {
        MonitorCommand::SetSetpoint(setpoint) => client.set_setpoint(*setpoint),
        MonitorCommand::SetGasNumber(gas) => client.change_gas_number(*gas),
        MonitorCommand::Tare => client.tare(tare_kind_for(client.device_type())),
        MonitorCommand::ResetTotalizer => client.reset_totalizer(),
        MonitorCommand::Terminate => Ok(()),
    }
}

/// Pressure devices tare their pressure baseline, flow devices their
/// volume baseline.
fn tare_kind_for(device_type: DeviceType) -> TareKind {
    if device_type.is_pressure_controller() {
        TareKind::Pressure
    } else {
        TareKind::Volume
    }
}

fn poll_telemetry<T: RegisterIo>(client: &mut Alicat<T>) -> alicat_rtu::Result<TelemetrySnapshot> {
    let device_type = client.device_type();
    let has_flow_body = device_type.is_mass_flow() || device_type.is_liquid();

    // status word first, then the readings
    let status = client.status_flags()?;
    let pressure = client.pressure()?;
    let flow_temperature = if has_flow_body {
        Some(client.flow_temperature()?)
    } else {
        None
    };
    let volumetric_flow = if has_flow_body {
        Some(client.volumetric_flow()?)
    } else {
        None
    };
    let mass_flow = if device_type.is_mass_flow() {
        Some(client.mass_flow()?)
    } else {
        None
    };
    let mass_total = if device_type.is_mass_flow() {
        Some(client.mass_total()?)
    } else {
        None
    };
    let setpoint = if device_type.is_controller() {
        Some(client.setpoint()?)
    } else {
        None
    };
    let gas_number = if device_type.is_mass_flow() {
        Some(client.gas_number()?)
    } else {
        None
    };

    Ok(TelemetrySnapshot {
        pressure,
        flow_temperature,
        volumetric_flow,
        mass_flow,
        mass_total,
        setpoint,
        gas_number,
        status,
    })
}
