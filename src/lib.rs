//! Modbus RTU adapter for Alicat mass flow and pressure instruments.
//!
//! [`Alicat`] drives the instrument register map over any [`RegisterIo`]
//! transport: telemetry statistics, gas selection, mixture slots and the
//! special command protocol, with the capability checks that go with each
//! device type. [`SerialRtuTransport`] speaks Modbus RTU over a serial
//! line; [`SimDevice`] answers from memory for tests and the monitor's
//! simulation mode.

pub mod client;
pub mod codec;
pub mod command;
pub mod constants;
pub mod device;
pub mod diag;
pub mod error;
pub mod rtu;
pub mod serial;
pub mod sim;
pub mod status;
pub mod transport;

pub use client::{Alicat, MixtureGas, MixtureRegisters};
pub use command::{
    CommandFault, ControlLoopVariable, LoopAlgorithm, PidTerm, SetpointSource, SpecialCommand,
    TareKind, ValveSetting,
};
pub use device::DeviceType;
pub use diag::{DiagnosticSink, LogSink};
pub use error::{Error, Result};
pub use serial::SerialRtuTransport;
pub use sim::SimDevice;
pub use status::StatusFlags;
pub use transport::{RegisterIo, TransportError};
