use thiserror::Error;

use crate::command::CommandFault;
use crate::device::DeviceType;
use crate::transport::TransportError;

/// Library result.
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error. Validation failures are raised before any register
/// traffic; transport and device faults pass through unchanged, no retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation not available on the configured device type.
    #[error("{operation} is not supported by a {device_type}")]
    Unsupported {
        operation: &'static str,
        device_type: DeviceType,
    },
    /// Argument rejected before any wire traffic.
    #[error("{parameter} {value} is out of range (allowed: {allowed})")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        allowed: &'static str,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The instrument executed the exchange but rejected the command.
    #[error("device rejected command: {0}")]
    Command(#[from] CommandFault),
}
