use std::io::Write;
use std::time::Duration;

use serialport::SerialPort;

use crate::rtu::{
    build_read_request, build_write_request, parse_read_response, parse_write_response,
    read_response, FN_READ_HOLDING_REGISTERS, FN_WRITE_MULTIPLE_REGISTERS,
};
use crate::transport::{RegisterIo, TransportError};

const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(400);

/// Modbus RTU master on one serial port.
///
/// Each [`RegisterIo`] call is a single request/response exchange; responses
/// are awaited up to the I/O timeout and never retried.
pub struct SerialRtuTransport {
    port: Box<dyn SerialPort>,
    io_timeout: Duration,
}

impl SerialRtuTransport {
    /// Opens `path` at `baud`, 8 data bits, no parity, one stop bit.
    pub fn open(path: &str, baud: u32) -> Result<Self, TransportError> {
        Self::open_with_timeout(path, baud, DEFAULT_IO_TIMEOUT)
    }

    pub fn open_with_timeout(
        path: &str,
        baud: u32,
        io_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(io_timeout)
            .open()
            .map_err(|err| TransportError::Io(err.into()))?;
        Ok(Self { port, io_timeout })
    }

    fn send(&mut self, request: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(request)?;
        self.port.flush()?;
        Ok(())
    }
}

impl RegisterIo for SerialRtuTransport {
    fn read_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        let request = build_read_request(device, start, count)?;
        self.send(&request)?;
        let frame = read_response(
            &mut self.port,
            device,
            FN_READ_HOLDING_REGISTERS,
            self.io_timeout,
        )?;
        parse_read_response(&frame, device, count)
    }

    fn write_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        values: &[u16],
    ) -> Result<(), TransportError> {
        let request = build_write_request(device, start, values)?;
        self.send(&request)?;
        let frame = read_response(
            &mut self.port,
            device,
            FN_WRITE_MULTIPLE_REGISTERS,
            self.io_timeout,
        )?;
        #[allow(clippy::cast_possible_truncation)]
        let count = values.len() as u16;
        parse_write_response(&frame, device, start, count)
    }
}
