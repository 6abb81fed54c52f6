//! Modbus RTU framing: CRC, ADU builders and parsers for functions 0x03
//! (read holding registers) and 0x10 (write multiple registers).

use std::io;
use std::time::{Duration, Instant};

use crate::transport::TransportError;

pub const FN_READ_HOLDING_REGISTERS: u8 = 0x03;
pub const FN_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

/// Set on the function byte of an exception response.
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Longest register run one read request can carry.
const MAX_READ_COUNT: u16 = 125;
/// Longest register run one write request can carry.
const MAX_WRITE_COUNT: usize = 123;

pub fn crc16_modbus(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in data {
        crc ^= u16::from(*byte);
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Appends the CRC low byte then high byte, as it travels on the wire.
pub fn append_crc(frame: &[u8]) -> Vec<u8> {
    let crc = crc16_modbus(frame);
    let mut out = Vec::with_capacity(frame.len() + 2);
    out.extend_from_slice(frame);
    out.push((crc & 0x00FF) as u8);
    out.push((crc >> 8) as u8);
    out
}

pub fn validate_crc(frame: &[u8]) -> Result<(), TransportError> {
    if frame.len() < 4 {
        return Err(TransportError::Frame("rtu frame too short".into()));
    }
    let body_len = frame.len() - 2;
    let expected = crc16_modbus(&frame[..body_len]);
    let seen = u16::from(frame[body_len]) | (u16::from(frame[body_len + 1]) << 8);
    if expected != seen {
        return Err(TransportError::Frame(format!(
            "invalid frame crc: expected 0x{expected:04X}, got 0x{seen:04X}"
        )));
    }
    Ok(())
}

/// Builds a function 0x03 request for `count` registers starting at `start`.
pub fn build_read_request(device: u8, start: u16, count: u16) -> Result<Vec<u8>, TransportError> {
    if count == 0 || count > MAX_READ_COUNT {
        return Err(TransportError::Frame(format!(
            "read count {count} does not fit one request"
        )));
    }
    let mut body = Vec::with_capacity(6);
    body.push(device);
    body.push(FN_READ_HOLDING_REGISTERS);
    body.extend_from_slice(&start.to_be_bytes());
    body.extend_from_slice(&count.to_be_bytes());
    Ok(append_crc(&body))
}

/// Builds a function 0x10 request writing `values` to consecutive registers
/// starting at `start`.
pub fn build_write_request(
    device: u8,
    start: u16,
    values: &[u16],
) -> Result<Vec<u8>, TransportError> {
    if values.is_empty() || values.len() > MAX_WRITE_COUNT {
        return Err(TransportError::Frame(format!(
            "write of {} registers does not fit one request",
            values.len()
        )));
    }
    #[allow(clippy::cast_possible_truncation)]
    let count = values.len() as u16;
    let mut body = Vec::with_capacity(7 + values.len() * 2);
    body.push(device);
    body.push(FN_WRITE_MULTIPLE_REGISTERS);
    body.extend_from_slice(&start.to_be_bytes());
    body.extend_from_slice(&count.to_be_bytes());
    #[allow(clippy::cast_possible_truncation)]
    body.push((values.len() * 2) as u8);
    for value in values {
        body.extend_from_slice(&value.to_be_bytes());
    }
    Ok(append_crc(&body))
}

/// Extracts the data words of a function 0x03 response.
pub fn parse_read_response(
    frame: &[u8],
    device: u8,
    expected_words: u16,
) -> Result<Vec<u16>, TransportError> {
    validate_crc(frame)?;
    if frame.len() < 5 {
        return Err(TransportError::Frame("read response too short".into()));
    }
    if frame[0] != device {
        return Err(TransportError::Frame(format!(
            "unexpected response address: expected 0x{device:02X}, got 0x{:02X}",
            frame[0]
        )));
    }
    if frame[1] != FN_READ_HOLDING_REGISTERS {
        return Err(TransportError::Frame(format!(
            "unexpected response function: 0x{:02X}",
            frame[1]
        )));
    }
    let byte_count = usize::from(frame[2]);
    if frame.len() != byte_count + 5 || !byte_count.is_multiple_of(2) {
        return Err(TransportError::Frame(format!(
            "read response length mismatch: count={byte_count}, frame_len={}",
            frame.len()
        )));
    }
    let words: Vec<u16> = frame[3..3 + byte_count]
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect();
    if words.len() != usize::from(expected_words) {
        return Err(TransportError::Length {
            expected: usize::from(expected_words),
            actual: words.len(),
        });
    }
    Ok(words)
}

/// Checks the start/count echo of a function 0x10 response.
pub fn parse_write_response(
    frame: &[u8],
    device: u8,
    start: u16,
    count: u16,
) -> Result<(), TransportError> {
    validate_crc(frame)?;
    if frame.len() != 8 {
        return Err(TransportError::Frame(format!(
            "write response length mismatch: got {}",
            frame.len()
        )));
    }
    if frame[0] != device {
        return Err(TransportError::Frame(format!(
            "unexpected response address: expected 0x{device:02X}, got 0x{:02X}",
            frame[0]
        )));
    }
    if frame[1] != FN_WRITE_MULTIPLE_REGISTERS {
        return Err(TransportError::Frame(format!(
            "unexpected response function: 0x{:02X}",
            frame[1]
        )));
    }
    let echo_start = u16::from_be_bytes([frame[2], frame[3]]);
    let echo_count = u16::from_be_bytes([frame[4], frame[5]]);
    if echo_start != start || echo_count != count {
        return Err(TransportError::Frame(format!(
            "write response echo mismatch: start={echo_start}, count={echo_count}, \
             expected start={start}, count={count}"
        )));
    }
    Ok(())
}

/// Reads one response ADU for `function`, sizing the tail from the header
/// and branching on the exception flag. The timeout applies per chunk.
pub fn read_response<R: io::Read + ?Sized>(
    reader: &mut R,
    device: u8,
    function: u8,
    timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    let header = read_exact_with_timeout(reader, 3, timeout)?;
    let address = header[0];
    let response_fn = header[1];

    if address != device {
        return Err(TransportError::Frame(format!(
            "unexpected response address: expected 0x{device:02X}, got 0x{address:02X}"
        )));
    }

    if response_fn == function | EXCEPTION_FLAG {
        let tail = read_exact_with_timeout(reader, 2, timeout)?;
        let mut frame = header;
        frame.extend_from_slice(&tail);
        validate_crc(&frame)?;
        return Err(TransportError::Exception {
            function,
            code: frame[2],
        });
    }

    if response_fn != function {
        return Err(TransportError::Frame(format!(
            "unexpected response function: expected 0x{function:02X}, got 0x{response_fn:02X}"
        )));
    }

    let tail_len = if function == FN_READ_HOLDING_REGISTERS {
        // header[2] is the byte count; data plus CRC remain.
        usize::from(header[2]) + 2
    } else {
        // fixed eight-byte echo; header already holds three bytes.
        5
    };
    let tail = read_exact_with_timeout(reader, tail_len, timeout)?;
    let mut frame = header;
    frame.extend_from_slice(&tail);
    Ok(frame)
}

/// Reads exactly `len` bytes, tolerating partial reads until `timeout`
/// elapses.
///
/// A zero-length read means the stream is gone (the serial backend reports
/// timeouts as `Err(TimedOut)`, never `Ok(0)`) and fails immediately.
pub fn read_exact_with_timeout<R: io::Read + ?Sized>(
    reader: &mut R,
    len: usize,
    timeout: Duration,
) -> Result<Vec<u8>, TransportError> {
    let deadline = Instant::now() + timeout;
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(TransportError::Io(io::Error::from(
                    io::ErrorKind::UnexpectedEof,
                )));
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err)
                if err.kind() == io::ErrorKind::TimedOut
                    || err.kind() == io::ErrorKind::WouldBlock =>
            {
                if Instant::now() >= deadline {
                    return Err(TransportError::Io(err));
                }
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(buf)
}
