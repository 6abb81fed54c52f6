use thiserror::Error;

/// Failure of a single register exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("serial i/o: {0}")]
    Io(#[from] std::io::Error),
    /// Response failed CRC or framing checks.
    #[error("bad frame: {0}")]
    Frame(String),
    /// The device answered with a Modbus exception.
    #[error("modbus exception {code:#04x} for function {function:#04x}")]
    Exception { function: u8, code: u8 },
    #[error("short response: expected {expected} data words, got {actual}")]
    Length { expected: usize, actual: usize },
    /// An offset register address fell outside the 16-bit register space.
    #[error("register address {0} is not addressable on the wire")]
    InvalidAddress(i64),
}

/// Blocking holding-register exchange with one device on the bus.
///
/// A call is exactly one request/response transaction. Implementations do
/// not retry; every failure surfaces as a [`TransportError`].
pub trait RegisterIo {
    fn read_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError>;

    fn write_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        values: &[u16],
    ) -> Result<(), TransportError>;
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        (**self).read_holding_registers(device, start, count)
    }

    fn write_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        values: &[u16],
    ) -> Result<(), TransportError> {
        (**self).write_holding_registers(device, start, values)
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for Box<T> {
    fn read_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransportError> {
        (**self).read_holding_registers(device, start, count)
    }

    fn write_holding_registers(
        &mut self,
        device: u8,
        start: u16,
        values: &[u16],
    ) -> Result<(), TransportError> {
        (**self).write_holding_registers(device, start, values)
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterIo, TransportError};

    #[derive(Default)]
    struct Counting {
        reads: usize,
        writes: usize,
    }

    impl RegisterIo for Counting {
        fn read_holding_registers(
            &mut self,
            _device: u8,
            _start: u16,
            count: u16,
        ) -> Result<Vec<u16>, TransportError> {
            self.reads += 1;
            Ok(vec![0; count as usize])
        }

        fn write_holding_registers(
            &mut self,
            _device: u8,
            _start: u16,
            _values: &[u16],
        ) -> Result<(), TransportError> {
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn mutable_borrow_and_box_forward_to_the_inner_transport() {
        let mut inner = Counting::default();
        {
            let mut lent: &mut Counting = &mut inner;
            lent.read_holding_registers(1, 1200, 1)
                .expect("read through &mut should succeed");
        }
        let mut boxed: Box<dyn RegisterIo> = Box::new(inner);
        boxed
            .write_holding_registers(1, 999, &[7])
            .expect("write through Box should succeed");
        boxed
            .read_holding_registers(1, 1200, 2)
            .expect("read through Box should succeed");
    }

    #[test]
    fn exception_and_length_errors_render_their_fields() {
        let exception = TransportError::Exception {
            function: 0x03,
            code: 0x02,
        };
        assert!(exception.to_string().contains("0x02"), "{exception}");

        let length = TransportError::Length {
            expected: 2,
            actual: 1,
        };
        assert!(length.to_string().contains("expected 2"), "{length}");
    }

    #[test]
    fn io_errors_convert_from_std() {
        let err = TransportError::from(std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert!(matches!(err, TransportError::Io(_)));
    }
}
