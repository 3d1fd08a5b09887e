use thiserror::Error;

use super::codec::Mode;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Error)]
pub enum QRError {
    #[error("Invalid character {0:?} for {1:?} mode")]
    InvalidChar(char, Mode),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),

    #[error("Data too long: {} bits needed, {capacity} bits available", DataLen(*.bits))]
    DataTooLong { bits: Option<usize>, capacity: usize },

    #[error("Capacity overflow")]
    CapacityOverflow,
}

struct DataLen(Option<usize>);

impl std::fmt::Display for DataLen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str("unbounded"),
        }
    }
}

pub type QRResult<T> = Result<T, QRError>;

#[cfg(test)]
mod error_tests {
    use super::QRError;
    use crate::common::codec::Mode;

    #[test]
    fn test_display() {
        let err = QRError::InvalidChar('a', Mode::Alphanumeric);
        assert_eq!(err.to_string(), "Invalid character 'a' for Alphanumeric mode");

        let err = QRError::DataTooLong { bits: Some(300), capacity: 152 };
        assert_eq!(err.to_string(), "Data too long: 300 bits needed, 152 bits available");

        let err = QRError::DataTooLong { bits: None, capacity: 23648 };
        assert_eq!(err.to_string(), "Data too long: unbounded bits needed, 23648 bits available");
    }
}
