use thiserror::Error;

/// Main error type for TaiSEIA 101 operations
#[derive(Error, Debug)]
pub enum TaiseiaError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout")]
    Timeout,

    #[error("Format error: {0}")]
    Format(String),

    #[error("Length error: declared {declared} bytes, got {actual}")]
    Length { declared: usize, actual: usize },

    #[error("Field error: {0}")]
    Field(String),

    #[error("Command format error: {0}")]
    CommandFormat(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl TaiseiaError {
    /// Whether the error only affects the unit of work it was raised for
    /// (one command or one frame) and the bridge can carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TaiseiaError::Format(_)
                | TaiseiaError::Length { .. }
                | TaiseiaError::Field(_)
                | TaiseiaError::CommandFormat(_)
                | TaiseiaError::Timeout
        )
    }
}

/// Result type alias for TaiSEIA 101 operations
pub type TaiseiaResult<T> = Result<T, TaiseiaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_error_message() {
        let err = TaiseiaError::Length {
            declared: 6,
            actual: 5,
        };
        assert_eq!(err.to_string(), "Length error: declared 6 bytes, got 5");
    }

    #[test]
    fn test_recoverable() {
        assert!(TaiseiaError::CommandFormat("zz".into()).is_recoverable());
        assert!(TaiseiaError::Field("brand".into()).is_recoverable());
        assert!(!TaiseiaError::Transport("port gone".into()).is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reset");
        assert!(!TaiseiaError::from(io).is_recoverable());
    }
}
