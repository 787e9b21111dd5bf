//! Error types for value conversion.

use thiserror::Error;

/// Errors raised when external data cannot be represented as a variant.
///
/// Reading a variant as the wrong kind is never an error; it yields the
/// kind's zero value instead.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A JSON value has no variant counterpart.
    #[error("Unsupported JSON value: {kind}")]
    UnsupportedJson { kind: &'static str },

    /// A JSON number does not fit a 32-bit integer.
    #[error("Integer out of range: {value}")]
    IntegerOutOfRange { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnsupportedJson { kind: "object" };
        assert_eq!(err.to_string(), "Unsupported JSON value: object");

        let err = CoreError::IntegerOutOfRange {
            value: "9999999999".into(),
        };
        assert!(err.to_string().contains("9999999999"));
    }
}
