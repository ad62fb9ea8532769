use thiserror::Error;

/// Errors that can occur when talking to a device through a [`crate::DeviceBus`].
///
/// `E` is the error type of the bus the [`crate::Controller`] was built on.
#[derive(Error, Debug)]
pub enum Error<E> {
    /// The bus failed to complete the transaction. Passed through unchanged, nothing is retried.
    #[error("transport error: {0}")]
    Transport(#[source] E),
    /// The register layer refused the request before anything was sent.
    #[error(transparent)]
    Register(#[from] RegisterError),
    /// Reads addressed to the broadcast id never receive a reply, so they are refused.
    #[error("cannot read from the broadcast id")]
    BroadcastRead,
}

impl<E> Error<E> {
    /// Returns the [`RegisterError`] if this error came from the register layer.
    pub fn register_error(&self) -> Option<&RegisterError> {
        match self {
            Error::Register(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised by the control table itself, independent of any transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// No field of the table carries this name.
    #[error("unknown parameter: {0:?}")]
    UnknownParameter(String),
    /// No field of the table starts at this address.
    /// The high byte of a word register is not a field of its own.
    #[error("no register starts at address {0}")]
    UnknownAddress(u8),
    /// The value is outside the set accepted by the field, so no write was issued.
    #[error("{field} does not accept {value} (valid range {min}..={max})")]
    OutOfRange {
        /// Name of the field being written
        field: &'static str,
        /// The rejected value
        value: i32,
        /// Smallest accepted value
        min: i32,
        /// Largest accepted value
        max: i32,
    },
    /// The field can only be read.
    #[error("{0} is read-only")]
    ReadOnly(&'static str),
}
