//! Our error types for the PD bench supply.

use thiserror::Error;

pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error type for the power supply, generic over the PD controller's own error.
#[derive(Error, Debug)]
pub enum Error<E: core::fmt::Debug> {
    #[error("Power supply not initialized")]
    NotInitialized,
    #[error("Index out of range")]
    OutOfRange,
    #[error("Operation not valid in the current mode")]
    InvalidMode,
    #[error("PD negotiation timed out")]
    NegotiationTimeout,
    #[error("PD controller error: {0:?}")]
    Controller(E),
    #[error("Load switch error: {0:?}")]
    LoadSwitch(embedded_hal::digital::ErrorKind),
    #[error("Button read error: {0:?}")]
    Button(embedded_hal::digital::ErrorKind),
    #[error("Power indicator error: {0:?}")]
    Indicator(embedded_hal::digital::ErrorKind),
    #[error("Status output error: {0:?}")]
    Console(embedded_io::ErrorKind),
}

/// Errors from looking up the profile catalog.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Fixed profile index out of range")]
    OutOfRange,
}

impl<E: core::fmt::Debug> From<CatalogError> for Error<E> {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::OutOfRange => Error::OutOfRange,
        }
    }
}
