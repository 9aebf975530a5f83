use thiserror::Error;

use crate::api::BackendKind;

pub type Result<T> = std::result::Result<T, GcError>;

/// Errors surfaced by graphics contexts and their resources.
///
/// Usage errors (`Disposed`, `BackendMismatch`) are fatal to the call that
/// produced them; nothing in this crate retries or recovers from them.
#[derive(Debug, Error)]
pub enum GcError {
    #[error("graphics context has been disposed")]
    Disposed,

    #[error("expected a {expected:?} parent context, found {found:?}")]
    BackendMismatch {
        expected: BackendKind,
        found: BackendKind,
    },

    #[error("{0} backend is not available in this build")]
    BackendUnavailable(&'static str),

    #[error("invalid surface dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("transform is not invertible")]
    NonInvertible,

    #[error("invalid image data: {0}")]
    InvalidImage(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("png error: {0}")]
    Png(String),

    #[error("surface pixels are not accessible: {0}")]
    SurfaceBusy(String),

    #[cfg(feature = "cairo")]
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),
}

impl From<png::EncodingError> for GcError {
    fn from(err: png::EncodingError) -> Self {
        GcError::Png(err.to_string())
    }
}

impl From<png::DecodingError> for GcError {
    fn from(err: png::DecodingError) -> Self {
        GcError::Png(err.to_string())
    }
}

#[cfg(feature = "cairo")]
impl From<cairo::BorrowError> for GcError {
    fn from(err: cairo::BorrowError) -> Self {
        GcError::SurfaceBusy(err.to_string())
    }
}
