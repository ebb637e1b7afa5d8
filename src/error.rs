//! Error taxonomy for the decode pipeline
//!
//! Loader errors abort a decode immediately. Binarizer and reader errors are
//! recoverable: the fallback controller retries once with the alternate
//! binarizer and only then reports [`DecodeError::NotFound`].

use crate::config::BarcodeFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a pixel buffer.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    /// The path does not exist
    #[error("image file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file exists but is not a format the loader understands
    #[error("unsupported image format: {}", path.display())]
    Unsupported {
        /// Offending file
        path: PathBuf,
        /// Underlying codec error
        #[source]
        source: image::ImageError,
    },
    /// The codec recognised the file but could not decode it
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        /// Offending file
        path: PathBuf,
        /// Underlying codec error
        #[source]
        source: image::ImageError,
    },
    /// A raw buffer whose length does not match its declared geometry
    #[error("invalid pixel buffer: expected {expected} samples for {width}x{height}, got {actual}")]
    InvalidBuffer {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Samples implied by the geometry and layout
        expected: usize,
        /// Samples actually supplied
        actual: usize,
    },
    /// Zero-sized image
    #[error("image has no pixels ({width}x{height})")]
    Empty {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
    },
}

/// Failure to turn luminance into a bit matrix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BinarizationError {
    /// The luminance map has no pixels
    #[error("luminance map is empty")]
    Empty,
    /// Too small for block-based thresholding
    #[error("image {width}x{height} is too small for block thresholding (minimum {minimum})")]
    TooSmall {
        /// Map width
        width: usize,
        /// Map height
        height: usize,
        /// Minimum side length required
        minimum: usize,
    },
    /// Histogram has no two separated peaks (uniform or near-uniform image)
    #[error("luminance histogram has no usable threshold")]
    NoThreshold,
}

/// No symbol could be read from a bit matrix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoSymbolFoundError {
    /// Nothing resembling an enabled symbology was located
    #[error("no symbol located")]
    NotLocated,
    /// The symbology set is empty
    #[error("no symbologies enabled")]
    NoFormatsEnabled,
    /// A symbol was located but its format information was unreadable
    #[error("{0} format information unreadable")]
    FormatInfo(BarcodeFormat),
    /// Error correction or check digit failed
    #[error("{0} checksum failed")]
    Checksum(BarcodeFormat),
    /// The data stream was structurally invalid
    #[error("{0} data stream malformed")]
    Malformed(BarcodeFormat),
    /// Payload bytes are not valid in the selected character set
    #[error("payload is not valid {charset}")]
    Encoding {
        /// Character set used to interpret the bytes
        charset: &'static str,
    },
}

/// Why a single binarize-then-read attempt failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Binarizer could not produce a matrix
    #[error(transparent)]
    Binarization(#[from] BinarizationError),
    /// Reader found nothing in the matrix
    #[error(transparent)]
    NoSymbol(#[from] NoSymbolFoundError),
}

/// Umbrella error returned by every top-level decode entry point.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The image could not be loaded; no decode was attempted
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
    /// Both binarization strategies were tried and neither produced a symbol
    #[error("no symbol decoded (adaptive: {primary}; global histogram: {fallback})")]
    NotFound {
        /// Failure of the adaptive attempt
        primary: AttemptError,
        /// Failure of the global-histogram attempt
        fallback: AttemptError,
    },
}

impl DecodeError {
    /// True when the image was readable but held no decodable symbol.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DecodeError::NotFound { .. })
    }
}

/// Invalid decode configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Identifier names a symbology this engine has no reader for
    #[error("unsupported symbology: {0}")]
    UnsupportedFormat(String),
    /// Character set label unknown to the encoding table
    #[error("unknown character set: {0}")]
    UnknownCharset(String),
    /// Boolean environment value that is neither 0 nor 1
    #[error("invalid value {value:?} for {name}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = DecodeError::NotFound {
            primary: NoSymbolFoundError::NotLocated.into(),
            fallback: BinarizationError::NoThreshold.into(),
        };
        assert!(err.is_not_found());

        let err: DecodeError = ImageLoadError::NotFound(PathBuf::from("missing.png")).into();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_attempt_error_messages() {
        let err = AttemptError::from(NoSymbolFoundError::Checksum(BarcodeFormat::QrCode));
        assert_eq!(err.to_string(), "QR_CODE checksum failed");
    }
}
