//! Decode engine: load, extract luminance, binarize, read, fall back
//!
//! The [`FallbackController`] makes exactly two attempts on one luminance
//! map: the primary binarizer, then the fallback binarizer. [`Engine`] wires
//! the loader in front of it with the hybrid/global-histogram pair.

use crate::config::{BarcodeFormat, DecodeConfig};
use crate::error::{AttemptError, DecodeError};
use crate::loader::{self, LoadedImage};
use crate::models::{LuminanceMap, PixelBuffer, Symbol};
use crate::reader::{MultiFormatReader, SymbolReader};
use crate::utils::binarization::{Binarizer, BinarizerKind, GlobalHistogramBinarizer, HybridBinarizer};
use crate::utils::grayscale::extract_luminance;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A successfully decoded symbol and how it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded text
    pub text: String,
    /// Payload bytes before character-set interpretation
    pub raw: Vec<u8>,
    /// Symbology of the symbol
    pub format: BarcodeFormat,
    /// Binarizer whose matrix yielded the symbol
    pub binarizer: BinarizerKind,
    /// Downsampling factor applied by the loader (1 for raw buffers)
    pub sample_factor: u32,
}

/// Primary-then-fallback binarization around a symbol reader
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackController<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Binarizer, F: Binarizer> FallbackController<P, F> {
    /// Controller trying `primary` first and `fallback` once after it
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Decode a pixel buffer. Luminance is extracted once and shared by
    /// both attempts.
    pub fn decode<R: SymbolReader>(
        &self,
        buffer: &PixelBuffer,
        reader: &R,
        config: &DecodeConfig,
    ) -> Result<(Symbol, BinarizerKind), DecodeError> {
        let luminance = extract_luminance(buffer);
        self.decode_luminance(&luminance, reader, config)
    }

    /// Run both attempts on an existing luminance map
    pub fn decode_luminance<R: SymbolReader>(
        &self,
        luminance: &LuminanceMap,
        reader: &R,
        config: &DecodeConfig,
    ) -> Result<(Symbol, BinarizerKind), DecodeError> {
        let primary = match attempt(&self.primary, luminance, reader, config) {
            Ok(symbol) => return Ok((symbol, self.primary.kind())),
            Err(err) => err,
        };
        debug!(binarizer = %self.primary.kind(), error = %primary, "primary attempt failed, retrying");

        match attempt(&self.fallback, luminance, reader, config) {
            Ok(symbol) => Ok((symbol, self.fallback.kind())),
            Err(fallback) => {
                warn!(%primary, %fallback, "no symbol decoded with either binarizer");
                Err(DecodeError::NotFound { primary, fallback })
            }
        }
    }
}

fn attempt<B: Binarizer, R: SymbolReader>(
    binarizer: &B,
    luminance: &LuminanceMap,
    reader: &R,
    config: &DecodeConfig,
) -> Result<Symbol, AttemptError> {
    let matrix = binarizer.binarize(luminance)?;
    let symbol = reader.read(&matrix, config)?;
    debug!(binarizer = %binarizer.kind(), format = %symbol.format, "symbol decoded");
    Ok(symbol)
}

/// Thread-safe decode entry point holding an immutable configuration
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Arc<DecodeConfig>,
    controller: FallbackController<HybridBinarizer, GlobalHistogramBinarizer>,
}

impl Engine {
    /// Engine using `config` for every call
    pub fn new(config: DecodeConfig) -> Self {
        Self {
            config: Arc::new(config),
            controller: FallbackController::new(HybridBinarizer, GlobalHistogramBinarizer),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Load an image file and decode it
    pub fn decode_path(&self, path: impl AsRef<Path>) -> Result<Decoded, DecodeError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "decoding file");
        let loaded = loader::load_path(path)?;
        self.decode_loaded(loaded)
    }

    /// Decode an image already held in memory
    pub fn decode_image(&self, image: DynamicImage) -> Result<Decoded, DecodeError> {
        let loaded = loader::load_dynamic(image)?;
        self.decode_loaded(loaded)
    }

    /// Decode a raw pixel buffer as is, without downsampling
    pub fn decode_buffer(&self, buffer: &PixelBuffer) -> Result<Decoded, DecodeError> {
        self.finish(buffer, 1)
    }

    fn decode_loaded(&self, loaded: LoadedImage) -> Result<Decoded, DecodeError> {
        self.finish(&loaded.buffer, loaded.sample_factor)
    }

    fn finish(&self, buffer: &PixelBuffer, sample_factor: u32) -> Result<Decoded, DecodeError> {
        let (symbol, binarizer) = self.controller.decode(buffer, &MultiFormatReader, &self.config)?;
        Ok(Decoded {
            text: symbol.text,
            raw: symbol.raw,
            format: symbol.format,
            binarizer,
            sample_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BinarizationError, NoSymbolFoundError};
    use crate::models::BitMatrix;
    use std::cell::RefCell;

    /// Binarizer with a fixed outcome, recording each call
    struct Scripted {
        kind: BinarizerKind,
        outcome: Result<(), BinarizationError>,
        calls: RefCell<usize>,
    }

    impl Scripted {
        fn new(kind: BinarizerKind, outcome: Result<(), BinarizationError>) -> Self {
            Self {
                kind,
                outcome,
                calls: RefCell::new(0),
            }
        }
    }

    impl Binarizer for Scripted {
        fn kind(&self) -> BinarizerKind {
            self.kind
        }

        fn binarize(&self, luminance: &LuminanceMap) -> Result<BitMatrix, BinarizationError> {
            *self.calls.borrow_mut() += 1;
            self.outcome.clone()?;
            Ok(BitMatrix::new(luminance.width(), luminance.height()))
        }
    }

    /// Reader returning the same result for every matrix
    struct FixedReader(Result<Symbol, NoSymbolFoundError>);

    impl SymbolReader for FixedReader {
        fn read(&self, _binary: &BitMatrix, _config: &DecodeConfig) -> Result<Symbol, NoSymbolFoundError> {
            self.0.clone()
        }
    }

    fn buffer() -> PixelBuffer {
        PixelBuffer::from_luma8(4, 4, vec![200; 16]).unwrap()
    }

    fn hello() -> Symbol {
        Symbol::ascii(BarcodeFormat::QrCode, "HELLO".to_string())
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let controller = FallbackController::new(
            Scripted::new(BinarizerKind::Hybrid, Ok(())),
            Scripted::new(BinarizerKind::GlobalHistogram, Ok(())),
        );
        let (symbol, kind) = controller
            .decode(&buffer(), &FixedReader(Ok(hello())), &DecodeConfig::new())
            .unwrap();
        assert_eq!(symbol.text, "HELLO");
        assert_eq!(kind, BinarizerKind::Hybrid);
        assert_eq!(*controller.fallback.calls.borrow(), 0);
    }

    #[test]
    fn test_binarization_failure_falls_back() {
        let controller = FallbackController::new(
            Scripted::new(BinarizerKind::Hybrid, Err(BinarizationError::TooSmall {
                width: 4,
                height: 4,
                minimum: 40,
            })),
            Scripted::new(BinarizerKind::GlobalHistogram, Ok(())),
        );
        let (_, kind) = controller
            .decode(&buffer(), &FixedReader(Ok(hello())), &DecodeConfig::new())
            .unwrap();
        assert_eq!(kind, BinarizerKind::GlobalHistogram);
        assert_eq!(*controller.primary.calls.borrow(), 1);
        assert_eq!(*controller.fallback.calls.borrow(), 1);
    }

    #[test]
    fn test_both_failures_reported() {
        let controller = FallbackController::new(
            Scripted::new(BinarizerKind::Hybrid, Ok(())),
            Scripted::new(BinarizerKind::GlobalHistogram, Err(BinarizationError::NoThreshold)),
        );
        let err = controller
            .decode(
                &buffer(),
                &FixedReader(Err(NoSymbolFoundError::NotLocated)),
                &DecodeConfig::new(),
            )
            .unwrap_err();
        assert!(err.is_not_found());
        match err {
            DecodeError::NotFound { primary, fallback } => {
                assert_eq!(primary, AttemptError::NoSymbol(NoSymbolFoundError::NotLocated));
                assert_eq!(fallback, AttemptError::Binarization(BinarizationError::NoThreshold));
            }
            other => panic!("unexpected error {other}"),
        }
        // Exactly one retry
        assert_eq!(*controller.fallback.calls.borrow(), 1);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_uniform_buffer_not_found() {
        let engine = Engine::default();
        let buffer = PixelBuffer::from_luma8(64, 64, vec![255; 64 * 64]).unwrap();
        let err = engine.decode_buffer(&buffer).unwrap_err();
        assert!(err.is_not_found());
    }
}
