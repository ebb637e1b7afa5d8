//! Symbol readers over a binarized image
//!
//! [`MultiFormatReader`] walks the configured symbologies in order and
//! returns the first symbol any of them decodes.

use crate::config::{BarcodeFormat, DecodeConfig};
use crate::decoder::qr_decoder::QrDecoder;
use crate::error::NoSymbolFoundError;
use crate::models::{BitMatrix, Symbol};
use crate::one_d::code128::Code128Reader;
use crate::one_d::ean::{Ean8Reader, Ean13Reader};
use crate::one_d::scan_rows;
use tracing::trace;

/// Reads symbols from a bit matrix
pub trait SymbolReader {
    /// Decode one symbol from `binary` under `config`
    fn read(&self, binary: &BitMatrix, config: &DecodeConfig) -> Result<Symbol, NoSymbolFoundError>;
}

/// QR Code reader
#[derive(Debug, Clone, Copy, Default)]
pub struct QrReader;

impl SymbolReader for QrReader {
    fn read(&self, binary: &BitMatrix, config: &DecodeConfig) -> Result<Symbol, NoSymbolFoundError> {
        QrDecoder::decode(binary, config)
    }
}

/// Tries every enabled symbology in configuration order
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiFormatReader;

impl MultiFormatReader {
    fn read_format(
        binary: &BitMatrix,
        config: &DecodeConfig,
        format: BarcodeFormat,
    ) -> Result<Symbol, NoSymbolFoundError> {
        let formats = config.formats();
        let try_harder = config.try_harder();
        match format {
            BarcodeFormat::QrCode => QrReader.read(binary, config),
            BarcodeFormat::Ean13 => {
                let reader = Ean13Reader {
                    report_upc_a: formats.contains(BarcodeFormat::UpcA),
                    accept_ean13: true,
                };
                scan_rows(binary, &reader, try_harder)
            }
            // Already covered by the EAN-13 pass when both are enabled.
            BarcodeFormat::UpcA if formats.contains(BarcodeFormat::Ean13) => Err(NoSymbolFoundError::NotLocated),
            BarcodeFormat::UpcA => {
                let reader = Ean13Reader {
                    report_upc_a: true,
                    accept_ean13: false,
                };
                scan_rows(binary, &reader, try_harder)
            }
            BarcodeFormat::Ean8 => scan_rows(binary, &Ean8Reader, try_harder),
            BarcodeFormat::Code128 => scan_rows(binary, &Code128Reader, try_harder),
        }
    }
}

impl SymbolReader for MultiFormatReader {
    fn read(&self, binary: &BitMatrix, config: &DecodeConfig) -> Result<Symbol, NoSymbolFoundError> {
        if config.formats().is_empty() {
            return Err(NoSymbolFoundError::NoFormatsEnabled);
        }

        let mut best = NoSymbolFoundError::NotLocated;
        for format in config.formats().iter() {
            match Self::read_format(binary, config, format) {
                Ok(symbol) => return Ok(symbol),
                Err(err) => {
                    trace!(%format, %err, "format not read");
                    if best == NoSymbolFoundError::NotLocated {
                        best = err;
                    }
                }
            }
        }
        Err(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SymbologySet;
    use crate::one_d::code128::testing::{code_b, code128_modules};
    use crate::one_d::ean::testing::ean_modules;
    use crate::one_d::testing::paint;

    fn config(formats: &[BarcodeFormat]) -> DecodeConfig {
        DecodeConfig::new().with_formats(SymbologySet::new(formats.iter().copied()))
    }

    #[test]
    fn test_no_formats_enabled() {
        let matrix = BitMatrix::new(50, 50);
        assert_eq!(
            MultiFormatReader.read(&matrix, &config(&[])),
            Err(NoSymbolFoundError::NoFormatsEnabled)
        );
    }

    #[test]
    fn test_reads_enabled_linear_format() {
        let matrix = paint(&code128_modules(&code_b("Multi")), 2, 40);
        let all = DecodeConfig::new();
        assert_eq!(MultiFormatReader.read(&matrix, &all).unwrap().text, "Multi");

        let qr_only = config(&[BarcodeFormat::QrCode, BarcodeFormat::Ean13]);
        assert_eq!(
            MultiFormatReader.read(&matrix, &qr_only),
            Err(NoSymbolFoundError::NotLocated)
        );
    }

    #[test]
    fn test_upc_a_selection() {
        let matrix = paint(&ean_modules("0036000291452"), 2, 30);

        let symbol = MultiFormatReader.read(&matrix, &DecodeConfig::new()).unwrap();
        assert_eq!((symbol.format, symbol.text.as_str()), (BarcodeFormat::UpcA, "036000291452"));

        let symbol = MultiFormatReader
            .read(&matrix, &config(&[BarcodeFormat::UpcA]))
            .unwrap();
        assert_eq!(symbol.format, BarcodeFormat::UpcA);

        let symbol = MultiFormatReader
            .read(&matrix, &config(&[BarcodeFormat::Ean13]))
            .unwrap();
        assert_eq!((symbol.format, symbol.text.as_str()), (BarcodeFormat::Ean13, "0036000291452"));
    }

    #[test]
    fn test_first_failure_reason_kept() {
        let mut modules = ean_modules("5901234123457");
        // Swap the last right-half digit for another R pattern: check digit fails.
        let last_digit = modules.len() - 1 - 3 - 4;
        modules[last_digit..last_digit + 4].copy_from_slice(&crate::one_d::ean::L_PATTERNS[8]);
        let matrix = paint(&modules, 2, 30);
        assert_eq!(
            MultiFormatReader.read(&matrix, &config(&[BarcodeFormat::Ean13, BarcodeFormat::Code128])),
            Err(NoSymbolFoundError::Checksum(BarcodeFormat::Ean13))
        );
    }
}
