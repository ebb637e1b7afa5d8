use crate::config::BarcodeFormat;

/// A decoded symbol as returned by a reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Symbology the payload was read from
    pub format: BarcodeFormat,
    /// Decoded text
    pub text: String,
    /// Raw payload bytes before character-set interpretation
    pub raw: Vec<u8>,
}

impl Symbol {
    /// Symbol whose payload is plain ASCII (all 1D formats)
    pub fn ascii(format: BarcodeFormat, text: String) -> Self {
        Self {
            format,
            raw: text.as_bytes().to_vec(),
            text,
        }
    }
}
