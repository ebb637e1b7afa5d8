//! Decode configuration
//!
//! A [`DecodeConfig`] is built once (builder methods or [`DecodeConfig::from_env`])
//! and then shared read-only by every decode call, usually behind the `Arc`
//! held by [`crate::Engine`].

use crate::error::ConfigError;
use encoding_rs::{Encoding, UTF_8};
use std::fmt;
use std::str::FromStr;

/// Barcode symbologies the engine can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    /// QR Code (model 2)
    QrCode,
    /// EAN-13
    Ean13,
    /// UPC-A (EAN-13 with a leading zero)
    UpcA,
    /// EAN-8
    Ean8,
    /// Code 128
    Code128,
}

impl BarcodeFormat {
    /// All supported formats, in default search order.
    pub const ALL: [BarcodeFormat; 5] = [
        BarcodeFormat::QrCode,
        BarcodeFormat::Ean13,
        BarcodeFormat::UpcA,
        BarcodeFormat::Ean8,
        BarcodeFormat::Code128,
    ];

    /// Canonical identifier, e.g. `QR_CODE`
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR_CODE",
            BarcodeFormat::Ean13 => "EAN_13",
            BarcodeFormat::UpcA => "UPC_A",
            BarcodeFormat::Ean8 => "EAN_8",
            BarcodeFormat::Code128 => "CODE_128",
        }
    }

    /// True for linear (row-scanned) symbologies
    pub fn is_one_d(&self) -> bool {
        !matches!(self, BarcodeFormat::QrCode)
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Identifiers known from other decoders that have no reader here.
const UNSUPPORTED: [&str; 12] = [
    "AZTEC",
    "CODABAR",
    "CODE_39",
    "CODE_93",
    "DATA_MATRIX",
    "ITF",
    "MAXICODE",
    "PDF_417",
    "RSS_14",
    "RSS_EXPANDED",
    "UPC_E",
    "UPC_EAN_EXTENSION",
];

impl FromStr for BarcodeFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "QR_CODE" | "QRCODE" | "QR" => Ok(BarcodeFormat::QrCode),
            "EAN_13" | "EAN13" => Ok(BarcodeFormat::Ean13),
            "UPC_A" | "UPCA" => Ok(BarcodeFormat::UpcA),
            "EAN_8" | "EAN8" => Ok(BarcodeFormat::Ean8),
            "CODE_128" | "CODE128" => Ok(BarcodeFormat::Code128),
            other if UNSUPPORTED.contains(&other) => {
                Err(ConfigError::UnsupportedFormat(other.to_string()))
            }
            _ => Err(ConfigError::UnsupportedFormat(s.trim().to_string())),
        }
    }
}

/// Ordered, duplicate-free set of enabled symbologies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbologySet {
    formats: Vec<BarcodeFormat>,
}

impl SymbologySet {
    /// Build from any iterator; later duplicates are dropped, order is kept
    pub fn new<I: IntoIterator<Item = BarcodeFormat>>(formats: I) -> Self {
        let mut out = Vec::new();
        for format in formats {
            if !out.contains(&format) {
                out.push(format);
            }
        }
        Self { formats: out }
    }

    /// Set containing a single format
    pub fn only(format: BarcodeFormat) -> Self {
        Self {
            formats: vec![format],
        }
    }

    /// Whether `format` is enabled
    pub fn contains(&self, format: BarcodeFormat) -> bool {
        self.formats.contains(&format)
    }

    /// Enabled formats in search order
    pub fn iter(&self) -> impl Iterator<Item = BarcodeFormat> + '_ {
        self.formats.iter().copied()
    }

    /// Number of enabled formats
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// True when nothing is enabled
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// True when any linear symbology is enabled
    pub fn has_one_d(&self) -> bool {
        self.formats.iter().any(BarcodeFormat::is_one_d)
    }
}

impl Default for SymbologySet {
    fn default() -> Self {
        Self::new(BarcodeFormat::ALL)
    }
}

impl FromStr for SymbologySet {
    type Err = ConfigError;

    /// Parse a comma separated list such as `QR_CODE,ean-13`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let formats = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<BarcodeFormat>, _>>()?;
        Ok(Self::new(formats))
    }
}

/// Immutable decode options shared across calls
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeConfig {
    formats: SymbologySet,
    try_harder: bool,
    charset: &'static Encoding,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            formats: SymbologySet::default(),
            try_harder: false,
            charset: UTF_8,
        }
    }
}

impl DecodeConfig {
    /// Default configuration: every supported format, UTF-8, normal effort
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict (or broaden) the formats the reader searches for
    pub fn with_formats(mut self, formats: SymbologySet) -> Self {
        self.formats = formats;
        self
    }

    /// Enable the more exhaustive (slower) search
    pub fn with_try_harder(mut self, try_harder: bool) -> Self {
        self.try_harder = try_harder;
        self
    }

    /// Character set used for byte payloads, by WHATWG label (`utf-8`, `shift_jis`, ...)
    pub fn with_charset_label(mut self, label: &str) -> Result<Self, ConfigError> {
        self.charset = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ConfigError::UnknownCharset(label.to_string()))?;
        Ok(self)
    }

    /// Character set used for byte payloads
    pub fn with_charset(mut self, charset: &'static Encoding) -> Self {
        self.charset = charset;
        self
    }

    /// Enabled symbologies
    pub fn formats(&self) -> &SymbologySet {
        &self.formats
    }

    /// Whether the exhaustive search is on
    pub fn try_harder(&self) -> bool {
        self.try_harder
    }

    /// Character set for byte payloads
    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// Read `BARSCAN_FORMATS`, `BARSCAN_TRY_HARDER` and `BARSCAN_CHARSET`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(formats) = lookup(ENV_FORMATS) {
            config.formats = formats.parse()?;
        }
        if let Some(value) = lookup(ENV_TRY_HARDER) {
            config.try_harder = parse_env_bool(ENV_TRY_HARDER, &value)?;
        }
        if let Some(label) = lookup(ENV_CHARSET) {
            config = config.with_charset_label(&label)?;
        }
        Ok(config)
    }
}

const ENV_FORMATS: &str = "BARSCAN_FORMATS";
const ENV_TRY_HARDER: &str = "BARSCAN_TRY_HARDER";
const ENV_CHARSET: &str = "BARSCAN_CHARSET";

fn parse_env_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            name,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_format_parsing() {
        assert_eq!("qr_code".parse::<BarcodeFormat>(), Ok(BarcodeFormat::QrCode));
        assert_eq!("EAN-13".parse::<BarcodeFormat>(), Ok(BarcodeFormat::Ean13));
        assert_eq!(
            "PDF_417".parse::<BarcodeFormat>(),
            Err(ConfigError::UnsupportedFormat("PDF_417".to_string()))
        );
        assert!("bogus".parse::<BarcodeFormat>().is_err());
    }

    #[test]
    fn test_symbology_set_keeps_order_and_dedups() {
        let set: SymbologySet = "CODE_128, qr_code,CODE_128".parse().unwrap();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![BarcodeFormat::Code128, BarcodeFormat::QrCode]
        );
        assert!(set.has_one_d());
        assert!(!SymbologySet::only(BarcodeFormat::QrCode).has_one_d());
    }

    #[test]
    fn test_default_config() {
        let config = DecodeConfig::default();
        assert_eq!(config.formats().len(), BarcodeFormat::ALL.len());
        assert!(!config.try_harder());
        assert_eq!(config.charset(), UTF_8);

        let config = config.with_charset(encoding_rs::SHIFT_JIS);
        assert_eq!(config.charset(), encoding_rs::SHIFT_JIS);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("BARSCAN_FORMATS", "qr_code"),
            ("BARSCAN_TRY_HARDER", "1"),
            ("BARSCAN_CHARSET", "shift_jis"),
        ]
        .into_iter()
        .collect();
        let config = DecodeConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.formats(), &SymbologySet::only(BarcodeFormat::QrCode));
        assert!(config.try_harder());
        assert_eq!(config.charset(), encoding_rs::SHIFT_JIS);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = DecodeConfig::from_lookup(|k| {
            (k == "BARSCAN_TRY_HARDER").then(|| "maybe".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = DecodeConfig::default()
            .with_charset_label("klingon")
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownCharset("klingon".to_string()));
    }
}
