//! QR symbol location, sampling and decoding

use crate::config::{BarcodeFormat, DecodeConfig};
use crate::decoder::bitstream::read_codewords;
use crate::decoder::data_blocks::correct_codewords;
use crate::decoder::format::FormatInfo;
use crate::decoder::payload::decode_payload;
use crate::decoder::version::{MIN_VERSION_INFO_DIMENSION, read_version_info, resolve_version};
use crate::detector::alignment::find_alignment;
use crate::detector::{FinderDetector, FinderTriple, group_finder_patterns};
use crate::error::NoSymbolFoundError;
use crate::models::{BitMatrix, Point, Symbol, Version};
use crate::utils::geometry::PerspectiveTransform;
use encoding_rs::Encoding;
use tracing::{debug, trace};

/// Finder candidates kept for grouping
const MAX_FINDERS: usize = 12;
const MAX_FINDERS_TRY_HARDER: usize = 24;
/// Finder triples attempted per matrix
const MAX_TRIPLES: usize = 8;
const MAX_TRIPLES_TRY_HARDER: usize = 32;

/// Main QR decoder that locates and reads a symbol in a binary image
pub struct QrDecoder;

impl QrDecoder {
    /// Locate and decode the first readable QR symbol in `binary`.
    ///
    /// When every candidate fails, the error from the candidate that got
    /// furthest through the pipeline is returned.
    pub fn decode(binary: &BitMatrix, config: &DecodeConfig) -> Result<Symbol, NoSymbolFoundError> {
        let try_harder = config.try_harder();
        let mut patterns = FinderDetector::detect(binary, try_harder);
        patterns.truncate(if try_harder {
            MAX_FINDERS_TRY_HARDER
        } else {
            MAX_FINDERS
        });
        if patterns.len() < 3 {
            trace!(found = patterns.len(), "too few finder patterns");
            return Err(NoSymbolFoundError::NotLocated);
        }

        let limit = if try_harder {
            MAX_TRIPLES_TRY_HARDER
        } else {
            MAX_TRIPLES
        };
        let triples = group_finder_patterns(&patterns, limit);
        debug!(
            finders = patterns.len(),
            triples = triples.len(),
            "qr candidates"
        );

        let mut best = NoSymbolFoundError::NotLocated;
        for triple in &triples {
            let Some(estimate) = triple.estimate_dimension() else {
                continue;
            };
            for dimension in dimension_candidates(estimate) {
                let Some(grid) = Self::sample(binary, triple, dimension) else {
                    continue;
                };
                match Self::decode_with_mirror(&grid, config) {
                    Ok(symbol) => return Ok(symbol),
                    Err(err) => {
                        trace!(dimension, %err, "candidate rejected");
                        if severity(&err) > severity(&best) {
                            best = err;
                        }
                    }
                }
            }
        }
        Err(best)
    }

    /// Decode a sampled grid of modules (one cell per module).
    pub fn decode_grid(grid: &BitMatrix, charset: &'static Encoding) -> Result<Symbol, NoSymbolFoundError> {
        let unreadable = NoSymbolFoundError::FormatInfo(BarcodeFormat::QrCode);
        let format = FormatInfo::read(grid).ok_or(unreadable.clone())?;
        let version = resolve_version(grid)
            .filter(|v| v.dimension() == grid.width())
            .ok_or(unreadable)?;

        let codewords = read_codewords(grid, version, format.mask);
        let data = correct_codewords(&codewords, version, format.ec_level).map_err(|err| {
            debug!(version = version.number(), %err, "error correction failed");
            NoSymbolFoundError::Checksum(BarcodeFormat::QrCode)
        })?;

        let payload = decode_payload(&data, version, charset)?;
        if payload.text.is_empty() {
            return Err(NoSymbolFoundError::Malformed(BarcodeFormat::QrCode));
        }
        debug!(
            version = version.number(),
            ec_level = ?format.ec_level,
            mask = format.mask.number(),
            "qr decoded"
        );
        Ok(Symbol {
            format: BarcodeFormat::QrCode,
            text: payload.text,
            raw: payload.raw,
        })
    }

    fn decode_with_mirror(grid: &BitMatrix, config: &DecodeConfig) -> Result<Symbol, NoSymbolFoundError> {
        match Self::decode_grid(grid, config.charset()) {
            Ok(symbol) => Ok(symbol),
            Err(err) if config.try_harder() => {
                // Mirrored symbols sample as the transpose of the real grid.
                Self::decode_grid(&grid.transposed(), config.charset()).map_err(|mirrored| {
                    if severity(&mirrored) > severity(&err) {
                        mirrored
                    } else {
                        err
                    }
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Sample a `dimension`-module grid, resampling once when the version
    /// blocks disagree with the size estimate.
    fn sample(binary: &BitMatrix, triple: &FinderTriple, dimension: usize) -> Option<BitMatrix> {
        let grid = sample_grid(binary, triple, dimension)?;
        if dimension < MIN_VERSION_INFO_DIMENSION {
            return Some(grid);
        }
        match read_version_info(&grid) {
            Some(version) if version.dimension() != dimension => {
                trace!(
                    estimated = dimension,
                    encoded = version.dimension(),
                    "resampling at encoded version"
                );
                sample_grid(binary, triple, version.dimension())
            }
            _ => Some(grid),
        }
    }
}

/// Size estimate first, then its neighbouring versions
fn dimension_candidates(estimate: usize) -> impl Iterator<Item = usize> {
    [Some(estimate), Some(estimate + 4), estimate.checked_sub(4)]
        .into_iter()
        .flatten()
        .filter(|&d| Version::from_dimension(d).is_some())
}

/// How far through the pipeline a failure got
fn severity(err: &NoSymbolFoundError) -> u8 {
    match err {
        NoSymbolFoundError::NotLocated | NoSymbolFoundError::NoFormatsEnabled => 0,
        NoSymbolFoundError::FormatInfo(_) => 1,
        NoSymbolFoundError::Checksum(_) => 2,
        NoSymbolFoundError::Malformed(_) => 3,
        NoSymbolFoundError::Encoding { .. } => 4,
    }
}

/// Map module centres into the image and read each with a 3x3 majority vote.
fn sample_grid(binary: &BitMatrix, triple: &FinderTriple, dimension: usize) -> Option<BitMatrix> {
    let version = Version::from_dimension(dimension)?;
    let d = dimension as f32;
    let finder_modules = [
        Point::new(3.5, 3.5),
        Point::new(d - 3.5, 3.5),
        Point::new(3.5, d - 3.5),
    ];
    let finder_pixels = [triple.top_left, triple.top_right, triple.bottom_left];

    let mut corner_module = Point::new(d - 3.5, d - 3.5);
    let mut corner_pixel = triple.bottom_right();
    let to_image = quad_transform(&finder_modules, corner_module, &finder_pixels, corner_pixel)?;

    if version.number() >= 2 {
        let alignment_module = Point::new(d - 6.5, d - 6.5);
        let predicted = to_image.map(&alignment_module);
        if let Some(found) = find_alignment(binary, predicted, triple.module_size) {
            trace!(x = found.x, y = found.y, "alignment pattern");
            corner_module = alignment_module;
            corner_pixel = found;
        }
    }
    let to_image = quad_transform(&finder_modules, corner_module, &finder_pixels, corner_pixel)?;

    let (width, height) = (binary.width() as f32, binary.height() as f32);
    let spread = triple.module_size / 4.0;
    let mut grid = BitMatrix::square(dimension);
    for y in 0..dimension {
        for x in 0..dimension {
            let center = to_image.map(&Point::new(x as f32 + 0.5, y as f32 + 0.5));
            // Allow a module to overhang the edge by one pixel.
            if !(center.x >= -1.0 && center.y >= -1.0 && center.x <= width + 1.0 && center.y <= height + 1.0) {
                return None;
            }
            let mut dark = 0;
            let mut seen = 0;
            for dy in [-spread, 0.0, spread] {
                for dx in [-spread, 0.0, spread] {
                    let (px, py) = ((center.x + dx).floor(), (center.y + dy).floor());
                    if px < 0.0 || py < 0.0 || px >= width || py >= height {
                        continue;
                    }
                    seen += 1;
                    dark += binary.get(px as usize, py as usize) as usize;
                }
            }
            if seen > 0 && dark * 2 > seen {
                grid.set(x, y, true);
            }
        }
    }
    Some(grid)
}

fn quad_transform(
    modules: &[Point; 3],
    corner_module: Point,
    pixels: &[Point; 3],
    corner_pixel: Point,
) -> Option<PerspectiveTransform> {
    PerspectiveTransform::from_quads(
        &[modules[0], modules[1], modules[2], corner_module],
        &[pixels[0], pixels[1], pixels[2], corner_pixel],
    )
}
