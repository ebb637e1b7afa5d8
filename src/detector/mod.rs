//! QR symbol location
//!
//! - Finder pattern detection (the three square markers)
//! - Grouping finders into ordered corner triples
//! - Alignment pattern search for versions 2 and up

/// Alignment pattern search around a predicted centre
pub mod alignment;
/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
/// Finder triple selection and corner ordering
pub mod grouping;

pub use finder::{FinderDetector, FinderPattern};
pub use grouping::{FinderTriple, group_finder_patterns};
