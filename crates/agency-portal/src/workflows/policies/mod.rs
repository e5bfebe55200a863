//! Parsing of the compiled policy label field found on client records.
//!
//! A client's rollup field concatenates one label per policy. Labels mix status glyphs,
//! free text, and `|`-separated fields, and several historical variants coexist:
//!
//! ```text
//! ✅ VENCE 30D | 🚗 AUTO | N° POL: 33333333 | 🏷️ PDL384 | 🅰️ A | ❤️ VIDA: SI | 🔧 AUX
//! ```
//!
//! [`BlockSplitter`] cuts the rollup into one [`PolicyBlock`] per policy,
//! [`PolicyExtractor`] reads a [`PolicyRecord`] out of each block through ordered rule
//! chains, and [`find_by_plate`] picks the block belonging to a vehicle.

mod domain;
mod extractor;
mod matcher;
mod rules;
mod splitter;
mod vocabulary;

pub use domain::{CompiledPolicyText, PolicyBlock, PolicyRecord, PolicyStatus};
pub use extractor::{extract, extract_all, FieldRules, PolicyExtractor};
pub use matcher::{find_by_plate, is_inactive, normalize_plate, verdict_for_plate, PlateVerdict};
pub use rules::{BlockText, Rule, RuleChain};
pub use splitter::{split, BlockSplitter, SplitStrategy};

/// Splits a compiled text and extracts every block with the standard rules.
pub fn parse_compiled(text: &CompiledPolicyText, splitter: BlockSplitter) -> Vec<PolicyRecord> {
    extract_all(&splitter.split(text.as_str()))
}
