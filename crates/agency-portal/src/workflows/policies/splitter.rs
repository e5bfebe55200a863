use super::domain::PolicyBlock;
use super::vocabulary::{has_status_glyph, has_status_keyword, is_status_glyph};

const DELIMITER: char = '|';

/// How block boundaries are detected in a compiled policy text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Cut in front of every status glyph. When `gated`, a glyph only opens a block if the
    /// text up to the next glyph carries a status keyword.
    Glyph { gated: bool },
    /// Tokenize on `|`, then re-merge fragments until one holds both a status glyph and a
    /// status keyword. The delimiter also separates fields inside a single policy. Policies
    /// run together inside one fragment are still cut at each gated glyph.
    Delimited,
}

/// Splits a compiled policy text into one block per policy.
///
/// Text in front of the first block start belongs to the first block, so a text with `k`
/// qualifying starts always yields `k` blocks, and a text without any yields the whole
/// trimmed text as a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSplitter {
    strategy: SplitStrategy,
}

impl Default for BlockSplitter {
    fn default() -> Self {
        Self::delimited()
    }
}

impl BlockSplitter {
    pub const fn new(strategy: SplitStrategy) -> Self {
        Self { strategy }
    }

    pub const fn glyph() -> Self {
        Self::new(SplitStrategy::Glyph { gated: false })
    }

    pub const fn gated_glyph() -> Self {
        Self::new(SplitStrategy::Glyph { gated: true })
    }

    pub const fn delimited() -> Self {
        Self::new(SplitStrategy::Delimited)
    }

    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    pub fn split(&self, text: &str) -> Vec<PolicyBlock> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let starts = match self.strategy {
            SplitStrategy::Glyph { gated } => glyph_starts(text, gated),
            SplitStrategy::Delimited => delimited_starts(text),
        };

        cut_blocks(text, &starts)
    }
}

/// Splits with the default strategy.
pub fn split(text: &str) -> Vec<PolicyBlock> {
    BlockSplitter::default().split(text)
}

fn glyph_starts(text: &str, gated: bool) -> Vec<usize> {
    let candidates: Vec<usize> = text
        .char_indices()
        .filter(|(_, c)| is_status_glyph(*c))
        .map(|(index, _)| index)
        .collect();

    if !gated {
        return candidates;
    }

    candidates
        .iter()
        .enumerate()
        .filter(|(position, start)| {
            let end = candidates
                .get(position + 1)
                .copied()
                .unwrap_or(text.len());
            has_status_keyword(&text[**start..end].to_uppercase())
        })
        .map(|(_, start)| *start)
        .collect()
}

fn delimited_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut fragment_start = 0;

    for (index, _) in text
        .match_indices(DELIMITER)
        .chain(std::iter::once((text.len(), "")))
    {
        let fragment = &text[fragment_start..index];
        if has_status_glyph(fragment) && has_status_keyword(&fragment.to_uppercase()) {
            let inner = glyph_starts(fragment, true);
            let shifted = inner.iter().map(|offset| fragment_start + offset);
            match inner.first() {
                // Fields of the previous policy precede the first marker.
                Some(&first) if !fragment[..first].trim().is_empty() => starts.extend(shifted),
                Some(_) => {
                    starts.push(fragment_start);
                    starts.extend(shifted.skip(1));
                }
                None => starts.push(fragment_start),
            }
        }
        fragment_start = index + DELIMITER.len_utf8();
    }

    starts
}

fn cut_blocks(text: &str, starts: &[usize]) -> Vec<PolicyBlock> {
    let mut bounds = vec![0];
    bounds.extend(starts.iter().skip(1).copied());
    bounds.push(text.len());

    bounds
        .windows(2)
        .map(|window| trim_block(&text[window[0]..window[1]]))
        .filter(|block| !block.is_empty())
        .map(PolicyBlock::new)
        .collect()
}

fn trim_block(block: &str) -> &str {
    block.trim_matches(|c: char| c == DELIMITER || c.is_whitespace())
}
