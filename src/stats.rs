//! Base composition and GC content of selections.

use std::fmt;

use log::info;

use crate::buffer::{StatusSink, TextView};
use crate::error::Result;
use crate::transform::dna_filter;

/// Counts of `A`, `T`, `G` and `C`. Only uppercase bases are counted;
/// run the text through [`dna_filter`] first to count lowercase ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceStats {
    pub a: usize,
    pub t: usize,
    pub g: usize,
    pub c: usize,
}

impl SequenceStats {
    pub fn from_seq(seq: &str) -> Self {
        let mut stats = Self::default();
        for b in seq.chars() {
            match b {
                'A' => stats.a += 1,
                'T' => stats.t += 1,
                'G' => stats.g += 1,
                'C' => stats.c += 1,
                _ => {}
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.a + self.t + self.g + self.c
    }

    pub fn gc(&self) -> usize {
        self.g + self.c
    }

    /// `(G + C) / (A + T + G + C)`, or `None` when there are no bases to count.
    pub fn gc_content(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.gc() as f64 / total as f64),
        }
    }
}

impl fmt::Display for SequenceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gc_content() {
            Some(gc) => write!(f, "GC content: {:.2} ({}/{})", gc, self.gc(), self.total()),
            None => write!(f, "GC content: N/A ({}/{})", self.gc(), self.total()),
        }
    }
}

/// Report GC content for every non-empty selection.
pub fn sequence_stats<V, S>(view: &V, dna_only: bool, status: &mut S) -> Result<Vec<SequenceStats>>
where
    V: TextView + ?Sized,
    S: StatusSink + ?Sized,
{
    let mut all = Vec::new();
    for region in view.selections() {
        if region.is_empty() {
            continue;
        }
        let mut seq = view.substr(region)?;
        if dna_only {
            seq = dna_filter(&seq);
        }
        let stats = SequenceStats::from_seq(&seq);
        info!("Seq = {}: {}", seq, stats);
        status.status_message(&stats.to_string());
        all.push(stats);
    }
    Ok(all)
}
