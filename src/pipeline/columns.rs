//! Column partitioning: turn a line of fragments into a row of cells.
//!
//! Two policies decide where the columns are:
//!
//! * [`ColumnPolicy::Fixed`] takes caller-supplied X thresholds. Use it when
//!   the statement layout is known (every export from one accounting
//!   package puts its amount columns at the same offsets).
//! * [`ColumnPolicy::Dynamic`] infers thresholds from the document itself:
//!   wide horizontal gaps between neighbouring fragments that recur at the
//!   same X across several lines become column boundaries.
//!
//! Both resolve to a [`ColumnBoundaries`] before any row is built, so the
//! table detector only ever sees one interface, [`ColumnAssigner`].
//! Assignment never fails: a fragment right of every threshold lands in the
//! last column.

use crate::error::ExtractError;
use crate::output::{PositionedFragment, TableRow};
use crate::pipeline::lines::{join_trimmed, LineCluster};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Maps fragments to column slots.
pub trait ColumnAssigner {
    /// Number of column slots every row gets. Always at least 1.
    fn column_count(&self) -> usize;

    /// Column slot for a fragment, in `0..column_count()`.
    fn column_of(&self, fragment: &PositionedFragment) -> usize;

    /// Build a row: same-column fragments joined with one space, trimmed.
    fn partition(&self, line: &LineCluster) -> TableRow {
        let count = self.column_count().max(1);
        let mut cells: Vec<Vec<&str>> = vec![Vec::new(); count];
        for fragment in line.fragments() {
            let col = self.column_of(fragment).min(count - 1);
            cells[col].push(fragment.text.as_str());
        }
        cells
            .into_iter()
            .map(|pieces| join_trimmed(pieces.into_iter()))
            .collect()
    }
}

/// Ascending X thresholds; `n` thresholds define `n + 1` columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBoundaries {
    thresholds: Vec<f64>,
}

impl ColumnBoundaries {
    /// Validate caller thresholds: finite and strictly ascending.
    pub fn new(thresholds: Vec<f64>) -> Result<Self, ExtractError> {
        validate_thresholds(&thresholds)?;
        Ok(Self { thresholds })
    }

    /// No thresholds: every fragment of a line shares one cell.
    pub fn single_column() -> Self {
        Self::default()
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }
}

impl ColumnAssigner for ColumnBoundaries {
    fn column_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    fn column_of(&self, fragment: &PositionedFragment) -> usize {
        self.thresholds
            .iter()
            .position(|&upper| fragment.x < upper)
            .unwrap_or(self.thresholds.len())
    }
}

pub(crate) fn validate_thresholds(thresholds: &[f64]) -> Result<(), ExtractError> {
    if let Some(bad) = thresholds.iter().find(|t| !t.is_finite()) {
        return Err(ExtractError::InvalidConfig(format!(
            "Column boundary must be a finite number, got {bad}"
        )));
    }
    if let Some(pair) = thresholds.windows(2).find(|w| w[0] >= w[1]) {
        return Err(ExtractError::InvalidConfig(format!(
            "Column boundaries must be strictly ascending, got {} then {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Tuning for [`ColumnPolicy::Dynamic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapSettings {
    /// Smallest horizontal gap between neighbouring fragments that can
    /// separate two columns. Default: 15.
    pub min_gap: f64,
    /// Gap midpoints closer than this are treated as the same boundary.
    /// Default: 10.
    pub alignment_tolerance: f64,
    /// Distinct lines that must show a gap at a position before it becomes
    /// a boundary. Capped at the number of multi-fragment lines, so a
    /// one-line document still splits. Default: 2.
    pub min_support: usize,
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            min_gap: 15.0,
            alignment_tolerance: 10.0,
            min_support: 2,
        }
    }
}

/// Where column boundaries come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnPolicy {
    /// Caller-supplied thresholds, e.g. `[100.0, 300.0, 500.0]`.
    Fixed(Vec<f64>),
    /// Boundaries inferred from recurring gaps across the document.
    Dynamic(GapSettings),
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        ColumnPolicy::Dynamic(GapSettings::default())
    }
}

impl ColumnPolicy {
    /// Resolve the policy against a document's lines.
    ///
    /// Fixed thresholds are used as-is (the config builder has validated
    /// them); dynamic ones are inferred from `lines`.
    pub fn resolve(&self, lines: &[LineCluster]) -> ColumnBoundaries {
        match self {
            ColumnPolicy::Fixed(thresholds) => ColumnBoundaries {
                thresholds: thresholds.clone(),
            },
            ColumnPolicy::Dynamic(settings) => infer_boundaries(lines, settings),
        }
    }
}

/// Infer column boundaries from recurring inter-fragment gaps.
///
/// Every gap of at least `min_gap` between X-neighbours on a line proposes a
/// boundary at its midpoint. Proposals are clustered by position; a cluster
/// seen on enough distinct lines becomes a boundary at its mean position.
pub fn infer_boundaries(lines: &[LineCluster], settings: &GapSettings) -> ColumnBoundaries {
    let multi: Vec<&LineCluster> = lines.iter().filter(|l| l.len() >= 2).collect();
    if multi.is_empty() {
        return ColumnBoundaries::single_column();
    }

    // (midpoint, line index)
    let mut candidates: Vec<(f64, usize)> = Vec::new();
    for (line_idx, line) in multi.iter().enumerate() {
        for pair in line.fragments().windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let gap = next.x - prev.right();
            if gap >= settings.min_gap {
                candidates.push(((prev.right() + next.x) / 2.0, line_idx));
            }
        }
    }
    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let required = settings.min_support.min(multi.len()).max(1);
    let mut thresholds = Vec::new();
    let mut start = 0;
    for i in 1..=candidates.len() {
        let end_of_cluster = i == candidates.len()
            || candidates[i].0 - candidates[start].0 > settings.alignment_tolerance;
        if !end_of_cluster {
            continue;
        }

        let cluster = &candidates[start..i];
        let mut supporting: Vec<usize> = cluster.iter().map(|&(_, line)| line).collect();
        supporting.sort_unstable();
        supporting.dedup();
        if supporting.len() >= required {
            let mean = cluster.iter().map(|&(pos, _)| pos).sum::<f64>() / cluster.len() as f64;
            thresholds.push(mean);
        }
        start = i;
    }

    debug!(
        "Inferred {} column boundaries from {} gap candidates over {} lines",
        thresholds.len(),
        candidates.len(),
        multi.len()
    );
    ColumnBoundaries { thresholds }
}
