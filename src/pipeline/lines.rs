//! Line clustering: group fragments that sit on the same visual text line.
//!
//! PDF places each run independently, so two cells of one table row rarely
//! share an exact baseline. Fragments are sorted top-down (descending `y`,
//! since the PDF origin is bottom-left) and a new line starts whenever a
//! fragment is at least `tolerance` away from the first fragment of the
//! line being built. One sort plus one linear pass.

use crate::output::PositionedFragment;
use std::cmp::Ordering;

/// Fragments judged to lie on the same visual line, sorted left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct LineCluster {
    fragments: Vec<PositionedFragment>,
    representative_y: f64,
}

impl LineCluster {
    fn start(first: PositionedFragment) -> Self {
        Self {
            representative_y: first.y,
            fragments: vec![first],
        }
    }

    /// Y of the fragment that opened this line.
    pub fn representative_y(&self) -> f64 {
        self.representative_y
    }

    /// Fragments in ascending X order.
    pub fn fragments(&self) -> &[PositionedFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The line's text: fragments joined by single spaces, trimmed.
    pub fn text(&self) -> String {
        join_trimmed(self.fragments.iter().map(|f| f.text.as_str()))
    }

    fn sort_by_x(&mut self) {
        self.fragments
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    }
}

/// Cluster one page's fragments into lines, top of page first.
///
/// An empty input yields an empty output.
pub fn cluster_lines(fragments: &[PositionedFragment], tolerance: f64) -> Vec<LineCluster> {
    let mut sorted = fragments.to_vec();
    // Stable, so fragments at an identical y keep decoder order until the
    // per-line X sort below.
    sorted.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal));

    let mut lines: Vec<LineCluster> = Vec::new();
    for fragment in sorted {
        let starts_line = lines
            .last()
            .is_none_or(|line| (line.representative_y - fragment.y).abs() >= tolerance);
        if starts_line {
            lines.push(LineCluster::start(fragment));
        } else if let Some(line) = lines.last_mut() {
            line.fragments.push(fragment);
        }
    }

    for line in &mut lines {
        line.sort_by_x();
    }
    lines
}

/// Join pieces with one space, dropping blank pieces and outer whitespace.
pub(crate) fn join_trimmed<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
