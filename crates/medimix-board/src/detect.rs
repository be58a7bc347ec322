//! Match detection.
//!
//! Four detectors scan a board snapshot for straight runs of one medication.
//! Each returns the *first* group it finds, scanning in index order, or an
//! empty vector. [`MatchDetector::detect_all`] runs all four in precedence
//! order (column-of-four, row-of-four, column-of-three, row-of-three) and
//! unions their groups, since one swap can complete several shapes at once.
//!
//! Row detectors must not accept a run that wraps from the end of one row
//! into the start of the next. The detector precomputes, per run length, the
//! set of start indices that would wrap and skips them.

use std::collections::BTreeSet;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::board::Board;

bitflags! {
    /// Which match shapes fired during one evaluation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MatchShapes: u8 {
        /// Four in a column
        const COLUMN_OF_FOUR = 1 << 0;
        /// Four in a row
        const ROW_OF_FOUR = 1 << 1;
        /// Three in a column
        const COLUMN_OF_THREE = 1 << 2;
        /// Three in a row
        const ROW_OF_THREE = 1 << 3;
    }
}

/// The aggregate result of running every detector over one board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet {
    /// Matched cell indices, sorted and deduplicated.
    pub indices: Vec<usize>,
    /// Shapes that contributed at least one group.
    pub shapes: MatchShapes,
}

impl MatchSet {
    /// True when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of matched cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Match detector bound to one board size.
///
/// Construction precomputes the column scan bounds and the invalid row
/// starts, so a detector can be reused across many evaluations.
#[derive(Debug, Clone)]
pub struct MatchDetector {
    size: usize,
    /// Last start index (inclusive) for a column of four, if any fits.
    column_of_four_bound: Option<usize>,
    /// Last start index (inclusive) for a column of three, if any fits.
    column_of_three_bound: Option<usize>,
    /// `invalid_row_four[i]` is true when a row of four starting at `i` would wrap.
    invalid_row_four: Vec<bool>,
    /// `invalid_row_three[i]` is true when a row of three starting at `i` would wrap.
    invalid_row_three: Vec<bool>,
}

impl MatchDetector {
    /// Build a detector for `size × size` boards.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            column_of_four_bound: column_bound(size, 4),
            column_of_three_bound: column_bound(size, 3),
            invalid_row_four: invalid_row_starts(size, 4),
            invalid_row_three: invalid_row_starts(size, 3),
        }
    }

    /// Edge length this detector was built for.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// First vertical run of four: `{i, i+N, i+2N, i+3N}`.
    #[must_use]
    pub fn column_of_four(&self, board: &Board) -> Vec<usize> {
        self.first_column_run(board, 4, self.column_of_four_bound)
    }

    /// First horizontal run of four that stays within its row.
    #[must_use]
    pub fn row_of_four(&self, board: &Board) -> Vec<usize> {
        Self::first_row_run(board, 4, &self.invalid_row_four)
    }

    /// First vertical run of three.
    #[must_use]
    pub fn column_of_three(&self, board: &Board) -> Vec<usize> {
        self.first_column_run(board, 3, self.column_of_three_bound)
    }

    /// First horizontal run of three that stays within its row.
    #[must_use]
    pub fn row_of_three(&self, board: &Board) -> Vec<usize> {
        Self::first_row_run(board, 3, &self.invalid_row_three)
    }

    /// Run all four detectors and union their groups.
    #[must_use]
    pub fn detect_all(&self, board: &Board) -> MatchSet {
        let mut indices = BTreeSet::new();
        let mut shapes = MatchShapes::empty();

        let groups = [
            (MatchShapes::COLUMN_OF_FOUR, self.column_of_four(board)),
            (MatchShapes::ROW_OF_FOUR, self.row_of_four(board)),
            (MatchShapes::COLUMN_OF_THREE, self.column_of_three(board)),
            (MatchShapes::ROW_OF_THREE, self.row_of_three(board)),
        ];
        for (shape, group) in groups {
            if !group.is_empty() {
                shapes |= shape;
                indices.extend(group);
            }
        }

        MatchSet {
            indices: indices.into_iter().collect(),
            shapes,
        }
    }

    fn first_column_run(&self, board: &Board, run: usize, bound: Option<usize>) -> Vec<usize> {
        let Some(bound) = bound else {
            return Vec::new();
        };
        (0..=bound)
            .map(|start| (0..run).map(|k| start + k * self.size).collect::<Vec<_>>())
            .find(|group| is_uniform(board, group))
            .unwrap_or_default()
    }

    fn first_row_run(board: &Board, run: usize, invalid: &[bool]) -> Vec<usize> {
        (0..board.len())
            .filter(|&start| !invalid.get(start).copied().unwrap_or(true))
            .map(|start| (start..start + run).collect::<Vec<_>>())
            .find(|group| is_uniform(board, group))
            .unwrap_or_default()
    }
}

/// Last start index for a vertical run of `run` cells: `size² - (run-1)·size - 1`.
fn column_bound(size: usize, run: usize) -> Option<usize> {
    (size * size).checked_sub((run - 1) * size + 1)
}

/// Starts whose run of `run` cells would cross the right edge of their row.
fn invalid_row_starts(size: usize, run: usize) -> Vec<bool> {
    (0..size * size)
        .map(|index| index % size + run > size)
        .collect()
}

/// True when every index holds the same non-empty medication.
fn is_uniform(board: &Board, group: &[usize]) -> bool {
    let Some(&first) = group.first() else {
        return false;
    };
    let Some(med) = board.tile(first) else {
        return false;
    };
    group.iter().all(|&i| board.tile(i) == Some(med))
}
