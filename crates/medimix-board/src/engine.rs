//! Board resolution engine.
//!
//! The engine owns the board and is the only thing that mutates it. A turn
//! has three parts:
//!
//! 1. **Swap**: exchange two neighbouring tiles on a candidate board and run
//!    every detector. If anything matched, the swap commits, the matched cells
//!    are emptied and their pre-removal values are tallied into a
//!    [`DispenseRecord`]. Otherwise the board is left exactly as it was.
//! 2. **Settle pass**: one step of gravity. Each column is scanned bottom to
//!    top and every empty cell takes the tile directly above it; empty cells
//!    in the top row are refilled at random. A full board is untouched.
//! 3. **Resolve until stable**: settle and clear cascades in a loop until the
//!    board is full and quiet, accumulating everything that was dispensed.
//!
//! Nothing here returns an error. Illegal swaps come back as
//! [`SwapOutcome::Rejected`] with the board unchanged.
//!
//! # Example
//!
//! ```
//! use medimix_board::{BoardEngine, SwapOutcome};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(3);
//! let mut engine = BoardEngine::random(8, &mut rng).unwrap();
//! assert!(engine.is_stable());
//!
//! // Cells 7 and 8 are not neighbours (row boundary)
//! let before = engine.board().clone();
//! assert!(matches!(engine.swap(7, 8), SwapOutcome::Rejected(_)));
//! assert_eq!(engine.board(), &before);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::board::{Board, BoardError};
use crate::detect::{MatchDetector, MatchSet, MatchShapes};
use crate::dispense::DispenseRecord;
use crate::tile::Medication;

/// Default ceiling on loop iterations inside [`BoardEngine::resolve_until_stable`].
pub const DEFAULT_MAX_RESOLVE_PASSES: u32 = 10_000;

/// Why a swap request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapRejection {
    /// One of the indices is outside the board.
    OutOfRange,
    /// Source and target are the same cell.
    SameCell,
    /// The cells are not orthogonal neighbours.
    NotAdjacent,
}

/// What a committed swap removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReport {
    /// The swapped cells, as requested.
    pub from: usize,
    /// Target cell.
    pub to: usize,
    /// Cells that matched and were emptied.
    pub matched: MatchSet,
    /// Pre-removal tally of the matched cells.
    pub dispensed: DispenseRecord,
}

/// Result of a swap request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapOutcome {
    /// Refused before touching the board.
    Rejected(SwapRejection),
    /// Legal, but produced no match; the exchange was undone.
    Reverted,
    /// Matched; the matched cells are now empty.
    Committed(SwapReport),
}

impl SwapOutcome {
    /// True for [`SwapOutcome::Committed`].
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Summary of a [`BoardEngine::resolve_until_stable`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Everything cleared during this call.
    pub dispensed: DispenseRecord,
    /// Number of match removals (cascades).
    pub cascades: u32,
    /// Number of settle passes executed.
    pub settle_passes: u32,
    /// Union of shapes seen across all cascades.
    pub shapes: MatchShapes,
    /// True when the pass ceiling stopped the loop early.
    pub hit_pass_limit: bool,
}

/// Owner of the board; applies swaps, gravity and cascades.
#[derive(Debug, Clone)]
pub struct BoardEngine {
    board: Board,
    detector: MatchDetector,
    max_resolve_passes: u32,
}

impl BoardEngine {
    /// Wrap an existing board. The board is taken as-is, matches included.
    #[must_use]
    pub fn new(board: Board) -> Self {
        let detector = MatchDetector::new(board.size());
        Self {
            board,
            detector,
            max_resolve_passes: DEFAULT_MAX_RESOLVE_PASSES,
        }
    }

    /// Create a random board and drain it so it starts quiet.
    ///
    /// Whatever the initial drain clears is discarded; it was never the
    /// player's doing.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, BoardError> {
        let mut engine = Self::new(Board::random(size, rng)?);
        engine.resolve_until_stable(rng);
        Ok(engine)
    }

    /// Override the resolve loop ceiling.
    #[must_use]
    pub fn with_max_resolve_passes(mut self, passes: u32) -> Self {
        self.max_resolve_passes = passes.max(1);
        self
    }

    /// Current board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The detector bound to this board's size.
    #[must_use]
    pub fn detector(&self) -> &MatchDetector {
        &self.detector
    }

    /// Full and without any match.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.board.is_full() && self.detector.detect_all(&self.board).is_empty()
    }

    /// Player swap: `to` must be an orthogonal neighbour of `from`.
    pub fn swap(&mut self, from: usize, to: usize) -> SwapOutcome {
        if let Some(rejection) = self.check_indices(from, to) {
            return SwapOutcome::Rejected(rejection);
        }
        if !self.board.is_adjacent(from, to) {
            return SwapOutcome::Rejected(SwapRejection::NotAdjacent);
        }
        self.exchange_and_match(from, to)
    }

    /// Assist swap: any two in-range cells, same revert-on-no-match rule.
    pub fn assist_swap(&mut self, from: usize, to: usize) -> SwapOutcome {
        if let Some(rejection) = self.check_indices(from, to) {
            return SwapOutcome::Rejected(rejection);
        }
        self.exchange_and_match(from, to)
    }

    fn check_indices(&self, from: usize, to: usize) -> Option<SwapRejection> {
        if !self.board.contains(from) || !self.board.contains(to) {
            Some(SwapRejection::OutOfRange)
        } else if from == to {
            Some(SwapRejection::SameCell)
        } else {
            None
        }
    }

    fn exchange_and_match(&mut self, from: usize, to: usize) -> SwapOutcome {
        let mut candidate = self.board.clone();
        candidate.swap(from, to);

        let matched = self.detector.detect_all(&candidate);
        if matched.is_empty() {
            trace!(from, to, "swap produced no match, reverted");
            return SwapOutcome::Reverted;
        }

        let dispensed = remove_matched(&mut candidate, &matched);
        debug!(
            from,
            to,
            cleared = matched.len(),
            shapes = ?matched.shapes,
            "swap committed"
        );
        self.board = candidate;
        SwapOutcome::Committed(SwapReport {
            from,
            to,
            matched,
            dispensed,
        })
    }

    /// Remove whatever currently matches, without a swap.
    ///
    /// Returns `None` when the board is quiet.
    pub fn clear_matches(&mut self) -> Option<(MatchSet, DispenseRecord)> {
        let matched = self.detector.detect_all(&self.board);
        if matched.is_empty() {
            return None;
        }
        let dispensed = remove_matched(&mut self.board, &matched);
        Some((matched, dispensed))
    }

    /// One gravity/refill step. Returns true if any cell changed.
    pub fn settle_pass<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let size = self.board.size();
        let mut changed = false;

        for col in 0..size {
            for row in (1..size).rev() {
                let below = self.board.index_of(row, col);
                let above = below - size;
                if self.board.tile(below).is_none() && self.board.tile(above).is_some() {
                    self.board.swap(below, above);
                    changed = true;
                }
            }
            if self.board.tile(col).is_none() {
                self.board.set(col, Some(Medication::random(rng)));
                changed = true;
            }
        }

        changed
    }

    /// Settle and clear cascades until the board is full and quiet.
    ///
    /// Matches are only evaluated on a full board, so one cascade is always
    /// "clear, then settle completely, then look again".
    pub fn resolve_until_stable<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Resolution {
        let mut resolution = Resolution::default();

        loop {
            if resolution.settle_passes + resolution.cascades >= self.max_resolve_passes {
                warn!(
                    passes = resolution.settle_passes,
                    cascades = resolution.cascades,
                    "resolve loop hit its pass ceiling"
                );
                resolution.hit_pass_limit = true;
                break;
            }

            if !self.board.is_full() {
                self.settle_pass(rng);
                resolution.settle_passes += 1;
                continue;
            }

            let Some((matched, dispensed)) = self.clear_matches() else {
                break;
            };
            resolution.shapes |= matched.shapes;
            resolution.dispensed.merge(&dispensed);
            resolution.cascades += 1;
        }

        if resolution.cascades > 0 || resolution.settle_passes > 0 {
            debug!(
                cascades = resolution.cascades,
                passes = resolution.settle_passes,
                dispensed = resolution.dispensed.total(),
                "board settled"
            );
        }
        resolution
    }
}

/// Empty every matched cell and tally what was there.
fn remove_matched(board: &mut Board, matched: &MatchSet) -> DispenseRecord {
    let mut record = DispenseRecord::new();
    for &index in &matched.indices {
        if let Some(med) = board.tile(index) {
            record.add(med, 1);
        }
        board.set(index, None);
    }
    record
}
