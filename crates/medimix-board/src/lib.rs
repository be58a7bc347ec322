//! # MediMix Board
//!
//! Match-3 substrate for the MediMix Dash pharmacy simulation.
//!
//! The board is a flat `N × N` grid of medication tiles. This crate knows
//! nothing about patients or staff; it answers three questions:
//!
//! - **Does this swap match?** [`BoardEngine::swap`] commits a neighbour swap
//!   only if it completes a run, and reports what was cleared.
//! - **What falls where?** [`BoardEngine::resolve_until_stable`] runs gravity,
//!   refill and cascades until the board is full and quiet.
//! - **Where are the moves?** The [`advisor`] module lists every cell that can
//!   take part in a match and ranks a handful of longer-range swaps.
//!
//! ## Quick Start
//!
//! ```
//! use medimix_board::{find_exhaustive_moves, BoardEngine, SwapOutcome};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut engine = BoardEngine::random(8, &mut rng).unwrap();
//!
//! for &cell in &find_exhaustive_moves(engine.board()) {
//!     for other in [cell + 1, cell + 8] {
//!         if let SwapOutcome::Committed(report) = engine.swap(cell, other) {
//!             assert!(report.dispensed.total() >= 3);
//!             engine.resolve_until_stable(&mut rng);
//!             assert!(engine.board().is_full());
//!             return;
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod advisor;
pub mod board;
pub mod detect;
pub mod dispense;
pub mod engine;
pub mod tile;

// Re-exports for convenience
pub use advisor::{find_exhaustive_moves, find_smart_rearrangements, score_board, Rearrangement};
pub use board::{Board, BoardError, DEFAULT_BOARD_SIZE};
pub use detect::{MatchDetector, MatchSet, MatchShapes};
pub use dispense::DispenseRecord;
pub use engine::{
    BoardEngine, Resolution, SwapOutcome, SwapRejection, SwapReport, DEFAULT_MAX_RESOLVE_PASSES,
};
pub use tile::{Medication, Tile};
