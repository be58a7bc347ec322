//! Board model: a flat `size × size` grid of tiles.
//!
//! Cells are addressed by a flat index. Row and column derive from it:
//! `row = index / size`, `col = index % size`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::{Medication, Tile};

/// Default edge length of the board.
pub const DEFAULT_BOARD_SIZE: usize = 8;

/// Errors raised when constructing a board from raw parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The edge length was zero.
    #[error("board size must be at least 1")]
    ZeroSize,
    /// The tile vector does not hold `size²` cells.
    #[error("board of size {size} needs {expected} tiles, got {actual}")]
    LengthMismatch {
        /// Requested edge length
        size: usize,
        /// `size²`
        expected: usize,
        /// Length of the provided tile vector
        actual: usize,
    },
}

/// A square match-3 grid.
///
/// Deserialization goes through [`Board::from_tiles`], so a malformed grid
/// is rejected instead of producing a board that panics on access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    size: usize,
    tiles: Vec<Tile>,
}

/// Unchecked wire form of a [`Board`].
#[derive(Deserialize)]
struct RawBoard {
    size: usize,
    tiles: Vec<Tile>,
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        Self::from_tiles(raw.size, raw.tiles)
    }
}

impl Board {
    /// Create a board filled with uniformly random medications.
    ///
    /// The result may contain matches; callers that need a quiet board run
    /// it through the engine's `resolve_until_stable` first.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::ZeroSize);
        }
        let tiles = (0..size * size)
            .map(|_| Some(Medication::random(rng)))
            .collect();
        Ok(Self { size, tiles })
    }

    /// Create a board from explicit tiles.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is zero or `tiles.len() != size²`.
    pub fn from_tiles(size: usize, tiles: Vec<Tile>) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::ZeroSize);
        }
        let expected = size * size;
        if tiles.len() != expected {
            return Err(BoardError::LengthMismatch {
                size,
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self { size, tiles })
    }

    /// Create a board from medications, with no empty cells.
    ///
    /// # Errors
    ///
    /// Same as [`Board::from_tiles`].
    pub fn from_medications(size: usize, meds: &[Medication]) -> Result<Self, BoardError> {
        Self::from_tiles(size, meds.iter().copied().map(Some).collect())
    }

    /// Edge length.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells (`size²`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false for a constructed board; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Read-only view of all tiles in index order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile at `index`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Tile> {
        self.tiles.get(index).copied()
    }

    /// Tile at `index`, treating out-of-range as empty.
    #[must_use]
    pub fn tile(&self, index: usize) -> Tile {
        self.tiles.get(index).copied().flatten()
    }

    /// Overwrite the tile at `index`. Out-of-range writes are ignored.
    pub fn set(&mut self, index: usize, tile: Tile) {
        if let Some(slot) = self.tiles.get_mut(index) {
            *slot = tile;
        }
    }

    /// Exchange two cells. Both indices must be in range.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.tiles.swap(a, b);
    }

    /// Row of a flat index.
    #[must_use]
    pub fn row(&self, index: usize) -> usize {
        index / self.size
    }

    /// Column of a flat index.
    #[must_use]
    pub fn col(&self, index: usize) -> usize {
        index % self.size
    }

    /// Flat index of `(row, col)`.
    #[must_use]
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    /// Whether `index` addresses a cell.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.tiles.len()
    }

    /// Whether two cells are orthogonal neighbours.
    ///
    /// Left/right neighbours must share a row; a difference of one that
    /// crosses a row boundary is not adjacent.
    #[must_use]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        if !self.contains(a) || !self.contains(b) || a == b {
            return false;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        (hi - lo == 1 && self.row(lo) == self.row(hi)) || hi - lo == self.size
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Number of empty cells.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.tiles.len() - self.filled_count()
    }

    /// True when no cell is empty.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.tiles.iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_from_tiles_rejects_bad_length() {
        let err = Board::from_tiles(3, vec![None; 8]).unwrap_err();
        assert_eq!(
            err,
            BoardError::LengthMismatch {
                size: 3,
                expected: 9,
                actual: 8
            }
        );
        assert_eq!(Board::from_tiles(0, vec![]).unwrap_err(), BoardError::ZeroSize);
    }

    #[test]
    fn test_row_col_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let board = Board::random(8, &mut rng).unwrap();
        for index in 0..board.len() {
            assert_eq!(board.index_of(board.row(index), board.col(index)), index);
        }
        assert_eq!(board.row(17), 2);
        assert_eq!(board.col(17), 1);
    }

    #[test]
    fn test_adjacency_respects_row_boundaries() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let board = Board::random(8, &mut rng).unwrap();
        assert!(board.is_adjacent(0, 1));
        assert!(board.is_adjacent(9, 1));
        assert!(board.is_adjacent(9, 17));
        // 7 is the end of row 0, 8 the start of row 1
        assert!(!board.is_adjacent(7, 8));
        assert!(!board.is_adjacent(0, 9));
        assert!(!board.is_adjacent(3, 3));
        assert!(!board.is_adjacent(63, 64));
    }

    #[test]
    fn test_random_board_is_full() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let board = Board::random(6, &mut rng).unwrap();
        assert!(board.is_full());
        assert_eq!(board.filled_count(), 36);
        assert_eq!(board.empty_count(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let board = Board::random(4, &mut rng).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(board, back);
    }

    #[test]
    fn test_deserialize_rejects_malformed_grid() {
        let short = serde_json::from_str::<Board>(r#"{"size":2,"tiles":[null,null,null]}"#);
        assert!(short.unwrap_err().to_string().contains("needs 4 tiles, got 3"));

        let empty = serde_json::from_str::<Board>(r#"{"size":0,"tiles":[]}"#);
        assert!(empty.is_err());
    }
}
