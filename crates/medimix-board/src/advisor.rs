//! Move advisor.
//!
//! Two side-effect-free searches over a board snapshot, used by the
//! consultant assist feature and never by the resolution path:
//!
//! - [`find_exhaustive_moves`]: every cell that takes part in at least one
//!   right/down neighbour swap producing a run of three or more.
//! - [`find_smart_rearrangements`]: a greedy ranker. Same-medication tiles are
//!   clustered by proximity, every cluster member is tried against nearby
//!   cells holding something else, and each resulting board is scored by
//!   the runs it contains. The top five swaps come back best first.
//!
//! The ranker is a local heuristic. Ties keep discovery order (clusters in
//! index order of their first member, then members in BFS order, then targets
//! in index order), which is stable but carries no meaning.

use std::collections::{BTreeSet, HashSet, VecDeque};

use glam::IVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::Board;

/// Maximum Manhattan distance between a tile and the cluster member that admits it.
pub const CLUSTER_RADIUS: i32 = 2;

/// Maximum Manhattan distance between the two cells of a candidate swap.
pub const SWAP_RADIUS: i32 = 3;

/// Points per tile of every run of three or more.
pub const POINTS_PER_RUN_TILE: u32 = 10;

/// Number of rearrangements returned by the ranker.
pub const TOP_REARRANGEMENTS: usize = 5;

/// Shortest run that counts as a match.
const MIN_RUN: usize = 3;

/// A scored swap suggested by the ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rearrangement {
    /// Cluster member to move.
    pub from: usize,
    /// Cell it trades places with.
    pub to: usize,
    /// Score of the board after the swap.
    pub score: u32,
}

/// All cells involved in at least one right/down swap that yields a run ≥3.
///
/// The result is sorted and deduplicated.
#[must_use]
pub fn find_exhaustive_moves(board: &Board) -> Vec<usize> {
    let size = board.size();
    let mut found = BTreeSet::new();
    let mut scratch = board.clone();

    for row in 0..size {
        for col in 0..size {
            let index = board.index_of(row, col);
            let neighbours = [
                (col + 1 < size).then(|| index + 1),
                (row + 1 < size).then(|| index + size),
            ];
            for other in neighbours.into_iter().flatten() {
                scratch.swap(index, other);
                if anchors_run(&scratch, index) || anchors_run(&scratch, other) {
                    found.insert(index);
                    found.insert(other);
                }
                scratch.swap(index, other);
            }
        }
    }

    found.into_iter().collect()
}

/// Whether the tile at `index` sits in a horizontal or vertical run of ≥3.
#[must_use]
pub fn anchors_run(board: &Board, index: usize) -> bool {
    let Some(med) = board.tile(index) else {
        return false;
    };
    let size = board.size();
    let (row, col) = (board.row(index), board.col(index));
    let same = |r: usize, c: usize| board.tile(board.index_of(r, c)) == Some(med);

    let left = (0..col).rev().take_while(|&c| same(row, c)).count();
    let right = (col + 1..size).take_while(|&c| same(row, c)).count();
    if left + right + 1 >= MIN_RUN {
        return true;
    }

    let up = (0..row).rev().take_while(|&r| same(r, col)).count();
    let down = (row + 1..size).take_while(|&r| same(r, col)).count();
    up + down + 1 >= MIN_RUN
}

/// Sum of `run_length × 10` over every maximal horizontal and vertical run ≥3.
#[must_use]
pub fn score_board(board: &Board) -> u32 {
    let size = board.size();
    let mut score = 0;
    for line in 0..size {
        score += score_line(board, (0..size).map(|c| board.index_of(line, c)));
        score += score_line(board, (0..size).map(|r| board.index_of(r, line)));
    }
    score
}

fn score_line(board: &Board, cells: impl Iterator<Item = usize>) -> u32 {
    let mut score = 0;
    let mut current = None;
    let mut run = 0usize;
    for index in cells {
        let tile = board.tile(index);
        if tile.is_some() && tile == current {
            run += 1;
        } else {
            score += run_points(run);
            current = tile;
            run = usize::from(tile.is_some());
        }
    }
    score + run_points(run)
}

fn run_points(run: usize) -> u32 {
    if run >= MIN_RUN {
        u32::try_from(run).unwrap_or(u32::MAX) * POINTS_PER_RUN_TILE
    } else {
        0
    }
}

/// Group same-medication tiles by BFS, admitting any unvisited tile of the
/// same medication within [`CLUSTER_RADIUS`] of a member. Clusters smaller
/// than two are dropped.
#[must_use]
pub fn find_clusters(board: &Board) -> Vec<Vec<usize>> {
    let mut visited = vec![false; board.len()];
    let mut clusters = Vec::new();

    for start in 0..board.len() {
        let Some(med) = board.tile(start) else {
            continue;
        };
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let mut cluster = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let origin = cell(board, current);
            for candidate in 0..board.len() {
                if visited[candidate] || board.tile(candidate) != Some(med) {
                    continue;
                }
                if manhattan(origin, cell(board, candidate)) <= CLUSTER_RADIUS {
                    visited[candidate] = true;
                    cluster.push(candidate);
                    queue.push_back(candidate);
                }
            }
        }

        if cluster.len() >= 2 {
            clusters.push(cluster);
        }
    }

    clusters
}

/// Top [`TOP_REARRANGEMENTS`] swaps by post-swap board score, best first.
///
/// Candidates pair every member of every cluster from [`find_clusters`]
/// with every occupied cell within Manhattan distance [`SWAP_RADIUS`] of it
/// that holds a different medication. The partner need not be adjacent or
/// belong to a cluster. Pairs of equal tiles are skipped since swapping them
/// leaves the board unchanged, and each unordered pair is scored once, in
/// the order it is first met.
///
/// Only swaps that score above zero are returned.
#[must_use]
pub fn find_smart_rearrangements(board: &Board) -> Vec<Rearrangement> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for cluster in find_clusters(board) {
        for &member in &cluster {
            let origin = cell(board, member);
            let med = board.tile(member);
            for target in 0..board.len() {
                if target == member || board.tile(target).is_none() || board.tile(target) == med {
                    continue;
                }
                if manhattan(origin, cell(board, target)) > SWAP_RADIUS {
                    continue;
                }
                let key = (member.min(target), member.max(target));
                if seen.insert(key) {
                    candidates.push((member, target));
                }
            }
        }
    }

    // Scoring is independent per candidate; collect() keeps discovery order.
    let mut scored: Vec<Rearrangement> = candidates
        .par_iter()
        .map(|&(from, to)| {
            let mut trial = board.clone();
            trial.swap(from, to);
            Rearrangement {
                from,
                to,
                score: score_board(&trial),
            }
        })
        .filter(|r| r.score > 0)
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(TOP_REARRANGEMENTS);
    scored
}

// Board edges are far below i32::MAX
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn cell(board: &Board, index: usize) -> IVec2 {
    IVec2::new(board.col(index) as i32, board.row(index) as i32)
}

fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a - b).abs().element_sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Medication::{self, *};

    fn quiet_board() -> Board {
        let palette = [Capsulon, Tablix, Syrupix, Pillora];
        let meds: Vec<Medication> = (0..64)
            .map(|i| palette[(i % 8 + 2 * ((i / 8) % 2)) % 4])
            .collect();
        Board::from_medications(8, &meds).unwrap()
    }

    #[test]
    fn test_exhaustive_moves_on_prepared_board() {
        let mut board = quiet_board();
        board.set(0, Some(Gelux));
        board.set(1, Some(Gelux));
        board.set(10, Some(Gelux));
        let moves = find_exhaustive_moves(&board);
        assert!(moves.contains(&2));
        assert!(moves.contains(&10));
    }

    #[test]
    fn test_exhaustive_moves_are_real() {
        let mut board = quiet_board();
        board.set(0, Some(Gelux));
        board.set(1, Some(Gelux));
        board.set(10, Some(Gelux));
        for index in find_exhaustive_moves(&board) {
            let size = board.size();
            let mut partners = vec![];
            if board.col(index) + 1 < size {
                partners.push(index + 1);
            }
            if board.col(index) > 0 {
                partners.push(index - 1);
            }
            if index + size < board.len() {
                partners.push(index + size);
            }
            if index >= size {
                partners.push(index - size);
            }
            let ok = partners.into_iter().any(|other| {
                let mut trial = board.clone();
                trial.swap(index, other);
                anchors_run(&trial, index) || anchors_run(&trial, other)
            });
            assert!(ok, "index {index} has no producing swap");
        }
    }

    #[test]
    fn test_score_board_counts_every_run() {
        let mut board = quiet_board();
        assert_eq!(score_board(&board), 0);
        for col in 0..4 {
            board.set(col, Some(Injecta));
        }
        assert_eq!(score_board(&board), 40);
        for row in 1..3 {
            board.set(row * 8 + 7, Some(VitaDose));
        }
        board.set(7, Some(VitaDose));
        assert_eq!(score_board(&board), 70);
    }

    #[test]
    fn test_clusters_respect_radius() {
        let mut board = quiet_board();
        board.set(0, Some(Gelux));
        board.set(2, Some(Gelux));
        board.set(4, Some(Gelux));
        board.set(63, Some(Gelux));
        let clusters = find_clusters(&board);
        let gelux: Vec<_> = clusters
            .iter()
            .filter(|c| board.tile(c[0]) == Some(Gelux))
            .collect();
        assert_eq!(gelux.len(), 1);
        assert_eq!(gelux[0], &vec![0, 2, 4]);
    }

    #[test]
    fn test_smart_rearrangements_ranked_and_bounded() {
        let mut board = quiet_board();
        board.set(0, Some(Gelux));
        board.set(1, Some(Gelux));
        board.set(10, Some(Gelux));
        let ranked = find_smart_rearrangements(&board);
        assert!(!ranked.is_empty());
        assert!(ranked.len() <= TOP_REARRANGEMENTS);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for r in &ranked {
            assert!(manhattan(cell(&board, r.from), cell(&board, r.to)) <= SWAP_RADIUS);
            let mut trial = board.clone();
            trial.swap(r.from, r.to);
            assert_eq!(score_board(&trial), r.score);
        }
    }

    #[test]
    fn test_rearrangement_partner_may_be_distant() {
        // No two equal tiles lie within clustering range of each other.
        let palette = [Capsulon, Tablix, Syrupix, Pillora, Injecta];
        let meds: Vec<Medication> = (0..64)
            .map(|i| palette[(3 * (i / 8) + i % 8) % 5])
            .collect();
        let mut board = Board::from_medications(8, &meds).unwrap();
        board.set(0, Some(Gelux));
        board.set(1, Some(Gelux));
        board.set(17, Some(Gelux));
        let ranked = find_smart_rearrangements(&board);

        assert_eq!(ranked.len(), 2);
        assert!(ranked
            .iter()
            .any(|r| (r.from.min(r.to), r.from.max(r.to)) == (2, 17)));
        assert!(!board.is_adjacent(2, 17));
        for r in &ranked {
            assert_ne!(board.tile(r.from), board.tile(r.to));
        }
    }

    #[test]
    fn test_rearrangements_never_score_zero() {
        let meds: Vec<Medication> = (0..16)
            .map(|i| if (i % 4 + i / 4) % 2 == 0 { Tablix } else { Gelux })
            .collect();
        let board = Board::from_medications(4, &meds).unwrap();
        assert!(find_smart_rearrangements(&board)
            .iter()
            .all(|r| r.score > 0));
    }
}
