//! Placement rules.
//!
//! A tile may go on a cell when:
//! 1. The cell is empty
//! 2. Every occupied neighbour shows the same terrain on the shared side
//! 3. At least one neighbour is occupied, unless the board is empty
//!
//! Everything here reads the board and never changes it.

use crate::board::{Board, Direction, PlacedTile, Position, Rotation};
use crate::tile::{Terrain, Tile};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("{0} is already occupied")]
    Occupied(Position),

    #[error("{direction:?} edge is {ours:?} but the neighbouring tile shows {theirs:?}")]
    EdgeMismatch {
        direction: Direction,
        ours: Terrain,
        theirs: Terrain,
    },

    #[error("{0} does not touch any placed tile")]
    NotAdjacent(Position),
}

/// Check whether `tile` may be placed at `position` on `board`.
pub fn check_placement(
    board: &Board,
    position: Position,
    tile: &PlacedTile,
) -> Result<(), PlacementError> {
    if board.is_occupied(position) {
        return Err(PlacementError::Occupied(position));
    }

    let mut has_neighbor = false;
    for direction in Direction::ALL {
        let Some(neighbor) = position.neighbor(direction).and_then(|p| board.get(p)) else {
            continue;
        };
        has_neighbor = true;

        let ours = tile.edge(direction);
        let theirs = neighbor.edge(direction.opposite());
        if ours != theirs {
            return Err(PlacementError::EdgeMismatch {
                direction,
                ours,
                theirs,
            });
        }
    }

    if !has_neighbor && !board.is_empty() {
        return Err(PlacementError::NotAdjacent(position));
    }

    Ok(())
}

/// Boolean form of [`check_placement`].
pub fn is_valid_placement(board: &Board, position: Position, tile: &PlacedTile) -> bool {
    check_placement(board, position, tile).is_ok()
}

/// Empty cells next to at least one placed tile, sorted.
///
/// On an empty board any cell is legal; the origin is offered.
pub fn open_positions(board: &Board) -> Vec<Position> {
    if board.is_empty() {
        return vec![Position::ORIGIN];
    }

    let open: BTreeSet<Position> = board
        .positions()
        .flat_map(Position::neighbors)
        .filter(|p| !board.is_occupied(*p))
        .collect();
    open.into_iter().collect()
}

/// Every legal (position, rotation) for `tile` on the current board.
pub fn valid_placements(board: &Board, tile: &'static Tile) -> Vec<(Position, Rotation)> {
    open_positions(board)
        .into_iter()
        .flat_map(|position| Rotation::ALL.map(|rotation| (position, rotation)))
        .filter(|&(position, rotation)| {
            is_valid_placement(board, position, &PlacedTile::new(tile, rotation))
        })
        .collect()
}

/// Whether `tile` fits anywhere at all.
pub fn has_valid_placement(board: &Board, tile: &'static Tile) -> bool {
    open_positions(board).into_iter().any(|position| {
        Rotation::ALL
            .into_iter()
            .any(|rotation| is_valid_placement(board, position, &PlacedTile::new(tile, rotation)))
    })
}

/// Whether every placed tile matches all of its neighbours and the tiles form
/// a single connected group.
pub fn is_valid_board(board: &Board) -> bool {
    let edges_match = board.iter().all(|(position, tile)| {
        Direction::ALL.into_iter().all(|direction| {
            match position.neighbor(direction).and_then(|p| board.get(p)) {
                Some(neighbor) => tile.edge(direction) == neighbor.edge(direction.opposite()),
                None => true,
            }
        })
    });
    edges_match && is_connected(board)
}

/// Flood fill from any tile; every tile must be reached.
fn is_connected(board: &Board) -> bool {
    let Some(start) = board.positions().next() else {
        return true;
    };

    let mut seen = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(position) = stack.pop() {
        for next in position.neighbors() {
            if board.is_occupied(next) && seen.insert(next) {
                stack.push(next);
            }
        }
    }
    seen.len() == board.len()
}
