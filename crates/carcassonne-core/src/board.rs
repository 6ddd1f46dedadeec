//! Square grid the tiles are laid on.
//!
//! This module contains:
//! - `Position`: integer grid cell with structural equality and hashing
//! - `Direction`: the four compass sides in ENWS order
//! - `Rotation`: quarter turns, always normalised to 0..=3
//! - `PlacedTile`: a catalog tile bound to a rotation
//! - `Board`: the mapping from cell to placed tile
//!
//! `+y` is North and `+x` is East.

use crate::placement::{check_placement, PlacementError};
use crate::tile::{Terrain, Tile, EDGE_COUNT, HALF_EDGE_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Text a position is rendered with before its coordinates.
const POSITION_PREFIX: &str = "Point2(";

/// One of the four sides of a tile or cell.
///
/// Discriminants match the stored edge order of catalog tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East = 0,
    North = 1,
    West = 2,
    South = 3,
}

impl Direction {
    /// All directions in ENWS order
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::North,
        Direction::West,
        Direction::South,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % EDGE_COUNT]
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Grid offset of the neighbouring cell on this side.
    pub const fn offset(self) -> Position {
        match self {
            Direction::East => Position::new(1, 0),
            Direction::North => Position::new(0, 1),
            Direction::West => Position::new(-1, 0),
            Direction::South => Position::new(0, -1),
        }
    }
}

/// Quarter turns applied to a tile before its edges are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Rotation(u8);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    /// All four distinct rotations
    pub const ALL: [Rotation; 4] = [Rotation(0), Rotation(1), Rotation(2), Rotation(3)];

    /// Any number of quarter turns, reduced modulo 4. Negative turns go the
    /// other way round.
    pub fn new(quarter_turns: i32) -> Self {
        Self(quarter_turns.rem_euclid(4) as u8)
    }

    pub const fn quarter_turns(self) -> usize {
        self.0 as usize
    }

    /// Stored edge index shown on side `direction` after rotating.
    pub fn stored_edge(self, direction: Direction) -> usize {
        (direction.index() + EDGE_COUNT - self.quarter_turns()) % EDGE_COUNT
    }

    /// Stored half-edge index shown at `half_edge` after rotating.
    pub fn stored_half_edge(self, half_edge: usize) -> usize {
        (half_edge % HALF_EDGE_COUNT + HALF_EDGE_COUNT - 2 * self.quarter_turns()) % HALF_EDGE_COUNT
    }

    /// Where stored half-edge `stored` ends up after rotating.
    fn rotated_half_edge(self, stored: usize) -> usize {
        (stored + 2 * self.quarter_turns()) % HALF_EDGE_COUNT
    }
}

impl From<i32> for Rotation {
    fn from(quarter_turns: i32) -> Self {
        Self::new(quarter_turns)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.0 as i32
    }
}

/// Grid cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent cell on side `direction`, or `None` past the edge of the
    /// `i32` grid. Nothing can be placed there, so callers treat it as empty.
    pub fn neighbor(self, direction: Direction) -> Option<Position> {
        let offset = direction.offset();
        Some(Position::new(
            self.x.checked_add(offset.x)?,
            self.y.checked_add(offset.y)?,
        ))
    }

    /// The adjacent cells in ENWS order, skipping any past the grid edge
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbor(direction))
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position::new(self.x - other.x, self.y - other.y)
    }
}

/// Positions travel as `Point2(x, y)` strings when used as map keys on the wire.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}, {})", POSITION_PREFIX, self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed position {0:?}, expected Point2(x, y)")]
pub struct PositionParseError(pub String);

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PositionParseError(s.to_string());

        let inner = s
            .trim()
            .strip_prefix(POSITION_PREFIX)
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;
        let (x, y) = inner.split_once(',').ok_or_else(malformed)?;

        let x = x.trim().parse().map_err(|_| malformed())?;
        let y = y.trim().parse().map_err(|_| malformed())?;
        Ok(Position::new(x, y))
    }
}

/// A catalog tile bound to a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTile {
    pub tile: &'static Tile,
    pub rotation: Rotation,
    /// Face-down marker. Nothing hides tiles yet, but clients receive it.
    pub hidden: bool,
}

impl PlacedTile {
    pub fn new(tile: &'static Tile, rotation: Rotation) -> Self {
        Self {
            tile,
            rotation,
            hidden: false,
        }
    }

    /// Terrain showing on side `direction`.
    pub fn edge(&self, direction: Direction) -> Terrain {
        self.tile.edge(self.rotation.stored_edge(direction))
    }

    /// Sides joined to `direction` inside the tile, including itself.
    pub fn connected_edges(&self, direction: Direction) -> Option<Vec<Direction>> {
        let turns = self.rotation.quarter_turns();
        self.tile
            .edge_group(self.rotation.stored_edge(direction))
            .map(|group| {
                group
                    .iter()
                    .map(|&stored| Direction::from_index(stored as usize + turns))
                    .collect()
            })
    }

    /// Half-edges sharing a field with `half_edge`, in rotated indices.
    pub fn field(&self, half_edge: usize) -> Option<Vec<usize>> {
        self.tile
            .field_group(self.rotation.stored_half_edge(half_edge))
            .map(|group| {
                group
                    .iter()
                    .map(|&stored| self.rotation.rotated_half_edge(stored as usize))
                    .collect()
            })
    }
}

/// Every tile placed so far. Each position holds at most one tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    tiles: HashMap<Position, PlacedTile>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position: Position) -> Option<&PlacedTile> {
        self.tiles.get(&position)
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.tiles.contains_key(&position)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &PlacedTile)> {
        self.tiles.iter().map(|(position, tile)| (*position, tile))
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.keys().copied()
    }

    /// Place a tile if the placement rules allow it.
    pub fn place(&mut self, position: Position, tile: PlacedTile) -> Result<(), PlacementError> {
        check_placement(self, position, &tile)?;
        self.tiles.insert(position, tile);
        Ok(())
    }

    /// Insert without checking the placement rules. Callers validate first.
    pub(crate) fn insert_unchecked(&mut self, position: Position, tile: PlacedTile) {
        self.tiles.insert(position, tile);
    }
}
