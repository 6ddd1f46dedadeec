//! Tile catalog.
//!
//! Every distinct tile type of the base game plus the river expansion, with:
//! - the terrain on each of the four edges
//! - interior qualities (monastery, shield)
//! - which edges are joined inside the tile (roads and cities)
//! - which of the eight half-edges share a field
//!
//! Edges are stored in ENWS order: index 0 is East, 1 North, 2 West, 3 South.
//! Half-edges follow the same order two at a time, so half-edges 0 and 1 lie
//! on the East edge, 2 and 3 on the North edge, and so on.
//!
//! The catalog is built once and never mutated. Tile keys double as the sprite
//! identifiers clients render with, so they must stay stable.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Number of edges on a tile.
pub const EDGE_COUNT: usize = 4;

/// Number of half-edges on a tile.
pub const HALF_EDGE_COUNT: usize = 8;

/// Placeholder in a connectivity pattern for "joined to nothing".
pub const UNCONNECTED: char = '_';

/// Errors raised by catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("No tile with key {0:?}")]
    NotFound(String),
}

/// Terrain along one edge of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Field,
    Road,
    River,
    City,
}

/// Special markers drawn inside a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Monastery,
    /// Pennant on a city segment
    Shield,
}

/// Interior connectivity, either as explicit index groups or as a pattern
/// string where equal characters mark indices that belong together.
///
/// `"aa__"` and `vec![vec![0, 1]]` describe the same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connectivity {
    Groups(Vec<Vec<u8>>),
    Pattern(String),
}

impl Connectivity {
    /// Decode into index groups.
    pub fn into_groups(self) -> Vec<Vec<u8>> {
        match self {
            Connectivity::Groups(groups) => groups,
            Connectivity::Pattern(pattern) => connected_groups(&pattern),
        }
    }
}

impl From<&str> for Connectivity {
    fn from(pattern: &str) -> Self {
        Connectivity::Pattern(pattern.to_string())
    }
}

impl From<Vec<Vec<u8>>> for Connectivity {
    fn from(groups: Vec<Vec<u8>>) -> Self {
        Connectivity::Groups(groups)
    }
}

/// Decode a positional pattern into groups of connected indices.
///
/// Groups come out in order of the first appearance of their character.
/// The placeholder and characters that appear only once are dropped, since a
/// lone index is connected to nothing.
///
/// `"aaabbacc"` decodes to `[[0, 1, 2, 5], [3, 4], [6, 7]]`.
pub fn connected_groups(pattern: &str) -> Vec<Vec<u8>> {
    let mut order: Vec<char> = Vec::new();
    let mut members: HashMap<char, Vec<u8>> = HashMap::new();

    for (index, c) in pattern.chars().enumerate() {
        if c == UNCONNECTED {
            continue;
        }
        let group = members.entry(c).or_insert_with(|| {
            order.push(c);
            Vec::new()
        });
        group.push(index as u8);
    }

    order
        .into_iter()
        .filter_map(|c| members.remove(&c))
        .filter(|group| group.len() > 1)
        .collect()
}

/// One tile type. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    key: String,
    edges: [Terrain; EDGE_COUNT],
    qualities: Vec<Quality>,
    connected_edges: Vec<Vec<u8>>,
    connected_fields: Vec<Vec<u8>>,
}

impl Tile {
    /// Build a tile. `edges` are in ENWS order.
    pub fn new(
        key: impl Into<String>,
        edges: [Terrain; EDGE_COUNT],
        qualities: &[Quality],
        connected_edges: impl Into<Connectivity>,
        connected_fields: impl Into<Connectivity>,
    ) -> Self {
        Self {
            key: key.into(),
            edges,
            qualities: qualities.to_vec(),
            connected_edges: connected_edges.into().into_groups(),
            connected_fields: connected_fields.into().into_groups(),
        }
    }

    /// Catalog key, also used as the sprite identifier on the wire.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Edge terrains in stored (unrotated) ENWS order.
    pub fn edges(&self) -> &[Terrain; EDGE_COUNT] {
        &self.edges
    }

    /// Terrain of a stored edge. Indices wrap modulo 4.
    pub fn edge(&self, index: usize) -> Terrain {
        self.edges[index % EDGE_COUNT]
    }

    pub fn qualities(&self) -> &[Quality] {
        &self.qualities
    }

    pub fn has_quality(&self, quality: Quality) -> bool {
        self.qualities.contains(&quality)
    }

    pub fn connected_edges(&self) -> &[Vec<u8>] {
        &self.connected_edges
    }

    pub fn connected_fields(&self) -> &[Vec<u8>] {
        &self.connected_fields
    }

    /// The group of stored edges joined to `index`, if it is joined to any.
    pub fn edge_group(&self, index: usize) -> Option<&[u8]> {
        let index = (index % EDGE_COUNT) as u8;
        self.connected_edges
            .iter()
            .find(|group| group.contains(&index))
            .map(Vec::as_slice)
    }

    /// The field group containing stored half-edge `index`, if it has one.
    pub fn field_group(&self, index: usize) -> Option<&[u8]> {
        let index = (index % HALF_EDGE_COUNT) as u8;
        self.connected_fields
            .iter()
            .find(|group| group.contains(&index))
            .map(Vec::as_slice)
    }

    pub fn has_terrain(&self, terrain: Terrain) -> bool {
        self.edges.contains(&terrain)
    }

    /// River tiles are dealt in their own phase of the deck.
    pub fn is_river(&self) -> bool {
        self.has_terrain(Terrain::River)
    }
}

use Quality::{Monastery, Shield};
use Terrain::{City as C, Field as F, River as W, Road as R};

static CATALOG: Lazy<Vec<Tile>> = Lazy::new(|| {
    vec![
        // No roads, no cities
        Tile::new("0r0c_R0+M", [F, F, F, F], &[Monastery], "____", "aaaaaaaa"),
        // River spring and lake share one tile type
        Tile::new("0r0c_R1", [F, F, F, W], &[], "____", "aaaaaaaa"),
        Tile::new("0r0c_R2_(A)", [W, F, W, F], &[], "____", "baaaabbb"),
        Tile::new("0r0c_R2_(B)", [F, F, W, W], &[], "____", "aaaaabba"),
        // Cities only
        Tile::new("0r1c_R0", [F, C, F, F], &[], "____", "aa__aaaa"),
        Tile::new("0r2c_R0_(A)", [F, C, F, C], &[], "____", "aa__aa__"),
        Tile::new("0r2c_R0_(B)", [C, C, F, F], &[], "____", "____aaaa"),
        Tile::new("0r2c_R0_(C)+C", [C, F, C, F], &[Shield], "a_a_", "__aa__bb"),
        Tile::new("0r2c_R0_(C)", [C, F, C, F], &[], "a_a_", "__aa__bb"),
        Tile::new("0r2c_R0_(D)+C", [C, C, F, F], &[Shield], "aa__", "____aaaa"),
        Tile::new("0r2c_R0_(D)", [C, C, F, F], &[], "aa__", "____aaaa"),
        Tile::new("0r2c_R2_(A)", [W, C, W, C], &[], "abac", "ba__ab__"),
        Tile::new("0r2c_R2_(B)", [C, C, W, W], &[], "aabb", "____abba"),
        Tile::new("0r3c_R0+C", [C, C, C, F], &[Shield], "aaa_", "______aa"),
        Tile::new("0r3c_R0", [C, C, C, F], &[], "aaa_", "______aa"),
        Tile::new("0r4c_R0+C", [C, C, C, C], &[Shield], "aaaa", "________"),
        // One road
        Tile::new("1r0c_R0+M", [F, F, F, R], &[Monastery], "____", "aaaaaaaa"),
        Tile::new("1r0c_R2+M", [W, F, W, R], &[Monastery], "w_wr", "baaaaccb"),
        Tile::new("1r1c_R2", [W, C, W, R], &[], "w_w_", "baaaabbb"),
        Tile::new("1r3c_R0+C", [C, C, C, R], &[Shield], "aaa_", "______ab"),
        Tile::new("1r3c_R0", [C, C, C, R], &[], "aaa_", "______ab"),
        // Two roads
        Tile::new("2r0c_R0_(A)", [R, F, R, F], &[], "a_a_", "baaaabbb"),
        Tile::new("2r0c_R0_(B)", [F, F, R, R], &[], "__aa", "aaaaabba"),
        Tile::new("2r0c_R2_(A)", [W, R, W, R], &[], "abab", "daabbccd"),
        Tile::new("2r0c_R2_(B)", [R, R, W, W], &[], "aabb", "baabbccb"),
        Tile::new("2r1c_R0_(A)", [R, C, R, F], &[], "1_1_", "21__1222"),
        Tile::new("2r1c_R0_(B)", [F, C, R, R], &[], "__11", "11__1221"),
        Tile::new("2r1c_R0_(C)", [R, C, F, R], &[], "1__1", "21__1112"),
        Tile::new("2r2c_R0+C", [C, C, R, R], &[Shield], "1122", "____1221"),
        Tile::new("2r2c_R0", [C, C, R, R], &[], "1122", "____1221"),
        // Three or four roads ending in a village
        Tile::new("3r0c_R0+V", [R, F, R, R], &[], "1_23", "31111223"),
        Tile::new("3r1c_R0+V", [R, C, R, R], &[], "1_23", "31__1223"),
        Tile::new("4r0c_R0+V", [R, R, R, R], &[], "1234", "41122334"),
    ]
});

static BY_KEY: Lazy<HashMap<&'static str, &'static Tile>> = Lazy::new(|| {
    let catalog: &'static [Tile] = &CATALOG;
    catalog.iter().map(|tile| (tile.key(), tile)).collect()
});

/// All distinct tile types, in catalog order.
pub fn catalog() -> &'static [Tile] {
    &CATALOG
}

/// Look a tile type up by its key.
pub fn lookup(key: &str) -> Result<&'static Tile, CatalogError> {
    BY_KEY
        .get(key)
        .copied()
        .ok_or_else(|| CatalogError::NotFound(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_connected_groups_decoding() {
        assert_eq!(
            connected_groups("aaabbacc"),
            vec![vec![0, 1, 2, 5], vec![3, 4], vec![6, 7]]
        );
        assert!(connected_groups("____").is_empty());
        // Singletons are not connections
        assert_eq!(connected_groups("w_wr"), vec![vec![0, 2]]);
        assert_eq!(connected_groups("1_23"), Vec::<Vec<u8>>::new());
    }

    #[test]
    fn test_pattern_and_groups_construct_equal_tiles() {
        let from_pattern = Tile::new("x", [C, C, R, R], &[], "1122", "____1221");
        let from_groups = Tile::new(
            "x",
            [C, C, R, R],
            &[],
            vec![vec![0, 1], vec![2, 3]],
            vec![vec![4, 7], vec![5, 6]],
        );
        assert_eq!(from_pattern, from_groups);
    }

    #[test]
    fn test_catalog_keys_are_unique() {
        let keys: HashSet<_> = catalog().iter().map(Tile::key).collect();
        assert_eq!(keys.len(), catalog().len());
        assert_eq!(catalog().len(), 33);
    }

    #[test]
    fn test_lookup() {
        let tile = lookup("0r4c_R0+C").unwrap();
        assert_eq!(tile.edges(), &[C, C, C, C]);
        assert!(tile.has_quality(Shield));
        assert!(!tile.has_quality(Monastery));

        assert_eq!(
            lookup("9r9c_nope"),
            Err(CatalogError::NotFound("9r9c_nope".to_string()))
        );
    }

    #[test]
    fn test_river_tiles() {
        let rivers: Vec<_> = catalog().iter().filter(|t| t.is_river()).map(Tile::key).collect();
        assert_eq!(
            rivers,
            vec![
                "0r0c_R1",
                "0r0c_R2_(A)",
                "0r0c_R2_(B)",
                "0r2c_R2_(A)",
                "0r2c_R2_(B)",
                "1r0c_R2+M",
                "1r1c_R2",
                "2r0c_R2_(A)",
                "2r0c_R2_(B)",
            ]
        );
    }

    #[test]
    fn test_every_half_edge_belongs_to_at_most_one_group() {
        for tile in catalog() {
            let mut seen = HashSet::new();
            for group in tile.connected_fields() {
                for &index in group {
                    assert!((index as usize) < HALF_EDGE_COUNT, "{}", tile.key());
                    assert!(seen.insert(index), "{} repeats half-edge {}", tile.key(), index);
                }
            }
        }
    }

    #[test]
    fn test_edge_and_field_groups() {
        let tile = lookup("2r2c_R0").unwrap();
        assert_eq!(tile.edge_group(1), Some(&[0u8, 1][..]));
        assert_eq!(tile.edge_group(6), Some(&[2u8, 3][..]));
        assert_eq!(tile.field_group(5), Some(&[5u8, 6][..]));
        assert_eq!(tile.field_group(0), None);
    }
}
