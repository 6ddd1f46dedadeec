//! Deck composition and the draw pile.
//!
//! The standard box holds 72 base tiles and 12 river tiles. With the river
//! variant the river is dealt first: the spring, the remaining river pieces in
//! random order, then the lake that closes it. The ordinary starting tile comes
//! next, followed by the rest of the base tiles in random order. Without
//! rivers the starting tile is dealt first and river tiles are left in the box.

use crate::tile::{catalog, Tile};
use rand::seq::SliceRandom;
use rand::Rng;

/// River spring. The box holds two: one opens the river, one closes it.
pub const RIVER_SPRING_KEY: &str = "0r0c_R1";

/// City on one side, road straight across: the usual first tile.
pub const START_TILE_KEY: &str = "2r1c_R0_(A)";

/// Tiles in the base game.
pub const BASE_TILE_COUNT: usize = 72;

/// Tiles in the river expansion.
pub const RIVER_TILE_COUNT: usize = 12;

/// How many copies of each tile type are in the box.
pub const TILE_QUANTITIES: [(&str, usize); 33] = [
    ("0r0c_R0+M", 4),
    (RIVER_SPRING_KEY, 2),
    ("0r0c_R2_(A)", 2),
    ("0r0c_R2_(B)", 2),
    ("0r1c_R0", 5),
    ("0r2c_R0_(A)", 3),
    ("0r2c_R0_(B)", 2),
    ("0r2c_R0_(C)+C", 2),
    ("0r2c_R0_(C)", 1),
    ("0r2c_R0_(D)+C", 2),
    ("0r2c_R0_(D)", 3),
    ("0r2c_R2_(A)", 1),
    ("0r2c_R2_(B)", 1),
    ("0r3c_R0+C", 1),
    ("0r3c_R0", 3),
    ("0r4c_R0+C", 1),
    ("1r0c_R0+M", 2),
    ("1r0c_R2+M", 1),
    ("1r1c_R2", 1),
    ("1r3c_R0+C", 2),
    ("1r3c_R0", 1),
    ("2r0c_R0_(A)", 8),
    ("2r0c_R0_(B)", 9),
    ("2r0c_R2_(A)", 1),
    ("2r0c_R2_(B)", 1),
    (START_TILE_KEY, 4),
    ("2r1c_R0_(B)", 3),
    ("2r1c_R0_(C)", 3),
    ("2r2c_R0+C", 2),
    ("2r2c_R0", 3),
    ("3r0c_R0+V", 4),
    ("3r1c_R0+V", 3),
    ("4r0c_R0+V", 1),
];

/// Copies of the tile type `key` in the box. Unknown keys have none.
pub fn quantity(key: &str) -> usize {
    TILE_QUANTITIES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(0, |(_, count)| *count)
}

/// Every tile in the box, river tiles included, in catalog order.
pub fn standard_tiles() -> Vec<&'static Tile> {
    catalog()
        .iter()
        .flat_map(|tile| std::iter::repeat(tile).take(quantity(tile.key())))
        .collect()
}

/// A shuffled copy of `items`. Every ordering is equally likely and the
/// input is left untouched.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut copy = items.to_vec();
    copy.shuffle(rng);
    copy
}

/// Remove one copy of `key` from `tiles`, if there is one.
fn take_reserved(tiles: &mut Vec<&'static Tile>, key: &str) -> Option<&'static Tile> {
    let index = tiles.iter().position(|tile| tile.key() == key)?;
    Some(tiles.remove(index))
}

/// Build a freshly shuffled draw pile.
pub fn build_deck<R: Rng + ?Sized>(rivers: bool, rng: &mut R) -> DrawPile {
    let (mut river, mut base): (Vec<_>, Vec<_>) =
        standard_tiles().into_iter().partition(|tile| tile.is_river());

    let start = take_reserved(&mut base, START_TILE_KEY);
    let mut draw_order = Vec::with_capacity(BASE_TILE_COUNT + RIVER_TILE_COUNT);

    if rivers {
        let spring = take_reserved(&mut river, RIVER_SPRING_KEY);
        let lake = take_reserved(&mut river, RIVER_SPRING_KEY);
        draw_order.extend(spring);
        draw_order.extend(shuffled(&river, rng));
        draw_order.extend(lake);
    }

    draw_order.extend(start);
    draw_order.extend(shuffled(&base, rng));

    DrawPile::from_draw_order(draw_order)
}

/// Tiles waiting to be drawn. Only ever shrinks.
///
/// Stored as a stack: the last element is the next tile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawPile {
    tiles: Vec<&'static Tile>,
}

impl DrawPile {
    /// Build from tiles listed in the order they will be drawn.
    pub fn from_draw_order(mut tiles: Vec<&'static Tile>) -> Self {
        tiles.reverse();
        Self { tiles }
    }

    /// Build from stack order, last element drawn first.
    pub fn from_stack(tiles: Vec<&'static Tile>) -> Self {
        Self { tiles }
    }

    /// The next tile, without drawing it.
    pub fn peek(&self) -> Option<&'static Tile> {
        self.tiles.last().copied()
    }

    /// Draw the next tile.
    pub fn pop(&mut self) -> Option<&'static Tile> {
        self.tiles.pop()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Stack order, the next tile last.
    pub fn as_stack(&self) -> &[&'static Tile] {
        &self.tiles
    }

    /// The tiles in the order they will be drawn.
    pub fn draw_order(&self) -> impl Iterator<Item = &'static Tile> + '_ {
        self.tiles.iter().rev().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::lookup;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn counts<'a>(tiles: impl Iterator<Item = &'a Tile>) -> HashMap<&'a str, usize> {
        let mut counts = HashMap::new();
        for tile in tiles {
            *counts.entry(tile.key()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_quantities_cover_the_catalog() {
        for tile in catalog() {
            assert!(quantity(tile.key()) > 0, "{} has no quantity", tile.key());
        }
        for (key, _) in TILE_QUANTITIES {
            assert!(lookup(key).is_ok(), "{key} is not in the catalog");
        }
        assert_eq!(standard_tiles().len(), BASE_TILE_COUNT + RIVER_TILE_COUNT);
        assert_eq!(
            standard_tiles().iter().filter(|t| t.is_river()).count(),
            RIVER_TILE_COUNT
        );
    }

    #[test]
    fn test_river_deck_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let deck = build_deck(true, &mut rng);
        assert_eq!(deck.len(), BASE_TILE_COUNT + RIVER_TILE_COUNT);

        let counts = counts(deck.draw_order());
        for (key, expected) in TILE_QUANTITIES {
            assert_eq!(counts.get(key).copied().unwrap_or(0), expected, "{key}");
        }
    }

    #[test]
    fn test_base_deck_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let deck = build_deck(false, &mut rng);
        assert_eq!(deck.len(), BASE_TILE_COUNT);

        let counts = counts(deck.draw_order());
        for tile in catalog() {
            let expected = if tile.is_river() { 0 } else { quantity(tile.key()) };
            assert_eq!(counts.get(tile.key()).copied().unwrap_or(0), expected, "{}", tile.key());
        }
    }

    #[test]
    fn test_river_deck_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let order: Vec<_> = build_deck(true, &mut rng).draw_order().collect();

        assert_eq!(order[0].key(), RIVER_SPRING_KEY);
        assert!(order[..RIVER_TILE_COUNT].iter().all(|t| t.is_river()));
        assert_eq!(order[RIVER_TILE_COUNT - 1].key(), RIVER_SPRING_KEY);
        assert_eq!(order[RIVER_TILE_COUNT].key(), START_TILE_KEY);
        assert!(order[RIVER_TILE_COUNT..].iter().all(|t| !t.is_river()));
    }

    #[test]
    fn test_base_deck_starts_with_start_tile() {
        let mut rng = StdRng::seed_from_u64(3);
        let deck = build_deck(false, &mut rng);
        assert_eq!(deck.peek().map(Tile::key), Some(START_TILE_KEY));
        assert!(deck.draw_order().all(|t| !t.is_river()));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let input: Vec<u32> = (0..50).collect();
        let original = input.clone();

        let output = shuffled(&input, &mut rng);
        assert_eq!(input, original);
        assert_eq!(output.len(), input.len());
        assert_ne!(output, input);

        let mut sorted = output.clone();
        sorted.sort();
        assert_eq!(sorted, input);
    }

    #[test]
    fn test_shuffle_reaches_every_ordering() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        for _ in 0..6000 {
            *seen.entry(shuffled(&[1u8, 2, 3], &mut rng)).or_insert(0) += 1;
        }
        assert_eq!(seen.len(), 6);
        // Roughly uniform: each of the 6 orderings near 1000
        assert!(seen.values().all(|&n| (800..1200).contains(&n)), "{seen:?}");
    }

    #[test]
    fn test_draw_pile_stack() {
        let a = lookup("0r0c_R0+M").unwrap();
        let b = lookup("4r0c_R0+V").unwrap();
        let mut pile = DrawPile::from_draw_order(vec![a, b]);

        assert_eq!(pile.peek(), Some(a));
        assert_eq!(pile.len(), 2);
        assert_eq!(pile.as_stack(), &[b, a]);
        assert_eq!(pile.pop(), Some(a));
        assert_eq!(pile.pop(), Some(b));
        assert_eq!(pile.pop(), None);
        assert!(pile.is_empty());
    }
}
