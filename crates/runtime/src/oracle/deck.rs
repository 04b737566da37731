//! Shared draw piles served through [`terra_core::DeckService`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use terra_core::{CardId, DeckService};
use tracing::debug;

#[derive(Debug, Default)]
struct Piles {
    projects: VecDeque<CardId>,
    corporations: VecDeque<CardId>,
}

/// One game's project and corporation piles.
///
/// Draws are serialized by an internal mutex. An exhausted pile hands out
/// fewer cards; it is never reshuffled.
#[derive(Debug, Default)]
pub struct SharedDeck {
    piles: Mutex<Piles>,
}

impl SharedDeck {
    /// Piles drawn in the given order.
    pub fn new(
        projects: impl IntoIterator<Item = CardId>,
        corporations: impl IntoIterator<Item = CardId>,
    ) -> Self {
        Self {
            piles: Mutex::new(Piles {
                projects: projects.into_iter().collect(),
                corporations: corporations.into_iter().collect(),
            }),
        }
    }

    /// Piles shuffled deterministically from `seed`.
    pub fn shuffled(projects: Vec<CardId>, corporations: Vec<CardId>, seed: u64) -> Self {
        let mut rng = Pcg::new(seed);
        let projects = rng.shuffle(projects);
        let corporations = rng.shuffle(corporations);
        Self::new(projects, corporations)
    }

    pub fn projects_remaining(&self) -> usize {
        self.piles().projects.len()
    }

    pub fn corporations_remaining(&self) -> usize {
        self.piles().corporations.len()
    }

    fn piles(&self) -> MutexGuard<'_, Piles> {
        self.piles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn draw(pile: &mut VecDeque<CardId>, count: usize, name: &'static str) -> Vec<CardId> {
    let taken = count.min(pile.len());
    if taken < count {
        debug!(target: "runtime::oracle", pile = name, requested = count, taken, "pile exhausted");
    }
    pile.drain(..taken).collect()
}

impl DeckService for SharedDeck {
    fn draw_project_cards(&self, count: usize) -> Vec<CardId> {
        draw(&mut self.piles().projects, count, "projects")
    }

    fn draw_corporations(&self, count: usize) -> Vec<CardId> {
        draw(&mut self.piles().corporations, count, "corporations")
    }
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
struct Pcg {
    state: u64,
}

impl Pcg {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: seed.wrapping_add(Self::INCREMENT),
        };
        rng.next_u32();
        rng
    }

    fn next_u32(&mut self) -> u32 {
        let state = self.state;
        self.state = state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Fisher-Yates.
    fn shuffle<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        for i in (1..items.len()).rev() {
            let j = (self.next_u32() as usize) % (i + 1);
            items.swap(i, j);
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<CardId> {
        names.iter().map(|n| CardId::new(*n)).collect()
    }

    #[test]
    fn exhausted_pile_returns_what_is_left() {
        let deck = SharedDeck::new(ids(&["a", "b", "c"]), ids(&["x"]));

        assert_eq!(deck.draw_project_cards(2), ids(&["a", "b"]));
        assert_eq!(deck.draw_project_cards(5), ids(&["c"]));
        assert!(deck.draw_project_cards(1).is_empty());
        assert_eq!(deck.draw_corporations(2), ids(&["x"]));
    }

    #[test]
    fn shuffle_is_a_seeded_permutation() {
        let cards = ids(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let first = SharedDeck::shuffled(cards.clone(), vec![], 7);
        let second = SharedDeck::shuffled(cards.clone(), vec![], 7);

        let drawn = first.draw_project_cards(8);
        assert_eq!(drawn, second.draw_project_cards(8));

        let mut sorted = drawn.clone();
        sorted.sort();
        assert_eq!(sorted, cards);
    }
}
