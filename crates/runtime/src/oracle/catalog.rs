//! Static card definitions served through [`terra_core::CardCatalog`].

use std::collections::HashMap;

use terra_core::{Card, CardCatalog, CardId, CardKind};
use tracing::warn;

/// Immutable card set shared by every game of a service.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
}

impl StaticCatalog {
    /// Builds a catalog; a repeated id replaces the earlier definition in place.
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut catalog = Self::default();
        for card in cards {
            match catalog.index.get(&card.id) {
                Some(&slot) => {
                    warn!(target: "runtime::oracle", card_id = %card.id, "duplicate card definition");
                    catalog.cards[slot] = card;
                }
                None => {
                    catalog.index.insert(card.id.clone(), catalog.cards.len());
                    catalog.cards.push(card);
                }
            }
        }
        catalog
    }

    /// Project cards (automated, active and event) in definition order.
    pub fn project_ids(&self) -> Vec<CardId> {
        self.ids_where(|kind| {
            matches!(kind, CardKind::Automated | CardKind::Active | CardKind::Event)
        })
    }

    /// Corporations in definition order.
    pub fn corporation_ids(&self) -> Vec<CardId> {
        self.ids_where(|kind| kind == CardKind::Corporation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn ids_where(&self, keep: impl Fn(CardKind) -> bool) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|card| keep(card.kind))
            .map(|card| card.id.clone())
            .collect()
    }
}

impl CardCatalog for StaticCatalog {
    fn card(&self, id: &CardId) -> Option<&Card> {
        self.index.get(id).map(|&slot| &self.cards[slot])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_projects_from_corporations() {
        let catalog = StaticCatalog::new([
            Card::new("corp", "Corp", CardKind::Corporation, 0),
            Card::new("a", "A", CardKind::Automated, 5),
            Card::new("e", "E", CardKind::Event, 2),
        ]);

        assert_eq!(catalog.project_ids(), vec![CardId::new("a"), CardId::new("e")]);
        assert_eq!(catalog.corporation_ids(), vec![CardId::new("corp")]);
    }

    #[test]
    fn later_definition_wins_without_reordering() {
        let catalog = StaticCatalog::new([
            Card::new("a", "First", CardKind::Automated, 5),
            Card::new("b", "B", CardKind::Automated, 1),
            Card::new("a", "Second", CardKind::Automated, 7),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.card(&CardId::new("a")).unwrap().cost, 7);
        assert_eq!(catalog.project_ids()[0], CardId::new("a"));
    }
}
