//! Automated players.
//!
//! An [`Agent`] looks at the table and proposes commands in order of
//! preference. The driver executes the first one the engine accepts, so an
//! agent never needs to replicate the rules to stay legal.

use async_trait::async_trait;
use strum::IntoEnumIterator;

use terra_core::engine::{conversion_cost, discounted_project_cost};
use terra_core::{
    Award, BuyStandardProject, CardCatalog, CardId, ClaimMilestone, Command,
    ConfirmProductionCards, ConvertHeatToTemperature, ConvertPlantsToGreenery, EndTurn, FundAward,
    GameConfig, GameId, GamePhase, GameState, Milestone, Payment, PlaceTile, PlayCard, PlayerId,
    PlayerState, ResourceKind, SelectCorporation, SelectStartingCards, StandardProject,
    UseCardAction,
};
use terra_runtime::{GameService, StaticCatalog};

/// What an agent sees when it is asked to act.
pub struct TableView<'a> {
    pub game: &'a GameId,
    pub player: &'a PlayerId,
    pub state: &'a GameState,
    pub catalog: &'a StaticCatalog,
    pub service: &'a GameService,
}

impl TableView<'_> {
    pub fn me(&self) -> Option<&PlayerState> {
        self.state.player(self.player)
    }
}

/// Trait for sourcing a player's next command.
///
/// Implementations can be scripted, random or heuristic. The list returned
/// must end with a command that is always legal in the current phase
/// (ending the turn, keeping nothing) so the driver can make progress.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    async fn propose(&self, view: &TableView<'_>) -> Vec<Command>;
}

/// Spends everything it can, biggest card first.
pub struct GreedyAgent {
    name: String,
    /// Starting cards kept at most.
    keep_limit: usize,
}

impl GreedyAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keep_limit: 4,
        }
    }

    fn starting_cards(&self, view: &TableView<'_>, me: &PlayerState) -> Vec<Command> {
        let Some(selection) = me.starting_selection.as_ref() else {
            return Vec::new();
        };
        let mut offered = selection.offered_cards.clone();
        offered.sort_by_key(|id| view.catalog.card(id).map_or(i32::MAX, |card| card.cost));
        offered.truncate(self.keep_limit);
        vec![
            SelectStartingCards::new(me.id.clone(), offered).into(),
            SelectStartingCards::new(me.id.clone(), Vec::new()).into(),
        ]
    }

    fn corporation(&self, me: &PlayerState) -> Vec<Command> {
        me.starting_selection
            .iter()
            .flat_map(|selection| selection.offered_corporations.iter())
            .map(|corp| SelectCorporation::new(me.id.clone(), corp.clone()).into())
            .collect()
    }

    fn production_cards(&self, state: &GameState, me: &PlayerState) -> Vec<Command> {
        let Some(selection) = me.production_selection.as_ref() else {
            return Vec::new();
        };
        let price = state.config.card_buy_cost as i32;
        // Keep a reserve for the coming generation.
        let affordable = ((me.resources.credits - 15) / price.max(1)).max(0) as usize;
        let bought: Vec<CardId> = selection
            .available_cards
            .iter()
            .take(affordable.min(2))
            .cloned()
            .collect();
        vec![
            ConfirmProductionCards::new(me.id.clone(), bought).into(),
            ConfirmProductionCards::new(me.id.clone(), Vec::new()).into(),
        ]
    }

    fn action_turn(&self, view: &TableView<'_>, me: &PlayerState) -> Vec<Command> {
        let mut proposals = Vec::new();
        let player = me.id.clone();

        if let Some(tile) = me.pending_tiles.as_ref().and_then(|queue| queue.front()) {
            let hexes = view
                .service
                .available_hexes(view.game, view.player, tile)
                .unwrap_or_default();
            if let Some(hex) = hexes.into_iter().next() {
                proposals.push(PlaceTile::new(player.clone(), hex).into());
            }
            proposals.push(EndTurn::new(player).into());
            return proposals;
        }

        let affordable = |project| {
            conversion_cost(me, project).is_some_and(|(kind, cost)| me.resources.get(kind) >= cost)
        };
        if affordable(StandardProject::ConvertPlantsToGreenery) {
            proposals.push(ConvertPlantsToGreenery::new(player.clone()).into());
        }
        if affordable(StandardProject::ConvertHeatToTemperature) {
            proposals.push(ConvertHeatToTemperature::new(player.clone()).into());
        }

        if me.resources.credits >= GameConfig::MILESTONE_COST {
            proposals.extend(
                Milestone::iter().map(|m| ClaimMilestone::new(player.clone(), m).into()),
            );
        }
        if me.resources.credits >= 30 && view.state.funded_awards.len() < GameConfig::MAX_AWARDS {
            let unfunded = Award::iter()
                .find(|award| !view.state.funded_awards.iter().any(|f| f.award == *award));
            if let Some(award) = unfunded {
                proposals.push(FundAward::new(player.clone(), award).into());
            }
        }

        for action in &me.actions {
            if action.times_used_this_turn > 0 {
                continue;
            }
            proposals.push(
                UseCardAction::new(player.clone(), action.card.clone(), action.behavior_index)
                    .into(),
            );
        }

        let mut hand: Vec<_> = me
            .hand
            .iter()
            .filter_map(|id| view.catalog.card(id))
            .collect();
        hand.sort_by_key(|card| std::cmp::Reverse(card.cost));
        for card in hand {
            let mut payment = Payment::credits(card.cost.min(me.resources.credits));
            if card.allows_steel() {
                payment = payment.with_steel(me.resources.get(ResourceKind::Steel));
            }
            if card.allows_titanium() {
                payment = payment.with_titanium(me.resources.get(ResourceKind::Titanium));
            }
            proposals.push(PlayCard::new(player.clone(), card.id.clone(), payment).into());
        }

        // Most expensive first.
        for project in [
            StandardProject::City,
            StandardProject::Greenery,
            StandardProject::Aquifer,
            StandardProject::Asteroid,
            StandardProject::PowerPlant,
        ] {
            if let Some(cost) = discounted_project_cost(me, project)
                && cost <= me.resources.credits
            {
                proposals.push(
                    BuyStandardProject::new(player.clone(), project, Payment::credits(cost)).into(),
                );
            }
        }

        proposals.push(EndTurn::new(player).into());
        proposals
    }
}

#[async_trait]
impl Agent for GreedyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn propose(&self, view: &TableView<'_>) -> Vec<Command> {
        let Some(me) = view.me() else {
            return Vec::new();
        };
        match view.state.phase {
            GamePhase::StartingCardSelection => self.starting_cards(view, me),
            GamePhase::CorporationSelection => self.corporation(me),
            GamePhase::ProductionAndCardDraw => self.production_cards(view.state, me),
            GamePhase::Action => self.action_turn(view, me),
            GamePhase::WaitingForGameStart | GamePhase::Complete => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_runtime::RuntimeConfig;

    #[tokio::test]
    async fn greedy_agent_keeps_the_cheapest_offers() {
        let service = GameService::new(RuntimeConfig::default(), crate::content::catalog());
        let game = service.create_default_game().await.unwrap();
        let player = service.join_game(&game, "Ada").await.unwrap();
        service.start_game(&game).await.unwrap();

        let state = service.snapshot(&game).await.unwrap();
        let view = TableView {
            game: &game,
            player: &player,
            state: &state,
            catalog: service.catalog(),
            service: &service,
        };
        let proposals = GreedyAgent::new("greedy").propose(&view).await;

        let Some(Command::SelectStartingCards(first)) = proposals.first() else {
            panic!("expected a starting card selection");
        };
        assert_eq!(first.cards.len(), 4);
        let costs: Vec<i32> = first
            .cards
            .iter()
            .map(|id| service.catalog().card(id).unwrap().cost)
            .collect();
        assert!(costs.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(matches!(
            proposals.last(),
            Some(Command::SelectStartingCards(last)) if last.cards.is_empty()
        ));
    }
}
