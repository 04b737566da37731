//! Card behavior interpreter.
//!
//! Resolution walks a card's behaviors in catalog order and dispatches on the
//! trigger: `auto` behaviors apply their outputs immediately, `manual`
//! behaviors become card actions and `conditional` behaviors become standing
//! effects subscribed to the event kinds their conditions name. Passive
//! effects are re-evaluated by the event bus through [`trigger_passive_effect`].
//!
//! Every function here validates before it mutates. Ledger changes are not
//! published one by one; callers take a [`LedgerSnapshot`] and turn it into
//! batched events once the resolution step is over.
mod apply;
mod ledger;
mod passive;
mod resolve;

pub use apply::{apply_outputs, pay_inputs, validate_inputs, validate_outputs};
pub use ledger::LedgerSnapshot;
pub use passive::{condition_matches, trigger_passive_effect};
pub use resolve::{ResolveOptions, resolve_card_behaviors, validate_card_behaviors};

use crate::events::DomainEvent;
use crate::state::{CalculatedOutput, CardId, PlayerId};

/// The player and card a behavior resolves for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BehaviorSource {
    pub player: PlayerId,
    pub card: CardId,
    pub card_name: String,
}

impl BehaviorSource {
    pub fn new(player: PlayerId, card: CardId, card_name: impl Into<String>) -> Self {
        Self {
            player,
            card,
            card_name: card_name.into(),
        }
    }
}

/// Events and scaled outputs collected while resolving.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionLog {
    pub events: Vec<DomainEvent>,
    pub calculated: Vec<CalculatedOutput>,
}

impl ResolutionLog {
    pub fn emit(&mut self, event: DomainEvent) {
        self.events.push(event);
    }
}
