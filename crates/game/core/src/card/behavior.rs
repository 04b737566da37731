//! Data-driven card behaviors.
//!
//! A behavior is a `(triggers, inputs, outputs, choices)` tuple. The trigger
//! decides *when* it resolves, inputs are paid when it resolves, and outputs
//! (or the outputs of the chosen [`Choice`]) are applied to their targets.

use super::{Selector, StorageKind, Tag};
use crate::state::{GlobalParameter, ResourceKind, TileKind, TileScope};

/// When a behavior resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Trigger {
    /// Resolved once when the card is played.
    Auto,
    /// Registered as a repeatable card action.
    Manual,
    /// Registered as a standing effect reacting to game events.
    Conditional(TriggerCondition),
}

/// Game facts a conditional behavior can react to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum TriggerEvent {
    OceanPlaced,
    CityPlaced,
    GreeneryPlaced,
    TilePlaced,
    TemperatureRaised,
    OxygenRaised,
    TerraformRatingRaised,
    CardPlayed,
    TagPlayed,
    ProductionIncreased,
    PlacementBonusGained,
}

/// Whose events a conditional behavior listens to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum ConditionTarget {
    #[default]
    SelfPlayer,
    AnyPlayer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerCondition {
    pub event: TriggerEvent,
    pub target: ConditionTarget,
    /// Card tags that must appear on the triggering card (any of them).
    pub affected_tags: Vec<Tag>,
    /// Resources that must be involved in the triggering change (any of them).
    pub affected_resources: Vec<ResourceKind>,
}

impl TriggerCondition {
    pub fn new(event: TriggerEvent) -> Self {
        Self {
            event,
            target: ConditionTarget::SelfPlayer,
            affected_tags: Vec::new(),
            affected_resources: Vec::new(),
        }
    }

    #[must_use]
    pub fn any_player(mut self) -> Self {
        self.target = ConditionTarget::AnyPlayer;
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.affected_tags.extend(tags);
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceKind>) -> Self {
        self.affected_resources.extend(resources);
        self
    }
}

/// Cost paid when a behavior resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Input {
    Resource { kind: ResourceKind, amount: i32 },
    /// Resources removed from the card's own storage.
    Storage { amount: u32 },
}

/// Player an output applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum PlayerTarget {
    #[default]
    SelfPlayer,
    /// A chosen opponent loses the amount, clamped to what they hold.
    AnyPlayer,
    /// Like [`PlayerTarget::AnyPlayer`], and the acting player gains what was removed.
    StealAnyPlayer,
}

/// Card an output applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum CardTarget {
    #[default]
    SelfCard,
    /// Any card of the acting player that stores the same resource kind.
    AnyCard,
    /// Moves resources from another player's card onto the acting player's card.
    StealFromAnyCard,
}

/// The quantity a `per` scaler observes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Quantity {
    Tag(Tag),
    /// Resources stored on the card that owns the behavior or VP condition.
    SelfStorage,
    Tiles { tile: TileKind, scope: TileScope },
}

/// Scales an amount by `floor(observed / divisor)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerCondition {
    pub quantity: Quantity,
    pub divisor: u32,
}

impl PerCondition {
    pub const fn new(quantity: Quantity, divisor: u32) -> Self {
        Self { quantity, divisor }
    }

    /// Number of whole multiples of the divisor in `observed`.
    pub const fn triggers(&self, observed: u32) -> u32 {
        if self.divisor == 0 {
            0
        } else {
            observed / self.divisor
        }
    }
}

/// One effect of a behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Output {
    Resource {
        kind: ResourceKind,
        amount: i32,
        target: PlayerTarget,
        per: Option<PerCondition>,
    },
    Production {
        kind: ResourceKind,
        amount: i32,
        target: PlayerTarget,
        per: Option<PerCondition>,
    },
    TerraformRating {
        amount: i32,
    },
    GlobalParameter {
        parameter: GlobalParameter,
        steps: u32,
    },
    TilePlacement {
        tile: TileKind,
        count: u32,
    },
    CardStorage {
        kind: StorageKind,
        amount: i32,
        target: CardTarget,
        per: Option<PerCondition>,
    },
    CardDraw {
        count: u32,
    },
    Discount {
        amount: i32,
        selector: Selector,
    },
    PaymentSubstitute {
        resource: ResourceKind,
        rate: i32,
    },
    /// Raises the credit value of one steel or titanium.
    ValueModifier {
        resource: ResourceKind,
        amount: i32,
    },
    /// Relaxes global requirements by this many steps in either direction.
    RequirementLenience {
        steps: i32,
    },
    /// Extra credits per ocean adjacent to a placed tile.
    OceanAdjacencyBonus {
        amount: i32,
    },
}

/// Discriminant of [`Output`], used in logs and calculated-output records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum OutputKind {
    Resource,
    Production,
    TerraformRating,
    GlobalParameter,
    TilePlacement,
    CardStorage,
    CardDraw,
    Discount,
    PaymentSubstitute,
    ValueModifier,
    RequirementLenience,
    OceanAdjacencyBonus,
}

impl Output {
    pub fn resource(kind: ResourceKind, amount: i32) -> Self {
        Self::Resource {
            kind,
            amount,
            target: PlayerTarget::SelfPlayer,
            per: None,
        }
    }

    pub fn production(kind: ResourceKind, amount: i32) -> Self {
        Self::Production {
            kind,
            amount,
            target: PlayerTarget::SelfPlayer,
            per: None,
        }
    }

    pub fn storage(kind: StorageKind, amount: i32) -> Self {
        Self::CardStorage {
            kind,
            amount,
            target: CardTarget::SelfCard,
            per: None,
        }
    }

    pub const fn kind(&self) -> OutputKind {
        match self {
            Self::Resource { .. } => OutputKind::Resource,
            Self::Production { .. } => OutputKind::Production,
            Self::TerraformRating { .. } => OutputKind::TerraformRating,
            Self::GlobalParameter { .. } => OutputKind::GlobalParameter,
            Self::TilePlacement { .. } => OutputKind::TilePlacement,
            Self::CardStorage { .. } => OutputKind::CardStorage,
            Self::CardDraw { .. } => OutputKind::CardDraw,
            Self::Discount { .. } => OutputKind::Discount,
            Self::PaymentSubstitute { .. } => OutputKind::PaymentSubstitute,
            Self::ValueModifier { .. } => OutputKind::ValueModifier,
            Self::RequirementLenience { .. } => OutputKind::RequirementLenience,
            Self::OceanAdjacencyBonus { .. } => OutputKind::OceanAdjacencyBonus,
        }
    }

    /// Outputs that stay in force after the card is played instead of
    /// resolving once.
    pub const fn is_persistent(&self) -> bool {
        matches!(
            self,
            Self::Discount { .. }
                | Self::PaymentSubstitute { .. }
                | Self::ValueModifier { .. }
                | Self::RequirementLenience { .. }
                | Self::OceanAdjacencyBonus { .. }
        )
    }
}

/// An alternative set of inputs and outputs the player picks at resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Choice {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardBehavior {
    pub triggers: Vec<Trigger>,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub choices: Vec<Choice>,
}

impl CardBehavior {
    pub fn auto(outputs: Vec<Output>) -> Self {
        Self {
            triggers: vec![Trigger::Auto],
            outputs,
            ..Self::default()
        }
    }

    pub fn manual(inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        Self {
            triggers: vec![Trigger::Manual],
            inputs,
            outputs,
            ..Self::default()
        }
    }

    pub fn conditional(condition: TriggerCondition, outputs: Vec<Output>) -> Self {
        Self {
            triggers: vec![Trigger::Conditional(condition)],
            outputs,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn is_auto(&self) -> bool {
        self.triggers.iter().any(|t| matches!(t, Trigger::Auto))
    }

    pub fn is_manual(&self) -> bool {
        self.triggers.iter().any(|t| matches!(t, Trigger::Manual))
    }

    pub fn conditions(&self) -> impl Iterator<Item = &TriggerCondition> {
        self.triggers.iter().filter_map(|t| match t {
            Trigger::Conditional(condition) => Some(condition),
            _ => None,
        })
    }

    pub fn is_conditional(&self) -> bool {
        self.conditions().next().is_some()
    }

    pub fn has_persistent_outputs(&self) -> bool {
        self.outputs.iter().any(Output::is_persistent)
            || self
                .choices
                .iter()
                .any(|choice| choice.outputs.iter().any(Output::is_persistent))
    }

    /// Returns the chosen alternative, `None` when the behavior has no choices.
    ///
    /// # Errors
    ///
    /// [`crate::RulesError::InvalidChoice`] when choices exist and `index` is
    /// missing or out of range.
    pub fn choice(&self, index: Option<usize>) -> Result<Option<&Choice>, crate::RulesError> {
        if self.choices.is_empty() {
            return Ok(None);
        }
        index
            .and_then(|i| self.choices.get(i))
            .map(Some)
            .ok_or(crate::RulesError::InvalidChoice {
                index,
                available: self.choices.len(),
            })
    }

    /// Inputs paid for this resolution: base inputs followed by the choice's.
    pub fn effective_inputs<'a>(&'a self, choice: Option<&'a Choice>) -> Vec<&'a Input> {
        self.inputs
            .iter()
            .chain(choice.into_iter().flat_map(|c| c.inputs.iter()))
            .collect()
    }

    /// Outputs applied for this resolution: base outputs followed by the choice's.
    pub fn effective_outputs<'a>(&'a self, choice: Option<&'a Choice>) -> Vec<&'a Output> {
        self.outputs
            .iter()
            .chain(choice.into_iter().flat_map(|c| c.outputs.iter()))
            .collect()
    }
}
