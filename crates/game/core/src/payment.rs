//! Card payment validation.
//!
//! A [`Payment`] declares how much of each currency a player hands over.
//! [`PaymentRules`] say which alternate currencies a card accepts and
//! [`PaymentRates`] convert them to credits for one player. Validation never
//! mutates anything; the caller deducts [`Payment::as_resources`] afterwards.

use std::collections::BTreeMap;

use crate::card::{Card, Output};
use crate::config::GameConfig;
use crate::error::RulesError;
use crate::state::{PlayerState, ResourceKind, ResourceSet};

/// Currencies declared for one card play.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payment {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    /// Other resources spent through payment-substitute effects.
    pub substitutes: BTreeMap<ResourceKind, i32>,
}

/// Which alternate currencies a card accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentRules {
    pub allow_steel: bool,
    pub allow_titanium: bool,
}

impl PaymentRules {
    pub fn for_card(card: &Card) -> Self {
        Self {
            allow_steel: card.allows_steel(),
            allow_titanium: card.allows_titanium(),
        }
    }

    /// Only credits and substitutes; used for fees that are not card plays.
    pub const fn credits_only() -> Self {
        Self {
            allow_steel: false,
            allow_titanium: false,
        }
    }
}

/// Credit value of one unit of each alternate currency for one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRates {
    pub steel: i32,
    pub titanium: i32,
    pub substitutes: BTreeMap<ResourceKind, i32>,
}

impl Default for PaymentRates {
    fn default() -> Self {
        Self {
            steel: GameConfig::STEEL_VALUE as i32,
            titanium: GameConfig::TITANIUM_VALUE as i32,
            substitutes: BTreeMap::new(),
        }
    }
}

impl PaymentRates {
    /// Base values plus the player's value modifiers and substitute effects.
    ///
    /// A substitute naming steel or titanium overrides that metal's rate.
    pub fn for_player(player: &PlayerState) -> Self {
        let mut rates = Self::default();
        for output in player.effect_outputs() {
            match output {
                Output::ValueModifier { resource, amount } => match resource {
                    ResourceKind::Steel => rates.steel += amount,
                    ResourceKind::Titanium => rates.titanium += amount,
                    _ => {}
                },
                Output::PaymentSubstitute { resource, rate } => match resource {
                    ResourceKind::Steel => rates.steel = *rate,
                    ResourceKind::Titanium => rates.titanium = *rate,
                    ResourceKind::Credits => {}
                    other => {
                        rates.substitutes.insert(*other, *rate);
                    }
                },
                _ => {}
            }
        }
        rates
    }

    pub fn substitute(&self, resource: ResourceKind) -> Option<i32> {
        self.substitutes.get(&resource).copied()
    }
}

impl Payment {
    pub fn credits(credits: i32) -> Self {
        Self {
            credits,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_steel(mut self, steel: i32) -> Self {
        self.steel = steel;
        self
    }

    #[must_use]
    pub fn with_titanium(mut self, titanium: i32) -> Self {
        self.titanium = titanium;
        self
    }

    #[must_use]
    pub fn with_substitute(mut self, resource: ResourceKind, amount: i32) -> Self {
        self.substitutes.insert(resource, amount);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.credits == 0
            && self.steel == 0
            && self.titanium == 0
            && self.substitutes.values().all(|amount| *amount == 0)
    }

    /// Credit value of everything except credits, counting only accepted
    /// currencies.
    fn non_credit_value(&self, rules: PaymentRules, rates: &PaymentRates) -> i32 {
        let mut value = 0;
        if rules.allow_steel {
            value += self.steel * rates.steel;
        }
        if rules.allow_titanium {
            value += self.titanium * rates.titanium;
        }
        for (resource, amount) in &self.substitutes {
            if let Some(rate) = rates.substitute(*resource) {
                value += amount * rate;
            }
        }
        value
    }

    /// Total credit value of the accepted currencies.
    pub fn value(&self, rules: PaymentRules, rates: &PaymentRates) -> i32 {
        self.credits + self.non_credit_value(rules, rates)
    }

    /// Checks that the declared currencies are accepted and cover `cost`.
    ///
    /// # Errors
    ///
    /// - [`RulesError::InvalidPayment`] for negative amounts
    /// - [`RulesError::CurrencyNotAccepted`] for steel on a non-building card,
    ///   titanium on a non-space card, or a resource without a substitute rate
    /// - [`RulesError::PaymentInsufficient`] when the value is below `cost`
    pub fn covers_cost(
        &self,
        cost: i32,
        rules: PaymentRules,
        rates: &PaymentRates,
    ) -> Result<(), RulesError> {
        if self.credits < 0
            || self.steel < 0
            || self.titanium < 0
            || self.substitutes.values().any(|amount| *amount < 0)
        {
            return Err(RulesError::InvalidPayment {
                reason: "payment amounts must not be negative".into(),
            });
        }
        if self.steel > 0 && !rules.allow_steel {
            return Err(RulesError::CurrencyNotAccepted {
                currency: ResourceKind::Steel.to_string(),
            });
        }
        if self.titanium > 0 && !rules.allow_titanium {
            return Err(RulesError::CurrencyNotAccepted {
                currency: ResourceKind::Titanium.to_string(),
            });
        }
        if let Some((resource, _)) = self
            .substitutes
            .iter()
            .find(|(resource, amount)| **amount > 0 && rates.substitute(**resource).is_none())
        {
            return Err(RulesError::CurrencyNotAccepted {
                currency: resource.to_string(),
            });
        }

        let provided = self.value(rules, rates);
        if provided < cost {
            return Err(RulesError::PaymentInsufficient { cost, provided });
        }
        Ok(())
    }

    /// Checks every declared component against the player's holdings.
    ///
    /// # Errors
    ///
    /// [`RulesError::InsufficientResource`] naming the first resource the
    /// player does not hold enough of.
    pub fn can_afford(&self, holdings: &ResourceSet) -> Result<(), RulesError> {
        let spent = self.as_resources();
        for (kind, needed) in spent.iter() {
            let available = holdings.get(kind);
            if needed > available {
                return Err(RulesError::insufficient(kind, needed, available));
            }
        }
        Ok(())
    }

    /// Shrinks the credit contribution to the minimum the other currencies
    /// leave uncovered. Alternate currencies are kept as declared.
    #[must_use]
    pub fn adjusted_to_effective_cost(
        &self,
        cost: i32,
        rules: PaymentRules,
        rates: &PaymentRates,
    ) -> Self {
        if cost <= 0 {
            return Self::default();
        }
        let non_credit = self.non_credit_value(rules, rates);
        let credits = if non_credit >= cost {
            0
        } else {
            (cost - non_credit).min(self.credits)
        };
        Self {
            credits,
            ..self.clone()
        }
    }

    /// Resources leaving the player's ledger when this payment is made.
    pub fn as_resources(&self) -> ResourceSet {
        let mut spent = ResourceSet::credits(self.credits)
            .with(ResourceKind::Steel, self.steel)
            .with(ResourceKind::Titanium, self.titanium);
        for (resource, amount) in &self.substitutes {
            spent.add(*resource, *amount);
        }
        spent
    }
}
