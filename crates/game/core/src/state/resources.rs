//! Six-resource ledger shared by holdings and production.

use strum::IntoEnumIterator;

/// The six base resources of a player's ledger.
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
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ResourceKind {
    Credits,
    Steel,
    Titanium,
    Plants,
    Energy,
    Heat,
}

/// Amounts for all six resources.
///
/// Used both for current holdings and for the production vector. Values are
/// signed so that deltas can be expressed with the same type; the engine keeps
/// stored holdings and production non-negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceSet {
    pub credits: i32,
    pub steel: i32,
    pub titanium: i32,
    pub plants: i32,
    pub energy: i32,
    pub heat: i32,
}

impl ResourceSet {
    pub const ZERO: Self = Self {
        credits: 0,
        steel: 0,
        titanium: 0,
        plants: 0,
        energy: 0,
        heat: 0,
    };

    pub const fn credits(credits: i32) -> Self {
        Self {
            credits,
            ..Self::ZERO
        }
    }

    pub const fn get(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Credits => self.credits,
            ResourceKind::Steel => self.steel,
            ResourceKind::Titanium => self.titanium,
            ResourceKind::Plants => self.plants,
            ResourceKind::Energy => self.energy,
            ResourceKind::Heat => self.heat,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut i32 {
        match kind {
            ResourceKind::Credits => &mut self.credits,
            ResourceKind::Steel => &mut self.steel,
            ResourceKind::Titanium => &mut self.titanium,
            ResourceKind::Plants => &mut self.plants,
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Heat => &mut self.heat,
        }
    }

    pub fn set(&mut self, kind: ResourceKind, value: i32) {
        *self.get_mut(kind) = value;
    }

    /// Adds `delta` to one resource and returns the new amount.
    pub fn add(&mut self, kind: ResourceKind, delta: i32) -> i32 {
        let slot = self.get_mut(kind);
        *slot += delta;
        *slot
    }

    /// Builder-style setter used mostly by tests and catalog definitions.
    #[must_use]
    pub fn with(mut self, kind: ResourceKind, value: i32) -> Self {
        self.set(kind, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, i32)> + '_ {
        ResourceKind::iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn is_non_negative(&self) -> bool {
        self.iter().all(|(_, amount)| amount >= 0)
    }

    /// Per-resource difference `self - before`, skipping unchanged entries.
    pub fn changes_since(&self, before: &ResourceSet) -> Vec<ResourceChange> {
        ResourceKind::iter()
            .filter_map(|kind| {
                let delta = self.get(kind) - before.get(kind);
                (delta != 0).then_some(ResourceChange { kind, delta })
            })
            .collect()
    }

    pub fn total(&self) -> i32 {
        self.iter().map(|(_, amount)| amount).sum()
    }
}

/// A signed change of one resource, used in batched ledger events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceChange {
    pub kind: ResourceKind,
    pub delta: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_returns_new_amount() {
        let mut set = ResourceSet::credits(10);
        assert_eq!(set.add(ResourceKind::Credits, -4), 6);
        assert_eq!(set.add(ResourceKind::Heat, 3), 3);
        assert_eq!(set.credits, 6);
        assert_eq!(set.heat, 3);
    }

    #[test]
    fn changes_since_skips_unchanged() {
        let before = ResourceSet::credits(10).with(ResourceKind::Steel, 2);
        let after = before.with(ResourceKind::Steel, 5);
        let changes = after.changes_since(&before);
        assert_eq!(
            changes,
            vec![ResourceChange {
                kind: ResourceKind::Steel,
                delta: 3
            }]
        );
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(
            "titanium".parse::<ResourceKind>().ok(),
            Some(ResourceKind::Titanium)
        );
        assert_eq!(ResourceKind::Credits.to_string(), "credits");
    }
}
