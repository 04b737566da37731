//! Board-wide terraforming tracks.

use crate::config::GameConfig;

/// One of the three global parameter tracks.
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
#[strum(serialize_all = "kebab-case")]
pub enum GlobalParameter {
    Temperature,
    Oxygen,
    Oceans,
}

/// Current values of the global parameters.
///
/// Every track only moves upward and saturates at its cap. Raise operations
/// return the number of steps actually taken so callers can award terraform
/// rating per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalParameters {
    /// Degrees Celsius, moves in steps of [`GameConfig::TEMPERATURE_STEP`].
    pub temperature: i32,
    /// Percent.
    pub oxygen: i32,
    /// Oceans placed.
    pub oceans: i32,
}

impl GlobalParameters {
    pub const fn new() -> Self {
        Self {
            temperature: GameConfig::MIN_TEMPERATURE,
            oxygen: GameConfig::MIN_OXYGEN,
            oceans: GameConfig::MIN_OCEANS,
        }
    }

    pub const fn get(&self, parameter: GlobalParameter) -> i32 {
        match parameter {
            GlobalParameter::Temperature => self.temperature,
            GlobalParameter::Oxygen => self.oxygen,
            GlobalParameter::Oceans => self.oceans,
        }
    }

    /// Size of one step on the parameter's track.
    pub const fn step_size(parameter: GlobalParameter) -> i32 {
        match parameter {
            GlobalParameter::Temperature => GameConfig::TEMPERATURE_STEP,
            GlobalParameter::Oxygen | GlobalParameter::Oceans => 1,
        }
    }

    pub const fn min(parameter: GlobalParameter) -> i32 {
        match parameter {
            GlobalParameter::Temperature => GameConfig::MIN_TEMPERATURE,
            GlobalParameter::Oxygen => GameConfig::MIN_OXYGEN,
            GlobalParameter::Oceans => GameConfig::MIN_OCEANS,
        }
    }

    pub const fn max(parameter: GlobalParameter) -> i32 {
        match parameter {
            GlobalParameter::Temperature => GameConfig::MAX_TEMPERATURE,
            GlobalParameter::Oxygen => GameConfig::MAX_OXYGEN,
            GlobalParameter::Oceans => GameConfig::MAX_OCEANS,
        }
    }

    /// Raises a track by up to `steps` and returns the steps actually taken.
    pub fn raise(&mut self, parameter: GlobalParameter, steps: u32) -> u32 {
        let step = Self::step_size(parameter);
        let max = Self::max(parameter);
        let slot = match parameter {
            GlobalParameter::Temperature => &mut self.temperature,
            GlobalParameter::Oxygen => &mut self.oxygen,
            GlobalParameter::Oceans => &mut self.oceans,
        };
        let old = *slot;
        let wanted = old.saturating_add(step.saturating_mul(steps as i32));
        *slot = wanted.min(max);
        ((*slot - old) / step) as u32
    }

    pub const fn is_maxed(&self, parameter: GlobalParameter) -> bool {
        self.get(parameter) >= Self::max(parameter)
    }

    /// True once all three tracks have reached their caps.
    pub const fn all_maxed(&self) -> bool {
        self.is_maxed(GlobalParameter::Temperature)
            && self.is_maxed(GlobalParameter::Oxygen)
            && self.is_maxed(GlobalParameter::Oceans)
    }

    /// Parameters with every track at its cap.
    pub const fn maxed() -> Self {
        Self {
            temperature: GameConfig::MAX_TEMPERATURE,
            oxygen: GameConfig::MAX_OXYGEN,
            oceans: GameConfig::MAX_OCEANS,
        }
    }
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_moves_two_degrees_per_step() {
        let mut params = GlobalParameters::new();
        assert_eq!(params.raise(GlobalParameter::Temperature, 3), 3);
        assert_eq!(params.temperature, -24);
    }

    #[test]
    fn raise_saturates_at_cap() {
        let mut params = GlobalParameters::new();
        params.oxygen = 13;
        assert_eq!(params.raise(GlobalParameter::Oxygen, 3), 1);
        assert_eq!(params.oxygen, GameConfig::MAX_OXYGEN);
        assert_eq!(params.raise(GlobalParameter::Oxygen, 1), 0);
    }

    #[test]
    fn all_maxed_requires_every_track() {
        let mut params = GlobalParameters::maxed();
        assert!(params.all_maxed());
        params.oceans = 8;
        assert!(!params.all_maxed());
    }
}
