use super::PlayerId;
use crate::config::GameConfig;

/// Whose turn it is and how many actions they have left.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    pub player: PlayerId,
    /// `-1` ([`GameConfig::UNLIMITED_ACTIONS`]) means no limit.
    pub actions_remaining: i32,
}

impl TurnState {
    pub fn new(player: PlayerId, actions_remaining: i32) -> Self {
        Self {
            player,
            actions_remaining,
        }
    }

    pub const fn is_unlimited(&self) -> bool {
        self.actions_remaining == GameConfig::UNLIMITED_ACTIONS
    }

    pub const fn has_actions(&self) -> bool {
        self.is_unlimited() || self.actions_remaining > 0
    }

    /// Spends one action; unlimited turns are left untouched.
    pub fn consume(&mut self) {
        if !self.is_unlimited() && self.actions_remaining > 0 {
            self.actions_remaining -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_turns_never_run_out() {
        let mut turn = TurnState::new(PlayerId::new("p1"), GameConfig::UNLIMITED_ACTIONS);
        turn.consume();
        assert!(turn.is_unlimited());
        assert!(turn.has_actions());
    }

    #[test]
    fn consume_stops_at_zero() {
        let mut turn = TurnState::new(PlayerId::new("p1"), 1);
        turn.consume();
        turn.consume();
        assert_eq!(turn.actions_remaining, 0);
        assert!(!turn.has_actions());
    }
}
