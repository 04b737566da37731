use bitflags::bitflags;

bitflags! {
    /// Tracks which fields of a [`PlayerState`](crate::state::PlayerState)
    /// changed during a command.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PlayerFields: u16 {
        const RESOURCES        = 1 << 0;
        const PRODUCTION       = 1 << 1;
        const TERRAFORM_RATING = 1 << 2;
        const HAND             = 1 << 3;
        const PLAYED_CARDS     = 1 << 4;
        const CORPORATION      = 1 << 5;
        const STORAGE          = 1 << 6;
        const EFFECTS          = 1 << 7;
        const ACTIONS          = 1 << 8;
        const VICTORY_POINTS   = 1 << 9;
        const PASSED           = 1 << 10;
        const SELECTION        = 1 << 11;
        const PENDING_TILES    = 1 << 12;
        const CONNECTION       = 1 << 13;
    }
}

bitflags! {
    /// Tracks which game-wide fields changed during a command.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct GameFields: u8 {
        const STATUS        = 1 << 0;
        const PHASE         = 1 << 1;
        const GENERATION    = 1 << 2;
        const GLOBALS       = 1 << 3;
        const TURN          = 1 << 4;
        const TURN_ORDER    = 1 << 5;
        const MILESTONES    = 1 << 6;
        const AWARDS        = 1 << 7;
    }
}
