/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Cards drawn per player during the production step.
    pub production_draw_count: u32,
    /// Credits charged per card kept from a starting or production offer.
    pub card_buy_cost: u32,
    /// Project cards offered to each player when the game starts.
    pub starting_card_offer: u32,
    /// Corporations offered to each player when the game starts.
    pub corporation_offer: u32,
    /// Terraform rating every player starts with.
    pub starting_terraform_rating: i32,
    /// Maximum depth of follow-up events produced while dispatching one event.
    pub max_event_cascade: usize,
}

impl GameConfig {
    // ===== rule constants =====
    pub const MIN_PLAYERS: usize = 1;
    pub const MAX_PLAYERS: usize = 5;

    /// Actions granted at the start of a regular turn.
    pub const ACTIONS_PER_TURN: i32 = 2;
    /// Sentinel for a turn without an action limit.
    pub const UNLIMITED_ACTIONS: i32 = -1;

    pub const MIN_TEMPERATURE: i32 = -30;
    pub const MAX_TEMPERATURE: i32 = 8;
    /// Degrees per temperature step.
    pub const TEMPERATURE_STEP: i32 = 2;
    pub const MIN_OXYGEN: i32 = 0;
    pub const MAX_OXYGEN: i32 = 14;
    pub const MIN_OCEANS: i32 = 0;
    pub const MAX_OCEANS: i32 = 9;

    pub const STEEL_VALUE: u32 = 2;
    pub const TITANIUM_VALUE: u32 = 3;
    /// Credits granted per ocean adjacent to a newly placed tile.
    pub const OCEAN_ADJACENCY_CREDITS: u32 = 2;

    /// Credits per card sold through the patents project.
    pub const PATENT_SALE_CREDITS: i32 = 1;
    pub const POWER_PLANT_COST: i32 = 11;
    pub const ASTEROID_COST: i32 = 14;
    pub const AQUIFER_COST: i32 = 18;
    pub const GREENERY_COST: i32 = 23;
    pub const CITY_COST: i32 = 25;
    /// Base plant price of a greenery conversion; discounts stop at one.
    pub const PLANTS_PER_GREENERY: i32 = 8;
    pub const HEAT_PER_TEMPERATURE: i32 = 8;

    pub const MILESTONE_COST: i32 = 8;
    pub const MAX_MILESTONES: usize = 3;
    /// Funding cost of the first, second and third award.
    pub const AWARD_COSTS: [i32; 3] = [8, 14, 20];
    pub const MAX_AWARDS: usize = 3;

    pub const MILESTONE_VP: i32 = 5;
    pub const AWARD_FIRST_VP: i32 = 5;
    pub const AWARD_SECOND_VP: i32 = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_PRODUCTION_DRAW_COUNT: u32 = 4;
    pub const DEFAULT_CARD_BUY_COST: u32 = 3;
    pub const DEFAULT_STARTING_CARD_OFFER: u32 = 10;
    pub const DEFAULT_CORPORATION_OFFER: u32 = 2;
    pub const DEFAULT_STARTING_TERRAFORM_RATING: i32 = 20;
    pub const DEFAULT_MAX_EVENT_CASCADE: usize = 32;

    pub fn new() -> Self {
        Self {
            production_draw_count: Self::DEFAULT_PRODUCTION_DRAW_COUNT,
            card_buy_cost: Self::DEFAULT_CARD_BUY_COST,
            starting_card_offer: Self::DEFAULT_STARTING_CARD_OFFER,
            corporation_offer: Self::DEFAULT_CORPORATION_OFFER,
            starting_terraform_rating: Self::DEFAULT_STARTING_TERRAFORM_RATING,
            max_event_cascade: Self::DEFAULT_MAX_EVENT_CASCADE,
        }
    }

    /// Default action allowance for a fresh turn given the table size.
    pub const fn fresh_turn_actions(player_count: usize) -> i32 {
        if player_count == 1 {
            Self::UNLIMITED_ACTIONS
        } else {
            Self::ACTIONS_PER_TURN
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
