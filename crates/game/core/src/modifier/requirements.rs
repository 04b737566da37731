use crate::card::{Card, Output, Requirement, RequirementKind};
use crate::env::BoardService;
use crate::error::{Bound, RulesError};
use crate::state::{GameState, GlobalParameter, GlobalParameters, PlayerState, TileKind};

/// Current value of whatever `kind` measures for `player`.
pub fn measure(
    kind: RequirementKind,
    state: &GameState,
    player: &PlayerState,
    board: &dyn BoardService,
) -> i32 {
    match kind {
        RequirementKind::Temperature => state.global.temperature,
        RequirementKind::Oxygen => state.global.oxygen,
        RequirementKind::Oceans => state.global.oceans,
        RequirementKind::TerraformRating => player.terraform_rating,
        RequirementKind::Tags(tag) => player.tag_count(tag) as i32,
        RequirementKind::Resource(resource) => player.resources.get(resource),
        RequirementKind::Production(resource) => player.production.get(resource),
        RequirementKind::Cities => board.tile_count(TileKind::City, Some(&player.id)) as i32,
        RequirementKind::Greeneries => {
            board.tile_count(TileKind::Greenery, Some(&player.id)) as i32
        }
        RequirementKind::CardsInHand => player.hand.len() as i32,
    }
}

/// Steps by which the player's effects relax global requirements.
pub fn requirement_lenience(player: &PlayerState) -> i32 {
    player
        .effect_outputs()
        .map(|output| match output {
            Output::RequirementLenience { steps } => *steps,
            _ => 0,
        })
        .sum()
}

const fn global_parameter(kind: RequirementKind) -> Option<GlobalParameter> {
    match kind {
        RequirementKind::Temperature => Some(GlobalParameter::Temperature),
        RequirementKind::Oxygen => Some(GlobalParameter::Oxygen),
        RequirementKind::Oceans => Some(GlobalParameter::Oceans),
        _ => None,
    }
}

/// Checks every requirement of `card` for `player`.
///
/// # Errors
///
/// [`RulesError::RequirementNotMet`] for the first requirement outside its
/// bounds, reporting the threshold after lenience.
pub fn validate_requirements(
    card: &Card,
    state: &GameState,
    player: &PlayerState,
    board: &dyn BoardService,
) -> Result<(), RulesError> {
    let lenience = requirement_lenience(player);
    card.requirements
        .iter()
        .try_for_each(|requirement| check(requirement, state, player, board, lenience))
}

fn check(
    requirement: &Requirement,
    state: &GameState,
    player: &PlayerState,
    board: &dyn BoardService,
    lenience: i32,
) -> Result<(), RulesError> {
    let current = measure(requirement.kind, state, player, board);
    let slack = global_parameter(requirement.kind)
        .map_or(0, |parameter| lenience * GlobalParameters::step_size(parameter));

    if let Some(min) = requirement.min {
        let threshold = min - slack;
        if current < threshold {
            return Err(RulesError::RequirementNotMet {
                requirement: requirement.kind,
                bound: Bound::Min,
                threshold,
                current,
            });
        }
    }
    if let Some(max) = requirement.max {
        let threshold = max + slack;
        if current > threshold {
            return Err(RulesError::RequirementNotMet {
                requirement: requirement.kind,
                bound: Bound::Max,
                threshold,
                current,
            });
        }
    }
    Ok(())
}
