pub mod animation;
pub mod commentary;
pub mod contest;
pub mod decision;
pub mod events_detect;
pub mod lineup;
pub mod movement;
pub mod positioning;
pub mod scheduler;
pub mod state_store;
pub mod tick_loop;

/// High-level state of a team holding (or chasing) the ball (spec GLOSSARY
/// "Team phase").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamPhase {
    Attack,
    Defence,
    Transition,
}

pub fn team_phase(
    side: crate::model::team::TeamSide,
    possession_team: Option<crate::model::team::TeamSide>,
    just_changed_possession: bool,
) -> TeamPhase {
    match possession_team {
        Some(owner) if owner == side => {
            if just_changed_possession {
                TeamPhase::Transition
            } else {
                TeamPhase::Attack
            }
        }
        Some(_) => {
            if just_changed_possession {
                TeamPhase::Transition
            } else {
                TeamPhase::Defence
            }
        }
        None => TeamPhase::Transition,
    }
}
