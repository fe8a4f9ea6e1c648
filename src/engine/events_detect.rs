use nalgebra::Vector2;

use crate::attributes::{effective_attribute, AttributeContext, AttributeKey};
use crate::engine::contest::ContestKind;
use crate::engine::state_store::StateStore;
use crate::model::event::{Coordinates, Event, EventKind};
use crate::model::player::PlayerMatchState;
use crate::model::team::TeamSide;
use crate::rng::MatchRng;

const SHOOTING_BOX_HOME_X: f32 = 85.0;
const SHOOTING_BOX_AWAY_X: f32 = 15.0;
const PENALTY_AREA_HOME_X: f32 = 83.0;
const PENALTY_AREA_AWAY_X: f32 = 17.0;
const PENALTY_AREA_MIN_Y: f32 = 25.0;
const PENALTY_AREA_MAX_Y: f32 = 75.0;
const ONE_ON_ONE_BONUS_CAP: f32 = 0.6;
const BASE_FOUL_RATE: f32 = 0.004;
const BASE_OFFSIDE_RATE: f32 = 0.01;
const OUTSIDE_BOX_PENALTY: f32 = 0.35;

fn is_in_shooting_box(ball_x: f32, is_home: bool) -> bool {
    if is_home {
        ball_x > SHOOTING_BOX_HOME_X
    } else {
        ball_x < SHOOTING_BOX_AWAY_X
    }
}

pub fn is_in_penalty_area(x: f32, y: f32) -> bool {
    (x > PENALTY_AREA_HOME_X || x < PENALTY_AREA_AWAY_X) && (PENALTY_AREA_MIN_Y..=PENALTY_AREA_MAX_Y).contains(&y)
}

/// Maps a Contest Resolver outcome directly to an Event kind (spec §4.11:
/// "tackle, interception, clearance, pressing are emitted by the Contest
/// Resolver").
pub fn contest_event_kind(kind: ContestKind, possession_changed_to_defender: bool) -> EventKind {
    match kind {
        ContestKind::Pass => {
            if possession_changed_to_defender {
                EventKind::Interception
            } else {
                EventKind::Pass
            }
        }
        ContestKind::Tackle => {
            if possession_changed_to_defender {
                EventKind::TackleSuccess
            } else {
                EventKind::TackleFailed
            }
        }
        ContestKind::Header => EventKind::Clearance,
        ContestKind::Loose => EventKind::Clearance,
    }
}

/// Goal probability for a shot taken from `shooter_position` (spec §4.11):
/// derived from distance, angle to goal, finishing, composure, pressure,
/// momentum, and a one-on-one bonus capped at 0.6. Shots taken from outside
/// the shooting box are heavily discounted rather than excluded outright.
pub fn goal_probability(
    shooter_position: Vector2<f32>,
    is_home_attacking: bool,
    finishing: f32,
    composure: f32,
    pressure: f32,
    momentum: f32,
    is_one_on_one: bool,
) -> f64 {
    let goal_x = if is_home_attacking { 100.0 } else { 0.0 };
    let distance = (Vector2::new(goal_x, 50.0) - shooter_position).norm();
    let angle_penalty = (shooter_position.y - 50.0).abs() / 50.0;

    let distance_factor = (1.0 - (distance / 40.0)).clamp(0.0, 1.0);
    let angle_factor = (1.0 - angle_penalty).clamp(0.1, 1.0);
    let skill_factor = (finishing / 20.0).clamp(0.0, 1.0);
    let composure_factor = (composure / 20.0).clamp(0.3, 1.0);
    let pressure_factor = (1.0 - pressure * 0.4).clamp(0.4, 1.0);
    let momentum_factor = (1.0 + momentum * 0.2).clamp(0.8, 1.3);

    let mut probability =
        0.5 * distance_factor * angle_factor * skill_factor * composure_factor * pressure_factor * momentum_factor;

    if is_one_on_one {
        probability += ONE_ON_ONE_BONUS_CAP * distance_factor;
    }

    if !is_in_shooting_box(shooter_position.x, is_home_attacking) {
        probability *= OUTSIDE_BOX_PENALTY;
    }

    probability.clamp(0.0, 0.95) as f64
}

pub enum ShotOutcome {
    Goal,
    SavedCorner,
    SavedHeld,
    OffTarget,
}

pub fn resolve_shot_outcome(rng: &mut MatchRng, probability: f64, save_probability: f64) -> ShotOutcome {
    if rng.bernoulli(probability) {
        ShotOutcome::Goal
    } else if rng.bernoulli(save_probability) {
        if rng.bernoulli(0.4) {
            ShotOutcome::SavedCorner
        } else {
            ShotOutcome::SavedHeld
        }
    } else {
        ShotOutcome::OffTarget
    }
}

/// Goalkeeper save probability (spec §2 supplemented feature: goalkeeper
/// contest bonus folded into the save roll).
pub fn save_probability(keeper: &PlayerMatchState, store: &StateStore, side: TeamSide) -> f64 {
    let player = match store.player_lookup(side, keeper.player_id) {
        Some(p) => p,
        None => return 0.3,
    };
    let tactic = store.team(side).tactic();
    let ctx = AttributeContext {
        natural_role: player.primary_role,
        current_slot: keeper.role,
        team_side: side,
        morale: keeper.morale,
        tactic: &tactic,
        fatigue: keeper.fatigue,
        minute: store.clock.minute(),
    };
    let reflexes = effective_attribute(&player.skills, AttributeKey::Reflexes, &ctx);
    let handling = effective_attribute(&player.skills, AttributeKey::Handling, &ctx);
    let one_on_ones = effective_attribute(&player.skills, AttributeKey::OneOnOnes, &ctx);
    (((reflexes + handling + one_on_ones) / 3.0) / 20.0 * 0.65).clamp(0.05, 0.85) as f64
}

/// Per-tick foul roll (spec §4.11): small base rate, elevated by the
/// attacker's dribbling and the defender's aggression / tackle-harder flag.
pub fn foul_roll(
    rng: &mut MatchRng,
    attacker_dribbling: f32,
    defender_aggression: f32,
    tackle_harder: bool,
) -> bool {
    let mut rate = BASE_FOUL_RATE;
    rate += (attacker_dribbling / 20.0) * 0.004;
    rate += (defender_aggression / 20.0) * 0.006;
    if tackle_harder {
        rate *= 1.5;
    }
    rng.bernoulli(rate as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOutcome {
    None,
    Yellow,
    SecondYellowRed,
    StraightRed,
}

/// Escalates a foul into a card (spec §4.11: "second yellow = red"). Severe
/// fouls may draw a straight red via `straight_red_roll`.
pub fn escalate_card(state: &PlayerMatchState, straight_red_roll: bool) -> CardOutcome {
    if straight_red_roll {
        return CardOutcome::StraightRed;
    }
    if state.yellow_cards >= 1 {
        CardOutcome::SecondYellowRed
    } else {
        CardOutcome::Yellow
    }
}

/// Stochastic offside check (spec §4.11): dependent on opposing line
/// discipline and the attacker's anticipation.
pub fn offside_roll(rng: &mut MatchRng, defending_line_discipline: f32, attacker_anticipation: f32) -> bool {
    let discipline_factor = (defending_line_discipline / 20.0).clamp(0.0, 1.0);
    let anticipation_factor = (attacker_anticipation / 20.0).clamp(0.0, 1.0);
    let rate = BASE_OFFSIDE_RATE * (1.0 - discipline_factor) * (1.0 + (1.0 - anticipation_factor));
    rng.bernoulli(rate as f64)
}

pub fn build_event(
    minute: u8,
    kind: EventKind,
    team: TeamSide,
    primary_player_id: u32,
    primary_player_name: String,
    secondary_player_id: Option<u32>,
    outcome: Option<String>,
    coordinates: Vector2<f32>,
) -> Event {
    Event {
        minute,
        kind,
        team,
        primary_player_id,
        primary_player_name,
        secondary_player_id,
        outcome,
        coordinates: Coordinates::from(coordinates),
        sequence: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shooting_box_is_mirrored_for_away_attack() {
        assert!(is_in_shooting_box(90.0, true));
        assert!(!is_in_shooting_box(90.0, false));
        assert!(is_in_shooting_box(10.0, false));
    }

    #[test]
    fn penalty_area_requires_central_y() {
        assert!(is_in_penalty_area(90.0, 50.0));
        assert!(!is_in_penalty_area(90.0, 10.0));
        assert!(!is_in_penalty_area(50.0, 50.0));
    }

    #[test]
    fn goal_probability_favors_closer_central_shots() {
        let central = goal_probability(Vector2::new(95.0, 50.0), true, 16.0, 14.0, 0.0, 0.0, false);
        let wide_far = goal_probability(Vector2::new(70.0, 10.0), true, 16.0, 14.0, 0.0, 0.0, false);
        assert!(central > wide_far);
    }

    #[test]
    fn shots_outside_the_box_score_less_often_than_the_same_distance_inside() {
        let inside = goal_probability(Vector2::new(86.0, 50.0), true, 16.0, 14.0, 0.0, 0.0, false);
        let outside = goal_probability(Vector2::new(84.0, 50.0), true, 16.0, 14.0, 0.0, 0.0, false);
        assert!(outside < inside);
    }

    #[test]
    fn second_yellow_becomes_red() {
        let state = PlayerMatchState::at_anchor(1, crate::model::player::Role::Cb, Vector2::new(50.0, 50.0));
        let mut first_booking = state.clone();
        assert_eq!(escalate_card(&first_booking, false), CardOutcome::Yellow);
        first_booking.yellow_cards = 1;
        assert_eq!(escalate_card(&first_booking, false), CardOutcome::SecondYellowRed);
    }
}
