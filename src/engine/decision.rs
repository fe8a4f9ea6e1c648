use nalgebra::Vector2;

use crate::attributes::{effective_attribute, AttributeContext, AttributeKey};
use crate::engine::state_store::StateStore;
use crate::geometry;
use crate::model::player::{ActionKind, Player, PlayerMatchState, Role};
use crate::model::team::TeamSide;
use crate::rng::MatchRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldZone {
    DefensiveThird,
    MiddleThird,
    AttackingThird,
    AttackingPenalty,
}

fn field_zone(ball_x: f32, is_home: bool) -> FieldZone {
    let attacking_x = if is_home { ball_x } else { 100.0 - ball_x };
    if attacking_x > 83.0 {
        FieldZone::AttackingPenalty
    } else if attacking_x > 66.6 {
        FieldZone::AttackingThird
    } else if attacking_x > 33.3 {
        FieldZone::MiddleThird
    } else {
        FieldZone::DefensiveThird
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureLevel {
    Low,
    Medium,
    High,
}

const PRESSURE_RADIUS: f32 = 8.0;

fn pressure_level(holder_position: Vector2<f32>, opponents: &[PlayerMatchState]) -> (PressureLevel, f32) {
    let nearby: Vec<f32> = opponents
        .iter()
        .filter(|o| !o.sent_off)
        .map(|o| (o.position - holder_position).norm())
        .filter(|d| *d <= PRESSURE_RADIUS)
        .collect();
    let count = nearby.len();
    let closest = nearby.iter().cloned().fold(f32::INFINITY, f32::min);
    let level = match count {
        0 => PressureLevel::Low,
        1 => PressureLevel::Medium,
        _ => PressureLevel::High,
    };
    let pressure_scalar = if closest.is_finite() {
        (1.0 - (closest / PRESSURE_RADIUS)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (level, pressure_scalar)
}

const PASS_MIN_RANGE: f32 = 5.0;
const PASS_MAX_RANGE: f32 = 30.0;
const PASS_LANE_CLEARANCE: f32 = 3.0;

pub(crate) fn has_clear_lane(
    passer: Vector2<f32>,
    target: Vector2<f32>,
    opponents: &[PlayerMatchState],
) -> bool {
    let target_distance = (target - passer).norm();
    opponents.iter().filter(|o| !o.sent_off).all(|o| {
        let dist_to_segment = geometry::point_to_segment_distance(o.position, passer, target);
        let opponent_distance = (o.position - passer).norm();
        !(dist_to_segment < PASS_LANE_CLEARANCE && opponent_distance < target_distance)
    })
}

fn passing_options(
    holder: &PlayerMatchState,
    teammates: &[PlayerMatchState],
    opponents: &[PlayerMatchState],
) -> usize {
    teammates
        .iter()
        .filter(|t| t.player_id != holder.player_id && !t.sent_off)
        .filter(|t| {
            let dist = (t.position - holder.position).norm();
            (PASS_MIN_RANGE..=PASS_MAX_RANGE).contains(&dist)
        })
        .filter(|t| has_clear_lane(holder.position, t.position, opponents))
        .count()
}

fn available_space(holder_position: Vector2<f32>, opponents: &[PlayerMatchState]) -> f32 {
    opponents
        .iter()
        .filter(|o| !o.sent_off)
        .map(|o| (o.position - holder_position).norm())
        .fold(f32::INFINITY, f32::min)
        .min(10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Winning,
    Drawing,
    Losing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePhase {
    Early,
    Middle,
    Late,
}

fn time_phase(minute: u8) -> TimePhase {
    if minute < 30 {
        TimePhase::Early
    } else if minute < 70 {
        TimePhase::Middle
    } else {
        TimePhase::Late
    }
}

fn game_state(own_score: u32, opponent_score: u32) -> GameState {
    use std::cmp::Ordering;
    match own_score.cmp(&opponent_score) {
        Ordering::Greater => GameState::Winning,
        Ordering::Equal => GameState::Drawing,
        Ordering::Less => GameState::Losing,
    }
}

const CANDIDATE_ACTIONS: [ActionKind; 5] = [
    ActionKind::Shoot,
    ActionKind::Pass,
    ActionKind::Dribble,
    ActionKind::Hold,
    ActionKind::Cross,
];

fn base_probability(
    action: ActionKind,
    zone: FieldZone,
    pressure: PressureLevel,
    pass_options: usize,
    space: f32,
    player: &Player,
    ctx: &AttributeContext,
) -> f32 {
    let shooting = effective_attribute(&player.skills, AttributeKey::Finishing, ctx);
    let passing = effective_attribute(&player.skills, AttributeKey::Passing, ctx);
    let dribbling = effective_attribute(&player.skills, AttributeKey::Dribbling, ctx);
    let crossing = effective_attribute(&player.skills, AttributeKey::Crossing, ctx);
    let composure = effective_attribute(&player.skills, AttributeKey::Composure, ctx);

    match action {
        ActionKind::Shoot => match zone {
            FieldZone::AttackingPenalty => shooting * 1.5,
            FieldZone::AttackingThird => shooting * 0.8,
            FieldZone::MiddleThird => shooting * 0.1,
            FieldZone::DefensiveThird => shooting * 0.01,
        },
        ActionKind::Pass => passing * (1.0 + pass_options as f32 * 0.15),
        ActionKind::Dribble => dribbling * (0.5 + space / 10.0) * (1.0 + composure / 40.0),
        ActionKind::Hold => 10.0 + composure * 0.5,
        ActionKind::Cross => match zone {
            FieldZone::AttackingThird | FieldZone::AttackingPenalty => crossing,
            _ => crossing * 0.2,
        },
        ActionKind::Tackle | ActionKind::Header => 0.0,
    }
    .max(0.0)
        * match pressure {
            PressureLevel::Low => 1.0,
            PressureLevel::Medium => 0.9,
            PressureLevel::High => 0.75,
        }
}

/// Contextual modifiers applied after the base probability (spec §4.8).
fn contextual_modifier(
    action: ActionKind,
    pressure: PressureLevel,
    game: GameState,
    time: TimePhase,
) -> f32 {
    let mut modifier = 1.0;
    if action == ActionKind::Shoot && pressure == PressureLevel::Low {
        modifier *= 1.5;
    }
    if action == ActionKind::Hold && game == GameState::Losing && time == TimePhase::Late {
        modifier *= 0.3;
    }
    if action == ActionKind::Hold && game == GameState::Winning && time == TimePhase::Late {
        modifier *= 1.8;
    }
    if action == ActionKind::Dribble && pressure == PressureLevel::High {
        modifier *= 0.6;
    }
    modifier
}

fn role_modifier(role: Role, action: ActionKind) -> f32 {
    match (role, action) {
        (Role::Gk, ActionKind::Shoot) => 0.001,
        (Role::Gk, ActionKind::Dribble) => 0.05,
        (Role::St, ActionKind::Shoot) | (Role::Cf, ActionKind::Shoot) => 2.5,
        (Role::Wm, ActionKind::Cross) => 1.8,
        (Role::Cb, ActionKind::Dribble) => 0.4,
        (Role::Cb, ActionKind::Shoot) => 0.2,
        (Role::Dm, ActionKind::Shoot) => 0.3,
        _ => 1.0,
    }
}

/// Chooses the ball holder's next action (spec §4.8): multi-factor scoring,
/// role modifiers, failure-memory penalty, cooldown filtering, then a
/// weighted random draw.
pub fn choose_action(
    store: &StateStore,
    side: TeamSide,
    holder_id: u32,
    rng: &mut MatchRng,
) -> ActionKind {
    let is_home = side == TeamSide::Home;
    let holder = match store.states(side).iter().find(|s| s.player_id == holder_id) {
        Some(h) => h,
        None => return ActionKind::Hold,
    };
    let player = match store.player_lookup(side, holder_id) {
        Some(p) => p,
        None => return ActionKind::Hold,
    };

    let teammates = store.states(side);
    let opponents = store.states(side.opponent());

    let zone = field_zone(store.ball.position.x, is_home);
    let (pressure, _pressure_scalar) = pressure_level(holder.position, opponents);
    let pass_options = passing_options(holder, teammates, opponents);
    let space = available_space(holder.position, opponents);
    let time = time_phase(store.clock.minute());
    let (own_score, opp_score) = match side {
        TeamSide::Home => (store.score_home, store.score_away),
        TeamSide::Away => (store.score_away, store.score_home),
    };
    let game = game_state(own_score, opp_score);

    let tactic = store.team(side).tactic();
    let ctx = AttributeContext {
        natural_role: player.primary_role,
        current_slot: holder.role,
        team_side: side,
        morale: holder.morale,
        tactic: &tactic,
        fatigue: holder.fatigue,
        minute: store.clock.minute(),
    };

    let mut weights = Vec::with_capacity(CANDIDATE_ACTIONS.len());
    let mut available = Vec::with_capacity(CANDIDATE_ACTIONS.len());
    for &action in CANDIDATE_ACTIONS.iter() {
        if holder.is_on_cooldown(action) {
            continue;
        }
        let base = base_probability(action, zone, pressure, pass_options, space, player, &ctx);
        let contextual = contextual_modifier(action, pressure, game, time);
        let role_mod = role_modifier(holder.role, action);
        let memory_penalty = holder.recent_failure_memory.penalty_for(action, store.clock.tick_index);
        let weight = base * contextual * role_mod * memory_penalty;
        available.push(action);
        weights.push(weight.max(0.0));
    }

    if available.is_empty() {
        return ActionKind::Hold;
    }

    match rng.weighted_choice(&weights) {
        Some(index) => available[index],
        None => ActionKind::Hold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_zone_accounts_for_attacking_direction() {
        assert_eq!(field_zone(90.0, true), FieldZone::AttackingPenalty);
        assert_eq!(field_zone(10.0, false), FieldZone::AttackingPenalty);
        assert_eq!(field_zone(50.0, true), FieldZone::MiddleThird);
    }

    #[test]
    fn pressure_rises_with_nearby_opponent_count() {
        let holder = Vector2::new(50.0, 50.0);
        let far = vec![PlayerMatchState::at_anchor(1, Role::Cb, Vector2::new(90.0, 90.0))];
        let close = vec![
            PlayerMatchState::at_anchor(1, Role::Cb, Vector2::new(52.0, 50.0)),
            PlayerMatchState::at_anchor(2, Role::Cb, Vector2::new(48.0, 50.0)),
        ];
        assert_eq!(pressure_level(holder, &far).0, PressureLevel::Low);
        assert_eq!(pressure_level(holder, &close).0, PressureLevel::High);
    }

    #[test]
    fn time_phase_boundaries_match_spec() {
        assert_eq!(time_phase(29), TimePhase::Early);
        assert_eq!(time_phase(30), TimePhase::Middle);
        assert_eq!(time_phase(70), TimePhase::Late);
    }

    #[test]
    fn goalkeeper_shoot_role_modifier_is_near_zero() {
        assert!(role_modifier(Role::Gk, ActionKind::Shoot) < 0.01);
        assert!(role_modifier(Role::St, ActionKind::Shoot) > 1.0);
    }
}
