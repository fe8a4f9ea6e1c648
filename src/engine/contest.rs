use nalgebra::Vector2;

use crate::attributes::{effective_attribute, AttributeContext, AttributeKey};
use crate::engine::scheduler;
use crate::engine::state_store::StateStore;
use crate::geometry;
use crate::model::player::{ActionKind, ActionPhase, PlayerMatchState};
use crate::model::team::TeamSide;
use crate::rng::MatchRng;

pub const BALL_FLIGHT_SPEED_MPS: f32 = 25.0;
const REACTION_DELAY_SECS: f32 = 0.3;
const FATIGUE_PENALTY_FLOOR: f32 = 0.6;
const RECENT_COOLDOWN_PENALTY: f32 = 0.7;

const PASS_CONTEST_RADIUS: f32 = 15.0;
const OTHER_CONTEST_RADIUS: f32 = 8.0;

/// What kind of contest is being resolved (spec §4.10). `Loose` covers an
/// unclaimed ball with no designated target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContestKind {
    Pass,
    Tackle,
    Header,
    Loose,
}

pub struct ContestRequest {
    pub kind: ContestKind,
    pub initiator: (TeamSide, u32),
    pub target: Option<(TeamSide, u32)>,
    pub ball_position: Vector2<f32>,
    pub pass_origin: Option<Vector2<f32>>,
}

pub struct ContestOutcome {
    pub winner: (TeamSide, u32),
    pub contested: bool,
}

struct Contestant {
    side: TeamSide,
    player_id: u32,
    score: f32,
}

fn effective_speed(store: &StateStore, side: TeamSide, state: &PlayerMatchState) -> f32 {
    let player = match store.player_lookup(side, state.player_id) {
        Some(p) => p,
        None => return 0.1,
    };
    let tactic = store.team(side).tactic();
    let ctx = AttributeContext {
        natural_role: player.primary_role,
        current_slot: state.role,
        team_side: side,
        morale: state.morale,
        tactic: &tactic,
        fatigue: state.fatigue,
        minute: store.clock.minute(),
    };
    effective_attribute(&player.skills, AttributeKey::Pace, &ctx) / 10.0
}

fn fatigue_penalty(fatigue: f32) -> f32 {
    (1.0 - fatigue).max(FATIGUE_PENALTY_FLOOR)
}

fn relevant_cooldown(kind: ContestKind, state: &PlayerMatchState) -> bool {
    let action = match kind {
        ContestKind::Pass => ActionKind::Pass,
        ContestKind::Tackle => ActionKind::Tackle,
        ContestKind::Header => ActionKind::Header,
        ContestKind::Loose => return false,
    };
    state.is_on_cooldown(action)
}

fn score_contestant(
    store: &StateStore,
    request: &ContestRequest,
    side: TeamSide,
    state: &PlayerMatchState,
) -> f32 {
    let player = match store.player_lookup(side, state.player_id) {
        Some(p) => p,
        None => return 0.0,
    };
    let distance_to_ball = (state.position - request.ball_position).norm();
    let speed = effective_speed(store, side, state).max(0.1);
    let time_to_ball = distance_to_ball / speed + REACTION_DELAY_SECS;

    let tactic = store.team(side).tactic();
    let ctx = AttributeContext {
        natural_role: player.primary_role,
        current_slot: state.role,
        team_side: side,
        morale: state.morale,
        tactic: &tactic,
        fatigue: state.fatigue,
        minute: store.clock.minute(),
    };

    let ball_control = effective_attribute(&player.skills, AttributeKey::BallControl, &ctx);
    let reactions = effective_attribute(&player.skills, AttributeKey::Reactions, &ctx);
    let first_touch_ability = (ball_control + reactions) / 2.0 / 20.0;

    let pressure = if relevant_cooldown(request.kind, state) { 0.3 } else { 0.0 };
    let composure = effective_attribute(&player.skills, AttributeKey::Composure, &ctx) / 20.0 * (1.0 - pressure * 0.3);

    // time_advantage: smaller time_to_ball is better; normalise against a
    // generous 5s ceiling so the factor stays within [0,1].
    let time_advantage = (1.0 - (time_to_ball / 5.0)).clamp(0.0, 1.0);

    let mut score = 100.0;
    score *= 0.5 + 0.5 * time_advantage;
    score *= first_touch_ability.max(0.05);
    score *= composure.max(0.05);

    match request.kind {
        ContestKind::Pass => {
            if let Some(origin) = request.pass_origin {
                let target_position = request
                    .target
                    .and_then(|(target_side, target_id)| {
                        store.states(target_side).iter().find(|s| s.player_id == target_id)
                    })
                    .map(|s| s.position)
                    .unwrap_or(request.ball_position);
                let distance_to_pass_line = geometry::point_to_segment_distance(state.position, origin, target_position);
                if distance_to_pass_line < 5.0 {
                    score *= 1.3;
                }
                let pass_vector = target_position - origin;
                let defender_vector = state.position - origin;
                if pass_vector.norm() > f32::EPSILON && defender_vector.norm() > f32::EPSILON {
                    let cos_angle = pass_vector.normalize().dot(&defender_vector.normalize());
                    let angle_degrees = cos_angle.clamp(-1.0, 1.0).acos().to_degrees();
                    if (angle_degrees - 90.0).abs() < 15.0 {
                        score *= 1.2;
                    }
                }
            }
        }
        ContestKind::Tackle => {
            let tackling = effective_attribute(&player.skills, AttributeKey::Tackling, &ctx);
            score *= tackling / 20.0;
        }
        ContestKind::Header => {
            let heading = effective_attribute(&player.skills, AttributeKey::Heading, &ctx);
            score *= heading / 20.0;
        }
        ContestKind::Loose => {}
    }

    score *= fatigue_penalty(state.fatigue);
    if relevant_cooldown(request.kind, state) {
        score *= RECENT_COOLDOWN_PENALTY;
    }

    score.max(0.0)
}

fn gather_contestants(store: &StateStore, request: &ContestRequest) -> Vec<Contestant> {
    let radius = match request.kind {
        ContestKind::Pass => PASS_CONTEST_RADIUS,
        _ => OTHER_CONTEST_RADIUS,
    };

    let mut contestants = Vec::new();
    for side in [TeamSide::Home, TeamSide::Away] {
        for state in store.states(side) {
            if state.sent_off {
                continue;
            }
            let is_party_to_request = (side, state.player_id) == request.initiator
                || request.target == Some((side, state.player_id));
            if state.action_timer > 0 && !is_party_to_request {
                continue;
            }
            let distance = (state.position - request.ball_position).norm();
            if distance > radius && !is_party_to_request {
                continue;
            }
            let score = score_contestant(store, request, side, state);
            contestants.push(Contestant { side, player_id: state.player_id, score });
        }
    }
    contestants
}

/// Resolves any ball contest (spec §4.10). This is the ONLY place possession
/// may change. Returns `None` if possession protection blocks the contest
/// or no eligible contestant was found.
pub fn resolve_contest(
    store: &mut StateStore,
    request: ContestRequest,
    rng: &mut MatchRng,
) -> Option<ContestOutcome> {
    let challenging_team = request.initiator.0;
    if store.possession.blocks_contest_from(challenging_team, store.clock.tick_index) {
        return None;
    }

    let mut contestants = gather_contestants(store, &request);
    if contestants.is_empty() {
        return None;
    }
    contestants.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    contestants.truncate(3);

    let winner_index = select_winner_index(&contestants, rng);
    let winner = &contestants[winner_index];
    let winner_side = winner.side;
    let winner_id = winner.player_id;

    for (index, loser) in contestants.iter().enumerate() {
        if index == winner_index {
            continue;
        }
        if let Some(state) = store.state_mut(loser.side, loser.player_id) {
            if let (ActionPhase::Preparing | ActionPhase::Executing, Some(action)) =
                (state.current_action, state.active_action)
            {
                scheduler::interrupt_action(state, action);
            }
        }
    }

    store.possession.set(winner_side, winner_id, store.clock.tick_index);
    store.ball.velocity = Vector2::zeros();
    store.ball.position = store
        .states(winner_side)
        .iter()
        .find(|s| s.player_id == winner_id)
        .map(|s| s.position)
        .unwrap_or(request.ball_position);

    let cooldown_ticks = match request.kind {
        ContestKind::Pass => 2,
        ContestKind::Tackle => 3,
        ContestKind::Loose => 2,
        ContestKind::Header => 4,
    };
    if let Some(state) = store.state_mut(winner_side, winner_id) {
        let action = match request.kind {
            ContestKind::Tackle => ActionKind::Tackle,
            ContestKind::Header => ActionKind::Header,
            ContestKind::Pass | ContestKind::Loose => ActionKind::Hold,
        };
        state.action_cooldowns.insert(action, cooldown_ticks);
    }

    store.possession.grant_protection(winner_id, winner_side, store.clock.tick_index);

    Some(ContestOutcome { winner: (winner_side, winner_id), contested: contestants.len() > 1 })
}

fn select_winner_index(contestants: &[Contestant], rng: &mut MatchRng) -> usize {
    if contestants.len() == 1 {
        return 0;
    }
    let top = contestants[0].score;
    let second = contestants[1].score;
    let gap = if top > 0.0 { (top - second) / top } else { 0.0 };

    let p_top = if gap > 0.20 {
        0.95
    } else if gap > 0.10 {
        0.75
    } else {
        0.60
    };

    if rng.bernoulli(p_top) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::{Player, Role};
    use crate::model::team::Team;

    fn team_with_player(id: u32, pace: f32, tackling: f32) -> (Team, PlayerMatchState) {
        let mut skills = crate::attributes::PlayerSkills::default();
        skills.physical.pace = pace;
        skills.technical.tackling = tackling;
        skills.technical.ball_control = 12.0;
        skills.mental.anticipation = 12.0;
        skills.mental.reactions = 12.0;
        skills.mental.composure = 12.0;
        let player = Player { id, name: "P".into(), primary_role: Role::Cm, skills, traits: Default::default() };
        let team = Team { id, name: "T".into(), roster: vec![player], primary_tactic: None };
        let state = PlayerMatchState::at_anchor(id, Role::Cm, Vector2::new(50.0, 50.0));
        (team, state)
    }

    #[test]
    fn possession_protection_blocks_opposing_contest() {
        let (home, home_state) = team_with_player(1, 12.0, 10.0);
        let (away, away_state) = team_with_player(2, 12.0, 10.0);
        let mut store = StateStore::new(home, away);
        store.home_states.push(home_state);
        store.away_states.push(away_state);
        store.possession.grant_protection(1, TeamSide::Home, 0);
        store.clock.tick_index = 1;

        let mut rng = MatchRng::from_seed(1);
        let request = ContestRequest {
            kind: ContestKind::Tackle,
            initiator: (TeamSide::Away, 2),
            target: None,
            ball_position: Vector2::new(50.0, 50.0),
            pass_origin: None,
        };
        let outcome = resolve_contest(&mut store, request, &mut rng);
        assert!(outcome.is_none());
    }

    #[test]
    fn faster_more_skilled_contestant_usually_wins() {
        let (home, mut home_state) = team_with_player(1, 18.0, 18.0);
        let (away, mut away_state) = team_with_player(2, 6.0, 6.0);
        home_state.position = Vector2::new(49.0, 50.0);
        away_state.position = Vector2::new(51.0, 50.0);
        let mut store = StateStore::new(home, away);
        store.home_states.push(home_state);
        store.away_states.push(away_state);

        let mut wins_home = 0;
        for seed in 0..20 {
            let mut rng = MatchRng::from_seed(seed);
            let mut local_store = StateStore::new(store.home.clone(), store.away.clone());
            local_store.home_states = store.home_states.clone();
            local_store.away_states = store.away_states.clone();
            local_store.ball.position = Vector2::new(50.0, 50.0);
            let request = ContestRequest {
                kind: ContestKind::Loose,
                initiator: (TeamSide::Home, 1),
                target: None,
                ball_position: Vector2::new(50.0, 50.0),
                pass_origin: None,
            };
            if let Some(outcome) = resolve_contest(&mut local_store, request, &mut rng) {
                if outcome.winner.0 == TeamSide::Home {
                    wins_home += 1;
                }
            }
        }
        assert!(wins_home >= 15);
    }
}
