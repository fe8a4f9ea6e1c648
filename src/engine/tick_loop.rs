use std::collections::HashMap;

use itertools::Itertools;
use nalgebra::Vector2;

use crate::attributes::{
    apply_morale_event, effective_attribute, morale_decay, AttributeContext, AttributeKey, MoraleEvent,
    NEUTRAL_MORALE,
};
use crate::config::MatchInputs;
use crate::engine::contest::{self, ContestKind, ContestRequest, BALL_FLIGHT_SPEED_MPS};
use crate::engine::decision;
use crate::engine::events_detect::{self, CardOutcome, ShotOutcome};
use crate::engine::lineup;
use crate::engine::movement;
use crate::engine::scheduler;
use crate::engine::state_store::StateStore;
use crate::engine::{animation, commentary};
use crate::error::EngineResult;
use crate::model::ball::BallStatus;
use crate::model::event::{ActionIntensity, AnimationAction, Coordinates, Event, EventKind};
use crate::model::formation::FormationTemplate;
use crate::model::player::{ActionKind, ActionPhase, PlayerMatchState, Role};
use crate::model::stats::StatBlock;
use crate::model::team::TeamSide;
use crate::model::tick::{MatchPhase, Score, TeamStats, Tick, Zone};
use crate::rng::MatchRng;

const END_MINUTE: u8 = 90;
const HALF_TIME_TICK: u64 = 45 * 60;
const FATIGUE_BASE_RATE: f32 = 0.00018;
const TACKLE_ENGAGE_RADIUS: f32 = 2.2;
const TACKLE_ATTEMPT_RATE: f64 = 0.10;
const GET_STUCK_IN_MULTIPLIER: f64 = 1.6;
const PASS_TARGET_MIN_RANGE: f32 = 5.0;
const PASS_TARGET_MAX_RANGE: f32 = 35.0;
const CROSS_TARGET_MIN_RANGE: f32 = 10.0;
const CROSS_TARGET_MAX_RANGE: f32 = 40.0;
const STRAIGHT_RED_ROLL_RATE: f64 = 0.03;
const SUBSTITUTION_FATIGUE_THRESHOLD: f32 = 0.55;
const MAX_SUBSTITUTIONS_PER_TEAM: usize = 3;
const SKILL_MOVE_FLAIR_THRESHOLD: f32 = 14.0;
const SKILL_MOVE_BASE_RATE: f64 = 0.3;

/// How the caller wants Tick records spaced (spec §4.15: once per simulated
/// minute by default, or once per second at caller option).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResolution {
    PerMinute,
    PerSecond,
}

fn action_intensity(action: ActionKind) -> ActionIntensity {
    match action {
        ActionKind::Shoot | ActionKind::Tackle | ActionKind::Header => ActionIntensity::Hard,
        ActionKind::Dribble => ActionIntensity::Soft,
        ActionKind::Pass | ActionKind::Cross | ActionKind::Hold => ActionIntensity::Normal,
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingPass {
    side: TeamSide,
    passer_id: u32,
    target_id: Option<u32>,
    origin: Vector2<f32>,
    is_cross: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingShot {
    side: TeamSide,
    shooter_id: u32,
    origin: Vector2<f32>,
    is_one_on_one: bool,
}

/// Lazy producer of `Tick` records for one match (spec §4.15, §5: "single
/// suspension point at tick emission"). Owns the entire mutable match state;
/// nothing outlives a single call to `next`.
pub struct MatchSimulation {
    store: StateStore,
    rng: MatchRng,
    home_formation: FormationTemplate,
    away_formation: FormationTemplate,
    resolution: TickResolution,

    just_changed_possession: bool,
    ball_in_flight: bool,
    pending_pass: Option<PendingPass>,
    pending_shot: Option<PendingShot>,
    last_completed_pass: Option<(TeamSide, u32, u32)>,
    substituted_out: Vec<(TeamSide, PlayerMatchState)>,

    minute_events: Vec<Event>,
    minute_commentary: Vec<String>,

    half_time_emitted: bool,
    finished: bool,
}

impl MatchSimulation {
    pub(crate) fn new(inputs: &MatchInputs, seed: u64, resolution: TickResolution) -> EngineResult<Self> {
        let mut store = StateStore::new(inputs.home.clone(), inputs.away.clone());

        let home_slots = lineup::select_lineup(&store.home, inputs.home_formation, true);
        store.home_states = lineup::initial_player_states(&home_slots);
        let away_slots = lineup::select_lineup(&store.away, inputs.away_formation, false);
        store.away_states = lineup::initial_player_states(&away_slots);

        let kicker_id = home_slots
            .iter()
            .find(|s| matches!(s.role_slot, Role::St | Role::Cf))
            .or_else(|| home_slots.first())
            .map(|s| s.player_id);

        let mut sim = MatchSimulation {
            store,
            rng: MatchRng::from_seed(seed),
            home_formation: inputs.home_formation,
            away_formation: inputs.away_formation,
            resolution,
            just_changed_possession: true,
            ball_in_flight: false,
            pending_pass: None,
            pending_shot: None,
            last_completed_pass: None,
            substituted_out: Vec::new(),
            minute_events: Vec::new(),
            minute_commentary: Vec::new(),
            half_time_emitted: false,
            finished: false,
        };

        if let Some(id) = kicker_id {
            sim.store.possession.set(TeamSide::Home, id, 0);
            sim.store.ball.status = BallStatus::InPlay;
            sim.emit_kickoff(TeamSide::Home);
        }

        Ok(sim)
    }

    fn attribute(&self, side: TeamSide, player_id: u32, key: AttributeKey) -> f32 {
        let Some(state) = self.store.states(side).iter().find(|s| s.player_id == player_id) else {
            return 10.0;
        };
        let Some(player) = self.store.player_lookup(side, player_id) else {
            return 10.0;
        };
        let tactic = self.store.team(side).tactic();
        let ctx = AttributeContext {
            natural_role: player.primary_role,
            current_slot: state.role,
            team_side: side,
            morale: state.morale,
            tactic: &tactic,
            fatigue: state.fatigue,
            minute: self.store.clock.minute(),
        };
        effective_attribute(&player.skills, key, &ctx)
    }

    fn player_name(&self, side: TeamSide, player_id: u32) -> String {
        self.store
            .player_lookup(side, player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{player_id}"))
    }

    fn nearest_player(&self, side: TeamSide, point: Vector2<f32>) -> u32 {
        self.store
            .states(side)
            .iter()
            .filter(|s| !s.sent_off)
            .min_by(|a, b| {
                let da = (a.position - point).norm();
                let db = (b.position - point).norm();
                da.partial_cmp(&db).unwrap()
            })
            .map(|s| s.player_id)
            .unwrap_or(0)
    }

    fn find_goalkeeper(&self, side: TeamSide) -> Option<PlayerMatchState> {
        self.store.states(side).iter().find(|s| s.role == Role::Gk && !s.sent_off).cloned()
    }

    fn set_possession(&mut self, side: TeamSide, player_id: u32) {
        let changed = self.store.possession.owning_team != Some(side);
        let tick_index = self.store.clock.tick_index;
        self.store.possession.set(side, player_id, tick_index);
        if changed {
            self.just_changed_possession = true;
        }
    }

    fn record_event(
        &mut self,
        kind: EventKind,
        side: TeamSide,
        actor_id: u32,
        target_id: Option<u32>,
        outcome: Option<String>,
        origin: Vector2<f32>,
        destination: Vector2<f32>,
    ) {
        let minute = self.store.clock.minute();
        let actor_name = self.player_name(side, actor_id);
        let target_name = target_id.map(|id| self.player_name(side, id));
        let mut event = events_detect::build_event(
            minute,
            kind,
            side,
            actor_id,
            actor_name.clone(),
            target_id,
            outcome,
            destination,
        );
        event.sequence =
            animation::sequence_for_event(kind, actor_id, &actor_name, target_id, target_name.as_deref(), origin, destination);
        let line = commentary::describe(&event, &mut self.rng);
        self.minute_commentary.push(line);
        self.update_stats_for_event(side, event.kind);
        self.minute_events.push(event);
    }

    fn update_stats_for_event(&mut self, side: TeamSide, kind: EventKind) {
        let stats = self.store.stats_mut(side);
        match kind {
            EventKind::Pass | EventKind::Cross => stats.passes += 1,
            EventKind::Interception => stats.interceptions += 1,
            EventKind::TackleSuccess => stats.tackles += 1,
            EventKind::Clearance => stats.clearances += 1,
            EventKind::ShotOnTarget => {
                stats.shots += 1;
                stats.shots_on_target += 1;
            }
            EventKind::ShotOffTarget => stats.shots += 1,
            EventKind::Save => stats.saves += 1,
            EventKind::Corner => stats.corners += 1,
            EventKind::Foul => stats.fouls += 1,
            EventKind::YellowCard => stats.yellow_cards += 1,
            EventKind::RedCard => stats.red_cards += 1,
            EventKind::Offside => stats.offsides += 1,
            _ => {}
        }
    }

    fn emit_kickoff(&mut self, side: TeamSide) {
        let taker = self.store.possession.owning_player.unwrap_or(0);
        let position = self.store.ball.position;
        self.record_event(EventKind::Kickoff, side, taker, None, None, position, position);
    }

    // --- per-tick orchestration (spec §4.15) ---------------------------------

    fn step_one_second(&mut self) {
        let tick_index = self.store.clock.tick_index;
        self.store.possession.expire_protection(tick_index);

        let mut completions = Vec::new();
        for (side, state) in self.store.all_states_mut() {
            if state.sent_off {
                continue;
            }
            if let Some(action) = scheduler::advance_scheduler(state) {
                completions.push((side, state.player_id, action));
            }
            let intensity_mult = match state.active_action.map(action_intensity) {
                Some(ActionIntensity::Hard) => 2.2,
                Some(ActionIntensity::Normal) => 1.0,
                Some(ActionIntensity::Soft) => 0.5,
                None => 0.3,
            };
            let stamina_factor = (1.3 - state.stamina / 100.0 * 0.5).clamp(0.6, 1.3);
            state.fatigue = (state.fatigue + FATIGUE_BASE_RATE * intensity_mult * stamina_factor).min(1.0);
            state.morale = morale_decay(state.morale);
        }

        let holder_before = self.store.get_ball_holder();
        movement::run_off_ball_movement(
            &mut self.store,
            self.home_formation,
            self.away_formation,
            holder_before,
            self.just_changed_possession,
            1.0,
        );
        self.just_changed_possession = false;

        for (side, player_id, action) in completions {
            self.resolve_completed_action(side, player_id, action);
        }

        self.run_defensive_engagement();
        self.holder_decision_phase();
        self.advance_ball_physics();

        self.store.record_possession_tick();
        self.store.advance_clock();
    }

    fn resolve_completed_action(&mut self, side: TeamSide, player_id: u32, action: ActionKind) {
        match action {
            ActionKind::Pass | ActionKind::Cross | ActionKind::Shoot => {
                // resolution happens in the ball-flight sweep, not here.
            }
            ActionKind::Dribble => self.emit_dribble_event(side, player_id),
            ActionKind::Tackle => self.attempt_tackle_resolution(side, player_id),
            ActionKind::Header | ActionKind::Hold => {}
        }
    }

    fn emit_dribble_event(&mut self, side: TeamSide, player_id: u32) {
        let Some(position) = self.store.states(side).iter().find(|s| s.player_id == player_id).map(|s| s.position) else {
            return;
        };
        let flair = self.attribute(side, player_id, AttributeKey::Flair);
        let is_skill_move =
            flair > SKILL_MOVE_FLAIR_THRESHOLD && self.rng.bernoulli(SKILL_MOVE_BASE_RATE * (flair / 20.0) as f64);
        self.record_event(EventKind::Dribbling, side, player_id, None, None, position, position);
        if is_skill_move {
            if let Some(event) = self.minute_events.last_mut() {
                for step in event.sequence.iter_mut() {
                    if step.action == AnimationAction::Dribble {
                        step.action = AnimationAction::SkillMove;
                    }
                }
            }
        }
    }

    fn run_defensive_engagement(&mut self) {
        if self.ball_in_flight {
            return;
        }
        let Some((holder_side, _)) = self.store.get_ball_holder() else { return };
        let ball_position = self.store.ball.position;
        let defending_side = holder_side.opponent();
        let get_stuck_in = self.store.team(defending_side).tactic().flags.get_stuck_in;
        let tick_index = self.store.clock.tick_index;

        let candidates: Vec<u32> = self
            .store
            .states(defending_side)
            .iter()
            .filter(|s| !s.sent_off && s.current_action == ActionPhase::Idle)
            .filter(|s| (s.position - ball_position).norm() <= TACKLE_ENGAGE_RADIUS)
            .map(|s| s.player_id)
            .collect();

        let rate = if get_stuck_in { TACKLE_ATTEMPT_RATE * GET_STUCK_IN_MULTIPLIER } else { TACKLE_ATTEMPT_RATE };
        for player_id in candidates {
            if self.rng.bernoulli(rate) {
                if let Some(state) = self.store.state_mut(defending_side, player_id) {
                    scheduler::request_action(state, ActionKind::Tackle, tick_index);
                }
            }
        }
    }

    fn attempt_tackle_resolution(&mut self, side: TeamSide, player_id: u32) {
        let ball_position = self.store.ball.position;
        let Some((holder_side, holder_id)) = self.store.get_ball_holder() else { return };
        if holder_side == side {
            return;
        }
        let previous_owner = self.store.possession.owning_team;
        let request = ContestRequest {
            kind: ContestKind::Tackle,
            initiator: (side, player_id),
            target: Some((holder_side, holder_id)),
            ball_position,
            pass_origin: None,
        };
        if let Some(outcome) = contest::resolve_contest(&mut self.store, request, &mut self.rng) {
            if previous_owner != Some(outcome.winner.0) {
                self.just_changed_possession = true;
            }
            let success = outcome.winner.0 == side;
            if let Some(state) = self.store.state_mut(side, player_id) {
                state.tackles_attempted += 1;
                if success {
                    state.tackles_won += 1;
                }
            }
            let kind = events_detect::contest_event_kind(ContestKind::Tackle, success);
            self.record_event(kind, side, player_id, Some(holder_id), None, ball_position, ball_position);
            if !success {
                self.maybe_foul(side, player_id, holder_side, holder_id, ball_position);
            }
        } else if let Some(state) = self.store.state_mut(side, player_id) {
            state.tackles_attempted += 1;
        }
    }

    fn maybe_foul(&mut self, side: TeamSide, player_id: u32, victim_side: TeamSide, victim_id: u32, position: Vector2<f32>) {
        let tackle_harder = self.store.team(side).tactic().flags.tackle_harder;
        let defender_aggression = self.attribute(side, player_id, AttributeKey::Aggression);
        let attacker_dribbling = self.attribute(victim_side, victim_id, AttributeKey::Dribbling);
        if events_detect::foul_roll(&mut self.rng, attacker_dribbling, defender_aggression, tackle_harder) {
            self.process_foul(side, player_id, victim_side, victim_id, position);
        }
    }

    fn is_defending_own_box(&self, side: TeamSide, x: f32) -> bool {
        if side == TeamSide::Home {
            x < 17.0
        } else {
            x > 83.0
        }
    }

    fn process_foul(&mut self, offender_side: TeamSide, offender_id: u32, victim_side: TeamSide, victim_id: u32, position: Vector2<f32>) {
        let in_box = events_detect::is_in_penalty_area(position.x, position.y) && self.is_defending_own_box(offender_side, position.x);

        self.store.stats_mut(offender_side).fouls += 1;
        self.record_event(EventKind::Foul, offender_side, offender_id, Some(victim_id), None, position, position);

        let straight_red = self.rng.bernoulli(STRAIGHT_RED_ROLL_RATE);
        let card = self
            .store
            .states(offender_side)
            .iter()
            .find(|s| s.player_id == offender_id)
            .map(|s| events_detect::escalate_card(s, straight_red));

        if let Some(card) = card {
            match card {
                CardOutcome::Yellow => {
                    if let Some(state) = self.store.state_mut(offender_side, offender_id) {
                        state.yellow_cards += 1;
                        state.morale = apply_morale_event(state.morale, MoraleEvent::YellowCard);
                    }
                    self.store.stats_mut(offender_side).yellow_cards += 1;
                    self.record_event(EventKind::YellowCard, offender_side, offender_id, None, None, position, position);
                }
                CardOutcome::SecondYellowRed | CardOutcome::StraightRed => {
                    if let Some(state) = self.store.state_mut(offender_side, offender_id) {
                        state.sent_off = true;
                        state.morale = apply_morale_event(state.morale, MoraleEvent::RedCard);
                    }
                    self.store.stats_mut(offender_side).red_cards += 1;
                    self.record_event(EventKind::RedCard, offender_side, offender_id, None, None, position, position);
                }
                CardOutcome::None => {}
            }
        }

        if in_box {
            self.process_penalty(victim_side, victim_id);
        } else {
            self.set_possession(victim_side, victim_id);
        }
    }

    fn process_penalty(&mut self, attacking_side: TeamSide, taker_id: u32) {
        let penalty_x = if attacking_side == TeamSide::Home { 89.0 } else { 11.0 };
        let spot = Vector2::new(penalty_x, 50.0);
        self.record_event(EventKind::Penalty, attacking_side, taker_id, None, None, spot, spot);

        let penalty_taking = self.attribute(attacking_side, taker_id, AttributeKey::PenaltyTaking);
        let composure = self.attribute(attacking_side, taker_id, AttributeKey::Composure);
        let probability = (0.6 + (penalty_taking + composure) / 200.0).clamp(0.5, 0.92) as f64;
        let defending_side = attacking_side.opponent();

        self.store.stats_mut(attacking_side).shots += 1;
        if let Some(state) = self.store.state_mut(attacking_side, taker_id) {
            state.shots_attempted += 1;
        }

        if self.rng.bernoulli(probability) {
            self.store.stats_mut(attacking_side).shots_on_target += 1;
            if let Some(state) = self.store.state_mut(attacking_side, taker_id) {
                state.goals += 1;
                state.shots_on_target += 1;
            }
            match attacking_side {
                TeamSide::Home => self.store.score_home += 1,
                TeamSide::Away => self.store.score_away += 1,
            }
            let goal_point = Vector2::new(if attacking_side == TeamSide::Home { 100.0 } else { 0.0 }, 50.0);
            self.record_event(EventKind::Goal, attacking_side, taker_id, None, None, spot, goal_point);
            self.goal_reset(attacking_side);
        } else {
            let keeper = self.find_goalkeeper(defending_side);
            if let Some(keeper) = keeper {
                self.record_event(EventKind::Save, defending_side, keeper.player_id, None, None, spot, spot);
                if let Some(state) = self.store.state_mut(defending_side, keeper.player_id) {
                    state.key_saves += 1;
                    state.morale = apply_morale_event(state.morale, MoraleEvent::KeySave);
                }
                self.set_possession(defending_side, keeper.player_id);
            }
            self.store.ball.position = spot;
            self.store.ball.velocity = Vector2::zeros();
            self.store.ball.status = BallStatus::Dead;
        }
    }

    fn holder_decision_phase(&mut self) {
        if self.ball_in_flight {
            return;
        }
        let Some((side, holder_id)) = self.store.get_ball_holder() else {
            self.store.force_initial_possession();
            return;
        };
        let tick_index = self.store.clock.tick_index;
        let is_idle = self
            .store
            .states(side)
            .iter()
            .find(|s| s.player_id == holder_id)
            .map(|s| s.current_action == ActionPhase::Idle)
            .unwrap_or(false);
        if !is_idle {
            return;
        }

        let action = decision::choose_action(&self.store, side, holder_id, &mut self.rng);
        let started = match self.store.state_mut(side, holder_id) {
            Some(state) => scheduler::request_action(state, action, tick_index),
            None => false,
        };
        if !started {
            return;
        }

        match action {
            ActionKind::Pass => self.begin_pass(side, holder_id, false),
            ActionKind::Cross => self.begin_pass(side, holder_id, true),
            ActionKind::Shoot => self.begin_shot(side, holder_id),
            ActionKind::Dribble | ActionKind::Hold | ActionKind::Tackle | ActionKind::Header => {}
        }
    }

    fn pick_pass_target(&self, side: TeamSide, passer_id: u32, is_cross: bool) -> Option<u32> {
        let passer = self.store.states(side).iter().find(|s| s.player_id == passer_id)?;
        let opponents = self.store.states(side.opponent());
        let (min_range, max_range) = if is_cross {
            (CROSS_TARGET_MIN_RANGE, CROSS_TARGET_MAX_RANGE)
        } else {
            (PASS_TARGET_MIN_RANGE, PASS_TARGET_MAX_RANGE)
        };

        let candidates: Vec<&PlayerMatchState> = self
            .store
            .states(side)
            .iter()
            .filter(|t| t.player_id != passer_id && !t.sent_off)
            .filter(|t| !is_cross || matches!(t.role, Role::St | Role::Cf | Role::Am | Role::Wm))
            .filter(|t| {
                let d = (t.position - passer.position).norm();
                (min_range..=max_range).contains(&d)
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let with_clear_lane: Vec<&&PlayerMatchState> = candidates
            .iter()
            .filter(|t| decision::has_clear_lane(passer.position, t.position, opponents))
            .collect();
        let pool: Vec<&&PlayerMatchState> = if with_clear_lane.is_empty() { candidates.iter().collect() } else { with_clear_lane };

        pool.into_iter()
            .min_by(|a, b| {
                let da = (a.position - passer.position).norm();
                let db = (b.position - passer.position).norm();
                da.partial_cmp(&db).unwrap()
            })
            .map(|s| s.player_id)
    }

    fn begin_pass(&mut self, side: TeamSide, passer_id: u32, is_cross: bool) {
        let Some(passer_pos) = self.store.states(side).iter().find(|s| s.player_id == passer_id).map(|s| s.position) else {
            return;
        };
        let target = self.pick_pass_target(side, passer_id, is_cross);
        let target_pos = target
            .and_then(|id| self.store.states(side).iter().find(|s| s.player_id == id))
            .map(|s| s.position)
            .unwrap_or_else(|| {
                let attack_sign = if side == TeamSide::Home { 1.0 } else { -1.0 };
                passer_pos + Vector2::new(attack_sign * 15.0, 0.0)
            });

        let direction = target_pos - passer_pos;
        let velocity = if direction.norm() > f32::EPSILON {
            direction.normalize() * BALL_FLIGHT_SPEED_MPS
        } else {
            Vector2::zeros()
        };
        self.store.ball.velocity = velocity;
        self.store.ball.status = if is_cross { BallStatus::Cross } else { BallStatus::InPlay };
        self.ball_in_flight = true;
        self.pending_pass = Some(PendingPass { side, passer_id, target_id: target, origin: passer_pos, is_cross });
        if let Some(state) = self.store.state_mut(side, passer_id) {
            state.passes_attempted += 1;
        }
    }

    fn begin_shot(&mut self, side: TeamSide, shooter_id: u32) {
        let is_home = side == TeamSide::Home;
        let Some(shooter_pos) = self.store.states(side).iter().find(|s| s.player_id == shooter_id).map(|s| s.position) else {
            return;
        };
        let goal_point = Vector2::new(if is_home { 100.0 } else { 0.0 }, 50.0);
        let direction = goal_point - shooter_pos;
        let velocity = if direction.norm() > f32::EPSILON {
            direction.normalize() * BALL_FLIGHT_SPEED_MPS * 1.4
        } else {
            Vector2::zeros()
        };
        self.store.ball.velocity = velocity;
        self.store.ball.status = BallStatus::Shot;
        self.ball_in_flight = true;

        let is_one_on_one = self
            .store
            .states(side.opponent())
            .iter()
            .filter(|o| !o.sent_off && o.role != Role::Gk)
            .all(|o| (o.position - shooter_pos).norm() > 6.0);

        self.pending_shot = Some(PendingShot { side, shooter_id, origin: shooter_pos, is_one_on_one });
        if let Some(state) = self.store.state_mut(side, shooter_id) {
            state.shots_attempted += 1;
        }
    }

    fn advance_ball_physics(&mut self) {
        if self.ball_in_flight {
            self.store.ball.position += self.store.ball.velocity;
            self.store.ball.velocity *= 0.97;

            let out_y = !(0.0..=100.0).contains(&self.store.ball.position.y);
            let out_x = !(0.0..=100.0).contains(&self.store.ball.position.x);
            self.store.ball.clamp_to_pitch();

            if out_y && self.pending_shot.is_none() {
                self.handle_throw_in();
                return;
            }
            if out_x && self.pending_shot.is_none() {
                self.handle_goal_line_exit();
                return;
            }

            if self.pending_shot.is_some() {
                self.try_resolve_shot();
            } else if let Some(pass) = self.pending_pass {
                self.try_resolve_pass(pass);
            }
        } else if let Some((side, holder_id)) = self.store.get_ball_holder() {
            if let Some(state) = self.store.states(side).iter().find(|s| s.player_id == holder_id) {
                self.store.ball.position = state.position;
            }
            self.store.ball.velocity = Vector2::zeros();
            self.store.ball.status = BallStatus::InPlay;
        }
    }

    fn handle_throw_in(&mut self) {
        self.ball_in_flight = false;
        let awarded_side = self
            .pending_pass
            .map(|p| p.side.opponent())
            .or_else(|| self.pending_shot.map(|s| s.side.opponent()))
            .unwrap_or(TeamSide::Home);
        self.pending_pass = None;
        self.pending_shot = None;

        let y = if self.store.ball.position.y >= 99.5 { 100.0 } else { 0.0 };
        let position = Vector2::new(self.store.ball.position.x, y);
        let taker = self.nearest_player(awarded_side, position);
        self.record_event(EventKind::ThrowIn, awarded_side, taker, None, None, position, position);

        self.store.ball.position = position;
        self.store.ball.velocity = Vector2::zeros();
        self.store.ball.status = BallStatus::Dead;
        self.set_possession(awarded_side, taker);
    }

    fn handle_goal_line_exit(&mut self) {
        self.ball_in_flight = false;
        let exited_away_end = self.store.ball.position.x >= 99.5;
        let defending_side = if exited_away_end { TeamSide::Away } else { TeamSide::Home };
        self.pending_pass = None;
        self.pending_shot = None;
        self.award_goal_kick(defending_side);
    }

    fn award_goal_kick(&mut self, defending_side: TeamSide) {
        let x = if defending_side == TeamSide::Home { 5.0 } else { 95.0 };
        let position = Vector2::new(x, 50.0);
        let keeper_id = self.find_goalkeeper(defending_side).map(|k| k.player_id);
        self.record_event(EventKind::GoalKick, defending_side, keeper_id.unwrap_or(0), None, None, position, position);
        self.store.ball.position = position;
        self.store.ball.velocity = Vector2::zeros();
        self.store.ball.status = BallStatus::Dead;
        match keeper_id {
            Some(id) => self.set_possession(defending_side, id),
            None => self.store.possession.clear(),
        }
    }

    fn award_corner(&mut self, attacking_side: TeamSide) {
        let corner_x = if attacking_side == TeamSide::Home { 100.0 } else { 0.0 };
        let corner_y = if self.store.ball.position.y > 50.0 { 100.0 } else { 0.0 };
        let position = Vector2::new(corner_x, corner_y);
        let taker = self.nearest_player(attacking_side, position);
        self.record_event(EventKind::Corner, attacking_side, taker, None, None, position, position);
        self.store.ball.position = position;
        self.store.ball.velocity = Vector2::zeros();
        self.store.ball.status = BallStatus::Dead;
        self.set_possession(attacking_side, taker);
    }

    fn defensive_line_discipline(&self, side: TeamSide) -> f32 {
        let values: Vec<f32> = self
            .store
            .states(side)
            .iter()
            .filter(|s| s.role == Role::Cb && !s.sent_off)
            .map(|s| self.attribute(side, s.player_id, AttributeKey::Positioning))
            .collect();
        if values.is_empty() {
            10.0
        } else {
            values.iter().sum::<f32>() / values.len() as f32
        }
    }

    fn try_resolve_pass(&mut self, pass: PendingPass) {
        let ball_position = self.store.ball.position;
        let kind = if pass.is_cross { ContestKind::Header } else { ContestKind::Pass };
        let request = ContestRequest {
            kind,
            initiator: (pass.side, pass.passer_id),
            target: pass.target_id.map(|id| (pass.side, id)),
            ball_position,
            pass_origin: Some(pass.origin),
        };

        let arrived = pass
            .target_id
            .and_then(|id| self.store.states(pass.side).iter().find(|s| s.player_id == id))
            .map(|s| (s.position - ball_position).norm() < 2.5)
            .unwrap_or(false);
        let flight_expired = self.store.ball.velocity.norm() < crate::geometry::STOP_SPEED;

        if let Some(outcome) = contest::resolve_contest(&mut self.store, request, &mut self.rng) {
            self.conclude_pass(pass, outcome, ball_position);
        } else if arrived || flight_expired {
            self.conclude_pass_uncontested(pass, ball_position, arrived);
        }
    }

    fn conclude_pass(&mut self, pass: PendingPass, outcome: contest::ContestOutcome, ball_position: Vector2<f32>) {
        self.ball_in_flight = false;
        self.pending_pass = None;
        let success = outcome.winner.0 == pass.side;
        let kind = events_detect::contest_event_kind(if pass.is_cross { ContestKind::Header } else { ContestKind::Pass }, !success);
        let tick_index = self.store.clock.tick_index;
        let action = if pass.is_cross { ActionKind::Cross } else { ActionKind::Pass };

        if success {
            if let Some(state) = self.store.state_mut(pass.side, pass.passer_id) {
                state.passes_completed += 1;
                state.recent_failure_memory.record_success(action);
            }
            self.last_completed_pass = Some((pass.side, pass.passer_id, outcome.winner.1));
            self.record_event(kind, pass.side, pass.passer_id, Some(outcome.winner.1), None, pass.origin, ball_position);
        } else {
            if let Some(state) = self.store.state_mut(pass.side, pass.passer_id) {
                state.recent_failure_memory.record_failure(action, tick_index);
            }
            self.record_event(kind, outcome.winner.0, outcome.winner.1, None, None, pass.origin, ball_position);
        }
    }

    fn conclude_pass_uncontested(&mut self, pass: PendingPass, ball_position: Vector2<f32>, arrived: bool) {
        self.ball_in_flight = false;
        self.pending_pass = None;
        let action = if pass.is_cross { ActionKind::Cross } else { ActionKind::Pass };

        if !arrived {
            self.store.possession.clear();
            self.store.ball.status = BallStatus::Loose;
            self.record_event(EventKind::Clearance, pass.side, pass.passer_id, None, None, pass.origin, ball_position);
            return;
        }

        let Some(id) = pass.target_id else {
            self.store.possession.clear();
            self.store.ball.status = BallStatus::Loose;
            return;
        };

        if !pass.is_cross {
            let is_home = pass.side == TeamSide::Home;
            let attacking_third = if is_home { ball_position.x > 66.6 } else { ball_position.x < 33.3 };
            if attacking_third {
                let defending_side = pass.side.opponent();
                let discipline = self.defensive_line_discipline(defending_side);
                let anticipation = self.attribute(pass.side, id, AttributeKey::Anticipation);
                if events_detect::offside_roll(&mut self.rng, discipline, anticipation) {
                    self.store.stats_mut(pass.side).offsides += 1;
                    self.record_event(EventKind::Offside, pass.side, id, None, None, ball_position, ball_position);
                    let taker = self.nearest_player(defending_side, ball_position);
                    self.store.ball.status = BallStatus::Dead;
                    self.set_possession(defending_side, taker);
                    return;
                }
            }
        }

        if let Some(state) = self.store.state_mut(pass.side, pass.passer_id) {
            state.passes_completed += 1;
            state.recent_failure_memory.record_success(action);
        }
        self.last_completed_pass = Some((pass.side, pass.passer_id, id));
        self.set_possession(pass.side, id);
        self.store.possession.grant_protection(id, pass.side, self.store.clock.tick_index);
        let kind = if pass.is_cross { EventKind::Cross } else { EventKind::Pass };
        self.record_event(kind, pass.side, pass.passer_id, Some(id), None, pass.origin, ball_position);
    }

    fn try_resolve_shot(&mut self) {
        let Some(shot) = self.pending_shot else { return };
        let ball_position = self.store.ball.position;
        let flight_expired = self.store.ball.velocity.norm() < crate::geometry::STOP_SPEED;
        let reached_goal_line = if shot.side == TeamSide::Home { ball_position.x >= 99.0 } else { ball_position.x <= 1.0 };
        if !flight_expired && !reached_goal_line {
            return;
        }
        self.ball_in_flight = false;
        self.pending_shot = None;

        let is_home = shot.side == TeamSide::Home;
        let finishing = self.attribute(shot.side, shot.shooter_id, AttributeKey::Finishing);
        let composure = self.attribute(shot.side, shot.shooter_id, AttributeKey::Composure);
        let opponent_side = shot.side.opponent();
        let nearest_opponent = self
            .store
            .states(opponent_side)
            .iter()
            .filter(|o| !o.sent_off)
            .map(|o| (o.position - shot.origin).norm())
            .fold(f32::INFINITY, f32::min);
        let pressure_factor = (1.0 - (nearest_opponent / 8.0)).clamp(0.0, 1.0);
        let momentum = if self.store.possession.owning_team == Some(shot.side) { 0.1 } else { 0.0 };

        let probability =
            events_detect::goal_probability(shot.origin, is_home, finishing, composure, pressure_factor, momentum, shot.is_one_on_one);
        let keeper = self.find_goalkeeper(opponent_side);
        let save_probability = keeper
            .as_ref()
            .map(|k| events_detect::save_probability(k, &self.store, opponent_side))
            .unwrap_or(0.4);
        let outcome = events_detect::resolve_shot_outcome(&mut self.rng, probability, save_probability);

        match outcome {
            ShotOutcome::Goal => self.handle_goal(shot, ball_position),
            ShotOutcome::SavedCorner => self.handle_save(shot, keeper, true),
            ShotOutcome::SavedHeld => self.handle_save(shot, keeper, false),
            ShotOutcome::OffTarget => self.handle_off_target(shot, ball_position),
        }
    }

    fn handle_goal(&mut self, shot: PendingShot, ball_position: Vector2<f32>) {
        let scorer_side = shot.side;
        match scorer_side {
            TeamSide::Home => self.store.score_home += 1,
            TeamSide::Away => self.store.score_away += 1,
        }
        let goal_point = Vector2::new(if scorer_side == TeamSide::Home { 100.0 } else { 0.0 }, 50.0);
        self.record_event(EventKind::Goal, scorer_side, shot.shooter_id, None, None, shot.origin, goal_point);

        if let Some(state) = self.store.state_mut(scorer_side, shot.shooter_id) {
            state.goals += 1;
            state.shots_on_target += 1;
            state.morale = apply_morale_event(state.morale, MoraleEvent::GoalScored);
            state.recent_failure_memory.record_success(ActionKind::Shoot);
        }

        if let Some((passer_side, passer_id, receiver_id)) = self.last_completed_pass.take() {
            if passer_side == scorer_side && receiver_id == shot.shooter_id && passer_id != shot.shooter_id {
                if let Some(state) = self.store.state_mut(passer_side, passer_id) {
                    state.assists += 1;
                    state.morale = apply_morale_event(state.morale, MoraleEvent::Assist);
                }
            }
        }

        let _ = ball_position;
        self.goal_reset(scorer_side);
    }

    fn handle_save(&mut self, shot: PendingShot, keeper: Option<PlayerMatchState>, is_corner: bool) {
        let opponent_side = shot.side.opponent();
        let goal_point = Vector2::new(if shot.side == TeamSide::Home { 100.0 } else { 0.0 }, 50.0);
        if let Some(state) = self.store.state_mut(shot.side, shot.shooter_id) {
            state.shots_on_target += 1;
        }
        self.record_event(
            EventKind::ShotOnTarget,
            shot.side,
            shot.shooter_id,
            None,
            Some("saved".to_string()),
            shot.origin,
            goal_point,
        );

        if let Some(keeper) = &keeper {
            self.record_event(EventKind::Save, opponent_side, keeper.player_id, None, None, keeper.position, keeper.position);
            if let Some(state) = self.store.state_mut(opponent_side, keeper.player_id) {
                state.key_saves += 1;
                state.morale = apply_morale_event(state.morale, MoraleEvent::KeySave);
            }
        }

        if is_corner {
            self.store.stats_mut(shot.side).corners += 1;
            self.award_corner(shot.side);
        } else {
            self.store.ball.velocity = Vector2::zeros();
            self.store.ball.status = BallStatus::InPlay;
            match keeper {
                Some(keeper) => self.set_possession(opponent_side, keeper.player_id),
                None => self.store.possession.clear(),
            }
        }
    }

    fn handle_off_target(&mut self, shot: PendingShot, ball_position: Vector2<f32>) {
        let tick_index = self.store.clock.tick_index;
        self.record_event(EventKind::ShotOffTarget, shot.side, shot.shooter_id, None, None, shot.origin, ball_position);
        if let Some(state) = self.store.state_mut(shot.side, shot.shooter_id) {
            state.recent_failure_memory.record_failure(ActionKind::Shoot, tick_index);
        }
        self.award_goal_kick(shot.side.opponent());
    }

    fn goal_reset(&mut self, scorer_side: TeamSide) {
        self.store.ball.reset_to_kickoff();
        let home_formation = self.home_formation;
        let away_formation = self.away_formation;
        for (i, state) in self.store.home_states.iter_mut().enumerate() {
            state.reset_to_formation(home_formation.anchor(i, true));
        }
        for (i, state) in self.store.away_states.iter_mut().enumerate() {
            state.reset_to_formation(away_formation.anchor(i, false));
        }

        let conceding_side = scorer_side.opponent();
        let kicker_id = self
            .store
            .states(conceding_side)
            .iter()
            .find(|s| matches!(s.role, Role::St | Role::Cf))
            .map(|s| s.player_id)
            .or_else(|| self.store.states(conceding_side).first().map(|s| s.player_id));

        self.ball_in_flight = false;
        self.pending_pass = None;
        self.pending_shot = None;
        self.store.ball.status = BallStatus::InPlay;
        if let Some(id) = kicker_id {
            self.set_possession(conceding_side, id);
        }
        self.just_changed_possession = true;
    }

    fn restart_second_half(&mut self) {
        self.store.ball.reset_to_kickoff();
        let home_formation = self.home_formation;
        let away_formation = self.away_formation;
        for (i, state) in self.store.home_states.iter_mut().enumerate() {
            state.reset_to_formation(home_formation.anchor(i, true));
        }
        for (i, state) in self.store.away_states.iter_mut().enumerate() {
            state.reset_to_formation(away_formation.anchor(i, false));
        }

        let kicker_id = self
            .store
            .states(TeamSide::Away)
            .iter()
            .find(|s| matches!(s.role, Role::St | Role::Cf))
            .map(|s| s.player_id)
            .or_else(|| self.store.states(TeamSide::Away).first().map(|s| s.player_id));

        self.ball_in_flight = false;
        self.pending_pass = None;
        self.pending_shot = None;
        self.store.ball.status = BallStatus::InPlay;
        if let Some(id) = kicker_id {
            self.set_possession(TeamSide::Away, id);
            self.emit_kickoff(TeamSide::Away);
        }
    }

    fn process_half_time_substitutions(&mut self) {
        self.substitute_tired_players(TeamSide::Home);
        self.substitute_tired_players(TeamSide::Away);
    }

    /// Swaps out the most fatigued starters for bench players of matching
    /// role where possible (spec §2 supplemented feature, grounded on the
    /// teacher's halftime substitution pass).
    fn substitute_tired_players(&mut self, side: TeamSide) {
        let roster_ids: Vec<u32> = self.store.team(side).roster.iter().map(|p| p.id).collect();
        let on_pitch: Vec<u32> = self.store.states(side).iter().map(|s| s.player_id).collect();
        let mut bench: Vec<u32> = roster_ids.into_iter().filter(|id| !on_pitch.contains(id)).sorted().collect();

        let candidates: Vec<(usize, f32)> = self
            .store
            .states(side)
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.sent_off)
            .map(|(i, s)| (i, s.fatigue))
            .filter(|(_, fatigue)| *fatigue >= SUBSTITUTION_FATIGUE_THRESHOLD)
            .sorted_by(|a, b| b.1.partial_cmp(&a.1).unwrap())
            .collect();

        let mut made = 0;
        for (slot_index, _) in candidates {
            if made >= MAX_SUBSTITUTIONS_PER_TEAM || bench.is_empty() {
                break;
            }
            let outgoing_role = self.store.states(side)[slot_index].role;
            let replacement_pos = bench
                .iter()
                .position(|id| self.store.player_lookup(side, *id).map(|p| p.primary_role == outgoing_role).unwrap_or(false))
                .or_else(|| {
                    bench.iter().position(|id| {
                        self.store
                            .player_lookup(side, *id)
                            .map(|p| p.primary_role.position_group() == outgoing_role.position_group())
                            .unwrap_or(false)
                    })
                });
            let Some(pos) = replacement_pos else { continue };
            let incoming_id = bench.remove(pos);

            let outgoing_id = self.store.states(side)[slot_index].player_id;
            let anchor = self.store.states(side)[slot_index].position;
            let mut archived = self.store.states(side)[slot_index].clone();
            archived.subbed_off = true;
            self.substituted_out.push((side, archived));

            self.store.states_mut(side)[slot_index] = PlayerMatchState {
                morale: NEUTRAL_MORALE,
                ..PlayerMatchState::at_anchor(incoming_id, outgoing_role, anchor)
            };

            self.record_event(EventKind::Substitution, side, incoming_id, Some(outgoing_id), None, anchor, anchor);
            made += 1;
        }
    }

    fn compute_match_ratings(&self) -> HashMap<u32, f32> {
        let mut ratings = HashMap::new();
        for side in [TeamSide::Home, TeamSide::Away] {
            let (own_score, opp_score) = match side {
                TeamSide::Home => (self.store.score_home, self.store.score_away),
                TeamSide::Away => (self.store.score_away, self.store.score_home),
            };
            let clean_sheet = opp_score == 0;
            let team_result_bonus = match own_score.cmp(&opp_score) {
                std::cmp::Ordering::Greater => 0.5,
                std::cmp::Ordering::Equal => 0.0,
                std::cmp::Ordering::Less => -0.3,
            };

            for state in self.store.states(side) {
                ratings.insert(state.player_id, rate_player(state, team_result_bonus, clean_sheet));
            }
            for (archived_side, state) in &self.substituted_out {
                if *archived_side == side {
                    ratings.insert(state.player_id, rate_player(state, team_result_bonus, clean_sheet));
                }
            }
        }
        ratings
    }

    fn build_tick(&mut self, phase: MatchPhase) -> Tick {
        let (home_pct, away_pct) = StatBlock::allocate_possession(self.store.possession_ticks_home, self.store.possession_ticks_away);
        self.store.stats_home.possession_pct = home_pct;
        self.store.stats_away.possession_pct = away_pct;

        let commentary = self.minute_commentary.join(" ");
        self.minute_commentary.clear();
        let events = std::mem::take(&mut self.minute_events);

        let player_ratings = if phase == MatchPhase::FullTime { Some(self.compute_match_ratings()) } else { None };

        Tick {
            minute: self.store.clock.minute(),
            phase,
            possession: self.store.possession.owning_team,
            zone: Zone::from_ball_x(self.store.ball.position.x),
            ball: Coordinates::from(self.store.ball.position),
            events,
            score: Score { home: self.store.score_home, away: self.store.score_away },
            stats: TeamStats { home: self.store.stats_home, away: self.store.stats_away },
            commentary,
            player_fatigue: self.store.fatigue_map(),
            player_ratings,
        }
    }
}

fn rate_player(state: &PlayerMatchState, team_result_bonus: f32, clean_sheet: bool) -> f32 {
    let mut rating = 6.0;
    rating += state.goals as f32;
    rating += state.assists as f32 * 0.6;

    if state.passes_attempted > 0 {
        let completion = state.passes_completed as f32 / state.passes_attempted as f32;
        rating += (completion - 0.75) * 2.0;
    }
    if state.shots_attempted > 0 {
        let accuracy = state.shots_on_target as f32 / state.shots_attempted as f32;
        rating += accuracy - 0.4;
    }
    if state.tackles_attempted > 0 {
        let success = state.tackles_won as f32 / state.tackles_attempted as f32;
        rating += (success - 0.5) * 0.8;
    }
    if state.role == Role::Gk && clean_sheet {
        rating += 0.5;
    }
    rating += state.key_saves as f32 * 0.3;
    rating -= state.yellow_cards as f32 * 0.2;
    if state.sent_off {
        rating -= 1.5;
    }
    rating += team_result_bonus;

    rating.clamp(1.0, 10.0)
}

impl Iterator for MatchSimulation {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.finished {
            return None;
        }

        loop {
            if self.store.clock.tick_index == HALF_TIME_TICK && !self.half_time_emitted {
                self.half_time_emitted = true;
                let tick = self.build_tick(MatchPhase::HalfTime);
                self.process_half_time_substitutions();
                self.restart_second_half();
                return Some(tick);
            }

            self.step_one_second();

            let reached_full_time = self.store.clock.has_reached_full_time(END_MINUTE);
            if reached_full_time {
                self.finished = true;
                return Some(self.build_tick(MatchPhase::FullTime));
            }

            let should_yield = match self.resolution {
                TickResolution::PerSecond => true,
                TickResolution::PerMinute => self.store.clock.is_minute_boundary(),
            };
            if should_yield {
                let phase = if self.store.clock.minute() < 45 { MatchPhase::FirstHalf } else { MatchPhase::SecondHalf };
                return Some(self.build_tick(phase));
            }
        }
    }
}
