use nalgebra::Vector2;

use crate::model::event::{ActionIntensity, AnimationAction, AnimationStep, BallHeight, Coordinates, EventKind};

const SHORT_PASS_MAX_METERS: f32 = 25.0;
const PASS_BASE_MS: f32 = 600.0;
const PASS_MS_PER_METER: f32 = 20.0;
const LONG_THROUGH_BALL_METERS: f32 = 35.0;

fn duration_ms(distance: f32, base_ms: f32, ms_per_meter: f32) -> u32 {
    AnimationStep::clamped_duration((base_ms + ms_per_meter * distance).round() as u32)
}

fn ball_height_for(action: AnimationAction, distance: f32) -> BallHeight {
    match action {
        AnimationAction::Cross | AnimationAction::Clearance => BallHeight::High,
        AnimationAction::Shoot => BallHeight::Low,
        AnimationAction::Pass if distance > LONG_THROUGH_BALL_METERS => BallHeight::Lofted,
        AnimationAction::Pass if distance <= SHORT_PASS_MAX_METERS => BallHeight::Ground,
        AnimationAction::Pass => BallHeight::Low,
        _ => BallHeight::Ground,
    }
}

fn intensity_for(action: AnimationAction) -> ActionIntensity {
    match action {
        AnimationAction::Shoot | AnimationAction::Tackle => ActionIntensity::Hard,
        AnimationAction::Dribble | AnimationAction::Carry => ActionIntensity::Soft,
        _ => ActionIntensity::Normal,
    }
}

pub struct StepSpec {
    pub action: AnimationAction,
    pub actor_id: u32,
    pub actor_name: String,
    pub target_id: Option<u32>,
    pub ball_start: Vector2<f32>,
    pub ball_end: Vector2<f32>,
}

fn build_step(spec: StepSpec) -> AnimationStep {
    let distance = (spec.ball_end - spec.ball_start).norm();
    let duration = match spec.action {
        AnimationAction::Pass | AnimationAction::Cross => duration_ms(distance, PASS_BASE_MS, PASS_MS_PER_METER),
        AnimationAction::Shoot => duration_ms(distance, 200.0, 8.0),
        AnimationAction::Clearance => duration_ms(distance, 400.0, 10.0),
        _ => duration_ms(distance, 300.0, 15.0),
    };
    AnimationStep {
        action: spec.action,
        actor_id: spec.actor_id,
        actor_name: spec.actor_name,
        target_id: spec.target_id,
        ball_start: Coordinates::from(spec.ball_start),
        ball_end: Coordinates::from(spec.ball_end),
        duration_ms: duration,
        ball_height: ball_height_for(spec.action, distance),
        intensity: intensity_for(spec.action),
    }
}

/// Builds the AnimationStep sequence for an event (spec §4.12). A pass step
/// always sets `target_id` when a receiver exists; coordinates stay within
/// the pitch because callers supply already-clamped positions.
pub fn sequence_for_event(
    kind: EventKind,
    actor_id: u32,
    actor_name: &str,
    target_id: Option<u32>,
    target_name: Option<&str>,
    origin: Vector2<f32>,
    destination: Vector2<f32>,
) -> Vec<AnimationStep> {
    match kind {
        EventKind::Pass | EventKind::Interception => vec![build_step(StepSpec {
            action: AnimationAction::Pass,
            actor_id,
            actor_name: actor_name.to_string(),
            target_id,
            ball_start: origin,
            ball_end: destination,
        })],
        EventKind::Cross => vec![
            build_step(StepSpec {
                action: AnimationAction::Cross,
                actor_id,
                actor_name: actor_name.to_string(),
                target_id,
                ball_start: origin,
                ball_end: destination,
            }),
            build_step(StepSpec {
                action: AnimationAction::Header,
                actor_id: target_id.unwrap_or(actor_id),
                actor_name: target_name.unwrap_or(actor_name).to_string(),
                target_id: None,
                ball_start: destination,
                ball_end: destination,
            }),
        ],
        EventKind::Dribbling => vec![build_step(StepSpec {
            action: AnimationAction::Dribble,
            actor_id,
            actor_name: actor_name.to_string(),
            target_id: None,
            ball_start: origin,
            ball_end: destination,
        })],
        EventKind::ShotOnTarget | EventKind::ShotOffTarget | EventKind::Penalty => {
            vec![build_step(StepSpec {
                action: AnimationAction::Shoot,
                actor_id,
                actor_name: actor_name.to_string(),
                target_id: None,
                ball_start: origin,
                ball_end: destination,
            })]
        }
        EventKind::Goal => vec![
            build_step(StepSpec {
                action: AnimationAction::Dribble,
                actor_id,
                actor_name: actor_name.to_string(),
                target_id: None,
                ball_start: origin,
                ball_end: origin,
            }),
            build_step(StepSpec {
                action: AnimationAction::Shoot,
                actor_id,
                actor_name: actor_name.to_string(),
                target_id: None,
                ball_start: origin,
                ball_end: destination,
            }),
            build_step(StepSpec {
                action: AnimationAction::GoalNet,
                actor_id,
                actor_name: actor_name.to_string(),
                target_id: None,
                ball_start: destination,
                ball_end: destination,
            }),
        ],
        EventKind::TackleSuccess | EventKind::TackleFailed => vec![build_step(StepSpec {
            action: AnimationAction::Tackle,
            actor_id,
            actor_name: actor_name.to_string(),
            target_id,
            ball_start: origin,
            ball_end: destination,
        })],
        EventKind::Clearance => vec![build_step(StepSpec {
            action: AnimationAction::Clearance,
            actor_id,
            actor_name: actor_name.to_string(),
            target_id: None,
            ball_start: origin,
            ball_end: destination,
        })],
        _ => Vec::new(),
    }
}
