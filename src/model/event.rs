use nalgebra::Vector2;
use serde::Serialize;

use crate::model::team::TeamSide;

/// Closed set of typed events the engine can emit (spec §3 GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Pass,
    Interception,
    TackleSuccess,
    TackleFailed,
    Clearance,
    Dribbling,
    Cross,
    ShotOnTarget,
    ShotOffTarget,
    Goal,
    Save,
    Corner,
    GoalKick,
    ThrowIn,
    Foul,
    YellowCard,
    RedCard,
    Offside,
    Penalty,
    FreeKick,
    Substitution,
    Kickoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationAction {
    Pass,
    Cross,
    Shoot,
    Dribble,
    SkillMove,
    Tackle,
    Clearance,
    Header,
    Carry,
    GoalNet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BallHeight {
    Ground,
    Low,
    High,
    Lofted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionIntensity {
    Soft,
    Normal,
    Hard,
}

#[derive(Debug, Clone, Serialize)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
}

impl From<Vector2<f32>> for Coordinates {
    fn from(value: Vector2<f32>) -> Self {
        Coordinates { x: value.x, y: value.y }
    }
}

/// One rendering step within an Event's sequence (spec §3 GLOSSARY,
/// spec §5 "Animation Sequencer").
#[derive(Debug, Clone, Serialize)]
pub struct AnimationStep {
    pub action: AnimationAction,
    pub actor_id: u32,
    pub actor_name: String,
    pub target_id: Option<u32>,
    pub ball_start: Coordinates,
    pub ball_end: Coordinates,
    pub duration_ms: u32,
    pub ball_height: BallHeight,
    pub intensity: ActionIntensity,
}

pub const MIN_ANIMATION_DURATION_MS: u32 = 100;
pub const MAX_ANIMATION_DURATION_MS: u32 = 2000;

impl AnimationStep {
    /// Clamps `duration_ms` into spec's [100, 2000] bound; out-of-range
    /// callers indicate a miscalibrated distance/speed constant upstream.
    pub fn clamped_duration(duration_ms: u32) -> u32 {
        duration_ms.clamp(MIN_ANIMATION_DURATION_MS, MAX_ANIMATION_DURATION_MS)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub minute: u8,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub team: TeamSide,
    pub primary_player_id: u32,
    pub primary_player_name: String,
    pub secondary_player_id: Option<u32>,
    pub outcome: Option<String>,
    pub coordinates: Coordinates,
    pub sequence: Vec<AnimationStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_clamped_to_spec_bounds() {
        assert_eq!(AnimationStep::clamped_duration(50), 100);
        assert_eq!(AnimationStep::clamped_duration(5000), 2000);
        assert_eq!(AnimationStep::clamped_duration(800), 800);
    }

    #[test]
    fn event_serializes_with_snake_case_type_tag() {
        let event = Event {
            minute: 12,
            kind: EventKind::ShotOnTarget,
            team: TeamSide::Home,
            primary_player_id: 9,
            primary_player_name: "Striker".into(),
            secondary_player_id: None,
            outcome: Some("saved".into()),
            coordinates: Coordinates { x: 88.0, y: 50.0 },
            sequence: Vec::new(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"shot_on_target\""));
    }
}
