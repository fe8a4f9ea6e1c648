use std::collections::HashMap;

use serde::Serialize;

use crate::model::event::{Coordinates, Event};
use crate::model::stats::StatBlock;
use crate::model::team::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    FirstHalf,
    HalfTime,
    SecondHalf,
    FullTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Defensive,
    Middle,
    Attacking,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamStats {
    pub home: StatBlock,
    pub away: StatBlock,
}

/// Consumer-facing wire record for one simulated minute (or second, at
/// caller option) — spec §6 "stable wire format, JSON-compatible".
#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    pub minute: u8,
    pub phase: MatchPhase,
    pub possession: Option<TeamSide>,
    pub zone: Zone,
    pub ball: Coordinates,
    pub events: Vec<Event>,
    pub score: Score,
    pub stats: TeamStats,
    pub commentary: String,
    pub player_fatigue: HashMap<u32, f32>,
    /// Football-Manager-style 1.0-10.0 rating per player, populated only on
    /// the final (full-time) Tick (spec §2 supplemented feature).
    pub player_ratings: Option<HashMap<u32, f32>>,
}

impl Zone {
    /// Ball x is measured on the home-attacking-direction axis [0,100];
    /// thirds split evenly (spec §4.6 uses the same third boundaries).
    pub fn from_ball_x(ball_x: f32) -> Zone {
        if ball_x < 33.3 {
            Zone::Defensive
        } else if ball_x < 66.6 {
            Zone::Middle
        } else {
            Zone::Attacking
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_thirds_split_the_pitch() {
        assert_eq!(Zone::from_ball_x(10.0), Zone::Defensive);
        assert_eq!(Zone::from_ball_x(50.0), Zone::Middle);
        assert_eq!(Zone::from_ball_x(90.0), Zone::Attacking);
    }

    #[test]
    fn tick_serializes_to_stable_field_names() {
        let tick = Tick {
            minute: 1,
            phase: MatchPhase::FirstHalf,
            possession: Some(TeamSide::Home),
            zone: Zone::Middle,
            ball: Coordinates { x: 50.0, y: 50.0 },
            events: Vec::new(),
            score: Score::default(),
            stats: TeamStats { home: StatBlock::default(), away: StatBlock::default() },
            commentary: String::new(),
            player_fatigue: HashMap::new(),
            player_ratings: None,
        };
        let json = serde_json::to_string(&tick).unwrap();
        assert!(json.contains("\"phase\":\"first_half\""));
        assert!(json.contains("\"possession\":\"home\""));
    }
}
