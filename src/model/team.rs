use crate::model::player::Player;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mentality {
    VeryDefensive,
    Defensive,
    Balanced,
    Attacking,
    VeryAttacking,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TacticFlags {
    pub tackle_harder: bool,
    pub get_stuck_in: bool,
    pub counter_press: bool,
    pub time_wasting: bool,
    pub creative_freedom: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Tactic {
    pub mentality: Mentality,
    pub pressing_intensity: f32,
    pub tempo: f32,
    pub width: f32,
    pub pass_directness: f32,
    pub flags: TacticFlags,
}

impl Default for Tactic {
    fn default() -> Self {
        Tactic {
            mentality: Mentality::Balanced,
            pressing_intensity: 0.5,
            tempo: 0.5,
            width: 0.5,
            pass_directness: 0.5,
            flags: TacticFlags::default(),
        }
    }
}

impl Tactic {
    /// A missing tactic is treated as balanced defaults (spec §3).
    pub fn or_balanced(tactic: Option<&Tactic>) -> Tactic {
        tactic.copied().unwrap_or_default()
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.mentality, Mentality::Attacking | Mentality::VeryAttacking)
    }

    pub fn is_defensive(&self) -> bool {
        matches!(self.mentality, Mentality::Defensive | Mentality::VeryDefensive)
    }
}

#[derive(Debug, Clone)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub roster: Vec<Player>,
    pub primary_tactic: Option<Tactic>,
}

impl Team {
    pub fn tactic(&self) -> Tactic {
        Tactic::or_balanced(self.primary_tactic.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tactic_is_balanced() {
        let tactic = Tactic::or_balanced(None);
        assert_eq!(tactic.mentality, Mentality::Balanced);
        assert!(!tactic.is_attacking());
        assert!(!tactic.is_defensive());
    }

    #[test]
    fn opponent_flips_side() {
        assert_eq!(TeamSide::Home.opponent(), TeamSide::Away);
        assert_eq!(TeamSide::Away.opponent(), TeamSide::Home);
    }
}
