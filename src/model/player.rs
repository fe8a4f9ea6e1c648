use crate::attributes::PlayerSkills;
use nalgebra::Vector2;
use std::collections::HashMap;

/// A player's natural playing role, from the closed set spec.md names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Gk,
    Cb,
    Rb,
    Lb,
    Wb,
    Dm,
    Cm,
    Am,
    Wm,
    St,
    Cf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionGroup {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Role {
    pub fn position_group(self) -> PositionGroup {
        match self {
            Role::Gk => PositionGroup::Goalkeeper,
            Role::Cb | Role::Rb | Role::Lb | Role::Wb => PositionGroup::Defender,
            Role::Dm | Role::Cm | Role::Am | Role::Wm => PositionGroup::Midfielder,
            Role::St | Role::Cf => PositionGroup::Forward,
        }
    }

    pub fn all() -> [Role; 11] {
        [
            Role::Gk,
            Role::Cb,
            Role::Rb,
            Role::Lb,
            Role::Wb,
            Role::Dm,
            Role::Cm,
            Role::Am,
            Role::Wm,
            Role::St,
            Role::Cf,
        ]
    }
}

/// Style traits referenced by Tactical Positioning (spec §4.6): a winger may
/// cut inside instead of hugging the touchline, a centre-forward may drop
/// into midfield as a false nine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerTraits {
    pub inverted_winger: bool,
    pub false_nine: bool,
}

/// Static roster entry. Immutable for the lifetime of the match (spec §3).
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub primary_role: Role,
    pub skills: PlayerSkills,
    pub traits: PlayerTraits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Shoot,
    Pass,
    Dribble,
    Hold,
    Cross,
    Tackle,
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Idle,
    Preparing,
    Executing,
    Recovering,
    Contested,
}

#[derive(Debug, Clone, Default)]
pub struct FailureMemory {
    pub last_failed_action: Option<ActionKind>,
    pub consecutive_failures: u32,
    pub last_failure_tick: u64,
}

impl FailureMemory {
    /// How hard the memory penalty bites for `action` right now (spec §4.8):
    /// `max(0.5, 1 - consecutive_failures * 0.2)` within a 300-tick window,
    /// 1.0 (no penalty) otherwise.
    pub fn penalty_for(&self, action: ActionKind, current_tick: u64) -> f32 {
        const MEMORY_WINDOW_TICKS: u64 = 300;

        match self.last_failed_action {
            Some(failed) if failed == action => {
                if current_tick.saturating_sub(self.last_failure_tick) <= MEMORY_WINDOW_TICKS {
                    (1.0 - self.consecutive_failures as f32 * 0.2).max(0.5)
                } else {
                    1.0
                }
            }
            _ => 1.0,
        }
    }

    pub fn record_failure(&mut self, action: ActionKind, tick: u64) {
        if self.last_failed_action == Some(action) {
            self.consecutive_failures += 1;
        } else {
            self.last_failed_action = Some(action);
            self.consecutive_failures = 1;
        }
        self.last_failure_tick = tick;
    }

    pub fn record_success(&mut self, action: ActionKind) {
        if self.last_failed_action == Some(action) {
            self.last_failed_action = None;
            self.consecutive_failures = 0;
        }
    }
}

/// Per-tick mutable state for one of the 22 on-pitch players (spec §3).
#[derive(Debug, Clone)]
pub struct PlayerMatchState {
    pub player_id: u32,
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub facing: f32,
    pub role: Role,

    pub fatigue: f32,
    pub stamina: f32,
    pub balance: f32,
    pub morale: f32,

    pub yellow_cards: u8,
    pub sent_off: bool,
    pub subbed_off: bool,
    pub goals: u32,
    pub assists: u32,

    /// Counters feeding the full-time match rating (spec §2 supplemented
    /// feature), the per-player analogue of `StatBlock`.
    pub passes_attempted: u32,
    pub passes_completed: u32,
    pub shots_attempted: u32,
    pub shots_on_target: u32,
    pub tackles_attempted: u32,
    pub tackles_won: u32,
    pub key_saves: u32,

    pub current_action: ActionPhase,
    pub active_action: Option<ActionKind>,
    pub action_timer: u32,
    pub action_cooldowns: HashMap<ActionKind, u32>,
    /// Pending action requests blocked by a conflicting in-flight action,
    /// retried once the player reaches idle (spec §4.9: "max queue length 2").
    pub queued_actions: Vec<ActionKind>,
    pub last_action_tick: u64,
    pub recent_failure_memory: FailureMemory,
}

impl PlayerMatchState {
    pub fn at_anchor(player_id: u32, role: Role, anchor: Vector2<f32>) -> Self {
        PlayerMatchState {
            player_id,
            position: anchor,
            velocity: Vector2::zeros(),
            facing: 0.0,
            role,
            fatigue: 0.0,
            stamina: 100.0,
            balance: 1.0,
            morale: crate::attributes::NEUTRAL_MORALE,
            yellow_cards: 0,
            sent_off: false,
            subbed_off: false,
            goals: 0,
            assists: 0,
            passes_attempted: 0,
            passes_completed: 0,
            shots_attempted: 0,
            shots_on_target: 0,
            tackles_attempted: 0,
            tackles_won: 0,
            key_saves: 0,
            current_action: ActionPhase::Idle,
            active_action: None,
            action_timer: 0,
            action_cooldowns: HashMap::new(),
            queued_actions: Vec::new(),
            last_action_tick: 0,
            recent_failure_memory: FailureMemory::default(),
        }
    }

    pub fn cooldown_for(&self, action: ActionKind) -> u32 {
        *self.action_cooldowns.get(&action).unwrap_or(&0)
    }

    pub fn is_on_cooldown(&self, action: ActionKind) -> bool {
        self.cooldown_for(action) > 0
    }

    pub fn reset_to_formation(&mut self, anchor: Vector2<f32>) {
        self.position = anchor;
        self.velocity = Vector2::zeros();
        self.current_action = ActionPhase::Idle;
        self.action_timer = 0;
        // Stamina floor after a goal reset: fatigue preserved but clamped so
        // at least 40% stamina-equivalent remains (spec §4.15 Goal Reset).
        self.fatigue = self.fatigue.min(0.6);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_position_groups_match_spec_partition() {
        assert_eq!(Role::Gk.position_group(), PositionGroup::Goalkeeper);
        assert_eq!(Role::Wb.position_group(), PositionGroup::Defender);
        assert_eq!(Role::Am.position_group(), PositionGroup::Midfielder);
        assert_eq!(Role::Cf.position_group(), PositionGroup::Forward);
    }

    #[test]
    fn failure_memory_penalty_decays_with_repeats() {
        let mut memory = FailureMemory::default();
        memory.record_failure(ActionKind::Pass, 10);
        assert!((memory.penalty_for(ActionKind::Pass, 20) - 0.8).abs() < 1e-5);

        memory.record_failure(ActionKind::Pass, 20);
        memory.record_failure(ActionKind::Pass, 30);
        assert!((memory.penalty_for(ActionKind::Pass, 40) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn failure_memory_expires_outside_window() {
        let mut memory = FailureMemory::default();
        memory.record_failure(ActionKind::Shoot, 0);
        assert_eq!(memory.penalty_for(ActionKind::Shoot, 301), 1.0);
    }

    #[test]
    fn failure_memory_ignores_other_actions() {
        let mut memory = FailureMemory::default();
        memory.record_failure(ActionKind::Tackle, 5);
        assert_eq!(memory.penalty_for(ActionKind::Pass, 6), 1.0);
    }

    #[test]
    fn success_clears_failure_streak() {
        let mut memory = FailureMemory::default();
        memory.record_failure(ActionKind::Cross, 1);
        memory.record_success(ActionKind::Cross);
        assert_eq!(memory.penalty_for(ActionKind::Cross, 2), 1.0);
    }
}
