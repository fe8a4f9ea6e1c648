use crate::model::player::{ActionKind, ActionPhase, PlayerMatchState};

/// Duration in ticks (= seconds) for each action once it begins executing
/// (spec §4.9).
pub fn action_duration_ticks(action: ActionKind) -> u32 {
    match action {
        ActionKind::Dribble => 3,
        ActionKind::Pass => 2,
        ActionKind::Shoot => 4,
        ActionKind::Hold => 1,
        ActionKind::Tackle => 2,
        ActionKind::Cross => 2,
        ActionKind::Header => 3,
    }
}

/// Cooldown applied after an action completes (spec §4.9).
pub fn action_cooldown_ticks(action: ActionKind) -> u32 {
    match action {
        ActionKind::Pass => 2,
        ActionKind::Shoot => 5,
        ActionKind::Tackle => 4,
        ActionKind::Dribble => 2,
        ActionKind::Header => 3,
        ActionKind::Cross => 2,
        ActionKind::Hold => 0,
    }
}

fn is_interruptible(action: ActionKind) -> bool {
    !matches!(action, ActionKind::Shoot | ActionKind::Tackle | ActionKind::Header)
}

fn conflicts_with(a: ActionKind, b: ActionKind) -> bool {
    use ActionKind::*;
    matches!(
        (a, b),
        (Shoot, Pass) | (Shoot, Dribble) | (Shoot, Tackle)
            | (Pass, Shoot) | (Pass, Tackle)
            | (Tackle, Shoot) | (Tackle, Pass) | (Tackle, Dribble)
    )
}

const MAX_QUEUE_LENGTH: usize = 2;
const INTERRUPTION_COOLDOWN_MULTIPLIER: f32 = 1.5;
const INTERRUPTION_BALANCE_PENALTY: f32 = 0.1;

/// Attempts to begin `action` for `state`. Returns `true` if the action was
/// started or queued, `false` if the queue was full and the request was
/// dropped (spec §4.9: "max queue length 2").
pub fn request_action(state: &mut PlayerMatchState, action: ActionKind, tick: u64) -> bool {
    match state.current_action {
        ActionPhase::Idle => {
            begin_action(state, action, tick);
            true
        }
        ActionPhase::Preparing | ActionPhase::Executing => {
            let current = state.active_action;
            let blocked = current.map(|c| conflicts_with(c, action)).unwrap_or(false);
            if blocked {
                enqueue(state, action)
            } else {
                true
            }
        }
        ActionPhase::Recovering | ActionPhase::Contested => enqueue(state, action),
    }
}

fn enqueue(state: &mut PlayerMatchState, action: ActionKind) -> bool {
    if state.queued_actions.len() >= MAX_QUEUE_LENGTH {
        false
    } else {
        state.queued_actions.push(action);
        true
    }
}

fn begin_action(state: &mut PlayerMatchState, action: ActionKind, tick: u64) {
    state.current_action = ActionPhase::Preparing;
    state.active_action = Some(action);
    state.action_timer = action_duration_ticks(action);
    state.last_action_tick = tick;
}

/// Advances a player's action state machine by one tick (spec §4.9):
/// `idle -> preparing -> executing -> recovering -> idle`, decrementing
/// cooldowns throughout. Returns the action that just completed, if any.
pub fn advance_scheduler(state: &mut PlayerMatchState) -> Option<ActionKind> {
    for cooldown in state.action_cooldowns.values_mut() {
        if *cooldown > 0 {
            *cooldown -= 1;
        }
    }

    let mut just_completed = None;

    match state.current_action {
        ActionPhase::Idle => {}
        ActionPhase::Preparing => {
            state.current_action = ActionPhase::Executing;
        }
        ActionPhase::Executing => {
            if state.action_timer > 0 {
                state.action_timer -= 1;
            }
            if state.action_timer == 0 {
                state.current_action = ActionPhase::Recovering;
                if let Some(action) = state.active_action.take() {
                    state.action_cooldowns.insert(action, action_cooldown_ticks(action));
                    just_completed = Some(action);
                }
            }
        }
        ActionPhase::Recovering => {
            state.current_action = ActionPhase::Idle;
            if !state.queued_actions.is_empty() {
                let next = state.queued_actions.remove(0);
                begin_action(state, next, state.last_action_tick);
            }
        }
        ActionPhase::Contested => {
            state.current_action = ActionPhase::Idle;
        }
    }

    just_completed
}

/// Interrupts an in-flight interruptible action (spec §4.9): applies a
/// 1.5x cooldown and a balance penalty. No-op for non-interruptible actions
/// (shoot, tackle, header) — callers must not invoke this for those.
pub fn interrupt_action(state: &mut PlayerMatchState, action: ActionKind) {
    if !is_interruptible(action) {
        return;
    }
    let base_cooldown = action_cooldown_ticks(action) as f32;
    let penalised = (base_cooldown * INTERRUPTION_COOLDOWN_MULTIPLIER).round() as u32;
    state.action_cooldowns.insert(action, penalised);
    state.balance = (state.balance - INTERRUPTION_BALANCE_PENALTY).max(0.0);
    state.current_action = ActionPhase::Contested;
    state.active_action = None;
    state.action_timer = 0;
}

pub fn queue_len(state: &PlayerMatchState) -> usize {
    state.queued_actions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::Role;
    use nalgebra::Vector2;

    fn fresh_state() -> PlayerMatchState {
        PlayerMatchState::at_anchor(1, Role::Cm, Vector2::new(50.0, 50.0))
    }

    #[test]
    fn idle_player_begins_action_immediately() {
        let mut state = fresh_state();
        assert!(request_action(&mut state, ActionKind::Pass, 10));
        assert_eq!(state.current_action, ActionPhase::Preparing);
        assert_eq!(state.action_timer, action_duration_ticks(ActionKind::Pass));
    }

    #[test]
    fn non_interruptible_actions_are_never_interrupted() {
        let mut state = fresh_state();
        request_action(&mut state, ActionKind::Shoot, 0);
        let cooldown_before = state.action_cooldowns.get(&ActionKind::Shoot).copied();
        interrupt_action(&mut state, ActionKind::Shoot);
        assert_eq!(state.action_cooldowns.get(&ActionKind::Shoot).copied(), cooldown_before);
    }

    #[test]
    fn interruption_applies_balance_penalty_and_extended_cooldown() {
        let mut state = fresh_state();
        state.balance = 1.0;
        interrupt_action(&mut state, ActionKind::Pass);
        assert_eq!(state.current_action, ActionPhase::Contested);
        assert!((state.balance - 0.9).abs() < 1e-5);
        let expected = (action_cooldown_ticks(ActionKind::Pass) as f32 * 1.5).round() as u32;
        assert_eq!(state.action_cooldowns.get(&ActionKind::Pass).copied(), Some(expected));
    }

    #[test]
    fn queue_rejects_a_third_pending_request() {
        let mut state = fresh_state();
        request_action(&mut state, ActionKind::Shoot, 0);
        assert!(request_action(&mut state, ActionKind::Pass, 1));
        assert!(request_action(&mut state, ActionKind::Dribble, 2));
        assert!(!request_action(&mut state, ActionKind::Tackle, 3));
        assert_eq!(queue_len(&state), MAX_QUEUE_LENGTH);
    }

    #[test]
    fn cooldowns_decrement_each_tick() {
        let mut state = fresh_state();
        state.action_cooldowns.insert(ActionKind::Shoot, 3);
        advance_scheduler(&mut state);
        assert_eq!(state.action_cooldowns.get(&ActionKind::Shoot).copied(), Some(2));
    }

    #[test]
    fn executing_action_transitions_to_recovering_when_timer_expires() {
        let mut state = fresh_state();
        state.current_action = ActionPhase::Executing;
        state.active_action = Some(ActionKind::Pass);
        state.action_timer = 1;
        let completed = advance_scheduler(&mut state);
        assert_eq!(completed, Some(ActionKind::Pass));
        assert_eq!(state.current_action, ActionPhase::Recovering);
        assert_eq!(state.action_cooldowns.get(&ActionKind::Pass).copied(), Some(2));
    }
}
