use crate::model::team::TeamSide;

/// Short immunity window granted to the player who just won the ball,
/// preventing an immediate counter-tackle (spec §4.10, GLOSSARY).
#[derive(Debug, Clone, Copy)]
pub struct PossessionProtection {
    pub player_id: u32,
    pub team: TeamSide,
    pub expires_at_tick: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PossessionState {
    pub owning_team: Option<TeamSide>,
    pub owning_player: Option<u32>,
    pub last_change_tick: u64,
    pub protection: Option<PossessionProtection>,
}

impl PossessionState {
    pub fn set(&mut self, team: TeamSide, player_id: u32, tick: u64) {
        self.owning_team = Some(team);
        self.owning_player = Some(player_id);
        self.last_change_tick = tick;
    }

    pub fn clear(&mut self) {
        self.owning_team = None;
        self.owning_player = None;
    }

    pub fn grant_protection(&mut self, player_id: u32, team: TeamSide, current_tick: u64) {
        // 1.5s of immunity (spec §4.10) at the engine's 1-tick-per-second cadence, rounded up.
        const PROTECTION_TICKS: u64 = 2;
        self.protection = Some(PossessionProtection {
            player_id,
            team,
            expires_at_tick: current_tick + PROTECTION_TICKS,
        });
    }

    /// Whether a contest initiated by `challenging_team` against the current
    /// ball holder should be rejected outright due to possession protection.
    pub fn blocks_contest_from(&self, challenging_team: TeamSide, current_tick: u64) -> bool {
        match self.protection {
            Some(protection) => {
                current_tick < protection.expires_at_tick && protection.team != challenging_team
            }
            None => false,
        }
    }

    pub fn expire_protection(&mut self, current_tick: u64) {
        if let Some(protection) = self.protection {
            if current_tick >= protection.expires_at_tick {
                self.protection = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protection_blocks_opposing_team_only() {
        let mut state = PossessionState::default();
        state.grant_protection(7, TeamSide::Home, 100);

        assert!(state.blocks_contest_from(TeamSide::Away, 105));
        assert!(!state.blocks_contest_from(TeamSide::Home, 105));
    }

    #[test]
    fn protection_expires() {
        let mut state = PossessionState::default();
        state.grant_protection(7, TeamSide::Home, 100);
        assert!(state.blocks_contest_from(TeamSide::Away, 101));
        assert!(!state.blocks_contest_from(TeamSide::Away, 102));
    }

    #[test]
    fn expire_protection_clears_after_deadline() {
        let mut state = PossessionState::default();
        state.grant_protection(7, TeamSide::Home, 100);
        state.expire_protection(103);
        assert!(state.protection.is_none());
    }
}
