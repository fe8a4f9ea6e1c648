use std::collections::HashMap;

use log::warn;
use nalgebra::Vector2;

use crate::model::ball::BallState;
use crate::model::clock::MatchClock;
use crate::model::player::{Player, PlayerMatchState};
use crate::model::possession::PossessionState;
use crate::model::stats::StatBlock;
use crate::model::team::{Team, TeamSide};

const BALL_HOLDER_RADIUS: f32 = 3.0;
const NEAREST_TEAMMATE_RADIUS: f32 = 15.0;

/// Central mutable owner of all per-player and per-ball state (spec §4.4).
/// Other components borrow it for one tick; nothing retains a reference
/// across tick boundaries.
pub struct StateStore {
    pub home: Team,
    pub away: Team,
    pub home_states: Vec<PlayerMatchState>,
    pub away_states: Vec<PlayerMatchState>,
    pub ball: BallState,
    pub possession: PossessionState,
    pub clock: MatchClock,
    pub score_home: u32,
    pub score_away: u32,
    pub stats_home: StatBlock,
    pub stats_away: StatBlock,
    pub possession_ticks_home: u64,
    pub possession_ticks_away: u64,
}

impl StateStore {
    pub fn new(home: Team, away: Team) -> Self {
        StateStore {
            home,
            away,
            home_states: Vec::new(),
            away_states: Vec::new(),
            ball: BallState::at_kickoff(),
            possession: PossessionState::default(),
            clock: MatchClock::new(),
            score_home: 0,
            score_away: 0,
            stats_home: StatBlock::default(),
            stats_away: StatBlock::default(),
            possession_ticks_home: 0,
            possession_ticks_away: 0,
        }
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn states(&self, side: TeamSide) -> &[PlayerMatchState] {
        match side {
            TeamSide::Home => &self.home_states,
            TeamSide::Away => &self.away_states,
        }
    }

    pub fn states_mut(&mut self, side: TeamSide) -> &mut Vec<PlayerMatchState> {
        match side {
            TeamSide::Home => &mut self.home_states,
            TeamSide::Away => &mut self.away_states,
        }
    }

    pub fn stats_mut(&mut self, side: TeamSide) -> &mut StatBlock {
        match side {
            TeamSide::Home => &mut self.stats_home,
            TeamSide::Away => &mut self.stats_away,
        }
    }

    pub fn player_lookup(&self, side: TeamSide, player_id: u32) -> Option<&Player> {
        self.team(side).roster.iter().find(|p| p.id == player_id)
    }

    pub fn all_states(&self) -> impl Iterator<Item = (TeamSide, &PlayerMatchState)> {
        self.home_states
            .iter()
            .map(|s| (TeamSide::Home, s))
            .chain(self.away_states.iter().map(|s| (TeamSide::Away, s)))
    }

    pub fn all_states_mut(&mut self) -> impl Iterator<Item = (TeamSide, &mut PlayerMatchState)> {
        self.home_states
            .iter_mut()
            .map(|s| (TeamSide::Home, s))
            .chain(self.away_states.iter_mut().map(|s| (TeamSide::Away, s)))
    }

    pub fn state_mut(&mut self, side: TeamSide, player_id: u32) -> Option<&mut PlayerMatchState> {
        self.states_mut(side).iter_mut().find(|s| s.player_id == player_id)
    }

    pub fn advance_clock(&mut self) {
        self.clock.advance();
    }

    /// Player within 3.0m of the ball and on the possession team, else the
    /// nearest same-team player within 15m (spec §4.4).
    pub fn get_ball_holder(&self) -> Option<(TeamSide, u32)> {
        let side = self.possession.owning_team?;
        let states = self.states(side);

        if let Some(player) = states
            .iter()
            .find(|s| !s.sent_off && (s.position - self.ball.position).norm() <= BALL_HOLDER_RADIUS)
        {
            return Some((side, player.player_id));
        }

        states
            .iter()
            .filter(|s| !s.sent_off)
            .map(|s| (s, (s.position - self.ball.position).norm()))
            .filter(|(_, dist)| *dist <= NEAREST_TEAMMATE_RADIUS)
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(s, _)| (side, s.player_id))
    }

    /// Soft anomaly: an orphan ball (no player within 3m) resolves to the
    /// nearest same-team player within 15m (spec §7).
    pub fn force_initial_possession(&mut self) {
        let mut best: Option<(TeamSide, u32, f32)> = None;
        for (side, state) in self.all_states() {
            if state.sent_off {
                continue;
            }
            let dist = (state.position - self.ball.position).norm();
            if dist <= NEAREST_TEAMMATE_RADIUS {
                if best.map(|(_, _, b)| dist < b).unwrap_or(true) {
                    best = Some((side, state.player_id, dist));
                }
            }
        }
        match best {
            Some((side, player_id, _)) => {
                self.possession.set(side, player_id, self.clock.tick_index);
            }
            None => {
                warn!("force_initial_possession: no player within range of ball, leaving possession unset");
            }
        }
    }

    pub fn fatigue_map(&self) -> HashMap<u32, f32> {
        self.all_states().map(|(_, s)| (s.player_id, s.fatigue)).collect()
    }

    pub fn record_possession_tick(&mut self) {
        match self.possession.owning_team {
            Some(TeamSide::Home) => self.possession_ticks_home += 1,
            Some(TeamSide::Away) => self.possession_ticks_away += 1,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::Role;

    fn sample_team(id: u32, name: &str) -> Team {
        let roster = (0..11)
            .map(|i| Player {
                id: id * 100 + i,
                name: format!("{name}-{i}"),
                primary_role: if i == 0 { Role::Gk } else { Role::Cm },
                skills: Default::default(),
                traits: Default::default(),
            })
            .collect();
        Team { id, name: name.to_string(), roster, primary_tactic: None }
    }

    fn sample_state(player_id: u32, position: Vector2<f32>) -> PlayerMatchState {
        PlayerMatchState::at_anchor(player_id, Role::Cm, position)
    }

    #[test]
    fn ball_holder_prefers_player_within_possession_radius() {
        let mut store = StateStore::new(sample_team(1, "Home"), sample_team(2, "Away"));
        store.home_states.push(sample_state(100, Vector2::new(50.0, 50.0)));
        store.ball.position = Vector2::new(51.0, 50.0);
        store.possession.set(TeamSide::Home, 100, 0);

        let holder = store.get_ball_holder();
        assert_eq!(holder, Some((TeamSide::Home, 100)));
    }

    #[test]
    fn ball_holder_falls_back_to_nearest_teammate() {
        let mut store = StateStore::new(sample_team(1, "Home"), sample_team(2, "Away"));
        store.home_states.push(sample_state(100, Vector2::new(40.0, 50.0)));
        store.home_states.push(sample_state(101, Vector2::new(55.0, 50.0)));
        store.ball.position = Vector2::new(60.0, 50.0);
        store.possession.set(TeamSide::Home, 100, 0);

        let holder = store.get_ball_holder();
        assert_eq!(holder, Some((TeamSide::Home, 101)));
    }

    #[test]
    fn force_initial_possession_picks_nearest_overall() {
        let mut store = StateStore::new(sample_team(1, "Home"), sample_team(2, "Away"));
        store.home_states.push(sample_state(100, Vector2::new(50.0, 60.0)));
        store.away_states.push(sample_state(200, Vector2::new(50.0, 51.0)));
        store.ball.position = Vector2::new(50.0, 50.0);

        store.force_initial_possession();
        assert_eq!(store.possession.owning_player, Some(200));
        assert_eq!(store.possession.owning_team, Some(TeamSide::Away));
    }
}
