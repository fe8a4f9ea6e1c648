use crate::engine::tick_loop::{MatchSimulation, TickResolution};
use crate::error::{EngineError, EngineResult};
use crate::model::formation::FormationTemplate;
use crate::model::team::Team;

const MIN_SQUAD_SIZE: usize = 11;

/// Fully-hydrated, read-only match configuration (spec §6 "Producer API").
/// Built once by the caller's loader before the first tick; nothing in the
/// engine looks anything up mid-match.
#[derive(Debug, Clone)]
pub struct MatchInputs {
    pub home: Team,
    pub away: Team,
    pub home_formation: FormationTemplate,
    pub away_formation: FormationTemplate,
    pub match_id: Option<String>,
}

/// Assembles a [`MatchInputs`], mirroring the teacher's `PlayerBuilder`
/// convention: accumulate optional fields, validate everything at `build()`.
#[derive(Debug, Clone, Default)]
pub struct MatchInputsBuilder {
    home: Option<Team>,
    away: Option<Team>,
    home_formation: Option<FormationTemplate>,
    away_formation: Option<FormationTemplate>,
    match_id: Option<String>,
}

impl MatchInputsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn home(mut self, team: Team) -> Self {
        self.home = Some(team);
        self
    }

    pub fn away(mut self, team: Team) -> Self {
        self.away = Some(team);
        self
    }

    pub fn home_formation(mut self, formation: FormationTemplate) -> Self {
        self.home_formation = Some(formation);
        self
    }

    pub fn away_formation(mut self, formation: FormationTemplate) -> Self {
        self.away_formation = Some(formation);
        self
    }

    pub fn match_id(mut self, id: impl Into<String>) -> Self {
        self.match_id = Some(id.into());
        self
    }

    fn validate_team(field: &'static str, team: &Team) -> EngineResult<()> {
        if team.roster.len() < MIN_SQUAD_SIZE {
            return Err(EngineError::ConfigurationInvalid {
                field,
                reason: format!("roster has {} players, fewer than the required {MIN_SQUAD_SIZE}", team.roster.len()),
            });
        }
        if let Some(tactic) = &team.primary_tactic {
            for (name, value) in [
                ("pressing_intensity", tactic.pressing_intensity),
                ("tempo", tactic.tempo),
                ("width", tactic.width),
                ("pass_directness", tactic.pass_directness),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(EngineError::ConfigurationInvalid {
                        field,
                        reason: format!("tactic.{name} = {value} is outside the valid [0,1] range"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validates and assembles the final inputs (spec §7 "Configuration
    /// errors"): missing formation, undersized roster, or contradictory
    /// tactic data all fail here, before the first tick is produced.
    pub fn build(self) -> EngineResult<MatchInputs> {
        let home = self.home.ok_or(EngineError::ConfigurationInvalid {
            field: "home",
            reason: "no home team supplied".to_string(),
        })?;
        let away = self.away.ok_or(EngineError::ConfigurationInvalid {
            field: "away",
            reason: "no away team supplied".to_string(),
        })?;
        let home_formation = self.home_formation.ok_or(EngineError::ConfigurationInvalid {
            field: "home_formation",
            reason: "no formation supplied".to_string(),
        })?;
        let away_formation = self.away_formation.ok_or(EngineError::ConfigurationInvalid {
            field: "away_formation",
            reason: "no formation supplied".to_string(),
        })?;

        Self::validate_team("home", &home)?;
        Self::validate_team("away", &away)?;

        Ok(MatchInputs {
            home,
            away,
            home_formation,
            away_formation,
            match_id: self.match_id,
        })
    }
}

/// Runs a full match at the default per-minute tick resolution (spec §6
/// "Producer API": `simulate(match_inputs, seed) -> sequence<Tick>`).
pub fn simulate(inputs: &MatchInputs, seed: u64) -> EngineResult<impl Iterator<Item = crate::model::tick::Tick>> {
    MatchSimulation::new(inputs, seed, TickResolution::PerMinute)
}

/// Runs a full match, yielding a `Tick` once per simulated second instead of
/// once per minute (spec §4.15 "or once per second at caller option").
pub fn simulate_with_resolution(
    inputs: &MatchInputs,
    seed: u64,
    resolution: TickResolution,
) -> EngineResult<impl Iterator<Item = crate::model::tick::Tick>> {
    MatchSimulation::new(inputs, seed, resolution)
}
