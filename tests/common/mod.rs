use football_match_engine::attributes::PlayerSkills;
use football_match_engine::model::player::PlayerTraits;
use football_match_engine::model::{FormationTemplate, Player, Role, Tactic, Team};
use football_match_engine::{MatchInputs, MatchInputsBuilder};

/// Builds a balanced 14-player roster (11 starters + 3 subs) with uniform,
/// unremarkable skills, good enough to run a full 90 minutes without a side
/// collapsing to fewer than 11 fit outfield players.
pub fn balanced_team(id: u32, name: &str) -> Team {
    use Role::*;
    let roles = [Gk, Lb, Cb, Cb, Rb, Cm, Cm, Wm, Wm, St, St, Gk, Cb, Dm];
    let roster = roles
        .iter()
        .enumerate()
        .map(|(i, role)| Player {
            id: id * 100 + i as u32,
            name: format!("{name}-{i}"),
            primary_role: *role,
            skills: uniform_skills(12.0),
            traits: PlayerTraits::default(),
        })
        .collect();
    Team { id, name: name.to_string(), roster, primary_tactic: None }
}

pub fn uniform_skills(level: f32) -> PlayerSkills {
    let mut skills = PlayerSkills::default();
    skills.physical.pace = level;
    skills.physical.acceleration = level;
    skills.physical.stamina = level;
    skills.physical.natural_fitness = level;
    skills.physical.strength = level;
    skills.physical.balance = level;
    skills.physical.agility = level;
    skills.physical.jumping = level;
    skills.technical.passing = level;
    skills.technical.finishing = level;
    skills.technical.tackling = level;
    skills.technical.ball_control = level;
    skills.technical.dribbling = level;
    skills.technical.crossing = level;
    skills.technical.first_touch = level;
    skills.technical.technique = level;
    skills.technical.heading = level;
    skills.mental.composure = level;
    skills.mental.anticipation = level;
    skills.mental.reactions = level;
    skills.mental.positioning = level;
    skills.mental.decisions = level;
    skills.mental.vision = level;
    skills.mental.work_rate = level;
    skills.mental.aggression = level;
    skills.goalkeeping.reflexes = level;
    skills.goalkeeping.handling = level;
    skills.goalkeeping.one_on_ones = level;
    skills.goalkeeping.command_of_area = level;
    skills.goalkeeping.aerial_reach = level;
    skills.goalkeeping.kicking = level;
    skills
}

pub fn team_with_tactic(id: u32, name: &str, tactic: Tactic) -> Team {
    let mut team = balanced_team(id, name);
    team.primary_tactic = Some(tactic);
    team
}

pub fn baseline_inputs(seed_salt: u32) -> MatchInputs {
    MatchInputsBuilder::new()
        .home(balanced_team(1 + seed_salt, "Home"))
        .away(balanced_team(2 + seed_salt, "Away"))
        .home_formation(FormationTemplate::F442)
        .away_formation(FormationTemplate::F433)
        .build()
        .expect("valid baseline inputs")
}
