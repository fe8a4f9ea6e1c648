mod common;

use football_match_engine::attributes::{apply_morale_event, effective_attribute, AttributeContext, MoraleEvent};
use football_match_engine::model::player::Role;
use football_match_engine::model::team::{Mentality, TacticFlags, TeamSide};
use football_match_engine::model::{FormationTemplate, Tactic};
use football_match_engine::{simulate, simulate_with_resolution, MatchInputsBuilder, TickResolution};

/// Scenario 1 (spec §8): two balanced 11-player teams, seed=1.
#[test]
fn baseline_ninety_minute_match_stays_within_expected_bounds() {
    let inputs = common::baseline_inputs(0);
    let ticks: Vec<_> = simulate(&inputs, 1).expect("valid inputs").collect();

    let final_tick = ticks.last().expect("at least one tick");
    let total_passes = final_tick.stats.home.passes + final_tick.stats.away.passes;
    let total_shots = final_tick.stats.home.shots + final_tick.stats.away.shots;
    let total_tackles = final_tick.stats.home.tackles + final_tick.stats.away.tackles;
    let total_offsides = final_tick.stats.home.offsides + final_tick.stats.away.offsides;

    assert!((400..=1500).contains(&total_passes), "total_passes={total_passes}");
    assert!((10..=45).contains(&total_shots), "total_shots={total_shots}");
    assert!(total_tackles >= 10, "total_tackles={total_tackles}");
    assert!(total_offsides <= 12, "total_offsides={total_offsides}");

    let ticks_with_events = ticks.iter().filter(|t| !t.events.is_empty()).count();
    let ratio = ticks_with_events as f64 / ticks.len() as f64;
    assert!(ratio >= 0.70, "only {ratio:.2} of ticks carried an event");
}

/// Scenario 1 continuation: average possession run length, measured at
/// per-second resolution since a per-minute Tick is far coarser than a
/// single possession spell.
#[test]
fn baseline_possession_runs_average_between_two_and_fifteen_seconds() {
    let inputs = common::baseline_inputs(0);
    let ticks: Vec<_> = simulate_with_resolution(&inputs, 1, TickResolution::PerSecond)
        .expect("valid inputs")
        .collect();

    let mut run_lengths = Vec::new();
    let mut current_owner = None;
    let mut current_len = 0u32;
    for tick in &ticks {
        if tick.possession == current_owner {
            current_len += 1;
        } else {
            if current_owner.is_some() && current_len > 0 {
                run_lengths.push(current_len);
            }
            current_owner = tick.possession;
            current_len = 1;
        }
    }
    if current_owner.is_some() && current_len > 0 {
        run_lengths.push(current_len);
    }

    assert!(!run_lengths.is_empty(), "no possession runs recorded");
    let average = run_lengths.iter().sum::<u32>() as f64 / run_lengths.len() as f64;
    assert!((2.0..=15.0).contains(&average), "average possession run {average:.1}s out of bounds");
}

/// Scenario 2 (spec §8): attacking vs. defensive tactics, seed=2, averaged
/// over 3 independent runs (a fixed seed with fixed inputs is deterministic,
/// so "3 runs" is read as 3 distinct seeds in the same neighbourhood).
#[test]
fn attacking_tactic_outproduces_defensive_tactic_on_average() {
    let attacking = Tactic {
        mentality: Mentality::VeryAttacking,
        flags: TacticFlags { tackle_harder: true, counter_press: true, ..TacticFlags::default() },
        ..Tactic::default()
    };
    let defensive = Tactic {
        mentality: Mentality::VeryDefensive,
        flags: TacticFlags { time_wasting: true, ..TacticFlags::default() },
        ..Tactic::default()
    };

    let mut shots_a = 0u64;
    let mut shots_b = 0u64;
    let mut fouls_a = 0u64;
    let mut fouls_b = 0u64;
    let mut possession_a = 0u64;
    let mut possession_b = 0u64;

    for seed in [2u64, 3, 4] {
        let home = common::team_with_tactic(1, "Attacking", attacking);
        let away = common::team_with_tactic(2, "Defensive", defensive);
        let inputs = MatchInputsBuilder::new()
            .home(home)
            .away(away)
            .home_formation(FormationTemplate::F433)
            .away_formation(FormationTemplate::F442)
            .build()
            .expect("valid inputs");

        let final_tick = simulate(&inputs, seed)
            .expect("valid inputs")
            .last()
            .expect("at least one tick");

        shots_a += final_tick.stats.home.shots as u64;
        shots_b += final_tick.stats.away.shots as u64;
        fouls_a += final_tick.stats.home.fouls as u64;
        fouls_b += final_tick.stats.away.fouls as u64;
        possession_a += final_tick.stats.home.possession_pct as u64;
        possession_b += final_tick.stats.away.possession_pct as u64;
    }

    assert!(shots_a > shots_b, "attacking side shots {shots_a} did not exceed defensive side {shots_b}");
    assert!(
        fouls_a as f64 >= 0.8 * fouls_b as f64,
        "attacking side fouls {fouls_a} fell too far below defensive side {fouls_b}"
    );
    assert!(
        possession_a > possession_b,
        "attacking side possession {possession_a} did not exceed defensive side {possession_b}"
    );
}

/// Scenario 3 (spec §8): a player whose natural role is CB placed at ST has
/// a strictly lower effective finishing than the same player at CB.
#[test]
fn position_familiarity_penalises_a_misplaced_centre_back() {
    let mut skills = common::uniform_skills(14.0);
    skills.technical.finishing = 15.0;
    let tactic = Tactic::default();

    let at_cb = AttributeContext {
        natural_role: Role::Cb,
        current_slot: Role::Cb,
        team_side: TeamSide::Away,
        morale: 7.0,
        tactic: &tactic,
        fatigue: 0.0,
        minute: 10,
    };
    let at_st = AttributeContext { current_slot: Role::St, ..at_cb };

    let cb_value = effective_attribute(&skills, football_match_engine::attributes::AttributeKey::Finishing, &at_cb);
    let st_value = effective_attribute(&skills, football_match_engine::attributes::AttributeKey::Finishing, &at_st);
    assert!(st_value < cb_value, "misplaced finishing {st_value} was not below natural-role finishing {cb_value}");
}

/// Scenario 4 (spec §8): a GK placed at ST loses at least 30% of their
/// reflexes relative to playing in goal.
#[test]
fn goalkeeper_misplaced_at_striker_loses_at_least_thirty_percent_reflexes() {
    let mut skills = common::uniform_skills(14.0);
    skills.goalkeeping.reflexes = 18.0;
    let tactic = Tactic::default();

    let at_gk = AttributeContext {
        natural_role: Role::Gk,
        current_slot: Role::Gk,
        team_side: TeamSide::Home,
        morale: 7.0,
        tactic: &tactic,
        fatigue: 0.0,
        minute: 10,
    };
    let at_st = AttributeContext { current_slot: Role::St, ..at_gk };

    let gk_value = effective_attribute(&skills, football_match_engine::attributes::AttributeKey::Reflexes, &at_gk);
    let st_value = effective_attribute(&skills, football_match_engine::attributes::AttributeKey::Reflexes, &at_st);
    assert!(st_value <= gk_value * 0.70, "reflexes only dropped to {st_value} from {gk_value}");
}

/// Scenario 5 (spec §8): after a goal-scored morale event, effective passing
/// at the same minute is strictly greater than before.
#[test]
fn morale_boost_from_a_goal_increases_effective_passing() {
    let mut skills = common::uniform_skills(14.0);
    skills.technical.passing = 13.0;
    let tactic = Tactic::default();

    let mut morale = football_match_engine::attributes::NEUTRAL_MORALE;
    let ctx_before = AttributeContext {
        natural_role: Role::Cm,
        current_slot: Role::Cm,
        team_side: TeamSide::Home,
        morale,
        tactic: &tactic,
        fatigue: 0.0,
        minute: 20,
    };
    let before = effective_attribute(&skills, football_match_engine::attributes::AttributeKey::Passing, &ctx_before);

    morale = apply_morale_event(morale, MoraleEvent::GoalScored);
    let ctx_after = AttributeContext { morale, ..ctx_before };
    let after = effective_attribute(&skills, football_match_engine::attributes::AttributeKey::Passing, &ctx_after);

    assert!(after > before, "morale boost did not raise effective passing: {before} -> {after}");
}

/// Scenario 6 (spec §8): simulating with both teams' tactic left as `None`
/// completes successfully and produces a sane score.
#[test]
fn null_tactic_on_both_sides_completes_safely() {
    let home = common::balanced_team(1, "Home");
    let away = common::balanced_team(2, "Away");
    assert!(home.primary_tactic.is_none());
    assert!(away.primary_tactic.is_none());

    let inputs = MatchInputsBuilder::new()
        .home(home)
        .away(away)
        .home_formation(FormationTemplate::F442)
        .away_formation(FormationTemplate::F442)
        .build()
        .expect("valid inputs");

    let ticks: Vec<_> = simulate(&inputs, 99).expect("valid inputs").collect();
    let final_tick = ticks.last().expect("at least one tick");

    for tick in &ticks {
        assert!((0.0..=100.0).contains(&tick.ball.x));
        assert!((0.0..=100.0).contains(&tick.ball.y));
    }
    let _score: (u32, u32) = (final_tick.score.home, final_tick.score.away);
}
