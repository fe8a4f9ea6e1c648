mod common;

use std::collections::HashSet;

use football_match_engine::model::event::AnimationAction;
use football_match_engine::simulate;

fn all_player_ids(team: &football_match_engine::model::Team) -> HashSet<u32> {
    team.roster.iter().map(|p| p.id).collect()
}

#[test]
fn ball_position_stays_within_pitch_bounds_every_tick() {
    let inputs = common::baseline_inputs(10);
    let ticks: Vec<_> = simulate(&inputs, 3).expect("valid inputs").collect();
    assert!(!ticks.is_empty());
    for tick in &ticks {
        assert!((0.0..=100.0).contains(&tick.ball.x), "ball.x out of bounds: {}", tick.ball.x);
        assert!((0.0..=100.0).contains(&tick.ball.y), "ball.y out of bounds: {}", tick.ball.y);
    }
}

#[test]
fn possession_percentages_always_sum_to_one_hundred() {
    let inputs = common::baseline_inputs(20);
    let ticks: Vec<_> = simulate(&inputs, 4).expect("valid inputs").collect();
    for tick in &ticks {
        let sum = tick.stats.home.possession_pct as u32 + tick.stats.away.possession_pct as u32;
        assert_eq!(sum, 100, "possession percentages did not sum to 100 at minute {}", tick.minute);
    }
}

#[test]
fn player_fatigue_is_monotonically_non_decreasing() {
    let inputs = common::baseline_inputs(30);
    let ticks: Vec<_> = simulate(&inputs, 5).expect("valid inputs").collect();

    let mut last: std::collections::HashMap<u32, f32> = std::collections::HashMap::new();
    for tick in &ticks {
        for (&player_id, &fatigue) in &tick.player_fatigue {
            if let Some(&previous) = last.get(&player_id) {
                assert!(
                    fatigue + 1e-6 >= previous,
                    "fatigue decreased for player {player_id}: {previous} -> {fatigue}"
                );
            }
            last.insert(player_id, fatigue);
        }
    }
}

#[test]
fn squad_size_stays_fixed_at_twenty_two_tracked_players() {
    // Sent-off players stop acting (see step_one_second's `continue` on
    // `sent_off`) but remain tracked with frozen fatigue, so the fatigue map
    // is the fixed 22-player roster for the whole match, reds included.
    let inputs = common::baseline_inputs(40);
    let ticks: Vec<_> = simulate(&inputs, 6).expect("valid inputs").collect();
    for tick in &ticks {
        assert_eq!(tick.player_fatigue.len(), 22, "minute {}: expected 22 tracked players", tick.minute);
    }
}

#[test]
fn pass_animation_steps_reference_a_valid_teammate() {
    let inputs = common::baseline_inputs(50);
    let home_ids = all_player_ids(&inputs.home);
    let away_ids = all_player_ids(&inputs.away);

    let ticks: Vec<_> = simulate(&inputs, 7).expect("valid inputs").collect();
    let mut saw_a_pass = false;

    for tick in &ticks {
        for event in &tick.events {
            // Interception events reuse the Pass animation action but point
            // `target_id` at the opposing interceptor, so only completed
            // Pass events carry the "target is a teammate" guarantee.
            if event.kind != football_match_engine::model::EventKind::Pass {
                continue;
            }
            for step in &event.sequence {
                if step.action == AnimationAction::Pass {
                    if let Some(target_id) = step.target_id {
                        saw_a_pass = true;
                        let valid_pool = if home_ids.contains(&step.actor_id) { &home_ids } else { &away_ids };
                        assert!(
                            valid_pool.contains(&target_id),
                            "pass target {target_id} is not a teammate of actor {}",
                            step.actor_id
                        );
                    }
                }
            }
        }
    }
    assert!(saw_a_pass, "expected at least one completed pass across a full match");
}

#[test]
fn penalty_shot_originates_from_the_correct_penalty_spot() {
    let inputs = common::baseline_inputs(60);
    let ticks: Vec<_> = simulate(&inputs, 11).expect("valid inputs").collect();

    for tick in &ticks {
        for event in &tick.events {
            if event.kind == football_match_engine::model::EventKind::Penalty {
                for step in &event.sequence {
                    if step.action == AnimationAction::Shoot {
                        let x = step.ball_start.x;
                        let in_home_box = (85.0..=91.0).contains(&x);
                        let in_away_box = (9.0..=15.0).contains(&x);
                        assert!(in_home_box || in_away_box, "penalty shot started at x={x}, outside both boxes");
                    }
                }
            }
        }
    }
}
