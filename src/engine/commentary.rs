use crate::model::event::{Event, EventKind};
use crate::rng::MatchRng;

fn pick<'a>(rng: &mut MatchRng, options: &[&'a str]) -> &'a str {
    let index = (rng.uniform(0.0, options.len() as f32) as usize).min(options.len() - 1);
    options[index]
}

fn opponent_noun(event: &Event) -> &'static str {
    if event.secondary_player_id.is_some() {
        "their marker"
    } else {
        "the defence"
    }
}

/// Renders a single line of commentary for `event` (spec §4.14): a pure
/// function of the event plus the deterministic match RNG, drawn from a
/// closed synonym list per event kind.
pub fn describe(event: &Event, rng: &mut MatchRng) -> String {
    let actor = event.primary_player_name.as_str();
    match event.kind {
        EventKind::Pass => {
            let verb = pick(rng, &["finds", "slides the ball to", "picks out", "threads it to"]);
            format!("{actor} {verb} a teammate.")
        }
        EventKind::Interception => {
            let verb = pick(rng, &["cuts out", "reads and intercepts", "steps in front of"]);
            format!("{actor} {verb} the pass.")
        }
        EventKind::TackleSuccess => {
            let verb = pick(rng, &["wins the ball cleanly from", "dispossesses", "strips the ball off"]);
            format!("{actor} {verb} {}.", opponent_noun(event))
        }
        EventKind::TackleFailed => {
            let verb = pick(rng, &["goes to ground but misses", "lunges in and comes away empty against", "is beaten by"]);
            format!("{actor} {verb} the attacker.")
        }
        EventKind::Clearance => {
            let verb = pick(rng, &["hacks the ball clear", "heads it away", "boots it upfield"]);
            format!("{actor} {verb}.")
        }
        EventKind::Dribbling => {
            let verb = pick(rng, &["drives forward with the ball", "carries it past a challenge", "runs at the defence"]);
            format!("{actor} {verb}.")
        }
        EventKind::Cross => {
            let verb = pick(rng, &["whips in a cross", "floats one into the box", "delivers from the flank"]);
            format!("{actor} {verb}.")
        }
        EventKind::ShotOnTarget => {
            let verb = pick(rng, &["forces a save with a shot", "tests the goalkeeper", "hits it low and on target"]);
            format!("{actor} {verb}.")
        }
        EventKind::ShotOffTarget => {
            let verb = pick(rng, &["drags the shot wide", "blazes it over the bar", "can't keep the effort down"]);
            format!("{actor} {verb}.")
        }
        EventKind::Goal => {
            let verb = pick(rng, &["scores!", "finds the net!", "buries it!"]);
            format!("GOAL! {actor} {verb}")
        }
        EventKind::Save => {
            let verb = pick(rng, &["palms it away", "gets a strong hand to it", "stands tall to deny the shot"]);
            format!("{actor} {verb}.")
        }
        EventKind::Corner => format!("Corner kick for {actor}'s side."),
        EventKind::GoalKick => "Goal kick.".to_string(),
        EventKind::ThrowIn => format!("Throw-in taken by {actor}."),
        EventKind::Foul => {
            let verb = pick(rng, &["catches the opponent late", "goes through the back of", "brings down"]);
            format!("{actor} {verb} the attacker — a foul is given.")
        }
        EventKind::YellowCard => format!("{actor} is shown a yellow card."),
        EventKind::RedCard => format!("{actor} is sent off!"),
        EventKind::Offside => format!("{actor} is caught offside."),
        EventKind::Penalty => format!("Penalty! {actor} was brought down in the box."),
        EventKind::FreeKick => format!("Free kick to {actor}'s side."),
        EventKind::Substitution => format!("{actor} is replaced."),
        EventKind::Kickoff => "The match kicks off.".to_string(),
    }
}
