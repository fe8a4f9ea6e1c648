use nalgebra::Vector2;

/// Ball speed decays multiplicatively every 0.1s of simulated flight; below
/// this speed the ball is considered stopped (spec §4.2).
pub const STOP_SPEED: f32 = 0.1;

/// Sample spacing used by the interception solver, in seconds.
pub const SAMPLE_DT: f32 = 0.1;

/// How far ahead the interception solver looks.
pub const INTERCEPT_HORIZON_SECS: f32 = 3.0;

/// Fixed reaction delay applied before a player can start closing on a ball.
pub const REACTION_DELAY_SECS: f32 = 0.3;

pub fn distance(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (a - b).norm()
}

/// Shortest distance from `point` to the segment `a..b`.
pub fn point_to_segment_distance(point: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    let segment = b - a;
    let len_sq = segment.dot(&segment);

    if len_sq <= f32::EPSILON {
        return distance(point, a);
    }

    let t = ((point - a).dot(&segment) / len_sq).clamp(0.0, 1.0);
    let projection = a + segment * t;
    distance(point, projection)
}

/// One sample of a predicted ball trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub time: f32,
    pub position: Vector2<f32>,
}

/// Predicts ball positions under a constant multiplicative friction factor
/// applied every `SAMPLE_DT` seconds, up to `INTERCEPT_HORIZON_SECS`. Stops
/// sampling once speed drops below `STOP_SPEED`.
pub fn predict_trajectory(
    start: Vector2<f32>,
    velocity: Vector2<f32>,
    friction_per_sample: f32,
) -> Vec<TrajectorySample> {
    let mut samples = Vec::new();
    let mut position = start;
    let mut current_velocity = velocity;
    let mut elapsed = 0.0f32;

    samples.push(TrajectorySample { time: 0.0, position });

    while elapsed < INTERCEPT_HORIZON_SECS {
        if current_velocity.norm() < STOP_SPEED {
            break;
        }

        position += current_velocity * SAMPLE_DT;
        current_velocity *= friction_per_sample;
        elapsed += SAMPLE_DT;

        samples.push(TrajectorySample {
            time: elapsed,
            position,
        });
    }

    samples
}

/// Finds the earliest trajectory sample a player starting at `player_position`
/// with top speed `max_speed` (m/s) can reach, honouring a fixed reaction
/// delay. Returns `None` if no sample is reachable within tolerance.
pub fn solve_interception(
    trajectory: &[TrajectorySample],
    player_position: Vector2<f32>,
    max_speed: f32,
    tolerance_secs: f32,
) -> Option<TrajectorySample> {
    if max_speed <= 0.0 {
        return None;
    }

    trajectory.iter().copied().find(|sample| {
        let travel_distance = distance(player_position, sample.position);
        let player_time_to_reach = REACTION_DELAY_SECS + travel_distance / max_speed;
        player_time_to_reach <= sample.time + tolerance_secs
    })
}
