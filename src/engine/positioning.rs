use log::warn;
use nalgebra::Vector2;

use crate::model::player::{Player, PlayerMatchState, Role};
use crate::model::team::TeamSide;

/// Hard pitch-relative bounds a role's target must never exceed (spec
/// §4.6: "each role has zone bounds...enforced as hard clamps regardless
/// of intent").
#[derive(Debug, Clone, Copy)]
pub struct ZoneBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl ZoneBounds {
    fn clamp(&self, point: Vector2<f32>) -> Vector2<f32> {
        Vector2::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y.clamp(self.min_y, self.max_y),
        )
    }
}

fn role_zone_bounds(role: Role, is_home: bool) -> ZoneBounds {
    let (min_x, max_x) = if is_home {
        match role {
            Role::Gk => (0.0, 16.5),
            Role::Cb | Role::Lb | Role::Rb | Role::Wb => (0.0, 45.0),
            Role::Dm | Role::Cm | Role::Am | Role::Wm => (10.0, 75.0),
            Role::St | Role::Cf => (40.0, 100.0),
        }
    } else {
        match role {
            Role::Gk => (83.5, 100.0),
            Role::Cb | Role::Lb | Role::Rb | Role::Wb => (55.0, 100.0),
            Role::Dm | Role::Cm | Role::Am | Role::Wm => (25.0, 90.0),
            Role::St | Role::Cf => (0.0, 60.0),
        }
    };
    ZoneBounds { min_x, max_x, min_y: 0.0, max_y: 100.0 }
}

/// Whether possession belongs to `side`.
fn team_has_possession(side: TeamSide, possession_team: Option<TeamSide>) -> bool {
    possession_team == Some(side)
}

/// attacking direction sign: +1 for home (attacks toward x=100), -1 for away.
fn attack_sign(is_home: bool) -> f32 {
    if is_home {
        1.0
    } else {
        -1.0
    }
}

/// Computes a tactical target point for one off-ball player (spec §4.6).
/// `home_anchor_y` is the player's formation anchor y, used to keep
/// left/right half assignment stable across the match.
pub fn tactical_target(
    player: &Player,
    state: &PlayerMatchState,
    side: TeamSide,
    is_home: bool,
    ball: Vector2<f32>,
    possession_team: Option<TeamSide>,
    anchor: Vector2<f32>,
) -> Vector2<f32> {
    let bounds = role_zone_bounds(state.role, is_home);
    let team_attacking = team_has_possession(side, possession_team);

    let raw_target = match state.role {
        Role::Gk => {
            let penalty_spot_x = if is_home { 11.0 } else { 89.0 };
            let penalty_spot = Vector2::new(penalty_spot_x, 50.0);
            let midpoint = (penalty_spot + ball) * 0.5;
            Vector2::new(midpoint.x, midpoint.y.clamp(25.0, 75.0))
        }
        Role::Cb => {
            let push_up_x = if team_attacking {
                anchor.x + attack_sign(is_home) * 8.0
            } else {
                anchor.x - attack_sign(is_home) * 8.0
            };
            Vector2::new(push_up_x, anchor.y)
        }
        Role::Lb | Role::Rb | Role::Wb => {
            let ball_in_attacking_third = if is_home { ball.x > 66.6 } else { ball.x < 33.3 };
            let overlap_x = if team_attacking && ball_in_attacking_third {
                anchor.x + attack_sign(is_home) * 15.0
            } else {
                anchor.x
            };
            Vector2::new(overlap_x, anchor.y)
        }
        Role::Dm | Role::Cm | Role::Am => {
            const DAMPENING: f32 = 0.7;
            let followed_x = anchor.x + (ball.x - anchor.x) * DAMPENING;
            let capped_x = if state.role == Role::Dm {
                if is_home {
                    followed_x.min(50.0)
                } else {
                    followed_x.max(50.0)
                }
            } else {
                followed_x
            };
            Vector2::new(capped_x, anchor.y)
        }
        Role::Wm => {
            const DAMPENING: f32 = 0.7;
            let followed_x = anchor.x + (ball.x - anchor.x) * DAMPENING;
            if player.traits.inverted_winger {
                let cut_in_y = anchor.y + (50.0 - anchor.y) * 0.4;
                Vector2::new(followed_x, cut_in_y)
            } else {
                Vector2::new(followed_x, anchor.y)
            }
        }
        Role::St | Role::Cf => {
            let lead_x = if team_attacking {
                anchor.x + attack_sign(is_home) * 5.0
            } else {
                anchor.x
            };
            if player.traits.false_nine {
                Vector2::new(lead_x - attack_sign(is_home) * 20.0, anchor.y)
            } else {
                Vector2::new(lead_x, anchor.y)
            }
        }
    };

    let clamped = bounds.clamp(raw_target);
    if (clamped - raw_target).norm() > f32::EPSILON {
        warn!(
            "tactical_target: player {} target clamped from {:?} to {:?}",
            player.id, raw_target, clamped
        );
    }
    clamped
}
