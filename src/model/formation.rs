use crate::model::player::Role;
use nalgebra::Vector2;

/// Named formation template mapping the 11 lineup slots to (role, anchor
/// point) on a 100x100 pitch, home side convention (spec §3: left = home
/// goal, x=0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormationTemplate {
    F442,
    F433,
    F352,
    F4231,
    F343,
}

impl FormationTemplate {
    pub fn display_name(self) -> &'static str {
        match self {
            FormationTemplate::F442 => "4-4-2",
            FormationTemplate::F433 => "4-3-3",
            FormationTemplate::F352 => "3-5-2",
            FormationTemplate::F4231 => "4-2-3-1",
            FormationTemplate::F343 => "3-4-3",
        }
    }

    /// The 11 (role, home-side anchor) slots, in a fixed deterministic order
    /// (goalkeeper first, then defenders, midfielders, forwards).
    pub fn slots(self) -> &'static [(Role, (f32, f32))] {
        use Role::*;
        match self {
            FormationTemplate::F442 => &[
                (Gk, (5.0, 50.0)),
                (Lb, (22.0, 15.0)),
                (Cb, (18.0, 38.0)),
                (Cb, (18.0, 62.0)),
                (Rb, (22.0, 85.0)),
                (Wm, (48.0, 15.0)),
                (Cm, (45.0, 38.0)),
                (Cm, (45.0, 62.0)),
                (Wm, (48.0, 85.0)),
                (St, (75.0, 38.0)),
                (St, (75.0, 62.0)),
            ],
            FormationTemplate::F433 => &[
                (Gk, (5.0, 50.0)),
                (Lb, (22.0, 15.0)),
                (Cb, (18.0, 38.0)),
                (Cb, (18.0, 62.0)),
                (Rb, (22.0, 85.0)),
                (Dm, (38.0, 50.0)),
                (Cm, (50.0, 33.0)),
                (Cm, (50.0, 67.0)),
                (Wm, (78.0, 15.0)),
                (St, (82.0, 50.0)),
                (Wm, (78.0, 85.0)),
            ],
            FormationTemplate::F352 => &[
                (Gk, (5.0, 50.0)),
                (Cb, (18.0, 30.0)),
                (Cb, (16.0, 50.0)),
                (Cb, (18.0, 70.0)),
                (Wb, (40.0, 10.0)),
                (Cm, (48.0, 35.0)),
                (Dm, (42.0, 50.0)),
                (Cm, (48.0, 65.0)),
                (Wb, (40.0, 90.0)),
                (St, (78.0, 38.0)),
                (St, (78.0, 62.0)),
            ],
            FormationTemplate::F4231 => &[
                (Gk, (5.0, 50.0)),
                (Lb, (22.0, 15.0)),
                (Cb, (18.0, 38.0)),
                (Cb, (18.0, 62.0)),
                (Rb, (22.0, 85.0)),
                (Dm, (38.0, 38.0)),
                (Dm, (38.0, 62.0)),
                (Wm, (62.0, 15.0)),
                (Am, (65.0, 50.0)),
                (Wm, (62.0, 85.0)),
                (St, (85.0, 50.0)),
            ],
            FormationTemplate::F343 => &[
                (Gk, (5.0, 50.0)),
                (Cb, (18.0, 30.0)),
                (Cb, (16.0, 50.0)),
                (Cb, (18.0, 70.0)),
                (Wb, (42.0, 10.0)),
                (Cm, (48.0, 38.0)),
                (Cm, (48.0, 62.0)),
                (Wb, (42.0, 90.0)),
                (Wm, (78.0, 15.0)),
                (St, (82.0, 50.0)),
                (Wm, (78.0, 85.0)),
            ],
        }
    }

    /// Anchor point for `slot_index`, mirrored onto the away side when
    /// `is_home` is false (away goal is at x=100).
    pub fn anchor(self, slot_index: usize, is_home: bool) -> Vector2<f32> {
        let (_, (x, y)) = self.slots()[slot_index];
        if is_home {
            Vector2::new(x, y)
        } else {
            Vector2::new(100.0 - x, y)
        }
    }
}
