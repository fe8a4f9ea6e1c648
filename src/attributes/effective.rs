use crate::attributes::{AttributeCategory, AttributeKey, PlayerSkills};
use crate::model::player::Role;
use crate::model::team::{Mentality, Tactic, TeamSide};

/// Everything `effective_attribute` needs beyond the raw skill table: the
/// match-time context a player is currently embedded in (spec §4.3).
pub struct AttributeContext<'a> {
    pub natural_role: Role,
    pub current_slot: Role,
    pub team_side: TeamSide,
    pub morale: f32,
    pub tactic: &'a Tactic,
    pub fatigue: f32,
    pub minute: u8,
}

const MENTAL_MORALE_COEFFICIENT: f32 = 0.04;
const OTHER_MORALE_COEFFICIENT: f32 = 0.02;
const FATIGUE_GATE_MINUTE: u8 = 60;
const FATIGUE_K: f32 = 0.3125; // fatigue=0.8 at minute 80 -> factor ~0.75

fn position_familiarity(natural: Role, slot: Role) -> f32 {
    if natural == slot {
        return 1.00;
    }
    let is_gk_mismatch = (natural == Role::Gk) != (slot == Role::Gk);
    if is_gk_mismatch {
        return 0.50;
    }
    const COMPATIBLE_PAIRS: &[(Role, Role)] = &[
        (Role::St, Role::Cf),
        (Role::Cm, Role::Dm),
        (Role::Cm, Role::Am),
        (Role::Cb, Role::Lb),
        (Role::Cb, Role::Rb),
        (Role::Cb, Role::Wb),
    ];
    let compatible = COMPATIBLE_PAIRS
        .iter()
        .any(|&(a, b)| (a == natural && b == slot) || (a == slot && b == natural));
    if compatible {
        0.92
    } else {
        0.75
    }
}

fn morale_factor(morale: f32, category: AttributeCategory) -> f32 {
    let coefficient = match category {
        AttributeCategory::Mental => MENTAL_MORALE_COEFFICIENT,
        _ => OTHER_MORALE_COEFFICIENT,
    };
    1.0 + (morale - 7.0) * coefficient
}

fn home_advantage_factor(team_side: TeamSide, category: AttributeCategory) -> f32 {
    if team_side == TeamSide::Away {
        return 1.00;
    }
    match category {
        AttributeCategory::Technical | AttributeCategory::Goalkeeping => 1.03,
        AttributeCategory::Mental => 1.05,
        AttributeCategory::Physical => 1.00,
    }
}

fn mentality_factor(mentality: Mentality, key: AttributeKey) -> f32 {
    use AttributeKey::*;
    match (mentality, key) {
        (Mentality::VeryAttacking, Finishing) => 1.10,
        (Mentality::VeryAttacking, LongShots) => 1.05,
        (Mentality::VeryAttacking, Tackling) => 0.92,
        (Mentality::VeryAttacking, Marking) => 0.95,

        (Mentality::Attacking, Finishing) => 1.05,
        (Mentality::Attacking, Tackling) => 0.96,

        (Mentality::Defensive, Tackling) => 1.05,
        (Mentality::Defensive, Marking) => 1.05,
        (Mentality::Defensive, Finishing) => 0.96,

        (Mentality::VeryDefensive, Tackling) => 1.08,
        (Mentality::VeryDefensive, Marking) => 1.08,
        (Mentality::VeryDefensive, Finishing) => 0.90,
        (Mentality::VeryDefensive, LongShots) => 0.95,

        _ => 1.0,
    }
}

fn flags_factor(tactic: &Tactic, key: AttributeKey) -> f32 {
    use AttributeKey::*;
    let mut factor = 1.0;
    let flags = &tactic.flags;
    if flags.tackle_harder && key == Tackling {
        factor *= 1.05;
    }
    if flags.get_stuck_in {
        if key == Marking {
            factor *= 1.03;
        }
        if key == Aggression {
            factor *= 1.05;
        }
    }
    if flags.counter_press && key == Acceleration {
        factor *= 1.03;
    }
    if flags.time_wasting && key == Composure {
        factor *= 1.03;
    }
    if flags.creative_freedom {
        if key == Flair {
            factor *= 1.05;
        }
        if key == Vision {
            factor *= 1.03;
        }
    }
    factor
}

fn tactic_factor(tactic: &Tactic, key: AttributeKey) -> f32 {
    mentality_factor(tactic.mentality, key) * flags_factor(tactic, key)
}

fn fatigue_factor(fatigue: f32, minute: u8, natural_fitness: f32) -> f32 {
    if minute < FATIGUE_GATE_MINUTE {
        return 1.0;
    }
    let fitness_relief = (natural_fitness / 20.0).clamp(0.0, 1.0) * 0.3;
    let k = FATIGUE_K * (1.0 - fitness_relief);
    (1.0 - fatigue * k).max(0.0)
}

/// Multiplicative attribute pipeline (spec §4.3): base attribute modified by
/// position familiarity, morale, home advantage, tactic and fatigue, then
/// clamped to [0.1, +inf).
pub fn effective_attribute(skills: &PlayerSkills, key: AttributeKey, ctx: &AttributeContext) -> f32 {
    let base = skills.raw(key);
    let category = key.category();

    let value = base
        * position_familiarity(ctx.natural_role, ctx.current_slot)
        * morale_factor(ctx.morale, category)
        * home_advantage_factor(ctx.team_side, category)
        * tactic_factor(ctx.tactic, key)
        * fatigue_factor(ctx.fatigue, ctx.minute, skills.physical.natural_fitness);

    value.max(0.1)
}
