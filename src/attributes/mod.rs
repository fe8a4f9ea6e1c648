pub mod effective;
mod morale;

pub use effective::{effective_attribute, AttributeContext};
pub use morale::{apply_morale_event, morale_decay, morale_delta, MoraleEvent, NEUTRAL_MORALE};

/// One of the ~60 numeric attributes a player carries, fixed to the 1-20
/// scale internally (spec §9 Open Question: scale). Callers holding 1-100
/// data should convert with [`from_percentile_100`] at the loader boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    Corners,
    Crossing,
    Dribbling,
    Finishing,
    FirstTouch,
    FreeKicks,
    Heading,
    LongShots,
    LongThrows,
    Marking,
    Passing,
    PenaltyTaking,
    Tackling,
    Technique,
    BallControl,

    Aggression,
    Anticipation,
    Bravery,
    Composure,
    Concentration,
    Decisions,
    Determination,
    Flair,
    Leadership,
    OffTheBall,
    Positioning,
    Reactions,
    Teamwork,
    Vision,
    WorkRate,

    Acceleration,
    Agility,
    Balance,
    Jumping,
    NaturalFitness,
    Pace,
    Stamina,
    Strength,

    Reflexes,
    Handling,
    Kicking,
    OneOnOnes,
    CommandOfArea,
    Communication,
    Throwing,
    AerialReach,
    RushingOut,
    Punching,
    Eccentricity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeCategory {
    Technical,
    Mental,
    Physical,
    Goalkeeping,
}

impl AttributeKey {
    pub fn category(self) -> AttributeCategory {
        use AttributeKey::*;
        match self {
            Corners | Crossing | Dribbling | Finishing | FirstTouch | FreeKicks | Heading
            | LongShots | LongThrows | Marking | Passing | PenaltyTaking | Tackling
            | Technique | BallControl => AttributeCategory::Technical,

            Aggression | Anticipation | Bravery | Composure | Concentration | Decisions
            | Determination | Flair | Leadership | OffTheBall | Positioning | Reactions
            | Teamwork | Vision | WorkRate => AttributeCategory::Mental,

            Acceleration | Agility | Balance | Jumping | NaturalFitness | Pace | Stamina
            | Strength => AttributeCategory::Physical,

            Reflexes | Handling | Kicking | OneOnOnes | CommandOfArea | Communication
            | Throwing | AerialReach | RushingOut | Punching | Eccentricity => {
                AttributeCategory::Goalkeeping
            }
        }
    }
}

/// Converts a 1-100 scale value (the alternate representation spec.md
/// mentions) into this crate's internal 1-20 scale.
pub fn from_percentile_100(value: f32) -> f32 {
    (value / 5.0).clamp(1.0, 20.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Technical {
    pub corners: f32,
    pub crossing: f32,
    pub dribbling: f32,
    pub finishing: f32,
    pub first_touch: f32,
    pub free_kicks: f32,
    pub heading: f32,
    pub long_shots: f32,
    pub long_throws: f32,
    pub marking: f32,
    pub passing: f32,
    pub penalty_taking: f32,
    pub tackling: f32,
    pub technique: f32,
    pub ball_control: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mental {
    pub aggression: f32,
    pub anticipation: f32,
    pub bravery: f32,
    pub composure: f32,
    pub concentration: f32,
    pub decisions: f32,
    pub determination: f32,
    pub flair: f32,
    pub leadership: f32,
    pub off_the_ball: f32,
    pub positioning: f32,
    pub reactions: f32,
    pub teamwork: f32,
    pub vision: f32,
    pub work_rate: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Physical {
    pub acceleration: f32,
    pub agility: f32,
    pub balance: f32,
    pub jumping: f32,
    pub natural_fitness: f32,
    pub pace: f32,
    pub stamina: f32,
    pub strength: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Goalkeeping {
    pub reflexes: f32,
    pub handling: f32,
    pub kicking: f32,
    pub one_on_ones: f32,
    pub command_of_area: f32,
    pub communication: f32,
    pub throwing: f32,
    pub aerial_reach: f32,
    pub rushing_out: f32,
    pub punching: f32,
    pub eccentricity: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerSkills {
    pub technical: Technical,
    pub mental: Mental,
    pub physical: Physical,
    pub goalkeeping: Goalkeeping,
}

impl PlayerSkills {
    /// Raw 1-20 value of a single attribute, with no modifiers applied.
    pub fn raw(&self, key: AttributeKey) -> f32 {
        use AttributeKey::*;
        match key {
            Corners => self.technical.corners,
            Crossing => self.technical.crossing,
            Dribbling => self.technical.dribbling,
            Finishing => self.technical.finishing,
            FirstTouch => self.technical.first_touch,
            FreeKicks => self.technical.free_kicks,
            Heading => self.technical.heading,
            LongShots => self.technical.long_shots,
            LongThrows => self.technical.long_throws,
            Marking => self.technical.marking,
            Passing => self.technical.passing,
            PenaltyTaking => self.technical.penalty_taking,
            Tackling => self.technical.tackling,
            Technique => self.technical.technique,
            BallControl => self.technical.ball_control,

            Aggression => self.mental.aggression,
            Anticipation => self.mental.anticipation,
            Bravery => self.mental.bravery,
            Composure => self.mental.composure,
            Concentration => self.mental.concentration,
            Decisions => self.mental.decisions,
            Determination => self.mental.determination,
            Flair => self.mental.flair,
            Leadership => self.mental.leadership,
            OffTheBall => self.mental.off_the_ball,
            Positioning => self.mental.positioning,
            Reactions => self.mental.reactions,
            Teamwork => self.mental.teamwork,
            Vision => self.mental.vision,
            WorkRate => self.mental.work_rate,

            Acceleration => self.physical.acceleration,
            Agility => self.physical.agility,
            Balance => self.physical.balance,
            Jumping => self.physical.jumping,
            NaturalFitness => self.physical.natural_fitness,
            Pace => self.physical.pace,
            Stamina => self.physical.stamina,
            Strength => self.physical.strength,

            Reflexes => self.goalkeeping.reflexes,
            Handling => self.goalkeeping.handling,
            Kicking => self.goalkeeping.kicking,
            OneOnOnes => self.goalkeeping.one_on_ones,
            CommandOfArea => self.goalkeeping.command_of_area,
            Communication => self.goalkeeping.communication,
            Throwing => self.goalkeeping.throwing,
            AerialReach => self.goalkeeping.aerial_reach,
            RushingOut => self.goalkeeping.rushing_out,
            Punching => self.goalkeeping.punching,
            Eccentricity => self.goalkeeping.eccentricity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_partitions_match_spec() {
        assert_eq!(AttributeKey::Finishing.category(), AttributeCategory::Technical);
        assert_eq!(AttributeKey::Composure.category(), AttributeCategory::Mental);
        assert_eq!(AttributeKey::Pace.category(), AttributeCategory::Physical);
        assert_eq!(AttributeKey::Reflexes.category(), AttributeCategory::Goalkeeping);
    }

    #[test]
    fn percentile_conversion_clamps() {
        assert_eq!(from_percentile_100(0.0), 1.0);
        assert_eq!(from_percentile_100(100.0), 20.0);
        assert!((from_percentile_100(50.0) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn raw_reads_back_the_field_it_names() {
        let mut skills = PlayerSkills::default();
        skills.technical.finishing = 15.0;
        skills.goalkeeping.reflexes = 18.0;
        assert_eq!(skills.raw(AttributeKey::Finishing), 15.0);
        assert_eq!(skills.raw(AttributeKey::Reflexes), 18.0);
    }
}
