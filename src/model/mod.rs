pub mod ball;
pub mod clock;
pub mod event;
pub mod formation;
pub mod player;
pub mod possession;
pub mod stats;
pub mod team;
pub mod tick;

pub use ball::{BallState, BallStatus};
pub use clock::MatchClock;
pub use event::{AnimationStep, BallHeight, Coordinates, Event, EventKind};
pub use formation::FormationTemplate;
pub use player::{Player, PlayerMatchState, Role};
pub use possession::PossessionState;
pub use stats::StatBlock;
pub use team::{Tactic, Team, TeamSide};
pub use tick::{MatchPhase, Score, Tick, Zone};
