use serde::Serialize;

/// Per-team running statistics (spec §3 "Statistics"). All counters are
/// monotonically non-decreasing across a match.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatBlock {
    pub possession_pct: u8,
    pub passes: u32,
    pub shots: u32,
    pub shots_on_target: u32,
    pub tackles: u32,
    pub fouls: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub corners: u32,
    pub offsides: u32,
    pub saves: u32,
    pub clearances: u32,
    pub interceptions: u32,
}

impl StatBlock {
    /// Allocates a possession percentage pair that sums to exactly 100,
    /// rounding remainder to home (spec §3 "Statistics").
    pub fn allocate_possession(home_ticks: u64, away_ticks: u64) -> (u8, u8) {
        let total = home_ticks + away_ticks;
        if total == 0 {
            return (50, 50);
        }
        let home_pct = ((home_ticks as f64 / total as f64) * 100.0).floor() as u8;
        let away_pct = 100 - home_pct;
        (home_pct, away_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn possession_allocation_sums_to_one_hundred() {
        let (home, away) = StatBlock::allocate_possession(37, 63);
        assert_eq!(home + away, 100);
        assert_eq!(home, 37);
    }

    #[test]
    fn possession_allocation_handles_no_ticks() {
        let (home, away) = StatBlock::allocate_possession(0, 0);
        assert_eq!(home + away, 100);
        assert_eq!(home, 50);
    }

    #[test]
    fn remainder_is_allocated_to_home() {
        let (home, away) = StatBlock::allocate_possession(1, 2);
        assert_eq!(home + away, 100);
        assert_eq!(home, 33);
        assert_eq!(away, 67);
    }
}
