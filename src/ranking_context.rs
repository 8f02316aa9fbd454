/// Every tunable of the rating and statistics pipeline.
///
/// Defaults reproduce the league's published rules. The K-factor is one fixed
/// value for every match; it is not scaled by rating tier or match count.
#[derive(Debug, Clone)]
pub struct RankingContext {
    pub starting_elo: f64,
    pub elo_k: f64,
    pub elo_delta: f64,

    pub trend_window: usize,
    pub pct_trend_threshold: f64, // Fraction, 0.02 is two percentage points
    pub elo_trend_threshold: f64, // Raw rating points

    pub insight_count: usize,
    pub min_streak_insight: u32,
    pub rising_window: usize,
    pub rising_min_gain: f64,
    pub min_rivalry_matches: u32,
    pub min_perfect_record: u32,
    pub min_upset_gap: f64,
    pub min_improvement: f64,
}

impl Default for RankingContext {
    fn default() -> Self {
        Self {
            starting_elo: 1000.0,
            elo_k: 32.0,
            elo_delta: 400.0,

            trend_window: 3,
            pct_trend_threshold: 0.02,
            elo_trend_threshold: 5.0,

            insight_count: 2,
            min_streak_insight: 2,
            rising_window: 3,
            rising_min_gain: 10.0,
            min_rivalry_matches: 2,
            min_perfect_record: 3,
            min_upset_gap: 30.0,
            min_improvement: 20.0,
        }
    }
}

impl RankingContext {
    pub fn with_trend_window(mut self, window: usize) -> Self {
        self.trend_window = window;
        self
    }
}
