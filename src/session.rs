//! Session configuration and the pure display projections.

/// Timing knobs for a single play-through. Defaults mirror the classic
/// tuning: a 30-second round, a spawn every 800ms, bubbles that drift away
/// after 5 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub session_secs: u32,
    pub countdown_interval_ms: u64,
    pub spawn_interval_ms: u64,
    pub initial_spawns: u32,
    pub initial_spawn_stagger_ms: u64,
    pub bubble_lifetime_ms: u64,
    pub pop_window_ms: u64,
    pub popup_lifetime_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_secs: 30,
            countdown_interval_ms: 1000,
            spawn_interval_ms: 800,
            initial_spawns: 3,
            initial_spawn_stagger_ms: 200,
            bubble_lifetime_ms: 5000,
            pop_window_ms: 300,
            popup_lifetime_ms: 1000,
        }
    }
}

/// Projection of session state onto the numeric displays. Scores are
/// floored here and nowhere else rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u64,
    pub seconds_left: u32,
    pub best: u64,
}

/// End-of-round summary shown on the message panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub final_score: u64,
    pub best: u64,
}
