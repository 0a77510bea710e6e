//! The game session controller.
//!
//! One [`GameSession`] owns everything a round touches: score, countdown,
//! the live-bubble collection, transient score popups, the timer queue and
//! the best score. All mutation flows through either a pointer interaction
//! or [`GameSession::advance`], which drains due timers in deadline order.

use crate::bubble::{Bubble, PlayArea, ScorePopup, SpawnProfile};
use crate::highscore::BestScoreStore;
use crate::scoring;
use crate::session::{Hud, SessionConfig, SessionSummary};
use crate::timer::{TimerKind, TimerQueue};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    score: f64,
    time_remaining: u32,
    active: bool,
    clock_ms: u64,
    bubbles: Vec<Bubble>,
    popups: Vec<ScorePopup>,
    // Ids are never reused, across rounds included, so a stale expiry from a
    // previous round can never match a successor round's bubble.
    next_bubble_id: u64,
    next_popup_id: u64,
    timers: TimerQueue,
    play_area: PlayArea,
    profile_override: Option<SpawnProfile>,
    rng: StdRng,
    store: Box<dyn BestScoreStore>,
    best_score: f64,
    summary: Option<SessionSummary>,
}

impl GameSession {
    pub fn new(config: SessionConfig, store: Box<dyn BestScoreStore>) -> Self {
        Self::build(config, store, StdRng::from_entropy())
    }

    /// Deterministic variant for tests and practice runs.
    pub fn with_seed(config: SessionConfig, store: Box<dyn BestScoreStore>, seed: u64) -> Self {
        Self::build(config, store, StdRng::seed_from_u64(seed))
    }

    fn build(config: SessionConfig, store: Box<dyn BestScoreStore>, rng: StdRng) -> Self {
        let best_score = store.load() as f64;
        Self {
            config,
            score: 0.0,
            time_remaining: config.session_secs,
            active: false,
            clock_ms: 0,
            bubbles: Vec::new(),
            popups: Vec::new(),
            next_bubble_id: 0,
            next_popup_id: 0,
            timers: TimerQueue::new(),
            play_area: PlayArea {
                width: 800.0,
                height: 400.0,
            },
            profile_override: None,
            rng,
            store,
            best_score,
            summary: None,
        }
    }

    /// Begin a round. Silently ignored while one is already running.
    pub fn start(&mut self) {
        if self.active {
            return;
        }

        self.score = 0.0;
        self.time_remaining = self.config.session_secs;
        self.bubbles.clear();
        self.popups.clear();
        self.summary = None;
        self.active = true;

        self.timers.schedule_periodic(
            self.clock_ms + self.config.countdown_interval_ms,
            self.config.countdown_interval_ms,
            TimerKind::Countdown,
        );
        self.timers.schedule_periodic(
            self.clock_ms + self.config.spawn_interval_ms,
            self.config.spawn_interval_ms,
            TimerKind::Spawner,
        );
        // Staggered initial spawns so the board is not empty at start
        for i in 0..u64::from(self.config.initial_spawns) {
            self.timers.schedule(
                self.clock_ms + i * self.config.initial_spawn_stagger_ms,
                TimerKind::Spawner,
            );
        }
    }

    /// Advance the session clock and dispatch every timer that came due.
    /// Entries fire one at a time so a countdown that ends the round
    /// suppresses anything it cancelled, even within the same advance.
    pub fn advance(&mut self, dt_ms: u64) {
        self.clock_ms += dt_ms;
        while let Some(kind) = self.timers.pop_due(self.clock_ms) {
            self.fire(kind);
        }
    }

    /// Route a pointer press in play-area coordinates. A press inside a live
    /// bubble pops it; inside a popping bubble it is spent; anywhere else it
    /// is a miss.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if !self.active {
            return;
        }
        // Scan from the end: the most recently spawned bubble renders on top
        match self.bubbles.iter().rposition(|b| b.contains(x, y)) {
            Some(idx) if !self.bubbles[idx].popped => self.pop_at(idx),
            Some(_) => {}
            None => self.miss(),
        }
    }

    /// Finish the round. Idempotent via the active flag.
    pub fn end(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.timers.cancel(TimerKind::Countdown);
        self.timers.cancel(TimerKind::Spawner);
        // Remaining bubbles vanish without animation or score; their expiry
        // and pop-completion one-shots lapse against the existence checks.
        self.bubbles.clear();
        self.refresh_best();
        self.summary = Some(SessionSummary {
            final_score: scoring::display_score(self.score),
            best: scoring::display_score(self.best_score),
        });
    }

    /// End (if needed) and restore the idle displays, without starting
    /// new timers.
    pub fn reset(&mut self) {
        self.end();
        self.score = 0.0;
        self.time_remaining = self.config.session_secs;
        self.summary = None;
    }

    /// Viewport query result from the front-end; used at spawn time.
    pub fn set_play_area(&mut self, area: PlayArea) {
        self.play_area = area;
    }

    /// Pin the spawn profile instead of deriving it from viewport width.
    pub fn set_profile_override(&mut self, profile: Option<SpawnProfile>) {
        self.profile_override = profile;
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: scoring::display_score(self.score),
            seconds_left: self.time_remaining,
            best: scoring::display_score(self.best_score),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.summary
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn popups(&self) -> &[ScorePopup] {
        &self.popups
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Countdown => self.countdown_tick(),
            TimerKind::Spawner => self.spawn_bubble(),
            TimerKind::BubbleExpiry(id) | TimerKind::PopComplete(id) => {
                // Existence check, not an active check: the bubble may
                // already be gone, and the round it belonged to may be over.
                if let Some(idx) = self.bubbles.iter().position(|b| b.id == id) {
                    self.bubbles.swap_remove(idx);
                }
            }
            TimerKind::PopupFade(id) => {
                self.popups.retain(|p| p.id != id);
            }
        }
    }

    fn countdown_tick(&mut self) {
        if !self.active {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.end();
        }
    }

    fn spawn_bubble(&mut self) {
        if !self.active {
            return;
        }
        let profile = self
            .profile_override
            .unwrap_or_else(|| SpawnProfile::for_viewport_width(self.play_area.width));

        let id = self.next_bubble_id;
        self.next_bubble_id += 1;

        let bubble = Bubble::spawn(id, self.play_area, profile, self.clock_ms, &mut self.rng);
        self.bubbles.push(bubble);
        self.timers.schedule(
            self.clock_ms + self.config.bubble_lifetime_ms,
            TimerKind::BubbleExpiry(id),
        );
    }

    fn pop_at(&mut self, idx: usize) {
        let (id, x, y, size) = {
            let b = &mut self.bubbles[idx];
            b.popped = true;
            (b.id, b.x, b.y, b.size)
        };

        let points = scoring::points_for_size(size);
        self.score += points;

        let popup_id = self.next_popup_id;
        self.next_popup_id += 1;
        self.popups.push(ScorePopup {
            id: popup_id,
            x,
            y,
            text: format!("+{}", points.floor() as u64),
        });
        self.timers.schedule(
            self.clock_ms + self.config.popup_lifetime_ms,
            TimerKind::PopupFade(popup_id),
        );
        self.timers
            .schedule(self.clock_ms + self.config.pop_window_ms, TimerKind::PopComplete(id));

        self.refresh_best();
    }

    fn miss(&mut self) {
        self.score = scoring::apply_miss(self.score);
    }

    fn refresh_best(&mut self) {
        if self.score > self.best_score {
            self.best_score = self.score;
            // A failed write costs the record, not the round
            let _ = self.store.save(scoring::display_score(self.best_score));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::MemoryBestScoreStore;

    const TICK: u64 = 100;

    fn session() -> GameSession {
        session_with_best(0)
    }

    fn session_with_best(best: u64) -> GameSession {
        GameSession::with_seed(
            SessionConfig::default(),
            Box::new(MemoryBestScoreStore::new(best)),
            42,
        )
    }

    fn advance_ms(s: &mut GameSession, ms: u64) {
        let mut left = ms;
        while left > 0 {
            let step = left.min(TICK);
            s.advance(step);
            left -= step;
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let s = session();
        assert!(!s.is_active());
        assert_eq!(s.hud(), Hud { score: 0, seconds_left: 30, best: 0 });
        assert!(s.bubbles().is_empty());
        assert!(s.summary().is_none());
    }

    #[test]
    fn test_start_schedules_initial_spawns() {
        let mut s = session();
        s.start();
        assert!(s.is_active());

        // 0ms, 200ms and 400ms staggered spawns
        advance_ms(&mut s, 100);
        assert_eq!(s.bubbles().len(), 1);
        advance_ms(&mut s, 300);
        assert_eq!(s.bubbles().len(), 3);
        // First periodic spawn lands at 800ms
        advance_ms(&mut s, 400);
        assert_eq!(s.bubbles().len(), 4);
    }

    #[test]
    fn test_start_while_active_is_a_no_op() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 2000);
        let hud = s.hud();
        let bubbles = s.bubbles().len();

        s.start();
        assert_eq!(s.hud(), hud);
        assert_eq!(s.bubbles().len(), bubbles);
        assert_eq!(s.time_remaining(), 28);
    }

    #[test]
    fn test_countdown_decrements_once_per_second() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 999);
        assert_eq!(s.time_remaining(), 30);
        advance_ms(&mut s, 1);
        assert_eq!(s.time_remaining(), 29);
        advance_ms(&mut s, 1000);
        assert_eq!(s.time_remaining(), 28);
    }

    #[test]
    fn test_session_ends_when_countdown_reaches_zero() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 30_000);
        assert!(!s.is_active());
        assert_eq!(s.time_remaining(), 0);
        assert!(s.bubbles().is_empty());
        assert!(s.summary().is_some());
    }

    #[test]
    fn test_end_fires_once_even_with_queued_ticks() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 29_000);
        // Pop something so the summary is distinguishable from a reset
        let (cx, cy) = s.bubbles()[0].center();
        s.pointer_down(cx, cy);
        let expected = s.hud().score;

        // One coarse jump far past the end; a single drain sees many
        // countdown deadlines but End must cancel the rest after the first
        // reaches zero.
        s.advance(60_000);
        assert!(!s.is_active());
        let summary = s.summary().unwrap();
        assert_eq!(summary.final_score, expected);
        assert_eq!(s.time_remaining(), 0);
    }

    #[test]
    fn test_no_spawns_after_end() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 30_000);
        assert!(s.bubbles().is_empty());
        advance_ms(&mut s, 5_000);
        assert!(s.bubbles().is_empty());
    }

    #[test]
    fn test_pop_awards_points_and_marks_popping() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 100);
        let bubble = s.bubbles()[0].clone();
        let (cx, cy) = bubble.center();

        s.pointer_down(cx, cy);

        let expected = scoring::points_for_size(bubble.size);
        assert_eq!(s.score(), expected);
        assert!(s.bubbles()[0].popped);
        assert_eq!(s.popups().len(), 1);
        assert_eq!(s.popups()[0].text, format!("+{}", expected.floor() as u64));
    }

    #[test]
    fn test_popping_bubble_is_removed_after_window() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 100);
        let id = s.bubbles()[0].id;
        let (cx, cy) = s.bubbles()[0].center();
        s.pointer_down(cx, cy);

        advance_ms(&mut s, 200);
        assert!(s.bubbles().iter().any(|b| b.id == id));
        advance_ms(&mut s, 100);
        assert!(!s.bubbles().iter().any(|b| b.id == id));
    }

    #[test]
    fn test_double_pop_is_spent_not_rescored() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 100);
        let (cx, cy) = s.bubbles()[0].center();

        s.pointer_down(cx, cy);
        let after_first = s.score();
        s.pointer_down(cx, cy);

        assert_eq!(s.score(), after_first);
        assert_eq!(s.popups().len(), 1);
    }

    #[test]
    fn test_popup_fades_after_a_second() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 100);
        let (cx, cy) = s.bubbles()[0].center();
        s.pointer_down(cx, cy);
        assert_eq!(s.popups().len(), 1);

        advance_ms(&mut s, 1000);
        assert!(s.popups().is_empty());
    }

    #[test]
    fn test_miss_penalty_clamps_at_zero() {
        let mut s = session();
        s.start();
        // Far corner of the default 800x400 area; no bubble covers (0,0)
        // because padding keeps them away from the edge.
        s.pointer_down(0.0, 0.0);
        assert_eq!(s.score(), 0.0);
        assert_eq!(s.hud().score, 0);
    }

    #[test]
    fn test_unpopped_bubble_expires_after_five_seconds() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 100);
        let id = s.bubbles()[0].id;

        advance_ms(&mut s, 4900);
        assert!(s.bubbles().iter().any(|b| b.id == id));
        advance_ms(&mut s, 100);
        assert!(!s.bubbles().iter().any(|b| b.id == id));
        assert_eq!(s.score(), 0.0);
    }

    #[test]
    fn test_expiry_for_missing_bubble_is_a_no_op() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 100);
        let before = s.bubbles().len();

        // A stale id no live bubble carries
        s.fire(TimerKind::BubbleExpiry(9999));
        assert_eq!(s.bubbles().len(), before);
    }

    #[test]
    fn test_bubble_ids_are_not_reused_across_rounds() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 1000);
        let max_id = s.bubbles().iter().map(|b| b.id).max().unwrap();
        s.end();

        s.start();
        advance_ms(&mut s, 1000);
        assert!(s.bubbles().iter().all(|b| b.id > max_id));
    }

    #[test]
    fn test_end_updates_and_persists_best() {
        let mut s = session_with_best(10);
        s.start();
        advance_ms(&mut s, 100);
        let (cx, cy) = s.bubbles()[0].center();
        s.pointer_down(cx, cy);
        let score = s.hud().score;
        assert!(score > 0);

        s.end();
        let summary = s.summary().unwrap();
        assert_eq!(summary.final_score, score);
        // Best beaten only if the single pop outscored the seeded 10
        assert_eq!(summary.best, score.max(10));
    }

    #[test]
    fn test_lower_round_leaves_best_untouched() {
        let mut s = session_with_best(1000);
        s.start();
        advance_ms(&mut s, 100);
        let (cx, cy) = s.bubbles()[0].center();
        s.pointer_down(cx, cy);
        s.end();
        assert_eq!(s.hud().best, 1000);
    }

    #[test]
    fn test_reset_restores_idle_displays() {
        let mut s = session();
        s.start();
        advance_ms(&mut s, 3000);
        let (cx, cy) = s.bubbles()[0].center();
        s.pointer_down(cx, cy);

        s.reset();
        assert!(!s.is_active());
        assert_eq!(s.hud().seconds_left, 30);
        assert_eq!(s.hud().score, 0);
        assert!(s.summary().is_none());

        // No timers keep running after a reset
        let before = s.hud();
        advance_ms(&mut s, 10_000);
        assert_eq!(s.hud(), before);
        assert!(s.bubbles().is_empty());
    }

    #[test]
    fn test_profile_override_pins_spawn_sizing() {
        let mut s = session();
        s.set_profile_override(Some(SpawnProfile::COMPACT));
        s.start();
        advance_ms(&mut s, 5000);
        assert!(!s.bubbles().is_empty());
        for b in s.bubbles() {
            assert!(b.size >= SpawnProfile::COMPACT.min_size);
            assert!(b.size <= SpawnProfile::COMPACT.max_size);
        }
    }

    #[test]
    fn test_hud_floors_fractional_score() {
        let mut s = session();
        s.start();
        // Pop until a fractional score shows up, then check the floor
        for _ in 0..50 {
            advance_ms(&mut s, 800);
            if let Some(b) = s.bubbles().iter().find(|b| !b.popped) {
                let (cx, cy) = b.center();
                s.pointer_down(cx, cy);
            }
            if s.score().fract() != 0.0 {
                break;
            }
        }
        assert_eq!(s.hud().score, s.score().floor() as u64);
    }
}
