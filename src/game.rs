//! Game controller: the one owner of board, session and gesture state.
//!
//! Everything time-based runs on a logical millisecond clock. The browser
//! front end feeds it frame deltas through [`Game::advance`]; tests call the
//! same method with whatever step they like. Settle pauses between the
//! clear, collapse and cascade-check stages are queued as [`Stage`]s with a
//! due time on that clock.

use log::{debug, info};

use crate::config::GameConfig;
use crate::gesture::{DragState, SwapRejection, check_swap};
use crate::grid::{ColorSource, Grid, RandomColors};
use crate::matcher::find_matches;
use crate::resolver::{self, ClearReport};
use crate::session::{HighScoreStore, Session, SessionEvent};

/// Deferred board work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Drop survivors and refill after a clear.
    Collapse,
    /// Look for runs created by the last refill.
    CascadeCheck,
    /// Undo a swap that produced no run.
    Revert { a: usize, b: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Scheduled {
    due_ms: u64,
    stage: Stage,
}

/// What happened during a call, in order. The front end uses these for
/// logging and the end-of-session alert; it re-renders from state anyway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Swapped { a: usize, b: usize },
    Rejected(SwapRejection),
    /// `chain` is 0 for the clear caused by the player's swap, then 1, 2, ...
    /// for each cascade.
    Cleared { cells: usize, points: u32, chain: u32 },
    Collapsed,
    Reverted { a: usize, b: usize },
    /// Board is at rest and accepts gestures again.
    Settled,
    Session(SessionEvent),
}

pub struct Game {
    config: GameConfig,
    grid: Grid,
    session: Session,
    drag: DragState,
    colors: Box<dyn ColorSource>,
    now_ms: u64,
    pending: Option<Scheduled>,
    chain: u32,
}

impl Game {
    /// Fresh random board, high score read from `store`.
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        Self::with_colors(config, store, Box::new(RandomColors::from_entropy()))
    }

    pub fn with_colors(
        config: GameConfig,
        store: Box<dyn HighScoreStore>,
        mut colors: Box<dyn ColorSource>,
    ) -> Self {
        let grid = Grid::random(colors.as_mut());
        let session = Session::new(config.session_seconds, store);
        Self {
            config,
            grid,
            session,
            drag: DragState::Idle,
            colors,
            now_ms: 0,
            pending: None,
            chain: 0,
        }
    }

    /// Replace the board outright, dropping any queued stage.
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.pending = None;
        self.chain = 0;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// A clear, collapse or revert is still queued.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    // --- Lifecycle -----------------------------------------------------------

    /// Start the countdown; no-op while one is running. The current board is
    /// kept.
    pub fn start(&mut self) -> bool {
        self.session.start()
    }

    /// Abort any session, restore score and clock, deal a new board.
    pub fn reset(&mut self) {
        self.session.reset();
        self.grid.initialize(self.colors.as_mut());
        self.pending = None;
        self.drag = DragState::Idle;
        self.chain = 0;
        info!("game reset");
    }

    // --- Gestures ------------------------------------------------------------

    pub fn drag_start(&mut self, source: usize) {
        self.drag = self.drag.drag_start(source);
    }

    pub fn drop_on(&mut self, target: usize) {
        self.drag = self.drag.drop_on(target);
    }

    /// Complete the gesture; a recorded pair is attempted as a swap.
    pub fn drag_end(&mut self) -> Vec<GameEvent> {
        let (next, pair) = self.drag.drag_end();
        self.drag = next;
        let Some((source, target)) = pair else {
            return Vec::new();
        };
        match self.try_swap(source, target) {
            Ok(events) => events,
            Err(reason) => {
                debug!("swap {source}<->{target} rejected: {reason}");
                vec![GameEvent::Rejected(reason)]
            }
        }
    }

    /// Swap two neighbours. A swap that makes a run is kept and resolution
    /// begins; otherwise it is undone after `revert_delay_ms`.
    pub fn try_swap(&mut self, a: usize, b: usize) -> Result<Vec<GameEvent>, SwapRejection> {
        if self.is_busy() {
            return Err(SwapRejection::Busy);
        }
        check_swap(a, b)?;
        self.grid.swap(a, b);
        let mut events = vec![GameEvent::Swapped { a, b }];

        let matched = find_matches(&self.grid);
        if !matched.is_empty() {
            self.chain = 0;
            if self.config.settle_delay_ms == 0 {
                self.settle_now(&mut events);
            } else {
                let report = resolver::clear(&mut self.grid, &matched, self.config.points_per_tile);
                self.award(report, &mut events);
                self.schedule(self.now_ms, self.config.settle_delay_ms, Stage::Collapse);
            }
        } else if self.config.revert_delay_ms == 0 {
            self.grid.swap(a, b);
            events.push(GameEvent::Reverted { a, b });
        } else {
            self.schedule(self.now_ms, self.config.revert_delay_ms, Stage::Revert { a, b });
        }
        Ok(events)
    }

    // --- Clock ---------------------------------------------------------------

    /// Move the logical clock forward, running due stages and countdown ticks.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<GameEvent> {
        self.now_ms += elapsed_ms;
        let mut events = Vec::new();
        while let Some(job) = self.pending.filter(|job| job.due_ms <= self.now_ms) {
            self.pending = None;
            self.run_stage(job, &mut events);
        }
        events.extend(self.session.advance(elapsed_ms).into_iter().map(GameEvent::Session));
        events
    }

    fn run_stage(&mut self, job: Scheduled, events: &mut Vec<GameEvent>) {
        match job.stage {
            Stage::Collapse => {
                resolver::collapse(&mut self.grid, self.colors.as_mut());
                events.push(GameEvent::Collapsed);
                self.schedule(job.due_ms, self.config.settle_delay_ms, Stage::CascadeCheck);
            }
            Stage::CascadeCheck => {
                let matched = find_matches(&self.grid);
                if matched.is_empty() {
                    self.chain = 0;
                    events.push(GameEvent::Settled);
                    return;
                }
                self.chain += 1;
                debug!("cascade {} clears {} cells", self.chain, matched.len());
                let report = resolver::clear(&mut self.grid, &matched, self.config.points_per_tile);
                self.award(report, events);
                self.schedule(job.due_ms, self.config.settle_delay_ms, Stage::Collapse);
            }
            Stage::Revert { a, b } => {
                self.grid.swap(a, b);
                events.push(GameEvent::Reverted { a, b });
                events.push(GameEvent::Settled);
            }
        }
    }

    /// Pause-free resolution used when `settle_delay_ms` is zero.
    fn settle_now(&mut self, events: &mut Vec<GameEvent>) {
        let reports = resolver::settle(&mut self.grid, self.colors.as_mut(), self.config.points_per_tile);
        for report in reports {
            self.award(report, events);
            events.push(GameEvent::Collapsed);
            self.chain += 1;
        }
        self.chain = 0;
        events.push(GameEvent::Settled);
    }

    fn award(&mut self, report: ClearReport, events: &mut Vec<GameEvent>) {
        self.session.add_points(report.points);
        events.push(GameEvent::Cleared {
            cells: report.cleared,
            points: report.points,
            chain: self.chain,
        });
    }

    fn schedule(&mut self, from_ms: u64, delay_ms: u64, stage: Stage) {
        debug!("stage {:?} due in {}ms", stage, delay_ms);
        self.pending = Some(Scheduled { due_ms: from_ms + delay_ms, stage });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Color::{self, *};
    use crate::session::MemoryStore;

    /// Hands out `Red, Yellow, Red, ...` so three refills never line up.
    struct Alternating(usize);

    impl ColorSource for Alternating {
        fn next_color(&mut self) -> Color {
            self.0 += 1;
            if self.0 % 2 == 1 { Red } else { Yellow }
        }
    }

    fn stripes() -> Grid {
        Grid::from_colors(std::array::from_fn(|i| match (i / 6 + i % 6) % 4 {
            0 => Cyan,
            1 => Purple,
            2 => Orange,
            _ => Pink,
        }))
    }

    fn game() -> Game {
        let mut g = Game::with_colors(
            GameConfig::default(),
            Box::new(MemoryStore::default()),
            Box::new(RandomColors::seeded(5)),
        );
        g.set_grid(stripes());
        g
    }

    #[test]
    fn rejected_gesture_leaves_board_alone() {
        let mut g = game();
        let before = g.grid().clone();
        g.drag_start(5);
        g.drop_on(6);
        let events = g.drag_end();
        assert_eq!(events, vec![GameEvent::Rejected(SwapRejection::CrossesRow(5, 6))]);
        assert_eq!(g.grid(), &before);
        assert_eq!(g.drag_state(), DragState::Idle);
        assert!(!g.is_busy());
    }

    #[test]
    fn fruitless_swap_reverts_after_delay() {
        let mut g = game();
        let before = g.grid().clone();
        let events = g.try_swap(0, 1).unwrap();
        assert_eq!(events, vec![GameEvent::Swapped { a: 0, b: 1 }]);
        assert_ne!(g.grid(), &before);
        assert!(g.is_busy());

        assert!(g.advance(100).is_empty());
        assert_eq!(g.try_swap(7, 8), Err(SwapRejection::Busy));

        let events = g.advance(80);
        assert_eq!(events, vec![GameEvent::Reverted { a: 0, b: 1 }, GameEvent::Settled]);
        assert_eq!(g.grid(), &before);
        assert!(!g.is_busy());
    }

    #[test]
    fn matching_swap_scores_then_collapses_then_settles() {
        let mut g = Game::with_colors(
            GameConfig::default(),
            Box::new(MemoryStore::default()),
            Box::new(Alternating(0)),
        );
        let mut grid = stripes();
        // row 5 reads Green Green Pink; dropping the Green from above completes it
        grid.set(30, Green.into());
        grid.set(31, Green.into());
        grid.set(26, Green.into());
        g.set_grid(grid);

        let events = g.try_swap(26, 32).unwrap();
        assert_eq!(
            events,
            vec![
                GameEvent::Swapped { a: 26, b: 32 },
                GameEvent::Cleared { cells: 3, points: 30, chain: 0 },
            ]
        );
        assert_eq!(g.session().score(), 30);
        assert_eq!(g.grid().empty_count(), 3);

        assert_eq!(g.advance(180), vec![GameEvent::Collapsed]);
        assert!(g.grid().is_settled());
        // refills land on row 0 as Red Yellow Red, no new run
        assert_eq!(g.advance(180), vec![GameEvent::Settled]);
        assert!(!g.is_busy());
        assert_eq!(g.session().score(), 30);
    }

    #[test]
    fn instant_mode_resolves_within_the_swap() {
        let config = GameConfig { settle_delay_ms: 0, ..GameConfig::default() };
        let mut g = Game::with_colors(config, Box::new(MemoryStore::default()), Box::new(Alternating(0)));
        let mut grid = stripes();
        grid.set(30, Green.into());
        grid.set(31, Green.into());
        grid.set(26, Green.into());
        g.set_grid(grid);
        let events = g.try_swap(26, 32).unwrap();
        assert_eq!(events.last(), Some(&GameEvent::Settled));
        assert!(!g.is_busy());
        assert!(g.grid().is_settled());
        assert_eq!(g.session().score(), 30);
    }

    #[test]
    fn reset_cancels_pending_work_and_redeals() {
        let mut g = game();
        g.start();
        g.try_swap(0, 1).unwrap();
        assert!(g.is_busy());
        g.advance(5_000);
        g.reset();
        assert!(!g.is_busy());
        assert!(!g.session().is_running());
        assert_eq!(g.session().clock_label(), "2:00");
        assert_ne!(g.grid(), &stripes());
        assert!(g.advance(10_000).is_empty());
    }

    #[test]
    fn start_keeps_current_board() {
        let mut g = game();
        assert!(g.start());
        assert_eq!(g.grid(), &stripes());
        assert!(!g.start());
    }
}
