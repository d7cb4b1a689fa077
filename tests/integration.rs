// Integration tests (native) for the `candy-spark` crate.
// These drive the public `Game` API with a logical clock and never touch
// wasm/browser APIs, so they run under `cargo test` on the host.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use candy_spark::{
    Cell, Color, ColorSource, Game, GameConfig, GameEvent, Grid, MemoryStore, SessionEvent,
    SwapRejection, find_matches,
};
use candy_spark::Color::*;

/// Refill colors the test pushes after construction; `Yellow` once drained.
#[derive(Clone, Default)]
struct Queue(Rc<RefCell<VecDeque<Color>>>);

impl Queue {
    fn push(&self, colors: &[Color]) {
        self.0.borrow_mut().extend(colors.iter().copied());
    }

    fn remaining(&self) -> usize {
        self.0.borrow().len()
    }
}

impl ColorSource for Queue {
    fn next_color(&mut self) -> Color {
        self.0.borrow_mut().pop_front().unwrap_or(Yellow)
    }
}

/// Diagonal stripes of four colors; no runs anywhere.
fn stripes() -> Grid {
    Grid::from_colors(std::array::from_fn(|i| match (i / 6 + i % 6) % 4 {
        0 => Cyan,
        1 => Purple,
        2 => Orange,
        _ => Pink,
    }))
}

fn game_with(store: &MemoryStore, queue: &Queue) -> Game {
    let mut g = Game::with_colors(GameConfig::default(), Box::new(store.clone()), Box::new(queue.clone()));
    g.set_grid(stripes());
    g
}

#[test]
fn four_match_then_cascade_of_three_scores_seventy() {
    let queue = Queue::default();
    let mut g = game_with(&MemoryStore::default(), &queue);
    let mut grid = g.grid().clone();
    // bottom row Green Green Pink Green, a Green sits above the Pink
    for idx in [30, 31, 33, 26] {
        grid.set(idx, Cell::Filled(Green));
    }
    g.set_grid(grid);
    assert!(find_matches(g.grid()).is_empty());

    // first refill lines up Red Red Red on row 0, second refill is quiet
    queue.push(&[Red, Red, Red, Yellow, Yellow, Green, Yellow]);

    let events = g.try_swap(26, 32).expect("vertical neighbours");
    assert_eq!(
        events,
        vec![
            GameEvent::Swapped { a: 26, b: 32 },
            GameEvent::Cleared { cells: 4, points: 40, chain: 0 },
        ]
    );
    assert_eq!(g.session().score(), 40);

    assert_eq!(g.advance(180), vec![GameEvent::Collapsed]);
    assert_eq!(g.advance(180), vec![GameEvent::Cleared { cells: 3, points: 30, chain: 1 }]);
    assert_eq!(g.session().score(), 70);

    assert_eq!(g.advance(180), vec![GameEvent::Collapsed]);
    assert_eq!(g.advance(180), vec![GameEvent::Settled]);
    assert_eq!(queue.remaining(), 0);
    assert_eq!(g.session().score(), 70);
    assert!(g.grid().is_settled());
    assert!(find_matches(g.grid()).is_empty());
}

#[test]
fn one_big_advance_runs_the_whole_cascade() {
    let queue = Queue::default();
    let mut g = game_with(&MemoryStore::default(), &queue);
    let mut grid = g.grid().clone();
    for idx in [30, 31, 33, 26] {
        grid.set(idx, Cell::Filled(Green));
    }
    g.set_grid(grid);
    queue.push(&[Red, Red, Red, Yellow, Yellow, Green, Yellow]);

    g.try_swap(32, 26).unwrap();
    let events = g.advance(10_000);
    assert_eq!(events.last(), Some(&GameEvent::Settled));
    assert_eq!(g.session().score(), 70);
    assert!(!g.is_busy());
}

#[test]
fn cross_row_drag_is_ignored() {
    let queue = Queue::default();
    let mut g = game_with(&MemoryStore::default(), &queue);
    let before = g.grid().clone();
    g.drag_start(5);
    g.drop_on(6);
    assert_eq!(g.drag_end(), vec![GameEvent::Rejected(SwapRejection::CrossesRow(5, 6))]);
    assert_eq!(g.grid(), &before);
}

#[test]
fn drag_without_drop_does_nothing() {
    let queue = Queue::default();
    let mut g = game_with(&MemoryStore::default(), &queue);
    g.drag_start(14);
    assert!(g.drag_end().is_empty());
    assert!(!g.is_busy());
}

#[test]
fn illegal_move_swaps_back() {
    let queue = Queue::default();
    let mut g = game_with(&MemoryStore::default(), &queue);
    let before = g.grid().clone();
    g.drag_start(14);
    g.drop_on(15);
    let events = g.drag_end();
    assert_eq!(events, vec![GameEvent::Swapped { a: 14, b: 15 }]);
    assert_eq!(g.grid().get(14), before.get(15));

    let events = g.advance(200);
    assert!(events.contains(&GameEvent::Reverted { a: 14, b: 15 }));
    assert_eq!(g.grid(), &before);
    assert_eq!(g.session().score(), 0);
}

#[test]
fn countdown_expires_and_records_high_score() {
    let store = MemoryStore::with_value(20);
    let queue = Queue::default();
    let mut g = game_with(&store, &queue);
    assert_eq!(g.session().high_score(), 20);
    assert!(g.start());

    let mut grid = g.grid().clone();
    for idx in [30, 31, 26] {
        grid.set(idx, Cell::Filled(Green));
    }
    g.set_grid(grid);
    queue.push(&[Red, Yellow, Red]);
    g.try_swap(26, 32).unwrap();
    assert_eq!(g.session().score(), 30);

    let mut expired = Vec::new();
    for _ in 0..121 {
        for ev in g.advance(1_000) {
            if let GameEvent::Session(e @ SessionEvent::Expired { .. }) = ev {
                expired.push(e);
            }
        }
    }
    assert_eq!(expired, vec![SessionEvent::Expired { final_score: 30, new_high_score: true }]);
    assert_eq!(g.session().time_remaining(), 0);
    assert!(!g.session().is_running());
    assert_eq!(g.session().high_score(), 30);
    assert_eq!(store.get(), Some(30));
}

#[test]
fn losing_session_keeps_stored_high_score() {
    let store = MemoryStore::with_value(900);
    let queue = Queue::default();
    let mut g = game_with(&store, &queue);
    g.start();
    g.advance(120_000);
    assert!(!g.session().is_running());
    assert_eq!(g.session().high_score(), 900);
    assert_eq!(store.get(), Some(900));
}

#[test]
fn reset_mid_countdown_stops_clock_and_redeals() {
    let store = MemoryStore::default();
    let mut g = Game::with_colors(
        GameConfig::default(),
        Box::new(store),
        Box::new(candy_spark::RandomColors::seeded(11)),
    );
    g.start();
    g.advance(10_000);
    assert_eq!(g.session().clock_label(), "1:50");
    let before = g.grid().clone();

    g.reset();
    assert!(!g.session().is_running());
    assert_eq!(g.session().score(), 0);
    assert_eq!(g.session().clock_label(), "2:00");
    assert_ne!(g.grid(), &before);
    assert!(g.grid().is_settled());

    assert!(g.advance(5_000).is_empty());
    assert_eq!(g.session().clock_label(), "2:00");

    // a fresh start after reset counts down again
    assert!(g.start());
    g.advance(1_000);
    assert_eq!(g.session().clock_label(), "1:59");
}

#[test]
fn start_while_running_changes_nothing() {
    let queue = Queue::default();
    let mut g = game_with(&MemoryStore::default(), &queue);
    assert!(g.start());
    g.advance(3_000);
    assert!(!g.start());
    assert_eq!(g.session().time_remaining(), 117);
}

#[test]
fn huge_tile_value_caps_score_instead_of_overflowing() {
    let queue = Queue::default();
    let config = GameConfig { points_per_tile: u32::MAX / 2, ..GameConfig::default() };
    let mut g = Game::with_colors(config, Box::new(MemoryStore::default()), Box::new(queue.clone()));
    let mut grid = stripes();
    for idx in [30, 31, 26] {
        grid.set(idx, Cell::Filled(Green));
    }
    g.set_grid(grid);
    queue.push(&[Red, Yellow, Red]);

    let events = g.try_swap(26, 32).expect("vertical neighbours");
    assert!(events.contains(&GameEvent::Cleared { cells: 3, points: u32::MAX, chain: 0 }));
    assert_eq!(g.session().score(), u32::MAX);
}
