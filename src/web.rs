//! Browser front end: DOM board, HUD, drag listeners and the frame loop.
//!
//! The page may provide `#board`, `#score`, `#highest`, `#time`, `#bar`,
//! `#startBtn` and `#resetBtn`; any that are missing get created inside a
//! `#candy-spark` panel, which is only added when something is missing. The
//! single [`Game`] lives in a thread-local and every callback borrows it,
//! mutates, and returns.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, DragEvent, Element, HtmlElement, MouseEvent, Storage, window};

use crate::config::{CELL_COUNT, GameConfig, WIDTH};
use crate::error::UiError;
use crate::game::{Game, GameEvent};
use crate::grid::Cell;
use crate::session::{HighScoreStore, SessionEvent, StoreError};

// --- Persistence --------------------------------------------------------------

/// Best score kept in `window.localStorage` under a fixed key.
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

impl HighScoreStore for LocalStorageStore {
    fn load(&self) -> Option<u32> {
        let raw = local_storage()?.get_item(&self.key).ok().flatten()?;
        raw.trim().parse().ok()
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        let store = local_storage().ok_or_else(|| StoreError("localStorage unavailable".into()))?;
        store
            .set_item(&self.key, &score.to_string())
            .map_err(|e| StoreError(format!("{e:?}")))
    }
}

// --- Mounted state -------------------------------------------------------------

struct Hud {
    score: HtmlElement,
    high: HtmlElement,
    time: HtmlElement,
    bar: HtmlElement,
}

struct WebState {
    game: Game,
    cells: Vec<HtmlElement>,
    hud: Hud,
    /// What each DOM cell currently shows; `None` forces a repaint.
    painted: [Option<Cell>; CELL_COUNT],
    last_frame_ms: Option<f64>,
    carry_ms: f64,
}

thread_local! {
    static WEB_STATE: RefCell<Option<WebState>> = const { RefCell::new(None) };
    static PENDING_CONFIG: RefCell<GameConfig> = RefCell::new(GameConfig::default());
}

/// Replace the config used by the next [`mount`]. Fails once mounted.
pub fn set_config(config: GameConfig) -> Result<(), UiError> {
    if is_mounted() {
        return Err(UiError::Config("game already mounted".into()));
    }
    log::set_max_level(config.log_level);
    PENDING_CONFIG.with(|c| *c.borrow_mut() = config);
    Ok(())
}

fn is_mounted() -> bool {
    WEB_STATE.with(|s| s.borrow().is_some())
}

fn with_state<R>(f: impl FnOnce(&mut WebState) -> R) -> Option<R> {
    WEB_STATE.with(|cell| cell.borrow_mut().as_mut().map(f))
}

// --- Mount -------------------------------------------------------------------

/// Build the DOM, wire listeners and start the frame loop. Mounting twice is
/// a no-op.
pub fn mount() -> Result<(), UiError> {
    if is_mounted() {
        return Ok(());
    }
    let win = window().ok_or(UiError::NoWindow)?;
    let doc = win.document().ok_or(UiError::NoDocument)?;
    let panel = layout_parent(&doc)?;

    let hud = Hud {
        score: ensure_element(&doc, &panel, "score", "span", "font-size:18px;", "0")?,
        high: ensure_element(&doc, &panel, "highest", "span", "font-size:18px; color:#FFCC00;", "0")?,
        time: ensure_element(&doc, &panel, "time", "span", "font-size:18px;", "2:00")?,
        bar: ensure_element(&doc, &panel, "bar", "div", "height:8px; width:100%; background:#FF2D55; border-radius:4px; transition:width 0.3s linear;", "")?,
    };
    let start_btn = ensure_element(&doc, &panel, "startBtn", "button", "padding:6px 18px;", "Start")?;
    let reset_btn = ensure_element(&doc, &panel, "resetBtn", "button", "padding:6px 18px;", "Reset")?;
    let board = ensure_element(
        &doc,
        &panel,
        "board",
        "div",
        &format!("display:grid; grid-template-columns:repeat({WIDTH}, 56px); gap:6px; padding:10px; background:#181818; border-radius:18px; border:2px solid #222;"),
        "",
    )?;

    board.set_inner_html("");
    let mut cells = Vec::with_capacity(CELL_COUNT);
    for idx in 0..CELL_COUNT {
        let cell: HtmlElement = doc
            .create_element("div")?
            .dyn_into()
            .map_err(|_| UiError::Js("cell is not an HtmlElement".into()))?;
        cell.set_class_name("candy");
        cell.set_id(&idx.to_string());
        cell.set_draggable(true);
        cell.set_attribute("style", "width:56px; height:56px; border-radius:12px; cursor:grab; transition:opacity 0.15s;")?;
        board.append_child(&cell)?;
        attach_drag_listeners(&cell, idx)?;
        cells.push(cell);
    }

    let config = PENDING_CONFIG.with(|c| c.borrow().clone());
    let store = LocalStorageStore::new(config.high_score_key.clone());
    let game = Game::new(config, Box::new(store));
    hud.high.set_text_content(Some(&game.session().high_score().to_string()));
    info!("board mounted, high score {}", game.session().high_score());

    WEB_STATE.with(|s| {
        *s.borrow_mut() = Some(WebState {
            game,
            cells,
            hud,
            painted: [None; CELL_COUNT],
            last_frame_ms: None,
            carry_ms: 0.0,
        });
    });

    attach_click(&start_btn, start_session)?;
    attach_click(&reset_btn, reset_session)?;
    with_state(render);
    start_frame_loop();
    Ok(())
}

/// Elements the front end binds to by id.
pub const LAYOUT_IDS: [&str; 7] = ["score", "highest", "time", "bar", "startBtn", "resetBtn", "board"];

/// Where missing layout elements go: the page's `#candy-spark` if present,
/// a new panel under `<body>` if anything is missing, else `<body>` itself
/// (which then receives nothing).
pub fn layout_parent(doc: &Document) -> Result<Element, UiError> {
    if let Some(panel) = doc.get_element_by_id("candy-spark") {
        return Ok(panel);
    }
    let body = doc.body().ok_or(UiError::NoBody)?;
    if LAYOUT_IDS.iter().all(|id| doc.get_element_by_id(id).is_some()) {
        return Ok(body.into());
    }
    let div = doc.create_element("div")?;
    div.set_id("candy-spark");
    div.set_attribute("style", "font-family:'Fira Code', monospace; color:#eee; display:flex; flex-direction:column; align-items:center; gap:10px; margin:24px auto;")?;
    body.append_child(&div)?;
    Ok(div)
}

/// Find `#id` or create it under `parent` with inline style and initial text.
fn ensure_element(
    doc: &Document,
    parent: &Element,
    id: &str,
    tag: &str,
    style: &str,
    text: &str,
) -> Result<HtmlElement, UiError> {
    let el = match doc.get_element_by_id(id) {
        Some(el) => el,
        None => {
            let el = doc.create_element(tag)?;
            el.set_id(id);
            el.set_attribute("style", style)?;
            if !text.is_empty() {
                el.set_text_content(Some(text));
            }
            parent.append_child(&el)?;
            el
        }
    };
    el.dyn_into()
        .map_err(|_| UiError::Js(format!("#{id} is not an HtmlElement")))
}

// --- Controls ----------------------------------------------------------------

/// Start button. Ignored while a countdown is running.
pub fn start_session() {
    with_state(|st| {
        if st.game.start() {
            render(st);
        }
    });
}

/// Reset button: stop, zero the HUD, deal a new board.
pub fn reset_session() {
    with_state(|st| {
        st.game.reset();
        render(st);
    });
}

fn attach_click(el: &HtmlElement, action: fn()) -> Result<(), UiError> {
    let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| action()) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn attach_drag_listeners(cell: &HtmlElement, idx: usize) -> Result<(), UiError> {
    // dragstart: remember the source cell
    {
        let closure = Closure::wrap(Box::new(move |evt: DragEvent| {
            // Firefox only starts a drag once some data is attached.
            if let Some(dt) = evt.data_transfer() {
                let _ = dt.set_data("text/plain", &idx.to_string());
            }
            with_state(|st| st.game.drag_start(idx));
        }) as Box<dyn FnMut(_)>);
        cell.add_event_listener_with_callback("dragstart", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // dragover must be cancelled for the cell to accept a drop
    {
        let closure = Closure::wrap(Box::new(move |evt: DragEvent| {
            evt.prevent_default();
        }) as Box<dyn FnMut(_)>);
        cell.add_event_listener_with_callback("dragover", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |evt: DragEvent| {
            evt.prevent_default();
            with_state(|st| st.game.drop_on(idx));
        }) as Box<dyn FnMut(_)>);
        cell.add_event_listener_with_callback("drop", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: DragEvent| {
            with_state(|st| {
                let events = st.game.drag_end();
                log_events(&events);
                render(st);
            });
        }) as Box<dyn FnMut(_)>);
        cell.add_event_listener_with_callback("dragend", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

// --- Frame loop ----------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let alert = with_state(|st| frame(st, ts)).flatten();
        // Shown outside the borrow; alert blocks until dismissed.
        if let Some(msg) = alert {
            if let Some(w) = window() {
                let _ = w.alert_with_message(&msg);
            }
        }
        if let Some(w) = window() {
            if let Some(cb) = f.borrow().as_ref() {
                let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        if let Some(cb) = g.borrow().as_ref() {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}

/// Advance the logical clock by the frame delta and repaint. Returns the
/// end-of-session message if the countdown just expired.
fn frame(st: &mut WebState, ts: f64) -> Option<String> {
    let delta = match st.last_frame_ms {
        Some(last) => (ts - last).max(0.0) + st.carry_ms,
        None => 0.0,
    };
    st.last_frame_ms = Some(ts);
    let whole = delta.floor();
    st.carry_ms = delta - whole;

    let events = st.game.advance(whole as u64);
    log_events(&events);
    render(st);
    events.iter().find_map(|ev| match ev {
        GameEvent::Session(SessionEvent::Expired { final_score, .. }) => {
            Some(format!("⏰ Time's up! Final Score: {final_score}"))
        }
        _ => None,
    })
}

fn log_events(events: &[GameEvent]) {
    for ev in events {
        match ev {
            GameEvent::Rejected(reason) => debug!("gesture rejected: {reason}"),
            GameEvent::Cleared { cells, points, chain } if *chain > 0 => {
                debug!("cascade #{chain}: {cells} cells, +{points}")
            }
            GameEvent::Session(SessionEvent::Expired { final_score, new_high_score }) => {
                if *new_high_score {
                    info!("time up with a new best of {final_score}");
                } else {
                    info!("time up, final score {final_score}");
                }
            }
            _ => {}
        }
    }
}

// --- Rendering -------------------------------------------------------------------

fn render(st: &mut WebState) {
    for (idx, el) in st.cells.iter().enumerate() {
        let cell = st.game.grid().get(idx);
        if st.painted[idx] == Some(cell) {
            continue;
        }
        let style = el.style();
        let painted = match cell {
            Cell::Filled(color) => style
                .set_property("background-color", color.css())
                .and_then(|_| style.set_property("opacity", "1")),
            Cell::Empty => style
                .set_property("background-color", "transparent")
                .and_then(|_| style.set_property("opacity", "0")),
        };
        match painted {
            Ok(()) => st.painted[idx] = Some(cell),
            Err(e) => warn!("could not paint cell {idx}: {e:?}"),
        }
    }

    let session = st.game.session();
    st.hud.score.set_text_content(Some(&session.score().to_string()));
    st.hud.high.set_text_content(Some(&session.high_score().to_string()));
    st.hud.time.set_text_content(Some(&session.clock_label()));
    let _ = st
        .hud
        .bar
        .style()
        .set_property("width", &format!("{}%", session.progress_percent()));
}
