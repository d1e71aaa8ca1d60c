//! Definition popover state for one UI session.
//!
//! At most one term is open at a time. Opening acquires a subscription from
//! the [`DismissSource`] (outside-click and Escape listeners in a browser);
//! the subscription lives inside the open state, so every path back to
//! `Closed` releases it by dropping that state.

use crate::{Glossary, GlossaryEntry, normalize_key};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const NOT_FOUND_TEXT: &str = "Definição não encontrada.";

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Window size and scroll offset, sampled when a term is activated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub const fn scrolled(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }
}

/// Top-left corner of the panel in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub top: i32,
    pub left: i32,
}

/// Panel geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipConfig {
    pub panel_width: f64,
    /// Height budget used only to decide whether the panel fits below its
    /// source. Hit-testing uses the bounds the host actually rendered.
    pub panel_height: f64,
    /// Vertical distance between source and panel.
    pub gap: f64,
    /// Minimum distance kept from the left and right viewport edges.
    pub margin: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            panel_width: 320.0,
            panel_height: 200.0,
            gap: 8.0,
            margin: 16.0,
        }
    }
}

impl TooltipConfig {
    /// Centres the panel under `source`, clamped horizontally inside the
    /// viewport margins, and flips it above the source when it would run
    /// past the bottom edge.
    pub fn place(&self, source: Rect, viewport: Viewport) -> Position {
        let centred = source.left + source.width / 2.0 - self.panel_width / 2.0;
        let max_left = (viewport.width - self.panel_width - self.margin).max(self.margin);
        let left = centred.clamp(self.margin, max_left) + viewport.scroll_x;

        let below = source.bottom() + viewport.scroll_y + self.gap;
        let top = if below + self.panel_height > viewport.height + viewport.scroll_y {
            source.top + viewport.scroll_y - self.panel_height - self.gap
        } else {
            below
        };

        Position {
            top: top.round() as i32,
            left: left.round() as i32,
        }
    }
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// A term target holding keyboard focus.
#[derive(Debug, Clone, Copy)]
pub struct FocusedTerm<'a> {
    pub term: &'a str,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    Closed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TooltipState {
    Closed,
    Open { term: String, position: Position },
}

/// Source of the global listeners that may dismiss an open panel.
///
/// `subscribe` is called when the panel opens; the returned value is dropped
/// when it closes, so implementations unregister in `Drop`.
pub trait DismissSource {
    type Subscription;

    fn subscribe(&mut self) -> Self::Subscription;
}

/// For hosts that route pointer and key events to the controller themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoListeners;

impl DismissSource for NoListeners {
    type Subscription = ();

    fn subscribe(&mut self) {}
}

/// Tracks how many subscriptions are alive.
#[derive(Debug, Clone, Default)]
pub struct ListenerCounter {
    active: Arc<AtomicUsize>,
}

impl ListenerCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct CountedSubscription {
    active: Arc<AtomicUsize>,
}

impl Drop for CountedSubscription {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DismissSource for ListenerCounter {
    type Subscription = CountedSubscription;

    fn subscribe(&mut self) -> CountedSubscription {
        self.active.fetch_add(1, Ordering::SeqCst);
        CountedSubscription {
            active: Arc::clone(&self.active),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelContent {
    Definition(GlossaryEntry<'static>),
    NotFound,
}

impl PanelContent {
    pub fn text(&self) -> &'static str {
        match self {
            PanelContent::Definition(entry) => entry.definition(),
            PanelContent::NotFound => NOT_FOUND_TEXT,
        }
    }
}

/// What to render for the open term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPanel<'a> {
    pub term: &'a str,
    pub position: Position,
    pub content: PanelContent,
}

impl TooltipPanel<'_> {
    /// DOM id linking the term target (`aria-describedby`) to the panel.
    pub fn element_id(&self) -> String {
        let slug: Vec<&str> = self.term.split_whitespace().collect();
        format!("tooltip-{}", slug.join("-"))
    }
}

struct OpenTooltip<S> {
    term: String,
    key: String,
    position: Position,
    entry: Option<GlossaryEntry<'static>>,
    listening: S,
}

pub struct TooltipController<D: DismissSource = NoListeners> {
    listeners: D,
    config: TooltipConfig,
    open: Option<OpenTooltip<D::Subscription>>,
}

impl TooltipController<NoListeners> {
    pub fn new() -> Self {
        Self::with_listeners(NoListeners)
    }
}

impl Default for TooltipController<NoListeners> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DismissSource> TooltipController<D> {
    pub fn with_listeners(listeners: D) -> Self {
        Self {
            listeners,
            config: TooltipConfig::default(),
            open: None,
        }
    }

    pub fn with_config(mut self, config: TooltipConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    pub fn listeners(&self) -> &D {
        &self.listeners
    }

    /// Opens `term` under `source`, or closes it if it is already open.
    pub fn activate(&mut self, term: &str, source: Rect, viewport: Viewport) -> Transition {
        let key = normalize_key(term);
        if self.open.as_ref().is_some_and(|open| open.key == key) {
            self.open = None;
            return Transition::Closed;
        }

        let position = self.config.place(source, viewport);
        // Switching terms keeps the subscription already held.
        let listening = match self.open.take() {
            Some(previous) => previous.listening,
            None => self.listeners.subscribe(),
        };
        self.open = Some(OpenTooltip {
            term: term.trim().to_string(),
            key,
            position,
            entry: Glossary::get(term),
            listening,
        });
        Transition::Opened
    }

    pub fn dismiss(&mut self) -> Transition {
        match self.open.take() {
            Some(_) => Transition::Closed,
            None => Transition::Unchanged,
        }
    }

    /// Enter or Space on a focused term activates it; Escape closes.
    pub fn on_key_down(
        &mut self,
        key: Key,
        focused: Option<FocusedTerm<'_>>,
        viewport: Viewport,
    ) -> Transition {
        match key {
            Key::Enter | Key::Space => match focused {
                Some(target) => self.activate(target.term, target.bounds, viewport),
                None => Transition::Unchanged,
            },
            Key::Escape if self.is_open() => self.dismiss(),
            _ => Transition::Unchanged,
        }
    }

    /// Pointer-down in page coordinates. `rendered` is the panel box as
    /// measured by the host; a point outside it closes the panel.
    pub fn on_pointer_down(&mut self, point: Point, rendered: Rect) -> Transition {
        if self.is_open() && !rendered.contains(point) {
            self.dismiss()
        } else {
            Transition::Unchanged
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn active_term(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.term.as_str())
    }

    pub fn state(&self) -> TooltipState {
        match &self.open {
            Some(open) => TooltipState::Open {
                term: open.term.clone(),
                position: open.position,
            },
            None => TooltipState::Closed,
        }
    }

    pub fn panel(&self) -> Option<TooltipPanel<'_>> {
        self.open.as_ref().map(|open| TooltipPanel {
            term: &open.term,
            position: open.position,
            content: match open.entry {
                Some(entry) => PanelContent::Definition(entry),
                None => PanelContent::NotFound,
            },
        })
    }
}
