//! Grid placement engine.
//!
//! [`GridLayout`] is the constraint grid: a fixed number of columns, rows
//! growing downward, no two nodes overlapping. [`PlacementEngine`] owns the
//! authoritative widget collection and keeps it in sync with a grid bound to
//! a container.
//!
//! Every grid mutation emits a [`GridEvent`] tagged with a [`ChangeOrigin`].
//! The engine feeds those events back through [`PlacementEngine::on_change`];
//! only user-origin events that actually move something mark it dirty, so
//! loading a layout never looks like an unsaved edit.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::widgets::{WidgetConfig, GRID_COLUMNS, MAX_GRID_ROWS};

/// Grid rendering and behaviour options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub column: u32,
    /// Row height in pixels.
    pub cell_height: u32,
    /// Gap between cells in pixels.
    pub margin: u32,
    /// When `false`, nodes settle upward after every change.
    pub float: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            column: GRID_COLUMNS,
            cell_height: 100,
            margin: 8,
            float: false,
        }
    }
}

/// Where a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrigin {
    /// A drag or resize gesture.
    User,
    /// Loading, syncing or any change made by code.
    Programmatic,
}

/// New geometry of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGeometry {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Nodes whose geometry changed in one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEvent {
    pub origin: ChangeOrigin,
    pub nodes: Vec<NodeGeometry>,
}

/// Handle returned by [`GridLayout::on_change`]. Unique across all grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

static NEXT_LISTENER: AtomicU64 = AtomicU64::new(1);

/// A placed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNode {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: Option<u32>,
    pub min_h: Option<u32>,
    pub max_w: Option<u32>,
    pub max_h: Option<u32>,
    pub locked: bool,
}

impl GridNode {
    fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }

    fn geometry(&self) -> NodeGeometry {
        NodeGeometry {
            id: self.id.clone(),
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

impl Rect {
    fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    fn overlaps_columns(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_columns(other) && self.y < other.bottom() && other.y < self.bottom()
    }
}

// ---------------------------------------------------------------------------
// GridLayout
// ---------------------------------------------------------------------------

/// The constraint grid.
#[derive(Debug)]
pub struct GridLayout {
    options: GridOptions,
    nodes: Vec<GridNode>,
    listeners: BTreeMap<ListenerId, Vec<GridEvent>>,
}

impl GridLayout {
    pub fn new(options: GridOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            listeners: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&GridNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Attach a listener. Events emitted from now on are queued for it.
    pub fn on_change(&mut self) -> ListenerId {
        let id = ListenerId(NEXT_LISTENER.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, Vec::new());
        id
    }

    /// Detach a listener and drop its queued events.
    pub fn off(&mut self, listener: ListenerId) -> bool {
        self.listeners.remove(&listener).is_some()
    }

    /// Drain the events queued for `listener`. Empty for unknown listeners.
    pub fn take_events(&mut self, listener: ListenerId) -> Vec<GridEvent> {
        self.listeners
            .get_mut(&listener)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Add a node for `widget`. A widget without both `x` and `y` is placed
    /// in the first open slot. Returns `false` if the id is already present.
    pub fn add_node(&mut self, widget: &WidgetConfig, origin: ChangeOrigin) -> bool {
        if self.node(&widget.id).is_some() {
            return false;
        }
        let before = self.snapshot();
        self.insert(widget);
        self.settle(Some(&widget.id));
        self.emit(origin, &before);
        true
    }

    /// Add many nodes as one change.
    pub fn load(&mut self, widgets: &[WidgetConfig], origin: ChangeOrigin) {
        let before = self.snapshot();
        for widget in widgets {
            if self.node(&widget.id).is_none() {
                self.insert(widget);
                self.settle(Some(&widget.id));
            }
        }
        self.emit(origin, &before);
    }

    /// Move a node. The moved node wins its target cell; anything it lands
    /// on is pushed down. Locked nodes do not move.
    pub fn move_node(&mut self, id: &str, x: u32, y: u32, origin: ChangeOrigin) -> bool {
        let column = self.options.column;
        let Some(pos) = self.position(id) else {
            return false;
        };
        if self.nodes[pos].locked {
            return true;
        }
        let before = self.snapshot();
        let node = &mut self.nodes[pos];
        node.x = x.min(column.saturating_sub(node.w));
        node.y = y.min(MAX_GRID_ROWS);
        self.settle(Some(id));
        self.emit(origin, &before);
        true
    }

    /// Resize a node, clamped to its bounds and the column count.
    pub fn resize_node(&mut self, id: &str, w: u32, h: u32, origin: ChangeOrigin) -> bool {
        let column = self.options.column;
        let Some(pos) = self.position(id) else {
            return false;
        };
        if self.nodes[pos].locked {
            return true;
        }
        let before = self.snapshot();
        let node = &mut self.nodes[pos];
        node.w = clamp_span(w, node.min_w, node.max_w, column);
        node.h = clamp_span(h, node.min_h, node.max_h, MAX_GRID_ROWS);
        node.x = node.x.min(column.saturating_sub(node.w));
        self.settle(Some(id));
        self.emit(origin, &before);
        true
    }

    pub fn remove_node(&mut self, id: &str, origin: ChangeOrigin) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let before = self.snapshot();
        self.nodes.remove(pos);
        self.settle(None);
        self.emit(origin, &before);
        true
    }

    pub fn remove_all(&mut self, origin: ChangeOrigin) {
        let before = self.snapshot();
        self.nodes.clear();
        self.emit(origin, &before);
    }

    // -- internals ----------------------------------------------------------

    fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Stored geometry is clamped into the grid: within the columns, no
    /// taller than [`MAX_GRID_ROWS`] and starting no lower than it.
    fn insert(&mut self, widget: &WidgetConfig) {
        let column = self.options.column;
        let w = clamp_span(widget.w, widget.min_w, widget.max_w, column);
        let h = clamp_span(widget.h, widget.min_h, widget.max_h, MAX_GRID_ROWS);
        let (x, y) = match (widget.x, widget.y) {
            (Some(x), Some(y)) => (x.min(column.saturating_sub(w)), y.min(MAX_GRID_ROWS)),
            _ => self.first_open_slot(w, h),
        };
        self.nodes.push(GridNode {
            id: widget.id.clone(),
            x,
            y,
            w,
            h,
            min_w: widget.min_w,
            min_h: widget.min_h,
            max_w: widget.max_w,
            max_h: widget.max_h,
            locked: widget.is_locked(),
        });
    }

    /// Scan rows top-down, columns left-right.
    ///
    /// The topmost free slot is either row 0 or directly under some node, so
    /// only those rows are tried. Below every node there is always room.
    fn first_open_slot(&self, w: u32, h: u32) -> (u32, u32) {
        let max_x = self.options.column.saturating_sub(w);
        let mut rows: Vec<u32> = std::iter::once(0)
            .chain(self.nodes.iter().map(|n| n.rect().bottom()))
            .collect();
        rows.sort_unstable();
        rows.dedup();
        for &y in &rows {
            for x in 0..=max_x {
                let candidate = Rect { x, y, w, h };
                if !self.nodes.iter().any(|n| n.rect().overlaps(&candidate)) {
                    return (x, y);
                }
            }
        }
        (0, rows.last().copied().unwrap_or(0))
    }

    /// Resolve overlaps, then compact upward unless floating.
    ///
    /// Locked nodes are placed first, then `priority`, then everything else
    /// in reading order. Each node drops below whatever it overlaps among
    /// the nodes already placed, so a locked node only moves when it lands
    /// on an earlier locked node.
    fn settle(&mut self, priority: Option<&str>) {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&i| {
            let n = &self.nodes[i];
            let rank = if n.locked {
                0
            } else if Some(n.id.as_str()) == priority {
                1
            } else {
                2
            };
            (rank, n.y, n.x)
        });

        let mut placed: Vec<usize> = Vec::with_capacity(order.len());
        for i in order {
            loop {
                let rect = self.nodes[i].rect();
                let bottom = placed
                    .iter()
                    .map(|&j| self.nodes[j].rect())
                    .filter(|other| other.overlaps(&rect))
                    .map(|other| other.bottom())
                    .max();
                match bottom {
                    Some(bottom) if bottom > rect.y => self.nodes[i].y = bottom,
                    _ => break,
                }
            }
            placed.push(i);
        }

        if !self.options.float {
            self.compact();
        }
    }

    fn compact(&mut self) {
        let mut order: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| !self.nodes[i].locked)
            .collect();
        order.sort_by_key(|&i| (self.nodes[i].y, self.nodes[i].x));

        // Each node rises straight to the lowest bottom edge above it in
        // its columns.
        for i in order {
            let rect = self.nodes[i].rect();
            let floor = self
                .nodes
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, n)| n.rect())
                .filter(|other| other.overlaps_columns(&rect) && other.bottom() <= rect.y)
                .map(|other| other.bottom())
                .max()
                .unwrap_or(0);
            self.nodes[i].y = floor;
        }
    }

    fn snapshot(&self) -> HashMap<String, Rect> {
        self.nodes.iter().map(|n| (n.id.clone(), n.rect())).collect()
    }

    fn emit(&mut self, origin: ChangeOrigin, before: &HashMap<String, Rect>) {
        let changed: Vec<NodeGeometry> = self
            .nodes
            .iter()
            .filter(|n| before.get(&n.id) != Some(&n.rect()))
            .map(GridNode::geometry)
            .collect();
        if changed.is_empty() {
            return;
        }
        let event = GridEvent {
            origin,
            nodes: changed,
        };
        for queue in self.listeners.values_mut() {
            queue.push(event.clone());
        }
    }
}

fn clamp_span(value: u32, min: Option<u32>, max: Option<u32>, limit: u32) -> u32 {
    let upper = max.unwrap_or(limit).min(limit).max(1);
    let lower = min.unwrap_or(1).clamp(1, upper);
    value.clamp(lower, upper)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Copy `x/y/w/h` from `changes` onto the widgets with matching ids.
///
/// Widgets absent from `changes` keep their geometry; order is untouched;
/// no other field is written. Returns whether any widget changed.
pub fn reconcile(widgets: &mut [WidgetConfig], changes: &[NodeGeometry]) -> bool {
    let by_id: HashMap<&str, &NodeGeometry> = changes.iter().map(|g| (g.id.as_str(), g)).collect();
    let mut changed = false;
    for widget in widgets.iter_mut() {
        let Some(geometry) = by_id.get(widget.id.as_str()) else {
            continue;
        };
        let next = (Some(geometry.x), Some(geometry.y), geometry.w, geometry.h);
        if (widget.x, widget.y, widget.w, widget.h) != next {
            widget.x = next.0;
            widget.y = next.1;
            widget.w = next.2;
            widget.h = next.3;
            changed = true;
        }
    }
    changed
}

// ---------------------------------------------------------------------------
// PlacementEngine
// ---------------------------------------------------------------------------

/// Identifies the surface a grid is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(pub String);

impl From<&str> for ContainerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug)]
struct Binding {
    container: ContainerId,
    grid: GridLayout,
    listener: ListenerId,
}

/// Authoritative widget collection kept in sync with a bound grid.
#[derive(Debug)]
pub struct PlacementEngine {
    options: GridOptions,
    widgets: Vec<WidgetConfig>,
    index: HashMap<String, usize>,
    binding: Option<Binding>,
    dirty: bool,
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new(GridOptions::default())
    }
}

impl PlacementEngine {
    pub fn new(options: GridOptions) -> Self {
        Self {
            options,
            widgets: Vec::new(),
            index: HashMap::new(),
            binding: None,
            dirty: false,
        }
    }

    /// Bind a grid to `container` and load `widgets` into it.
    ///
    /// A grid bound to another container is destroyed first and its listener
    /// detached, so its events can no longer reach the engine. Re-running on
    /// the same container resyncs the existing grid. Never marks dirty.
    pub fn initialize(&mut self, container: impl Into<ContainerId>, widgets: Vec<WidgetConfig>) {
        let container = container.into();
        let same_container = self
            .binding
            .as_ref()
            .is_some_and(|b| b.container == container);
        if same_container {
            if let Some(binding) = self.binding.as_mut() {
                binding.grid.remove_all(ChangeOrigin::Programmatic);
            }
        } else {
            self.detach();
            let mut grid = GridLayout::new(self.options);
            let listener = grid.on_change();
            self.binding = Some(Binding {
                container,
                grid,
                listener,
            });
        }
        self.set_widgets(widgets);
        if let Some(binding) = self.binding.as_mut() {
            binding.grid.load(&self.widgets, ChangeOrigin::Programmatic);
        }
        self.pump();
    }

    /// Destroy the bound grid, if any. The widget collection is kept.
    pub fn detach(&mut self) {
        if let Some(mut old) = self.binding.take() {
            old.grid.off(old.listener);
            tracing::debug!(container = %old.container.0, "Detached grid");
        }
    }

    /// Apply a grid change event received by `listener`.
    ///
    /// Events for any listener other than the current binding's are stale
    /// and ignored.
    pub fn on_change(&mut self, listener: ListenerId, event: &GridEvent) {
        if self.listener() != Some(listener) {
            tracing::debug!(?listener, "Ignoring event from stale grid listener");
            return;
        }
        let changed = reconcile(&mut self.widgets, &event.nodes);
        if changed && event.origin == ChangeOrigin::User {
            self.dirty = true;
        }
    }

    /// Append a widget and let the grid place it. Duplicate ids are ignored.
    pub fn add_widget(&mut self, widget: WidgetConfig) -> bool {
        if self.index.contains_key(&widget.id) {
            return false;
        }
        self.index.insert(widget.id.clone(), self.widgets.len());
        if let Some(binding) = self.binding.as_mut() {
            binding.grid.add_node(&widget, ChangeOrigin::Programmatic);
        }
        self.widgets.push(widget);
        self.pump();
        self.dirty = true;
        true
    }

    pub fn remove_widget(&mut self, id: &str) -> bool {
        let Some(pos) = self.index.get(id).copied() else {
            return false;
        };
        self.widgets.remove(pos);
        self.rebuild_index();
        if let Some(binding) = self.binding.as_mut() {
            binding.grid.remove_node(id, ChangeOrigin::Programmatic);
        }
        self.pump();
        self.dirty = true;
        true
    }

    /// Remove every widget from the collection and the grid.
    pub fn clear_all(&mut self) {
        self.widgets.clear();
        self.index.clear();
        if let Some(binding) = self.binding.as_mut() {
            binding.grid.remove_all(ChangeOrigin::Programmatic);
        }
        self.pump();
        self.dirty = true;
    }

    /// User drag gesture.
    pub fn drag(&mut self, id: &str, x: u32, y: u32) -> bool {
        if !self.index.contains_key(id) {
            return false;
        }
        if let Some(binding) = self.binding.as_mut() {
            binding.grid.move_node(id, x, y, ChangeOrigin::User);
        }
        self.pump();
        true
    }

    /// User resize gesture.
    pub fn resize(&mut self, id: &str, w: u32, h: u32) -> bool {
        if !self.index.contains_key(id) {
            return false;
        }
        if let Some(binding) = self.binding.as_mut() {
            binding.grid.resize_node(id, w, h, ChangeOrigin::User);
        }
        self.pump();
        true
    }

    /// Replace the collection with freshly loaded widgets. Leaves the engine
    /// clean.
    pub fn replace_all(&mut self, widgets: Vec<WidgetConfig>) {
        self.set_widgets(widgets);
        if let Some(binding) = self.binding.as_mut() {
            binding.grid.remove_all(ChangeOrigin::Programmatic);
            binding.grid.load(&self.widgets, ChangeOrigin::Programmatic);
        }
        self.pump();
        self.dirty = false;
    }

    /// Replace a widget's data bag.
    pub fn update_data(
        &mut self,
        id: &str,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> bool {
        let Some(widget) = self.get_mut(id) else {
            return false;
        };
        widget.data = Some(data);
        self.dirty = true;
        true
    }

    pub fn set_title(&mut self, id: &str, title: impl Into<String>) -> bool {
        let Some(widget) = self.get_mut(id) else {
            return false;
        };
        widget.title = title.into();
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn widgets(&self) -> &[WidgetConfig] {
        &self.widgets
    }

    pub fn get(&self, id: &str) -> Option<&WidgetConfig> {
        self.index.get(id).map(|&i| &self.widgets[i])
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn container(&self) -> Option<&ContainerId> {
        self.binding.as_ref().map(|b| &b.container)
    }

    /// Listener of the currently bound grid.
    pub fn listener(&self) -> Option<ListenerId> {
        self.binding.as_ref().map(|b| b.listener)
    }

    pub fn grid(&self) -> Option<&GridLayout> {
        self.binding.as_ref().map(|b| &b.grid)
    }

    // -- internals ----------------------------------------------------------

    fn get_mut(&mut self, id: &str) -> Option<&mut WidgetConfig> {
        let pos = *self.index.get(id)?;
        self.widgets.get_mut(pos)
    }

    /// Store `widgets`, keeping the first occurrence of a repeated id.
    fn set_widgets(&mut self, widgets: Vec<WidgetConfig>) {
        self.widgets.clear();
        self.index.clear();
        for widget in widgets {
            if self.index.contains_key(&widget.id) {
                tracing::warn!(widget_id = %widget.id, "Dropping widget with duplicate id");
                continue;
            }
            self.index.insert(widget.id.clone(), self.widgets.len());
            self.widgets.push(widget);
        }
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .widgets
            .iter()
            .enumerate()
            .map(|(i, w)| (w.id.clone(), i))
            .collect();
    }

    /// Feed the bound grid's queued events back through `on_change`.
    fn pump(&mut self) {
        let Some(binding) = self.binding.as_mut() else {
            return;
        };
        let listener = binding.listener;
        let events = binding.grid.take_events(listener);
        for event in &events {
            self.on_change(listener, event);
        }
    }
}
