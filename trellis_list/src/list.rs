// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The virtualized list element.
//!
//! `List` is a composite that never materializes children eagerly. A
//! per-cell table holds each cell's cumulative main-axis offset and
//! extent; elements exist only for cells that have intersected the clip
//! window. The table is the prefix sum of the composer's cell sizes, so
//! for every cell `i`, `cells[i].pos == Σ extents[..i]`, and the total
//! main-axis size is the last cell's `pos + extent`.
//!
//! The draw pass binary-searches the table for the first cell whose
//! trailing edge reaches the clip's leading edge (the virtualization
//! cut-in point), walks forward materializing and re-laying-out only
//! cells whose cached layout generation is stale, and stops past the
//! clip's trailing edge. Cells that fell out of the window since the last
//! pass have their generation invalidated; under the default
//! [`CellRetention::Recycle`] policy their elements are dropped too.
//!
//! Mutations are two-phase: `insert`/`erase`/`move_to` record a command
//! and defer to the next synchronization point, where the composer's
//! backing storage is resized first (so its length reflects the new
//! count) and the table is spliced and reflowed. This keeps the cell
//! count stable for the whole of any draw or dispatch pass.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;

use trellis_element::composite::{Composite, CompositeState};
use trellis_element::context::Context;
use trellis_element::element::{
    DropTarget, Element, ElementBox, Focusable, FocusRequest, Keyboard, Limits, Pointer,
    intersects,
};
use trellis_element::events::{CursorStatus, DropInfo, KeyEvent, MouseButton, TextEvent};
use trellis_element::surface::Surface;

use crate::axis::Axis;
use crate::composer::CellComposer;
use crate::index_ops::{erase_indices, move_indices};

/// Marks a cell whose cached layout never matches the live generation.
const STALE: u64 = 0;

/// What happens to a cell's element when it leaves the visible window.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellRetention {
    /// Drop the element; recompose if the cell scrolls back in.
    Recycle,
    /// Keep the element alive, only its cached layout is invalidated.
    Keep,
}

/// One table entry per logical cell.
struct CellInfo {
    /// Cumulative main-axis offset from the list's leading edge.
    pos: f64,
    /// Main-axis extent.
    extent: f64,
    /// The materialized element, absent until first needed or evicted.
    element: Option<ElementBox>,
    /// Generation the element was last laid out at.
    layout_id: u64,
}

impl CellInfo {
    fn fresh(pos: f64, extent: f64) -> Self {
        Self {
            pos,
            extent,
            element: None,
            layout_id: STALE,
        }
    }
}

impl fmt::Debug for CellInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellInfo")
            .field("pos", &self.pos)
            .field("extent", &self.extent)
            .field("materialized", &self.element.is_some())
            .field("layout_id", &self.layout_id)
            .finish()
    }
}

/// A queued structural mutation, drained at the next sync point.
#[derive(Clone, Debug)]
enum ListOp {
    Insert {
        pos: usize,
        count: usize,
    },
    Erase {
        indices: SmallVec<[usize; 8]>,
    },
    Move {
        pos: usize,
        indices: SmallVec<[usize; 8]>,
    },
}

/// A virtualized list over a [`CellComposer`].
///
/// ```
/// use kurbo::{Point, Rect};
/// use trellis_element::composite::Composite;
/// use trellis_element::context::Context;
/// use trellis_element::element::{Element, boxed};
/// use trellis_element::headless::HeadlessView;
/// use trellis_element::surface::Recorder;
/// use trellis_list::axis::AxisLimits;
/// use trellis_list::composer::{FnContent, WithLimits};
/// use trellis_list::list::List;
///
/// struct Row;
/// impl Element for Row {}
///
/// // 1000 rows of 20 units each, but only the rows inside the 100-unit
/// // viewport ever get composed.
/// let composer = WithLimits::new(FnContent::new(1000, |_| boxed(Row)), 20.0, AxisLimits::FULL);
/// let mut list = List::vertical(Box::new(composer));
///
/// let view = HeadlessView::new();
/// let viewport = Rect::new(0.0, 0.0, 200.0, 100.0);
/// let ctx = Context::root(&view, Rect::new(0.0, 0.0, 200.0, 20_000.0));
/// let mut surface = Recorder::new(viewport);
///
/// list.draw(&ctx, &mut surface);
/// assert_eq!(list.len(), 1000);
/// assert_eq!(list.materialized(), 5);
/// ```
pub struct List {
    composer: Box<dyn CellComposer>,
    axis: Axis,
    retention: CellRetention,

    cells: Vec<CellInfo>,
    main_axis_full_size: f64,
    /// Layout generation; bumped whenever the table is rebuilt or the
    /// list's own allocated size changes.
    layout_id: u64,

    update_request: bool,
    queue: Vec<ListOp>,

    previous_size: Size,
    previous_window: (usize, usize),

    state: CompositeState,
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("axis", &self.axis)
            .field("cells", &self.cells.len())
            .field("materialized", &self.materialized())
            .field("main_axis_full_size", &self.main_axis_full_size)
            .field("layout_id", &self.layout_id)
            .field("update_request", &self.update_request)
            .field("previous_window", &self.previous_window)
            .finish_non_exhaustive()
    }
}

impl List {
    /// A vertical list (rows, scrolling along Y).
    #[must_use]
    pub fn vertical(composer: Box<dyn CellComposer>) -> Self {
        Self::new(composer, Axis::Vertical)
    }

    /// A horizontal list (columns, scrolling along X).
    #[must_use]
    pub fn horizontal(composer: Box<dyn CellComposer>) -> Self {
        Self::new(composer, Axis::Horizontal)
    }

    fn new(composer: Box<dyn CellComposer>, axis: Axis) -> Self {
        Self {
            composer,
            axis,
            retention: CellRetention::Recycle,
            cells: Vec::new(),
            main_axis_full_size: 0.0,
            layout_id: STALE + 1,
            update_request: true,
            queue: Vec::new(),
            previous_size: Size::ZERO,
            previous_window: (0, 0),
            state: CompositeState::new(),
        }
    }

    /// Change the off-window retention policy.
    #[must_use]
    pub fn with_retention(mut self, retention: CellRetention) -> Self {
        self.retention = retention;
        self
    }

    /// The list's orientation.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The composer supplying cell content.
    #[must_use]
    pub fn composer(&self) -> &dyn CellComposer {
        &*self.composer
    }

    /// Mutable composer access. After changing content through this,
    /// call [`List::update`] so the cell table is rebuilt.
    pub fn composer_mut(&mut self) -> &mut dyn CellComposer {
        &mut *self.composer
    }

    /// Total extent along the main axis, valid after the last sync.
    #[must_use]
    pub fn main_axis_full_size(&self) -> f64 {
        self.main_axis_full_size
    }

    /// Number of cells currently holding a live element.
    #[must_use]
    pub fn materialized(&self) -> usize {
        self.cells.iter().filter(|c| c.element.is_some()).count()
    }

    /// The cell's cumulative offset, for inspection and tests.
    #[must_use]
    pub fn cell_offset(&self, ix: usize) -> f64 {
        self.cells[ix].pos
    }

    /// The cell's main-axis extent, for inspection and tests.
    #[must_use]
    pub fn cell_extent(&self, ix: usize) -> f64 {
        self.cells[ix].extent
    }

    /// Whether the cell currently holds a live element.
    #[must_use]
    pub fn is_materialized(&self, ix: usize) -> bool {
        self.cells.get(ix).is_some_and(|c| c.element.is_some())
    }

    /// Drop the whole cell table and rebuild it at the next sync point.
    ///
    /// Call after mutating content behind the composer (count, order, or
    /// sizes). Materialized elements are discarded.
    pub fn update(&mut self) {
        self.update_request = true;
        self.cells.clear();
        self.main_axis_full_size = 0.0;
    }

    /// Resize the composer's backing content and request a rebuild.
    pub fn resize(&mut self, n: usize) {
        self.composer.resize(n);
        self.update();
    }

    /// Remove all cells.
    pub fn clear(&mut self) {
        self.resize(0);
    }

    /// Queue an insertion of `count` cells in front of `pos`.
    ///
    /// `pos` is clamped into `0..=len()`; the mutation is applied at the
    /// next sync point.
    pub fn insert(&mut self, pos: usize, count: usize) {
        if count == 0 {
            return;
        }
        let pos = pos.min(self.cells.len());
        self.queue.push(ListOp::Insert { pos, count });
    }

    /// Queue removal of the cells at `indices`.
    ///
    /// Out-of-range and duplicate indices are dropped at this boundary;
    /// the mutation is applied at the next sync point.
    pub fn erase(&mut self, indices: &[usize]) {
        let indices = self.normalize(indices);
        if !indices.is_empty() {
            self.queue.push(ListOp::Erase { indices });
        }
    }

    /// Queue a move of the cells at `indices` to sit in front of `pos`.
    ///
    /// Moved cells keep their relative order; the destination counts
    /// against the sequence with the moved cells removed. The composer's
    /// backing content is expected to be reordered the same way by the
    /// application before the next sync.
    pub fn move_to(&mut self, pos: usize, indices: &[usize]) {
        let pos = pos.min(self.cells.len());
        let indices = self.normalize(indices);
        if !indices.is_empty() {
            self.queue.push(ListOp::Move { pos, indices });
        }
    }

    /// Sort, dedup, and range-check a caller-supplied index list.
    fn normalize(&self, indices: &[usize]) -> SmallVec<[usize; 8]> {
        let len = self.cells.len();
        let mut out: SmallVec<[usize; 8]> =
            indices.iter().copied().filter(|&ix| ix < len).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Bring the cell table up to date: run a pending rebuild, then drain
    /// queued mutations in arrival order.
    ///
    /// Every public pass (limits, draw, input dispatch) funnels through
    /// here first, so the cell count is stable for the rest of the pass.
    pub fn sync(&mut self, ctx: &Context<'_>) {
        if self.update_request {
            self.rebuild(ctx);
        }
        if self.queue.is_empty() {
            return;
        }
        let queue = core::mem::take(&mut self.queue);
        for op in queue {
            match op {
                ListOp::Insert { pos, count } => self.apply_insert(ctx, pos, count),
                ListOp::Erase { indices } => self.apply_erase(ctx, &indices),
                ListOp::Move { pos, indices } => self.apply_move(ctx, pos, &indices),
            }
        }
    }

    /// Rebuild the offset table in O(n) without materializing anything.
    fn rebuild(&mut self, ctx: &Context<'_>) {
        let len = self.composer.len();
        self.cells.clear();
        self.cells.reserve(len);
        let mut pos = 0.0;
        for i in 0..len {
            let extent = self.composer.main_axis_size(i, ctx);
            self.cells.push(CellInfo::fresh(pos, extent));
            pos += extent;
        }
        self.main_axis_full_size = pos;
        self.layout_id += 1;
        self.update_request = false;
    }

    /// Recompute offsets and extents in place, preserving materialized
    /// elements.
    fn reflow(&mut self, ctx: &Context<'_>) {
        let mut pos = 0.0;
        for i in 0..self.cells.len() {
            let extent = self.composer.main_axis_size(i, ctx);
            self.cells[i].pos = pos;
            self.cells[i].extent = extent;
            pos += extent;
        }
        self.main_axis_full_size = pos;
        self.layout_id += 1;
    }

    fn apply_insert(&mut self, ctx: &Context<'_>, pos: usize, count: usize) {
        self.composer.resize(self.composer.len() + count);
        let pos = pos.min(self.cells.len());
        let tail: Vec<CellInfo> = self.cells.split_off(pos);
        self.cells
            .extend((0..count).map(|_| CellInfo::fresh(0.0, 0.0)));
        self.cells.extend(tail);
        self.reflow(ctx);
    }

    fn apply_erase(&mut self, ctx: &Context<'_>, indices: &[usize]) {
        let len = self.composer.len();
        self.composer
            .resize(len.saturating_sub(indices.len()));
        erase_indices(&mut self.cells, indices);
        self.reflow(ctx);
    }

    fn apply_move(&mut self, ctx: &Context<'_>, pos: usize, indices: &[usize]) {
        move_indices(&mut self.cells, pos, indices);
        self.reflow(ctx);
    }

    /// Materialize the element for `ix` (without laying it out) and hand
    /// it back.
    fn cell_element(&mut self, ix: usize) -> &mut dyn Element {
        debug_assert!(ix < self.cells.len(), "cell index out of range");
        if self.cells[ix].element.is_none() {
            self.cells[ix].element = Some(self.composer.compose(ix));
        }
        self.cells[ix]
            .element
            .as_deref_mut()
            .expect("cell was just materialized")
    }

    /// The virtualized draw walk described in the module docs.
    fn draw_cells(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        let clip = surface.clip_extent();
        if !intersects(ctx.bounds, clip) {
            return;
        }

        let axis = self.axis;
        let origin = axis.main_start(ctx.bounds);
        let clip_start = axis.main_start(clip) - origin;
        let clip_end = axis.main_end(clip);

        // O(log n) skip to the first cell whose trailing edge reaches the
        // clip; the table is sorted by cumulative position.
        let start = self
            .cells
            .partition_point(|cell| cell.pos + cell.extent < clip_start);

        let generation = self.layout_id;
        let mut ix = start;
        let mut end = start;
        while ix < self.cells.len() {
            let cell_bounds = axis.cell_bounds(ctx.bounds, self.cells[ix].pos, self.cells[ix].extent);
            if intersects(cell_bounds, clip) {
                let cctx = ctx.child(cell_bounds);
                if self.cells[ix].element.is_none() || self.cells[ix].layout_id != generation {
                    let element = self.cell_element(ix);
                    element.layout(&cctx);
                    self.cells[ix].layout_id = generation;
                }
                if let Some(element) = self.cells[ix].element.as_deref_mut() {
                    element.draw(&cctx, surface);
                }
            }
            if axis.main_start(cell_bounds) > clip_end {
                break;
            }
            ix += 1;
            end = ix;
        }

        self.evict_outside(start, end);
        self.previous_window = (start, end);
        self.previous_size = ctx.bounds.size();
    }

    /// Invalidate (and, under `Recycle`, free) cells that were in the
    /// previous window but fell outside the new one.
    fn evict_outside(&mut self, start: usize, end: usize) {
        let (prev_start, prev_end) = self.previous_window;
        if (start, end) == (prev_start, prev_end) {
            return;
        }
        for i in prev_start..prev_end {
            if (i < start || i >= end) && i < self.cells.len() {
                self.cells[i].layout_id = STALE;
                if self.retention == CellRetention::Recycle {
                    self.cells[i].element = None;
                }
            }
        }
    }
}

impl Composite for List {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn child(&mut self, ix: usize) -> &mut dyn Element {
        self.cell_element(ix)
    }

    fn bounds_of(&self, ctx: &Context<'_>, ix: usize) -> Rect {
        debug_assert!(ix < self.cells.len(), "cell index out of range");
        self.axis
            .cell_bounds(ctx.bounds, self.cells[ix].pos, self.cells[ix].extent)
    }

    fn state(&mut self) -> &mut CompositeState {
        &mut self.state
    }

    /// Linear scan as in the generic composite, with the sorted-table
    /// early exit: once a cell starts past the point nothing later can
    /// contain it.
    fn hit_element(&mut self, ctx: &Context<'_>, p: Point, control: bool) -> Option<(usize, Rect)> {
        let target = self.axis.main_pos(p) - self.axis.main_start(ctx.bounds);
        for ix in 0..self.cells.len() {
            if self.cells[ix].pos > target {
                break;
            }
            if let Some(hit) = self.hit_child(ctx, p, control, ix) {
                return Some(hit);
            }
        }
        None
    }
}

impl Element for List {
    fn limits(&mut self, ctx: &Context<'_>) -> Limits {
        self.sync(ctx);
        let secondary = self.composer.secondary_axis_limits(ctx);
        self.axis.make_limits(self.main_axis_full_size, secondary)
    }

    fn layout(&mut self, ctx: &Context<'_>) {
        // A new allocation invalidates every cached cell layout; an
        // unrelated redraw at the same size does not.
        if self.previous_size != ctx.bounds.size() {
            self.previous_size = ctx.bounds.size();
            self.layout_id += 1;
        }
    }

    fn draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        self.sync(ctx);
        self.draw_cells(ctx, surface);
    }

    fn hit_test(&mut self, ctx: &Context<'_>, p: Point, leaf: bool, control: bool) -> bool {
        if leaf {
            self.sync(ctx);
            self.hit_element(ctx, p, control).is_some()
        } else {
            (!control || self.wants_control()) && ctx.bounds.contains(p)
        }
    }

    fn wants_control(&self) -> bool {
        // Virtualized cells are assumed interactive; per-cell filtering
        // happens in `hit_element` against the cells actually touched.
        true
    }

    fn pointer(&mut self) -> Option<&mut dyn Pointer> {
        Some(self)
    }

    fn keyboard(&mut self) -> Option<&mut dyn Keyboard> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn drop_target(&mut self) -> Option<&mut dyn DropTarget> {
        Some(self)
    }
}

// The capability impls sync the cell table before dispatching, so events
// arriving between draws still see a stable, current cell count.

impl Pointer for List {
    fn click(&mut self, ctx: &Context<'_>, ev: &MouseButton) -> bool {
        self.sync(ctx);
        self.composite_click(ctx, ev)
    }

    fn drag(&mut self, ctx: &Context<'_>, ev: &MouseButton) {
        self.sync(ctx);
        self.composite_drag(ctx, ev);
    }

    fn cursor(&mut self, ctx: &Context<'_>, p: Point, status: CursorStatus) -> bool {
        self.sync(ctx);
        self.composite_cursor(ctx, p, status)
    }

    fn scroll(&mut self, ctx: &Context<'_>, dir: Vec2, p: Point) -> bool {
        self.sync(ctx);
        self.composite_scroll(ctx, dir, p)
    }
}

impl Keyboard for List {
    fn key(&mut self, ctx: &Context<'_>, ev: &KeyEvent) -> bool {
        self.sync(ctx);
        self.composite_key(ctx, ev)
    }

    fn text(&mut self, ctx: &Context<'_>, ev: &TextEvent) -> bool {
        self.sync(ctx);
        self.composite_text(ctx, ev)
    }
}

impl Focusable for List {
    fn wants_focus(&mut self) -> bool {
        // Scanning every cell would materialize the whole list; a
        // non-empty list claims focus and the begin-focus scan touches
        // only what it must.
        !self.cells.is_empty()
    }

    fn begin_focus(&mut self, req: FocusRequest) -> bool {
        self.composite_begin_focus(req)
    }

    fn end_focus(&mut self, ctx: &Context<'_>) {
        self.composite_end_focus(ctx);
    }
}

impl DropTarget for List {
    fn track_drop(&mut self, ctx: &Context<'_>, info: &DropInfo, status: CursorStatus) -> bool {
        self.sync(ctx);
        self.composite_track_drop(ctx, info, status)
    }

    fn drop(&mut self, ctx: &Context<'_>, info: &DropInfo) -> bool {
        self.sync(ctx);
        self.composite_drop(ctx, info)
    }
}
