// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scenario tests driving the virtualized list through the public
//! element protocol: exact materialization windows, hover episode
//! bookkeeping, gesture tracking, and structural mutations.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};

use trellis_element::composite::Composite;
use trellis_element::context::Context;
use trellis_element::element::{Element, ElementBox, Pointer, boxed, intersects};
use trellis_element::events::{CursorStatus, MouseButton};
use trellis_element::headless::HeadlessView;
use trellis_element::surface::Recorder;
use trellis_list::axis::AxisLimits;
use trellis_list::composer::{CellComposer, FnContent, WithLimits};
use trellis_list::index_ops::move_indices;
use trellis_list::list::List;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ev {
    Enter(usize),
    Hover(usize),
    Leave(usize),
    Down(usize),
    Up(usize),
    Drag(usize),
}

type Log = Rc<RefCell<Vec<Ev>>>;

/// A control cell that logs every pointer interaction it receives.
struct LoggingCell {
    ix: usize,
    log: Log,
}

impl Element for LoggingCell {
    fn wants_control(&self) -> bool {
        true
    }

    fn pointer(&mut self) -> Option<&mut dyn Pointer> {
        Some(self)
    }
}

impl Pointer for LoggingCell {
    fn click(&mut self, _ctx: &Context<'_>, ev: &MouseButton) -> bool {
        self.log.borrow_mut().push(if ev.down {
            Ev::Down(self.ix)
        } else {
            Ev::Up(self.ix)
        });
        true
    }

    fn drag(&mut self, _ctx: &Context<'_>, _ev: &MouseButton) {
        self.log.borrow_mut().push(Ev::Drag(self.ix));
    }

    fn cursor(&mut self, _ctx: &Context<'_>, _p: Point, status: CursorStatus) -> bool {
        self.log.borrow_mut().push(match status {
            CursorStatus::Entering => Ev::Enter(self.ix),
            CursorStatus::Hovering => Ev::Hover(self.ix),
            CursorStatus::Leaving => Ev::Leave(self.ix),
        });
        true
    }
}

fn logging_list(count: usize, height: f64) -> (List, Log) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let cells = log.clone();
    let content = FnContent::new(count, move |ix| -> ElementBox {
        boxed(LoggingCell {
            ix,
            log: cells.clone(),
        })
    });
    let composer = WithLimits::new(content, height, AxisLimits::FULL);
    (List::vertical(Box::new(composer)), log)
}

#[test]
fn materialized_set_matches_clip_exactly() {
    let view = HeadlessView::new();
    let bounds = Rect::new(0.0, 0.0, 100.0, 2000.0);
    let ctx = Context::root(&view, bounds);
    let (mut list, _log) = logging_list(100, 20.0);

    let window = Rect::new(0.0, 130.0, 100.0, 230.0);
    let mut surface = Recorder::new(window);
    list.draw(&ctx, &mut surface);

    for ix in 0..list.len() {
        let cell = Rect::new(0.0, 20.0 * ix as f64, 100.0, 20.0 * (ix + 1) as f64);
        assert_eq!(
            list.is_materialized(ix),
            intersects(cell, window),
            "cell {ix} materialization does not match the clip window"
        );
    }
}

#[test]
fn repeated_draws_at_one_position_are_stable() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 2000.0));
    let (mut list, _log) = logging_list(100, 20.0);

    let window = Rect::new(0.0, 400.0, 100.0, 500.0);
    let mut surface = Recorder::new(window);
    list.draw(&ctx, &mut surface);
    let first = list.materialized();
    let mut surface = Recorder::new(window);
    list.draw(&ctx, &mut surface);
    assert_eq!(list.materialized(), first);
}

#[test]
fn hover_episode_is_enter_hover_leave() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 2000.0));
    let (mut list, log) = logging_list(10, 20.0);

    // Move within cell 0, cross into cell 1, then leave the list.
    list.cursor(&ctx, Point::new(50.0, 5.0), CursorStatus::Hovering);
    list.cursor(&ctx, Point::new(50.0, 15.0), CursorStatus::Hovering);
    list.cursor(&ctx, Point::new(50.0, 25.0), CursorStatus::Hovering);
    list.cursor(&ctx, Point::new(50.0, 25.0), CursorStatus::Leaving);

    assert_eq!(
        log.borrow().as_slice(),
        &[
            Ev::Enter(0),
            Ev::Hover(0),
            Ev::Leave(0),
            Ev::Enter(1),
            Ev::Leave(1),
        ]
    );
}

#[test]
fn hover_counts_balance_on_a_random_walk() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 2000.0));
    let (mut list, log) = logging_list(50, 20.0);

    // A deterministic zig-zag across many cells.
    let mut y: f64 = 5.0;
    for step in 0..200 {
        y += if step % 3 == 0 { 17.0 } else { -6.0 };
        y = y.clamp(0.0, 999.0);
        list.cursor(&ctx, Point::new(50.0, y), CursorStatus::Hovering);
    }
    list.cursor(&ctx, Point::new(50.0, y), CursorStatus::Leaving);

    // Per cell: #enter == #leave, and episodes alternate strictly.
    let log = log.borrow();
    for ix in 0..50 {
        let mut inside = false;
        let mut enters = 0;
        let mut leaves = 0;
        for ev in log.iter() {
            match *ev {
                Ev::Enter(i) if i == ix => {
                    assert!(!inside, "double enter on cell {ix}");
                    inside = true;
                    enters += 1;
                }
                Ev::Hover(i) if i == ix => {
                    assert!(inside, "hover outside an episode on cell {ix}");
                }
                Ev::Leave(i) if i == ix => {
                    assert!(inside, "leave without enter on cell {ix}");
                    inside = false;
                    leaves += 1;
                }
                _ => {}
            }
        }
        assert!(!inside, "unbalanced episode on cell {ix}");
        assert_eq!(enters, leaves, "enter/leave mismatch on cell {ix}");
    }
}

#[test]
fn press_drag_release_has_one_receiver() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 2000.0));
    let (mut list, log) = logging_list(10, 20.0);

    // Press in cell 3, drag across other cells, release far away.
    list.click(&ctx, &MouseButton::down_at(Point::new(50.0, 65.0)));
    list.drag(&ctx, &MouseButton::down_at(Point::new(50.0, 105.0)));
    list.drag(&ctx, &MouseButton::down_at(Point::new(50.0, 145.0)));
    list.click(&ctx, &MouseButton::up_at(Point::new(50.0, 185.0)));

    assert_eq!(
        log.borrow().as_slice(),
        &[Ev::Down(3), Ev::Drag(3), Ev::Drag(3), Ev::Up(3)]
    );
}

/// Composer whose per-cell extents live in shared storage, so a test can
/// reorder content the way an application would.
struct SharedExtents {
    extents: Rc<RefCell<Vec<f64>>>,
}

impl CellComposer for SharedExtents {
    fn len(&self) -> usize {
        self.extents.borrow().len()
    }

    fn resize(&mut self, n: usize) {
        self.extents.borrow_mut().resize(n, 10.0);
    }

    fn compose(&mut self, _index: usize) -> ElementBox {
        struct Plain;
        impl Element for Plain {}
        boxed(Plain)
    }

    fn secondary_axis_limits(&mut self, _ctx: &Context<'_>) -> AxisLimits {
        AxisLimits::FULL
    }

    fn main_axis_size(&mut self, index: usize, _ctx: &Context<'_>) -> f64 {
        self.extents.borrow()[index]
    }
}

#[test]
fn move_keeps_relative_order_against_post_removal_positions() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 2000.0));

    // Extents stand in for items: A=10, B=20, C=30, D=40, E=50.
    let extents = Rc::new(RefCell::new(vec![10.0, 20.0, 30.0, 40.0, 50.0]));
    let mut list = List::vertical(Box::new(SharedExtents {
        extents: extents.clone(),
    }));
    list.sync(&ctx);

    // The application reorders its backing data and queues the same move
    // on the list: {A, C} to position 3.
    move_indices(&mut extents.borrow_mut(), 3, &[0, 2]);
    list.move_to(3, &[0, 2]);
    list.sync(&ctx);

    let order: Vec<f64> = (0..5).map(|ix| list.cell_extent(ix)).collect();
    assert_eq!(order, vec![20.0, 40.0, 10.0, 30.0, 50.0]); // B, D, A, C, E

    // Offsets are the prefix sum of the new arrangement.
    let mut acc = 0.0;
    for ix in 0..5 {
        assert_eq!(list.cell_offset(ix), acc);
        acc += list.cell_extent(ix);
    }
    assert_eq!(list.main_axis_full_size(), 150.0);
}

#[test]
fn moved_cells_carry_their_elements() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 2000.0));
    let (mut list, _log) = logging_list(5, 20.0);
    list.sync(&ctx);

    // Materialize cell 0, then move it to the end.
    list.child(0);
    assert!(list.is_materialized(0));
    list.move_to(5, &[0]);
    list.sync(&ctx);

    assert!(!list.is_materialized(0));
    assert!(list.is_materialized(4));
}

#[test]
fn insert_erase_round_trip_restores_offsets() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 2000.0));
    let (mut list, _log) = logging_list(10, 20.0);
    list.sync(&ctx);
    let before: Vec<f64> = (0..10).map(|ix| list.cell_offset(ix)).collect();
    let full = list.main_axis_full_size();

    list.insert(3, 4);
    list.sync(&ctx);
    assert_eq!(list.len(), 14);
    assert_eq!(list.main_axis_full_size(), full + 4.0 * 20.0);

    list.erase(&[3, 4, 5, 6]);
    list.sync(&ctx);

    assert_eq!(list.len(), 10);
    let after: Vec<f64> = (0..10).map(|ix| list.cell_offset(ix)).collect();
    assert_eq!(before, after);
    assert_eq!(list.main_axis_full_size(), full);
}

#[test]
fn horizontal_list_virtualizes_along_x() {
    let view = HeadlessView::new();
    let ctx = Context::root(&view, Rect::new(0.0, 0.0, 2000.0, 100.0));
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let cells = log.clone();
    let content = FnContent::new(100, move |ix| -> ElementBox {
        boxed(LoggingCell {
            ix,
            log: cells.clone(),
        })
    });
    let composer = WithLimits::new(content, 20.0, AxisLimits::FULL);
    let mut list = List::horizontal(Box::new(composer));

    let mut surface = Recorder::new(Rect::new(100.0, 0.0, 200.0, 100.0));
    list.draw(&ctx, &mut surface);

    for ix in 0..list.len() {
        assert_eq!(list.is_materialized(ix), (5..10).contains(&ix), "cell {ix}");
    }

    // Hit routing respects the horizontal axis too.
    list.click(&ctx, &MouseButton::down_at(Point::new(130.0, 50.0)));
    assert_eq!(log.borrow().last(), Some(&Ev::Down(6)));
}
