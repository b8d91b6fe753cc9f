#![forbid(unsafe_code)]

//! End-to-end scenarios for every layout mode over the headless
//! collaborators.
//!
//! ```sh
//! cargo test -p trellis-layout --test layout_scenarios
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use trellis_layout::headless::{HeadlessContainer, HeadlessItem};
use trellis_layout::{
    BoxLayout, FlowLayout, GridLayout, GridRange, ItemId, Layout, LayoutConfig, LayoutError,
    LayoutFlags, Orientation, Rect, Size, SplitterLayout,
};

// ============================================================================
// Helpers
// ============================================================================

fn resizable(id: u64, width: i32, height: i32) -> HeadlessItem {
    HeadlessItem::new(id)
        .min(Size::new(width, height))
        .flags(LayoutFlags::RESIZABLE)
}

fn shared(container: HeadlessContainer) -> Rc<RefCell<HeadlessContainer>> {
    Rc::new(RefCell::new(container))
}

fn width_of(container: &Rc<RefCell<HeadlessContainer>>, id: u64) -> Option<i32> {
    container.borrow().geometry_of(id).map(|r| r.width)
}

// ============================================================================
// Box
// ============================================================================

#[test]
fn repeated_update_commits_identical_geometry() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 320, 48))
            .with_child(resizable(1, 40, 20))
            .with_child(HeadlessItem::spacer(2, LayoutFlags::RESIZABLE))
            .with_child(resizable(3, 60, 20)),
    );
    let mut layout = BoxLayout::horizontal();
    layout.attach_to(&container);

    layout.update(false).expect("first update");
    let first = container.borrow().last_batch().clone();
    layout.update(false).expect("second update");
    let second = container.borrow().last_batch().clone();

    assert_eq!(first, second);
    assert_eq!(container.borrow().commit_count(), 2);
}

#[test]
fn undersized_container_keeps_minimums() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 50, 20))
            .with_child(resizable(1, 40, 10))
            .with_child(resizable(2, 40, 10)),
    );
    let mut layout = BoxLayout::with_config(Orientation::Horizontal, LayoutConfig::ZERO)
        .expect("valid config");
    layout.attach_to(&container);

    layout.update(false).expect("best effort, not an error");
    assert_eq!(width_of(&container, 1), Some(40));
    assert_eq!(width_of(&container, 2), Some(40));
}

#[test]
fn empty_and_hidden_containers_commit_nothing() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 100, 100))
            .with_child(resizable(1, 10, 10).hidden())
            .with_child(resizable(2, 10, 10).hidden()),
    );
    let mut layout = BoxLayout::vertical();
    layout.attach_to(&container);

    layout.update(false).expect("update");
    assert!(container.borrow().last_batch().is_empty());
    assert_eq!(container.borrow().commit_count(), 1);
}

#[test]
fn commit_failure_surfaces_and_stops_the_pass() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 100, 20))
            .with_child(resizable(1, 0, 10))
            .with_child(resizable(2, 0, 10))
            .fail_after(1),
    );
    let mut layout = BoxLayout::horizontal();
    layout.attach_to(&container);

    match layout.update(false) {
        Err(LayoutError::GeometryCommitFailed(err)) => assert_eq!(err.committed, 1),
        other => panic!("expected a commit failure, got {other:?}"),
    }
    assert!(container.borrow().geometry_of(1).is_some());
    assert!(container.borrow().geometry_of(2).is_none());
    assert!(!layout.update_handle().is_performing());

    container.borrow_mut().clear_failure();
    layout.update(false).expect("retry succeeds");
    assert!(container.borrow().geometry_of(2).is_some());
}

#[test]
fn relayout_requested_during_commit_runs_after_the_pass() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 100, 20)).with_child(resizable(1, 0, 10)),
    );
    let mut layout = BoxLayout::horizontal();
    layout.attach_to(&container);
    container
        .borrow_mut()
        .request_relayout_on_commit(layout.update_handle(), 2);

    layout.update(false).expect("update");
    assert_eq!(container.borrow().commit_count(), 3);
    assert!(!layout.update_handle().is_pending());
}

#[test]
fn layouts_can_be_swapped_on_one_container() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 100, 100))
            .with_child(resizable(1, 0, 0))
            .with_child(resizable(2, 0, 0)),
    );
    let mut row = BoxLayout::with_config(Orientation::Horizontal, LayoutConfig::ZERO)
        .expect("valid config");
    row.attach_to(&container);
    row.update(false).expect("row");
    assert_eq!(container.borrow().geometry_of(2), Some(Rect::new(50, 0, 50, 100)));

    row.detach();
    let mut column = BoxLayout::with_config(Orientation::Vertical, LayoutConfig::ZERO)
        .expect("valid config");
    column.attach_to(&container);
    column.update(false).expect("column");
    assert_eq!(container.borrow().geometry_of(2), Some(Rect::new(0, 50, 100, 50)));

    row.update(false).expect("detached update is a no-op");
    assert_eq!(container.borrow().commit_count(), 2);
}

// ============================================================================
// Grid
// ============================================================================

fn spanning_grid(a: i32, b: i32, c: i32) -> Size {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 400, 400))
            .with_child(resizable(1, a, 10))
            .with_child(resizable(2, b, 10))
            .with_child(resizable(3, c, 10)),
    );
    let mut grid = GridLayout::new();
    grid.attach_to(&container);
    grid.set_range(ItemId::new(1), GridRange::from_rect(Rect::new(0, 0, 2, 1)))
        .expect("a");
    grid.set_range(ItemId::new(2), GridRange::from_rect(Rect::new(0, 1, 1, 1)))
        .expect("b");
    grid.set_range(ItemId::new(3), GridRange::from_rect(Rect::new(1, 1, 1, 1)))
        .expect("c");
    grid.min_size()
}

#[test]
fn grid_span_min_width_is_the_larger_of_span_and_cells() {
    assert_eq!(spanning_grid(70, 30, 30).width, 70);
    assert_eq!(spanning_grid(50, 30, 30).width, 60);
    assert_eq!(spanning_grid(60, 30, 30).width, 60);
}

#[test]
fn grid_fills_container_and_is_idempotent() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 200, 100))
            .with_child(resizable(1, 0, 0))
            .with_child(resizable(2, 0, 0))
            .with_child(resizable(3, 0, 0)),
    );
    let mut grid = GridLayout::new();
    grid.attach_to(&container);
    grid.set_range(ItemId::new(1), GridRange::new(0, 0, 1, 2)).expect("a");
    grid.set_range(ItemId::new(2), GridRange::cell(1, 0)).expect("b");
    grid.set_range(ItemId::new(3), GridRange::cell(1, 1)).expect("c");
    grid.update(false).expect("update");

    {
        let c = container.borrow();
        assert_eq!(c.geometry_of(1), Some(Rect::new(0, 0, 200, 50)));
        assert_eq!(c.geometry_of(2), Some(Rect::new(0, 50, 100, 50)));
        assert_eq!(c.geometry_of(3), Some(Rect::new(100, 50, 100, 50)));
    }

    let before = container.borrow().last_batch().clone();
    grid.update(false).expect("update");
    assert_eq!(&before, container.borrow().last_batch());
}

// ============================================================================
// Flow
// ============================================================================

#[test]
fn flow_wraps_the_third_item() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 100, 100))
            .with_children((1..=3).map(|id| resizable(id, 40, 10))),
    );
    let mut flow = FlowLayout::with_config(LayoutConfig::ZERO.with_spacing(10)).expect("valid config");
    flow.attach_to(&container);

    assert_eq!(
        flow.sections_for_width(100),
        vec![
            vec![ItemId::new(1), ItemId::new(2)],
            vec![ItemId::new(3)],
        ]
    );

    flow.update(false).expect("update");
    let c = container.borrow();
    let first = c.geometry_of(1).expect("placed");
    let third = c.geometry_of(3).expect("placed");
    assert_eq!(first.y, 0);
    assert!(third.y >= first.bottom() + 10, "third item should start a new row");
    assert_eq!(third.x, 0);
}

#[test]
fn flow_rewraps_when_the_container_narrows() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 200, 100))
            .with_children((1..=3).map(|id| resizable(id, 40, 10))),
    );
    let mut flow = FlowLayout::with_config(LayoutConfig::ZERO.with_spacing(10)).expect("valid config");
    flow.attach_to(&container);
    flow.update(false).expect("update");
    assert_eq!(container.borrow().geometry_of(3).map(|r| r.y), Some(0));

    container.borrow_mut().set_bounds(Rect::new(0, 0, 45, 100));
    flow.update(false).expect("update");
    let c = container.borrow();
    let ys: Vec<i32> = (1..=3).filter_map(|id| c.geometry_of(id)).map(|r| r.y).collect();
    assert_eq!(ys, vec![0, 20, 40]);
}

// ============================================================================
// Splitter
// ============================================================================

#[test]
fn splitter_growth_is_shared_across_updates() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 204, 50))
            .with_child(resizable(1, 0, 0))
            .with_child(HeadlessItem::new(2))
            .with_child(resizable(3, 0, 0)),
    );
    let mut splitter = SplitterLayout::horizontal();
    splitter.attach_to(&container);
    splitter.update(false).expect("update");
    assert_eq!(width_of(&container, 1), Some(100));
    assert_eq!(width_of(&container, 3), Some(100));

    container.borrow_mut().set_bounds(Rect::new(0, 0, 209, 50));
    splitter.update(false).expect("update");
    container.borrow_mut().set_bounds(Rect::new(0, 0, 214, 50));
    splitter.update(false).expect("update");

    assert_eq!(width_of(&container, 1), Some(105));
    assert_eq!(width_of(&container, 3), Some(105));
    assert_eq!(container.borrow().geometry_of(3).map(|r| r.x), Some(109));
}

#[test]
fn splitter_drag_survives_a_plain_update() {
    let container = shared(
        HeadlessContainer::new(Rect::new(0, 0, 204, 50))
            .with_child(resizable(1, 20, 0))
            .with_child(HeadlessItem::new(2))
            .with_child(resizable(3, 20, 0)),
    );
    let mut splitter = SplitterLayout::horizontal();
    splitter.attach_to(&container);
    splitter.update(false).expect("update");

    assert_eq!(splitter.release_handle(1, 500), Ok(180));
    splitter.update(false).expect("update");
    assert_eq!(width_of(&container, 1), Some(180));
    assert_eq!(width_of(&container, 3), Some(20));
    assert_eq!(splitter.fractions().as_slice(), &[0.9, 0.1]);
}
