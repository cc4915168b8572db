use super::*;
use crate::guides::GuideAxis;
use crate::handles::HandleKind;
use kurbo::{Affine, Size, Vec2};

const EPS: f64 = 1e-9;

fn assert_point(actual: Point, expected: Point) {
    assert!(
        (actual - expected).hypot() < EPS,
        "expected {expected:?}, got {actual:?}"
    );
}

fn assert_rect(actual: Rect, expected: Rect) {
    let close = (actual.x0 - expected.x0).abs() < 1e-6
        && (actual.y0 - expected.y0).abs() < 1e-6
        && (actual.x1 - expected.x1).abs() < 1e-6
        && (actual.y1 - expected.y1).abs() < 1e-6;
    assert!(close, "expected {expected:?}, got {actual:?}");
}

fn engine_with(settings: Settings) -> TransformEngine {
    TransformEngine::new(Scene::new(), settings)
}

fn add(engine: &mut TransformEngine, item: Item) -> ItemId {
    engine.scene_mut().add_item(item)
}

fn item(engine: &TransformEngine, id: ItemId) -> Item {
    engine.scene().get(id).cloned().unwrap()
}

fn drag(engine: &mut TransformEngine, from: Point, to: Point, mods: Modifiers) {
    engine.pointer_down(from, mods);
    engine.pointer_move(to, mods);
    engine.pointer_up(to, mods);
}

fn two_squares(engine: &mut TransformEngine) -> (ItemId, ItemId) {
    let a = add(engine, Item::rect(Point::ZERO, 100.0, 100.0));
    let b = add(engine, Item::rect(Point::new(200.0, 0.0), 100.0, 100.0));
    (a, b)
}

fn grouped_squares(engine: &mut TransformEngine) -> (ItemId, ItemId, ItemId) {
    let (a, b) = two_squares(engine);
    engine.scene_mut().set_selection([a, b]);
    let group = engine.group_selection().unwrap();
    (a, b, group)
}

// --- Move and guides ---

#[test]
fn test_drag_snaps_right_edge_to_neighbor() {
    let mut settings = Settings::default();
    settings.snap.snap_distance = 5.0;
    let mut engine = engine_with(settings);
    let (a, _) = two_squares(&mut engine);

    engine.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
    // Unsnapped, A's right edge would sit at x = 198.
    engine.pointer_move(Point::new(148.0, 50.0), Modifiers::NONE);

    assert_point(item(&engine, a).position, Point::new(100.0, 0.0));
    let vertical: Vec<&GuideLine> = engine
        .active_guides()
        .iter()
        .filter(|g| g.axis == GuideAxis::Vertical)
        .collect();
    assert_eq!(vertical.len(), 1);
    assert!((vertical[0].value - 200.0).abs() < EPS);

    engine.pointer_up(Point::new(148.0, 50.0), Modifiers::NONE);
    assert!(engine.active_guides().is_empty());
    assert_point(item(&engine, a).position, Point::new(100.0, 0.0));
    assert_eq!(engine.history().undo_label(), Some("Move Item"));

    assert!(engine.undo());
    assert_point(item(&engine, a).position, Point::ZERO);
}

#[test]
fn test_snap_distance_scales_with_zoom() {
    let mut settings = Settings::default();
    settings.snap.snap_distance = 5.0;
    let mut engine = engine_with(settings);
    let (a, _) = two_squares(&mut engine);
    engine.set_view_scale(2.0);

    // Three units away: inside 5 screen units, outside 2.5 page units.
    drag(
        &mut engine,
        Point::new(50.0, 50.0),
        Point::new(147.0, 50.0),
        Modifiers::NONE,
    );
    assert_point(item(&engine, a).position, Point::new(97.0, 0.0));
}

#[test]
fn test_zero_snap_distance_disables_snapping() {
    let mut settings = Settings::default();
    settings.snap.snap_distance = 0.0;
    let mut engine = engine_with(settings);
    let (a, _) = two_squares(&mut engine);

    drag(
        &mut engine,
        Point::new(50.0, 50.0),
        Point::new(148.0, 50.0),
        Modifiers::NONE,
    );
    assert_point(item(&engine, a).position, Point::new(98.0, 0.0));
}

#[test]
fn test_moving_group_carries_children() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);

    // Clicking a child picks up the whole group.
    drag(
        &mut engine,
        Point::new(50.0, 50.0),
        Point::new(60.0, 80.0),
        Modifiers::NONE,
    );
    assert_eq!(engine.scene().selection(), &[group]);
    assert_point(item(&engine, a).position, Point::new(10.0, 30.0));
    assert_point(item(&engine, b).position, Point::new(210.0, 30.0));
    assert_rect(
        item(&engine, group).page_bounds(),
        Rect::new(10.0, 30.0, 310.0, 130.0),
    );
    assert_eq!(engine.history().undo_label(), Some("Move Items"));
}

#[test]
fn test_locked_item_cannot_be_dragged() {
    let mut engine = engine_with(Settings::default());
    let (a, _) = two_squares(&mut engine);
    engine.scene_mut().get_mut(a).unwrap().locked = true;

    drag(
        &mut engine,
        Point::new(50.0, 50.0),
        Point::new(80.0, 50.0),
        Modifiers::NONE,
    );
    assert_point(item(&engine, a).position, Point::ZERO);
    assert!(engine.scene().selection().is_empty());
    assert!(!engine.history().can_undo());
}

// --- Resize ---

#[test]
fn test_resize_clamps_to_minimum_size() {
    let mut engine = engine_with(Settings::default());
    let (a, _) = two_squares(&mut engine);
    engine.scene_mut().select(a);

    // Right edge dragged far past the left edge.
    drag(
        &mut engine,
        Point::new(100.0, 50.0),
        Point::new(-50.0, 50.0),
        Modifiers::NONE,
    );
    let resized = item(&engine, a);
    assert_eq!(resized.size(), Size::new(10.0, 100.0));
    assert_point(resized.position, Point::ZERO);

    // Left edge dragged past the right edge: the right edge stays at x = 10.
    drag(
        &mut engine,
        Point::new(0.0, 50.0),
        Point::new(150.0, 50.0),
        Modifiers::NONE,
    );
    let resized = item(&engine, a);
    assert_eq!(resized.size().width, 10.0);
    assert!((resized.page_bounds().x1 - 10.0).abs() < EPS);
}

#[test]
fn test_resize_rotated_item_pins_opposite_edge() {
    let mut engine = engine_with(Settings::default());
    let mut rect = Item::rect(Point::ZERO, 100.0, 50.0);
    rect.rotation = 90.0;
    let id = add(&mut engine, rect);
    engine.scene_mut().select(id);

    // Local right edge midpoint (100, 25) sits at page (50, 75).
    let before = item(&engine, id);
    assert_point(before.map_to_page(Point::new(100.0, 25.0)), Point::new(50.0, 75.0));
    let pinned = before.map_to_page(Point::new(0.0, 25.0));

    drag(
        &mut engine,
        Point::new(50.0, 75.0),
        Point::new(50.0, 95.0),
        Modifiers::NONE,
    );
    let after = item(&engine, id);
    assert!((after.size().width - 120.0).abs() < EPS);
    assert!((after.size().height - 50.0).abs() < EPS);
    assert_point(after.map_to_page(Point::new(0.0, 25.0)), pinned);
    assert_point(after.map_to_page(Point::new(120.0, 25.0)), Point::new(50.0, 95.0));
}

#[test]
fn test_resize_polygon_scales_points() {
    let mut engine = engine_with(Settings::default());
    let id = add(
        &mut engine,
        Item::polygon(vec![
            Point::ZERO,
            Point::new(100.0, 0.0),
            Point::new(50.0, 100.0),
        ]),
    );
    engine.scene_mut().select(id);

    drag(
        &mut engine,
        Point::new(100.0, 100.0),
        Point::new(200.0, 150.0),
        Modifiers::NONE,
    );
    let resized = item(&engine, id);
    assert_eq!(resized.size(), Size::new(200.0, 150.0));
    let points = resized.points().unwrap();
    assert_point(points[1], Point::new(200.0, 0.0));
    assert_point(points[2], Point::new(100.0, 150.0));
    assert_eq!(engine.history().undo_label(), Some("Resize Points"));
}

#[test]
fn test_group_resize_scales_children_proportionally() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);

    // Bottom-right corner from (300, 100) to (600, 200): scale (2, 2).
    drag(
        &mut engine,
        Point::new(300.0, 100.0),
        Point::new(600.0, 200.0),
        Modifiers::NONE,
    );
    assert_point(item(&engine, a).position, Point::ZERO);
    assert_eq!(item(&engine, a).size(), Size::new(200.0, 200.0));
    assert_point(item(&engine, b).position, Point::new(400.0, 0.0));
    assert_eq!(item(&engine, b).size(), Size::new(200.0, 200.0));
    assert_rect(
        item(&engine, group).page_bounds(),
        Rect::new(0.0, 0.0, 600.0, 200.0),
    );
    assert_eq!(engine.history().undo_label(), Some("Resize Group"));

    assert!(engine.undo());
    assert_eq!(item(&engine, b).size(), Size::new(100.0, 100.0));
    assert_point(item(&engine, b).position, Point::new(200.0, 0.0));
    assert_rect(
        item(&engine, group).page_bounds(),
        Rect::new(0.0, 0.0, 300.0, 100.0),
    );
}

#[test]
fn test_group_resize_scales_line_children() {
    let mut engine = engine_with(Settings::default());
    let a = add(&mut engine, Item::rect(Point::ZERO, 100.0, 100.0));
    let line = add(
        &mut engine,
        Item::line(Point::new(0.0, 100.0), Point::new(100.0, 200.0)),
    );
    engine.scene_mut().set_selection([a, line]);
    engine.group_selection().unwrap();

    // Group spans (0, 0)..(100, 200); stretch it horizontally by 2.
    drag(
        &mut engine,
        Point::new(100.0, 100.0),
        Point::new(200.0, 100.0),
        Modifiers::NONE,
    );
    let (start, end) = item(&engine, line).segment_page_points().unwrap();
    assert_point(start, Point::new(0.0, 100.0));
    assert_point(end, Point::new(200.0, 200.0));
}

// --- Rotate ---

#[test]
fn test_rotate_leaf_item() {
    let mut engine = engine_with(Settings::default());
    let id = add(&mut engine, Item::rect(Point::ZERO, 100.0, 100.0));
    engine.scene_mut().select(id);

    // Rotate handle at (50, -25), center (50, 50): a quarter turn.
    drag(
        &mut engine,
        Point::new(50.0, -25.0),
        Point::new(125.0, 50.0),
        Modifiers::NONE,
    );
    let rotated = item(&engine, id);
    assert!((rotated.rotation - 90.0).abs() < EPS);
    assert_point(rotated.position, Point::ZERO);
    assert_eq!(engine.history().undo_label(), Some("Rotate Item"));
}

#[test]
fn test_shift_rotate_snaps_delta() {
    let mut engine = engine_with(Settings::default());
    let id = add(&mut engine, Item::rect(Point::ZERO, 100.0, 100.0));
    engine.scene_mut().select(id);

    let center = Point::new(50.0, 50.0);
    let angle = (-70.0_f64).to_radians();
    let target = center + Vec2::new(angle.cos(), angle.sin()) * 75.0;
    drag(&mut engine, Point::new(50.0, -25.0), target, Modifiers::SHIFT);
    assert!((item(&engine, id).rotation - 15.0).abs() < EPS);
}

#[test]
fn test_group_rotation_is_rigid() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);
    let center = item(&engine, group).page_center();
    assert_point(center, Point::new(150.0, 50.0));
    let centers_before = [item(&engine, a).page_center(), item(&engine, b).page_center()];

    // Rotate handle sits 25 above the top edge center.
    drag(
        &mut engine,
        Point::new(150.0, -25.0),
        Point::new(225.0, 50.0),
        Modifiers::NONE,
    );

    let rotation = Affine::rotate_about(90.0_f64.to_radians(), center);
    for (id, before) in [a, b].into_iter().zip(centers_before) {
        let child = item(&engine, id);
        assert_point(child.page_center(), rotation * before);
        assert!((child.rotation - 90.0).abs() < EPS);
    }
    assert_point(item(&engine, a).page_center(), Point::new(150.0, -50.0));
    assert_rect(
        item(&engine, group).page_bounds(),
        Rect::new(100.0, -100.0, 200.0, 200.0),
    );
    assert_eq!(engine.history().undo_label(), Some("Rotate Group"));

    assert!(engine.undo());
    assert_point(item(&engine, a).position, Point::ZERO);
    assert_eq!(item(&engine, a).rotation, 0.0);
    assert_rect(
        item(&engine, group).page_bounds(),
        Rect::new(0.0, 0.0, 300.0, 100.0),
    );
}

#[test]
fn test_rotate_about_center_skips_frame() {
    let mut engine = engine_with(Settings::default());
    let id = add(&mut engine, Item::rect(Point::ZERO, 100.0, 100.0));
    engine.scene_mut().select(id);

    engine.pointer_down(Point::new(50.0, -25.0), Modifiers::NONE);
    engine.pointer_move(Point::new(50.0, 50.0), Modifiers::NONE);
    assert_eq!(item(&engine, id).rotation, 0.0);
    engine.pointer_up(Point::new(50.0, 50.0), Modifiers::NONE);
    assert!(!engine.history().can_undo());
}

// --- Line endpoints ---

#[test]
fn test_line_shows_endpoint_handles() {
    let mut engine = engine_with(Settings::default());
    let id = add(&mut engine, Item::line(Point::ZERO, Point::new(100.0, 0.0)));
    engine.scene_mut().select(id);
    let kinds: Vec<HandleKind> = engine.handles().iter().map(|h| h.kind).collect();
    assert_eq!(
        kinds,
        vec![
            HandleKind::Endpoint(0),
            HandleKind::Endpoint(1),
            HandleKind::Rotate
        ]
    );
}

#[test]
fn test_endpoint_drag_on_rotated_line() {
    let mut engine = engine_with(Settings::default());
    let mut line = Item::line(Point::ZERO, Point::new(100.0, 0.0));
    line.rotation = 90.0;
    let id = add(&mut engine, line);
    engine.scene_mut().select(id);
    let original = item(&engine, id);

    let (start, end) = original.segment_page_points().unwrap();
    assert_point(start, Point::new(50.0, -50.0));
    assert_point(end, Point::new(50.0, 50.0));

    drag(
        &mut engine,
        Point::new(50.0, 50.0),
        Point::new(80.0, 50.0),
        Modifiers::NONE,
    );
    let moved = item(&engine, id);
    let (start, end) = moved.segment_page_points().unwrap();
    assert_point(start, Point::new(50.0, -50.0));
    assert_point(end, Point::new(80.0, 50.0));
    assert_eq!(moved.rotation, 90.0);
    assert_eq!(engine.history().undo_label(), Some("Move Endpoint"));

    assert!(engine.undo());
    assert_eq!(item(&engine, id), original);
}

#[test]
fn test_shift_endpoint_drag_constrains_angle() {
    let mut engine = engine_with(Settings::default());
    let id = add(&mut engine, Item::line(Point::ZERO, Point::new(100.0, 0.0)));
    engine.scene_mut().select(id);

    drag(
        &mut engine,
        Point::new(100.0, 0.0),
        Point::new(100.0, 10.0),
        Modifiers::SHIFT,
    );
    let (start, end) = item(&engine, id).segment_page_points().unwrap();
    assert_point(start, Point::ZERO);
    assert_point(end, Point::new(100.0_f64.hypot(10.0), 0.0));
}

// --- Rubber band ---

#[test]
fn test_rubber_band_selects_touching_items() {
    let mut engine = engine_with(Settings::default());
    let (a, b) = two_squares(&mut engine);
    add(&mut engine, Item::rect(Point::new(0.0, 300.0), 50.0, 50.0));

    engine.pointer_down(Point::new(-10.0, -10.0), Modifiers::NONE);
    engine.pointer_move(Point::new(250.0, 50.0), Modifiers::NONE);
    assert_eq!(
        engine.rubber_band_rect(),
        Some(Rect::new(-10.0, -10.0, 250.0, 50.0))
    );
    engine.pointer_up(Point::new(250.0, 50.0), Modifiers::NONE);

    assert_eq!(engine.scene().selection(), &[a, b]);
    assert_eq!(engine.rubber_band_rect(), None);
}

#[test]
fn test_tiny_rubber_band_selects_nothing() {
    let mut engine = engine_with(Settings::default());
    let (a, _) = two_squares(&mut engine);
    engine.scene_mut().select(a);

    drag(
        &mut engine,
        Point::new(150.0, 150.0),
        Point::new(151.0, 151.0),
        Modifiers::NONE,
    );
    assert!(engine.scene().selection().is_empty());
}

#[test]
fn test_rubber_band_replaces_children_with_group() {
    let mut engine = engine_with(Settings::default());
    let (_, _, group) = grouped_squares(&mut engine);
    let c = add(&mut engine, Item::rect(Point::new(0.0, 300.0), 50.0, 50.0));
    engine.scene_mut().select(c);

    // Touches only the first child; shift keeps `c`.
    drag(
        &mut engine,
        Point::new(-10.0, -10.0),
        Point::new(20.0, 20.0),
        Modifiers::SHIFT,
    );
    assert_eq!(engine.scene().selection(), &[c, group]);
}

// --- Vertex editing ---

fn triangle(engine: &mut TransformEngine) -> ItemId {
    add(
        engine,
        Item::polygon(vec![
            Point::ZERO,
            Point::new(100.0, 0.0),
            Point::new(50.0, 80.0),
        ]),
    )
}

fn page_points(item: &Item) -> Vec<Point> {
    let placement = item.placement();
    item.points()
        .unwrap()
        .iter()
        .map(|p| placement * *p)
        .collect()
}

#[test]
fn test_double_click_enters_and_leaves_vertex_mode() {
    let mut engine = engine_with(Settings::default());
    let id = triangle(&mut engine);

    engine.double_click(Point::new(50.0, 30.0));
    assert_eq!(engine.vertex_target(), Some(id));
    assert_eq!(engine.handles().len(), 3);

    engine.double_click(Point::new(500.0, 500.0));
    assert_eq!(engine.vertex_target(), None);

    engine.double_click(Point::new(50.0, 30.0));
    engine.handle_key(Key::Escape);
    assert_eq!(engine.vertex_target(), None);
    assert_eq!(engine.scene().selection(), &[id]);
}

#[test]
fn test_unchanged_vertex_edit_records_nothing() {
    let mut engine = engine_with(Settings::default());
    let id = triangle(&mut engine);
    let original = item(&engine, id);

    engine.double_click(Point::new(50.0, 30.0));
    drag(
        &mut engine,
        Point::new(100.0, 0.0),
        Point::new(100.0, 0.0),
        Modifiers::NONE,
    );
    assert_eq!(item(&engine, id), original);
    assert!(!engine.history().can_undo());
}

#[test]
fn test_off_center_click_on_vertex_handle_keeps_vertex() {
    let mut engine = engine_with(Settings::default());
    let id = triangle(&mut engine);
    let original = item(&engine, id);
    engine.double_click(Point::new(50.0, 30.0));

    // Inside the handle tolerance of vertex 1 at (100, 0), but not on it.
    let press = Point::new(104.0, 3.0);
    engine.pointer_down(press, Modifiers::NONE);
    engine.pointer_up(press, Modifiers::NONE);

    assert_eq!(item(&engine, id), original);
    assert!(!engine.history().can_undo());
}

#[test]
fn test_vertex_drag_follows_pointer_offset() {
    let mut engine = engine_with(Settings::default());
    let id = triangle(&mut engine);
    engine.double_click(Point::new(50.0, 30.0));

    drag(
        &mut engine,
        Point::new(104.0, 3.0),
        Point::new(124.0, 13.0),
        Modifiers::NONE,
    );
    let points = page_points(&item(&engine, id));
    assert_point(points[0], Point::ZERO);
    assert_point(points[1], Point::new(120.0, 10.0));
    assert_point(points[2], Point::new(50.0, 80.0));
    assert_eq!(engine.history().undo_label(), Some("Edit Vertex"));
}

#[test]
fn test_vertex_drag_renormalizes() {
    let mut engine = engine_with(Settings::default());
    let id = triangle(&mut engine);
    engine.double_click(Point::new(50.0, 30.0));

    drag(
        &mut engine,
        Point::ZERO,
        Point::new(-20.0, -10.0),
        Modifiers::NONE,
    );
    let edited = item(&engine, id);
    assert_point(edited.position, Point::new(-20.0, -10.0));
    assert_eq!(edited.size(), Size::new(120.0, 90.0));
    let points = edited.points().unwrap();
    assert_point(points[0], Point::ZERO);
    assert_point(points[1], Point::new(120.0, 10.0));
    assert_eq!(engine.history().undo_label(), Some("Edit Vertex"));

    assert!(engine.undo());
    assert_point(item(&engine, id).position, Point::ZERO);
    assert_eq!(item(&engine, id).size(), Size::new(100.0, 80.0));
}

#[test]
fn test_vertex_drag_keeps_other_vertices_on_rotated_polygon() {
    let mut engine = engine_with(Settings::default());
    let id = triangle(&mut engine);
    engine.scene_mut().get_mut(id).unwrap().rotation = 30.0;
    let before = page_points(&item(&engine, id));

    engine.double_click(item(&engine, id).page_center());
    assert_eq!(engine.vertex_target(), Some(id));

    let target = before[2] + Vec2::new(40.0, 25.0);
    drag(&mut engine, before[2], target, Modifiers::NONE);

    let after = page_points(&item(&engine, id));
    assert_point(after[0], before[0]);
    assert_point(after[1], before[1]);
    assert_point(after[2], target);
    assert_eq!(item(&engine, id).rotation, 30.0);
}

#[test]
fn test_delete_in_vertex_mode_ends_session() {
    let mut engine = engine_with(Settings::default());
    let id = triangle(&mut engine);
    engine.double_click(Point::new(50.0, 30.0));

    engine.handle_key(Key::Delete);
    assert!(!engine.scene().contains(id));
    assert_eq!(engine.vertex_target(), None);

    assert!(engine.undo());
    assert!(engine.scene().contains(id));
}

// --- History ---

#[test]
fn test_gesture_sequence_round_trips() {
    let mut engine = engine_with(Settings::default());
    let id = add(&mut engine, Item::rect(Point::ZERO, 100.0, 50.0));
    let original = item(&engine, id);

    // Move by (10, 10).
    drag(
        &mut engine,
        Point::new(50.0, 25.0),
        Point::new(60.0, 35.0),
        Modifiers::NONE,
    );
    // Right edge handle, now at (110, 35), out by 20.
    drag(
        &mut engine,
        Point::new(110.0, 35.0),
        Point::new(130.0, 35.0),
        Modifiers::NONE,
    );
    // Rotate handle above the top edge center (70, 10), center (70, 35).
    drag(
        &mut engine,
        Point::new(70.0, -15.0),
        Point::new(120.0, 35.0),
        Modifiers::NONE,
    );
    let done = item(&engine, id);
    assert_eq!(done.size(), Size::new(120.0, 50.0));
    assert!((done.rotation - 90.0).abs() < EPS);
    assert_eq!(engine.history().undo_depth(), 3);

    for _ in 0..3 {
        assert!(engine.undo());
    }
    assert_eq!(item(&engine, id), original);
    assert!(!engine.undo());

    for _ in 0..3 {
        assert!(engine.redo());
    }
    assert_eq!(item(&engine, id), done);
}

#[test]
fn test_multi_item_move_is_one_undo_step() {
    let mut engine = engine_with(Settings::default());
    let (a, b) = two_squares(&mut engine);

    engine.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
    engine.pointer_up(Point::new(50.0, 50.0), Modifiers::NONE);
    assert!(!engine.history().can_undo());

    engine.pointer_down(Point::new(250.0, 50.0), Modifiers::SHIFT);
    engine.pointer_move(Point::new(250.0, 150.0), Modifiers::NONE);
    engine.pointer_up(Point::new(250.0, 150.0), Modifiers::NONE);
    assert_eq!(engine.scene().selection(), &[a, b]);
    assert_eq!(engine.history().undo_depth(), 1);
    assert_eq!(engine.history().undo_label(), Some("Move Items"));

    assert!(engine.undo());
    assert_point(item(&engine, a).position, Point::ZERO);
    assert_point(item(&engine, b).position, Point::new(200.0, 0.0));
    assert!(!engine.history().can_undo());
}

#[test]
fn test_escape_cancels_without_recording() {
    let mut engine = engine_with(Settings::default());
    let (a, _) = two_squares(&mut engine);

    engine.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
    engine.pointer_move(Point::new(90.0, 70.0), Modifiers::NONE);
    assert_point(item(&engine, a).position, Point::new(40.0, 20.0));

    engine.handle_key(Key::Escape);
    assert!(!engine.is_gesture_active());
    assert_point(item(&engine, a).position, Point::ZERO);

    // The release after a cancel is ignored.
    engine.pointer_up(Point::new(90.0, 70.0), Modifiers::NONE);
    assert_point(item(&engine, a).position, Point::ZERO);
    assert!(!engine.history().can_undo());
    assert_eq!(engine.scene().selection(), &[a]);

    engine.handle_key(Key::Escape);
    assert!(engine.scene().selection().is_empty());
}

#[test]
fn test_interrupted_group_resize_restores_everything() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);

    engine.pointer_down(Point::new(300.0, 100.0), Modifiers::NONE);
    engine.pointer_move(Point::new(450.0, 300.0), Modifiers::NONE);
    assert_ne!(item(&engine, b).size(), Size::new(100.0, 100.0));

    engine.interrupt();
    assert_eq!(item(&engine, a).size(), Size::new(100.0, 100.0));
    assert_eq!(item(&engine, b).size(), Size::new(100.0, 100.0));
    assert_point(item(&engine, b).position, Point::new(200.0, 0.0));
    assert_rect(
        item(&engine, group).page_bounds(),
        Rect::new(0.0, 0.0, 300.0, 100.0),
    );
    assert_eq!(engine.history().undo_label(), Some("Group Items"));
}

#[test]
fn test_press_during_gesture_discards_it() {
    let mut engine = engine_with(Settings::default());
    let (a, _) = two_squares(&mut engine);

    engine.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
    engine.pointer_move(Point::new(70.0, 50.0), Modifiers::NONE);
    // The release was lost; the next press starts over from committed state.
    engine.pointer_down(Point::new(50.0, 50.0), Modifiers::NONE);
    assert_point(item(&engine, a).position, Point::ZERO);
    engine.pointer_up(Point::new(50.0, 50.0), Modifiers::NONE);
    assert!(!engine.history().can_undo());
}

#[test]
fn test_non_left_buttons_are_ignored() {
    let mut engine = engine_with(Settings::default());
    let (a, _) = two_squares(&mut engine);

    engine.handle_pointer_event(PointerEvent::Down {
        position: Point::new(50.0, 50.0),
        button: MouseButton::Right,
        modifiers: Modifiers::NONE,
    });
    assert!(!engine.is_gesture_active());
    assert!(!engine.scene().is_selected(a));
}

// --- Structure ---

#[test]
fn test_group_and_ungroup_undo() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);
    assert_eq!(engine.scene().selection(), &[group]);

    assert!(engine.ungroup_selection());
    assert!(!engine.scene().contains(group));
    assert_eq!(engine.scene().selection(), &[a, b]);

    assert!(engine.undo());
    assert_eq!(engine.scene().parent_of(a), Some(group));
    assert!(engine.undo());
    assert!(!engine.scene().contains(group));
    assert_eq!(engine.scene().parent_of(b), None);

    assert!(engine.redo());
    assert_eq!(engine.scene().children_of(group), vec![a, b]);
}

#[test]
fn test_delete_group_and_undo() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);

    assert!(engine.delete_selection());
    assert!(engine.scene().is_empty());
    assert_eq!(engine.history().undo_label(), Some("Delete Items"));

    assert!(engine.undo());
    assert_eq!(engine.scene().len(), 3);
    assert_eq!(engine.scene().parent_of(a), Some(group));
    assert_eq!(engine.scene().parent_of(b), Some(group));
    assert_rect(
        item(&engine, group).page_bounds(),
        Rect::new(0.0, 0.0, 300.0, 100.0),
    );

    assert!(engine.redo());
    assert!(engine.scene().is_empty());
}

#[test]
fn test_delete_every_child_of_group_restores_group_on_undo() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);
    engine.scene_mut().set_selection([a, b]);

    assert!(engine.delete_selection());
    assert!(engine.scene().is_empty());

    assert!(engine.undo());
    assert!(engine.scene().contains(group));
    assert_eq!(engine.scene().parent_of(a), Some(group));
    assert_eq!(engine.scene().parent_of(b), Some(group));
    assert_eq!(engine.scene().children_of(group), vec![a, b]);

    assert!(engine.redo());
    assert!(engine.scene().is_empty());
}

#[test]
fn test_delete_one_child_keeps_group() {
    let mut engine = engine_with(Settings::default());
    let (a, b, group) = grouped_squares(&mut engine);
    engine.scene_mut().set_selection([a]);

    assert!(engine.delete_selection());
    assert!(!engine.scene().contains(a));
    assert_eq!(engine.scene().children_of(group), vec![b]);

    assert!(engine.undo());
    assert_eq!(engine.scene().parent_of(a), Some(group));
}

#[test]
fn test_undo_limit_from_settings() {
    let settings = Settings {
        undo_limit: 1,
        ..Settings::default()
    };
    let mut engine = engine_with(settings);
    let (a, _) = two_squares(&mut engine);

    for x in [60.0, 70.0] {
        let start = item(&engine, a).page_center();
        drag(
            &mut engine,
            start,
            Point::new(x + 50.0, 450.0),
            Modifiers::NONE,
        );
    }
    assert_eq!(engine.history().undo_depth(), 1);
    assert!(engine.undo());
    assert!(!engine.undo());
}
