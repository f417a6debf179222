use drawpilot_client::actions;
use drawpilot_client::geometry::{hit_test, Bounds};
use drawpilot_client::input::{apply_pointer, PointerInput};
use drawpilot_client::keyboard::{dispatch_key, KeyInput, Shortcut};
use drawpilot_client::render::{render_export, render_scene, render_shape};
use drawpilot_client::selection::{expand_by_collision, select_in_rect};
use drawpilot_client::state::{
    BrushSize, Line, Point, RasterImage, SelectionRect, Shape, ShapeKind, State, StrokeTool, Tool,
};

fn shape(id: &str, kind: ShapeKind, x: f64, y: f64, width: f64, height: f64) -> Shape {
    Shape {
        id: id.into(),
        kind,
        x,
        y,
        width,
        height,
        color: "#ff0000".into(),
        is_drawing: false,
    }
}

fn line(id: &str, points: &[(f64, f64)]) -> Line {
    Line {
        id: id.into(),
        tool: StrokeTool::Brush,
        points: points.iter().flat_map(|(x, y)| [*x, *y]).collect(),
        color: "#000000".into(),
        size: 4.0,
    }
}

// Helper: a canvas with two overlapping rectangles and a far away star
fn create_test_state() -> State {
    let mut state = State::default();
    state
        .canvas
        .shapes
        .push(shape("a", ShapeKind::Rectangle, 10.0, 10.0, 50.0, 50.0));
    state
        .canvas
        .shapes
        .push(shape("b", ShapeKind::Circle, 40.0, 40.0, 30.0, 30.0));
    state
        .canvas
        .shapes
        .push(shape("far", ShapeKind::Star, 500.0, 400.0, 40.0, 40.0));
    state
}

fn with_image(state: &mut State) {
    state.image.image = Some(RasterImage {
        src: "data:image/png;base64,AAAA".into(),
        width: 4,
        height: 4,
    });
}

#[test]
fn shapes_render_the_same_whatever_the_drag_direction() {
    for kind in [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Star,
    ] {
        let drawn = shape("s", kind, 10.0, 10.0, 40.0, 20.0);
        let expected = render_shape(&drawn, false, Tool::Select);
        for (x, y, w, h) in [
            (50.0, 10.0, -40.0, 20.0),
            (10.0, 30.0, 40.0, -20.0),
            (50.0, 30.0, -40.0, -20.0),
        ] {
            let rendered = render_shape(&shape("s", kind, x, y, w, h), false, Tool::Select);
            assert_eq!(rendered, expected, "{kind:?} dragged as ({x}, {y}, {w}, {h})");
        }
    }
}

#[test]
fn selected_objects_are_highlighted_but_not_exported() {
    let mut state = create_test_state();
    actions::set_selection(&mut state, vec!["a".into()]);

    let scene = render_scene(&state);
    // Scene shapes keep canvas order, so "a" comes first.
    assert_eq!(scene.shapes[0].style().stroke, "#2196F3");
    assert_eq!(scene.shapes[1].style().stroke, "transparent");

    let export = render_export(&state, &["a"]);
    assert_eq!(export.shapes.len(), 1);
    assert_eq!(export.shapes[0].style().stroke, "#000000");
    assert!(export.selection_rect.is_none());
}

#[test]
fn rect_over_an_object_selects_it() {
    let state = create_test_state();
    let own = SelectionRect {
        x: 500.0,
        y: 400.0,
        width: 40.0,
        height: 40.0,
        visible: true,
    };
    assert_eq!(select_in_rect(&state.canvas, own), vec!["far".to_string()]);
}

#[test]
fn disjoint_rect_selects_nothing() {
    let state = create_test_state();
    let empty_area = SelectionRect {
        x: 200.0,
        y: 200.0,
        width: 20.0,
        height: 20.0,
        visible: true,
    };
    assert!(select_in_rect(&state.canvas, empty_area).is_empty());
}

#[test]
fn lines_are_selected_by_their_points() {
    let mut state = State::default();
    state
        .canvas
        .lines
        .push(line("l", &[(100.0, 100.0), (300.0, 100.0)]));
    let between = SelectionRect {
        x: 150.0,
        y: 90.0,
        width: 100.0,
        height: 20.0,
        visible: true,
    };
    // The segment crosses the rect but no sample point lies inside it.
    assert!(select_in_rect(&state.canvas, between).is_empty());

    let around_end = SelectionRect {
        x: 290.0,
        y: 90.0,
        width: 20.0,
        height: 20.0,
        visible: true,
    };
    assert_eq!(select_in_rect(&state.canvas, around_end), vec!["l".to_string()]);
}

#[test]
fn collision_expansion_is_symmetric() {
    let state = create_test_state();
    let from_a = expand_by_collision(&state.canvas, &["a"]);
    let from_b = expand_by_collision(&state.canvas, &["b"]);
    assert!(from_a.contains(&"b".to_string()));
    assert!(from_b.contains(&"a".to_string()));
    assert!(!from_a.contains(&"far".to_string()));
}

#[test]
fn touching_edges_count_as_collision() {
    let mut state = State::default();
    state
        .canvas
        .shapes
        .push(shape("left", ShapeKind::Rectangle, 0.0, 0.0, 10.0, 10.0));
    state
        .canvas
        .shapes
        .push(shape("right", ShapeKind::Rectangle, 10.0, 0.0, 10.0, 10.0));
    let expanded = expand_by_collision(&state.canvas, &["left"]);
    assert_eq!(expanded, vec!["left".to_string(), "right".to_string()]);
}

#[test]
fn short_strokes_are_kept_as_drawn() {
    let mut state = State::default();
    let points: Vec<(f64, f64)> = (0..100).map(|i| (f64::from(i), 0.0)).collect();
    actions::add_line(&mut state, line("l", &points));
    assert_eq!(state.canvas.lines[0].point_count(), 100);
}

#[test]
fn long_strokes_are_simplified_keeping_endpoints() {
    let mut state = State::default();
    let points: Vec<(f64, f64)> = (0..500).map(|i| (f64::from(i), f64::from(i % 7))).collect();
    actions::add_line(&mut state, line("l", &points));

    let stored = &state.canvas.lines[0];
    assert!(stored.point_count() < 500);
    assert_eq!(stored.point_count(), 51);
    let kept: Vec<Point> = stored.points().collect();
    assert_eq!(kept.first(), Some(&Point::new(0.0, 0.0)));
    assert_eq!(kept.last(), Some(&Point::new(499.0, f64::from(499 % 7))));
}

#[test]
fn typing_in_a_text_field_never_triggers_shortcuts() {
    let mut state = create_test_state();
    actions::select_all(&mut state);
    for key in ["b", "Delete", "Backspace", "Escape", "?"] {
        let outcome = dispatch_key(&mut state, &KeyInput::plain(key).in_text_field());
        assert_eq!(outcome.shortcut, None, "{key}");
        assert!(!outcome.prevent_default);
    }
    let outcome = dispatch_key(&mut state, &KeyInput::plain("s").with_ctrl().in_text_field());
    assert_eq!(outcome.shortcut, None);
    assert_eq!(state.tool(), Tool::Select);
    assert_eq!(state.canvas.object_count(), 3);
}

#[test]
fn modifier_shortcuts_prevent_the_browser_default() {
    let mut state = create_test_state();
    let outcome = dispatch_key(&mut state, &KeyInput::plain("s").with_ctrl());
    assert_eq!(outcome.shortcut, Some(Shortcut::Save));
    assert!(outcome.prevent_default);

    let outcome = dispatch_key(&mut state, &KeyInput::plain("a").with_ctrl());
    assert_eq!(outcome.shortcut, Some(Shortcut::SelectAll));
    assert_eq!(state.selected_ids().len(), 3);

    let outcome = dispatch_key(&mut state, &KeyInput::plain("z").with_ctrl().with_shift());
    assert_eq!(outcome.shortcut, Some(Shortcut::Redo));

    let outcome = dispatch_key(&mut state, &KeyInput::plain("o").with_ctrl());
    assert_eq!(outcome.shortcut, Some(Shortcut::OpenUpload));
    assert!(state.ui.upload_dialog_open);
}

#[test]
fn escape_leaves_drawing_tools_then_clears_selection() {
    let mut state = create_test_state();
    dispatch_key(&mut state, &KeyInput::plain("r"));
    assert_eq!(state.tool(), Tool::Rectangle);

    let outcome = dispatch_key(&mut state, &KeyInput::plain("Escape"));
    assert_eq!(outcome.shortcut, Some(Shortcut::CancelTool));
    assert_eq!(state.tool(), Tool::Select);

    actions::set_selection(&mut state, vec!["a".into()]);
    let outcome = dispatch_key(&mut state, &KeyInput::plain("Escape"));
    assert_eq!(outcome.shortcut, Some(Shortcut::ClearSelection));
    assert!(state.selected_ids().is_empty());
}

#[test]
fn image_shortcuts_need_an_uploaded_image() {
    let mut state = State::default();
    assert_eq!(dispatch_key(&mut state, &KeyInput::plain("a")).shortcut, None);
    assert_eq!(dispatch_key(&mut state, &KeyInput::plain("8")).shortcut, None);
    assert_eq!(dispatch_key(&mut state, &KeyInput::plain("f")).shortcut, None);
    assert_eq!(state.tool(), Tool::Select);

    with_image(&mut state);
    dispatch_key(&mut state, &KeyInput::plain("p"));
    assert!(state.ui.color_picker_open);
    dispatch_key(&mut state, &KeyInput::plain("F"));
    assert!(state.ui.filter_panel_open);
    assert!(!state.ui.color_picker_open);

    dispatch_key(&mut state, &KeyInput::plain("a"));
    assert_eq!(state.tool(), Tool::AiEdit);
}

#[test]
fn delete_and_clear_keys_edit_the_canvas() {
    let mut state = create_test_state();
    actions::set_selection(&mut state, vec!["far".into()]);
    dispatch_key(&mut state, &KeyInput::plain("Delete"));
    assert_eq!(state.canvas.object_count(), 2);
    assert!(state.selected_ids().is_empty());

    assert_eq!(dispatch_key(&mut state, &KeyInput::plain("x")).shortcut, None);
    assert_eq!(state.canvas.object_count(), 2);
    dispatch_key(&mut state, &KeyInput::plain("X").with_shift());
    assert_eq!(state.canvas.object_count(), 0);
}

#[test]
fn dragging_with_a_shape_tool_creates_and_selects_it() {
    let mut state = State::default();
    actions::set_tool(&mut state, Tool::Triangle);
    apply_pointer(&mut state, &PointerInput::down(100.0, 100.0));
    assert!(state.canvas.drawing_shape().is_some());
    apply_pointer(&mut state, &PointerInput::moved(60.0, 40.0));
    apply_pointer(&mut state, &PointerInput::up(60.0, 40.0));

    let created = &state.canvas.shapes[0];
    assert_eq!(created.kind, ShapeKind::Triangle);
    assert!(!created.is_drawing);
    assert_eq!((created.width, created.height), (-40.0, -60.0));
    assert_eq!(state.selected_ids(), [created.id.clone()]);
}

#[test]
fn brush_samples_only_distinct_points() {
    let mut state = State::default();
    actions::set_tool(&mut state, Tool::Brush);
    apply_pointer(&mut state, &PointerInput::down(10.0, 10.0));
    apply_pointer(&mut state, &PointerInput::moved(11.0, 11.0));
    apply_pointer(&mut state, &PointerInput::moved(20.0, 10.0));
    apply_pointer(&mut state, &PointerInput::moved(21.0, 10.0));
    apply_pointer(&mut state, &PointerInput::up(21.0, 10.0));

    let stroke = &state.canvas.lines[0];
    assert_eq!(stroke.points, vec![10.0, 10.0, 20.0, 10.0]);
    assert_eq!(stroke.size, 10.0);
}

#[test]
fn picked_brush_color_and_size_apply_to_new_strokes() {
    let mut state = State::default();
    actions::set_brush_color(&mut state, "  #00ff00 ");
    actions::set_brush_size(&mut state, BrushSize::from_label("xl").unwrap());
    actions::set_tool(&mut state, Tool::Brush);
    apply_pointer(&mut state, &PointerInput::down(10.0, 10.0));
    apply_pointer(&mut state, &PointerInput::up(10.0, 10.0));
    assert_eq!(state.canvas.lines[0].color, "#00ff00");
    assert_eq!(state.canvas.lines[0].size, 30.0);

    actions::set_brush_color(&mut state, "");
    actions::set_tool(&mut state, Tool::Rectangle);
    apply_pointer(&mut state, &PointerInput::down(100.0, 100.0));
    apply_pointer(&mut state, &PointerInput::up(140.0, 130.0));
    assert_eq!(state.canvas.shapes[0].color, "#000000");
}

#[test]
fn eraser_strokes_are_white() {
    let mut state = State::default();
    actions::set_tool(&mut state, Tool::Eraser);
    apply_pointer(&mut state, &PointerInput::down(10.0, 10.0));
    apply_pointer(&mut state, &PointerInput::up(10.0, 10.0));
    assert_eq!(state.canvas.lines[0].color, "#FFFFFF");
    assert_eq!(state.canvas.lines[0].tool, StrokeTool::Eraser);
}

#[test]
fn clicking_objects_selects_and_shift_toggles() {
    let mut state = create_test_state();
    let target = hit_test(&state.canvas, Point::new(520.0, 420.0));
    assert_eq!(target.as_deref(), Some("far"));

    apply_pointer(&mut state, &PointerInput::down(520.0, 420.0).on("far"));
    assert_eq!(state.selected_ids(), ["far".to_string()]);

    apply_pointer(&mut state, &PointerInput::down(20.0, 20.0).on("a").with_shift());
    assert_eq!(state.selected_ids(), ["far".to_string(), "a".to_string()]);

    apply_pointer(&mut state, &PointerInput::down(520.0, 420.0).on("far").with_shift());
    assert_eq!(state.selected_ids(), ["a".to_string()]);
}

#[test]
fn stale_click_targets_are_ignored() {
    let mut state = create_test_state();
    actions::set_selection(&mut state, vec!["a".into()]);
    apply_pointer(&mut state, &PointerInput::down(20.0, 20.0).on("deleted").with_shift());
    assert_eq!(state.selected_ids(), ["a".to_string()]);
}

#[test]
fn rubber_band_selects_what_it_covers() {
    let mut state = create_test_state();
    apply_pointer(&mut state, &PointerInput::down(0.0, 0.0));
    apply_pointer(&mut state, &PointerInput::moved(30.0, 30.0));
    assert!(state.selection.rect.is_some_and(|rect| rect.visible));
    apply_pointer(&mut state, &PointerInput::up(30.0, 30.0));
    assert_eq!(state.selected_ids(), ["a".to_string()]);
    assert!(state.selection.rect.is_none());
}

#[test]
fn inserted_images_need_positive_bounds() {
    let mut state = State::default();
    let flat = Bounds::from_rect(0.0, 0.0, 0.0, 10.0);
    assert!(actions::insert_image(&mut state, "data:x", flat).is_err());
    let square = Bounds::from_rect(5.0, 5.0, 10.0, 10.0);
    let id = actions::insert_image(&mut state, "data:x", square).unwrap();
    assert!(state.canvas.contains(&id));
}
