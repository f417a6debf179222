use crate::error::CanvasError;
use crate::geometry::{distance, normalize_point, simplify_points, Bounds};
use crate::selection::{expand_by_collision, live_ids, select_in_rect};
use crate::state::{
    BrushSize, CanvasImage, DrawMode, Line, Point, SelectionRect, Shape, ShapeKind, State,
    StrokeTool, Tool, DEFAULT_BRUSH_COLOR, ERASER_COLOR,
};
use crate::util::{make_id, sanitize_color};

pub fn set_tool(state: &mut State, tool: Tool) {
    if state.tool.tool == tool {
        return;
    }
    commit_line(state);
    finish_shape(state);
    state.selection.rect = None;
    state.selection.rect_start = None;
    state.selection.edit_region_start = None;
    state.tool.tool = tool;
    log::debug!("Tool changed to {tool:?}");
}

pub fn set_brush_color(state: &mut State, color: &str) {
    state.tool.brush_color = sanitize_color(color, DEFAULT_BRUSH_COLOR);
}

pub fn set_brush_size(state: &mut State, size: BrushSize) {
    state.tool.brush_size = size;
}

pub fn start_line(state: &mut State, tool: StrokeTool, point: Point) -> Option<String> {
    let point = normalize_point(point)?;
    commit_line(state);
    let color = match tool {
        StrokeTool::Brush => state.tool.brush_color.clone(),
        StrokeTool::Eraser => ERASER_COLOR.to_string(),
    };
    let id = make_id("line");
    state.canvas.draw = DrawMode::Drawing {
        line: Line {
            id: id.clone(),
            tool,
            points: vec![point.x, point.y],
            color,
            size: state.tool.brush_size.width(),
        },
    };
    Some(id)
}

/// Appends only when the pointer moved further than the sampling distance.
pub fn extend_line(state: &mut State, point: Point) -> bool {
    let Some(point) = normalize_point(point) else {
        return false;
    };
    let threshold = state.config.sample_distance;
    let DrawMode::Drawing { line } = &mut state.canvas.draw else {
        return false;
    };
    if let Some(last) = line.last_point() {
        if distance(last, point) <= threshold {
            return false;
        }
    }
    line.points.push(point.x);
    line.points.push(point.y);
    true
}

pub fn commit_line(state: &mut State) -> Option<String> {
    let DrawMode::Drawing { line } = std::mem::replace(&mut state.canvas.draw, DrawMode::Idle)
    else {
        return None;
    };
    let id = line.id.clone();
    add_line(state, line);
    Some(id)
}

pub fn add_line(state: &mut State, mut line: Line) {
    if line.points.len() < 2 {
        return;
    }
    let before = line.point_count();
    line.points = simplify_points(
        &line.points,
        state.config.simplify_above,
        state.config.simplify_target,
    );
    if line.point_count() != before {
        log::debug!("Simplified line {} from {before} to {} points", line.id, line.point_count());
    }
    state.canvas.lines.push(line);
}

pub fn start_shape(state: &mut State, kind: ShapeKind, point: Point) -> Option<String> {
    let point = normalize_point(point)?;
    finish_shape(state);
    let id = make_id("shape");
    state.canvas.shapes.push(Shape {
        id: id.clone(),
        kind,
        x: point.x,
        y: point.y,
        width: 0.0,
        height: 0.0,
        color: state.tool.brush_color.clone(),
        is_drawing: true,
    });
    Some(id)
}

/// Size follows the pointer relative to the origin, sign included.
pub fn resize_shape(state: &mut State, point: Point) -> bool {
    let Some(point) = normalize_point(point) else {
        return false;
    };
    let Some(shape) = state.canvas.shapes.iter_mut().rev().find(|shape| shape.is_drawing) else {
        return false;
    };
    shape.width = point.x - shape.x;
    shape.height = point.y - shape.y;
    true
}

pub fn finish_shape(state: &mut State) -> Option<String> {
    let mut finished = None;
    for shape in state.canvas.shapes.iter_mut().filter(|shape| shape.is_drawing) {
        shape.is_drawing = false;
        finished = Some(shape.id.clone());
    }
    let id = finished?;
    set_selection(state, vec![id.clone()]);
    Some(id)
}

/// Replaces the selection, dropping stale ids. With `expand_on_select` a
/// single selected object grows to everything touching it.
pub fn set_selection(state: &mut State, ids: Vec<String>) {
    let mut ids = live_ids(&state.canvas, &ids);
    if state.config.expand_on_select && ids.len() == 1 && !state.ai.is_processing {
        ids = expand_by_collision(&state.canvas, &ids);
    }
    state.selection.selected_ids = ids;
}

pub fn toggle_selection(state: &mut State, id: &str) {
    let mut ids = live_ids(&state.canvas, &state.selection.selected_ids);
    if let Some(index) = ids.iter().position(|selected| selected == id) {
        ids.remove(index);
        state.selection.selected_ids = ids;
    } else if state.canvas.contains(id) {
        ids.push(id.to_string());
        state.selection.selected_ids = ids;
    }
}

pub fn clear_selection(state: &mut State) {
    state.selection.selected_ids.clear();
}

pub fn select_all(state: &mut State) {
    state.selection.selected_ids = state.canvas.object_ids().map(str::to_string).collect();
}

pub fn start_selection_rect(state: &mut State, point: Point) {
    let Some(point) = normalize_point(point) else {
        return;
    };
    state.selection.rect_start = Some(point);
    state.selection.rect = Some(SelectionRect::from_corners(point, point));
}

pub fn update_selection_rect(state: &mut State, point: Point) {
    let (Some(start), Some(point)) = (state.selection.rect_start, normalize_point(point)) else {
        return;
    };
    state.selection.rect = Some(SelectionRect::from_corners(start, point));
}

pub fn end_selection_rect(state: &mut State) {
    state.selection.rect_start = None;
    let Some(rect) = state.selection.rect.take() else {
        return;
    };
    let ids = select_in_rect(&state.canvas, rect);
    set_selection(state, ids);
}

pub fn start_edit_region(state: &mut State, point: Point) {
    let Some(point) = normalize_point(point) else {
        return;
    };
    state.selection.edit_region_start = Some(point);
    state.selection.edit_region = Some(SelectionRect::from_corners(point, point));
}

pub fn update_edit_region(state: &mut State, point: Point) {
    let (Some(start), Some(point)) = (state.selection.edit_region_start, normalize_point(point))
    else {
        return;
    };
    state.selection.edit_region = Some(SelectionRect::from_corners(start, point));
}

/// Keeps the region for the next edit request; a click without a drag clears it.
pub fn end_edit_region(state: &mut State) {
    if state.selection.edit_region_start.take().is_none() {
        return;
    }
    if let Some(region) = state.selection.edit_region {
        if region.width <= 0.0 || region.height <= 0.0 {
            state.selection.edit_region = None;
        }
    }
}

pub fn delete_selected(state: &mut State) -> usize {
    let ids = std::mem::take(&mut state.selection.selected_ids);
    delete_objects(state, &ids).unwrap_or(0)
}

/// Removes the given objects and drops them from the selection. Ids that no
/// longer exist are skipped; fails only when a live target is still present
/// afterwards.
pub fn delete_objects<S: AsRef<str>>(
    state: &mut State,
    ids: &[S],
) -> Result<usize, CanvasError> {
    let ids = live_ids(&state.canvas, ids);
    if ids.is_empty() {
        return Ok(0);
    }
    let doomed = |id: &String| ids.contains(id);
    let before = state.canvas.object_count();
    state.canvas.shapes.retain(|shape| !doomed(&shape.id));
    state.canvas.lines.retain(|line| !doomed(&line.id));
    state.canvas.images.retain(|image| !doomed(&image.id));
    state
        .selection
        .selected_ids
        .retain(|selected| !ids.contains(selected));
    let survivors = ids.iter().filter(|id| state.canvas.contains(id)).count();
    if survivors > 0 {
        return Err(CanvasError::Undeleted(survivors));
    }
    Ok(before - state.canvas.object_count())
}

pub fn clear_canvas(state: &mut State) {
    state.canvas.lines.clear();
    state.canvas.shapes.clear();
    state.canvas.images.clear();
    state.canvas.draw = DrawMode::Idle;
    state.selection.selected_ids.clear();
    state.selection.rect = None;
    state.selection.rect_start = None;
}

pub fn insert_image(state: &mut State, src: &str, bounds: Bounds) -> Result<String, CanvasError> {
    if src.is_empty() || !bounds.is_finite() || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Err(CanvasError::InvalidBounds);
    }
    let id = make_id("image");
    state.canvas.images.push(CanvasImage {
        id: id.clone(),
        src: src.to_string(),
        x: bounds.min_x,
        y: bounds.min_y,
        width: bounds.width(),
        height: bounds.height(),
    });
    Ok(id)
}
