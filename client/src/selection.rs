use std::collections::HashSet;

use crate::geometry::{image_bounds, object_bounds, shape_bounds, Bounds};
use crate::state::{CanvasState, SelectionRect};

/// Drops empty, unknown and repeated ids, keeping the original order.
pub fn live_ids<S: AsRef<str>>(canvas: &CanvasState, ids: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.as_ref())
        .filter(|id: &&str| !id.is_empty() && canvas.contains(id))
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Shapes and images whose box touches the rect, then lines with at least
/// one point inside it.
pub fn select_in_rect(canvas: &CanvasState, rect: SelectionRect) -> Vec<String> {
    let area = Bounds::from(rect);
    if !area.is_finite() {
        return Vec::new();
    }
    let shapes = canvas
        .shapes
        .iter()
        .filter(|shape| shape_bounds(shape).is_some_and(|bounds| bounds.intersects(&area)))
        .map(|shape| shape.id.clone());
    let lines = canvas
        .lines
        .iter()
        .filter(|line| line.points().any(|point| area.contains(point)))
        .map(|line| line.id.clone());
    let images = canvas
        .images
        .iter()
        .filter(|image| image_bounds(image).is_some_and(|bounds| bounds.intersects(&area)))
        .map(|image| image.id.clone());
    shapes.chain(lines).chain(images).collect()
}

/// Adds every object whose box intersects one of the initial objects.
/// One hop only: objects pulled in here do not pull in their own neighbours.
pub fn expand_by_collision<S: AsRef<str>>(canvas: &CanvasState, ids: &[S]) -> Vec<String> {
    let initial = live_ids(canvas, ids);
    let mut expanded = initial.clone();
    let mut included: HashSet<String> = initial.iter().cloned().collect();

    let sources: Vec<Bounds> = initial
        .iter()
        .filter_map(|id| object_bounds(canvas, id))
        .collect();
    if sources.is_empty() {
        return expanded;
    }

    for id in canvas.object_ids() {
        if included.contains(id) {
            continue;
        }
        let Some(bounds) = object_bounds(canvas, id) else {
            continue;
        };
        if sources.iter().any(|source| source.intersects(&bounds)) {
            included.insert(id.to_string());
            expanded.push(id.to_string());
        }
    }

    if expanded.len() > initial.len() {
        log::debug!(
            "Collision expansion added {} touching objects",
            expanded.len() - initial.len()
        );
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Shape, ShapeKind, State};

    fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape {
            id: id.into(),
            kind: ShapeKind::Rectangle,
            x,
            y,
            width: w,
            height: h,
            color: "#000000".into(),
            is_drawing: false,
        }
    }

    #[test]
    fn live_ids_filters_stale_and_duplicates() {
        let mut state = State::default();
        state.canvas.shapes.push(rect("a", 0.0, 0.0, 1.0, 1.0));
        let ids = live_ids(&state.canvas, &["a", "", "gone", "a"]);
        assert_eq!(ids, vec!["a".to_string()]);
    }

    #[test]
    fn expansion_is_one_hop() {
        let mut state = State::default();
        // a touches b, b touches c, a does not touch c
        state.canvas.shapes.push(rect("a", 0.0, 0.0, 10.0, 10.0));
        state.canvas.shapes.push(rect("b", 8.0, 0.0, 10.0, 10.0));
        state.canvas.shapes.push(rect("c", 16.0, 0.0, 10.0, 10.0));
        let expanded = expand_by_collision(&state.canvas, &["a"]);
        assert_eq!(expanded, vec!["a".to_string(), "b".to_string()]);
    }
}
