use std::f64::consts::{FRAC_PI_2, PI};

use serde::Serialize;

use crate::state::{
    CanvasImage, ImageFilter, Line, Point, SelectionRect, Shape, ShapeKind, State, StrokeTool,
    Tool, DEFAULT_BRUSH_COLOR,
};

pub const HIGHLIGHT_COLOR: &str = "#2196F3";
pub const RECT_OUTLINE_COLOR: &str = "#000000";
pub const TRANSPARENT: &str = "transparent";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub shadow_color: String,
    pub shadow_blur: f64,
    pub draggable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RenderDescriptor {
    Rect {
        id: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: ShapeStyle,
    },
    Ellipse {
        id: String,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        style: ShapeStyle,
    },
    RegularPolygon {
        id: String,
        x: f64,
        y: f64,
        sides: u32,
        radius: f64,
        style: ShapeStyle,
    },
    Star {
        id: String,
        x: f64,
        y: f64,
        num_points: u32,
        inner_radius: f64,
        outer_radius: f64,
        style: ShapeStyle,
    },
}

impl RenderDescriptor {
    pub fn style(&self) -> &ShapeStyle {
        match self {
            RenderDescriptor::Rect { style, .. }
            | RenderDescriptor::Ellipse { style, .. }
            | RenderDescriptor::RegularPolygon { style, .. }
            | RenderDescriptor::Star { style, .. } => style,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Composite {
    SourceOver,
    DestinationOut,
}

impl Composite {
    pub fn as_str(self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::DestinationOut => "destination-out",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDescriptor {
    pub id: String,
    pub points: Vec<f64>,
    pub stroke: String,
    pub stroke_width: f64,
    pub composite: Composite,
    pub shadow_blur: f64,
}

/// Everything the surface needs to paint one frame, back to front.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
    pub images: Vec<CanvasImage>,
    pub shapes: Vec<RenderDescriptor>,
    pub lines: Vec<LineDescriptor>,
    pub selection_rect: Option<SelectionRect>,
    pub edit_region: Option<SelectionRect>,
    pub preview: Option<String>,
}

fn style(shape: &Shape, is_selected: bool, tool: Tool) -> ShapeStyle {
    let fill = if shape.color.is_empty() {
        DEFAULT_BRUSH_COLOR.to_string()
    } else {
        shape.color.clone()
    };
    let (stroke, stroke_width) = match (is_selected, shape.kind) {
        (true, _) => (HIGHLIGHT_COLOR, 2.0),
        (false, ShapeKind::Rectangle) => (RECT_OUTLINE_COLOR, 1.0),
        (false, _) => (TRANSPARENT, 0.0),
    };
    let glow = is_selected && shape.kind != ShapeKind::Rectangle;
    ShapeStyle {
        fill,
        stroke: stroke.to_string(),
        stroke_width,
        shadow_color: if glow { HIGHLIGHT_COLOR } else { TRANSPARENT }.to_string(),
        shadow_blur: if glow { 10.0 } else { 0.0 },
        draggable: tool == Tool::Select,
    }
}

/// Maps a stored shape to its visual. Negative sizes are normalized so the
/// result does not depend on the drag direction that produced the shape.
pub fn render_shape(shape: &Shape, is_selected: bool, tool: Tool) -> RenderDescriptor {
    let width = shape.width.abs();
    let height = shape.height.abs();
    let left = shape.x.min(shape.x + shape.width);
    let top = shape.y.min(shape.y + shape.height);
    let center_x = left + width / 2.0;
    let center_y = top + height / 2.0;
    let extent = width.min(height);
    let id = shape.id.clone();
    let style = style(shape, is_selected, tool);
    match shape.kind {
        ShapeKind::Rectangle => RenderDescriptor::Rect {
            id,
            x: left,
            y: top,
            width,
            height,
            style,
        },
        ShapeKind::Circle => RenderDescriptor::Ellipse {
            id,
            x: center_x,
            y: center_y,
            radius_x: width / 2.0,
            radius_y: height / 2.0,
            style,
        },
        ShapeKind::Triangle => RenderDescriptor::RegularPolygon {
            id,
            x: center_x,
            y: center_y,
            sides: 3,
            radius: extent / 2.0,
            style,
        },
        ShapeKind::Star => RenderDescriptor::Star {
            id,
            x: center_x,
            y: center_y,
            num_points: 5,
            inner_radius: extent / 4.0,
            outer_radius: extent / 2.0,
            style,
        },
    }
}

pub fn render_line(line: &Line, is_selected: bool) -> LineDescriptor {
    let composite = match line.tool {
        StrokeTool::Brush => Composite::SourceOver,
        StrokeTool::Eraser => Composite::DestinationOut,
    };
    LineDescriptor {
        id: line.id.clone(),
        points: line.points.clone(),
        stroke: line.color.clone(),
        stroke_width: line.size,
        composite,
        shadow_blur: if is_selected { 10.0 } else { 0.0 },
    }
}

pub fn render_scene(state: &State) -> Scene {
    let tool = state.tool();
    let selection = &state.selection;
    let mut lines: Vec<LineDescriptor> = state
        .canvas
        .lines
        .iter()
        .map(|line| render_line(line, selection.is_selected(&line.id)))
        .collect();
    if let Some(line) = state.canvas.drawing_line() {
        lines.push(render_line(line, false));
    }
    Scene {
        images: state.canvas.images.clone(),
        shapes: state
            .canvas
            .shapes
            .iter()
            .map(|shape| render_shape(shape, selection.is_selected(&shape.id), tool))
            .collect(),
        lines,
        selection_rect: selection.rect.filter(|rect| rect.visible),
        edit_region: selection.edit_region,
        preview: state.ai.preview.clone(),
    }
}

/// Only the given objects, unhighlighted and without overlays. This is what
/// gets captured for an AI request.
pub fn render_export<S: AsRef<str>>(state: &State, ids: &[S]) -> Scene {
    let wanted = |id: &str| ids.iter().any(|wanted| wanted.as_ref() == id);
    Scene {
        images: state
            .canvas
            .images
            .iter()
            .filter(|image| wanted(&image.id))
            .cloned()
            .collect(),
        shapes: state
            .canvas
            .shapes
            .iter()
            .filter(|shape| wanted(&shape.id))
            .map(|shape| render_shape(shape, false, Tool::Select))
            .collect(),
        lines: state
            .canvas
            .lines
            .iter()
            .filter(|line| wanted(&line.id))
            .map(|line| render_line(line, false))
            .collect(),
        ..Scene::default()
    }
}

/// Vertices of a regular polygon, the first one straight above the center.
pub fn regular_polygon_vertices(x: f64, y: f64, sides: u32, radius: f64) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = f64::from(i) * 2.0 * PI / f64::from(sides) - FRAC_PI_2;
            Point::new(x + radius * angle.cos(), y + radius * angle.sin())
        })
        .collect()
}

/// Alternating outer and inner vertices, starting with the top point.
pub fn star_vertices(x: f64, y: f64, num_points: u32, inner: f64, outer: f64) -> Vec<Point> {
    (0..num_points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = f64::from(i) * PI / f64::from(num_points) - FRAC_PI_2;
            Point::new(x + radius * angle.cos(), y + radius * angle.sin())
        })
        .collect()
}

/// CSS filter string for the 2D context. Values are offsets from neutral.
pub fn filter_css(filter: &ImageFilter) -> String {
    format!(
        "brightness({}%) contrast({}%) saturate({}%) blur({}px)",
        100.0 + filter.brightness,
        100.0 + filter.contrast,
        100.0 + filter.saturation,
        filter.blur.max(0.0)
    )
}
