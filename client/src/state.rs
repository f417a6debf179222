use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;

pub const DEFAULT_BRUSH_COLOR: &str = "#000000";
pub const ERASER_COLOR: &str = "#FFFFFF";
pub const DEFAULT_STAGE_WIDTH: f64 = 800.0;
pub const DEFAULT_STAGE_HEIGHT: f64 = 600.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    Select,
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Triangle,
    Star,
    AiEdit,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Select,
        Tool::Brush,
        Tool::Eraser,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Triangle,
        Tool::Star,
        Tool::AiEdit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Brush => "brush",
            Tool::Eraser => "eraser",
            Tool::Rectangle => "rectangle",
            Tool::Circle => "circle",
            Tool::Triangle => "triangle",
            Tool::Star => "star",
            Tool::AiEdit => "ai-edit",
        }
    }

    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Circle => Some(ShapeKind::Circle),
            Tool::Triangle => Some(ShapeKind::Triangle),
            Tool::Star => Some(ShapeKind::Star),
            _ => None,
        }
    }

    pub fn stroke_tool(self) -> Option<StrokeTool> {
        match self {
            Tool::Brush => Some(StrokeTool::Brush),
            Tool::Eraser => Some(StrokeTool::Eraser),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushSize {
    S,
    #[default]
    M,
    L,
    XL,
}

impl BrushSize {
    pub const ALL: [BrushSize; 4] = [BrushSize::S, BrushSize::M, BrushSize::L, BrushSize::XL];

    pub fn as_str(self) -> &'static str {
        match self {
            BrushSize::S => "S",
            BrushSize::M => "M",
            BrushSize::L => "L",
            BrushSize::XL => "XL",
        }
    }

    /// Case-insensitive, as used by the size picker.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(label))
    }

    pub fn width(self) -> f64 {
        match self {
            BrushSize::S => 5.0,
            BrushSize::M => 10.0,
            BrushSize::L => 20.0,
            BrushSize::XL => 30.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    Brush,
    Eraser,
}

/// Freehand stroke. `points` is flattened `[x0, y0, x1, y1, ...]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: String,
    pub tool: StrokeTool,
    pub points: Vec<f64>,
    pub color: String,
    pub size: f64,
}

impl Line {
    pub fn point_count(&self) -> usize {
        self.points.len() / 2
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points().last()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Star,
}

/// Width and height keep the sign of the drag that created the shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    #[serde(default)]
    pub is_drawing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasImage {
    pub id: String,
    pub src: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

impl SelectionRect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
            visible: true,
        }
    }
}

pub enum DrawMode {
    Idle,
    Drawing { line: Line },
}

pub struct CanvasState {
    pub lines: Vec<Line>,
    pub shapes: Vec<Shape>,
    pub images: Vec<CanvasImage>,
    pub stage_width: f64,
    pub stage_height: f64,
    pub draw: DrawMode,
}

impl CanvasState {
    pub fn contains(&self, id: &str) -> bool {
        self.shapes.iter().any(|shape| shape.id == id)
            || self.lines.iter().any(|line| line.id == id)
            || self.images.iter().any(|image| image.id == id)
    }

    /// Every object id, shapes first, then lines, then images.
    pub fn object_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.shapes
            .iter()
            .map(|shape| shape.id.as_str())
            .chain(self.lines.iter().map(|line| line.id.as_str()))
            .chain(self.images.iter().map(|image| image.id.as_str()))
    }

    pub fn object_count(&self) -> usize {
        self.shapes.len() + self.lines.len() + self.images.len()
    }

    pub fn drawing_line(&self) -> Option<&Line> {
        match &self.draw {
            DrawMode::Drawing { line } => Some(line),
            DrawMode::Idle => None,
        }
    }

    pub fn drawing_shape(&self) -> Option<&Shape> {
        self.shapes.iter().rev().find(|shape| shape.is_drawing)
    }
}

pub struct ToolState {
    pub tool: Tool,
    pub brush_color: String,
    pub brush_size: BrushSize,
}

#[derive(Default)]
pub struct SelectionState {
    pub selected_ids: Vec<String>,
    pub rect: Option<SelectionRect>,
    pub rect_start: Option<Point>,
    /// Region dragged out with the `ai-edit` tool, in image coordinates.
    pub edit_region: Option<SelectionRect>,
    pub edit_region_start: Option<Point>,
}

impl SelectionState {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|selected| selected == id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RasterImage {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Brightness,
    Contrast,
    Saturation,
    Blur,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFilter {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub blur: f64,
}

#[derive(Default)]
pub struct ImageState {
    pub image: Option<RasterImage>,
    pub original: Option<RasterImage>,
    pub filter: ImageFilter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

#[derive(Default)]
pub struct UiState {
    pub color_picker_open: bool,
    pub filter_panel_open: bool,
    pub upload_dialog_open: bool,
    pub shortcuts_open: bool,
    pub command_palette_open: bool,
    pub notifications: Vec<Notification>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AiPhase {
    #[default]
    Idle,
    Capturing,
    Requesting,
    Previewing,
    Applying,
}

#[derive(Default)]
pub struct AiState {
    pub phase: AiPhase,
    pub is_processing: bool,
    /// 0.0 to 1.0, never decreases within a session.
    pub progress: f64,
    pub preview: Option<String>,
}

impl AiState {
    pub fn begin(&mut self) {
        self.is_processing = true;
        self.phase = AiPhase::Capturing;
        self.progress = 0.1;
        self.preview = None;
    }

    pub fn advance(&mut self, phase: AiPhase, progress: f64) {
        self.phase = phase;
        if progress.is_finite() {
            self.progress = self.progress.max(progress.min(1.0));
        }
    }

    pub fn reset(&mut self) {
        *self = AiState::default();
    }
}

pub struct State {
    pub config: EditorConfig,
    pub canvas: CanvasState,
    pub tool: ToolState,
    pub selection: SelectionState,
    pub image: ImageState,
    pub ui: UiState,
    pub ai: AiState,
}

impl Default for State {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl State {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            canvas: CanvasState {
                lines: Vec::new(),
                shapes: Vec::new(),
                images: Vec::new(),
                stage_width: DEFAULT_STAGE_WIDTH,
                stage_height: DEFAULT_STAGE_HEIGHT,
                draw: DrawMode::Idle,
            },
            tool: ToolState {
                tool: Tool::Select,
                brush_color: DEFAULT_BRUSH_COLOR.to_string(),
                brush_size: BrushSize::default(),
            },
            selection: SelectionState::default(),
            image: ImageState::default(),
            ui: UiState::default(),
            ai: AiState::default(),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool.tool
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selection.selected_ids
    }

    pub fn has_image(&self) -> bool {
        self.image.image.is_some()
    }

    /// The UI disables prompt submission while this is false.
    pub fn can_submit_prompt(&self) -> bool {
        !self.ai.is_processing
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NotificationKind::Success => log::info!("{message}"),
            NotificationKind::Error => log::warn!("{message}"),
        }
        self.ui.notifications.push(Notification { kind, message });
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.ui.notifications)
    }
}
