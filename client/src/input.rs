use crate::actions;
use crate::state::{Point, State, Tool};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// One pointer event in stage coordinates. `target` is the id of the object
/// under the pointer, `None` when the pointer is over empty canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInput {
    pub phase: PointerPhase,
    pub point: Point,
    pub target: Option<String>,
    pub shift: bool,
}

impl PointerInput {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            point: Point::new(x, y),
            target: None,
            shift: false,
        }
    }

    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    pub fn on(mut self, id: &str) -> Self {
        self.target = Some(id.to_string());
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

pub fn apply_pointer(state: &mut State, input: &PointerInput) {
    match input.phase {
        PointerPhase::Down => pointer_down(state, input),
        PointerPhase::Move => pointer_move(state, input),
        PointerPhase::Up => pointer_up(state),
    }
}

fn pointer_down(state: &mut State, input: &PointerInput) {
    let tool = state.tool();
    if let Some(kind) = tool.shape_kind() {
        actions::start_shape(state, kind, input.point);
        return;
    }
    if let Some(stroke) = tool.stroke_tool() {
        actions::start_line(state, stroke, input.point);
        return;
    }
    match tool {
        Tool::Select => select_down(state, input),
        Tool::AiEdit => actions::start_edit_region(state, input.point),
        _ => {}
    }
}

fn select_down(state: &mut State, input: &PointerInput) {
    let target = input
        .target
        .as_deref()
        .filter(|id| state.canvas.contains(id));
    match (target, input.shift) {
        (None, false) => {
            actions::clear_selection(state);
            actions::start_selection_rect(state, input.point);
        }
        (None, true) => {}
        (Some(id), true) => actions::toggle_selection(state, id),
        (Some(id), false) => actions::set_selection(state, vec![id.to_string()]),
    }
}

fn pointer_move(state: &mut State, input: &PointerInput) {
    match state.tool() {
        Tool::Select => actions::update_selection_rect(state, input.point),
        Tool::Brush | Tool::Eraser => {
            actions::extend_line(state, input.point);
        }
        Tool::AiEdit => actions::update_edit_region(state, input.point),
        _ => {
            actions::resize_shape(state, input.point);
        }
    }
}

fn pointer_up(state: &mut State) {
    match state.tool() {
        Tool::Select => actions::end_selection_rect(state),
        Tool::Brush | Tool::Eraser => {
            actions::commit_line(state);
        }
        Tool::AiEdit => actions::end_edit_region(state),
        _ => {
            actions::finish_shape(state);
        }
    }
}
