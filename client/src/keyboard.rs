use crate::actions;
use crate::state::{State, Tool};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusTarget {
    #[default]
    Canvas,
    /// input, textarea or select
    TextField,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub focus: FocusTarget,
}

impl KeyInput {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_field(mut self) -> Self {
        self.focus = FocusTarget::TextField;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    SetTool(Tool),
    SelectAll,
    /// The host downloads the current image.
    Save,
    OpenUpload,
    CommandPalette,
    Undo,
    Redo,
    CancelTool,
    ClearSelection,
    DeleteSelection,
    ToggleColorPicker,
    ToggleFilterPanel,
    ShowHelp,
    ClearCanvas,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub shortcut: Option<Shortcut>,
    pub prevent_default: bool,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled(shortcut: Shortcut) -> Self {
        Self {
            shortcut: Some(shortcut),
            prevent_default: false,
        }
    }

    fn consumed(shortcut: Shortcut) -> Self {
        Self {
            shortcut: Some(shortcut),
            prevent_default: true,
        }
    }
}

fn tool_for_key(key: &str) -> Option<Tool> {
    match key.to_ascii_lowercase().as_str() {
        "1" | "v" => Some(Tool::Select),
        "2" | "b" => Some(Tool::Brush),
        "3" | "e" => Some(Tool::Eraser),
        "4" | "r" => Some(Tool::Rectangle),
        "5" | "c" => Some(Tool::Circle),
        "6" | "t" => Some(Tool::Triangle),
        "7" | "s" => Some(Tool::Star),
        "8" | "a" => Some(Tool::AiEdit),
        _ => None,
    }
}

fn modifier_shortcut(input: &KeyInput) -> Option<Shortcut> {
    match input.key.to_ascii_lowercase().as_str() {
        "a" => Some(Shortcut::SelectAll),
        "s" => Some(Shortcut::Save),
        "o" => Some(Shortcut::OpenUpload),
        "k" => Some(Shortcut::CommandPalette),
        "z" if input.shift => Some(Shortcut::Redo),
        "z" => Some(Shortcut::Undo),
        _ => None,
    }
}

fn plain_shortcut(state: &State, input: &KeyInput) -> Option<Shortcut> {
    match input.key.as_str() {
        "Escape" if state.tool() != Tool::Select => Some(Shortcut::CancelTool),
        "Escape" => Some(Shortcut::ClearSelection),
        "Delete" | "Backspace" => Some(Shortcut::DeleteSelection),
        "p" | "P" => Some(Shortcut::ToggleColorPicker),
        "f" | "F" if state.has_image() => Some(Shortcut::ToggleFilterPanel),
        "f" | "F" => None,
        "?" => Some(Shortcut::ShowHelp),
        "x" | "X" if input.shift => Some(Shortcut::ClearCanvas),
        "x" | "X" => None,
        key => match tool_for_key(key)? {
            Tool::AiEdit if !state.has_image() => None,
            tool => Some(Shortcut::SetTool(tool)),
        },
    }
}

/// Resolves a keydown to at most one shortcut and applies it.
pub fn dispatch_key(state: &mut State, input: &KeyInput) -> KeyOutcome {
    if input.focus == FocusTarget::TextField {
        return KeyOutcome::ignored();
    }
    let outcome = if input.ctrl || input.meta {
        match modifier_shortcut(input) {
            Some(shortcut) => KeyOutcome::consumed(shortcut),
            None => KeyOutcome::ignored(),
        }
    } else {
        match plain_shortcut(state, input) {
            Some(shortcut) => KeyOutcome::handled(shortcut),
            None => KeyOutcome::ignored(),
        }
    };
    if let Some(shortcut) = outcome.shortcut {
        log::debug!("Shortcut {shortcut:?} from key {:?}", input.key);
        apply_shortcut(state, shortcut);
    }
    outcome
}

pub fn apply_shortcut(state: &mut State, shortcut: Shortcut) {
    match shortcut {
        Shortcut::SetTool(tool) => actions::set_tool(state, tool),
        Shortcut::SelectAll => actions::select_all(state),
        Shortcut::OpenUpload => state.ui.upload_dialog_open = true,
        Shortcut::CommandPalette => state.ui.command_palette_open = true,
        Shortcut::CancelTool => actions::set_tool(state, Tool::Select),
        Shortcut::ClearSelection => actions::clear_selection(state),
        Shortcut::DeleteSelection => {
            actions::delete_selected(state);
        }
        Shortcut::ToggleColorPicker => {
            state.ui.color_picker_open = !state.ui.color_picker_open;
            state.ui.filter_panel_open = false;
        }
        Shortcut::ToggleFilterPanel => {
            state.ui.filter_panel_open = !state.ui.filter_panel_open;
            state.ui.color_picker_open = false;
        }
        Shortcut::ShowHelp => state.ui.shortcuts_open = true,
        Shortcut::ClearCanvas => actions::clear_canvas(state),
        Shortcut::Save | Shortcut::Undo | Shortcut::Redo => {}
    }
}
