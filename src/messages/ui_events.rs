//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::dispatch::PressModifiers;
use crate::render::GridId;

/// Application tabs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AppTab {
    #[default]
    Storage,
    Turtles,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Tab navigation
    SwitchTab(AppTab),

    // Stack selection (keyboard)
    NextGrid,
    PrevGrid,
    SelectPrev,
    SelectNext,

    // Worker table
    ScrollUp,
    ScrollDown,

    /// Pointer press on a rendered stack
    Press {
        grid: GridId,
        element_id: String,
        modifiers: PressModifiers,
    },
    /// Keyboard press on the selected stack
    PressSelected(PressModifiers),

    // Quantity prompt
    PromptChar(char),
    PromptBackspace,
    PromptConfirm,
    PromptCancel,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Screen region occupied by a rendered stack, recorded while drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub area: Rect,
    pub grid: GridId,
    pub element_id: String,
}

/// UI context needed to interpret input
#[derive(Debug, Clone, Copy, Default)]
pub struct InputContext {
    pub active_tab: AppTab,
    pub show_help: bool,
    pub prompt_open: bool,
}

fn press_modifiers(modifiers: KeyModifiers) -> PressModifiers {
    PressModifiers {
        qualifier: modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
        shift: modifiers.contains(KeyModifiers::SHIFT),
    }
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, ctx: InputContext) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    if ctx.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if ctx.prompt_open {
        return match key.code {
            KeyCode::Enter => Some(UiEvent::PromptConfirm),
            KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab => Some(UiEvent::PromptCancel),
            KeyCode::Backspace => Some(UiEvent::PromptBackspace),
            KeyCode::Char(c) => Some(UiEvent::PromptChar(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Char('1') => return Some(UiEvent::SwitchTab(AppTab::Storage)),
        KeyCode::Char('2') => return Some(UiEvent::SwitchTab(AppTab::Turtles)),
        _ => {}
    }

    match ctx.active_tab {
        AppTab::Storage => match key.code {
            KeyCode::Tab => Some(UiEvent::NextGrid),
            KeyCode::BackTab => Some(UiEvent::PrevGrid),
            KeyCode::Left | KeyCode::Up => Some(UiEvent::SelectPrev),
            KeyCode::Right | KeyCode::Down => Some(UiEvent::SelectNext),
            KeyCode::Enter => Some(UiEvent::PressSelected(press_modifiers(key.modifiers))),
            KeyCode::Char('b') => Some(UiEvent::PressSelected(PressModifiers { qualifier: false, shift: true })),
            KeyCode::Char('n') => Some(UiEvent::PressSelected(PressModifiers { qualifier: true, shift: false })),
            _ => None,
        },
        AppTab::Turtles => match key.code {
            KeyCode::Up => Some(UiEvent::ScrollUp),
            KeyCode::Down => Some(UiEvent::ScrollDown),
            _ => None,
        },
    }
}

/// Convert a mouse event to a UiEvent using the stack regions of the last frame
pub fn mouse_to_ui_event(mouse: MouseEvent, hits: &[Hit], ctx: InputContext) -> Option<UiEvent> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || ctx.show_help {
        return None;
    }
    let position = Position::new(mouse.column, mouse.row);
    match hits.iter().find(|hit| hit.area.contains(position)) {
        Some(hit) => Some(UiEvent::Press {
            grid: hit.grid,
            element_id: hit.element_id.clone(),
            modifiers: press_modifiers(mouse.modifiers),
        }),
        // clicking outside the prompt takes its focus away
        None if ctx.prompt_open => Some(UiEvent::PromptCancel),
        None => None,
    }
}
