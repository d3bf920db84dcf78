//! Action dispatcher - turns presses on item stacks into export requests
//!
//! Pressing an inventory stack asks for more of that item to be exported;
//! pressing a pending export cancels part of it. The request is only a side
//! effect: the dashboard changes once the server pushes the new state.

use crate::constants::{BATCH_QUANTITY, MAX_EXPORT_QUANTITY, MAX_PROMPT_LEN};
use crate::models::ExportRequest;
use crate::render::GridId;

/// Modifier keys held during a press
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PressModifiers {
    /// ctrl / cmd: ask for the quantity
    pub qualifier: bool,
    /// shift: use the batch quantity
    pub shift: bool,
}

/// Inline quantity prompt attached to a stack element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantityPrompt {
    pub grid: GridId,
    pub element_id: String,
    pub item_id: String,
    pub text: String,
    submit: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    /// The press landed on a grid that does not export
    Ignored,
    /// A quantity prompt was opened; the request waits for it to lose focus
    Prompting,
    /// Quantity failed validation, nothing is sent
    Dropped,
    Send(ExportRequest),
}

#[derive(Debug)]
pub struct Dispatcher {
    area_id: String,
    prompt: Option<QuantityPrompt>,
}

impl Dispatcher {
    pub fn new(area_id: impl Into<String>) -> Self {
        Dispatcher {
            area_id: area_id.into(),
            prompt: None,
        }
    }

    pub fn prompt(&self) -> Option<&QuantityPrompt> {
        self.prompt.as_ref()
    }

    /// Primary press on a stack element
    ///
    /// An open prompt loses focus first, without submitting.
    pub fn press(&mut self, grid: GridId, element_id: &str, item_id: &str, modifiers: PressModifiers) -> PressOutcome {
        if self.prompt.is_some() {
            self.blur();
        }
        if !grid.accepts_press() {
            return PressOutcome::Ignored;
        }
        if modifiers.qualifier {
            self.prompt = Some(QuantityPrompt {
                grid,
                element_id: element_id.to_string(),
                item_id: item_id.to_string(),
                text: String::new(),
                submit: false,
            });
            return PressOutcome::Prompting;
        }
        let quantity = if modifiers.shift { BATCH_QUANTITY } else { 1 };
        self.outcome(grid, item_id, Some(quantity))
    }

    pub fn prompt_char(&mut self, c: char) {
        if let Some(prompt) = self.prompt.as_mut() {
            if prompt.text.chars().count() < MAX_PROMPT_LEN {
                prompt.text.push(c);
            }
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.text.pop();
        }
    }

    /// Enter inside the prompt: mark it submitted, then let it lose focus
    pub fn prompt_confirm(&mut self) -> PressOutcome {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.submit = true;
        }
        self.blur()
    }

    /// The prompt lost focus; only a submitted prompt produces a request
    pub fn blur(&mut self) -> PressOutcome {
        let Some(prompt) = self.prompt.take() else {
            return PressOutcome::Ignored;
        };
        if !prompt.submit {
            return PressOutcome::Ignored;
        }
        self.outcome(prompt.grid, &prompt.item_id, parse_quantity(&prompt.text))
    }

    fn outcome(&self, grid: GridId, item_id: &str, quantity: Option<i64>) -> PressOutcome {
        let Some(quantity) = validate_quantity(quantity) else {
            tracing::debug!(item_id, ?quantity, "export quantity rejected");
            return PressOutcome::Dropped;
        };
        let count = if grid == GridId::Exporting { -quantity } else { quantity };
        PressOutcome::Send(ExportRequest {
            area_id: self.area_id.clone(),
            item_id: item_id.to_string(),
            count,
        })
    }
}

/// Parse the leading integer of `text` (leading whitespace, optional sign, digits)
///
/// Trailing garbage is ignored; no digits, or a value outside `i64`, is `None`.
pub fn parse_quantity(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits: &str = &rest[..rest.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Present, non-zero and within the accepted range
pub fn validate_quantity(quantity: Option<i64>) -> Option<i64> {
    quantity.filter(|q| *q != 0 && q.abs() <= MAX_EXPORT_QUANTITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent(outcome: PressOutcome) -> ExportRequest {
        match outcome {
            PressOutcome::Send(request) => request,
            other => panic!("expected a request, got {:?}", other),
        }
    }

    #[test]
    fn test_pending_export_press_inverts_sign() {
        let mut dispatcher = Dispatcher::new("storage.0");
        let request = sent(dispatcher.press(GridId::Exporting, "exp-wood/0", "wood/0", PressModifiers::default()));
        assert_eq!(request.count, -1);
        assert_eq!(request.item_id, "wood/0");
        assert_eq!(request.area_id, "storage.0");

        let request = sent(dispatcher.press(GridId::Inventory, "inv-wood/0", "wood/0", PressModifiers::default()));
        assert_eq!(request.count, 1);
    }

    #[test]
    fn test_shift_uses_batch_quantity() {
        let mut dispatcher = Dispatcher::new("storage.0");
        let modifiers = PressModifiers { qualifier: false, shift: true };
        assert_eq!(sent(dispatcher.press(GridId::Inventory, "inv-a", "a", modifiers)).count, 64);
        assert_eq!(sent(dispatcher.press(GridId::Exporting, "exp-a", "a", modifiers)).count, -64);
    }

    #[test]
    fn test_in_flight_and_workers_ignore_presses() {
        let mut dispatcher = Dispatcher::new("storage.0");
        assert_eq!(
            dispatcher.press(GridId::InFlight, "alloc-a", "a", PressModifiers::default()),
            PressOutcome::Ignored
        );
        assert_eq!(
            dispatcher.press(GridId::Workers, "turtle-t", "t", PressModifiers::default()),
            PressOutcome::Ignored
        );
    }

    #[test]
    fn test_validation_boundaries() {
        for rejected in [Some(0), None, Some(1_000_001), Some(-1_000_001)] {
            assert_eq!(validate_quantity(rejected), None, "{:?} should be rejected", rejected);
        }
        assert_eq!(validate_quantity(Some(1_000_000)), Some(1_000_000));
        assert_eq!(validate_quantity(Some(-1_000_000)), Some(-1_000_000));
    }

    #[test]
    fn test_parse_quantity_like_a_leading_integer() {
        assert_eq!(parse_quantity("  42"), Some(42));
        assert_eq!(parse_quantity("-7 stacks"), Some(-7));
        assert_eq!(parse_quantity("+3"), Some(3));
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("-"), None);
        assert_eq!(parse_quantity("99999999999999999999"), None);
    }

    #[test]
    fn test_prompt_submits_only_on_confirm() {
        let mut dispatcher = Dispatcher::new("storage.0");
        let ctrl = PressModifiers { qualifier: true, shift: false };

        assert_eq!(dispatcher.press(GridId::Inventory, "inv-a", "a", ctrl), PressOutcome::Prompting);
        for c in "250".chars() {
            dispatcher.prompt_char(c);
        }
        assert_eq!(dispatcher.prompt().map(|p| p.text.as_str()), Some("250"));
        assert_eq!(sent(dispatcher.prompt_confirm()).count, 250);
        assert!(dispatcher.prompt().is_none());

        // focus lost without confirming
        dispatcher.press(GridId::Exporting, "exp-a", "a", ctrl);
        dispatcher.prompt_char('5');
        assert_eq!(dispatcher.blur(), PressOutcome::Ignored);
        assert!(dispatcher.prompt().is_none());
    }

    #[test]
    fn test_prompt_on_pending_export_inverts_and_validates() {
        let mut dispatcher = Dispatcher::new("storage.0");
        let ctrl = PressModifiers { qualifier: true, shift: false };

        dispatcher.press(GridId::Exporting, "exp-a", "a", ctrl);
        dispatcher.prompt_char('1');
        dispatcher.prompt_char('2');
        assert_eq!(sent(dispatcher.prompt_confirm()).count, -12);

        dispatcher.press(GridId::Inventory, "inv-a", "a", ctrl);
        for c in "1000001".chars() {
            dispatcher.prompt_char(c);
        }
        assert_eq!(dispatcher.prompt_confirm(), PressOutcome::Dropped);

        dispatcher.press(GridId::Inventory, "inv-a", "a", ctrl);
        dispatcher.prompt_char('x');
        assert_eq!(dispatcher.prompt_confirm(), PressOutcome::Dropped);
    }

    #[test]
    fn test_prompt_text_is_bounded() {
        let mut dispatcher = Dispatcher::new("storage.0");
        let ctrl = PressModifiers { qualifier: true, shift: false };
        dispatcher.press(GridId::Inventory, "inv-a", "a", ctrl);
        for c in "-1000000".chars().chain(std::iter::repeat('9').take(10_000)) {
            dispatcher.prompt_char(c);
        }
        assert_eq!(dispatcher.prompt().map(|p| p.text.as_str()), Some("-1000000"));
        assert_eq!(sent(dispatcher.prompt_confirm()).count, -1_000_000);
    }

    #[test]
    fn test_press_elsewhere_blurs_open_prompt() {
        let mut dispatcher = Dispatcher::new("storage.0");
        let ctrl = PressModifiers { qualifier: true, shift: false };
        dispatcher.press(GridId::Inventory, "inv-a", "a", ctrl);
        dispatcher.prompt_char('9');

        let request = sent(dispatcher.press(GridId::Inventory, "inv-b", "b", PressModifiers::default()));
        assert_eq!(request.item_id, "b");
        assert!(dispatcher.prompt().is_none());
    }
}
