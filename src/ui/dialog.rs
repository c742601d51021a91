use crate::{
    background::opacity_byte_to_percent,
    ui::{InputEvent, Point, Rect, UIComponent, VK_BACK, VK_ESCAPE, VK_RETURN},
};

const MAX_INPUT_CHARS: usize = 31;
const DIALOG_WIDTH: f32 = 270.0;
const DIALOG_HEIGHT: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpacityDialogOutcome {
    /// Percentage already clamped to [0, 100].
    Accepted(u8),
    Cancelled,
}

/// "Background Opacity" prompt. The host feeds it input events and reads
/// back a typed outcome once the user presses Enter or Escape.
#[derive(Debug, Clone)]
pub struct OpacityDialog {
    bounds: Rect,
    visible: bool,
    text: String,
    replace_on_type: bool,
    outcome: Option<OpacityDialogOutcome>,
}

impl Default for OpacityDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl OpacityDialog {
    pub const TITLE: &'static str = "Background Opacity";
    pub const LABEL: &'static str = "Opacity (0-100%):";

    pub fn new() -> Self {
        Self {
            bounds: Rect {
                x: 300.0,
                y: 300.0,
                width: DIALOG_WIDTH,
                height: DIALOG_HEIGHT,
            },
            visible: false,
            text: String::new(),
            replace_on_type: false,
            outcome: None,
        }
    }

    /// Shows the dialog pre-filled with the current opacity as a percent,
    /// fully selected so the first keystroke replaces it.
    pub fn open(&mut self, current_opacity: u8) {
        self.text = opacity_byte_to_percent(current_opacity).to_string();
        self.replace_on_type = true;
        self.outcome = None;
        self.visible = true;
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn accept(&mut self) {
        self.finish(OpacityDialogOutcome::Accepted(parse_percent(self.text.as_str())));
    }

    pub fn cancel(&mut self) {
        self.finish(OpacityDialogOutcome::Cancelled);
    }

    pub fn take_outcome(&mut self) -> Option<OpacityDialogOutcome> {
        self.outcome.take()
    }

    /// Feeds `events` until the dialog closes. Running out of input counts
    /// as closing the window.
    pub fn run<I>(&mut self, current_opacity: u8, events: I) -> OpacityDialogOutcome
    where
        I: IntoIterator<Item = InputEvent>,
    {
        self.open(current_opacity);
        for event in events {
            self.handle_input(&event);
            if !self.visible {
                break;
            }
        }
        if self.visible {
            self.cancel();
        }
        self.take_outcome().unwrap_or(OpacityDialogOutcome::Cancelled)
    }

    fn finish(&mut self, outcome: OpacityDialogOutcome) {
        self.outcome = Some(outcome);
        self.visible = false;
        self.replace_on_type = false;
    }

    fn type_digit(&mut self, ch: char) {
        if self.replace_on_type {
            self.text.clear();
            self.replace_on_type = false;
        }
        if self.text.len() < MAX_INPUT_CHARS {
            self.text.push(ch);
        }
    }
}

impl UIComponent for OpacityDialog {
    fn layout(&mut self, bounds: Rect, _dpi: f32) {
        self.bounds = bounds;
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.visible {
            return false;
        }

        match event {
            InputEvent::KeyDown(vk) => match *vk {
                VK_RETURN => {
                    self.accept();
                    true
                }
                VK_ESCAPE => {
                    self.cancel();
                    true
                }
                VK_BACK => {
                    if self.replace_on_type {
                        self.text.clear();
                        self.replace_on_type = false;
                    } else {
                        self.text.pop();
                    }
                    true
                }
                _ => false,
            },
            // Number-only edit control: everything but digits is swallowed.
            InputEvent::Char(ch) if ch.is_ascii_digit() => {
                self.type_digit(*ch);
                true
            }
            InputEvent::Char(_) => true,
            InputEvent::MouseDown(point) => self.bounds.contains(*point),
        }
    }

    fn hit_test(&self, point: Point) -> bool {
        self.visible && self.bounds.contains(point)
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Reads a leading integer the way `_wtoi` does (anything unparsable is 0)
/// and clamps it to [0, 100].
pub fn parse_percent(text: &str) -> u8 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for ch in digits.chars() {
        let Some(d) = ch.to_digit(10) else {
            break;
        };
        value = (value * 10 + i64::from(d)).min(i64::from(i32::MAX));
    }
    if negative {
        value = -value;
    }
    value.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<InputEvent> {
        text.chars().map(InputEvent::Char).collect()
    }

    #[test]
    fn opens_with_current_percent_selected() {
        let mut dialog = OpacityDialog::new();
        dialog.open(127);
        assert!(dialog.is_open());
        assert_eq!(dialog.text(), "49");

        dialog.handle_input(&InputEvent::Char('7'));
        assert_eq!(dialog.text(), "7");
    }

    #[test]
    fn enter_accepts_clamped_value() {
        let mut dialog = OpacityDialog::new();
        let mut events = chars("250");
        events.push(InputEvent::KeyDown(VK_RETURN));
        assert_eq!(dialog.run(255, events), OpacityDialogOutcome::Accepted(100));
        assert!(!dialog.is_open());
    }

    #[test]
    fn escape_cancels() {
        let mut dialog = OpacityDialog::new();
        let mut events = chars("12");
        events.push(InputEvent::KeyDown(VK_ESCAPE));
        events.extend(chars("99"));
        assert_eq!(dialog.run(0, events), OpacityDialogOutcome::Cancelled);
    }

    #[test]
    fn closing_without_a_key_is_cancel() {
        let mut dialog = OpacityDialog::new();
        assert_eq!(dialog.run(64, chars("5")), OpacityDialogOutcome::Cancelled);
    }

    #[test]
    fn non_digits_are_ignored_and_backspace_edits() {
        let mut dialog = OpacityDialog::new();
        let mut events = chars("4x-5");
        events.push(InputEvent::KeyDown(VK_BACK));
        events.extend(chars("0"));
        events.push(InputEvent::KeyDown(VK_RETURN));
        assert_eq!(dialog.run(255, events), OpacityDialogOutcome::Accepted(40));
    }

    #[test]
    fn empty_text_accepts_zero() {
        let mut dialog = OpacityDialog::new();
        let events = vec![InputEvent::KeyDown(VK_BACK), InputEvent::KeyDown(VK_RETURN)];
        assert_eq!(dialog.run(255, events), OpacityDialogOutcome::Accepted(0));
    }

    #[test]
    fn parse_percent_matches_atoi_rules() {
        assert_eq!(parse_percent("  42abc"), 42);
        assert_eq!(parse_percent("-5"), 0);
        assert_eq!(parse_percent("+100"), 100);
        assert_eq!(parse_percent("abc"), 0);
        assert_eq!(parse_percent("99999999999999"), 100);
    }

    #[test]
    fn closed_dialog_ignores_input() {
        let mut dialog = OpacityDialog::new();
        assert!(!dialog.handle_input(&InputEvent::Char('1')));
        assert!(dialog.take_outcome().is_none());
    }
}
