use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RevertPolicy, VariantKind};

/// One selectable option: `value` goes over the wire, `text` is shown.
/// Plain manifests where both coincide collapse to a single string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub text: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: value.clone(),
            value,
        }
    }
}

/// Single-select carousel. A failed save keeps the user's selection;
/// only an explicit cancel walks it back to the label.
pub struct DropdownEditor {
    options: Vec<Choice>,
    selected: usize,
}

impl DropdownEditor {
    pub fn new(options: Vec<Choice>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn with_selected_text(mut self, text: &str) -> Self {
        self.select_label(text);
        self
    }

    pub fn selected(&self) -> Option<&Choice> {
        self.options.get(self.selected)
    }

    fn select_label(&mut self, label_text: &str) {
        if let Some(idx) = self.options.iter().position(|c| c.text == label_text) {
            self.selected = idx;
        } else if let Some(idx) = self.options.iter().position(|c| c.value == label_text) {
            self.selected = idx;
        }
    }

    fn step(&mut self, forward: bool) -> bool {
        if self.options.is_empty() {
            return false;
        }
        let len = self.options.len();
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
        true
    }
}

impl Editor for DropdownEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::Dropdown
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let style = if ctx.focused { theme.editing } else { theme.value };
        let text = self.selected().map(|c| c.text.as_str()).unwrap_or("");
        vec![vec![Span::styled(format!("\u{2039} {text} \u{203a}"), style)]]
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        match key.code {
            KeyCode::Left | KeyCode::Up => {
                if self.step(false) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Right | KeyCode::Down => {
                if self.step(true) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Enter => EditOutput::submit(),
            _ => EditOutput::ignored(),
        }
    }

    fn payload(&self) -> Payload {
        Payload::Single(
            self.selected()
                .map(|c| c.value.clone())
                .unwrap_or_default(),
        )
    }

    fn saved_label(&self) -> String {
        self.selected()
            .map(|c| c.text.clone())
            .unwrap_or_default()
    }

    fn reset(&mut self, label_text: &str) {
        self.select_label(label_text);
    }

    fn revert_policy(&self) -> RevertPolicy {
        RevertPolicy::NEVER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> DropdownEditor {
        DropdownEditor::new(vec![
            Choice::plain("SINGLE_LINE_TEXT"),
            Choice::plain("MULTI_LINE_TEXT"),
            Choice::new("wgs", "Whole Genome"),
        ])
    }

    #[test]
    fn wire_value_and_label_text_can_differ() {
        let mut dropdown = editor();
        dropdown.selected = 2;
        assert_eq!(dropdown.payload(), Payload::Single("wgs".to_string()));
        assert_eq!(dropdown.saved_label(), "Whole Genome");
    }

    #[test]
    fn arrows_cycle_through_the_options() {
        let mut dropdown = editor();
        dropdown.on_key(KeyEvent::plain(KeyCode::Down));
        assert_eq!(dropdown.saved_label(), "MULTI_LINE_TEXT");
        dropdown.on_key(KeyEvent::plain(KeyCode::Up));
        dropdown.on_key(KeyEvent::plain(KeyCode::Up));
        assert_eq!(dropdown.saved_label(), "Whole Genome");
    }

    #[test]
    fn reset_returns_to_the_option_matching_the_label() {
        let mut dropdown = editor().with_selected_text("SINGLE_LINE_TEXT");
        dropdown.on_key(KeyEvent::plain(KeyCode::Down));
        dropdown.reset("SINGLE_LINE_TEXT");
        assert_eq!(dropdown.saved_label(), "SINGLE_LINE_TEXT");
    }

    #[test]
    fn failed_saves_never_move_the_selection_back() {
        assert_eq!(editor().revert_policy(), RevertPolicy::NEVER);
    }
}
