use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::widget::traits::{DrawCtx, EditOutput, Editor, VariantKind};

pub const NONE_SELECTED: &str = "(None selected)";

#[derive(Debug, Clone)]
struct CheckBox {
    name: String,
    checked: bool,
    /// State as of the last bind or confirmed save.
    confirmed: bool,
}

/// Named checkbox set. The save posts the checked names as an indexed
/// list; cancel and failure both fall back to the confirmed set.
pub struct CheckboxesEditor {
    boxes: Vec<CheckBox>,
    cursor: usize,
}

impl CheckboxesEditor {
    pub fn new(names: impl IntoIterator<Item = (String, bool)>) -> Self {
        Self {
            boxes: names
                .into_iter()
                .map(|(name, checked)| CheckBox {
                    name,
                    checked,
                    confirmed: checked,
                })
                .collect(),
            cursor: 0,
        }
    }

    pub fn checked_names(&self) -> Vec<String> {
        self.boxes
            .iter()
            .filter(|b| b.checked)
            .map(|b| b.name.clone())
            .collect()
    }
}

impl Editor for CheckboxesEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::Checkboxes
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        self.boxes
            .iter()
            .enumerate()
            .map(|(idx, b)| {
                let mark = if b.checked { "[x]" } else { "[ ]" };
                let style = if ctx.focused && idx == self.cursor {
                    theme.editing
                } else {
                    theme.value
                };
                vec![Span::styled(format!("{mark} {}", b.name), style)]
            })
            .collect()
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        match key.code {
            KeyCode::Up => {
                if self.cursor == 0 {
                    return EditOutput::ignored();
                }
                self.cursor -= 1;
                EditOutput::handled()
            }
            KeyCode::Down => {
                if self.cursor + 1 >= self.boxes.len() {
                    return EditOutput::ignored();
                }
                self.cursor += 1;
                EditOutput::handled()
            }
            KeyCode::Char(' ') => {
                if let Some(b) = self.boxes.get_mut(self.cursor) {
                    b.checked = !b.checked;
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
        Payload::Indexed(self.checked_names())
    }

    fn saved_label(&self) -> String {
        let names = self.checked_names();
        if names.is_empty() {
            NONE_SELECTED.to_string()
        } else {
            names.join(", ")
        }
    }

    fn mark_confirmed(&mut self) {
        for b in &mut self.boxes {
            b.confirmed = b.checked;
        }
    }

    fn reset(&mut self, _label_text: &str) {
        for b in &mut self.boxes {
            b.checked = b.confirmed;
        }
    }
}
