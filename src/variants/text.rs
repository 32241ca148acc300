use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::validate::{CompiledConstraints, INVALID_INPUT};
use crate::variants::text_edit;
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RevertPolicy, VariantKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFlavor {
    #[default]
    Plain,
    /// Digits only; the save gate requires a parseable whole number.
    Integer,
    /// Free text that keeps the user's input when a save fails in
    /// transit instead of rolling back.
    Url,
}

/// Single-line text editor.
pub struct TextEditor {
    flavor: TextFlavor,
    value: String,
    cursor: usize,
    constraints: CompiledConstraints,
}

impl TextEditor {
    pub fn new(flavor: TextFlavor) -> Self {
        Self {
            flavor,
            value: String::new(),
            cursor: 0,
            constraints: CompiledConstraints::default(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = text_edit::char_count(&self.value);
        self
    }

    pub fn with_constraints(mut self, constraints: CompiledConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn text(&self) -> &str {
        &self.value
    }

    fn accepts(&self, ch: char) -> bool {
        match self.flavor {
            TextFlavor::Integer => {
                ch.is_ascii_digit() || (ch == '-' && self.cursor == 0 && !self.value.starts_with('-'))
            }
            TextFlavor::Plain | TextFlavor::Url => !ch.is_control(),
        }
    }
}

impl Editor for TextEditor {
    fn kind(&self) -> VariantKind {
        match self.flavor {
            TextFlavor::Plain => VariantKind::PlainText,
            TextFlavor::Integer => VariantKind::Integer,
            TextFlavor::Url => VariantKind::Url,
        }
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let line = if ctx.focused {
            text_edit::caret_spans(&self.value, self.cursor, theme.value, theme.editing)
        } else {
            vec![Span::styled(self.value.clone(), theme.value)]
        };
        vec![line]
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        if key.is_ctrl() {
            return match key.code {
                KeyCode::Char('w') => {
                    if text_edit::delete_word_left(&mut self.value, &mut self.cursor) {
                        EditOutput::handled()
                    } else {
                        EditOutput::ignored()
                    }
                }
                _ => EditOutput::ignored(),
            };
        }
        match key.code {
            KeyCode::Char(ch) if self.accepts(ch) => {
                text_edit::insert_char(&mut self.value, &mut self.cursor, ch);
                EditOutput::handled()
            }
            KeyCode::Char(_) => EditOutput::consumed(),
            KeyCode::Backspace => {
                if text_edit::backspace_char(&mut self.value, &mut self.cursor) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Delete => {
                if text_edit::delete_char(&mut self.value, &mut self.cursor) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Left => {
                if text_edit::move_left(&mut self.cursor, &self.value) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Right => {
                if text_edit::move_right(&mut self.cursor, &self.value) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
                EditOutput::handled()
            }
            KeyCode::End => {
                self.cursor = text_edit::char_count(&self.value);
                EditOutput::handled()
            }
            KeyCode::Enter => EditOutput::submit(),
            _ => EditOutput::ignored(),
        }
    }

    fn payload(&self) -> Payload {
        Payload::Single(self.value.clone())
    }

    fn validate(&self) -> Result<(), String> {
        let mut check = self.constraints.check(&self.value);
        if check.is_ok() && self.flavor == TextFlavor::Integer && !self.value.trim().is_empty() {
            check = self
                .value
                .trim()
                .parse::<i64>()
                .map(|_| ())
                .map_err(|err| err.to_string());
        }
        check.map_err(|_| INVALID_INPUT.to_string())
    }

    fn saved_label(&self) -> String {
        self.value.clone()
    }

    fn reset(&mut self, label_text: &str) {
        self.value = label_text.to_string();
        self.cursor = text_edit::char_count(&self.value);
    }

    fn revert_policy(&self) -> RevertPolicy {
        match self.flavor {
            TextFlavor::Url => RevertPolicy::REJECTED_ONLY,
            _ => RevertPolicy::ALWAYS,
        }
    }
}
