use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::validate::{CompiledConstraints, INVALID_INPUT};
use crate::variants::text_edit;
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RevertPolicy, VariantKind};

#[derive(Debug, Clone, Default)]
struct Field {
    value: String,
    cursor: usize,
}

impl Field {
    fn with_value(value: &str) -> Self {
        Self {
            cursor: text_edit::char_count(value),
            value: value.to_string(),
        }
    }
}

/// A growable list of single-line inputs saved together as `value[i]`
/// fields. Every field must pass the shared constraints before anything
/// is dispatched; one bad field blocks the whole save with an alert.
pub struct MultiInputEditor {
    confirmed: Vec<String>,
    fields: Vec<Field>,
    active: usize,
    constraints: CompiledConstraints,
}

impl MultiInputEditor {
    pub fn new(values: Vec<String>) -> Self {
        let mut editor = Self {
            confirmed: values,
            fields: Vec::new(),
            active: 0,
            constraints: CompiledConstraints::default(),
        };
        editor.rebuild();
        editor
    }

    pub fn with_constraints(mut self, constraints: CompiledConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn values(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }

    fn rebuild(&mut self) {
        self.fields = self.confirmed.iter().map(|v| Field::with_value(v)).collect();
        if self.fields.is_empty() {
            self.fields.push(Field::default());
        }
        self.active = 0;
    }

    fn add_field(&mut self) {
        self.fields.insert(self.active + 1, Field::default());
        self.active += 1;
    }

    fn remove_field(&mut self) -> bool {
        if self.fields.len() <= 1 {
            return false;
        }
        self.fields.remove(self.active);
        if self.active >= self.fields.len() {
            self.active = self.fields.len() - 1;
        }
        true
    }
}

impl Editor for MultiInputEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::MultiInput
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let mut lines: Vec<SpanLine> = self
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let mut line = vec![Span::styled(format!("{}. ", idx + 1), theme.hint)];
                if ctx.focused && idx == self.active {
                    line.extend(text_edit::caret_spans(
                        &field.value,
                        field.cursor,
                        theme.value,
                        theme.editing,
                    ));
                } else {
                    line.push(Span::styled(field.value.clone(), theme.value));
                }
                line
            })
            .collect();
        if ctx.focused {
            lines.push(vec![Span::styled(
                "ctrl-n add entry  ctrl-d remove entry",
                theme.hint,
            )]);
        }
        lines
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        if key.is_ctrl() {
            return match key.code {
                KeyCode::Char('n') => {
                    self.add_field();
                    EditOutput::handled()
                }
                KeyCode::Char('d') => {
                    if self.remove_field() {
                        EditOutput::handled()
                    } else {
                        EditOutput::ignored()
                    }
                }
                KeyCode::Char('w') => {
                    let field = &mut self.fields[self.active];
                    if text_edit::delete_word_left(&mut field.value, &mut field.cursor) {
                        EditOutput::handled()
                    } else {
                        EditOutput::ignored()
                    }
                }
                _ => EditOutput::ignored(),
            };
        }
        match key.code {
            KeyCode::Char(ch) if !ch.is_control() => {
                let field = &mut self.fields[self.active];
                text_edit::insert_char(&mut field.value, &mut field.cursor, ch);
                EditOutput::handled()
            }
            KeyCode::Backspace => {
                let field = &mut self.fields[self.active];
                if text_edit::backspace_char(&mut field.value, &mut field.cursor) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Delete => {
                let field = &mut self.fields[self.active];
                if text_edit::delete_char(&mut field.value, &mut field.cursor) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Left => {
                let field = &mut self.fields[self.active];
                if text_edit::move_left(&mut field.cursor, &field.value) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Right => {
                let field = &mut self.fields[self.active];
                if text_edit::move_right(&mut field.cursor, &field.value) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Up | KeyCode::BackTab => {
                if self.active == 0 {
                    return EditOutput::ignored();
                }
                self.active -= 1;
                EditOutput::handled()
            }
            KeyCode::Down | KeyCode::Tab => {
                if self.active + 1 >= self.fields.len() {
                    return EditOutput::ignored();
                }
                self.active += 1;
                EditOutput::handled()
            }
            KeyCode::Enter => EditOutput::submit(),
            _ => EditOutput::ignored(),
        }
    }

    fn payload(&self) -> Payload {
        Payload::Indexed(self.values())
    }

    fn validate(&self) -> Result<(), String> {
        for field in &self.fields {
            if self.constraints.check(&field.value).is_err() {
                return Err(INVALID_INPUT.to_string());
            }
        }
        Ok(())
    }

    fn saved_label(&self) -> String {
        self.values().join(", ")
    }

    fn begin_edit(&mut self) {
        self.rebuild();
    }

    fn mark_confirmed(&mut self) {
        self.confirmed = self.values();
    }

    fn reset(&mut self, _label_text: &str) {
        self.rebuild();
    }

    fn revert_policy(&self) -> RevertPolicy {
        RevertPolicy::REJECTED_ONLY
    }
}
