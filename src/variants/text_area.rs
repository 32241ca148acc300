use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::variants::text_edit;
use crate::widget::traits::{DrawCtx, EditOutput, Editor, VariantKind};

/// Multi-line text editor. Enter breaks the line; Ctrl+S saves.
pub struct TextAreaEditor {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl TextAreaEditor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.row = self.lines.len() - 1;
        self.col = text_edit::char_count(&self.lines[self.row]);
    }

    fn clamp_col(&mut self) {
        self.col = text_edit::clamp_cursor(self.col, &self.lines[self.row]);
    }

    fn split_line(&mut self) {
        self.clamp_col();
        let current = &self.lines[self.row];
        let byte_pos = current
            .char_indices()
            .nth(self.col)
            .map(|(idx, _)| idx)
            .unwrap_or(current.len());
        let rest = self.lines[self.row].split_off(byte_pos);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    fn join_with_previous(&mut self) -> bool {
        if self.row == 0 {
            return false;
        }
        let removed = self.lines.remove(self.row);
        self.row -= 1;
        self.col = text_edit::char_count(&self.lines[self.row]);
        self.lines[self.row].push_str(&removed);
        true
    }
}

impl Default for TextAreaEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor for TextAreaEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::TextArea
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                if ctx.focused && idx == self.row {
                    text_edit::caret_spans(line, self.col, theme.value, theme.editing)
                } else {
                    vec![Span::styled(line.clone(), theme.value)]
                }
            })
            .collect()
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        if key.is_ctrl() {
            return match key.code {
                KeyCode::Char('s') => EditOutput::submit(),
                KeyCode::Char('w') => {
                    self.clamp_col();
                    if text_edit::delete_word_left(&mut self.lines[self.row], &mut self.col) {
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
                self.clamp_col();
                text_edit::insert_char(&mut self.lines[self.row], &mut self.col, ch);
                EditOutput::handled()
            }
            KeyCode::Enter => {
                self.split_line();
                EditOutput::handled()
            }
            KeyCode::Backspace => {
                self.clamp_col();
                if text_edit::backspace_char(&mut self.lines[self.row], &mut self.col) {
                    EditOutput::handled()
                } else if self.join_with_previous() {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Delete => {
                self.clamp_col();
                if text_edit::delete_char(&mut self.lines[self.row], &mut self.col) {
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Left => {
                self.clamp_col();
                if text_edit::move_left(&mut self.col, &self.lines[self.row]) {
                    EditOutput::handled()
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = text_edit::char_count(&self.lines[self.row]);
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Right => {
                self.clamp_col();
                if text_edit::move_right(&mut self.col, &self.lines[self.row]) {
                    EditOutput::handled()
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                    EditOutput::handled()
                } else {
                    EditOutput::ignored()
                }
            }
            KeyCode::Up => {
                if self.row == 0 {
                    return EditOutput::ignored();
                }
                self.row -= 1;
                self.clamp_col();
                EditOutput::handled()
            }
            KeyCode::Down => {
                if self.row + 1 >= self.lines.len() {
                    return EditOutput::ignored();
                }
                self.row += 1;
                self.clamp_col();
                EditOutput::handled()
            }
            KeyCode::Home => {
                self.col = 0;
                EditOutput::handled()
            }
            KeyCode::End => {
                self.col = text_edit::char_count(&self.lines[self.row]);
                EditOutput::handled()
            }
            _ => EditOutput::ignored(),
        }
    }

    fn payload(&self) -> Payload {
        Payload::Single(self.text())
    }

    fn saved_label(&self) -> String {
        self.text()
    }

    fn reset(&mut self, label_text: &str) {
        self.set_text(label_text);
    }
}
