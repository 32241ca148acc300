use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::validate::{CompiledConstraints, INVALID_INPUT};
use crate::variants::dropdown::Choice;
use crate::variants::text_edit;
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RefreshPolicy, VariantKind};

enum Entry {
    /// Pick the value to append from a fixed option list.
    Picked { options: Vec<Choice>, selected: usize },
    /// Type the value to append.
    FreeText {
        value: String,
        cursor: usize,
        constraints: CompiledConstraints,
    },
}

/// Appends one value to a multi-valued field. The widget itself never
/// shows the collection; after a successful save the whole row is
/// re-fetched so the sibling widgets pick up the new entry.
pub struct NewValueEditor {
    entry: Entry,
}

impl NewValueEditor {
    pub fn picked(options: Vec<Choice>) -> Self {
        Self {
            entry: Entry::Picked { options, selected: 0 },
        }
    }

    pub fn free_text() -> Self {
        Self {
            entry: Entry::FreeText {
                value: String::new(),
                cursor: 0,
                constraints: CompiledConstraints::default(),
            },
        }
    }

    pub fn with_constraints(mut self, compiled: CompiledConstraints) -> Self {
        if let Entry::FreeText { constraints, .. } = &mut self.entry {
            *constraints = compiled;
        }
        self
    }

    pub fn draft(&self) -> String {
        match &self.entry {
            Entry::Picked { options, selected } => options
                .get(*selected)
                .map(|c| c.value.clone())
                .unwrap_or_default(),
            Entry::FreeText { value, .. } => value.clone(),
        }
    }

    fn clear(&mut self) {
        match &mut self.entry {
            Entry::Picked { selected, .. } => *selected = 0,
            Entry::FreeText { value, cursor, .. } => {
                value.clear();
                *cursor = 0;
            }
        }
    }
}

impl Editor for NewValueEditor {
    fn kind(&self) -> VariantKind {
        match self.entry {
            Entry::Picked { .. } => VariantKind::NewValue,
            Entry::FreeText { .. } => VariantKind::NewFreeTextValue,
        }
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let line = match &self.entry {
            Entry::Picked { options, selected } => {
                let text = options
                    .get(*selected)
                    .map(|c| c.text.as_str())
                    .unwrap_or("");
                vec![
                    Span::styled("\u{2039} ", theme.hint),
                    Span::styled(text, if ctx.focused { theme.editing } else { theme.value }),
                    Span::styled(" \u{203a}", theme.hint),
                ]
            }
            Entry::FreeText { value, cursor, .. } => {
                if ctx.focused {
                    text_edit::caret_spans(value, *cursor, theme.value, theme.editing)
                } else if value.is_empty() {
                    vec![Span::styled("(empty)", theme.placeholder)]
                } else {
                    vec![Span::styled(value.clone(), theme.value)]
                }
            }
        };
        vec![line]
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        match &mut self.entry {
            Entry::Picked { options, selected } => match key.code {
                KeyCode::Left | KeyCode::Up => {
                    if options.is_empty() {
                        return EditOutput::ignored();
                    }
                    *selected = (*selected + options.len() - 1) % options.len();
                    EditOutput::handled()
                }
                KeyCode::Right | KeyCode::Down => {
                    if options.is_empty() {
                        return EditOutput::ignored();
                    }
                    *selected = (*selected + 1) % options.len();
                    EditOutput::handled()
                }
                KeyCode::Enter => EditOutput::submit(),
                _ => EditOutput::ignored(),
            },
            Entry::FreeText { value, cursor, .. } => {
                if key.is_ctrl() {
                    return match key.code {
                        KeyCode::Char('w') => {
                            if text_edit::delete_word_left(value, cursor) {
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
                        text_edit::insert_char(value, cursor, ch);
                        EditOutput::handled()
                    }
                    KeyCode::Backspace => {
                        if text_edit::backspace_char(value, cursor) {
                            EditOutput::handled()
                        } else {
                            EditOutput::ignored()
                        }
                    }
                    KeyCode::Delete => {
                        if text_edit::delete_char(value, cursor) {
                            EditOutput::handled()
                        } else {
                            EditOutput::ignored()
                        }
                    }
                    KeyCode::Left => {
                        if text_edit::move_left(cursor, value) {
                            EditOutput::handled()
                        } else {
                            EditOutput::ignored()
                        }
                    }
                    KeyCode::Right => {
                        if text_edit::move_right(cursor, value) {
                            EditOutput::handled()
                        } else {
                            EditOutput::ignored()
                        }
                    }
                    KeyCode::Home => {
                        *cursor = 0;
                        EditOutput::handled()
                    }
                    KeyCode::End => {
                        *cursor = text_edit::char_count(value);
                        EditOutput::handled()
                    }
                    KeyCode::Enter => EditOutput::submit(),
                    _ => EditOutput::ignored(),
                }
            }
        }
    }

    fn payload(&self) -> Payload {
        Payload::Single(self.draft())
    }

    fn validate(&self) -> Result<(), String> {
        match &self.entry {
            Entry::Picked { options, .. } => {
                if options.is_empty() {
                    Err(INVALID_INPUT.to_string())
                } else {
                    Ok(())
                }
            }
            Entry::FreeText { value, constraints, .. } => {
                if value.trim().is_empty() || constraints.check(value).is_err() {
                    Err(INVALID_INPUT.to_string())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn saved_label(&self) -> String {
        match &self.entry {
            Entry::Picked { options, selected } => options
                .get(*selected)
                .map(|c| c.text.clone())
                .unwrap_or_default(),
            Entry::FreeText { value, .. } => value.clone(),
        }
    }

    fn begin_edit(&mut self) {
        self.clear();
    }

    fn mark_confirmed(&mut self) {
        self.clear();
    }

    fn reset(&mut self, _label_text: &str) {
        self.clear();
    }

    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::Row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(editor: &mut NewValueEditor, code: KeyCode) {
        editor.on_key(KeyEvent::plain(code));
    }

    #[test]
    fn picked_flavor_posts_the_option_value() {
        let mut editor = NewValueEditor::picked(vec![
            Choice::new("9606", "Homo sapiens"),
            Choice::new("10090", "Mus musculus"),
        ]);
        press(&mut editor, KeyCode::Down);
        assert_eq!(editor.kind(), VariantKind::NewValue);
        assert_eq!(editor.payload(), Payload::Single("10090".to_string()));
        assert_eq!(editor.saved_label(), "Mus musculus");
    }

    #[test]
    fn free_text_flavor_blocks_blank_drafts() {
        let mut editor = NewValueEditor::free_text();
        assert_eq!(editor.kind(), VariantKind::NewFreeTextValue);
        assert_eq!(editor.validate(), Err(INVALID_INPUT.to_string()));
        press(&mut editor, KeyCode::Char('h'));
        press(&mut editor, KeyCode::Char('i'));
        assert_eq!(editor.validate(), Ok(()));
        assert_eq!(editor.payload(), Payload::Single("hi".to_string()));
    }

    #[test]
    fn every_add_starts_from_a_blank_draft() {
        let mut editor = NewValueEditor::free_text();
        press(&mut editor, KeyCode::Char('x'));
        editor.mark_confirmed();
        assert_eq!(editor.draft(), "");
        press(&mut editor, KeyCode::Char('y'));
        editor.begin_edit();
        assert_eq!(editor.draft(), "");
    }

    #[test]
    fn successful_adds_refresh_the_row() {
        let editor = NewValueEditor::free_text();
        assert_eq!(editor.refresh_policy(), RefreshPolicy::Row);
    }
}
