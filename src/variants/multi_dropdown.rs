use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::variants::dropdown::Choice;
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RevertPolicy, VariantKind};

/// Multi-select list posting `selectedValues` as a JSON array. Its
/// endpoint acknowledges with a bare 2xx, so replies are not parsed.
pub struct MultiDropdownEditor {
    options: Vec<Choice>,
    marked: Vec<bool>,
    confirmed: Vec<bool>,
    cursor: usize,
}

impl MultiDropdownEditor {
    pub fn new(options: Vec<Choice>) -> Self {
        let marked = vec![false; options.len()];
        Self {
            confirmed: marked.clone(),
            marked,
            options,
            cursor: 0,
        }
    }

    pub fn with_marked_texts(mut self, texts: &[String]) -> Self {
        for (idx, option) in self.options.iter().enumerate() {
            if texts.iter().any(|t| t == &option.text) {
                self.marked[idx] = true;
            }
        }
        self.confirmed = self.marked.clone();
        self
    }

    fn marked_choices(&self) -> impl Iterator<Item = &Choice> {
        self.options
            .iter()
            .zip(&self.marked)
            .filter(|(_, marked)| **marked)
            .map(|(option, _)| option)
    }
}

impl Editor for MultiDropdownEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::MultiDropdown
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        self.options
            .iter()
            .enumerate()
            .map(|(idx, option)| {
                let mark = if self.marked[idx] { "[x]" } else { "[ ]" };
                let style = if ctx.focused && idx == self.cursor {
                    theme.editing
                } else {
                    theme.value
                };
                vec![Span::styled(format!("{mark} {}", option.text), style)]
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
                if self.cursor + 1 >= self.options.len() {
                    return EditOutput::ignored();
                }
                self.cursor += 1;
                EditOutput::handled()
            }
            KeyCode::Char(' ') => {
                if let Some(mark) = self.marked.get_mut(self.cursor) {
                    *mark = !*mark;
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
        Payload::SelectedValues(self.marked_choices().map(|c| c.value.clone()).collect())
    }

    fn saved_label(&self) -> String {
        self.marked_choices()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn mark_confirmed(&mut self) {
        self.confirmed = self.marked.clone();
    }

    fn reset(&mut self, _label_text: &str) {
        self.marked = self.confirmed.clone();
    }

    fn revert_policy(&self) -> RevertPolicy {
        RevertPolicy::NEVER
    }

    fn lenient_reply(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> MultiDropdownEditor {
        MultiDropdownEditor::new(vec![
            Choice::plain("EXOME"),
            Choice::plain("WGS"),
            Choice::plain("RNA"),
        ])
    }

    #[test]
    fn posts_marked_values_as_selected_values_json() {
        let mut multi = editor();
        multi.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        multi.on_key(KeyEvent::plain(KeyCode::Down));
        multi.on_key(KeyEvent::plain(KeyCode::Down));
        multi.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert_eq!(
            multi.payload(),
            Payload::SelectedValues(vec!["EXOME".to_string(), "RNA".to_string()])
        );
        assert_eq!(multi.saved_label(), "EXOME, RNA");
    }

    #[test]
    fn replies_are_lenient_and_selection_never_reverts_on_failure() {
        let multi = editor();
        assert!(multi.lenient_reply());
        assert_eq!(multi.revert_policy(), RevertPolicy::NEVER);
    }

    #[test]
    fn cancel_restores_the_confirmed_marks() {
        let mut multi =
            MultiDropdownEditor::new(vec![Choice::plain("EXOME"), Choice::plain("WGS")])
                .with_marked_texts(&["WGS".to_string()]);
        multi.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert_eq!(multi.marked, vec![true, true]);
        multi.reset("");
        assert_eq!(multi.marked, vec![false, true]);
    }
}
