use indexmap::IndexMap;

use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::validate::{CompiledConstraints, FormValidation};
use crate::variants::dropdown::Choice;
use crate::variants::text_edit;
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RefreshPolicy, RevertPolicy, VariantKind};

enum Input {
    Text {
        value: String,
        cursor: usize,
        constraints: CompiledConstraints,
    },
    Check {
        checked: bool,
    },
    Select {
        options: Vec<Choice>,
        selected: usize,
    },
}

enum Snapshot {
    Text(String),
    Check(bool),
    Select(usize),
}

/// One named sub-field of a [`FieldsEditor`] form.
pub struct FormField {
    name: String,
    caption: String,
    input: Input,
}

impl FormField {
    pub fn text(name: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            input: Input::Text {
                value: String::new(),
                cursor: 0,
                constraints: CompiledConstraints::default(),
            },
        }
    }

    pub fn text_with_constraints(
        name: impl Into<String>,
        caption: impl Into<String>,
        compiled: CompiledConstraints,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            input: Input::Text {
                value: String::new(),
                cursor: 0,
                constraints: compiled,
            },
        }
    }

    pub fn check(name: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            input: Input::Check { checked: false },
        }
    }

    pub fn select(
        name: impl Into<String>,
        caption: impl Into<String>,
        options: Vec<Choice>,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            input: Input::Select { options, selected: 0 },
        }
    }

    fn snapshot(&self) -> Snapshot {
        match &self.input {
            Input::Text { value, .. } => Snapshot::Text(value.clone()),
            Input::Check { checked } => Snapshot::Check(*checked),
            Input::Select { selected, .. } => Snapshot::Select(*selected),
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        match (&mut self.input, snapshot) {
            (Input::Text { value, cursor, .. }, Snapshot::Text(saved)) => {
                *value = saved.clone();
                *cursor = text_edit::char_count(saved);
            }
            (Input::Check { checked }, Snapshot::Check(saved)) => *checked = *saved,
            (Input::Select { selected, options }, Snapshot::Select(saved)) => {
                *selected = (*saved).min(options.len().saturating_sub(1));
            }
            _ => {}
        }
    }
}

/// A small form posted as one save: several named inputs under a single
/// widget. Saving is gated on every field passing its own constraints;
/// violations show inline under the field and nothing is dispatched.
pub struct FieldsEditor {
    fields: Vec<FormField>,
    confirmed: Vec<Snapshot>,
    active: usize,
    validation: FormValidation,
}

impl FieldsEditor {
    pub fn new(fields: Vec<FormField>) -> Self {
        let confirmed = fields.iter().map(FormField::snapshot).collect();
        Self {
            fields,
            confirmed,
            active: 0,
            validation: FormValidation::new(),
        }
    }

    pub fn value_of(&self, name: &str) -> Option<String> {
        self.fields.iter().find(|f| f.name == name).map(|f| match &f.input {
            Input::Text { value, .. } => value.clone(),
            Input::Check { checked } => checked.to_string(),
            Input::Select { options, selected } => options
                .get(*selected)
                .map(|c| c.value.clone())
                .unwrap_or_default(),
        })
    }

    fn restore_confirmed(&mut self) {
        for (field, snapshot) in self.fields.iter_mut().zip(self.confirmed.iter()) {
            field.restore(snapshot);
        }
        self.active = 0;
        self.validation.clear();
    }

    fn refresh_validation(&mut self) {
        for field in &self.fields {
            if let Input::Text { value, constraints, .. } = &field.input {
                self.validation.record(field.name.clone(), constraints.check(value));
            }
        }
    }
}

impl Editor for FieldsEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::NewFreeTextMultiValue
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let mut lines = Vec::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let focused = ctx.focused && idx == self.active;
            let mut line = vec![Span::styled(format!("{}: ", field.caption), theme.caption)];
            match &field.input {
                Input::Text { value, cursor, .. } => {
                    if focused {
                        line.extend(text_edit::caret_spans(
                            value,
                            *cursor,
                            theme.value,
                            theme.editing,
                        ));
                    } else {
                        line.push(Span::styled(value.clone(), theme.value));
                    }
                }
                Input::Check { checked } => {
                    let mark = if *checked { "[x]" } else { "[ ]" };
                    line.push(Span::styled(
                        mark,
                        if focused { theme.editing } else { theme.value },
                    ));
                }
                Input::Select { options, selected } => {
                    let text = options
                        .get(*selected)
                        .map(|c| c.text.as_str())
                        .unwrap_or("");
                    line.push(Span::styled("\u{2039} ", theme.hint));
                    line.push(Span::styled(
                        text,
                        if focused { theme.editing } else { theme.value },
                    ));
                    line.push(Span::styled(" \u{203a}", theme.hint));
                }
            }
            lines.push(line);
            if let Some(error) = self.validation.error(&field.name) {
                lines.push(vec![Span::styled(format!("   {error}"), theme.error)]);
            }
        }
        lines
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        if key.is_ctrl() {
            if key.code == KeyCode::Char('w') {
                if let Input::Text { value, cursor, .. } = &mut self.fields[self.active].input {
                    if text_edit::delete_word_left(value, cursor) {
                        return EditOutput::handled();
                    }
                }
            }
            return EditOutput::ignored();
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                if self.active + 1 >= self.fields.len() {
                    return EditOutput::ignored();
                }
                self.active += 1;
                EditOutput::handled()
            }
            KeyCode::BackTab | KeyCode::Up => {
                if self.active == 0 {
                    return EditOutput::ignored();
                }
                self.active -= 1;
                EditOutput::handled()
            }
            KeyCode::Enter => {
                // The save gate: recheck everything and hold the submit
                // back while any field is invalid.
                self.refresh_validation();
                if self.validation.can_save() {
                    EditOutput::submit()
                } else {
                    EditOutput::handled()
                }
            }
            code => {
                let field = &mut self.fields[self.active];
                match &mut field.input {
                    Input::Text { value, cursor, .. } => match code {
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
                        _ => EditOutput::ignored(),
                    },
                    Input::Check { checked } => match code {
                        KeyCode::Char(' ') => {
                            *checked = !*checked;
                            EditOutput::handled()
                        }
                        _ => EditOutput::ignored(),
                    },
                    Input::Select { options, selected } => match code {
                        KeyCode::Left => {
                            if options.is_empty() {
                                return EditOutput::ignored();
                            }
                            *selected = (*selected + options.len() - 1) % options.len();
                            EditOutput::handled()
                        }
                        KeyCode::Right => {
                            if options.is_empty() {
                                return EditOutput::ignored();
                            }
                            *selected = (*selected + 1) % options.len();
                            EditOutput::handled()
                        }
                        _ => EditOutput::ignored(),
                    },
                }
            }
        }
    }

    fn payload(&self) -> Payload {
        let mut entries = IndexMap::new();
        for field in &self.fields {
            match &field.input {
                Input::Text { value, .. } => {
                    entries.insert(field.name.clone(), value.clone());
                }
                // Unchecked boxes stay out of the form body, as with
                // HTML checkbox submission.
                Input::Check { checked } => {
                    if *checked {
                        entries.insert(field.name.clone(), "true".to_string());
                    }
                }
                Input::Select { options, selected } => {
                    let value = options
                        .get(*selected)
                        .map(|c| c.value.clone())
                        .unwrap_or_default();
                    entries.insert(field.name.clone(), value);
                }
            }
        }
        Payload::Named(entries)
    }

    fn saved_label(&self) -> String {
        let parts: Vec<String> = self
            .fields
            .iter()
            .filter_map(|field| match &field.input {
                Input::Text { value, .. } if !value.trim().is_empty() => Some(value.clone()),
                _ => None,
            })
            .collect();
        parts.join(", ")
    }

    fn begin_edit(&mut self) {
        self.restore_confirmed();
    }

    fn mark_confirmed(&mut self) {
        self.confirmed = self.fields.iter().map(FormField::snapshot).collect();
        self.validation.clear();
    }

    fn reset(&mut self, _label_text: &str) {
        self.restore_confirmed();
    }

    fn revert_policy(&self) -> RevertPolicy {
        RevertPolicy::NEVER
    }

    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::Row
    }
}
