use crate::core::outcome::SaveResult;
use crate::gateway::payload::Payload;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::widget::traits::{DrawCtx, EditOutput, Editor, RefreshPolicy, RevertPolicy, VariantKind};

/// Boolean flip. Each save posts the inverse of the committed flag; the
/// flag itself only flips once the server confirms, so a second press
/// before settlement would re-post the same inverse and is refused
/// upstream by the in-flight guard.
pub struct ToggleEditor {
    flag: bool,
    reload_row: bool,
}

impl ToggleEditor {
    pub fn new(flag: bool) -> Self {
        Self {
            flag,
            reload_row: false,
        }
    }

    /// Rebind the surrounding row after each confirmed flip.
    pub fn with_row_reload(mut self) -> Self {
        self.reload_row = true;
        self
    }

    pub fn flag(&self) -> bool {
        self.flag
    }
}

impl Editor for ToggleEditor {
    fn kind(&self) -> VariantKind {
        VariantKind::Toggle
    }

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let (glyph, style) = if self.flag {
            ("[\u{2713}]", theme.flag_on)
        } else {
            ("[\u{2717}]", theme.flag_off)
        };
        let mut line = vec![Span::styled(glyph, style)];
        if ctx.focused {
            line.push(Span::styled(" switch", theme.hint));
        }
        vec![line]
    }

    fn on_key(&mut self, key: KeyEvent) -> EditOutput {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => EditOutput::submit(),
            _ => EditOutput::ignored(),
        }
    }

    fn payload(&self) -> Payload {
        Payload::Single((!self.flag).to_string())
    }

    fn saved_label(&self) -> String {
        self.flag.to_string()
    }

    fn reset(&mut self, _label_text: &str) {}

    fn revert_policy(&self) -> RevertPolicy {
        RevertPolicy::NEVER
    }

    fn refresh_policy(&self) -> RefreshPolicy {
        if self.reload_row {
            RefreshPolicy::Row
        } else {
            RefreshPolicy::None
        }
    }

    fn apply_saved(&mut self, _result: &SaveResult) {
        self.flag = !self.flag;
    }
}
