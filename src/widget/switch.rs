//! The edit switch: a label that flips into an editor, saves over HTTP,
//! and flips back.
//!
//! The protocol is deliberately asymmetric. Saving hides the editor the
//! moment the request leaves, before any reply. Cancelling always rolls
//! the editor back to the label's value, while a failed save rolls back
//! only as far as the editor's revert policy allows.

use indexmap::IndexMap;

use crate::core::WidgetId;
use crate::core::outcome::SaveOutcome;
use crate::gateway::payload::Payload;
use crate::gateway::submit::SubmitAction;
use crate::manifest::{FieldManifest, ManifestError};
use crate::notify::Toast;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::variants::build_editor;
use crate::widget::traits::{
    Dispatch, DrawCtx, Editor, NodeRequest, RefreshPolicy, VariantKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Label,
    Editor,
}

/// Payload captured at submit time, parked while a confirm prompt is up.
struct PreparedSave {
    payload: Payload,
    lenient: bool,
}

/// What applying a settlement asks of the page.
pub struct SettleEffect {
    pub toast: Toast,
    /// Row refresh endpoint to fetch, for editors whose save invalidates
    /// sibling widgets.
    pub refresh: Option<String>,
}

/// The user-facing notification for a settled save.
pub fn outcome_toast(outcome: &SaveOutcome) -> Toast {
    match outcome {
        SaveOutcome::Saved(_) => Toast::success("Success", "Data stored successfully"),
        SaveOutcome::Rejected { message } => {
            Toast::warning("Data could not be stored", message.clone())
        }
        SaveOutcome::RejectedMany { messages } => {
            let list: Vec<String> = messages.iter().map(|m| format!("- {m}")).collect();
            Toast::warning("Data could not be stored", list.join("\n"))
        }
        SaveOutcome::Failed { title, detail } => Toast::error(title.clone(), detail.clone()),
    }
}

pub struct EditSwitch {
    id: WidgetId,
    caption: String,
    /// Current confirmed display value. Updated only on settled success.
    label: String,
    target: String,
    confirm: Option<String>,
    tooltip: Option<String>,
    refresh_url: Option<String>,
    /// Extra display regions patched by `updateMap` replies.
    extras: IndexMap<String, String>,
    editor: Box<dyn Editor>,
    view: View,
    in_flight: bool,
    pending: Option<PreparedSave>,
}

impl EditSwitch {
    pub fn new(
        id: impl Into<WidgetId>,
        caption: impl Into<String>,
        target: impl Into<String>,
        editor: Box<dyn Editor>,
    ) -> Self {
        let label = editor.saved_label();
        Self {
            id: id.into(),
            caption: caption.into(),
            label,
            target: target.into(),
            confirm: None,
            tooltip: None,
            refresh_url: None,
            extras: IndexMap::new(),
            editor,
            view: View::Label,
            in_flight: false,
            pending: None,
        }
    }

    pub fn from_manifest(field: &FieldManifest) -> Result<Self, ManifestError> {
        let editor = build_editor(field)?;
        let label = field
            .value
            .clone()
            .unwrap_or_else(|| editor.saved_label());
        Ok(Self {
            id: WidgetId::new(field.id.clone()),
            caption: field.label.clone(),
            label,
            target: field.target.clone(),
            confirm: field.confirm.clone(),
            tooltip: field.tooltip.clone(),
            refresh_url: field.refresh.clone(),
            extras: IndexMap::new(),
            editor,
            view: View::Label,
            in_flight: false,
            pending: None,
        })
    }

    pub fn with_confirm(mut self, prompt: impl Into<String>) -> Self {
        self.confirm = Some(prompt.into());
        self
    }

    pub fn with_refresh_url(mut self, url: impl Into<String>) -> Self {
        self.refresh_url = Some(url.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> VariantKind {
        self.editor.kind()
    }

    pub fn is_editing(&self) -> bool {
        self.view == View::Editor
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Flip the label into its editor. Refused while a save for this
    /// widget is still settling.
    pub fn begin_edit(&mut self) -> bool {
        if self.in_flight || self.view == View::Editor {
            return false;
        }
        self.editor.begin_edit();
        self.view = View::Editor;
        true
    }

    /// Close the editor and throw the draft away. Never touches the
    /// network.
    pub fn cancel(&mut self) {
        self.editor.reset(&self.label);
        self.view = View::Label;
        self.pending = None;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> NodeRequest {
        if self.view != View::Editor {
            return NodeRequest::None;
        }
        if key.code == KeyCode::Esc {
            self.cancel();
            return NodeRequest::Render;
        }
        let output = self.editor.on_key(key);
        if output.submit {
            return self.request_save();
        }
        if output.request_render {
            NodeRequest::Render
        } else {
            NodeRequest::None
        }
    }

    /// Run the save flow: validate, then confirm if configured, then
    /// dispatch. Validation failures block with an alert and leave the
    /// editor open; nothing is sent.
    fn request_save(&mut self) -> NodeRequest {
        if let Err(message) = self.editor.validate() {
            return NodeRequest::Alert { message };
        }
        let prepared = PreparedSave {
            payload: self.editor.payload(),
            lenient: self.editor.lenient_reply(),
        };
        if let Some(prompt) = &self.confirm {
            self.pending = Some(prepared);
            return NodeRequest::Confirm {
                prompt: prompt.clone(),
            };
        }
        self.dispatch(prepared)
    }

    pub fn confirm_accepted(&mut self) -> NodeRequest {
        match self.pending.take() {
            Some(prepared) => self.dispatch(prepared),
            None => NodeRequest::None,
        }
    }

    /// Declining keeps the editor open with the draft intact.
    pub fn confirm_declined(&mut self) -> NodeRequest {
        self.pending = None;
        NodeRequest::Render
    }

    fn dispatch(&mut self, prepared: PreparedSave) -> NodeRequest {
        // The editor hides now, not when the reply arrives.
        self.view = View::Label;
        self.in_flight = true;
        NodeRequest::Dispatch(Dispatch {
            action: SubmitAction::Save,
            url: self.target.clone(),
            payload: prepared.payload,
            lenient: prepared.lenient,
        })
    }

    /// Fold a settled save back into the widget and report what the page
    /// should do about it.
    pub fn settle(&mut self, outcome: &SaveOutcome) -> SettleEffect {
        self.in_flight = false;
        let mut refresh = None;
        match outcome {
            SaveOutcome::Saved(result) => {
                self.editor.apply_saved(result);
                self.label = self.editor.saved_label();
                self.editor.mark_confirmed();
                if let Some(tooltip) = &result.tooltip {
                    self.tooltip = Some(tooltip.clone());
                }
                for (region, text) in &result.update_map {
                    self.extras.insert(region.clone(), text.clone());
                }
                if self.editor.refresh_policy() == RefreshPolicy::Row {
                    refresh = self.refresh_url.clone();
                }
            }
            SaveOutcome::Rejected { .. } | SaveOutcome::RejectedMany { .. } => {
                if self.editor.revert_policy().on_rejected {
                    self.editor.reset(&self.label);
                }
            }
            SaveOutcome::Failed { .. } => {
                if self.editor.revert_policy().on_transport {
                    self.editor.reset(&self.label);
                }
            }
        }
        SettleEffect {
            toast: outcome_toast(outcome),
            refresh,
        }
    }

    pub fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let mut lines = Vec::new();
        let mut first = vec![Span::styled(format!("{}: ", self.caption), theme.caption)];
        match self.view {
            View::Label => {
                if self.label.is_empty() {
                    first.push(Span::styled("(not set)", theme.placeholder));
                } else {
                    let style = if ctx.focused { theme.focused } else { theme.value };
                    first.push(Span::styled(self.label.clone(), style));
                }
                if self.in_flight {
                    first.push(Span::styled(" \u{2026}saving", theme.hint));
                }
                lines.push(first);
            }
            View::Editor => {
                let mut editor_lines = self.editor.draw(ctx).into_iter();
                if let Some(head) = editor_lines.next() {
                    first.extend(head);
                }
                lines.push(first);
                for rest in editor_lines {
                    let mut line = vec![Span::new("   ")];
                    line.extend(rest);
                    lines.push(line);
                }
            }
        }
        if ctx.focused {
            if let Some(tooltip) = &self.tooltip {
                lines.push(vec![Span::styled(format!("   {tooltip}"), theme.hint)]);
            }
        }
        for text in self.extras.values() {
            lines.push(vec![Span::styled(format!("   {text}"), theme.hint)]);
        }
        lines
    }
}
