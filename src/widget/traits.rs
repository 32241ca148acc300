use crate::core::outcome::SaveResult;
use crate::gateway::payload::Payload;
use crate::gateway::submit::SubmitAction;
use crate::terminal::KeyEvent;
use crate::ui::span::SpanLine;
use crate::ui::theme::Theme;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Variant kinds
// ---------------------------------------------------------------------------

/// Editor flavors a field manifest can declare. The kebab-case wire names
/// double as style hooks in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantKind {
    PlainText,
    Integer,
    TextArea,
    Url,
    Dropdown,
    MultiDropdown,
    Toggle,
    Checkboxes,
    Date,
    MultiInput,
    NewValue,
    NewFreeTextValue,
    NewFreeTextMultiValue,
    Roles,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plain-text",
            Self::Integer => "integer",
            Self::TextArea => "text-area",
            Self::Url => "url",
            Self::Dropdown => "dropdown",
            Self::MultiDropdown => "multi-dropdown",
            Self::Toggle => "toggle",
            Self::Checkboxes => "checkboxes",
            Self::Date => "date",
            Self::MultiInput => "multi-input",
            Self::NewValue => "new-value",
            Self::NewFreeTextValue => "new-free-text-value",
            Self::NewFreeTextMultiValue => "new-free-text-multi-value",
            Self::Roles => "roles",
        }
    }
}

// ---------------------------------------------------------------------------
// Render context & key handling output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct DrawCtx<'a> {
    pub theme: &'a Theme,
    pub focused: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EditOutput {
    pub handled: bool,
    pub request_render: bool,
    /// The editor asks its widget to run the save flow.
    pub submit: bool,
}

impl EditOutput {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn consumed() -> Self {
        Self {
            handled: true,
            request_render: false,
            submit: false,
        }
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            request_render: true,
            submit: false,
        }
    }

    pub fn submit() -> Self {
        Self {
            handled: true,
            request_render: true,
            submit: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests to the page
// ---------------------------------------------------------------------------

/// A save request ready for the gateway.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub action: SubmitAction,
    pub url: String,
    pub payload: Payload,
    pub lenient: bool,
}

/// What a widget asks of the page after handling input.
#[derive(Debug)]
pub enum NodeRequest {
    None,
    Render,
    Dispatch(Dispatch),
    /// Modal yes/no gate. The answer comes back through the widget's
    /// `confirm_accepted`/`confirm_declined` hooks.
    Confirm { prompt: String },
    /// Modal notice that blocks all input until dismissed.
    Alert { message: String },
}

// ---------------------------------------------------------------------------
// Revert & refresh policies
// ---------------------------------------------------------------------------

/// When a failed save rolls the editor back to the label's value.
///
/// The policies differ per variant and per failure class, and the save
/// contract deliberately keeps those differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertPolicy {
    /// Server answered `success: false`.
    pub on_rejected: bool,
    /// Request never produced a usable reply.
    pub on_transport: bool,
}

impl RevertPolicy {
    pub const ALWAYS: Self = Self {
        on_rejected: true,
        on_transport: true,
    };
    pub const REJECTED_ONLY: Self = Self {
        on_rejected: true,
        on_transport: false,
    };
    pub const NEVER: Self = Self {
        on_rejected: false,
        on_transport: false,
    };
}

/// What happens to the surrounding row after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    #[default]
    None,
    /// Re-fetch and rebind the row the widget sits in.
    Row,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// The editable half of an edit-switch widget.
///
/// An editor owns its in-progress state plus the last confirmed state it
/// falls back to on cancel. The owning widget drives the lifecycle:
/// `begin_edit` when the editor view opens, `payload`/`validate` at save,
/// `apply_saved`/`saved_label`/`mark_confirmed` on success, `reset` on
/// cancel and on failures the revert policy covers.
pub trait Editor: Send {
    fn kind(&self) -> VariantKind;

    fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine>;

    fn on_key(&mut self, key: KeyEvent) -> EditOutput;

    /// Serialize the current editor state into a form body.
    fn payload(&self) -> Payload;

    /// Client-side gate run before anything is dispatched. An error blocks
    /// the save with an alert; no request is made.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Label text after a successful save, read from live editor state.
    fn saved_label(&self) -> String;

    /// Called when the editor view opens.
    fn begin_edit(&mut self) {}

    /// Record the current state as confirmed. Editors whose confirmed
    /// state is the label itself have nothing to record.
    fn mark_confirmed(&mut self) {}

    /// Drop in-progress edits: restore confirmed state, seeded from
    /// `label_text` where the editor mirrors the label directly.
    fn reset(&mut self, label_text: &str);

    /// Whether this editor's endpoint may answer 2xx without a JSON body.
    fn lenient_reply(&self) -> bool {
        false
    }

    fn revert_policy(&self) -> RevertPolicy {
        RevertPolicy::ALWAYS
    }

    fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy::None
    }

    /// Fold reply data into editor state after a successful save.
    fn apply_saved(&mut self, _result: &SaveResult) {}
}
