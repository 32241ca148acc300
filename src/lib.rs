pub mod core;
pub mod gateway;
pub mod manifest;
pub mod notify;
pub mod runtime;
pub mod terminal;
pub mod ui;
pub mod validate;
pub mod variants;
pub mod widget;

pub use self::core::outcome::{SaveOutcome, SaveResult};
pub use self::core::{RowId, WidgetId};
pub use gateway::{HttpTransport, Payload, SubmitQueue, Transport, TransportError};
pub use manifest::{ManifestError, PageManifest, RowManifest};
pub use notify::{Severity, Toast, Toaster};
pub use runtime::{Console, Frame, Page};
pub use terminal::{KeyCode, KeyEvent, Terminal, TerminalEvent};
pub use ui::Theme;
pub use widget::{EditSwitch, Editor, Node, NodeRequest, RolePanel, Row, VariantKind};
