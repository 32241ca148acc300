pub mod chips;
pub mod row;
pub mod switch;
pub mod traits;

pub use chips::{RoleChip, RolePanel};
pub use row::{Node, Row};
pub use switch::{EditSwitch, SettleEffect, outcome_toast};
pub use traits::{
    Dispatch, DrawCtx, EditOutput, Editor, NodeRequest, RefreshPolicy, RevertPolicy, VariantKind,
};
