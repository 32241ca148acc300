use crate::core::outcome::SaveOutcome;
use crate::core::{RowId, WidgetId};
use crate::gateway::submit::SubmitAction;
use crate::manifest::{FieldManifest, ManifestError, RowManifest};
use crate::terminal::KeyEvent;
use crate::ui::span::SpanLine;
use crate::widget::chips::RolePanel;
use crate::widget::switch::{EditSwitch, SettleEffect};
use crate::widget::traits::{DrawCtx, NodeRequest, VariantKind};

/// One widget slot in a row: either an edit switch or a role panel.
pub enum Node {
    Switch(EditSwitch),
    Roles(RolePanel),
}

impl Node {
    pub fn from_manifest(field: &FieldManifest) -> Result<Self, ManifestError> {
        if field.kind == VariantKind::Roles {
            Ok(Self::Roles(RolePanel::from_manifest(field)?))
        } else {
            Ok(Self::Switch(EditSwitch::from_manifest(field)?))
        }
    }

    pub fn widget_id(&self) -> &WidgetId {
        match self {
            Self::Switch(switch) => switch.id(),
            Self::Roles(panel) => panel.id(),
        }
    }

    pub fn is_editing(&self) -> bool {
        match self {
            Self::Switch(switch) => switch.is_editing(),
            Self::Roles(panel) => panel.is_managing(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        match self {
            Self::Switch(switch) => switch.is_in_flight(),
            Self::Roles(_) => false,
        }
    }

    pub fn begin_edit(&mut self) -> bool {
        match self {
            Self::Switch(switch) => switch.begin_edit(),
            Self::Roles(panel) => panel.begin_manage(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> NodeRequest {
        match self {
            Self::Switch(switch) => switch.handle_key(key),
            Self::Roles(panel) => panel.handle_key(key),
        }
    }

    pub fn confirm_accepted(&mut self) -> NodeRequest {
        match self {
            Self::Switch(switch) => switch.confirm_accepted(),
            Self::Roles(panel) => panel.confirm_accepted(),
        }
    }

    pub fn confirm_declined(&mut self) -> NodeRequest {
        match self {
            Self::Switch(switch) => switch.confirm_declined(),
            Self::Roles(panel) => panel.confirm_declined(),
        }
    }

    pub fn settle(&mut self, action: &SubmitAction, outcome: &SaveOutcome) -> SettleEffect {
        match self {
            Self::Switch(switch) => switch.settle(outcome),
            Self::Roles(panel) => panel.settle(action, outcome),
        }
    }

    pub fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        match self {
            Self::Switch(switch) => switch.draw(ctx),
            Self::Roles(panel) => panel.draw(ctx),
        }
    }
}

/// A table row of widgets sharing one refresh scope.
pub struct Row {
    id: RowId,
    nodes: Vec<Node>,
}

impl Row {
    pub fn from_manifest(manifest: &RowManifest) -> Result<Self, ManifestError> {
        let mut nodes = Vec::with_capacity(manifest.fields.len());
        for field in &manifest.fields {
            nodes.push(Node::from_manifest(field)?);
        }
        Ok(Self {
            id: RowId::new(manifest.id.clone()),
            nodes,
        })
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// At most one editor may be open per row.
    pub fn has_open_editor(&self) -> bool {
        self.nodes.iter().any(Node::is_editing)
    }

    pub fn position(&self, widget: &WidgetId) -> Option<usize> {
        self.nodes.iter().position(|node| node.widget_id() == widget)
    }
}
