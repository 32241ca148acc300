//! Membership panel: the granted roles of a project shown as chips, plus
//! an add control over the roles still available.
//!
//! Additions and removals are separate saves against separate endpoints.
//! Removals are per chip and may overlap in flight; only one addition
//! runs at a time.

use crate::core::WidgetId;
use crate::core::outcome::{SaveOutcome, SaveResult};
use crate::gateway::payload::Payload;
use crate::gateway::submit::SubmitAction;
use crate::manifest::{FieldManifest, ManifestError};
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::variants::Choice;
use crate::widget::switch::{SettleEffect, outcome_toast};
use crate::widget::traits::{Dispatch, DrawCtx, NodeRequest};

#[derive(Debug, Clone)]
pub struct RoleChip {
    pub role: String,
    pub text: String,
    removing: bool,
}

#[derive(Debug, Clone)]
struct AddOption {
    choice: Choice,
    marked: bool,
}

enum Pending {
    Add { values: Vec<String> },
    Remove { role: String },
}

pub struct RolePanel {
    id: WidgetId,
    caption: String,
    chips: Vec<RoleChip>,
    options: Vec<AddOption>,
    add_target: String,
    remove_target: String,
    managing: bool,
    /// Position among chips; one past the last chip is the add control.
    cursor: usize,
    list_open: bool,
    list_cursor: usize,
    add_in_flight: bool,
    pending: Option<Pending>,
}

impl RolePanel {
    pub fn from_manifest(field: &FieldManifest) -> Result<Self, ManifestError> {
        let roles = field.roles.as_ref().ok_or_else(|| ManifestError::Invalid {
            field: field.id.clone(),
            reason: "roles field without a roles block".to_string(),
        })?;
        Ok(Self {
            id: WidgetId::new(field.id.clone()),
            caption: field.label.clone(),
            chips: roles
                .granted
                .iter()
                .map(|chip| RoleChip {
                    role: chip.role.clone(),
                    text: chip.text.clone(),
                    removing: false,
                })
                .collect(),
            options: roles
                .available
                .iter()
                .map(|opt| AddOption {
                    choice: Choice::new(opt.value(), opt.text()),
                    marked: false,
                })
                .collect(),
            add_target: roles.add_target.clone(),
            remove_target: roles.remove_target.clone(),
            managing: false,
            cursor: 0,
            list_open: false,
            list_cursor: 0,
            add_in_flight: false,
            pending: None,
        })
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn is_managing(&self) -> bool {
        self.managing
    }

    pub fn chips(&self) -> &[RoleChip] {
        &self.chips
    }

    pub fn available(&self) -> Vec<&Choice> {
        self.options.iter().map(|opt| &opt.choice).collect()
    }

    pub fn begin_manage(&mut self) -> bool {
        if self.managing {
            return false;
        }
        self.managing = true;
        self.cursor = 0;
        true
    }

    /// Leave manage mode. Marks are a draft and do not survive.
    pub fn cancel(&mut self) {
        self.managing = false;
        self.list_open = false;
        self.pending = None;
        for opt in &mut self.options {
            opt.marked = false;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> NodeRequest {
        if !self.managing {
            return NodeRequest::None;
        }
        if key.code == KeyCode::Esc {
            if self.list_open {
                self.list_open = false;
            } else {
                self.cancel();
            }
            return NodeRequest::Render;
        }
        if self.list_open {
            return self.handle_list_key(key);
        }
        match key.code {
            KeyCode::Left => {
                if self.cursor == 0 {
                    return NodeRequest::None;
                }
                self.cursor -= 1;
                NodeRequest::Render
            }
            KeyCode::Right => {
                if self.cursor >= self.chips.len() {
                    return NodeRequest::None;
                }
                self.cursor += 1;
                NodeRequest::Render
            }
            KeyCode::Enter | KeyCode::Delete | KeyCode::Backspace => {
                if self.cursor < self.chips.len() {
                    return self.request_remove(self.cursor);
                }
                if key.code != KeyCode::Enter || self.add_in_flight {
                    return NodeRequest::None;
                }
                self.list_open = true;
                self.list_cursor = 0;
                NodeRequest::Render
            }
            _ => NodeRequest::None,
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> NodeRequest {
        match key.code {
            KeyCode::Up => {
                if self.list_cursor == 0 {
                    return NodeRequest::None;
                }
                self.list_cursor -= 1;
                NodeRequest::Render
            }
            KeyCode::Down => {
                if self.list_cursor + 1 >= self.options.len() {
                    return NodeRequest::None;
                }
                self.list_cursor += 1;
                NodeRequest::Render
            }
            KeyCode::Char(' ') => {
                if let Some(opt) = self.options.get_mut(self.list_cursor) {
                    opt.marked = !opt.marked;
                    return NodeRequest::Render;
                }
                NodeRequest::None
            }
            KeyCode::Enter => self.request_add(),
            _ => NodeRequest::None,
        }
    }

    fn request_remove(&mut self, index: usize) -> NodeRequest {
        let chip = &self.chips[index];
        if chip.removing {
            return NodeRequest::None;
        }
        self.pending = Some(Pending::Remove {
            role: chip.role.clone(),
        });
        NodeRequest::Confirm {
            prompt: format!("Do you really want to remove the role \"{}\"?", chip.text),
        }
    }

    /// An empty selection still posts; the backend answers it as a
    /// successful no-op. A real selection is gated behind a confirm.
    fn request_add(&mut self) -> NodeRequest {
        if self.add_in_flight {
            return NodeRequest::None;
        }
        let values: Vec<String> = self
            .options
            .iter()
            .filter(|opt| opt.marked)
            .map(|opt| opt.choice.value.clone())
            .collect();
        if values.is_empty() {
            return self.dispatch_add(values);
        }
        self.pending = Some(Pending::Add { values });
        NodeRequest::Confirm {
            prompt: "Do you really want to add the selected roles?".to_string(),
        }
    }

    pub fn confirm_accepted(&mut self) -> NodeRequest {
        match self.pending.take() {
            Some(Pending::Add { values }) => self.dispatch_add(values),
            Some(Pending::Remove { role }) => self.dispatch_remove(role),
            None => NodeRequest::None,
        }
    }

    pub fn confirm_declined(&mut self) -> NodeRequest {
        self.pending = None;
        NodeRequest::Render
    }

    fn dispatch_add(&mut self, values: Vec<String>) -> NodeRequest {
        self.add_in_flight = true;
        self.list_open = false;
        NodeRequest::Dispatch(Dispatch {
            action: SubmitAction::AddRoles,
            url: self.add_target.clone(),
            payload: Payload::JsonList(values),
            lenient: false,
        })
    }

    fn dispatch_remove(&mut self, role: String) -> NodeRequest {
        if let Some(chip) = self.chips.iter_mut().find(|c| c.role == role) {
            chip.removing = true;
        }
        NodeRequest::Dispatch(Dispatch {
            action: SubmitAction::RemoveRole { role: role.clone() },
            url: self.remove_target.clone(),
            payload: Payload::Single(role),
            lenient: false,
        })
    }

    pub fn settle(&mut self, action: &SubmitAction, outcome: &SaveOutcome) -> SettleEffect {
        match action {
            SubmitAction::AddRoles => {
                self.add_in_flight = false;
                if let SaveOutcome::Saved(result) = outcome {
                    self.apply_added(result);
                }
            }
            SubmitAction::RemoveRole { role } => self.settle_remove(role, outcome),
            _ => {}
        }
        SettleEffect {
            toast: outcome_toast(outcome),
            refresh: None,
        }
    }

    fn apply_added(&mut self, result: &SaveResult) {
        // New chips go in front, keeping the reply's order. Granted roles
        // pair with their display texts by index.
        let added = result
            .granted_roles
            .iter()
            .zip(result.new_role_nodes.iter());
        for (role, text) in added.rev() {
            self.chips.insert(
                0,
                RoleChip {
                    role: role.clone(),
                    text: text.clone(),
                    removing: false,
                },
            );
        }
        self.options
            .retain(|opt| !result.granted_roles.contains(&opt.choice.value));
        for opt in &mut self.options {
            opt.marked = false;
        }
        self.list_cursor = 0;
        self.cursor = self.cursor.min(self.chips.len());
    }

    fn settle_remove(&mut self, role: &str, outcome: &SaveOutcome) {
        let result = match outcome {
            SaveOutcome::Saved(result) => result,
            _ => {
                if let Some(chip) = self.chips.iter_mut().find(|c| c.role == role) {
                    chip.removing = false;
                }
                return;
            }
        };
        if let Some(pos) = self.chips.iter().position(|c| c.role == role) {
            let chip = self.chips.remove(pos);
            // The removed role rejoins the add list under the id the
            // server reports, falling back to the one we asked about.
            let value = result
                .current_role
                .clone()
                .unwrap_or_else(|| role.to_string());
            self.options.push(AddOption {
                choice: Choice::new(value, chip.text),
                marked: false,
            });
        }
        self.cursor = self.cursor.min(self.chips.len());
    }

    pub fn draw(&self, ctx: &DrawCtx) -> Vec<SpanLine> {
        let theme = ctx.theme;
        let mut first = vec![Span::styled(format!("{}: ", self.caption), theme.caption)];
        for (idx, chip) in self.chips.iter().enumerate() {
            let style = if ctx.focused && self.managing && !self.list_open && idx == self.cursor {
                theme.focused
            } else {
                theme.chip
            };
            let marker = if chip.removing { '\u{2026}' } else { '\u{00d7}' };
            first.push(Span::styled(format!("[{} {marker}]", chip.text), style));
            first.push(Span::new(" "));
        }
        if self.chips.is_empty() {
            first.push(Span::styled("(no roles)", theme.placeholder));
            first.push(Span::new(" "));
        }
        let add_style = if ctx.focused && self.managing && self.cursor == self.chips.len() {
            theme.focused
        } else {
            theme.hint
        };
        first.push(Span::styled("[+ add]", add_style));
        let mut lines = vec![first];
        if self.list_open {
            for (idx, opt) in self.options.iter().enumerate() {
                let mark = if opt.marked { "[x]" } else { "[ ]" };
                let style = if idx == self.list_cursor {
                    theme.editing
                } else {
                    theme.value
                };
                lines.push(vec![
                    Span::new("   "),
                    Span::styled(format!("{mark} {}", opt.choice.text), style),
                ]);
            }
            if self.options.is_empty() {
                lines.push(vec![
                    Span::new("   "),
                    Span::styled("(no roles left to add)", theme.placeholder),
                ]);
            }
            lines.push(vec![
                Span::new("   "),
                Span::styled("space mark  enter add  esc close", theme.hint),
            ]);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::RowManifest;

    fn panel() -> RolePanel {
        let yaml = r#"
id: project-17
fields:
  - id: members
    label: Members
    kind: roles
    roles:
      granted:
        - role: "41"
          text: Reviewer
      available:
        - value: "42"
          text: Submitter
        - value: "43"
          text: Bioinformatician
      add_target: /projects/17/roles/add
      remove_target: /projects/17/roles/remove
"#;
        let row = RowManifest::parse(yaml).unwrap();
        RolePanel::from_manifest(&row.fields[0]).unwrap()
    }

    fn press(panel: &mut RolePanel, code: KeyCode) -> NodeRequest {
        panel.handle_key(KeyEvent::plain(code))
    }

    fn added_reply(roles: &[(&str, &str)]) -> SaveResult {
        let mut result = SaveResult::succeeded();
        result.granted_roles = roles.iter().map(|(role, _)| role.to_string()).collect();
        result.new_role_nodes = roles.iter().map(|(_, text)| text.to_string()).collect();
        result
    }

    #[test]
    fn adding_confirms_then_posts_the_marked_roles_as_json() {
        let mut panel = panel();
        panel.begin_manage();
        press(&mut panel, KeyCode::Right);
        press(&mut panel, KeyCode::Enter);
        assert!(panel.list_open);
        press(&mut panel, KeyCode::Char(' '));
        press(&mut panel, KeyCode::Down);
        press(&mut panel, KeyCode::Char(' '));

        match press(&mut panel, KeyCode::Enter) {
            NodeRequest::Confirm { prompt } => {
                assert_eq!(prompt, "Do you really want to add the selected roles?");
            }
            other => panic!("expected a confirm, got {other:?}"),
        }
        match panel.confirm_accepted() {
            NodeRequest::Dispatch(dispatch) => {
                assert_eq!(dispatch.action, SubmitAction::AddRoles);
                assert_eq!(dispatch.url, "/projects/17/roles/add");
                assert_eq!(
                    dispatch.payload,
                    Payload::JsonList(vec!["42".to_string(), "43".to_string()])
                );
            }
            other => panic!("expected a dispatch, got {other:?}"),
        }
    }

    #[test]
    fn an_empty_selection_posts_without_a_confirm() {
        let mut panel = panel();
        panel.begin_manage();
        press(&mut panel, KeyCode::Right);
        press(&mut panel, KeyCode::Enter);
        match press(&mut panel, KeyCode::Enter) {
            NodeRequest::Dispatch(dispatch) => {
                assert_eq!(dispatch.payload, Payload::JsonList(Vec::new()));
            }
            other => panic!("expected a dispatch, got {other:?}"),
        }
    }

    #[test]
    fn added_roles_become_chips_and_leave_the_add_list() {
        let mut panel = panel();
        panel.begin_manage();
        press(&mut panel, KeyCode::Right);
        press(&mut panel, KeyCode::Enter);
        press(&mut panel, KeyCode::Char(' '));
        press(&mut panel, KeyCode::Enter);
        panel.confirm_accepted();

        let effect = panel.settle(
            &SubmitAction::AddRoles,
            &SaveOutcome::Saved(added_reply(&[("42", "Submitter")])),
        );
        assert_eq!(effect.toast.title, "Success");
        let texts: Vec<&str> = panel.chips().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Submitter", "Reviewer"]);
        let left: Vec<&str> = panel.available().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(left, vec!["Bioinformatician"]);
    }

    #[test]
    fn removing_confirms_and_returns_the_role_to_the_add_list() {
        let mut panel = panel();
        panel.begin_manage();
        match press(&mut panel, KeyCode::Enter) {
            NodeRequest::Confirm { prompt } => {
                assert_eq!(prompt, "Do you really want to remove the role \"Reviewer\"?");
            }
            other => panic!("expected a confirm, got {other:?}"),
        }
        match panel.confirm_accepted() {
            NodeRequest::Dispatch(dispatch) => {
                assert_eq!(
                    dispatch.action,
                    SubmitAction::RemoveRole {
                        role: "41".to_string()
                    }
                );
                assert_eq!(dispatch.payload, Payload::Single("41".to_string()));
            }
            other => panic!("expected a dispatch, got {other:?}"),
        }
        assert!(panel.chips()[0].removing);

        let mut result = SaveResult::succeeded();
        result.current_role = Some("41".to_string());
        panel.settle(
            &SubmitAction::RemoveRole {
                role: "41".to_string(),
            },
            &SaveOutcome::Saved(result),
        );
        assert!(panel.chips().is_empty());
        let left: Vec<&str> = panel.available().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(left, vec!["Submitter", "Bioinformatician", "Reviewer"]);
    }

    #[test]
    fn a_failed_removal_keeps_the_chip() {
        let mut panel = panel();
        panel.begin_manage();
        press(&mut panel, KeyCode::Enter);
        panel.confirm_accepted();
        panel.settle(
            &SubmitAction::RemoveRole {
                role: "41".to_string(),
            },
            &SaveOutcome::Rejected {
                message: "Cannot remove the last reviewer".to_string(),
            },
        );
        assert_eq!(panel.chips().len(), 1);
        assert!(!panel.chips()[0].removing);
    }

    #[test]
    fn declining_keeps_the_marks_and_sends_nothing() {
        let mut panel = panel();
        panel.begin_manage();
        press(&mut panel, KeyCode::Right);
        press(&mut panel, KeyCode::Enter);
        press(&mut panel, KeyCode::Char(' '));
        press(&mut panel, KeyCode::Enter);
        panel.confirm_declined();
        assert!(matches!(panel.confirm_accepted(), NodeRequest::None));

        // The marks survive the declined confirm.
        match press(&mut panel, KeyCode::Enter) {
            NodeRequest::Confirm { .. } => {}
            other => panic!("expected a confirm, got {other:?}"),
        }
    }
}
