//! The page: rows of widgets, one keyboard focus, a toast stack, and the
//! submit queue that settles saves back into the widgets.

use std::sync::Arc;

use crate::core::{RowId, WidgetId};
use crate::gateway::submit::{
    GatewayRequest, Settled, Settlement, SubmitAction, Submission, SubmitQueue,
};
use crate::gateway::transport::Transport;
use crate::manifest::{ManifestError, PageManifest, RowManifest};
use crate::notify::{Toast, Toaster};
use crate::terminal::{KeyCode, KeyEvent, TerminalEvent};
use crate::ui::render::{modal_lines, toast_lines};
use crate::ui::span::{Span, SpanLine};
use crate::ui::theme::Theme;
use crate::widget::row::{Node, Row};
use crate::widget::switch::outcome_toast;
use crate::widget::traits::{Dispatch, DrawCtx, NodeRequest};

const FOOTER_HELP: &str = "arrows move  enter edit  esc cancel  x dismiss toast  q quit";

enum Modal {
    /// Yes/no gate for a save. `row`/`node` locate the widget whose
    /// prepared payload is waiting on the answer.
    Confirm {
        row: usize,
        node: usize,
        prompt: String,
    },
    /// Blocking notice, used for client-side validation failures.
    Alert { message: String },
}

/// A rendered frame plus the line to keep in view.
pub struct Frame {
    pub lines: Vec<SpanLine>,
    pub focus_line: Option<usize>,
}

pub struct Page {
    title: String,
    rows: Vec<Row>,
    focus: (usize, usize),
    queue: SubmitQueue,
    toaster: Toaster,
    theme: Theme,
    modal: Option<Modal>,
    exit: bool,
}

impl Page {
    pub fn new(
        manifest: &PageManifest,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ManifestError> {
        let mut rows = Vec::with_capacity(manifest.rows.len());
        for row in &manifest.rows {
            rows.push(Row::from_manifest(row)?);
        }
        Ok(Self {
            title: manifest.title.clone(),
            rows,
            focus: (0, 0),
            queue: SubmitQueue::new(transport),
            toaster: Toaster::new(),
            theme: Theme::default(),
            modal: None,
            exit: false,
        })
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    /// True while a modal prompt is holding all other input.
    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Returns whether the frame needs redrawing.
    pub fn handle_event(&mut self, event: TerminalEvent) -> bool {
        match event {
            TerminalEvent::Key(key) => self.handle_key(key),
            TerminalEvent::Resize(_) => true,
            TerminalEvent::Tick => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }
        if let Some((row, node)) = self.editing_node() {
            let request = self.rows[row].nodes_mut()[node].handle_key(key);
            return self.apply_request(row, node, request);
        }
        self.handle_browse_key(key)
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> bool {
        let Some(modal) = self.modal.take() else {
            return false;
        };
        match modal {
            Modal::Alert { message } => match key.code {
                KeyCode::Enter | KeyCode::Esc => true,
                _ => {
                    self.modal = Some(Modal::Alert { message });
                    false
                }
            },
            Modal::Confirm { row, node, prompt } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    if let Some(target) = self
                        .rows
                        .get_mut(row)
                        .and_then(|r| r.nodes_mut().get_mut(node))
                    {
                        let request = target.confirm_accepted();
                        self.apply_request(row, node, request);
                    }
                    true
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    if let Some(target) = self
                        .rows
                        .get_mut(row)
                        .and_then(|r| r.nodes_mut().get_mut(node))
                    {
                        target.confirm_declined();
                    }
                    true
                }
                _ => {
                    self.modal = Some(Modal::Confirm { row, node, prompt });
                    false
                }
            },
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => {
                self.exit = true;
                true
            }
            KeyCode::Char('x') => self.toaster.dismiss_oldest().is_some(),
            KeyCode::Up | KeyCode::BackTab => self.move_focus(-1),
            KeyCode::Down | KeyCode::Tab => self.move_focus(1),
            KeyCode::Enter | KeyCode::Char('e') => {
                self.open_focused_editor();
                true
            }
            _ => false,
        }
    }

    /// Navigation walks widgets in page order, rows flattened. Disabled
    /// while an editor is open, so focus cannot leave an edit in
    /// progress.
    fn move_focus(&mut self, delta: i32) -> bool {
        let flat: Vec<(usize, usize)> = self
            .rows
            .iter()
            .enumerate()
            .flat_map(|(row, r)| (0..r.len()).map(move |node| (row, node)))
            .collect();
        if flat.is_empty() {
            return false;
        }
        let current = flat
            .iter()
            .position(|&pos| pos == self.focus)
            .unwrap_or(0);
        let next = if delta < 0 {
            current.checked_sub(1)
        } else if current + 1 < flat.len() {
            Some(current + 1)
        } else {
            None
        };
        match next {
            Some(idx) => {
                self.focus = flat[idx];
                true
            }
            None => false,
        }
    }

    fn open_focused_editor(&mut self) {
        let (row_idx, node_idx) = self.focus;
        let Some(row) = self.rows.get_mut(row_idx) else {
            return;
        };
        if row.has_open_editor() {
            self.toaster.push(Toast::info(
                "Row busy",
                "Finish the editor already open in this row.",
            ));
            return;
        }
        let Some(node) = row.nodes_mut().get_mut(node_idx) else {
            return;
        };
        if node.is_in_flight() {
            self.toaster.push(Toast::info(
                "Please wait",
                "A save for this field is still settling.",
            ));
            return;
        }
        node.begin_edit();
    }

    fn editing_node(&self) -> Option<(usize, usize)> {
        for (row_idx, row) in self.rows.iter().enumerate() {
            if let Some(node_idx) = row.nodes().iter().position(Node::is_editing) {
                return Some((row_idx, node_idx));
            }
        }
        None
    }

    fn apply_request(&mut self, row_idx: usize, node_idx: usize, request: NodeRequest) -> bool {
        match request {
            NodeRequest::None => false,
            NodeRequest::Render => true,
            NodeRequest::Dispatch(dispatch) => {
                self.dispatch(row_idx, node_idx, dispatch);
                true
            }
            NodeRequest::Confirm { prompt } => {
                self.modal = Some(Modal::Confirm {
                    row: row_idx,
                    node: node_idx,
                    prompt,
                });
                true
            }
            NodeRequest::Alert { message } => {
                self.modal = Some(Modal::Alert { message });
                true
            }
        }
    }

    fn dispatch(&mut self, row_idx: usize, node_idx: usize, dispatch: Dispatch) {
        let Some(widget) = self
            .rows
            .get(row_idx)
            .and_then(|row| row.nodes().get(node_idx))
            .map(|node| node.widget_id().clone())
        else {
            return;
        };
        self.queue.dispatch(Submission {
            widget,
            action: dispatch.action,
            request: GatewayRequest::PostForm {
                url: dispatch.url,
                payload: dispatch.payload,
                lenient: dispatch.lenient,
            },
        });
    }

    // -----------------------------------------------------------------------
    // Settlements
    // -----------------------------------------------------------------------

    /// Apply every settlement the gateway has ready. Settlements land in
    /// network completion order.
    pub fn pump(&mut self) -> bool {
        let settlements = self.queue.drain_ready();
        let dirty = !settlements.is_empty();
        for settlement in settlements {
            self.apply_settlement(settlement);
        }
        dirty
    }

    fn apply_settlement(&mut self, settlement: Settlement) {
        match settlement.settled {
            Settled::Save(outcome) => {
                let Some((row_idx, node_idx)) = self.find_widget(&settlement.widget) else {
                    // The row was rebound while this save settled; the
                    // result still gets its notification.
                    self.toaster.push(outcome_toast(&outcome));
                    return;
                };
                let effect =
                    self.rows[row_idx].nodes_mut()[node_idx].settle(&settlement.action, &outcome);
                self.toaster.push(effect.toast);
                if let Some(url) = effect.refresh {
                    let row_id = self.rows[row_idx].id().clone();
                    self.queue.dispatch(Submission {
                        widget: settlement.widget,
                        action: SubmitAction::RefreshRow { row: row_id },
                        request: GatewayRequest::Get { url },
                    });
                }
            }
            Settled::Fragment(Ok(body)) => {
                let SubmitAction::RefreshRow { row } = settlement.action else {
                    return;
                };
                match RowManifest::parse(&body) {
                    Ok(manifest) => self.rebind_row(&row, &manifest),
                    Err(err) => {
                        log::warn!("row refresh for {row} returned a bad manifest: {err}");
                        self.toaster
                            .push(Toast::error("Refresh failed", err.to_string()));
                    }
                }
            }
            Settled::Fragment(Err(err)) => {
                self.toaster
                    .push(Toast::error("Refresh failed", err.to_string()));
            }
        }
    }

    /// Replace a row's widgets with freshly fetched manifest state. Any
    /// open editor in that row is discarded with it.
    fn rebind_row(&mut self, row_id: &RowId, manifest: &RowManifest) {
        let Some(idx) = self.rows.iter().position(|row| row.id() == row_id) else {
            log::warn!("row refresh settled for unknown row {row_id}");
            return;
        };
        match Row::from_manifest(manifest) {
            Ok(row) => {
                self.rows[idx] = row;
                self.clamp_focus();
            }
            Err(err) => self
                .toaster
                .push(Toast::error("Refresh failed", err.to_string())),
        }
    }

    fn find_widget(&self, widget: &WidgetId) -> Option<(usize, usize)> {
        self.rows.iter().enumerate().find_map(|(row_idx, row)| {
            row.position(widget).map(|node_idx| (row_idx, node_idx))
        })
    }

    fn clamp_focus(&mut self) {
        if self.rows.is_empty() {
            self.focus = (0, 0);
            return;
        }
        let (mut row, mut node) = self.focus;
        if row >= self.rows.len() {
            row = self.rows.len() - 1;
        }
        let len = self.rows[row].len();
        if node >= len {
            node = len.saturating_sub(1);
        }
        self.focus = (row, node);
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&self) -> Frame {
        let theme = &self.theme;
        let mut lines: Vec<SpanLine> = Vec::new();
        lines.push(vec![Span::styled(self.title.clone(), theme.caption)]);
        lines.extend(toast_lines(&self.toaster, theme));
        if let Some(modal) = &self.modal {
            match modal {
                Modal::Confirm { prompt, .. } => {
                    lines.extend(modal_lines("Confirm", prompt, "y confirm  n cancel", theme));
                }
                Modal::Alert { message } => {
                    lines.extend(modal_lines("Notice", message, "enter dismiss", theme));
                }
            }
        }

        let mut focus_line = None;
        for (row_idx, row) in self.rows.iter().enumerate() {
            lines.push(Vec::new());
            lines.push(vec![Span::styled(
                format!("\u{2500}\u{2500} {}", row.id()),
                theme.hint,
            )]);
            for (node_idx, node) in row.nodes().iter().enumerate() {
                let focused = self.focus == (row_idx, node_idx);
                if focused {
                    focus_line = Some(lines.len());
                }
                let ctx = DrawCtx {
                    theme,
                    focused: focused && self.modal.is_none(),
                };
                for node_line in node.draw(&ctx) {
                    let mut line = vec![Span::new("  ")];
                    line.extend(node_line);
                    lines.push(line);
                }
            }
        }

        lines.push(Vec::new());
        lines.push(vec![Span::styled(FOOTER_HELP, theme.hint)]);
        Frame { lines, focus_line }
    }
}
