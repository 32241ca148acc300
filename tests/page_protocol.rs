//! End-to-end exercises of the label/editor protocol: keys go into a
//! page, scripted replies come back through the gateway, and the tests
//! watch what the widgets settle into.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use flipfield::gateway::{Reply, Transport, TransportError};
use flipfield::manifest::PageManifest;
use flipfield::notify::Severity;
use flipfield::runtime::Page;
use flipfield::terminal::{KeyCode, KeyEvent};
use flipfield::ui::span::line_text;
use flipfield::widget::Node;

#[derive(Debug, Clone, PartialEq)]
enum Request {
    Post { url: String, body: String },
    Get { url: String },
}

struct ScriptedTransport {
    replies: Mutex<Vec<Result<Reply, TransportError>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<Reply, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn post_form(&self, url: &str, body: &str) -> Result<Reply, TransportError> {
        self.requests.lock().unwrap().push(Request::Post {
            url: url.to_string(),
            body: body.to_string(),
        });
        self.replies.lock().unwrap().remove(0)
    }

    fn get(&self, url: &str) -> Result<Reply, TransportError> {
        self.requests.lock().unwrap().push(Request::Get {
            url: url.to_string(),
        });
        self.replies.lock().unwrap().remove(0)
    }
}

/// Never answers. Keeps a save in flight for as long as a test needs.
struct StalledTransport;

impl Transport for StalledTransport {
    fn post_form(&self, _url: &str, _body: &str) -> Result<Reply, TransportError> {
        thread::sleep(Duration::from_secs(60));
        Err(TransportError::Network {
            detail: "stalled".to_string(),
        })
    }

    fn get(&self, _url: &str) -> Result<Reply, TransportError> {
        thread::sleep(Duration::from_secs(60));
        Err(TransportError::Network {
            detail: "stalled".to_string(),
        })
    }
}

fn ok(body: &str) -> Result<Reply, TransportError> {
    Ok(Reply {
        status: 200,
        body: body.to_string(),
    })
}

fn page_with(manifest: &str, transport: Arc<dyn Transport>) -> Page {
    let manifest = PageManifest::parse(manifest).unwrap();
    Page::new(&manifest, transport).unwrap()
}

fn press(page: &mut Page, code: KeyCode) {
    page.handle_key(KeyEvent::plain(code));
}

fn type_text(page: &mut Page, text: &str) {
    for ch in text.chars() {
        press(page, KeyCode::Char(ch));
    }
}

/// Wait for at least one settlement to pump through.
fn settle(page: &mut Page) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if page.pump() {
            return;
        }
        thread::sleep(Duration::from_millis(2));
    }
    panic!("no settlement arrived within the deadline");
}

fn rendered(page: &Page) -> Vec<String> {
    page.render()
        .lines
        .iter()
        .map(|line| line_text(line))
        .collect()
}

fn label_of(page: &Page, row: usize, node: usize) -> String {
    match &page.rows()[row].nodes()[node] {
        Node::Switch(switch) => switch.label().to_string(),
        Node::Roles(_) => panic!("widget at ({row}, {node}) is a role panel"),
    }
}

const NAME_ROW: &str = r#"
title: Projects
rows:
  - id: project-17
    fields:
      - {id: name, label: Name, kind: plain-text, value: alpha, target: /projects/17/name}
"#;

const TRACKER_ROW: &str = r#"
title: Projects
rows:
  - id: project-17
    fields:
      - id: tracker
        label: Tracker
        kind: url
        value: https://tracker.example.org/seq/17
        target: /projects/17/tracker
"#;

const ARCHIVE_ROW: &str = r#"
title: Projects
rows:
  - id: project-17
    fields:
      - id: archived
        label: Archived
        kind: toggle
        value: "false"
        target: /projects/17/archived
        confirm: Do you really want to change the archive state?
        reload: true
        refresh: /projects/17/row
"#;

#[test]
fn a_rejected_save_rolls_the_text_draft_back() {
    let transport = ScriptedTransport::new(vec![ok(
        r#"{"success":false,"error":"Name already in use"}"#,
    )]);
    let mut page = page_with(NAME_ROW, transport.clone());

    press(&mut page, KeyCode::Enter);
    type_text(&mut page, "-draft");
    press(&mut page, KeyCode::Enter);

    // The editor hides at dispatch time, before any reply lands.
    assert!(!page.rows()[0].nodes()[0].is_editing());
    assert!(page.rows()[0].nodes()[0].is_in_flight());

    settle(&mut page);
    let toast = page.toaster().latest().unwrap();
    assert_eq!(toast.severity, Severity::Warning);
    assert_eq!(toast.title, "Data could not be stored");
    assert_eq!(toast.message, "Name already in use");
    assert_eq!(label_of(&page, 0, 0), "alpha");
    assert!(!page.rows()[0].nodes()[0].is_in_flight());
    assert_eq!(
        transport.requests(),
        vec![Request::Post {
            url: "/projects/17/name".into(),
            body: "value=alpha-draft".into(),
        }]
    );
}

#[test]
fn a_confirmed_save_takes_the_editor_state_into_the_label() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"success":true}"#)]);
    let mut page = page_with(
        r#"
title: Projects
rows:
  - id: project-17
    fields:
      - id: species
        label: Species
        kind: dropdown
        value: Homo sapiens
        target: /projects/17/species
        options:
          - {value: "9606", text: Homo sapiens}
          - {value: "10090", text: Mus musculus}
"#,
        transport.clone(),
    );

    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Right);
    press(&mut page, KeyCode::Enter);
    settle(&mut page);

    let toast = page.toaster().latest().unwrap();
    assert_eq!(toast.severity, Severity::Success);
    assert_eq!(toast.message, "Data stored successfully");
    assert_eq!(label_of(&page, 0, 0), "Mus musculus");
    assert_eq!(
        transport.requests(),
        vec![Request::Post {
            url: "/projects/17/species".into(),
            body: "value=10090".into(),
        }]
    );
    assert!(
        rendered(&page)
            .iter()
            .any(|l| l.contains("Species: Mus musculus"))
    );
}

#[test]
fn url_drafts_survive_a_transport_failure_for_retry() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Network {
            detail: "connection reset".to_string(),
        }),
        ok(r#"{"success":true}"#),
    ]);
    let mut page = page_with(TRACKER_ROW, transport.clone());

    press(&mut page, KeyCode::Enter);
    type_text(&mut page, "/runs");
    press(&mut page, KeyCode::Enter);
    settle(&mut page);

    let toast = page.toaster().latest().unwrap();
    assert_eq!(toast.severity, Severity::Error);
    assert_eq!(toast.title, "error occurred while processing the data");
    assert_eq!(toast.message, "Reason: connection reset");
    assert_eq!(label_of(&page, 0, 0), "https://tracker.example.org/seq/17");

    // The draft survived, so reopening and saving again retries as-is.
    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Enter);
    settle(&mut page);
    assert_eq!(
        label_of(&page, 0, 0),
        "https://tracker.example.org/seq/17/runs"
    );
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
}

#[test]
fn cancelling_an_edit_never_touches_the_network() {
    let transport = ScriptedTransport::new(Vec::new());
    let mut page = page_with(NAME_ROW, transport.clone());

    press(&mut page, KeyCode::Enter);
    type_text(&mut page, "zzz");
    press(&mut page, KeyCode::Esc);

    assert!(!page.rows()[0].nodes()[0].is_editing());
    assert_eq!(label_of(&page, 0, 0), "alpha");
    assert!(transport.requests().is_empty());
}

#[test]
fn confirmed_toggles_save_then_rebind_the_row_from_a_fragment() {
    let fragment = r#"
id: project-17
fields:
  - {id: archived, label: Archived, kind: toggle, value: "true", target: /projects/17/archived, reload: true, refresh: /projects/17/row}
  - {id: archived-on, label: Archived on, kind: date, value: "2026-08-23", target: /projects/17/archived-on}
"#;
    let transport = ScriptedTransport::new(vec![ok(r#"{"success":true}"#), ok(fragment)]);
    let mut page = page_with(ARCHIVE_ROW, transport.clone());

    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Enter);
    assert!(page.has_modal());
    assert!(transport.requests().is_empty());

    press(&mut page, KeyCode::Char('y'));
    settle(&mut page); // the save
    settle(&mut page); // the refresh fragment

    assert_eq!(page.rows()[0].len(), 2);
    assert_eq!(label_of(&page, 0, 0), "true");
    assert_eq!(label_of(&page, 0, 1), "2026-08-23");
    assert_eq!(
        transport.requests(),
        vec![
            Request::Post {
                url: "/projects/17/archived".into(),
                body: "value=true".into(),
            },
            Request::Get {
                url: "/projects/17/row".into(),
            },
        ]
    );
}

#[test]
fn declining_a_confirm_keeps_the_editor_and_sends_nothing() {
    let transport = ScriptedTransport::new(Vec::new());
    let mut page = page_with(ARCHIVE_ROW, transport.clone());

    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Enter);
    assert!(page.has_modal());
    press(&mut page, KeyCode::Char('n'));

    assert!(!page.has_modal());
    assert!(page.rows()[0].nodes()[0].is_editing());
    assert!(transport.requests().is_empty());

    press(&mut page, KeyCode::Esc);
    assert!(!page.rows()[0].nodes()[0].is_editing());
}

#[test]
fn invalid_input_raises_an_alert_instead_of_a_request() {
    let transport = ScriptedTransport::new(Vec::new());
    let mut page = page_with(
        r#"
title: Projects
rows:
  - id: project-17
    fields:
      - id: priority
        label: Priority
        kind: integer
        value: "2"
        target: /projects/17/priority
        constraints:
          required: true
"#,
        transport.clone(),
    );

    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Backspace);
    press(&mut page, KeyCode::Enter);

    assert!(page.has_modal());
    assert!(rendered(&page).iter().any(
        |l| l.contains("The input is not valid. Please provide a valid input value.")
    ));
    assert!(transport.requests().is_empty());

    // Dismissing the alert leaves the editor open for another try.
    press(&mut page, KeyCode::Enter);
    assert!(!page.has_modal());
    assert!(page.rows()[0].nodes()[0].is_editing());
}

#[test]
fn checkbox_saves_post_the_checked_names_in_order() {
    let transport = ScriptedTransport::new(vec![ok(r#"{"success":true}"#)]);
    let mut page = page_with(
        r#"
title: Projects
rows:
  - id: project-17
    fields:
      - id: notify
        label: Notify
        kind: checkboxes
        target: /projects/17/notify
        checks:
          - {name: on-failure, checked: true}
          - {name: on-finish}
"#,
        transport.clone(),
    );

    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Down);
    press(&mut page, KeyCode::Char(' '));
    press(&mut page, KeyCode::Enter);
    settle(&mut page);

    assert_eq!(label_of(&page, 0, 0), "on-failure, on-finish");
    assert_eq!(
        transport.requests(),
        vec![Request::Post {
            url: "/projects/17/notify".into(),
            body: "value%5B0%5D=on-failure&value%5B1%5D=on-finish".into(),
        }]
    );
}

#[test]
fn role_additions_flow_from_marks_to_chips_through_the_page() {
    let transport = ScriptedTransport::new(vec![ok(
        r#"{"success":true,"newProjectRolesNodes":["Submitter"],"currentProjectRole":["42"]}"#,
    )]);
    let mut page = page_with(
        r#"
title: Projects
rows:
  - id: project-17
    fields:
      - id: members
        label: Members
        kind: roles
        roles:
          granted:
            - {role: "41", text: Reviewer}
          available:
            - {value: "42", text: Submitter}
            - {value: "43", text: Bioinformatician}
          add_target: /projects/17/roles/add
          remove_target: /projects/17/roles/remove
"#,
        transport.clone(),
    );

    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Right);
    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Char(' '));
    press(&mut page, KeyCode::Enter);
    assert!(page.has_modal());
    press(&mut page, KeyCode::Char('y'));
    settle(&mut page);

    let Node::Roles(panel) = &page.rows()[0].nodes()[0] else {
        panic!("expected a role panel");
    };
    let chips: Vec<&str> = panel.chips().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(chips, vec!["Submitter", "Reviewer"]);
    let left: Vec<&str> = panel.available().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(left, vec!["Bioinformatician"]);
    assert_eq!(
        transport.requests(),
        vec![Request::Post {
            url: "/projects/17/roles/add".into(),
            body: format!("value={}", urlencoding::encode(r#"["42"]"#)),
        }]
    );
}

#[test]
fn an_in_flight_save_blocks_reopening_with_a_wait_toast() {
    let mut page = page_with(NAME_ROW, Arc::new(StalledTransport));

    press(&mut page, KeyCode::Enter);
    press(&mut page, KeyCode::Enter);
    assert!(page.rows()[0].nodes()[0].is_in_flight());

    press(&mut page, KeyCode::Enter);
    assert!(!page.rows()[0].nodes()[0].is_editing());
    let toast = page.toaster().latest().unwrap();
    assert_eq!(toast.severity, Severity::Info);
    assert_eq!(toast.title, "Please wait");
}
