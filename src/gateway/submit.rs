use crate::core::outcome::SaveOutcome;
use crate::core::{RowId, WidgetId};
use crate::gateway::payload::Payload;
use crate::gateway::transport::{Transport, TransportError};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Save,
    AddRoles,
    RemoveRole { role: String },
    RefreshRow { row: RowId },
}

#[derive(Debug, Clone)]
pub enum GatewayRequest {
    PostForm {
        url: String,
        payload: Payload,
        /// Endpoints that answer 2xx with an empty or non-JSON body.
        lenient: bool,
    },
    Get {
        url: String,
    },
}

/// One fire-and-settle request. There is no cancellation: once dispatched,
/// the settlement always comes back and is always applied.
#[derive(Debug, Clone)]
pub struct Submission {
    pub widget: WidgetId,
    pub action: SubmitAction,
    pub request: GatewayRequest,
}

#[derive(Debug)]
pub enum Settled {
    Save(SaveOutcome),
    Fragment(Result<String, TransportError>),
}

#[derive(Debug)]
pub struct Settlement {
    pub widget: WidgetId,
    pub run: u64,
    pub action: SubmitAction,
    pub settled: Settled,
}

/// Runs submissions on worker threads and hands settlements back to the
/// event loop through a channel. Completion order follows the network,
/// not dispatch order.
pub struct SubmitQueue {
    transport: Arc<dyn Transport>,
    completion_tx: Sender<Settlement>,
    completion_rx: Receiver<Settlement>,
    next_run: u64,
}

impl SubmitQueue {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel::<Settlement>();
        Self {
            transport,
            completion_tx,
            completion_rx,
            next_run: 0,
        }
    }

    pub fn dispatch(&mut self, submission: Submission) -> u64 {
        let run = self.next_run;
        self.next_run += 1;
        log::debug!(
            "dispatching {:?} for {} (run {run})",
            submission.action,
            submission.widget
        );

        let transport = Arc::clone(&self.transport);
        let completion_tx = self.completion_tx.clone();
        std::thread::spawn(move || {
            let settled = settle(transport.as_ref(), &submission.request);
            let _ = completion_tx.send(Settlement {
                widget: submission.widget,
                run,
                action: submission.action,
                settled,
            });
        });
        run
    }

    pub fn drain_ready(&self) -> Vec<Settlement> {
        let mut out = Vec::<Settlement>::new();
        loop {
            match self.completion_rx.try_recv() {
                Ok(settlement) => out.push(settlement),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

fn settle(transport: &dyn Transport, request: &GatewayRequest) -> Settled {
    match request {
        GatewayRequest::PostForm {
            url,
            payload,
            lenient,
        } => {
            let outcome = match transport.post_form(url, &payload.encode()) {
                Ok(reply) => SaveOutcome::decode_body(&reply.body, *lenient),
                Err(err) => {
                    log::warn!("save to {url} failed: {err}");
                    failure_outcome(&err)
                }
            };
            Settled::Save(outcome)
        }
        GatewayRequest::Get { url } => {
            Settled::Fragment(transport.get(url).map(|reply| reply.body))
        }
    }
}

/// Toast title and detail for a request that never got a usable reply.
/// A JSON error body with a `message` wins over the status line.
pub fn failure_outcome(err: &TransportError) -> SaveOutcome {
    match err {
        TransportError::Status {
            message: Some(message),
            ..
        } => SaveOutcome::Failed {
            title: "Request failed".to_string(),
            detail: message.clone(),
        },
        TransportError::Status {
            status,
            status_text,
            message: None,
        } => SaveOutcome::Failed {
            title: "error occurred while processing the data".to_string(),
            detail: format!("Reason: {status_text} {status}"),
        },
        TransportError::Network { detail } => SaveOutcome::Failed {
            title: "error occurred while processing the data".to_string(),
            detail: format!("Reason: {detail}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::transport::Reply;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct ScriptedTransport {
        replies: Mutex<Vec<Result<Reply, TransportError>>>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<Reply, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn post_form(&self, url: &str, body: &str) -> Result<Reply, TransportError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), body.to_string()));
            self.replies.lock().unwrap().remove(0)
        }

        fn get(&self, url: &str) -> Result<Reply, TransportError> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), String::new()));
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn drain_n(queue: &SubmitQueue, n: usize) -> Vec<Settlement> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut out = Vec::new();
        while out.len() < n && Instant::now() < deadline {
            out.extend(queue.drain_ready());
            std::thread::sleep(Duration::from_millis(2));
        }
        out
    }

    fn ok_reply(body: &str) -> Result<Reply, TransportError> {
        Ok(Reply {
            status: 200,
            body: body.to_string(),
        })
    }

    #[test]
    fn settlement_carries_widget_action_and_outcome() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok_reply(r#"{"success":true}"#)]));
        let mut queue = SubmitQueue::new(transport.clone());
        queue.dispatch(Submission {
            widget: WidgetId::new("sample-name"),
            action: SubmitAction::Save,
            request: GatewayRequest::PostForm {
                url: "http://backend/sample/updateName".to_string(),
                payload: Payload::Single("GRCh38".to_string()),
                lenient: false,
            },
        });

        let settlements = drain_n(&queue, 1);
        assert_eq!(settlements.len(), 1);
        let settlement = &settlements[0];
        assert_eq!(settlement.widget.as_str(), "sample-name");
        assert_eq!(settlement.action, SubmitAction::Save);
        assert!(matches!(
            settlement.settled,
            Settled::Save(SaveOutcome::Saved(_))
        ));

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].0, "http://backend/sample/updateName");
        assert_eq!(requests[0].1, "value=GRCh38");
    }

    #[test]
    fn json_error_message_beats_the_status_line() {
        let outcome = failure_outcome(&TransportError::Status {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            message: Some("database unavailable".to_string()),
        });
        match outcome {
            SaveOutcome::Failed { title, detail } => {
                assert_eq!(title, "Request failed");
                assert_eq!(detail, "database unavailable");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn bare_status_errors_report_status_text_and_code() {
        let outcome = failure_outcome(&TransportError::Status {
            status: 404,
            status_text: "Not Found".to_string(),
            message: None,
        });
        match outcome {
            SaveOutcome::Failed { title, detail } => {
                assert_eq!(title, "error occurred while processing the data");
                assert_eq!(detail, "Reason: Not Found 404");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn run_ids_are_unique_and_increasing() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok_reply(r#"{"success":true}"#),
            ok_reply(r#"{"success":true}"#),
        ]));
        let mut queue = SubmitQueue::new(transport);
        let submission = Submission {
            widget: WidgetId::new("w"),
            action: SubmitAction::Save,
            request: GatewayRequest::PostForm {
                url: "http://backend/x".to_string(),
                payload: Payload::Single(String::new()),
                lenient: false,
            },
        };
        let first = queue.dispatch(submission.clone());
        let second = queue.dispatch(submission);
        assert!(second > first);
        assert_eq!(drain_n(&queue, 2).len(), 2);
    }
}
