use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use flipfield::gateway::{HttpTransport, Transport, TransportError};

struct CapturedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn spawn_server(
    status_line: &str,
    response_body: &str,
) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let status_line = status_line.to_string();
    let response_body = response_body.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("read request line");
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();

        let mut headers = Vec::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header line");
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.trim_end().split_once(": ") {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.parse().unwrap_or(0);
                }
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");
        let _ = tx.send(CapturedRequest {
            method,
            path,
            headers,
            body: String::from_utf8_lossy(&body).to_string(),
        });

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response_body.len(),
            response_body
        );
        stream
            .write_all(response.as_bytes())
            .expect("write response");
    });

    (format!("http://{}", addr), rx)
}

#[test]
fn saves_post_an_urlencoded_form_and_ask_for_json_back() {
    let (base, requests) = spawn_server("200 OK", r#"{"success":true}"#);
    let transport = HttpTransport::new();

    let reply = transport
        .post_form(&format!("{base}/projects/17/name"), "value=Exome+batch+3")
        .expect("post form");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, r#"{"success":true}"#);

    let request = requests.recv().expect("captured request");
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/projects/17/name");
    assert_eq!(request.header("Accept"), Some("application/json"));
    assert_eq!(
        request.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(request.body, "value=Exome+batch+3");
}

#[test]
fn row_refreshes_issue_a_plain_get() {
    let fragment = "id: project-17\nfields: []\n";
    let (base, requests) = spawn_server("200 OK", fragment);
    let transport = HttpTransport::new();

    let reply = transport
        .get(&format!("{base}/projects/17/row"))
        .expect("get fragment");
    assert_eq!(reply.body, fragment);

    let request = requests.recv().expect("captured request");
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/projects/17/row");
    assert_eq!(request.header("Accept"), Some("application/json"));
    assert!(request.body.is_empty());
}

#[test]
fn error_statuses_surface_the_json_message() {
    let (base, requests) = spawn_server(
        "500 Internal Server Error",
        r#"{"message":"database unavailable"}"#,
    );
    let transport = HttpTransport::new();

    let err = transport
        .post_form(&format!("{base}/projects/17/name"), "value=x")
        .expect_err("status error");
    drop(requests);

    match err {
        TransportError::Status {
            status, message, ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("database unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn bare_error_bodies_leave_only_the_status_line() {
    let (base, requests) = spawn_server("404 Not Found", "no such project");
    let transport = HttpTransport::new();

    let err = transport
        .post_form(&format!("{base}/projects/99/name"), "value=x")
        .expect_err("status error");
    drop(requests);

    match &err {
        TransportError::Status {
            status,
            status_text,
            message,
        } => {
            assert_eq!(*status, 404);
            assert_eq!(status_text, "Not Found");
            assert!(message.is_none());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "HTTP 404 Not Found");
}

#[test]
fn refused_connections_become_network_errors() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let transport = HttpTransport::new();
    let err = transport
        .post_form(&format!("http://{addr}/projects/17/name"), "value=x")
        .expect_err("refused connection");
    assert!(matches!(err, TransportError::Network { .. }));
}
