use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use unicorn_core::source::remote::{RemoteRequest, RemoteSource};
use unicorn_core::{DataSource, Provenance, SourceError};

const RECORDS_BODY: &str = r#"[
    {"id": "a", "name": "Alpha", "valuation": 12.5, "foundingYear": 2014},
    {"id": "b", "name": "Beta", "valuation": "$2.5B", "foundingYear": 2019}
]"#;

/// Serves one scripted response per connection, then stops listening.
struct StubServer {
    url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

fn serve(responses: Vec<(u16, &'static str)>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/unicorns", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let thread_hits = Arc::clone(&hits);
    let thread_requests = Arc::clone(&requests);
    thread::spawn(move || {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let request = read_request(&mut stream);
            thread_hits.fetch_add(1, Ordering::SeqCst);
            thread_requests.lock().unwrap().push(request);
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    StubServer {
        url,
        hits,
        requests,
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !buffer.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn request(url: &str, retries: u32) -> RemoteRequest {
    let mut request = RemoteRequest::get(url);
    request.retries = retries;
    request.retry_backoff = Duration::from_millis(10);
    request.timeout = Duration::from_secs(5);
    request
}

#[test]
fn successful_response_becomes_remote_dataset() {
    let server = serve(vec![(200, RECORDS_BODY)]);
    let dataset = RemoteSource::new(request(&server.url, 0)).load(100).unwrap();

    assert_eq!(dataset.provenance(), Provenance::RemoteApi);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[1].valuation, 2.5);
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[test]
fn method_and_headers_are_sent() {
    let body = r#"{"data": [{"id": "a", "name": "A", "valuation": 1, "foundingYear": 2020}]}"#;
    let server = serve(vec![(200, body)]);
    let mut req = request(&server.url, 0);
    req.method = "post".to_string();
    req.headers
        .insert("X-Api-Key".to_string(), "secret-token".to_string());

    let dataset = RemoteSource::new(req).load(100).unwrap();
    assert_eq!(dataset.len(), 1);

    let requests = server.requests.lock().unwrap();
    let sent = requests[0].to_ascii_lowercase();
    assert!(sent.starts_with("post /unicorns"));
    assert!(sent.contains("x-api-key: secret-token"));
}

#[test]
fn server_errors_are_retried_until_success() {
    let server = serve(vec![(500, "oops"), (503, "busy"), (200, RECORDS_BODY)]);
    let dataset = RemoteSource::new(request(&server.url, 2)).load(100).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(server.hits.load(Ordering::SeqCst), 3);
}

#[test]
fn retries_stop_at_configured_count() {
    let server = serve(vec![(503, "busy"), (503, "busy"), (503, "busy")]);
    let err = RemoteSource::new(request(&server.url, 1)).load(100).unwrap_err();

    assert!(matches!(err, SourceError::HttpStatus { status: 503, .. }));
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);
}

#[test]
fn client_errors_are_not_retried() {
    let server = serve(vec![(404, "missing"), (200, RECORDS_BODY)]);
    let err = RemoteSource::new(request(&server.url, 3)).load(100).unwrap_err();

    assert!(matches!(err, SourceError::HttpStatus { status: 404, .. }));
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[test]
fn malformed_body_is_not_retried() {
    let server = serve(vec![(200, "<html>not json</html>"), (200, RECORDS_BODY)]);
    let err = RemoteSource::new(request(&server.url, 3)).load(100).unwrap_err();

    assert!(matches!(err, SourceError::Parse(_)));
    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}

#[test]
fn silent_server_times_out_after_every_attempt() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    thread::spawn(move || {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept() {
            held.push(stream);
            if held.len() == 2 {
                thread::sleep(Duration::from_secs(3));
                return;
            }
        }
    });

    let mut req = request(&url, 1);
    req.timeout = Duration::from_millis(200);
    let err = RemoteSource::new(req).load(100).unwrap_err();

    assert!(matches!(err, SourceError::Timeout { attempts: 2, .. }));
    assert!(err.is_transient());
}
