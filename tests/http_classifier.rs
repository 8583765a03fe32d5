//! HttpClassifier against a throwaway local HTTP server

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use doodlai::classifier::{ApiReadiness, Classifier, HttpClassifier, Prediction};
use doodlai::error::ClassifyError;
use doodlai::game::{AnalyzeOutcome, GameController, GameState};

/// A request as seen by the server
struct Captured {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

/// Serve the canned `(status, body)` responses to consecutive connections
fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut headers = Vec::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                headers.push(line);
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            captured.push(Captured {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(request_body).unwrap(),
            });
        }
        captured
    });
    (format!("http://{addr}"), handle)
}

fn client(base: &str) -> HttpClassifier {
    HttpClassifier::new(base, Duration::from_secs(5))
}

#[test]
fn test_health_model_loaded() {
    let (base, server) = serve(vec![(200, r#"{"status": "healthy", "model_loaded": true}"#)]);
    assert_eq!(client(&base).check_health(), ApiReadiness::Ready);
    let captured = server.join().unwrap();
    assert_eq!(captured[0].request_line, "GET /health HTTP/1.1");
}

#[test]
fn test_health_model_missing() {
    let (base, server) = serve(vec![(200, r#"{"status": "healthy", "model_loaded": false}"#)]);
    assert_eq!(client(&base).check_health(), ApiReadiness::ModelUnavailable);
    server.join().unwrap();
}

#[test]
fn test_health_malformed_is_error() {
    let (base, server) = serve(vec![(200, r#"{"status": "healthy"}"#)]);
    assert_eq!(client(&base).check_health(), ApiReadiness::Error);
    server.join().unwrap();
}

#[test]
fn test_health_server_error_is_error() {
    let (base, server) = serve(vec![(500, "{}")]);
    assert!(matches!(client(&base).probe(), Err(ClassifyError::Status(500))));
    server.join().unwrap();
}

#[test]
fn test_classify_sends_image_and_parses_ranking() {
    let (base, server) = serve(vec![(
        200,
        r#"{"predictions": [{"category": "clock", "probability": 0.75}, {"category": "apple", "probability": 0.2}],
            "top_prediction": {"category": "clock", "probability": 0.75}}"#,
    )]);
    let predictions = client(&base).classify("data:image/png;base64,AAAA").unwrap();
    assert_eq!(
        predictions,
        vec![Prediction::new("clock", 0.75), Prediction::new("apple", 0.2)]
    );

    let captured = server.join().unwrap();
    assert_eq!(captured[0].request_line, "POST /predict HTTP/1.1");
    assert!(captured[0]
        .headers
        .iter()
        .any(|h| h.to_ascii_lowercase().starts_with("content-type: application/json")));
    let body: serde_json::Value = serde_json::from_str(&captured[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"image": "data:image/png;base64,AAAA"}));
}

#[test]
fn test_classify_empty_ranking() {
    let (base, server) = serve(vec![(200, r#"{"predictions": []}"#)]);
    assert_eq!(client(&base).classify("AAAA").unwrap(), Vec::new());
    server.join().unwrap();
}

#[test]
fn test_classify_failure_status() {
    let (base, server) = serve(vec![(503, r#"{"detail": "Model not loaded"}"#)]);
    assert_eq!(client(&base).classify("AAAA"), Err(ClassifyError::Status(503)));
    server.join().unwrap();
}

#[test]
fn test_classify_malformed_body() {
    let (base, server) = serve(vec![(200, "not json")]);
    assert!(matches!(client(&base).classify("AAAA"), Err(ClassifyError::Protocol(_))));
    server.join().unwrap();
}

#[test]
fn test_game_round_over_http() {
    let (base, server) = serve(vec![
        (200, r#"{"model_loaded": true}"#),
        (200, r#"{"predictions": [{"category": "dog", "probability": 0.01}]}"#),
    ]);
    let classifier = client(&base);
    let mut controller = GameController::new(5, 60, 3);
    assert_eq!(controller.refresh_readiness(&classifier), ApiReadiness::Ready);
    controller.start_game(Instant::now()).unwrap();

    let target = controller.session().target.unwrap();
    let outcome = controller.analyze_with(&classifier).unwrap();
    if target.as_str() == "dog" {
        assert_eq!(outcome, AnalyzeOutcome::Scored { points: 1 });
        assert_eq!(controller.state(), GameState::RoundComplete);
    } else {
        assert_eq!(outcome, AnalyzeOutcome::Displayed);
        assert_eq!(controller.state(), GameState::Playing);
    }

    let captured = server.join().unwrap();
    assert_eq!(captured.len(), 2);
    let body: serde_json::Value = serde_json::from_str(&captured[1].body).unwrap();
    assert!(body["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
}
