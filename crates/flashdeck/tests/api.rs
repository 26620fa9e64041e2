use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use flashdeck::server::{self, AppState};
use flashdeck::{Flashcard, FlashcardStore, NewFlashcard};

fn test_app() -> (Router, Arc<FlashcardStore>) {
    flashdeck::logging::init_test_logging();
    let store = Arc::new(FlashcardStore::open_in_memory().expect("in-memory store"));
    let app = server::router(AppState::new(Arc::clone(&store)));
    (app, store)
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn raw_request(method: Method, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn index_page_is_html() {
    let (app, _) = test_app();

    let response = app.oneshot(empty_request(Method::GET, "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("/static/script.js"));
}

#[tokio::test]
async fn script_is_served() {
    let (app, _) = test_app();

    let (status, body) = send(&app, empty_request(Method::GET, "/static/script.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("/api/flashcards"));
}

#[tokio::test]
async fn list_starts_empty() {
    let (app, _) = test_app();

    let (status, body) = send_json(&app, empty_request(Method::GET, "/api/flashcards")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn add_then_list() {
    let (app, _) = test_app();

    let payload = json!({
        "deckId": "1",
        "question": "What is the capital of France?",
        "answer": "Paris"
    });
    let (status, created) =
        send_json(&app, json_request(Method::POST, "/api/flashcards", &payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_i64().unwrap() > 0);

    let (status, body) = send_json(&app, empty_request(Method::GET, "/api/flashcards")).await;
    assert_eq!(status, StatusCode::OK);

    let cards: Vec<Flashcard> = serde_json::from_value(body).unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].deck_id, "1");
    assert_eq!(cards[0].question, "What is the capital of France?");
    assert_eq!(cards[0].answer, "Paris");
    assert_eq!(cards[0].id, created["id"].as_i64().unwrap());
}

#[tokio::test]
async fn add_rejects_malformed_body() {
    let (app, store) = test_app();

    let (status, body) = send_json(
        &app,
        raw_request(Method::POST, "/api/flashcards", "{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request payload");

    let (status, _) = send(
        &app,
        raw_request(Method::POST, "/api/flashcards", r#"{"deckId": "1"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn add_rejects_missing_content_type() {
    let (app, _) = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/flashcards")
        .body(Body::from(r#"{"deckId":"1","question":"q","answer":"a"}"#))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_rejects_empty_field() {
    let (app, store) = test_app();

    let payload = json!({"deckId": "1", "question": "", "answer": "Paris"});
    let (status, body) =
        send_json(&app, json_request(Method::POST, "/api/flashcards", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("question"));
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn get_by_id() {
    let (app, store) = test_app();
    let card = store.add(&NewFlashcard::new("d", "q", "a")).unwrap();

    let (status, body) = send_json(
        &app,
        empty_request(Method::GET, &format!("/api/flashcards/{}", card.id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<Flashcard>(body).unwrap(), card);
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let (app, _) = test_app();

    let (status, body) = send_json(&app, empty_request(Method::GET, "/api/flashcards/12345")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Flashcard not found");
}

#[tokio::test]
async fn update_keeps_deck_even_when_body_names_another() {
    let (app, store) = test_app();
    let card = store
        .add(&NewFlashcard::new("1", "What is the capital of France?", "Paris"))
        .unwrap();

    let payload = json!({"deckId": "2", "question": "Capital of Spain?", "answer": "Madrid"});
    let (status, body) = send_json(
        &app,
        json_request(Method::PUT, &format!("/api/flashcards/{}", card.id), &payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deckId"], "1");

    let stored = store.get(card.id).unwrap();
    assert_eq!(stored.id, card.id);
    assert_eq!(stored.deck_id, "1");
    assert_eq!(stored.question, "Capital of Spain?");
    assert_eq!(stored.answer, "Madrid");
}

#[tokio::test]
async fn update_missing_is_not_found() {
    let (app, store) = test_app();

    let payload = json!({"question": "q", "answer": "a"});
    let (status, _) = send(
        &app,
        json_request(Method::PUT, "/api/flashcards/777", &payload),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn update_rejects_bad_id_and_bad_body() {
    let (app, store) = test_app();
    let card = store.add(&NewFlashcard::new("d", "q", "a")).unwrap();

    let payload = json!({"question": "q", "answer": "a"});
    let (status, body) = send_json(
        &app,
        json_request(Method::PUT, "/api/flashcards/abc", &payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid flashcard ID");

    let (status, _) = send(
        &app,
        raw_request(
            Method::PUT,
            &format!("/api/flashcards/{}", card.id),
            "[1, 2, 3]",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.get(card.id).unwrap(), card);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let (app, store) = test_app();
    let card = store.add(&NewFlashcard::new("d", "q", "a")).unwrap();
    let uri = format!("/api/flashcards/{}", card.id);

    let (status, _) = send(&app, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, empty_request(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting again is still fine
    let (status, _) = send(&app, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_rejects_bad_id() {
    let (app, _) = test_app();

    let (status, _) = send(&app, empty_request(Method::DELETE, "/api/flashcards/1.5")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn two_cards_in_one_deck_get_distinct_ids() {
    let (app, _) = test_app();

    for question in ["q1", "q2"] {
        let payload = json!({"deckId": "same", "question": question, "answer": "a"});
        let (status, _) =
            send(&app, json_request(Method::POST, "/api/flashcards", &payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send_json(&app, empty_request(Method::GET, "/api/flashcards")).await;
    let cards: Vec<Flashcard> = serde_json::from_value(body).unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.deck_id == "same"));
    assert_ne!(cards[0].id, cards[1].id);
}

#[tokio::test]
async fn concurrent_posts_all_land() {
    let (app, store) = test_app();

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let payload = json!({"deckId": "bulk", "question": format!("q{i}"), "answer": "a"});
                app.oneshot(json_request(Method::POST, "/api/flashcards", &payload))
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::CREATED);
    }
    assert_eq!(store.count().unwrap(), 20);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = test_app();

    let (status, _) = send(&app, empty_request(Method::GET, "/api/decks")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_is_not_exposed_over_http() {
    let (app, store) = test_app();
    store.add(&NewFlashcard::new("d", "q", "a")).unwrap();

    let (status, _) = send(&app, empty_request(Method::DELETE, "/api/flashcards")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn serve_on_stops_on_shutdown_signal() {
    let store = Arc::new(FlashcardStore::open_in_memory().unwrap());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let app = server::app(AppState::new(store), Duration::from_secs(5));

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server::serve_on(listener, app, async {
        let _ = rx.await;
    }));

    tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn app_serves_the_same_routes_as_router() {
    let store = Arc::new(FlashcardStore::open_in_memory().unwrap());
    let app = server::app(AppState::new(Arc::clone(&store)), Duration::from_secs(5));

    let (status, body) = send_json(&app, empty_request(Method::GET, "/api/flashcards")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let payload = json!({"deckId": "1", "question": "q", "answer": "a"});
    let (status, _) = send(&app, json_request(Method::POST, "/api/flashcards", &payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.count().unwrap(), 1);

    let (status, _) = send(&app, empty_request(Method::GET, "/api/flashcards/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request(Method::GET, "/api/flashcards/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn slow_request_times_out() {
    let slow = Router::new().route(
        "/slow",
        axum::routing::get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "done"
        }),
    );
    let app = server::with_middleware(slow, Duration::from_millis(50));

    let response = tokio::time::timeout(
        Duration::from_secs(2),
        app.oneshot(empty_request(Method::GET, "/slow")),
    )
    .await
    .expect("timeout layer did not fire")
    .unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn fast_request_is_not_cut_off() {
    let fast = Router::new().route("/fast", axum::routing::get(|| async { "done" }));
    let app = server::with_middleware(fast, Duration::from_secs(5));

    let (status, body) = send(&app, empty_request(Method::GET, "/fast")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"done");
}
