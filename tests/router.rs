use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use std::{collections::HashSet, sync::Arc};

use notes_app::{
    backend::Backend,
    build_router,
    controller::{ControllerSettings, NotesController},
    models::User,
};

const BOUNDARY: &str = "----notes-test-boundary";

fn app() -> Router {
    let backend = Backend::in_memory(User {
        username: "ann".into(),
        login_id: Some("ann@example.com".into()),
    });
    build_router(Arc::new(NotesController::new(
        backend,
        ControllerSettings::default(),
    )))
}

fn create_form(name: &str, description: &str, file: Option<(&str, &[u8])>) -> Body {
    let mut body = Vec::new();
    for (field, value) in [("name", name), ("description", description)] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn multipart(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn index_renders_signed_in_page() {
    let app = app();

    let response = send(&app, empty(Method::GET, "/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Signed in as <strong>ann@example.com</strong>"));
    assert!(html.contains(r#"action="/ui/create""#));
}

#[tokio::test]
async fn create_through_api_returns_new_state() {
    let app = app();

    let response = send(
        &app,
        multipart(
            "/api/notes",
            create_form("Cat", "Tabby", Some(("cat.png", b"\x89PNG".as_slice()))),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["outcome"], "applied");
    let note = &body["state"]["notes"][0];
    assert_eq!(note["name"], "Cat");
    assert_eq!(note["description"], "Tabby");
    let image = note["image"].as_str().unwrap();
    assert!(image.starts_with("public/") && image.ends_with("-cat.png"));
    assert!(note["image_url"].as_str().unwrap().starts_with("/blobs/public/"));
    assert_eq!(body["state"]["draft"]["name"], "");
}

#[tokio::test]
async fn blank_name_is_skipped() {
    let app = app();

    let response = send(&app, multipart("/api/notes", create_form("  ", "", None))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["outcome"], "skipped");
    assert_eq!(body["state"]["notes"], json!([]));
}

#[tokio::test]
async fn edit_flow_updates_the_listed_note() {
    let app = app();
    send(
        &app,
        multipart("/api/notes", create_form("Groceries", "Milk, eggs", None)),
    )
    .await;

    let state = body_json(send(&app, empty(Method::GET, "/api/state")).await).await;
    let note = &state["notes"][0];
    let id = note["id"].as_str().unwrap().to_string();
    assert!(note.get("image").is_none());
    assert!(note.get("image_url").is_none());

    let response = send(&app, empty(Method::POST, &format!("/api/notes/{id}/edit"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let state = body_json(response).await;
    assert_eq!(
        state["editing"],
        json!({ "id": id, "name": "Groceries", "description": "Milk, eggs" })
    );

    let response = send(
        &app,
        json_request(
            Method::PUT,
            "/api/edit",
            &json!({ "name": "Groceries v2", "description": "Milk, eggs" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(send(&app, empty(Method::POST, "/api/edit/save")).await).await;
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["state"]["editing"], Value::Null);
    assert_eq!(body["state"]["notes"][0]["name"], "Groceries v2");

    let response = send(&app, empty(Method::DELETE, &format!("/api/notes/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["notes"], json!([]));
}

#[tokio::test]
async fn editing_without_open_form_conflicts() {
    let app = app();

    let response = send(
        &app,
        json_request(Method::PUT, "/api/edit", &json!({ "name": "x" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "NOT_EDITING");

    let body = body_json(send(&app, empty(Method::POST, "/api/edit/save")).await).await;
    assert_eq!(body["outcome"], "skipped");
}

#[tokio::test]
async fn unknown_note_is_not_found() {
    let app = app();

    for request in [
        empty(Method::DELETE, "/api/notes/missing"),
        empty(Method::POST, "/api/notes/missing/edit"),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn sign_out_ends_the_session() {
    let app = app();
    send(&app, multipart("/api/notes", create_form("Groceries", "", None))).await;

    let me = body_json(send(&app, empty(Method::GET, "/api/me")).await).await;
    assert_eq!(me["display_name"], "ann@example.com");

    let response = send(&app, empty(Method::POST, "/api/sign-out")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let state = body_json(send(&app, empty(Method::GET, "/api/state")).await).await;
    assert_eq!(state["notes"], json!([]));

    let response = send(&app, empty(Method::GET, "/api/me")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let html = body_text(send(&app, empty(Method::GET, "/")).await).await;
    assert!(html.contains("Signed out"));
}

#[tokio::test]
async fn form_posts_redirect_back_to_the_page() {
    let app = app();

    let response = send(
        &app,
        multipart("/ui/create", create_form("From <form>", "", None)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let html = body_text(send(&app, empty(Method::GET, "/")).await).await;
    assert!(html.contains("From &lt;form&gt;"));
}

#[tokio::test]
async fn failed_form_post_renders_the_error() {
    let app = app();

    let response = send(&app, empty(Method::POST, "/ui/notes/missing/delete")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = body_text(response).await;
    assert!(html.contains(r#"<p class="error">"#));
    assert!(html.contains("missing"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();

    let response = send(&app, empty(Method::GET, "/api-doc/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/notes"]["post"].is_object());
    assert!(doc["paths"]["/api/state"]["get"].is_object());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_keep_their_own_fields() {
    let app = app();

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let form = create_form(&format!("note-{i}"), &format!("body-{i}"), None);
                let response = send(&app, multipart("/api/notes", form)).await;
                assert_eq!(response.status(), StatusCode::OK);
                body_json(response).await["outcome"].clone()
            })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap(), "applied");
    }

    let state = body_json(send(&app, empty(Method::POST, "/api/refresh")).await).await;
    let notes = state["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 64);

    let names: HashSet<&str> = notes
        .iter()
        .map(|note| note["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 64);
    for note in notes {
        let name = note["name"].as_str().unwrap();
        let description = note["description"].as_str().unwrap();
        assert_eq!(name.trim_start_matches("note-"), description.trim_start_matches("body-"));
    }
}

#[tokio::test]
async fn uploaded_image_is_served_from_its_link() {
    let app = app();
    send(
        &app,
        multipart(
            "/ui/create",
            create_form("Cat", "", Some(("my cat.png", b"\x89PNG".as_slice()))),
        ),
    )
    .await;

    let html = body_text(send(&app, empty(Method::GET, "/")).await).await;
    let src = html
        .split(r#"<img src=""#)
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap()
        .to_string();
    assert!(src.starts_with("/blobs/public/"));
    assert!(src.contains("-my%20cat.png?expires="));

    let response = send(&app, empty(Method::GET, &src)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"\x89PNG");

    let (path, _) = src.split_once('?').unwrap();
    for expires in ["1", "99999999999"] {
        let uri = format!("{path}?expires={expires}");
        let response = send(&app, empty(Method::GET, &uri)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response = send(&app, empty(Method::GET, "/blobs/public/unknown.png?expires=1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn picked_empty_file_is_still_attached() {
    let app = app();

    let response = send(
        &app,
        multipart(
            "/api/notes",
            create_form("Empty", "", Some(("empty.png", b"".as_slice()))),
        ),
    )
    .await;
    let body = body_json(response).await;

    let image = body["state"]["notes"][0]["image"].as_str().unwrap();
    assert!(image.ends_with("-empty.png"));
}

#[tokio::test]
async fn file_input_left_empty_attaches_nothing() {
    let app = app();

    let response = send(
        &app,
        multipart("/api/notes", create_form("Plain", "", Some(("", b"".as_slice())))),
    )
    .await;
    let body = body_json(response).await;

    assert_eq!(body["outcome"], "applied");
    assert!(body["state"]["notes"][0].get("image").is_none());
}
