use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, DEFAULT_FILE_SIZE, META_UPDATED};
use serde_json::{json, Value};
use tower::ServiceExt;

const AUTH: &str = "Basic am9lOnNlY3JldA==";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn upload(method: &str, uri: &str, slug: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, "video/mp4")
        .header("Slug", slug)
        .body(body.to_string())
        .unwrap()
}

fn content(name: &str) -> Value {
    json!({"entry": {"content": {
        "params": {"name": name, "tag": ["sport"]},
        "file": [{"path": "/videos/a.mp4", "container": "mp4"}],
        "file_params": {"thumb_used": "", "update_files": 0}
    }}})
}

// --- auth ---

#[tokio::test]
async fn missing_auth_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/content/joe/")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- content ---

#[tokio::test]
async fn content_list_empty() {
    let resp = app().oneshot(request("GET", "/content/joe/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let feed = body_json(resp).await;
    assert_eq!(feed, json!({"feed": {"entry": []}}));
}

#[tokio::test]
async fn create_content_enriches_entry() {
    let resp = app()
        .oneshot(json_request("POST", "/content/joe/", &content("a")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let entry = body_json(resp).await;
    assert_eq!(entry["entry"]["content"]["params"]["meta_updated"], META_UPDATED);
    assert_eq!(entry["entry"]["content"]["file"][0]["size"], DEFAULT_FILE_SIZE);
}

#[tokio::test]
async fn create_content_without_file_is_400() {
    let body = json!({"entry": {"content": {"params": {"name": "a"}, "file": []}}});
    let resp = app()
        .oneshot(json_request("POST", "/content/joe/", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_content_not_found_has_error_body() {
    let resp = app().oneshot(request("GET", "/content/joe/nope/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "content does not exist");
}

// --- vocab ---

#[tokio::test]
async fn vocab_requires_namespace() {
    let body = json!({"entry": {"content": {"params": {"name": "dc", "description": "", "xml_namespace": ""}}}});
    let resp = app()
        .oneshot(json_request("POST", "/vocab/joe/", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- items and dirs ---

#[tokio::test]
async fn head_missing_item_is_404() {
    let resp = app().oneshot(request("HEAD", "/item/videos/a.mp4")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_without_slug_is_400() {
    let resp = app()
        .oneshot(request("POST", "/item/videos/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_dir_is_404() {
    let resp = app().oneshot(request("GET", "/dir/foo/bar")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- jobs ---

#[tokio::test]
async fn job_without_format_is_400() {
    let body = json!({"entry": {"content": {"params": {"import_location": "http://x/a.mov"}}}});
    let resp = app()
        .oneshot(json_request("POST", "/job/", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- lifecycles ---

#[tokio::test]
async fn content_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/content/joe/", &content("a")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // duplicate create conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/content/joe/", &content("a")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/content/joe/"))
        .await
        .unwrap();
    let feed = body_json(resp).await;
    assert_eq!(feed["feed"]["entry"].as_array().unwrap().len(), 1);
    assert_eq!(feed["feed"]["entry"][0]["content"]["params"]["name"], "a");

    // other users see nothing
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/content/ann/"))
        .await
        .unwrap();
    let feed = body_json(resp).await;
    assert!(feed["feed"]["entry"].as_array().unwrap().is_empty());

    // rename through update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/content/joe/a/", &content("b")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/content/joe/a/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/content/joe/b/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn item_and_dir_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create dir, then again without force conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("PUT", "/dir/videos/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("PUT", "/dir/videos/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // forced upload twice gets a suffixed name
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(upload("POST", "/item/videos/", "a.mp4", "1234"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item = body_json(resp).await;
    assert_eq!(item["entry"]["content"]["params"]["path"], "/videos/a.mp4");
    assert_eq!(item["entry"]["content"]["params"]["size"], 4);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(upload("POST", "/item/videos/", "a.mp4", "56"))
        .await
        .unwrap();
    let item = body_json(resp).await;
    assert_eq!(item["entry"]["content"]["params"]["path"], "/videos/a_1.mp4");

    // exact upload onto an existing path conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(upload("PUT", "/item/videos/a.mp4", "a.mp4", "x"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // HEAD reports the item
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("HEAD", "/item/videos/a.mp4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // non-recursive delete of a full dir conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/dir/videos/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", "/dir/videos/?recursive=1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("HEAD", "/item/videos/a.mp4"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
