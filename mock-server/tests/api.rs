use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_token};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- create ---

#[tokio::test]
async fn create_returns_201_envelope() {
    let resp = app()
        .oneshot(json_request("POST", "/api/client/create", r#"{"name":"Acme"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["name"], "Acme");
    assert_eq!(body["result"]["removed"], false);
    assert_eq!(body["message"], "client created successfully");
}

#[tokio::test]
async fn create_rejects_non_object_with_envelope() {
    let resp = app()
        .oneshot(json_request("POST", "/api/client/create", "[1,2]"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn create_accepts_multipart() {
    let body = "--B\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nAcme\r\n\
                --B\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"logo.png\"\r\nContent-Type: image/png\r\n\r\nPNG\r\n\
                --B--\r\n";
    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/create")
        .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=B")
        .body(body.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["result"]["name"], "Acme");
    assert_eq!(body["result"]["files"][0]["filename"], "logo.png");
    assert_eq!(body["result"]["files"][0]["size"], 3);
}

// --- read ---

#[tokio::test]
async fn read_missing_is_404_envelope() {
    let resp = app()
        .oneshot(get("/api/client/read/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No document found");
}

#[tokio::test]
async fn read_bad_id_is_400_envelope() {
    let resp = app().oneshot(get("/api/client/read/not-a-uuid")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
}

// --- collections ---

#[tokio::test]
async fn list_of_unknown_entity_is_empty_page() {
    let resp = app().oneshot(get("/api/payment/list?page=1&items=5")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["result"], Value::Array(Vec::new()));
    assert_eq!(body["pagination"]["limit"], 5);
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn list_rejects_bad_page() {
    let resp = app().oneshot(get("/api/payment/list?page=zero")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_rejects_page_past_the_offset_range() {
    let resp = app()
        .oneshot(get("/api/payment/list?page=18446744073709551615&items=10"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid page: 18446744073709551615");
}

#[tokio::test]
async fn convert_only_applies_to_quotes() {
    let resp = app()
        .oneshot(get("/api/invoice/convert/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "invoice cannot be converted");
}

#[tokio::test]
async fn mail_requires_id() {
    let resp = app()
        .oneshot(json_request("POST", "/api/invoice/mail/", r#"{}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mail_answers_malformed_json_with_envelope() {
    let resp = app()
        .oneshot(json_request("POST", "/api/invoice/mail/", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["result"].is_null());
    assert!(!body["message"].as_str().unwrap().is_empty());
}

// --- auth ---

#[tokio::test]
async fn token_protected_routes_reject_anonymous_requests() {
    let resp = app_with_token("secret")
        .oneshot(get("/api/client/listAll"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn token_protected_routes_accept_bearer() {
    let req = Request::builder()
        .uri("/api/client/listAll")
        .header(http::header::AUTHORIZATION, "Bearer secret")
        .body(String::new())
        .unwrap();
    let resp = app_with_token("secret").oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_is_open_and_returns_configured_token() {
    let resp = app_with_token("secret")
        .oneshot(json_request(
            "POST",
            "/api/login",
            r#"{"email":"admin@demo.com","password":"admin123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"]["token"], "secret");
}

#[tokio::test]
async fn login_answers_malformed_json_with_envelope() {
    let resp = app_with_token("secret")
        .oneshot(json_request("POST", "/api/login", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn public_images() {
    let resp = app().oneshot(get("/public/logo.png")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app().oneshot(get("/public/missing.png")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn entity_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create two quotes
    let mut ids = Vec::new();
    for (number, status) in [("Q-1", "draft"), ("Q-2", "sent")] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request(
                "POST",
                "/api/quote/create",
                &format!(r#"{{"number":"{number}","status":"{status}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        ids.push(body["result"]["id"].as_str().unwrap().to_string());
    }

    // list: newest first
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/quote/list"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"][0]["number"], "Q-2");
    assert_eq!(body["pagination"]["total"], 2);

    // filter
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/quote/filter?filter=status&equal=draft"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
    assert_eq!(body["result"][0]["number"], "Q-1");

    // search
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/quote/search?q=q-2&fields=number"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"].as_array().unwrap().len(), 1);

    // summary
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/quote/summary"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"]["total"], 2);
    assert_eq!(body["result"]["status"]["draft"], 1);

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/api/quote/update/{}", ids[0]),
            r#"{"status":"accepted"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"]["status"], "accepted");
    assert_eq!(body["result"]["number"], "Q-1"); // unchanged

    // convert
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/quote/convert/{}", ids[0])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["result"]["converted_from"], ids[0].as_str());

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/quote/delete/{}", ids[1]))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // read after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/quote/read/{}", ids[1])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // listAll after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/quote/listAll"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
}
