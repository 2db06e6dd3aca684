mod common;

use common::*;

use std::time::Duration;

use http::StatusCode;
use image_gateway::object_store::memory::InMemoryObjectStore;

// List tests

#[tokio::test]
async fn test_list_empty_bucket() {
    let setup = TestSetup::new();
    let cookie = setup.session_cookie();

    let response = setup.send_get_request("/api/images", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_returns_uploaded_images() {
    let setup = TestSetup::with_store(InMemoryObjectStore::new().with_page_size(1));
    let cookie = setup.session_cookie();

    let response = setup
        .send_upload_request(
            &[
                test_file("a.png", "image/png", b"aa"),
                test_file("b.jpg", "image/jpeg", b"bbb"),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = parse_response_body(response).await;

    let response = setup.send_get_request("/api/images", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let listed = parse_response_body(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);

    for uploaded in uploaded["files"].as_array().unwrap() {
        let key = uploaded["fileName"].as_str().unwrap();
        let record = listed
            .iter()
            .find(|record| record["fileName"] == key)
            .unwrap_or_else(|| panic!("{key} missing from listing"));

        assert_eq!(record["originalName"], key);
        assert_eq!(record["url"], uploaded["url"]);
        assert_eq!(record["size"], uploaded["size"]);
        assert_eq!(record["type"], uploaded["type"]);
        assert!(record["markdown"].is_string());
    }

    // One listing call per page
    assert_eq!(setup.store.list_calls(), 2);
}

#[tokio::test]
async fn test_list_without_session_is_rejected() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/api/images", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(setup.store.calls(), 0);
}

#[tokio::test]
async fn test_list_backend_failure() {
    let setup = TestSetup::new();
    setup.store.insert("1-a.png", b"a".to_vec());
    setup.store.set_list_failure(true);
    let cookie = setup.session_cookie();

    let response = setup.send_get_request("/api/images", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_response_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "catalog_unavailable");
}

#[tokio::test]
async fn test_list_past_request_timeout() {
    let setup = TestSetup::with_request_timeout(
        InMemoryObjectStore::new().with_list_delay(Duration::from_millis(500)),
        Duration::from_millis(50),
    );
    let cookie = setup.session_cookie();

    let response = setup.send_get_request("/api/images", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    let body = parse_response_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "request_timeout");
    assert_eq!(body["allowRetry"], true);
    assert!(body["message"].is_string());
}

// Delete tests

#[tokio::test]
async fn test_delete_image_twice() {
    let setup = TestSetup::new();
    setup.store.insert("1700000000000-abc123.png", b"a".to_vec());
    let cookie = setup.session_cookie();

    for _ in 0..2 {
        let response = setup
            .send_delete_request("/api/images/1700000000000-abc123.png", Some(&cookie))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response).await;
        assert_eq!(body, serde_json::json!({ "success": true }));
    }

    assert!(setup.store.keys().is_empty());
    assert_eq!(setup.store.delete_calls(), 2);
}

#[tokio::test]
async fn test_delete_percent_encoded_key() {
    let setup = TestSetup::new();
    setup.store.insert("folder/cat.png", b"a".to_vec());
    let cookie = setup.session_cookie();

    let response = setup
        .send_delete_request("/api/images/folder%2Fcat.png", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(setup.store.keys().is_empty());
}

#[tokio::test]
async fn test_delete_without_session_is_rejected() {
    let setup = TestSetup::new();
    setup.store.insert("1-a.png", b"a".to_vec());

    let response = setup.send_delete_request("/api/images/1-a.png", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(setup.store.keys(), ["1-a.png"]);
    assert_eq!(setup.store.calls(), 0);
}

#[tokio::test]
async fn test_delete_invalid_key() {
    let setup = TestSetup::new();
    let cookie = setup.session_cookie();

    let response = setup
        .send_delete_request("/api/images/bad%0Akey", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["code"], "invalid_file_name");
    assert_eq!(setup.store.calls(), 0);
}

#[tokio::test]
async fn test_delete_backend_failure() {
    let setup = TestSetup::new();
    setup.store.set_delete_failure(true);
    let cookie = setup.session_cookie();

    let response = setup
        .send_delete_request("/api/images/1-a.png", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_response_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "deletion_failed");
}
