/// Integration tests for the HTTP API
///
/// These tests drive the axum router directly (no socket) and verify
/// status codes and bodies for upload, listing and GraphQL execution.

mod http_tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use schemata::registry::SchemaRegistry;
    use schemata::server::router;
    use schemata::service::SchemaService;
    use schemata::storage::SqliteAdapter;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const PETS: &str = r#"
        type Cat { id: ID! name: String }
        type Query { cats: [Cat!]! cat(id: ID!): Cat }
        type Mutation { addCat(id: ID!, name: String): Cat }
    "#;

    fn app(dir: &TempDir) -> Router {
        let registry = SchemaRegistry::new(dir.path(), "graphql");
        let adapter = Arc::new(SqliteAdapter::in_memory().expect("Failed to open SQLite"));
        router(Arc::new(SchemaService::new(registry, adapter)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.expect("Request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn upload(name: &str, sdl: &str) -> Request<Body> {
        Request::post(format!("/api/upload-graphql-spec/{}", name))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(sdl.to_string()))
            .unwrap()
    }

    fn graphql(name: &str, query: &str) -> Request<Body> {
        Request::post(format!("/graphql/{}", name))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "query": query }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_upload_list_and_fetch_source() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, upload("pets", PETS)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert!(body.contains("pets.graphql"));

        let (status, body) = send(
            &app,
            Request::get("/api/graphql-specs").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!(["pets"]));

        let (status, body) = send(
            &app,
            Request::get("/api/graphql-specs/pets").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, PETS);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_schema_text() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, _) = send(&app, upload("broken", "type Cat {")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!dir.path().join("broken.graphql").exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_identifier() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, _) = send(&app, upload("bad.name", PETS)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_spec_is_not_found() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, _) = send(
            &app,
            Request::get("/api/graphql-specs/nope").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, graphql("nope", "{ cats { id } }")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_graphql_round_trip() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        send(&app, upload("pets", PETS)).await;

        let (status, body) = send(
            &app,
            graphql("pets", r#"mutation { addCat(id: "1", name: "Tom") { id } }"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let (status, body) = send(&app, graphql("pets", "{ cats { id name } }")).await;
        assert_eq!(status, StatusCode::OK);
        let document: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(document["data"], json!({ "cats": [{ "id": "1", "name": "Tom" }] }));
    }

    #[tokio::test]
    async fn test_field_errors_stay_in_the_document() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        send(&app, upload("pets", PETS)).await;

        let add = r#"mutation { addCat(id: "1") { id } }"#;
        send(&app, graphql("pets", add)).await;
        let (status, body) = send(&app, graphql("pets", add)).await;

        assert_eq!(status, StatusCode::OK);
        let document: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(document["data"], json!({ "addCat": null }));
        assert_eq!(document["errors"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_schema_without_query_is_server_error() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        send(&app, upload("things", "type Thing { id: ID! }")).await;

        let (status, _) = send(&app, graphql("things", "{ __typename }")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_playground_page() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, body) = send(
            &app,
            Request::get("/graphql/pets").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/graphql/pets"));
    }

    fn multipart_upload(name: &str, part: &str, sdl: &str) -> Request<Body> {
        let boundary = "schemata-upload-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{part}\"; filename=\"{name}.graphql\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {sdl}\r\n\
             --{boundary}--\r\n"
        );
        Request::post(format!("/api/upload-graphql-spec/{}", name))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_multipart_upload_stores_file_part() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, multipart_upload("pets", "file", PETS)).await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let stored = tokio_test::assert_ok!(std::fs::read_to_string(dir.path().join("pets.graphql")));
        assert_eq!(stored, PETS);

        let (status, body) = send(&app, graphql("pets", "{ cats { id } }")).await;
        assert_eq!(status, StatusCode::OK);
        let document: Value = tokio_test::assert_ok!(serde_json::from_str(&body));
        assert_eq!(document["data"], json!({ "cats": [] }));
    }

    #[tokio::test]
    async fn test_multipart_upload_without_file_part() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, body) = send(&app, multipart_upload("pets", "schema", PETS)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("'file'"), "{}", body);
        tokio_test::assert_err!(std::fs::metadata(dir.path().join("pets.graphql")));
    }
}
