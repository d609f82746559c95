/// HTTP surface
///
/// Schema upload and listing under `/api`, per-schema GraphQL execution and
/// playground under `/graphql/:spec_name`, and a health check.

use crate::error::SchemataError;
use crate::service::SchemaService;

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Error returned by a handler, rendered as a plain-text body
pub struct ApiError(SchemataError);

impl From<SchemataError> for ApiError {
    fn from(e: SchemataError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            SchemataError::Parse(_)
            | SchemataError::InvalidIdentifier(_)
            | SchemataError::Upload(_) => StatusCode::BAD_REQUEST,
            SchemataError::SchemaNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::debug!("{}", self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

/// Build the application router
pub fn router(service: Arc<SchemaService>) -> Router {
    Router::new()
        .route("/api/upload-graphql-spec/:spec_name", post(upload_spec))
        .route("/api/graphql-specs", get(list_specs))
        .route("/api/graphql-specs/:spec_name", get(get_spec))
        .route("/graphql/:spec_name", post(graphql_handler).get(graphql_playground))
        .route("/health", get(health_check))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the router until the process is stopped
pub async fn serve(service: Arc<SchemaService>, bind: &str, port: u16) -> crate::error::Result<()> {
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| SchemataError::Config(format!("Invalid bind address '{}:{}': {}", bind, port, e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        SchemataError::Config(format!("Failed to bind to {}: {}. Port may be in use.", addr, e))
    })?;

    axum::serve(listener, router(service))
        .await
        .map_err(|e| SchemataError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn upload_spec(
    State(service): State<Arc<SchemaService>>,
    Path(spec_name): Path<String>,
    request: Request,
) -> Result<String, ApiError> {
    let schema_text = upload_text(request).await?;
    let spec = service.upload(&spec_name, &schema_text).await?;
    Ok(format!(
        "Schema uploaded and database generated successfully: {}",
        spec.source.display()
    ))
}

/// Schema text from the `file` part of a `multipart/form-data` upload, or
/// the raw body for any other content type.
async fn upload_text(request: Request) -> Result<String, SchemataError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if !is_multipart {
        return String::from_request(request, &())
            .await
            .map_err(|e| SchemataError::Upload(e.body_text()));
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| SchemataError::Upload(e.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SchemataError::Upload(e.body_text()))?
    {
        if field.name() == Some("file") {
            return field.text().await.map_err(|e| SchemataError::Upload(e.body_text()));
        }
    }

    Err(SchemataError::Upload("multipart body has no 'file' part".to_string()))
}

async fn list_specs(State(service): State<Arc<SchemaService>>) -> Json<BTreeSet<String>> {
    Json(service.list())
}

async fn get_spec(
    State(service): State<Arc<SchemaService>>,
    Path(spec_name): Path<String>,
) -> Result<Response, ApiError> {
    if !service.registry().contains(&spec_name) {
        return Err(SchemataError::SchemaNotFound(spec_name).into());
    }
    let source = service.source(&spec_name)?;
    Ok(([(header::CONTENT_TYPE, "text/plain")], source).into_response())
}

async fn graphql_handler(
    State(service): State<Arc<SchemaService>>,
    Path(spec_name): Path<String>,
    Json(request): Json<async_graphql::Request>,
) -> Result<Json<async_graphql::Response>, ApiError> {
    let response = service.execute_request(&spec_name, request).await?;
    Ok(Json(response))
}

async fn graphql_playground(Path(spec_name): Path<String>) -> Html<String> {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new(&format!("/graphql/{}", spec_name)),
    ))
}

async fn health_check() -> &'static str {
    "OK"
}
