use schemata::error::Result;
use schemata::service::SchemaService;
use std::sync::Arc;

/// Run the serve command to start the GraphQL server
pub async fn run(config_path: String, port: Option<u16>) -> Result<()> {
    tracing::info!("📖 Loading configuration from {}", config_path);

    let config = schemata::config::load_config(&config_path)?;

    // Use provided port or default from config
    let server_port = port.unwrap_or(config.server.port);

    tracing::info!("🔧 Opening storage and schema registry...");
    let service = SchemaService::from_config(&config).await?;

    let schemas = service.bootstrap().await?;
    tracing::info!("✅ {} schema(s) ready", schemas.len());
    for identifier in &schemas {
        tracing::info!("   • /graphql/{}", identifier);
    }

    tracing::info!("🚀 GraphQL server running on http://localhost:{}", server_port);
    tracing::info!("📤 Upload schemas: POST http://localhost:{}/api/upload-graphql-spec/<name>", server_port);
    tracing::info!("📊 Playground: http://localhost:{}/graphql/<name>", server_port);
    tracing::info!("💡 Press Ctrl+C to stop the server");

    schemata::server::serve(Arc::new(service), &config.server.bind, server_port).await
}
