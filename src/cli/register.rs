use schemata::error::Result;
use schemata::service::SchemaService;
use std::fs;

/// Run the register command: upload a schema file without a running server
pub async fn run(config_path: String, name: String, file: String) -> Result<()> {
    let config = schemata::config::load_config(&config_path)?;
    let schema_text = fs::read_to_string(&file)?;

    let service = SchemaService::from_config(&config).await?;
    let spec = service.upload(&name, &schema_text).await?;

    tracing::info!("✅ Registered '{}' from {}", name, file);
    tracing::info!("   Stored at {}", spec.source.display());
    Ok(())
}
