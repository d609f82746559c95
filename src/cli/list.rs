use schemata::error::Result;
use schemata::registry::SchemaRegistry;

/// Run the list command: print every schema in the upload directory
pub async fn run(config_path: String) -> Result<()> {
    let config = schemata::config::load_config(&config_path)?;
    let registry = SchemaRegistry::new(&config.registry.upload_dir, &config.registry.extension);

    let identifiers = registry.discover()?;
    if identifiers.is_empty() {
        tracing::info!("No schemas registered in {}", config.registry.upload_dir);
    }
    for identifier in identifiers {
        println!("{}", identifier);
    }
    Ok(())
}
