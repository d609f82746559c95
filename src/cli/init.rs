use crate::cli::example;
use schemata::config::Config;
use schemata::error::Result;
use std::path::Path;

/// Run the init command to generate a default configuration
pub async fn run(output: Option<String>, with_example: bool) -> Result<()> {
    tracing::info!("📝 Generating configuration...");
    let config = Config::default();

    let wrote_to_file = if let Some(output_path) = &output {
        schemata::config::save_config(&config, output_path)?;
        tracing::info!("📝 Generated configuration: {}", output_path);
        true
    } else {
        let toml_string = toml::to_string_pretty(&config)?;
        println!("{}", toml_string);
        false
    };

    if with_example {
        let path = example::write_example_schema(
            Path::new(&config.registry.upload_dir),
            &config.registry.extension,
        )?;
        tracing::info!("🐱 Example schema '{}' written to {}", example::EXAMPLE_NAME, path.display());
    }

    tracing::info!("");
    tracing::info!("💡 Next steps:");
    if wrote_to_file {
        tracing::info!("   1. Review the generated configuration file");
        tracing::info!("   2. Start server with 'schemata serve --config <file>'");
    } else {
        tracing::info!("   1. Save the configuration to a file: schemata init --output schemata.toml");
        tracing::info!("   2. Start server with 'schemata serve'");
    }
    if with_example {
        tracing::info!(
            "   3. Query it: POST {{\"query\": \"{{ cats {{ id name }} }}\"}} to /graphql/{}",
            example::EXAMPLE_NAME
        );
    }

    Ok(())
}
