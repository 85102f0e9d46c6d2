//! `validate` command implementation.

use anyhow::Result;
use tracing::info;

use crate::cli::ValidateArgs;

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": true,
                        "name": blueprint.run.name,
                        "cameras": blueprint.cameras.len(),
                    })
                );
            } else {
                println!(
                    "Configuration OK: '{}' with {} camera(s)",
                    blueprint.run.name,
                    blueprint.cameras.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "error": e.to_string(),
                    })
                );
            }
            Err(anyhow::anyhow!(e).context(format!(
                "Configuration invalid: {}",
                args.config.display()
            )))
        }
    }
}
