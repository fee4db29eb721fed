//! Config command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::openai::api_key_from_env;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: Option<&str>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Config, &settings)?;

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);

            if api_key_from_env(&settings.llm.api_key_env).is_none() {
                Output::warning(&format!(
                    "{} is not set; the server will refuse to start.",
                    settings.llm.api_key_env
                ));
            }
        }

        ConfigAction::Path => {
            let path = config_path
                .map(Settings::expand_path)
                .unwrap_or_else(Settings::default_config_path);
            println!("{}", path.display());
        }
    }

    Ok(())
}
