//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command against the file at `config_path`.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init => {
            if config_path.exists() {
                Output::info(&format!("Config already exists at {}", config_path.display()));
            } else {
                Settings::default().save_to(&config_path.to_path_buf())?;
                Output::success(&format!("Created default config at {}", config_path.display()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docquery").join("config.toml");

        run_config(&ConfigAction::Init, Settings::default(), &path).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[llm]\nmodel = \"custom\"\n").unwrap();
        run_config(&ConfigAction::Init, Settings::default(), &path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.llm.model, "custom");
    }
}
