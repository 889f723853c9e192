//! Config command implementation

use std::path::Path;

use anyhow::{Context, Result};

use bl_core::config::{load_config, save_config, Settings};

use crate::output::{print_success, print_warning};

/// Print the settings file path in use
pub fn config_path(path: &Path) {
    println!("{}", path.display());
}

/// Write a default settings file unless one already exists
pub fn config_init(path: &Path) -> Result<()> {
    if path.exists() {
        print_warning(&format!("{} already exists; leaving it alone", path.display()));
        return Ok(());
    }
    save_config(path, &Settings::default())
        .with_context(|| format!("writing default settings to {}", path.display()))?;
    print_success(&format!("Wrote default settings to {}", path.display()));
    Ok(())
}

/// Dump the settings file as TOML
pub fn config_show(path: &Path) -> Result<()> {
    let settings: Settings = load_config(path)
        .with_context(|| format!("loading settings from {}", path.display()))?;
    let rendered = toml::to_string_pretty(&settings).context("rendering settings")?;
    print!("{}", rendered);
    Ok(())
}
