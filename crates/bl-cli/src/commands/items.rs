//! Items command implementation

use std::path::Path;

use anyhow::{ensure, Context, Result};
use clap::Subcommand;

use bl_core::config::{load_config, save_config, Settings};
use bl_core::types::{move_down, move_up, remove};

use crate::output::{format_items, print_success};

/// Launch-list maintenance actions
#[derive(Subcommand)]
pub enum ItemsAction {
    /// Show the configured launch sequence
    List,
    /// Move the item at the given position one step earlier
    MoveUp { position: usize },
    /// Move the item at the given position one step later
    MoveDown { position: usize },
    /// Remove the item at the given position
    Remove { position: usize },
}

/// List or edit the launch sequence. Edits renumber densely and are
/// written back to the settings file.
pub fn items_command(config_path: &Path, action: ItemsAction) -> Result<()> {
    let mut settings: Settings = load_config(config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;

    let mut items = settings.items_in_order();

    if let ItemsAction::List = action {
        println!("{}", format_items(&items));
        return Ok(());
    }

    let position = match action {
        ItemsAction::MoveUp { position }
        | ItemsAction::MoveDown { position }
        | ItemsAction::Remove { position } => position,
        ItemsAction::List => unreachable!(),
    };
    ensure!(
        position >= 1 && position <= items.len(),
        "no item at position {} (list has {})",
        position,
        items.len()
    );
    let index = position - 1;

    match action {
        ItemsAction::MoveUp { .. } => move_up(&mut items, index),
        ItemsAction::MoveDown { .. } => move_down(&mut items, index),
        ItemsAction::Remove { .. } => {
            if let Some(removed) = remove(&mut items, index) {
                print_success(&format!("Removed {}", removed.label()));
            }
        }
        ItemsAction::List => unreachable!(),
    }

    settings.launch_items = items;
    save_config(config_path, &settings)
        .with_context(|| format!("saving settings to {}", config_path.display()))?;

    println!("{}", format_items(&settings.launch_items));
    Ok(())
}
