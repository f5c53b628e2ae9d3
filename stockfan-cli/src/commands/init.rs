//! Init command - initialize configuration file.

use std::path::Path;

use stockfan::config::ConfigFile;

use crate::error::CliError;

/// Run the init command.
///
/// An existing file is kept and rewritten with every key present.
pub fn run(path: &Path) -> Result<(), CliError> {
    let existed = path.exists();
    let config = ConfigFile::load_from(path)?;
    config.save_to(path)?;

    if existed {
        println!("Updated configuration file: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    println!();

    if config.sources.is_empty() {
        println!("No sources configured yet. Add one with:");
        println!("  stockfan sources add <ID> <LOCATION>");
        println!();
        println!("LOCATION is snapshot:<path>, http(s)://... or postgres://...");
    } else {
        println!("{} source(s) configured.", config.sources.len());
    }
    Ok(())
}
