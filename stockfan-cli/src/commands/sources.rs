//! Sources command - list, add and remove inventory sources.

use std::path::Path;

use clap::Subcommand;
use stockfan::config::ConfigFile;

use crate::error::CliError;

/// Sources subcommands. With none given, the configured sources are listed.
#[derive(Debug, Subcommand)]
pub enum SourcesAction {
    /// List configured sources
    List,

    /// Register a source
    Add {
        /// Source id, reported on every row the source returns
        id: String,

        /// snapshot:<path>, http(s)://... or postgres://...
        location: String,
    },

    /// Remove a source by id
    Remove {
        /// Source id
        id: String,
    },
}

/// Run a sources subcommand against the file at `path`.
pub fn run(path: &Path, action: Option<SourcesAction>) -> Result<(), CliError> {
    match action.unwrap_or(SourcesAction::List) {
        SourcesAction::List => run_list(path),
        SourcesAction::Add { id, location } => run_add(path, &id, &location),
        SourcesAction::Remove { id } => run_remove(path, &id),
    }
}

fn run_list(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;

    if config.sources.is_empty() {
        println!("No sources configured.");
        println!("Add one with 'stockfan sources add <ID> <LOCATION>'.");
        return Ok(());
    }

    let id_width = config
        .sources
        .iter()
        .map(|s| s.id.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);

    println!("{:<id_width$}  {:<8}  LOCATION", "ID", "KIND");
    for source in &config.sources {
        println!(
            "{:<id_width$}  {:<8}  {}",
            source.id,
            source.location.kind().as_str(),
            source.location.redacted()
        );
    }

    Ok(())
}

fn run_add(path: &Path, id: &str, location: &str) -> Result<(), CliError> {
    let mut config = ConfigFile::load_from(path)?;
    config.add_source(id, location)?;
    config.save_to(path)?;

    println!("Added source '{}'", id.trim());
    Ok(())
}

fn run_remove(path: &Path, id: &str) -> Result<(), CliError> {
    let mut config = ConfigFile::load_from(path)?;
    if !config.remove_source(id) {
        return Err(CliError::Config(format!("No source with id '{}'", id)));
    }
    config.save_to(path)?;

    println!("Removed source '{}'", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_then_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        run_add(&path, "Komerco", "http://komerco.local/api").unwrap();
        run_add(&path, "Backup", "snapshot:/var/lib/stock.json").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        let ids: Vec<&str> = config.sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["Komerco", "Backup"]);

        run_remove(&path, "Komerco").unwrap();
        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].id, "Backup");
    }

    #[test]
    fn test_add_duplicate_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        run_add(&path, "Komerco", "http://komerco.local/api").unwrap();
        assert!(run_add(&path, "Komerco", "http://other.local").is_err());
    }

    #[test]
    fn test_add_bad_location_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        assert!(run_add(&path, "Komerco", "ftp://komerco.local").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        assert!(run_remove(&path, "Nowhere").is_err());
    }
}
