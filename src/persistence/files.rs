use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const DIR_NAME: &str = ".tally";

/// Get the tally directory - checks for local .tally first, then falls back to global ~/.tally
pub fn get_tally_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;

    if let Some(local_dir) = find_local_tally(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DIR_NAME))
}

/// Find local .tally directory by walking up the directory tree
fn find_local_tally(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let tally_dir = current.join(DIR_NAME);
        if tally_dir.is_dir() {
            return Some(tally_dir);
        }

        current = current.parent()?;
    }
}

/// Ensure the given data directory exists
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Initialize a local .tally directory in the current directory
pub fn init_local_tally() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let tally_dir = current_dir.join(DIR_NAME);

    if tally_dir.exists() {
        anyhow::bail!("Tally directory already exists: {}", tally_dir.display());
    }

    fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create directory: {}", tally_dir.display()))?;

    Ok(tally_dir)
}

/// Tasks and entries
pub fn database_file(dir: &Path) -> PathBuf {
    dir.join("tally.json")
}

pub fn settings_file(dir: &Path) -> PathBuf {
    dir.join("settings.json")
}

pub fn log_file(dir: &Path) -> PathBuf {
    dir.join("tally.log")
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().context("File path has no parent directory")?;

    let mut temp_file = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_local_tally_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join(DIR_NAME);
        fs::create_dir_all(&root).unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_local_tally(&nested), Some(root));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("tally.json");

        atomic_write(&test_file, "{\"tasks\":[]}").unwrap();
        assert_eq!(fs::read_to_string(&test_file).unwrap(), "{\"tasks\":[]}");

        atomic_write(&test_file, "{}").unwrap();
        assert_eq!(fs::read_to_string(&test_file).unwrap(), "{}");
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("x").join(DIR_NAME);

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(database_file(&dir), dir.join("tally.json"));
    }
}
