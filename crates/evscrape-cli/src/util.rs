//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Write content to a file, or to stdout when no path is given.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        write_output(Some(&path), "charger-state=UNPLUGGED...\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "charger-state=UNPLUGGED...\n"
        );
    }

    #[test]
    fn test_write_output_bad_path() {
        let path = PathBuf::from("/nonexistent-dir/status.txt");
        let err = write_output(Some(&path), "x").unwrap_err();
        assert!(err.to_string().contains("Failed to write to"));
    }
}
