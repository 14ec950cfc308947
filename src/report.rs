//! Plain-text findings report.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Write a timestamped report of discovered credentials into `dir`.
///
/// The file carries the preview command string the run was launched with and
/// every credential line in discovery order. Callers are expected to skip
/// the write when nothing was found.
///
/// # Errors
///
/// Returns any I/O error from creating or writing the file.
pub fn write_report(dir: &Path, preview: &str, credentials: &[String]) -> std::io::Result<PathBuf> {
    let now = Local::now();
    let path = dir.join(format!("hydra_results_{}.txt", now.format("%Y%m%d_%H%M%S")));

    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "=== HYDRA RESULTS ===")?;
    writeln!(file, "Date: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(file, "Command: {preview}")?;
    writeln!(file, "{}", "=".repeat(50))?;
    writeln!(file)?;
    if credentials.is_empty() {
        writeln!(file, "No credentials found.")?;
    } else {
        for credential in credentials {
            writeln!(file, "{credential}")?;
        }
    }

    tracing::info!(path = %path.display(), found = credentials.len(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_contains_preview_and_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = vec![
            "[ssh] login: root password: toor".to_string(),
            "[ftp] login: anon password: guest".to_string(),
        ];
        let path = write_report(dir.path(), "hydra -t 4 10.0.0.1 ssh", &credentials).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Command: hydra -t 4 10.0.0.1 ssh"));
        assert!(contents.contains("[ssh] login: root password: toor"));
        assert!(contents.contains("[ftp] login: anon password: guest"));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("hydra_results_"));
    }

    #[test]
    fn empty_findings_are_marked() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "hydra", &[]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("No credentials found."));
    }
}
