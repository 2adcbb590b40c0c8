use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Read the last `lines` lines of a log file.
///
/// Returns `Ok(None)` when the file does not exist; the handler maps that
/// to the "log not found" placeholder rather than an error, since a
/// freshly provisioned server legitimately has no logs yet.
pub async fn tail_file(path: &Path, lines: usize) -> Result<Option<String>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::LogRead(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            )));
        }
    };

    let reader = BufReader::new(file);
    let mut all_lines = Vec::new();
    let mut stream = reader.lines();

    while let Some(line) = stream
        .next_line()
        .await
        .map_err(|e| Error::LogRead(format!("Failed to read {}: {}", path.display(), e)))?
    {
        all_lines.push(line);
    }

    let start = all_lines.len().saturating_sub(lines);
    Ok(Some(all_lines[start..].join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_tail_returns_last_lines() {
        let mut file = NamedTempFile::new().unwrap();
        for i in 1..=10 {
            writeln!(file, "line {}", i).unwrap();
        }

        let tail = tail_file(file.path(), 3).await.unwrap().unwrap();
        assert_eq!(tail, "line 8\nline 9\nline 10");
    }

    #[tokio::test]
    async fn test_tail_shorter_file_than_requested() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "only line").unwrap();

        let tail = tail_file(file.path(), 100).await.unwrap().unwrap();
        assert_eq!(tail, "only line");
    }

    #[tokio::test]
    async fn test_tail_missing_file() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        drop(file);

        assert!(tail_file(&path, 10).await.unwrap().is_none());
    }
}
