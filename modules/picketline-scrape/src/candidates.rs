use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One candidate article, one JSON object per line in the input file.
/// Only `url` is required; `paper` is inferred from the URL when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub url: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub paper: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
}

/// Load candidates from a JSONL file. Blank lines are skipped; a
/// malformed line aborts the load with its line number.
pub fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidate file: {}", path.display()))?;

    let mut candidates = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let candidate: Candidate = serde_json::from_str(line).with_context(|| {
            format!("Bad candidate on line {} of {}", idx + 1, path.display())
        })?;
        candidates.push(candidate);
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_candidates_and_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"url": "https://example.com/a", "title": "Rally", "publish_date": "2024-03-01"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"url": "https://example.com/b"}}"#).unwrap();

        let candidates = load_candidates(file.path()).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "https://example.com/a");
        assert_eq!(candidates[0].title.as_deref(), Some("Rally"));
        assert!(candidates[1].title.is_none());
    }

    #[test]
    fn malformed_line_reports_its_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"url": "https://example.com/a"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let err = load_candidates(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_candidates(Path::new("/nonexistent/candidates.jsonl")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
