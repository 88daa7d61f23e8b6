//! Slices the companion metadata document by top-level (`## `) headings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkflowError};
use crate::store::ProjectStore;

/// A heading-delimited slice of the metadata document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataSection {
    pub section_key: String,
    pub title: String,
    /// 1-based line of the section heading.
    pub start_line: usize,
    /// 1-based line where the next section starts; exclusive.
    pub end_line: usize,
    /// The lines `start_line..end_line`, heading included.
    pub content: String,
}

/// Line bounds of a section as 0-based indices, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    pub start: usize,
    pub end: usize,
}

/// `## Title` counts; `### Sub` and `# Doc` do not.
fn is_top_level_heading(line: &str) -> bool {
    line.trim().starts_with("## ")
}

/// Split on `\n`, dropping a trailing `\r` from each line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Locate the first top-level heading containing `title` and the next
/// top-level heading after it (or end of document). A blank title matches nothing.
pub fn find_section(lines: &[&str], title: &str) -> Option<SectionBounds> {
    if title.trim().is_empty() {
        return None;
    }
    let start = lines
        .iter()
        .position(|line| is_top_level_heading(line) && line.contains(title))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| is_top_level_heading(line))
        .map_or(lines.len(), |offset| start + 1 + offset);
    Some(SectionBounds { start, end })
}

/// Extract `title`'s section from `text`, reporting 1-based line numbers.
pub fn extract_section(text: &str, section_key: &str, title: &str) -> Option<MetadataSection> {
    let lines = split_lines(text);
    let bounds = find_section(&lines, title)?;
    Some(MetadataSection {
        section_key: section_key.to_string(),
        title: title.to_string(),
        start_line: bounds.start + 1,
        end_line: bounds.end + 1,
        content: lines[bounds.start..bounds.end].join("\n"),
    })
}

/// Resolve `section_key` through the metadata index and slice the document.
pub fn load_section(store: &ProjectStore, section_key: &str) -> Result<MetadataSection> {
    let metadata = store.load_metadata().ok_or_else(|| {
        WorkflowError::NotFound(format!(
            "metadata_index.yaml missing or invalid at {}",
            store.metadata_index_path().display()
        ))
    })?;
    let sections = metadata.sections.as_ref().ok_or_else(|| {
        WorkflowError::NotFound("metadata_index.yaml does not define sections.".to_string())
    })?;
    let title = sections
        .get(section_key)
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| {
            WorkflowError::NotFound(format!(
                "Section key '{}' not found in metadata_index.yaml sections.",
                section_key
            ))
        })?;

    let document = store.resolve(metadata.metadata_file());
    let text = std::fs::read_to_string(&document).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WorkflowError::NotFound(format!("Metadata file not found at {}", document.display()))
        } else {
            WorkflowError::io(&document, e)
        }
    })?;

    extract_section(&text, section_key, title).ok_or_else(|| {
        WorkflowError::NotFound(format!(
            "Title '{}' for section '{}' not found in metadata file.",
            title, section_key
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> String {
        let mut lines: Vec<String> = vec!["# Project Metadata".to_string()];
        lines.extend((2..10).map(|n| format!("intro {}", n)));
        lines.push("## Authentication".to_string()); // line 10
        lines.push("### Tokens".to_string());
        lines.extend((12..25).map(|n| format!("auth {}", n)));
        lines.push("## Storage".to_string()); // line 25
        lines.push("storage body".to_string());
        lines.join("\n")
    }

    #[test]
    fn slices_until_next_top_level_heading() {
        let section = extract_section(&document(), "auth", "Authentication").unwrap();
        assert_eq!(section.start_line, 10);
        assert_eq!(section.end_line, 25);
        let lines: Vec<_> = section.content.lines().collect();
        assert_eq!(lines.len(), 15);
        assert_eq!(lines[0], "## Authentication");
        assert_eq!(lines[1], "### Tokens");
        assert_eq!(lines[14], "auth 24");
    }

    #[test]
    fn last_section_runs_to_end_of_document() {
        let section = extract_section(&document(), "storage", "Storage").unwrap();
        assert_eq!(section.start_line, 25);
        assert_eq!(section.end_line, 27);
        assert_eq!(section.content, "## Storage\nstorage body");
    }

    #[test]
    fn sub_headings_never_start_a_section() {
        assert!(extract_section(&document(), "tokens", "Tokens").is_none());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let text = "## A\r\nbody\r\n## B\r\n";
        let section = extract_section(text, "a", "A").unwrap();
        assert_eq!(section.content, "## A\nbody");
        assert_eq!(section.end_line, 3);
    }

    #[test]
    fn blank_title_matches_no_heading() {
        assert!(extract_section("## Intro\nx\n## Other\n", "auth", "").is_none());
        assert!(extract_section("## Intro\nx\n", "auth", "  ").is_none());
    }

    #[test]
    fn blank_title_in_index_is_an_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(
            dir.path().join("docs/metadata_index.yaml"),
            "sections:\n  auth: \"\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("docs/metadata.md"), "## Intro\nx\n## Other\n").unwrap();

        let err = load_section(&ProjectStore::open(dir.path()), "auth").unwrap_err();

        assert!(matches!(err, WorkflowError::NotFound(ref msg) if msg.contains("'auth' not found")));
    }

    #[test]
    fn matches_title_as_substring_of_heading() {
        let text = "## 3. Authentication & RBAC\nrules\n";
        let section = extract_section(text, "auth_rbac", "Authentication").unwrap();
        assert_eq!(section.start_line, 1);
    }
}
