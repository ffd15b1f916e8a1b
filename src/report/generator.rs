//! Document and Markdown summary generation.
//!
//! The JSON document is the primary artifact. The Markdown summary is an
//! optional human-readable view of the same data.

use crate::error::{AggregateError, Result};
use crate::models::{DocumentMetadata, EncyclopediaDocument, PartSummary};
use serde_json::Value;
use std::path::Path;

/// Serialize the document as two-space indented JSON.
///
/// Non-ASCII characters are written as-is.
pub fn generate_json_document(document: &EncyclopediaDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Write the JSON document, replacing any existing file.
pub fn write_json_document(document: &EncyclopediaDocument, path: &Path) -> Result<()> {
    let content = generate_json_document(document)?;
    write_file(path, &content)
}

/// Generate a Markdown summary of the document.
pub fn generate_markdown_summary(document: &EncyclopediaDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", document.metadata.title));
    output.push_str(&generate_metadata_section(&document.metadata));
    output.push_str(&generate_parts_table(&document.parts));
    output.push_str(&generate_sections_listing(&document.parts));

    output
}

/// Write the Markdown summary to a file.
pub fn write_markdown_summary(document: &EncyclopediaDocument, path: &Path) -> Result<()> {
    write_file(path, &generate_markdown_summary(document))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| AggregateError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &DocumentMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Version:** {}\n", metadata.version));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!("- **Total Parts:** {}\n", metadata.total_parts));
    section.push_str(&format!(
        "- **Total Sections:** {}\n",
        metadata.total_sections
    ));
    section.push_str(&format!("- **Total Slides:** {}\n", metadata.total_slides));
    section.push('\n');

    section
}

/// Generate the per-part count table.
fn generate_parts_table(parts: &[PartSummary]) -> String {
    let mut section = String::new();

    section.push_str("## Parts\n\n");
    section.push_str("| Part | Sections | Slides |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for part in parts {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            part.part_id(),
            part.section_count,
            part.slide_count
        ));
    }
    section.push('\n');

    section
}

/// Generate the section listing for every part that has sections.
fn generate_sections_listing(parts: &[PartSummary]) -> String {
    let mut section = String::new();

    section.push_str("## Sections\n\n");

    let non_empty: Vec<_> = parts.iter().filter(|p| !p.sections.is_empty()).collect();
    if non_empty.is_empty() {
        section.push_str("No hierarchy data was found.\n\n");
        return section;
    }

    for part in non_empty {
        section.push_str(&format!("### Part {}\n\n", part.part_num));
        for s in &part.sections {
            section.push_str(&format!(
                "- **{}** (slide {}, {} sub-slides)\n",
                display_value(&s.title),
                display_value(&s.slide_num),
                s.child_count
            ));
        }
        section.push('\n');
    }

    section
}

/// Strings are shown bare, anything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
