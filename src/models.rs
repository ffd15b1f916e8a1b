//! Data models for the encyclopedia aggregator.
//!
//! This module contains the input hierarchy records read from each part
//! and the derived structures written to the consolidated document.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// One top-level group in a part's hierarchy file.
///
/// `slideNum` and `title` must be present but are copied through as-is,
/// whatever their JSON type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyEntry {
    /// Slide number of the group's own slide.
    pub slide_num: Value,
    /// Group title.
    pub title: Value,
    /// Sub-slides nested under the group. Opaque beyond being counted.
    #[serde(default)]
    pub children: Vec<Value>,
}

/// Normalized form of a hierarchy entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub slide_num: Value,
    pub title: Value,
    pub child_count: usize,
    pub children: Vec<Value>,
}

impl From<HierarchyEntry> for Section {
    fn from(entry: HierarchyEntry) -> Self {
        Self {
            slide_num: entry.slide_num,
            title: entry.title,
            child_count: entry.children.len(),
            children: entry.children,
        }
    }
}

impl Section {
    /// Slides contributed by this section: its own slide plus its children.
    pub fn slide_count(&self) -> usize {
        1 + self.child_count
    }
}

/// Summary of one part of the encyclopedia.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartSummary {
    /// Part number (1-indexed).
    pub part_num: u32,
    /// Number of sections in the part.
    pub section_count: usize,
    /// Section slides plus all child slides.
    pub slide_count: usize,
    /// Sections in hierarchy-file order.
    pub sections: Vec<Section>,
}

impl PartSummary {
    /// Builds a part summary, computing its counts from the sections.
    pub fn from_sections(part_num: u32, sections: Vec<Section>) -> Self {
        Self {
            part_num,
            section_count: sections.len(),
            slide_count: sections.iter().map(Section::slide_count).sum(),
            sections,
        }
    }

    /// A part with no hierarchy data.
    pub fn empty(part_num: u32) -> Self {
        Self::from_sections(part_num, Vec::new())
    }

    /// Zero-padded identifier used as the key in the document and as the
    /// part's directory name.
    pub fn part_id(&self) -> String {
        part_id(self.part_num)
    }
}

/// Returns the identifier for a part number, e.g. `part07`.
pub fn part_id(part_num: u32) -> String {
    format!("part{:02}", part_num)
}

/// Metadata block of the consolidated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub title: String,
    pub version: String,
    pub source: String,
    pub total_parts: u32,
    pub total_sections: usize,
    pub total_slides: usize,
}

/// The consolidated encyclopedia document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncyclopediaDocument {
    pub metadata: DocumentMetadata,
    /// Parts in numeric order, serialized as a map keyed by part id.
    #[serde(serialize_with = "serialize_parts")]
    pub parts: Vec<PartSummary>,
}

impl EncyclopediaDocument {
    /// Sums `(sectionCount, slideCount)` over all parts.
    pub fn totals_from_parts(&self) -> (usize, usize) {
        self.parts.iter().fold((0, 0), |(sections, slides), part| {
            (sections + part.section_count, slides + part.slide_count)
        })
    }

    /// Whether the metadata totals agree with the per-part counts.
    pub fn totals_consistent(&self) -> bool {
        let (sections, slides) = self.totals_from_parts();
        sections == self.metadata.total_sections && slides == self.metadata.total_slides
    }

    /// Looks up a part by number.
    #[cfg(test)]
    pub fn part(&self, part_num: u32) -> Option<&PartSummary> {
        self.parts.iter().find(|p| p.part_num == part_num)
    }
}

fn serialize_parts<S: Serializer>(parts: &[PartSummary], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(parts.len()))?;
    for part in parts {
        map.serialize_entry(&part.part_id(), part)?;
    }
    map.end()
}
