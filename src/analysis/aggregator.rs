//! Hierarchy aggregation and statistics.
//!
//! This module loads every part's hierarchy, builds the per-part
//! summaries and totals, and writes the consolidated document.

use crate::config::{Config, MetadataConfig};
use crate::error::{AggregateError, Result};
use crate::loader::{HierarchyLoader, PartLoad};
use crate::models::{part_id, DocumentMetadata, EncyclopediaDocument, PartSummary, Section};
use crate::report;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Hierarchies of all parts that were found, with running totals.
#[derive(Debug, Clone, Default)]
pub struct LoadedHierarchies {
    /// Sections per part number, only for parts that were loaded.
    pub parts: BTreeMap<u32, Vec<Section>>,
    /// Number of sections across all loaded parts.
    pub total_sections: usize,
    /// Section slides plus child slides across all loaded parts.
    pub total_slides: usize,
    /// Parts with no hierarchy file.
    pub missing: Vec<u32>,
    /// Parts whose hierarchy file was skipped as malformed.
    pub skipped: Vec<u32>,
}

impl LoadedHierarchies {
    fn record(&mut self, part_num: u32, sections: Vec<Section>) {
        self.total_sections += sections.len();
        self.total_slides += sections.iter().map(Section::slide_count).sum::<usize>();
        self.parts.insert(part_num, sections);
    }
}

/// Builds the consolidated encyclopedia document.
pub struct Aggregator {
    loader: HierarchyLoader,
    metadata: MetadataConfig,
    output_path: PathBuf,
    show_progress: bool,
}

impl Aggregator {
    /// Create an aggregator from the merged configuration.
    pub fn new(config: &Config) -> Self {
        let loader = HierarchyLoader::new(config.layout.clone())
            .with_skip_malformed(config.general.skip_malformed);

        Self {
            loader,
            metadata: config.metadata.clone(),
            output_path: config.layout.output_path(),
            show_progress: true,
        }
    }

    /// Whether to print progress lines and the final summary.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Load every part's hierarchy file in ascending part order.
    pub fn load_hierarchies(&self) -> Result<LoadedHierarchies> {
        let part_count = self.loader.layout().part_count;
        let pb = self.progress_bar(part_count as u64);
        let mut loaded = LoadedHierarchies::default();

        for part_num in self.loader.part_numbers() {
            pb.set_message(part_id(part_num));

            // Warnings go to stdout while the bar draws on stderr
            let outcome = pb.suspend(|| self.loader.load_part(part_num))?;

            match outcome {
                PartLoad::Loaded(sections) => loaded.record(part_num, sections),
                PartLoad::Missing(path) => {
                    debug!("Part {} has no hierarchy at {}", part_num, path.display());
                    loaded.missing.push(part_num);
                }
                PartLoad::Skipped(path) => {
                    debug!("Part {} skipped, {} is malformed", part_num, path.display());
                    loaded.skipped.push(part_num);
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();

        debug!(
            "Loaded {} of {} parts ({} sections, {} slides)",
            loaded.parts.len(),
            part_count,
            loaded.total_sections,
            loaded.total_slides
        );

        Ok(loaded)
    }

    /// Assemble the document from loaded hierarchies.
    ///
    /// Every part number gets a summary; parts that were not loaded are empty.
    pub fn build_document(&self, mut loaded: LoadedHierarchies) -> EncyclopediaDocument {
        let part_count = self.loader.layout().part_count;
        let mut parts = Vec::with_capacity(part_count as usize);

        for part_num in self.loader.part_numbers() {
            let part = match loaded.parts.remove(&part_num) {
                Some(sections) => PartSummary::from_sections(part_num, sections),
                None => PartSummary::empty(part_num),
            };

            if self.show_progress {
                println!(
                    "  Part {:>2}: {:>3} sections, {:>4} slides",
                    part.part_num, part.section_count, part.slide_count
                );
            }

            parts.push(part);
        }

        EncyclopediaDocument {
            metadata: DocumentMetadata {
                title: self.metadata.title.clone(),
                version: self.metadata.version.clone(),
                source: self.metadata.source.clone(),
                total_parts: part_count,
                total_sections: loaded.total_sections,
                total_slides: loaded.total_slides,
            },
            parts,
        }
    }

    /// Load, build and write the document, returning it to the caller.
    pub fn generate(&self) -> Result<EncyclopediaDocument> {
        if self.loader.layout().part_count == 0 {
            return Err(AggregateError::InvalidLayout(
                "part count must be at least 1".to_string(),
            ));
        }

        if self.show_progress {
            println!("{}", "=".repeat(60));
            println!("📚 Aggregating slide hierarchies");
            println!("{}", "=".repeat(60));
        }

        let loaded = self.load_hierarchies()?;
        let missing = loaded.missing.clone();
        let skipped = loaded.skipped.clone();

        let document = self.build_document(loaded);
        debug_assert!(document.totals_consistent());

        report::write_json_document(&document, &self.output_path)?;
        info!("Wrote {}", self.output_path.display());

        if self.show_progress {
            self.print_summary(&document, &missing, &skipped);
        }

        Ok(document)
    }

    fn print_summary(&self, document: &EncyclopediaDocument, missing: &[u32], skipped: &[u32]) {
        println!("\n{}", "=".repeat(60));
        println!("📊 Summary:");
        println!("   Total Parts: {}", document.metadata.total_parts);
        println!("   Total Sections: {}", document.metadata.total_sections);
        println!("   Total Slides: {}", document.metadata.total_slides);
        if !missing.is_empty() {
            println!("   Missing parts: {}", join_part_numbers(missing));
        }
        if !skipped.is_empty() {
            println!("   Skipped (malformed): {}", join_part_numbers(skipped));
        }
        println!("\n✅ Output file: {}", self.output_path().display());
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let template = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

fn join_part_numbers(parts: &[u32]) -> String {
    parts
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn write_part(base: &Path, part_num: u32, entries: Value) {
        let dir = base.join(part_id(part_num));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("slide_hierarchy.json"),
            serde_json::to_string(&entries).unwrap(),
        )
        .unwrap();
    }

    fn children(start: i64, n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({"slideNum": start + i as i64, "title": format!("Child {}", i)}))
                .collect(),
        )
    }

    fn aggregator(base: &Path) -> Aggregator {
        let config = Config {
            layout: LayoutConfig {
                base_dir: base.to_path_buf(),
                ..LayoutConfig::default()
            },
            ..Config::default()
        };
        Aggregator::new(&config).with_progress(false)
    }

    fn scenario(base: &Path) {
        write_part(
            base,
            1,
            json!([{"slideNum": 1, "title": "Price Action", "children": children(2, 2)}]),
        );
        write_part(
            base,
            3,
            json!([
                {"slideNum": 10, "title": "Trading Ranges", "children": []},
                {"slideNum": 11, "title": "Breakouts", "children": children(12, 5)}
            ]),
        );
    }

    #[test]
    fn test_two_present_parts() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());

        let doc = aggregator(temp.path()).generate().unwrap();

        assert_eq!(doc.parts.len(), 16);
        let part01 = doc.part(1).unwrap();
        assert_eq!((part01.section_count, part01.slide_count), (1, 3));
        let part03 = doc.part(3).unwrap();
        assert_eq!((part03.section_count, part03.slide_count), (2, 6));

        for part in doc.parts.iter().filter(|p| p.part_num != 1 && p.part_num != 3) {
            assert_eq!(part.section_count, 0);
            assert_eq!(part.slide_count, 0);
            assert!(part.sections.is_empty());
        }

        assert_eq!(doc.metadata.total_parts, 16);
        assert_eq!(doc.metadata.total_sections, 3);
        assert_eq!(doc.metadata.total_slides, 9);
        assert!(doc.totals_consistent());
    }

    #[test]
    fn test_load_hierarchies_tracks_missing() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());

        let loaded = aggregator(temp.path()).load_hierarchies().unwrap();
        assert_eq!(loaded.parts.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(loaded.missing.len(), 14);
        assert!(!loaded.missing.contains(&3));
        assert_eq!(loaded.total_sections, 3);
        assert_eq!(loaded.total_slides, 9);
    }

    #[test]
    fn test_no_parts_present_still_writes() {
        let temp = TempDir::new().unwrap();
        let agg = aggregator(temp.path());

        let doc = agg.generate().unwrap();
        assert_eq!(doc.metadata.total_sections, 0);
        assert_eq!(doc.metadata.total_slides, 0);
        assert!(agg.output_path().exists());
    }

    #[test]
    fn test_output_written_and_idempotent() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());
        let agg = aggregator(temp.path());

        agg.generate().unwrap();
        let first = fs::read(agg.output_path()).unwrap();
        agg.generate().unwrap();
        let second = fs::read(agg.output_path()).unwrap();

        assert_eq!(first, second);

        let written: Value = serde_json::from_slice(&first).unwrap();
        assert_eq!(written["metadata"]["totalSlides"], 9);
        assert_eq!(written["parts"]["part03"]["sectionCount"], 2);
        let keys: Vec<&String> = written["parts"].as_object().unwrap().keys().collect();
        assert_eq!(keys.first().map(|k| k.as_str()), Some("part01"));
        assert_eq!(keys.last().map(|k| k.as_str()), Some("part16"));
    }

    #[test]
    fn test_children_pass_through_unchanged() {
        let temp = TempDir::new().unwrap();
        let kids = json!([
            {"title": "Zeta", "slideNum": 3, "notes": ["a", "b"]},
            {"slideNum": 2, "title": "Ünïcödé 楔形"}
        ]);
        write_part(
            temp.path(),
            2,
            json!([{"slideNum": 1, "title": "Wedges", "children": kids.clone()}]),
        );

        let agg = aggregator(temp.path());
        let doc = agg.generate().unwrap();
        assert_eq!(Value::Array(doc.part(2).unwrap().sections[0].children.clone()), kids);

        let written: Value = serde_json::from_slice(&fs::read(agg.output_path()).unwrap()).unwrap();
        assert_eq!(written["parts"]["part02"]["sections"][0]["children"], kids);
        let first_child_keys: Vec<&String> = written["parts"]["part02"]["sections"][0]["children"][0]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(first_child_keys, vec!["title", "slideNum", "notes"]);
    }

    #[test]
    fn test_oversized_child_numbers_keep_every_digit() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("part01");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("slide_hierarchy.json"),
            r#"[{"slideNum": 1, "title": "Big", "children": [
                {"id": 123456789012345678901234567890, "ratio": 0.1000000000000000055511151231257827}
            ]}]"#,
        )
        .unwrap();

        let agg = aggregator(temp.path());
        agg.generate().unwrap();

        let out = fs::read_to_string(agg.output_path()).unwrap();
        assert!(out.contains("\"id\": 123456789012345678901234567890"));
        assert!(out.contains("\"ratio\": 0.1000000000000000055511151231257827"));
    }

    #[test]
    fn test_loading_with_progress_bar_matches_hidden() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());

        let mut config = Config::default();
        config.layout.base_dir = temp.path().to_path_buf();

        let shown = Aggregator::new(&config).load_hierarchies().unwrap();
        let hidden = aggregator(temp.path()).load_hierarchies().unwrap();

        assert_eq!(shown.parts, hidden.parts);
        assert_eq!(shown.missing, hidden.missing);
        assert_eq!(shown.total_slides, 9);
    }

    #[test]
    fn test_malformed_part_aborts() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());
        let dir = temp.path().join("part05");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("slide_hierarchy.json"), "{\"oops\": true}").unwrap();

        let agg = aggregator(temp.path());
        let err = agg.generate().unwrap_err();
        assert!(matches!(err, AggregateError::Malformed { .. }));
        assert!(!agg.output_path().exists());
    }

    #[test]
    fn test_malformed_part_skipped_when_configured() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());
        let dir = temp.path().join("part05");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("slide_hierarchy.json"), "garbage").unwrap();

        let mut config = Config::default();
        config.layout.base_dir = temp.path().to_path_buf();
        config.general.skip_malformed = true;
        let agg = Aggregator::new(&config).with_progress(false);

        let loaded = agg.load_hierarchies().unwrap();
        assert_eq!(loaded.skipped, vec![5]);

        let doc = agg.build_document(loaded);
        assert_eq!(doc.part(5).unwrap().section_count, 0);
        assert_eq!(doc.metadata.total_slides, 9);
    }

    #[test]
    fn test_unwritable_output_fails() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());

        let mut config = Config::default();
        config.layout.base_dir = temp.path().to_path_buf();
        config.layout.output_file = PathBuf::from("no_such_dir/encyclopedia_complete.json");
        let agg = Aggregator::new(&config).with_progress(false);

        let err = agg.generate().unwrap_err();
        assert!(matches!(err, AggregateError::Write { .. }));
    }

    #[test]
    fn test_custom_part_count() {
        let temp = TempDir::new().unwrap();
        scenario(temp.path());

        let mut config = Config::default();
        config.layout.base_dir = temp.path().to_path_buf();
        config.layout.part_count = 2;
        let doc = Aggregator::new(&config)
            .with_progress(false)
            .generate()
            .unwrap();

        assert_eq!(doc.metadata.total_parts, 2);
        assert_eq!(doc.parts.len(), 2);
        assert_eq!(doc.metadata.total_slides, 3);
    }

    #[test]
    fn test_zero_parts_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.layout.base_dir = temp.path().to_path_buf();
        config.layout.part_count = 0;

        let err = Aggregator::new(&config)
            .with_progress(false)
            .generate()
            .unwrap_err();
        assert!(matches!(err, AggregateError::InvalidLayout(_)));
    }
}
