//! Hierarchy file discovery and parsing.
//!
//! Each part lives in `<base>/partNN/` and may hold one hierarchy file.
//! A missing file is not an error; the caller decides how to count it.

use crate::config::LayoutConfig;
use crate::error::{AggregateError, Result};
use crate::models::{part_id, HierarchyEntry, Section};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Outcome of reading a single part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartLoad {
    /// The file was parsed; sections are in file order.
    Loaded(Vec<Section>),
    /// No hierarchy file exists for the part.
    Missing(PathBuf),
    /// The file failed to parse and malformed files are being skipped.
    Skipped(PathBuf),
}

/// Presence of a part's hierarchy file, for dry runs.
#[derive(Debug, Clone)]
pub struct PartFile {
    pub part_num: u32,
    pub path: PathBuf,
    /// File size in bytes, `None` when the file does not exist.
    pub size: Option<u64>,
}

/// Reads hierarchy files according to a layout.
#[derive(Debug, Clone)]
pub struct HierarchyLoader {
    layout: LayoutConfig,
    skip_malformed: bool,
}

impl HierarchyLoader {
    /// Create a loader that fails on malformed files.
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            skip_malformed: false,
        }
    }

    /// Skip malformed files with a warning instead of failing.
    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Part numbers in processing order.
    pub fn part_numbers(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.layout.part_count
    }

    /// Expected hierarchy file path for a part.
    pub fn hierarchy_path(&self, part_num: u32) -> PathBuf {
        self.layout
            .base_dir
            .join(part_id(part_num))
            .join(&self.layout.hierarchy_file)
    }

    /// Read and normalize one part's hierarchy file.
    pub fn load_part(&self, part_num: u32) -> Result<PartLoad> {
        let path = self.hierarchy_path(part_num);

        if !path.exists() {
            warn!("Hierarchy file not found: {}", path.display());
            return Ok(PartLoad::Missing(path));
        }

        let bytes = fs::read(&path).map_err(|source| AggregateError::Read {
            path: path.clone(),
            source,
        })?;

        let entries: Vec<HierarchyEntry> = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(source) if self.skip_malformed => {
                warn!("Skipping malformed hierarchy file {}: {}", path.display(), source);
                return Ok(PartLoad::Skipped(path));
            }
            Err(source) => return Err(AggregateError::Malformed { path, source }),
        };

        debug!("Loaded {} entries from {}", entries.len(), path.display());

        Ok(PartLoad::Loaded(
            entries.into_iter().map(Section::from).collect(),
        ))
    }

    /// Report which hierarchy files are present without parsing them.
    pub fn scan(&self) -> Vec<PartFile> {
        self.part_numbers()
            .map(|part_num| {
                let path = self.hierarchy_path(part_num);
                let size = fs::metadata(&path)
                    .ok()
                    .filter(|m| m.is_file())
                    .map(|m| m.len());
                PartFile {
                    part_num,
                    path,
                    size,
                }
            })
            .collect()
    }
}
