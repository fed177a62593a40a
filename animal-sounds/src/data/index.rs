use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Labeled audio files found under a dataset root, as two parallel sequences.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DatasetIndex {
    pub paths: Vec<PathBuf>,
    pub labels: Vec<String>,
}

impl DatasetIndex {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.paths
            .iter()
            .map(PathBuf::as_path)
            .zip(self.labels.iter().map(String::as_str))
    }

    /// Number of entries per label, in label order.
    pub fn class_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for label in &self.labels {
            match counts.iter_mut().find(|(name, _)| name == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label.clone(), 1)),
            }
        }
        counts.sort();
        counts
    }
}

/// Walks `root`, treating every immediate subdirectory as a class name
/// and every file in it ending with `extension` as a sample of that class.
///
/// Loose files in `root` and non-matching files are skipped.
/// Directories and files are visited in name order.
pub fn index_directory(root: &Path, extension: &str) -> anyhow::Result<DatasetIndex> {
    let mut index = DatasetIndex::default();

    for class_dir in sorted_entries(root)? {
        if !class_dir.is_dir() {
            continue;
        }
        let Some(label) = class_dir.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non UTF-8 directory {}", class_dir.display());
            continue;
        };
        let label = label.to_owned();

        let mut found = 0usize;
        for file in sorted_entries(&class_dir)? {
            let matches = file.is_file()
                && file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.ends_with(extension));
            if matches {
                index.paths.push(file);
                index.labels.push(label.clone());
                found += 1;
            }
        }

        log::debug!("Indexed class={label}, files={found}");
    }

    Ok(index)
}

fn sorted_entries(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Reading directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}
