use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::dates::{DateEntry, decode_dir_name};
use crate::ui::prelude::{Level, emit};

/// A recognized date directory inside the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipDirectory {
    pub entry: DateEntry,
    pub path: PathBuf,
}

impl ClipDirectory {
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn display_date(&self) -> String {
        self.entry.display()
    }
}

/// List the date directories of `work_dir`, oldest first.
///
/// Entries that are not directories or whose name does not decode to a date
/// are skipped. Ties on the same date (one directory per format) are ordered
/// by name.
pub fn discover_date_dirs(work_dir: &Path) -> Result<Vec<ClipDirectory>> {
    let entries = fs::read_dir(work_dir)
        .with_context(|| format!("Failed to list {}", work_dir.display()))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry in {}", work_dir.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        match decode_dir_name(&name) {
            Some(date) => dirs.push(ClipDirectory { entry: date, path }),
            None => emit(
                Level::Debug,
                "scan.skip",
                &format!("Ignoring non-date directory {}", name),
                None,
            ),
        }
    }

    dirs.sort_by(|a, b| {
        a.entry
            .date
            .cmp(&b.entry.date)
            .then_with(|| a.entry.name.cmp(&b.entry.name))
    });
    Ok(dirs)
}
