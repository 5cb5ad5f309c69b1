//! Flat JSON file store for scraped records
//!
//! Each data kind lives in one file holding a JSON array. Writes overwrite the
//! whole file with 4-space indented UTF-8.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::{Error, Result};

/// The files a ferry data directory can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Issues,
    Labels,
    PullRequests,
    Commits,
    Discussions,
    WorkflowRuns,
    StructureAnalysis,
}

impl DataFile {
    pub fn file_name(self) -> &'static str {
        match self {
            DataFile::Issues => "issues_with_comments.json",
            DataFile::Labels => "repo_labels_list.json",
            DataFile::PullRequests => "prs_with_details.json",
            DataFile::Commits => "repo_commits.json",
            DataFile::Discussions => "repo_discussions_with_comments.json",
            DataFile::WorkflowRuns => "repo_actions_runs.json",
            DataFile::StructureAnalysis => "repo_structure_analysis.json",
        }
    }
}

/// Reads and writes record files in one directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of `file` inside this store
    pub fn path(&self, file: DataFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    /// Read the record array stored in `file`
    ///
    /// A missing file is reported as [`Error::FileNotFound`].
    pub fn read<T: DeserializeOwned>(&self, file: DataFile) -> Result<Vec<T>> {
        read_json(&self.path(file))
    }

    /// Overwrite `file` with `records`, creating the directory if needed
    pub fn write<T: Serialize>(&self, file: DataFile, records: &[T]) -> Result<PathBuf> {
        let path = self.path(file);
        write_json(&path, records)?;
        info!(path = %path.display(), count = records.len(), "Saved records");
        Ok(path)
    }

    /// Overwrite `file` with an arbitrary JSON document
    pub fn write_document<T: Serialize + ?Sized>(&self, file: DataFile, value: &T) -> Result<PathBuf> {
        let path = self.path(file);
        write_json(&path, value)?;
        info!(path = %path.display(), "Saved document");
        Ok(path)
    }
}

/// Read a JSON document from `path`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    debug!(path = %path.display(), "Reading JSON");
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write `value` to `path` as 4-space indented JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}
