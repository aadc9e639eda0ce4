//! Bundled JSON snapshot source.
//!
//! # Responsibility
//! - Probe an ordered list of candidate snapshot files.
//! - Normalize the first usable file into a dataset.
//!
//! # Invariants
//! - A missing candidate moves on to the next one; the first file that
//!   parses and yields at least one valid record wins.
//! - Malformed records inside a file are skipped and counted.

use crate::model::dataset::{Dataset, Provenance};
use crate::source::normalize::{extract_record_array, records_from_values};
use crate::source::{DataSource, SourceError, SourceResult};
use log::warn;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const STATIC_FILE_SOURCE_ID: &str = "static_file";

/// Reads records from the first existing JSON snapshot among `paths`.
#[derive(Debug, Clone)]
pub struct StaticFileSource {
    paths: Vec<PathBuf>,
}

impl StaticFileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![path.into()])
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn load_file(&self, path: &Path, limit: usize) -> SourceResult<Dataset> {
        let file = File::open(path).map_err(|error| SourceError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let body: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| SourceError::Parse(format!("{}: {err}", path.display())))?;
        let values = extract_record_array(body)?;
        records_from_values(&values, Provenance::StaticFile, limit)
    }
}

impl DataSource for StaticFileSource {
    fn source_id(&self) -> &str {
        STATIC_FILE_SOURCE_ID
    }

    fn provenance(&self) -> Provenance {
        Provenance::StaticFile
    }

    fn load(&self, limit: usize) -> SourceResult<Dataset> {
        let mut last_error = None;

        for path in &self.paths {
            if !path.is_file() {
                continue;
            }
            match self.load_file(path, limit) {
                Ok(dataset) => return Ok(dataset),
                Err(err) => {
                    warn!(
                        "event=static_file_rejected module=static_file path={} error_code={} error={}",
                        path.display(),
                        err.code(),
                        err
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SourceError::Missing(self.paths.clone())))
    }
}
