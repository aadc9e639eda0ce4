//! Ordered fallback chain over dataset sources.
//!
//! # Responsibility
//! - Try each configured source in priority order; the first success wins.
//! - Report every attempt so callers can tell why earlier steps were skipped.
//! - Optionally write a static-file dataset back into the persistent store.
//!
//! # Invariants
//! - A resolved dataset never holds more than `dataset_cap` records.
//! - Sources after the winning one are never touched.
//! - Store seeding failures are logged and never change the result.

use crate::config::DashboardConfig;
use crate::model::dataset::{Dataset, Provenance};
use crate::source::remote::RemoteSource;
use crate::source::store::persist_dataset;
use crate::source::{DataSource, SourceError, StaticFileSource, StoreSource, SyntheticSource};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Instant;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result of one source in the chain.
#[derive(Debug)]
pub enum AttemptOutcome {
    Loaded { records: usize, skipped: usize },
    Failed(SourceError),
}

#[derive(Debug)]
pub struct SourceAttempt {
    pub source_id: String,
    pub provenance: Provenance,
    pub outcome: AttemptOutcome,
}

impl SourceAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Loaded { .. })
    }

    pub fn error(&self) -> Option<&SourceError> {
        match &self.outcome {
            AttemptOutcome::Failed(err) => Some(err),
            AttemptOutcome::Loaded { .. } => None,
        }
    }
}

/// Successful resolution: the dataset plus the path taken to reach it.
#[derive(Debug)]
pub struct Resolution {
    pub dataset: Dataset,
    pub attempts: Vec<SourceAttempt>,
}

/// Fatal provider outcomes; both indicate a configuration problem.
#[derive(Debug)]
pub enum ProviderError {
    NoSources,
    AllSourcesExhausted { attempts: Vec<SourceAttempt> },
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSources => write!(f, "no dataset sources are configured"),
            Self::AllSourcesExhausted { attempts } => {
                write!(f, "all {} dataset sources failed", attempts.len())?;
                for attempt in attempts {
                    if let Some(err) = attempt.error() {
                        write!(f, "; {}: {err}", attempt.source_id)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl Error for ProviderError {}

/// Resolves one dataset from an ordered list of sources.
pub struct DataProvider {
    sources: Vec<Box<dyn DataSource>>,
    dataset_cap: usize,
    store_seed: Option<PathBuf>,
}

impl DataProvider {
    pub fn new(dataset_cap: usize) -> Self {
        Self {
            sources: Vec::new(),
            dataset_cap: dataset_cap.max(1),
            store_seed: None,
        }
    }

    pub fn with_sources(dataset_cap: usize, sources: Vec<Box<dyn DataSource>>) -> Self {
        Self {
            sources,
            ..Self::new(dataset_cap)
        }
    }

    /// Builds the standard chain: store, static file, remote API, synthetic.
    ///
    /// Store and remote steps are omitted when their path/URL is unset.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let mut provider = Self::new(config.dataset_size_cap);

        if let Some(path) = &config.store.path {
            provider.push(StoreSource::new(path.clone()));
            if config.store.seed_from_static {
                provider.store_seed = Some(path.clone());
            }
        }
        if !config.static_file.paths.is_empty() {
            provider.push(StaticFileSource::new(config.static_file.paths.clone()));
        }
        if let Some(request) = config.remote.to_request() {
            provider.push(RemoteSource::new(request));
        }
        let synthetic = if config.synthetic.enabled {
            SyntheticSource::new(config.synthetic.count, config.synthetic.seed)
        } else {
            SyntheticSource::disabled()
        };
        provider.push(synthetic);

        provider
    }

    /// Appends a source with the lowest priority so far.
    pub fn push(&mut self, source: impl DataSource + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Writes static-file datasets into the store at `path` after resolution.
    pub fn seed_store_at(&mut self, path: impl Into<PathBuf>) {
        self.store_seed = Some(path.into());
    }

    pub fn dataset_cap(&self) -> usize {
        self.dataset_cap
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.source_id()).collect()
    }

    /// Walks the chain and returns the first dataset any source supplies.
    ///
    /// # Errors
    /// - `NoSources` when the chain is empty.
    /// - `AllSourcesExhausted` when every source failed.
    pub fn resolve(&self) -> ProviderResult<Resolution> {
        if self.sources.is_empty() {
            return Err(ProviderError::NoSources);
        }

        let started_at = Instant::now();
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let attempt_started = Instant::now();
            let source_id = source.source_id().to_string();
            let provenance = source.provenance();

            match source.load(self.dataset_cap) {
                Ok(dataset) => {
                    let dataset = dataset.truncated(self.dataset_cap);
                    info!(
                        "event=source_attempt module=provider source={} status=ok records={} skipped={} duration_ms={}",
                        source_id,
                        dataset.len(),
                        dataset.skipped(),
                        attempt_started.elapsed().as_millis()
                    );
                    attempts.push(SourceAttempt {
                        source_id,
                        provenance,
                        outcome: AttemptOutcome::Loaded {
                            records: dataset.len(),
                            skipped: dataset.skipped(),
                        },
                    });

                    self.seed_store(&dataset);
                    info!(
                        "event=dataset_resolved module=provider status=ok provenance={} records={} attempts={} duration_ms={}",
                        dataset.provenance(),
                        dataset.len(),
                        attempts.len(),
                        started_at.elapsed().as_millis()
                    );
                    return Ok(Resolution { dataset, attempts });
                }
                Err(err) => {
                    warn!(
                        "event=source_attempt module=provider source={} status=error error_code={} duration_ms={} error={}",
                        source_id,
                        err.code(),
                        attempt_started.elapsed().as_millis(),
                        err
                    );
                    attempts.push(SourceAttempt {
                        source_id,
                        provenance,
                        outcome: AttemptOutcome::Failed(err),
                    });
                }
            }
        }

        error!(
            "event=dataset_resolved module=provider status=error attempts={} duration_ms={}",
            attempts.len(),
            started_at.elapsed().as_millis()
        );
        Err(ProviderError::AllSourcesExhausted { attempts })
    }

    fn seed_store(&self, dataset: &Dataset) {
        let Some(path) = &self.store_seed else {
            return;
        };
        if dataset.provenance() != Provenance::StaticFile {
            return;
        }
        if let Err(err) = persist_dataset(path, dataset) {
            warn!(
                "event=store_seeded module=provider status=error path={} error_code={} error={}",
                path.display(),
                err.code(),
                err
            );
        }
    }
}
