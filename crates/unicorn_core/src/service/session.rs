//! Dashboard session: the current dataset, the selected style and the
//! auto-refresh schedule.
//!
//! # Responsibility
//! - Resolve datasets through `DataProvider` on demand or on schedule.
//! - Map the current dataset with the selected style.
//!
//! # Invariants
//! - At most one resolution runs at a time; overlapping requests are skipped.
//! - A failed refresh keeps the previously loaded dataset.
//! - State is never locked while a resolution is running.

use crate::config::DashboardConfig;
use crate::layout::{map, CoordinateSet, LayoutError, LayoutParams, StyleTag};
use crate::model::dataset::{Dataset, Provenance};
use crate::service::data_provider::{DataProvider, ProviderError, SourceAttempt};
use crate::service::overview::DatasetOverview;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    /// Another refresh is still resolving.
    RefreshInFlight,
    Provider(ProviderError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RefreshInFlight => write!(f, "a dataset refresh is already in progress"),
            Self::Provider(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RefreshInFlight => None,
            Self::Provider(err) => Some(err),
        }
    }
}

impl From<ProviderError> for SessionError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

/// What a successful refresh loaded.
#[derive(Debug)]
pub struct RefreshReport {
    pub provenance: Provenance,
    pub records: usize,
    pub skipped: usize,
    pub attempts: Vec<SourceAttempt>,
}

/// Result of one scheduler tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// No refresh interval is configured.
    Disabled,
    NotDue,
    /// Due, but a previous refresh is still running.
    Skipped,
    Refreshed(RefreshReport),
    Failed(ProviderError),
}

/// Fixed-interval schedule measured from the last refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    interval: Option<Duration>,
    last_attempt: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval: interval.filter(|interval| !interval.is_zero()),
            last_attempt: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }

    /// Due when enabled and either never run or the interval has elapsed.
    pub fn is_due(&self, now: Instant) -> bool {
        match (self.interval, self.last_attempt) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
        }
    }

    pub fn mark_attempt(&mut self, at: Instant) {
        self.last_attempt = Some(at);
    }
}

struct SessionState {
    dataset: Option<Dataset>,
    style: StyleTag,
    schedule: RefreshSchedule,
    last_error: Option<String>,
}

/// Clears the in-flight flag when the resolution ends, even on panic.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One dashboard view over a data provider.
///
/// Shareable across threads, so a timer thread can `tick` while the UI
/// thread reads coordinates.
pub struct DashboardSession {
    provider: DataProvider,
    params: LayoutParams,
    in_flight: AtomicBool,
    state: Mutex<SessionState>,
}

impl DashboardSession {
    /// # Errors
    /// - `LayoutError` when `config.layout` fails `LayoutParams::validate`.
    pub fn new(config: &DashboardConfig, provider: DataProvider) -> Result<Self, LayoutError> {
        config.layout.validate()?;
        Ok(Self {
            provider,
            params: config.layout.clone(),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                dataset: None,
                style: config.style,
                schedule: RefreshSchedule::new(config.refresh_interval()),
                last_error: None,
            }),
        })
    }

    /// Session over the standard source chain described by `config`.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, LayoutError> {
        Self::new(config, DataProvider::from_config(config))
    }

    /// Resolves a new dataset and replaces the current one.
    ///
    /// # Errors
    /// - `RefreshInFlight` when another refresh is running.
    /// - `Provider` when every source failed; the old dataset is kept.
    pub fn refresh(&self) -> SessionResult<RefreshReport> {
        let _guard =
            InFlightGuard::acquire(&self.in_flight).ok_or(SessionError::RefreshInFlight)?;
        self.run_refresh(Instant::now())
    }

    /// Refreshes when the schedule is due and nothing is in flight.
    pub fn tick(&self, now: Instant) -> TickOutcome {
        {
            let state = self.lock_state();
            if !state.schedule.is_enabled() {
                return TickOutcome::Disabled;
            }
            if !state.schedule.is_due(now) {
                return TickOutcome::NotDue;
            }
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("event=session_tick module=session status=skipped reason=in_flight");
            return TickOutcome::Skipped;
        };
        match self.run_refresh(now) {
            Ok(report) => TickOutcome::Refreshed(report),
            Err(SessionError::Provider(err)) => TickOutcome::Failed(err),
            Err(SessionError::RefreshInFlight) => TickOutcome::Skipped,
        }
    }

    /// Runs one resolution; the caller must hold the in-flight guard.
    fn run_refresh(&self, now: Instant) -> SessionResult<RefreshReport> {
        self.lock_state().schedule.mark_attempt(now);
        let outcome = self.provider.resolve();

        let mut state = self.lock_state();
        match outcome {
            Ok(resolution) => {
                let dataset = resolution.dataset;
                let report = RefreshReport {
                    provenance: dataset.provenance(),
                    records: dataset.len(),
                    skipped: dataset.skipped(),
                    attempts: resolution.attempts,
                };
                info!(
                    "event=session_refresh module=session status=ok provenance={} records={} skipped={}",
                    report.provenance, report.records, report.skipped
                );
                state.dataset = Some(dataset);
                state.last_error = None;
                Ok(report)
            }
            Err(err) => {
                warn!(
                    "event=session_refresh module=session status=error kept_previous={} error={}",
                    state.dataset.is_some(),
                    err
                );
                state.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn select_style(&self, style: StyleTag) {
        self.lock_state().style = style;
    }

    pub fn style(&self) -> StyleTag {
        self.lock_state().style
    }

    pub fn layout_params(&self) -> &LayoutParams {
        &self.params
    }

    /// Clone of the current dataset, `None` before the first successful refresh.
    pub fn dataset(&self) -> Option<Dataset> {
        self.lock_state().dataset.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Maps the current dataset with the selected style; empty before any data.
    pub fn coordinates(&self) -> CoordinateSet {
        let state = self.lock_state();
        match &state.dataset {
            Some(dataset) => map(dataset, state.style, &self.params),
            None => CoordinateSet::empty(state.style),
        }
    }

    pub fn overview(&self) -> Option<DatasetOverview> {
        self.lock_state()
            .dataset
            .as_ref()
            .map(DatasetOverview::from_dataset)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
