//! Analysis engine: runs every statistics category and histogram figure over one table.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Skip-and-continue handling for categories the dataset cannot support
//! - Per-stage timings
//! - Observer hooks for logging

mod observer;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{TripError, TripResult};
use crate::processing::{
    duration_figure, duration_stats, station_stats, time_figure, time_stats, user_stats, DurationStats,
    Figure, StationStats, TimeStats, UserStats,
};
use crate::types::TripTable;

pub use observer::{
    AnalysisEvent, AnalysisObserver, LogAnalysisObserver, Stage, StdErrAnalysisObserver,
};

/// Configuration for the [`AnalysisEngine`].
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Compute the `time_stats` and `trip_duration_stats` figures.
    pub figures: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self { figures: true }
    }
}

/// A stage that did not produce a result, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedStage {
    pub stage: Stage,
    pub reason: String,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Rows in the analysed table.
    pub rows: usize,
    pub time: Option<TimeStats>,
    pub stations: Option<StationStats>,
    pub durations: Option<DurationStats>,
    pub users: Option<UserStats>,
    pub figures: Vec<Figure>,
    pub skipped: Vec<SkippedStage>,
    /// Wall time of each completed stage, in run order.
    pub timings: Vec<(Stage, Duration)>,
}

impl AnalysisReport {
    fn new(rows: usize) -> Self {
        Self {
            rows,
            time: None,
            stations: None,
            durations: None,
            users: None,
            figures: Vec::new(),
            skipped: Vec::new(),
            timings: Vec::new(),
        }
    }

    pub fn elapsed(&self, stage: Stage) -> Option<Duration> {
        self.timings.iter().find(|(s, _)| *s == stage).map(|(_, d)| *d)
    }

    pub fn skip_reason(&self, stage: Stage) -> Option<&str> {
        self.skipped
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.reason.as_str())
    }
}

/// Runs the statistics categories and figures over a filtered [`TripTable`].
#[derive(Default)]
pub struct AnalysisEngine {
    opts: AnalysisOptions,
    observer: Option<Arc<dyn AnalysisObserver>>,
}

impl AnalysisEngine {
    pub fn new(opts: AnalysisOptions) -> Self {
        Self {
            opts,
            observer: None,
        }
    }

    /// Attach an observer for analysis events.
    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run every stage.
    ///
    /// Stages failing with [`TripError::MissingColumn`] or [`TripError::InsufficientData`] are
    /// recorded in [`AnalysisReport::skipped`]; any other error aborts the run.
    pub fn run(&self, table: &TripTable) -> TripResult<AnalysisReport> {
        let start = Instant::now();
        self.emit(AnalysisEvent::RunStarted {
            rows: table.row_count(),
        });

        let mut report = AnalysisReport::new(table.row_count());

        let time = self.stage(&mut report, Stage::TimeStats, || time_stats(table))?;
        let stations = self.stage(&mut report, Stage::StationStats, || station_stats(table))?;
        let durations = self.stage(&mut report, Stage::DurationStats, || duration_stats(table))?;
        let users = self.stage(&mut report, Stage::UserStats, || user_stats(table))?;
        report.time = time;
        report.stations = stations;
        report.durations = durations;
        report.users = users;

        if self.opts.figures {
            if let Some(fig) = self.stage(&mut report, Stage::TimeFigure, || time_figure(table))? {
                report.figures.push(fig);
            }
            match report.durations.clone() {
                Some(stats) => {
                    if let Some(fig) =
                        self.stage(&mut report, Stage::DurationFigure, || duration_figure(table, &stats))?
                    {
                        report.figures.push(fig);
                    }
                }
                None => self.skip(
                    &mut report,
                    Stage::DurationFigure,
                    "trip duration statistics unavailable".to_string(),
                ),
            }
        }

        self.emit(AnalysisEvent::RunFinished {
            elapsed: start.elapsed(),
            completed: report.timings.len(),
            skipped: report.skipped.len(),
        });
        Ok(report)
    }

    fn stage<T, F>(&self, report: &mut AnalysisReport, stage: Stage, f: F) -> TripResult<Option<T>>
    where
        F: FnOnce() -> TripResult<T>,
    {
        self.emit(AnalysisEvent::StageStarted { stage });
        let start = Instant::now();
        match f() {
            Ok(value) => {
                let elapsed = start.elapsed();
                report.timings.push((stage, elapsed));
                self.emit(AnalysisEvent::StageFinished { stage, elapsed });
                Ok(Some(value))
            }
            Err(e) if skippable(&e) => {
                self.skip(report, stage, e.to_string());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn skip(&self, report: &mut AnalysisReport, stage: Stage, reason: String) {
        self.emit(AnalysisEvent::StageSkipped {
            stage,
            reason: reason.clone(),
        });
        report.skipped.push(SkippedStage { stage, reason });
    }

    fn emit(&self, event: AnalysisEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn skippable(e: &TripError) -> bool {
    e.is_recoverable() || matches!(e, TripError::InsufficientData { .. })
}

#[cfg(test)]
mod tests {
    use super::{AnalysisEngine, AnalysisEvent, AnalysisObserver, AnalysisOptions, Stage};
    use std::sync::{Arc, Mutex};

    use crate::types::{Column, TripRecord, TripSchema, TripTable};
    use chrono::NaiveDate;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<AnalysisEvent>>,
    }

    impl AnalysisObserver for RecordingObserver {
        fn on_event(&self, event: &AnalysisEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn trip(day: u32, seconds: f64) -> TripRecord {
        TripRecord {
            trip_duration: Some(seconds),
            start_station: Some("Canal St".to_string()),
            end_station: Some("Clark St".to_string()),
            ..TripRecord::new(
                NaiveDate::from_ymd_opt(2017, 5, day)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
            )
        }
    }

    fn table_without_users() -> TripTable {
        TripTable::new(
            TripSchema::new([Column::TripDuration, Column::StartStation, Column::EndStation]),
            vec![trip(1, 300.0), trip(2, 600.0), trip(3, 900.0)],
        )
    }

    #[test]
    fn missing_user_type_skips_only_user_stats() {
        let report = AnalysisEngine::default().run(&table_without_users()).unwrap();

        assert!(report.time.is_some());
        assert!(report.stations.is_some());
        assert!(report.durations.is_some());
        assert!(report.users.is_none());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skip_reason(Stage::UserStats).unwrap().contains("User Type"));
        assert_eq!(report.figures.len(), 2);
        assert!(report.elapsed(Stage::TimeStats).is_some());
    }

    #[test]
    fn single_row_skips_duration_and_its_figure() {
        let table = TripTable::new(TripSchema::full(), vec![trip(1, 300.0)]);
        let report = AnalysisEngine::default().run(&table).unwrap();

        assert!(report.durations.is_none());
        assert!(report.skip_reason(Stage::DurationStats).is_some());
        assert!(report.skip_reason(Stage::DurationFigure).is_some());
        assert_eq!(report.figures.len(), 1);
    }

    #[test]
    fn figures_can_be_disabled() {
        let engine = AnalysisEngine::new(AnalysisOptions { figures: false });
        let report = engine.run(&table_without_users()).unwrap();
        assert!(report.figures.is_empty());
        assert!(report.elapsed(Stage::TimeFigure).is_none());
    }

    #[test]
    fn observer_sees_every_stage() {
        let obs = Arc::new(RecordingObserver::default());
        let engine = AnalysisEngine::default().with_observer(obs.clone());
        let _ = engine.run(&table_without_users()).unwrap();

        let events = obs.events.lock().unwrap().clone();
        assert_eq!(events.first(), Some(&AnalysisEvent::RunStarted { rows: 3 }));
        assert!(matches!(
            events.last(),
            Some(AnalysisEvent::RunFinished {
                completed: 5,
                skipped: 1,
                ..
            })
        ));
        for stage in Stage::ALL {
            assert!(events.contains(&AnalysisEvent::StageStarted { stage }));
        }
        assert!(events.iter().any(|e| matches!(
            e,
            AnalysisEvent::StageSkipped {
                stage: Stage::UserStats,
                ..
            }
        )));
    }
}
