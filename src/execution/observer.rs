use std::fmt;
use std::time::Duration;

/// One step of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TimeStats,
    StationStats,
    DurationStats,
    UserStats,
    TimeFigure,
    DurationFigure,
}

impl Stage {
    /// Stages in the order the engine runs them.
    pub const ALL: [Stage; 6] = [
        Stage::TimeStats,
        Stage::StationStats,
        Stage::DurationStats,
        Stage::UserStats,
        Stage::TimeFigure,
        Stage::DurationFigure,
    ];

    /// Banner printed before the stage's output.
    pub fn banner(self) -> &'static str {
        match self {
            Stage::TimeStats => "Calculating The Most Frequent Times of Travel...",
            Stage::StationStats => "Calculating The Most Popular Stations and Trip...",
            Stage::DurationStats => "Calculating Trip Duration...",
            Stage::UserStats => "Calculating User Stats...",
            Stage::TimeFigure => "Bucketing month, weekday and hour distributions...",
            Stage::DurationFigure => "Bucketing trip duration distribution...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::TimeStats => "time_stats",
            Stage::StationStats => "station_stats",
            Stage::DurationStats => "duration_stats",
            Stage::UserStats => "user_stats",
            Stage::TimeFigure => "time_figure",
            Stage::DurationFigure => "duration_figure",
        };
        f.write_str(name)
    }
}

/// Events emitted by the analysis engine.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    RunStarted { rows: usize },
    StageStarted { stage: Stage },
    StageFinished { stage: Stage, elapsed: Duration },
    StageSkipped { stage: Stage, reason: String },
    RunFinished {
        elapsed: Duration,
        completed: usize,
        skipped: usize,
    },
}

/// Observer hook for analysis events.
pub trait AnalysisObserver: Send + Sync {
    fn on_event(&self, event: &AnalysisEvent);
}

/// A simple stderr logger for analysis events.
#[derive(Debug, Default)]
pub struct StdErrAnalysisObserver;

impl AnalysisObserver for StdErrAnalysisObserver {
    fn on_event(&self, event: &AnalysisEvent) {
        eprintln!("{event:?}");
    }
}

/// Forwards analysis events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogAnalysisObserver;

impl AnalysisObserver for LogAnalysisObserver {
    fn on_event(&self, event: &AnalysisEvent) {
        match event {
            AnalysisEvent::RunStarted { rows } => log::debug!("analysis started over {rows} trips"),
            AnalysisEvent::StageStarted { stage } => log::debug!("{stage} started"),
            AnalysisEvent::StageFinished { stage, elapsed } => {
                log::debug!("{stage} finished in {:.1} ms", elapsed.as_secs_f64() * 1000.0)
            }
            AnalysisEvent::StageSkipped { stage, reason } => log::warn!("{stage} skipped: {reason}"),
            AnalysisEvent::RunFinished {
                elapsed,
                completed,
                skipped,
            } => log::info!(
                "analysis finished: {completed} stage(s) completed, {skipped} skipped, {:.1} ms",
                elapsed.as_secs_f64() * 1000.0
            ),
        }
    }
}
