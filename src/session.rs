//! The prompt loop behind the `bikeshare-explorer` binary.
//!
//! [`Session`] is generic over its input and output so tests can drive it with in-memory
//! buffers. Each pass lists the available city files, asks for a city, month and day, offers to
//! page through raw rows, prints every statistics category and saves the figures. A failed pass is
//! reported and the restart prompt is still offered.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::TripResult;
use crate::execution::{AnalysisEngine, AnalysisReport};
use crate::ingestion::{file_names, list_csv_files, load_with_options, resolve_city_file, LoadOptions};
use crate::plot::save_figure_png;
use crate::processing::{filter_trips, Figure, FilterSpec};
use crate::report::{raw_rows, render_figure, render_report, save_figure};
use crate::types::TripTable;

type Saver = fn(&Figure, &Path) -> TripResult<PathBuf>;

const CITY_PROMPT: &str = "Please enter the city csv file you want to analyze from the list above: ";
const MONTH_PROMPT: &str =
    "Please enter the month you want to analyze (all, january, february, ... , december): ";
const DAY_PROMPT: &str =
    "Please enter the day of the week you want to analyze (all, monday, tuesday, ... sunday): ";
const RESTART_PROMPT: &str = "\nWould you like to restart? Enter yes or no.\n";

/// Where to read trips from and where figures go.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Write figure JSON and PNG files after each analysis.
    pub save_figures: bool,
    /// Raw rows shown per "next rows" answer.
    pub page_size: usize,
    /// Widest histogram bar, in characters.
    pub histogram_width: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            save_figures: true,
            page_size: 5,
            histogram_width: 40,
        }
    }
}

pub struct Session<R, W> {
    input: R,
    output: W,
    config: SessionConfig,
    load_options: LoadOptions,
    engine: AnalysisEngine,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, config: SessionConfig) -> Self {
        Self {
            input,
            output,
            config,
            load_options: LoadOptions::default(),
            engine: AnalysisEngine::default(),
        }
    }

    pub fn with_load_options(mut self, load_options: LoadOptions) -> Self {
        self.load_options = load_options;
        self
    }

    pub fn with_engine(mut self, engine: AnalysisEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the interactive loop until the user declines to restart or input ends.
    ///
    /// Errors within a pass are printed, not returned; only failures to write the prompts
    /// themselves end the session with an error.
    pub fn run(&mut self) -> TripResult<()> {
        loop {
            match self.interactive_pass() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    log::warn!("analysis pass failed: {e}");
                    writeln!(self.output, "\nError: {e}")?;
                }
            }

            match self.prompt(RESTART_PROMPT)? {
                Some(answer) if answer.eq_ignore_ascii_case("yes") => {}
                _ => return Ok(()),
            }
        }
    }

    /// Analyse one city file with the given filters, without prompting.
    pub fn run_once(&mut self, city: &str, month: &str, day: &str) -> TripResult<AnalysisReport> {
        let files = list_csv_files(&self.config.data_dir)?;
        let path = resolve_city_file(city, &files)?;
        let spec = FilterSpec::parse(month, day)?;
        let table = self.load_filtered(&path, &spec)?;
        self.analyze(&table)
    }

    /// One prompt-load-analyse pass. `Ok(false)` means the input ended.
    fn interactive_pass(&mut self) -> TripResult<bool> {
        let files = list_csv_files(&self.config.data_dir)?;
        writeln!(self.output, "Available CSV files:")?;
        for name in file_names(&files) {
            writeln!(self.output, "  {name}")?;
        }

        let Some(city) = self.prompt(CITY_PROMPT)? else {
            return Ok(false);
        };
        let path = resolve_city_file(&city, &files)?;
        let Some(month) = self.prompt(MONTH_PROMPT)? else {
            return Ok(false);
        };
        let Some(day) = self.prompt(DAY_PROMPT)? else {
            return Ok(false);
        };
        let spec = FilterSpec::parse(&month, &day)?;

        let table = self.load_filtered(&path, &spec)?;
        if !self.page_rows(&table)? {
            return Ok(false);
        }
        self.analyze(&table)?;
        Ok(true)
    }

    fn load_filtered(&mut self, path: &Path, spec: &FilterSpec) -> TripResult<TripTable> {
        let table = load_with_options(path, &self.load_options)?;
        let filtered = filter_trips(&table, spec)?;
        writeln!(self.output, "Data loaded successfully from {}.", path.display())?;
        writeln!(
            self.output,
            "{} of {} trips match {spec}; {} columns.",
            filtered.row_count(),
            table.row_count(),
            filtered.schema.columns().count()
        )?;
        Ok(filtered)
    }

    /// Offer raw rows a page at a time. `Ok(false)` means the input ended.
    fn page_rows(&mut self, table: &TripTable) -> TripResult<bool> {
        let page = self.config.page_size.max(1);
        let question = format!("Would you like to display the next {page} rows of the data? (yes/no): ");
        let mut offset = 0;
        while offset < table.row_count() {
            match self.prompt(&question)? {
                None => return Ok(false),
                Some(answer) if is_yes(&answer) => {
                    write!(self.output, "{}", raw_rows(table, offset, page))?;
                    offset += page;
                }
                Some(_) => break,
            }
        }
        Ok(true)
    }

    fn analyze(&mut self, table: &TripTable) -> TripResult<AnalysisReport> {
        let report = self.engine.run(table)?;
        write!(self.output, "{}", render_report(&report))?;

        for figure in &report.figures {
            write!(
                self.output,
                "\n{}",
                render_figure(figure, self.config.histogram_width)
            )?;
            if self.config.save_figures {
                self.save_artifacts(figure)?;
            }
        }
        Ok(report)
    }

    /// Save the JSON data and PNG image of `figure`. A failed save is reported and skipped.
    fn save_artifacts(&mut self, figure: &Figure) -> TripResult<()> {
        let savers: [(&str, Saver); 2] = [("data", save_figure), ("image", save_figure_png)];
        for (kind, save) in savers {
            match save(figure, &self.config.output_dir) {
                Ok(path) => {
                    writeln!(self.output, "Saved {} {kind} to {}", figure.name, path.display())?
                }
                Err(e) => {
                    log::warn!("could not save {} {kind}: {e}", figure.name);
                    writeln!(self.output, "Warning: could not save {} {kind}: {e}", figure.name)?;
                }
            }
        }
        Ok(())
    }

    /// Print `question` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, question: &str) -> TripResult<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionConfig};
    use crate::error::TripError;
    use std::fs;
    use std::io::Cursor;

    const CHICAGO: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
0,2017-03-03 08:10:00,2017-03-03 08:20:00,600,Canal St,Clark St,Subscriber,Male,1985.0
1,2017-03-10 17:05:00,2017-03-10 17:15:00,600,Canal St,Clark St,Customer,,
2,2017-03-13 08:00:00,2017-03-13 08:30:00,1800,Clark St,Canal St,Subscriber,Female,1990.0
3,2017-04-07 09:00:00,2017-04-07 09:05:00,300,Wells St,Canal St,Subscriber,Male,1979.0
";

    fn workspace() -> (tempfile::TempDir, SessionConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("chicago.csv"), CHICAGO).unwrap();
        let config = SessionConfig {
            data_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            ..SessionConfig::default()
        };
        (dir, config)
    }

    fn drive(config: SessionConfig, input: &str) -> String {
        let mut session = Session::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), config);
        session.run().unwrap();
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn full_pass_prints_stats_and_saves_figures() {
        let (dir, config) = workspace();
        let out = drive(config, "Chicago\nmarch\nall\nyes\nno\n");

        assert!(out.contains("chicago.csv"));
        assert!(out.contains("3 of 4 trips match month=march, day=all"));
        assert!(out.contains("Canal St | Clark St"));
        assert!(out.contains("The most common month is: March"));
        assert!(out.contains("Calculating User Stats..."));
        assert!(out.contains("Earliest year of birth: 1985"));
        assert!(dir.path().join("time_stats.json").exists());
        assert!(dir.path().join("trip_duration_stats.json").exists());
        assert!(dir.path().join("time_stats.png").exists());
        assert!(dir.path().join("trip_duration_stats.png").exists());
    }

    #[test]
    fn failed_save_is_reported_and_later_figures_still_saved() {
        let (dir, config) = workspace();
        fs::create_dir(dir.path().join("time_stats.json")).unwrap();
        let mut session = Session::new(Cursor::new(Vec::new()), Vec::new(), config);

        let report = session.run_once("chicago", "all", "all").unwrap();
        assert_eq!(report.rows, 4);

        let out = String::from_utf8(session.into_output()).unwrap();
        assert!(out.contains("Warning: could not save time_stats data"));
        assert!(out.contains("Saved time_stats image to"));
        assert!(out.contains("Calculating User Stats..."));
        assert!(dir.path().join("time_stats.png").exists());
        assert!(dir.path().join("trip_duration_stats.json").is_file());
    }

    #[test]
    fn invalid_month_is_reported_and_restart_offered() {
        let (_dir, config) = workspace();
        let out = drive(config, "chicago\nsmarch\nall\nno\n");

        assert!(out.contains("Error: invalid month 'smarch'"));
        assert!(out.contains("Would you like to restart?"));
        assert!(!out.contains("Calculating"));
    }

    #[test]
    fn restart_runs_another_pass() {
        let (_dir, mut config) = workspace();
        config.save_figures = false;
        let out = drive(config, "chicago\nall\nfriday\nno\nyes\nchicago\napril\nall\nno\nno\n");

        assert_eq!(out.matches("Calculating Trip Duration...").count(), 2);
        assert!(out.contains("3 of 4 trips match month=all, day=friday"));
        assert!(out.contains("1 of 4 trips match month=april, day=all"));
    }

    #[test]
    fn end_of_input_stops_quietly() {
        let (_dir, config) = workspace();
        let out = drive(config, "chicago\n");
        assert!(out.ends_with(super::MONTH_PROMPT));
    }

    #[test]
    fn run_once_surfaces_empty_result() {
        let (_dir, mut config) = workspace();
        config.save_figures = false;
        let mut session = Session::new(Cursor::new(Vec::new()), Vec::new(), config);

        let err = session.run_once("chicago", "december", "all").unwrap_err();
        assert!(matches!(err, TripError::EmptyResult { .. }));

        let report = session.run_once("chicago", "march", "friday").unwrap();
        assert_eq!(report.rows, 2);
    }
}
