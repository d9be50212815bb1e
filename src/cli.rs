//! Text menu front-end for the query engine
//!
//! Reads commands line by line and renders results as text, or as JSON when
//! `OutputFormat::Json` is selected (`SENSORLOG_FORMAT=json`).

use std::io::{self, BufRead, Write};

use serde_json::json;

use crate::data::TimeIndex;
use crate::query::{QueryEngine, QueryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_env() -> Self {
        match std::env::var("SENSORLOG_FORMAT").as_deref() {
            Ok("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Interactive menu over a query engine
pub struct Cli<'a, R, W> {
    engine: &'a mut QueryEngine,
    input: R,
    output: W,
    format: OutputFormat,
}

impl<'a, R: BufRead, W: Write> Cli<'a, R, W> {
    pub fn new(engine: &'a mut QueryEngine, input: R, output: W) -> Self {
        Self {
            engine,
            input,
            output,
            format: OutputFormat::Text,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the menu loop until `q` or end of input
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "Select an option (q to quit):")?;
            writeln!(self.output)?;
            writeln!(self.output, "1. Get Summary Data")?;
            writeln!(self.output, "2. Search Data")?;
            writeln!(self.output, "3. Read Data")?;
            writeln!(self.output)?;

            let choice = match self.prompt("Action: ")? {
                Some(choice) => choice,
                None => return Ok(()),
            };

            match choice.as_str() {
                "1" => self.summary()?,
                "2" => self.search()?,
                "3" => self.read()?,
                "q" | "quit" | "exit" => return Ok(()),
                _ => writeln!(self.output, "Invalid input")?,
            }
        }
    }

    fn summary(&mut self) -> io::Result<()> {
        match self.engine.summary() {
            Ok(stats) => match self.format {
                OutputFormat::Text => writeln!(self.output, "{}", stats.render()),
                OutputFormat::Json => writeln!(self.output, "{}", serde_json::to_string_pretty(&stats)?),
            },
            Err(e) => self.report_error(&e),
        }
    }

    fn search(&mut self) -> io::Result<()> {
        let Some(field) = self.prompt("Field name: ")? else {
            return Ok(());
        };
        let Some(value) = self.prompt("Value: ")? else {
            return Ok(());
        };

        loop {
            match self.engine.search(&field, &value) {
                Ok(hit) => {
                    match self.format {
                        OutputFormat::Text => writeln!(self.output, "{}", hit)?,
                        OutputFormat::Json => writeln!(
                            self.output,
                            "{}",
                            json!({ "timestamp": hit.millis(), "time": hit.to_string() })
                        )?,
                    }
                    if !self.wait_for_continue()? {
                        break;
                    }
                }
                Err(e) if e.is_no_more_data() => {
                    writeln!(self.output, "End of data points.")?;
                    break;
                }
                Err(e) => {
                    self.report_error(&e)?;
                    break;
                }
            }
        }

        self.engine.end_search();
        Ok(())
    }

    fn read(&mut self) -> io::Result<()> {
        let Some(start) = self.prompt("Start time (HH:MM:SS[.fff]): ")? else {
            return Ok(());
        };
        let Some(end) = self.prompt("End time (HH:MM:SS[.fff]): ")? else {
            return Ok(());
        };
        let Some(fields) = self.prompt("Fields (comma separated): ")? else {
            return Ok(());
        };

        let (Some(start), Some(end)) = (TimeIndex::parse(&start), TimeIndex::parse(&end)) else {
            return writeln!(self.output, "Invalid input.");
        };

        let fields: Vec<String> = fields
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if !fields.iter().any(|f| self.engine.schema().contains(f)) {
            return writeln!(self.output, "No valid fields given.");
        }

        loop {
            match self.engine.read(start, end, &fields) {
                Ok(page) => {
                    match self.format {
                        OutputFormat::Text => writeln!(self.output, "{}", page.render())?,
                        OutputFormat::Json => {
                            writeln!(self.output, "{}", serde_json::to_string(&page)?)?
                        }
                    }
                    if !self.wait_for_continue()? {
                        break;
                    }
                }
                Err(e) if e.is_no_more_data() => {
                    writeln!(self.output, "End of data points.")?;
                    break;
                }
                Err(e) => {
                    self.report_error(&e)?;
                    break;
                }
            }
        }

        self.engine.end_read();
        Ok(())
    }

    /// Returns false when the user stops paging or input ends
    fn wait_for_continue(&mut self) -> io::Result<bool> {
        match self.prompt("Press [Enter] to continue, q to stop")? {
            Some(line) => Ok(line != "q"),
            None => Ok(false),
        }
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report_error(&mut self, err: &QueryError) -> io::Result<()> {
        tracing::warn!("Query failed: {}", err);
        writeln!(self.output, "Error: {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Record, Schema, Value, HOUR, MINUTE, SECOND};
    use crate::query::AggregateStats;
    use crate::storage::{BucketRange, BucketStore, Bucketer};
    use tempfile::TempDir;

    const SCHEMA: &str = "hour:integer;minute:integer;second:integer;rpm:integer";

    fn engine(temp_dir: &TempDir, count: i32) -> QueryEngine {
        let store = BucketStore::open(temp_dir.path()).unwrap();
        let base = TimeIndex::of(10, 0, 0).millis();
        let bucketer = Bucketer::new(BucketRange::starting_at(base, 60_000));
        let schema = Schema::parse(SCHEMA).unwrap();
        let mut stats = AggregateStats::empty(schema.clone());
        stats.start_timestamp = base;

        for s in 0..count {
            let record = Record::from_pairs([
                (HOUR, Value::Int(10)),
                (MINUTE, Value::Int(0)),
                (SECOND, Value::Int(s)),
                ("rpm", Value::Int(if s % 2 == 0 { 1000 } else { 2000 })),
            ])
            .unwrap();
            let bucket = bucketer.bucket_index(record.timestamp_millis());
            store.append_record(&record.to_string(), bucket).unwrap();
            stats.observe(record.timestamp_millis());
        }
        store.append_summary(&stats.to_summary_text()).unwrap();
        QueryEngine::new(store, bucketer, schema)
    }

    fn run_session(engine: &mut QueryEngine, input: &str, format: OutputFormat) -> String {
        let mut output = Vec::new();
        Cli::new(engine, input.as_bytes(), &mut output)
            .with_format(format)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_summary_text() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 4);

        let out = run_session(&mut engine, "1\nq\n", OutputFormat::Text);
        assert!(out.contains("records:\n4"));
        assert!(out.contains("start_time:\nhour:10 minute:0 second:0"));
        assert!(out.contains("rpm (integer)"));
    }

    #[test]
    fn test_summary_json() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 2);

        let out = run_session(&mut engine, "1\n", OutputFormat::Json);
        assert!(out.contains("\"count\": 2"));
        assert!(out.contains("\"name\": \"rpm\""));
    }

    #[test]
    fn test_search_until_exhausted() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 4);

        let out = run_session(&mut engine, "2\nrpm\n2000\n\n\n\nq\n", OutputFormat::Text);
        assert!(out.contains("hour:10 minute:0 second:1"));
        assert!(out.contains("hour:10 minute:0 second:3"));
        assert!(out.contains("End of data points."));
    }

    #[test]
    fn test_search_stop_resets_session() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 4);

        run_session(&mut engine, "2\nrpm\n2000\nq\nq\n", OutputFormat::Text);
        // Leaving the flow ended the search, so the next one starts over
        assert_eq!(engine.search("rpm", "2000").unwrap(), TimeIndex::of(10, 0, 1));
    }

    #[test]
    fn test_read_pages() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 12);

        let out = run_session(
            &mut engine,
            "3\n10:00:00\n10:00:59\nsecond,rpm\n\n\nq\n",
            OutputFormat::Text,
        );
        assert!(out.contains("second=0 rpm=1000\nsecond=1 rpm=2000"));
        assert!(out.contains("second=11 rpm=2000"));
        assert!(out.contains("End of data points."));
        assert!(!engine.is_reading());
    }

    #[test]
    fn test_read_rejects_bad_input() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 2);

        let out = run_session(&mut engine, "3\nten\n10:00:01\nrpm\nq\n", OutputFormat::Text);
        assert!(out.contains("Invalid input."));

        let out = run_session(&mut engine, "3\n10:00:00\n10:00:01\nhumidity\nq\n", OutputFormat::Text);
        assert!(out.contains("No valid fields given."));
    }

    #[test]
    fn test_read_inverted_window() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 2);

        let out = run_session(&mut engine, "3\n10:00:05\n10:00:01\nrpm\nq\n", OutputFormat::Text);
        assert!(out.contains("End of data points."));
    }

    #[test]
    fn test_corrupt_bucket_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 2);
        let store = BucketStore::open(temp_dir.path()).unwrap();
        store.append_record("hour:10;minute:0", 0).unwrap();

        let out = run_session(&mut engine, "2\nrpm\n5\nq\n", OutputFormat::Text);
        assert!(out.contains("Error: Malformed record"));
        assert!(!out.contains("End of data points."));
    }

    #[test]
    fn test_invalid_choice() {
        let temp_dir = TempDir::new().unwrap();
        let mut engine = engine(&temp_dir, 1);

        let out = run_session(&mut engine, "7\n", OutputFormat::Text);
        assert!(out.contains("Invalid input"));
    }
}
