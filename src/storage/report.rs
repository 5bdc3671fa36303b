//! Streamed analysis results.
//!
//! Every recognition analysis streams one row per scored tracker into an
//! append-mode CSV; a marker row terminates each run, so several analyses
//! accumulate in one file and stay separable. The file is opened lazily and
//! the header is written only when the file starts out empty.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Header of an analysis report file.
pub const REPORT_HEADER: &str = "pattern;tracker;likelihood;threshold;passed";

/// Marker row terminating one analysis run.
pub const RUN_MARKER: &str = "end";

/// Append-mode sink for per-tracker likelihood rows.
#[derive(Debug)]
pub struct AnalysisReport {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl AnalysisReport {
    pub fn new(path: PathBuf) -> Self {
        Self { path, file: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one scored tracker's row.
    pub fn record(
        &mut self,
        pattern: &str,
        tracker: &str,
        likelihood: f64,
        threshold: f64,
        passed: bool,
    ) -> crate::Result<()> {
        self.ensure_open()?;
        if let Some(file) = self.file.as_mut() {
            writeln!(
                file,
                "{};{};{};{};{}",
                pattern, tracker, likelihood, threshold, passed
            )?;
        }
        Ok(())
    }

    /// Terminate the current analysis run with a marker row and flush.
    pub fn finish_run(&mut self) -> crate::Result<()> {
        self.ensure_open()?;
        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", RUN_MARKER)?;
            file.flush()?;
        }
        Ok(())
    }

    fn ensure_open(&mut self) -> crate::Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);
        if needs_header {
            writeln!(writer, "{}", REPORT_HEADER)?;
        }
        self.file = Some(writer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rows_and_marker_are_written() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("analysis.csv");
        let mut report = AnalysisReport::new(path.clone());

        report
            .record("warrior", "head", -0.5, -1.0, true)
            .expect("Record should succeed");
        report
            .record("warrior", "hip", -2.0, -1.0, false)
            .expect("Record should succeed");
        report.finish_run().expect("Finish should succeed");

        let content = std::fs::read_to_string(&path).expect("Report should exist");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                REPORT_HEADER,
                "warrior;head;-0.5;-1;true",
                "warrior;hip;-2;-1;false",
                RUN_MARKER,
            ]
        );
    }

    #[test]
    fn test_runs_accumulate_under_one_header() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("analysis.csv");

        let mut first = AnalysisReport::new(path.clone());
        first
            .record("warrior", "head", -0.5, -1.0, true)
            .expect("Record should succeed");
        first.finish_run().expect("Finish should succeed");
        drop(first);

        let mut second = AnalysisReport::new(path.clone());
        second.finish_run().expect("Finish should succeed");
        drop(second);

        let content = std::fs::read_to_string(&path).expect("Report should exist");
        let headers = content.lines().filter(|l| *l == REPORT_HEADER).count();
        let markers = content.lines().filter(|l| *l == RUN_MARKER).count();
        assert_eq!(headers, 1);
        assert_eq!(markers, 2);
    }

    #[test]
    fn test_marker_alone_still_creates_file() {
        // An analysis with zero scorable trackers still terminates its run
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("analysis.csv");
        let mut report = AnalysisReport::new(path.clone());

        report.finish_run().expect("Finish should succeed");

        let content = std::fs::read_to_string(&path).expect("Report should exist");
        assert_eq!(content.lines().collect::<Vec<_>>(), vec![REPORT_HEADER, RUN_MARKER]);
    }

    #[test]
    fn test_parent_directories_are_created() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("deep").join("analysis.csv");
        let mut report = AnalysisReport::new(path.clone());

        report
            .record("warrior", "head", 0.0, -1.0, true)
            .expect("Record should succeed");
        report.finish_run().expect("Finish should succeed");

        assert!(path.exists());
    }
}
