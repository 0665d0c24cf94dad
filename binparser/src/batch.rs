/*!
Batch conversion of log files.

Each input `.bin` file is decoded on its own and written as one JSON object
per line to a matching `.json` file in the output directory. A file that
cannot be read or written is logged and skipped; the rest of the batch
continues.
*/

use crate::config::ParserConfig;
use anyhow::{bail, Context, Result};
use neuromask_shared::{Diagnostic, DiagnosticSink, MissingFields, Record, RecordDecoder, TracingSink};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Totals for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub records_written: usize,
    pub records_skipped: usize,
}

/// Totals for one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub records_written: usize,
    pub records_skipped: usize,
}

/// Reader that reports end of stream once the running flag is cleared
struct StopOnFlag<R> {
    inner: R,
    running: Arc<AtomicBool>,
}

impl<R: Read> Read for StopOnFlag<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.running.load(Ordering::SeqCst) {
            return Ok(0);
        }
        self.inner.read(buf)
    }
}

/// Converts every log file found at the input location
pub struct BatchProcessor<S = TracingSink> {
    input: PathBuf,
    output_dir: PathBuf,
    precision: u32,
    missing_fields: MissingFields,
    input_extension: String,
    output_extension: String,
    sink: S,
    running: Arc<AtomicBool>,
}

impl BatchProcessor<TracingSink> {
    pub fn new(config: &ParserConfig) -> Self {
        Self::with_sink(config, TracingSink)
    }
}

impl<S: DiagnosticSink> BatchProcessor<S> {
    /// Create a processor reporting decode diagnostics to `sink`
    pub fn with_sink(config: &ParserConfig, sink: S) -> Self {
        Self {
            input: PathBuf::from(&config.input_directory),
            output_dir: PathBuf::from(&config.output_directory),
            precision: config.float_precision,
            missing_fields: config.missing_fields,
            input_extension: config.input_extension.clone(),
            output_extension: config.output_extension.clone(),
            sink,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get a reference to the running flag for external control
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Process every input file
    pub fn run(&self) -> Result<BatchSummary> {
        let inputs = self.collect_inputs()?;

        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Output dir could not be created: {}", self.output_dir.display())
        })?;

        info!("📂 Found {} input file(s) in {}", inputs.len(), self.input.display());

        let start_time = Instant::now();
        let mut summary = BatchSummary::default();

        for path in inputs {
            if !self.running.load(Ordering::SeqCst) {
                warn!("🛑 Stopped before {}", path.display());
                break;
            }

            match self.process_file(&path) {
                Ok(file_summary) => {
                    summary.files_processed += 1;
                    summary.records_written += file_summary.records_written;
                    summary.records_skipped += file_summary.records_skipped;
                }
                Err(e) => {
                    error!("❌ BIN-file {} failed: {:#}", path.display(), e);
                    summary.files_failed += 1;
                }
            }
        }

        info!("📊 Batch final stats:");
        info!("   Files processed: {}", summary.files_processed);
        info!("   Files failed: {}", summary.files_failed);
        info!("   Records written: {}", summary.records_written);
        info!("   Records skipped: {}", summary.records_skipped);
        info!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

        Ok(summary)
    }

    /// Convert one log file
    pub fn process_file(&self, path: &Path) -> Result<FileSummary> {
        let file = File::open(path)
            .with_context(|| format!("BIN-file {} could not be opened", path.display()))?;

        let decoder = RecordDecoder::with_sink(self.precision, &self.sink);
        let records = decoder
            .decode_reader(StopOnFlag { inner: file, running: Arc::clone(&self.running) })
            .with_context(|| format!("BIN-file {} reading error", path.display()))?;

        if !self.running.load(Ordering::SeqCst) {
            warn!("Reading of {} was interrupted, writing {} complete records", path.display(), records.len());
        }

        let output_path = self.output_path_for(path);
        let file_summary = self
            .write_records(&output_path, &records)
            .with_context(|| format!("JSON-file {} writing error", output_path.display()))?;

        info!(
            "✅ BIN-file {} processed, {} records written to {}",
            path.display(),
            file_summary.records_written,
            output_path.display()
        );

        Ok(file_summary)
    }

    /// Path of the JSON file produced for `input`
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let mut name = input.file_stem().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(&self.output_extension);
        self.output_dir.join(name)
    }

    fn write_records(&self, output_path: &Path, records: &[Record]) -> Result<FileSummary> {
        let mut writer = BufWriter::new(File::create(output_path)?);
        let mut file_summary = FileSummary::default();

        for record in records {
            match record.to_json_line(self.missing_fields) {
                Ok(line) => {
                    writeln!(writer, "{}", line)?;
                    file_summary.records_written += 1;
                }
                Err(e) => {
                    self.sink.report(Diagnostic::Serialization {
                        record_id: record.id(),
                        message: e.to_string(),
                    });
                    file_summary.records_skipped += 1;
                }
            }
        }

        writer.flush()?;
        Ok(file_summary)
    }

    /// Input files, sorted by name. A single file is taken as-is.
    fn collect_inputs(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            bail!("Input dir does not exist: {}", self.input.display());
        }

        let mut inputs = Vec::new();
        let entries = std::fs::read_dir(&self.input)
            .with_context(|| format!("Failed to list input dir: {}", self.input.display()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.input_extension));

            if matches {
                inputs.push(path);
            } else {
                debug!("Skipping {}", path.display());
            }
        }

        inputs.sort();
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuromask_shared::encode::encode_frame;
    use neuromask_shared::MemorySink;
    use tempfile::TempDir;

    fn config_for(input: &Path, output: &Path) -> ParserConfig {
        ParserConfig {
            input_directory: input.display().to_string(),
            output_directory: output.display().to_string(),
            ..ParserConfig::default()
        }
    }

    fn sample_log() -> Vec<u8> {
        let mut data = vec![0x00, 0x13];
        data.extend(encode_frame(1, 1000, &[(0x10, 1.2345), (0x26, 72.0)]).unwrap());
        data.extend(encode_frame(2, 1001, &[(0x99, 5.0), (0x12, 36.6)]).unwrap());
        data
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_directory_batch() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let out_dir = output.path().join("json");

        std::fs::write(input.path().join("session1.bin"), sample_log()).unwrap();
        std::fs::write(input.path().join("SESSION2.BIN"), sample_log()).unwrap();
        std::fs::write(input.path().join("notes.txt"), b"not a log").unwrap();

        let processor = BatchProcessor::with_sink(&config_for(input.path(), &out_dir), MemorySink::new());
        let summary = processor.run().unwrap();

        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.files_failed, 0);
        assert_eq!(summary.records_written, 4);
        // One unknown tag per file
        assert_eq!(processor.sink().len(), 2);

        let lines = read_lines(&out_dir.join("session1.json"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["timestamp"], 1000);
        assert_eq!(lines[0]["Exhaled carbon dioxide content"], 1.235);
        assert_eq!(lines[1]["Body temperature"], 36.6);
        assert!(lines[1].get("Steps").is_none());

        assert!(out_dir.join("SESSION2.json").exists());
        assert!(!out_dir.join("notes.json").exists());
    }

    #[test]
    fn test_single_file_with_nulls() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = input.path().join("mask.bin");
        std::fs::write(&path, sample_log()).unwrap();

        let mut config = config_for(&path, output.path());
        config.missing_fields = MissingFields::Null;
        config.float_precision = 1;

        let summary = BatchProcessor::with_sink(&config, MemorySink::new()).run().unwrap();
        assert_eq!(summary.files_processed, 1);

        let lines = read_lines(&output.path().join("mask.json"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0]["Steps"].is_null());
        assert_eq!(lines[0]["Exhaled carbon dioxide content"], 1.2);
    }

    #[test]
    fn test_missing_input_dir() {
        let output = TempDir::new().unwrap();
        let config = config_for(Path::new("/nonexistent/input"), output.path());
        assert!(BatchProcessor::new(&config).run().is_err());
    }

    #[test]
    fn test_empty_and_truncated_files() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        std::fs::write(input.path().join("empty.bin"), b"").unwrap();
        let mut truncated = encode_frame(5, 5, &[(0x26, 65.0)]).unwrap();
        truncated.truncate(truncated.len() - 1);
        std::fs::write(input.path().join("truncated.bin"), truncated).unwrap();

        let processor = BatchProcessor::with_sink(&config_for(input.path(), output.path()), MemorySink::new());
        let summary = processor.run().unwrap();

        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.records_written, 0);
        assert_eq!(std::fs::read_to_string(output.path().join("truncated.json")).unwrap(), "");
    }

    #[test]
    fn test_stopped_flag_skips_remaining_files() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join("a.bin"), sample_log()).unwrap();

        let processor = BatchProcessor::with_sink(&config_for(input.path(), output.path()), MemorySink::new());
        processor.get_running_flag().store(false, Ordering::SeqCst);

        let summary = processor.run().unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert!(!output.path().join("a.json").exists());
    }

    #[test]
    fn test_output_path() {
        let config = config_for(Path::new("in"), Path::new("out"));
        let processor = BatchProcessor::new(&config);
        assert_eq!(processor.output_path_for(Path::new("in/log_01.bin")), PathBuf::from("out/log_01.json"));
        assert_eq!(processor.output_path_for(Path::new("in/a.b.bin")), PathBuf::from("out/a.b.json"));
    }
}
