//! CSV output: one row per document, rewritten after every append.
//!
//! Batches run for hours against a local model, so the sink persists the
//! whole table to disk after each document rather than buffering until the
//! end. A crash or Ctrl-C loses at most the document in flight; everything
//! already processed is on disk in a complete, well-formed CSV.
//!
//! The file starts with a UTF-8 byte-order mark so spreadsheet applications
//! detect the encoding and render accented Portuguese correctly.

use crate::error::ExtractError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column header for the file-name column.
const FILE_COLUMN: &str = "Arquivo";

/// One output row: a file name plus one answer per question column.
#[derive(Debug, Clone)]
pub struct AnswerRow {
    pub file: String,
    pub answers: Vec<String>,
}

/// Aggregate counters for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// PDFs found in the input directory.
    pub total_documents: usize,
    /// Documents that produced a row (equals `total_documents` unless the
    /// run was interrupted).
    pub processed_documents: usize,
    /// Documents whose text came from the OCR fallback.
    pub ocr_documents: usize,
    /// Individual generation calls that ended in a sentinel.
    pub generation_failures: usize,
    /// Wall-clock duration of the batch.
    pub duration_ms: u64,
}

/// Incremental CSV writer that rewrites the full table on every append.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    labels: Vec<String>,
    rows: Vec<AnswerRow>,
}

impl CsvSink {
    /// Create a sink writing to `path` with one column per question label.
    /// The header-only file is written immediately so an empty input
    /// directory still produces a valid CSV.
    pub fn create(path: &Path, labels: Vec<String>) -> Result<Self, ExtractError> {
        let sink = Self {
            path: path.to_path_buf(),
            labels,
            rows: Vec::new(),
        };
        sink.rewrite()?;
        Ok(sink)
    }

    /// Append one row and flush the whole table to disk.
    pub fn append(&mut self, row: AnswerRow) -> Result<(), ExtractError> {
        self.rows.push(row);
        self.rewrite()
    }

    /// Rows written so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn rewrite(&self) -> Result<(), ExtractError> {
        let fail = |e: csv::Error| ExtractError::OutputWriteFailed {
            path: self.path.clone(),
            source: e,
        };

        let mut file = File::create(&self.path).map_err(|e| fail(e.into()))?;
        file.write_all(UTF8_BOM).map_err(|e| fail(e.into()))?;

        let mut writer = csv::Writer::from_writer(file);

        let mut header = Vec::with_capacity(self.labels.len() + 1);
        header.push(FILE_COLUMN);
        header.extend(self.labels.iter().map(String::as_str));
        writer.write_record(&header).map_err(fail)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.answers.len() + 1);
            record.push(row.file.as_str());
            record.extend(row.answers.iter().map(String::as_str));
            writer.write_record(&record).map_err(fail)?;
        }

        writer.flush().map_err(|e| fail(e.into()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["Título".to_string(), "Autor".to_string()]
    }

    fn read(path: &Path) -> Vec<u8> {
        std::fs::read(path).unwrap()
    }

    #[test]
    fn header_only_file_written_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let sink = CsvSink::create(&path, labels()).unwrap();
        assert!(sink.is_empty());

        let bytes = read(&path);
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text.trim(), "Arquivo,Título,Autor");
    }

    #[test]
    fn append_rewrites_complete_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path, labels()).unwrap();

        sink.append(AnswerRow {
            file: "tese1.pdf".into(),
            answers: vec!["Um título".into(), "Ana".into()],
        })
        .unwrap();
        sink.append(AnswerRow {
            file: "tese2.pdf".into(),
            answers: vec!["Outro".into(), "Bruno".into()],
        })
        .unwrap();
        assert_eq!(sink.len(), 2);

        let text = String::from_utf8(read(&path)[3..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "tese1.pdf,Um título,Ana");
        assert_eq!(lines[2], "tese2.pdf,Outro,Bruno");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvSink::create(&path, labels()).unwrap();

        sink.append(AnswerRow {
            file: "tese.pdf".into(),
            answers: vec!["Métodos, resultados e discussão".into(), "Carla".into()],
        })
        .unwrap();

        let text = String::from_utf8(read(&path)[3..].to_vec()).unwrap();
        assert!(text.contains("\"Métodos, resultados e discussão\""));
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let err = CsvSink::create(Path::new("/no/such/dir/out.csv"), labels()).unwrap_err();
        assert!(matches!(err, ExtractError::OutputWriteFailed { .. }));
    }
}
