//! End-to-end batch tests using a scripted generator.
//!
//! These run without pdfium, tesseract, or an Ollama server: the input files
//! are deliberately not valid PDFs, so acquisition fails soft and every
//! document flows through the sentinel path. That exercises the full batch
//! loop — directory scan, per-document processing, progress events, CSV
//! persistence — with no external services.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thesis2csv::{
    run_batch_with_generator, BatchProgressCallback, DocumentError, ExtractError,
    ExtractionConfig, Generator,
};

/// Generator test double: returns a fixed response and counts calls.
struct ScriptedGenerator {
    response: String,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DocumentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

#[derive(Default)]
struct TrackingCallback {
    batch_starts: AtomicUsize,
    document_starts: AtomicUsize,
    document_completes: AtomicUsize,
    batch_completes: AtomicUsize,
}

impl BatchProgressCallback for TrackingCallback {
    fn on_batch_start(&self, _total: usize) {
        self.batch_starts.fetch_add(1, Ordering::SeqCst);
    }
    fn on_document_start(&self, _index: usize, _total: usize, _file_name: &str) {
        self.document_starts.fetch_add(1, Ordering::SeqCst);
    }
    fn on_document_complete(&self, _index: usize, _total: usize, _file_name: &str, _ocr: bool) {
        self.document_completes.fetch_add(1, Ordering::SeqCst);
    }
    fn on_batch_complete(&self, _processed: usize) {
        self.batch_completes.fetch_add(1, Ordering::SeqCst);
    }
}

fn write_garbage_pdf(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"not a real pdf").unwrap();
}

fn read_output(path: &Path) -> (Vec<u8>, Vec<String>) {
    let bytes = std::fs::read(path).unwrap();
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines = text.lines().map(str::to_string).collect();
    (bytes, lines)
}

#[tokio::test]
async fn unreadable_documents_still_produce_complete_rows() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let csv_path = output.path().join("respostas.csv");

    write_garbage_pdf(input.path(), "tese_b.pdf");
    write_garbage_pdf(input.path(), "tese_a.pdf");
    write_garbage_pdf(input.path(), "tese_c.pdf");

    let config = ExtractionConfig::builder()
        .input_dir(input.path())
        .output_csv(&csv_path)
        .build()
        .unwrap();

    let generator = ScriptedGenerator::new("irrelevante");
    let stats = run_batch_with_generator(&config, &generator).await.unwrap();

    assert_eq!(stats.total_documents, 3);
    assert_eq!(stats.processed_documents, 3);
    assert_eq!(stats.generation_failures, 0);
    // No text was ever acquired, so the model is never consulted.
    assert_eq!(generator.call_count(), 0);

    let (bytes, lines) = read_output(&csv_path);
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"), "missing UTF-8 BOM");
    assert_eq!(lines.len(), 4, "header plus one row per document");
    assert_eq!(
        lines[0],
        "Arquivo,Título e Autor,Resumo,Objetivo,Metodologia,Conclusões"
    );
    // Sorted by file name.
    assert!(lines[1].starts_with("tese_a.pdf,"));
    assert!(lines[2].starts_with("tese_b.pdf,"));
    assert!(lines[3].starts_with("tese_c.pdf,"));
    // Every answer cell is the no-text sentinel.
    for line in &lines[1..] {
        assert_eq!(
            line.matches("Texto não encontrado nas páginas indicadas.").count(),
            5,
            "row should carry five sentinel answers: {line}"
        );
    }
}

#[tokio::test]
async fn empty_input_directory_writes_header_only_csv() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let csv_path = output.path().join("out.csv");

    let config = ExtractionConfig::builder()
        .input_dir(input.path())
        .output_csv(&csv_path)
        .build()
        .unwrap();

    let generator = ScriptedGenerator::new("nunca chamado");
    let stats = run_batch_with_generator(&config, &generator).await.unwrap();

    assert_eq!(stats.total_documents, 0);
    assert_eq!(stats.processed_documents, 0);
    assert_eq!(generator.call_count(), 0);

    let (bytes, lines) = read_output(&csv_path);
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Arquivo,"));
}

#[tokio::test]
async fn missing_input_directory_is_fatal() {
    let output = tempfile::tempdir().unwrap();
    let config = ExtractionConfig::builder()
        .input_dir("/no/such/input/dir")
        .output_csv(output.path().join("out.csv"))
        .build()
        .unwrap();

    let generator = ScriptedGenerator::new("x");
    let err = run_batch_with_generator(&config, &generator)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::InputDirUnreadable { .. }));
}

#[tokio::test]
async fn unwritable_output_path_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    let config = ExtractionConfig::builder()
        .input_dir(input.path())
        .output_csv("/no/such/output/dir/out.csv")
        .build()
        .unwrap();

    let generator = ScriptedGenerator::new("x");
    let err = run_batch_with_generator(&config, &generator)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::OutputWriteFailed { .. }));
}

#[tokio::test]
async fn progress_callback_sees_every_document() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_garbage_pdf(input.path(), "um.pdf");
    write_garbage_pdf(input.path(), "dois.pdf");

    let tracker = Arc::new(TrackingCallback::default());
    let config = ExtractionConfig::builder()
        .input_dir(input.path())
        .output_csv(output.path().join("out.csv"))
        .progress_callback(tracker.clone())
        .build()
        .unwrap();

    let generator = ScriptedGenerator::new("x");
    run_batch_with_generator(&config, &generator).await.unwrap();

    assert_eq!(tracker.batch_starts.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.document_starts.load(Ordering::SeqCst), 2);
    assert_eq!(tracker.document_completes.load(Ordering::SeqCst), 2);
    assert_eq!(tracker.batch_completes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn interrupted_style_partial_output_is_well_formed_after_each_document() {
    // The sink rewrites the full table per append; verify the file is a
    // complete, parseable CSV after a single-document batch.
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let csv_path = output.path().join("out.csv");

    write_garbage_pdf(input.path(), "unica.pdf");

    let config = ExtractionConfig::builder()
        .input_dir(input.path())
        .output_csv(&csv_path)
        .build()
        .unwrap();

    let generator = ScriptedGenerator::new("x");
    run_batch_with_generator(&config, &generator).await.unwrap();

    let bytes = std::fs::read(&csv_path).unwrap();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(&bytes[3..]);
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].len(), 6);
    assert_eq!(&records[0][0], "unica.pdf");
}
