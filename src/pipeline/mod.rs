//! The extraction pipeline - from PDF bytes to a validated record.
//!
//! Stage order: decode -> resolve page text (native/OCR) -> assemble ->
//! chunk -> complete+merge -> normalize. The [`Extractor`] owns the
//! injected capabilities and the configuration; each call to
//! [`Extractor::extract`] owns its run-scoped state (pages, chunks,
//! merged record), so concurrent runs share nothing mutable.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod assemble;
pub mod chunker;
pub mod merge;
pub mod normalize;
pub mod orchestrate;
pub mod prompts;
pub mod resolve;

use crate::error::{ExtractError, Result};
use crate::schema::RecordSchema;
use crate::traits::{Completer, OcrEngine, PdfDecoder};
use crate::types::config::PipelineConfig;
use crate::types::record::{PageProvenance, ValidatedRecord};

/// The main entry point - a configured extraction pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use policy_extract::{Extractor, PipelineConfig, RecordSchema};
///
/// let schema = RecordSchema::from_path("schema.json")?;
/// let extractor = Extractor::new(decoder, ocr, completer, schema)?;
///
/// let record = extractor.extract(&pdf_bytes).await?;
/// if !record.report.is_valid {
///     eprintln!("missing: {:?}", record.report.missing_fields);
/// }
/// ```
pub struct Extractor<D: PdfDecoder, O: OcrEngine, C: Completer> {
    decoder: D,
    ocr: O,
    completer: C,
    schema: RecordSchema,
    schema_description: String,
    config: PipelineConfig,
}

impl<D: PdfDecoder, O: OcrEngine, C: Completer> Extractor<D, O, C> {
    /// Create an extractor with the default configuration.
    pub fn new(decoder: D, ocr: O, completer: C, schema: RecordSchema) -> Result<Self> {
        Self::with_config(decoder, ocr, completer, schema, PipelineConfig::default())
    }

    /// Create an extractor with a custom configuration.
    ///
    /// Fails with [`ExtractError::Config`] when the prompt budget cannot
    /// fit the rendered schema instructions - a startup-time error, never
    /// a per-document one.
    pub fn with_config(
        decoder: D,
        ocr: O,
        completer: C,
        schema: RecordSchema,
        config: PipelineConfig,
    ) -> Result<Self> {
        let schema_description = schema.describe();
        let overhead = prompts::prompt_overhead(&schema_description)
            + prompts::STRICT_RETRY_SUFFIX.len();
        if config.max_prompt_chars <= overhead {
            return Err(ExtractError::Config {
                reason: format!(
                    "max_prompt_chars {} leaves no room for document text ({} bytes of instructions)",
                    config.max_prompt_chars, overhead
                ),
            });
        }

        Ok(Self {
            decoder,
            ocr,
            completer,
            schema,
            schema_description,
            config,
        })
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The target record schema.
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Run the full pipeline on one document.
    ///
    /// Fails only with [`ExtractError::EmptyDocument`]; every other
    /// anomaly (OCR failures, malformed completions, uncoercible values)
    /// is absorbed into the returned record's
    /// [`ValidationReport`](crate::types::record::ValidationReport).
    pub async fn extract(&self, pdf_bytes: &[u8]) -> Result<ValidatedRecord> {
        let run_id = Uuid::now_v7();
        info!(%run_id, bytes = pdf_bytes.len(), "extraction run started");

        let pages = match self.decoder.decode(pdf_bytes).await {
            Ok(pages) => pages,
            Err(e) => {
                // Decoding problems are indistinguishable from an
                // unreadable document as far as the caller is concerned.
                warn!(%run_id, error = %e, "decode failed");
                return Err(ExtractError::EmptyDocument);
            }
        };
        if pages.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }
        debug!(%run_id, pages = pages.len(), "document decoded");

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));

        let resolved =
            resolve::resolve_pages(pages, &self.ocr, &self.config, Arc::clone(&semaphore)).await;
        let doc = assemble::assemble(resolved)?;
        info!(
            %run_id,
            pages = doc.pages.len(),
            ocr_pages = doc.ocr_pages(),
            text_bytes = doc.text.len(),
            "document text assembled"
        );

        let chunks = chunker::chunk_document(
            &doc,
            &self.schema_description,
            self.config.max_prompt_chars,
        )?;
        let results =
            orchestrate::run_chunks(&chunks, &self.completer, &self.config, semaphore).await;
        let merged = merge::merge_results(&results);
        let (fields, report) = normalize::normalize(&merged, &self.schema);

        let provenance = doc
            .pages
            .iter()
            .map(|p| PageProvenance {
                page_index: p.index,
                method: p.method,
                populated: !p.is_empty(),
            })
            .collect();

        info!(
            %run_id,
            chunks = chunks.len(),
            is_valid = report.is_valid,
            errors = report.errors.len(),
            missing = report.missing_fields.len(),
            "extraction run finished"
        );

        Ok(ValidatedRecord {
            run_id,
            fields,
            report,
            pages: provenance,
            completed_at: chrono::Utc::now(),
        })
    }

    /// Extract with cancellation support.
    ///
    /// When the caller aborts, all in-flight page and chunk operations for
    /// this run are abandoned and [`ExtractError::Cancelled`] is returned.
    pub async fn extract_with_cancel(
        &self,
        pdf_bytes: &[u8],
        cancel: CancellationToken,
    ) -> Result<ValidatedRecord> {
        tokio::select! {
            // Cancellation wins over a run that would complete on the
            // same poll.
            biased;
            _ = cancel.cancelled() => Err(ExtractError::Cancelled),
            result = self.extract(pdf_bytes) => result,
        }
    }
}
