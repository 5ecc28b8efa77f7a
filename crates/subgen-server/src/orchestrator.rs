//! The background job orchestrator.
//!
//! One spawned task per job. Phases run strictly sequentially:
//! transcription → segment merging → chunked translation → SRT assembly.
//! The owning job's status record is the only side effect; any phase
//! failure fails the job and discards partial work.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use subgen_core::{JobResult, MergePolicy, Segment, merge_segments, split_chunks, srt};
use subgen_stt::Transcriber;
use subgen_translate::TranslationClient;

use crate::jobs::JobStore;

/// Everything the orchestrator needs to run one job.
pub struct JobRequest {
    /// Raw audio bytes from the upload.
    pub audio: Vec<u8>,
    /// Original upload filename; the result filename derives from it.
    pub file_name: String,
    /// Source language code, or `None` for auto-detection.
    pub source_lang: Option<String>,
    /// Target language code.
    pub target_lang: String,
    /// Optional free-text context for translation consistency.
    pub context: Option<String>,
}

/// Progress after transcription, before any chunk completes.
const TRANSLATE_BASE_PROGRESS: f64 = 40.0;

/// Progress share of the translation phase.
const TRANSLATE_PROGRESS_SPAN: f64 = 60.0;

/// Progress after `done` of `total` chunks: `round(40 + 60 * done/total)`.
fn chunk_progress(done: usize, total: usize) -> u8 {
    let total = total.max(1);
    (TRANSLATE_BASE_PROGRESS + TRANSLATE_PROGRESS_SPAN * done as f64 / total as f64).round() as u8
}

/// Derive the result filename: `{stem}.{target_lang}.srt`.
fn result_filename(upload_name: &str, target_lang: &str) -> String {
    let stem = Path::new(upload_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("subtitle");
    format!("{stem}.{target_lang}.srt")
}

/// Run one job to a terminal state.
///
/// Never returns an error: every failure path marks the job `failed` in
/// the store, which is the only channel the polling client observes.
pub async fn run_job(
    store: Arc<JobStore>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn TranslationClient>,
    chunk_size: usize,
    job_id: String,
    request: JobRequest,
) {
    store.set_processing(&job_id, 0, "transcribing");
    info!(
        job_id = %job_id,
        file = %request.file_name,
        target_lang = %request.target_lang,
        "job started"
    );

    let segments = match transcriber
        .transcribe(
            &request.audio,
            &request.file_name,
            request.source_lang.as_deref(),
        )
        .await
    {
        Ok(segments) => segments,
        Err(e) => {
            error!(job_id = %job_id, error = %e, "transcription failed");
            store.fail(&job_id, format!("transcription failed: {e}"));
            return;
        }
    };

    let mut segments: Vec<Segment> = merge_segments(&segments, &MergePolicy::default());
    if segments.is_empty() {
        store.fail(&job_id, "transcription produced no segments");
        return;
    }
    info!(job_id = %job_id, segments = segments.len(), "transcription complete");

    let chunk_ranges: Vec<(usize, usize)> = split_chunks(&segments, chunk_size)
        .iter()
        .scan(0, |offset, chunk| {
            let range = (*offset, *offset + chunk.len());
            *offset += chunk.len();
            Some(range)
        })
        .collect();
    let total_chunks = chunk_ranges.len();
    store.set_processing(&job_id, chunk_progress(0, total_chunks), "translating");

    for (index, (from, to)) in chunk_ranges.into_iter().enumerate() {
        let texts: Vec<String> = segments[from..to].iter().map(|s| s.text.clone()).collect();

        let translated = match translator
            .translate(&texts, &request.target_lang, request.context.as_deref())
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                error!(
                    job_id = %job_id,
                    chunk = index + 1,
                    total_chunks,
                    error = %e,
                    "translation failed"
                );
                store.fail(
                    &job_id,
                    format!(
                        "translation failed on chunk {}/{total_chunks}: {e}",
                        index + 1
                    ),
                );
                return;
            }
        };

        // The client validates length; double-check before splicing text
        // back against timestamps.
        if translated.len() != texts.len() {
            store.fail(
                &job_id,
                format!(
                    "translation failed on chunk {}/{total_chunks}: \
                     expected {} lines, got {}",
                    index + 1,
                    texts.len(),
                    translated.len()
                ),
            );
            return;
        }

        for (segment, text) in segments[from..to].iter_mut().zip(translated) {
            segment.text = text;
        }

        store.set_processing(
            &job_id,
            chunk_progress(index + 1, total_chunks),
            format!("translated chunk {}/{total_chunks}", index + 1),
        );
    }

    let srt_content = srt::render(&segments);
    let filename = result_filename(&request.file_name, &request.target_lang);
    info!(job_id = %job_id, filename = %filename, "job completed");
    store.complete(
        &job_id,
        JobResult {
            srt_content,
            filename,
        },
    );
}
