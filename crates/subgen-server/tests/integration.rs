//! End-to-end tests over a real listener: upload through `reqwest`
//! multipart, then poll `/status/{task_id}` until a terminal state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use subgen_core::Segment;
use subgen_server::{ServerConfig, SubtitleServer};
use subgen_stt::{SttError, Transcriber};
use subgen_translate::{TranslateError, TranslationClient};

struct StubTranscriber {
    segments: Vec<Segment>,
    calls: AtomicUsize,
}

impl StubTranscriber {
    fn new(segments: Vec<Segment>) -> Arc<Self> {
        Arc::new(Self {
            segments,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _file_name: &str,
        _language: Option<&str>,
    ) -> Result<Vec<Segment>, SttError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.segments.clone())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Brackets each line with the target language; optionally fails the
/// n-th call (1-based) and optionally sleeps to keep jobs observable
/// mid-flight.
struct StubTranslator {
    fail_on_call: Option<usize>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubTranslator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_on_call: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing_on(call: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_on_call: Some(call),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            fail_on_call: None,
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TranslationClient for StubTranslator {
    async fn translate(
        &self,
        texts: &[String],
        target_lang: &str,
        _context: Option<&str>,
    ) -> Result<Vec<String>, TranslateError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(TranslateError::Api {
                status: 500,
                message: "provider exploded".into(),
            });
        }
        Ok(texts.iter().map(|t| format!("[{target_lang}] {t}")).collect())
    }
}

async fn boot(
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn TranslationClient>,
    chunk_size: usize,
) -> (SocketAddr, String) {
    let config = ServerConfig {
        port: 0,
        chunk_size,
        ..ServerConfig::default()
    };
    let server = SubtitleServer::new(config, transcriber, translator);
    let (addr, _handle) = server.listen().await.unwrap();
    (addr, format!("http://{addr}"))
}

async fn upload(client: &reqwest::Client, base: &str, target_lang: &str) -> String {
    let part = reqwest::multipart::Part::bytes(b"fake mp3 bytes".to_vec())
        .file_name("interview.mp3")
        .mime_str("audio/mpeg")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .part("file", part)
        .text("target_lang", target_lang.to_string())
        .text("source_lang", "auto");

    let resp = client
        .post(format!("{base}/generate-subtitle"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["message"],
        "File uploaded successfully. Processing in background."
    );
    body["task_id"].as_str().unwrap().to_string()
}

async fn status(client: &reqwest::Client, base: &str, task_id: &str) -> Value {
    client
        .get(format!("{base}/status/{task_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn poll_until_terminal(client: &reqwest::Client, base: &str, task_id: &str) -> Value {
    for _ in 0..500 {
        let job = status(client, base, task_id).await;
        let state = job["state"].as_str().unwrap();
        if state == "completed" || state == "failed" {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {task_id} never reached a terminal state");
}

/// Two cues fit one chunk, so the whole job takes exactly one
/// translation call and yields two numbered SRT entries.
#[tokio::test]
async fn two_segments_complete_with_one_translation_call() {
    let transcriber = StubTranscriber::new(vec![
        Segment::new(0.0, 5.2, "Hello there, how are you today?"),
        Segment::new(6.5, 12.0, "I am doing fine, thank you."),
    ]);
    let translator = StubTranslator::new();
    let (_, base) = boot(transcriber.clone(), translator.clone(), 10).await;
    let client = reqwest::Client::new();

    let task_id = upload(&client, &base, "vi").await;
    let job = poll_until_terminal(&client, &base, &task_id).await;

    assert_eq!(job["state"], "completed");
    assert_eq!(job["progress"], 100);
    assert!(job.get("error").is_none());
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);
    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);

    let result = &job["result"];
    assert_eq!(result["filename"], "interview.vi.srt");
    let srt = result["srt_content"].as_str().unwrap();
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:05,200\n"));
    assert!(srt.contains("\n2\n00:00:06,500 --> 00:00:12,000\n"));
    assert!(srt.contains("[vi] Hello there, how are you today?"));
    assert!(srt.contains("[vi] I am doing fine, thank you."));
}

/// A failure on chunk 2 of 3 fails the whole job, discards all partial
/// work, and stops calling the translator.
#[tokio::test]
async fn mid_chunk_failure_discards_partial_work() {
    let segments: Vec<Segment> = (0..6)
        .map(|i| {
            let start = i as f64 * 10.0;
            Segment::new(start, start + 5.0, format!("Sentence number {i} of the recording."))
        })
        .collect();
    let transcriber = StubTranscriber::new(segments);
    let translator = StubTranslator::failing_on(2);
    let (_, base) = boot(transcriber, translator.clone(), 2).await;
    let client = reqwest::Client::new();

    let task_id = upload(&client, &base, "fr").await;
    let job = poll_until_terminal(&client, &base, &task_id).await;

    assert_eq!(job["state"], "failed");
    assert!(job.get("result").is_none());
    let error = job["error"].as_str().unwrap();
    assert!(error.contains("chunk 2/3"), "unexpected error: {error}");
    assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
}

/// Progress never decreases across polls and the state only moves
/// forward: pending, processing, then exactly one terminal state.
#[tokio::test]
async fn progress_is_monotonic_across_polls() {
    let segments: Vec<Segment> = (0..6)
        .map(|i| {
            let start = i as f64 * 10.0;
            Segment::new(start, start + 5.0, format!("Line {i} with enough words to stand alone."))
        })
        .collect();
    let transcriber = StubTranscriber::new(segments);
    let translator = StubTranslator::slow(Duration::from_millis(30));
    let (_, base) = boot(transcriber, translator, 2).await;
    let client = reqwest::Client::new();

    let task_id = upload(&client, &base, "es").await;

    let mut observed: Vec<(String, u64)> = Vec::new();
    loop {
        let job = status(&client, &base, &task_id).await;
        let state = job["state"].as_str().unwrap().to_string();
        let progress = job["progress"].as_u64().unwrap();
        let terminal = state == "completed" || state == "failed";
        observed.push((state, progress));
        if terminal {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    for pair in observed.windows(2) {
        assert!(
            pair[1].1 >= pair[0].1,
            "progress went backwards: {observed:?}"
        );
    }
    let mut seen_terminal = false;
    for (state, _) in &observed {
        assert!(!seen_terminal, "state changed after terminal: {observed:?}");
        match state.as_str() {
            "pending" | "processing" => {}
            "completed" | "failed" => seen_terminal = true,
            other => panic!("unexpected state {other}"),
        }
    }
    assert_eq!(observed.last().unwrap().0, "completed");
    assert_eq!(observed.last().unwrap().1, 100);
}

#[tokio::test]
async fn status_of_unknown_task_is_404() {
    let transcriber = StubTranscriber::new(Vec::new());
    let (_, base) = boot(transcriber, StubTranslator::new(), 10).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/status/no-such-task"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "task not found: no-such-task");
}

#[tokio::test]
async fn empty_transcript_fails_the_job() {
    let transcriber = StubTranscriber::new(Vec::new());
    let translator = StubTranslator::new();
    let (_, base) = boot(transcriber, translator.clone(), 10).await;
    let client = reqwest::Client::new();

    let task_id = upload(&client, &base, "de").await;
    let job = poll_until_terminal(&client, &base, &task_id).await;

    assert_eq!(job["state"], "failed");
    assert!(job.get("result").is_none());
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_without_target_lang_defaults_to_english() {
    let transcriber = StubTranscriber::new(vec![Segment::new(0.0, 2.0, "Bonjour tout le monde.")]);
    let translator = StubTranslator::new();
    let (_, base) = boot(transcriber, translator, 10).await;
    let client = reqwest::Client::new();

    let part = reqwest::multipart::Part::bytes(b"fake mp3 bytes".to_vec()).file_name("clip.mp3");
    let form = reqwest::multipart::Form::new().part("file", part);
    let resp = client
        .post(format!("{base}/generate-subtitle"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let body: Value = resp.json().await.unwrap();

    let job = poll_until_terminal(&client, &base, body["task_id"].as_str().unwrap()).await;
    assert_eq!(job["state"], "completed");
    assert_eq!(job["result"]["filename"], "clip.en.srt");
}
