//! # subgen
//!
//! Subtitle generation server binary — wires the speech-to-text and
//! translation providers to the HTTP server.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use subgen_server::{ServerConfig, SubtitleServer};
use subgen_stt::GroqTranscriber;
use subgen_translate::{GeminiModel, LlmTranslator, OpenRouterModel, TranslationClient};

/// Which chat provider backs translation.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum TranslatorKind {
    /// Google Gemini (`GEMINI_API_KEY`).
    Gemini,
    /// `OpenRouter` with model fallback (`OPENROUTER_API_KEY`).
    Openrouter,
}

/// Subtitle generation server.
#[derive(Parser, Debug)]
#[command(name = "subgen", about = "Subtitle generation server")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Segments per translation call.
    #[arg(long, default_value = "10")]
    chunk_size: usize,

    /// Seconds a finished job stays pollable before eviction.
    #[arg(long, default_value = "3600")]
    retention_secs: u64,

    /// Translation provider.
    #[arg(long, value_enum, default_value = "gemini")]
    translator: TranslatorKind,

    /// Log level filter (overridden by `RUST_LOG`).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn build_translator(kind: TranslatorKind) -> Result<Arc<dyn TranslationClient>> {
    let translator = match kind {
        TranslatorKind::Gemini => {
            let model = GeminiModel::from_env().context("Gemini translator unavailable")?;
            LlmTranslator::new(Arc::new(model))
        }
        TranslatorKind::Openrouter => {
            let model =
                OpenRouterModel::from_env().context("OpenRouter translator unavailable")?;
            LlmTranslator::new(Arc::new(model))
        }
    };
    Ok(Arc::new(translator))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    subgen_core::logging::init_subscriber(&args.log_level);

    let transcriber = GroqTranscriber::from_env().context("Groq transcriber unavailable")?;
    let translator = build_translator(args.translator)?;

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        chunk_size: args.chunk_size,
        retention_secs: args.retention_secs,
        ..ServerConfig::default()
    };

    let server = SubtitleServer::new(config, Arc::new(transcriber), translator);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;

    tracing::info!("Subtitle server listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().graceful_shutdown(vec![handle], None).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
