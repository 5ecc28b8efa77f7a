//! # subgen-server
//!
//! The HTTP façade and job pipeline of the subtitle generation service.
//!
//! - HTTP endpoints: upload (`POST /generate-subtitle`), status polling
//!   (`GET /status/{task_id}`), health (`GET /`)
//! - [`jobs::JobStore`]: in-memory status records, one writer per job,
//!   arbitrary concurrent readers
//! - [`orchestrator::run_job`]: one background task per job sequencing
//!   transcription → chunked translation → SRT assembly
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

pub mod config;
pub mod error;
pub mod jobs;
pub mod orchestrator;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::SubtitleServer;
