//! yt-dlp CLI wrapper for the corpus builder.
//!
//! This crate provides:
//! - Type-safe yt-dlp command building
//! - A runner with a per-call timeout
//! - Info-JSON metadata decoding
//! - Phrase search, metadata probing and audio download

pub mod command;
pub mod error;
pub mod info;
pub mod ytdlp;

pub use command::{YtDlpCommand, YtDlpRunner, DEFAULT_CALL_TIMEOUT};
pub use error::{MediaError, MediaResult};
pub use info::VideoInfo;
pub use ytdlp::YtDlp;
