//! Local adapters for the single-server monolith deployment.

pub mod ffmpeg;
pub mod fs;
pub mod notifier;
pub mod redis;
pub mod upload;
