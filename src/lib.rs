//! Otis - Video Training Platform Core
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (trainings, transcode jobs, workflow states)
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations
//! - application/: Services composing the ports
//! - config: Environment configuration
//!
//! # Features
//! - `local`: Local/monolith deployment (filesystem staging, ffmpeg CLI, Redis state)
//! - `aws`: AWS deployment (S3, DynamoDB, Elemental MediaConvert, SNS)
//! - `full`: Both deployments

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use error::Error;

#[cfg(feature = "aws")]
pub use config::AwsConfig;

#[cfg(feature = "local")]
pub use config::LocalConfig;

pub use config::WorkflowConfig;
