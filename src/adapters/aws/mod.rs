//! AWS adapters.

pub mod dynamodb;
pub mod mediaconvert;
pub mod s3;
pub mod sns;
