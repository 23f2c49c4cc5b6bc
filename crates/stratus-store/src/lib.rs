#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CLIENT: &str = "stratus_store::client";
pub const TRACING_TARGET_BUCKETS: &str = "stratus_store::buckets";
pub const TRACING_TARGET_OBJECTS: &str = "stratus_store::objects";
pub const TRACING_TARGET_FAULT: &str = "stratus_store::fault";

mod client;
mod config;
mod error;
mod fault;
mod region;

pub use client::{BucketInfo, DownloadReceipt, ObjectStore, UploadReceipt};
pub use config::{S3Settings, StoreConfig, StoreCredentials};
pub use error::{StoreError, StoreResult};
pub use fault::FaultInjector;
pub use region::Region;
