//! Hosted-backend gateway module.
//!
//! This module handles:
//! - Authenticated access to the backend REST surface
//! - SQL execution through the RPC surface
//! - Object-storage bucket and object operations

pub mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{BucketInfo, StorageObject, UserRecord};
