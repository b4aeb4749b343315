//! Response shapes for the hosted-backend surfaces.

use serde::Deserialize;

/// Bucket metadata from the storage surface.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketInfo {
    /// Bucket id.
    pub id: Option<String>,
    /// Bucket name.
    pub name: Option<String>,
    /// Whether objects are publicly readable.
    pub public: Option<bool>,
}

/// Object metadata from a storage list call.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageObject {
    /// Object name within the bucket.
    pub name: String,
    /// Object id.
    pub id: Option<String>,
    /// Last update timestamp (ISO format).
    pub updated_at: Option<String>,
}

/// Row shape for the users table.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    /// Row id.
    pub id: Option<String>,
    /// User email.
    pub email: Option<String>,
    /// Assigned role.
    pub role: Option<String>,
}
