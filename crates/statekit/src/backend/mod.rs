//! Backend abstraction for the two provisioning services.
//!
//! [`StorageBackend`] covers the object store holding state files and
//! [`LockTableBackend`] the key-value store holding locks. The real
//! implementation talks to S3 and DynamoDB; [`memory::MemoryBackend`]
//! records calls for tests.

#[cfg(feature = "aws")]
pub mod aws;
pub mod memory;

use crate::error::Result;
use crate::types::LockTableSpec;

/// Object storage operations.
pub trait StorageBackend: Send + Sync {
    /// Create a bucket with a location constraint.
    fn create_bucket(&self, name: &str, region: &str) -> Result<()>;

    /// Turn on object versioning for a bucket.
    fn enable_versioning(&self, name: &str) -> Result<()>;
}

/// Lock table operations.
pub trait LockTableBackend: Send + Sync {
    /// Create the lock table.
    ///
    /// Must return [`Error::TableExists`](crate::Error::TableExists) when a
    /// table with that name already exists.
    fn create_table(&self, spec: &LockTableSpec) -> Result<()>;
}
