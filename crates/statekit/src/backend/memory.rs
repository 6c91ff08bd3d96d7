//! In-memory backend.
//!
//! Keeps created buckets and tables in memory and records every call in
//! order. Failures can be queued per operation to exercise error paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};
use crate::types::LockTableSpec;

use super::{LockTableBackend, StorageBackend};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `create_bucket(name, region)`
    #[allow(missing_docs)]
    CreateBucket { name: String, region: String },
    /// `enable_versioning(name)`
    #[allow(missing_docs)]
    EnableVersioning { name: String },
    /// `create_table(spec)`
    CreateTable(LockTableSpec),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    buckets: BTreeMap<String, Bucket>,
    tables: BTreeSet<String>,
    fail_bucket: Option<Error>,
    fail_versioning: Option<Error>,
    fail_table: Option<Error>,
}

#[derive(Debug, Clone)]
struct Bucket {
    region: String,
    versioned: bool,
}

/// Backend that provisions into memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a table already exists.
    pub fn with_table(self, name: &str) -> Self {
        self.lock().tables.insert(name.to_string());
        self
    }

    /// Fail the next `create_bucket` call with `err`.
    pub fn fail_bucket(&self, err: Error) {
        self.lock().fail_bucket = Some(err);
    }

    /// Fail the next `enable_versioning` call with `err`.
    pub fn fail_versioning(&self, err: Error) {
        self.lock().fail_versioning = Some(err);
    }

    /// Fail the next `create_table` call with `err`.
    pub fn fail_table(&self, err: Error) {
        self.lock().fail_table = Some(err);
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Region a bucket was created in, if it exists.
    pub fn bucket_region(&self, name: &str) -> Option<String> {
        self.lock().buckets.get(name).map(|b| b.region.clone())
    }

    /// Whether a bucket exists with versioning enabled.
    pub fn is_versioned(&self, name: &str) -> bool {
        self.lock().buckets.get(name).is_some_and(|b| b.versioned)
    }

    /// Whether a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.lock().tables.contains(name)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryBackend {
    fn create_bucket(&self, name: &str, region: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::CreateBucket {
            name: name.to_string(),
            region: region.to_string(),
        });

        if let Some(err) = state.fail_bucket.take() {
            return Err(err);
        }
        if state.buckets.contains_key(name) {
            return Err(Error::Service {
                service: "S3",
                operation: "CreateBucket",
                code: "BucketAlreadyOwnedByYou".to_string(),
                message: format!("bucket {name} already exists"),
            });
        }

        state.buckets.insert(
            name.to_string(),
            Bucket {
                region: region.to_string(),
                versioned: false,
            },
        );
        Ok(())
    }

    fn enable_versioning(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::EnableVersioning {
            name: name.to_string(),
        });

        if let Some(err) = state.fail_versioning.take() {
            return Err(err);
        }

        match state.buckets.get_mut(name) {
            Some(bucket) => {
                bucket.versioned = true;
                Ok(())
            }
            None => Err(Error::Service {
                service: "S3",
                operation: "PutBucketVersioning",
                code: "NoSuchBucket".to_string(),
                message: format!("bucket {name} does not exist"),
            }),
        }
    }
}

impl LockTableBackend for MemoryBackend {
    fn create_table(&self, spec: &LockTableSpec) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::CreateTable(spec.clone()));

        if let Some(err) = state.fail_table.take() {
            return Err(err);
        }
        if !state.tables.insert(spec.name.clone()) {
            return Err(Error::TableExists(spec.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_lifecycle() {
        let backend = MemoryBackend::new();
        backend.create_bucket("b", "eu-west-1").unwrap();
        assert_eq!(backend.bucket_region("b").as_deref(), Some("eu-west-1"));
        assert!(!backend.is_versioned("b"));

        backend.enable_versioning("b").unwrap();
        assert!(backend.is_versioned("b"));

        let err = backend.create_bucket("b", "eu-west-1").unwrap_err();
        assert_eq!(err.category(), crate::ErrorCategory::AlreadyExists);
    }

    #[test]
    fn test_versioning_missing_bucket() {
        let backend = MemoryBackend::new();
        assert!(backend.enable_versioning("missing").is_err());
    }

    #[test]
    fn test_existing_table() {
        let backend = MemoryBackend::new().with_table("locks");
        let err = backend.create_table(&LockTableSpec::new("locks")).unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_queued_failure_is_one_shot() {
        let backend = MemoryBackend::new();
        backend.fail_table(Error::Other("boom".to_string()));

        assert!(backend.create_table(&LockTableSpec::new("locks")).is_err());
        assert!(backend.create_table(&LockTableSpec::new("locks")).is_ok());
        assert_eq!(backend.calls().len(), 2);
    }
}
