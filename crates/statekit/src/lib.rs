//! # statekit
//!
//! Provision remote state storage for Terraform's S3 backend.
//!
//! For one customer this creates:
//!
//! 1. A versioned S3 bucket named `{customer}-terraform-state`
//! 2. A DynamoDB lock table (`terraform-state-lock`, hash key `LockID`,
//!    5/5 provisioned throughput)
//!
//! The two steps are independent: the lock table is attempted even when the
//! bucket could not be created, and nothing created is ever rolled back.
//! An existing lock table is not an error; the step is reported as skipped.
//!
//! ## Example
//!
//! ```no_run
//! use statekit::{AwsSettings, Bootstrapper, NoopObserver};
//!
//! let settings = AwsSettings::new("eu-central-1").with_profile("customers");
//! let bootstrapper = Bootstrapper::new(&settings).expect("Failed to build AWS clients");
//!
//! let report = bootstrapper.bootstrap("acme", &NoopObserver);
//! if !report.is_success() {
//!     eprintln!("{} step(s) failed", report.failed());
//! }
//! ```
//!
//! ## Backends
//!
//! - `aws` (default feature): S3 + DynamoDB via the AWS SDK
//! - [`MemoryBackend`](backend::memory::MemoryBackend): in-memory, for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Backend implementations for the storage and lock table services.
pub mod backend;
/// Error types and classification.
pub mod error;
/// Advisory bucket name checks.
pub mod naming;
/// Explicit AWS connection settings.
pub mod settings;
/// Client-independent description of a bootstrap run.
pub mod plan;
/// Names, table shape and report types.
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use plan::{Layout, Plan};
pub use settings::{AwsSettings, StaticCredentials};
pub use types::{
    BootstrapReport, DEFAULT_CAPACITY, DEFAULT_REGION, DEFAULT_TABLE_NAME, KeyAttributeType,
    LockTableSpec, StateNames, Step, StepOutcome,
};

use backend::{LockTableBackend, StorageBackend};
use std::sync::Arc;

/// Receives progress as each step runs.
pub trait Observer {
    /// A step is about to call the provider for `target`.
    fn step_started(&self, step: Step, target: &str);

    /// A step finished.
    fn step_finished(&self, step: Step, target: &str, outcome: &StepOutcome);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn step_started(&self, _step: Step, _target: &str) {}

    fn step_finished(&self, _step: Step, _target: &str, _outcome: &StepOutcome) {}
}

/// Provisions state storage for customers.
pub struct Bootstrapper {
    storage: Arc<dyn StorageBackend>,
    locks: Arc<dyn LockTableBackend>,
    layout: Layout,
}

impl Bootstrapper {
    /// Create a bootstrapper backed by AWS.
    #[cfg(feature = "aws")]
    pub fn new(settings: &AwsSettings) -> Result<Self> {
        let backend = Arc::new(backend::aws::AwsBackend::new(settings)?);
        Ok(Self::with_backends(
            backend.clone(),
            backend,
            settings.region.clone(),
        ))
    }

    /// Create a bootstrapper with custom backends (useful for testing).
    pub fn with_backends(
        storage: Arc<dyn StorageBackend>,
        locks: Arc<dyn LockTableBackend>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            locks,
            layout: Layout::new(region),
        }
    }

    /// Replace the layout (region, lock table name, throughput).
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Use a lock table other than the shared `terraform-state-lock`.
    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.layout = self.layout.with_table_name(table);
        self
    }

    /// Set the lock table's provisioned throughput.
    pub fn with_capacity(mut self, read: i64, write: i64) -> Self {
        self.layout = self.layout.with_capacity(read, write);
        self
    }

    /// Layout every request is derived from.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Region resources are requested in.
    pub fn region(&self) -> &str {
        self.layout.region()
    }

    /// Provision the bucket and the lock table for `customer`.
    ///
    /// Never fails: each step's result is captured in the report.
    pub fn bootstrap(&self, customer: &str, observer: &dyn Observer) -> BootstrapReport {
        let Plan {
            customer,
            region,
            names,
            lock_table,
            warnings,
        } = self.layout.plan(customer);
        log::info!(
            "Bootstrapping state storage for {customer} in {region} (bucket: {}, table: {})",
            names.bucket,
            names.table
        );

        observer.step_started(Step::Storage, &names.bucket);
        let storage = self.provision_storage(&names.bucket, &region);
        observer.step_finished(Step::Storage, &names.bucket, &storage);

        observer.step_started(Step::LockTable, &names.table);
        let lock_table = self.provision_lock_table(&lock_table);
        observer.step_finished(Step::LockTable, &names.table, &lock_table);

        BootstrapReport {
            customer,
            region,
            names,
            storage,
            lock_table,
            warnings,
        }
    }

    fn provision_storage(&self, bucket: &str, region: &str) -> StepOutcome {
        let result = self
            .storage
            .create_bucket(bucket, region)
            .and_then(|()| self.storage.enable_versioning(bucket));

        match result {
            Ok(()) => {
                log::info!("Created bucket {bucket} with versioning");
                StepOutcome::Created
            }
            Err(e) => {
                log::info!("Bucket {bucket} failed: {e}");
                StepOutcome::failed(&e)
            }
        }
    }

    fn provision_lock_table(&self, spec: &LockTableSpec) -> StepOutcome {
        let table = &spec.name;
        match self.locks.create_table(spec) {
            Ok(()) => {
                log::info!("Created lock table {table}");
                StepOutcome::Created
            }
            Err(e) if e.is_already_exists() => {
                log::info!("Lock table {table} already exists");
                StepOutcome::Skipped {
                    reason: "table already exists".to_string(),
                }
            }
            Err(e) => {
                log::info!("Lock table {table} failed: {e}");
                StepOutcome::failed(&e)
            }
        }
    }
}
