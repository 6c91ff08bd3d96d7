use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, ErrorCategory};

/// Suffix appended to the customer name to form the bucket name.
pub const BUCKET_SUFFIX: &str = "-terraform-state";

/// Lock table shared by every customer bootstrapped in a region.
pub const DEFAULT_TABLE_NAME: &str = "terraform-state-lock";

/// Partition key Terraform's S3 backend writes lock records under.
pub const LOCK_HASH_KEY: &str = "LockID";

/// Default provisioned read/write capacity units of the lock table.
pub const DEFAULT_CAPACITY: i64 = 5;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Names of the resources backing one customer's remote state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateNames {
    /// S3 bucket holding the state files
    pub bucket: String,
    /// DynamoDB table holding the locks
    pub table: String,
}

impl StateNames {
    /// Derive the default names for a customer.
    ///
    /// The bucket name is not validated; S3 is the authority on that.
    pub fn for_customer(customer: &str) -> Self {
        Self {
            bucket: format!("{customer}{BUCKET_SUFFIX}"),
            table: DEFAULT_TABLE_NAME.to_string(),
        }
    }

    /// Use a different lock table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

/// Attribute type of the lock table's partition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAttributeType {
    /// String (`S`)
    String,
    /// Number (`N`)
    Number,
    /// Binary (`B`)
    Binary,
}

impl KeyAttributeType {
    /// DynamoDB type descriptor.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
        }
    }
}

/// Shape of the DynamoDB lock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTableSpec {
    /// Table name
    pub name: String,
    /// Partition (hash) key attribute name
    pub hash_key: String,
    /// Partition key attribute type
    pub key_type: KeyAttributeType,
    /// Provisioned read capacity units
    pub read_capacity: i64,
    /// Provisioned write capacity units
    pub write_capacity: i64,
}

impl LockTableSpec {
    /// Lock table with the `LockID` string key and 5/5 throughput.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash_key: LOCK_HASH_KEY.to_string(),
            key_type: KeyAttributeType::String,
            read_capacity: DEFAULT_CAPACITY,
            write_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Set provisioned throughput.
    pub fn with_capacity(mut self, read: i64, write: i64) -> Self {
        self.read_capacity = read;
        self.write_capacity = write;
        self
    }
}

/// The two provisioning steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Versioned S3 bucket
    Storage,
    /// DynamoDB lock table
    LockTable,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage => write!(f, "S3 bucket"),
            Self::LockTable => write!(f, "DynamoDB table"),
        }
    }
}

/// Result of one provisioning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Resource was created
    Created,
    /// Step was skipped (expected condition, not an error)
    Skipped {
        /// Why nothing was done
        reason: String,
    },
    /// Step failed
    Failed {
        /// Provider error message
        error: String,
        /// Error classification
        category: ErrorCategory,
    },
}

impl StepOutcome {
    /// Convert a provider error into a failed outcome.
    pub fn failed(err: &Error) -> Self {
        Self::Failed {
            error: err.to_string(),
            category: err.category(),
        }
    }

    /// Returns true unless the step failed.
    pub fn is_ok(&self) -> bool {
        !self.is_failed()
    }

    /// Returns true if the step failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome of a full bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Customer the resources were provisioned for
    pub customer: String,
    /// Region the resources were requested in
    pub region: String,
    /// Derived resource names
    pub names: StateNames,
    /// Bucket creation + versioning
    pub storage: StepOutcome,
    /// Lock table creation
    pub lock_table: StepOutcome,
    /// Bucket naming problems noticed before the requests were made
    pub warnings: Vec<String>,
}

impl BootstrapReport {
    /// Returns true if no step failed.
    pub fn is_success(&self) -> bool {
        self.storage.is_ok() && self.lock_table.is_ok()
    }

    /// Number of failed steps.
    pub fn failed(&self) -> usize {
        [&self.storage, &self.lock_table]
            .iter()
            .filter(|o| o.is_failed())
            .count()
    }

    /// Steps with their outcomes, in execution order.
    pub fn steps(&self) -> [(Step, &StepOutcome); 2] {
        [
            (Step::Storage, &self.storage),
            (Step::LockTable, &self.lock_table),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_for_customer() {
        let names = StateNames::for_customer("acme");
        assert_eq!(names.bucket, "acme-terraform-state");
        assert_eq!(names.table, "terraform-state-lock");
    }

    #[test]
    fn test_table_name_is_not_customer_scoped() {
        for customer in ["acme", "globex", "Initech_Corp", "x"] {
            assert_eq!(StateNames::for_customer(customer).table, DEFAULT_TABLE_NAME);
        }
    }

    #[test]
    fn test_names_are_not_sanitized() {
        let names = StateNames::for_customer("Big_Customer");
        assert_eq!(names.bucket, "Big_Customer-terraform-state");
    }

    #[test]
    fn test_with_table_override() {
        let names = StateNames::for_customer("acme").with_table("acme-lock");
        assert_eq!(names.bucket, "acme-terraform-state");
        assert_eq!(names.table, "acme-lock");
    }

    #[test]
    fn test_lock_table_defaults() {
        let spec = LockTableSpec::new(DEFAULT_TABLE_NAME);
        assert_eq!(spec.hash_key, "LockID");
        assert_eq!(spec.key_type.as_str(), "S");
        assert_eq!(spec.read_capacity, 5);
        assert_eq!(spec.write_capacity, 5);

        let spec = spec.with_capacity(1, 2);
        assert_eq!((spec.read_capacity, spec.write_capacity), (1, 2));
    }

    #[test]
    fn test_report_success() {
        let mut report = BootstrapReport {
            customer: "acme".to_string(),
            region: DEFAULT_REGION.to_string(),
            names: StateNames::for_customer("acme"),
            storage: StepOutcome::Created,
            lock_table: StepOutcome::Skipped {
                reason: "already exists".to_string(),
            },
            warnings: Vec::new(),
        };
        assert!(report.is_success());
        assert_eq!(report.failed(), 0);

        report.storage = StepOutcome::failed(&Error::Other("boom".to_string()));
        assert!(!report.is_success());
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = StepOutcome::Failed {
            error: "denied".to_string(),
            category: ErrorCategory::AccessDenied,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["category"], "access_denied");

        let json = serde_json::to_value(StepOutcome::Created).unwrap();
        assert_eq!(json["status"], "created");
    }
}
