use serde::Serialize;

use crate::naming;
use crate::types::{DEFAULT_CAPACITY, LockTableSpec, StateNames};

/// Where and how state storage is provisioned, independent of any client.
///
/// A [`Bootstrapper`](crate::Bootstrapper) derives every request from its
/// layout, so a dry run rendered from [`Layout::plan`] describes exactly the
/// calls a real run makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    region: String,
    table: Option<String>,
    read_capacity: i64,
    write_capacity: i64,
}

impl Layout {
    /// Shared default lock table with 5/5 throughput.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            table: None,
            read_capacity: DEFAULT_CAPACITY,
            write_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Use a lock table other than the shared `terraform-state-lock`.
    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the lock table's provisioned throughput.
    pub fn with_capacity(mut self, read: i64, write: i64) -> Self {
        self.read_capacity = read;
        self.write_capacity = write;
        self
    }

    /// Region resources are requested in.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Resource names for a customer.
    pub fn names(&self, customer: &str) -> StateNames {
        let names = StateNames::for_customer(customer);
        match &self.table {
            Some(table) => names.with_table(table.clone()),
            None => names,
        }
    }

    /// Lock table shape requested for `table`.
    pub fn lock_table_spec(&self, table: &str) -> LockTableSpec {
        LockTableSpec::new(table).with_capacity(self.read_capacity, self.write_capacity)
    }

    /// Everything a bootstrap for `customer` would request.
    pub fn plan(&self, customer: &str) -> Plan {
        let names = self.names(customer);
        let lock_table = self.lock_table_spec(&names.table);
        let warnings = naming::bucket_name_warnings(&names.bucket);

        Plan {
            customer: customer.to_string(),
            region: self.region.clone(),
            names,
            lock_table,
            warnings,
        }
    }
}

/// The requests a bootstrap run makes for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Customer the resources are for
    pub customer: String,
    /// Region of the bucket and the lock table
    pub region: String,
    /// Derived resource names
    pub names: StateNames,
    /// Lock table shape
    pub lock_table: LockTableSpec,
    /// Bucket naming problems S3 is likely to reject
    pub warnings: Vec<String>,
}
