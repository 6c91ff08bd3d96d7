//! AWS backend implementation.
//!
//! Talks to S3 and DynamoDB through the official SDK. The SDK is async;
//! this backend owns a current-thread runtime and blocks on every call, so
//! callers see plain sequential, blocking operations.

use std::fmt::Debug;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types::{
    BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration,
    VersioningConfiguration,
};
use tokio::runtime::Runtime;

use crate::error::{Error, Result};
use crate::settings::AwsSettings;
use crate::types::{KeyAttributeType, LockTableSpec};

use super::{LockTableBackend, StorageBackend};

/// Backend implementation using the AWS SDK.
pub struct AwsBackend {
    runtime: Runtime,
    s3: aws_sdk_s3::Client,
    dynamodb: aws_sdk_dynamodb::Client,
}

impl AwsBackend {
    /// Build both clients from explicit settings.
    ///
    /// Unset fields fall back to the SDK's default provider chain.
    pub fn new(settings: &AwsSettings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Setup(format!("failed to start async runtime: {e}")))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(url) = &settings.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        if let Some(creds) = &settings.credentials {
            loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                creds.session_token.clone(),
                None,
                "statekit",
            ));
        }

        log::debug!(
            "Loading AWS config (region: {}, credentials: {})",
            settings.region,
            settings.credential_source()
        );
        let sdk_config = runtime.block_on(loader.load());

        // Custom endpoints (LocalStack, MinIO) rarely support virtual-hosted buckets
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint_url.is_some())
            .build();

        let s3 = aws_sdk_s3::Client::from_conf(s3_config);
        let dynamodb = aws_sdk_dynamodb::Client::new(&sdk_config);
        Ok(Self::from_clients(runtime, s3, dynamodb))
    }

    /// Wrap already configured clients.
    pub fn from_clients(
        runtime: Runtime,
        s3: aws_sdk_s3::Client,
        dynamodb: aws_sdk_dynamodb::Client,
    ) -> Self {
        Self {
            runtime,
            s3,
            dynamodb,
        }
    }
}

impl StorageBackend for AwsBackend {
    fn create_bucket(&self, name: &str, region: &str) -> Result<()> {
        log::debug!("CreateBucket {name} (LocationConstraint: {region})");

        let config = CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build();

        self.runtime
            .block_on(
                self.s3
                    .create_bucket()
                    .bucket(name)
                    .create_bucket_configuration(config)
                    .send(),
            )
            .map_err(|e| sdk_error("S3", "CreateBucket", e))?;

        Ok(())
    }

    fn enable_versioning(&self, name: &str) -> Result<()> {
        log::debug!("PutBucketVersioning {name} (Status: Enabled)");

        let config = VersioningConfiguration::builder()
            .status(BucketVersioningStatus::Enabled)
            .build();

        self.runtime
            .block_on(
                self.s3
                    .put_bucket_versioning()
                    .bucket(name)
                    .versioning_configuration(config)
                    .send(),
            )
            .map_err(|e| sdk_error("S3", "PutBucketVersioning", e))?;

        Ok(())
    }
}

impl LockTableBackend for AwsBackend {
    fn create_table(&self, spec: &LockTableSpec) -> Result<()> {
        log::debug!(
            "CreateTable {} (hash key: {} {}, throughput: {}/{})",
            spec.name,
            spec.hash_key,
            spec.key_type.as_str(),
            spec.read_capacity,
            spec.write_capacity
        );

        let key_schema = KeySchemaElement::builder()
            .attribute_name(&spec.hash_key)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| Error::Other(format!("invalid key schema: {e}")))?;

        let attribute = AttributeDefinition::builder()
            .attribute_name(&spec.hash_key)
            .attribute_type(scalar_type(spec.key_type))
            .build()
            .map_err(|e| Error::Other(format!("invalid attribute definition: {e}")))?;

        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(spec.read_capacity)
            .write_capacity_units(spec.write_capacity)
            .build()
            .map_err(|e| Error::Other(format!("invalid provisioned throughput: {e}")))?;

        let result = self.runtime.block_on(
            self.dynamodb
                .create_table()
                .table_name(&spec.name)
                .key_schema(key_schema)
                .attribute_definitions(attribute)
                .provisioned_throughput(throughput)
                .send(),
        );

        match result {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(service)) if service.err().is_resource_in_use_exception() => {
                Err(Error::TableExists(spec.name.clone()))
            }
            Err(e) => Err(sdk_error("DynamoDB", "CreateTable", e)),
        }
    }
}

fn scalar_type(key_type: KeyAttributeType) -> ScalarAttributeType {
    match key_type {
        KeyAttributeType::String => ScalarAttributeType::S,
        KeyAttributeType::Number => ScalarAttributeType::N,
        KeyAttributeType::Binary => ScalarAttributeType::B,
    }
}

/// Convert an SDK error into our error, keeping the AWS error code.
fn sdk_error<E, R>(service: &'static str, operation: &'static str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => Error::Network {
            service,
            operation,
            message: DisplayErrorContext(&err).to_string(),
        },
        _ => Error::Service {
            service,
            operation,
            code: err.code().unwrap_or("Unknown").to_string(),
            message: err
                .message()
                .map_or_else(|| DisplayErrorContext(&err).to_string(), str::to_string),
        },
    }
}
