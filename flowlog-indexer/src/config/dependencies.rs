//! Dependency initialization and wiring for the flow log indexer.

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Credentials;
use aws_types::region::Region;
use aws_types::SdkConfig;
use tracing::info;

use flowlog_indexer_repository::{IndexProvider, OpenSearchProvider};

use super::Config;
use crate::loader::FlowLogLoader;
use crate::orchestrator::Pipeline;
use crate::provisioner::IndexProvisioner;
use crate::source::S3ObjectStore;
use crate::IndexingError;

/// Name attached to the static credentials for diagnostics.
const CREDENTIALS_PROVIDER_NAME: &str = "flowlog-indexer";

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured pipeline, shared by every invocation of the process.
    pub pipeline: Pipeline,
}

impl Dependencies {
    /// Wire every pipeline component from `config`.
    ///
    /// S3 reads and OpenSearch requests use the same static credentials. S3
    /// clients follow the region of each notification; OpenSearch requests are
    /// signed for the domain region.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the OpenSearch client cannot be built
    pub async fn new(config: &Config) -> Result<Self, IndexingError> {
        info!(
            es_host = %config.es_host,
            es_region = %config.es_region,
            index_prefix = %config.index_prefix,
            request_timeout_secs = config.request_timeout.as_secs(),
            "Initializing dependencies"
        );

        let sdk_config = Self::sdk_config(config).await;

        let provider: Arc<dyn IndexProvider> = Arc::new(
            OpenSearchProvider::with_aws_auth(&config.es_host, &sdk_config).map_err(|e| {
                IndexingError::config(format!("Failed to create OpenSearch provider: {}", e))
            })?,
        );

        let store = Arc::new(S3ObjectStore::new(sdk_config));
        let provisioner = IndexProvisioner::new(provider.clone());
        let loader = FlowLogLoader::new(provider);

        let pipeline = Pipeline::new(store, provisioner, loader, config.index_prefix.clone())
            .with_step_timeout(config.request_timeout);

        Ok(Self { pipeline })
    }

    async fn sdk_config(config: &Config) -> SdkConfig {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            config.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.es_region.clone()))
            .credentials_provider(credentials)
            .load()
            .await
    }
}
