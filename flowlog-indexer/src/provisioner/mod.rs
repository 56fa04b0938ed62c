//! Index provisioning for the flow log pipeline.
//!
//! Makes sure a destination index exists with the flow log mapping before any
//! document is written to it.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use flowlog_indexer_repository::{index_settings, IndexProvider};

use crate::deadline::Deadline;
use crate::errors::PipelineError;

/// Ensures indices exist, remembering the names confirmed during this run.
///
/// The lock is held across the existence check and the creation, so two callers
/// asking for the same name never both try to create it.
pub struct IndexProvisioner {
    provider: Arc<dyn IndexProvider>,
    settings: Value,
    confirmed: Mutex<HashSet<String>>,
}

impl IndexProvisioner {
    /// Create a provisioner using the standard flow log index settings.
    pub fn new(provider: Arc<dyn IndexProvider>) -> Self {
        Self::with_settings(provider, index_settings())
    }

    /// Create a provisioner with a custom settings and mappings body.
    pub fn with_settings(provider: Arc<dyn IndexProvider>, settings: Value) -> Self {
        Self {
            provider,
            settings,
            confirmed: Mutex::new(HashSet::new()),
        }
    }

    /// Guarantee that `index` exists.
    ///
    /// An existing index is accepted as is; its mapping is not compared. A
    /// creation the backend does not acknowledge is a failure and is not retried.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The index exists
    /// * `Err(PipelineError::IndexProvisionError)` - If it could not be confirmed or created
    #[instrument(skip(self, deadline))]
    pub async fn ensure_index(&self, index: &str, deadline: Deadline) -> Result<(), PipelineError> {
        let mut confirmed = self.confirmed.lock().await;
        if confirmed.contains(index) {
            debug!("Index already confirmed in this run");
            return Ok(());
        }

        let exists = deadline
            .run(
                async {
                    self.provider
                        .index_exists(index)
                        .await
                        .map_err(|e| PipelineError::index_provision(e.to_string()))
                },
                || {
                    PipelineError::index_provision(format!(
                        "deadline exceeded checking whether index {} exists",
                        index
                    ))
                },
            )
            .await?;

        if !exists {
            let acknowledged = deadline
                .run(
                    async {
                        self.provider
                            .create_index(index, &self.settings)
                            .await
                            .map_err(|e| PipelineError::index_provision(e.to_string()))
                    },
                    || {
                        PipelineError::index_provision(format!(
                            "deadline exceeded creating index {}",
                            index
                        ))
                    },
                )
                .await?;

            if !acknowledged {
                return Err(PipelineError::index_provision(format!(
                    "index creation not acknowledged: {}",
                    index
                )));
            }
            info!("Created index");
        }

        confirmed.insert(index.to_string());
        Ok(())
    }
}
