//! Flow Log Indexer Lambda Entry Point
//!
//! Receives S3 object-created events and loads the referenced flow log objects
//! into OpenSearch.

use std::env;

use aws_lambda_events::event::s3::S3Event;
use dotenv::dotenv;
use flowlog_indexer::trigger::notifications;
use flowlog_indexer::{Config, Deadline, Dependencies, IndexingError, InvocationReport, Pipeline};
use lambda_runtime::{run, service_fn, LambdaEvent};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
///
/// JSON output is used inside Lambda or when `LOG_FORMAT=json`.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flowlog_indexer=info,flowlog_indexer_repository=info"));

    let json = match env::var("LOG_FORMAT") {
        Ok(format) => format.eq_ignore_ascii_case("json"),
        Err(_) => env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok(),
    };

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .without_time(),
            )
            .try_init()
            .map_err(|e| IndexingError::runtime(e.to_string()))?;

        info!(
            service_name = "flowlog-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| IndexingError::runtime(e.to_string()))?;

        info!(
            service_name = "flowlog-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

async fn handle(pipeline: &Pipeline, event: LambdaEvent<S3Event>) -> Result<InvocationReport, lambda_runtime::Error> {
    let deadline = Deadline::from_epoch_millis(event.context.deadline);
    let notifications = notifications(&event.payload);

    info!(
        request_id = %event.context.request_id,
        object_count = notifications.len(),
        "Received S3 event"
    );

    Ok(pipeline.run(&notifications, deadline).await)
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting flow log indexer");

    // Missing configuration fails the function before any object is processed
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };

    let deps = Dependencies::new(&config).await?;
    info!("Dependencies initialized successfully");

    let pipeline = &deps.pipeline;
    run(service_fn(|event: LambdaEvent<S3Event>| handle(pipeline, event)))
        .await
        .map_err(|e| {
            error!(error = %e, "Lambda runtime failed");
            IndexingError::runtime(e.to_string())
        })
}
