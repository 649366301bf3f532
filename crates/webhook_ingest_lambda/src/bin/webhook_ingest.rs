use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use lambda_runtime::tracing::{self, error, info};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use webhook_ingest_core::config::IngestConfig;
use webhook_ingest_lambda::adapters::object_store::PayloadStore;
use webhook_ingest_lambda::handlers::ingest::{
    handle_ingest_event, ApiGatewayResponse, IngestHandlerConfig,
};

struct S3PayloadStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl PayloadStore for S3PayloadStore {
    async fn write_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), String> {
        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map(|_| ())
            .map_err(|error| {
                format!(
                    "failed to write object to s3: {}",
                    DisplayErrorContext(&error)
                )
            })
    }
}

async fn handle_request(
    event: LambdaEvent<Value>,
    store: &S3PayloadStore,
) -> Result<ApiGatewayResponse, Error> {
    let config = IngestHandlerConfig {
        bucket: store.bucket.clone(),
        received_at: Utc::now(),
    };
    Ok(handle_ingest_event(event.payload, &config, store).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = IngestConfig::from_env().map_err(|error| {
        error!(
            component = "ingest_handler",
            event = "startup_failed",
            error = %error,
            "invalid configuration"
        );
        error
    })?;

    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    let store = S3PayloadStore {
        bucket: config.bucket,
        s3_client: aws_sdk_s3::Client::new(&aws_config),
    };
    info!(
        component = "ingest_handler",
        event = "startup_completed",
        bucket = %store.bucket,
        region = %config.region,
        "webhook ingest ready"
    );

    lambda_runtime::run(service_fn(|event| handle_request(event, &store))).await
}
