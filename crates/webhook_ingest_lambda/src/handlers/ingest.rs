use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lambda_runtime::tracing::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use webhook_ingest_core::contract::{
    payload_fingerprint, IngestAcceptedResponse, IngestError, IngestErrorResponse, FAILURE_LABEL,
    JSON_CONTENT_TYPE,
};
use webhook_ingest_core::payload::{InboundEvent, Payload};
use webhook_ingest_core::storage_keys::StorageKey;

use crate::adapters::object_store::PayloadStore;

const COMPONENT: &str = "ingest_handler";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestHandlerConfig {
    pub bucket: String,
    pub received_at: DateTime<Utc>,
}

/// Stores the payload derived from `event` and shapes the gateway response.
/// Failures never escape: they are logged and returned as a 500.
pub async fn handle_ingest_event(
    event: Value,
    config: &IngestHandlerConfig,
    store: &impl PayloadStore,
) -> ApiGatewayResponse {
    match ingest(InboundEvent::new(event), config, store).await {
        Ok(accepted) => success_response(&accepted),
        Err(error) => {
            error!(
                component = COMPONENT,
                event = "ingest_failed",
                error_code = error.code(),
                error = %error,
                "error processing webhook"
            );
            error_response(500, &IngestErrorResponse::from_error(&error))
        }
    }
}

async fn ingest(
    event: InboundEvent,
    config: &IngestHandlerConfig,
    store: &impl PayloadStore,
) -> Result<IngestAcceptedResponse, IngestError> {
    info!(
        component = COMPONENT,
        event = "payload_received",
        inbound = %event.as_value(),
        "received event"
    );

    let payload = event.into_payload();
    log_payload_decision(&payload);

    let key = StorageKey::generate(config.received_at, &mut rand::thread_rng());
    let body = payload.to_pretty_json()?;
    let stored_bytes = body.len();
    let fingerprint = payload_fingerprint(&body);

    store
        .write_object(key.as_str(), body, JSON_CONTENT_TYPE)
        .await
        .map_err(IngestError::Storage)?;

    info!(
        component = COMPONENT,
        event = "payload_stored",
        location = %format!("s3://{}/{}", config.bucket, key),
        payload_kind = payload.kind(),
        bytes = stored_bytes,
        fingerprint = %fingerprint,
        "payload saved"
    );

    Ok(IngestAcceptedResponse::new(key.as_str(), key.timestamp()))
}

fn log_payload_decision(payload: &Payload) {
    match payload {
        Payload::Parsed(value) => info!(
            component = COMPONENT,
            event = "body_parsed",
            payload = %value,
            "parsed body"
        ),
        Payload::RawWithContext { raw_body, .. } => warn!(
            component = COMPONENT,
            event = "body_unparsable",
            raw_body = %raw_body,
            "could not parse event body as JSON, using raw body"
        ),
        Payload::Event(_) => info!(
            component = COMPONENT,
            event = "body_absent",
            "no body present, storing full event"
        ),
    }
}

fn success_response(payload: &IngestAcceptedResponse) -> ApiGatewayResponse {
    let mut response = json_response(200, encode_body(payload));
    response
        .headers
        .insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    response
}

fn error_response(status_code: u16, payload: &IngestErrorResponse) -> ApiGatewayResponse {
    json_response(status_code, encode_body(payload))
}

fn json_response(status_code: u16, body: String) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: BTreeMap::from([("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())]),
        body,
    }
}

fn encode_body(payload: &impl Serialize) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        json!({
            "error": FAILURE_LABEL,
            "message": error.to_string(),
        })
        .to_string()
    })
}
