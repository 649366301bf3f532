use std::future::Future;

/// Destination for serialized payloads. Implementations perform a single
/// write per call with no retry.
pub trait PayloadStore {
    fn write_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;
}
