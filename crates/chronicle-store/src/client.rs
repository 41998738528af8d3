//! Read access to the section and annotation store.
//!
//! Every endpoint answers with JSON. A document carrying an `error` field
//! is a failure even when it arrives with a success status.

use std::future::Future;

use chronicle_core::{
    Annotation, AnnotationSpec, LoadError, LoadKind, ReadingToken, Section, SectionId,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;

/// Trait for the store's read endpoints.
///
/// Implementations can talk HTTP, replay fixtures or serve from a cache.
pub trait AnnotationStore {
    /// All section descriptors.
    fn sections(&self) -> impl Future<Output = Result<Vec<Section>, LoadError>>;

    /// The full annotation corpus.
    fn annotations(&self) -> impl Future<Output = Result<Vec<Annotation>, LoadError>>;

    /// Label specs, one per annotation label.
    fn annotation_labels(&self) -> impl Future<Output = Result<Vec<AnnotationSpec>, LoadError>>;

    /// Lemma readings of one section, in document order.
    fn lemma_readings(
        &self,
        section: &SectionId,
    ) -> impl Future<Output = Result<Vec<ReadingToken>, LoadError>>;
}

/// Decode a store response body, treating `{"error": ...}` as a failure.
pub fn decode_payload<T: DeserializeOwned>(kind: LoadKind, body: &[u8]) -> Result<T, LoadError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|source| LoadError::Decode { kind, source })?;

    if let Some(error) = value.as_object().and_then(|obj| obj.get("error")) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(LoadError::Remote { kind, message });
    }

    serde_json::from_value(value).map_err(|source| LoadError::Decode { kind, source })
}

/// Store client over HTTP.
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpStore {
    pub fn new(endpoint: &str) -> Result<Self, StoreError> {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Client with a per-request timeout.
    #[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
    pub fn with_timeout(endpoint: &str, timeout: std::time::Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, endpoint)
    }

    /// Use a preconfigured client (timeouts, headers).
    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self, StoreError> {
        let mut base = Url::parse(endpoint)?;
        // Url::join drops the last path segment unless it ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of an endpoint below `api/`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join("api/")?.join(path)
    }

    async fn fetch<T: DeserializeOwned>(&self, kind: LoadKind, path: &str) -> Result<T, LoadError> {
        let url = self
            .endpoint_url(path)
            .map_err(|e| LoadError::Transport {
                kind,
                source: Box::new(e),
            })?;

        let started = web_time::Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LoadError::Transport {
                kind,
                source: Box::new(e),
            })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| LoadError::Transport {
            kind,
            source: Box::new(e),
        })?;

        tracing::debug!(
            target: "chronicle::store",
            %url,
            %status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched {kind}"
        );

        decode_payload(kind, &body)
    }
}

impl AnnotationStore for HttpStore {
    async fn sections(&self) -> Result<Vec<Section>, LoadError> {
        self.fetch(LoadKind::Sections, "sections").await
    }

    async fn annotations(&self) -> Result<Vec<Annotation>, LoadError> {
        self.fetch(LoadKind::Annotations, "annotations").await
    }

    async fn annotation_labels(&self) -> Result<Vec<AnnotationSpec>, LoadError> {
        self.fetch(LoadKind::Labels, "annotationlabels").await
    }

    async fn lemma_readings(&self, section: &SectionId) -> Result<Vec<ReadingToken>, LoadError> {
        let path = format!("section/{section}/lemmareadings");
        self.fetch(LoadKind::SectionText, &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_payload() {
        let err = decode_payload::<Vec<Annotation>>(LoadKind::Annotations, br#"{"error": "boom"}"#)
            .unwrap_err();
        match err {
            LoadError::Remote { kind, message } => {
                assert_eq!(kind, LoadKind::Annotations);
                assert_eq!(message, "boom");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_structured_error_payload() {
        let err = decode_payload::<Vec<Section>>(LoadKind::Sections, br#"{"error": {"code": 3}}"#)
            .unwrap_err();
        assert_eq!(err.message(), r#"{"code":3}"#);
    }

    #[test]
    fn test_decode_valid_payload() {
        let annotations: Vec<Annotation> = decode_payload(
            LoadKind::Annotations,
            br#"[{"id": 5, "label": "PERSONREF", "links": [{"type": "BEGIN", "target": 1}]}]"#,
        )
        .unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].id, 5);
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_payload::<Vec<Section>>(LoadKind::Sections, b"<html>").unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
        let err = decode_payload::<Vec<Section>>(LoadKind::Sections, br#"{"ok": 1}"#).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn test_endpoint_urls() {
        let store = HttpStore::new("http://localhost:3000").unwrap();
        assert_eq!(
            store.endpoint_url("annotations").unwrap().as_str(),
            "http://localhost:3000/api/annotations"
        );

        let store = HttpStore::new("https://example.org/editor").unwrap();
        assert_eq!(
            store.endpoint_url("section/12/lemmareadings").unwrap().as_str(),
            "https://example.org/editor/api/section/12/lemmareadings"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            HttpStore::new("not a url"),
            Err(StoreError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_with_timeout() {
        let store = HttpStore::with_timeout("http://localhost:3000", std::time::Duration::from_secs(5))
            .unwrap();
        assert_eq!(store.base().as_str(), "http://localhost:3000/");
        assert!(matches!(
            HttpStore::with_timeout("not a url", std::time::Duration::from_secs(5)),
            Err(StoreError::InvalidEndpoint(_))
        ));
    }
}
