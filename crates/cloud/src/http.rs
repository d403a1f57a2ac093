//! Mirror that `PUT`s JSONL files to an HTTP object endpoint.

use async_trait::async_trait;
use claimdesk_core::mirror::{object_key, MirrorWriteError, RecordMirror};
use claimdesk_core::record::{to_jsonl, AnnotationRecord};

use crate::config::MirrorConfig;
use crate::CloudError;

const MIRROR_NAME: &str = "http";

/// Content type of uploaded record files.
pub const JSONL_CONTENT_TYPE: &str = "application/x-ndjson";

pub struct HttpMirror {
    client: reqwest::Client,
    endpoint: String,
    prefix: String,
    credential: Option<String>,
}

impl HttpMirror {
    pub fn new(config: &MirrorConfig) -> Result<Self, CloudError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CloudError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            prefix: config.prefix.clone(),
            credential: config.credential.clone(),
        })
    }

    /// Full URL of an annotator's mirrored file.
    pub fn object_url(&self, annotator_id: &str) -> String {
        format!("{}/{}", self.endpoint, object_key(&self.prefix, annotator_id))
    }
}

#[async_trait]
impl RecordMirror for HttpMirror {
    fn name(&self) -> &str {
        MIRROR_NAME
    }

    async fn mirror(
        &self,
        annotator_id: &str,
        records: &[AnnotationRecord],
    ) -> Result<(), MirrorWriteError> {
        let body = to_jsonl(records).map_err(|e| MirrorWriteError::new(MIRROR_NAME, e.to_string()))?;

        let mut request = self
            .client
            .put(self.object_url(annotator_id))
            .header(reqwest::header::CONTENT_TYPE, JSONL_CONTENT_TYPE)
            .body(body);
        if let Some(ref token) = self.credential {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MirrorWriteError::new(MIRROR_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorWriteError::new(
                MIRROR_NAME,
                format!("endpoint responded with {status}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::put;
    use axum::Router;
    use chrono::Utc;

    use super::*;
    use crate::config::MirrorProvider;

    #[derive(Clone, Default)]
    struct Captured {
        uploads: Arc<Mutex<Vec<(String, Option<String>, String)>>>,
    }

    async fn capture(
        State(captured): State<Captured>,
        Path(key): Path<String>,
        headers: HeaderMap,
        body: String,
    ) -> StatusCode {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured.uploads.lock().unwrap().push((key, auth, body));
        StatusCode::OK
    }

    async fn reject() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(endpoint: String, credential: Option<&str>) -> MirrorConfig {
        MirrorConfig {
            provider: MirrorProvider::Http,
            endpoint,
            credential: credential.map(str::to_string),
            bucket: String::new(),
            region: String::new(),
            prefix: "annotations".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    fn record(item: &str) -> AnnotationRecord {
        AnnotationRecord {
            annotator_id: "annotator_01".to_string(),
            item_id: item.to_string(),
            is_claim: true,
            is_checkworthy: Some(true),
            timestamp: Utc::now(),
            text: None,
            image_reference: None,
        }
    }

    #[tokio::test]
    async fn uploads_jsonl_with_bearer_token() {
        let captured = Captured::default();
        let app = Router::new()
            .route("/{*key}", put(capture))
            .with_state(captured.clone());
        let endpoint = serve(app).await;

        let mirror = HttpMirror::new(&config(endpoint, Some("tok"))).unwrap();
        mirror
            .mirror("annotator_01", &[record("a1"), record("a2")])
            .await
            .unwrap();

        let uploads = captured.uploads.lock().unwrap().clone();
        assert_eq!(uploads.len(), 1);
        let (key, auth, body) = &uploads[0];
        assert_eq!(key, "annotations/annotator_01/annotator_01_annotations.jsonl");
        assert_eq!(auth.as_deref(), Some("Bearer tok"));
        assert_eq!(body.lines().count(), 2);
    }

    #[tokio::test]
    async fn non_success_status_is_mirror_error() {
        let app = Router::new().route("/{*key}", put(reject));
        let endpoint = serve(app).await;

        let mirror = HttpMirror::new(&config(endpoint, None)).unwrap();
        let err = mirror.mirror("annotator_01", &[record("a1")]).await.unwrap_err();
        assert_eq!(err.mirror, "http");
        assert!(err.message.contains("500"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_mirror_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mirror = HttpMirror::new(&config(format!("http://{addr}"), None)).unwrap();
        assert!(mirror.mirror("annotator_01", &[]).await.is_err());
    }

    #[test]
    fn object_url_joins_endpoint_and_key() {
        let mirror = HttpMirror::new(&config("https://m.example.org/".to_string(), None)).unwrap();
        assert_eq!(
            mirror.object_url("u1"),
            "https://m.example.org/annotations/u1/u1_annotations.jsonl"
        );
    }
}
