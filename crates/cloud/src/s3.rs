//! Mirror that uploads JSONL files to an S3-compatible bucket.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use claimdesk_core::mirror::{object_key, MirrorWriteError, RecordMirror};
use claimdesk_core::record::{to_jsonl, AnnotationRecord};

use crate::config::{split_s3_credential, MirrorConfig};
use crate::http::JSONL_CONTENT_TYPE;
use crate::CloudError;

const MIRROR_NAME: &str = "s3";

/// Provider name attached to static credentials.
const CREDENTIALS_PROVIDER: &str = "claimdesk-mirror";

pub struct S3Mirror {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3Mirror {
    /// Build an S3 client for the configured endpoint.
    ///
    /// Without `MIRROR_CREDENTIAL` the default AWS provider chain is used.
    pub async fn connect(config: &MirrorConfig) -> Result<Self, CloudError> {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

        if let Some(ref credential) = config.credential {
            loader = loader.credentials_provider(static_credentials(credential)?);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
        })
    }

    pub fn key_for(&self, annotator_id: &str) -> String {
        object_key(&self.prefix, annotator_id)
    }
}

fn static_credentials(credential: &str) -> Result<Credentials, CloudError> {
    let (key_id, secret) = split_s3_credential(credential)?;
    Ok(Credentials::new(
        key_id,
        secret,
        None,
        None,
        CREDENTIALS_PROVIDER,
    ))
}

#[async_trait]
impl RecordMirror for S3Mirror {
    fn name(&self) -> &str {
        MIRROR_NAME
    }

    async fn mirror(
        &self,
        annotator_id: &str,
        records: &[AnnotationRecord],
    ) -> Result<(), MirrorWriteError> {
        let body = to_jsonl(records).map_err(|e| MirrorWriteError::new(MIRROR_NAME, e.to_string()))?;
        let key = self.key_for(annotator_id);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(JSONL_CONTENT_TYPE)
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .map_err(|e| MirrorWriteError::new(MIRROR_NAME, DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "Uploaded records to S3");
        Ok(())
    }
}
