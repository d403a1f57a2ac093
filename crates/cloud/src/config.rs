use std::time::Duration;

use crate::CloudError;

/// Which mirror implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorProvider {
    Http,
    S3,
}

impl MirrorProvider {
    pub fn from_name(name: &str) -> Result<Self, CloudError> {
        match name.trim() {
            "http" => Ok(Self::Http),
            "s3" => Ok(Self::S3),
            other => Err(CloudError::Config(format!(
                "Unknown mirror provider '{other}'. Must be one of: http, s3"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::S3 => "s3",
        }
    }
}

/// Mirror settings.
///
/// | Env Var               | Default                  |
/// |-----------------------|--------------------------|
/// | `MIRROR_PROVIDER`     | `http`                   |
/// | `MIRROR_ENDPOINT`     | (required)               |
/// | `MIRROR_CREDENTIAL`   | none                     |
/// | `MIRROR_BUCKET`       | `claimdesk-annotations`  |
/// | `MIRROR_REGION`       | `us-east-1`              |
/// | `MIRROR_PREFIX`       | `annotations`            |
/// | `MIRROR_TIMEOUT_SECS` | `10`                     |
#[derive(Clone)]
pub struct MirrorConfig {
    pub provider: MirrorProvider,
    pub endpoint: String,
    /// Bearer token for `http`, `access_key_id:secret_access_key` for `s3`.
    pub credential: Option<String>,
    pub bucket: String,
    pub region: String,
    pub prefix: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for MirrorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("prefix", &self.prefix)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MirrorConfig {
    /// Load mirror configuration from environment variables.
    pub fn from_env() -> Result<Self, CloudError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load mirror configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, CloudError> {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = MirrorProvider::from_name(
            &non_empty("MIRROR_PROVIDER").unwrap_or_else(|| "http".into()),
        )?;

        let endpoint = non_empty("MIRROR_ENDPOINT").ok_or_else(|| {
            CloudError::Config("MIRROR_ENDPOINT must be set when mirroring is enabled".into())
        })?;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(CloudError::Config(format!(
                "MIRROR_ENDPOINT must be an http(s) URL, got '{endpoint}'"
            )));
        }

        let credential = non_empty("MIRROR_CREDENTIAL");
        if provider == MirrorProvider::S3 {
            if let Some(ref c) = credential {
                split_s3_credential(c)?;
            }
        }

        let timeout_secs: u64 = non_empty("MIRROR_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".into())
            .parse()
            .map_err(|_| CloudError::Config("MIRROR_TIMEOUT_SECS must be a valid u64".into()))?;

        Ok(Self {
            provider,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
            bucket: non_empty("MIRROR_BUCKET").unwrap_or_else(|| "claimdesk-annotations".into()),
            region: non_empty("MIRROR_REGION").unwrap_or_else(|| "us-east-1".into()),
            prefix: non_empty("MIRROR_PREFIX").unwrap_or_else(|| "annotations".into()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Split an S3 credential of the form `access_key_id:secret_access_key`.
pub(crate) fn split_s3_credential(credential: &str) -> Result<(&str, &str), CloudError> {
    match credential.split_once(':') {
        Some((key_id, secret)) if !key_id.is_empty() && !secret.is_empty() => Ok((key_id, secret)),
        _ => Err(CloudError::Config(
            "MIRROR_CREDENTIAL for s3 must be 'access_key_id:secret_access_key'".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_http_provider() {
        let config = MirrorConfig::from_vars(vars(&[(
            "MIRROR_ENDPOINT",
            "https://mirror.example.org/",
        )]))
        .unwrap();

        assert_eq!(config.provider, MirrorProvider::Http);
        assert_eq!(config.endpoint, "https://mirror.example.org");
        assert_eq!(config.prefix, "annotations");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.credential.is_none());
    }

    #[test]
    fn endpoint_is_required() {
        assert!(MirrorConfig::from_vars(vars(&[])).is_err());
        assert!(MirrorConfig::from_vars(vars(&[("MIRROR_ENDPOINT", "ftp://x")])).is_err());
    }

    #[test]
    fn s3_credential_must_have_two_parts() {
        let bad = MirrorConfig::from_vars(vars(&[
            ("MIRROR_PROVIDER", "s3"),
            ("MIRROR_ENDPOINT", "http://localhost:9000"),
            ("MIRROR_CREDENTIAL", "only-a-key"),
        ]));
        assert!(bad.is_err());

        let good = MirrorConfig::from_vars(vars(&[
            ("MIRROR_PROVIDER", "s3"),
            ("MIRROR_ENDPOINT", "http://localhost:9000"),
            ("MIRROR_CREDENTIAL", "AKIA:secret"),
            ("MIRROR_BUCKET", "labels"),
        ]))
        .unwrap();
        assert_eq!(good.provider, MirrorProvider::S3);
        assert_eq!(good.bucket, "labels");
    }

    #[test]
    fn debug_output_redacts_credential() {
        let config = MirrorConfig::from_vars(vars(&[
            ("MIRROR_ENDPOINT", "https://mirror.example.org"),
            ("MIRROR_CREDENTIAL", "top-secret-token"),
        ]))
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(MirrorProvider::from_name("gdrive").is_err());
    }
}
