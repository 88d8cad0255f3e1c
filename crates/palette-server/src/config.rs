use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use palette_core::ExtractorConfig;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

const DEFAULT_MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub extractor: ExtractorConfig,
    pub fetch_timeout: Duration,
    pub max_image_bytes: usize,
    /// User ids flagged as admins at startup.
    pub admin_ids: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("PALETTE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PALETTE_JWT_SECRET is unset or still a placeholder");
        }

        let host = var("PALETTE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_var(&var, "PALETTE_PORT")?.unwrap_or(3000);
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let mut extractor = ExtractorConfig::default();
        if let Some(stride) = parse_var(&var, "PALETTE_SAMPLE_STRIDE")? {
            extractor.sample_stride = stride;
        }
        if let Some(threshold) = parse_var(&var, "PALETTE_ALPHA_THRESHOLD")? {
            extractor.alpha_threshold = threshold;
        }
        if let Some(colors) = var("PALETTE_EXCLUDED_COLORS") {
            extractor.excluded_colors = split_list(&colors);
        }

        Ok(Self {
            addr,
            db_path: var("PALETTE_DB_PATH")
                .unwrap_or_else(|| "palette.db".into())
                .into(),
            jwt_secret,
            extractor,
            fetch_timeout: Duration::from_secs(
                parse_var(&var, "PALETTE_FETCH_TIMEOUT_SECS")?.unwrap_or(10),
            ),
            max_image_bytes: parse_var(&var, "PALETTE_MAX_IMAGE_BYTES")?
                .unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
            admin_ids: var("PALETTE_ADMIN_IDS")
                .map(|ids| split_list(&ids))
                .unwrap_or_default(),
        })
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .with_context(|| format!("{} has invalid value '{}'", key, value))
        })
        .transpose()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("PALETTE_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("palette.db"));
        assert_eq!(config.extractor, ExtractorConfig::default());
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.max_image_bytes, 8 * 1024 * 1024);
        assert!(config.admin_ids.is_empty());
    }

    #[test]
    fn refuses_missing_or_placeholder_secret() {
        assert!(load(&[]).is_err());
        assert!(load(&[("PALETTE_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PALETTE_JWT_SECRET", "s3cret"),
            ("PALETTE_HOST", "127.0.0.1"),
            ("PALETTE_PORT", "8080"),
            ("PALETTE_SAMPLE_STRIDE", "1"),
            ("PALETTE_ALPHA_THRESHOLD", "128"),
            ("PALETTE_EXCLUDED_COLORS", "#000000, #ffffff,"),
            ("PALETTE_ADMIN_IDS", "user_1,user_2"),
        ])
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.extractor.sample_stride, 1);
        assert_eq!(config.extractor.alpha_threshold, 128);
        assert_eq!(config.extractor.excluded_colors, vec!["#000000", "#ffffff"]);
        assert_eq!(config.admin_ids, vec!["user_1", "user_2"]);
    }

    #[test]
    fn rejects_unparsable_numbers() {
        let err = load(&[("PALETTE_JWT_SECRET", "s3cret"), ("PALETTE_PORT", "eighty")])
            .unwrap_err();
        assert!(err.to_string().contains("PALETTE_PORT"));
    }
}
