//! Signed URL issuance and verification.
//!
//! A signed URL has the form
//! `{base}/object/sign/{bucket}/{encoded path}?expires={unix}&token={token}`,
//! where the token is the URL-safe base64 HMAC-SHA256 of the bucket, path,
//! and expiry keyed by the signing secret. Path segments are percent-encoded individually
//! so the object path can be recovered from the URL.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use bugtrack_core::error::AppError;
use bugtrack_core::result::AppResult;

type HmacSha256 = Hmac<Sha256>;

/// Characters left unescaped inside a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Issues and checks capability URLs for objects in private buckets.
#[derive(Clone)]
pub struct UrlSigner {
    secret: String,
    base_url: String,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    /// Create a signer. An empty secret is rejected.
    pub fn new(secret: impl Into<String>, base_url: impl Into<String>) -> AppResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AppError::configuration("storage.signing_secret is not set"));
        }
        HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid signing secret: {e}")))?;
        Ok(Self {
            secret,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Sign `path` in `bucket`, valid for `expires_in` from now.
    pub fn sign(&self, bucket: &str, path: &str, expires_in: Duration) -> AppResult<String> {
        let ttl = chrono::Duration::from_std(expires_in)
            .map_err(|_| AppError::validation("Signed URL lifetime is out of range"))?;
        self.sign_until(bucket, path, Utc::now() + ttl)
    }

    /// Sign `path` in `bucket`, valid until `expires_at`.
    pub fn sign_until(
        &self,
        bucket: &str,
        path: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(AppError::validation("Cannot sign an empty object path"));
        }
        let expires = expires_at.timestamp();
        let digest = self.mac(bucket, path, expires)?.finalize().into_bytes();
        let token = URL_SAFE_NO_PAD.encode(digest);
        Ok(format!(
            "{}/object/sign/{}/{}?expires={}&token={}",
            self.base_url,
            bucket,
            encode_path(path),
            expires,
            token
        ))
    }

    /// Check that `url` was issued by this signer for `bucket` and has not
    /// expired at `now`. Returns the decoded object path.
    pub fn verify(&self, bucket: &str, url: &str, now: DateTime<Utc>) -> AppResult<String> {
        let path = self
            .object_path(bucket, url)
            .ok_or_else(|| AppError::authorization("Malformed signed URL"))?;
        let query = url
            .split_once('?')
            .map(|(_, q)| q)
            .ok_or_else(|| AppError::authorization("Signed URL has no query"))?;

        let mut expires = None;
        let mut token = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse::<i64>().ok(),
                Some(("token", v)) => token = Some(v),
                _ => {}
            }
        }
        let (Some(expires), Some(token)) = (expires, token) else {
            return Err(AppError::authorization("Signed URL is missing its token"));
        };

        let presented = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| AppError::authorization("Signed URL token is not valid base64"))?;
        self.mac(bucket, &path, expires)?
            .verify_slice(&presented)
            .map_err(|_| AppError::authorization("Signed URL token mismatch"))?;
        if now.timestamp() > expires {
            return Err(AppError::authorization("Signed URL has expired"));
        }
        Ok(path)
    }

    /// Recover the decoded object path from a URL issued for `bucket`.
    pub fn object_path(&self, bucket: &str, url: &str) -> Option<String> {
        let prefix = format!("{}/object/sign/{}/", self.base_url, bucket);
        let rest = url.strip_prefix(&prefix)?;
        let encoded = rest.split('?').next()?;
        let decoded = percent_decode_str(encoded).decode_utf8().ok()?;
        Some(decoded.into_owned())
    }

    fn mac(&self, bucket: &str, path: &str, expires: i64) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::configuration(format!("Invalid signing secret: {e}")))?;
        mac.update(bucket.as_bytes());
        mac.update(b"\n");
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
