//! Request signing for HMAC-authenticated endpoints
//!
//! Two schemes are supported:
//!
//! - **Generic HMAC-SHA256**: signs `timestamp + identity + compact_json(payload)`
//!   and returns three header values (`X-Timestamp`, `X-User`, `X-Signature`).
//! - **Private v2.03 HMAC-SHA1**: signs the two-line string
//!   `date: <date>\nsource: test_api` and returns a composite `Authorization`
//!   value plus the date, which must be sent verbatim as the `Date` header.
//!
//! Both are pure functions of their inputs and the supplied clock value. Empty
//! secrets or identities still produce a well-formed (if useless) signature;
//! presence is checked before a batch starts.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha1::Sha1;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// Value of the `Source` header, also part of the v2.03 signing string
pub const PRIVATE_SOURCE: &str = "test_api";

/// Value of the `Apiversion` header for the private gateway
pub const PRIVATE_API_VERSION: &str = "v2.03";

/// `strftime` layout of the v2.03 `Date` header (always UTC)
const PRIVATE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Header values produced by the generic HMAC-SHA256 scheme
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericHmacHeaders {
    /// Unix seconds as a decimal string (`X-Timestamp`)
    pub timestamp: String,
    /// Caller identity (`X-User`)
    pub user: String,
    /// Lowercase hex HMAC-SHA256 (`X-Signature`)
    pub signature: String,
}

impl GenericHmacHeaders {
    /// Header name/value pairs in sending order
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("X-Timestamp", self.timestamp.as_str()),
            ("X-User", self.user.as_str()),
            ("X-Signature", self.signature.as_str()),
        ]
    }
}

/// Authentication material for the private v2.03 gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateAuth {
    /// Full `Authorization` header value
    pub authorization: String,
    /// `Date` header value; byte-identical to the signed date line
    pub date: String,
}

/// Sign a payload with the generic HMAC-SHA256 scheme
pub fn sign_generic(secret: &str, identity: &str, payload: &Value, now: DateTime<Utc>) -> GenericHmacHeaders {
    let timestamp = now.timestamp().to_string();
    // Value's Display is the compact serialization
    let signing_string = format!("{timestamp}{identity}{payload}");

    let mut mac = mac_sha256(secret);
    mac.update(signing_string.as_bytes());
    let signature = format!("{:x}", mac.finalize().into_bytes());

    GenericHmacHeaders {
        timestamp,
        user: identity.to_string(),
        signature,
    }
}

/// Sign a request for the private v2.03 gateway
pub fn sign_private(secret: &str, identity: &str, now: DateTime<Utc>) -> PrivateAuth {
    let date = now.format(PRIVATE_DATE_FORMAT).to_string();
    let signing_string = private_signing_string(&date);

    let mut mac = mac_sha1(secret);
    mac.update(signing_string.as_bytes());
    let signature =
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    PrivateAuth {
        authorization: format!(
            r#"hmac id="{identity}", algorithm="hmac-sha1", headers="date source", signature="{signature}""#
        ),
        date,
    }
}

/// The exact bytes covered by a v2.03 signature
pub fn private_signing_string(date: &str) -> String {
    format!("date: {date}\nsource: {PRIVATE_SOURCE}")
}

// HMAC accepts keys of any length, including empty ones
#[allow(clippy::expect_used)]
fn mac_sha256(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

#[allow(clippy::expect_used)]
fn mac_sha1(secret: &str) -> HmacSha1 {
    HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}
