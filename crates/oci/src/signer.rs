//! HTTP request signing as required by the OCI API.
//!
//! Every request carries a `Signature` authorization built over the
//! `date`, `(request-target)` and `host` headers. Requests with a body
//! additionally sign `content-length`, `content-type` and the SHA-256 of
//! the body (`x-content-sha256`).

use std::fmt::{self, Debug};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Method, Url};
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding as _, Signer as _};
use sha2::{Digest as _, Sha256};

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// Key ids of session-token auth carry the token itself after this prefix.
pub(crate) const SECURITY_TOKEN_PREFIX: &str = "ST$";

/// Headers a signed request must carry, in addition to `host`, which the
/// HTTP client derives from the URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SignedHeaders {
    pub date: String,
    pub authorization: String,
    pub content_sha256: Option<String>,
}

pub(crate) struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl RequestSigner {
    pub fn new(key_id: String, private_key: RsaPrivateKey) -> Self {
        Self {
            key_id,
            signing_key: SigningKey::new(private_key),
        }
    }

    /// Signs a request sent at `date`, an RFC 7231 formatted timestamp.
    pub fn sign(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
        date: &str,
    ) -> SignedHeaders {
        let (headers, signing_string, content_sha256) =
            signing_string(method, url, body, date);
        let signature = self.signing_key.sign(signing_string.as_bytes());
        let authorization = format!(
            r#"Signature version="1",headers="{headers}",keyId="{}",algorithm="rsa-sha256",signature="{}""#,
            self.key_id,
            BASE64.encode(signature.to_bytes()),
        );
        SignedHeaders {
            date: date.to_owned(),
            authorization,
            content_sha256,
        }
    }
}

impl Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key_id = if self.key_id.starts_with(SECURITY_TOKEN_PREFIX) {
            "ST$<deducted>"
        } else {
            self.key_id.as_str()
        };
        f.debug_struct("RequestSigner")
            .field("key_id", &key_id)
            .field("signing_key", &"<deducted>")
            .finish()
    }
}

/// Formats the current time the way the `date` header expects.
#[inline]
pub(crate) fn http_date_now() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Builds the string to sign. Returns the signed header names, the string
/// itself and the body digest, if any.
fn signing_string(
    method: &Method,
    url: &Url,
    body: Option<&[u8]>,
    date: &str,
) -> (&'static str, String, Option<String>) {
    let mut target = format!(
        "{} {}",
        method.as_str().to_ascii_lowercase(),
        url.path()
    );
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut lines = vec![
        format!("date: {date}"),
        format!("(request-target): {target}"),
        format!("host: {}", host(url)),
    ];

    let Some(body) = body else {
        return ("date (request-target) host", lines.join("\n"), None);
    };

    let digest = BASE64.encode(Sha256::digest(body));
    lines.push(format!("content-length: {}", body.len()));
    lines.push(format!("content-type: {JSON_CONTENT_TYPE}"));
    lines.push(format!("x-content-sha256: {digest}"));
    (
        "date (request-target) host content-length content-type x-content-sha256",
        lines.join("\n"),
        Some(digest),
    )
}

fn host(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}
