//! GitHub webhook signature verification.
//!
//! GitHub signs the raw request body with the webhook secret using HMAC and
//! sends the result as `<algorithm>=<hex digest>`:
//! - `X-Hub-Signature-256`: HMAC-SHA256, preferred
//! - `X-Hub-Signature`: HMAC-SHA1, legacy
//!
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use tracing::{error, info};

use crate::error::{Result, WebhookError};
use crate::secrets::SecretStore;

use super::headers::{NormalizedHeaders, SIGNATURE_SHA1_HEADER, SIGNATURE_SHA256_HEADER};

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// HMAC hash function a signature was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha256,
    Sha1,
}

impl SignatureAlgorithm {
    /// Prefix GitHub puts in front of the hex digest.
    pub fn prefix(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha256 => "sha256",
            SignatureAlgorithm::Sha1 => "sha1",
        }
    }
}

/// The signature header selected for verification.
///
/// Each variant is pinned to the algorithm of the header it was read from,
/// never to the prefix inside the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureHeader<'a> {
    Sha256(&'a str),
    Sha1(&'a str),
}

impl<'a> SignatureHeader<'a> {
    /// Pick the signature header, preferring SHA-256.
    ///
    /// The SHA-1 header is only consulted when the SHA-256 header is absent.
    /// Returns `None` when the selected header is missing or empty.
    pub fn select(headers: &'a NormalizedHeaders) -> Option<Self> {
        let selected = if headers.contains(SIGNATURE_SHA256_HEADER) {
            SignatureHeader::Sha256(headers.get(SIGNATURE_SHA256_HEADER).unwrap_or_default())
        } else {
            SignatureHeader::Sha1(headers.get(SIGNATURE_SHA1_HEADER)?)
        };
        (!selected.value().is_empty()).then_some(selected)
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            SignatureHeader::Sha256(_) => SignatureAlgorithm::Sha256,
            SignatureHeader::Sha1(_) => SignatureAlgorithm::Sha1,
        }
    }

    pub fn value(&self) -> &'a str {
        match *self {
            SignatureHeader::Sha256(value) | SignatureHeader::Sha1(value) => value,
        }
    }
}

/// Result of checking a request's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVerification {
    Verified,
    MissingSignature,
    MissingSecret,
    SignatureMismatch,
}

impl SignatureVerification {
    /// HTTP status for this result at the verification stage.
    ///
    /// A missing signature or secret is a configuration problem (500);
    /// only a signature that does not match is an authentication failure.
    pub fn status_code(self) -> u16 {
        match self {
            SignatureVerification::Verified => 200,
            SignatureVerification::MissingSignature | SignatureVerification::MissingSecret => 500,
            SignatureVerification::SignatureMismatch => 401,
        }
    }

    pub fn is_verified(self) -> bool {
        self == SignatureVerification::Verified
    }
}

/// Verify a request's signature against the secret held in `secrets`.
///
/// Runs before anything reads the body; the only request data logged here
/// is the event type header.
pub async fn verify(
    event_type: &str,
    headers: &NormalizedHeaders,
    body: &[u8],
    secrets: &dyn SecretStore,
    secret_name: &str,
) -> Result<SignatureVerification> {
    let Some(signature) = SignatureHeader::select(headers) else {
        error!(
            event = %event_type,
            has_sha256_header = headers.contains(SIGNATURE_SHA256_HEADER),
            has_sha1_header = headers.contains(SIGNATURE_SHA1_HEADER),
            "webhook_signature_missing"
        );
        return Ok(SignatureVerification::MissingSignature);
    };

    let secret = secrets
        .get_secret(secret_name)
        .await
        .map_err(WebhookError::SecretFetch)?;

    let result = verify_signature(signature, &secret, body);
    match result {
        SignatureVerification::Verified => {
            info!(
                event = %event_type,
                algorithm = signature.algorithm().prefix(),
                "webhook_signature_verified"
            );
        }
        SignatureVerification::MissingSecret => {
            error!(event = %event_type, secret_name = %secret_name, "webhook_secret_not_configured");
        }
        _ => {
            error!(
                event = %event_type,
                algorithm = signature.algorithm().prefix(),
                "webhook_signature_mismatch"
            );
        }
    }

    Ok(result)
}

/// Check `signature` against the HMAC of `body` keyed with `secret`.
pub fn verify_signature(
    signature: SignatureHeader<'_>,
    secret: &str,
    body: &[u8],
) -> SignatureVerification {
    if secret.is_empty() {
        return SignatureVerification::MissingSecret;
    }

    let Some(expected) = sign_payload(signature.algorithm(), secret, body) else {
        return SignatureVerification::SignatureMismatch;
    };

    if constant_time_compare(&expected, signature.value()) {
        SignatureVerification::Verified
    } else {
        SignatureVerification::SignatureMismatch
    }
}

/// Compute the signature GitHub would send for `body`, e.g. `sha256=<hex>`.
pub fn sign_payload(algorithm: SignatureAlgorithm, secret: &str, body: &[u8]) -> Option<String> {
    let digest = match algorithm {
        SignatureAlgorithm::Sha256 => {
            let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).ok()?;
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
        SignatureAlgorithm::Sha1 => {
            let mut mac = <HmacSha1 as Mac>::new_from_slice(secret.as_bytes()).ok()?;
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
    };
    Some(format!("{}={}", algorithm.prefix(), digest))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::StaticSecretStore;
    use crate::webhook::headers::normalize_headers;

    const SECRET: &str = "TEST_SECRET";
    const BODY: &[u8] = br#"{"action":"queued"}"#;

    fn sign(algorithm: SignatureAlgorithm) -> String {
        sign_payload(algorithm, SECRET, BODY).unwrap()
    }

    #[test]
    fn test_sign_payload_known_vectors() {
        // Values from GitHub's webhook validation documentation.
        let sha256 = sign_payload(SignatureAlgorithm::Sha256, "It's a Secret to Everybody", b"Hello, World!");
        assert_eq!(
            sha256.as_deref(),
            Some("sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17")
        );

        let sha1 = sign(SignatureAlgorithm::Sha1);
        assert!(sha1.starts_with("sha1="));
        assert_eq!(sha1.len(), "sha1=".len() + 40);
    }

    #[test]
    fn test_select_prefers_sha256() {
        let sha256 = sign(SignatureAlgorithm::Sha256);
        let headers = normalize_headers([
            ("X-Hub-Signature", "sha1=abc"),
            ("X-Hub-Signature-256", sha256.as_str()),
        ]);

        let selected = SignatureHeader::select(&headers).unwrap();
        assert_eq!(selected.algorithm(), SignatureAlgorithm::Sha256);
        assert_eq!(selected.value(), sha256);
    }

    #[test]
    fn test_select_falls_back_to_sha1() {
        let headers = normalize_headers([("X-Hub-Signature", "sha1=abc")]);
        assert_eq!(SignatureHeader::select(&headers), Some(SignatureHeader::Sha1("sha1=abc")));
    }

    #[test]
    fn test_select_empty_sha256_does_not_fall_back() {
        let headers = normalize_headers([("X-Hub-Signature-256", ""), ("X-Hub-Signature", "sha1=abc")]);
        assert_eq!(SignatureHeader::select(&headers), None);
    }

    #[test]
    fn test_select_missing() {
        let headers = normalize_headers([("X-GitHub-Event", "workflow_job")]);
        assert_eq!(SignatureHeader::select(&headers), None);
    }

    #[test]
    fn test_verify_signature_both_algorithms() {
        let sha256 = sign(SignatureAlgorithm::Sha256);
        let sha1 = sign(SignatureAlgorithm::Sha1);

        assert_eq!(
            verify_signature(SignatureHeader::Sha256(&sha256), SECRET, BODY),
            SignatureVerification::Verified
        );
        assert_eq!(
            verify_signature(SignatureHeader::Sha1(&sha1), SECRET, BODY),
            SignatureVerification::Verified
        );
    }

    #[test]
    fn test_verify_signature_algorithm_pinned_to_header() {
        // A valid SHA-1 signature sent in the SHA-256 header is rejected.
        let sha1 = sign(SignatureAlgorithm::Sha1);
        assert_eq!(
            verify_signature(SignatureHeader::Sha256(&sha1), SECRET, BODY),
            SignatureVerification::SignatureMismatch
        );
    }

    #[test]
    fn test_verify_signature_mismatch() {
        assert_eq!(
            verify_signature(SignatureHeader::Sha1("bbb"), SECRET, b"aaaa"),
            SignatureVerification::SignatureMismatch
        );

        let sha256 = sign(SignatureAlgorithm::Sha256);
        assert_eq!(
            verify_signature(SignatureHeader::Sha256(&sha256), "other-secret", BODY),
            SignatureVerification::SignatureMismatch
        );
    }

    #[test]
    fn test_verify_signature_empty_secret() {
        let sha256 = sign(SignatureAlgorithm::Sha256);
        assert_eq!(
            verify_signature(SignatureHeader::Sha256(&sha256), "", BODY),
            SignatureVerification::MissingSecret
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SignatureVerification::Verified.status_code(), 200);
        assert_eq!(SignatureVerification::MissingSignature.status_code(), 500);
        assert_eq!(SignatureVerification::MissingSecret.status_code(), 500);
        assert_eq!(SignatureVerification::SignatureMismatch.status_code(), 401);
    }

    #[tokio::test]
    async fn test_verify_missing_signature_before_secret() {
        let headers = normalize_headers([("X-GitHub-Event", "workflow_job")]);
        let secrets = StaticSecretStore(String::new());

        let result = verify("workflow_job", &headers, BODY, &secrets, "WEBHOOK_SECRET")
            .await
            .unwrap();
        assert_eq!(result.status_code(), 500);
        assert_eq!(result, SignatureVerification::MissingSignature);
    }

    #[tokio::test]
    async fn test_verify_with_store() {
        let sha1 = sign(SignatureAlgorithm::Sha1);
        let headers = normalize_headers([("X-Hub-Signature", sha1.as_str())]);
        let secrets = StaticSecretStore(SECRET.to_string());

        let result = verify("workflow_job", &headers, BODY, &secrets, "WEBHOOK_SECRET")
            .await
            .unwrap();
        assert_eq!(result.status_code(), 200);
        assert!(result.is_verified());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
