//! Stripe webhook signature verification.
//!
//! HMAC-SHA256 over `"{t}.{raw body}"` keyed with the endpoint signing
//! secret, compared in constant time against every `v1` entry of the
//! `Stripe-Signature` header. The body is only parsed once the signature
//! matches.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    /// Stripe sends several `v1` entries while a secret is being rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses `t=<timestamp>,v1=<hex>[,v1=<hex>...][,v0=<hex>]`.
    ///
    /// Unknown schemes (`v0`, future ones) are skipped.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
pub struct StripeWebhookVerifier {
    secret: SecretString,
}

impl StripeWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature header and parses the event.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - no `v1` entry matches
    /// - `TimestampOutOfRange` - signed more than 5 minutes ago
    /// - `InvalidTimestamp` - signed in the future beyond clock skew
    /// - `ParseError` - malformed header or JSON body
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_at(payload, signature_header, chrono::Utc::now().timestamp())
    }

    fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        validate_timestamp(header.timestamp, now)?;

        let expected = self.compute_signature(header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| WebhookError::Configuration(e.to_string()))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), WebhookError> {
    let age = now - timestamp;

    if age > MAX_EVENT_AGE_SECS {
        return Err(WebhookError::TimestampOutOfRange);
    }
    if age < -MAX_CLOCK_SKEW_SECS {
        return Err(WebhookError::InvalidTimestamp);
    }

    Ok(())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a valid `Stripe-Signature` header for a payload.
///
/// Public so integration tests can sign fixture payloads the way Stripe does.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return format!("t={}", timestamp),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";
    const NOW: i64 = 1_700_000_000;

    fn verifier() -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn payload() -> Vec<u8> {
        br#"{"id":"evt_1","type":"customer.subscription.deleted","created":1700000000,"data":{"object":{"id":"sub_1","status":"canceled"}}}"#.to_vec()
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_single_v1() {
        let header = SignatureHeader::parse(&format!("t=1234567890,v1={}", "a".repeat(64))).unwrap();

        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signatures.len(), 1);
        assert_eq!(header.v1_signatures[0].len(), 32);
    }

    #[test]
    fn parse_header_collects_every_v1_and_skips_v0() {
        let raw = format!(
            "t=1,v1={},v1={},v0={}",
            "a".repeat(64),
            "b".repeat(64),
            "c".repeat(64)
        );
        let header = SignatureHeader::parse(&raw).unwrap();
        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_header_without_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_without_v1_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=123"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_with_bad_hex_fails() {
        assert!(SignatureHeader::parse("t=123,v1=zz").is_err());
    }

    #[test]
    fn parse_header_garbage_fails() {
        assert!(SignatureHeader::parse("not a header").is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_parses_event() {
        let body = payload();
        let header = sign_payload(TEST_SECRET, NOW, &body);

        let event = verifier().verify_at(&body, &header, NOW + 10).unwrap();

        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, "customer.subscription.deleted");
    }

    #[test]
    fn signature_from_other_secret_is_rejected() {
        let body = payload();
        let header = sign_payload("whsec_other", NOW, &body);

        let result = verifier().verify_at(&body, &header, NOW);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let body = payload();
        let header = sign_payload(TEST_SECRET, NOW, &body);
        let mut tampered = body.clone();
        tampered.extend_from_slice(b" ");

        let result = verifier().verify_at(&tampered, &header, NOW);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn any_matching_v1_is_accepted_during_secret_roll() {
        let body = payload();
        let good = sign_payload(TEST_SECRET, NOW, &body);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "0".repeat(64), good_sig);

        assert!(verifier().verify_at(&body, &header, NOW).is_ok());
    }

    #[test]
    fn stale_event_is_rejected() {
        let body = payload();
        let header = sign_payload(TEST_SECRET, NOW, &body);

        let result = verifier().verify_at(&body, &header, NOW + MAX_EVENT_AGE_SECS + 1);
        assert!(matches!(result, Err(WebhookError::TimestampOutOfRange)));
    }

    #[test]
    fn future_event_beyond_skew_is_rejected() {
        let body = payload();
        let header = sign_payload(TEST_SECRET, NOW + MAX_CLOCK_SKEW_SECS + 1, &body);

        let result = verifier().verify_at(&body, &header, NOW);
        assert!(matches!(result, Err(WebhookError::InvalidTimestamp)));
    }

    #[test]
    fn small_clock_skew_is_tolerated() {
        let body = payload();
        let header = sign_payload(TEST_SECRET, NOW + 30, &body);

        assert!(verifier().verify_at(&body, &header, NOW).is_ok());
    }

    #[test]
    fn signed_but_invalid_json_is_parse_error() {
        let body = b"not json".to_vec();
        let header = sign_payload(TEST_SECRET, NOW, &body);

        let result = verifier().verify_at(&body, &header, NOW);
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn verify_and_parse_uses_wall_clock() {
        let body = payload();
        let header = sign_payload(TEST_SECRET, chrono::Utc::now().timestamp(), &body);

        assert!(verifier().verify_and_parse(&body, &header).is_ok());
    }
}
