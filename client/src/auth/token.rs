//! Placeholder session token issued by the mock login flow.
//!
//! Three dot-separated base64 segments shaped like a JWT: a fixed header,
//! the claims payload, and a constant marker in place of a signature. The
//! token is NOT a security boundary; nothing verifies it and any holder
//! can fabricate one.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::directory::{Identity, UserRole};

/// Token lifetime applied to the `exp` claim.
const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid session token format")]
    InvalidFormat,

    #[error("failed to decode session token payload")]
    PayloadDecode,

    #[error("failed to parse session token payload")]
    PayloadParse,
}

/// Claims carried in the token payload segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: u32,
    pub username: String,
    #[serde(rename = "userType")]
    pub user_type: UserRole,
    /// Expiry as milliseconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_expired(&self, reference_ms: i64) -> bool {
        reference_ms >= self.exp
    }
}

/// Issues a session token for an authenticated identity.
pub fn issue(user: &Identity, issued_at_ms: i64) -> Result<String, TokenError> {
    let header = STANDARD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);

    let claims = TokenClaims {
        sub: user.id,
        username: user.username.clone(),
        user_type: user.role,
        exp: issued_at_ms + TOKEN_TTL_HOURS * 60 * 60 * 1000,
    };
    let payload = serde_json::to_string(&claims).map_err(|_| TokenError::PayloadParse)?;
    let payload = STANDARD.encode(payload);

    let signature = STANDARD.encode(format!("mock-signature-{}", user.id));

    Ok(format!("{header}.{payload}.{signature}"))
}

/// Decodes the payload segment of a session token.
///
/// No signature verification happens here; the decoder exists for
/// diagnostics and tests.
pub fn decode(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::InvalidFormat);
    };

    let payload = STANDARD
        .decode(payload)
        .map_err(|_| TokenError::PayloadDecode)?;
    serde_json::from_slice(&payload).map_err(|_| TokenError::PayloadParse)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::DIRECTORY;

    fn test_user() -> Identity {
        DIRECTORY[0].clone()
    }

    #[test]
    fn issue_produces_three_segments() {
        let token = issue(&test_user(), 1_000).expect("issue token");
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn issue_and_decode_roundtrip() {
        let user = test_user();
        let token = issue(&user, 1_000).expect("issue token");

        let claims = decode(&token).expect("decode token");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.user_type, user.role);
        assert_eq!(claims.exp, 1_000 + 24 * 60 * 60 * 1000);
    }

    #[test]
    fn header_segment_is_fixed_jwt_header() {
        let token = issue(&test_user(), 0).expect("issue token");
        let header = token.split('.').next().expect("header segment");
        let decoded = STANDARD.decode(header).expect("base64 header");
        assert_eq!(decoded, br#"{"alg":"HS256","typ":"JWT"}"#);
    }

    #[test]
    fn signature_segment_is_a_placeholder_marker() {
        let user = test_user();
        let token = issue(&user, 0).expect("issue token");
        let signature = token.split('.').nth(2).expect("signature segment");
        let decoded = STANDARD.decode(signature).expect("base64 signature");
        assert_eq!(decoded, format!("mock-signature-{}", user.id).into_bytes());
    }

    #[test]
    fn decode_rejects_wrong_segment_count() {
        assert!(matches!(
            decode("only-one-segment"),
            Err(TokenError::InvalidFormat)
        ));
        assert!(matches!(decode("a.b"), Err(TokenError::InvalidFormat)));
        assert!(matches!(decode("a.b.c.d"), Err(TokenError::InvalidFormat)));
    }

    #[test]
    fn decode_rejects_garbage_payload() {
        let garbage = format!("{}.{}.{}", STANDARD.encode("{}"), "!!!", STANDARD.encode("x"));
        assert!(matches!(decode(&garbage), Err(TokenError::PayloadDecode)));

        let not_claims = format!(
            "{}.{}.{}",
            STANDARD.encode("{}"),
            STANDARD.encode("[1,2,3]"),
            STANDARD.encode("x")
        );
        assert!(matches!(decode(&not_claims), Err(TokenError::PayloadParse)));
    }

    #[test]
    fn expiry_check_uses_reference_time() {
        let token = issue(&test_user(), 1_000).expect("issue token");
        let claims = decode(&token).expect("decode token");

        assert!(!claims.is_expired(1_000));
        assert!(claims.is_expired(claims.exp));
        assert!(claims.is_expired(claims.exp + 1));
    }
}
