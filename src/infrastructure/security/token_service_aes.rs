use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::application::ports::token_service::TokenService;

/// Security tokens sealed with AES-GCM: the payload is `action|issued_at`,
/// the key is derived from the configured secret. A token validates only for
/// the action it was generated for and only within the configured TTL.
pub struct AesTokenService {
    key: Key<Aes256Gcm>,
    ttl_secs: i64,
}

fn derive_key(secret: &str) -> Key<Aes256Gcm> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    let out = hasher.finalize();
    let mut k = [0u8; 32];
    k.copy_from_slice(&out);
    *Key::<Aes256Gcm>::from_slice(&k)
}

impl AesTokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            key: derive_key(secret),
            ttl_secs,
        }
    }

    fn generate_at(&self, action: &str, issued_at: i64) -> anyhow::Result<String> {
        let cipher = Aes256Gcm::new(&self.key);
        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let payload = format!("{action}|{issued_at}");
        let ct = cipher
            .encrypt(nonce, payload.as_bytes())
            .map_err(|e| anyhow::anyhow!("token seal failed: {e}"))?;
        let n_b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(nonce_bytes);
        let c_b64 = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(ct);
        Ok(format!("v1.{n_b64}.{c_b64}"))
    }

    fn open(&self, token: &str) -> Option<(String, i64)> {
        let mut parts = token.splitn(3, '.');
        if parts.next() != Some("v1") {
            return None;
        }
        let nonce_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(parts.next()?)
            .ok()?;
        let ct_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(parts.next()?)
            .ok()?;
        if nonce_bytes.len() != 12 {
            return None;
        }
        let cipher = Aes256Gcm::new(&self.key);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let pt = cipher.decrypt(nonce, ct_bytes.as_ref()).ok()?;
        let payload = String::from_utf8(pt).ok()?;
        let (action, issued_at) = payload.rsplit_once('|')?;
        Some((action.to_string(), issued_at.parse().ok()?))
    }
}

impl TokenService for AesTokenService {
    fn generate(&self, action: &str) -> anyhow::Result<String> {
        self.generate_at(action, chrono::Utc::now().timestamp())
    }

    fn validate(&self, action: &str, token: &str) -> bool {
        let Some((sealed_action, issued_at)) = self.open(token) else {
            return false;
        };
        if sealed_action != action {
            return false;
        }
        let age = chrono::Utc::now().timestamp() - issued_at;
        (0..=self.ttl_secs).contains(&age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTION: &str = "createProject";

    #[test]
    fn round_trip_validates() {
        let svc = AesTokenService::new("test-secret", 300);
        let token = svc.generate(ACTION).unwrap();
        assert!(svc.validate(ACTION, &token));
    }

    #[test]
    fn rejects_other_actions() {
        let svc = AesTokenService::new("test-secret", 300);
        let token = svc.generate(ACTION).unwrap();
        assert!(!svc.validate("removeProject", &token));
    }

    #[test]
    fn rejects_expired_tokens() {
        let svc = AesTokenService::new("test-secret", 300);
        let stale = svc
            .generate_at(ACTION, chrono::Utc::now().timestamp() - 301)
            .unwrap();
        assert!(!svc.validate(ACTION, &stale));
    }

    #[test]
    fn rejects_garbage_and_foreign_keys() {
        let svc = AesTokenService::new("test-secret", 300);
        assert!(!svc.validate(ACTION, ""));
        assert!(!svc.validate(ACTION, "v1.not.base64!"));
        assert!(!svc.validate(ACTION, "createProject|0"));

        let other = AesTokenService::new("another-secret", 300);
        let token = other.generate(ACTION).unwrap();
        assert!(!svc.validate(ACTION, &token));
    }
}
