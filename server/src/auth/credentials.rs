//! 凭证哈希服务
//!
//! 密码存储格式：每个账号一个随机 salt，哈希值为
//! `HMAC-SHA256(secret_key, "salt/password")` 的十六进制编码。
//! secret_key 来自服务端配置，泄露数据库不足以离线爆破。

use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};

/// 每个账号的随机 salt 长度 (字节，hex 编码后 32 字符)
const SALT_LEN: usize = 16;

/// 凭证哈希服务
///
/// 同一 (secret_key, salt, password) 组合永远产生同一哈希，
/// 登录校验即重新计算后作字符串比较。
#[derive(Clone)]
pub struct CredentialService {
    key: hmac::Key,
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService").finish_non_exhaustive()
    }
}

impl CredentialService {
    /// 使用服务端密钥创建凭证服务
    pub fn new(secret_key: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret_key.as_bytes()),
        }
    }

    /// 生成账号级随机 salt (hex)
    pub fn generate_salt(&self) -> String {
        let rng = SystemRandom::new();
        let mut bytes = [0u8; SALT_LEN];
        // SystemRandom 失败仅在系统熵源不可用时发生
        if rng.fill(&mut bytes).is_err() {
            tracing::error!("System RNG unavailable, falling back to time-based salt");
            return format!("{:032x}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));
        }
        hex::encode(bytes)
    }

    /// 计算密码哈希: HMAC-SHA256(key, "salt/password") → hex
    pub fn hash_password(&self, salt: &str, password: &str) -> String {
        let message = format!("{}/{}", salt, password);
        let tag = hmac::sign(&self.key, message.as_bytes());
        hex::encode(tag.as_ref())
    }

    /// 校验密码
    pub fn verify_password(&self, salt: &str, password: &str, stored_hash: &str) -> bool {
        let message = format!("{}/{}", salt, password);
        hmac::verify(&self.key, message.as_bytes(), &match hex::decode(stored_hash) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        })
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let svc = CredentialService::new("test-secret");
        let h1 = svc.hash_password("abc123", "password1");
        let h2 = svc.hash_password("abc123", "password1");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_different_salt_different_hash() {
        let svc = CredentialService::new("test-secret");
        let h1 = svc.hash_password("salt-a", "password1");
        let h2 = svc.hash_password("salt-b", "password1");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_different_key_different_hash() {
        let a = CredentialService::new("key-a");
        let b = CredentialService::new("key-b");
        assert_ne!(
            a.hash_password("salt", "password1"),
            b.hash_password("salt", "password1")
        );
    }

    #[test]
    fn test_verify_round_trip() {
        let svc = CredentialService::new("test-secret");
        let salt = svc.generate_salt();
        let hash = svc.hash_password(&salt, "hunter2");
        assert!(svc.verify_password(&salt, "hunter2", &hash));
        assert!(!svc.verify_password(&salt, "hunter3", &hash));
        assert!(!svc.verify_password("other", "hunter2", &hash));
    }

    #[test]
    fn test_salt_is_random_hex() {
        let svc = CredentialService::new("test-secret");
        let s1 = svc.generate_salt();
        let s2 = svc.generate_salt();
        assert_eq!(s1.len(), 32);
        assert_ne!(s1, s2);
        assert!(s1.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
