// src/services/password.rs

// Formato gravado no banco (5 campos separados por '$'):
//   PBKDF2$SHA256$<iterações>$<salt base64>$<chave base64>
// Qualquer outro formato é inválido e a verificação falha fechada.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::common::error::AppError;

pub const ALGORITHM_TAG: &str = "PBKDF2";
pub const HASH_NAME: &str = "SHA256";

const SALT_SIZE: usize = 16;
const KEY_SIZE: usize = 32;
const DEFAULT_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self { iterations: DEFAULT_ITERATIONS }
    }

    /// Gera o hash codificado de uma senha. Senha em branco é erro do chamador.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.trim().is_empty() {
            return Err(AppError::InvalidInput("A senha não pode ser vazia.".into()));
        }

        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);

        let mut key = [0u8; KEY_SIZE];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, self.iterations, &mut key);

        Ok(format!(
            "{}${}${}${}${}",
            ALGORITHM_TAG,
            HASH_NAME,
            self.iterations,
            STANDARD.encode(salt),
            STANDARD.encode(key)
        ))
    }

    /// Hash bem formado, com o custo configurado, que não corresponde a
    /// nenhuma senha. Usado no login quando não há usuário, para que a
    /// derivação rode do mesmo jeito.
    pub fn decoy_hash(&self) -> String {
        format!(
            "{}${}${}${}${}",
            ALGORITHM_TAG,
            HASH_NAME,
            self.iterations,
            STANDARD.encode([0u8; SALT_SIZE]),
            STANDARD.encode([0u8; KEY_SIZE])
        )
    }

    /// Confere a senha contra o hash gravado. Nunca falha: qualquer entrada
    /// malformada resulta em `false`.
    pub fn verify(&self, encoded: &str, candidate: &str) -> bool {
        if candidate.trim().is_empty() {
            return false;
        }
        let Some(stored) = StoredHash::parse(encoded) else {
            return false;
        };

        let mut actual = vec![0u8; stored.key.len()];
        pbkdf2::pbkdf2_hmac::<Sha256>(candidate.as_bytes(), &stored.salt, stored.iterations, &mut actual);

        actual.ct_eq(&stored.key).into()
    }
}

// Os campos de um hash gravado, já decodificados
struct StoredHash {
    iterations: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl StoredHash {
    fn parse(encoded: &str) -> Option<Self> {
        let parts: Vec<&str> = encoded.split('$').collect();
        let [tag, hash_name, iterations, salt, key] = parts.as_slice() else {
            return None;
        };

        if *tag != ALGORITHM_TAG || !hash_name.eq_ignore_ascii_case(HASH_NAME) {
            return None;
        }

        let iterations = iterations.parse::<u32>().ok().filter(|n| *n > 0)?;
        let salt = STANDARD.decode(salt).ok()?;
        let key = STANDARD.decode(key).ok()?;
        // Chave vazia compararia igual a qualquer coisa
        if salt.is_empty() || key.is_empty() {
            return None;
        }

        Some(Self { iterations, salt, key })
    }
}
