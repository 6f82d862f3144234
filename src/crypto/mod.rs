//! Symmetric and public-key wrapping used for shared folder keys and gateway
//! payloads.
//!
//! AES-256-GCM blobs are laid out as `nonce (12) || ciphertext || tag (16)`.
//! EC blobs prefix that with the sender's uncompressed ephemeral P-256 point.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::utils::error::{OpsError, Result};

pub const NONCE_SIZE: usize = 12;
pub const KEY_SIZE: usize = 32;
const EC_POINT_SIZE: usize = 65;

fn cipher(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != KEY_SIZE {
        return Err(OpsError::crypto(format!(
            "AES key must be {} bytes, got {}",
            KEY_SIZE,
            key.len()
        )));
    }
    Aes256Gcm::new_from_slice(key).map_err(|e| OpsError::crypto(e.to_string()))
}

pub fn encrypt_aes_v2(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let cipher = cipher(key)?;
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let encrypted = cipher
        .encrypt(Nonce::from_slice(&nonce), data)
        .map_err(|_| OpsError::crypto("AES-GCM encryption failed"))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + encrypted.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&encrypted);
    Ok(out)
}

pub fn decrypt_aes_v2(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if data.len() < NONCE_SIZE {
        return Err(OpsError::crypto("Encrypted payload is too short"));
    }
    let (nonce, encrypted) = data.split_at(NONCE_SIZE);
    cipher(key)?
        .decrypt(Nonce::from_slice(nonce), encrypted)
        .map_err(|_| OpsError::crypto("AES-GCM decryption failed"))
}

/// ECIES over P-256: ECDH with a fresh ephemeral key, SHA-256 of the shared
/// secret as the AES key.
pub fn encrypt_ec(data: &[u8], public_key: &[u8]) -> Result<Vec<u8>> {
    let recipient = PublicKey::from_sec1_bytes(public_key)
        .map_err(|_| OpsError::crypto("Invalid EC public key"))?;

    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let shared = ephemeral.diffie_hellman(&recipient);
    let key = Sha256::digest(shared.raw_secret_bytes());

    let ephemeral_point = ephemeral.public_key().to_encoded_point(false);
    let encrypted = encrypt_aes_v2(data, &key)?;

    let mut out = Vec::with_capacity(EC_POINT_SIZE + encrypted.len());
    out.extend_from_slice(ephemeral_point.as_bytes());
    out.extend_from_slice(&encrypted);
    Ok(out)
}

/// RSA PKCS#1 v1.5. The key may be PKCS#1 or SubjectPublicKeyInfo DER.
pub fn encrypt_rsa(data: &[u8], public_key: &[u8]) -> Result<Vec<u8>> {
    let key = RsaPublicKey::from_pkcs1_der(public_key)
        .or_else(|_| RsaPublicKey::from_public_key_der(public_key))
        .map_err(|_| OpsError::crypto("Invalid RSA public key"))?;

    key.encrypt(&mut OsRng, Pkcs1v15Encrypt, data)
        .map_err(|e| OpsError::crypto(format!("RSA encryption failed: {}", e)))
}

#[cfg(test)]
pub(crate) fn generate_aes_key() -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    key
}

#[cfg(test)]
pub(crate) fn decrypt_ec(data: &[u8], secret: &p256::SecretKey) -> Result<Vec<u8>> {
    if data.len() < EC_POINT_SIZE {
        return Err(OpsError::crypto("Encrypted payload is too short"));
    }
    let (point, encrypted) = data.split_at(EC_POINT_SIZE);
    let sender = PublicKey::from_sec1_bytes(point)
        .map_err(|_| OpsError::crypto("Invalid EC public key"))?;
    let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), sender.as_affine());
    let key = Sha256::digest(shared.raw_secret_bytes());
    decrypt_aes_v2(encrypted, &key)
}
