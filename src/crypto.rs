use crate::{PublicKey, Sha256};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Verifies that `signature` was produced over `message` by the owner of `public_key`.
pub trait SignatureVerifier {
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool;
}

/// Ed25519 signature scheme.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
        // Keys that are not valid curve points and signatures of the wrong length can't verify
        // anything, so they are treated the same as a signature mismatch.
        let verifying_key = match VerifyingKey::from_bytes(public_key.as_bytes()) {
            Ok(verifying_key) => verifying_key,
            Err(_) => return false,
        };
        let signature = match Signature::from_slice(signature) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

/// A signing key together with its public key.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Derives the key pair deterministically from the seed.
    /// Two key pairs created from the same seed are identical.
    pub fn from_seed(seed: u64) -> Self {
        let secret = Sha256::digest(&seed.to_le_bytes()).to_raw();
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_verifies_with_signer_key() {
        let key_pair = KeyPair::from_seed(1);
        let signature = key_pair.sign(b"message");
        assert!(Ed25519Verifier.verify(&key_pair.public_key(), b"message", &signature));
    }

    #[test]
    fn signature_fails_for_other_message() {
        let key_pair = KeyPair::from_seed(1);
        let signature = key_pair.sign(b"message");
        assert!(!Ed25519Verifier.verify(&key_pair.public_key(), b"massage", &signature));
    }

    #[test]
    fn signature_fails_for_other_key() {
        let signer = KeyPair::from_seed(1);
        let other = KeyPair::from_seed(2);
        let signature = signer.sign(b"message");
        assert!(!Ed25519Verifier.verify(&other.public_key(), b"message", &signature));
    }

    #[test]
    fn malformed_signature_does_not_verify() {
        let key_pair = KeyPair::from_seed(1);
        assert!(!Ed25519Verifier.verify(&key_pair.public_key(), b"message", &[]));
        assert!(!Ed25519Verifier.verify(&key_pair.public_key(), b"message", &[7; 63]));
    }

    #[test]
    fn same_seed_gives_same_key() {
        assert_eq!(
            KeyPair::from_seed(42).public_key(),
            KeyPair::from_seed(42).public_key()
        );
        assert_ne!(
            KeyPair::from_seed(42).public_key(),
            KeyPair::from_seed(43).public_key()
        );
    }
}
