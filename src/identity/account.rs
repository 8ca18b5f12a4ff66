//! Aptos account key handling.
//!
//! The agent signs with an Ed25519 key. The account address is the original
//! authentication key: `sha3_256(pk || 0x00)`.

use anyhow::{bail, Context, Result};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256};

/// Authentication-key scheme byte for single Ed25519 accounts.
const ED25519_SCHEME: u8 = 0x00;

/// AIP-80 prefix some wallets export Ed25519 keys with.
const AIP80_PREFIX: &str = "ed25519-priv-";

/// An in-memory Aptos account handle.
#[derive(Clone)]
pub struct AptosAccount {
    signing_key: SigningKey,
    /// Account address, 0x-prefixed, 64 hex digits.
    address: String,
}

impl std::fmt::Debug for AptosAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AptosAccount")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl AptosAccount {
    /// Load an account from a hex-encoded 32-byte Ed25519 seed.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let trimmed = private_key.trim();
        let trimmed = trimmed.strip_prefix(AIP80_PREFIX).unwrap_or(trimmed);
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let key_bytes = hex::decode(key_hex).context("Invalid hex in private key")?;
        let seed: [u8; 32] = match key_bytes.try_into() {
            Ok(seed) => seed,
            Err(bytes) => bail!("Private key must be 32 bytes, got {}", bytes.len()),
        };
        Ok(Self::from_signing_key(SigningKey::from_bytes(&seed)))
    }

    /// Generate a fresh random account.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = derive_address(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.verifying_key().as_bytes()))
    }

    /// Hex-encoded private key with 0x prefix. Only used by `keygen`.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    /// Sign an Aptos signing message (domain prefix + BCS) as-is.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

fn derive_address(public_key: &[u8]) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key);
    hasher.update([ED25519_SCHEME]);
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Normalize a user-supplied account address to `0x` + 64 lowercase hex digits.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    let Some(digits) = trimmed.strip_prefix("0x") else {
        bail!("Address must start with 0x: {}", trimmed);
    };
    if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Not a valid account address: {}", trimmed);
    }
    Ok(format!("0x{:0>64}", digits.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    const KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";

    /// Testnet key whose account publishes the healthcare module.
    const PUBLISHER_KEY: &str = "0x5377295851e0b5f6ad4ca4d884e293838caa4b98366f643c9585e4f56583b0df";
    const PUBLISHER_ADDRESS: &str = "0x8e46115deae69c3ffc41c50f29c94501935467de0212a666d2f0f0b83f1574ac";

    #[test]
    fn publisher_key_derives_module_address() {
        let account = AptosAccount::from_hex(PUBLISHER_KEY).unwrap();
        assert_eq!(account.address(), PUBLISHER_ADDRESS);
        assert_eq!(
            account.public_key_hex(),
            "0xe5a4ae8fb8e7ce708524330b391437a572738ecf0d259b230085ed26dd370f4a"
        );
    }

    #[test]
    fn address_follows_ed25519_derivation() {
        let account = AptosAccount::from_hex(KEY).unwrap();
        assert_eq!(
            account.address(),
            "0xce2fd04ac9efa74f17595e5785e847a2399d7e637f5e8179244f76191f653276"
        );

        let pk = hex::decode(account.public_key_hex().trim_start_matches("0x")).unwrap();
        assert_eq!(pk.len(), 32);
        let mut preimage = pk.clone();
        preimage.push(0x00);
        let expected = format!("0x{}", hex::encode(Sha3_256::digest(&preimage)));
        assert_eq!(account.address(), expected);
    }

    #[test]
    fn prefixes_are_optional() {
        let plain = AptosAccount::from_hex(KEY).unwrap();
        let bare = AptosAccount::from_hex(KEY.trim_start_matches("0x")).unwrap();
        let prefixed = AptosAccount::from_hex(&format!("ed25519-priv-{KEY}")).unwrap();
        assert_eq!(plain.address(), bare.address());
        assert_eq!(plain.address(), prefixed.address());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(AptosAccount::from_hex("0xzz").is_err());
        assert!(AptosAccount::from_hex("0x0102").is_err());
        assert!(AptosAccount::from_hex(&format!("0x{}", "00".repeat(33))).is_err());
    }

    #[test]
    fn signatures_verify_against_the_public_key() {
        let account = AptosAccount::from_hex(KEY).unwrap();
        let message = b"APTOS::RawTransaction payload";
        let sig_bytes = account.sign(message);
        assert_eq!(sig_bytes.len(), 64);

        let pk: [u8; 32] = hex::decode(account.public_key_hex().trim_start_matches("0x"))
            .unwrap()
            .try_into()
            .unwrap();
        let verifying_key = VerifyingKey::from_bytes(&pk).unwrap();
        let signature = Signature::from_slice(&sig_bytes).unwrap();
        verifying_key.verify(message, &signature).unwrap();
    }

    #[test]
    fn generated_keys_round_trip_through_hex() {
        let account = AptosAccount::generate();
        let reloaded = AptosAccount::from_hex(&account.private_key_hex()).unwrap();
        assert_eq!(account.address(), reloaded.address());
    }

    #[test]
    fn normalizes_short_addresses() {
        assert_eq!(normalize_address("0x1").unwrap(), format!("0x{}1", "0".repeat(63)));
        assert_eq!(normalize_address(" 0xABC ").unwrap().len(), 66);
        assert!(normalize_address("abc").is_err());
        assert!(normalize_address("0x").is_err());
        assert!(normalize_address("0xnothex").is_err());
    }
}
