//! # Record and Instruction Discriminators
//!
//! The deployed registry program tags every account it owns, and selects
//! every instruction it executes, by an 8-byte prefix taken from a SHA-256
//! digest of a namespaced name:
//!
//! - accounts: `sha256("account:<TypeName>")[..8]`
//! - instructions: `sha256("global:<snake_case_name>")[..8]`
//!
//! The License record tag is pinned as a constant so decoding a record does
//! not hash anything; the functions here recompute tags for verification and
//! for building instructions.

use sha2::{Digest, Sha256};

/// Record tag of every License account: `sha256("account:License")[..8]`.
pub const LICENSE_RECORD_TAG: [u8; 8] = [0xf8, 0x98, 0xc3, 0x64, 0xb9, 0x6c, 0xb0, 0xe7];

/// Discriminator of an account type, by its type name.
pub fn account_discriminator(type_name: &str) -> [u8; 8] {
    namespaced("account", type_name)
}

/// Discriminator of a program instruction, by its snake_case name.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    namespaced("global", name)
}

fn namespaced(namespace: &str, name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_tag_matches_account_discriminator() {
        assert_eq!(account_discriminator("License"), LICENSE_RECORD_TAG);
    }

    #[test]
    fn test_create_license_instruction_discriminator() {
        assert_eq!(
            instruction_discriminator("create_license"),
            [0xbf, 0x2c, 0xa4, 0x01, 0x3a, 0xc9, 0xcb, 0x33]
        );
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        assert_ne!(
            account_discriminator("License"),
            instruction_discriminator("License")
        );
    }
}
