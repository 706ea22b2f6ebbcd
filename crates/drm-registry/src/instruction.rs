//! # The `create_license` Instruction
//!
//! ```text
//! data     = sha256("global:create_license")[0..8]
//!          ‖ application_id (u32 LE)
//!          ‖ machine_fingerprint_hash (16 bytes)
//! accounts = [developer (signer, writable),
//!             owner (writable),
//!             license address (writable),
//!             system program (read-only)]
//! ```
//!
//! The developer pays for and authorizes the allocation; the program
//! derives the license address from `owner` and `application_id` itself
//! and refuses any other target.

use borsh::{BorshDeserialize, BorshSerialize};
use drm_core::{ApplicationId, DecodeError, EncodeError, FingerprintHash, Pubkey, FINGERPRINT_HASH_LEN};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::system_program;

/// Byte length of `create_license` instruction data.
pub const CREATE_LICENSE_DATA_LEN: usize = 8 + 4 + FINGERPRINT_HASH_LEN;

/// Discriminator selecting `create_license` in the registry program:
/// `sha256("global:create_license")[0..8]`.
pub const CREATE_LICENSE_DISCRIMINATOR: [u8; 8] = [0xbf, 0x2c, 0xa4, 0x01, 0x3a, 0xc9, 0xcb, 0x33];

/// Arguments carried in `create_license` instruction data, Borsh-encoded
/// after the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreateLicenseArgs {
    pub application_id: ApplicationId,
    pub machine_fingerprint_hash: FingerprintHash,
}

impl CreateLicenseArgs {
    /// The instruction data bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut data = Vec::with_capacity(CREATE_LICENSE_DATA_LEN);
        data.extend_from_slice(&CREATE_LICENSE_DISCRIMINATOR);
        BorshSerialize::serialize(self, &mut data).map_err(|e| EncodeError {
            what: "create_license arguments",
            reason: e.to_string(),
        })?;
        Ok(data)
    }

    /// Parse instruction data, checking length before the discriminator.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < CREATE_LICENSE_DATA_LEN {
            return Err(DecodeError::Truncated {
                expected: CREATE_LICENSE_DATA_LEN,
                actual: data.len(),
            });
        }
        let mut found = [0u8; 8];
        found.copy_from_slice(&data[..8]);
        if found != CREATE_LICENSE_DISCRIMINATOR {
            return Err(DecodeError::WrongTag {
                expected: CREATE_LICENSE_DISCRIMINATOR,
                found,
            });
        }
        let mut args = &data[8..CREATE_LICENSE_DATA_LEN];
        <Self as BorshDeserialize>::deserialize(&mut args).map_err(|e| DecodeError::Body {
            reason: e.to_string(),
        })
    }
}

/// Build the instruction that stores a license at `license_address`.
pub fn create_license(
    program_id: &Pubkey,
    developer: &Pubkey,
    owner: &Pubkey,
    license_address: &Pubkey,
    args: CreateLicenseArgs,
) -> Result<Instruction, EncodeError> {
    Ok(Instruction::new_with_bytes(
        *program_id,
        &args.encode()?,
        vec![
            AccountMeta::new(*developer, true),
            AccountMeta::new(*owner, false),
            AccountMeta::new(*license_address, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CreateLicenseArgs {
        CreateLicenseArgs {
            application_id: ApplicationId::new(123_123),
            machine_fingerprint_hash: FingerprintHash::from_bytes([0xaa; 16]),
        }
    }

    #[test]
    fn test_discriminator_matches_instruction_name() {
        assert_eq!(
            CREATE_LICENSE_DISCRIMINATOR,
            drm_core::instruction_discriminator("create_license")
        );
    }

    #[test]
    fn test_data_layout() {
        let data = args().encode().unwrap();
        assert_eq!(data.len(), 28);
        assert_eq!(&data[..8], &CREATE_LICENSE_DISCRIMINATOR);
        assert_eq!(&data[8..12], &[0xf3, 0xe0, 0x01, 0x00]);
        assert_eq!(&data[12..], &[0xaa; 16]);
        assert_eq!(CreateLicenseArgs::decode(&data), Ok(args()));
    }

    #[test]
    fn test_borsh_args_fill_data_after_discriminator() {
        let body = borsh::to_vec(&args()).unwrap();
        assert_eq!(body.len(), CREATE_LICENSE_DATA_LEN - CREATE_LICENSE_DISCRIMINATOR.len());
        assert_eq!(&args().encode().unwrap()[8..], &body[..]);
    }

    #[test]
    fn test_decode_rejects_other_instructions() {
        let mut data = args().encode().unwrap();
        data[0] ^= 0xff;
        assert!(matches!(
            CreateLicenseArgs::decode(&data),
            Err(DecodeError::WrongTag { .. })
        ));
        assert!(matches!(
            CreateLicenseArgs::decode(&data[..20]),
            Err(DecodeError::Truncated { expected: 28, actual: 20 })
        ));
    }

    #[test]
    fn test_account_order_and_flags() {
        let program = Pubkey::new_from_array([9; 32]);
        let developer = Pubkey::new_from_array([1; 32]);
        let owner = Pubkey::new_from_array([2; 32]);
        let address = Pubkey::new_from_array([3; 32]);
        let ix = create_license(&program, &developer, &owner, &address, args()).unwrap();

        assert_eq!(ix.program_id, program);
        let flags: Vec<_> = ix
            .accounts
            .iter()
            .map(|m| (m.pubkey, m.is_signer, m.is_writable))
            .collect();
        assert_eq!(
            flags,
            vec![
                (developer, true, true),
                (owner, false, true),
                (address, false, true),
                (system_program::ID, false, false),
            ]
        );
    }
}
