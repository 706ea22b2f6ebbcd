//! In-process stand-in for the deployed registry program, for use with
//! [`drm_ledger::MemoryLedger`].
//!
//! Performs the checks the program performs on `create_license`: the
//! developer signed, the system program is present, and the target address
//! is the one derived from `(owner, application_id)`. The ledger itself
//! refuses the allocation if the address is already occupied.

use drm_core::{License, Pubkey};
use drm_crypto::AddressDeriver;
use drm_ledger::{Allocation, Invocation, ProgramEmulator};
use solana_sdk::system_program;

use crate::instruction::CreateLicenseArgs;

/// Emulates the registry program's `create_license` instruction.
#[derive(Debug, Clone, Copy)]
pub struct LicenseProgram {
    deriver: AddressDeriver,
}

impl LicenseProgram {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            deriver: AddressDeriver::new(program_id),
        }
    }
}

impl ProgramEmulator for LicenseProgram {
    fn execute(&self, invocation: &Invocation<'_>) -> Result<Vec<Allocation>, String> {
        if invocation.program_id != self.deriver.program_id() {
            return Err(format!("incorrect program id {}", invocation.program_id));
        }
        let args = CreateLicenseArgs::decode(invocation.data)
            .map_err(|e| format!("InstructionDidNotDeserialize: {e}"))?;

        let [developer, owner, license, system, ..] = invocation.accounts else {
            return Err("NotEnoughAccountKeys".into());
        };
        if !developer.is_signer {
            return Err(format!("missing required signature for {}", developer.pubkey));
        }
        if system.pubkey != system_program::ID {
            return Err(format!("{} is not the system program", system.pubkey));
        }

        let (expected, bump) = self
            .deriver
            .derive(&owner.pubkey, args.application_id)
            .map_err(|e| e.to_string())?;
        if expected != license.pubkey {
            return Err(format!(
                "ConstraintSeeds: license account {} is not derived from its seeds (expected {expected})",
                license.pubkey
            ));
        }

        let record = License {
            application_id: args.application_id,
            owner: owner.pubkey,
            machine_fingerprint_hash: args.machine_fingerprint_hash,
            derivation_bump: bump,
        };
        Ok(vec![Allocation {
            address: license.pubkey,
            data: record.encode().map_err(|e| e.to_string())?,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drm_core::{ApplicationId, FingerprintHash};
    use solana_sdk::instruction::AccountMeta;

    use crate::instruction::create_license;

    const PROGRAM: Pubkey = Pubkey::new_from_array([9; 32]);

    fn args() -> CreateLicenseArgs {
        CreateLicenseArgs {
            application_id: ApplicationId::new(42),
            machine_fingerprint_hash: FingerprintHash::from_bytes([0xaa; 16]),
        }
    }

    fn run(accounts: &[AccountMeta], data: &[u8]) -> Result<Vec<Allocation>, String> {
        LicenseProgram::new(PROGRAM).execute(&Invocation {
            program_id: &PROGRAM,
            accounts,
            data,
        })
    }

    #[test]
    fn test_creates_record_at_derived_address() {
        let owner = Pubkey::new_from_array([2; 32]);
        let (address, bump) = AddressDeriver::new(PROGRAM)
            .derive(&owner, ApplicationId::new(42))
            .unwrap();
        let developer = Pubkey::new_from_array([1; 32]);
        let ix = create_license(&PROGRAM, &developer, &owner, &address, args()).unwrap();

        let allocations = run(&ix.accounts, &ix.data).unwrap();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].address, address);
        let license = License::decode(&allocations[0].data).unwrap();
        assert_eq!(license.owner, owner);
        assert_eq!(license.derivation_bump, bump);
    }

    #[test]
    fn test_refuses_underived_target() {
        let owner = Pubkey::new_from_array([2; 32]);
        let ix = create_license(
            &PROGRAM,
            &Pubkey::new_from_array([1; 32]),
            &owner,
            &Pubkey::new_from_array([3; 32]),
            args(),
        )
        .unwrap();
        assert!(run(&ix.accounts, &ix.data).unwrap_err().starts_with("ConstraintSeeds"));
    }

    #[test]
    fn test_refuses_unsigned_developer_and_short_account_list() {
        let owner = Pubkey::new_from_array([2; 32]);
        let (address, _) = AddressDeriver::new(PROGRAM)
            .derive(&owner, ApplicationId::new(42))
            .unwrap();
        let developer = Pubkey::new_from_array([1; 32]);
        let mut ix = create_license(&PROGRAM, &developer, &owner, &address, args()).unwrap();
        ix.accounts[0].is_signer = false;
        assert!(run(&ix.accounts, &ix.data).is_err());
        assert_eq!(run(&ix.accounts[..2], &ix.data).unwrap_err(), "NotEnoughAccountKeys");
        assert!(run(&ix.accounts, &ix.data[..10]).is_err());
    }
}
