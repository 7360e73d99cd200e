use crate::drift::{
    DRIFT_PROGRAM_ID, Discriminator, DriftInstruction, KnownDiscriminator,
    PERP_ORDER_DISCRIMINATORS, names_for,
};
use crate::error::Error;

/// Target program and allow-list the matcher compares against.
#[derive(Debug, Clone, Copy)]
pub struct FilterConfig<'a> {
    pub program_id: &'a str,
    pub allow_list: &'a [KnownDiscriminator],
}

impl Default for FilterConfig<'static> {
    fn default() -> Self {
        Self {
            program_id: DRIFT_PROGRAM_ID,
            allow_list: PERP_ORDER_DISCRIMINATORS,
        }
    }
}

/// A positive match: the tag plus every name registered under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorMatch {
    pub discriminator: Discriminator,
    pub instructions: Vec<DriftInstruction>,
}

impl<'a> FilterConfig<'a> {
    /// Builds a config after checking `program_id` is a Base58 32-byte key.
    pub fn new(
        program_id: &'a str,
        allow_list: &'a [KnownDiscriminator],
    ) -> Result<Self, Error> {
        let config = Self {
            program_id,
            allow_list,
        };
        #[cfg(feature = "native")]
        config.program_pubkey()?;
        #[cfg(not(feature = "native"))]
        decode_program_id(program_id)?;
        Ok(config)
    }

    /// Target program as a typed key.
    #[cfg(feature = "native")]
    pub fn program_pubkey(&self) -> Result<solana_pubkey::Pubkey, Error> {
        decode_program_id(self.program_id).map(solana_pubkey::Pubkey::new_from_array)
    }

    pub fn match_instruction(
        &self,
        data: &[u8],
        program_id: &str,
    ) -> Option<DiscriminatorMatch> {
        if program_id != self.program_id {
            return None;
        }
        let discriminator = Discriminator::from_data(data)?;
        let instructions = names_for(self.allow_list, discriminator);
        if instructions.is_empty() {
            return None;
        }
        Some(DiscriminatorMatch {
            discriminator,
            instructions,
        })
    }

    pub fn matches(&self, data: &[u8], program_id: &str) -> bool {
        self.match_instruction(data, program_id).is_some()
    }
}

/// Whether `data` under `program_id` is one of the Drift perp-order instructions.
pub fn is_perp_order_instruction(data: &[u8], program_id: &str) -> bool {
    FilterConfig::default().matches(data, program_id)
}

fn decode_program_id(program_id: &str) -> Result<[u8; 32], Error> {
    let bytes = bs58::decode(program_id)
        .into_vec()
        .map_err(|e| Error::Protocol {
            reason: format!("program id {program_id} is not base58: {e}"),
        })?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| Error::Protocol {
        reason: format!(
            "program id {program_id} decodes to {} bytes, expected 32",
            bytes.len()
        ),
    })
}
