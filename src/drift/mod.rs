pub mod matcher;
pub mod signed_order;

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const DRIFT_PROGRAM_ID: &str = "dRiftyHA39MWEi3m9aunc5MzRF1JYuBsbn6VPcn33UH";

pub const DISCRIMINATOR_LEN: usize = 8;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::VariantNames,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum DriftInstruction {
    PlacePerpOrder,
    PlaceAndTakePerpOrder,
    PlaceAndMakePerpOrder,
    PlaceSignedMsgTakerOrder,
    PlaceAndMakeSignedMsgPerpOrder,
    FillPerpOrder,
    PlaceOrders,
    CancelOrder,
}

/// The leading 8 bytes of an instruction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Discriminator(pub [u8; DISCRIMINATOR_LEN]);

impl Discriminator {
    /// `None` when `data` holds fewer than 8 bytes.
    pub fn from_data(data: &[u8]) -> Option<Self> {
        data.get(..DISCRIMINATOR_LEN)
            .and_then(|head| <[u8; DISCRIMINATOR_LEN]>::try_from(head).ok())
            .map(Self)
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Discriminator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| Error::Protocol {
            reason: format!("invalid discriminator hex {s:?}: {e}"),
        })?;
        let arr = <[u8; DISCRIMINATOR_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
            Error::Protocol {
                reason: format!("discriminator must be 8 bytes, got {}", bytes.len()),
            }
        })?;
        Ok(Self(arr))
    }
}

impl serde::Serialize for Discriminator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct KnownDiscriminator {
    pub discriminator: Discriminator,
    pub instruction: DriftInstruction,
}

const fn known(
    bytes: [u8; DISCRIMINATOR_LEN],
    instruction: DriftInstruction,
) -> KnownDiscriminator {
    KnownDiscriminator {
        discriminator: Discriminator(bytes),
        instruction,
    }
}

/// Tag of the "place pre-signed taker order" instruction.
pub const SIGNED_MSG_TAKER_ORDER: Discriminator =
    Discriminator([0x20, 0x4f, 0x65, 0x8b, 0x19, 0x06, 0x62, 0x0f]);

const PLACE_AND_TAKE_PERP_ORDER: [u8; DISCRIMINATOR_LEN] =
    [0xd5, 0x33, 0x01, 0xbb, 0x6c, 0xdc, 0xe6, 0xe0];

/// Perpetual-order instructions the filter forwards.
///
/// Tags were sampled from real top-level instructions. `FillPerpOrder` only runs
/// nested inside `PlaceAndTakePerpOrder`, so it is listed under the top-level tag:
/// its own tag never shows up in replay or stream data.
pub const PERP_ORDER_DISCRIMINATORS: &[KnownDiscriminator] = &[
    known(
        [0x45, 0xa1, 0x5d, 0xca, 0x78, 0x7e, 0x4c, 0xb9],
        DriftInstruction::PlacePerpOrder,
    ),
    known(
        PLACE_AND_TAKE_PERP_ORDER,
        DriftInstruction::PlaceAndTakePerpOrder,
    ),
    known(PLACE_AND_TAKE_PERP_ORDER, DriftInstruction::FillPerpOrder),
    known(
        [0x95, 0x75, 0x0b, 0xed, 0x2f, 0x5f, 0x59, 0xed],
        DriftInstruction::PlaceAndMakePerpOrder,
    ),
    known(
        SIGNED_MSG_TAKER_ORDER.0,
        DriftInstruction::PlaceSignedMsgTakerOrder,
    ),
    known(
        [0x10, 0x1a, 0x7b, 0x83, 0x5e, 0x1d, 0xaf, 0x62],
        DriftInstruction::PlaceAndMakeSignedMsgPerpOrder,
    ),
];

/// Drift instructions known to fall outside the perp-order set.
pub const NON_PERP_DISCRIMINATORS: &[KnownDiscriminator] = &[
    known(
        [0x3c, 0x3f, 0x32, 0x7b, 0x0c, 0xc5, 0x3c, 0xbe],
        DriftInstruction::PlaceOrders,
    ),
    known(
        [0x5f, 0x81, 0xed, 0xf0, 0x08, 0x31, 0xdf, 0x84],
        DriftInstruction::CancelOrder,
    ),
];

/// Every instruction name registered under `discriminator` in `table`, in table order.
pub fn names_for(
    table: &[KnownDiscriminator],
    discriminator: Discriminator,
) -> Vec<DriftInstruction> {
    table
        .iter()
        .filter(|k| k.discriminator == discriminator)
        .map(|k| k.instruction)
        .collect()
}

/// Reverse lookup across both tables, for diagnostics.
pub fn discriminator_of(instruction: DriftInstruction) -> Option<Discriminator> {
    PERP_ORDER_DISCRIMINATORS
        .iter()
        .chain(NON_PERP_DISCRIMINATORS)
        .find(|k| k.instruction == instruction)
        .map(|k| k.discriminator)
}
