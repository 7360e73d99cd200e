use crate::drift::{DISCRIMINATOR_LEN, Discriminator, SIGNED_MSG_TAKER_ORDER};
use crate::error::Error;
use crate::types::{MatchedInstruction, TransactionRecord};

// Offsets are relative to the payload after the 8-byte discriminator.
const VEC_LEN_OFFSET: usize = 0;
const SIGNATURE_OFFSET: usize = 4;
const SIGNATURE_LEN: usize = 64;
const AUTHORITY_OFFSET: usize = 68;
const AUTHORITY_LEN: usize = 32;
const MESSAGE_LEN_OFFSET: usize = 100;
const MESSAGE_OFFSET: usize = 102;

/// Smallest payload (discriminator stripped) the layout can describe.
pub const MIN_SIGNED_ORDER_PAYLOAD_LEN: usize = 107;

/// Fields unpacked from the payload before the order-params message is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrderPayload {
    pub signature: [u8; SIGNATURE_LEN],
    pub signing_authority: [u8; AUTHORITY_LEN],
    pub is_delegate_signer: bool,
    /// Hex-decoded message bytes.
    pub message: Vec<u8>,
}

/// A fully decoded signed taker order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrderRecord<M> {
    pub signature: [u8; SIGNATURE_LEN],
    pub signing_authority: [u8; AUTHORITY_LEN],
    pub is_delegate_signer: bool,
    pub message: M,
}

impl<M> SignedOrderRecord<M> {
    pub fn signature_base58(&self) -> String {
        bs58::encode(self.signature).into_string()
    }

    pub fn signing_authority_base58(&self) -> String {
        bs58::encode(self.signing_authority).into_string()
    }
}

/// Decodes the embedded order-params message.
///
/// Implemented by the protocol SDK binding; this crate does not interpret the
/// message structure itself.
pub trait OrderParamsDecoder {
    type Message;

    fn decode_order_params(
        &self,
        message: &[u8],
        is_delegate_signer: bool,
    ) -> Result<Self::Message, Error>;
}

/// Keeps the message bytes undecoded, for tooling that only needs the envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMessage;

impl OrderParamsDecoder for RawMessage {
    type Message = Vec<u8>;

    fn decode_order_params(
        &self,
        message: &[u8],
        _is_delegate_signer: bool,
    ) -> Result<Self::Message, Error> {
        Ok(message.to_vec())
    }
}

fn read_array<const N: usize>(payload: &[u8], offset: usize) -> Result<[u8; N], Error> {
    payload
        .get(offset..offset + N)
        .and_then(|s| <[u8; N]>::try_from(s).ok())
        .ok_or(Error::PayloadTooShort {
            len: payload.len(),
            required: offset + N,
        })
}

/// Unpack a payload whose discriminator has already been stripped.
pub fn parse_signed_order_payload(payload: &[u8]) -> Result<SignedOrderPayload, Error> {
    let len = payload.len();
    if len < MIN_SIGNED_ORDER_PAYLOAD_LEN {
        return Err(Error::PayloadTooShort {
            len,
            required: MIN_SIGNED_ORDER_PAYLOAD_LEN,
        });
    }

    let vec_len = u32::from_le_bytes(read_array(payload, VEC_LEN_OFFSET)?) as usize;
    let flag_offset = SIGNATURE_OFFSET
        .checked_add(vec_len)
        .ok_or(Error::PayloadTooShort {
            len,
            required: usize::MAX,
        })?;
    let is_delegate_signer = match payload.get(flag_offset) {
        Some(flag) => *flag == 1,
        None => {
            return Err(Error::PayloadTooShort {
                len,
                required: flag_offset.saturating_add(1),
            });
        }
    };

    let signature = read_array::<SIGNATURE_LEN>(payload, SIGNATURE_OFFSET)?;
    let signing_authority = read_array::<AUTHORITY_LEN>(payload, AUTHORITY_OFFSET)?;
    let message_len = u16::from_le_bytes(read_array(payload, MESSAGE_LEN_OFFSET)?) as usize;

    let message_end = MESSAGE_OFFSET + message_len;
    let message_hex = payload
        .get(MESSAGE_OFFSET..message_end)
        .ok_or(Error::PayloadTooShort {
            len,
            required: message_end,
        })?;
    let message = hex::decode(message_hex).map_err(|e| Error::InvalidHexMessage {
        reason: e.to_string(),
    })?;

    Ok(SignedOrderPayload {
        signature,
        signing_authority,
        is_delegate_signer,
        message,
    })
}

/// Decode a full instruction payload (discriminator included).
pub fn decode_signed_order<D: OrderParamsDecoder>(
    data: &[u8],
    decoder: &D,
) -> Result<SignedOrderRecord<D::Message>, Error> {
    let discriminator = Discriminator::from_data(data).ok_or(Error::PayloadTooShort {
        len: data.len(),
        required: DISCRIMINATOR_LEN,
    })?;
    if discriminator != SIGNED_MSG_TAKER_ORDER {
        return Err(Error::Protocol {
            reason: format!("discriminator {discriminator} is not a signed taker order"),
        });
    }

    let SignedOrderPayload {
        signature,
        signing_authority,
        is_delegate_signer,
        message,
    } = parse_signed_order_payload(data.get(DISCRIMINATOR_LEN..).unwrap_or_default())?;

    let message = decoder.decode_order_params(&message, is_delegate_signer)?;
    Ok(SignedOrderRecord {
        signature,
        signing_authority,
        is_delegate_signer,
        message,
    })
}

/// A matched signed taker order together with its decode outcome.
#[derive(Debug)]
pub struct DecodedMatch<'r, M> {
    pub instruction: &'r MatchedInstruction,
    /// `None` when the payload could not be decoded; the match still stands.
    pub order: Option<SignedOrderRecord<M>>,
}

/// Decode every signed taker order in `record`, downgrading failures to `None`.
pub fn decode_matched_signed_orders<'r, D: OrderParamsDecoder>(
    record: &'r TransactionRecord,
    decoder: &D,
) -> Vec<DecodedMatch<'r, D::Message>> {
    record
        .matched_instructions
        .iter()
        .filter(|ix| ix.discriminator == SIGNED_MSG_TAKER_ORDER)
        .map(|ix| {
            let order = match decode_signed_order(&ix.bytes, decoder) {
                Ok(order) => Some(order),
                Err(err) => {
                    tracing::warn!(
                        signature = %record.signature,
                        index = ix.index,
                        error = %err,
                        "signed taker order matched but could not be decoded"
                    );
                    None
                }
            };
            DecodedMatch {
                instruction: ix,
                order,
            }
        })
        .collect()
}
