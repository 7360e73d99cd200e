#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod compare;
pub mod drift;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod sources;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use compare::{InstructionComparison, SourceComparison, compare_sources};
pub use drift::matcher::{DiscriminatorMatch, FilterConfig, is_perp_order_instruction};
pub use drift::signed_order::{
    DecodedMatch, OrderParamsDecoder, RawMessage, SignedOrderPayload, SignedOrderRecord,
    decode_matched_signed_orders, decode_signed_order, parse_signed_order_payload,
};
pub use drift::{
    DRIFT_PROGRAM_ID, Discriminator, DriftInstruction, KnownDiscriminator,
    NON_PERP_DISCRIMINATORS, PERP_ORDER_DISCRIMINATORS, SIGNED_MSG_TAKER_ORDER,
};
pub use error::Error;
pub use filter::{
    BlockContext, filter_block, filter_transaction, filter_value, is_perp_order_transaction,
};
pub use sources::{
    BlockReplay, RpcTransaction, TestFilterRequest, TestFilterResponse, TransactionLookup,
    fetch_transaction, replay_slot,
};
pub use types::{MatchedInstruction, RawInstruction, RawTransaction, TransactionRecord};
