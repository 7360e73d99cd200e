use serde::Deserialize;

use crate::drift::matcher::FilterConfig;
use crate::encoding;
use crate::types::{MatchedInstruction, RawTransaction, TransactionRecord};

/// Slot and block time inherited by transactions that don't carry their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockContext {
    pub slot: Option<u64>,
    pub block_time: Option<i64>,
}

/// Scan `tx` against the Drift allow-list.
pub fn filter_transaction(tx: &RawTransaction) -> Option<TransactionRecord> {
    filter_transaction_with(&FilterConfig::default(), tx, BlockContext::default())
}

pub fn filter_transaction_with(
    config: &FilterConfig<'_>,
    tx: &RawTransaction,
    block: BlockContext,
) -> Option<TransactionRecord> {
    let matched_instructions: Vec<MatchedInstruction> = tx
        .instructions
        .iter()
        .enumerate()
        .filter_map(|(index, ix)| {
            let bytes = encoding::normalize(&ix.data);
            let found = config.match_instruction(&bytes, &ix.program_id)?;
            tracing::debug!(
                signature = %tx.signature,
                index,
                discriminator = %found.discriminator,
                instructions = ?found.instructions,
                "matched perp-order instruction"
            );
            Some(MatchedInstruction {
                index,
                program_id: ix.program_id.clone(),
                data: ix.data.clone(),
                account_indices: ix.account_indices.clone(),
                discriminator: found.discriminator,
                instructions: found.instructions,
                bytes,
            })
        })
        .collect();

    if matched_instructions.is_empty() {
        return None;
    }

    Some(TransactionRecord {
        signature: tx.signature.clone(),
        slot: tx.slot.or(block.slot).unwrap_or_default(),
        block_time: tx.block_time.or(block.block_time).unwrap_or_default(),
        success: tx.success(),
        fee: tx.fee,
        matched_instructions,
        logs: tx.logs.clone(),
    })
}

/// Filter an untyped transaction object. A malformed object is a non-match, never an error.
pub fn filter_value(value: &serde_json::Value) -> Option<TransactionRecord> {
    filter_value_with(&FilterConfig::default(), value, BlockContext::default())
}

pub fn filter_value_with(
    config: &FilterConfig<'_>,
    value: &serde_json::Value,
    block: BlockContext,
) -> Option<TransactionRecord> {
    match RawTransaction::deserialize(value) {
        Ok(tx) => filter_transaction_with(config, &tx, block),
        Err(err) => {
            tracing::debug!(error = %err, "skipping malformed transaction");
            None
        }
    }
}

pub fn is_perp_order_transaction(value: &serde_json::Value) -> bool {
    filter_value(value).is_some()
}

/// Filter every transaction of a block.
///
/// Accepts `{"slot", "blockTime", "transactions": [..]}` or a bare array of
/// transactions. Malformed entries are skipped; the scan always continues.
pub fn filter_block(block: &serde_json::Value) -> Vec<TransactionRecord> {
    filter_block_with(&FilterConfig::default(), block)
}

pub fn filter_block_with(
    config: &FilterConfig<'_>,
    block: &serde_json::Value,
) -> Vec<TransactionRecord> {
    let (transactions, context) = match block {
        serde_json::Value::Array(txs) => (txs, BlockContext::default()),
        serde_json::Value::Object(obj) => {
            let Some(txs) = obj.get("transactions").and_then(|v| v.as_array()) else {
                tracing::debug!("block has no transaction list");
                return Vec::new();
            };
            let context = BlockContext {
                slot: obj.get("slot").and_then(|v| v.as_u64()),
                block_time: obj.get("blockTime").and_then(|v| v.as_i64()),
            };
            (txs, context)
        }
        _ => return Vec::new(),
    };

    let records: Vec<TransactionRecord> = transactions
        .iter()
        .filter_map(|tx| filter_value_with(config, tx, context))
        .collect();
    tracing::debug!(
        slot = ?context.slot,
        scanned = transactions.len(),
        matched = records.len(),
        "block filtered"
    );
    records
}
