use serde::Deserialize;

use crate::drift::{Discriminator, DriftInstruction};

/// One instruction as delivered by either data source.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstruction {
    /// Base58 program id the instruction targets.
    pub program_id: String,
    /// Payload: raw bytes (RPC) or Base58 text (stream). Normalized before matching.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Indices into the transaction's account keys. Empty when the source sends
    /// pubkey strings, `null`, or anything else that isn't a list of indices.
    #[serde(
        default,
        alias = "accounts",
        alias = "accountKeyIndexes",
        deserialize_with = "lenient_account_indices"
    )]
    pub account_indices: Vec<u32>,
}

impl RawInstruction {
    /// Placeholder for an entry that failed to deserialize. Keeps later
    /// instructions at their original positions and never matches.
    fn unreadable() -> Self {
        Self {
            program_id: String::new(),
            data: serde_json::Value::Null,
            account_indices: Vec::new(),
        }
    }
}

fn lenient_account_indices<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|v| v.as_u64().and_then(|n| u32::try_from(n).ok()))
                .collect()
        })
        .unwrap_or_default())
}

fn instructions_skipping_unreadable<'de, D>(
    deserializer: D,
) -> Result<Vec<RawInstruction>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let items = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            RawInstruction::deserialize(item).unwrap_or_else(|err| {
                tracing::debug!(index, error = %err, "skipping unreadable instruction");
                RawInstruction::unreadable()
            })
        })
        .collect())
}

/// A transaction in the shape the filter scans.
///
/// `instructions` is required: a record without it fails to deserialize and the
/// filter treats it as a non-match. A single unreadable entry inside the list
/// only disables that entry.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub slot: Option<u64>,
    #[serde(default)]
    pub block_time: Option<i64>,
    /// Execution error, `null` or absent on success.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub fee: Option<u64>,
    #[serde(default, alias = "logMessages")]
    pub logs: Option<Vec<String>>,
    #[serde(deserialize_with = "instructions_skipping_unreadable")]
    pub instructions: Vec<RawInstruction>,
}

impl RawTransaction {
    pub fn success(&self) -> bool {
        self.err.is_none()
    }
}

/// An instruction that passed the discriminator check.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedInstruction {
    /// Position within the transaction.
    pub index: usize,
    pub program_id: String,
    /// Payload exactly as received.
    pub data: serde_json::Value,
    pub account_indices: Vec<u32>,
    pub discriminator: Discriminator,
    /// All names registered under `discriminator`.
    pub instructions: Vec<DriftInstruction>,
    /// Normalized payload bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Canonical record forwarded for a matching transaction.
///
/// Holds only the matching instructions, in their original relative order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub signature: String,
    pub slot: u64,
    pub block_time: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<u64>,
    pub matched_instructions: Vec<MatchedInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn account_indices_tolerate_foreign_shapes() {
        let shapes = [
            serde_json::json!(null),
            serde_json::json!(["dRiftyHA39MWEi3m9aunc5MzRF1JYuBsbn6VPcn33UH"]),
            serde_json::json!([0, "x"]),
            serde_json::json!("0,1"),
        ];
        for accounts in shapes {
            let ix: RawInstruction = serde_json::from_value(serde_json::json!({
                "programId": "11111111111111111111111111111111",
                "data": "",
                "accounts": accounts,
            }))
            .unwrap();
            assert!(ix.account_indices.is_empty(), "kept indices from {accounts}");
        }
    }

    #[test]
    fn unreadable_instruction_keeps_its_slot() {
        let tx: RawTransaction = serde_json::from_value(serde_json::json!({
            "signature": "sig",
            "instructions": [
                { "data": "no program id" },
                { "programId": "11111111111111111111111111111111", "accounts": [4] },
            ]
        }))
        .unwrap();
        assert_eq!(tx.instructions.len(), 2);
        assert!(tx.instructions[0].program_id.is_empty());
        assert_eq!(tx.instructions[1].account_indices, vec![4]);
    }

    #[test]
    fn instruction_list_must_be_an_array() {
        for instructions in [serde_json::json!(null), serde_json::json!("nope")] {
            let parsed = serde_json::from_value::<RawTransaction>(serde_json::json!({
                "signature": "sig",
                "instructions": instructions,
            }));
            assert!(parsed.is_err());
        }
    }
}
