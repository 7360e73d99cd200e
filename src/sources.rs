use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Error;
use crate::types::{RawInstruction, RawTransaction};

/// Transaction lookup by signature, as served by a JSON-RPC node.
///
/// A missing transaction is [`Error::NotFound`], never an empty success.
pub trait TransactionLookup {
    fn get_transaction(&self, signature: &str) -> Result<RpcTransaction, Error>;
}

/// The streaming platform's test-filter endpoint.
pub trait BlockReplay {
    fn test_filter(&self, request: &TestFilterRequest) -> Result<TestFilterResponse, Error>;
}

/// Fetch a transaction over RPC and convert it to the filter's shape.
pub fn fetch_transaction<L: TransactionLookup>(
    lookup: &L,
    signature: &str,
) -> Result<RawTransaction, Error> {
    lookup.get_transaction(signature)?.into_raw()
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<RpcMeta>,
    pub transaction: RpcTransactionBody,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcMeta {
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub fee: Option<u64>,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionBody {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: RpcMessage,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcMessage {
    pub static_account_keys: Vec<String>,
    pub compiled_instructions: Vec<RpcCompiledInstruction>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcCompiledInstruction {
    pub program_id_index: usize,
    /// Raw bytes: a number array or a serialized `Buffer`.
    pub data: serde_json::Value,
    #[serde(default)]
    pub account_key_indexes: Vec<u32>,
}

impl RpcTransaction {
    /// Resolve program ids against the static account keys.
    pub fn into_raw(self) -> Result<RawTransaction, Error> {
        let RpcTransaction {
            slot,
            block_time,
            meta,
            transaction,
        } = self;
        let RpcMessage {
            static_account_keys,
            compiled_instructions,
        } = transaction.message;

        let instructions = compiled_instructions
            .into_iter()
            .map(|ix| {
                let program_id = static_account_keys
                    .get(ix.program_id_index)
                    .cloned()
                    .ok_or_else(|| Error::Protocol {
                        reason: format!(
                            "programIdIndex {} out of bounds for {} account keys",
                            ix.program_id_index,
                            static_account_keys.len()
                        ),
                    })?;
                Ok(RawInstruction {
                    program_id,
                    data: ix.data,
                    account_indices: ix.account_key_indexes,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let meta = meta.unwrap_or_default();
        Ok(RawTransaction {
            signature: transaction.signatures.into_iter().next().unwrap_or_default(),
            slot: Some(slot),
            block_time,
            err: meta.err,
            fee: meta.fee,
            logs: meta.log_messages,
            instructions,
        })
    }
}

/// Request body of the test-filter endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TestFilterRequest {
    pub network: String,
    /// Slot number as a decimal string.
    pub block: String,
    /// Filter source code, Base64-encoded.
    pub filter_function: String,
}

impl TestFilterRequest {
    pub fn new(network: &str, slot: u64, filter_source: &str) -> Self {
        Self {
            network: network.to_string(),
            block: slot.to_string(),
            filter_function: STANDARD.encode(filter_source),
        }
    }
}

/// Response body of the test-filter endpoint.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TestFilterResponse {
    /// Matched data, `None` when the filter returned nothing.
    #[serde(default, alias = "result")]
    pub filtered_data: Option<serde_json::Value>,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl TestFilterResponse {
    /// Signatures of every matched transaction in the response, in order.
    pub fn matched_signatures(&self) -> Vec<String> {
        fn collect(value: &serde_json::Value, out: &mut Vec<String>) {
            match value {
                serde_json::Value::Array(items) => {
                    for item in items {
                        collect(item, out);
                    }
                }
                serde_json::Value::Object(obj) => {
                    if let Some(sig) = obj.get("signature").and_then(|v| v.as_str()) {
                        out.push(sig.to_string());
                    } else if let Some(nested) = obj
                        .get("matchedTransactions")
                        .or_else(|| obj.get("transactions"))
                    {
                        collect(nested, out);
                    }
                }
                _ => {}
            }
        }

        let mut out = Vec::new();
        if let Some(data) = &self.filtered_data {
            collect(data, &mut out);
        }
        out
    }
}

/// Run the predicate against one slot and return the matched signatures.
pub fn replay_slot<R: BlockReplay>(
    replay: &R,
    network: &str,
    slot: u64,
    filter_source: &str,
) -> Result<Vec<String>, Error> {
    let request = TestFilterRequest::new(network, slot, filter_source);
    let response = replay.test_filter(&request)?;
    for line in &response.logs {
        tracing::debug!(slot, log = %line, "filter log");
    }
    Ok(response.matched_signatures())
}
