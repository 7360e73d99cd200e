use crate::encoding;
use crate::filter;
use crate::types::RawTransaction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionComparison {
    pub index: usize,
    pub program_id: String,
    pub rpc_len: usize,
    pub stream_len: usize,
    pub identical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceComparison {
    pub signature: String,
    pub instructions: Vec<InstructionComparison>,
    pub instruction_count_matches: bool,
    pub rpc_matched: bool,
    pub stream_matched: bool,
}

impl SourceComparison {
    pub fn is_equivalent(&self) -> bool {
        self.instruction_count_matches
            && self.rpc_matched == self.stream_matched
            && self.instructions.iter().all(|ix| ix.identical)
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &InstructionComparison> {
        self.instructions.iter().filter(|ix| !ix.identical)
    }
}

pub fn compare_sources(rpc: &RawTransaction, stream: &RawTransaction) -> SourceComparison {
    let instructions = rpc
        .instructions
        .iter()
        .zip(&stream.instructions)
        .enumerate()
        .map(|(index, (from_rpc, from_stream))| {
            let rpc_bytes = encoding::normalize(&from_rpc.data);
            let stream_bytes = encoding::normalize(&from_stream.data);
            InstructionComparison {
                index,
                program_id: from_rpc.program_id.clone(),
                rpc_len: rpc_bytes.len(),
                stream_len: stream_bytes.len(),
                identical: from_rpc.program_id == from_stream.program_id
                    && rpc_bytes == stream_bytes,
            }
        })
        .collect();

    let comparison = SourceComparison {
        signature: rpc.signature.clone(),
        instructions,
        instruction_count_matches: rpc.instructions.len() == stream.instructions.len(),
        rpc_matched: filter::filter_transaction(rpc).is_some(),
        stream_matched: filter::filter_transaction(stream).is_some(),
    };
    if !comparison.is_equivalent() {
        tracing::warn!(
            signature = %comparison.signature,
            mismatched = comparison.mismatches().count(),
            "sources disagree"
        );
    }
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::{DRIFT_PROGRAM_ID, SIGNED_MSG_TAKER_ORDER};
    use crate::types::RawInstruction;

    fn transaction(data: serde_json::Value) -> RawTransaction {
        RawTransaction {
            signature: "sig".to_string(),
            slot: Some(1),
            block_time: None,
            err: None,
            fee: None,
            logs: None,
            instructions: vec![RawInstruction {
                program_id: DRIFT_PROGRAM_ID.to_string(),
                data,
                account_indices: vec![],
            }],
        }
    }

    fn payload() -> Vec<u8> {
        let mut data = SIGNED_MSG_TAKER_ORDER.0.to_vec();
        data.extend_from_slice(&[0, 0, 1, 2, 3]);
        data
    }

    #[test]
    fn raw_and_base58_copies_are_equivalent() {
        let rpc = transaction(serde_json::json!(payload()));
        let stream = transaction(serde_json::Value::String(
            bs58::encode(payload()).into_string(),
        ));
        let comparison = compare_sources(&rpc, &stream);
        assert!(comparison.is_equivalent());
        assert!(comparison.rpc_matched);
        assert!(comparison.stream_matched);
        assert_eq!(comparison.instructions[0].rpc_len, 13);
    }

    #[test]
    fn differing_bytes_are_reported() {
        let rpc = transaction(serde_json::json!(payload()));
        let mut other = payload();
        other[0] = 0;
        let stream = transaction(serde_json::Value::String(bs58::encode(other).into_string()));
        let comparison = compare_sources(&rpc, &stream);
        assert!(!comparison.is_equivalent());
        assert_eq!(comparison.mismatches().count(), 1);
        assert!(!comparison.stream_matched);
    }

    #[test]
    fn instruction_count_mismatch_is_not_equivalent() {
        let rpc = transaction(serde_json::json!(payload()));
        let mut stream = rpc.clone();
        stream.instructions.clear();
        let comparison = compare_sources(&rpc, &stream);
        assert!(!comparison.instruction_count_matches);
        assert!(!comparison.is_equivalent());
    }
}
