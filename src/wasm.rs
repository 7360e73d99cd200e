use wasm_bindgen::prelude::*;

use crate::drift::{self, DriftInstruction, KnownDiscriminator};
use crate::filter;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON)]
    fn parse(s: &str) -> JsValue;
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    match serde_json::to_string(value) {
        Ok(json_str) => parse(&json_str),
        Err(_) => JsValue::NULL,
    }
}

fn from_js(value: JsValue) -> Option<serde_json::Value> {
    serde_wasm_bindgen::from_value(value).ok()
}

fn table_to_json(table: &[KnownDiscriminator]) -> Vec<serde_json::Value> {
    table
        .iter()
        .map(|k| {
            serde_json::json!({
                "discriminator": k.discriminator.to_string(),
                "instruction": k.instruction.as_ref(),
            })
        })
        .collect()
}

/// True iff the transaction carries at least one Drift perp-order instruction.
#[wasm_bindgen(js_name = isPerpOrderTransaction)]
pub fn is_perp_order_transaction(tx: JsValue) -> bool {
    from_js(tx).is_some_and(|v| filter::is_perp_order_transaction(&v))
}

/// Canonical record for a matching transaction, or `null`.
#[wasm_bindgen(js_name = filterTransaction)]
pub fn filter_transaction(tx: JsValue) -> JsValue {
    match from_js(tx).and_then(|v| filter::filter_value(&v)) {
        Some(record) => to_js(&record),
        None => JsValue::NULL,
    }
}

/// All matching records of a block, or `null` when nothing matched.
#[wasm_bindgen(js_name = filterBlock)]
pub fn filter_block(block: JsValue) -> JsValue {
    let Some(block) = from_js(block) else {
        return JsValue::NULL;
    };
    let records = filter::filter_block(&block);
    if records.is_empty() {
        return JsValue::NULL;
    }
    to_js(&records)
}

/// The allow-list and the known non-matching tags, for diagnostics.
#[wasm_bindgen(js_name = knownDiscriminators)]
pub fn known_discriminators() -> JsValue {
    to_js(&serde_json::json!({
        "programId": drift::DRIFT_PROGRAM_ID,
        "perpOrders": table_to_json(drift::PERP_ORDER_DISCRIMINATORS),
        "nonPerp": table_to_json(drift::NON_PERP_DISCRIMINATORS),
    }))
}

/// Hex discriminator of an instruction name, or `null` if unknown.
#[wasm_bindgen(js_name = discriminatorOf)]
pub fn discriminator_of(name: &str) -> Option<String> {
    let instruction = name.parse::<DriftInstruction>().ok()?;
    drift::discriminator_of(instruction).map(|d| d.to_string())
}
