//! Soroban RPC client: polls `getEvents` and decodes Rahat events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! ## Decoding
//!
//! Events are requested with `xdrFormat: "json"`, so topics and data arrive as
//! the JSON rendering of `ScVal` (`{"symbol": "issued"}`, `{"map": [...]}`).
//! [`normalize`] flattens that rendering into plain JSON before fields are
//! picked out. Nodes that ignore the format hint return base64 XDR; for those
//! only the leading topic symbol is recovered.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, RahatEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// XDR discriminant of `ScVal::Symbol`.
const SCV_SYMBOL: u32 = 15;
/// `SCSymbol` is `string<32>`.
const SCV_SYMBOL_MAX: usize = 32;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[allow(dead_code)]
pub struct RawEvent {
    /// XDR-encoded topic list
    #[serde(default)]
    pub topic: Vec<String>,
    /// Topic list rendered as `ScVal` JSON
    #[serde(rename = "topicJson")]
    pub topic_json: Option<Vec<Value>>,
    /// XDR-encoded event value / data
    #[serde(default)]
    pub value: Value,
    /// Event data rendered as `ScVal` JSON
    #[serde(rename = "valueJson")]
    pub value_json: Option<Value>,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`: optional opaque pagination cursor from a previous response.
/// * `limit`: maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        let resp = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                backoff = sleep_backoff(backoff).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {backoff}s)");
            backoff = sleep_backoff(backoff).await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            // Invalid request / unknown method will not fix themselves.
            if err.code == -32600 || err.code == -32601 {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {backoff}s): {} {}",
                err.code, err.message
            );
            backoff = sleep_backoff(backoff).await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

async fn sleep_backoff(current: u64) -> u64 {
    tokio::time::sleep(Duration::from_secs(current)).await;
    (current * 2).min(MAX_BACKOFF_SECS)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`RahatEvent`] structs.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<RahatEvent> {
    raw.iter()
        .enumerate()
        .filter(|(_, e)| e.in_successful_contract_call != Some(false))
        .filter_map(|(position, e)| decode_single(e, position, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, position: usize, contract_id: &str) -> Option<RahatEvent> {
    let topics = topics_of(raw);
    let kind = EventKind::from_topic(topics.first()?.as_str()?);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let data = match &raw.value_json {
        Some(value) => normalize(value),
        None => normalize(&raw.value),
    };
    let fields = decode_data(&data, kind);

    let project_id = fields.project.or_else(|| {
        kind.project_topic()
            .then(|| topics.get(1).and_then(as_text))
            .flatten()
    });

    let event_id = raw
        .id
        .clone()
        .or_else(|| raw.paging_token.clone())
        .unwrap_or_else(|| {
            format!(
                "{ledger}-{}-{position}",
                raw.tx_hash.as_deref().unwrap_or("none")
            )
        });

    Some(RahatEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        project_id,
        beneficiary: fields.beneficiary,
        actor: fields.actor,
        amount: fields.amount,
        token_kind: fields.token_kind,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Topics as plain JSON values, whichever format the node returned.
fn topics_of(raw: &RawEvent) -> Vec<Value> {
    match &raw.topic_json {
        Some(topics) => topics.iter().map(normalize).collect(),
        None => raw.topic.iter().map(|t| parse_topic(t)).collect(),
    }
}

#[derive(Debug, Default)]
struct DataFields {
    project: Option<String>,
    beneficiary: Option<String>,
    actor: Option<String>,
    amount: Option<String>,
    token_kind: Option<String>,
}

/// Pick the indexed columns out of a normalized event body.
fn decode_data(value: &Value, kind: EventKind) -> DataFields {
    if kind == EventKind::Unknown {
        return DataFields::default();
    }

    let actor_key = match kind {
        EventKind::RoleSet | EventKind::RoleDel => Some("account"),
        EventKind::MobilizerAdded | EventKind::MobilizerRemoved => Some("mobilizer"),
        EventKind::TokenIssued => Some("issuer"),
        EventKind::ClaimCreated
        | EventKind::ClaimApproved
        | EventKind::ClaimRedeemed
        | EventKind::ClaimCancelled => Some("vendor"),
        EventKind::ResponseConfirmed
        | EventKind::DeactivationRequested
        | EventKind::ResponseDeactivated => Some("admin"),
        EventKind::ThresholdChanged => Some("by"),
        _ => None,
    };
    let amount_key = match kind {
        EventKind::BudgetAllocated
        | EventKind::TokenIssued
        | EventKind::ClaimCreated
        | EventKind::ClaimRedeemed => Some("amount"),
        EventKind::ThresholdChanged => Some("threshold"),
        _ => None,
    };

    let token_kind = match kind {
        EventKind::TokenClassCreated => {
            extract_field(value, &["id"]).map(|id| format!("semi_fungible:{id}"))
        }
        _ => value.get("kind").and_then(kind_label),
    };

    DataFields {
        project: extract_field(value, &["project"]),
        beneficiary: extract_field(value, &["beneficiary"]).and_then(|b| normalize_hash(&b)),
        actor: actor_key.and_then(|key| extract_field(value, &[key])),
        amount: amount_key.and_then(|key| extract_field(value, &[key])),
        token_kind,
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| value.get(key).and_then(as_text))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `["Fungible"]` → `fungible`, `["SemiFungible", 3]` → `semi_fungible:3`.
fn kind_label(value: &Value) -> Option<String> {
    let parts = match value {
        Value::Array(parts) => parts.clone(),
        Value::String(_) => vec![value.clone()],
        _ => return None,
    };
    match (parts.first()?.as_str()?, parts.get(1)) {
        ("Fungible", None) => Some("fungible".to_string()),
        ("SemiFungible", Some(id)) => as_text(id).map(|id| format!("semi_fungible:{id}")),
        _ => None,
    }
}

/// Lower-case a 32-byte hex hash; anything else is rejected.
pub fn normalize_hash(raw: &str) -> Option<String> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).ok()?;
    (bytes.len() == 32).then(|| hex::encode(bytes))
}

/// Flatten the JSON rendering of an `ScVal` into plain JSON.
///
/// Single-key objects tagged with an `ScVal` type collapse to their payload;
/// maps become objects keyed by the flattened key.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(map) if map.len() == 1 => {
            let Some((tag, inner)) = map.iter().next() else {
                return value.clone();
            };
            match tag.as_str() {
                "symbol" | "string" | "address" | "bytes" | "bool" | "u32" | "i32" | "u64"
                | "i64" | "u128" | "i128" | "timepoint" | "duration" => inner.clone(),
                "vec" => normalize(inner),
                "map" => match inner {
                    Value::Array(entries) => {
                        let mut object = Map::new();
                        for entry in entries {
                            let key = entry.get("key").map(normalize).and_then(|k| as_text(&k));
                            if let (Some(key), Some(val)) = (key, entry.get("val")) {
                                object.insert(key, normalize(val));
                            }
                        }
                        Value::Object(object)
                    }
                    other => normalize(other),
                },
                _ => Value::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), normalize(v)))
                        .collect(),
                ),
            }
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Parse one entry of the legacy `topic` list.
///
/// Accepts `{"type":"symbol","value":"issued"}`, `ScVal` JSON, base64 XDR of
/// a symbol, or the raw string.
fn parse_topic(raw: &str) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(inner) = v.get("value") {
            return inner.clone();
        }
        if v.is_object() {
            return normalize(&v);
        }
    }
    if let Some(symbol) = decode_xdr_symbol(raw) {
        return Value::String(symbol);
    }
    Value::String(raw.to_string())
}

/// Decode a base64 XDR `ScVal::Symbol`.
///
/// The body is a 4-byte length, at most [`SCV_SYMBOL_MAX`] bytes of
/// `[A-Za-z0-9_]`, and zero padding to a 4-byte boundary. Anything else,
/// trailing bytes included, is rejected.
fn decode_xdr_symbol(raw: &str) -> Option<String> {
    let bytes = STANDARD.decode(raw).ok()?;
    let (tag, rest) = bytes.split_first_chunk::<4>()?;
    if u32::from_be_bytes(*tag) != SCV_SYMBOL {
        return None;
    }
    let (len, rest) = rest.split_first_chunk::<4>()?;
    let len = u32::from_be_bytes(*len) as usize;
    if len > SCV_SYMBOL_MAX || rest.len() != len.next_multiple_of(4) {
        return None;
    }
    let (symbol, padding) = rest.split_at(len);
    if padding.iter().any(|b| *b != 0)
        || !symbol.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
    {
        return None;
    }
    String::from_utf8(symbol.to_vec()).ok()
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
