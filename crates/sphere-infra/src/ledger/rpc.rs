//! JSON-RPC 2.0 wire types and response classification for the ledger gateway.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sphere_types::error::LedgerError;
use sphere_types::provider::{
    ProviderAddress, ProviderRecord, ProvisionOutcome, ServiceMetadata, ServiceType,
};

pub const LIST_SERVICES: &str = "serving_listServices";
pub const DEPOSIT_FUND: &str = "ledger_depositFund";
pub const TRANSFER_FUND: &str = "ledger_transferFund";
pub const ACKNOWLEDGE_SIGNER: &str = "serving_acknowledgeProviderSigner";
pub const SERVICE_METADATA: &str = "serving_getServiceMetadata";
pub const REQUEST_HEADERS: &str = "serving_getRequestHeaders";

/// Header carrying the signing account address.
pub const ACCOUNT_HEADER: &str = "x-sphere-account";
/// Header carrying the hex call signature.
pub const SIGNATURE_HEADER: &str = "x-sphere-signature";

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: &'a Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// One entry of the `serving_listServices` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    pub provider: String,
    pub service_type: String,
    pub url: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataResult {
    endpoint: String,
    model: String,
}

/// Decode a JSON-RPC envelope into its `result`.
///
/// A JSON-RPC error becomes [`LedgerError::Rejected`]; a body that is not a
/// JSON-RPC envelope becomes [`LedgerError::Malformed`]. A missing or null
/// result decodes as `Value::Null`.
pub fn decode_envelope(method: &str, body: &str) -> Result<Value, LedgerError> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| LedgerError::Malformed(format!("{method}: {e}")))?;
    match response.error {
        Some(error) => Err(LedgerError::Rejected {
            code: error.code,
            message: error.message,
        }),
        None => Ok(response.result.unwrap_or(Value::Null)),
    }
}

/// Decode a typed `result`.
pub fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, LedgerError> {
    serde_json::from_value(value).map_err(|e| LedgerError::Malformed(format!("{method}: {e}")))
}

/// Map the outcome of a provisioning call (deposit, transfer, acknowledge).
///
/// A rejection saying the account or signer is already in the requested
/// state is success.
pub fn provisioning_outcome(result: Result<Value, LedgerError>) -> Result<ProvisionOutcome, LedgerError> {
    match result {
        Ok(_) => Ok(ProvisionOutcome::Applied),
        Err(LedgerError::Rejected { ref message, .. }) if is_already_provisioned(message) => {
            Ok(ProvisionOutcome::AlreadyProvisioned)
        }
        Err(e) => Err(e),
    }
}

fn is_already_provisioned(message: &str) -> bool {
    message.to_ascii_lowercase().contains("already")
}

/// Keep entries of `service_type`, preserving registry order.
pub fn filter_services(entries: Vec<ServiceEntry>, service_type: &ServiceType) -> Vec<ProviderRecord> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let kind: ServiceType = entry.service_type.parse().ok()?;
            (&kind == service_type).then(|| ProviderRecord {
                address: ProviderAddress::new(entry.provider),
                service_type: kind,
                endpoint_url: entry.url,
                model: entry.model,
            })
        })
        .collect()
}

pub fn decode_metadata(value: Value) -> Result<ServiceMetadata, LedgerError> {
    let result: MetadataResult = decode_result(SERVICE_METADATA, value)?;
    Ok(ServiceMetadata {
        endpoint: result.endpoint,
        model: result.model,
    })
}

/// Header values may come back as numbers; they are stringified.
pub fn decode_headers(value: Value) -> Result<HashMap<String, String>, LedgerError> {
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(LedgerError::Malformed(format!(
                "{REQUEST_HEADERS}: expected object, got {other}"
            )));
        }
    };
    object
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(s) => Ok((name, s)),
            Value::Number(n) => Ok((name, n.to_string())),
            Value::Bool(b) => Ok((name, b.to_string())),
            other => Err(LedgerError::Malformed(format!(
                "{REQUEST_HEADERS}: header '{name}' has non-scalar value {other}"
            ))),
        })
        .collect()
}
