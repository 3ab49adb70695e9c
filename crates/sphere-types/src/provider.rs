//! Provider registry types.
//!
//! A [`ProviderRecord`] is one entry of the ledger's service listing: an
//! independently operated inference node, the kind of service it offers and
//! where it can be reached.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// On-ledger identity of a provider node (a 0x-prefixed account address).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderAddress(pub String);

impl ProviderAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, since hex addresses may be checksummed.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Debug for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProviderAddress(\"{}\")", self.0)
    }
}

impl fmt::Display for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of service a provider advertises on the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ServiceType {
    #[default]
    Chatbot,
    TextToImage,
    SpeechToText,
    /// A service kind this broker does not know about. Kept verbatim.
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::Chatbot => "chatbot",
            ServiceType::TextToImage => "text-to-image",
            ServiceType::SpeechToText => "speech-to-text",
            ServiceType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("service type must not be empty".to_string());
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "chatbot" => ServiceType::Chatbot,
            "text-to-image" => ServiceType::TextToImage,
            "speech-to-text" => ServiceType::SpeechToText,
            _ => ServiceType::Other(trimmed.to_string()),
        })
    }
}

impl Serialize for ServiceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One registered provider, as returned by a registry listing.
///
/// Immutable per listing call; several records may share a `service_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Ledger identity of the provider node.
    pub address: ProviderAddress,
    /// What the provider serves.
    pub service_type: ServiceType,
    /// Public URL advertised in the listing.
    pub endpoint_url: String,
    /// Model advertised in the listing, if the registry includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Endpoint and model resolved for a provider via the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub endpoint: String,
    pub model: String,
}

/// What a transfer of funds to a provider sub-account pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingPurpose {
    Inference,
}

impl fmt::Display for FundingPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundingPurpose::Inference => write!(f, "inference"),
        }
    }
}

/// Result of a provisioning call (deposit, transfer, acknowledgement).
///
/// The ledger rejects provisioning that is already in place; that rejection
/// is an expected outcome for a client that has been set up before, so it is
/// reported as a value rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The ledger applied the change.
    Applied,
    /// The ledger was already in the requested state.
    AlreadyProvisioned,
}

impl fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionOutcome::Applied => write!(f, "applied"),
            ProvisionOutcome::AlreadyProvisioned => write!(f, "already provisioned"),
        }
    }
}
