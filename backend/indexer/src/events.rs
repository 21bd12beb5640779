//! Canonical event types emitted by the Rahat protocol contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/rahat_protocol/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the Rahat contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A role was granted (`role_set` topic).
    RoleSet,
    /// A role was revoked (`role_del` topic).
    RoleDel,
    /// A mobilizer was scoped to a project (`mob_set` topic).
    MobilizerAdded,
    /// A mobilizer lost a project scope (`mob_del` topic).
    MobilizerRemoved,
    /// A semi-fungible token class was created (`sft_new` topic).
    TokenClassCreated,
    /// A project budget was topped up (`budget` topic).
    BudgetAllocated,
    /// Value was issued to a beneficiary (`issued` topic).
    TokenIssued,
    /// A vendor opened a claim (`claim_new` topic).
    ClaimCreated,
    /// The server committed an OTP hash (`claim_ok` topic).
    ClaimApproved,
    /// A claim was paid out to its vendor (`redeemed` topic).
    ClaimRedeemed,
    /// An open claim was dropped without payout (`claim_del` topic).
    ClaimCancelled,
    /// An admin confirmed activation (`confirm` topic).
    ResponseConfirmed,
    /// The quorum was reached (`live` topic).
    ResponseActivated,
    /// An admin asked to deactivate (`deact_req` topic).
    DeactivationRequested,
    /// The response went inactive (`inactive` topic).
    ResponseDeactivated,
    /// The quorum threshold changed (`threshold` topic).
    ThresholdChanged,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "role_set" => Self::RoleSet,
            "role_del" => Self::RoleDel,
            "mob_set" => Self::MobilizerAdded,
            "mob_del" => Self::MobilizerRemoved,
            "sft_new" => Self::TokenClassCreated,
            "budget" => Self::BudgetAllocated,
            "issued" => Self::TokenIssued,
            "claim_new" => Self::ClaimCreated,
            "claim_ok" => Self::ClaimApproved,
            "redeemed" => Self::ClaimRedeemed,
            "claim_del" => Self::ClaimCancelled,
            "confirm" => Self::ResponseConfirmed,
            "live" => Self::ResponseActivated,
            "deact_req" => Self::DeactivationRequested,
            "inactive" => Self::ResponseDeactivated,
            "threshold" => Self::ThresholdChanged,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleSet => "role_set",
            Self::RoleDel => "role_del",
            Self::MobilizerAdded => "mobilizer_added",
            Self::MobilizerRemoved => "mobilizer_removed",
            Self::TokenClassCreated => "token_class_created",
            Self::BudgetAllocated => "budget_allocated",
            Self::TokenIssued => "token_issued",
            Self::ClaimCreated => "claim_created",
            Self::ClaimApproved => "claim_approved",
            Self::ClaimRedeemed => "claim_redeemed",
            Self::ClaimCancelled => "claim_cancelled",
            Self::ResponseConfirmed => "response_confirmed",
            Self::ResponseActivated => "response_activated",
            Self::DeactivationRequested => "deactivation_requested",
            Self::ResponseDeactivated => "response_deactivated",
            Self::ThresholdChanged => "threshold_changed",
            Self::Unknown => "unknown",
        }
    }

    /// `true` when the second topic of this event is the project identifier.
    pub fn project_topic(&self) -> bool {
        matches!(
            self,
            Self::MobilizerAdded
                | Self::MobilizerRemoved
                | Self::BudgetAllocated
                | Self::TokenIssued
                | Self::ResponseConfirmed
                | Self::ResponseActivated
        )
    }
}

/// A fully decoded Rahat event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RahatEvent {
    /// RPC event id; unique per contract event.
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    /// Lower-case hex of the beneficiary's phone hash.
    pub beneficiary: Option<String>,
    /// Address the event is about (grantee, issuer, vendor, admin).
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub token_kind: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub beneficiary: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub token_kind: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
