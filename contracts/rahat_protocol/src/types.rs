//! # Types
//!
//! Shared data structures used across all modules of the Rahat protocol.
//!
//! ## Design decisions
//!
//! ### Token kinds
//!
//! Value comes in two shapes: the single fungible asset (backed by a Stellar
//! Asset Contract the protocol administers) and any number of semi-fungible
//! classes kept in contract storage. [`TokenKind`] names either, so budgets,
//! balances and claims all share one key space.
//!
//! ### Claims as a three-state machine
//!
//! ```text
//! Empty ──create──► Pending ──approve──► Approved ──redeem(ok)──► Empty
//!                     ▲  │                  │  ▲
//!                     └──┘ (re-create)      └──┘ redeem(bad otp)
//! ```
//!
//! `Approved` and "redeemed" are distinct states: a wrong OTP leaves the claim
//! in `Approved` so the vendor can retry.

use soroban_sdk::{contracttype, Address, BytesN, String};

/// Capabilities held by addresses.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    /// Manages roles, budgets and the response quorum.
    Admin,
    /// Approves vendor claims by committing an OTP hash.
    Server,
    /// Creates and redeems claims against beneficiaries.
    Vendor,
    /// Issues value to beneficiaries; only valid inside a project scope.
    Mobilizer,
    /// May top up project budgets.
    Manager,
}

/// Fungible asset or one semi-fungible class.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Fungible,
    SemiFungible(u32),
}

/// A semi-fungible token class created through the ledger adapter.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenClass {
    pub id: u32,
    pub name: String,
    pub symbol: String,
    /// Total minted into beneficiary accounts.
    pub total_supply: i128,
}

/// Budget accounting for one (project, token kind) pair.
///
/// Both counters only ever grow; `issued <= allocated` after every call.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BudgetRecord {
    pub allocated: i128,
    pub issued: i128,
}

impl BudgetRecord {
    pub fn available(&self) -> i128 {
        self.allocated - self.issued
    }
}

/// One row of an aggregate balance query.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenBalance {
    pub kind: TokenKind,
    pub amount: i128,
}

/// Internal ledger account.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Account {
    /// Beneficiary keyed by the hash of their phone number.
    Beneficiary(BytesN<32>),
    /// Any on-chain address (vendors receiving semi-fungible value).
    Holder(Address),
}

/// Lifecycle state of a claim.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClaimStatus {
    /// No live claim under the key.
    Empty,
    /// Requested by the vendor, waiting for the server's OTP commitment.
    Pending,
    /// OTP committed; redeemable by presenting the preimage.
    Approved,
}

/// A vendor's escrowed request against a beneficiary's balance.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claim {
    pub amount: i128,
    pub otp_hash: Option<BytesN<32>>,
    pub status: ClaimStatus,
    /// Ledger timestamp after which an approval lapses; `0` never lapses.
    pub expires_at: u64,
}

impl Claim {
    pub fn empty() -> Self {
        Claim {
            amount: 0,
            otp_hash: None,
            status: ClaimStatus::Empty,
            expires_at: 0,
        }
    }

    /// True once approved and until resolved.
    pub fn is_released(&self) -> bool {
        self.status == ClaimStatus::Approved
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at != 0 && now > self.expires_at
    }
}

/// Who may switch a live response off.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeactivationPolicy {
    /// Any single admin deactivates immediately.
    SingleAdmin,
    /// Deactivation needs the same threshold as activation.
    Quorum,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuorumConfig {
    pub threshold: u32,
    pub deactivation: DeactivationPolicy,
}

/// Global response switch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseState {
    pub is_live: bool,
    /// Project whose confirmations reached the threshold.
    pub project: Option<String>,
    /// Bumped on every deactivation; confirmations from older epochs no
    /// longer count.
    pub epoch: u32,
}

/// Configuration written once by `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtocolConfig {
    /// Stellar Asset Contract backing fungible value. The protocol contract
    /// must be its admin.
    pub fungible_token: Address,
    pub quorum: QuorumConfig,
}

/// One entry of a batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BatchCall {
    /// `(project, beneficiary, kind, amount)`
    Issue(String, BytesN<32>, TokenKind, i128),
    /// `(beneficiary, kind, amount)` with the batch caller as vendor.
    CreateClaim(BytesN<32>, TokenKind, i128),
    /// `(vendor, beneficiary, kind, otp_hash, validity_secs)`
    ApproveClaim(Address, BytesN<32>, TokenKind, BytesN<32>, u64),
    /// `(beneficiary, kind, otp)` with the batch caller as vendor.
    Redeem(BytesN<32>, TokenKind, String),
    /// `(vendor, beneficiary, kind)`
    CancelClaim(Address, BytesN<32>, TokenKind),
    BalanceOf(BytesN<32>, TokenKind),
    IssuedTo(BytesN<32>, TokenKind),
    /// `(project, kind)`
    Available(String, TokenKind),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BatchResult {
    Done,
    Amount(i128),
}
