//! # Rahat Protocol Contract
//!
//! Distribution and redemption of humanitarian-aid value to beneficiaries
//! identified by the hash of their phone number. The single Soroban contract
//! `RahatProtocol` exposes:
//!
//! | Phase         | Entry Point(s)                                                  |
//! |---------------|-----------------------------------------------------------------|
//! | Bootstrap     | [`RahatProtocol::init`]                                         |
//! | Role admin    | `grant_role`, `revoke_role`, `add_mobilizer`, `remove_mobilizer` |
//! | Budgets       | `set_budget`, `create_token_budget`                             |
//! | Issuance      | `issue`, `issue_bulk`, `issue_bulk_uniform`                     |
//! | Claims        | `create_claim`, `approve_claim`, `redeem`                       |
//! | Response      | `activate_response`, `deactivate_response`, `set_threshold`     |
//! | Batching      | `batch`                                                         |
//! | Queries       | `get_budget`, `balance_of`, `beneficiary_holdings`, `issuer_holdings`, `get_claim`, `is_live`, ... |
//!
//! ## Architecture
//!
//! Authorization is delegated to [`rbac`], storage access to [`storage`]
//! and each component lives in its own module. This file contains only the
//! public entry points: it authenticates the caller and forwards.
//!
//! Every entry point returns `Result<_, Error>`. A returned error makes the
//! host discard every write of the invocation, which is what gives bulk
//! issuance and batches their all-or-nothing behaviour.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, BytesN, Env, String, Vec};

pub mod batch;
pub mod budget;
pub mod claims;
pub mod distribution;
pub mod events;
pub mod hashing;
pub mod ledger;
pub mod quorum;
pub mod rbac;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_claims;
#[cfg(test)]
mod test_quorum;

pub use types::{
    Account, BatchCall, BatchResult, BudgetRecord, Claim, ClaimStatus, DeactivationPolicy,
    ProtocolConfig, QuorumConfig, ResponseState, Role, TokenBalance, TokenClass, TokenKind,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    LastAdmin = 4,
    Overflow = 5,
    InsufficientBudget = 6,
    InsufficientBalance = 7,
    InvalidAmount = 8,
    LengthMismatch = 9,
    EmptyBatch = 10,
    TokenKindNotFound = 11,
    ResponseNotLive = 12,
    ClaimNotPending = 13,
    ClaimNotApproved = 14,
    ClaimAlreadyApproved = 15,
    ClaimExpired = 16,
    OtpMismatch = 17,
    InvalidThreshold = 18,
    IdentifierTooLong = 19,
    InvalidRole = 20,
    RoleNotFound = 21,
    AdminsBelowThreshold = 22,
}

/// Coarse classification of [`Error`] codes reported to callers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Unauthorized,
    InsufficientBudget,
    InvariantViolation,
    InvalidState,
    LengthMismatch,
    /// Reported, but the claim stays redeemable.
    OtpMismatch,
    InvalidInput,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Unauthorized => ErrorClass::Unauthorized,
            Error::InsufficientBudget => ErrorClass::InsufficientBudget,
            Error::LastAdmin | Error::AdminsBelowThreshold | Error::Overflow => {
                ErrorClass::InvariantViolation
            }
            Error::AlreadyInitialized
            | Error::NotInitialized
            | Error::InsufficientBalance
            | Error::ResponseNotLive
            | Error::ClaimNotPending
            | Error::ClaimNotApproved
            | Error::ClaimAlreadyApproved
            | Error::ClaimExpired
            | Error::RoleNotFound => ErrorClass::InvalidState,
            Error::LengthMismatch => ErrorClass::LengthMismatch,
            Error::OtpMismatch => ErrorClass::OtpMismatch,
            Error::InvalidAmount
            | Error::EmptyBatch
            | Error::TokenKindNotFound
            | Error::InvalidThreshold
            | Error::IdentifierTooLong
            | Error::InvalidRole => ErrorClass::InvalidInput,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Error::AlreadyInitialized => "contract already initialized",
            Error::NotInitialized => "contract not initialized",
            Error::Unauthorized => "caller lacks the required role",
            Error::LastAdmin => "cannot remove the last admin",
            Error::Overflow => "arithmetic overflow",
            Error::InsufficientBudget => "amount exceeds available project budget",
            Error::InsufficientBalance => "beneficiary balance too low",
            Error::InvalidAmount => "amount must be positive",
            Error::LengthMismatch => "input lists differ in length",
            Error::EmptyBatch => "no entries supplied",
            Error::TokenKindNotFound => "unknown semi-fungible token id",
            Error::ResponseNotLive => "response is not live",
            Error::ClaimNotPending => "no open claim in the required state",
            Error::ClaimNotApproved => "claim has not been approved",
            Error::ClaimAlreadyApproved => "an approved claim is still open",
            Error::ClaimExpired => "claim approval has expired",
            Error::OtpMismatch => "otp does not match commitment",
            Error::InvalidThreshold => "threshold must be between one and the admin count",
            Error::IdentifierTooLong => "identifier exceeds 64 bytes",
            Error::InvalidRole => "role must be managed through its scoped entry point",
            Error::RoleNotFound => "address does not hold the role",
            Error::AdminsBelowThreshold => "revoking would leave fewer admins than the threshold",
        }
    }
}

#[contract]
pub struct RahatProtocol;

#[contractimpl]
impl RahatProtocol {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract.
    ///
    /// Must be called exactly once after deployment. `fungible_token` is the
    /// Stellar Asset Contract backing fungible value; this contract must be
    /// its admin so issuance can mint.
    pub fn init(
        env: Env,
        admin: Address,
        fungible_token: Address,
        quorum: QuorumConfig,
    ) -> Result<(), Error> {
        admin.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        quorum::validate_config(&quorum)?;

        storage::save_config(
            &env,
            &ProtocolConfig {
                fungible_token,
                quorum,
            },
        );
        rbac::init_admin(&env, &admin)
    }

    // ─────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────

    /// Grant a global role. `caller` must be an admin.
    pub fn grant_role(env: Env, caller: Address, target: Address, role: Role) -> Result<(), Error> {
        caller.require_auth();
        rbac::grant_role(&env, &caller, &target, role)
    }

    /// Revoke a global role. The last admin cannot be revoked.
    pub fn revoke_role(env: Env, caller: Address, target: Address, role: Role) -> Result<(), Error> {
        caller.require_auth();
        rbac::revoke_role(&env, &caller, &target, role)
    }

    /// Scope `mobilizer` to `project`.
    pub fn add_mobilizer(
        env: Env,
        caller: Address,
        mobilizer: Address,
        project: String,
    ) -> Result<(), Error> {
        caller.require_auth();
        rbac::add_mobilizer(&env, &caller, &mobilizer, &project)
    }

    pub fn remove_mobilizer(
        env: Env,
        caller: Address,
        mobilizer: Address,
        project: String,
    ) -> Result<(), Error> {
        caller.require_auth();
        rbac::remove_mobilizer(&env, &caller, &mobilizer, &project)
    }

    pub fn has_role(env: Env, address: Address, role: Role) -> bool {
        rbac::has_role(&env, &address, role)
    }

    pub fn is_mobilizer_for(env: Env, address: Address, project: String) -> bool {
        rbac::is_mobilizer_for(&env, &address, &project)
    }

    pub fn admin_count(env: Env) -> u32 {
        rbac::admin_count(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Budgets
    // ─────────────────────────────────────────────────────────

    /// Top up `project`'s allocation of `kind`. Admin or manager only.
    pub fn set_budget(
        env: Env,
        caller: Address,
        project: String,
        kind: TokenKind,
        amount: i128,
    ) -> Result<(), Error> {
        caller.require_auth();
        budget::set_budget(&env, &caller, &project, &kind, amount)
    }

    /// Create a semi-fungible class and budget `amount` of it to `project`.
    /// Returns the new token id.
    pub fn create_token_budget(
        env: Env,
        caller: Address,
        project: String,
        name: String,
        symbol: String,
        amount: i128,
    ) -> Result<u32, Error> {
        caller.require_auth();
        budget::create_token_budget(&env, &caller, &project, name, symbol, amount)
    }

    pub fn get_budget(env: Env, project: String, kind: TokenKind) -> BudgetRecord {
        budget::get_budget(&env, &project, &kind)
    }

    pub fn get_available(env: Env, project: String, kind: TokenKind) -> i128 {
        budget::get_available(&env, &project, &kind)
    }

    pub fn project_token_ids(env: Env, project: String) -> Vec<u32> {
        budget::project_token_ids(&env, &project)
    }

    pub fn project_budgets(env: Env, project: String) -> Vec<TokenBalance> {
        budget::project_budgets(&env, &project)
    }

    pub fn token_class(env: Env, id: u32) -> Option<TokenClass> {
        ledger::token_class(&env, id)
    }

    // ─────────────────────────────────────────────────────────
    // Issuance
    // ─────────────────────────────────────────────────────────

    /// Issue from `project`'s budget to one beneficiary.
    ///
    /// `caller` must be a mobilizer scoped to `project`, or an admin/server.
    pub fn issue(
        env: Env,
        caller: Address,
        project: String,
        beneficiary: BytesN<32>,
        kind: TokenKind,
        amount: i128,
    ) -> Result<(), Error> {
        caller.require_auth();
        distribution::issue(&env, &caller, &project, &beneficiary, &kind, amount)
    }

    /// Issue to many beneficiaries; all entries succeed or none do.
    pub fn issue_bulk(
        env: Env,
        caller: Address,
        project: String,
        beneficiaries: Vec<BytesN<32>>,
        amounts: Vec<i128>,
        kind: TokenKind,
    ) -> Result<(), Error> {
        caller.require_auth();
        distribution::issue_bulk(&env, &caller, &project, &beneficiaries, &amounts, &kind)
    }

    pub fn issue_bulk_uniform(
        env: Env,
        caller: Address,
        project: String,
        beneficiaries: Vec<BytesN<32>>,
        amount: i128,
        kind: TokenKind,
    ) -> Result<(), Error> {
        caller.require_auth();
        distribution::issue_bulk_uniform(&env, &caller, &project, &beneficiaries, amount, &kind)
    }

    pub fn balance_of(env: Env, beneficiary: BytesN<32>, kind: TokenKind) -> i128 {
        distribution::balance_of(&env, &beneficiary, &kind)
    }

    pub fn issued_to(env: Env, beneficiary: BytesN<32>, kind: TokenKind) -> i128 {
        distribution::issued_to(&env, &beneficiary, &kind)
    }

    pub fn beneficiary_holdings(env: Env, beneficiary: BytesN<32>) -> Vec<TokenBalance> {
        distribution::beneficiary_holdings(&env, &beneficiary)
    }

    pub fn issuer_holdings(env: Env, issuer: Address) -> Vec<TokenBalance> {
        distribution::issuer_holdings(&env, &issuer)
    }

    /// Value a vendor has received from redemptions.
    pub fn vendor_balance(env: Env, vendor: Address, kind: TokenKind) -> Result<i128, Error> {
        ledger::holder_balance(&env, &vendor, &kind)
    }

    // ─────────────────────────────────────────────────────────
    // Claims
    // ─────────────────────────────────────────────────────────

    pub fn create_claim(
        env: Env,
        vendor: Address,
        beneficiary: BytesN<32>,
        kind: TokenKind,
        amount: i128,
    ) -> Result<(), Error> {
        vendor.require_auth();
        claims::create_claim(&env, &vendor, &beneficiary, &kind, amount)
    }

    /// Commit `otp_hash` to a pending claim. `validity_secs == 0` never lapses.
    pub fn approve_claim(
        env: Env,
        server: Address,
        vendor: Address,
        beneficiary: BytesN<32>,
        kind: TokenKind,
        otp_hash: BytesN<32>,
        validity_secs: u64,
    ) -> Result<(), Error> {
        server.require_auth();
        claims::approve_claim(
            &env,
            &server,
            &vendor,
            &beneficiary,
            &kind,
            &otp_hash,
            validity_secs,
        )
    }

    /// Redeem an approved claim; returns the amount paid to `vendor`.
    pub fn redeem(
        env: Env,
        vendor: Address,
        beneficiary: BytesN<32>,
        kind: TokenKind,
        otp: String,
    ) -> Result<i128, Error> {
        vendor.require_auth();
        claims::redeem(&env, &vendor, &beneficiary, &kind, &otp)
    }

    /// Drop an open claim. `caller` is the vendor itself, or a server or admin.
    pub fn cancel_claim(
        env: Env,
        caller: Address,
        vendor: Address,
        beneficiary: BytesN<32>,
        kind: TokenKind,
    ) -> Result<(), Error> {
        caller.require_auth();
        claims::cancel_claim(&env, &caller, &vendor, &beneficiary, &kind)
    }

    pub fn get_claim(env: Env, vendor: Address, beneficiary: BytesN<32>, kind: TokenKind) -> Claim {
        claims::get_claim(&env, &vendor, &beneficiary, &kind)
    }

    // ─────────────────────────────────────────────────────────
    // Response quorum
    // ─────────────────────────────────────────────────────────

    /// Confirm activation for `project`; returns whether the response is live.
    pub fn activate_response(env: Env, admin: Address, project: String) -> Result<bool, Error> {
        admin.require_auth();
        quorum::activate(&env, &admin, &project)
    }

    /// Request deactivation; returns whether the response is still live.
    pub fn deactivate_response(env: Env, admin: Address) -> Result<bool, Error> {
        admin.require_auth();
        quorum::deactivate(&env, &admin)
    }

    pub fn set_threshold(env: Env, admin: Address, threshold: u32) -> Result<(), Error> {
        admin.require_auth();
        quorum::set_threshold(&env, &admin, threshold)
    }

    pub fn is_live(env: Env) -> bool {
        quorum::is_live(&env)
    }

    pub fn response_state(env: Env) -> ResponseState {
        quorum::response_state(&env)
    }

    pub fn confirmation_count(env: Env, project: String) -> u32 {
        quorum::confirmation_count(&env, &project)
    }

    pub fn has_confirmed(env: Env, project: String, admin: Address) -> bool {
        quorum::has_confirmed(&env, &project, &admin)
    }

    pub fn quorum_config(env: Env) -> Result<QuorumConfig, Error> {
        Ok(storage::load_config(&env)?.quorum)
    }

    // ─────────────────────────────────────────────────────────
    // Batching & helpers
    // ─────────────────────────────────────────────────────────

    /// Run `calls` in order as `caller`; returns one result per call.
    pub fn batch(env: Env, caller: Address, calls: Vec<BatchCall>) -> Result<Vec<BatchResult>, Error> {
        caller.require_auth();
        batch::execute(&env, &caller, &calls)
    }

    /// Beneficiary key for a phone number.
    pub fn hash_phone(env: Env, phone: String) -> Result<BytesN<32>, Error> {
        hashing::hash_phone(&env, &phone)
    }

    /// Commitment the server submits for an OTP.
    pub fn hash_otp(env: Env, otp: String) -> Result<BytesN<32>, Error> {
        hashing::hash_otp(&env, &otp)
    }
}
