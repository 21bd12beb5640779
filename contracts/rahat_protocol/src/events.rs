//! # Events
//!
//! Every state transition publishes exactly one event. The off-chain indexer
//! keys on the leading topic symbol:
//!
//! | Topic 0      | Topic 1     | Data                  |
//! |--------------|-------------|-----------------------|
//! | `role_set`   | account     | [`RoleChanged`]       |
//! | `role_del`   | account     | [`RoleChanged`]       |
//! | `mob_set`    | project     | [`MobilizerScoped`]   |
//! | `mob_del`    | project     | [`MobilizerScoped`]   |
//! | `sft_new`    | token id    | [`TokenClassCreated`] |
//! | `budget`     | project     | [`BudgetAllocated`]   |
//! | `issued`     | project     | [`TokenIssued`]       |
//! | `claim_new`  | vendor      | [`ClaimCreated`]      |
//! | `claim_ok`   | vendor      | [`ClaimApproved`]     |
//! | `redeemed`   | vendor      | [`ClaimRedeemed`]     |
//! | `claim_del`  | vendor      | [`ClaimCancelled`]    |
//! | `confirm`    | project     | [`ResponseConfirmed`] |
//! | `live`       | project     | [`ResponseActivated`] |
//! | `deact_req`  | admin       | [`DeactivationRequested`] |
//! | `inactive`   | (none)      | [`ResponseDeactivated`] |
//! | `threshold`  | (none)      | [`ThresholdChanged`]  |

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, String};

use crate::types::{Role, TokenKind};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChanged {
    pub role: Role,
    pub account: Address,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MobilizerScoped {
    pub mobilizer: Address,
    pub project: String,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenClassCreated {
    pub id: u32,
    pub name: String,
    pub symbol: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BudgetAllocated {
    pub project: String,
    pub kind: TokenKind,
    pub amount: i128,
    /// Allocation after the top-up.
    pub allocated: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenIssued {
    pub project: String,
    pub beneficiary: BytesN<32>,
    pub issuer: Address,
    pub kind: TokenKind,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimCreated {
    pub vendor: Address,
    pub beneficiary: BytesN<32>,
    pub kind: TokenKind,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimApproved {
    pub vendor: Address,
    pub beneficiary: BytesN<32>,
    pub kind: TokenKind,
    pub server: Address,
    pub expires_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimRedeemed {
    pub vendor: Address,
    pub beneficiary: BytesN<32>,
    pub kind: TokenKind,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimCancelled {
    pub vendor: Address,
    pub beneficiary: BytesN<32>,
    pub kind: TokenKind,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseConfirmed {
    pub project: String,
    pub admin: Address,
    pub confirmations: u32,
    pub threshold: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseActivated {
    pub project: String,
    pub epoch: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeactivationRequested {
    pub admin: Address,
    pub requests: u32,
    pub threshold: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseDeactivated {
    pub admin: Address,
    /// Epoch that starts with this deactivation.
    pub epoch: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThresholdChanged {
    pub threshold: u32,
    pub by: Address,
}

// ─────────────────────────────────────────────────────────
// Emitters
// ─────────────────────────────────────────────────────────

pub fn emit_role_granted(env: &Env, role: Role, account: Address, by: Address) {
    env.events().publish(
        (symbol_short!("role_set"), account.clone()),
        RoleChanged { role, account, by },
    );
}

pub fn emit_role_revoked(env: &Env, role: Role, account: Address, by: Address) {
    env.events().publish(
        (symbol_short!("role_del"), account.clone()),
        RoleChanged { role, account, by },
    );
}

pub fn emit_mobilizer_added(env: &Env, mobilizer: Address, project: String, by: Address) {
    env.events().publish(
        (symbol_short!("mob_set"), project.clone()),
        MobilizerScoped {
            mobilizer,
            project,
            by,
        },
    );
}

pub fn emit_mobilizer_removed(env: &Env, mobilizer: Address, project: String, by: Address) {
    env.events().publish(
        (symbol_short!("mob_del"), project.clone()),
        MobilizerScoped {
            mobilizer,
            project,
            by,
        },
    );
}

pub fn emit_token_class_created(env: &Env, id: u32, name: String, symbol: String) {
    env.events().publish(
        (symbol_short!("sft_new"), id),
        TokenClassCreated { id, name, symbol },
    );
}

pub fn emit_budget_allocated(
    env: &Env,
    project: String,
    kind: TokenKind,
    amount: i128,
    allocated: i128,
) {
    env.events().publish(
        (symbol_short!("budget"), project.clone()),
        BudgetAllocated {
            project,
            kind,
            amount,
            allocated,
        },
    );
}

pub fn emit_token_issued(
    env: &Env,
    project: String,
    beneficiary: BytesN<32>,
    issuer: Address,
    kind: TokenKind,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("issued"), project.clone()),
        TokenIssued {
            project,
            beneficiary,
            issuer,
            kind,
            amount,
        },
    );
}

pub fn emit_claim_created(
    env: &Env,
    vendor: Address,
    beneficiary: BytesN<32>,
    kind: TokenKind,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("claim_new"), vendor.clone()),
        ClaimCreated {
            vendor,
            beneficiary,
            kind,
            amount,
        },
    );
}

pub fn emit_claim_approved(
    env: &Env,
    vendor: Address,
    beneficiary: BytesN<32>,
    kind: TokenKind,
    server: Address,
    expires_at: u64,
) {
    env.events().publish(
        (symbol_short!("claim_ok"), vendor.clone()),
        ClaimApproved {
            vendor,
            beneficiary,
            kind,
            server,
            expires_at,
        },
    );
}

pub fn emit_claim_redeemed(
    env: &Env,
    vendor: Address,
    beneficiary: BytesN<32>,
    kind: TokenKind,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("redeemed"), vendor.clone()),
        ClaimRedeemed {
            vendor,
            beneficiary,
            kind,
            amount,
        },
    );
}

pub fn emit_claim_cancelled(
    env: &Env,
    vendor: Address,
    beneficiary: BytesN<32>,
    kind: TokenKind,
    by: Address,
) {
    env.events().publish(
        (symbol_short!("claim_del"), vendor.clone()),
        ClaimCancelled {
            vendor,
            beneficiary,
            kind,
            by,
        },
    );
}

pub fn emit_response_confirmed(
    env: &Env,
    project: String,
    admin: Address,
    confirmations: u32,
    threshold: u32,
) {
    env.events().publish(
        (symbol_short!("confirm"), project.clone()),
        ResponseConfirmed {
            project,
            admin,
            confirmations,
            threshold,
        },
    );
}

pub fn emit_response_activated(env: &Env, project: String, epoch: u32) {
    env.events().publish(
        (symbol_short!("live"), project.clone()),
        ResponseActivated { project, epoch },
    );
}

pub fn emit_deactivation_requested(env: &Env, admin: Address, requests: u32, threshold: u32) {
    env.events().publish(
        (symbol_short!("deact_req"), admin.clone()),
        DeactivationRequested {
            admin,
            requests,
            threshold,
        },
    );
}

pub fn emit_response_deactivated(env: &Env, admin: Address, epoch: u32) {
    env.events().publish(
        (symbol_short!("inactive"),),
        ResponseDeactivated { admin, epoch },
    );
}

pub fn emit_threshold_changed(env: &Env, threshold: u32, by: Address) {
    env.events().publish(
        (symbol_short!("threshold"),),
        ThresholdChanged { threshold, by },
    );
}
