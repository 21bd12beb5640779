//! # Distribution Ledger
//!
//! Issues budgeted value to beneficiaries and keeps two indices in
//! lock-step within every issuance:
//!
//! - beneficiary → {kind → balance, kind → cumulative issued}
//! - issuer      → {kind → cumulative issued}
//!
//! Bulk issuance runs entries in order inside one invocation; any failing
//! entry fails the call and the host discards every write made before it.

use soroban_sdk::{Address, BytesN, Env, String, Vec};

use crate::budget;
use crate::events;
use crate::ledger;
use crate::rbac;
use crate::storage::{self, DataKey};
use crate::types::{Account, Role, TokenBalance, TokenKind};
use crate::Error;

/// Roles allowed to issue into any project without a mobilizer scope.
const OVERRIDE_ROLES: [Role; 2] = [Role::Admin, Role::Server];

/// Issue `amount` of `kind` from `project`'s budget to `beneficiary`.
pub fn issue(
    env: &Env,
    caller: &Address,
    project: &String,
    beneficiary: &BytesN<32>,
    kind: &TokenKind,
    amount: i128,
) -> Result<(), Error> {
    require_issuer(env, caller, project)?;
    issue_unchecked(env, caller, project, beneficiary, kind, amount)
}

/// Issue to many beneficiaries with per-entry amounts.
pub fn issue_bulk(
    env: &Env,
    caller: &Address,
    project: &String,
    beneficiaries: &Vec<BytesN<32>>,
    amounts: &Vec<i128>,
    kind: &TokenKind,
) -> Result<(), Error> {
    if beneficiaries.len() != amounts.len() {
        return Err(Error::LengthMismatch);
    }
    if beneficiaries.is_empty() {
        return Err(Error::EmptyBatch);
    }
    require_issuer(env, caller, project)?;

    for (beneficiary, amount) in beneficiaries.iter().zip(amounts.iter()) {
        issue_unchecked(env, caller, project, &beneficiary, kind, amount)?;
    }
    Ok(())
}

/// Issue the same `amount` to every beneficiary.
pub fn issue_bulk_uniform(
    env: &Env,
    caller: &Address,
    project: &String,
    beneficiaries: &Vec<BytesN<32>>,
    amount: i128,
    kind: &TokenKind,
) -> Result<(), Error> {
    if beneficiaries.is_empty() {
        return Err(Error::EmptyBatch);
    }
    require_issuer(env, caller, project)?;

    for beneficiary in beneficiaries.iter() {
        issue_unchecked(env, caller, project, &beneficiary, kind, amount)?;
    }
    Ok(())
}

fn require_issuer(env: &Env, caller: &Address, project: &String) -> Result<(), Error> {
    rbac::require(env, Role::Mobilizer, caller, Some(project))
        .or_else(|_| rbac::require_any(env, &OVERRIDE_ROLES, caller))
}

fn issue_unchecked(
    env: &Env,
    issuer: &Address,
    project: &String,
    beneficiary: &BytesN<32>,
    kind: &TokenKind,
    amount: i128,
) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    ledger::require_kind(env, kind)?;
    budget::consume(env, project, kind, amount)?;

    ledger::mint_to(env, &Account::Beneficiary(beneficiary.clone()), kind, amount)?;

    let issued_key = DataKey::Issued(beneficiary.clone(), kind.clone());
    let issued = storage::load_amount(env, &issued_key)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    storage::save(env, &issued_key, &issued);
    storage::touch_kind(env, &DataKey::BeneficiaryKinds(beneficiary.clone()), kind);

    let issuer_key = DataKey::IssuerIssued(issuer.clone(), kind.clone());
    let by_issuer = storage::load_amount(env, &issuer_key)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    storage::save(env, &issuer_key, &by_issuer);
    storage::touch_kind(env, &DataKey::IssuerKinds(issuer.clone()), kind);

    events::emit_token_issued(
        env,
        project.clone(),
        beneficiary.clone(),
        issuer.clone(),
        kind.clone(),
        amount,
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────

pub fn balance_of(env: &Env, beneficiary: &BytesN<32>, kind: &TokenKind) -> i128 {
    ledger::balance_of(env, &Account::Beneficiary(beneficiary.clone()), kind)
}

pub fn issued_to(env: &Env, beneficiary: &BytesN<32>, kind: &TokenKind) -> i128 {
    storage::load_amount(env, &DataKey::Issued(beneficiary.clone(), kind.clone()))
}

/// Current balance for every kind ever issued to `beneficiary`.
pub fn beneficiary_holdings(env: &Env, beneficiary: &BytesN<32>) -> Vec<TokenBalance> {
    let mut rows = Vec::new(env);
    for kind in storage::load_kinds(env, &DataKey::BeneficiaryKinds(beneficiary.clone())).iter() {
        let amount = balance_of(env, beneficiary, &kind);
        rows.push_back(TokenBalance { kind, amount });
    }
    rows
}

/// Cumulative amount `issuer` has issued, per kind.
pub fn issuer_holdings(env: &Env, issuer: &Address) -> Vec<TokenBalance> {
    let mut rows = Vec::new(env);
    for kind in storage::load_kinds(env, &DataKey::IssuerKinds(issuer.clone())).iter() {
        let amount =
            storage::load_amount(env, &DataKey::IssuerIssued(issuer.clone(), kind.clone()));
        rows.push_back(TokenBalance { kind, amount });
    }
    rows
}
