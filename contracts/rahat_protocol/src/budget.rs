//! # Budget Manager
//!
//! Per-project ceilings on what may be issued, per token kind. Allocations
//! are append-only top-ups; nothing ever lowers `allocated`. Unknown projects
//! read as a zero budget rather than an error.

use soroban_sdk::{Address, Env, String, Vec};

use crate::events;
use crate::ledger;
use crate::rbac;
use crate::storage::{self, DataKey};
use crate::types::{BudgetRecord, Role, TokenBalance, TokenKind};
use crate::Error;

const BUDGET_ROLES: [Role; 2] = [Role::Admin, Role::Manager];

/// Increase the allocation of `(project, kind)` by `amount`.
pub fn set_budget(
    env: &Env,
    caller: &Address,
    project: &String,
    kind: &TokenKind,
    amount: i128,
) -> Result<(), Error> {
    rbac::require_any(env, &BUDGET_ROLES, caller)?;
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    ledger::require_kind(env, kind)?;

    let key = DataKey::Budget(project.clone(), kind.clone());
    let mut record = get_budget(env, project, kind);
    record.allocated = record
        .allocated
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    storage::save(env, &key, &record);
    storage::touch_kind(env, &DataKey::ProjectKinds(project.clone()), kind);

    events::emit_budget_allocated(env, project.clone(), kind.clone(), amount, record.allocated);
    Ok(())
}

/// Create a semi-fungible class and fund the project with it in one step.
pub fn create_token_budget(
    env: &Env,
    caller: &Address,
    project: &String,
    name: String,
    symbol: String,
    amount: i128,
) -> Result<u32, Error> {
    rbac::require_any(env, &BUDGET_ROLES, caller)?;
    let id = ledger::create_token_kind(env, name, symbol)?;
    set_budget(env, caller, project, &TokenKind::SemiFungible(id), amount)?;
    Ok(id)
}

pub fn get_budget(env: &Env, project: &String, kind: &TokenKind) -> BudgetRecord {
    storage::load(env, &DataKey::Budget(project.clone(), kind.clone())).unwrap_or_default()
}

pub fn get_available(env: &Env, project: &String, kind: &TokenKind) -> i128 {
    get_budget(env, project, kind).available()
}

/// Semi-fungible ids budgeted for `project`, in first-budgeted order.
pub fn project_token_ids(env: &Env, project: &String) -> Vec<u32> {
    let mut ids = Vec::new(env);
    for kind in storage::load_kinds(env, &DataKey::ProjectKinds(project.clone())).iter() {
        if let TokenKind::SemiFungible(id) = kind {
            ids.push_back(id);
        }
    }
    ids
}

/// Available budget for every kind the project has been funded with.
pub fn project_budgets(env: &Env, project: &String) -> Vec<TokenBalance> {
    let mut rows = Vec::new(env);
    for kind in storage::load_kinds(env, &DataKey::ProjectKinds(project.clone())).iter() {
        let amount = get_available(env, project, &kind);
        rows.push_back(TokenBalance { kind, amount });
    }
    rows
}

/// Record `amount` as issued against the project's budget.
pub(crate) fn consume(
    env: &Env,
    project: &String,
    kind: &TokenKind,
    amount: i128,
) -> Result<(), Error> {
    let mut record = get_budget(env, project, kind);
    if amount > record.available() {
        return Err(Error::InsufficientBudget);
    }
    record.issued = record.issued.checked_add(amount).ok_or(Error::Overflow)?;
    storage::save(env, &DataKey::Budget(project.clone(), kind.clone()), &record);
    Ok(())
}
