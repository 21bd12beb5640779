//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by the protocol.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type             | Description                              |
//! |---------------|------------------|------------------------------------------|
//! | `Config`      | `ProtocolConfig` | Fungible token + quorum configuration    |
//! | `AdminCount`  | `u32`            | Number of `Admin` holders                |
//! | `NextTokenId` | `u32`            | Next semi-fungible class id              |
//! | `Response`    | `ResponseState`  | Global live switch and epoch             |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                                   | Type               |
//! |---------------------------------------|--------------------|
//! | `Role(role, address)`                 | `bool`             |
//! | `MobilizerScope(address, project)`    | `bool`             |
//! | `MobilizerScopes(address)`            | `u32`              |
//! | `Budget(project, kind)`               | `BudgetRecord`     |
//! | `ProjectKinds(project)`               | `Vec<TokenKind>`   |
//! | `TokenClass(id)`                      | `TokenClass`       |
//! | `Balance(account, kind)`              | `i128`             |
//! | `Issued(beneficiary, kind)`           | `i128`             |
//! | `BeneficiaryKinds(beneficiary)`       | `Vec<TokenKind>`   |
//! | `IssuerIssued(issuer, kind)`          | `i128`             |
//! | `IssuerKinds(issuer)`                 | `Vec<TokenKind>`   |
//! | `Claim(vendor, beneficiary, kind)`    | `Claim`            |
//! | `Confirmations(epoch, project)`       | `Vec<Address>`     |
//! | `Deactivations(epoch)`                | `Vec<Address>`     |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, BytesN, Env, IntoVal, String, TryFromVal, Val, Vec};

use crate::types::{Account, ProtocolConfig, ResponseState, Role, TokenKind};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    AdminCount,
    NextTokenId,
    Response,
    Role(Role, Address),
    MobilizerScope(Address, String),
    MobilizerScopes(Address),
    Budget(String, TokenKind),
    ProjectKinds(String),
    TokenClass(u32),
    Balance(Account, TokenKind),
    Issued(BytesN<32>, TokenKind),
    BeneficiaryKinds(BytesN<32>),
    IssuerIssued(Address, TokenKind),
    IssuerKinds(Address),
    Claim(Address, BytesN<32>, TokenKind),
    Confirmations(u32, String),
    Deactivations(u32),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn save_config(env: &Env, config: &ProtocolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Load the protocol configuration, failing if `init` has not run.
pub fn load_config(env: &Env) -> Result<ProtocolConfig, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn admin_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::AdminCount)
        .unwrap_or(0)
}

pub fn set_admin_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::AdminCount, &count);
    bump_instance(env);
}

/// Reads, increments and stores the semi-fungible id counter.
/// Returns the id for the *current* class (pre-increment value, first id is 1).
pub fn next_token_id(env: &Env) -> Result<u32, Error> {
    bump_instance(env);
    let current: u32 = env
        .storage()
        .instance()
        .get(&DataKey::NextTokenId)
        .unwrap_or(1);
    let next = current.checked_add(1).ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::NextTokenId, &next);
    Ok(current)
}

pub fn load_response(env: &Env) -> ResponseState {
    env.storage()
        .instance()
        .get(&DataKey::Response)
        .unwrap_or(ResponseState {
            is_live: false,
            project: None,
            epoch: 0,
        })
}

pub fn save_response(env: &Env, state: &ResponseState) {
    env.storage().instance().set(&DataKey::Response, state);
    bump_instance(env);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Read a persistent entry, extending its TTL when present.
pub fn load<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Option<V> {
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

pub fn save<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

pub fn remove(env: &Env, key: &DataKey) {
    env.storage().persistent().remove(key);
}

pub fn load_amount(env: &Env, key: &DataKey) -> i128 {
    load(env, key).unwrap_or(0)
}

pub fn load_flag(env: &Env, key: &DataKey) -> bool {
    load(env, key).unwrap_or(false)
}

pub fn load_kinds(env: &Env, key: &DataKey) -> Vec<TokenKind> {
    load(env, key).unwrap_or_else(|| Vec::new(env))
}

/// Append `kind` to the index stored under `key` unless already present.
pub fn touch_kind(env: &Env, key: &DataKey, kind: &TokenKind) {
    let mut kinds = load_kinds(env, key);
    if !kinds.contains(kind) {
        kinds.push_back(kind.clone());
        save(env, key, &kinds);
    }
}

pub fn load_addresses(env: &Env, key: &DataKey) -> Vec<Address> {
    load(env, key).unwrap_or_else(|| Vec::new(env))
}
