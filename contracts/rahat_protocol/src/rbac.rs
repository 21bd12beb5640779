//! # Role-Based Access Control
//!
//! Every mutating entry point funnels its authorization through [`require`]
//! or [`require_any`]; no other module inspects role storage directly.
//!
//! | Role        | Granted by | Scope        | Capabilities                                  |
//! |-------------|------------|--------------|-----------------------------------------------|
//! | `Admin`     | `Admin`    | global       | roles, budgets, quorum, issuance override     |
//! | `Manager`   | `Admin`    | global       | budget top-ups                                |
//! | `Server`    | `Admin`    | global       | claim approval, issuance override             |
//! | `Vendor`    | `Admin`    | global       | claim creation and redemption                 |
//! | `Mobilizer` | `Admin`    | per project  | issuance inside the scoped project            |
//!
//! At least one `Admin` always exists: the bootstrap admin is set by `init`
//! and revoking the last one fails with [`Error::LastAdmin`].
//!
//! `Mobilizer` is never granted through [`grant_role`]; it is added per
//! project with [`add_mobilizer`]. The role bit stays set while the address
//! holds at least one project scope, and scoped checks verify both.

use soroban_sdk::{Address, Env, String};

use crate::events;
use crate::storage::{self, DataKey};
use crate::types::Role;
use crate::Error;

/// Record the bootstrap admin. Fails if the contract already has admins.
pub fn init_admin(env: &Env, admin: &Address) -> Result<(), Error> {
    if storage::admin_count(env) != 0 {
        return Err(Error::AlreadyInitialized);
    }
    set_role(env, Role::Admin, admin, true);
    storage::set_admin_count(env, 1);
    events::emit_role_granted(env, Role::Admin, admin.clone(), admin.clone());
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────

pub fn has_role(env: &Env, address: &Address, role: Role) -> bool {
    storage::load_flag(env, &DataKey::Role(role, address.clone()))
}

/// `true` if `address` is a mobilizer scoped to `project`.
pub fn is_mobilizer_for(env: &Env, address: &Address, project: &String) -> bool {
    has_role(env, address, Role::Mobilizer)
        && storage::load_flag(
            env,
            &DataKey::MobilizerScope(address.clone(), project.clone()),
        )
}

pub fn admin_count(env: &Env) -> u32 {
    storage::admin_count(env)
}

// ─────────────────────────────────────────────────────────
// Guards
// ─────────────────────────────────────────────────────────

/// Fail with [`Error::Unauthorized`] unless `address` holds `role`.
///
/// A `scope` is only meaningful for `Mobilizer`: the address must be scoped
/// to that project as well as holding the role.
pub fn require(
    env: &Env,
    role: Role,
    address: &Address,
    scope: Option<&String>,
) -> Result<(), Error> {
    let allowed = match (role, scope) {
        (Role::Mobilizer, Some(project)) => is_mobilizer_for(env, address, project),
        _ => has_role(env, address, role),
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

/// Pass if `address` holds any of `roles`.
pub fn require_any(env: &Env, roles: &[Role], address: &Address) -> Result<(), Error> {
    if roles.iter().any(|role| has_role(env, address, *role)) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

// ─────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────

/// Grant a global role. Granting a role already held is a no-op.
pub fn grant_role(env: &Env, caller: &Address, target: &Address, role: Role) -> Result<(), Error> {
    require(env, Role::Admin, caller, None)?;
    if role == Role::Mobilizer {
        return Err(Error::InvalidRole);
    }
    if has_role(env, target, role) {
        return Ok(());
    }

    if role == Role::Admin {
        let count = storage::admin_count(env)
            .checked_add(1)
            .ok_or(Error::Overflow)?;
        storage::set_admin_count(env, count);
    }
    set_role(env, role, target, true);
    events::emit_role_granted(env, role, target.clone(), caller.clone());
    Ok(())
}

pub fn revoke_role(env: &Env, caller: &Address, target: &Address, role: Role) -> Result<(), Error> {
    require(env, Role::Admin, caller, None)?;
    if role == Role::Mobilizer {
        return Err(Error::InvalidRole);
    }
    if !has_role(env, target, role) {
        return Err(Error::RoleNotFound);
    }

    if role == Role::Admin {
        let count = storage::admin_count(env);
        if count <= 1 {
            return Err(Error::LastAdmin);
        }
        if count - 1 < storage::load_config(env)?.quorum.threshold {
            return Err(Error::AdminsBelowThreshold);
        }
        storage::set_admin_count(env, count - 1);
    }
    set_role(env, role, target, false);
    events::emit_role_revoked(env, role, target.clone(), caller.clone());
    Ok(())
}

/// Scope `mobilizer` to `project`, setting the role bit if needed.
pub fn add_mobilizer(
    env: &Env,
    caller: &Address,
    mobilizer: &Address,
    project: &String,
) -> Result<(), Error> {
    require(env, Role::Admin, caller, None)?;

    let scope_key = DataKey::MobilizerScope(mobilizer.clone(), project.clone());
    if storage::load_flag(env, &scope_key) {
        return Ok(());
    }

    let count_key = DataKey::MobilizerScopes(mobilizer.clone());
    let scopes: u32 = storage::load(env, &count_key).unwrap_or(0);
    let scopes = scopes.checked_add(1).ok_or(Error::Overflow)?;

    storage::save(env, &scope_key, &true);
    storage::save(env, &count_key, &scopes);
    set_role(env, Role::Mobilizer, mobilizer, true);

    events::emit_mobilizer_added(env, mobilizer.clone(), project.clone(), caller.clone());
    Ok(())
}

/// Remove one project scope; the role bit goes with the last scope.
pub fn remove_mobilizer(
    env: &Env,
    caller: &Address,
    mobilizer: &Address,
    project: &String,
) -> Result<(), Error> {
    require(env, Role::Admin, caller, None)?;

    let scope_key = DataKey::MobilizerScope(mobilizer.clone(), project.clone());
    if !storage::load_flag(env, &scope_key) {
        return Err(Error::RoleNotFound);
    }

    let count_key = DataKey::MobilizerScopes(mobilizer.clone());
    let scopes: u32 = storage::load(env, &count_key).unwrap_or(1);
    let remaining = scopes.saturating_sub(1);

    storage::remove(env, &scope_key);
    if remaining == 0 {
        storage::remove(env, &count_key);
        set_role(env, Role::Mobilizer, mobilizer, false);
    } else {
        storage::save(env, &count_key, &remaining);
    }

    events::emit_mobilizer_removed(env, mobilizer.clone(), project.clone(), caller.clone());
    Ok(())
}

fn set_role(env: &Env, role: Role, address: &Address, held: bool) {
    let key = DataKey::Role(role, address.clone());
    if held {
        storage::save(env, &key, &true);
    } else {
        storage::remove(env, &key);
    }
}
