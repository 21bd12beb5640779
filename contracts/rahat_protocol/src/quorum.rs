//! # Quorum Activation
//!
//! N-of-M admin switch that decides whether claims may be created and
//! redeemed. The admin set is the RBAC `Admin` holders; N is
//! [`QuorumConfig::threshold`].
//!
//! Confirmations are stored per `(epoch, project)`. Deactivation advances the
//! epoch, which retires every earlier confirmation at once, so the next
//! activation needs a fresh quorum.
//!
//! Only confirmations from addresses that still hold `Admin` are counted; an
//! admin revoked after confirming no longer contributes.

use soroban_sdk::{Address, Env, String, Vec};

use crate::events;
use crate::rbac;
use crate::storage::{self, DataKey};
use crate::types::{DeactivationPolicy, QuorumConfig, ResponseState, Role};
use crate::Error;

pub fn validate_config(config: &QuorumConfig) -> Result<(), Error> {
    if config.threshold == 0 {
        return Err(Error::InvalidThreshold);
    }
    Ok(())
}

pub fn is_live(env: &Env) -> bool {
    storage::load_response(env).is_live
}

pub fn require_live(env: &Env) -> Result<(), Error> {
    if is_live(env) {
        Ok(())
    } else {
        Err(Error::ResponseNotLive)
    }
}

pub fn response_state(env: &Env) -> ResponseState {
    storage::load_response(env)
}

/// Confirmations for `project` in the current epoch from current admins.
pub fn confirmation_count(env: &Env, project: &String) -> u32 {
    let epoch = storage::load_response(env).epoch;
    let confirmed = storage::load_addresses(env, &DataKey::Confirmations(epoch, project.clone()));
    count_admins(env, &confirmed)
}

pub fn has_confirmed(env: &Env, project: &String, admin: &Address) -> bool {
    let epoch = storage::load_response(env).epoch;
    storage::load_addresses(env, &DataKey::Confirmations(epoch, project.clone())).contains(admin)
}

/// Record `admin`'s confirmation for `project`; returns the resulting `is_live`.
pub fn activate(env: &Env, admin: &Address, project: &String) -> Result<bool, Error> {
    rbac::require(env, Role::Admin, admin, None)?;
    let config = storage::load_config(env)?.quorum;
    let mut state = storage::load_response(env);

    let key = DataKey::Confirmations(state.epoch, project.clone());
    let mut confirmed = storage::load_addresses(env, &key);
    if !confirmed.contains(admin) {
        confirmed.push_back(admin.clone());
        storage::save(env, &key, &confirmed);
    }

    let count = count_admins(env, &confirmed);
    events::emit_response_confirmed(env, project.clone(), admin.clone(), count, config.threshold);

    if !state.is_live && count >= config.threshold {
        state.is_live = true;
        state.project = Some(project.clone());
        storage::save_response(env, &state);
        events::emit_response_activated(env, project.clone(), state.epoch);
    }
    Ok(state.is_live)
}

/// Request deactivation; returns the resulting `is_live`.
pub fn deactivate(env: &Env, admin: &Address) -> Result<bool, Error> {
    rbac::require(env, Role::Admin, admin, None)?;
    let config = storage::load_config(env)?.quorum;
    let state = storage::load_response(env);
    if !state.is_live {
        return Err(Error::ResponseNotLive);
    }

    match config.deactivation {
        DeactivationPolicy::SingleAdmin => shut_down(env, admin, state)?,
        DeactivationPolicy::Quorum => {
            let key = DataKey::Deactivations(state.epoch);
            let mut requested = storage::load_addresses(env, &key);
            if !requested.contains(admin) {
                requested.push_back(admin.clone());
                storage::save(env, &key, &requested);
            }
            let count = count_admins(env, &requested);
            events::emit_deactivation_requested(env, admin.clone(), count, config.threshold);
            if count >= config.threshold {
                shut_down(env, admin, state)?;
            }
        }
    }
    Ok(is_live(env))
}

/// Change the threshold used for future counting.
///
/// The threshold may not exceed the current number of admins.
pub fn set_threshold(env: &Env, admin: &Address, threshold: u32) -> Result<(), Error> {
    rbac::require(env, Role::Admin, admin, None)?;
    let mut config = storage::load_config(env)?;
    config.quorum.threshold = threshold;
    validate_config(&config.quorum)?;
    if threshold > storage::admin_count(env) {
        return Err(Error::InvalidThreshold);
    }
    storage::save_config(env, &config);
    events::emit_threshold_changed(env, threshold, admin.clone());
    Ok(())
}

fn shut_down(env: &Env, admin: &Address, mut state: ResponseState) -> Result<(), Error> {
    state.is_live = false;
    state.project = None;
    state.epoch = state.epoch.checked_add(1).ok_or(Error::Overflow)?;
    storage::save_response(env, &state);
    events::emit_response_deactivated(env, admin.clone(), state.epoch);
    Ok(())
}

fn count_admins(env: &Env, addresses: &Vec<Address>) -> u32 {
    addresses
        .iter()
        .filter(|address| rbac::has_role(env, address, Role::Admin))
        .count() as u32
}
