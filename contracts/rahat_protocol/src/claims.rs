//! # Claim / Escrow Protocol
//!
//! Vendor-initiated, server-approved, OTP-redeemed claims against a
//! beneficiary's balance, one live claim per `(vendor, beneficiary, kind)`.
//!
//! | From               | Call            | To       |
//! |--------------------|-----------------|----------|
//! | Empty / Pending    | `create_claim`  | Pending  |
//! | Approved (lapsed)  | `create_claim`  | Pending  |
//! | Pending            | `approve_claim` | Approved |
//! | Approved           | `redeem` (ok)   | Empty    |
//! | Approved           | `redeem` (bad)  | Approved |
//! | Pending / Approved | `cancel_claim`  | Empty    |
//!
//! Creation and redemption only run while the response is live. Cancelling
//! does not, so a claim that can no longer be redeemed never pins its key.

use soroban_sdk::{Address, BytesN, Env, String};

use crate::distribution;
use crate::events;
use crate::hashing;
use crate::ledger;
use crate::quorum;
use crate::rbac;
use crate::storage::{self, DataKey};
use crate::types::{Account, Claim, ClaimStatus, Role, TokenKind};
use crate::Error;

fn claim_key(vendor: &Address, beneficiary: &BytesN<32>, kind: &TokenKind) -> DataKey {
    DataKey::Claim(vendor.clone(), beneficiary.clone(), kind.clone())
}

/// Load the claim under the key, or an empty claim.
pub fn get_claim(env: &Env, vendor: &Address, beneficiary: &BytesN<32>, kind: &TokenKind) -> Claim {
    storage::load(env, &claim_key(vendor, beneficiary, kind)).unwrap_or_else(Claim::empty)
}

/// Open (or replace) a pending claim for `amount`.
pub fn create_claim(
    env: &Env,
    vendor: &Address,
    beneficiary: &BytesN<32>,
    kind: &TokenKind,
    amount: i128,
) -> Result<(), Error> {
    rbac::require(env, Role::Vendor, vendor, None)?;
    quorum::require_live(env)?;
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    ledger::require_kind(env, kind)?;

    let existing = get_claim(env, vendor, beneficiary, kind);
    if existing.is_released() && !existing.is_expired(env.ledger().timestamp()) {
        return Err(Error::ClaimAlreadyApproved);
    }
    if distribution::balance_of(env, beneficiary, kind) < amount {
        return Err(Error::InsufficientBalance);
    }

    let claim = Claim {
        amount,
        otp_hash: None,
        status: ClaimStatus::Pending,
        expires_at: 0,
    };
    storage::save(env, &claim_key(vendor, beneficiary, kind), &claim);

    events::emit_claim_created(env, vendor.clone(), beneficiary.clone(), kind.clone(), amount);
    Ok(())
}

/// Commit the OTP hash for a pending claim.
///
/// `validity_secs == 0` keeps the approval open until redeemed.
pub fn approve_claim(
    env: &Env,
    server: &Address,
    vendor: &Address,
    beneficiary: &BytesN<32>,
    kind: &TokenKind,
    otp_hash: &BytesN<32>,
    validity_secs: u64,
) -> Result<(), Error> {
    rbac::require(env, Role::Server, server, None)?;

    let mut claim = get_claim(env, vendor, beneficiary, kind);
    if claim.status != ClaimStatus::Pending {
        return Err(Error::ClaimNotPending);
    }

    let expires_at = if validity_secs == 0 {
        0
    } else {
        env.ledger()
            .timestamp()
            .checked_add(validity_secs)
            .ok_or(Error::Overflow)?
    };

    claim.otp_hash = Some(otp_hash.clone());
    claim.status = ClaimStatus::Approved;
    claim.expires_at = expires_at;
    storage::save(env, &claim_key(vendor, beneficiary, kind), &claim);

    events::emit_claim_approved(
        env,
        vendor.clone(),
        beneficiary.clone(),
        kind.clone(),
        server.clone(),
        expires_at,
    );
    Ok(())
}

/// Redeem an approved claim by presenting the OTP preimage.
///
/// Returns the amount paid to the vendor. A wrong OTP fails with
/// [`Error::OtpMismatch`] and leaves the claim redeemable.
pub fn redeem(
    env: &Env,
    vendor: &Address,
    beneficiary: &BytesN<32>,
    kind: &TokenKind,
    otp: &String,
) -> Result<i128, Error> {
    rbac::require(env, Role::Vendor, vendor, None)?;
    quorum::require_live(env)?;

    let key = claim_key(vendor, beneficiary, kind);
    let claim = get_claim(env, vendor, beneficiary, kind);
    if !claim.is_released() {
        return Err(Error::ClaimNotApproved);
    }
    if claim.is_expired(env.ledger().timestamp()) {
        return Err(Error::ClaimExpired);
    }

    let presented = hashing::hash_otp(env, otp)?;
    if claim.otp_hash != Some(presented) {
        return Err(Error::OtpMismatch);
    }

    ledger::pay_out(
        env,
        &Account::Beneficiary(beneficiary.clone()),
        vendor,
        kind,
        claim.amount,
    )?;
    storage::remove(env, &key);

    events::emit_claim_redeemed(
        env,
        vendor.clone(),
        beneficiary.clone(),
        kind.clone(),
        claim.amount,
    );
    Ok(claim.amount)
}

/// Drop a pending or approved claim without paying out.
///
/// The vendor may cancel its own claim; a `Server` or `Admin` may cancel any.
pub fn cancel_claim(
    env: &Env,
    caller: &Address,
    vendor: &Address,
    beneficiary: &BytesN<32>,
    kind: &TokenKind,
) -> Result<(), Error> {
    if caller == vendor {
        rbac::require(env, Role::Vendor, vendor, None)?;
    } else {
        rbac::require_any(env, &[Role::Server, Role::Admin], caller)?;
    }

    let claim = get_claim(env, vendor, beneficiary, kind);
    if claim.status == ClaimStatus::Empty {
        return Err(Error::ClaimNotPending);
    }
    storage::remove(env, &claim_key(vendor, beneficiary, kind));

    events::emit_claim_cancelled(
        env,
        vendor.clone(),
        beneficiary.clone(),
        kind.clone(),
        caller.clone(),
    );
    Ok(())
}
