//! # Batch Executor
//!
//! Runs a list of protocol calls for one caller inside a single invocation
//! and returns their results in order. Each entry performs the same role
//! checks as its standalone entry point; an error in any entry fails the
//! batch and the host rolls back every earlier entry.

use soroban_sdk::{Address, Env, Vec};

use crate::budget;
use crate::claims;
use crate::distribution;
use crate::types::{BatchCall, BatchResult};
use crate::Error;

pub fn execute(env: &Env, caller: &Address, calls: &Vec<BatchCall>) -> Result<Vec<BatchResult>, Error> {
    if calls.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let mut results = Vec::new(env);
    for call in calls.iter() {
        results.push_back(dispatch(env, caller, call)?);
    }
    Ok(results)
}

fn dispatch(env: &Env, caller: &Address, call: BatchCall) -> Result<BatchResult, Error> {
    let result = match call {
        BatchCall::Issue(project, beneficiary, kind, amount) => {
            distribution::issue(env, caller, &project, &beneficiary, &kind, amount)?;
            BatchResult::Done
        }
        BatchCall::CreateClaim(beneficiary, kind, amount) => {
            claims::create_claim(env, caller, &beneficiary, &kind, amount)?;
            BatchResult::Done
        }
        BatchCall::ApproveClaim(vendor, beneficiary, kind, otp_hash, validity_secs) => {
            claims::approve_claim(
                env,
                caller,
                &vendor,
                &beneficiary,
                &kind,
                &otp_hash,
                validity_secs,
            )?;
            BatchResult::Done
        }
        BatchCall::Redeem(beneficiary, kind, otp) => {
            BatchResult::Amount(claims::redeem(env, caller, &beneficiary, &kind, &otp)?)
        }
        BatchCall::CancelClaim(vendor, beneficiary, kind) => {
            claims::cancel_claim(env, caller, &vendor, &beneficiary, &kind)?;
            BatchResult::Done
        }
        BatchCall::BalanceOf(beneficiary, kind) => {
            BatchResult::Amount(distribution::balance_of(env, &beneficiary, &kind))
        }
        BatchCall::IssuedTo(beneficiary, kind) => {
            BatchResult::Amount(distribution::issued_to(env, &beneficiary, &kind))
        }
        BatchCall::Available(project, kind) => {
            BatchResult::Amount(budget::get_available(env, &project, &kind))
        }
    };
    Ok(result)
}
