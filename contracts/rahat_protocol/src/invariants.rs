#![allow(dead_code)]

extern crate std;

use soroban_sdk::{Address, BytesN, String, Vec};

use crate::{BudgetRecord, Claim, ClaimStatus, RahatProtocolClient, TokenKind};

/// INV-1: issuance never exceeds allocation.
pub fn assert_budget_within_allocation(record: &BudgetRecord) {
    assert!(
        record.issued <= record.allocated,
        "INV-1 violated: issued {} exceeds allocated {}",
        record.issued,
        record.allocated
    );
    assert!(
        record.issued >= 0 && record.allocated >= 0,
        "INV-1 violated: negative budget counters {:?}",
        record
    );
}

/// INV-2: counters are monotonic between two snapshots of the same budget.
pub fn assert_budget_monotonic(before: &BudgetRecord, after: &BudgetRecord) {
    assert!(
        after.allocated >= before.allocated,
        "INV-2 violated: allocated decreased from {} to {}",
        before.allocated,
        after.allocated
    );
    assert!(
        after.issued >= before.issued,
        "INV-2 violated: issued decreased from {} to {}",
        before.issued,
        after.issued
    );
}

/// INV-3: a claim's fields agree with its status.
pub fn assert_claim_consistent(claim: &Claim) {
    match claim.status {
        ClaimStatus::Empty => {
            assert_eq!(claim.amount, 0, "INV-3 violated: empty claim holds value");
            assert!(claim.otp_hash.is_none(), "INV-3 violated: empty claim has otp");
            assert!(!claim.is_released());
        }
        ClaimStatus::Pending => {
            assert!(claim.amount > 0, "INV-3 violated: pending claim without amount");
            assert!(claim.otp_hash.is_none(), "INV-3 violated: pending claim has otp");
            assert!(!claim.is_released());
        }
        ClaimStatus::Approved => {
            assert!(claim.amount > 0, "INV-3 violated: approved claim without amount");
            assert!(claim.otp_hash.is_some(), "INV-3 violated: approved claim missing otp");
            assert!(claim.is_released());
        }
    }
}

/// INV-4: the contract's SAC balance backs every beneficiary's fungible balance.
pub fn assert_fungible_backing(
    client: &RahatProtocolClient,
    token: &soroban_sdk::token::Client,
    beneficiaries: &[BytesN<32>],
) {
    let internal: i128 = beneficiaries
        .iter()
        .map(|b| client.balance_of(b, &TokenKind::Fungible))
        .sum();
    assert_eq!(
        token.balance(&client.address),
        internal,
        "INV-4 violated: SAC backing differs from beneficiary balances"
    );
}

/// INV-5: the issued counter of each beneficiary equals what was issued to it.
pub fn assert_issued_matches(
    client: &RahatProtocolClient,
    beneficiary: &BytesN<32>,
    kind: &TokenKind,
    expected: i128,
) {
    assert_eq!(
        client.issued_to(beneficiary, kind),
        expected,
        "INV-5 violated: issued counter drifted"
    );
}

/// INV-6: the issuer index agrees with the sum issued to all beneficiaries
/// by that issuer when it is the only issuer.
pub fn assert_issuer_index(
    client: &RahatProtocolClient,
    issuer: &Address,
    kind: &TokenKind,
    beneficiaries: &[BytesN<32>],
) {
    let issued: i128 = beneficiaries
        .iter()
        .map(|b| client.issued_to(b, kind))
        .sum();
    let indexed = client
        .issuer_holdings(issuer)
        .iter()
        .find(|row| row.kind == *kind)
        .map(|row| row.amount)
        .unwrap_or(0);
    assert_eq!(indexed, issued, "INV-6 violated: issuer index diverged");
}

/// INV-7: every address that confirmed is counted at most once.
pub fn assert_confirmations_bounded(
    client: &RahatProtocolClient,
    project: &String,
    admins: &Vec<Address>,
) {
    let count = client.confirmation_count(project);
    assert!(
        count <= admins.len(),
        "INV-7 violated: {} confirmations from {} admins",
        count,
        admins.len()
    );
}
