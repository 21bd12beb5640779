extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, BytesN,
};

use crate::invariants::{assert_claim_consistent, assert_fungible_backing};
use crate::test::Fixture;
use crate::{ClaimStatus, Error, Role, TokenKind};

const OTP: &str = "1234";

struct ClaimSetup {
    f: Fixture,
    vendor: Address,
    server: Address,
    ben: BytesN<32>,
}

impl ClaimSetup {
    /// Live response, beneficiary holding 5000 fungible units.
    fn new() -> Self {
        let f = Fixture::new();
        f.client
            .set_budget(&f.admin, &f.project(), &TokenKind::Fungible, &10_000);
        let ben = f.phone("1111111111");
        f.client
            .issue(&f.admin, &f.project(), &ben, &TokenKind::Fungible, &5_000);
        let vendor = f.account(Role::Vendor);
        let server = f.account(Role::Server);
        f.go_live();
        ClaimSetup {
            f,
            vendor,
            server,
            ben,
        }
    }

    fn otp_hash(&self, otp: &str) -> BytesN<32> {
        self.f.client.hash_otp(&self.f.string(otp))
    }

    fn approve(&self, kind: &TokenKind, validity_secs: u64) {
        self.f.client.approve_claim(
            &self.server,
            &self.vendor,
            &self.ben,
            kind,
            &self.otp_hash(OTP),
            &validity_secs,
        );
    }
}

#[test]
fn test_claims_require_live_response() {
    let f = Fixture::new();
    f.client
        .set_budget(&f.admin, &f.project(), &TokenKind::Fungible, &10_000);
    let ben = f.phone("1111111111");
    f.client
        .issue(&f.admin, &f.project(), &ben, &TokenKind::Fungible, &1_000);
    let vendor = f.account(Role::Vendor);

    let result = f
        .client
        .try_create_claim(&vendor, &ben, &TokenKind::Fungible, &100);
    assert_eq!(result, Err(Ok(Error::ResponseNotLive)));

    f.go_live();
    f.client
        .create_claim(&vendor, &ben, &TokenKind::Fungible, &100);
    assert_eq!(
        f.client
            .get_claim(&vendor, &ben, &TokenKind::Fungible)
            .status,
        ClaimStatus::Pending
    );
}

#[test]
fn test_full_claim_round_trip() {
    let s = ClaimSetup::new();
    let f = &s.f;

    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &1_000);
    let pending = f.client.get_claim(&s.vendor, &s.ben, &TokenKind::Fungible);
    assert_eq!(pending.amount, 1_000);
    assert!(!pending.is_released());
    assert_claim_consistent(&pending);

    s.approve(&TokenKind::Fungible, 0);
    let approved = f.client.get_claim(&s.vendor, &s.ben, &TokenKind::Fungible);
    assert!(approved.is_released());
    assert_eq!(approved.otp_hash, Some(s.otp_hash(OTP)));
    assert_claim_consistent(&approved);

    let paid = f
        .client
        .redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    assert_eq!(paid, 1_000);

    let cleared = f.client.get_claim(&s.vendor, &s.ben, &TokenKind::Fungible);
    assert_eq!(cleared.amount, 0);
    assert!(!cleared.is_released());
    assert_eq!(cleared.status, ClaimStatus::Empty);
    assert_claim_consistent(&cleared);

    assert_eq!(f.token.balance(&s.vendor), 1_000);
    assert_eq!(f.client.vendor_balance(&s.vendor, &TokenKind::Fungible), 1_000);
    assert_eq!(f.client.balance_of(&s.ben, &TokenKind::Fungible), 4_000);
    // Issuance history is not reduced by redemption.
    assert_eq!(f.client.issued_to(&s.ben, &TokenKind::Fungible), 5_000);
    assert_fungible_backing(&f.client, &f.token, &[s.ben.clone()]);
}

#[test]
fn test_wrong_otp_keeps_claim_redeemable() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &1_000);
    s.approve(&TokenKind::Fungible, 0);

    let result = f
        .client
        .try_redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string("9999"));
    assert_eq!(result, Err(Ok(Error::OtpMismatch)));

    let claim = f.client.get_claim(&s.vendor, &s.ben, &TokenKind::Fungible);
    assert!(claim.is_released());
    assert_eq!(claim.amount, 1_000);
    assert_eq!(f.client.balance_of(&s.ben, &TokenKind::Fungible), 5_000);
    assert_eq!(f.token.balance(&s.vendor), 0);

    let paid = f
        .client
        .redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    assert_eq!(paid, 1_000);
}

#[test]
fn test_claim_roles_enforced() {
    let s = ClaimSetup::new();
    let f = &s.f;
    let stranger = Address::generate(&f.env);

    let result = f
        .client
        .try_create_claim(&stranger, &s.ben, &TokenKind::Fungible, &10);
    assert_eq!(result, Err(Ok(Error::Unauthorized)));

    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &10);

    // A vendor cannot approve its own claim.
    let result = f.client.try_approve_claim(
        &s.vendor,
        &s.vendor,
        &s.ben,
        &TokenKind::Fungible,
        &s.otp_hash(OTP),
        &0,
    );
    assert_eq!(result, Err(Ok(Error::Unauthorized)));

    s.approve(&TokenKind::Fungible, 0);

    // Only the vendor that opened the claim can redeem it.
    let other_vendor = f.account(Role::Vendor);
    let result = f.client.try_redeem(
        &other_vendor,
        &s.ben,
        &TokenKind::Fungible,
        &f.string(OTP),
    );
    assert_eq!(result, Err(Ok(Error::ClaimNotApproved)));
}

#[test]
fn test_approve_requires_pending_claim() {
    let s = ClaimSetup::new();
    let f = &s.f;

    let result = f.client.try_approve_claim(
        &s.server,
        &s.vendor,
        &s.ben,
        &TokenKind::Fungible,
        &s.otp_hash(OTP),
        &0,
    );
    assert_eq!(result, Err(Ok(Error::ClaimNotPending)));

    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &10);
    s.approve(&TokenKind::Fungible, 0);

    let result = f.client.try_approve_claim(
        &s.server,
        &s.vendor,
        &s.ben,
        &TokenKind::Fungible,
        &s.otp_hash("0000"),
        &0,
    );
    assert_eq!(result, Err(Ok(Error::ClaimNotPending)));
    // The first commitment is untouched.
    assert_eq!(
        f.client
            .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
            .otp_hash,
        Some(s.otp_hash(OTP))
    );
}

#[test]
fn test_redeem_before_approval_fails() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &10);

    let result = f
        .client
        .try_redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    assert_eq!(result, Err(Ok(Error::ClaimNotApproved)));
}

#[test]
fn test_pending_claim_can_be_replaced() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &10);
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &25);
    assert_eq!(
        f.client
            .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
            .amount,
        25
    );
}

#[test]
fn test_open_approval_blocks_new_claim() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &10);
    s.approve(&TokenKind::Fungible, 0);

    let result = f
        .client
        .try_create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &20);
    assert_eq!(result, Err(Ok(Error::ClaimAlreadyApproved)));
    assert_eq!(
        f.client
            .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
            .amount,
        10
    );
}

#[test]
fn test_expired_approval_cannot_be_redeemed() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.env.ledger().set_timestamp(1_000);

    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &10);
    s.approve(&TokenKind::Fungible, 60);
    assert_eq!(
        f.client
            .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
            .expires_at,
        1_060
    );

    // Still valid on the boundary.
    f.env.ledger().set_timestamp(1_060);
    assert!(!f
        .client
        .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
        .is_expired(1_060));

    f.env.ledger().set_timestamp(1_061);
    let result = f
        .client
        .try_redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    assert_eq!(result, Err(Ok(Error::ClaimExpired)));
    assert_eq!(f.token.balance(&s.vendor), 0);

    // A lapsed approval can be replaced by a fresh claim.
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &30);
    s.approve(&TokenKind::Fungible, 60);
    let paid = f
        .client
        .redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    assert_eq!(paid, 30);
}

#[test]
fn test_claim_above_balance_rejected() {
    let s = ClaimSetup::new();
    let f = &s.f;
    let result = f
        .client
        .try_create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &5_001);
    assert_eq!(result, Err(Ok(Error::InsufficientBalance)));

    let result = f
        .client
        .try_create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &0);
    assert_eq!(result, Err(Ok(Error::InvalidAmount)));
}

#[test]
fn test_redeem_fails_when_balance_spent_elsewhere() {
    let s = ClaimSetup::new();
    let f = &s.f;
    let other_vendor = f.account(Role::Vendor);

    // Two vendors each claim most of the balance.
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &4_000);
    f.client
        .create_claim(&other_vendor, &s.ben, &TokenKind::Fungible, &4_000);
    s.approve(&TokenKind::Fungible, 0);
    f.client.approve_claim(
        &s.server,
        &other_vendor,
        &s.ben,
        &TokenKind::Fungible,
        &s.otp_hash(OTP),
        &0,
    );

    f.client
        .redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    let result = f.client.try_redeem(
        &other_vendor,
        &s.ben,
        &TokenKind::Fungible,
        &f.string(OTP),
    );
    assert_eq!(result, Err(Ok(Error::InsufficientBalance)));
    assert!(f
        .client
        .get_claim(&other_vendor, &s.ben, &TokenKind::Fungible)
        .is_released());
    assert_fungible_backing(&f.client, &f.token, &[s.ben.clone()]);
}

#[test]
fn test_redeem_after_deactivation_fails() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &10);
    s.approve(&TokenKind::Fungible, 0);

    f.client.deactivate_response(&f.admin);
    let result = f
        .client
        .try_redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    assert_eq!(result, Err(Ok(Error::ResponseNotLive)));

    // The approval itself survives deactivation.
    assert!(f
        .client
        .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
        .is_released());
}

#[test]
fn test_semi_fungible_claim_pays_vendor_holder_account() {
    let s = ClaimSetup::new();
    let f = &s.f;
    let id = f.client.create_token_budget(
        &f.admin,
        &f.project(),
        &f.string("Project1Token"),
        &f.string("P1T"),
        &1_000,
    );
    let kind = TokenKind::SemiFungible(id);
    f.client.issue(&f.admin, &f.project(), &s.ben, &kind, &600);

    f.client.create_claim(&s.vendor, &s.ben, &kind, &250);
    s.approve(&kind, 0);
    let paid = f.client.redeem(&s.vendor, &s.ben, &kind, &f.string(OTP));

    assert_eq!(paid, 250);
    assert_eq!(f.client.balance_of(&s.ben, &kind), 350);
    assert_eq!(f.client.vendor_balance(&s.vendor, &kind), 250);
    // Fungible claims for the same pair are independent.
    assert_eq!(
        f.client
            .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
            .status,
        ClaimStatus::Empty
    );
    assert_eq!(f.token.balance(&s.vendor), 0);
}

#[test]
fn test_long_otp_redeems() {
    let s = ClaimSetup::new();
    let f = &s.f;
    let otp = std::string::String::from("x").repeat(65);
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &100);
    f.client.approve_claim(
        &s.server,
        &s.vendor,
        &s.ben,
        &TokenKind::Fungible,
        &s.otp_hash(&otp),
        &0,
    );

    let paid = f
        .client
        .try_redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(&otp));
    assert_eq!(paid, Ok(Ok(100)));
    assert_eq!(f.token.balance(&s.vendor), 100);
}

#[test]
fn test_cancel_frees_claim_blocked_by_spent_balance() {
    let s = ClaimSetup::new();
    let f = &s.f;
    let other_vendor = f.account(Role::Vendor);

    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &4_000);
    f.client
        .create_claim(&other_vendor, &s.ben, &TokenKind::Fungible, &4_000);
    s.approve(&TokenKind::Fungible, 0);
    f.client.approve_claim(
        &s.server,
        &other_vendor,
        &s.ben,
        &TokenKind::Fungible,
        &s.otp_hash(OTP),
        &0,
    );
    f.client
        .redeem(&s.vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));

    // The never-expiring approval for 4000 can no longer be paid and pins the key.
    let result = f
        .client
        .try_create_claim(&other_vendor, &s.ben, &TokenKind::Fungible, &500);
    assert_eq!(result, Err(Ok(Error::ClaimAlreadyApproved)));

    f.client
        .cancel_claim(&other_vendor, &other_vendor, &s.ben, &TokenKind::Fungible);
    assert_eq!(
        f.client
            .get_claim(&other_vendor, &s.ben, &TokenKind::Fungible)
            .status,
        ClaimStatus::Empty
    );

    f.client
        .create_claim(&other_vendor, &s.ben, &TokenKind::Fungible, &500);
    f.client.approve_claim(
        &s.server,
        &other_vendor,
        &s.ben,
        &TokenKind::Fungible,
        &s.otp_hash(OTP),
        &0,
    );
    let paid = f
        .client
        .redeem(&other_vendor, &s.ben, &TokenKind::Fungible, &f.string(OTP));
    assert_eq!(paid, 500);
    assert_eq!(f.client.balance_of(&s.ben, &TokenKind::Fungible), 500);
    assert_fungible_backing(&f.client, &f.token, &[s.ben.clone()]);
}

#[test]
fn test_cancel_claim_permissions() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &100);

    let other_vendor = f.account(Role::Vendor);
    let stranger = Address::generate(&f.env);
    for caller in [&other_vendor, &stranger] {
        let result = f
            .client
            .try_cancel_claim(caller, &s.vendor, &s.ben, &TokenKind::Fungible);
        assert_eq!(result, Err(Ok(Error::Unauthorized)));
    }

    // The server may drop a pending claim.
    f.client
        .cancel_claim(&s.server, &s.vendor, &s.ben, &TokenKind::Fungible);
    let result = f
        .client
        .try_cancel_claim(&s.vendor, &s.vendor, &s.ben, &TokenKind::Fungible);
    assert_eq!(result, Err(Ok(Error::ClaimNotPending)));
}

#[test]
fn test_cancel_works_while_not_live() {
    let s = ClaimSetup::new();
    let f = &s.f;
    f.client
        .create_claim(&s.vendor, &s.ben, &TokenKind::Fungible, &100);
    s.approve(&TokenKind::Fungible, 0);
    f.client.deactivate_response(&f.admin);

    f.client
        .cancel_claim(&f.admin, &s.vendor, &s.ben, &TokenKind::Fungible);
    assert!(!f
        .client
        .get_claim(&s.vendor, &s.ben, &TokenKind::Fungible)
        .is_released());
    assert_eq!(f.client.balance_of(&s.ben, &TokenKind::Fungible), 5_000);
}
