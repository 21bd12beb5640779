extern crate std;

use soroban_sdk::{testutils::Address as _, vec, Address};

use crate::invariants::assert_confirmations_bounded;
use crate::test::Fixture;
use crate::{DeactivationPolicy, Error, Role};

#[test]
fn test_two_of_n_activation() {
    let f = Fixture::new();
    let admin2 = f.account(Role::Admin);
    let admins = vec![&f.env, f.admin.clone(), admin2.clone()];

    let live = f.client.activate_response(&f.admin, &f.project());
    assert!(!live);
    assert!(!f.client.is_live());
    assert_eq!(f.client.confirmation_count(&f.project()), 1);

    // Confirming twice counts once.
    let live = f.client.activate_response(&f.admin, &f.project());
    assert!(!live);
    assert_eq!(f.client.confirmation_count(&f.project()), 1);
    assert_confirmations_bounded(&f.client, &f.project(), &admins);

    let live = f.client.activate_response(&admin2, &f.project());
    assert!(live);
    assert!(f.client.is_live());
    assert!(f.client.has_confirmed(&f.project(), &admin2));

    let state = f.client.response_state();
    assert_eq!(state.project, Some(f.project()));
    assert_eq!(state.epoch, 0);
    assert_confirmations_bounded(&f.client, &f.project(), &admins);
}

#[test]
fn test_threshold_one_goes_live_immediately() {
    let f = Fixture::with_quorum(1, DeactivationPolicy::SingleAdmin);
    assert!(f.client.activate_response(&f.admin, &f.project()));
}

#[test]
fn test_only_admins_confirm() {
    let f = Fixture::new();
    let server = f.account(Role::Server);
    let stranger = Address::generate(&f.env);

    for caller in [server, stranger] {
        let result = f.client.try_activate_response(&caller, &f.project());
        assert_eq!(result, Err(Ok(Error::Unauthorized)));
    }
    assert_eq!(f.client.confirmation_count(&f.project()), 0);
}

#[test]
fn test_confirmations_are_per_project() {
    let f = Fixture::new();
    let admin2 = f.account(Role::Admin);
    let other = f.string("project2");

    f.client.activate_response(&f.admin, &f.project());
    f.client.activate_response(&admin2, &other);

    assert!(!f.client.is_live());
    assert_eq!(f.client.confirmation_count(&f.project()), 1);
    assert_eq!(f.client.confirmation_count(&other), 1);
}

#[test]
fn test_single_admin_deactivation_resets_confirmations() {
    let f = Fixture::new();
    f.go_live();

    let live = f.client.deactivate_response(&f.admin);
    assert!(!live);
    assert!(!f.client.is_live());

    let state = f.client.response_state();
    assert_eq!(state.project, None);
    assert_eq!(state.epoch, 1);
    assert_eq!(f.client.confirmation_count(&f.project()), 0);
    assert!(!f.client.has_confirmed(&f.project(), &f.admin));

    // A fresh quorum is needed to reactivate.
    assert!(!f.client.activate_response(&f.admin, &f.project()));
}

#[test]
fn test_deactivate_when_not_live_fails() {
    let f = Fixture::new();
    let result = f.client.try_deactivate_response(&f.admin);
    assert_eq!(result, Err(Ok(Error::ResponseNotLive)));
}

#[test]
fn test_non_admin_cannot_deactivate() {
    let f = Fixture::new();
    f.go_live();
    let vendor = f.account(Role::Vendor);
    let result = f.client.try_deactivate_response(&vendor);
    assert_eq!(result, Err(Ok(Error::Unauthorized)));
    assert!(f.client.is_live());
}

#[test]
fn test_quorum_deactivation_needs_threshold() {
    let f = Fixture::with_quorum(2, DeactivationPolicy::Quorum);
    let admin2 = f.go_live();

    let live = f.client.deactivate_response(&f.admin);
    assert!(live);
    assert!(f.client.is_live());

    // Repeating the request does not advance it.
    assert!(f.client.deactivate_response(&f.admin));

    let live = f.client.deactivate_response(&admin2);
    assert!(!live);
    assert_eq!(f.client.response_state().epoch, 1);

    // The next cycle starts with no deactivation requests.
    f.client.activate_response(&f.admin, &f.project());
    f.client.activate_response(&admin2, &f.project());
    assert!(f.client.is_live());
    assert!(f.client.deactivate_response(&admin2));
}

#[test]
fn test_revoked_admin_confirmation_not_counted() {
    let f = Fixture::new();
    let admin2 = f.account(Role::Admin);
    let admin3 = f.account(Role::Admin);

    f.client.activate_response(&f.admin, &f.project());
    assert_eq!(f.client.confirmation_count(&f.project()), 1);

    f.client.revoke_role(&admin3, &f.admin, &Role::Admin);
    assert_eq!(f.client.confirmation_count(&f.project()), 0);

    assert!(!f.client.activate_response(&admin2, &f.project()));
    assert!(f.client.activate_response(&admin3, &f.project()));
}

#[test]
fn test_set_threshold() {
    let f = Fixture::new();
    let admin2 = f.account(Role::Admin);
    let admin3 = f.account(Role::Admin);

    f.client.set_threshold(&f.admin, &3);
    assert_eq!(f.client.quorum_config().threshold, 3);

    f.client.activate_response(&f.admin, &f.project());
    assert!(!f.client.activate_response(&admin2, &f.project()));
    assert!(f.client.activate_response(&admin3, &f.project()));

    let result = f.client.try_set_threshold(&f.admin, &0);
    assert_eq!(result, Err(Ok(Error::InvalidThreshold)));

    // More confirmations than there are admins could never be collected.
    let result = f.client.try_set_threshold(&f.admin, &4);
    assert_eq!(result, Err(Ok(Error::InvalidThreshold)));

    let vendor = f.account(Role::Vendor);
    let result = f.client.try_set_threshold(&vendor, &1);
    assert_eq!(result, Err(Ok(Error::Unauthorized)));
    assert_eq!(f.client.quorum_config().threshold, 3);
}

#[test]
fn test_admin_revoke_keeps_quorum_reachable() {
    let f = Fixture::with_quorum(2, DeactivationPolicy::Quorum);
    let admin2 = f.account(Role::Admin);

    let result = f.client.try_revoke_role(&admin2, &f.admin, &Role::Admin);
    assert_eq!(result, Err(Ok(Error::AdminsBelowThreshold)));
    assert_eq!(f.client.admin_count(), 2);

    // Lowering the threshold first makes room for the revocation.
    f.client.set_threshold(&admin2, &1);
    f.client.revoke_role(&admin2, &f.admin, &Role::Admin);
    assert_eq!(f.client.admin_count(), 1);

    assert!(f.client.activate_response(&admin2, &f.project()));
    assert!(!f.client.deactivate_response(&admin2));
}

#[test]
fn test_lowered_threshold_applies_on_next_confirmation() {
    let f = Fixture::with_quorum(3, DeactivationPolicy::SingleAdmin);
    let admin2 = f.account(Role::Admin);

    f.client.activate_response(&f.admin, &f.project());
    f.client.activate_response(&admin2, &f.project());
    assert!(!f.client.is_live());

    f.client.set_threshold(&f.admin, &2);
    // Lowering the threshold alone does not flip the switch.
    assert!(!f.client.is_live());

    assert!(f.client.activate_response(&admin2, &f.project()));
}
