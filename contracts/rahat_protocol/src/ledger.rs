//! # Token Ledger Adapter
//!
//! Thin balance layer the rest of the protocol moves value through.
//!
//! - **Fungible** value is backed one-to-one by a Stellar Asset Contract the
//!   protocol administers. Minting into a beneficiary account mints the same
//!   amount of the SAC to this contract, and paying a vendor out transfers SAC
//!   tokens from this contract to the vendor. Beneficiary balances are
//!   internal sub-accounts of the contract's SAC balance.
//! - **Semi-fungible** classes have no standard on Soroban, so classes,
//!   supplies and balances all live in contract storage.

use soroban_sdk::{token, Address, Env, String};

use crate::events;
use crate::storage::{self, DataKey};
use crate::types::{Account, TokenClass, TokenKind};
use crate::Error;

/// Create a new semi-fungible class and return its id.
pub fn create_token_kind(env: &Env, name: String, symbol: String) -> Result<u32, Error> {
    let id = storage::next_token_id(env)?;
    let class = TokenClass {
        id,
        name: name.clone(),
        symbol: symbol.clone(),
        total_supply: 0,
    };
    storage::save(env, &DataKey::TokenClass(id), &class);
    events::emit_token_class_created(env, id, name, symbol);
    Ok(id)
}

pub fn token_class(env: &Env, id: u32) -> Option<TokenClass> {
    storage::load(env, &DataKey::TokenClass(id))
}

/// Fail with [`Error::TokenKindNotFound`] for an unknown semi-fungible id.
pub fn require_kind(env: &Env, kind: &TokenKind) -> Result<(), Error> {
    match kind {
        TokenKind::Fungible => Ok(()),
        TokenKind::SemiFungible(id) => token_class(env, *id)
            .map(|_| ())
            .ok_or(Error::TokenKindNotFound),
    }
}

pub fn balance_of(env: &Env, account: &Account, kind: &TokenKind) -> i128 {
    storage::load_amount(env, &DataKey::Balance(account.clone(), kind.clone()))
}

/// Create `amount` of new value in `account`.
pub fn mint_to(env: &Env, account: &Account, kind: &TokenKind, amount: i128) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    match kind {
        TokenKind::Fungible => {
            let config = storage::load_config(env)?;
            token::StellarAssetClient::new(env, &config.fungible_token)
                .mint(&env.current_contract_address(), &amount);
        }
        TokenKind::SemiFungible(id) => {
            let key = DataKey::TokenClass(*id);
            let mut class: TokenClass =
                storage::load(env, &key).ok_or(Error::TokenKindNotFound)?;
            class.total_supply = class
                .total_supply
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            storage::save(env, &key, &class);
        }
    }
    credit(env, account, kind, amount)
}

/// Move value between two internal accounts.
pub fn transfer_internal(
    env: &Env,
    from: &Account,
    to: &Account,
    kind: &TokenKind,
    amount: i128,
) -> Result<(), Error> {
    debit(env, from, kind, amount)?;
    credit(env, to, kind, amount)
}

/// Move value out of an internal account to `recipient`.
///
/// Fungible value leaves the contract as SAC tokens; semi-fungible value
/// lands in the recipient's internal holder account.
pub fn pay_out(
    env: &Env,
    from: &Account,
    recipient: &Address,
    kind: &TokenKind,
    amount: i128,
) -> Result<(), Error> {
    match kind {
        TokenKind::Fungible => {
            debit(env, from, kind, amount)?;
            let config = storage::load_config(env)?;
            token::Client::new(env, &config.fungible_token).transfer(
                &env.current_contract_address(),
                recipient,
                &amount,
            );
            Ok(())
        }
        TokenKind::SemiFungible(_) => {
            transfer_internal(env, from, &Account::Holder(recipient.clone()), kind, amount)
        }
    }
}

/// Balance a vendor has received through redemptions.
pub fn holder_balance(env: &Env, holder: &Address, kind: &TokenKind) -> Result<i128, Error> {
    match kind {
        TokenKind::Fungible => {
            let config = storage::load_config(env)?;
            Ok(token::Client::new(env, &config.fungible_token).balance(holder))
        }
        TokenKind::SemiFungible(_) => Ok(balance_of(env, &Account::Holder(holder.clone()), kind)),
    }
}

fn credit(env: &Env, account: &Account, kind: &TokenKind, amount: i128) -> Result<(), Error> {
    let key = DataKey::Balance(account.clone(), kind.clone());
    let balance = storage::load_amount(env, &key)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    storage::save(env, &key, &balance);
    Ok(())
}

fn debit(env: &Env, account: &Account, kind: &TokenKind, amount: i128) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    let key = DataKey::Balance(account.clone(), kind.clone());
    let balance = storage::load_amount(env, &key);
    if balance < amount {
        return Err(Error::InsufficientBalance);
    }
    storage::save(env, &key, &(balance - amount));
    Ok(())
}
