//! Domain-tagged identifier hashing.
//!
//! Beneficiaries are keyed by the hash of their phone number and claims are
//! committed to the hash of an OTP. Each use carries its own tag so a digest
//! produced for one purpose can never be replayed as the other.
//!
//! Phone numbers are capped at [`MAX_IDENTIFIER_LEN`] bytes. OTPs are hashed
//! at any length: their format is agreed off-chain between server and
//! beneficiary, and redemption only checks the digest.

use soroban_sdk::{xdr::ToXdr, Bytes, BytesN, Env, String};

use crate::Error;

/// Longest phone number accepted for hashing, in bytes.
pub const MAX_IDENTIFIER_LEN: u32 = 64;

const PHONE_TAG: &[u8] = b"rahat:phone:";
const OTP_TAG: &[u8] = b"rahat:otp:";

/// `ScVal::String` XDR prefix: 4-byte type discriminant, 4-byte length.
const XDR_STRING_HEADER: u32 = 8;

/// `sha256("rahat:phone:" || phone)`
pub fn hash_phone(env: &Env, phone: &String) -> Result<BytesN<32>, Error> {
    if phone.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::IdentifierTooLong);
    }
    Ok(tagged_sha256(env, PHONE_TAG, phone))
}

/// `sha256("rahat:otp:" || otp)`
pub fn hash_otp(env: &Env, otp: &String) -> Result<BytesN<32>, Error> {
    Ok(tagged_sha256(env, OTP_TAG, otp))
}

fn tagged_sha256(env: &Env, tag: &[u8], value: &String) -> BytesN<32> {
    let mut data = Bytes::from_slice(env, tag);
    data.append(&string_bytes(env, value));
    env.crypto().sha256(&data).into()
}

/// Raw UTF-8 bytes of `value`, cut out of its XDR encoding.
fn string_bytes(env: &Env, value: &String) -> Bytes {
    let encoded = value.clone().to_xdr(env);
    encoded.slice(XDR_STRING_HEADER..XDR_STRING_HEADER + value.len())
}
