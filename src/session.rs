//! Session resolution and password hashing.

use crate::user::Profile;
use actix_session::Session;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString};
use argon2::Argon2;
use once_cell::sync::OnceCell;

static ARGON2: OnceCell<Argon2<'static>> = OnceCell::new();

const SESSION_USER_KEY: &str = "uid";

/// Initialize the password hasher. When SALT is set it is mixed in as a
/// keyed secret; the stored hashes remain standard Argon2id strings.
pub fn init() {
    let argon2 = match std::env::var("SALT") {
        Ok(salt) if !salt.is_empty() => {
            let secret: &'static [u8] = Box::leak(salt.into_bytes().into_boxed_slice());
            Argon2::new_with_secret(
                secret,
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                argon2::Params::default(),
            )
            .expect("SALT is not usable as an Argon2 secret.")
        }
        _ => Argon2::default(),
    };
    if ARGON2.set(argon2).is_err() {
        panic!("session::init called more than once.");
    }
}

pub fn get_argon2() -> &'static Argon2<'static> {
    ARGON2.get().expect("session::init has not been called.")
}

pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(get_argon2()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => get_argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            log::error!("stored password hash failed to parse: {}", err);
            false
        }
    }
}

pub fn remember_client(
    session: &Session,
    user_id: i32,
) -> Result<(), actix_session::SessionInsertError> {
    session.insert(SESSION_USER_KEY, user_id)
}

pub fn forget_client(session: &Session) {
    session.purge();
}

/// Resolve the session cookie to a full profile, or None for guests.
pub async fn authenticate_client_by_session(session: &Session) -> Option<Profile> {
    let id: i32 = session.get(SESSION_USER_KEY).ok().flatten()?;
    match Profile::get_by_id(crate::db::get_db_pool(), id).await {
        Ok(profile) => profile,
        Err(err) => {
            log::error!("session user lookup failed: {}", err);
            None
        }
    }
}
