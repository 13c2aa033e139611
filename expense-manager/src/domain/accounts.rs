//! Account store: registration, credential checks and profile lookup.

use sha2::{Digest, Sha256};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

use super::{PasswordHasher, UserId};
use crate::database::db::queries;
use crate::database::models::UserProfile;
use crate::error::{is_unique_violation, LedgerError, LedgerResult};

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const AVATAR_BASE_URL: &str = "https://i.pravatar.cc/150";

#[derive(Clone)]
pub struct AccountStore {
    pool: Pool<Sqlite>,
    hasher: PasswordHasher,
    // verified against when the email is unknown, so both failure paths cost one hash
    dummy_credential: String,
}

impl AccountStore {
    pub fn new(pool: Pool<Sqlite>, hasher: PasswordHasher) -> Self {
        let dummy_credential = hasher.hash("no-such-account");
        Self {
            pool,
            hasher,
            dummy_credential,
        }
    }

    pub async fn register(&self, name: &str, email: &str, raw_password: &str) -> LedgerResult<UserId> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;
        validate_password(raw_password)?;

        let hasher = self.hasher;
        let password = raw_password.to_owned();
        let password_hash = run_blocking(move || hasher.hash(&password)).await;
        let avatar_url = avatar_for(&email);

        let user_id = queries::insert_user(&self.pool, name, &email, &password_hash, &avatar_url)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    LedgerError::DuplicateEmail
                } else {
                    LedgerError::StoreUnavailable(e)
                }
            })?;

        info!(%user_id, "user registered");
        Ok(user_id)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, raw_password: &str) -> LedgerResult<UserId> {
        let email = normalise_email(email);
        let record = queries::find_credentials_by_email(&self.pool, &email).await?;

        let (user_id, stored) = match record {
            Some(found) => (Some(found.user_id), found.password_hash),
            None => (None, self.dummy_credential.clone()),
        };

        let hasher = self.hasher;
        let password = raw_password.to_owned();
        let matches = run_blocking(move || hasher.verify(&password, &stored)).await;

        match user_id {
            Some(user_id) if matches => {
                debug!(%user_id, "credentials accepted");
                Ok(user_id)
            }
            _ => Err(LedgerError::InvalidCredentials),
        }
    }

    pub async fn get_profile(&self, user_id: UserId) -> LedgerResult<UserProfile> {
        queries::find_profile(&self.pool, user_id)
            .await?
            .ok_or(LedgerError::NotFound)
    }
}

async fn run_blocking<T, F>(work: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(value) => value,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}

fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_name(name: &str) -> LedgerResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::invalid("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::invalid(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

fn validate_email(email: &str) -> LedgerResult<String> {
    let email = normalise_email(email);
    let plausible = email.len() <= MAX_EMAIL_LEN
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !domain.contains("..")
            }
            None => false,
        };
    if plausible {
        Ok(email)
    } else {
        Err(LedgerError::invalid("email address is not valid"))
    }
}

fn validate_password(password: &str) -> LedgerResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LedgerError::invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Stable per email, without exposing the address itself.
fn avatar_for(email: &str) -> String {
    let digest = Sha256::digest(email.as_bytes());
    format!("{AVATAR_BASE_URL}?u={}", hex::encode(digest))
}
