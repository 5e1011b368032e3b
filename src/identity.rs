//! Maps sign-in credentials to the opaque [`UserId`] used to partition rows.

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::domain::{UserAccount, UserId};
use crate::errors::{EarningsError, Result};
use crate::storage::{append_records, load_records, RowStore};

const PIN_LENGTH: std::ops::RangeInclusive<usize> = 4..=6;

/// Resolves credentials of some shape to a user id.
pub trait IdentityProvider {
    type Credentials: ?Sized;

    fn resolve(&self, credentials: &Self::Credentials) -> Result<UserId>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinCredentials {
    pub alias: String,
    pub pin: String,
}

/// Alias plus numeric PIN, with the PIN kept as a SHA-256 hex digest.
pub struct PinIdentity<'a> {
    store: &'a dyn RowStore,
}

impl<'a> PinIdentity<'a> {
    pub fn new(store: &'a dyn RowStore) -> Self {
        Self { store }
    }

    pub fn register(&self, alias: &str, pin: &str) -> Result<UserId> {
        let user_id = UserId::new(alias)?;
        validate_pin(pin)?;
        if find_account(self.store, &user_id)?.is_some() {
            return Err(EarningsError::Authentication(format!(
                "alias `{user_id}` is already registered"
            )));
        }
        let account = UserAccount {
            user_id: user_id.clone(),
            credential_hash: Some(hash_pin(pin)),
        };
        append_records(self.store, &[account])?;
        info!(user = %user_id, "user registered");
        Ok(user_id)
    }

    pub fn login(&self, alias: &str, pin: &str) -> Result<UserId> {
        let user_id = UserId::new(alias)?;
        let account = find_account(self.store, &user_id)?
            .ok_or_else(|| EarningsError::Authentication(format!("unknown alias `{user_id}`")))?;
        match account.credential_hash {
            Some(hash) if hash == hash_pin(pin) => {
                info!(user = %user_id, "pin login");
                Ok(user_id)
            }
            Some(_) => {
                warn!(user = %user_id, "wrong pin");
                Err(EarningsError::Authentication("wrong PIN".into()))
            }
            None => Err(EarningsError::Authentication(format!(
                "`{user_id}` signs in through a federated provider"
            ))),
        }
    }
}

impl IdentityProvider for PinIdentity<'_> {
    type Credentials = PinCredentials;

    fn resolve(&self, credentials: &PinCredentials) -> Result<UserId> {
        self.login(&credentials.alias, &credentials.pin)
    }
}

/// Email already verified by an external provider; recorded on first sight.
pub struct FederatedIdentity<'a> {
    store: &'a dyn RowStore,
}

impl<'a> FederatedIdentity<'a> {
    pub fn new(store: &'a dyn RowStore) -> Self {
        Self { store }
    }
}

impl IdentityProvider for FederatedIdentity<'_> {
    type Credentials = str;

    fn resolve(&self, email: &str) -> Result<UserId> {
        let normalized = email.trim().to_lowercase();
        if !normalized.contains('@') {
            return Err(EarningsError::Authentication(format!(
                "`{}` is not an email address",
                email.trim()
            )));
        }
        let user_id = UserId::new(normalized)?;
        match find_account(self.store, &user_id)? {
            Some(account) if !account.is_federated() => Err(EarningsError::Authentication(
                format!("`{user_id}` is registered with a PIN"),
            )),
            Some(_) => Ok(user_id),
            None => {
                append_records(
                    self.store,
                    &[UserAccount {
                        user_id: user_id.clone(),
                        credential_hash: None,
                    }],
                )?;
                info!(user = %user_id, "federated user recorded");
                Ok(user_id)
            }
        }
    }
}

/// Lower-case hex SHA-256 of the PIN.
pub fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

fn validate_pin(pin: &str) -> Result<()> {
    if PIN_LENGTH.contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(EarningsError::Authentication(
            "PIN must be 4 to 6 digits".into(),
        ))
    }
}

fn find_account(store: &dyn RowStore, user_id: &UserId) -> Result<Option<UserAccount>> {
    Ok(load_records::<UserAccount>(store)?
        .into_iter()
        .find(|account| &account.user_id == user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Collection, MemoryRowStore};

    #[test]
    fn pin_hash_is_sha256_hex() {
        assert_eq!(
            hash_pin("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn register_then_login() {
        let store = MemoryRowStore::new();
        let pins = PinIdentity::new(&store);
        let user = pins.register(" ana ", "4821").unwrap();
        assert_eq!(user.as_str(), "ana");
        assert_eq!(pins.login("ana", "4821").unwrap(), user);
        assert!(matches!(
            pins.login("ana", "0000"),
            Err(EarningsError::Authentication(_))
        ));
        assert!(pins.login("luis", "4821").is_err());
    }

    #[test]
    fn pins_must_be_four_to_six_digits() {
        let store = MemoryRowStore::new();
        let pins = PinIdentity::new(&store);
        for bad in ["123", "1234567", "12a4", ""] {
            assert!(pins.register("ana", bad).is_err(), "{bad}");
        }
        assert!(pins.register("ana", "123456").is_ok());
        assert!(pins.register("ana", "9999").is_err());
    }

    #[test]
    fn federated_email_is_normalized_and_recorded_once() {
        let store = MemoryRowStore::new();
        let federated = FederatedIdentity::new(&store);
        let first = federated.resolve("  Ana@Example.com ").unwrap();
        let second = federated.resolve("ana@example.com").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "ana@example.com");
        assert_eq!(store.row_count(Collection::Users), 1);
        assert!(federated.resolve("not-an-email").is_err());
    }

    #[test]
    fn resolve_goes_through_login() {
        let store = MemoryRowStore::new();
        let pins = PinIdentity::new(&store);
        pins.register("ana", "4821").unwrap();
        let credentials = PinCredentials {
            alias: "ana".into(),
            pin: "4821".into(),
        };
        assert_eq!(pins.resolve(&credentials).unwrap().as_str(), "ana");
    }
}
