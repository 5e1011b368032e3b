use serde::{Deserialize, Serialize};

use crate::domain::common::UserId;

/// Registered user; federated identities carry no credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: UserId,
    pub credential_hash: Option<String>,
}

impl UserAccount {
    pub fn is_federated(&self) -> bool {
        self.credential_hash.is_none()
    }
}
