use async_trait::async_trait;
use models::user::Role;

use super::domain::{Account, Identity};
use super::errors::AuthError;

/// Account lookups the gate needs, kept behind a trait so the gate can be
/// exercised without a database.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;
    async fn upsert_on_sign_in(&self, identity: &Identity, role_if_new: Role) -> Result<Account, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockUserDirectory {
        accounts: Mutex<HashMap<String, Account>>, // key: lowercased email
    }

    impl MockUserDirectory {
        pub fn with_account(self, email: &str, role: Role) -> Self {
            let account = Account { id: Uuid::new_v4(), email: email.to_lowercase(), name: "Test".into(), image: None, role };
            self.accounts.lock().unwrap().insert(email.to_lowercase(), account);
            self
        }
    }

    #[async_trait]
    impl UserDirectory for MockUserDirectory {
        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
            Ok(self.accounts.lock().unwrap().get(&email.to_lowercase()).cloned())
        }

        async fn upsert_on_sign_in(&self, identity: &Identity, role_if_new: Role) -> Result<Account, AuthError> {
            let mut accounts = self.accounts.lock().unwrap();
            let key = identity.email.to_lowercase();
            let account = accounts.entry(key.clone()).or_insert_with(|| Account {
                id: Uuid::new_v4(),
                email: key,
                name: identity.name.clone().unwrap_or_default(),
                image: None,
                role: role_if_new,
            });
            if let Some(name) = &identity.name {
                account.name = name.clone();
            }
            account.image = identity.image.clone();
            Ok(account.clone())
        }
    }
}
