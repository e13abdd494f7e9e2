use models::user::Role;
use sea_orm::DatabaseConnection;

use crate::auth::domain::{Account, Identity};
use crate::auth::errors::AuthError;
use crate::auth::repository::UserDirectory;
use crate::user_service::{self, SignInProfile};

pub struct SeaOrmUserDirectory {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl UserDirectory for SeaOrmUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let found = user_service::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(Account::from))
    }

    async fn upsert_on_sign_in(&self, identity: &Identity, role_if_new: Role) -> Result<Account, AuthError> {
        let profile = SignInProfile {
            email: identity.email.clone(),
            name: identity.name.clone(),
            image: identity.image.clone(),
        };
        let user = user_service::upsert_on_sign_in(&self.db, &profile, role_if_new)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Account::from(user))
    }
}
