use models::user::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims read from the identity provider's ID token. Audience and issuer
/// are checked by the verifier against the raw token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    pub exp: usize,
}

/// Who the token says the caller is. Accounts are keyed by email; the
/// subject is only logged at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Stored account (business view)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: Role,
}

impl Account {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

/// The caller as seen by the gate. A valid token without a stored account
/// resolves with no id and the `user` role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Option<Uuid>,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

impl From<Account> for Principal {
    fn from(a: Account) -> Self {
        Self { user_id: Some(a.id), email: a.email, name: Some(a.name), image: a.image, role: a.role }
    }
}

impl From<models::user::Model> for Account {
    fn from(u: models::user::Model) -> Self {
        Self { id: u.id, email: u.email, name: u.name, image: u.image, role: u.role }
    }
}
