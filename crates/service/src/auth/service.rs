use std::sync::Arc;

use configs::AuthConfig;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use models::user::Role;
use models::validation::validate_email;
use tracing::{debug, info, instrument, warn};

use super::domain::{Account, IdTokenClaims, Identity, Principal};
use super::errors::AuthError;
use super::repository::UserDirectory;

/// Checks ID tokens issued by the identity provider: HS256 signed with the
/// client secret, audience equal to the client id (when one is configured),
/// optional issuer, unexpired.
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(cfg: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        let client_id = cfg.client_id.trim();
        if client_id.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&[client_id]);
        }
        if let Some(iss) = cfg.issuer.as_deref() {
            validation.set_issuer(&[iss]);
        }
        Self { key: DecodingKey::from_secret(cfg.client_secret.as_bytes()), validation }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<IdTokenClaims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;
        validate_email(&claims.email).map_err(|_| AuthError::InvalidToken("email claim is not an address".into()))?;
        Ok(Identity { subject: claims.sub, email: claims.email, name: claims.name, image: claims.picture })
    }
}

/// Access gate business service independent of web framework
pub struct AccessGate<R: UserDirectory> {
    repo: Arc<R>,
    verifier: SessionVerifier,
    admin_emails: Vec<String>,
}

impl<R: UserDirectory> AccessGate<R> {
    pub fn new(repo: Arc<R>, cfg: &AuthConfig) -> Self {
        let admin_emails = cfg.admin_emails.iter().map(|e| e.trim().to_lowercase()).collect();
        Self { repo, verifier: SessionVerifier::new(cfg), admin_emails }
    }

    fn role_for_new_account(&self, email: &str) -> Role {
        if self.admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email.trim())) {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Record a sign-in: create the account on first use, refresh its profile
    /// otherwise. Addresses listed in `admin_emails` start out as admins.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AccessGate, repository::mock::MockUserDirectory};
    /// use std::sync::Arc;
    /// let cfg = configs::AuthConfig { client_secret: "secret".into(), admin_emails: vec!["boss@example.com".into()], ..Default::default() };
    /// let gate = AccessGate::new(Arc::new(MockUserDirectory::default()), &cfg);
    /// let claims = serde_json::json!({"sub": "1", "email": "boss@example.com", "exp": 4_102_444_800u64});
    /// let token = jsonwebtoken::encode(&Default::default(), &claims, &jsonwebtoken::EncodingKey::from_secret(b"secret")).unwrap();
    /// let account = tokio_test::block_on(gate.sign_in(&token)).unwrap();
    /// assert!(account.is_admin());
    /// ```
    #[instrument(skip(self, token))]
    pub async fn sign_in(&self, token: &str) -> Result<Account, AuthError> {
        let identity = self.verifier.verify(token)?;
        let role = self.role_for_new_account(&identity.email);
        let account = self.repo.upsert_on_sign_in(&identity, role).await?;
        info!(user_id = %account.id, subject = %identity.subject, role = account.role.as_str(), "user_signed_in");
        Ok(account)
    }

    /// Resolve the caller. The stored account, when there is one, supplies
    /// the role.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let token = token.filter(|t| !t.trim().is_empty()).ok_or(AuthError::MissingToken)?;
        let identity = self.verifier.verify(token).map_err(|e| {
            debug!(err = %e, "token rejected");
            e
        })?;
        match self.repo.find_by_email(&identity.email).await? {
            Some(account) => Ok(Principal::from(account)),
            None => Ok(Principal {
                user_id: None,
                email: identity.email,
                name: identity.name,
                image: identity.image,
                role: Role::User,
            }),
        }
    }

    /// Admit only callers resolving to the admin role.
    pub async fn require_admin(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let principal = self.resolve(token).await?;
        if !principal.is_admin() {
            warn!(email = %principal.email, "admin route refused for non-admin");
            return Err(AuthError::NotAdmin);
        }
        Ok(principal)
    }
}
