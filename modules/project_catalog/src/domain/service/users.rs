//! User accounts and credentials

use super::{already_exists, write_failed, Service};
use crate::contract::{CatalogError, NewUser, Principal, User, UserChanges};
use crate::domain::access;
use crate::domain::validation::{
    normalize_email, required_text, validate_password, validate_username, MAX_CHAR_LEN,
};

impl Service {
    /// Self-service registration of a regular account
    pub async fn register_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<User, CatalogError> {
        self.create_account(email, username, password, name, false).await
    }

    /// Create a staff account (operator tooling only)
    pub async fn create_staff_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<User, CatalogError> {
        self.create_account(email, username, password, name, true).await
    }

    async fn create_account(
        &self,
        email: &str,
        username: &str,
        password: &str,
        name: &str,
        staff: bool,
    ) -> Result<User, CatalogError> {
        let email = normalize_email(email)?;
        let username = validate_username(username)?;
        validate_password(password)?;
        let name = name.trim();
        if name.chars().count() > MAX_CHAR_LEN {
            return Err(CatalogError::validation(
                "name",
                format!("Ensure this field has no more than {} characters.", MAX_CHAR_LEN),
            ));
        }

        self.ensure_email_free(&email, None).await?;
        if self
            .repos
            .users
            .find_by_username(&username)
            .await
            .map_err(CatalogError::internal)?
            .is_some()
        {
            return Err(already_exists("user", "username"));
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .repos
            .users
            .create(&NewUser {
                email,
                username,
                name: name.to_string(),
                password_hash,
                is_staff: staff,
                is_superuser: staff,
            })
            .await
            .map_err(|e| write_failed(e, "user", &["username", "email"]))?;

        tracing::info!(user_id = user.id, staff, "user created");
        Ok(user)
    }

    /// Exchange username/password for a bearer token
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<String, CatalogError> {
        let user = self
            .repos
            .users
            .find_by_username(username.trim())
            .await
            .map_err(CatalogError::internal)?;

        // Unknown usernames still pay for one derivation
        let encoded = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.hasher.dummy_hash(),
        };
        let verified = self.verify_password(password, encoded).await?;

        let user = match user {
            Some(user) if user.is_active && verified => user,
            _ => {
                tracing::warn!(username, "token request with invalid credentials");
                return Err(CatalogError::validation(
                    "non_field_errors",
                    "Unable to log in with provided credentials.",
                ));
            }
        };

        self.tokens.issue(user.id).map_err(CatalogError::internal)
    }

    /// Resolve a bearer token to the calling principal
    pub async fn authenticate(&self, token: &str) -> Result<Principal, CatalogError> {
        let user_id = self
            .tokens
            .verify(token)
            .ok_or(CatalogError::Unauthenticated)?;

        match self
            .repos
            .users
            .find_by_id(user_id)
            .await
            .map_err(CatalogError::internal)?
        {
            Some(user) if user.is_active => Ok(Principal::from(&user)),
            _ => {
                tracing::warn!(user_id, "token for missing or inactive user");
                Err(CatalogError::Unauthenticated)
            }
        }
    }

    pub async fn current_user(&self, principal: &Principal) -> Result<User, CatalogError> {
        let actor = access::require_authenticated(principal)?;
        self.repos
            .users
            .find_by_id(actor.user_id)
            .await
            .map_err(CatalogError::internal)?
            .ok_or(CatalogError::Unauthenticated)
    }

    /// Update the caller's own profile
    pub async fn update_current_user(
        &self,
        principal: &Principal,
        email: Option<&str>,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, CatalogError> {
        let actor = access::require_authenticated(principal)?;

        let mut changes = UserChanges::default();
        if let Some(email) = email {
            let email = normalize_email(email)?;
            self.ensure_email_free(&email, Some(actor.user_id)).await?;
            changes.email = Some(email);
        }
        if let Some(name) = name {
            changes.name = Some(required_text("name", name, MAX_CHAR_LEN)?);
        }
        if let Some(password) = password {
            validate_password(password)?;
            changes.password_hash = Some(self.hash_password(password).await?);
        }

        self.repos
            .users
            .update(actor.user_id, &changes)
            .await
            .map_err(|e| write_failed(e, "user", &["email"]))?
            .ok_or(CatalogError::Unauthenticated)
    }

    /// Delete a user; their projects stay with no owner
    pub async fn delete_user(&self, principal: &Principal, user_id: i32) -> Result<(), CatalogError> {
        let actor = access::require_user_admin(principal, user_id)?;

        let deleted = self
            .repos
            .users
            .delete(user_id)
            .await
            .map_err(CatalogError::internal)?;
        if !deleted {
            return Err(CatalogError::not_found("user", user_id));
        }

        tracing::info!(user_id, by = actor.user_id, "user deleted");
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i32>) -> Result<(), CatalogError> {
        let existing = self
            .repos
            .users
            .find_by_email(email)
            .await
            .map_err(CatalogError::internal)?;
        match existing {
            Some(user) if Some(user.id) != except => Err(already_exists("user", "email")),
            _ => Ok(()),
        }
    }
}
