use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use models::user::{self, Role};
use crate::errors::ServiceError;

/// Profile fields carried by a verified identity token.
#[derive(Clone, Debug)]
pub struct SignInProfile {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Look a user up by email (case-insensitive).
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>, ServiceError> {
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(user::normalize_email(email)))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found)
}

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))
}

/// Create the account on first sign-in, otherwise refresh name and picture.
/// The role of an existing account is never touched here.
#[instrument(skip(db, profile), fields(email = %profile.email))]
pub async fn upsert_on_sign_in(
    db: &DatabaseConnection,
    profile: &SignInProfile,
    role_if_new: Role,
) -> Result<user::Model, ServiceError> {
    let email = user::normalize_email(&profile.email);
    let name = profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    user::validate_name(&name)?;
    let now = Utc::now().fixed_offset();

    if let Some(existing) = find_by_email(db, &email).await? {
        if existing.name == name && existing.image == profile.image {
            return Ok(existing);
        }
        let mut am: user::ActiveModel = existing.into();
        am.name = Set(name);
        am.image = Set(profile.image.clone());
        am.updated_at = Set(now);
        return Ok(am.update(db).await?);
    }

    let am = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email.clone()),
        image: Set(profile.image.clone()),
        role: Set(role_if_new),
        created_at: Set(now),
        updated_at: Set(now),
    };
    match am.insert(db).await {
        Ok(created) => {
            info!(user_id = %created.id, role = created.role.as_str(), "user_created");
            Ok(created)
        }
        // a concurrent first sign-in won the insert
        Err(e) => match ServiceError::from(e) {
            ServiceError::Conflict(_) => find_by_email(db, &email).await?.ok_or_else(|| ServiceError::not_found("user")),
            other => Err(other),
        },
    }
}

/// All accounts, oldest first.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>, ServiceError> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(users)
}

/// Change a user's role. An admin may not demote their own account, which
/// keeps at least the acting admin in place.
#[instrument(skip(db))]
pub async fn set_role(db: &DatabaseConnection, actor_id: Uuid, target_id: Uuid, role: Role) -> Result<user::Model, ServiceError> {
    let target = get_user(db, target_id).await?;
    if actor_id == target_id && role != Role::Admin {
        return Err(ServiceError::invalid("admins cannot remove their own admin role"));
    }
    if target.role == role {
        return Ok(target);
    }
    let mut am: user::ActiveModel = target.into();
    am.role = Set(role);
    am.updated_at = Set(Utc::now().fixed_offset());
    let updated = am.update(db).await?;
    info!(%actor_id, user_id = %updated.id, role = role.as_str(), "user_role_changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn profile(email: &str, name: Option<&str>) -> SignInProfile {
        SignInProfile { email: email.into(), name: name.map(Into::into), image: None }
    }

    #[tokio::test]
    async fn first_sign_in_creates_then_refreshes() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let created = upsert_on_sign_in(&db, &profile("Jane@Example.com", Some("Jane")), Role::User).await?;
        assert_eq!(created.email, "jane@example.com");
        assert_eq!(created.role, Role::User);

        let again = upsert_on_sign_in(&db, &profile("jane@example.com", Some("Jane Doe")), Role::Admin).await?;
        assert_eq!(again.id, created.id);
        assert_eq!(again.name, "Jane Doe");
        // the role is only chosen on creation
        assert_eq!(again.role, Role::User);
        assert_eq!(list_users(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_name_falls_back_to_local_part() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let u = upsert_on_sign_in(&db, &profile("mover@example.com", None), Role::User).await?;
        assert_eq!(u.name, "mover");
        Ok(())
    }

    #[tokio::test]
    async fn admin_cannot_demote_self() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let admin = upsert_on_sign_in(&db, &profile("boss@example.com", Some("Boss")), Role::Admin).await?;
        let staff = upsert_on_sign_in(&db, &profile("staff@example.com", Some("Staff")), Role::User).await?;

        let err = set_role(&db, admin.id, admin.id, Role::User).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(get_user(&db, admin.id).await?.role, Role::Admin);

        let promoted = set_role(&db, admin.id, staff.id, Role::Admin).await?;
        assert_eq!(promoted.role, Role::Admin);
        assert!(matches!(set_role(&db, admin.id, Uuid::new_v4(), Role::User).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
