use chrono::Utc;
use models::contact::{self, ServiceRequired};
use models::validation;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewContact {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub service_required: Option<ServiceRequired>,
}

fn validate(input: &NewContact) -> Result<ServiceRequired, ServiceError> {
    validation::validate_required(&input.fullname, "fullname", validation::MAX_NAME_LEN)?;
    validation::validate_required(&input.email, "email", validation::MAX_EMAIL_LEN)?;
    validation::validate_email(&input.email)?;
    validation::validate_required(&input.phone, "phone", 32)?;
    validation::validate_phone(&input.phone)?;
    validation::validate_required(&input.message, "message", validation::MAX_TEXT_LEN)?;
    input.service_required.ok_or_else(|| ServiceError::invalid("serviceRequired is required"))
}

#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_contact(db: &DatabaseConnection, input: NewContact) -> Result<contact::Model, ServiceError> {
    let service_required = validate(&input)?;
    let am = contact::ActiveModel {
        id: Set(Uuid::new_v4()),
        fullname: Set(input.fullname.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        message: Set(input.message.trim().to_string()),
        service_required: Set(service_required),
        created_at: Set(Utc::now().fixed_offset()),
    };
    let created = am.insert(db).await?;
    common::metrics::CONTACTS_CREATED_TOTAL.inc();
    info!(contact_id = %created.id, service = created.service_required.label(), "contact_created");
    Ok(created)
}

/// Newest first.
pub async fn list_contacts(db: &DatabaseConnection, pagination: Pagination) -> Result<Page<contact::Model>, ServiceError> {
    let (page_idx, per_page) = pagination.normalize();
    let paginator = contact::Entity::find()
        .order_by_desc(contact::Column::CreatedAt)
        .order_by_desc(contact::Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, total, page_idx, per_page))
}

pub async fn get_contact(db: &DatabaseConnection, id: Uuid) -> Result<contact::Model, ServiceError> {
    contact::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("contact"))
}

pub async fn delete_contact(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = contact::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("contact"));
    }
    Ok(())
}
