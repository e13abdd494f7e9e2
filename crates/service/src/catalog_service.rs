//! Service catalog: top-level services and their priced sub-services.
//!
//! Each service keeps a denormalized list of its sub-service names which the
//! write paths below maintain. Deleting a service removes its sub-services
//! first; the two deletes are separate statements.

use std::collections::HashMap;

use chrono::Utc;
use models::service::{self, TitleList};
use models::sub_service::{self, PriceType};
use models::validation;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewService {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSubService {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_type: Option<PriceType>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubServiceUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_type: Option<PriceType>,
    pub is_active: Option<bool>,
}

/// A service together with its sub-services, as shown on the public site.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub service: service::Model,
    pub sub_services: Vec<sub_service::Model>,
}

fn clean_description(v: Option<String>) -> Result<Option<String>, ServiceError> {
    validation::validate_optional(v.as_deref(), "description", validation::MAX_TEXT_LEN)?;
    Ok(v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

async fn title_taken(db: &DatabaseConnection, title: &str, except: Option<Uuid>) -> Result<bool, ServiceError> {
    let mut q = service::Entity::find().filter(service::Column::Title.eq(title));
    if let Some(id) = except {
        q = q.filter(service::Column::Id.ne(id));
    }
    Ok(q.one(db).await?.is_some())
}

/// Sub-service names are unique within their parent; the title list is keyed on them.
async fn sub_name_taken(
    db: &DatabaseConnection,
    service_id: Uuid,
    name: &str,
    except: Option<Uuid>,
) -> Result<bool, ServiceError> {
    let mut q = sub_service::Entity::find()
        .filter(sub_service::Column::ServiceId.eq(service_id))
        .filter(sub_service::Column::Name.eq(name));
    if let Some(id) = except {
        q = q.filter(sub_service::Column::Id.ne(id));
    }
    Ok(q.one(db).await?.is_some())
}

#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_service(db: &DatabaseConnection, input: NewService) -> Result<service::Model, ServiceError> {
    service::validate_title(&input.title)?;
    let title = input.title.trim().to_string();
    let description = clean_description(input.description)?;
    if title_taken(db, &title, None).await? {
        return Err(ServiceError::Conflict(format!("service '{title}' already exists")));
    }
    let now = Utc::now().fixed_offset();
    let am = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(description),
        sub_service_titles: Set(TitleList::default()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;
    info!(service_id = %created.id, "service_created");
    Ok(created)
}

pub async fn list_services(db: &DatabaseConnection) -> Result<Vec<service::Model>, ServiceError> {
    Ok(service::Entity::find().order_by_asc(service::Column::Title).all(db).await?)
}

pub async fn get_service(db: &DatabaseConnection, id: Uuid) -> Result<service::Model, ServiceError> {
    service::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))
}

#[instrument(skip(db, input))]
pub async fn update_service(
    db: &DatabaseConnection,
    id: Uuid,
    input: ServiceUpdate,
) -> Result<service::Model, ServiceError> {
    let current = get_service(db, id).await?;
    let mut am: service::ActiveModel = current.into();
    if let Some(title) = input.title {
        service::validate_title(&title)?;
        let title = title.trim().to_string();
        if title_taken(db, &title, Some(id)).await? {
            return Err(ServiceError::Conflict(format!("service '{title}' already exists")));
        }
        am.title = Set(title);
    }
    if input.description.is_some() {
        am.description = Set(clean_description(input.description)?);
    }
    am.updated_at = Set(Utc::now().fixed_offset());
    Ok(am.update(db).await?)
}

/// Remove a service and every sub-service under it. Returns how many
/// sub-services went with it.
#[instrument(skip(db))]
pub async fn delete_service(db: &DatabaseConnection, id: Uuid) -> Result<u64, ServiceError> {
    let svc = get_service(db, id).await?;
    let removed = sub_service::Entity::delete_many()
        .filter(sub_service::Column::ServiceId.eq(id))
        .exec(db)
        .await?
        .rows_affected;
    if let Err(e) = svc.delete(db).await {
        error!(service_id = %id, sub_services_removed = removed, err = %e, "service delete failed after sub-service cascade");
        return Err(e.into());
    }
    info!(service_id = %id, sub_services_removed = removed, "service_deleted");
    Ok(removed)
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_sub_service(
    db: &DatabaseConnection,
    service_id: Uuid,
    input: NewSubService,
) -> Result<sub_service::Model, ServiceError> {
    let parent = get_service(db, service_id).await?;
    sub_service::validate_name(&input.name)?;
    let price = input.price.ok_or_else(|| ServiceError::invalid("price is required"))?;
    sub_service::validate_price(price)?;
    let price_type = input.price_type.ok_or_else(|| ServiceError::invalid("priceType is required"))?;
    let description = clean_description(input.description)?;
    let name = input.name.trim().to_string();
    if sub_name_taken(db, service_id, &name, None).await? {
        return Err(ServiceError::Conflict(format!("sub-service '{name}' already exists")));
    }

    let now = Utc::now().fixed_offset();
    let am = sub_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(service_id),
        name: Set(name),
        description: Set(description),
        price: Set(price),
        price_type: Set(price_type),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;

    let mut titles = parent.sub_service_titles.clone();
    titles.push_unique(&created.name);
    save_titles(db, parent, titles).await?;
    info!(service_id = %service_id, sub_service_id = %created.id, "sub_service_created");
    Ok(created)
}

async fn save_titles(db: &DatabaseConnection, parent: service::Model, titles: TitleList) -> Result<(), ServiceError> {
    if parent.sub_service_titles == titles {
        return Ok(());
    }
    let mut am: service::ActiveModel = parent.into();
    am.sub_service_titles = Set(titles);
    am.updated_at = Set(Utc::now().fixed_offset());
    am.update(db).await?;
    Ok(())
}

pub async fn list_sub_services(
    db: &DatabaseConnection,
    service_id: Uuid,
) -> Result<Vec<sub_service::Model>, ServiceError> {
    let parent = get_service(db, service_id).await?;
    Ok(parent
        .find_related(sub_service::Entity)
        .order_by_asc(sub_service::Column::Name)
        .all(db)
        .await?)
}

/// A sub-service is only reachable through the service that owns it.
pub async fn get_sub_service(
    db: &DatabaseConnection,
    service_id: Uuid,
    sub_id: Uuid,
) -> Result<sub_service::Model, ServiceError> {
    get_service(db, service_id).await?;
    sub_service::Entity::find_by_id(sub_id)
        .filter(sub_service::Column::ServiceId.eq(service_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("sub-service"))
}

#[instrument(skip(db, input))]
pub async fn update_sub_service(
    db: &DatabaseConnection,
    service_id: Uuid,
    sub_id: Uuid,
    input: SubServiceUpdate,
) -> Result<sub_service::Model, ServiceError> {
    let current = get_sub_service(db, service_id, sub_id).await?;
    let old_name = current.name.clone();
    let mut am: sub_service::ActiveModel = current.into();
    if let Some(name) = input.name {
        sub_service::validate_name(&name)?;
        let name = name.trim().to_string();
        if sub_name_taken(db, service_id, &name, Some(sub_id)).await? {
            return Err(ServiceError::Conflict(format!("sub-service '{name}' already exists")));
        }
        am.name = Set(name);
    }
    if input.description.is_some() {
        am.description = Set(clean_description(input.description)?);
    }
    if let Some(price) = input.price {
        sub_service::validate_price(price)?;
        am.price = Set(price);
    }
    if let Some(pt) = input.price_type {
        am.price_type = Set(pt);
    }
    if let Some(active) = input.is_active {
        am.is_active = Set(active);
    }
    am.updated_at = Set(Utc::now().fixed_offset());
    let updated = am.update(db).await?;

    if updated.name != old_name {
        let parent = get_service(db, service_id).await?;
        let mut titles = parent.sub_service_titles.clone();
        titles.rename(&old_name, &updated.name);
        save_titles(db, parent, titles).await?;
    }
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete_sub_service(db: &DatabaseConnection, service_id: Uuid, sub_id: Uuid) -> Result<(), ServiceError> {
    let current = get_sub_service(db, service_id, sub_id).await?;
    let name = current.name.clone();
    current.delete(db).await?;

    let parent = get_service(db, service_id).await?;
    let mut titles = parent.sub_service_titles.clone();
    titles.remove(&name);
    save_titles(db, parent, titles).await?;
    info!(%service_id, %sub_id, "sub_service_deleted");
    Ok(())
}

/// Every service with its active sub-services, for the public site.
pub async fn public_catalog(db: &DatabaseConnection) -> Result<Vec<CatalogEntry>, ServiceError> {
    let services = list_services(db).await?;
    let subs = sub_service::Entity::find()
        .filter(sub_service::Column::IsActive.eq(true))
        .order_by_asc(sub_service::Column::Name)
        .all(db)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<sub_service::Model>> = HashMap::new();
    for s in subs {
        grouped.entry(s.service_id).or_default().push(s);
    }
    Ok(services
        .into_iter()
        .map(|svc| {
            let sub_services = grouped.remove(&svc.id).unwrap_or_default();
            CatalogEntry { service: svc, sub_services }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use sea_orm::PaginatorTrait;

    fn svc(title: &str) -> NewService {
        NewService { title: title.into(), description: Some("Full house moves".into()) }
    }

    fn sub(name: &str, price: f64) -> NewSubService {
        NewSubService { name: name.into(), price: Some(price), price_type: Some(PriceType::Fixed), ..Default::default() }
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let db = get_db().await.unwrap();
        create_service(&db, svc("House Removal")).await.unwrap();
        let err = create_service(&db, svc("House Removal")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let other = create_service(&db, svc("Packing")).await.unwrap();
        let rename = ServiceUpdate { title: Some("House Removal".into()), ..Default::default() };
        assert!(matches!(update_service(&db, other.id, rename).await, Err(ServiceError::Conflict(_))));
        // keeping its own title is fine
        let same = ServiceUpdate { title: Some("Packing".into()), ..Default::default() };
        update_service(&db, other.id, same).await.unwrap();
    }

    #[tokio::test]
    async fn sub_service_titles_follow_writes() {
        let db = get_db().await.unwrap();
        let s = create_service(&db, svc("House Removal")).await.unwrap();
        let a = create_sub_service(&db, s.id, sub("Two movers", 90.0)).await.unwrap();
        create_sub_service(&db, s.id, sub("Three movers", 120.0)).await.unwrap();
        assert_eq!(get_service(&db, s.id).await.unwrap().sub_service_titles.0, vec!["Two movers", "Three movers"]);

        let rename = SubServiceUpdate { name: Some("Two movers + van".into()), ..Default::default() };
        update_sub_service(&db, s.id, a.id, rename).await.unwrap();
        assert_eq!(get_service(&db, s.id).await.unwrap().sub_service_titles.0, vec!["Three movers", "Two movers + van"]);

        delete_sub_service(&db, s.id, a.id).await.unwrap();
        assert_eq!(get_service(&db, s.id).await.unwrap().sub_service_titles.0, vec!["Three movers"]);
    }

    #[tokio::test]
    async fn duplicate_sub_service_name_conflicts_within_parent() {
        let db = get_db().await.unwrap();
        let s = create_service(&db, svc("House Removal")).await.unwrap();
        let other = create_service(&db, svc("Office Move")).await.unwrap();
        let a = create_sub_service(&db, s.id, sub("Two movers", 90.0)).await.unwrap();
        let err = create_sub_service(&db, s.id, sub(" Two movers ", 95.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        // same name under another service is fine
        create_sub_service(&db, other.id, sub("Two movers", 150.0)).await.unwrap();

        let b = create_sub_service(&db, s.id, sub("Three movers", 120.0)).await.unwrap();
        let clash = SubServiceUpdate { name: Some("Two movers".into()), ..Default::default() };
        assert!(matches!(update_sub_service(&db, s.id, b.id, clash).await, Err(ServiceError::Conflict(_))));
        let keep = SubServiceUpdate { name: Some("Two movers".into()), price: Some(99.0), ..Default::default() };
        update_sub_service(&db, s.id, a.id, keep).await.unwrap();

        delete_sub_service(&db, s.id, a.id).await.unwrap();
        let titles = get_service(&db, s.id).await.unwrap().sub_service_titles.0;
        let rows: Vec<String> = list_sub_services(&db, s.id).await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(titles, rows);
        assert_eq!(titles, vec!["Three movers"]);
    }

    #[tokio::test]
    async fn sub_service_requires_existing_parent() {
        let db = get_db().await.unwrap();
        let err = create_sub_service(&db, Uuid::new_v4(), sub("Orphan", 10.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(matches!(list_sub_services(&db, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn sub_service_is_scoped_to_its_parent() {
        let db = get_db().await.unwrap();
        let a = create_service(&db, svc("House Removal")).await.unwrap();
        let b = create_service(&db, svc("Packing")).await.unwrap();
        let child = create_sub_service(&db, a.id, sub("Two movers", 90.0)).await.unwrap();
        assert!(get_sub_service(&db, a.id, child.id).await.is_ok());
        assert!(matches!(get_sub_service(&db, b.id, child.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn sub_service_validation() {
        let db = get_db().await.unwrap();
        let s = create_service(&db, svc("House Removal")).await.unwrap();
        assert!(matches!(create_sub_service(&db, s.id, sub("Neg", -5.0)).await, Err(ServiceError::Validation(_))));
        let no_type = NewSubService { name: "No type".into(), price: Some(5.0), ..Default::default() };
        assert!(matches!(create_sub_service(&db, s.id, no_type).await, Err(ServiceError::Validation(_))));
        assert!(list_sub_services(&db, s.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_cascades_to_sub_services() {
        let db = get_db().await.unwrap();
        let s = create_service(&db, svc("House Removal")).await.unwrap();
        let keep = create_service(&db, svc("Storage")).await.unwrap();
        for i in 0..3 {
            create_sub_service(&db, s.id, sub(&format!("Option {i}"), 10.0 * i as f64)).await.unwrap();
        }
        create_sub_service(&db, keep.id, sub("Monthly unit", 60.0)).await.unwrap();

        assert_eq!(delete_service(&db, s.id).await.unwrap(), 3);
        let left = sub_service::Entity::find()
            .filter(sub_service::Column::ServiceId.eq(s.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(left, 0);
        assert_eq!(list_sub_services(&db, keep.id).await.unwrap().len(), 1);
        assert!(matches!(delete_service(&db, s.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn public_catalog_hides_inactive() {
        let db = get_db().await.unwrap();
        let s = create_service(&db, svc("House Removal")).await.unwrap();
        create_service(&db, svc("Packing")).await.unwrap();
        create_sub_service(&db, s.id, sub("Two movers", 90.0)).await.unwrap();
        let hidden = NewSubService { is_active: Some(false), ..sub("Retired", 1.0) };
        create_sub_service(&db, s.id, hidden).await.unwrap();

        let catalog = public_catalog(&db).await.unwrap();
        assert_eq!(catalog.len(), 2);
        let house = catalog.iter().find(|e| e.service.id == s.id).unwrap();
        assert_eq!(house.sub_services.len(), 1);
        assert_eq!(house.sub_services[0].name, "Two movers");
        let json = serde_json::to_value(house).unwrap();
        assert_eq!(json["title"], "House Removal");
        assert_eq!(json["subServices"].as_array().unwrap().len(), 1);
    }
}
