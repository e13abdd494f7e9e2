//! Catalog entry. Its priced variants live in [`crate::sub_service`].

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{sub_service, validation};

/// Names of the sub-services under this Service, kept in sync by the catalog
/// write paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct TitleList(pub Vec<String>);

impl TitleList {
    pub fn push_unique(&mut self, title: &str) {
        if !self.0.iter().any(|t| t == title) {
            self.0.push(title.to_string());
        }
    }

    pub fn remove(&mut self, title: &str) { self.0.retain(|t| t != title); }

    pub fn rename(&mut self, from: &str, to: &str) {
        self.remove(from);
        self.push_unique(to);
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub sub_service_titles: TitleList,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    SubService,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::SubService => Entity::has_many(sub_service::Entity).into(),
        }
    }
}

impl Related<sub_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::SubService.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    validation::validate_required(title, "title", validation::MAX_TITLE_LEN)
}
