use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequired {
    #[sea_orm(string_value = "house_removal")]
    HouseRemoval,
    #[sea_orm(string_value = "office_removal")]
    OfficeRemoval,
    #[sea_orm(string_value = "packing")]
    Packing,
    #[sea_orm(string_value = "storage")]
    Storage,
    #[sea_orm(string_value = "furniture_assembly")]
    FurnitureAssembly,
    #[sea_orm(string_value = "man_and_van")]
    ManAndVan,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ServiceRequired {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceRequired::HouseRemoval => "House removal",
            ServiceRequired::OfficeRemoval => "Office removal",
            ServiceRequired::Packing => "Packing",
            ServiceRequired::Storage => "Storage",
            ServiceRequired::FurnitureAssembly => "Furniture assembly",
            ServiceRequired::ManAndVan => "Man and van",
            ServiceRequired::Other => "Other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contacts")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub service_required: ServiceRequired,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
