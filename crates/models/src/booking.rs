use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Lifecycle of a booking.
///
/// `pending -> {confirmed, cancelled}`, `confirmed -> {in_progress,
/// cancelled}`, `in_progress -> {completed, cancelled}`. `completed` and
/// `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Re-applying the current status is allowed and changes nothing.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    pub fn check_transition(&self, next: BookingStatus) -> Result<(), ModelError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(ModelError::invalid(format!("cannot move booking from {self} to {next}")))
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub booking_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub move_date: Option<Date>,
    pub service_id: Uuid,
    pub service_name: String,
    pub sub_service_id: Option<Uuid>,
    pub sub_service_name: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub sub_service_price: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub status: BookingStatus,
    pub submitted_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

static BOOKING_ID_RE: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9-]{3,40}$").expect("booking id regex")
});

pub fn validate_booking_id(id: &str) -> Result<(), ModelError> {
    if !BOOKING_ID_RE.is_match(id) {
        return Err(ModelError::invalid("bookingId must be 3-40 letters, digits or '-'"));
    }
    Ok(())
}

/// `BK-YYYYMMDD-XXXXXX`, the suffix taken from a fresh v4 uuid.
pub fn generate_booking_id(now: chrono::DateTime<chrono::Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("BK-{}-{}", now.format("%Y%m%d"), suffix)
}
