//! Booking intake, back-office edits and the dashboard figures.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use models::booking::{self, BookingStatus};
use models::validation;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Public booking form. Every field defaults so a missing one is reported as
/// a validation error instead of a body rejection.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBooking {
    pub booking_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub move_date: Option<NaiveDate>,
    pub service_id: Option<Uuid>,
    pub service_name: String,
    pub sub_service_id: Option<Uuid>,
    pub sub_service_name: Option<String>,
    pub sub_service_price: Option<f64>,
    pub notes: String,
}

/// Admin edit. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingUpdate {
    pub booking_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub move_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: Option<BookingStatus>,
}

#[derive(Clone, Debug, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    /// Case-insensitive substring over name, email, booking id and service name.
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueByStatus {
    pub status: BookingStatus,
    pub revenue: f64,
    pub bookings: i64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: u64,
    pub last_30_days: u64,
    pub this_month: u64,
    pub by_status: BTreeMap<BookingStatus, u64>,
    pub revenue_by_status: Vec<RevenueByStatus>,
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: BookingStatus,
    bookings: i64,
}

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    status: BookingStatus,
    revenue: Option<f64>,
    bookings: i64,
}

fn trimmed_opt(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn validate_new(input: &NewBooking) -> Result<Uuid, ServiceError> {
    validation::validate_required(&input.full_name, "fullName", validation::MAX_NAME_LEN)?;
    validation::validate_required(&input.email, "email", validation::MAX_EMAIL_LEN)?;
    validation::validate_email(&input.email)?;
    validation::validate_required(&input.phone, "phone", 32)?;
    validation::validate_phone(&input.phone)?;
    validation::validate_optional(input.from_address.as_deref(), "fromAddress", validation::MAX_ADDRESS_LEN)?;
    validation::validate_optional(input.to_address.as_deref(), "toAddress", validation::MAX_ADDRESS_LEN)?;
    let service_id = input.service_id.ok_or_else(|| ServiceError::invalid("serviceId is required"))?;
    validation::validate_required(&input.service_name, "serviceName", validation::MAX_TITLE_LEN)?;
    validation::validate_optional(input.sub_service_name.as_deref(), "subServiceName", validation::MAX_TITLE_LEN)?;
    if let Some(price) = input.sub_service_price {
        validation::validate_price(price, "subServicePrice")?;
    }
    validation::validate_notes(&input.notes)?;
    Ok(service_id)
}

async fn booking_id_taken(db: &DatabaseConnection, booking_id: &str) -> Result<bool, ServiceError> {
    let n = booking::Entity::find()
        .filter(booking::Column::BookingId.eq(booking_id))
        .count(db)
        .await?;
    Ok(n > 0)
}

/// Validate and store a booking submitted from the public form. The status
/// always starts at `pending`; a client-chosen booking id must be unused.
#[instrument(skip(db, input), fields(email = %input.email))]
pub async fn create_booking(db: &DatabaseConnection, input: NewBooking) -> Result<booking::Model, ServiceError> {
    let service_id = validate_new(&input)?;

    let booking_id = match trimmed_opt(input.booking_id) {
        Some(id) => {
            booking::validate_booking_id(&id)?;
            if booking_id_taken(db, &id).await? {
                return Err(ServiceError::Conflict(format!("booking {id} already exists")));
            }
            id
        }
        None => booking::generate_booking_id(Utc::now()),
    };

    let now = Utc::now().fixed_offset();
    let am = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking_id),
        full_name: Set(input.full_name.trim().to_string()),
        email: Set(input.email.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        from_address: Set(trimmed_opt(input.from_address)),
        to_address: Set(trimmed_opt(input.to_address)),
        move_date: Set(input.move_date),
        service_id: Set(service_id),
        service_name: Set(input.service_name.trim().to_string()),
        sub_service_id: Set(input.sub_service_id),
        sub_service_name: Set(trimmed_opt(input.sub_service_name)),
        sub_service_price: Set(input.sub_service_price),
        notes: Set(input.notes.trim().to_string()),
        status: Set(BookingStatus::Pending),
        submitted_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;
    common::metrics::BOOKINGS_CREATED_TOTAL.inc();
    info!(booking_id = %created.booking_id, service = %created.service_name, "booking_created");
    Ok(created)
}

pub async fn get_booking(db: &DatabaseConnection, booking_id: &str) -> Result<booking::Model, ServiceError> {
    booking::Entity::find()
        .filter(booking::Column::BookingId.eq(booking_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("booking"))
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn start_of_day(d: NaiveDate) -> chrono::DateTime<chrono::FixedOffset> {
    Utc.from_utc_datetime(&d.and_time(chrono::NaiveTime::MIN)).fixed_offset()
}

fn filter_condition(filter: &BookingFilter) -> Result<Condition, ServiceError> {
    let mut cond = Condition::all();
    if let Some(status) = filter.status {
        cond = cond.add(booking::Column::Status.eq(status));
    }
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if from > to {
            return Err(ServiceError::invalid("dateFrom must not be after dateTo"));
        }
    }
    if let Some(from) = filter.date_from {
        cond = cond.add(booking::Column::SubmittedAt.gte(start_of_day(from)));
    }
    if let Some(to) = filter.date_to {
        // inclusive end date
        let next = to.succ_opt().unwrap_or(to);
        cond = cond.add(booking::Column::SubmittedAt.lt(start_of_day(next)));
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        let mut any = Condition::any();
        for col in [
            booking::Column::FullName,
            booking::Column::Email,
            booking::Column::BookingId,
            booking::Column::ServiceName,
        ] {
            any = any.add(Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern.clone()).escape('\\')));
        }
        cond = cond.add(any);
    }
    Ok(cond)
}

/// Newest first.
#[instrument(skip(db))]
pub async fn list_bookings(
    db: &DatabaseConnection,
    filter: BookingFilter,
    pagination: Pagination,
) -> Result<Page<booking::Model>, ServiceError> {
    let (page_idx, per_page) = pagination.normalize();
    let paginator = booking::Entity::find()
        .filter(filter_condition(&filter)?)
        .order_by_desc(booking::Column::SubmittedAt)
        .order_by_desc(booking::Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, total, page_idx, per_page))
}

/// Apply an admin edit. The booking id is immutable and status changes must
/// follow the lifecycle.
#[instrument(skip(db, input))]
pub async fn update_booking(
    db: &DatabaseConnection,
    booking_id: &str,
    input: BookingUpdate,
) -> Result<booking::Model, ServiceError> {
    let current = get_booking(db, booking_id).await?;
    if let Some(requested) = input.booking_id.as_deref() {
        if requested.trim() != current.booking_id {
            return Err(ServiceError::invalid("bookingId cannot be changed"));
        }
    }
    let from_status = current.status;
    let mut am: booking::ActiveModel = current.into();

    if let Some(v) = input.full_name {
        validation::validate_required(&v, "fullName", validation::MAX_NAME_LEN)?;
        am.full_name = Set(v.trim().to_string());
    }
    if let Some(v) = input.email {
        validation::validate_email(&v)?;
        am.email = Set(v.trim().to_string());
    }
    if let Some(v) = input.phone {
        validation::validate_phone(&v)?;
        am.phone = Set(v.trim().to_string());
    }
    if let Some(v) = input.from_address {
        validation::validate_optional(Some(&v), "fromAddress", validation::MAX_ADDRESS_LEN)?;
        am.from_address = Set(trimmed_opt(Some(v)));
    }
    if let Some(v) = input.to_address {
        validation::validate_optional(Some(&v), "toAddress", validation::MAX_ADDRESS_LEN)?;
        am.to_address = Set(trimmed_opt(Some(v)));
    }
    if let Some(d) = input.move_date {
        am.move_date = Set(Some(d));
    }
    if let Some(v) = input.notes {
        validation::validate_notes(&v)?;
        am.notes = Set(v.trim().to_string());
    }
    if let Some(next) = input.status {
        from_status.check_transition(next)?;
        am.status = Set(next);
    }
    am.updated_at = Set(Utc::now().fixed_offset());
    let updated = am.update(db).await?;
    if updated.status != from_status {
        info!(booking_id = %updated.booking_id, from = %from_status, to = %updated.status, "booking_status_changed");
    }
    Ok(updated)
}

pub async fn delete_booking(db: &DatabaseConnection, booking_id: &str) -> Result<(), ServiceError> {
    let res = booking::Entity::delete_many()
        .filter(booking::Column::BookingId.eq(booking_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("booking"));
    }
    info!(%booking_id, "booking_deleted");
    Ok(())
}

/// Dashboard figures. Revenue only counts bookings that carry a positive
/// sub-service price.
#[instrument(skip(db))]
pub async fn booking_stats(db: &DatabaseConnection) -> Result<BookingStats, ServiceError> {
    let now = Utc::now();
    let total = booking::Entity::find().count(db).await?;
    let last_30_days = booking::Entity::find()
        .filter(booking::Column::SubmittedAt.gte((now - Duration::days(30)).fixed_offset()))
        .count(db)
        .await?;
    let month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .ok_or_else(|| ServiceError::Db("invalid calendar month".into()))?;
    let this_month = booking::Entity::find()
        .filter(booking::Column::SubmittedAt.gte(start_of_day(month_start)))
        .count(db)
        .await?;

    let mut by_status: BTreeMap<BookingStatus, u64> = BookingStatus::ALL.iter().map(|s| (*s, 0)).collect();
    let counts = booking::Entity::find()
        .select_only()
        .column(booking::Column::Status)
        .column_as(Expr::col(booking::Column::Id).count(), "bookings")
        .group_by(booking::Column::Status)
        .into_model::<StatusCountRow>()
        .all(db)
        .await?;
    for row in counts {
        by_status.insert(row.status, row.bookings.max(0) as u64);
    }

    let revenue_by_status = booking::Entity::find()
        .select_only()
        .column(booking::Column::Status)
        .column_as(Expr::col(booking::Column::SubServicePrice).sum(), "revenue")
        .column_as(Expr::col(booking::Column::Id).count(), "bookings")
        .filter(booking::Column::SubServicePrice.gt(0.0))
        .group_by(booking::Column::Status)
        .order_by_asc(booking::Column::Status)
        .into_model::<RevenueRow>()
        .all(db)
        .await?
        .into_iter()
        .map(|r| RevenueByStatus { status: r.status, revenue: r.revenue.unwrap_or(0.0), bookings: r.bookings })
        .collect();

    Ok(BookingStats { total, last_30_days, this_month, by_status, revenue_by_status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn sample(name: &str, price: Option<f64>) -> NewBooking {
        NewBooking {
            full_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: "+44 20 7946 0958".into(),
            from_address: Some("1 Old Road".into()),
            to_address: Some("2 New Street".into()),
            service_id: Some(Uuid::new_v4()),
            service_name: "House Removal".into(),
            sub_service_name: price.map(|_| "Two movers".into()),
            sub_service_price: price,
            notes: "Three bedroom house, piano in the lounge".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_pending_status() {
        let db = get_db().await.unwrap();
        let b = create_booking(&db, sample("Jane Doe", Some(120.0))).await.unwrap();
        assert!(b.booking_id.starts_with("BK-"));
        assert_eq!(b.status, BookingStatus::Pending);
        let fetched = get_booking(&db, &b.booking_id).await.unwrap();
        assert_eq!(fetched.id, b.id);
    }

    #[tokio::test]
    async fn duplicate_booking_id_conflicts_and_keeps_original() {
        let db = get_db().await.unwrap();
        let mut first = sample("Jane Doe", None);
        first.booking_id = Some("WEB-1001".into());
        create_booking(&db, first).await.unwrap();

        let mut second = sample("John Roe", None);
        second.booking_id = Some("WEB-1001".into());
        let err = create_booking(&db, second).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let kept = get_booking(&db, "WEB-1001").await.unwrap();
        assert_eq!(kept.full_name, "Jane Doe");
    }

    #[tokio::test]
    async fn invalid_input_persists_nothing() {
        let db = get_db().await.unwrap();
        let mut bad = sample("Jane Doe", None);
        bad.notes = "short".into();
        assert!(matches!(create_booking(&db, bad).await, Err(ServiceError::Validation(_))));

        let mut bad = sample("Jane Doe", None);
        bad.email = "jane-at-example".into();
        assert!(matches!(create_booking(&db, bad).await, Err(ServiceError::Validation(_))));

        let mut bad = sample("Jane Doe", None);
        bad.phone = "call me".into();
        assert!(matches!(create_booking(&db, bad).await, Err(ServiceError::Validation(_))));

        let mut bad = sample("Jane Doe", None);
        bad.service_id = None;
        assert!(matches!(create_booking(&db, bad).await, Err(ServiceError::Validation(_))));

        assert_eq!(booking::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn status_follows_lifecycle() {
        let db = get_db().await.unwrap();
        let b = create_booking(&db, sample("Jane Doe", None)).await.unwrap();

        let skip = BookingUpdate { status: Some(BookingStatus::Completed), ..Default::default() };
        assert!(matches!(update_booking(&db, &b.booking_id, skip).await, Err(ServiceError::Validation(_))));

        for next in [BookingStatus::Confirmed, BookingStatus::InProgress, BookingStatus::Completed] {
            let upd = BookingUpdate { status: Some(next), ..Default::default() };
            let after = update_booking(&db, &b.booking_id, upd).await.unwrap();
            assert_eq!(after.status, next);
        }

        let reopen = BookingUpdate { status: Some(BookingStatus::Pending), ..Default::default() };
        assert!(update_booking(&db, &b.booking_id, reopen).await.is_err());
    }

    #[tokio::test]
    async fn booking_id_is_immutable() {
        let db = get_db().await.unwrap();
        let b = create_booking(&db, sample("Jane Doe", None)).await.unwrap();
        let upd = BookingUpdate { booking_id: Some("OTHER-1".into()), ..Default::default() };
        assert!(matches!(update_booking(&db, &b.booking_id, upd).await, Err(ServiceError::Validation(_))));
        let same = BookingUpdate { booking_id: Some(b.booking_id.clone()), notes: Some("Now with a second piano".into()), ..Default::default() };
        let after = update_booking(&db, &b.booking_id, same).await.unwrap();
        assert_eq!(after.notes, "Now with a second piano");
    }

    #[tokio::test]
    async fn list_filters_by_status_and_search() {
        let db = get_db().await.unwrap();
        let jane = create_booking(&db, sample("Jane Doe", None)).await.unwrap();
        create_booking(&db, sample("John Roe", None)).await.unwrap();
        create_booking(&db, sample("Mary 100% Real", None)).await.unwrap();
        update_booking(&db, &jane.booking_id, BookingUpdate { status: Some(BookingStatus::Confirmed), ..Default::default() })
            .await
            .unwrap();

        let confirmed = list_bookings(
            &db,
            BookingFilter { status: Some(BookingStatus::Confirmed), ..Default::default() },
            Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(confirmed.total, 1);
        assert_eq!(confirmed.items[0].booking_id, jane.booking_id);

        let by_name = list_bookings(&db, BookingFilter { search: Some("JOHN".into()), ..Default::default() }, Pagination::default())
            .await
            .unwrap();
        assert_eq!(by_name.total, 1);
        assert_eq!(by_name.items[0].full_name, "John Roe");

        let by_email = list_bookings(&db, BookingFilter { search: Some("ROE@EXAMPLE".into()), ..Default::default() }, Pagination::default())
            .await
            .unwrap();
        assert_eq!(by_email.total, 1);
        assert_eq!(by_email.items[0].email, "john.roe@example.com");

        let mut web = sample("Web Customer", None);
        web.booking_id = Some("WEB-7731".into());
        create_booking(&db, web).await.unwrap();
        let by_id = list_bookings(&db, BookingFilter { search: Some("eb-77".into()), ..Default::default() }, Pagination::default())
            .await
            .unwrap();
        assert_eq!(by_id.total, 1);
        assert_eq!(by_id.items[0].booking_id, "WEB-7731");
        let by_generated_id = list_bookings(
            &db,
            BookingFilter { search: Some(jane.booking_id[3..].to_lowercase()), ..Default::default() },
            Pagination::default(),
        )
        .await
        .unwrap();
        assert_eq!(by_generated_id.total, 1);
        assert_eq!(by_generated_id.items[0].booking_id, jane.booking_id);

        let by_service = list_bookings(&db, BookingFilter { search: Some("removal".into()), ..Default::default() }, Pagination::default())
            .await
            .unwrap();
        assert_eq!(by_service.total, 4);

        // '%' matches literally, not as a wildcard
        let literal = list_bookings(&db, BookingFilter { search: Some("100%".into()), ..Default::default() }, Pagination::default())
            .await
            .unwrap();
        assert_eq!(literal.total, 1);
        let wildcard = list_bookings(&db, BookingFilter { search: Some("%".into()), ..Default::default() }, Pagination::default())
            .await
            .unwrap();
        assert_eq!(wildcard.total, 1);
    }

    #[tokio::test]
    async fn list_paginates_and_checks_date_range() {
        let db = get_db().await.unwrap();
        for i in 0..5 {
            create_booking(&db, sample(&format!("Person {i}"), None)).await.unwrap();
        }
        let page = list_bookings(&db, BookingFilter::default(), Pagination { page: 2, per_page: 2 }).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 2);

        let today = Utc::now().date_naive();
        let within = BookingFilter { date_from: Some(today), date_to: Some(today), ..Default::default() };
        assert_eq!(list_bookings(&db, within, Pagination::default()).await.unwrap().total, 5);

        let tomorrow = today.succ_opt().unwrap();
        let future = BookingFilter { date_from: Some(tomorrow), ..Default::default() };
        assert_eq!(list_bookings(&db, future, Pagination::default()).await.unwrap().total, 0);

        let inverted = BookingFilter { date_from: Some(tomorrow), date_to: Some(today), ..Default::default() };
        assert!(matches!(list_bookings(&db, inverted, Pagination::default()).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn stats_sum_positive_prices_per_status() {
        let db = get_db().await.unwrap();
        let a = create_booking(&db, sample("Ann A", Some(100.0))).await.unwrap();
        create_booking(&db, sample("Ben B", Some(50.5))).await.unwrap();
        create_booking(&db, sample("Cat C", Some(0.0))).await.unwrap();
        create_booking(&db, sample("Dan D", None)).await.unwrap();
        update_booking(&db, &a.booking_id, BookingUpdate { status: Some(BookingStatus::Confirmed), ..Default::default() })
            .await
            .unwrap();

        let stats = booking_stats(&db).await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.last_30_days, 4);
        assert_eq!(stats.this_month, 4);
        assert_eq!(stats.by_status[&BookingStatus::Pending], 3);
        assert_eq!(stats.by_status[&BookingStatus::Confirmed], 1);
        assert_eq!(stats.by_status[&BookingStatus::Cancelled], 0);

        let pending = stats.revenue_by_status.iter().find(|r| r.status == BookingStatus::Pending).unwrap();
        assert_eq!(pending.bookings, 1);
        assert!((pending.revenue - 50.5).abs() < f64::EPSILON);
        let confirmed = stats.revenue_by_status.iter().find(|r| r.status == BookingStatus::Confirmed).unwrap();
        assert!((confirmed.revenue - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn delete_then_missing() {
        let db = get_db().await.unwrap();
        let b = create_booking(&db, sample("Jane Doe", None)).await.unwrap();
        delete_booking(&db, &b.booking_id).await.unwrap();
        assert!(matches!(delete_booking(&db, &b.booking_id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(get_booking(&db, &b.booking_id).await, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn like_escaping() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
