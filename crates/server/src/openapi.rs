//! Request body shapes for the generated API docs. The handlers deserialize
//! into the service crate's input types; these mirror their JSON form.

use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `up` or `down`
    pub database: String,
}

#[derive(ToSchema)]
pub struct SessionRequest {
    /// Identity-provider ID token. May be sent as a bearer header instead.
    pub token: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BookingRequestDoc {
    pub booking_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub move_date: Option<String>,
    pub service_id: Option<Uuid>,
    pub service_name: String,
    pub sub_service_id: Option<Uuid>,
    pub sub_service_name: Option<String>,
    pub sub_service_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BookingUpdateDoc {
    /// pending, confirmed, in_progress, completed or cancelled
    pub status: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub move_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ContactRequestDoc {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub service_required: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ServiceRequestDoc {
    pub title: String,
    pub description: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SubServiceRequestDoc {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    /// fixed, hourly or per_item
    pub price_type: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
pub struct SectionDoc {
    pub heading: Option<String>,
    pub body: String,
}

#[derive(ToSchema)]
pub struct PostRequestDoc {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub sections: Vec<SectionDoc>,
    /// draft or published
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct RoleRequestDoc {
    /// user or admin
    pub role: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::sign_in,
        crate::routes::auth::me,
        crate::routes::bookings::create,
        crate::routes::bookings::list,
        crate::routes::bookings::stats,
        crate::routes::bookings::get,
        crate::routes::bookings::update,
        crate::routes::bookings::delete,
        crate::routes::contacts::create,
        crate::routes::contacts::list,
        crate::routes::contacts::get,
        crate::routes::contacts::delete,
        crate::routes::catalog::public_catalog,
        crate::routes::catalog::create_service,
        crate::routes::catalog::list_services,
        crate::routes::catalog::get_service,
        crate::routes::catalog::update_service,
        crate::routes::catalog::delete_service,
        crate::routes::catalog::create_sub_service,
        crate::routes::catalog::list_sub_services,
        crate::routes::catalog::get_sub_service,
        crate::routes::catalog::update_sub_service,
        crate::routes::catalog::delete_sub_service,
        crate::routes::blog::list_published,
        crate::routes::blog::get_published,
        crate::routes::blog::list_all,
        crate::routes::blog::get_any,
        crate::routes::blog::create,
        crate::routes::blog::update,
        crate::routes::blog::delete,
        crate::routes::users::list,
        crate::routes::users::set_role,
    ),
    components(
        schemas(
            HealthResponse,
            SessionRequest,
            BookingRequestDoc,
            BookingUpdateDoc,
            ContactRequestDoc,
            ServiceRequestDoc,
            SubServiceRequestDoc,
            SectionDoc,
            PostRequestDoc,
            RoleRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "bookings"),
        (name = "contacts"),
        (name = "catalog"),
        (name = "blog"),
        (name = "users")
    )
)]
pub struct ApiDoc;
