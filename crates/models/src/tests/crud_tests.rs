use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use uuid::Uuid;

use super::setup_test_db;
use crate::blog::{self, BlogStatus, Section, Sections};
use crate::booking::{self, BookingStatus};
use crate::service::{self, TitleList};
use crate::sub_service::{self, PriceType};

fn booking_am(booking_id: &str, price: Option<f64>) -> booking::ActiveModel {
    let now = Utc::now().into();
    booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking_id.to_string()),
        full_name: Set("Jane Doe".into()),
        email: Set("jane@example.com".into()),
        phone: Set("+44 20 7946 0958".into()),
        from_address: Set(None),
        to_address: Set(None),
        move_date: Set(None),
        service_id: Set(Uuid::new_v4()),
        service_name: Set("House removal".into()),
        sub_service_id: Set(None),
        sub_service_name: Set(None),
        sub_service_price: Set(price),
        notes: Set("Two bedroom flat on the third floor".into()),
        status: Set(BookingStatus::Pending),
        submitted_at: Set(now),
        updated_at: Set(now),
    }
}

#[tokio::test]
async fn booking_round_trip_keeps_status_and_price() -> Result<()> {
    let db = setup_test_db().await?;
    let created = booking_am("BK-1", Some(120.5)).insert(&db).await?;

    let found = booking::Entity::find()
        .filter(booking::Column::BookingId.eq("BK-1"))
        .one(&db)
        .await?
        .expect("booking stored");
    assert_eq!(found.id, created.id);
    assert_eq!(found.status, BookingStatus::Pending);
    assert_eq!(found.sub_service_price, Some(120.5));
    Ok(())
}

#[tokio::test]
async fn booking_id_unique_index_rejects_duplicates() -> Result<()> {
    let db = setup_test_db().await?;
    booking_am("BK-DUP", None).insert(&db).await?;
    let err = booking_am("BK-DUP", None).insert(&db).await.unwrap_err();
    assert!(matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))), "{err}");
    Ok(())
}

#[tokio::test]
async fn service_titles_and_children_round_trip() -> Result<()> {
    let db = setup_test_db().await?;
    let now = Utc::now().into();
    let svc = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Packing".into()),
        description: Set(None),
        sub_service_titles: Set(TitleList(vec!["Full pack".into()])),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await?;

    sub_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(svc.id),
        name: Set("Full pack".into()),
        description: Set(None),
        price: Set(250.0),
        price_type: Set(PriceType::Fixed),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await?;

    let stored = service::Entity::find_by_id(svc.id).one(&db).await?.expect("service stored");
    assert_eq!(stored.sub_service_titles.0, vec!["Full pack".to_string()]);

    let children = svc.find_related(sub_service::Entity).all(&db).await?;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].price_type, PriceType::Fixed);
    Ok(())
}

#[tokio::test]
async fn blog_sections_persist_as_json() -> Result<()> {
    let db = setup_test_db().await?;
    let now = Utc::now().into();
    let sections = Sections(vec![
        Section { heading: Some("Before".into()), body: "Label every box.".into() },
        Section { heading: None, body: "Keep a kit of essentials.".into() },
    ]);
    let post = blog::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Moving day".into()),
        slug: Set("moving-day".into()),
        excerpt: Set(None),
        sections: Set(sections.clone()),
        status: Set(BlogStatus::Draft),
        author_id: Set(Uuid::new_v4()),
        published_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await?;

    let stored = blog::Entity::find_by_id(post.id).one(&db).await?.expect("post stored");
    assert_eq!(stored.sections, sections);
    assert_eq!(stored.status, BlogStatus::Draft);
    Ok(())
}
