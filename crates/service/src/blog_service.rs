//! Blog posts addressed by slug. Drafts are only visible to admins.

use chrono::Utc;
use models::blog::{self, BlogStatus, Sections};
use models::validation;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPost {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub sections: Sections,
    pub status: Option<BlogStatus>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub sections: Option<Sections>,
    pub status: Option<BlogStatus>,
}

/// Which posts a caller may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    PublishedOnly,
    All,
}

async fn slug_taken(db: &DatabaseConnection, slug: &str, except: Option<Uuid>) -> Result<bool, ServiceError> {
    let mut q = blog::Entity::find().filter(blog::Column::Slug.eq(slug));
    if let Some(id) = except {
        q = q.filter(blog::Column::Id.ne(id));
    }
    Ok(q.one(db).await?.is_some())
}

fn clean_excerpt(v: Option<String>) -> Result<Option<String>, ServiceError> {
    validation::validate_optional(v.as_deref(), "excerpt", 500)?;
    Ok(v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Store a new post. Without an explicit slug one is derived from the title.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_post(db: &DatabaseConnection, author_id: Uuid, input: NewPost) -> Result<blog::Model, ServiceError> {
    blog::validate_title(&input.title)?;
    blog::validate_sections(&input.sections)?;
    let slug = blog::resolve_slug(&input.title, input.slug.as_deref())?;
    let excerpt = clean_excerpt(input.excerpt)?;
    if slug_taken(db, &slug, None).await? {
        return Err(ServiceError::Conflict(format!("slug '{slug}' is already in use")));
    }

    let status = input.status.unwrap_or_default();
    let now = Utc::now().fixed_offset();
    let am = blog::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title.trim().to_string()),
        slug: Set(slug),
        excerpt: Set(excerpt),
        sections: Set(input.sections),
        status: Set(status),
        author_id: Set(author_id),
        published_at: Set((status == BlogStatus::Published).then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;
    info!(slug = %created.slug, status = ?created.status, "post_created");
    Ok(created)
}

pub async fn list_posts(db: &DatabaseConnection, visibility: Visibility) -> Result<Vec<blog::Model>, ServiceError> {
    let mut q = blog::Entity::find();
    if visibility == Visibility::PublishedOnly {
        q = q
            .filter(blog::Column::Status.eq(BlogStatus::Published))
            .order_by_desc(blog::Column::PublishedAt);
    }
    Ok(q.order_by_desc(blog::Column::CreatedAt).all(db).await?)
}

/// A draft looks exactly like a missing post to public callers.
pub async fn get_post(db: &DatabaseConnection, slug: &str, visibility: Visibility) -> Result<blog::Model, ServiceError> {
    let post = blog::Entity::find()
        .filter(blog::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("post"))?;
    if visibility == Visibility::PublishedOnly && post.status != BlogStatus::Published {
        return Err(ServiceError::not_found("post"));
    }
    Ok(post)
}

#[instrument(skip(db, input))]
pub async fn update_post(db: &DatabaseConnection, slug: &str, input: PostUpdate) -> Result<blog::Model, ServiceError> {
    let current = get_post(db, slug, Visibility::All).await?;
    let id = current.id;
    let was_published = current.published_at.is_some();
    let mut am: blog::ActiveModel = current.into();

    if let Some(title) = input.title {
        blog::validate_title(&title)?;
        am.title = Set(title.trim().to_string());
    }
    if let Some(new_slug) = input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        validation::validate_slug(new_slug)?;
        if new_slug != slug && slug_taken(db, new_slug, Some(id)).await? {
            return Err(ServiceError::Conflict(format!("slug '{new_slug}' is already in use")));
        }
        am.slug = Set(new_slug.to_string());
    }
    if input.excerpt.is_some() {
        am.excerpt = Set(clean_excerpt(input.excerpt)?);
    }
    if let Some(sections) = input.sections {
        blog::validate_sections(&sections)?;
        am.sections = Set(sections);
    }
    let now = Utc::now().fixed_offset();
    if let Some(status) = input.status {
        am.status = Set(status);
        // first publication keeps its date across later edits
        if status == BlogStatus::Published && !was_published {
            am.published_at = Set(Some(now));
        }
    }
    am.updated_at = Set(now);
    Ok(am.update(db).await?)
}

pub async fn delete_post(db: &DatabaseConnection, slug: &str) -> Result<(), ServiceError> {
    let res = blog::Entity::delete_many()
        .filter(blog::Column::Slug.eq(slug))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("post"));
    }
    info!(%slug, "post_deleted");
    Ok(())
}
