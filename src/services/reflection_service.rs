//! Reflection service - journal entries, tracking toggle and analytics

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::db::reflections::ReflectionRecord;
use crate::db::{
    actions, categories, reflections, tracking, CategoryTrackingPoint, Database, ReflectionInput,
    ReflectionRow, TrackingPoint, Visibility,
};
use crate::error::AppError;

use super::events::{DomainEvent, EventBus};
use super::{parse_date, require_id, today};

pub const MAX_REFLECTION_TEXT: usize = 500;

/// Outcome of a tracking toggle
#[derive(Debug, Clone, Serialize)]
pub struct TrackingResult {
    pub reflection_id: i64,
    pub user_id: i64,
    pub date: String,
    /// Whether the day is tracked after the toggle
    pub reflected_today: bool,
    pub reflection_count: i64,
}

/// Reflection service
pub struct ReflectionService {
    db: Arc<Database>,
    events: Arc<EventBus>,
}

impl ReflectionService {
    pub fn new(db: Arc<Database>, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Get a reflection with category, actions and tracking state
    pub fn get(&self, id: i64) -> Result<ReflectionRow, AppError> {
        require_id(id, "reflection")?;
        let day = today().to_string();

        self.db.with_conn(|conn| {
            let row = reflections::get_reflection(conn, id)?
                .ok_or_else(|| AppError::NotFound("reflection not found".into()))?;
            enrich(conn, row, &day)
        })
    }

    /// All reflections of a user, newest date first
    pub fn list_for_user(&self, user_id: i64) -> Result<Vec<ReflectionRow>, AppError> {
        require_id(user_id, "user")?;
        let day = today().to_string();

        self.db.with_conn(|conn| {
            reflections::list_by_author(conn, user_id)?
                .into_iter()
                .map(|row| enrich(conn, row, &day))
                .collect()
        })
    }

    /// A user's reflections within one category
    pub fn list_by_category(&self, user_id: i64, category_id: i64) -> Result<Vec<ReflectionRow>, AppError> {
        require_id(user_id, "user")?;
        require_id(category_id, "category")?;
        let day = today().to_string();

        self.db.with_conn(|conn| {
            reflections::list_by_category(conn, user_id, category_id)?
                .into_iter()
                .map(|row| enrich(conn, row, &day))
                .collect()
        })
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    pub fn create(&self, input: ReflectionInput) -> Result<ReflectionRow, AppError> {
        require_id(input.author_id, "author")?;
        let day = today().to_string();

        let row = self.db.with_conn(|conn| {
            let record = validate(conn, input.author_id, input, &day)?;
            let row = reflections::create_reflection(conn, &record)?;
            enrich(conn, row, &day)
        })?;

        self.events.emit(DomainEvent::ReflectionCreated {
            id: row.id,
            author_id: row.author_id,
        });

        Ok(row)
    }

    pub fn update(&self, id: i64, input: ReflectionInput) -> Result<ReflectionRow, AppError> {
        require_id(id, "reflection")?;
        let day = today().to_string();

        let row = self.db.with_conn(|conn| {
            let author_id = reflections::get_reflection_author(conn, id)?
                .ok_or_else(|| AppError::NotFound("reflection not found".into()))?;
            let record = validate(conn, author_id, input, &day)?;
            let row = reflections::update_reflection(conn, id, &record)?
                .ok_or_else(|| AppError::NotFound("reflection not found".into()))?;
            enrich(conn, row, &day)
        })?;

        self.events.emit(DomainEvent::ReflectionUpdated { id });
        Ok(row)
    }

    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        require_id(id, "reflection")?;
        if !self.db.with_conn(|conn| reflections::delete_reflection(conn, id))? {
            return Err(AppError::NotFound("reflection not found".into()));
        }

        self.events.emit(DomainEvent::ReflectionDeleted { id });
        Ok(())
    }

    // =========================================================================
    // Tracking
    // =========================================================================

    /// Toggle today's "I revisited this" marker for the reflection's author
    pub fn track_reflection(&self, id: i64) -> Result<TrackingResult, AppError> {
        self.toggle_tracking(id, today())
    }

    /// Toggle the marker for an explicit calendar day.
    ///
    /// The tracking subject is always the reflection's author, never the caller.
    pub fn toggle_tracking(&self, id: i64, date: NaiveDate) -> Result<TrackingResult, AppError> {
        require_id(id, "reflection")?;
        let date = date.to_string();

        let result = self.db.with_conn_mut(|conn| {
            let author_id = reflections::get_reflection_author(conn, id)?
                .ok_or_else(|| AppError::NotFound("reflection not found".into()))?;

            let tracked = tracking::toggle_tracking(conn, id, author_id, &date)?;
            let reflection_count = tracking::count_tracked_days(conn, id, author_id)?;

            Ok(TrackingResult {
                reflection_id: id,
                user_id: author_id,
                date: date.clone(),
                reflected_today: tracked,
                reflection_count,
            })
        })?;

        info!(
            reflection_id = id,
            date = %result.date,
            tracked = result.reflected_today,
            "Reflection tracking toggled"
        );
        self.events.emit(DomainEvent::ReflectionTracked {
            id,
            user_id: result.user_id,
            date: result.date.clone(),
            tracked: result.reflected_today,
        });

        Ok(result)
    }

    /// Per-day tracking totals in [start, end]
    pub fn tracking_analytics(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrackingPoint>, AppError> {
        require_id(user_id, "user")?;
        check_range(start, end)?;

        self.db.with_conn(|conn| {
            tracking::tracking_by_date(conn, user_id, &start.to_string(), &end.to_string())
        })
    }

    /// Reflections written per day and category in [start, end]
    pub fn tracking_by_category(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategoryTrackingPoint>, AppError> {
        require_id(user_id, "user")?;
        check_range(start, end)?;

        self.db.with_conn(|conn| {
            tracking::reflections_by_category(conn, user_id, &start.to_string(), &end.to_string())
        })
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::InvalidRange("start date cannot be after end date".into()));
    }
    Ok(())
}

/// Attach actions and the author's tracking state
fn enrich(conn: &Connection, mut row: ReflectionRow, day: &str) -> Result<ReflectionRow, AppError> {
    row.actions = actions::list_by_reflection(conn, row.id)?;
    row.reflection_count = tracking::count_tracked_days(conn, row.id, row.author_id)?;
    row.reflected_today = tracking::is_tracked(conn, row.id, row.author_id, day)?;
    Ok(row)
}

/// Check required fields and resolve defaults into a writable record
fn validate(
    conn: &Connection,
    author_id: i64,
    input: ReflectionInput,
    today: &str,
) -> Result<ReflectionRecord, AppError> {
    let text = input.reflection_text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("reflection text is required".into()));
    }
    if text.chars().count() > MAX_REFLECTION_TEXT {
        return Err(AppError::InvalidInput(format!(
            "reflection text must be at most {} characters",
            MAX_REFLECTION_TEXT
        )));
    }
    if input.category_id <= 0 {
        return Err(AppError::InvalidInput("category is required".into()));
    }

    let category = categories::get_category(conn, input.category_id)?
        .ok_or_else(|| AppError::InvalidInput("category does not exist".into()))?;
    if category.user_id != author_id {
        return Err(AppError::InvalidInput("category belongs to another user".into()));
    }

    if let Some(sub_category_id) = input.sub_category_id {
        let sub_category = categories::get_sub_category(conn, sub_category_id)?
            .ok_or_else(|| AppError::InvalidInput("subcategory does not exist".into()))?;
        if sub_category.category_id != category.id {
            return Err(AppError::InvalidInput("subcategory does not belong to category".into()));
        }
    }

    let date = match input.date.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => parse_date(value, "date")?.to_string(),
        _ => today.to_string(),
    };

    let visibility = match input.visibility.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Visibility::parse(value).ok_or_else(|| {
            AppError::InvalidInput("visibility must be 'private' or 'public'".into())
        })?,
        _ if input.is_private => Visibility::Private,
        _ => Visibility::Public,
    };

    let tags = input
        .tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    Ok(ReflectionRecord {
        author_id,
        category_id: category.id,
        sub_category_id: input.sub_category_id,
        date,
        reflection_text: text.to_string(),
        reflection_detail: input.reflection_detail,
        tags,
        visibility,
    })
}
