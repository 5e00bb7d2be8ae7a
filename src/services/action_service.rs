//! Action service - follow-up items attached to reflections

use std::sync::Arc;

use crate::db::actions::{self, DEFAULT_PRIORITY, STATUS_DONE, STATUS_PENDING};
use crate::db::{reflections, ActionRow, CreateActionInput, Database, UpdateActionInput};
use crate::error::AppError;

use super::{parse_date, require_id};

pub const MAX_ACTION_TEXT: usize = 200;

pub struct ActionService {
    db: Arc<Database>,
}

impl ActionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn get(&self, id: i64) -> Result<ActionRow, AppError> {
        require_id(id, "action")?;
        self.db
            .with_conn(|conn| actions::get_action(conn, id))?
            .ok_or_else(|| AppError::NotFound("action not found".into()))
    }

    /// Actions of one reflection, oldest first
    pub fn list_for_reflection(&self, reflection_id: i64) -> Result<Vec<ActionRow>, AppError> {
        require_id(reflection_id, "reflection")?;
        self.db.with_conn(|conn| actions::list_by_reflection(conn, reflection_id))
    }

    pub fn create(&self, input: CreateActionInput) -> Result<ActionRow, AppError> {
        let text = action_text(&input.action)?;
        require_id(input.reflection_id, "reflection")?;

        let priority = label_or(input.priority.as_deref(), DEFAULT_PRIORITY);
        let status = match input.status.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => check_status(value)?,
            _ => STATUS_PENDING,
        };
        let due_date = parse_due_date(input.due_date.as_deref())?;

        self.db.with_conn(|conn| {
            if reflections::get_reflection_author(conn, input.reflection_id)?.is_none() {
                return Err(AppError::NotFound("reflection not found".into()));
            }
            actions::create_action(conn, input.reflection_id, text, &priority, status, due_date.as_deref())
        })
    }

    /// Overwrite the action text. Fields left empty keep their stored value.
    pub fn update(&self, id: i64, input: UpdateActionInput) -> Result<ActionRow, AppError> {
        require_id(id, "action")?;
        let text = action_text(&input.action)?;
        let status = match input.status.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(check_status(value)?),
            _ => None,
        };
        let due = parse_due_date(input.due_date.as_deref())?;

        self.db.with_conn(|conn| {
            let existing = actions::get_action(conn, id)?
                .ok_or_else(|| AppError::NotFound("action not found".into()))?;

            let priority = label_or(input.priority.as_deref(), &existing.priority);
            let status = status.unwrap_or(existing.status.as_str());
            let due_date = due.as_deref().or(existing.due_date.as_deref());

            actions::update_action(conn, id, text, &priority, status, due_date)?
                .ok_or_else(|| AppError::NotFound("action not found".into()))
        })
    }

    /// Set the status to `Done` or `Pending`
    pub fn update_status(&self, id: i64, status: &str) -> Result<ActionRow, AppError> {
        require_id(id, "action")?;
        let status = check_status(status.trim())?;

        self.db
            .with_conn(|conn| actions::update_status(conn, id, status))?
            .ok_or_else(|| AppError::NotFound("action not found".into()))
    }

    pub fn complete(&self, id: i64) -> Result<ActionRow, AppError> {
        self.update_status(id, STATUS_DONE)
    }

    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        require_id(id, "action")?;
        if !self.db.with_conn(|conn| actions::delete_action(conn, id))? {
            return Err(AppError::NotFound("action not found".into()));
        }
        Ok(())
    }
}

fn action_text(value: &str) -> Result<&str, AppError> {
    let text = value.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("action text is required".into()));
    }
    if text.chars().count() > MAX_ACTION_TEXT {
        return Err(AppError::InvalidInput(format!(
            "action text must be at most {} characters",
            MAX_ACTION_TEXT
        )));
    }
    Ok(text)
}

fn check_status(value: &str) -> Result<&'static str, AppError> {
    match value {
        STATUS_DONE => Ok(STATUS_DONE),
        STATUS_PENDING => Ok(STATUS_PENDING),
        _ => Err(AppError::InvalidInput("status must be either 'Done' or 'Pending'".into())),
    }
}

fn label_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => fallback.to_string(),
    }
}

fn parse_due_date(value: Option<&str>) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        Some(date) if !date.is_empty() => Ok(Some(parse_date(date, "due date")?.to_string())),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert_eq!(check_status("Done").unwrap(), STATUS_DONE);
        assert_eq!(check_status("Pending").unwrap(), STATUS_PENDING);
        assert!(matches!(check_status("done"), Err(AppError::InvalidInput(_))));
        assert!(check_status("Blocked").is_err());
    }

    #[test]
    fn test_action_text_limits() {
        assert!(action_text("   ").is_err());
        assert_eq!(action_text(" call mom ").unwrap(), "call mom");
        assert!(action_text(&"x".repeat(MAX_ACTION_TEXT + 1)).is_err());
    }

    #[test]
    fn test_label_defaults() {
        assert_eq!(label_or(None, DEFAULT_PRIORITY), "Medium");
        assert_eq!(label_or(Some(" "), DEFAULT_PRIORITY), "Medium");
        assert_eq!(label_or(Some("High"), DEFAULT_PRIORITY), "High");
    }
}
