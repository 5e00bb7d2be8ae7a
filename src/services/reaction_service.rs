//! Reaction service - typed acknowledgments on reflections

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::db::{reactions, reflections, Database, ReactionPromptRow, ReactionRow, ReactionType, ReactionView};
use crate::error::AppError;

use super::events::{DomainEvent, EventBus};
use super::require_id;

pub const MAX_COMMENT_CHARS: usize = 100;

/// Body of `POST /api/reactions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddReactionRequest {
    #[serde(default)]
    pub reaction_type: String,
    #[serde(default)]
    pub comment_text: Option<String>,
}

pub struct ReactionService {
    db: Arc<Database>,
    events: Arc<EventBus>,
}

impl ReactionService {
    pub fn new(db: Arc<Database>, events: Arc<EventBus>) -> Self {
        Self { db, events }
    }

    /// Add one reaction. The same user may stack different types on a
    /// reflection, but never the same type twice.
    pub fn add(&self, reflection_id: i64, user_id: i64, request: AddReactionRequest) -> Result<ReactionRow, AppError> {
        require_id(reflection_id, "reflection")?;
        require_id(user_id, "user")?;

        let reaction_type = parse_type(&request.reaction_type)?;
        let comment = request
            .comment_text
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if comment.is_some_and(|c| c.chars().count() > MAX_COMMENT_CHARS) {
            return Err(AppError::InvalidInput(format!(
                "comment must be at most {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        let row = self.db.with_conn(|conn| {
            if reflections::get_reflection_author(conn, reflection_id)?.is_none() {
                return Err(AppError::NotFound("reflection not found".into()));
            }
            if reactions::reaction_exists(conn, reflection_id, user_id, reaction_type)? {
                return Err(AppError::Conflict("reaction already exists".into()));
            }
            reactions::add_reaction(conn, reflection_id, user_id, reaction_type, comment)
        })?;

        self.events.emit(DomainEvent::ReactionAdded {
            reflection_id,
            user_id,
            reaction_type,
        });

        Ok(row)
    }

    pub fn remove(&self, reflection_id: i64, user_id: i64, reaction_type: &str) -> Result<(), AppError> {
        require_id(reflection_id, "reflection")?;
        require_id(user_id, "user")?;
        let reaction_type = parse_type(reaction_type)?;

        let removed = self
            .db
            .with_conn(|conn| reactions::remove_reaction(conn, reflection_id, user_id, reaction_type))?;
        if !removed {
            return Err(AppError::NotFound("reaction not found".into()));
        }

        self.events.emit(DomainEvent::ReactionRemoved {
            reflection_id,
            user_id,
            reaction_type,
        });
        Ok(())
    }

    /// All reactions on a reflection with reactor names, oldest first
    pub fn list(&self, reflection_id: i64) -> Result<Vec<ReactionView>, AppError> {
        require_id(reflection_id, "reflection")?;
        self.db.with_conn(|conn| reactions::list_for_reflection(conn, reflection_id))
    }

    /// Count per reaction type. Types nobody used are absent.
    pub fn counts(&self, reflection_id: i64) -> Result<BTreeMap<String, i64>, AppError> {
        require_id(reflection_id, "reflection")?;
        let counts = self.db.with_conn(|conn| reactions::count_by_type(conn, reflection_id))?;

        Ok(counts
            .into_iter()
            .map(|c| (c.reaction_type.as_str().to_string(), c.count))
            .collect())
    }

    /// The user's reaction on a reflection. `None` is a normal answer.
    pub fn user_reaction(&self, reflection_id: i64, user_id: i64) -> Result<Option<ReactionView>, AppError> {
        require_id(reflection_id, "reflection")?;
        require_id(user_id, "user")?;
        self.db.with_conn(|conn| reactions::get_user_reaction(conn, reflection_id, user_id))
    }

    /// Active prompts, ordered by reaction type
    pub fn prompts(&self) -> Result<Vec<ReactionPromptRow>, AppError> {
        self.db.with_conn(reactions::list_active_prompts)
    }
}

fn parse_type(value: &str) -> Result<ReactionType, AppError> {
    ReactionType::parse(value.trim())
        .ok_or_else(|| AppError::InvalidInput(format!("invalid reaction type: {}", value.trim())))
}
