//! Service layer
//!
//! Services sit between HTTP handlers and repositories. Each one:
//! - validates input before touching storage
//! - translates missing rows into `NotFound` where absence is an error
//! - emits a [`DomainEvent`] after every successful write
//!
//! ## Architecture
//!
//! ```text
//! HTTP Handlers (thin)
//!     ↓
//! Service Layer (business rules)
//!     ↓
//! Repository Layer (db/*.rs)
//!     ↓
//! SQLite Database
//! ```

pub mod action_service;
pub mod auth_service;
pub mod category_service;
pub mod events;
pub mod feed_service;
pub mod friendship_service;
pub mod reaction_service;
pub mod reflection_service;
pub mod response;
pub mod user_service;

pub use action_service::ActionService;
pub use auth_service::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
pub use category_service::CategoryService;
pub use events::{spawn_logging_listener, DomainEvent, EventBus};
pub use feed_service::{FeedService, Page};
pub use friendship_service::{FriendList, FriendshipService, PendingRequests};
pub use reaction_service::{AddReactionRequest, ReactionService};
pub use reflection_service::{ReflectionService, TrackingResult};
pub use user_service::{CreateUserRequest, UserService};

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::auth::JwtValidator;
use crate::db::Database;
use crate::error::AppError;

/// Service container for dependency injection
///
/// Holds all services with a shared database connection.
pub struct Services {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub categories: Arc<CategoryService>,
    pub reflections: Arc<ReflectionService>,
    pub actions: Arc<ActionService>,
    pub friendships: Arc<FriendshipService>,
    pub feed: Arc<FeedService>,
    pub reactions: Arc<ReactionService>,
    pub events: Arc<EventBus>,
}

impl Services {
    /// Create all services with shared database
    pub fn new(db: Arc<Database>, jwt: JwtValidator) -> Self {
        let events = Arc::new(EventBus::new());

        Self {
            auth: Arc::new(AuthService::new(db.clone(), events.clone(), jwt)),
            users: Arc::new(UserService::new(db.clone(), events.clone())),
            categories: Arc::new(CategoryService::new(db.clone())),
            reflections: Arc::new(ReflectionService::new(db.clone(), events.clone())),
            actions: Arc::new(ActionService::new(db.clone())),
            friendships: Arc::new(FriendshipService::new(db.clone(), events.clone())),
            feed: Arc::new(FeedService::new(db.clone())),
            reactions: Arc::new(ReactionService::new(db, events.clone())),
            events,
        }
    }
}

/// Reject non-positive identifiers before they reach storage
pub(crate) fn require_id(id: i64, what: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::InvalidInput(format!("invalid {} ID", what)));
    }
    Ok(())
}

/// Today's calendar date on the service's clock, in its local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a YYYY-MM-DD date
pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("invalid {}: expected YYYY-MM-DD", field)))
}
