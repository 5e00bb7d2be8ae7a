//! Database schema definitions

use rusqlite::{params, Connection};
use tracing::info;

use crate::error::AppError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), AppError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        create_tables(conn)?;
        seed_reaction_prompts(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(AppError::Database(format!(
            "Database schema v{} is newer than supported v{}",
            current_version, SCHEMA_VERSION
        )));
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, AppError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    ).map_err(|e| AppError::Database(format!("Failed to create schema_version table: {}", e)))?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), AppError> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| AppError::Database(format!("Failed to clear schema_version: {}", e)))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])
        .map_err(|e| AppError::Database(format!("Failed to set schema_version: {}", e)))?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<(), AppError> {
    for (name, ddl) in [
        ("users", USERS_SCHEMA),
        ("categories", CATEGORIES_SCHEMA),
        ("reflections", REFLECTIONS_SCHEMA),
        ("social", SOCIAL_SCHEMA),
        ("reactions", REACTIONS_SCHEMA),
    ] {
        conn.execute_batch(ddl)
            .map_err(|e| AppError::Database(format!("Failed to create {} tables: {}", name, e)))?;
    }

    Ok(())
}

/// Default prompt for each reaction type
pub const DEFAULT_PROMPTS: [(&str, &str); 6] = [
    ("ask_me_about_this", "I'd love to hear more about this. What specifically would you like to discuss?"),
    ("similar_experience", "I've been through something similar. What helped me was..."),
    ("update_me", "I'm invested in your journey. How did this turn out?"),
    ("accountability_buddy", "I'm here to help you stay on track. What's your next step?"),
    ("different_angle", "Have you considered looking at this from a different perspective?"),
    ("favorite", "This one stayed with me. Thank you for sharing it."),
];

fn seed_reaction_prompts(conn: &Connection) -> Result<(), AppError> {
    for (reaction_type, prompt_text) in DEFAULT_PROMPTS {
        conn.execute(
            "INSERT OR IGNORE INTO reaction_prompts (reaction_type, prompt_text) VALUES (?, ?)",
            params![reaction_type, prompt_text],
        ).map_err(|e| AppError::Database(format!("Failed to seed reaction prompts: {}", e)))?;
    }
    Ok(())
}

const USERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
"#;

const CATEGORIES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    parent_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(user_id, name)
);

CREATE TABLE IF NOT EXISTS sub_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(category_id, name)
);

CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);
CREATE INDEX IF NOT EXISTS idx_sub_categories_category ON sub_categories(category_id);
"#;

const REFLECTIONS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS reflections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    sub_category_id INTEGER REFERENCES sub_categories(id) ON DELETE SET NULL,
    date TEXT NOT NULL DEFAULT (date('now')),
    reflection_text TEXT NOT NULL CHECK (length(reflection_text) <= 500),
    reflection_detail TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    is_private INTEGER NOT NULL DEFAULT 0,
    visibility TEXT NOT NULL DEFAULT 'private' CHECK (visibility IN ('private', 'public')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS actions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reflection_id INTEGER NOT NULL REFERENCES reflections(id) ON DELETE CASCADE,
    action TEXT NOT NULL CHECK (length(action) <= 200),
    priority TEXT NOT NULL DEFAULT 'Medium',
    status TEXT NOT NULL DEFAULT 'Pending' CHECK (status IN ('Pending', 'Done')),
    due_date TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS reflection_tracking (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reflection_id INTEGER NOT NULL REFERENCES reflections(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    reflected_date TEXT NOT NULL DEFAULT (date('now', 'localtime')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(reflection_id, user_id, reflected_date)
);

CREATE INDEX IF NOT EXISTS idx_reflections_author ON reflections(author_id);
CREATE INDEX IF NOT EXISTS idx_reflections_category ON reflections(category_id);
CREATE INDEX IF NOT EXISTS idx_reflections_visibility_created ON reflections(visibility, created_at);
CREATE INDEX IF NOT EXISTS idx_actions_reflection ON actions(reflection_id);
CREATE INDEX IF NOT EXISTS idx_tracking_user_date ON reflection_tracking(user_id, reflected_date);
"#;

const SOCIAL_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS friendships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    friend_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'accepted', 'rejected')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(user_id, friend_id)
);

CREATE INDEX IF NOT EXISTS idx_friendships_user ON friendships(user_id, status);
CREATE INDEX IF NOT EXISTS idx_friendships_friend ON friendships(friend_id, status);
CREATE UNIQUE INDEX IF NOT EXISTS idx_friendships_pair
    ON friendships(min(user_id, friend_id), max(user_id, friend_id));
"#;

const REACTIONS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS reflection_reactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reflection_id INTEGER NOT NULL REFERENCES reflections(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    reaction_type TEXT NOT NULL CHECK (reaction_type IN (
        'ask_me_about_this', 'similar_experience', 'update_me',
        'accountability_buddy', 'different_angle', 'favorite'
    )),
    comment_text TEXT CHECK (comment_text IS NULL OR length(comment_text) <= 100),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    UNIQUE(reflection_id, user_id, reaction_type)
);

CREATE TABLE IF NOT EXISTS reaction_prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reaction_type TEXT NOT NULL UNIQUE,
    prompt_text TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_reactions_reflection ON reflection_reactions(reflection_id);
"#;
