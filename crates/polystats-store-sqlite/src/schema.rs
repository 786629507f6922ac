//! SQL schema for the PolyStats SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    group_name    TEXT NOT NULL,
    group_id      TEXT,            -- NULL until onboarding resolves it
    created_at    TEXT NOT NULL    -- RFC 3339 UTC
);

-- Only the SHA-256 digest of a bearer token is stored.
CREATE TABLE IF NOT EXISTS access_tokens (
    token_digest TEXT PRIMARY KEY,
    user_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activities (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id       INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
    name             TEXT NOT NULL,
    current_progress INTEGER NOT NULL DEFAULT 0,
    max_progress     INTEGER NOT NULL DEFAULT 1,
    CHECK (max_progress >= 1),
    CHECK (current_progress >= 0 AND current_progress <= max_progress)
);

CREATE INDEX IF NOT EXISTS access_tokens_user_idx ON access_tokens(user_id);
CREATE INDEX IF NOT EXISTS subjects_user_idx      ON subjects(user_id);
CREATE INDEX IF NOT EXISTS activities_subject_idx ON activities(subject_id);

PRAGMA user_version = 1;
";
