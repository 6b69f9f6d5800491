//! SQL schema for the SQLite recovery store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Check-ins are strictly append-only.
CREATE TABLE IF NOT EXISTS check_ins (
    check_in_id TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    date        TEXT NOT NULL,     -- RFC 3339 UTC, fixed-width micros
    urge_level  INTEGER NOT NULL CHECK (urge_level BETWEEN 0 AND 4),
    gambled     INTEGER NOT NULL,  -- 0 | 1
    amount      TEXT,              -- decimal string; NULL unless gambled
    notes       TEXT,
    created_at  TEXT NOT NULL,
    CHECK (amount IS NULL OR gambled = 1)
);

-- One goal per user; saving replaces.
CREATE TABLE IF NOT EXISTS goals (
    user_id     TEXT PRIMARY KEY,
    target_days INTEGER NOT NULL CHECK (target_days >= 1),
    reason      TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- One plan per user; list columns hold compact JSON.
CREATE TABLE IF NOT EXISTS plans (
    user_id          TEXT PRIMARY KEY,
    triggers         TEXT NOT NULL DEFAULT '[]',
    if_then          TEXT NOT NULL DEFAULT '[]',
    support_contacts TEXT NOT NULL DEFAULT '[]',
    updated_at       TEXT NOT NULL
);

-- Telemetry; append-only, read back only for diagnostics.
CREATE TABLE IF NOT EXISTS events (
    event_id  TEXT PRIMARY KEY,
    user_id   TEXT NOT NULL,
    type      TEXT NOT NULL,
    metadata  TEXT NOT NULL DEFAULT '{}',
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS check_ins_user_date_idx ON check_ins(user_id, date);
CREATE INDEX IF NOT EXISTS events_user_idx         ON events(user_id);

PRAGMA user_version = 1;
";
