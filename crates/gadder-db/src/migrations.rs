use rusqlite::Connection;
use tracing::info;

use crate::StoreError;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        // No foreign keys: references are checked by lookup, and participant
        // rows are allowed to outlive the user or event they point at.
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                first_name  TEXT NOT NULL DEFAULT '',
                last_name   TEXT NOT NULL DEFAULT '',
                email       TEXT NOT NULL DEFAULT '',
                avatar      TEXT NOT NULL DEFAULT '',
                bio         TEXT NOT NULL DEFAULT '',
                facebook_id TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE UNIQUE INDEX idx_users_facebook_id ON users(facebook_id);

            CREATE TABLE sessions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            -- One canonical session per user; concurrent get-or-create
            -- attempts collide here instead of leaving duplicates behind.
            CREATE UNIQUE INDEX idx_sessions_user ON sessions(user_id);

            CREATE TABLE events (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                title           TEXT NOT NULL DEFAULT '',
                description     TEXT NOT NULL DEFAULT '',
                picture_url     TEXT NOT NULL DEFAULT '',
                privacy_level   INTEGER NOT NULL DEFAULT 0,
                lon             REAL NOT NULL DEFAULT 0,
                lat             REAL NOT NULL DEFAULT 0,
                start_date      TEXT NOT NULL,
                end_date        TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_events_user ON events(user_id, created_at);
            CREATE INDEX idx_events_created ON events(created_at);

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                event_id    TEXT NOT NULL,
                content     TEXT NOT NULL DEFAULT '',
                refs        TEXT NOT NULL DEFAULT '',
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_messages_user ON messages(user_id, created_at);
            CREATE INDEX idx_messages_event ON messages(event_id, created_at);

            CREATE TABLE participants (
                id              TEXT PRIMARY KEY,
                event_id        TEXT NOT NULL,
                user_id         TEXT NOT NULL,
                request_status  TEXT NOT NULL DEFAULT '',
                response_status TEXT NOT NULL DEFAULT '',
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_participants_event ON participants(event_id, created_at);
            CREATE INDEX idx_participants_user ON participants(user_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
