use gadder_types::models::{Event, GeoPoint, Message, Participant, Session, User};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use uuid::Uuid;

use crate::Database;
use crate::store::{
    EventFilter, MessageFilter, ParticipantFilter, RecordStore, StoreError, Window,
};

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, avatar, bio, facebook_id, created_at, updated_at";
const SESSION_COLUMNS: &str = "id, user_id, created_at, updated_at";
const EVENT_COLUMNS: &str = "id, user_id, title, description, picture_url, privacy_level, \
     lon, lat, start_date, end_date, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, user_id, event_id, content, refs, created_at, updated_at";
const PARTICIPANT_COLUMNS: &str =
    "id, event_id, user_id, request_status, response_status, created_at, updated_at";

/// Ids bound per `IN (...)` lookup.
const ID_BATCH: usize = 500;

// Stable creation order: rowid breaks timestamp ties in insertion order.
const ORDER: &str = "ORDER BY created_at ASC, rowid ASC";

impl RecordStore for Database {
    // -- Users --

    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
            query_one(conn, &sql, [id.to_string()], user_from_row)
        })
    }

    fn users_by_facebook_id(&self, facebook_id: &str) -> Result<Vec<User>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE facebook_id = ?1 {}",
                USER_COLUMNS, ORDER
            );
            query_list(conn, &sql, [facebook_id], user_from_row)
        })
    }

    fn get_users(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        self.with_conn(|conn| query_by_ids(conn, "users", USER_COLUMNS, ids, user_from_row))
    }

    fn list_users(&self, window: Window) -> Result<Vec<User>, StoreError> {
        let (limit, offset) = sql_window(window);
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users {} LIMIT ?1 OFFSET ?2",
                USER_COLUMNS, ORDER
            );
            query_list(conn, &sql, params![limit, offset], user_from_row)
        })
    }

    fn insert_user(&self, user: &User) -> Result<User, StoreError> {
        let mut user = user.clone();
        user.id = assign_id(user.id);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, first_name, last_name, email, avatar, bio, facebook_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    user.id.to_string(),
                    user.first_name,
                    user.last_name,
                    user.email,
                    user.avatar,
                    user.bio,
                    user.facebook_id,
                    user.created_at,
                    user.updated_at,
                ],
            )?;
            Ok(())
        })?;

        Ok(user)
    }

    fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET first_name = ?2, last_name = ?3, email = ?4, avatar = ?5, bio = ?6, updated_at = ?7
                 WHERE id = ?1",
                params![
                    user.id.to_string(),
                    user.first_name,
                    user.last_name,
                    user.email,
                    user.avatar,
                    user.bio,
                    user.updated_at,
                ],
            )?;
            Ok(n > 0)
        })
    }

    fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_conn(|conn| delete_by(conn, "users", "id", id).map(|n| n > 0))
    }

    // -- Sessions --

    fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS);
            query_one(conn, &sql, [id.to_string()], session_from_row)
        })
    }

    fn sessions_by_user(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM sessions WHERE user_id = ?1 {}",
                SESSION_COLUMNS, ORDER
            );
            query_list(conn, &sql, [user_id.to_string()], session_from_row)
        })
    }

    fn insert_session(&self, session: &Session) -> Result<Session, StoreError> {
        let mut session = session.clone();
        session.id = assign_id(session.id);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.id.to_string(),
                    session.user_id.to_string(),
                    session.created_at,
                    session.updated_at,
                ],
            )?;
            Ok(())
        })?;

        Ok(session)
    }

    // -- Events --

    fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS);
            query_one(conn, &sql, [id.to_string()], event_from_row)
        })
    }

    fn get_events(&self, ids: &[Uuid]) -> Result<Vec<Event>, StoreError> {
        self.with_conn(|conn| query_by_ids(conn, "events", EVENT_COLUMNS, ids, event_from_row))
    }

    fn list_events(&self, filter: EventFilter, window: Window) -> Result<Vec<Event>, StoreError> {
        let (limit, offset) = sql_window(window);
        self.with_conn(|conn| match filter {
            EventFilter::All => {
                let sql = format!(
                    "SELECT {} FROM events {} LIMIT ?1 OFFSET ?2",
                    EVENT_COLUMNS, ORDER
                );
                query_list(conn, &sql, params![limit, offset], event_from_row)
            }
            EventFilter::Owner(user_id) => {
                let sql = format!(
                    "SELECT {} FROM events WHERE user_id = ?1 {} LIMIT ?2 OFFSET ?3",
                    EVENT_COLUMNS, ORDER
                );
                query_list(
                    conn,
                    &sql,
                    params![user_id.to_string(), limit, offset],
                    event_from_row,
                )
            }
        })
    }

    fn insert_event(&self, event: &Event) -> Result<Event, StoreError> {
        let mut event = event.clone();
        event.id = assign_id(event.id);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, user_id, title, description, picture_url, privacy_level, lon, lat, start_date, end_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    event.id.to_string(),
                    event.owner_user_id.to_string(),
                    event.title,
                    event.description,
                    event.picture_url,
                    event.privacy_level,
                    event.location.lon,
                    event.location.lat,
                    event.start_date,
                    event.end_date,
                    event.created_at,
                    event.updated_at,
                ],
            )?;
            Ok(())
        })?;

        Ok(event)
    }

    fn update_event(&self, event: &Event) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE events SET title = ?2, description = ?3, picture_url = ?4, privacy_level = ?5,
                     lon = ?6, lat = ?7, start_date = ?8, end_date = ?9, updated_at = ?10
                 WHERE id = ?1",
                params![
                    event.id.to_string(),
                    event.title,
                    event.description,
                    event.picture_url,
                    event.privacy_level,
                    event.location.lon,
                    event.location.lat,
                    event.start_date,
                    event.end_date,
                    event.updated_at,
                ],
            )?;
            Ok(n > 0)
        })
    }

    fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_conn(|conn| delete_by(conn, "events", "id", id).map(|n| n > 0))
    }

    fn delete_events_by_owner(&self, user_id: Uuid) -> Result<usize, StoreError> {
        self.with_conn(|conn| delete_by(conn, "events", "user_id", user_id))
    }

    // -- Messages --

    fn get_message(&self, id: Uuid) -> Result<Option<Message>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS);
            query_one(conn, &sql, [id.to_string()], message_from_row)
        })
    }

    fn list_messages(
        &self,
        filter: MessageFilter,
        window: Window,
    ) -> Result<Vec<Message>, StoreError> {
        let (limit, offset) = sql_window(window);
        let (column, value) = match filter {
            MessageFilter::Owner(id) => ("user_id", id),
            MessageFilter::Event(id) => ("event_id", id),
        };
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM messages WHERE {} = ?1 {} LIMIT ?2 OFFSET ?3",
                MESSAGE_COLUMNS, column, ORDER
            );
            query_list(
                conn,
                &sql,
                params![value.to_string(), limit, offset],
                message_from_row,
            )
        })
    }

    fn insert_message(&self, message: &Message) -> Result<Message, StoreError> {
        let mut message = message.clone();
        message.id = assign_id(message.id);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, user_id, event_id, content, refs, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    message.id.to_string(),
                    message.owner_user_id.to_string(),
                    message.event_id.to_string(),
                    message.content,
                    message.references,
                    message.created_at,
                    message.updated_at,
                ],
            )?;
            Ok(())
        })?;

        Ok(message)
    }

    fn update_message(&self, message: &Message) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE messages SET content = ?2, refs = ?3, updated_at = ?4 WHERE id = ?1",
                params![
                    message.id.to_string(),
                    message.content,
                    message.references,
                    message.updated_at,
                ],
            )?;
            Ok(n > 0)
        })
    }

    fn delete_message(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_conn(|conn| delete_by(conn, "messages", "id", id).map(|n| n > 0))
    }

    fn delete_messages_by_owner(&self, user_id: Uuid) -> Result<usize, StoreError> {
        self.with_conn(|conn| delete_by(conn, "messages", "user_id", user_id))
    }

    // -- Participants --

    fn get_participant(&self, id: Uuid) -> Result<Option<Participant>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM participants WHERE id = ?1",
                PARTICIPANT_COLUMNS
            );
            query_one(conn, &sql, [id.to_string()], participant_from_row)
        })
    }

    fn list_participants(
        &self,
        filter: ParticipantFilter,
        window: Window,
    ) -> Result<Vec<Participant>, StoreError> {
        let (limit, offset) = sql_window(window);
        let (column, value) = match filter {
            ParticipantFilter::User(id) => ("user_id", id),
            ParticipantFilter::Event(id) => ("event_id", id),
        };
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM participants WHERE {} = ?1 {} LIMIT ?2 OFFSET ?3",
                PARTICIPANT_COLUMNS, column, ORDER
            );
            query_list(
                conn,
                &sql,
                params![value.to_string(), limit, offset],
                participant_from_row,
            )
        })
    }

    fn insert_participant(&self, participant: &Participant) -> Result<Participant, StoreError> {
        let mut participant = participant.clone();
        participant.id = assign_id(participant.id);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO participants (id, event_id, user_id, request_status, response_status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    participant.id.to_string(),
                    participant.event_id.to_string(),
                    participant.user_id.to_string(),
                    participant.request_status,
                    participant.response_status,
                    participant.created_at,
                    participant.updated_at,
                ],
            )?;
            Ok(())
        })?;

        Ok(participant)
    }

    fn update_participant(&self, participant: &Participant) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE participants SET request_status = ?2, response_status = ?3, updated_at = ?4
                 WHERE id = ?1",
                params![
                    participant.id.to_string(),
                    participant.request_status,
                    participant.response_status,
                    participant.updated_at,
                ],
            )?;
            Ok(n > 0)
        })
    }

    fn delete_participant(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_conn(|conn| delete_by(conn, "participants", "id", id).map(|n| n > 0))
    }
}

// -- Query helpers --

fn query_one<T, P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    Ok(stmt.query_row(params, map).optional()?)
}

fn query_list<T, P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Batch lookup with a single `IN (...)` query, so a page of references costs
/// one round-trip per table instead of one per row.
fn query_by_ids<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    ids: &[Uuid],
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut rows = Vec::with_capacity(ids.len());
    // SQLite bounds the number of bound parameters per statement.
    for chunk in ids.chunks(ID_BATCH) {
        let placeholders: Vec<String> = (1..=chunk.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE id IN ({})",
            columns,
            table,
            placeholders.join(", ")
        );
        rows.extend(query_list(
            conn,
            &sql,
            params_from_iter(chunk.iter().map(Uuid::to_string)),
            map,
        )?);
    }
    Ok(rows)
}

fn delete_by(conn: &Connection, table: &str, column: &str, id: Uuid) -> Result<usize, StoreError> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", table, column);
    Ok(conn.execute(&sql, [id.to_string()])?)
}

fn assign_id(id: Uuid) -> Uuid {
    if id.is_nil() { Uuid::new_v4() } else { id }
}

fn sql_window(window: Window) -> (i64, i64) {
    (
        i64::try_from(window.limit).unwrap_or(i64::MAX),
        i64::try_from(window.offset).unwrap_or(i64::MAX),
    )
}

// -- Row mapping --

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        avatar: row.get(4)?,
        bio: row.get(5)?,
        facebook_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: uuid_at(row, 0)?,
        owner_user_id: uuid_at(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        picture_url: row.get(4)?,
        privacy_level: row.get(5)?,
        location: GeoPoint {
            lon: row.get(6)?,
            lat: row.get(7)?,
        },
        start_date: row.get(8)?,
        end_date: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: uuid_at(row, 0)?,
        owner_user_id: uuid_at(row, 1)?,
        event_id: uuid_at(row, 2)?,
        content: row.get(3)?,
        references: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn participant_from_row(row: &Row<'_>) -> rusqlite::Result<Participant> {
    Ok(Participant {
        id: uuid_at(row, 0)?,
        event_id: uuid_at(row, 1)?,
        user_id: uuid_at(row, 2)?,
        request_status: row.get(3)?,
        response_status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
