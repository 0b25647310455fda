pub mod error;
pub mod events;
pub mod extract;
pub mod messages;
pub mod participants;
pub mod state;
pub mod status;
pub mod users;

use axum::{
    Router,
    routing::{get, put},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// Versioned API routes under `/api/{v}` plus the unversioned `/ping`.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users", get(users::list_users).post(users::sign_in))
        .route(
            "/users/{user_id}",
            get(users::show_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/{user_id}/events",
            get(events::list_user_events).post(events::create_event),
        )
        .route(
            "/users/{user_id}/events/{event_id}",
            put(events::update_event).delete(events::delete_event),
        )
        .route("/events", get(events::list_events))
        .route("/events/{event_id}", get(events::show_event))
        .route(
            "/events/{event_id}/messages",
            get(messages::list_event_messages).post(messages::create_message),
        )
        .route(
            "/events/{event_id}/participants",
            get(participants::list_event_participants).post(participants::create_participant),
        )
        .route("/messages", get(messages::list_my_messages))
        .route(
            "/messages/{message_id}",
            put(messages::update_message).delete(messages::delete_message),
        )
        .route("/participants", get(participants::list_my_participants))
        .route(
            "/participants/{participant_id}",
            get(participants::show_participant)
                .put(participants::update_participant)
                .delete(participants::delete_participant),
        );

    Router::new()
        .route("/ping", get(status::ping))
        .nest("/api/{v}", api)
        .with_state(state)
}
