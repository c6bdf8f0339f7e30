pub mod chats;
pub mod messages;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::{AppState, middleware::load_chat_middleware};

pub fn router(state: &AppState) -> Router<AppState> {
    let chat_router = Router::new()
        .route(
            "/",
            get(chats::get_chat)
                .patch(chats::update_chat_title)
                .delete(chats::delete_chat)
                .post(chats::send_message),
        )
        .route("/stream", post(chats::stream_message))
        .route("/messages", get(chats::get_messages))
        .layer(from_fn_with_state(state.clone(), load_chat_middleware));

    let chats_router = Router::new()
        .route("/", get(chats::get_chats).post(chats::create_chat))
        .nest("/{chat_id}", chat_router);

    let messages_router = Router::new().route(
        "/{message_id}",
        get(messages::get_message)
            .patch(messages::update_message)
            .delete(messages::delete_message),
    );

    Router::new()
        .nest("/chats", chats_router)
        .nest("/messages", messages_router)
}
