use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::FixedOffset;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{
    chat::now_millis,
    config::Credentials,
    error::AppError,
    interface::{auth::require_basic_auth, cookie, form, page},
    store::Store,
};

pub struct AppState {
    pub store: Store,
    pub display_offset: FixedOffset,
}

pub struct ChatServer {
    state: Arc<AppState>,
    credentials: Arc<Credentials>,
}

impl ChatServer {
    pub fn new(store: Store, credentials: Credentials, display_offset: FixedOffset) -> Self {
        Self {
            state: Arc::new(AppState {
                store,
                display_offset,
            }),
            credentials: Arc::new(credentials),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(view).post(post_message))
            .route("/join", post(join))
            .route("/leave", get(leave))
            .with_state(self.state.clone())
            .layer(middleware::from_fn_with_state(
                self.credentials.clone(),
                require_basic_auth,
            ))
            .layer(TraceLayer::new_for_http())
    }
}

async fn view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let chat = state.store.load_chat().await?;
    let sender = cookie::read_sender(&headers);

    Ok(Html(page::render(
        &chat,
        sender.as_deref(),
        &state.display_offset,
    )))
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, AppError> {
    let Some(sender) = cookie::read_sender(&headers) else {
        debug!("Post without sender cookie, ignoring");
        return Ok(redirect_home(None));
    };

    let fields = form::read_fields(request).await;
    let message = fields.get("message");
    if message.is_empty() {
        debug!("Empty message from {}, ignoring", sender);
        return Ok(redirect_home(None));
    }

    let mut chat = state.store.load_chat().await?;
    chat.post(sender.as_str(), message, now_millis());
    state.store.save_chat(&chat).await?;

    debug!("{} posted a message", sender);
    Ok(redirect_home(None))
}

async fn join(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, AppError> {
    let fields = form::read_fields(request).await;
    let name = fields.get("name");
    if name.is_empty() {
        debug!("Join without a name, ignoring");
        return Ok(redirect_home(None));
    }

    let mut chat = state.store.load_chat().await?;
    chat.join(name, now_millis());
    state.store.save_chat(&chat).await?;

    info!("{} joined", name);
    Ok(redirect_home(Some(cookie::set_sender(name)?)))
}

async fn leave(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(sender) = cookie::read_sender(&headers) else {
        debug!("Leave without sender cookie, ignoring");
        return Ok(redirect_home(None));
    };

    let mut chat = state.store.load_chat().await?;
    chat.leave(&sender, now_millis());
    state.store.save_chat(&chat).await?;

    info!("{} left", sender);
    Ok(redirect_home(Some(cookie::clear_sender())))
}

/// `302 Found` back to the board, optionally setting the sender cookie.
fn redirect_home(set_cookie: Option<HeaderValue>) -> Response {
    let mut response =
        (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static("/"))]).into_response();
    if let Some(value) = set_cookie {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}
