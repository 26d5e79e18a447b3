//! Front route: every content url funnels into the dispatcher.
//!
//! The router's fallback hands the raw path to [`dispatch::serve`] through
//! an [`HttpTransport`], which adapts the transport contract onto axum
//! responses and the tower session.

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use tower_sessions::Session;
use tracing::{debug, error};

use crate::context::MiniContext;
use crate::dispatch;
use crate::error::AppError;
use crate::state::AppState;
use crate::transport::{RawResponse, Transport};

/// Session key holding the stashed mini context across a login detour.
const SESSION_PENDING_CONTEXT: &str = "pending_context";

/// Session key holding the authenticated account name.
const SESSION_ACCOUNT: &str = "account";

/// What the dispatcher produced for this request.
enum FrontOutcome {
    Raw(RawResponse),
    Page(String),
}

/// Transport over an axum request/response pair and its session.
///
/// Authentication is snapshotted at construction so the probe stays
/// synchronous; the session itself only changes through the stash calls.
pub struct HttpTransport {
    state: AppState,
    session: Session,
    authenticated: bool,
    outcome: Option<FrontOutcome>,
}

impl HttpTransport {
    pub async fn new(state: AppState, session: Session) -> Self {
        let authenticated = session
            .get::<String>(SESSION_ACCOUNT)
            .await
            .ok()
            .flatten()
            .is_some();

        Self {
            state,
            session,
            authenticated,
            outcome: None,
        }
    }

    /// Turn whatever the dispatcher wrote into an axum response.
    fn into_response(self) -> Response {
        match self.outcome {
            Some(FrontOutcome::Raw(raw)) => {
                let status = StatusCode::from_u16(raw.status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let mut response = (status, raw.body).into_response();
                for (name, value) in raw.headers {
                    let Ok(name) = name.parse::<HeaderName>() else {
                        continue;
                    };
                    let Ok(value) = HeaderValue::from_str(&value) else {
                        continue;
                    };
                    response.headers_mut().insert(name, value);
                }
                response
            }
            Some(FrontOutcome::Page(html)) => Html(html).into_response(),
            // Controller finished without output.
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&mut self, response: RawResponse) -> anyhow::Result<()> {
        self.outcome = Some(FrontOutcome::Raw(response));
        Ok(())
    }

    async fn render(&mut self, view_file: &str, data: serde_json::Value) -> anyhow::Result<()> {
        let html = self.state.theme().render_view(view_file, data)?;
        self.outcome = Some(FrontOutcome::Page(html));
        Ok(())
    }

    async fn stash_mini(&mut self, mini: MiniContext) -> anyhow::Result<()> {
        debug!(link = %mini.link, "stashing context for after login");
        self.session
            .insert(SESSION_PENDING_CONTEXT, mini)
            .await
            .map_err(anyhow::Error::from)
    }

    async fn take_mini(&mut self) -> anyhow::Result<Option<MiniContext>> {
        self.session
            .remove::<MiniContext>(SESSION_PENDING_CONTEXT)
            .await
            .map_err(anyhow::Error::from)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Fallback handler: everything not matched elsewhere is a content path.
async fn front_page(State(state): State<AppState>, session: Session, uri: Uri) -> Response {
    let mut transport = HttpTransport::new(state.clone(), session).await;

    if let Err(err) = dispatch::serve(&state, uri.path(), &mut transport).await {
        error!(path = %uri.path(), error = %err, "dispatch failed");
        return AppError::Internal(err).into_response();
    }

    transport.into_response()
}

/// Create the front router.
pub fn router() -> Router<AppState> {
    Router::new().fallback(front_page)
}
