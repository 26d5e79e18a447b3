//! Transport capability boundary.
//!
//! The dispatcher treats the request/response pair as an opaque
//! capability: a direct-write path, a view-render operation, a
//! session-like stash for the login detour, and an authentication probe.
//! The HTTP implementation lives in `routes::front`; tests use
//! [`RecordingTransport`].

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::context::MiniContext;

/// A response written directly by a controller, bypassing rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Plain-text response with the given status.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: body.into().into_bytes(),
        }
    }

    /// The 404 written when resolution or dispatch fails structurally.
    pub fn not_found() -> Self {
        Self::text(404, "404 Not Found\n")
    }
}

/// Request/response capability handed to the dispatcher.
#[async_trait]
pub trait Transport: Send {
    /// Write a response directly (status, headers, body, end).
    async fn send(&mut self, response: RawResponse) -> anyhow::Result<()>;

    /// Render a view file with the serialized request context as data.
    async fn render(&mut self, view_file: &str, data: JsonValue) -> anyhow::Result<()>;

    /// Stash the reduced context across a login detour.
    async fn stash_mini(&mut self, mini: MiniContext) -> anyhow::Result<()>;

    /// Take back a stashed mini context, if any.
    async fn take_mini(&mut self) -> anyhow::Result<Option<MiniContext>>;

    /// Is the current session authenticated?
    fn is_authenticated(&self) -> bool;
}

/// What a [`RecordingTransport`] saw the dispatcher do.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Sent(RawResponse),
    Rendered { view_file: String, data: JsonValue },
}

/// In-memory transport for tests: records everything, stashes in a field.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub authenticated: bool,
    pub events: Vec<TransportEvent>,
    pub stashed: Option<MiniContext>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    /// The rendered view files, in order.
    pub fn rendered_views(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TransportEvent::Rendered { view_file, .. } => Some(view_file.as_str()),
                TransportEvent::Sent(_) => None,
            })
            .collect()
    }

    /// The statuses written through the direct path, in order.
    pub fn sent_statuses(&self) -> Vec<u16> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TransportEvent::Sent(r) => Some(r.status),
                TransportEvent::Rendered { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&mut self, response: RawResponse) -> anyhow::Result<()> {
        self.events.push(TransportEvent::Sent(response));
        Ok(())
    }

    async fn render(&mut self, view_file: &str, data: JsonValue) -> anyhow::Result<()> {
        self.events.push(TransportEvent::Rendered {
            view_file: view_file.to_string(),
            data,
        });
        Ok(())
    }

    async fn stash_mini(&mut self, mini: MiniContext) -> anyhow::Result<()> {
        self.stashed = Some(mini);
        Ok(())
    }

    async fn take_mini(&mut self) -> anyhow::Result<Option<MiniContext>> {
        Ok(self.stashed.take())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
