//! Login controller.

use async_trait::async_trait;

use crate::context::RequestContext;

use super::{Controller, ControllerOutcome};

/// View file for the built-in login form (the `-` prefix selects the
/// kernel's own view namespace).
const LOGIN_VIEW: &str = "-/login.html";

/// Controller serving the login form.
///
/// Never requires a login itself, which is what terminates the
/// dispatcher's detour loop. On successful authentication the stashed
/// mini context is picked back up by the transport layer.
#[derive(Debug, Default)]
pub struct LoginController;

impl LoginController {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Controller for LoginController {
    async fn handle(&mut self, ctx: &mut RequestContext<'_>) -> anyhow::Result<ControllerOutcome> {
        tracing::debug!(page = %ctx.page.key(), "serving login form");
        Ok(ControllerOutcome::Render(Some(LOGIN_VIEW.to_string())))
    }
}
