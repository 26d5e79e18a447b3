//! Stock content controller.

use async_trait::async_trait;

use crate::context::RequestContext;

use super::{Controller, ControllerOutcome};

/// Default controller for content pages.
///
/// Renders through the context's existing render target (the template's
/// view). The secured variant gates the same behavior behind a login.
#[derive(Debug, Default)]
pub struct ContentController {
    requires_login: bool,
}

impl ContentController {
    /// Publicly reachable content.
    pub fn open() -> Self {
        Self {
            requires_login: false,
        }
    }

    /// Admin-facing content: same rendering, behind the login gate.
    pub fn secured() -> Self {
        Self {
            requires_login: true,
        }
    }
}

#[async_trait]
impl Controller for ContentController {
    fn needs_login(&self) -> bool {
        self.requires_login
    }

    async fn handle(&mut self, ctx: &mut RequestContext<'_>) -> anyhow::Result<ControllerOutcome> {
        tracing::debug!(page = %ctx.page.key(), "content controller");
        Ok(ControllerOutcome::Render(None))
    }
}
