//! Request dispatch.
//!
//! One pass resolves the path to its page chain, builds the request
//! context, gates on authentication, hands off to the template's
//! controller, and finally renders. The login detour re-enters the loop
//! with the login path after stashing a reduced context; it terminates
//! because the login controller itself never requires a login.

use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::controller::ControllerOutcome;
use crate::error::LookupError;
use crate::path::SitePath;
use crate::state::AppState;
use crate::transport::{RawResponse, Transport};

/// Link segment the auth gate detours to.
const LOGIN_LINK: &str = "login";

/// Serve one request path over the given transport.
///
/// Structural misses (no page chain, no controller binding) write a 404
/// through the transport and return cleanly; only controller and
/// transport failures surface as errors.
pub async fn serve(
    state: &AppState,
    raw_path: &str,
    transport: &mut dyn Transport,
) -> anyhow::Result<()> {
    let mut path = SitePath::parse(raw_path, state.app_name(), state.default_language());

    loop {
        debug!(path = %path, "dispatching");

        // Snapshot the page chain under a short read lock; the guard must
        // not live across any await below.
        let resolved = {
            let site = state.site().read();
            site.resolve(&path)
        };
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(miss) => {
                warn!(path = %path, %miss, "no page chain for path");
                transport.send(RawResponse::not_found()).await?;
                return Ok(());
            }
        };

        let Some(handle) = resolved.template.controller.clone() else {
            let miss = LookupError::Controller(resolved.template.controller_name.clone());
            warn!(template = resolved.template.id, %miss, "template has no controller binding");
            transport.send(RawResponse::not_found()).await?;
            return Ok(());
        };

        let mut ctx = RequestContext::new(
            path.clone(),
            resolved.page,
            resolved.item,
            resolved.template,
            &mut *transport,
        );
        let mut controller = handle.make();

        // Auth gate: stash the reduced context and detour to the login
        // page in the same language.
        if controller.needs_login() && !controller.is_logged_in(&ctx) {
            debug!(controller = handle.name(), path = %path, "login required, detouring");
            let mini = ctx.mini();
            ctx.transport().stash_mini(mini).await?;
            controller.close().await;

            path = SitePath::parse(
                &format!("/{}/{}/{}", state.app_name(), path.language, LOGIN_LINK),
                state.app_name(),
                state.default_language(),
            );
            continue;
        }

        let outcome = controller.handle(&mut ctx).await;
        // Close runs whether handling succeeded or not.
        controller.close().await;

        match outcome? {
            ControllerOutcome::Raw(response) => {
                debug!(status = response.status, "controller wrote a raw response");
                ctx.transport().send(response).await?;
            }
            ControllerOutcome::Render(target) => {
                if let Some(target) = target {
                    ctx.render_target = target;
                }
                render(state, ctx).await?;
            }
        }
        return Ok(());
    }
}

/// Resolve the render target to a view file and render through the
/// transport. An empty target means the controller already wrote
/// everything it wanted.
async fn render(state: &AppState, mut ctx: RequestContext<'_>) -> anyhow::Result<()> {
    if ctx.render_target.is_empty() {
        debug!("empty render target, nothing to render");
        return Ok(());
    }

    let view_file = view_file_for(state.app_name(), &ctx.render_target);
    debug!(view = %view_file, "rendering");

    let data = ctx.render_data();
    ctx.transport().render(&view_file, data).await
}

/// Map a render target to a view file name. A leading `-` selects the
/// built-in view namespace; everything else lives under the site's own
/// views directory.
fn view_file_for(app_name: &str, target: &str) -> String {
    match target.strip_prefix('-') {
        Some(rest) => format!("builtin{rest}"),
        None => format!("{app_name}/views/{target}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_targets_strip_the_dash() {
        assert_eq!(view_file_for("mysite", "-/login.html"), "builtin/login.html");
    }

    #[test]
    fn site_targets_land_under_the_views_directory() {
        assert_eq!(
            view_file_for("mysite", "page.html"),
            "mysite/views/page.html"
        );
    }
}
