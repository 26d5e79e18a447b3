//! Per-request context.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::{Item, Page, Template};
use crate::path::SitePath;
use crate::transport::Transport;

/// The aggregate a dispatch pass works on: the resolved page chain (owned
/// snapshot taken under the repository lock), the parsed path, and the
/// transport handles. Everything but `render_target` is fixed at
/// construction; a controller may override the render target before
/// signaling completion.
pub struct RequestContext<'t> {
    pub path: SitePath,
    pub page: Page,
    pub item: Item,
    pub template: Template,

    /// View the rendering step resolves; starts as the template's view.
    pub render_target: String,

    transport: &'t mut dyn Transport,
}

impl<'t> RequestContext<'t> {
    pub fn new(
        path: SitePath,
        page: Page,
        item: Item,
        template: Template,
        transport: &'t mut dyn Transport,
    ) -> Self {
        let render_target = template.view.clone();
        Self {
            path,
            page,
            item,
            template,
            render_target,
            transport,
        }
    }

    /// Transport capability for this request.
    pub fn transport(&mut self) -> &mut dyn Transport {
        self.transport
    }

    /// Is the session behind this request authenticated?
    pub fn is_authenticated(&self) -> bool {
        self.transport.is_authenticated()
    }

    /// Reduced snapshot for stashing across the login detour.
    pub fn mini(&self) -> MiniContext {
        MiniContext {
            language: self.page.language.clone(),
            item_id: self.page.item_id,
            link: self.path.link.clone(),
            trail: self.path.trail.clone(),
        }
    }

    /// Serialized snapshot handed to the view renderer.
    pub fn render_data(&self) -> serde_json::Value {
        json!({
            "path": self.path,
            "page": self.page,
            "item": self.item,
            "template": self.template,
        })
    }
}

/// Serializable reduction of a context, small enough for session storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniContext {
    pub language: String,
    pub item_id: i64,
    pub link: String,
    pub trail: Vec<String>,
}
