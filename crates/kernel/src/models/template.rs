//! Template records: rendering and controller bindings shared by items.

use serde::{Deserialize, Serialize};

use crate::controller::{ControllerHandle, ControllerRegistry};

/// Template record.
///
/// The controller handle is resolved from the registry once, when the
/// template is loaded, and cached here; dispatch never goes back to the
/// registry by name. A template whose controller name has no registration
/// keeps `controller = None`, which surfaces as a typed lookup failure at
/// dispatch time rather than a crash.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Template {
    /// Numeric identifier.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Key into the controller registry.
    pub controller_name: String,

    /// Default view file rendered for pages using this template.
    pub view: String,

    /// Cached controller binding, resolved at load time.
    #[sqlx(skip)]
    #[serde(skip)]
    pub controller: Option<ControllerHandle>,
}

impl Template {
    /// Resolve and cache the controller binding for this template.
    pub fn bind_controller(&mut self, registry: &ControllerRegistry) {
        self.controller = registry.get(&self.controller_name);
        if self.controller.is_none() {
            tracing::warn!(
                template = self.id,
                controller = %self.controller_name,
                "template references an unregistered controller"
            );
        }
    }
}
