//! Controller contract and registry.
//!
//! Controllers are the polymorphic boundary the dispatcher hands every
//! request to. The registry is populated once at startup and read-only
//! afterwards; templates resolve their controller binding from it at load
//! time and cache the handle.

pub mod content;
pub mod login;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::transport::RawResponse;

pub use content::ContentController;
pub use login::LoginController;

/// What a controller decided to do with the request.
///
/// The historical contract was a single-shot continuation; the variants
/// make its three branches explicit.
#[derive(Debug)]
pub enum ControllerOutcome {
    /// Generate this response directly, bypassing view rendering.
    Raw(RawResponse),

    /// Render a view: `Some(target)` overrides the context's render
    /// target, `None` keeps whatever the context already has.
    Render(Option<String>),
}

/// The controller contract.
///
/// `close` runs unconditionally after `handle` returns, whether the
/// request produced a response, a render target, or an error.
#[async_trait]
pub trait Controller: Send {
    /// Does the requested action require an authenticated session?
    fn needs_login(&self) -> bool {
        false
    }

    /// Is the current session authenticated?
    fn is_logged_in(&self, ctx: &RequestContext<'_>) -> bool {
        ctx.is_authenticated()
    }

    /// Handle the request.
    async fn handle(&mut self, ctx: &mut RequestContext<'_>) -> anyhow::Result<ControllerOutcome>;

    /// Release per-request resources.
    async fn close(&mut self) {}
}

/// Builds a fresh controller instance per request.
pub trait ControllerFactory: Send + Sync {
    fn make(&self) -> Box<dyn Controller>;
}

impl<F> ControllerFactory for F
where
    F: Fn() -> Box<dyn Controller> + Send + Sync,
{
    fn make(&self) -> Box<dyn Controller> {
        self()
    }
}

/// A resolved controller binding, cached on templates.
#[derive(Clone)]
pub struct ControllerHandle {
    name: Arc<str>,
    factory: Arc<dyn ControllerFactory>,
}

impl ControllerHandle {
    /// Registered controller name this handle resolves.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a controller for one request.
    pub fn make(&self) -> Box<dyn Controller> {
        self.factory.make()
    }
}

impl std::fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("name", &self.name)
            .finish()
    }
}

/// Name-keyed controller factory map.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerHandle>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed set of bindings registered at startup.
    ///
    /// Admin-facing controllers are gated variants of the content
    /// controller; anything richer plugs in through [`register`].
    ///
    /// [`register`]: Self::register
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("Controller", || {
            Box::new(ContentController::open()) as Box<dyn Controller>
        });
        registry.register("ContentController", || {
            Box::new(ContentController::open()) as Box<dyn Controller>
        });
        registry.register("PageController", || {
            Box::new(ContentController::open()) as Box<dyn Controller>
        });
        registry.register("LoginController", || {
            Box::new(LoginController::new()) as Box<dyn Controller>
        });
        registry.register("UserController", || {
            Box::new(ContentController::secured()) as Box<dyn Controller>
        });
        registry.register("ImageController", || {
            Box::new(ContentController::secured()) as Box<dyn Controller>
        });
        registry.register("FileController", || {
            Box::new(ContentController::secured()) as Box<dyn Controller>
        });
        registry.register("TemplateController", || {
            Box::new(ContentController::secured()) as Box<dyn Controller>
        });
        registry.register("DashboardController", || {
            Box::new(ContentController::secured()) as Box<dyn Controller>
        });

        registry
    }

    /// Register a controller factory under a template controller name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: ControllerFactory + 'static,
    {
        let handle = ControllerHandle {
            name: Arc::from(name),
            factory: Arc::new(factory),
        };
        self.factories.insert(name.to_string(), handle);
    }

    /// Look up a binding by controller name.
    pub fn get(&self, name: &str) -> Option<ControllerHandle> {
        self.factories.get(name).cloned()
    }

    /// Registered controller names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_fixed_binding_set() {
        let registry = ControllerRegistry::with_defaults();

        for name in [
            "Controller",
            "ContentController",
            "PageController",
            "LoginController",
            "UserController",
            "ImageController",
            "FileController",
            "TemplateController",
            "DashboardController",
        ] {
            assert!(registry.get(name).is_some(), "missing binding for {name}");
        }
        assert!(registry.get("NoSuchController").is_none());
    }

    #[test]
    fn handles_build_gated_and_open_controllers() {
        let registry = ControllerRegistry::with_defaults();

        let open = registry.get("PageController").map(|h| h.make());
        assert!(open.is_some_and(|c| !c.needs_login()));

        let gated = registry.get("DashboardController").map(|h| h.make());
        assert!(gated.is_some_and(|c| c.needs_login()));
    }
}
