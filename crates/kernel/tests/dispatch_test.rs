#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Request dispatch tests.

mod common;

use std::sync::Arc;

use async_trait::async_trait;

use struttura_kernel::context::RequestContext;
use struttura_kernel::controller::{Controller, ControllerOutcome, ControllerRegistry};
use struttura_kernel::dispatch;
use struttura_kernel::state::AppState;
use struttura_kernel::transport::{RawResponse, RecordingTransport, TransportEvent};

#[tokio::test]
async fn test_renders_the_resolved_page() {
    let state = common::seeded_state().await;
    let mut transport = RecordingTransport::new();

    dispatch::serve(&state, "/mysite/en/about", &mut transport)
        .await
        .unwrap();

    assert_eq!(transport.rendered_views(), ["mysite/views/page.html"]);
    let Some(TransportEvent::Rendered { data, .. }) = transport.events.first() else {
        panic!("expected a render event");
    };
    assert_eq!(data["page"]["title"], "About us");
    assert_eq!(data["item"]["id"], 5);
    assert_eq!(data["path"]["language"], "en");
}

#[tokio::test]
async fn test_unknown_link_falls_back_to_notfound_page() {
    let state = common::seeded_state().await;
    let mut transport = RecordingTransport::new();

    dispatch::serve(&state, "/mysite/en/no-such-page", &mut transport)
        .await
        .unwrap();

    assert_eq!(transport.rendered_views(), ["mysite/views/page.html"]);
    let Some(TransportEvent::Rendered { data, .. }) = transport.events.first() else {
        panic!("expected a render event");
    };
    assert_eq!(data["page"]["link"], "notfound");
}

#[tokio::test]
async fn test_language_without_notfound_falls_back_to_welcome() {
    let state = common::seeded_state().await;
    let mut transport = RecordingTransport::new();

    dispatch::serve(&state, "/mysite/fr/no-such-page", &mut transport)
        .await
        .unwrap();

    let Some(TransportEvent::Rendered { data, .. }) = transport.events.first() else {
        panic!("expected a render event");
    };
    assert_eq!(data["page"]["link"], "welcome");
    assert_eq!(data["page"]["language"], "fr");
}

#[tokio::test]
async fn test_language_without_pages_is_a_direct_404() {
    let state = common::seeded_state().await;
    let mut transport = RecordingTransport::new();

    dispatch::serve(&state, "/mysite/de/anything", &mut transport)
        .await
        .unwrap();

    assert_eq!(transport.sent_statuses(), [404]);
    assert!(transport.rendered_views().is_empty());
}

#[tokio::test]
async fn test_auth_gate_detours_to_login() {
    let state = common::seeded_state().await;
    let mut transport = RecordingTransport::new();

    dispatch::serve(&state, "/mysite/en/dashboard", &mut transport)
        .await
        .unwrap();

    // The gated view never rendered; the login form did.
    assert_eq!(transport.rendered_views(), ["builtin/login.html"]);

    // The full context was reduced and stashed for after login.
    use struttura_kernel::transport::Transport;
    let mini = transport
        .take_mini()
        .await
        .unwrap()
        .expect("mini context stashed");
    assert_eq!(mini.language, "en");
    assert_eq!(mini.item_id, 9);
    assert_eq!(mini.link, "dashboard");
    assert!(transport.take_mini().await.unwrap().is_none());
}

#[tokio::test]
async fn test_auth_gate_passes_an_authenticated_session() {
    let state = common::seeded_state().await;
    let mut transport = RecordingTransport::authenticated();

    dispatch::serve(&state, "/mysite/en/dashboard", &mut transport)
        .await
        .unwrap();

    assert_eq!(transport.rendered_views(), ["mysite/views/dashboard.html"]);
    assert!(transport.stashed.is_none());
}

#[tokio::test]
async fn test_login_page_uses_the_builtin_view() {
    let state = common::seeded_state().await;
    let mut transport = RecordingTransport::new();

    dispatch::serve(&state, "/mysite/fr/login", &mut transport)
        .await
        .unwrap();

    assert_eq!(transport.rendered_views(), ["builtin/login.html"]);
}

#[tokio::test]
async fn test_deleting_an_item_changes_what_the_path_serves() {
    let state = common::seeded_state().await;

    state.site().write().delete_item(5);

    let mut transport = RecordingTransport::new();
    dispatch::serve(&state, "/mysite/en/about", &mut transport)
        .await
        .unwrap();

    let Some(TransportEvent::Rendered { data, .. }) = transport.events.first() else {
        panic!("expected a render event");
    };
    assert_eq!(data["page"]["link"], "notfound");
}

/// Controller that writes a response directly, bypassing rendering.
struct PlainTextController;

#[async_trait]
impl Controller for PlainTextController {
    async fn handle(&mut self, _ctx: &mut RequestContext<'_>) -> anyhow::Result<ControllerOutcome> {
        Ok(ControllerOutcome::Raw(RawResponse::text(200, "robots.txt\n")))
    }
}

#[tokio::test]
async fn test_raw_responses_bypass_rendering() {
    let storage = common::seeded_storage()
        .with_template(4, "Raw", "RobotsController", "unused.html")
        .with_item(11, 4, 1, "Robots")
        .with_page(11, "en", "robots", "Robots");

    let mut controllers = ControllerRegistry::with_defaults();
    controllers.register("RobotsController", || {
        Box::new(PlainTextController) as Box<dyn Controller>
    });

    let state = AppState::with_controllers(common::test_config(), Arc::new(storage), controllers)
        .await
        .unwrap();

    let mut transport = RecordingTransport::new();
    dispatch::serve(&state, "/mysite/en/robots", &mut transport)
        .await
        .unwrap();

    assert_eq!(transport.sent_statuses(), [200]);
    assert!(transport.rendered_views().is_empty());
}
