//! Stub browser driver — deterministic canned pages.
//!
//! Lets the composed pilots run end-to-end (tests, demos, the CLI before a
//! real driver is wired in) without a browser. Every command is recorded so
//! tests can assert on the action sequence.

use async_trait::async_trait;
use std::sync::Mutex;
use webpilot_core::browser::{
    BrowserDriver, PageSnapshot, ScrollDirection, TypeOptions, png_data_uri,
};
use webpilot_core::error::BrowserError;

/// A minimal valid 1x1 PNG, enough for an image content part.
const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xf8,
    0xff, 0xff, 0x3f, 0x00, 0x05, 0xfe, 0x02, 0xfe, 0xa7, 0x35, 0x81, 0x84, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[derive(Default)]
struct StubState {
    url: Option<String>,
    actions: Vec<String>,
}

/// An in-memory [`BrowserDriver`] with canned snapshots.
#[derive(Default)]
pub struct StubDriver {
    state: Mutex<StubState>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands received so far, in order.
    pub fn actions(&self) -> Vec<String> {
        self.state.lock().map(|s| s.actions.clone()).unwrap_or_default()
    }

    fn record(&self, action: String) {
        if let Ok(mut state) = self.state.lock() {
            state.actions.push(action);
        }
    }

    fn require_session(&self) -> Result<(), BrowserError> {
        if self.session_open() {
            Ok(())
        } else {
            Err(BrowserError::SessionNotStarted)
        }
    }
}

#[async_trait]
impl BrowserDriver for StubDriver {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.record(format!("navigate {url}"));
        if let Ok(mut state) = self.state.lock() {
            state.url = Some(url.to_string());
        }
        Ok(())
    }

    async fn click(&self, element_id: &str) -> Result<(), BrowserError> {
        self.require_session()?;
        self.record(format!("click {element_id}"));
        Ok(())
    }

    async fn type_text(
        &self,
        element_id: &str,
        text: &str,
        options: TypeOptions,
    ) -> Result<(), BrowserError> {
        self.require_session()?;
        let suffix = if options.press_enter { " +enter" } else { "" };
        self.record(format!("type {element_id} '{text}'{suffix}"));
        Ok(())
    }

    async fn scroll(
        &self,
        direction: ScrollDirection,
        element_id: Option<&str>,
    ) -> Result<(), BrowserError> {
        self.require_session()?;
        self.record(format!(
            "scroll {direction:?} {}",
            element_id.unwrap_or("body")
        ));
        Ok(())
    }

    async fn go_back(&self, times: u32) -> Result<(), BrowserError> {
        self.require_session()?;
        self.record(format!("go_back {times}"));
        Ok(())
    }

    async fn wait_for_load(&self, seconds: u64) -> Result<(), BrowserError> {
        self.record(format!("wait {seconds}s"));
        Ok(())
    }

    fn session_open(&self) -> bool {
        self.state.lock().map(|s| s.url.is_some()).unwrap_or(false)
    }

    async fn current_url(&self) -> Option<String> {
        self.state.lock().ok().and_then(|s| s.url.clone())
    }

    async fn annotated_snapshot(&self) -> Result<PageSnapshot, BrowserError> {
        self.require_session()?;
        Ok(PageSnapshot {
            image_data_uri: png_data_uri(PIXEL_PNG),
            ui_map: "[1] search box\n[2] submit button".into(),
            url: self.current_url().await,
        })
    }

    async fn full_page_screenshots(&self) -> Result<Vec<String>, BrowserError> {
        self.require_session()?;
        let uri = png_data_uri(PIXEL_PNG);
        let base64 = uri
            .strip_prefix("data:image/png;base64,")
            .unwrap_or(&uri)
            .to_string();
        Ok(vec![base64.clone(), base64])
    }
}
