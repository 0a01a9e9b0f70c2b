//! Browser driver interface — the narrow seam to the external actuator.
//!
//! The orchestration core never touches the DOM; it talks to whatever drives
//! the browser through this trait. Implementations own page lifecycle,
//! element annotation and screenshot capture.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::BrowserError;

/// Scroll direction for [`BrowserDriver::scroll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl std::str::FromStr for ScrollDirection {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(BrowserError::CommandFailed {
                action: "scroll".into(),
                reason: format!("unknown direction: {other}"),
            }),
        }
    }
}

/// Options for typing into an element.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeOptions {
    /// Press enter after typing (useful for search boxes)
    pub press_enter: bool,
    /// Replace existing text in the input field
    pub replace_existing: bool,
}

/// One annotated view of the current page: a screenshot with interaction
/// hints burned in, the textual hint map, and the current URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Screenshot as a data URI (`data:image/png;base64,...`)
    pub image_data_uri: String,

    /// Textual map of the hint labels placed on interactive elements
    pub ui_map: String,

    /// Current page URL, if a page is open
    pub url: Option<String>,
}

/// The browser actuator contract consumed by the built-in tools.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to the given URL, opening a session if none exists.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Click the element carrying the given hint label.
    async fn click(&self, element_id: &str) -> Result<(), BrowserError>;

    /// Type text into the element carrying the given hint label.
    async fn type_text(
        &self,
        element_id: &str,
        text: &str,
        options: TypeOptions,
    ) -> Result<(), BrowserError>;

    /// Scroll the page or a specific element.
    async fn scroll(
        &self,
        direction: ScrollDirection,
        element_id: Option<&str>,
    ) -> Result<(), BrowserError>;

    /// Go back in page history, `times` steps.
    async fn go_back(&self, times: u32) -> Result<(), BrowserError>;

    /// Wait for the page to settle, up to the given number of seconds.
    async fn wait_for_load(&self, seconds: u64) -> Result<(), BrowserError>;

    /// Whether a page session is currently open. Consulted by `If` frequency
    /// gates, so it must be cheap and side-effect free.
    fn session_open(&self) -> bool;

    /// The current page URL, if a session is open.
    async fn current_url(&self) -> Option<String>;

    /// Capture an annotated snapshot of the visible viewport.
    async fn annotated_snapshot(&self) -> Result<PageSnapshot, BrowserError>;

    /// Capture the full page as a series of viewport-sized screenshots,
    /// each base64-encoded PNG (no data-URI prefix).
    async fn full_page_screenshots(&self) -> Result<Vec<String>, BrowserError>;
}

/// Encode PNG bytes as a data URI suitable for an image content part.
pub fn png_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
