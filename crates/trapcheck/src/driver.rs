//! FocusDriver - Abstract Browser Automation Trait
//!
//! The verifier never talks to a browser directly. Every action goes through
//! [`FocusDriver`], which keeps the harness independent of the automation
//! backend.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  FocusDriver (Abstract Trait)                                 │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────┐      │
//! │  │  ChromiumDriver     │        │  MockDriver         │      │
//! │  │  (feature browser)  │        │  (simulated page)   │      │
//! │  │  CDP via            │        │  in-memory focus    │      │
//! │  │  chromiumoxide      │        │  trap model         │      │
//! │  └─────────────────────┘        └─────────────────────┘      │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use crate::keys::{KeyChord, KeyTarget};
use crate::result::TrapResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Snapshot of a DOM element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Identity token, stable for the lifetime of one page load
    pub node_id: String,
    /// Lower-case tag name
    pub tag_name: String,
    /// Text content
    pub text_content: Option<String>,
    /// Attributes present on the element
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(node_id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            tag_name: tag_name.into(),
            text_content: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attribute value, if present
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Short human-readable description, e.g. `button#ok.primary`
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.tag_name.clone();
        if let Some(id) = self.attribute("id").filter(|id| !id.is_empty()) {
            out.push('#');
            out.push_str(id);
        }
        if let Some(class) = self.attribute("class") {
            for c in class.split_whitespace() {
                out.push('.');
                out.push_str(c);
            }
        }
        out
    }
}

/// Browser configuration for driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }
}

/// CSS locator matching the element whose `id` is exactly `id`.
///
/// Ids may contain characters that are special in a `#id` selector
/// (`a.b`, `x:y`, a leading digit), so the id is matched as a quoted
/// attribute value instead.
#[must_use]
pub fn id_locator(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 8);
    out.push_str("[id=\"");
    for c in id.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\{:x} ", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push_str("\"]");
    out
}

/// Abstract driver trait for browser automation
///
/// One driver value is one live browser session. The verifier owns it
/// exclusively and awaits each call before issuing the next.
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP via chromiumoxide (feature `browser`)
/// - `MockDriver` - simulated modal dialog page for tests
#[async_trait]
pub trait FocusDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&mut self, url: &str) -> TrapResult<()>;

    /// Get current URL
    async fn current_url(&self) -> TrapResult<String>;

    /// Snapshot every element matching the CSS locator, in document order
    async fn query_all(&self, selector: &str) -> TrapResult<Vec<ElementHandle>>;

    /// Click the element matching the locator
    async fn click(&mut self, selector: &str) -> TrapResult<()>;

    /// Dispatch a key chord to the target element
    async fn send_keys(&mut self, target: KeyTarget<'_>, chord: KeyChord) -> TrapResult<()>;

    /// Whether the element matching the locator is rendered and visible
    async fn is_displayed(&self, selector: &str) -> TrapResult<bool>;

    /// Snapshot of `document.activeElement`
    async fn active_element(&self) -> TrapResult<Option<ElementHandle>>;

    /// Whether the element resolved from the locator *is* the active element
    async fn is_active(&self, selector: &str) -> TrapResult<bool>;

    /// Close the session
    async fn close(&mut self) -> TrapResult<()>;

    /// Query the first element matching the locator
    async fn query(&self, selector: &str) -> TrapResult<Option<ElementHandle>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    /// Reload the current page, resetting all page state
    async fn reload(&mut self) -> TrapResult<()> {
        let url = self.current_url().await?;
        self.navigate(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_element_handle_creation() {
            let elem = ElementHandle::new("n1", "button");
            assert_eq!(elem.node_id, "n1");
            assert_eq!(elem.tag_name, "button");
            assert!(elem.text_content.is_none());
            assert!(elem.attributes.is_empty());
        }

        #[test]
        fn test_describe_uses_id_and_classes() {
            let elem = ElementHandle::new("n2", "input")
                .with_attribute("id", "street")
                .with_attribute("class", "wide  required");
            assert_eq!(elem.describe(), "input#street.wide.required");
        }

        #[test]
        fn test_describe_plain_tag() {
            assert_eq!(ElementHandle::new("n3", "body").describe(), "body");
        }

        #[test]
        fn test_attribute_lookup() {
            let elem = ElementHandle::new("n4", "div").with_attribute("aria-modal", "true");
            assert_eq!(elem.attribute("aria-modal"), Some("true"));
            assert_eq!(elem.attribute("role"), None);
        }
    }

    mod id_locator_tests {
        use super::*;

        #[test]
        fn test_plain_id() {
            assert_eq!(id_locator("dialog1_label"), r#"[id="dialog1_label"]"#);
        }

        #[test]
        fn test_css_special_characters_stay_literal() {
            assert_eq!(id_locator("a.b"), r#"[id="a.b"]"#);
            assert_eq!(id_locator("x:y"), r#"[id="x:y"]"#);
            assert_eq!(id_locator("1st"), r#"[id="1st"]"#);
        }

        #[test]
        fn test_quotes_and_control_characters_are_escaped() {
            assert_eq!(id_locator(r#"say"hi"#), r#"[id="say\"hi"]"#);
            assert_eq!(id_locator(r"back\slash"), r#"[id="back\\slash"]"#);
            assert_eq!(id_locator("line\nbreak"), "[id=\"line\\a break\"]");
        }
    }

    mod driver_config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert!(config.sandbox);
            assert!(config.chromium_path.is_none());
        }

        #[test]
        fn test_config_builder() {
            let config = DriverConfig::new()
                .headless(false)
                .viewport(800, 600)
                .with_chromium_path("/usr/bin/chromium")
                .with_no_sandbox()
                .navigation_timeout(Duration::from_secs(5));

            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(config.viewport_height, 600);
            assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
            assert_eq!(config.navigation_timeout, Duration::from_secs(5));
        }
    }
}
