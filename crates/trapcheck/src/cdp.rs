//! Chromium driver over the DevTools protocol.
//!
//! Element queries run as page scripts that return `JSON.stringify`
//! strings, which are decoded with `serde_json`. Each element seen by a
//! query is stamped with an identity token so active-element comparisons
//! survive between round trips. Tokens restart on every page load.

#![allow(
    clippy::significant_drop_tightening,
    clippy::redundant_clone,
    clippy::missing_errors_doc
)]

use crate::driver::{DriverConfig, ElementHandle, FocusDriver};
use crate::keys::{KeyChord, KeyTarget};
use crate::result::{TrapError, TrapResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Page-side helper turning an element into an [`ElementHandle`] shape
const SNAPSHOT_FN: &str = r"
const __trapcheckSnap = (el) => {
  if (!el.__trapcheckNode) {
    window.__trapcheckSeq = (window.__trapcheckSeq || 0) + 1;
    el.__trapcheckNode = 'n' + window.__trapcheckSeq;
  }
  const attributes = {};
  for (const a of el.attributes) { attributes[a.name] = a.value; }
  return {
    node_id: el.__trapcheckNode,
    tag_name: el.tagName.toLowerCase(),
    text_content: el.textContent,
    attributes,
  };
};";

/// Quote a CSS locator as a JS string literal
fn js_string(value: &str) -> TrapResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn script_error(e: impl std::fmt::Display) -> TrapError {
    TrapError::Script {
        message: e.to_string(),
    }
}

/// Real browser session
#[derive(Debug)]
pub struct ChromiumDriver {
    config: DriverConfig,
    browser: Arc<Mutex<CdpBrowser>>,
    page: CdpPage,
    #[allow(dead_code)]
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    pub async fn launch(config: DriverConfig) -> TrapResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.navigation_timeout);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| TrapError::BrowserLaunch { message })?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| TrapError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| TrapError::BrowserLaunch {
                message: e.to_string(),
            })?;

        tracing::info!(headless = config.headless, "chromium launched");
        Ok(Self {
            config,
            browser: Arc::new(Mutex::new(browser)),
            page,
            handle,
        })
    }

    /// Get the driver configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Evaluate a script that returns a `JSON.stringify` string
    async fn eval_json<T: DeserializeOwned>(&self, script: String) -> TrapResult<T> {
        let result = self.page.evaluate(script).await.map_err(script_error)?;
        let json: String = result.into_value().map_err(script_error)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Run `body` with `el` bound to the first match; `null` when absent
    async fn with_element<T: DeserializeOwned>(
        &self,
        selector: &str,
        body: &str,
    ) -> TrapResult<T> {
        let script = format!(
            "(() => {{ {SNAPSHOT_FN} const el = document.querySelector({sel}); \
             if (!el) return JSON.stringify(null); {body} }})()",
            sel = js_string(selector)?,
        );
        let value: Option<T> = self.eval_json(script).await?;
        value.ok_or_else(|| TrapError::not_found(selector))
    }

    async fn dispatch(&self, chord: KeyChord) -> TrapResult<()> {
        for kind in [DispatchKeyEventType::RawKeyDown, DispatchKeyEventType::KeyUp] {
            let params = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key(chord.key.name())
                .code(chord.key.code())
                .windows_virtual_key_code(chord.key.virtual_key_code())
                .native_virtual_key_code(chord.key.virtual_key_code())
                .modifiers(chord.modifiers())
                .build()
                .map_err(|message| TrapError::Driver { message })?;
            self.page
                .execute(params)
                .await
                .map_err(|e| TrapError::driver(e.to_string()))?;
        }
        tracing::debug!(key = %chord, "key dispatched");
        Ok(())
    }
}

#[async_trait]
impl FocusDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> TrapResult<()> {
        let navigation = self.page.goto(url);
        tokio::time::timeout(self.config.navigation_timeout, navigation)
            .await
            .map_err(|_| TrapError::Navigation {
                url: url.to_string(),
                message: format!("timed out after {:?}", self.config.navigation_timeout),
            })?
            .map_err(|e| TrapError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(%url, "navigated");
        Ok(())
    }

    async fn current_url(&self) -> TrapResult<String> {
        self.page
            .url()
            .await
            .map_err(|e| TrapError::driver(e.to_string()))?
            .ok_or_else(|| TrapError::driver("page has no URL"))
    }

    async fn query_all(&self, selector: &str) -> TrapResult<Vec<ElementHandle>> {
        let script = format!(
            "(() => {{ {SNAPSHOT_FN} \
             return JSON.stringify(Array.from(document.querySelectorAll({sel}), __trapcheckSnap)); }})()",
            sel = js_string(selector)?,
        );
        self.eval_json(script).await
    }

    async fn click(&mut self, selector: &str) -> TrapResult<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| TrapError::not_found(selector))?;
        element
            .click()
            .await
            .map_err(|_| TrapError::ElementNotInteractable {
                selector: selector.to_string(),
            })?;
        Ok(())
    }

    async fn send_keys(&mut self, target: KeyTarget<'_>, chord: KeyChord) -> TrapResult<()> {
        if let KeyTarget::Selector(selector) = target {
            let focused: bool = self
                .with_element(
                    selector,
                    "el.focus(); return JSON.stringify(el === document.activeElement);",
                )
                .await?;
            if !focused {
                return Err(TrapError::ElementNotInteractable {
                    selector: selector.to_string(),
                });
            }
        }
        self.dispatch(chord).await
    }

    async fn is_displayed(&self, selector: &str) -> TrapResult<bool> {
        self.with_element(
            selector,
            "const style = getComputedStyle(el); \
             return JSON.stringify(style.display !== 'none' && style.visibility !== 'hidden' \
             && el.getClientRects().length > 0);",
        )
        .await
    }

    async fn active_element(&self) -> TrapResult<Option<ElementHandle>> {
        let script = format!(
            "(() => {{ {SNAPSHOT_FN} const el = document.activeElement; \
             return JSON.stringify(el ? __trapcheckSnap(el) : null); }})()"
        );
        self.eval_json(script).await
    }

    async fn is_active(&self, selector: &str) -> TrapResult<bool> {
        self.with_element(
            selector,
            "return JSON.stringify(el === document.activeElement);",
        )
        .await
    }

    async fn close(&mut self) -> TrapResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| TrapError::driver(e.to_string()))?;
        tracing::info!("chromium closed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        let quoted = js_string(r#"#dialog2[role="dialog"]"#).unwrap();
        assert_eq!(quoted, r##""#dialog2[role=\"dialog\"]""##);
    }

    #[test]
    fn test_snapshot_fn_fields_match_element_handle() {
        for field in ["node_id", "tag_name", "text_content", "attributes"] {
            assert!(SNAPSHOT_FN.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_snapshot_json_decodes() {
        let json = r#"{"node_id":"n3","tag_name":"button","text_content":"OK","attributes":{"class":"primary"}}"#;
        let handle: ElementHandle = serde_json::from_str(json).unwrap();
        assert_eq!(handle.describe(), "button.primary");
    }
}
