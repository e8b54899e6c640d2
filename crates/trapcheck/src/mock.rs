//! Simulated modal dialog page.
//!
//! [`MockDriver`] implements [`FocusDriver`] over an in-memory model of a
//! page with stacked modal dialogs and focus traps. It is built from a
//! [`SuiteConfig`], so every locator in the suite resolves to a simulated
//! element. Locators are matched literally; no CSS engine is involved.
//!
//! Model:
//!
//! - Clicking the last locator of a fixture's trigger path opens that
//!   dialog on top of the stack and focuses its initial element.
//! - Tab/Shift+Tab inside the top dialog walk the focus cycle and wrap.
//! - Initial focus follows the fixture's lead-in counts. With both counts
//!   non-zero the dialog starts on `tab_lead_in` headings outside the
//!   cycle. With `tab_lead_in > 0` and `shift_tab_lead_in == 0` it starts
//!   inside the cycle, `tab_lead_in` presses before the first element
//!   (`1` means on the last element). Otherwise it starts on the first.
//! - The first Shift+Tab after opening passes `shift_tab_lead_in - 1`
//!   sentinel elements before reaching the last cycle element.
//! - Escape inside the top dialog closes it and returns focus to the
//!   element that opened it.
//!
//! Faults can be injected per dialog to exercise the failure paths.

use crate::driver::{id_locator, ElementHandle, FocusDriver};
use crate::fixture::{DialogFixture, SuiteConfig};
use crate::keys::{Direction, Key, KeyChord, KeyTarget};
use crate::result::{TrapError, TrapResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Index of the `<body>` node
const BODY: usize = 0;

#[derive(Debug, Clone)]
struct MockNode {
    tag: String,
    text: Option<String>,
    attributes: BTreeMap<String, String>,
    /// Dialog whose visibility governs this node
    owner: Option<usize>,
}

#[derive(Debug, Clone, Default)]
struct MockDialog {
    name: String,
    container: usize,
    cycle: Vec<usize>,
    start: usize,
    lead: Vec<usize>,
    sentinels: Vec<usize>,
    broken_wrap: bool,
    ignore_escape: bool,
    never_opens: bool,
}

impl MockDialog {
    /// `fresh` is true until the first key press after opening
    fn next_focus(&self, from: usize, direction: Direction, fresh: bool) -> usize {
        let first = self.cycle[0];
        let last = self.cycle[self.cycle.len() - 1];

        if fresh && from == self.start && direction == Direction::Backward {
            if let Some(&sentinel) = self.sentinels.first() {
                return sentinel;
            }
        }

        if let Some(i) = self.cycle.iter().position(|&n| n == from) {
            return match direction {
                Direction::Forward if i + 1 < self.cycle.len() => self.cycle[i + 1],
                Direction::Backward if i > 0 => self.cycle[i - 1],
                _ if self.broken_wrap => BODY,
                Direction::Forward => first,
                Direction::Backward => last,
            };
        }
        if let Some(i) = self.lead.iter().position(|&n| n == from) {
            return match direction {
                Direction::Forward => self.lead.get(i + 1).copied().unwrap_or(first),
                Direction::Backward if i > 0 => self.lead[i - 1],
                Direction::Backward => self.sentinels.first().copied().unwrap_or(last),
            };
        }
        if let Some(i) = self.sentinels.iter().position(|&n| n == from) {
            return match direction {
                Direction::Forward => first,
                Direction::Backward => self.sentinels.get(i + 1).copied().unwrap_or(last),
            };
        }
        // Focus outside the dialog is pulled back in
        match direction {
            Direction::Forward => first,
            Direction::Backward => last,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PageState {
    /// Open dialogs, bottom to top, with the node that opened each
    open: Vec<(usize, usize)>,
    active: usize,
    previous_active: usize,
    /// No key pressed since the top dialog opened
    fresh: bool,
    generation: u64,
}

/// Mock driver for unit testing and dry runs
#[derive(Debug)]
pub struct MockDriver {
    url: String,
    nodes: Vec<MockNode>,
    aliases: HashMap<String, Vec<usize>>,
    dialogs: Vec<MockDialog>,
    openers: HashMap<usize, usize>,
    state: PageState,
    focus_lag: usize,
    stale_reads: AtomicUsize,
    call_history: Vec<String>,
}

impl MockDriver {
    fn empty(url: impl Into<String>) -> Self {
        let mut driver = Self {
            url: url.into(),
            nodes: Vec::new(),
            aliases: HashMap::new(),
            dialogs: Vec::new(),
            openers: HashMap::new(),
            state: PageState::default(),
            focus_lag: 0,
            stale_reads: AtomicUsize::new(0),
            call_history: Vec::new(),
        };
        driver.node_for("body", "body", None);
        driver
    }

    /// Build a simulated page containing every element the suite refers to
    pub fn from_suite(suite: &SuiteConfig) -> TrapResult<Self> {
        suite.validate()?;
        let url = suite
            .url
            .clone()
            .unwrap_or_else(|| "mock://dialog-modal".to_string());
        let mut page = Self::empty(url);

        for fixture in &suite.dialogs {
            page.add_dialog(fixture, &suite.aria.dialog_selector);
        }
        page.add_descriptions(suite);
        page.add_triggers(&suite.dialogs);
        Ok(page)
    }

    fn add_dialog(&mut self, fixture: &DialogFixture, dialog_selector: &str) {
        let d = self.dialogs.len();
        let container = self.node_for(&fixture.container, "div", Some(d));
        self.alias(dialog_selector, container);

        let label_id = format!("{}_label", fixture.name);
        let label = self.anonymous("h2", Some(d));
        self.nodes[label].text = Some(format!("{} title", fixture.name));
        self.set_attr(label, "id", &label_id);

        self.set_attr(container, "role", "dialog");
        self.set_attr(container, "aria-modal", "true");
        self.set_attr(container, "aria-labelledby", &label_id);
        if let Some(id) = simple_id(&fixture.container) {
            self.set_attr(container, "id", id);
        }

        let cycle: Vec<usize> = fixture
            .focusable
            .iter()
            .map(|sel| self.node_for(sel, tag_for(sel), Some(d)))
            .collect();

        let (tab_lead_in, shift_tab_lead_in) = (fixture.tab_lead_in, fixture.shift_tab_lead_in);
        let headings = if shift_tab_lead_in > 0 { tab_lead_in } else { 0 };
        let lead: Vec<usize> = (0..headings)
            .map(|_| {
                let n = self.anonymous("p", Some(d));
                self.set_attr(n, "tabindex", "-1");
                n
            })
            .collect();

        let start = match lead.first() {
            Some(&heading) => heading,
            None => cycle[(cycle.len() - tab_lead_in.min(cycle.len())) % cycle.len()],
        };

        let sentinels = (0..shift_tab_lead_in.saturating_sub(1))
            .map(|_| {
                let n = self.anonymous("div", Some(d));
                self.set_attr(n, "tabindex", "0");
                n
            })
            .collect();

        self.dialogs.push(MockDialog {
            name: fixture.name.clone(),
            container,
            cycle,
            start,
            lead,
            sentinels,
            ..MockDialog::default()
        });
    }

    fn add_descriptions(&mut self, suite: &SuiteConfig) {
        let selector = &suite.aria.describedby_selector;
        for part in selector.split(',').map(str::trim) {
            let matched = suite.dialogs.iter().position(|f| {
                part == f.container
                    || part
                        .strip_prefix(f.container.as_str())
                        .is_some_and(|rest| rest.starts_with(['[', ':', '.']))
            });
            let Some(d) = matched else { continue };
            let container = self.dialogs[d].container;
            let desc_id = format!("{}_desc", suite.dialogs[d].name);
            let desc = self.anonymous("p", Some(d));
            self.nodes[desc].text = Some(format!("{} description", suite.dialogs[d].name));
            self.set_attr(desc, "id", &desc_id);
            self.set_attr(container, "aria-describedby", &desc_id);
            self.alias(selector, container);
        }
    }

    fn add_triggers(&mut self, fixtures: &[DialogFixture]) {
        let mut final_openers: HashMap<&str, usize> = HashMap::new();
        for (d, fixture) in fixtures.iter().enumerate() {
            if let Some(last) = fixture.trigger.last() {
                final_openers.entry(last.as_str()).or_insert(d);
            }
        }
        for fixture in fixtures {
            for (i, sel) in fixture.trigger.iter().enumerate() {
                let owner = i
                    .checked_sub(1)
                    .and_then(|prev| final_openers.get(fixture.trigger[prev].as_str()))
                    .copied();
                let node = self.node_for(sel, tag_for(sel), owner);
                if let Some(&d) = final_openers.get(sel.as_str()) {
                    self.openers.insert(node, d);
                }
            }
        }
    }

    fn node_for(&mut self, selector: &str, tag: &str, owner: Option<usize>) -> usize {
        if let Some(&n) = self.aliases.get(selector).and_then(|ns| ns.first()) {
            return n;
        }
        let n = self.anonymous(tag, owner);
        self.alias(selector, n);
        n
    }

    fn anonymous(&mut self, tag: &str, owner: Option<usize>) -> usize {
        self.nodes.push(MockNode {
            tag: tag.to_string(),
            text: None,
            attributes: BTreeMap::new(),
            owner,
        });
        self.nodes.len() - 1
    }

    fn alias(&mut self, selector: &str, node: usize) {
        let entry = self.aliases.entry(selector.to_string()).or_default();
        if !entry.contains(&node) {
            entry.push(node);
        }
    }

    fn set_attr(&mut self, node: usize, name: &str, value: &str) {
        if name == "id" {
            self.alias(&id_locator(value), node);
        }
        self.nodes[node]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    // -------------------------------------------------------------------------
    // Fault injection
    // -------------------------------------------------------------------------

    fn dialog_mut(&mut self, name: &str) -> TrapResult<&mut MockDialog> {
        self.dialogs
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| TrapError::invalid_fixture(format!("no simulated dialog named {name}")))
    }

    /// Let focus escape to `<body>` instead of wrapping
    pub fn break_wrap(&mut self, dialog: &str) -> TrapResult<()> {
        self.dialog_mut(dialog)?.broken_wrap = true;
        Ok(())
    }

    /// Make the dialog ignore Escape
    pub fn ignore_escape(&mut self, dialog: &str) -> TrapResult<()> {
        self.dialog_mut(dialog)?.ignore_escape = true;
        Ok(())
    }

    /// Make the dialog's trigger do nothing
    pub fn never_open(&mut self, dialog: &str) -> TrapResult<()> {
        self.dialog_mut(dialog)?.never_opens = true;
        Ok(())
    }

    /// Report the previous active element for `reads` queries after each
    /// Tab/Shift+Tab, like a browser that applies focus asynchronously
    pub fn lag_focus(&mut self, reads: usize) {
        self.focus_lag = reads;
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Names of the open dialogs, bottom to top
    #[must_use]
    pub fn open_dialogs(&self) -> Vec<&str> {
        self.state
            .open
            .iter()
            .map(|&(d, _)| self.dialogs[d].name.as_str())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Page behavior
    // -------------------------------------------------------------------------

    fn reset(&mut self) {
        let generation = self.state.generation + 1;
        self.state = PageState {
            generation,
            ..PageState::default()
        };
        self.stale_reads.store(0, Ordering::SeqCst);
    }

    fn resolve(&self, selector: &str) -> TrapResult<usize> {
        self.aliases
            .get(selector)
            .and_then(|ns| ns.first())
            .copied()
            .ok_or_else(|| TrapError::not_found(selector))
    }

    fn is_open(&self, dialog: usize) -> bool {
        self.state.open.iter().any(|&(d, _)| d == dialog)
    }

    fn displayed(&self, node: usize) -> bool {
        self.nodes[node].owner.map_or(true, |d| self.is_open(d))
    }

    fn handle(&self, node: usize) -> ElementHandle {
        let n = &self.nodes[node];
        ElementHandle {
            node_id: format!("n{}-{node}", self.state.generation),
            tag_name: n.tag.clone(),
            text_content: n.text.clone(),
            attributes: n.attributes.clone(),
        }
    }

    fn observed_active(&self) -> usize {
        let stale = self.stale_reads.load(Ordering::SeqCst);
        if stale > 0 {
            self.stale_reads.store(stale - 1, Ordering::SeqCst);
            self.state.previous_active
        } else {
            self.state.active
        }
    }

    fn focus(&mut self, node: usize) {
        self.state.active = node;
        self.state.previous_active = node;
        self.state.fresh = false;
        self.stale_reads.store(0, Ordering::SeqCst);
    }

    fn open(&mut self, dialog: usize, opener: usize) {
        if self.dialogs[dialog].never_opens || self.is_open(dialog) {
            return;
        }
        self.state.open.push((dialog, opener));
        let start = self.dialogs[dialog].start;
        self.focus(start);
        self.state.fresh = true;
    }

    fn press(&mut self, chord: KeyChord) {
        let Some(&(top, opener)) = self.state.open.last() else {
            return;
        };
        let dialog = &self.dialogs[top];
        let active = self.state.active;
        match chord.key {
            Key::Tab => {
                let direction = if chord.shift {
                    Direction::Backward
                } else {
                    Direction::Forward
                };
                let next = dialog.next_focus(active, direction, self.state.fresh);
                self.state.previous_active = active;
                self.state.active = next;
                self.state.fresh = false;
                self.stale_reads.store(self.focus_lag, Ordering::SeqCst);
            }
            Key::Escape => {
                let inside = active == dialog.container || self.nodes[active].owner == Some(top);
                if inside && !dialog.ignore_escape {
                    self.state.open.pop();
                    let back = if self.displayed(opener) { opener } else { BODY };
                    self.focus(back);
                }
            }
        }
    }
}

/// Tag implied by the last compound of a selector, e.g. `input` for
/// `#dialog1 .item:nth-child(1) input`
fn tag_for(selector: &str) -> &str {
    let compound = selector.split_whitespace().last().unwrap_or("");
    let end = compound
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(compound.len());
    match &compound[..end] {
        "" => "div",
        tag => tag,
    }
}

/// `dialog1` for `#dialog1`, `None` for anything more complex
fn simple_id(selector: &str) -> Option<&str> {
    selector
        .strip_prefix('#')
        .filter(|id| {
            !id.is_empty()
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

#[async_trait]
impl FocusDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> TrapResult<()> {
        self.call_history.push(format!("navigate:{url}"));
        self.url = url.to_string();
        self.reset();
        Ok(())
    }

    async fn current_url(&self) -> TrapResult<String> {
        Ok(self.url.clone())
    }

    async fn query_all(&self, selector: &str) -> TrapResult<Vec<ElementHandle>> {
        Ok(self
            .aliases
            .get(selector)
            .map(|ns| ns.iter().map(|&n| self.handle(n)).collect())
            .unwrap_or_default())
    }

    async fn click(&mut self, selector: &str) -> TrapResult<()> {
        self.call_history.push(format!("click:{selector}"));
        let node = self.resolve(selector)?;
        if !self.displayed(node) {
            return Err(TrapError::ElementNotInteractable {
                selector: selector.to_string(),
            });
        }
        match self.openers.get(&node) {
            Some(&dialog) => self.open(dialog, node),
            None => self.focus(node),
        }
        Ok(())
    }

    async fn send_keys(&mut self, target: KeyTarget<'_>, chord: KeyChord) -> TrapResult<()> {
        self.call_history.push(format!("keys:{chord}"));
        if let KeyTarget::Selector(selector) = target {
            let node = self.resolve(selector)?;
            if !self.displayed(node) {
                return Err(TrapError::ElementNotInteractable {
                    selector: selector.to_string(),
                });
            }
            self.focus(node);
        }
        self.press(chord);
        Ok(())
    }

    async fn is_displayed(&self, selector: &str) -> TrapResult<bool> {
        let node = self.resolve(selector)?;
        Ok(self.displayed(node))
    }

    async fn active_element(&self) -> TrapResult<Option<ElementHandle>> {
        Ok(Some(self.handle(self.observed_active())))
    }

    async fn is_active(&self, selector: &str) -> TrapResult<bool> {
        let node = self.resolve(selector)?;
        Ok(node == self.observed_active())
    }

    async fn close(&mut self) -> TrapResult<()> {
        self.call_history.push("close".to_string());
        self.reset();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn example() -> MockDriver {
        MockDriver::from_suite(&SuiteConfig::modal_example()).unwrap()
    }

    mod helper_tests {
        use super::*;

        #[test]
        fn test_tag_for() {
            assert_eq!(tag_for("#dialog1 .dialog_form_item:nth-child(1) input"), "input");
            assert_eq!(tag_for("#dialog1 button:nth-child(2)"), "button");
            assert_eq!(tag_for("#dialog2 a"), "a");
            assert_eq!(tag_for("#dialog1"), "div");
        }

        #[test]
        fn test_simple_id() {
            assert_eq!(simple_id("#dialog1"), Some("dialog1"));
            assert_eq!(simple_id("#dialog1 button"), None);
            assert_eq!(simple_id(".x"), None);
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_dialogs_start_hidden() {
            let page = example();
            assert!(!page.is_displayed("#dialog1").await.unwrap());
            assert!(page.is_displayed("#ex1 button").await.unwrap());
            assert!(page.open_dialogs().is_empty());
        }

        #[tokio::test]
        async fn test_click_opens_and_focuses_first() {
            let mut page = example();
            page.click("#ex1 button").await.unwrap();
            assert!(page.is_displayed("#dialog1").await.unwrap());
            assert!(page
                .is_active("#dialog1 .dialog_form_item:nth-child(1) input")
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_hidden_trigger_is_not_interactable() {
            let mut page = example();
            let err = page
                .click("#dialog1 .dialog_form_actions button:nth-child(1)")
                .await
                .unwrap_err();
            assert!(matches!(err, TrapError::ElementNotInteractable { .. }));
        }

        #[tokio::test]
        async fn test_unknown_locator() {
            let page = example();
            assert!(page.is_displayed("#nope").await.unwrap_err().is_not_found());
            assert!(page.query_all("#nope").await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_dialog2_lead_in() {
            let mut page = example();
            page.click("#ex1 button").await.unwrap();
            page.click("#dialog1 .dialog_form_actions button:nth-child(1)")
                .await
                .unwrap();
            assert_eq!(page.open_dialogs(), vec!["dialog1", "dialog2"]);
            assert!(!page.is_active("#dialog2 a").await.unwrap());
            page.send_keys(KeyTarget::Active, KeyChord::TAB).await.unwrap();
            assert!(page.is_active("#dialog2 a").await.unwrap());
        }

        fn single(fixture: DialogFixture) -> MockDriver {
            let suite = SuiteConfig {
                dialogs: vec![fixture],
                ..SuiteConfig::modal_example()
            };
            MockDriver::from_suite(&suite).unwrap()
        }

        fn three(tab_lead_in: usize, shift_tab_lead_in: usize) -> DialogFixture {
            DialogFixture::new("d", "#d")
                .click("#open")
                .focusable("#d .a")
                .focusable("#d .b")
                .focusable("#d .c")
                .with_lead_in(tab_lead_in, shift_tab_lead_in)
        }

        #[tokio::test]
        async fn test_initial_focus_on_last_element() {
            let mut page = single(three(1, 0));
            page.click("#open").await.unwrap();
            assert!(page.is_active("#d .c").await.unwrap());
            page.send_keys(KeyTarget::Active, KeyChord::TAB).await.unwrap();
            assert!(page.is_active("#d .a").await.unwrap());
        }

        #[tokio::test]
        async fn test_sentinel_only_on_first_shift_tab() {
            let mut page = single(three(0, 2));
            page.click("#open").await.unwrap();
            assert!(page.is_active("#d .a").await.unwrap());
            page.send_keys(KeyTarget::Active, KeyChord::SHIFT_TAB)
                .await
                .unwrap();
            assert!(!page.is_active("#d .c").await.unwrap());
            page.send_keys(KeyTarget::Active, KeyChord::SHIFT_TAB)
                .await
                .unwrap();
            assert!(page.is_active("#d .c").await.unwrap());
            for _ in 0..3 {
                page.send_keys(KeyTarget::Active, KeyChord::SHIFT_TAB)
                    .await
                    .unwrap();
            }
            assert!(page.is_active("#d .c").await.unwrap());
        }

        #[tokio::test]
        async fn test_escape_closes_top_and_restores_opener() {
            let mut page = example();
            page.click("#ex1 button").await.unwrap();
            page.click("#dialog1 .dialog_form_actions button:nth-child(2)")
                .await
                .unwrap();
            page.send_keys(KeyTarget::Selector("#dialog3 a"), KeyChord::ESCAPE)
                .await
                .unwrap();
            assert_eq!(page.open_dialogs(), vec!["dialog1"]);
            assert!(page
                .is_active("#dialog1 .dialog_form_actions button:nth-child(2)")
                .await
                .unwrap());
        }

        #[tokio::test]
        async fn test_reload_resets_state_and_identity() {
            let mut page = example();
            page.click("#ex1 button").await.unwrap();
            let before = page.active_element().await.unwrap().unwrap();
            page.reload().await.unwrap();
            assert!(page.open_dialogs().is_empty());
            let after = page.active_element().await.unwrap().unwrap();
            assert_eq!(after.tag_name, "body");
            assert_ne!(before.node_id, after.node_id);
            assert!(page.was_called("navigate:mock://dialog-modal"));
        }

        #[tokio::test]
        async fn test_aria_attributes() {
            let page = example();
            let dialogs = page.query_all(r#"[role="dialog"]"#).await.unwrap();
            assert_eq!(dialogs.len(), 4);
            assert!(dialogs.iter().all(|d| d.attribute("aria-modal") == Some("true")));
            assert!(dialogs[0].attribute("aria-describedby").is_none());
            assert_eq!(dialogs[1].attribute("aria-describedby"), Some("dialog2_desc"));
            let label = page
                .query(&id_locator("dialog1_label"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(label.text_content.as_deref(), Some("dialog1 title"));
        }
    }

    mod fault_tests {
        use super::*;

        #[tokio::test]
        async fn test_focus_lag() {
            let mut page = example();
            page.lag_focus(2);
            page.click("#ex1 button").await.unwrap();
            page.send_keys(KeyTarget::Active, KeyChord::TAB).await.unwrap();
            let second = "#dialog1 .dialog_form_item:nth-child(2) input";
            assert!(!page.is_active(second).await.unwrap());
            assert!(!page.is_active(second).await.unwrap());
            assert!(page.is_active(second).await.unwrap());
        }

        #[tokio::test]
        async fn test_broken_wrap_escapes_to_body() {
            let mut page = example();
            page.break_wrap("dialog3").unwrap();
            page.click("#ex1 button").await.unwrap();
            page.click("#dialog1 .dialog_form_actions button:nth-child(2)")
                .await
                .unwrap();
            page.send_keys(KeyTarget::Active, KeyChord::SHIFT_TAB)
                .await
                .unwrap();
            let active = page.active_element().await.unwrap().unwrap();
            assert_eq!(active.tag_name, "body");
        }

        #[test]
        fn test_unknown_fault_target() {
            let mut page = example();
            assert!(page.ignore_escape("dialog9").is_err());
        }
    }
}
