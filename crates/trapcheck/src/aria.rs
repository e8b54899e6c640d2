//! Static ARIA attribute checks for the dialog containers.
//!
//! Each check is a single scenario body: it queries the page once and
//! records its assertions into the supplied report.

use crate::driver::{id_locator, ElementHandle, FocusDriver};
use crate::fixture::AriaExpectations;
use crate::report::ScenarioReport;
use crate::result::TrapResult;

/// Assertions made by [`check_dialog_role`]
#[must_use]
pub const fn dialog_role_plan(aria: &AriaExpectations) -> usize {
    aria.expected_dialog_count + 1
}

/// Exactly the expected number of dialogs exist and each uses the
/// expected tag.
pub async fn check_dialog_role<D: FocusDriver + ?Sized>(
    driver: &D,
    aria: &AriaExpectations,
    report: &mut ScenarioReport,
) -> TrapResult<()> {
    let dialogs = driver.query_all(&aria.dialog_selector).await?;
    report.assert_eq(
        &dialogs.len(),
        &aria.expected_dialog_count,
        format!(
            "{} role=\"dialog\" elements should be found by selector: {}",
            aria.expected_dialog_count, aria.dialog_selector
        ),
    );
    for dialog in &dialogs {
        report.assert_eq(
            &dialog.tag_name.as_str(),
            &aria.expected_tag.as_str(),
            format!(
                "\"role=dialog\" should be found on a \"{}\" element",
                aria.expected_tag
            ),
        );
    }
    Ok(())
}

/// Every dialog names itself through `aria-labelledby`
pub async fn check_labelledby<D: FocusDriver + ?Sized>(
    driver: &D,
    aria: &AriaExpectations,
    report: &mut ScenarioReport,
) -> TrapResult<()> {
    check_references(driver, &aria.dialog_selector, "aria-labelledby", report).await
}

/// The selected dialogs describe themselves through `aria-describedby`
pub async fn check_describedby<D: FocusDriver + ?Sized>(
    driver: &D,
    aria: &AriaExpectations,
    report: &mut ScenarioReport,
) -> TrapResult<()> {
    check_references(driver, &aria.describedby_selector, "aria-describedby", report).await
}

/// Every dialog is marked `aria-modal="true"`
pub async fn check_modal<D: FocusDriver + ?Sized>(
    driver: &D,
    aria: &AriaExpectations,
    report: &mut ScenarioReport,
) -> TrapResult<()> {
    let dialogs = driver.query_all(&aria.dialog_selector).await?;
    let wrong: Vec<String> = dialogs
        .iter()
        .filter(|d| d.attribute("aria-modal") != Some("true"))
        .map(ElementHandle::describe)
        .collect();
    report.assert_true(
        !dialogs.is_empty() && wrong.is_empty(),
        format!(
            "Every element matching {} should have aria-modal=\"true\"{}",
            aria.dialog_selector,
            problems(&wrong)
        ),
    );
    Ok(())
}

/// One assertion: every element matching `selector` carries `attribute`,
/// and every id it references exists with non-empty text.
async fn check_references<D: FocusDriver + ?Sized>(
    driver: &D,
    selector: &str,
    attribute: &str,
    report: &mut ScenarioReport,
) -> TrapResult<()> {
    let elements = driver.query_all(selector).await?;
    let mut wrong = Vec::new();

    for element in &elements {
        let ids = element
            .attribute(attribute)
            .map(|v| v.split_whitespace().collect::<Vec<_>>())
            .unwrap_or_default();
        if ids.is_empty() {
            wrong.push(format!("{} has no {attribute}", element.describe()));
            continue;
        }
        for id in ids {
            let target = driver.query(&id_locator(id)).await?;
            let has_text = target
                .as_ref()
                .and_then(|t| t.text_content.as_deref())
                .is_some_and(|text| !text.trim().is_empty());
            if !has_text {
                wrong.push(format!(
                    "{} references #{id}, which is missing or empty",
                    element.describe()
                ));
            }
        }
    }

    tracing::debug!(%selector, %attribute, checked = elements.len(), "aria references");
    report.assert_true(
        !elements.is_empty() && wrong.is_empty(),
        format!(
            "Elements matching {selector} should have {attribute} pointing at labelled content{}",
            problems(&wrong)
        ),
    );
    Ok(())
}

fn problems(wrong: &[String]) -> String {
    if wrong.is_empty() {
        String::new()
    } else {
        format!(": {}", wrong.join("; "))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixture::SuiteConfig;
    use crate::mock::MockDriver;

    fn page() -> (AriaExpectations, MockDriver) {
        let suite = SuiteConfig::modal_example();
        let page = MockDriver::from_suite(&suite).unwrap();
        (suite.aria, page)
    }

    mod passing_tests {
        use super::*;

        #[tokio::test]
        async fn test_dialog_role() {
            let (aria, page) = page();
            let mut report = ScenarioReport::new("dialog-role");
            report.plan(dialog_role_plan(&aria));
            check_dialog_role(&page, &aria, &mut report).await.unwrap();
            assert!(report.passed(), "{:?}", report.failures());
            assert_eq!(report.count(), 5);
        }

        #[tokio::test]
        async fn test_labelledby_resolves_ids_with_css_special_characters() {
            let mut suite = SuiteConfig::modal_example();
            suite.dialogs.truncate(1);
            suite.dialogs[0].name = "1st.dialog:x".to_string();
            suite.aria.expected_dialog_count = 1;
            let page = MockDriver::from_suite(&suite).unwrap();
            let mut report = ScenarioReport::new("aria-labelledby");
            check_labelledby(&page, &suite.aria, &mut report).await.unwrap();
            assert!(report.passed(), "{:?}", report.failures());
        }

        #[tokio::test]
        async fn test_labelledby_and_describedby() {
            let (aria, page) = page();
            let mut report = ScenarioReport::new("aria");
            check_labelledby(&page, &aria, &mut report).await.unwrap();
            check_describedby(&page, &aria, &mut report).await.unwrap();
            check_modal(&page, &aria, &mut report).await.unwrap();
            assert_eq!(report.count(), 3);
            assert!(report.passed(), "{:?}", report.failures());
        }
    }

    mod failing_tests {
        use super::*;

        #[tokio::test]
        async fn test_wrong_dialog_count_misses_plan() {
            let (mut aria, page) = page();
            aria.expected_dialog_count = 5;
            let mut report = ScenarioReport::new("dialog-role");
            report.plan(dialog_role_plan(&aria));
            check_dialog_role(&page, &aria, &mut report).await.unwrap();
            assert_eq!(report.failed_count(), 1);
            assert!(report.plan_missed());
        }

        #[tokio::test]
        async fn test_wrong_tag() {
            let (mut aria, page) = page();
            aria.expected_tag = "dialog".to_string();
            let mut report = ScenarioReport::new("dialog-role");
            check_dialog_role(&page, &aria, &mut report).await.unwrap();
            assert_eq!(report.failed_count(), 4);
        }

        #[tokio::test]
        async fn test_describedby_missing_on_dialog1() {
            let (mut aria, page) = page();
            aria.describedby_selector = aria.dialog_selector.clone();
            let mut report = ScenarioReport::new("aria-describedby");
            check_describedby(&page, &aria, &mut report).await.unwrap();
            let msg = &report.failures()[0].message;
            assert!(msg.contains("div#dialog1 has no aria-describedby"));
        }

        #[tokio::test]
        async fn test_no_matching_elements_fails() {
            let (mut aria, page) = page();
            aria.dialog_selector = "#nothing".to_string();
            let mut report = ScenarioReport::new("aria-modal");
            check_modal(&page, &aria, &mut report).await.unwrap();
            assert!(!report.passed());
        }
    }
}
