//! Embedded fallback page.
//!
//! Returned whenever the provider output cannot be turned into a valid document. The page has
//! three choice buttons and an inline tracking script that records the start time, every click
//! (target tag, elapsed ms, pointer coordinates) and the deepest scroll percentage. Choosing an
//! option navigates to the survey with `choice`, `decisionTime`, `allClicks` (JSON) and
//! `maxScroll` as query parameters, matching [`crate::prompt::SURVEY_QUERY_CONTRACT`].

/// The fallback document.
pub const FALLBACK_HTML: &str = include_str!("../templates/fallback.html");

/// Placeholder the experimenter replaces with their survey URL.
pub const FALLBACK_REDIRECT_PLACEHOLDER: &str = "YOUR_QUALTRICS_URL";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::has_document_root;
    use crate::experiment::DataPoint;

    #[test]
    fn fallback_is_a_complete_document() {
        assert!(FALLBACK_HTML.starts_with("<!DOCTYPE html>"));
        assert!(has_document_root(FALLBACK_HTML));
        assert!(FALLBACK_HTML.trim_end().ends_with("</html>"));
    }

    #[test]
    fn fallback_forwards_every_data_point() {
        for point in DataPoint::ALL {
            assert!(
                FALLBACK_HTML.contains(&format!("{}: ", point.as_str())),
                "missing query parameter {point}"
            );
        }
        assert!(FALLBACK_HTML.contains("allClicks: JSON.stringify(allClicks)"));
        assert!(FALLBACK_HTML.contains(&format!("'{}?'", FALLBACK_REDIRECT_PLACEHOLDER)));
    }

    #[test]
    fn fallback_records_click_details() {
        for field in ["element: e.target.tagName", "time: Date.now() - startTime", "x: e.clientX", "y: e.clientY"] {
            assert!(FALLBACK_HTML.contains(field), "missing {field}");
        }
        assert_eq!(FALLBACK_HTML.matches("recordChoice('option").count(), 3);
    }
}
