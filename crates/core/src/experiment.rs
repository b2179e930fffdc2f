//! Experiment parameters submitted with a screenshot.
//!
//! [`WebpageRequest`] carries the raw form fields exactly as received. [`ExperimentSpec`] is the
//! structured form the prompt builder consumes; it only exists when every required field was
//! supplied.

use std::collections::BTreeSet;

/// One interaction signal the generated page must capture and forward to the survey.
///
/// Variant order is the canonical order used for prompt bullets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataPoint {
    Choice,
    AllClicks,
    DecisionTime,
    MaxScroll,
}

impl DataPoint {
    pub const ALL: [DataPoint; 4] = [
        DataPoint::Choice,
        DataPoint::AllClicks,
        DataPoint::DecisionTime,
        DataPoint::MaxScroll,
    ];

    /// Parse a form value. Unknown values yield `None`.
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value.trim() {
            "choice" => Some(DataPoint::Choice),
            "allClicks" => Some(DataPoint::AllClicks),
            "decisionTime" => Some(DataPoint::DecisionTime),
            "maxScroll" => Some(DataPoint::MaxScroll),
            _ => None,
        }
    }

    /// The form value and survey query-parameter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataPoint::Choice => "choice",
            DataPoint::AllClicks => "allClicks",
            DataPoint::DecisionTime => "decisionTime",
            DataPoint::MaxScroll => "maxScroll",
        }
    }
}

impl std::fmt::Display for DataPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured experiment parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExperimentSpec {
    /// Human-readable description of what triggers the redirect, e.g. "clicks Buy now".
    pub redirect_condition: String,
    pub tracked_data_points: BTreeSet<DataPoint>,
    pub modifications: Option<String>,
    pub has_multiple_versions: bool,
    pub version_difference: Option<String>,
    /// Inserted verbatim, not validated as a URL.
    pub survey_redirect_url: String,
}

impl ExperimentSpec {
    /// Collect recognised data points from raw form values, ignoring unknown ones.
    pub fn data_points_from_form<I, S>(values: I) -> BTreeSet<DataPoint>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values
            .into_iter()
            .filter_map(|v| {
                let parsed = DataPoint::from_form_value(v.as_ref());
                if parsed.is_none() {
                    tracing::debug!("ignoring unknown data point {:?}", v.as_ref());
                }
                parsed
            })
            .collect()
    }
}

/// Raw fields of a webpage generation form submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebpageRequest {
    pub email: Option<String>,
    pub redirect: Option<String>,
    pub data_points: Vec<String>,
    pub modifications: Option<String>,
    pub multiple_versions: Option<String>,
    pub version_difference: Option<String>,
    pub qualtrics_url: Option<String>,
}

impl WebpageRequest {
    /// Build the structured spec, or `None` when a required field is missing.
    ///
    /// Required: `redirect`, `qualtricsUrl` and `multipleVersions` with non-blank values, and at
    /// least one submitted `dataPoints` value (recognised or not).
    pub fn experiment_spec(&self) -> Option<ExperimentSpec> {
        let redirect = present(&self.redirect)?;
        let survey_url = present(&self.qualtrics_url)?;
        let multiple_versions = present(&self.multiple_versions)?;
        if self.data_points.is_empty() {
            return None;
        }

        Some(ExperimentSpec {
            redirect_condition: redirect.to_string(),
            tracked_data_points: ExperimentSpec::data_points_from_form(&self.data_points),
            modifications: present(&self.modifications).map(str::to_string),
            has_multiple_versions: multiple_versions == "Yes",
            version_difference: present(&self.version_difference).map(str::to_string),
            survey_redirect_url: survey_url.to_string(),
        })
    }

    /// Submitter address, if one was given.
    pub fn submitter_email(&self) -> Option<&str> {
        present(&self.email)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> WebpageRequest {
        WebpageRequest {
            email: Some("student@example.test".into()),
            redirect: Some("clicks the Buy button".into()),
            data_points: vec!["maxScroll".into(), "choice".into()],
            modifications: Some("".into()),
            multiple_versions: Some("No".into()),
            version_difference: None,
            qualtrics_url: Some("https://survey.example.test/jfe/form/SV_1".into()),
        }
    }

    #[test]
    fn data_points_are_canonically_ordered_and_unknowns_dropped() {
        let points = ExperimentSpec::data_points_from_form(["maxScroll", "hover", "choice"]);
        let ordered: Vec<_> = points.into_iter().collect();
        assert_eq!(ordered, vec![DataPoint::Choice, DataPoint::MaxScroll]);
    }

    #[test]
    fn complete_request_builds_spec() {
        let spec = complete_request().experiment_spec().unwrap();
        assert_eq!(spec.redirect_condition, "clicks the Buy button");
        assert_eq!(spec.modifications, None);
        assert!(!spec.has_multiple_versions);
        assert_eq!(
            spec.survey_redirect_url,
            "https://survey.example.test/jfe/form/SV_1"
        );
    }

    #[test]
    fn multiple_versions_only_on_exact_yes() {
        let mut req = complete_request();
        req.multiple_versions = Some("Yes".into());
        assert!(req.experiment_spec().unwrap().has_multiple_versions);

        req.multiple_versions = Some("yes please".into());
        assert!(!req.experiment_spec().unwrap().has_multiple_versions);
    }

    #[test]
    fn missing_required_field_yields_none() {
        let mut req = complete_request();
        req.qualtrics_url = None;
        assert!(req.experiment_spec().is_none());

        let mut req = complete_request();
        req.redirect = Some("   ".into());
        assert!(req.experiment_spec().is_none());

        let mut req = complete_request();
        req.data_points.clear();
        assert!(req.experiment_spec().is_none());

        let mut req = complete_request();
        req.multiple_versions = None;
        assert!(req.experiment_spec().is_none());
    }

    #[test]
    fn unrecognised_data_points_still_count_as_submitted() {
        let mut req = complete_request();
        req.data_points = vec!["hover".into()];
        let spec = req.experiment_spec().unwrap();
        assert!(spec.tracked_data_points.is_empty());
    }
}
