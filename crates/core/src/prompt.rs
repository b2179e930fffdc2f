//! Generation prompt construction.
//!
//! [`build_prompt`] turns an [`ExperimentSpec`] into the instruction document sent alongside the
//! screenshot. It is pure: the same spec always produces byte-identical text.
//!
//! The document has fixed sections in this order:
//!
//! ```text
//! DESIGN & LAYOUT            fidelity instructions
//! TRACKING & ANALYTICS       base sentence + one bullet per tracked data point
//! REDIRECT & INTEGRATION     survey URL, trigger, query-string contract
//! CUSTOMIZATIONS             requested modifications or "recreate exactly"
//! EXPERIMENT VERSIONS        version differences or "single version"
//! TECHNICAL SPECIFICATIONS   single-file, semantic, cross-browser requirements
//! IMPORTANT                  must not look like an experiment
//! ```

use crate::experiment::{DataPoint, ExperimentSpec};

/// Prompt used when the submission lacks the fields needed for the full builder.
pub const MINIMAL_PROMPT: &str =
    "Please recreate the UI shown in the attached screenshot as accurately as possible.";

/// Query-string contract the generated page must use when redirecting to the survey.
pub const SURVEY_QUERY_CONTRACT: &str = "?choice=X&decisionTime=Y&allClicks=Z&maxScroll=W";

const INTRO: &str = "Create a complete HTML webpage that recreates the design shown in the \
uploaded screenshot. This is for a consumer choice experiment with the following requirements:\n";

const DESIGN_SECTION: &str = "\nDESIGN & LAYOUT:\n\
- Recreate the visual design, layout, colors, fonts, and overall appearance exactly as shown in the screenshot\n\
- Ensure the webpage looks professional, authentic, and matches the original\n\
- Make it fully responsive for different screen sizes\n\
- Use modern CSS techniques and clean code structure\n";

const TECHNICAL_SECTION: &str = "\nTECHNICAL SPECIFICATIONS:\n\
- Generate complete HTML with embedded CSS and JavaScript in a single file\n\
- Use semantic HTML5 elements\n\
- Ensure cross-browser compatibility (Chrome, Firefox, Safari, Edge)\n\
- Add proper error handling for all interactive elements\n\
- Include detailed comments explaining the tracking functionality\n\
- Make sure all buttons and interactive elements work properly\n\
- Test that the Qualtrics redirect functions correctly\n";

const CLOSING: &str = "\nIMPORTANT: The webpage should look and feel exactly like a real \
website/app, not like an obvious experiment. Users should have a natural, authentic experience \
that matches their expectations from the original website.";

/// Canonical bullet for a tracked data point.
pub fn tracking_bullet(point: DataPoint) -> &'static str {
    match point {
        DataPoint::Choice => "- Track which specific option/choice the user selects",
        DataPoint::AllClicks => "- Record all clicks made by the user anywhere on the page",
        DataPoint::DecisionTime => {
            "- Track the total time spent on the page before making a final decision"
        }
        DataPoint::MaxScroll => {
            "- Record the maximum scroll depth reached by the user (as percentage)"
        }
    }
}

/// Build the full generation prompt for an experiment.
pub fn build_prompt(spec: &ExperimentSpec) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(INTRO);
    prompt.push_str(DESIGN_SECTION);

    let requested: Vec<&str> = spec
        .tracked_data_points
        .iter()
        .map(DataPoint::as_str)
        .collect();
    prompt.push_str("\nTRACKING & ANALYTICS:\n");
    prompt.push_str(&format!(
        "Please add JavaScript to track user interactions and record the following data points: {}\n",
        requested.join(", ")
    ));
    // BTreeSet iteration is already canonical order.
    for point in &spec.tracked_data_points {
        prompt.push_str(tracking_bullet(*point));
        prompt.push('\n');
    }

    prompt.push_str("\nREDIRECT & INTEGRATION:\n");
    prompt.push_str(&format!(
        "- Redirect to {} when the user {}\n",
        spec.survey_redirect_url, spec.redirect_condition
    ));
    prompt.push_str(&format!(
        "- Pass all tracked data as URL parameters to Qualtrics in this format: {}\n",
        SURVEY_QUERY_CONTRACT
    ));
    prompt.push_str("- Ensure the redirect happens smoothly without any errors\n");

    prompt.push_str("\nCUSTOMIZATIONS:\n");
    match spec.modifications.as_deref().filter(|m| !m.trim().is_empty()) {
        Some(modifications) => prompt.push_str(&format!(
            "- Apply these specific changes from the original: {}\n",
            modifications
        )),
        None => prompt
            .push_str("- No specific modifications requested - recreate exactly as shown\n"),
    }

    prompt.push_str("\nEXPERIMENT VERSIONS:\n");
    if spec.has_multiple_versions {
        prompt.push_str(&format!(
            "- This experiment requires multiple versions with the following differences: {}\n",
            spec.version_difference.as_deref().unwrap_or_default()
        ));
    } else {
        prompt.push_str("- Single version only\n");
    }

    prompt.push_str(TECHNICAL_SECTION);
    prompt.push_str(CLOSING);

    prompt
}
