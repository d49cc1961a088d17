//! Rule-based research-intent classification.

use crate::types::IntentLabel;

/// Ordered rule table; the first rule with a matching trigger wins.
const INTENT_RULES: &[(&[&str], IntentLabel)] = &[
    (&["survey", "review"], IntentLabel::Survey),
    (
        &["model", "algorithm", "network"],
        IntentLabel::ModelOrAlgorithm,
    ),
    (
        &["dataset", "experiment", "data"],
        IntentLabel::DatasetOrExperimental,
    ),
];

/// Classify a sequence of terms into an intent label.
pub fn classify<S: AsRef<str>>(terms: &[S]) -> IntentLabel {
    let lowered: Vec<String> = terms.iter().map(|t| t.as_ref().to_lowercase()).collect();

    INTENT_RULES
        .iter()
        .find(|(triggers, _)| lowered.iter().any(|t| triggers.contains(&t.as_str())))
        .map(|(_, label)| *label)
        .unwrap_or(IntentLabel::General)
}

/// Classify a raw, user-typed query by its whitespace tokens.
pub fn classify_query(raw: &str) -> IntentLabel {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    classify(&tokens)
}
