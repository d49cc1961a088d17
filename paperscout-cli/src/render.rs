//! Text and JSON rendering of pipeline results.

use std::fmt::Write as _;

use paperscout_core::{Discovery, PaperScoutError, PipelineError, ReadinessError, SummaryReport};
use serde_json::json;

pub fn summary_report(report: &SummaryReport, as_json: bool) -> anyhow::Result<String> {
    if as_json {
        let mut value = serde_json::to_value(report)?;
        value["intent_description"] = json!(report.intent.description());
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    writeln!(out, "Summary ({}):", report.tier)?;
    if report.summary.is_empty() {
        writeln!(out, "  (the summarizer returned an empty summary)")?;
    } else {
        writeln!(out, "  {}", report.summary)?;
    }
    writeln!(out)?;
    if report.keywords.is_empty() {
        writeln!(out, "Keywords: (none)")?;
    } else {
        writeln!(out, "Keywords: {}", report.keywords.join(", "))?;
    }
    write!(out, "Intent: {}", report.intent.description())?;
    Ok(out)
}

pub fn discovery(discovery: &Discovery, as_json: bool) -> anyhow::Result<String> {
    if as_json {
        let mut value = serde_json::to_value(discovery)?;
        if let Some(intent) = discovery.intent {
            value["intent_description"] = json!(intent.description());
        }
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    writeln!(out, "Query: {}", discovery.query)?;
    if !discovery.keywords.is_empty() {
        writeln!(out, "Keywords: {}", discovery.keywords.join(", "))?;
    }
    if let Some(intent) = discovery.intent {
        writeln!(out, "Intent: {}", intent.description())?;
    }
    writeln!(out)?;

    if discovery.papers.is_empty() {
        write!(out, "No papers found.")?;
        return Ok(out);
    }
    let last = discovery.papers.len() - 1;
    for (i, paper) in discovery.papers.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, paper.title)?;
        write!(out, "   {}", paper.link)?;
        if i != last {
            writeln!(out)?;
        }
    }
    Ok(out)
}

/// One-line status for a failed command.
pub fn status_line(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PaperScoutError>() {
        Some(PaperScoutError::Pipeline(PipelineError::Readiness(ReadinessError::TooShort {
            actual,
            threshold,
        }))) => format!(
            "error: input too short ({} characters); provide more than {} characters of text",
            actual, threshold
        ),
        Some(PaperScoutError::Pipeline(PipelineError::Readiness(ReadinessError::EmptyQuery))) => {
            "error: no usable search terms; try longer or more specific text".to_string()
        }
        _ => format!("error: {:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperscout_core::{IntentLabel, LengthTier, PaperRecord, SearchQuery};
    use pretty_assertions::assert_eq;

    fn report() -> SummaryReport {
        SummaryReport {
            summary: "Drones learn to fly.".to_string(),
            keywords: vec!["drone".to_string(), "flight".to_string()],
            intent: IntentLabel::ModelOrAlgorithm,
            tier: LengthTier::Short,
        }
    }

    #[test]
    fn test_summary_report_text() {
        let text = summary_report(&report(), false).unwrap();
        assert_eq!(
            text,
            "Summary (short):\n  Drones learn to fly.\n\nKeywords: drone, flight\n\
             Intent: Model / Algorithm based research"
        );
    }

    #[test]
    fn test_summary_report_json() {
        let text = summary_report(&report(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["intent"], "model_or_algorithm");
        assert_eq!(value["tier"], "short");
        assert_eq!(value["intent_description"], "Model / Algorithm based research");
    }

    #[test]
    fn test_discovery_text() {
        let discovery = Discovery {
            query: SearchQuery::new("smart autonomous drone"),
            keywords: Vec::new(),
            papers: vec![
                PaperRecord::new("A", "http://x/1"),
                PaperRecord::new("B", "http://x/2"),
            ],
            intent: Some(IntentLabel::General),
            warning: None,
        };
        let text = discovery_text(&discovery);
        assert_eq!(
            text,
            "Query: smart autonomous drone\nIntent: General research exploration\n\n\
             1. A\n   http://x/1\n2. B\n   http://x/2"
        );
    }

    fn discovery_text(d: &Discovery) -> String {
        discovery(d, false).unwrap()
    }

    #[test]
    fn test_discovery_empty() {
        let d = Discovery {
            query: SearchQuery::new("graph"),
            keywords: vec!["graph".to_string()],
            papers: Vec::new(),
            intent: None,
            warning: Some("Search service unavailable: timeout".to_string()),
        };
        assert!(discovery_text(&d).ends_with("No papers found."));
        let value: serde_json::Value = serde_json::from_str(&discovery(&d, true).unwrap()).unwrap();
        assert_eq!(value["warning"], "Search service unavailable: timeout");
        assert!(value.get("intent_description").is_none());
    }

    #[test]
    fn test_status_line() {
        let err: anyhow::Error = PaperScoutError::Pipeline(PipelineError::Readiness(
            ReadinessError::TooShort {
                actual: 12,
                threshold: 200,
            },
        ))
        .into();
        assert!(status_line(&err).contains("more than 200 characters"));

        let err = anyhow::anyhow!("boom");
        assert_eq!(status_line(&err), "error: boom");
    }
}
