//! End-to-end workflow scenarios over the parser + session pipeline
//!
//! Exercises the full result chain with canned upstream replies, without
//! touching the network: model reply → parser → session transitions →
//! verdict, mirroring one complete user run.

use gwa_relay::models::{Session, WorkflowState};
use gwa_relay::services::parse_analysis_reply;

#[test]
fn one_jpeg_fenced_reply_advances_to_awaiting_report() {
    let model_reply = "```json\n{\"companyName\":\"Acme\",\"analysis\":\"Uses vague terms\"}\n```";

    let record = parse_analysis_reply(model_reply).unwrap();
    assert_eq!(record.company_name, "Acme");
    assert_eq!(record.analysis, "Uses vague terms");

    let mut session = Session::new();
    session.record_image_analysis(record).unwrap();
    assert_eq!(session.state, WorkflowState::AwaitingReport);
}

#[test]
fn unparseable_reply_never_advances_the_session() {
    let mut session = Session::new();

    for reply in [
        "",
        "The advert looks environmentally friendly to me.",
        "```json\n{\"companyName\":\"Acme\"",
    ] {
        if let Ok(record) = parse_analysis_reply(reply) {
            session.record_image_analysis(record).unwrap();
        }
        assert_eq!(session.state, WorkflowState::AwaitingImage);
        assert!(session.image_analysis.is_none());
    }
}

#[test]
fn extracted_text_is_stored_verbatim() {
    // The collaborator's reply body as the extraction client decodes it
    let extracted = "Annual sustainability report...";

    let mut session = Session::new();
    session
        .record_image_analysis(
            parse_analysis_reply("{\"companyName\":\"Acme\",\"analysis\":\"Uses vague terms\"}")
                .unwrap(),
        )
        .unwrap();
    session.record_report_text(extracted.to_string()).unwrap();

    assert_eq!(session.state, WorkflowState::AwaitingVerdict);
    assert_eq!(session.report_text, extracted);
}

#[test]
fn verdict_completes_the_run_with_no_further_transition() {
    let mut session = Session::new();
    session
        .record_image_analysis(
            parse_analysis_reply("{\"companyName\":\"Acme\",\"analysis\":\"Uses vague terms\"}")
                .unwrap(),
        )
        .unwrap();
    session
        .record_report_text("Annual sustainability report...".to_string())
        .unwrap();

    let verdict = "Positive aspects: ... Possible greenwashing indicators: ... Verdict: likely greenwashing.";
    session.record_verdict(verdict.to_string()).unwrap();

    assert_eq!(session.state, WorkflowState::Done);
    assert_eq!(session.verdict, verdict);
    assert!(session.record_verdict("again".to_string()).is_err());
    assert_eq!(session.verdict, verdict);
}
