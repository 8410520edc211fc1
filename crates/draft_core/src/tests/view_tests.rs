use super::*;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::domain::{DocumentKey, DraftResult, PromotionOutcome};

use crate::session::Capabilities;

fn session(capabilities: Capabilities) -> Session {
    Session::new(DocumentKey::parse("DM-57").expect("key"), capabilities)
}

fn draft(xml: &str) -> DraftResult {
    DraftResult {
        xml: xml.to_string(),
        filename: "DMC-57.xml".to_string(),
        draft_path: "drafts/57.xml".to_string(),
    }
}

#[test]
fn fresh_full_panel_offers_prefill_and_generate_only() {
    let view = project(&session(Capabilities::full()));
    assert_eq!(
        view.enabled,
        EnabledActions {
            prefill: true,
            generate: true,
            ..EnabledActions::default()
        }
    );
    assert_eq!(view.output_text, OUTPUT_PLACEHOLDER);
    assert!(view.download.is_none());
}

#[test]
fn minimal_panel_never_offers_prefill_or_refine() {
    let mut s = session(Capabilities::minimal());
    s.result = Some(draft("<dm/>"));
    s.state = SessionState::Generated;
    s.output = "<dm/>".to_string();

    let view = project(&s);
    assert!(!view.enabled.prefill);
    assert!(!view.enabled.refine);
    assert!(view.enabled.generate);
    assert!(view.enabled.promote);
    assert!(view.enabled.download);
}

#[test]
fn busy_session_disables_every_action() {
    let mut s = session(Capabilities::full());
    s.result = Some(draft("<dm/>"));
    s.state = SessionState::Refining;

    let view = project(&s);
    assert_eq!(view.enabled, EnabledActions::default());
    assert!(view.download.is_none());
}

#[test]
fn promoted_draft_cannot_be_promoted_again() {
    let mut s = session(Capabilities::full());
    s.result = Some(draft("<dm/>"));
    s.state = SessionState::Promoted;
    s.promotion = Some(PromotionOutcome {
        path: Some("csdb/57.xml".to_string()),
    });

    let view = project(&s);
    assert!(!view.enabled.promote);
    assert!(view.enabled.refine);
    assert!(view.enabled.download);
    assert!(view.enabled.generate);
}

#[test]
fn download_mirrors_current_draft() {
    let mut s = session(Capabilities::full());
    s.result = Some(draft("<dm><content>é</content></dm>"));
    s.state = SessionState::Refined;

    let link = project(&s).download.expect("download");
    assert_eq!(link.filename, "DMC-57.xml");
    assert_eq!(link.xml, "<dm><content>é</content></dm>");

    let href = link.href();
    let encoded = href
        .strip_prefix("data:text/xml;charset=utf-8;base64,")
        .expect("data uri prefix");
    let decoded = STANDARD.decode(encoded).expect("base64");
    assert_eq!(decoded, "<dm><content>é</content></dm>".as_bytes());
}

#[test]
fn closed_session_offers_nothing() {
    let mut s = session(Capabilities::full());
    s.closed = true;
    assert_eq!(project(&s).enabled, EnabledActions::default());
}

#[test]
fn enabled_lookup_by_action() {
    let enabled = EnabledActions {
        refine: true,
        ..EnabledActions::default()
    };
    assert!(enabled.is_enabled(Action::Refine));
    assert!(!enabled.is_enabled(Action::Promote));
}
