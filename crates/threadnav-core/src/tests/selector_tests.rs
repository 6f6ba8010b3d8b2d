use super::{Selector, SelectorErrorKind};
use crate::document::HostDocument;
use crate::memory::MemoryDocument;

fn sample() -> (MemoryDocument, usize, usize, usize) {
    let mut doc = MemoryDocument::new();
    let body = doc.body();
    let main = doc.append_element(body, "MAIN", &[("id", "thread")]);
    let article = doc.append_element(
        main,
        "article",
        &[("data-testid", "conversation-turn"), ("class", "turn first")],
    );
    let role = doc.append_element(article, "div", &[("data-message-author-role", "user")]);
    (doc, main, article, role)
}

#[test]
fn matches_type_id_class_and_attribute() {
    let (doc, main, article, role) = sample();
    assert!(Selector::parse("main").unwrap().matches(&doc, main));
    assert!(Selector::parse("#thread").unwrap().matches(&doc, main));
    assert!(Selector::parse("article.turn.first").unwrap().matches(&doc, article));
    assert!(!Selector::parse("article.turn.second").unwrap().matches(&doc, article));
    assert!(Selector::parse("[data-message-author-role]").unwrap().matches(&doc, role));
    assert!(Selector::parse(r#"[data-testid="conversation-turn"]"#)
        .unwrap()
        .matches(&doc, article));
    assert!(!Selector::parse("[data-testid='other']").unwrap().matches(&doc, article));
    assert!(Selector::parse("*").unwrap().matches(&doc, role));
}

#[test]
fn type_selectors_ignore_case() {
    let (doc, main, _, _) = sample();
    assert!(Selector::parse("MaIn").unwrap().matches(&doc, main));
}

#[test]
fn descendant_combinator_skips_levels() {
    let (doc, _, article, role) = sample();
    assert!(Selector::parse("main article").unwrap().matches(&doc, article));
    assert!(Selector::parse("main div").unwrap().matches(&doc, role));
    assert!(Selector::parse("#thread article [data-message-author-role]")
        .unwrap()
        .matches(&doc, role));
    assert!(!Selector::parse("article main").unwrap().matches(&doc, article));
}

#[test]
fn comma_groups_match_any_alternative() {
    let (doc, main, article, role) = sample();
    let selector = Selector::parse("article, [data-message-author-role] , main").unwrap();
    assert!(selector.matches(&doc, main));
    assert!(selector.matches(&doc, article));
    assert!(selector.matches(&doc, role));
    assert_eq!(selector.as_str(), "article, [data-message-author-role] , main");
}

#[test]
fn text_nodes_never_match() {
    let (mut doc, _, _, role) = sample();
    let text = doc.append_text(role, "hello");
    assert!(!Selector::parse("*").unwrap().matches(&doc, text));
}

#[test]
fn query_all_returns_document_order() {
    let (mut doc, main, first, _) = sample();
    let second = doc.append_element(main, "article", &[]);
    let nested = doc.append_element(first, "article", &[]);
    let found = doc.query_all(&Selector::parse("article").unwrap());
    assert_eq!(found, vec![first, nested, second]);
}

#[test]
fn rejects_malformed_input() {
    assert_eq!(Selector::parse("   ").unwrap_err().kind, SelectorErrorKind::Empty);
    assert_eq!(
        Selector::parse("article >").unwrap_err().kind,
        SelectorErrorKind::UnexpectedChar('>')
    );
    assert_eq!(
        Selector::parse("[data-x=\"open").unwrap_err().kind,
        SelectorErrorKind::UnterminatedString
    );
    assert_eq!(Selector::parse("#").unwrap_err().kind, SelectorErrorKind::ExpectedIdent);
    assert_eq!(Selector::parse("[x").unwrap_err().kind, SelectorErrorKind::UnexpectedEnd);
    let err = Selector::parse("main, ,article").unwrap_err();
    assert_eq!(err.kind, SelectorErrorKind::UnexpectedChar(','));
    assert_eq!(err.position, 6);
}

#[test]
fn parses_through_from_str() {
    let selector: Selector = "main article".parse().unwrap();
    assert_eq!(selector.to_string(), "main article");
}
