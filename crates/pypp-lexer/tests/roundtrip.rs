use pretty_assertions::assert_eq;
use proptest::prelude::*;
use pypp_lexer::{shield, Lexer};

/// Source text without `/`, so no comments can appear.
fn comment_free_source() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r#"[a-zA-Z0-9_ {};:=()\n"'\\fr]{0,80}"#)
        .expect("valid regex")
}

proptest! {
    #[test]
    fn shield_then_restore_is_identity(source in comment_free_source()) {
        let shielded = shield(&source);
        prop_assert_eq!(shielded.restore(&shielded.text), source);
    }

    #[test]
    fn tokens_cover_the_source(source in ".{0,80}") {
        let mut covered = String::new();
        for token in Lexer::new(&source) {
            covered.push_str(token.span.slice(&source).unwrap());
        }
        prop_assert_eq!(covered, source);
    }

    #[test]
    fn placeholders_hide_all_braces_inside_strings(body in "[{};a-z ]{0,20}") {
        let source = format!("x = \"{body}\";");
        let shielded = shield(&source);
        prop_assert_eq!(shielded.text.matches(';').count(), 1);
        prop_assert!(!shielded.text.contains('{'), "shielded text contains '{{'");
    }
}

#[test]
fn test_comments_are_the_only_loss() {
    let source = "if x { // open\n  y = '//'; /* z */\n}\n";
    let shielded = shield(source);
    assert_eq!(shielded.restore(&shielded.text), "if x { \n  y = '//'; \n}\n");
}

#[test]
fn test_multiline_string_survives() {
    let source = "doc = \"\"\"\n  {\n  ;\n\"\"\";\n";
    let shielded = shield(source);
    assert_eq!(shielded.text.lines().count(), 1);
    assert_eq!(shielded.restore(&shielded.text), source);
}
