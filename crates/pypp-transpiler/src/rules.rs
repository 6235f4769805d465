//! Statement rewrite rules.
//!
//! A buffered statement is offered to each rule in [`RULES`] in order; the
//! first rule that matches decides the Python text and the kind of block the
//! statement opens. Statements no rule matches pass through unchanged.
//!
//! [`normalize_line`] runs earlier, on whole structural lines, for the sugar
//! that is not tied to statement boundaries (`fn` and return-type arrows).

use std::borrow::Cow;

/// What kind of block a statement opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    #[default]
    Normal,
    /// `match` opened by `switch`.
    Switch,
    /// `case` or `default` arm.
    Case,
}

/// The result of rewriting one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub statement: String,
    pub kind: BlockKind,
    /// Name of the rule that fired, if any.
    pub rule: Option<&'static str>,
}

/// A named statement rewrite.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<(String, BlockKind)>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// The rule table, tried in order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "arrow-lambda",
        apply: arrow_lambda,
    },
    Rule {
        name: "for-in",
        apply: for_in,
    },
    Rule {
        name: "switch",
        apply: switch,
    },
    Rule {
        name: "case",
        apply: case_or_default,
    },
    Rule {
        name: "brace-return",
        apply: brace_return,
    },
];

/// Rewrites a trimmed statement with the first matching rule.
pub fn rewrite_statement(statement: &str) -> Rewrite {
    for rule in RULES {
        if let Some((statement, kind)) = (rule.apply)(statement) {
            return Rewrite {
                statement,
                kind,
                rule: Some(rule.name),
            };
        }
    }

    Rewrite {
        statement: statement.to_string(),
        kind: BlockKind::Normal,
        rule: None,
    }
}

/// `(a, b) => a + b` to `lambda a, b: a + b`.
fn arrow_lambda(statement: &str) -> Option<(String, BlockKind)> {
    let (left, body) = statement.split_once("=>")?;
    let left = left.trim_end();
    let body = body.trim();

    let (prefix, params) = if left.ends_with(')') {
        let open = matching_open(left, left.len() - 1)?;
        (&left[..open], left[open + 1..left.len() - 1].trim())
    } else {
        let ident_len = left
            .bytes()
            .rev()
            .take_while(|b| is_ident_byte(*b))
            .count();
        let start = left.len() - ident_len;
        (&left[..start], &left[start..])
    };

    let lambda = if params.is_empty() {
        format!("{prefix}lambda: {body}")
    } else {
        format!("{prefix}lambda {params}: {body}")
    };
    Some((lambda, BlockKind::Normal))
}

/// `for (x : items)` to `for x in items`.
fn for_in(statement: &str) -> Option<(String, BlockKind)> {
    let after_for = strip_keyword(statement, "for")?;
    if contains_word(statement, "in") {
        return None;
    }

    let (inner, rest) = parenthesized(after_for)?;
    let (var, collection) = inner.split_once(':')?;
    let var = var.trim();
    let collection = collection.trim();
    if !is_identifier(var) || collection.is_empty() {
        return None;
    }

    let rest = rest.trim();
    let statement = if rest.is_empty() {
        format!("for {var} in {collection}")
    } else {
        format!("for {var} in {collection} {rest}")
    };
    Some((statement, BlockKind::Normal))
}

/// `switch (x)` to `match x:`.
fn switch(statement: &str) -> Option<(String, BlockKind)> {
    let after_switch = strip_keyword(statement, "switch")?;
    let (expr, _) = parenthesized(after_switch)?;
    Some((format!("match {}:", expr.trim()), BlockKind::Switch))
}

/// `case 1` to `case 1:`, `default` to `case _:`.
fn case_or_default(statement: &str) -> Option<(String, BlockKind)> {
    if let Some(value) = statement.strip_prefix("case ") {
        let value = value.trim();
        let value = value.strip_suffix(':').unwrap_or(value).trim_end();
        return Some((format!("case {value}:"), BlockKind::Case));
    }

    // Only the bare arm header; `default = 5` or `default(x)` is ordinary code.
    let rest = statement.strip_prefix("default")?.trim();
    if rest.is_empty() || rest == ":" {
        return Some(("case _:".to_string(), BlockKind::Case));
    }
    None
}

/// `return { x }` to `return x`.
///
/// Only fires when the braces hold a single expression; a dict or a set of
/// several items is returned as it is.
fn brace_return(statement: &str) -> Option<(String, BlockKind)> {
    let rest = strip_keyword(statement, "return")?;
    let inner = rest.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
    if inner.is_empty() || has_top_level(inner, &[':', ',']) {
        return None;
    }
    Some((format!("return {inner}"), BlockKind::Normal))
}

/// Applies the line-level sugar: `fn name(` becomes `def name(` and every
/// `-> T` return annotation gains the colon Python expects.
pub fn normalize_line(line: &str) -> Cow<'_, str> {
    let line = match rewrite_fn_keyword(line) {
        Some(rewritten) => Cow::Owned(rewritten),
        None => Cow::Borrowed(line),
    };

    match rewrite_return_arrow(&line) {
        Some(rewritten) => Cow::Owned(rewritten),
        None => line,
    }
}

fn rewrite_fn_keyword(line: &str) -> Option<String> {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len() + 8);
    let mut copied = 0;
    let mut search = 0;

    while let Some(found) = line[search..].find("fn") {
        let start = search + found;
        search = start + 2;

        if start > 0 && is_ident_byte(bytes[start - 1]) {
            continue;
        }
        let after = &line[start + 2..];
        let rest = after.trim_start();
        let gap = after.len() - rest.len();
        if gap == 0 {
            continue;
        }

        let name_len = rest.bytes().take_while(|b| is_ident_byte(*b)).count();
        if name_len == 0 || rest.as_bytes()[0].is_ascii_digit() {
            continue;
        }
        if !rest[name_len..].trim_start().starts_with('(') {
            continue;
        }

        out.push_str(&line[copied..start]);
        out.push_str("def ");
        copied = start + 2 + gap;
        search = copied;
    }

    if copied == 0 {
        return None;
    }
    out.push_str(&line[copied..]);
    Some(out)
}

fn rewrite_return_arrow(line: &str) -> Option<String> {
    let mut out = String::with_capacity(line.len() + 4);
    let mut copied = 0;
    let mut search = 0;

    while let Some(found) = line[search..].find("->") {
        let arrow = search + found;
        search = arrow + 2;

        let after = &line[arrow + 2..];
        let annotation = after.trim_start();
        let gap = after.len() - annotation.len();
        let type_len = annotation_len(annotation);
        if type_len == 0 {
            continue;
        }
        let type_end = arrow + 2 + gap + type_len;
        if line[type_end..].starts_with(':') {
            continue;
        }

        out.push_str(&line[copied..arrow]);
        out.push_str("-> ");
        out.push_str(&annotation[..type_len]);
        out.push(':');
        copied = type_end;
        search = type_end;
    }

    if copied == 0 {
        return None;
    }
    out.push_str(&line[copied..]);
    Some(out)
}

/// Byte length of a return annotation: up to whitespace, `:`, `{` or `;`
/// outside brackets.
fn annotation_len(text: &str) -> usize {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ':' | '{' | ';' => return idx,
            c if c.is_whitespace() && depth == 0 => return idx,
            _ => {}
        }
    }
    text.len()
}

/// Strips `keyword` from the start of `statement` if it is a whole word.
fn strip_keyword<'a>(statement: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = statement.strip_prefix(keyword)?;
    match rest.bytes().next() {
        Some(b) if is_ident_byte(b) => None,
        _ => Some(rest),
    }
}

/// Splits `( inner ) rest` at the parenthesis matching the leading one.
fn parenthesized(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if !text.starts_with('(') {
        return None;
    }
    let close = matching_close(text, 0)?;
    Some((&text[1..close], &text[close + 1..]))
}

fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn matching_open(text: &str, close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, b) in text.bytes().enumerate().take(close + 1).rev() {
        match b {
            b')' => depth += 1,
            b'(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Whether any of `chars` occurs in `text` outside brackets.
fn has_top_level(text: &str, chars: &[char]) -> bool {
    let mut depth = 0usize;
    for ch in text.chars() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            c if depth == 0 && chars.contains(&c) => return true,
            _ => {}
        }
    }
    false
}

fn contains_word(text: &str, word: &str) -> bool {
    let bytes = text.as_bytes();
    text.match_indices(word).any(|(idx, _)| {
        let end = idx + word.len();
        let before_ok = idx == 0 || !is_ident_byte(bytes[idx - 1]);
        let after_ok = end == bytes.len() || !is_ident_byte(bytes[end]);
        before_ok && after_ok
    })
}

fn is_identifier(text: &str) -> bool {
    match text.bytes().next() {
        Some(first) if !first.is_ascii_digit() => text.bytes().all(is_ident_byte),
        _ => false,
    }
}

/// Identifier bytes; anything non-ASCII counts so that Unicode names are
/// never split.
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(statement: &str) -> (String, BlockKind) {
        let rewrite = rewrite_statement(statement);
        (rewrite.statement, rewrite.kind)
    }

    fn normal(s: &str) -> (String, BlockKind) {
        (s.to_string(), BlockKind::Normal)
    }

    #[test]
    fn test_arrow_lambda_with_parens() {
        assert_eq!(rewrite("f = (a, b) => a + b"), normal("f = lambda a, b: a + b"));
    }

    #[test]
    fn test_arrow_lambda_bare_param() {
        assert_eq!(rewrite("sq = x => x * x"), normal("sq = lambda x: x * x"));
    }

    #[test]
    fn test_arrow_lambda_no_params() {
        assert_eq!(rewrite("f = () => 42"), normal("f = lambda: 42"));
    }

    #[test]
    fn test_arrow_lambda_as_argument() {
        assert_eq!(
            rewrite("ys = map((x) => x + 1, xs)"),
            normal("ys = map(lambda x: x + 1, xs)")
        );
    }

    #[test]
    fn test_arrow_lambda_keeps_tuple_params_balanced() {
        assert_eq!(
            rewrite("g = (a, (b)) => a"),
            normal("g = lambda a, (b): a")
        );
    }

    #[test]
    fn test_for_in() {
        assert_eq!(rewrite("for (x : items)"), normal("for x in items"));
        assert_eq!(rewrite("for(i : range(3))"), normal("for i in range(3)"));
    }

    #[test]
    fn test_for_in_skips_python_style() {
        assert_eq!(rewrite("for x in items"), normal("for x in items"));
    }

    #[test]
    fn test_for_in_word_in_not_substring() {
        assert_eq!(rewrite("for (i : index)"), normal("for i in index"));
    }

    #[test]
    fn test_for_in_requires_identifier() {
        assert_eq!(rewrite("for (a, b : pairs)"), normal("for (a, b : pairs)"));
    }

    #[test]
    fn test_switch() {
        assert_eq!(
            rewrite("switch(n)"),
            ("match n:".to_string(), BlockKind::Switch)
        );
        assert_eq!(
            rewrite("switch (f(a))"),
            ("match f(a):".to_string(), BlockKind::Switch)
        );
    }

    #[test]
    fn test_case_and_default() {
        assert_eq!(rewrite("case 1"), ("case 1:".to_string(), BlockKind::Case));
        assert_eq!(rewrite("case \"a\":"), ("case \"a\":".to_string(), BlockKind::Case));
        assert_eq!(rewrite("default"), ("case _:".to_string(), BlockKind::Case));
        assert_eq!(rewrite("default:"), ("case _:".to_string(), BlockKind::Case));
    }

    #[test]
    fn test_default_prefix_of_identifier_is_not_default() {
        assert_eq!(rewrite("defaults = 1"), normal("defaults = 1"));
    }

    #[test]
    fn test_default_used_as_a_name_is_not_default() {
        assert_eq!(rewrite("default = 5"), normal("default = 5"));
        assert_eq!(rewrite("default += 1"), normal("default += 1"));
        assert_eq!(rewrite("default(x)"), normal("default(x)"));
        assert_eq!(rewrite("default .strip()"), normal("default .strip()"));
    }

    #[test]
    fn test_brace_return() {
        assert_eq!(rewrite("return { x + 1 }"), normal("return x + 1"));
        assert_eq!(rewrite("return {}"), normal("return {}"));
        assert_eq!(rewrite("return {a: 1}"), normal("return {a: 1}"));
    }

    #[test]
    fn test_unmatched_statement_passes_through() {
        let rewrite = rewrite_statement("x = 1");
        assert_eq!(rewrite.statement, "x = 1");
        assert_eq!(rewrite.rule, None);
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn test_normalize_fn_keyword() {
        assert_eq!(normalize_line("fn add(a, b) {"), "def add(a, b) {");
        assert_eq!(normalize_line("  fn  f (x)"), "  def f (x)");
        assert_eq!(normalize_line("x = fnord(1)"), "x = fnord(1)");
        assert_eq!(normalize_line("fn = 3"), "fn = 3");
    }

    #[test]
    fn test_normalize_return_arrow() {
        assert_eq!(
            normalize_line("def f(x) -> int {"),
            "def f(x) -> int: {"
        );
        assert_eq!(normalize_line("fn f()->str{"), "def f()-> str:{");
        assert_eq!(
            normalize_line("fn f() -> dict[str, int] {"),
            "def f() -> dict[str, int]: {"
        );
    }

    #[test]
    fn test_normalize_return_arrow_is_idempotent() {
        assert_eq!(normalize_line("def f() -> int:"), "def f() -> int:");
        let once = normalize_line("fn f() -> int {").into_owned();
        assert_eq!(normalize_line(&once), once);
    }

    #[test]
    fn test_normalize_leaves_plain_lines_borrowed() {
        assert!(matches!(normalize_line("x = 1;"), Cow::Borrowed(_)));
    }
}
