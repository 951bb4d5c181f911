//! Anchor-based rewrite core.
//!
//! Every field the engine can touch is declared once in [`FIELD_RULES`]:
//! a dotted field path, the literal anchor comment that precedes the value
//! in the document, and the kind of literal the value renders to. The
//! engine locates each anchor, replaces exactly the value token on the line
//! below it, and leaves every other byte of the document untouched.

use crate::models::{FieldValue, NavEntry, ValueKind};
use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;

/// Binds one settings field to one document anchor and a value renderer.
/// Rules are static data, never derived from the document.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub path: &'static str,
    pub anchor: &'static str,
    pub kind: ValueKind,
}

/// The complete rule set, in the order rules are applied. Anchor coverage
/// is auditable here and nowhere else.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule { path: "site.pageTitle", anchor: "// [CONFIG:SITE_TITLE]", kind: ValueKind::Str },
    FieldRule { path: "site.baseUrl", anchor: "// [CONFIG:BASE_URL]", kind: ValueKind::Str },
    FieldRule { path: "site.language", anchor: "// [CONFIG:LANGUAGE]", kind: ValueKind::Str },
    FieldRule { path: "site.description", anchor: "// [CONFIG:SITE_DESCRIPTION]", kind: ValueKind::Str },
    FieldRule { path: "site.author", anchor: "// [CONFIG:SITE_AUTHOR]", kind: ValueKind::Str },
    FieldRule { path: "theme.appearance", anchor: "// [CONFIG:APPEARANCE]", kind: ValueKind::Str },
    FieldRule { path: "theme.darkModeToggleButton", anchor: "// [CONFIG:DARK_MODE_TOGGLE]", kind: ValueKind::Bool },
    FieldRule { path: "theme.accentColor", anchor: "// [CONFIG:ACCENT_COLOR]", kind: ValueKind::Str },
    FieldRule { path: "theme.readerLineWidth", anchor: "// [CONFIG:READER_LINE_WIDTH]", kind: ValueKind::Int },
    FieldRule { path: "typography.headerFont", anchor: "// [CONFIG:HEADER_FONT]", kind: ValueKind::Str },
    FieldRule { path: "typography.bodyFont", anchor: "// [CONFIG:BODY_FONT]", kind: ValueKind::Str },
    FieldRule { path: "typography.codeFont", anchor: "// [CONFIG:CODE_FONT]", kind: ValueKind::Str },
    FieldRule { path: "typography.baseFontSize", anchor: "// [CONFIG:BASE_FONT_SIZE]", kind: ValueKind::Int },
    FieldRule { path: "navigation.showBreadcrumbs", anchor: "// [CONFIG:SHOW_BREADCRUMBS]", kind: ValueKind::Bool },
    FieldRule { path: "navigation.sidebarCollapsed", anchor: "// [CONFIG:SIDEBAR_COLLAPSED]", kind: ValueKind::Bool },
    FieldRule { path: "navigation.entries", anchor: "// [CONFIG:NAV_ENTRIES]", kind: ValueKind::NavList },
    FieldRule { path: "features.search", anchor: "// [CONFIG:FEATURE_SEARCH]", kind: ValueKind::Bool },
    FieldRule { path: "features.graphView", anchor: "// [CONFIG:FEATURE_GRAPH_VIEW]", kind: ValueKind::Bool },
    FieldRule { path: "features.backlinks", anchor: "// [CONFIG:FEATURE_BACKLINKS]", kind: ValueKind::Bool },
    FieldRule { path: "features.readingTime", anchor: "// [CONFIG:FEATURE_READING_TIME]", kind: ValueKind::Bool },
    FieldRule { path: "features.tableOfContents", anchor: "// [CONFIG:FEATURE_TOC]", kind: ValueKind::Bool },
    FieldRule { path: "features.comments", anchor: "// [CONFIG:FEATURE_COMMENTS]", kind: ValueKind::Bool },
    FieldRule { path: "features.rssFeed", anchor: "// [CONFIG:FEATURE_RSS]", kind: ValueKind::Bool },
    FieldRule { path: "posts.showDate", anchor: "// [CONFIG:POST_SHOW_DATE]", kind: ValueKind::Bool },
    FieldRule { path: "posts.dateFormat", anchor: "// [CONFIG:POST_DATE_FORMAT]", kind: ValueKind::Str },
    FieldRule { path: "posts.showTags", anchor: "// [CONFIG:POST_SHOW_TAGS]", kind: ValueKind::Bool },
    FieldRule { path: "posts.excerptLength", anchor: "// [CONFIG:POST_EXCERPT_LENGTH]", kind: ValueKind::Int },
    FieldRule { path: "posts.defaultLayout", anchor: "// [CONFIG:POST_DEFAULT_LAYOUT]", kind: ValueKind::Str },
    FieldRule { path: "home.showRecentPosts", anchor: "// [CONFIG:HOME_RECENT_POSTS]", kind: ValueKind::Bool },
    FieldRule { path: "home.recentPostCount", anchor: "// [CONFIG:HOME_RECENT_COUNT]", kind: ValueKind::Int },
    FieldRule { path: "home.pinnedNote", anchor: "// [CONFIG:HOME_PINNED_NOTE]", kind: ValueKind::Str },
    FieldRule { path: "home.showSubtitle", anchor: "// [CONFIG:HOME_SHOW_SUBTITLE]", kind: ValueKind::Bool },
    FieldRule { path: "plugins.syntaxTheme", anchor: "// [CONFIG:SYNTAX_THEME]", kind: ValueKind::Str },
    FieldRule { path: "plugins.latexRenderer", anchor: "// [CONFIG:LATEX_RENDERER]", kind: ValueKind::Str },
    FieldRule { path: "plugins.enableTranscludes", anchor: "// [CONFIG:TRANSCLUDES]", kind: ValueKind::Bool },
];

/// Rule lookup by field path.
pub fn rule_for_path(path: &str) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|r| r.path == path)
}

/// All rule paths in declaration order.
pub fn rule_paths() -> Vec<&'static str> {
    FIELD_RULES.iter().map(|r| r.path).collect()
}

/// Errors from the rewrite pass. These are rule-table or document-shape
/// violations, not per-field conditions; a missing anchor is a soft skip
/// reported through [`PatchOutcome::skipped_fields`] instead.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("No field rule for path {0}")]
    UnknownField(String),

    #[error("Field {path} expects a {expected:?} value, got {got:?}")]
    KindMismatch {
        path: String,
        expected: ValueKind,
        got: ValueKind,
    },

    #[error("No value line follows anchor {0}")]
    MissingValueLine(&'static str),

    #[error("Value line after anchor {0} is not a `key: value` line")]
    MalformedValueLine(&'static str),

    #[error("List literal after anchor {0} is never closed")]
    UnclosedList(&'static str),
}

/// Result of one rewrite pass over the document text.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    /// The patched document. The input text is never mutated.
    pub text: String,

    /// Anchors of the rules that were applied; the validator requires each
    /// to occur exactly once in the patched text.
    pub applied_anchors: Vec<&'static str>,

    /// Field paths whose anchor was absent from the document. Older
    /// documents predate newer fields, so these do not abort the batch.
    pub skipped_fields: Vec<String>,
}

/// The anchor-based rewrite engine. One instance per process; the value-line
/// pattern is compiled once at construction.
pub struct PatchEngine {
    /// Matches the `key: ` head of a value line. The rest of the line is
    /// split by a string-aware scan, not by regex, so a comma or `//`
    /// inside the value literal cannot be mistaken for the line tail.
    value_head: Regex,
}

impl PatchEngine {
    pub fn new() -> Self {
        Self {
            value_head: Regex::new(r"^(\s*[A-Za-z_$][\w$]*\??\s*:\s*)")
                .expect("Invalid value line regex"),
        }
    }

    /// Apply a set of field/value pairs to `text`, anchor by anchor.
    ///
    /// Both the full-preset and the incremental flows go through here;
    /// pairs are applied in rule declaration order so repeated syncs
    /// produce reproducible diffs. Rules never depend on each other's
    /// output, so order does not affect the result.
    pub fn apply(
        &self,
        text: &str,
        pairs: &IndexMap<String, FieldValue>,
    ) -> Result<PatchOutcome, PatchError> {
        // Reject unknown paths up front so a typo never half-applies.
        for path in pairs.keys() {
            if rule_for_path(path).is_none() {
                return Err(PatchError::UnknownField(path.clone()));
            }
        }

        let mut outcome = PatchOutcome {
            text: text.to_string(),
            applied_anchors: Vec::new(),
            skipped_fields: Vec::new(),
        };

        for rule in FIELD_RULES {
            let Some(value) = pairs.get(rule.path) else {
                continue;
            };

            if value.kind() != rule.kind {
                return Err(PatchError::KindMismatch {
                    path: rule.path.to_string(),
                    expected: rule.kind,
                    got: value.kind(),
                });
            }

            match self.apply_rule(&outcome.text, rule, value)? {
                Some(patched) => {
                    outcome.text = patched;
                    outcome.applied_anchors.push(rule.anchor);
                }
                None => {
                    tracing::warn!("Anchor {} absent, skipping {}", rule.anchor, rule.path);
                    outcome.skipped_fields.push(rule.path.to_string());
                }
            }
        }

        Ok(outcome)
    }

    /// Rewrite the value adjacent to one rule's anchor. `Ok(None)` means the
    /// anchor is not present. When the anchor occurs more than once only the
    /// first is patched; the exactly-once check against the patched text
    /// rejects the document before it can be written.
    fn apply_rule(
        &self,
        text: &str,
        rule: &FieldRule,
        value: &FieldValue,
    ) -> Result<Option<String>, PatchError> {
        let Some(anchor_idx) = text.find(rule.anchor) else {
            return Ok(None);
        };

        let after_anchor = anchor_idx + rule.anchor.len();
        let Some(rel_newline) = text[after_anchor..].find('\n') else {
            return Err(PatchError::MissingValueLine(rule.anchor));
        };
        let line_start = after_anchor + rel_newline + 1;
        if line_start >= text.len() {
            return Err(PatchError::MissingValueLine(rule.anchor));
        }
        let line_end = text[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(text.len());
        let line = &text[line_start..line_end];

        let caps = self
            .value_head
            .captures(line)
            .ok_or(PatchError::MalformedValueLine(rule.anchor))?;

        let patched = match value {
            FieldValue::NavList(entries) => {
                // The whole bracketed block is replaced, possibly spanning
                // multiple lines. Partial list patching is unsupported by
                // design; the list is reconstructed in full.
                let head = caps.get(1).map_or("", |m| m.as_str());
                let rel_open = line[head.len()..]
                    .find('[')
                    .ok_or(PatchError::MalformedValueLine(rule.anchor))?;
                let open_idx = line_start + head.len() + rel_open;
                let close_idx = find_matching_bracket(text, open_idx)
                    .ok_or(PatchError::UnclosedList(rule.anchor))?;

                let indent = leading_whitespace(head);
                let rendered = render_nav_list(entries, indent);

                let mut out = String::with_capacity(text.len() + rendered.len());
                out.push_str(&text[..open_idx]);
                out.push_str(&rendered);
                out.push_str(&text[close_idx + 1..]);
                out
            }
            scalar => {
                let head = caps.get(1).map_or("", |m| m.as_str());
                let (value_token, tail) = split_value_token(&line[head.len()..]);
                if value_token.is_empty() {
                    return Err(PatchError::MalformedValueLine(rule.anchor));
                }
                let rendered = render_scalar(scalar);

                // Only the value token is replaced; the tail (separating
                // comma, spacing, an inline comment) is re-emitted verbatim.
                let mut out = String::with_capacity(text.len() + rendered.len());
                out.push_str(&text[..line_start]);
                out.push_str(head);
                out.push_str(&rendered);
                out.push_str(tail);
                out.push_str(&text[line_end..]);
                out
            }
        };

        Ok(Some(patched))
    }
}

impl Default for PatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Scalar literal rendering: strings quoted with internal quotes and
/// backslashes escaped, booleans and integers bare.
fn render_scalar(value: &FieldValue) -> String {
    match value {
        FieldValue::Str(s) => quote_string(s),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Int(i) => i.to_string(),
        FieldValue::NavList(_) => unreachable!("lists are rendered by render_nav_list"),
    }
}

fn quote_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Multi-line array literal for navigation entries, emitted at the indent
/// of the original value line.
fn render_nav_list(entries: &[NavEntry], indent: &str) -> String {
    if entries.is_empty() {
        return "[]".to_string();
    }

    let mut out = String::from("[\n");
    for entry in entries {
        out.push_str(indent);
        out.push_str("  { title: ");
        out.push_str(&quote_string(&entry.title));
        out.push_str(", url: ");
        out.push_str(&quote_string(&entry.url));
        out.push_str(" },\n");
    }
    out.push_str(indent);
    out.push(']');
    out
}

/// Splits the remainder of a value line (everything after the `key: ` head)
/// into the value token and its verbatim tail. The token ends at the first
/// comma or `//` comment that sits outside a string literal; trailing
/// whitespace before that boundary belongs to the tail.
fn split_value_token(rest: &str) -> (&str, &str) {
    let mut boundary = rest.len();
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                while let Some((_, sc)) = chars.next() {
                    if sc == '\\' {
                        chars.next();
                    } else if sc == c {
                        break;
                    }
                }
            }
            ',' => {
                boundary = i;
                break;
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                boundary = i;
                break;
            }
            _ => {}
        }
    }

    let value_end = rest[..boundary].trim_end().len();
    (&rest[..value_end], &rest[value_end..])
}

fn leading_whitespace(s: &str) -> &str {
    let end = s.len() - s.trim_start().len();
    &s[..end]
}

/// Index of the bracket matching the opener at `open_idx`, skipping string
/// literals and comments. Returns `None` when the block never closes.
fn find_matching_bracket(text: &str, open_idx: usize) -> Option<usize> {
    let open = text[open_idx..].chars().next()?;
    let close = match open {
        '[' => ']',
        '{' => '}',
        '(' => ')',
        _ => return None,
    };

    let mut depth = 0usize;
    let mut chars = text[open_idx..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                while let Some((_, sc)) = chars.next() {
                    if sc == '\\' {
                        chars.next();
                    } else if sc == c {
                        break;
                    }
                }
            }
            '/' => match chars.peek() {
                Some((_, '/')) => {
                    for (_, sc) in chars.by_ref() {
                        if sc == '\n' {
                            break;
                        }
                    }
                }
                Some((_, '*')) => {
                    chars.next();
                    let mut prev = '\0';
                    for (_, sc) in chars.by_ref() {
                        if prev == '*' && sc == '/' {
                            break;
                        }
                        prev = sc;
                    }
                }
                _ => {}
            },
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(open_idx + i);
                }
            }
            _ => {}
        }
    }

    None
}
