//! Pre-commit checks over document text.
//!
//! Both checks are pure functions of the text. The syntax scan is a tripwire
//! against catastrophic corruption, not a parser for the generator config's
//! source language.

use std::fmt;

/// One finding from a validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationProblem {
    /// A required anchor appears zero or more than one time.
    AnchorCount { anchor: String, count: usize },

    /// A closing bracket with no matching opener, or the wrong opener.
    MismatchedBracket {
        found: char,
        line: usize,
        column: usize,
    },

    /// An opening bracket never closed before end of input.
    UnclosedBracket {
        found: char,
        line: usize,
        column: usize,
    },

    /// A string literal still open at end of input.
    UnterminatedString { line: usize, column: usize },
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationProblem::AnchorCount { anchor, count } => {
                write!(f, "anchor {anchor} appears {count} times, expected exactly 1")
            }
            ValidationProblem::MismatchedBracket { found, line, column } => {
                write!(f, "mismatched '{found}' at line {line}, column {column}")
            }
            ValidationProblem::UnclosedBracket { found, line, column } => {
                write!(f, "unclosed '{found}' opened at line {line}, column {column}")
            }
            ValidationProblem::UnterminatedString { line, column } => {
                write!(f, "unterminated string starting at line {line}, column {column}")
            }
        }
    }
}

/// Outcome of one validation pass. The whole document passes or it does not;
/// there is no partially-valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub problems: Vec<ValidationProblem>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn summary(&self) -> String {
        self.problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Verify each anchor occurs exactly once in `text`. Zero or many is a
/// failure naming the anchor.
pub fn validate_anchors<S: AsRef<str>>(text: &str, anchors: &[S]) -> ValidationResult {
    let mut result = ValidationResult::valid();

    for anchor in anchors {
        let anchor = anchor.as_ref();
        let count = text.matches(anchor).count();
        if count != 1 {
            tracing::warn!("Anchor {} occurs {} times", anchor, count);
            result.problems.push(ValidationProblem::AnchorCount {
                anchor: anchor.to_string(),
                count,
            });
        }
    }

    result
}

/// Stack-based balance scan over `(){}[]`, skipping string literals
/// (single, double, backtick quotes with backslash escapes) and `//` /
/// `/* */` comments. Imbalance at end of input fails with a position hint.
pub fn validate_syntax(text: &str) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let mut stack: Vec<(char, usize, usize)> = Vec::new();

    let mut line = 1usize;
    let mut column = 0usize;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
            column = 0;
            continue;
        }
        column += 1;

        match c {
            '"' | '\'' | '`' => {
                let (start_line, start_column) = (line, column);
                let mut terminated = false;
                while let Some(sc) = chars.next() {
                    if sc == '\n' {
                        line += 1;
                        column = 0;
                        // Only template literals may span lines; a bare
                        // newline inside ' or " means the quote never closed.
                        if c != '`' {
                            break;
                        }
                        continue;
                    }
                    column += 1;
                    if sc == '\\' {
                        if let Some(esc) = chars.next() {
                            if esc == '\n' {
                                line += 1;
                                column = 0;
                            } else {
                                column += 1;
                            }
                        }
                    } else if sc == c {
                        terminated = true;
                        break;
                    }
                }
                if !terminated {
                    result.problems.push(ValidationProblem::UnterminatedString {
                        line: start_line,
                        column: start_column,
                    });
                    return result;
                }
            }
            '/' => match chars.peek() {
                Some('/') => {
                    // Line comment: consume to end of line.
                    for sc in chars.by_ref() {
                        if sc == '\n' {
                            line += 1;
                            column = 0;
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    column += 1;
                    let mut prev = '\0';
                    for sc in chars.by_ref() {
                        if sc == '\n' {
                            line += 1;
                            column = 0;
                        } else {
                            column += 1;
                        }
                        if prev == '*' && sc == '/' {
                            break;
                        }
                        prev = sc;
                    }
                }
                _ => {}
            },
            '(' | '{' | '[' => stack.push((c, line, column)),
            ')' | '}' | ']' => {
                let expected_open = match c {
                    ')' => '(',
                    '}' => '{',
                    _ => '[',
                };
                match stack.pop() {
                    Some((open, ..)) if open == expected_open => {}
                    _ => {
                        result.problems.push(ValidationProblem::MismatchedBracket {
                            found: c,
                            line,
                            column,
                        });
                        return result;
                    }
                }
            }
            _ => {}
        }
    }

    for (open, open_line, open_column) in stack {
        result.problems.push(ValidationProblem::UnclosedBracket {
            found: open,
            line: open_line,
            column: open_column,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_exactly_once_passes() {
        let text = "// [CONFIG:SITE_TITLE]\n  pageTitle: \"My Site\",\n";
        let result = validate_anchors(text, &["// [CONFIG:SITE_TITLE]"]);
        assert!(result.is_valid());
    }

    #[test]
    fn test_missing_anchor_fails() {
        let result = validate_anchors("nothing here", &["// [CONFIG:SITE_TITLE]"]);
        assert_eq!(
            result.problems,
            vec![ValidationProblem::AnchorCount {
                anchor: "// [CONFIG:SITE_TITLE]".to_string(),
                count: 0,
            }]
        );
    }

    #[test]
    fn test_duplicated_anchor_fails() {
        let text = "// [CONFIG:SITE_TITLE]\nx\n// [CONFIG:SITE_TITLE]\ny\n";
        let result = validate_anchors(text, &["// [CONFIG:SITE_TITLE]"]);
        assert_eq!(
            result.problems,
            vec![ValidationProblem::AnchorCount {
                anchor: "// [CONFIG:SITE_TITLE]".to_string(),
                count: 2,
            }]
        );
    }

    #[test]
    fn test_balanced_document_passes() {
        let text = r#"
const config = {
  pageTitle: "My Site",
  nav: [
    { title: "Home", url: "/" },
  ],
};
export default config;
"#;
        assert!(validate_syntax(text).is_valid());
    }

    #[test]
    fn test_extra_open_brace_fails_with_position() {
        let text = "const a = {\n  b: { c: 1 },\n";
        let result = validate_syntax(text);
        assert_eq!(
            result.problems,
            vec![ValidationProblem::UnclosedBracket {
                found: '{',
                line: 1,
                column: 11,
            }]
        );
    }

    #[test]
    fn test_stray_close_paren_fails() {
        let result = validate_syntax("const a = 1);\n");
        assert!(matches!(
            result.problems[0],
            ValidationProblem::MismatchedBracket { found: ')', .. }
        ));
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let text = "const a = \"{ not a brace (\";\nconst b = '}]';\n";
        assert!(validate_syntax(text).is_valid());
    }

    #[test]
    fn test_brackets_inside_comments_are_ignored() {
        let text = "// { [ (\nconst a = 1; /* } ) ] */\n";
        assert!(validate_syntax(text).is_valid());
    }

    #[test]
    fn test_escaped_quote_does_not_terminate_string() {
        let text = "const a = \"say \\\"hi\\\" {\";\nconst b = {};\n";
        assert!(validate_syntax(text).is_valid());
    }

    #[test]
    fn test_unterminated_string_fails() {
        let result = validate_syntax("const a = \"open\n");
        assert!(matches!(
            result.problems[0],
            ValidationProblem::UnterminatedString { line: 1, .. }
        ));
    }

    #[test]
    fn test_template_literal_spans_lines() {
        let text = "const a = `line one\nline two`;\nconst b = [];\n";
        assert!(validate_syntax(text).is_valid());
    }
}
