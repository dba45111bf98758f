//! Generic documentation-comment parser.
//!
//! Turns a raw `/** ... */` block into a free-text description followed by a list of
//! `@tag` entries. The parser knows nothing about any particular tag: callers pick the
//! tags they care about by title.
//!
//! Tag bodies keep their relative indentation so that indentation-sensitive payloads
//! (YAML in particular) survive the trip through the comment decoration.

use regex::Regex;
use std::sync::LazyLock;

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*@([A-Za-z0-9_$]+)(.*)$").unwrap());

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Free text before the first tag, trimmed
    pub description: String,
    /// Tags in source order
    pub tags: Vec<DocTag>,
}

/// A single `@title body` entry of a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name without the leading `@`
    pub title: String,
    /// Everything that follows the tag name up to the next tag
    pub description: String,
}

#[derive(Clone, Copy)]
enum Mode {
    BeforeStar,
    Star,
    AfterStar,
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Removes the comment delimiters and the leading ` * ` decoration of every line.
///
/// On each line, leading whitespace and a single `*` are dropped, together with at most
/// one whitespace character right after the star. Everything after that is kept as is,
/// line terminators included.
pub fn unwrap_comment(raw: &str) -> String {
    let body = raw
        .strip_prefix("/**")
        .or_else(|| raw.strip_prefix("/*"))
        .unwrap_or(raw);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut result = String::with_capacity(body.len());
    let mut mode = Mode::BeforeStar;

    for ch in body.chars() {
        mode = match mode {
            Mode::BeforeStar => {
                if is_line_terminator(ch) {
                    result.push(ch);
                    Mode::BeforeStar
                } else if ch == '*' {
                    Mode::Star
                } else if ch.is_whitespace() {
                    Mode::BeforeStar
                } else {
                    result.push(ch);
                    Mode::AfterStar
                }
            }
            Mode::Star => {
                if is_line_terminator(ch) {
                    result.push(ch);
                    Mode::BeforeStar
                } else {
                    if !ch.is_whitespace() {
                        result.push(ch);
                    }
                    Mode::AfterStar
                }
            }
            Mode::AfterStar => {
                result.push(ch);
                if is_line_terminator(ch) {
                    Mode::BeforeStar
                } else {
                    Mode::AfterStar
                }
            }
        };
    }

    result
}

struct PendingTag<'a> {
    title: &'a str,
    inline: &'a str,
    lines: Vec<&'a str>,
}

/// Parses a raw block comment into its description and tags.
///
/// A tag starts on any line whose first non-blank character is `@` followed by a tag
/// name. Its body is the rest of that line plus every following line up to the next tag.
///
/// # Example
///
/// ```
/// use openapi_from_comments::doc_comment;
///
/// let comment = doc_comment::parse("/**\n * Lists users.\n * @swagger\n * /users:\n *   get: {}\n */");
/// assert_eq!(comment.description, "Lists users.");
/// assert_eq!(comment.tags[0].title, "swagger");
/// assert_eq!(comment.tags[0].description, "/users:\n  get: {}");
/// ```
pub fn parse(raw: &str) -> DocComment {
    let text = unwrap_comment(raw);

    let mut description_lines: Vec<&str> = Vec::new();
    let mut pending: Vec<PendingTag> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = RE_TAG_LINE.captures(line) {
            let (Some(title), Some(inline)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            pending.push(PendingTag {
                title: title.as_str(),
                inline: inline.as_str(),
                lines: Vec::new(),
            });
        } else if let Some(tag) = pending.last_mut() {
            tag.lines.push(line);
        } else {
            description_lines.push(line);
        }
    }

    let tags = pending
        .into_iter()
        .map(|tag| DocTag {
            title: tag.title.to_string(),
            description: tag_body(tag.inline, &tag.lines),
        })
        .collect();

    DocComment {
        description: description_lines.join("\n").trim().to_string(),
        tags,
    }
}

fn tag_body(inline: &str, lines: &[&str]) -> String {
    let inline = inline.trim();

    let body = if inline.is_empty() {
        let first = lines
            .iter()
            .position(|l| !l.trim().is_empty())
            .unwrap_or(lines.len());
        dedent(&lines[first..]).join("\n")
    } else {
        let mut out = inline.to_string();
        for line in lines {
            out.push('\n');
            out.push_str(line);
        }
        out
    };

    body.trim_end().to_string()
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn dedent<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let width = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|&l| if l.trim().is_empty() { "" } else { &l[width..] })
        .collect()
}
