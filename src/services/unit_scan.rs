//! Lightweight text scanning of block configs and components.
//!
//! This is not a TypeScript parser. It pulls out the handful of facts the
//! checks need (slug, interface name, field declarations, top-level feature
//! keys, component props) with regular expressions plus a bracket walker.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::models::{FieldSummary, UnitFeatures};

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bslug\s*:\s*['"`]([^'"`]+)['"`]"#).unwrap());
static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\binterfaceName\s*:\s*['"`]([^'"`]+)['"`]"#).unwrap());
static FIELDS_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfields\s*:").unwrap());
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bname\s*:\s*['"`]([^'"`]+)['"`]"#).unwrap());
static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btype\s*:\s*['"`]([A-Za-z]+)['"`]"#).unwrap());
static REQUIRED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\brequired\s*:\s*true\b").unwrap());
static VALIDATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bvalidate\s*[:(]").unwrap());
static ACCESS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\baccess\s*:").unwrap());
static HOOKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bhooks\s*:").unwrap());
static ADMIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\badmin\s*:").unwrap());
static PROPS_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:interface\s+\w*Props\b[^{]*|type\s+\w*Props\s*=\s*)\{").unwrap()
});
static DESTRUCTURED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:function\s*\w*\s*|=\s*(?:async\s*)?)\(\s*\{([^}]*)\}").unwrap()
});
static MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:readonly\s+)?([A-Za-z_$][\w$]*)\??\s*:").unwrap()
});
static BINDING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_$][\w$]*)").unwrap());

/// Facts extracted from a block config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedBlock {
    pub slug: Option<String>,
    pub interface_name: Option<String>,
    pub fields: Vec<FieldSummary>,
    pub features: UnitFeatures,
}

/// Scan a block config source.
pub fn scan_block(source: &str) -> ScannedBlock {
    let code = strip_comments(source);
    let slug = capture(&SLUG_RE, &code);
    let interface_name = capture(&INTERFACE_RE, &code);
    let fields = FIELDS_KEY_RE
        .find(&code)
        .map(|m| scan_fields(&code[m.end()..]))
        .unwrap_or_default();

    ScannedBlock {
        slug,
        interface_name,
        fields,
        features: scan_features(&code),
    }
}

/// Presence of the validation, access, hooks and admin keys.
pub fn scan_features(source: &str) -> UnitFeatures {
    UnitFeatures {
        has_validation: VALIDATE_RE.is_match(source),
        has_access: ACCESS_RE.is_match(source),
        has_hooks: HOOKS_RE.is_match(source),
        has_admin: ADMIN_RE.is_match(source),
    }
}

/// Field declarations: every `name: '...'` after the `fields:` key, with the
/// `type`, `required` and `validate` keys that follow it up to the next name.
fn scan_fields(code: &str) -> Vec<FieldSummary> {
    let names: Vec<_> = NAME_RE.captures_iter(code).collect();
    let mut fields = Vec::with_capacity(names.len());

    for (i, caps) in names.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let segment_end = names
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(code.len(), |m| m.start());
        // Keys may also precede `name` inside the same object literal.
        let object_start = code[..whole.start()].rfind('{').unwrap_or(whole.start());
        let segment = &code[object_start..segment_end];

        fields.push(FieldSummary {
            name: name.as_str().to_string(),
            field_type: capture(&TYPE_RE, segment),
            required: REQUIRED_RE.is_match(segment),
            has_validation: VALIDATE_RE.is_match(segment),
        });
    }

    fields.dedup_by(|a, b| a.name == b.name);
    fields
}

/// Prop names accepted by a component: members of any `*Props` interface or
/// type literal, then destructured parameter bindings. First occurrence wins.
pub fn scan_component_props(source: &str) -> Vec<String> {
    let code = strip_comments(source);
    let mut props: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !props.iter().any(|p| p == name) {
            props.push(name.to_string());
        }
    };

    for m in PROPS_TYPE_RE.find_iter(&code) {
        let body = brace_body(&code, m.end() - 1);
        for member in split_top_level(body) {
            if let Some(caps) = MEMBER_RE.captures(member) {
                push(&caps[1]);
            }
        }
    }

    for caps in DESTRUCTURED_RE.captures_iter(&code) {
        for binding in caps[1].split(',') {
            let binding = binding.trim();
            if binding.starts_with("...") {
                continue;
            }
            if let Some(name) = BINDING_RE.captures(binding) {
                push(&name[1]);
            }
        }
    }

    props
}

/// Verify that `()`, `[]` and `{}` nest correctly, ignoring string literals
/// and comments. Quote strings end at a newline so stray apostrophes in JSX
/// text cannot swallow the rest of the file.
pub fn check_balance(source: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1usize;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => line += 1,
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '\'' | '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => {
                            line += 1;
                            break;
                        }
                        c if c == ch => break,
                        _ => {}
                    }
                }
            }
            '`' => {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            chars.next();
                        }
                        '\n' => line += 1,
                        '`' => break,
                        _ => {}
                    }
                }
            }
            '(' | '[' | '{' => stack.push((ch, line)),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, open_line)) => {
                        return Err(format!(
                            "line {line}: '{ch}' closes '{open}' opened on line {open_line}"
                        ));
                    }
                    None => return Err(format!("line {line}: unexpected '{ch}'")),
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, open_line)) => Err(format!("'{open}' opened on line {open_line} is never closed")),
        None => Ok(()),
    }
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Remove `//` and `/* */` comments outside of string literals.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if ch == q || (ch == '\n' && q != '`') {
                quote = None;
            }
            continue;
        }
        match ch {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '\'' | '"' | '`' => {
                quote = Some(ch);
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Text between the brace at `open` and its match (or end of input).
fn brace_body(code: &str, open: usize) -> &str {
    let mut depth = 0usize;
    for (offset, ch) in code[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &code[open + 1..open + offset];
                }
            }
            _ => {}
        }
    }
    &code[(open + 1).min(code.len())..]
}

/// Split on `;`, `,` and newlines that sit outside nested brackets.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut prev = ' ';
    for (i, ch) in body.char_indices() {
        match ch {
            '{' | '(' | '[' | '<' => depth += 1,
            // `=>` in function types is not a closing angle bracket.
            '>' if prev == '=' => {}
            '}' | ')' | ']' | '>' => depth -= 1,
            ';' | ',' | '\n' if depth <= 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = ch;
    }
    parts.push(&body[start..]);
    parts
}
