/// Candidate Discovery - Finding What To Call
///
/// **Core Responsibility:**
/// Read candidate source and decide which top-level definition is the entry
/// point, together with the parameter names the dispatcher binds against.
///
/// **Rules:**
/// - Only top-level `def`, `async def` and `class` statements are candidates
/// - Comments and string literals (including triple-quoted ones) are ignored
/// - `ListNode`, `TreeNode` and `Node` are helper types, never candidates
/// - Several candidates: the first by definition order wins
/// - An explicit entry point overrides all of the above but must exist
///
/// The scan works on source text only; nothing is executed here.
use tracing::debug;
use veritas_common::normalize::CallMode;
use veritas_common::types::EntryPoint;
use veritas_common::HarnessError;

/// Helper types provided to every candidate.
pub const RESERVED_NAMES: &[&str] = &["ListNode", "TreeNode", "Node"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    /// Bindable parameter names. Variadics, `*`, `/` and (for methods) the
    /// receiver are left out.
    pub params: Vec<String>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOutline {
    pub name: String,
    pub methods: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Function(Signature),
    Class(ClassOutline),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Function(sig) => &sig.name,
            Definition::Class(class) => &class.name,
        }
    }
}

/// The chosen entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Function(Signature),
    Class(ClassOutline),
    Method { class: String, method: Signature },
}

impl Candidate {
    pub fn name(&self) -> &str {
        match self {
            Candidate::Function(sig) => &sig.name,
            Candidate::Class(class) => &class.name,
            Candidate::Method { method, .. } => &method.name,
        }
    }

    pub fn mode(&self) -> CallMode {
        match self {
            Candidate::Class(_) => CallMode::Class,
            Candidate::Function(_) | Candidate::Method { .. } => CallMode::Function,
        }
    }

    pub fn entry_point(&self) -> EntryPoint {
        match self {
            Candidate::Function(sig) => EntryPoint::Function {
                name: sig.name.clone(),
            },
            Candidate::Class(class) => EntryPoint::Class {
                name: class.name.clone(),
            },
            Candidate::Method { class, method } => EntryPoint::Method {
                class: class.clone(),
                name: method.name.clone(),
            },
        }
    }
}

impl From<Definition> for Candidate {
    fn from(definition: Definition) -> Self {
        match definition {
            Definition::Function(sig) => Candidate::Function(sig),
            Definition::Class(class) => Candidate::Class(class),
        }
    }
}

/// Pick the entry point of `source`.
pub fn discover(source: &str, explicit: Option<&EntryPoint>) -> Result<Candidate, HarnessError> {
    let definitions = outline(source);

    if let Some(entry) = explicit {
        return resolve(&definitions, entry);
    }

    let mut candidates = definitions
        .into_iter()
        .filter(|d| !RESERVED_NAMES.contains(&d.name()));
    let chosen = candidates.next().ok_or_else(|| {
        HarnessError::NoCandidateFound("no top-level function or class is defined".to_string())
    })?;

    let ignored: Vec<String> = candidates.map(|d| d.name().to_string()).collect();
    if !ignored.is_empty() {
        debug!(
            chosen = chosen.name(),
            ignored = ?ignored,
            "Several candidates defined, using the first one"
        );
    }

    Ok(chosen.into())
}

fn resolve(definitions: &[Definition], entry: &EntryPoint) -> Result<Candidate, HarnessError> {
    let find_class = |name: &str| {
        definitions.iter().rev().find_map(|d| match d {
            Definition::Class(class) if class.name == name => Some(class),
            _ => None,
        })
    };

    let found = match entry {
        EntryPoint::Function { name } => definitions.iter().rev().find_map(|d| match d {
            Definition::Function(sig) if &sig.name == name => Some(Candidate::Function(sig.clone())),
            _ => None,
        }),
        EntryPoint::Class { name } => find_class(name).cloned().map(Candidate::Class),
        EntryPoint::Method { class, name } => find_class(class).and_then(|outline| {
            outline
                .methods
                .iter()
                .rev()
                .find(|m| &m.name == name)
                .map(|method| Candidate::Method {
                    class: class.clone(),
                    method: method.clone(),
                })
        }),
    };

    found.ok_or_else(|| {
        let what = match entry {
            EntryPoint::Function { name } => format!("function `{}`", name),
            EntryPoint::Class { name } => format!("class `{}`", name),
            EntryPoint::Method { class, name } => format!("method `{}.{}`", class, name),
        };
        HarnessError::NoCandidateFound(format!("{} is not defined at top level", what))
    })
}

/// All top-level definitions of `source`, in definition order.
pub fn outline(source: &str) -> Vec<Definition> {
    let lines = logical_lines(&mask(source));
    let mut definitions = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        i += 1;
        if line.indent != 0 {
            continue;
        }
        if let Some(sig) = parse_def(&line.text) {
            definitions.push(Definition::Function(sig));
            continue;
        }
        let Some(name) = parse_class_name(&line.text) else {
            continue;
        };

        let mut methods = Vec::new();
        let mut body_indent = None;
        let mut is_static = false;
        while i < lines.len() && lines[i].indent > 0 {
            let body = &lines[i];
            i += 1;
            if body.indent != *body_indent.get_or_insert(body.indent) {
                continue;
            }
            if body.text.starts_with('@') {
                is_static |= body.text.starts_with("@staticmethod");
                continue;
            }
            if let Some(mut sig) = parse_def(&body.text) {
                if !is_static && !sig.params.is_empty() {
                    sig.params.remove(0);
                }
                methods.push(sig);
            }
            is_static = false;
        }
        definitions.push(Definition::Class(ClassOutline { name, methods }));
    }

    definitions
}

struct LogicalLine {
    indent: usize,
    text: String,
}

/// Blank out comments and string literals, keeping line structure.
fn mask(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let blank = |c: char| if c == '\n' { '\n' } else { ' ' };
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    while i < len {
        let c = chars[i];
        match c {
            '#' => {
                while i < len && chars[i] != '\n' {
                    out.push(' ');
                    i += 1;
                }
            }
            '"' | '\'' => {
                let triple = i + 2 < len && chars[i + 1] == c && chars[i + 2] == c;
                let width = if triple { 3 } else { 1 };
                out.extend(std::iter::repeat(' ').take(width));
                i += width;
                while i < len {
                    let d = chars[i];
                    if d == '\\' {
                        out.push(' ');
                        i += 1;
                        if i < len {
                            out.push(blank(chars[i]));
                            i += 1;
                        }
                        continue;
                    }
                    if triple {
                        if d == c && i + 2 < len && chars[i + 1] == c && chars[i + 2] == c {
                            out.push_str("   ");
                            i += 3;
                            break;
                        }
                    } else if d == c {
                        out.push(' ');
                        i += 1;
                        break;
                    } else if d == '\n' {
                        break;
                    }
                    out.push(blank(d));
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Join physical lines continued by open brackets or a trailing backslash.
fn logical_lines(masked: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut current: Option<LogicalLine> = None;
    let mut depth: i32 = 0;

    for raw in masked.lines() {
        let trimmed = raw.trim();
        match current.as_mut() {
            Some(line) => {
                line.text.push(' ');
                line.text.push_str(trimmed.trim_end_matches('\\'));
            }
            None if trimmed.is_empty() => continue,
            None => {
                current = Some(LogicalLine {
                    indent: raw.len() - raw.trim_start().len(),
                    text: trimmed.trim_end_matches('\\').to_string(),
                });
            }
        }

        for c in raw.chars() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ => {}
            }
        }
        if depth <= 0 && !trimmed.ends_with('\\') {
            depth = 0;
            lines.extend(current.take());
        }
    }

    lines.extend(current.take());
    lines
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn leading_identifier(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

/// Text between the opening bracket at the start of `s` and its match.
fn bracketed(s: &str) -> Option<&str> {
    let mut depth = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[1..i]);
                }
            }
            _ if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

fn parse_def(text: &str) -> Option<Signature> {
    let (rest, is_async) = match text.strip_prefix("async") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (rest.trim_start().strip_prefix("def")?, true),
        _ => (text.strip_prefix("def")?, false),
    };
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let name = leading_identifier(rest);
    if !is_identifier(name) {
        return None;
    }

    let mut after = rest[name.len()..].trim_start();
    if after.starts_with('[') {
        // type parameters: def f[T](x: T)
        let generics = bracketed(after)?;
        after = after[generics.len() + 2..].trim_start();
    }
    if !after.starts_with('(') {
        return None;
    }
    let inner = bracketed(after)?;

    Some(Signature {
        name: name.to_string(),
        params: split_params(inner),
        is_async,
    })
}

fn split_params(inner: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&inner[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.starts_with('*') && *p != "/")
        .map(|p| leading_identifier(p).to_string())
        .filter(|name| is_identifier(name))
        .collect()
}

fn parse_class_name(text: &str) -> Option<String> {
    let rest = text.strip_prefix("class")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = leading_identifier(rest.trim_start());
    is_identifier(name).then(|| name.to_string())
}
