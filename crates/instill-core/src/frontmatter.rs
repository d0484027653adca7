//! Front-matter for `*.instructions.md` files.
//!
//! Only `applyTo` and `description` are read; every other key is ignored.
//! `applyTo` may be a single glob, a comma-separated string of globs, or a
//! YAML list. Globs written without quotes (`applyTo: **/*.ts`) are not
//! valid YAML, since a leading `*` reads as an alias; such scalars are quoted
//! and the block decoded again.

use serde::Deserialize;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(default)]
    apply_to: Option<ApplyTo>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum ApplyTo {
    One(String),
    Many(Vec<String>),
}

impl Frontmatter {
    /// Glob patterns in declaration order, trimmed, empties dropped.
    pub fn apply_to(&self) -> Vec<String> {
        let raw: Vec<&str> = match &self.apply_to {
            None => Vec::new(),
            Some(ApplyTo::One(s)) => s.split(',').collect(),
            Some(ApplyTo::Many(items)) => items.iter().flat_map(|s| s.split(',')).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// An instruction file split into its front-matter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    pub frontmatter: Frontmatter,
    pub body: String,
}

/// Parse a raw instruction file.
///
/// Files without a `---` block get default front-matter and the whole text as
/// body.
pub fn parse_instruction(raw: &str) -> Result<ParsedInstruction, serde_yaml::Error> {
    let (yaml, body) = split_frontmatter(raw);
    let frontmatter = match yaml {
        Some(y) if !y.trim().is_empty() => decode_frontmatter(y)?,
        _ => Frontmatter::default(),
    };
    Ok(ParsedInstruction {
        frontmatter,
        body: body.trim_start_matches(['\r', '\n']).to_string(),
    })
}

fn decode_frontmatter(yaml: &str) -> Result<Frontmatter, serde_yaml::Error> {
    serde_yaml::from_str(yaml).or_else(|err| match quote_bare_globs(yaml) {
        Some(quoted) => serde_yaml::from_str(&quoted).map_err(|_| err),
        None => Err(err),
    })
}

/// Re-quote `key: *…` and `- *…` scalars. `None` when nothing changed.
fn quote_bare_globs(yaml: &str) -> Option<String> {
    let mut changed = false;
    let lines: Vec<String> = yaml
        .lines()
        .map(|line| match quote_glob_scalar(line) {
            Some(quoted) => {
                changed = true;
                quoted
            }
            None => line.to_string(),
        })
        .collect();
    changed.then(|| lines.join("\n"))
}

fn quote_glob_scalar(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let split = match trimmed.strip_prefix("- ") {
        Some(rest) => line.len() - rest.len(),
        None => line.find(':')? + 1,
    };
    let (head, value) = line.split_at(split);
    let value = value.trim();
    if !value.starts_with('*') {
        return None;
    }
    Some(format!("{} '{}'", head.trim_end(), value.replace('\'', "''")))
}

/// Split `---` delimited front-matter from the body.
///
/// The opening delimiter must be the first line; the closing delimiter is the
/// next line consisting solely of `---`. An unterminated block is treated as
/// body text.
pub fn split_frontmatter(raw: &str) -> (Option<&str>, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(after_open) = text.strip_prefix("---") else {
        return (None, text);
    };
    let Some(rest) = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
    else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}
