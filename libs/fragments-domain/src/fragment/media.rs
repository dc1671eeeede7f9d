//! Media types and Content-Type parsing
//!
//! The set of media types a fragment may carry is closed, so it is modelled
//! as an enum. Content-Type strings coming from callers are parsed into a
//! [`ContentType`] first; only its essence (`type/subtype`) decides support.

use std::fmt;

use crate::fragment::error::{FragmentError, Result};

/// A supported base media type (the `type/subtype` part of a Content-Type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaType {
    TextPlain,
    TextMarkdown,
    TextHtml,
    TextCsv,
    ApplicationJson,
    ApplicationYaml,
}

impl MediaType {
    /// Every supported media type
    pub const ALL: [MediaType; 6] = [
        MediaType::TextPlain,
        MediaType::TextMarkdown,
        MediaType::TextHtml,
        MediaType::TextCsv,
        MediaType::ApplicationJson,
        MediaType::ApplicationYaml,
    ];

    /// Canonical `type/subtype` string
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::TextPlain => "text/plain",
            MediaType::TextMarkdown => "text/markdown",
            MediaType::TextHtml => "text/html",
            MediaType::TextCsv => "text/csv",
            MediaType::ApplicationJson => "application/json",
            MediaType::ApplicationYaml => "application/yaml",
        }
    }

    /// Look up a base media type, ignoring ASCII case
    pub fn from_essence(essence: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|media_type| media_type.as_str().eq_ignore_ascii_case(essence.trim()))
    }

    /// Map a filename extension to its canonical media type
    ///
    /// Accepts the extension with or without its leading dot (`.md` or `md`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim();
        let ext = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(MediaType::TextPlain),
            "md" => Some(MediaType::TextMarkdown),
            "html" => Some(MediaType::TextHtml),
            "csv" => Some(MediaType::TextCsv),
            "json" => Some(MediaType::ApplicationJson),
            "yaml" | "yml" => Some(MediaType::ApplicationYaml),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.as_str().starts_with("text/")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed Content-Type value: a base media type plus ordered parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    essence: String,
    parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Parse a Content-Type header value such as `text/plain; charset=utf-8`
    ///
    /// The type, subtype and parameter names must be HTTP tokens; parameter
    /// values may be tokens or quoted strings. Parameter names are
    /// lower-cased, as is the essence.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || FragmentError::unsupported_type(value);

        let mut segments = split_unquoted(value).into_iter();
        let essence = segments.next().map(str::trim).unwrap_or_default();
        let (kind, subtype) = essence.split_once('/').ok_or_else(invalid)?;
        if !is_token(kind) || !is_token(subtype) {
            return Err(invalid());
        }

        let mut parameters = Vec::new();
        for segment in segments {
            let (name, raw) = segment.trim().split_once('=').ok_or_else(invalid)?;
            if !is_token(name) {
                return Err(invalid());
            }
            let parsed = if raw.starts_with('"') {
                unquote(raw).ok_or_else(invalid)?
            } else if is_token(raw) {
                raw.to_string()
            } else {
                return Err(invalid());
            };
            parameters.push((name.to_ascii_lowercase(), parsed));
        }

        Ok(Self {
            essence: essence.to_ascii_lowercase(),
            parameters,
        })
    }

    /// The base media type, parameters stripped
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// The supported media type this content type refers to, if any
    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_essence(&self.essence)
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// Split on `;` outside of quoted strings
fn split_unquoted(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (index, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

fn unquote(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            _ => out.push(c),
        }
    }
    Some(out)
}
