//! Minimal markdown to HTML renderer
//!
//! Line-oriented substitutions only: `#`, `##` and `###` headings, `**strong**`,
//! `*emphasis*` and newlines as `<br>`. Lists, links, code blocks and the rest
//! of CommonMark are left untouched; this is a known limitation.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADINGS: Lazy<[(Regex, &'static str); 3]> = Lazy::new(|| {
    [
        (heading(1), "<h1>${1}</h1>"),
        (heading(2), "<h2>${1}</h2>"),
        (heading(3), "<h3>${1}</h3>"),
    ]
});

static STRONG: Lazy<Regex> = Lazy::new(|| compile(r"\*\*(.*?)\*\*"));

static EMPHASIS: Lazy<Regex> = Lazy::new(|| compile(r"\*(.*?)\*"));

fn heading(level: usize) -> Regex {
    compile(&format!("(?m)^{} (.*)", "#".repeat(level)))
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static markdown pattern must compile")
}

pub(crate) fn to_html(text: &str) -> String {
    let mut html = text.to_string();
    for (pattern, replacement) in HEADINGS.iter() {
        html = pattern.replace_all(&html, *replacement).into_owned();
    }
    let html = STRONG.replace_all(&html, "<strong>${1}</strong>");
    let html = EMPHASIS.replace_all(&html, "<em>${1}</em>");
    html.replace('\n', "<br>")
}
