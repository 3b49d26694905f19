//! Per-field transform pipeline.
//!
//! Converts cleaned, relationship-resolved canonical fields into final
//! render-ready strings: slug derivation, typographic normalization,
//! markdown rendering, YAML list rendering, learn-more sub-records, and
//! the final quote-escaping pass.

mod typography;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use fieldpress_shared::Record;

pub use typography::typography;

/// Fields run through the typography filter.
const TYPOGRAPHY_FIELDS: [&str; 5] = [
    "contributors",
    "image_caption",
    "image_source",
    "short_write_up",
    "title",
];

/// Semicolon-delimited fields rendered as YAML sequences. The relation
/// fields arrive sorted and deduplicated from the resolver; `tags` and
/// `contributors` keep their curated order, without dedup.
const LIST_FIELDS: [&str; 6] = [
    "contributors",
    "related_solutions",
    "related_stories",
    "related_theories",
    "tags",
    "values",
];

/// Scalar fields that the output template wraps in double quotes. The
/// final escaping pass applies to these only — the list blocks carry
/// their own per-item escaping and must stay parseable.
const QUOTED_FIELDS: [&str; 11] = [
    "image_caption",
    "image_link",
    "image_name",
    "image_source",
    "image_source_url",
    "scale",
    "short_write_up",
    "title",
    "when",
    "where",
    "who",
];

/// Apply every per-field filter to a mapped, relationship-resolved record.
///
/// Mutates the record in place. Filter order matters: the slug is derived
/// from the title before typography curls its quotes, and escaping runs
/// after everything else.
pub fn transform_record(record: &mut Record) {
    // Create a slug before any filter mutates the title
    let slug = slugify(record.title());
    record.set("slug", slug);

    // Scale is a picklist but rendered as prose
    let scale = record.get("scale").replace(';', ", ");
    record.set("scale", scale);

    for field in TYPOGRAPHY_FIELDS {
        let value = typography(record.get(field));
        record.set(field, value);
    }

    let html = markdown_to_html(record.get("short_write_up"));
    record.set("short_write_up", html);

    for field in LIST_FIELDS {
        let value = record.get(field);
        if !value.trim().is_empty() {
            let rendered = yaml_list(value.split(';'));
            record.set(field, rendered);
        }
    }

    if let Some(rendered) = learn_more_entries(record.get("learn_more")) {
        record.set("learn_more", rendered);
    }

    for field in QUOTED_FIELDS {
        let value = escape_quotes(record.get(field));
        record.set(field, value);
    }
}

// ---------------------------------------------------------------------------
// Slug derivation
// ---------------------------------------------------------------------------

/// Derive a filesystem/URL-safe slug from a title: lowercase, every
/// non-word character replaced with `-`.
///
/// Distinct titles can normalize to the same slug; that collision is
/// surfaced by the renderer, not resolved here.
pub fn slugify(title: &str) -> String {
    static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("valid regex"));

    NON_WORD_RE
        .replace_all(&title.to_lowercase(), "-")
        .to_string()
}

// ---------------------------------------------------------------------------
// Markdown rendering
// ---------------------------------------------------------------------------

/// Render lightweight markup to an HTML fragment via pulldown-cmark.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html.trim_end().to_string()
}

// ---------------------------------------------------------------------------
// YAML list rendering
// ---------------------------------------------------------------------------

/// Render items as a block of YAML sequence entries, one `\n- "item"` per
/// item, with embedded double quotes escaped per item.
pub fn yaml_list<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    items
        .into_iter()
        .map(|item| format!("\n- \"{}\"", escape_quotes(item)))
        .collect()
}

// ---------------------------------------------------------------------------
// Learn-more sub-records
// ---------------------------------------------------------------------------

/// Parse and render the `learn_more` field: blank-line-separated
/// sub-items of exactly four lines (title, description, type, url),
/// rendered as a YAML sequence of mappings.
///
/// Returns `None` when any raw sub-item is empty — the field is then left
/// untouched (an empty `learn_more` stays empty rather than becoming an
/// empty list). Sub-items with the wrong number of lines are dropped.
fn learn_more_entries(raw: &str) -> Option<String> {
    let items: Vec<&str> = raw.trim().split("\n\n").collect();
    if items.iter().any(|item| item.is_empty()) {
        return None;
    }

    let mut rendered = String::new();
    for item in items {
        let parts: Vec<&str> = item.split('\n').collect();
        let &[title, description, kind, url] = parts.as_slice() else {
            debug!(lines = parts.len(), "dropping malformed learn_more entry");
            continue;
        };

        rendered.push_str(&format!(
            "\n-\n    title: \"{}\"\n    description: \"{}\"\n    type: \"{}\"\n    url: \"{}\"",
            escape_quotes(&typography(title)),
            escape_quotes(&typography(description)),
            escape_quotes(kind),
            escape_quotes(url),
        ));
    }

    Some(rendered)
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Escape embedded double quotes for substitution into a quote-wrapped
/// template field.
pub fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}
