use super::fields::{KeywordKind, SearchFields};
use super::parser::ParsedQuery;
use super::serializer::format_offset;
use colored::Colorize;
use serde::Serialize;

/// Shown in place of an empty search box
pub const PLACEHOLDER: &str = "Search...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagClass {
    Relation,
    Field,
}

impl TagClass {
    pub fn css_class(self) -> &'static str {
        match self {
            TagClass::Relation => "highlight-relation",
            TagClass::Field => "highlight-field",
        }
    }
}

/// A rendered piece of the search box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Text {
        text: String,
    },
    Tag {
        class: TagClass,
        excluded: bool,
        text: String,
    },
}

/// One segment per offset; only relation and field keywords become tags.
pub fn highlight(parsed: &ParsedQuery, fields: &SearchFields) -> Vec<Segment> {
    parsed
        .offsets
        .iter()
        .map(|offset| {
            let class = match fields.classify(&offset.keyword) {
                KeywordKind::Relation => Some(TagClass::Relation),
                KeywordKind::Field => Some(TagClass::Field),
                KeywordKind::Freetext | KeywordKind::Unknown => None,
            };
            let excluded = parsed.is_excluded(offset);

            match class {
                Some(class) => Segment::Tag {
                    class,
                    excluded,
                    text: format_offset(offset, excluded),
                },
                None if offset.is_freetext() => Segment::Text {
                    text: offset.value.clone(),
                },
                None => Segment::Text {
                    text: format_offset(offset, excluded),
                },
            }
        })
        .collect()
}

/// Render the search box contents as HTML spans
pub fn render_html(text: &str, fields: &SearchFields) -> String {
    if text.trim().is_empty() {
        return PLACEHOLDER.to_string();
    }

    let parsed = ParsedQuery::parse_with_fields(text, fields);
    highlight(&parsed, fields)
        .iter()
        .map(|segment| match segment {
            Segment::Text { text } => escape_html(text),
            Segment::Tag { class, text, .. } => format!(
                r#"<span class="{}">{}</span>"#,
                class.css_class(),
                escape_html(text)
            ),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render segments for a terminal
pub fn render_ansi(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text { text } => text.normal().to_string(),
            Segment::Tag {
                class,
                excluded,
                text,
            } => {
                let styled = match class {
                    TagClass::Relation => text.bright_blue().bold(),
                    TagClass::Field => text.green().bold(),
                };
                if *excluded {
                    styled.strikethrough().to_string()
                } else {
                    styled.to_string()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
