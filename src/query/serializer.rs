use super::parser::{Offset, PICKER_SUFFIX, ParsedQuery};

/// Turn a parsed query back into search text.
///
/// Offsets keep their order and are joined by single spaces. Freetext is
/// written as-is; keyword values are quoted when exact or when they contain
/// whitespace. The syntax has no escape for `"`, so double quotes inside a
/// keyword value are dropped.
///
/// The output never ends in a bare `+` word: the parser reads that as the
/// picker suffix, so trailing `+` words of freetext are left out.
pub fn serialize(parsed: &ParsedQuery) -> String {
    let mut text = parsed
        .offsets
        .iter()
        .map(|offset| format_offset(offset, parsed.is_excluded(offset)))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    while let Some(rest) = text.strip_suffix(PICKER_SUFFIX)
        && (rest.is_empty() || rest.ends_with(char::is_whitespace))
    {
        let len = rest.trim_end().len();
        text.truncate(len);
    }
    text
}

/// Format a single offset as a search token
pub fn format_offset(offset: &Offset, excluded: bool) -> String {
    if offset.is_freetext() {
        return offset.value.trim().to_string();
    }

    let value = offset.value.replace('"', "");
    let quote = offset.exact || value.chars().any(char::is_whitespace);

    let mut token = String::with_capacity(offset.keyword.len() + value.len() + 4);
    if excluded {
        token.push('-');
    }
    token.push_str(&offset.keyword);
    token.push(':');
    if quote {
        token.push('"');
        token.push_str(&value);
        token.push('"');
    } else {
        token.push_str(&value);
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_round_trip_well_formed_tokens() {
        for text in [
            "status:open",
            r#"-company:Acme tag:"big deal" stage:won"#,
            "assignee:jane active:true city:Paris",
            "stage:",
        ] {
            assert_eq!(serialize(&ParsedQuery::parse(text)), text);
        }
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let parsed = ParsedQuery::parse("  status:open    hello   world ");
        assert_eq!(serialize(&parsed), "status:open hello world");
    }

    #[test]
    fn test_value_with_space_gets_quoted() {
        let parsed = ParsedQuery {
            original_text: String::new(),
            offsets: vec![Offset::new("company", "Acme Corp")],
            exclude: BTreeSet::new(),
        };
        assert_eq!(serialize(&parsed), r#"company:"Acme Corp""#);
    }

    #[test]
    fn test_unterminated_quote_survives() {
        let text = r#"status:open tag:"big deal"#;
        let parsed = ParsedQuery::parse(text);
        assert_eq!(serialize(&parsed), text);
        assert!(ParsedQuery::parse(&serialize(&parsed)).is_equivalent(&parsed));
    }

    #[test]
    fn test_trailing_plus_words_are_not_written() {
        let parsed = ParsedQuery {
            original_text: String::new(),
            offsets: vec![Offset::new("status", "open"), Offset::freetext("+ +", 12)],
            exclude: BTreeSet::new(),
        };
        assert_eq!(serialize(&parsed), "status:open");

        let parsed = ParsedQuery::parse("c++ tag:+");
        assert_eq!(serialize(&parsed), "c++ tag:+");
    }

    #[test]
    fn test_inner_quotes_are_dropped() {
        let offset = Offset::new("tag", r#"say "hi""#).exact(true);
        assert_eq!(format_offset(&offset, false), r#"tag:"say hi""#);
    }
}
