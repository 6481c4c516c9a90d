use crate::crm::Record;
use crate::query::{IgnoredOffset, ParsedQuery, Predicate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

/// Format parsed offsets as a table
pub fn format_parsed_text(parsed: &ParsedQuery) -> String {
    let mut out = String::new();

    if parsed.is_empty() {
        let _ = writeln!(out, "No search terms.");
        return out;
    }

    let mut table = create_styled_table(&["#", "Keyword", "Value", "Exact", "Excluded", "Kind"]);
    for offset in &parsed.offsets {
        table.add_row(vec![
            Cell::new(offset.position),
            Cell::new(&offset.keyword),
            Cell::new(&offset.value),
            Cell::new(yes_no(offset.exact)),
            Cell::new(yes_no(parsed.is_excluded(offset))),
            Cell::new(offset.kind.as_str()),
        ]);
    }
    let _ = writeln!(out, "{table}");

    if !parsed.exclude.is_empty() {
        let excluded: Vec<&str> = parsed.exclude.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Excluded keywords: {}", excluded.join(", "));
    }

    out
}

pub fn format_predicates_text(predicates: &[Predicate], ignored: &[IgnoredOffset]) -> String {
    let mut out = String::new();

    if predicates.is_empty() {
        let _ = writeln!(out, "No predicates (matches everything).");
    }
    for predicate in predicates {
        let _ = writeln!(out, "{}", describe_predicate(predicate));
    }

    for skipped in ignored {
        let _ = writeln!(
            out,
            "ignored {}:{} ({})",
            skipped.keyword, skipped.value, skipped.reason
        );
    }

    out
}

pub fn describe_predicate(predicate: &Predicate) -> String {
    let not = |negated: bool| if negated { "NOT " } else { "" };
    match predicate {
        Predicate::Text { terms } => format!("text contains all of {terms:?}"),
        Predicate::Field {
            field,
            value,
            op,
            negated,
        } => format!("{}field {field} {op} {value:?}", not(*negated)),
        Predicate::Relation {
            relation,
            value,
            negated,
            ..
        } if value.is_empty() => format!("{}has any {relation}", not(*negated)),
        Predicate::Relation {
            relation,
            value,
            op,
            negated,
        } => format!("{}has {relation} {op} {value:?}", not(*negated)),
        Predicate::Active { active } => format!("active = {active}"),
    }
}

pub fn format_records_text(records: &[Record]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "SEARCH matched {} record{}",
        records.len(),
        if records.len() == 1 { "" } else { "s" }
    );

    if records.is_empty() {
        return out;
    }

    let mut table = create_styled_table(&["ID", "Name", "Email", "Active", "Relations"]);
    for record in records {
        let relations: Vec<String> = record
            .relations
            .iter()
            .map(|(relation, names)| format!("{relation}: {}", names.join(", ")))
            .collect();
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(&record.name),
            Cell::new(record.email.as_deref().unwrap_or("-")),
            Cell::new(yes_no(record.active)),
            Cell::new(relations.join("\n")),
        ]);
    }
    let _ = writeln!(out, "{table}");

    out
}

pub fn format_counts_text(group_by: &str, counts: &BTreeMap<String, usize>) -> String {
    let mut out = String::new();
    let total: usize = counts.values().sum();
    let _ = writeln!(out, "COUNT by {group_by}: {total} in {} group(s)", counts.len());

    if counts.is_empty() {
        return out;
    }

    let mut table = create_styled_table(&[group_by, "Count"]);
    for (value, count) in counts {
        table.add_row(vec![Cell::new(value), Cell::new(count)]);
    }
    let _ = writeln!(out, "{table}");

    out
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
