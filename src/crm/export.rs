use super::record::Record;
use std::collections::BTreeSet;
use std::io::Write;

const BASE_HEADERS: [&str; 6] = ["id", "name", "email", "phone", "active", "updated_at"];

/// Separator between related names inside one relation column
pub const RELATION_SEPARATOR: &str = "; ";

/// Write records as CSV.
///
/// Native columns come first, then one column per custom field and one per
/// relation seen in any record, each group sorted by name.
pub fn write_records_csv<W: Write>(records: &[Record], out: W) -> Result<(), csv::Error> {
    let fields: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.fields.keys().map(String::as_str))
        .collect();
    let relations: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.relations.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(out);

    let headers = BASE_HEADERS
        .iter()
        .copied()
        .chain(fields.iter().copied())
        .chain(relations.iter().copied());
    writer.write_record(headers)?;

    for record in records {
        let mut row = vec![
            record.id.to_string(),
            record.name.clone(),
            record.email.clone().unwrap_or_default(),
            record.phone.clone().unwrap_or_default(),
            record.active.to_string(),
            record.updated_at.to_rfc3339(),
        ];
        row.extend(
            fields
                .iter()
                .map(|f| record.fields.get(*f).cloned().unwrap_or_default()),
        );
        row.extend(
            relations
                .iter()
                .map(|rel| record.related(rel).join(RELATION_SEPARATOR)),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
