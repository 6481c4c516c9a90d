use chrono::{DateTime, Utc};
use crm_search::crm::{
    Channel, ContactHandler, DEFAULT_GROUP_BY, GatewayError, HandlerError, InMemoryRepository,
    LoggingGateway, Record, RecordUpdate, Repository,
};
use crm_search::query::{FieldMeta, SearchError, SearchFields};
use std::collections::BTreeMap;

fn parse_utc(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts)
        .expect("valid RFC3339 timestamp")
        .with_timezone(&Utc)
}

fn fields() -> SearchFields {
    SearchFields::new()
        .with_field("email", FieldMeta::default())
        .with_field("city", FieldMeta::default())
}

fn seeded_repository() -> InMemoryRepository {
    let mut jane = Record::new("Jane Doe")
        .with_email("jane@acme.test")
        .with_phone("+15550100")
        .with_field("city", "Paris")
        .with_relation("company", &["Acme Corp"])
        .with_relation("tag", &["big deal"]);
    jane.updated_at = parse_utc("2026-01-10T00:00:00Z");

    let mut bob = Record::new("Bob Stone")
        .with_email("bob@globex.test")
        .with_field("city", "Berlin")
        .with_relation("company", &["Globex"])
        .with_relation("stage", &["Lead"]);
    bob.updated_at = parse_utc("2026-01-01T00:00:00Z");

    let mut old = Record::new("Old Timer")
        .with_relation("company", &["Acme Corp"])
        .inactive();
    old.updated_at = parse_utc("2025-06-01T00:00:00Z");

    InMemoryRepository::from_records(vec![jane, bob, old]).expect("valid records")
}

fn handler() -> ContactHandler<InMemoryRepository, LoggingGateway> {
    ContactHandler::new(
        seeded_repository(),
        LoggingGateway::new().with_from_number("+15550199"),
        fields(),
    )
}

fn names(records: &[Record]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn test_index_without_query_lists_newest_first() {
    let response = handler().index("", None).unwrap();
    assert_eq!(names(&response.records), vec!["Old Timer", "Bob Stone", "Jane Doe"]);
}

#[test]
fn test_index_relation_and_active_filters() {
    let handler = handler();

    let response = handler.index("company:acme active:true", None).unwrap();
    assert_eq!(names(&response.records), vec!["Jane Doe"]);

    let response = handler.index("company:acme active:false", None).unwrap();
    assert_eq!(names(&response.records), vec!["Old Timer"]);
}

#[test]
fn test_index_exclusion_and_freetext() {
    let handler = handler();

    let response = handler.index("-company:Acme", None).unwrap();
    assert_eq!(names(&response.records), vec!["Bob Stone"]);

    let response = handler.index("paris jane", None).unwrap();
    assert_eq!(names(&response.records), vec!["Jane Doe"]);
}

#[test]
fn test_index_exact_tag_and_existence() {
    let handler = handler();

    let response = handler.index(r#"tag:"big deal""#, None).unwrap();
    assert_eq!(names(&response.records), vec!["Jane Doe"]);

    let response = handler.index("stage:", None).unwrap();
    assert_eq!(names(&response.records), vec!["Bob Stone"]);
}

#[test]
fn test_index_modified_since() {
    let response = handler()
        .index("", Some(parse_utc("2026-01-05T00:00:00Z")))
        .unwrap();
    assert_eq!(names(&response.records), vec!["Jane Doe"]);
}

#[test]
fn test_index_reports_ignored_keywords_unless_strict() {
    let response = handler().index("shoe_size:42 city:berlin", None).unwrap();
    assert_eq!(names(&response.records), vec!["Bob Stone"]);
    assert_eq!(response.ignored.len(), 1);

    let err = handler()
        .strict(true)
        .index("shoe_size:42", None)
        .unwrap_err();
    assert!(matches!(
        err,
        HandlerError::Search(SearchError::UnknownKeyword(ref k)) if k == "shoe_size"
    ));
}

#[test]
fn test_store_updates_contact_with_same_email() {
    let mut handler = handler();
    let stored = handler
        .store(Record::new("Jane D.").with_email("JANE@acme.test"))
        .unwrap();

    assert_eq!(stored.id, 1);
    assert_eq!(stored.name, "Jane D.");
    assert_eq!(handler.repository().len(), 3);
    assert_eq!(stored.phone.as_deref(), Some("+15550100"));
    assert_eq!(stored.field_value("city"), Some("Paris"));
    assert_eq!(stored.related("tag"), ["big deal"]);
    assert_eq!(stored.related("company"), ["Acme Corp"]);
    assert!(handler.sms(1, "still reachable").is_ok());

    let created = handler.store(Record::new("New Person")).unwrap();
    assert_eq!(created.id, 4);
}

#[test]
fn test_store_merges_submitted_values_into_existing_contact() {
    let mut handler = handler();
    let stored = handler
        .store(
            Record::new("Jane Doe")
                .with_email("jane@acme.test")
                .with_field("vat", "FR1")
                .with_relation("company", &["Initech"]),
        )
        .unwrap();

    assert_eq!(stored.field_value("city"), Some("Paris"));
    assert_eq!(stored.field_value("vat"), Some("FR1"));
    assert_eq!(stored.related("company"), ["Initech"]);
    assert_eq!(stored.related("tag"), ["big deal"]);
}

#[test]
fn test_destroy_removes_contact() {
    let mut handler = handler();
    handler.destroy(2).unwrap();

    assert!(matches!(handler.show(2), Err(HandlerError::NotFound(2))));
    assert_eq!(handler.repository().len(), 2);
    assert!(matches!(handler.destroy(2), Err(HandlerError::NotFound(2))));
}

#[test]
fn test_count_groups_by_relation_and_field() {
    let handler = handler();

    let by_company = handler.count("company", None).unwrap();
    assert_eq!(
        by_company,
        BTreeMap::from([("Acme Corp".to_string(), 2), ("Globex".to_string(), 1)])
    );

    let by_active = handler.count("active", None).unwrap();
    assert_eq!(
        by_active,
        BTreeMap::from([("false".to_string(), 1), ("true".to_string(), 2)])
    );

    let by_status = handler.count(DEFAULT_GROUP_BY, None).unwrap();
    assert!(by_status.is_empty());
}

#[test]
fn test_count_limited_to_assignee() {
    let mut handler = handler();
    let update = RecordUpdate {
        relations: BTreeMap::from([("assignee".to_string(), vec!["Sam".to_string()])]),
        ..RecordUpdate::default()
    };
    handler.update(2, update).unwrap();

    let counts = handler.count("city", Some("sam")).unwrap();
    assert_eq!(counts, BTreeMap::from([("Berlin".to_string(), 1)]));
}

#[test]
fn test_export_writes_filtered_csv() {
    let handler = handler();
    let mut out = Vec::new();
    let rows = handler.export("company:acme", None, &mut out).unwrap();
    assert_eq!(rows, 2);

    let csv = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "id,name,email,phone,active,updated_at,city,company,tag");
    assert!(lines[1].starts_with("3,Old Timer,,,false,"));
    assert!(lines[2].starts_with("1,Jane Doe,jane@acme.test,+15550100,true,"));
    assert!(lines[2].ends_with(",Paris,Acme Corp,big deal"));
}

#[test]
fn test_update_syncs_relations() {
    let mut handler = handler();
    let update = RecordUpdate {
        active: Some(false),
        fields: BTreeMap::from([("city".to_string(), "Lyon".to_string())]),
        relations: BTreeMap::from([(
            "company".to_string(),
            vec!["Initech".to_string(), "Initech".to_string()],
        )]),
        ..RecordUpdate::default()
    };

    let record = handler.update(1, update).unwrap();
    assert!(!record.active);
    assert_eq!(record.field_value("city"), Some("Lyon"));
    assert_eq!(record.related("company"), ["Initech"]);
    assert_eq!(record.related("tag"), ["big deal"]);

    let stored = handler.repository().find(1).unwrap().unwrap();
    assert_eq!(stored, record);
}

#[test]
fn test_show_and_update_missing_contact() {
    let mut handler = handler();
    assert!(matches!(handler.show(99), Err(HandlerError::NotFound(99))));
    assert!(matches!(
        handler.update(99, RecordUpdate::default()),
        Err(HandlerError::NotFound(99))
    ));
}

#[test]
fn test_email_sms_and_call_go_through_gateway() {
    let mut handler = handler();

    let email = handler.email(1, "Hello", "Hi Jane").unwrap();
    assert_eq!(email.channel, Channel::Email);
    assert_eq!(email.recipient, "jane@acme.test");

    let sms = handler.sms(1, "ping").unwrap();
    assert_eq!(sms.channel, Channel::Sms);

    let call = handler.call(1).unwrap();
    assert_eq!(call.recipient, "+15550100");

    assert_eq!(handler.gateway().deliveries().len(), 3);
}

#[test]
fn test_messaging_requires_contact_details() {
    let mut handler = handler();
    assert!(matches!(
        handler.sms(2, "ping"),
        Err(HandlerError::MissingContactDetail { id: 2, detail: "phone" })
    ));
    assert!(matches!(
        handler.email(3, "s", "b"),
        Err(HandlerError::MissingContactDetail { id: 3, detail: "email" })
    ));
}

#[test]
fn test_gateway_errors_are_wrapped() {
    let mut handler = ContactHandler::new(seeded_repository(), LoggingGateway::new(), fields());
    assert!(matches!(
        handler.call(1),
        Err(HandlerError::Gateway(GatewayError::MissingSender(Channel::Call)))
    ));
}
