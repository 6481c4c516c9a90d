use crm_search::query::{ParsedQuery, SavedViews, SearchSession, SubmitAction};

#[test]
fn test_plus_opens_picker_only_at_token_start() {
    let mut session = SearchSession::new("");
    session.on_key('+');
    assert!(session.expand_picker);

    session.on_change("status:open ");
    session.on_key('+');
    assert!(session.expand_picker);

    session.on_change("c");
    session.on_key('+');
    assert!(!session.expand_picker);
}

#[test]
fn test_blur_keeps_picker_open_after_plus() {
    let mut session = SearchSession::new("status:open +");
    session.expand_picker = true;
    session.on_blur();
    assert!(session.expand_picker);

    session.on_change("status:open");
    session.on_blur();
    assert!(!session.expand_picker);
}

#[test]
fn test_pick_replaces_trailing_plus() {
    let mut session = SearchSession::new("acme +");
    session.expand_picker = true;
    assert_eq!(session.pick("company:"), None);
    assert_eq!(session.search_string, "acme company:");
    assert!(!session.expand_picker);
}

#[test]
fn test_toggle_active_rewrites_existing_term() {
    let mut session = SearchSession::new("status:open active:true");
    let action = session.toggle_active(false);

    assert_eq!(session.search_string, "status:open active:false");
    assert_eq!(
        action,
        SubmitAction::Search("status:open active:false".to_string())
    );
    assert!(!session.active_only);

    let parsed = ParsedQuery::parse(&session.search_string);
    assert_eq!(parsed.offsets_for("active").count(), 1);
}

#[test]
fn test_toggle_active_appends_when_missing() {
    let mut session = SearchSession::new("status:open");
    session.toggle_active(true);
    assert_eq!(session.search_string, "status:open active:true");
    assert!(session.active_only);
}

#[test]
fn test_toggle_active_matches_keyword_in_any_case() {
    let mut session = SearchSession::new("ACTIVE:true");
    let action = session.toggle_active(false);

    assert_eq!(session.search_string, "ACTIVE:false");
    assert_eq!(action, SubmitAction::Search("ACTIVE:false".to_string()));
    assert!(!session.active_only);

    let parsed = ParsedQuery::parse(&session.search_string);
    assert_eq!(parsed.offsets_for("active").count(), 1);
}

#[test]
fn test_on_change_reads_uppercase_active_keyword() {
    let mut session = SearchSession::new("");
    session.on_change("Active:false status:open");
    assert!(!session.active_only);
}

#[test]
fn test_toggling_twice_keeps_one_active_term() {
    let mut session = SearchSession::new("");
    session.toggle_active(true);
    session.toggle_active(false);
    session.toggle_active(true);

    let parsed = ParsedQuery::parse(&session.search_string);
    let active: Vec<&str> = parsed
        .offsets_for("active")
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(active, vec!["true"]);
}

#[test]
fn test_on_change_tracks_active_value() {
    let mut session = SearchSession::new("active:false");
    assert!(!session.active_only);
    session.on_change("active:TRUE tag:x");
    assert!(session.active_only);
}

#[test]
fn test_submit_thresholds() {
    assert_eq!(SearchSession::new("").submit(), SubmitAction::Clear);
    assert_eq!(SearchSession::new("ab").submit(), SubmitAction::Skip);
    assert_eq!(
        SearchSession::new("abc").submit(),
        SubmitAction::Search("abc".to_string())
    );
    assert_eq!(
        SearchSession::new("🙂").submit(),
        SubmitAction::Search("🙂".to_string())
    );
    assert_eq!(
        SearchSession::new("ab").with_min_submit_chars(2).submit(),
        SubmitAction::Search("ab".to_string())
    );
}

#[test]
fn test_submit_action_labels() {
    assert_eq!(SubmitAction::Search("x".to_string()).as_str(), "search");
    assert_eq!(SubmitAction::Clear.as_str(), "clear");
    assert_eq!(SubmitAction::Skip.as_str(), "skip");
}

#[test]
fn test_clear_resets_text() {
    let mut session = SearchSession::new("status:open");
    assert_eq!(session.clear(), SubmitAction::Clear);
    assert!(session.search_string.is_empty());
}

#[test]
fn test_saved_views_per_parent_item() {
    let mut views = SavedViews::default();
    let session = SearchSession::new("status:open tag:vip");

    session.save_view(&mut views, "contacts", "VIP", "#ff0000");
    session.save_view(&mut views, "contacts", "VIP again", "#00ff00");

    assert!(session.is_saved(&views, "contacts"));
    assert!(!session.is_saved(&views, "companies"));
    assert_eq!(views.for_parent("contacts").len(), 1);
    assert_eq!(views.for_parent("contacts")[0].link_text, "VIP again");

    assert!(views.remove("contacts", "status:open tag:vip"));
    assert!(!views.remove("contacts", "status:open tag:vip"));
    assert!(views.for_parent("contacts").is_empty());
}
