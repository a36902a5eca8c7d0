use std::fs;
use strata::*;

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn hierarchy() -> Hierarchy {
    let mut hierarchy = Hierarchy::new();
    hierarchy.register(TypeDecl::root("Root"), RegisterOptions::default().read_table_name("roots")).unwrap();
    hierarchy.register(TypeDecl::child("A", "Root"), RegisterOptions::default().read_table_name("a")).unwrap();
    hierarchy.register(TypeDecl::child("B", "A"), RegisterOptions::default().read_table_name("b")).unwrap();
    hierarchy
}

fn memory() -> MemorySchema {
    let mut schema = MemorySchema::new();
    schema.create_table("roots", &["id", "name"]).unwrap();
    schema.create_table("a", &["id", "email"]).unwrap();
    schema.create_table("b", &["id", "badge"]).unwrap();
    schema
}

fn snapshot(name: &str) -> SnapshotSchema {
    let mut schema = SnapshotSchema::temp(name).unwrap();
    schema.create_table("roots", &["id", "name"]).unwrap();
    schema.create_table("a", &["id", "email"]).unwrap();
    schema.create_table("b", &["id", "badge"]).unwrap();
    schema
}

fn single_child_view<S: SchemaExecutor>(schema: &mut S) {
    let mut hierarchy = hierarchy();
    let mut reconciler = ViewReconciler::new(&mut hierarchy, schema);
    let def = reconciler.create("A").unwrap();
    assert_eq!(def.view_name, "view_a");
    assert_eq!(def.columns, cols(&["name", "email"]));
    assert_eq!(def.source_query, "SELECT roots.id, roots.name, a.email FROM roots, a WHERE roots.id = a.id");
    assert!(reconciler.view_exists("A").unwrap());
}

fn create_or_update_is_idempotent<S: SchemaExecutor>(schema: &mut S) {
    let mut hierarchy = hierarchy();
    let mut reconciler = ViewReconciler::new(&mut hierarchy, schema);
    let first = reconciler.create_or_update("A").unwrap();
    assert!(matches!(first, Reconciliation::Created(_)));
    let second = reconciler.create_or_update("A").unwrap();
    assert!(matches!(second, Reconciliation::Updated(_)));
    assert_eq!(first.definition(), second.definition());
}

fn drop_then_create_matches_fresh_create<S: SchemaExecutor>(schema: &mut S) {
    let mut hierarchy = hierarchy();
    let mut reconciler = ViewReconciler::new(&mut hierarchy, schema);
    let fresh = reconciler.create("A").unwrap();
    reconciler.drop("A").unwrap();
    assert!(!reconciler.view_exists("A").unwrap());
    let again = reconciler.create("A").unwrap();
    assert_eq!(fresh.columns, again.columns);
    assert_eq!(fresh.source_query, again.source_query);
}

fn update_on_missing_view_does_nothing<S: SchemaExecutor>(schema: &mut S) {
    let mut hierarchy = hierarchy();
    let mut reconciler = ViewReconciler::new(&mut hierarchy, schema);
    let outcome = reconciler.update("B").unwrap();
    assert!(matches!(outcome, Reconciliation::Skipped(StrataError::ViewAbsent { .. })));
    assert!(!reconciler.view_exists("B").unwrap());
}

fn three_generations<S: SchemaExecutor>(schema: &mut S) {
    let mut hierarchy = hierarchy();
    let mut migrator = Migrator::new(&mut hierarchy, schema);
    let results = migrator.create_or_update_all().unwrap();
    let order: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(order, vec!["A", "B"]);

    let b = results[1].1.definition().unwrap();
    assert_eq!(b.columns, cols(&["name", "email", "badge"]));
    assert_eq!(b.source_query, "SELECT view_a.id, view_a.name, view_a.email, b.badge FROM view_a, b WHERE view_a.id = b.id");

    let dropped = migrator.drop_all().unwrap();
    assert_eq!(dropped, vec!["B".to_string(), "A".to_string()]);
    assert!(!migrator.reconciler().view_exists("A").unwrap());
}

#[test]
fn memory_single_child_view() {
    single_child_view(&mut memory());
}

#[test]
fn memory_create_or_update_is_idempotent() {
    create_or_update_is_idempotent(&mut memory());
}

#[test]
fn memory_drop_then_create_matches_fresh_create() {
    drop_then_create_matches_fresh_create(&mut memory());
}

#[test]
fn memory_update_on_missing_view_does_nothing() {
    update_on_missing_view_does_nothing(&mut memory());
}

#[test]
fn memory_three_generations() {
    three_generations(&mut memory());
}

#[test]
fn snapshot_single_child_view() {
    let mut schema = snapshot("single_child_view");
    single_child_view(&mut schema);
    let _ = fs::remove_file(schema.path());
}

#[test]
fn snapshot_create_or_update_is_idempotent() {
    let mut schema = snapshot("create_or_update");
    create_or_update_is_idempotent(&mut schema);
    assert_eq!(schema.snapshot().unwrap().views.len(), 1);
    let _ = fs::remove_file(schema.path());
}

#[test]
fn snapshot_drop_then_create_matches_fresh_create() {
    let mut schema = snapshot("drop_then_create");
    drop_then_create_matches_fresh_create(&mut schema);
    let _ = fs::remove_file(schema.path());
}

#[test]
fn snapshot_update_on_missing_view_does_nothing() {
    let mut schema = snapshot("update_missing");
    update_on_missing_view_does_nothing(&mut schema);
    let _ = fs::remove_file(schema.path());
}

#[test]
fn snapshot_three_generations() {
    let mut schema = snapshot("three_generations");
    three_generations(&mut schema);
    assert!(schema.snapshot().unwrap().views.is_empty());
    let _ = fs::remove_file(schema.path());
}

#[test]
fn snapshot_records_view_ddl() {
    let mut schema = snapshot("records_ddl");
    let mut hierarchy = hierarchy();
    Migrator::new(&mut hierarchy, &mut schema).create_or_update_all().unwrap();

    let recorded = schema.snapshot().unwrap();
    assert_eq!(recorded.views["view_a"].columns, cols(&["id", "name", "email"]));
    assert_eq!(
        recorded.view_statements()[0],
        "CREATE VIEW view_a AS SELECT roots.id, roots.name, a.email FROM roots, a WHERE roots.id = a.id"
    );
    let _ = fs::remove_file(schema.path());
}

#[test]
fn schema_evolution_is_picked_up_by_update() {
    let mut hierarchy = hierarchy();
    let mut schema = memory();
    Migrator::new(&mut hierarchy, &mut schema).create_or_update_all().unwrap();

    schema.add_column("roots", "born_at").unwrap();
    let results = Migrator::new(&mut hierarchy, &mut schema).create_or_update_all().unwrap();
    assert!(results.iter().all(|(_, r)| matches!(r, Reconciliation::Updated(_))));
    assert_eq!(results[1].1.definition().unwrap().columns, cols(&["name", "born_at", "email", "badge"]));
}

#[test]
fn behaviour_profiles_follow_hierarchy() {
    let hierarchy = hierarchy();
    assert_eq!(hierarchy.behavior_profile("Root").unwrap(), Behavior::Root);
    assert_eq!(hierarchy.behavior_profile("A").unwrap(), Behavior::Child);
    assert_eq!(hierarchy.behavior_profile("B").unwrap(), Behavior::Child);
    assert_eq!(hierarchy.write_target("B").unwrap(), "b");
    assert_eq!(hierarchy.save_plan("B").unwrap().tables(), vec!["roots", "a", "b"]);
}

#[test]
fn custom_naming_policy_from_settings() {
    let settings = StrataSettings { naming: NamingSettings { view_prefix: "v_".to_string() }, ..StrataSettings::default() };
    let mut hierarchy = Hierarchy::with_naming(settings.naming_policy());
    hierarchy.register(TypeDecl::root("Root"), RegisterOptions::default().read_table_name("roots")).unwrap();
    hierarchy.register(TypeDecl::child("A", "Root"), RegisterOptions::default().read_table_name("a")).unwrap();

    let mut schema = memory();
    let def = ViewReconciler::with_settings(&mut hierarchy, &mut schema, &settings.reconcile).create("A").unwrap();
    assert_eq!(def.view_name, "v_a");
    assert!(schema.view("v_a").is_some());
}

#[test]
fn orphaned_child_fails_with_missing_parent() {
    let mut hierarchy = hierarchy();
    let mut schema = memory();
    hierarchy.unregister("A").unwrap();
    let err = ViewReconciler::new(&mut hierarchy, &mut schema).create("B").unwrap_err();
    assert!(matches!(err, StrataError::MissingParent { parent: Some(ref p), .. } if p == "A"));
}

#[test]
fn child_view_requires_parent_view() {
    let mut hierarchy = hierarchy();
    let mut schema = memory();
    let err = ViewReconciler::new(&mut hierarchy, &mut schema).create("B").unwrap_err();
    assert!(matches!(err, StrataError::SchemaUnavailable { ref table, .. } if table == "view_a"));
}

#[test]
fn missing_ancestor_view_is_reported_before_reload() {
    let mut hierarchy = hierarchy();
    hierarchy.register(TypeDecl::child("C", "B"), RegisterOptions::default().read_table_name("c")).unwrap();
    let mut schema = memory();
    schema.create_table("c", &["id", "rank"]).unwrap();

    let mut reconciler = ViewReconciler::new(&mut hierarchy, &mut schema);
    reconciler.create("A").unwrap();
    reconciler.create("B").unwrap();
    reconciler.drop("A").unwrap();

    let err = reconciler.create("C").unwrap_err();
    assert!(matches!(err, StrataError::SchemaUnavailable { ref type_name, ref table } if type_name == "C" && table == "view_a"));
    assert!(!reconciler.schema().view_exists("view_c").unwrap());
}

#[test]
fn migrator_stops_at_first_failure() {
    let mut hierarchy = hierarchy();
    let mut schema = memory();
    schema.drop_table("b").unwrap();

    let err = Migrator::new(&mut hierarchy, &mut schema).create_or_update_all().unwrap_err();
    assert!(matches!(err, StrataError::SchemaUnavailable { ref table, .. } if table == "b"));
    assert!(schema.view("view_a").is_some());
    assert!(schema.view("view_b").is_none());
}
