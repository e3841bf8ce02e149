use quill_db::{Diagnostic, File, check_file, inspect_file};
use quill_inspect::{InspectionSettings, ScopeItem};
use quill_parse::ParseOutcome;
use quill_syntax::SyntaxKind;
use quill_span::IntoName as _;
use salsa::DatabaseImpl;
use text_size::TextSize;

#[test]
fn parse_query_yields_a_section_tree() {
    let db = DatabaseImpl::new();
    let file = File::new(&db, "demo.quill".into(), "section demo; x = 1;".to_owned());

    let result = file.parse(&db);
    assert!(matches!(result.outcome, ParseOutcome::Tree(_)));

    let root = result.store.root().unwrap();
    assert_eq!(result.store.kind_of(root), SyntaxKind::SECTION);
}

#[test]
fn recovered_errors_accumulate_as_diagnostics() {
    let db = DatabaseImpl::new();
    let file = File::new(&db, "demo.quill".into(), "[a = 1 b = 2]".to_owned());

    let diagnostics = check_file::accumulated::<Diagnostic>(&db, file);

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "expected ','");
}

#[test]
fn inspection_resolves_across_section_members() {
    let db = DatabaseImpl::new();
    let text = "section demo; x = 1; y = x + 1;";
    let file = File::new(&db, "demo.quill".into(), text.to_owned());

    let offset = TextSize::new(text.find("x +").unwrap() as u32);
    let inspection =
        inspect_file(&db, file, offset, &InspectionSettings::default()).unwrap();

    let name = "x".into_name(&db);
    assert!(matches!(inspection.scope.get(&name), Some(ScopeItem::SectionMember { .. })));
}
