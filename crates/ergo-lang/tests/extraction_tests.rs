use ergo_lang::query::queries;
use ergo_lang::{ConfigDict, EasyConfigDocument, KnowledgeBase, Literal, ResolvedValue, SyntaxTree};

fn with_document<R>(source: &str, check: impl FnOnce(&EasyConfigDocument<'_>) -> R) -> R {
    let knowledge = KnowledgeBase::builtin().expect("builtin knowledge");
    let tree = SyntaxTree::parse(source).expect("parse");
    let hints = ConfigDict::new();
    let document = EasyConfigDocument::new(
        &tree,
        queries().expect("queries"),
        knowledge.constants(),
        &hints,
    );
    check(&document)
}

#[test]
fn resolves_literals_templates_and_formatting() {
    let src = r#"
name = 'HDF5'
version = '1.12.2'
versionsuffix = '-%s' % 'serial'
label = "v%(version)s" % {'version': version}
sources = [SOURCE_TAR_GZ]
toolchain = SYSTEM
parallel = 2 * 4
homepage = 'https://' 'example.org'
local_conf = dict(shared=True, static=False)
"#;
    with_document(src, |document| {
        let config = document.config_dict();
        assert_eq!(config.get("versionsuffix"), Some(&Literal::str("-serial")));
        assert_eq!(config.get("label"), Some(&Literal::str("v1.12.2")));
        assert_eq!(config.get("parallel"), Some(&Literal::Int(8)));
        assert_eq!(config.get("homepage"), Some(&Literal::str("https://example.org")));
        assert!(
            !config.contains_key("sources"),
            "templated values stay unresolved: {config:#?}"
        );
        assert_eq!(
            config.get("toolchain").and_then(|value| value.get("name")),
            Some(&Literal::str("system"))
        );
        assert_eq!(
            config.get("local_conf").and_then(|value| value.get("shared")),
            Some(&Literal::Bool(true))
        );
    });
}

#[test]
fn unknown_is_contagious() {
    let src = r#"
version = '1.0'
version = '2.0'
derived = version + '-x'
chained = derived
opaque = some_call()
uses_opaque = [opaque]
plain = 'ok'
"#;
    with_document(src, |document| {
        let config = document.config_dict();
        for name in ["version", "derived", "chained", "opaque", "uses_opaque"] {
            assert!(!config.contains_key(name), "{name} resolved: {config:#?}");
        }
        assert_eq!(config.get("plain"), Some(&Literal::str("ok")));
    });
}

#[test]
fn forward_references_are_unknown() {
    with_document("early = late\nlate = 'x'\n", |document| {
        let config = document.config_dict();
        assert!(!config.contains_key("early"));
        assert_eq!(config.get("late"), Some(&Literal::str("x")));
    });
}

#[test]
fn dependency_entries_cover_both_lists() {
    let src = r#"
dependencies = [
    ('zlib', '1.2.13'),
    ('Python', '3.11.3', '-bare'),  # trailing comment
]
builddependencies = [('CMake', '3.26.3', '', SYSTEM)]
other = [('x', 'y')]
"#;
    with_document(src, |document| {
        let entries = document.dependency_entries();
        let summary = entries
            .iter()
            .map(|entry| (entry.list, entry.arity()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("dependencies", 2),
                ("dependencies", 3),
                ("builddependencies", 4)
            ]
        );

        let values = document.dependency_values();
        assert_eq!(values[1][2], ResolvedValue::Known(Literal::str("-bare")));
        assert!(matches!(&values[2][3], ResolvedValue::Known(Literal::Dict(_))));
    });
}

#[test]
fn dependency_values_are_idempotent() {
    let src = r#"
local_ver = '1.2.13'
dependencies = [('zlib', local_ver), ('bzip2', '1.0.8', '', SYSTEM)]
"#;
    let first = with_document(src, |document| {
        let once = document.dependency_values().to_vec();
        let twice = document.dependency_values().to_vec();
        assert_eq!(once, twice);
        once
    });
    let second = with_document(src, |document| document.dependency_values().to_vec());
    assert_eq!(first, second);
    assert_eq!(first[0][1], ResolvedValue::Known(Literal::str("1.2.13")));
}

#[test]
fn non_local_variables_skip_scratch_names() {
    let src = "local_x = 1\n_y = 2\nz = 3\nhomepage = local_x\n";
    with_document(src, |document| {
        let names = document
            .non_local_variables()
            .iter()
            .map(|node| document.text(*node))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["homepage"]);
    });
}

#[test]
fn broken_syntax_is_still_extracted() {
    let src = "name = 'zlib'\nversion = \ndependencies = [('bzip2', '1.0.8')]\n";
    with_document(src, |document| {
        assert_eq!(document.config_dict().get("name"), Some(&Literal::str("zlib")));
        assert_eq!(
            document.dependency_values().len(),
            document.dependency_entries().len()
        );
    });
}

#[test]
fn explicit_resolution_uses_document_environment() {
    with_document("version = '3.1'\nx = 1\n", |document| {
        let tree = document.tree();
        let statement = tree.root().named_child(1).expect("second statement");
        let assignment = statement.named_child(0).expect("assignment");
        let right = assignment.child_by_field_name("right").expect("right");
        assert_eq!(document.resolve(right), ResolvedValue::Known(Literal::Int(1)));
    });
}
