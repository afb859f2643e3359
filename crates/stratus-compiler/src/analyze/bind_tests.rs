use crate::DiagnosticKind;
use crate::ast::AstBuilder;
use crate::test_utils::{bound, diagnostics, range};

#[test]
fn full_names_follow_groups() {
    let mut b = AstBuilder::new("Demo");
    let v = b.string("v");
    let top = b.variable("Top", v);
    let inner_v = b.string("inner");
    let inner = b.variable("Bucket", inner_v);
    let deeper_v = b.string("deeper");
    let deeper = b.variable("Key", deeper_v);
    let nested = b.group("Keys", vec![deeper]);
    let storage = b.group("Storage", vec![inner, nested]);
    let ast = b.build(vec![top, storage]);

    let module = bound(ast);

    let names: Vec<&str> = module.directory().names().collect();
    assert_eq!(
        names,
        vec!["Top", "Storage", "Storage.Bucket", "Storage.Keys", "Storage.Keys.Key"]
    );
    assert_eq!(module.ast().decl(deeper).full_name(), "Storage.Keys.Key");
    assert!(module.is_valid());
}

#[test]
fn duplicate_definition_keeps_first() {
    let mut b = AstBuilder::new("Demo");
    b.at(range(0, 6));
    let first_v = b.string("a");
    let first = b.variable("Bucket", first_v);
    b.at(range(20, 26));
    let second_v = b.string("b");
    let second = b.variable("Bucket", second_v);
    let ast = b.build(vec![first, second]);

    let module = bound(ast);

    assert_eq!(module.directory().get("Bucket"), Some(first));
    assert_eq!(module.ast().decl(second).full_name(), "Bucket");
    assert_eq!(
        module.diagnostics().count_of(DiagnosticKind::DuplicateDefinition),
        1
    );
    insta::assert_snapshot!(diagnostics(&module), @"error at 20..26: `Bucket` is already defined (related: first defined here at 0..6)");
}

#[test]
fn same_local_name_in_different_groups() {
    let mut b = AstBuilder::new("Demo");
    let a_v = b.string("a");
    let a = b.variable("Name", a_v);
    let b_v = b.string("b");
    let bb = b.variable("Name", b_v);
    let left = b.group("Left", vec![a]);
    let right = b.group("Right", vec![bb]);
    let ast = b.build(vec![left, right]);

    let module = bound(ast);

    assert!(module.directory().contains("Left.Name"));
    assert!(module.directory().contains("Right.Name"));
    assert!(module.diagnostics().is_empty());
}
