use crate::ast::printer::render_expr;
use crate::ast::{Ast, AstBuilder, NodeId, ResourceDecl};
use crate::test_utils::range;
use crate::{DiagnosticKind, Diagnostics};

use super::{bind, normalize};

fn bucket(b: &mut AstBuilder) -> NodeId {
    b.resource(
        "Bucket",
        ResourceDecl {
            resource_type: Some("AWS::S3::Bucket".into()),
            ..ResourceDecl::default()
        },
    )
}

fn run(mut ast: Ast) -> (Ast, usize, Diagnostics) {
    let mut diag = Diagnostics::new();
    let directory = bind(&mut ast, &mut diag);
    let count = normalize(&mut ast, &directory, &mut diag);
    (ast, count, diag)
}

fn value_of(ast: &Ast, var: NodeId) -> String {
    render_expr(ast, ast.children(var)[0])
}

#[test]
fn placeholders_become_parameters() {
    let mut b = AstBuilder::new("Demo");
    let res = bucket(&mut b);
    let sub = b.sub("arn:${Bucket.Arn}/${AWS::Region}", vec![]);
    let var = b.variable("Name", sub);
    let (ast, count, diag) = run(b.build(vec![res, var]));

    assert_eq!(count, 1);
    assert!(diag.is_empty());
    insta::assert_snapshot!(value_of(&ast, var), @r#"sub("arn:${P1}/${P2}", {P1: getatt(Bucket, Arn), P2: ref(AWS::Region)})"#);
}

#[test]
fn local_parameters_are_kept_and_names_skipped() {
    let mut b = AstBuilder::new("Demo");
    let res = bucket(&mut b);
    let local = b.string("local");
    let sub = b.sub("${P1}-${Bucket}", vec![("P1", local)]);
    let var = b.variable("Name", sub);
    let (ast, _, _) = run(b.build(vec![res, var]));

    insta::assert_snapshot!(value_of(&ast, var), @r#"sub("${P1}-${P2}", {P1: "local", P2: ref(Bucket)})"#);
}

#[test]
fn repeated_placeholder_shares_parameter() {
    let mut b = AstBuilder::new("Demo");
    let res = bucket(&mut b);
    let sub = b.sub("${Bucket}/${Bucket}", vec![]);
    let var = b.variable("Name", sub);
    let (ast, _, _) = run(b.build(vec![res, var]));

    insta::assert_snapshot!(value_of(&ast, var), @r#"sub("${P1}/${P1}", {P1: ref(Bucket)})"#);
}

#[test]
fn dotted_full_name_is_a_reference() {
    let mut b = AstBuilder::new("Demo");
    let res = bucket(&mut b);
    let group = b.group("Storage", vec![res]);
    let sub = b.sub("${Storage.Bucket}:${Storage.Bucket.Arn}", vec![]);
    let var = b.variable("Name", sub);
    let (ast, _, _) = run(b.build(vec![group, var]));

    insta::assert_snapshot!(value_of(&ast, var), @r#"sub("${P1}:${P2}", {P1: ref(Storage.Bucket), P2: getatt(Storage.Bucket, Arn)})"#);
}

#[test]
fn attribute_on_local_parameter_is_reported() {
    let mut b = AstBuilder::new("Demo");
    let local = b.reference("Other");
    b.at(range(10, 30));
    let sub = b.sub("x-${Local.Arn}", vec![("Local", local)]);
    let var = b.variable("Name", sub);
    let (ast, count, diag) = run(b.build(vec![var]));

    assert_eq!(count, 0);
    assert_eq!(diag.count_of(DiagnosticKind::AttributeOnLocalParameter), 1);
    let reported = diag.iter().next().unwrap();
    assert_eq!((reported.span().start(), reported.span().end()), (12, 24));
    insta::assert_snapshot!(value_of(&ast, var), @r#"sub("x-${Local.Arn}", {Local: ref(Other)})"#);
}

#[test]
fn extracted_parameter_points_into_format() {
    let mut b = AstBuilder::new("Demo");
    let res = bucket(&mut b);
    b.at(range(100, 120));
    let sub = b.sub("id-${Bucket}", vec![]);
    let var = b.variable("Name", sub);
    let (ast, _, _) = run(b.build(vec![res, var]));

    let Some(crate::ast::Expr::Sub(normalized)) = ast.get_expr(ast.children(var)[0]) else {
        panic!("expected a sub");
    };
    let param = normalized.parameters["P1"];
    assert_eq!(ast.span(param).start(), 103);
    assert_eq!(ast.span(param).end(), 112);
}

#[test]
fn malformed_format_is_left_alone() {
    let mut b = AstBuilder::new("Demo");
    let sub = b.sub("broken ${Name", vec![]);
    let var = b.variable("Name", sub);
    let (ast, count, diag) = run(b.build(vec![var]));

    assert_eq!(count, 0);
    assert!(diag.is_empty());
    assert_eq!(ast.children(var), vec![sub]);
}
