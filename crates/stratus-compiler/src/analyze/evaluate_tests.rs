use crate::ast::printer::render_expr;
use crate::ast::{Ast, AstBuilder, NodeId, ResourceDecl};
use crate::{DiagnosticKind, Diagnostics, Error};

use super::{FoldStats, bind, evaluate};

fn fold_with(mut ast: Ast, fuel: u32) -> (Ast, crate::Result<FoldStats>, Diagnostics) {
    let mut diag = Diagnostics::new();
    let directory = bind(&mut ast, &mut diag);
    let stats = evaluate(&mut ast, &directory, fuel, &mut diag);
    (ast, stats, diag)
}

fn fold(ast: Ast) -> (Ast, FoldStats, Diagnostics) {
    let (ast, stats, diag) = fold_with(ast, 1024);
    (ast, stats.expect("fixed point within fuel"), diag)
}

fn value(ast: &Ast, decl: NodeId) -> String {
    render_expr(ast, ast.children(decl)[0])
}

/// Module with a parameter `Param` and one variable `V` holding `expr`.
fn single(build: impl FnOnce(&mut AstBuilder) -> NodeId) -> (Ast, NodeId) {
    let mut b = AstBuilder::new("Demo");
    let param = b.parameter("Param", "String", None);
    let expr = build(&mut b);
    let var = b.variable("V", expr);
    (b.build(vec![param, var]), var)
}

fn folded(build: impl FnOnce(&mut AstBuilder) -> NodeId) -> String {
    let (ast, var) = single(build);
    let (ast, _, _) = fold(ast);
    value(&ast, var)
}

#[test]
fn and_with_false_is_false() {
    assert_eq!(
        folded(|b| {
            let f = b.bool(false);
            let x = b.reference("Param");
            b.and(f, x)
        }),
        "false"
    );
    assert_eq!(
        folded(|b| {
            let x = b.reference("Param");
            let f = b.bool(false);
            b.and(x, f)
        }),
        "false"
    );
}

#[test]
fn or_with_true_is_true() {
    assert_eq!(
        folded(|b| {
            let t = b.bool(true);
            let x = b.reference("Param");
            b.or(t, x)
        }),
        "true"
    );
    assert_eq!(
        folded(|b| {
            let x = b.reference("Param");
            let t = b.bool(true);
            b.or(x, t)
        }),
        "true"
    );
}

#[test]
fn neutral_operand_yields_the_other() {
    assert_eq!(
        folded(|b| {
            let t = b.bool(true);
            let x = b.reference("Param");
            b.and(t, x)
        }),
        "ref(Param)"
    );
    assert_eq!(
        folded(|b| {
            let x = b.reference("Param");
            let f = b.bool(false);
            b.or(x, f)
        }),
        "ref(Param)"
    );
}

#[test]
fn join_forms() {
    assert_eq!(
        folded(|b| {
            let a = b.string("a");
            let c = b.string("b");
            b.join(",", vec![a, c])
        }),
        r#""a,b""#
    );
    assert_eq!(folded(|b| b.join(",", vec![])), r#""""#);
    assert_eq!(
        folded(|b| {
            let x = b.reference("Param");
            b.join(",", vec![x])
        }),
        "ref(Param)"
    );
}

#[test]
fn join_merges_adjacent_literals() {
    let res = folded(|b| {
        let a = b.string("a");
        let bb = b.string("b");
        let x = b.reference("Param");
        let c = b.string("c");
        b.join("-", vec![a, bb, x, c])
    });

    insta::assert_snapshot!(res, @r#"join("-", ["a-b", ref(Param), "c"])"#);
}

#[test]
fn select_in_and_out_of_range() {
    assert_eq!(
        folded(|b| {
            let i = b.number(1.0);
            let items = vec![b.string("a"), b.string("b"), b.string("c")];
            b.select(i, items)
        }),
        r#""b""#
    );
    assert_eq!(
        folded(|b| {
            let i = b.string("0");
            let items = vec![b.string("a")];
            b.select(i, items)
        }),
        r#""a""#
    );
    assert_eq!(
        folded(|b| {
            let i = b.number(5.0);
            let items = vec![b.string("a"), b.string("b"), b.string("c")];
            b.select(i, items)
        }),
        r#"select(5, ["a", "b", "c"])"#
    );
}

#[test]
fn existence_check_folds_without_warning() {
    let (ast, var) = single(|b| {
        let defined = b.is_defined("Foo");
        let a = b.string("A");
        let bb = b.string("B");
        b.if_(defined, a, bb)
    });
    let (ast, _, diag) = fold(ast);

    assert_eq!(value(&ast, var), r#""B""#);
    assert!(diag.is_empty());
}

#[test]
fn existence_check_through_condition_and_not() {
    let mut b = AstBuilder::new("Demo");
    let defined = b.is_defined("AWS::Region");
    let negated = b.not(defined);
    let cond = b.condition("NoRegion", negated);
    let cref = b.condition_ref("NoRegion");
    let a = b.string("A");
    let bb = b.string("B");
    let pick = b.if_(cref, a, bb);
    let var = b.variable("V", pick);
    let (ast, _, diag) = fold(b.build(vec![cond, var]));

    assert_eq!(value(&ast, cond), "false");
    assert_eq!(value(&ast, var), r#""B""#);
    assert!(diag.is_empty());
}

#[test]
fn constant_condition_warns_once() {
    let mut b = AstBuilder::new("Demo");
    let lhs = b.string("prod");
    let rhs = b.string("prod");
    let eq = b.equals(lhs, rhs);
    let cond = b.condition("IsProd", eq);
    let cref = b.condition_ref("IsProd");
    let a = b.string("big");
    let small = b.string("small");
    let pick = b.if_(cref, a, small);
    let size = b.variable("Size", pick);
    let again = b.reference("Size");
    let copy = b.variable("Copy", again);
    let (ast, _, diag) = fold(b.build(vec![cond, size, copy]));

    assert_eq!(value(&ast, size), r#""big""#);
    assert_eq!(value(&ast, copy), r#""big""#);
    assert_eq!(diag.count_of(DiagnosticKind::ConstantCondition), 1);
    assert_eq!(
        diag.iter().next().unwrap().message(),
        "condition is always true"
    );
}

#[test]
fn equals_compares_typed_values() {
    assert_eq!(
        folded(|b| {
            let n = b.number(1.0);
            let s = b.string("1");
            b.equals(n, s)
        }),
        "false"
    );
}

#[test]
fn literal_interpolation_concatenates() {
    assert_eq!(
        folded(|b| {
            let a = b.string("a");
            let n = b.number(42.0);
            b.sub("${P1}-${P2}-${!Keep}", vec![("P1", a), ("P2", n)])
        }),
        r#""a-42-${Keep}""#
    );
}

#[test]
fn escape_survives_until_final_literal() {
    let (ast, var) = single(|b| {
        let lit = b.string("${Inner}");
        let x = b.reference("Param");
        b.sub("${P1}/${P2}/${!Keep}", vec![("P1", lit), ("P2", x)])
    });
    let (ast, stats, _) = fold(ast);

    assert_eq!(stats.reinlined, 1);
    insta::assert_snapshot!(value(&ast, var), @r#"sub("${!Inner}/${Param}/${!Keep}")"#);
}

#[test]
fn inlined_escape_keeps_other_parameters() {
    let (ast, var) = single(|b| {
        let lit = b.string("echo ${HOME");
        let x = b.reference("Param");
        b.sub("${P1}-${P2}", vec![("P1", lit), ("P2", x)])
    });
    let (ast, _, _) = fold(ast);

    insta::assert_snapshot!(value(&ast, var), @r#"sub("echo ${!HOME-${Param}")"#);
}

#[test]
fn unclosed_literal_placeholder_folds_to_text() {
    assert_eq!(
        folded(|b| {
            let lit = b.string("echo ${HOME");
            let x = b.string("x");
            b.sub("${P1}-${P2}", vec![("P1", lit), ("P2", x)])
        }),
        r#""echo ${HOME-x""#
    );
}

#[test]
fn reference_shadowed_by_kept_parameter_stays() {
    let mut b = AstBuilder::new("Demo");
    let param = b.parameter("Param", "String", None);
    let res = b.resource(
        "Bucket",
        ResourceDecl {
            resource_type: Some("AWS::S3::Bucket".into()),
            ..ResourceDecl::default()
        },
    );
    let p = b.reference("Param");
    let a = b.string("a");
    let joined = b.join(",", vec![p, a]);
    let x = b.reference("Bucket");
    let arn = b.get_att("Bucket", "Arn");
    let sub = b.sub(
        "${Bucket}/${X}/${Y}",
        vec![("Bucket", joined), ("X", x), ("Y", arn)],
    );
    let var = b.variable("V", sub);
    let (ast, stats, _) = fold(b.build(vec![param, res, var]));

    assert_eq!(stats.reinlined, 0);
    insta::assert_snapshot!(
        value(&ast, var),
        @r#"sub("${Bucket}/${X}/${Y}", {Bucket: join(",", [ref(Param), "a"]), X: ref(Bucket), Y: getatt(Bucket, Arn)})"#
    );
}

#[test]
fn local_attribute_placeholder_is_left_alone() {
    let (ast, var) = single(|b| {
        let local = b.string("x");
        b.sub("${Local.Arn}", vec![("Local", local)])
    });
    let (ast, _, _) = fold(ast);

    insta::assert_snapshot!(value(&ast, var), @r#"sub("${Local.Arn}", {Local: "x"})"#);
}

#[test]
fn reinlines_attribute_parameters() {
    let mut b = AstBuilder::new("Demo");
    let res = b.resource(
        "Bucket",
        ResourceDecl {
            resource_type: Some("AWS::S3::Bucket".into()),
            ..ResourceDecl::default()
        },
    );
    let a = b.string("a");
    let arn = b.get_att("Bucket", "Arn");
    let sub = b.sub("${P1}-${P2}", vec![("P1", a), ("P2", arn)]);
    let var = b.variable("V", sub);
    let (ast, _, _) = fold(b.build(vec![res, var]));

    insta::assert_snapshot!(value(&ast, var), @r#"sub("a-${Bucket.Arn}")"#);
}

#[test]
fn aliases_are_deep_copied() {
    let mut b = AstBuilder::new("Demo");
    let inner = b.reference("Param");
    let list = b.list(vec![inner]);
    let source = b.variable("Source", list);
    let use_ref = b.reference("Source");
    let user = b.variable("User", use_ref);
    let param = b.parameter("Param", "String", None);
    let (ast, _, _) = fold(b.build(vec![param, source, user]));

    let original = ast.children(source)[0];
    let copy = ast.children(user)[0];
    assert_ne!(original, copy);
    assert_eq!(render_expr(&ast, copy), "[ref(Param)]");
    assert_eq!(ast.parent(copy), Some(user));
}

#[test]
fn alias_chains_resolve() {
    let mut b = AstBuilder::new("Demo");
    let prefix_v = b.string("pre");
    let prefix = b.variable("Prefix", prefix_v);
    let p = b.reference("Prefix");
    let suffix = b.string("-suffix");
    let join = b.join("", vec![p, suffix]);
    let name = b.variable("Name", join);
    let again = b.reference("Name");
    let last = b.variable("Last", again);
    let (ast, stats, _) = fold(b.build(vec![prefix, name, last]));

    assert_eq!(value(&ast, last), r#""pre-suffix""#);
    assert!(stats.passes >= 3);
}

#[test]
fn self_alias_is_skipped() {
    let mut b = AstBuilder::new("Demo");
    let import = b.import("Imported", "Other.Module");
    let own = b.reference("Imported");
    b.reference_expression(import, own);
    let use_ref = b.reference("Imported");
    let var = b.variable("V", use_ref);
    let (ast, stats, diag) = fold(b.build(vec![import, var]));

    assert_eq!(value(&ast, var), "ref(Imported)");
    assert_eq!(stats.substitutions, 0);
    assert!(diag.is_empty());
}

#[test]
fn alias_cycle_reported_once_per_item() {
    let mut b = AstBuilder::new("Demo");
    let to_b = b.reference("B");
    let x = b.string("x");
    let join = b.join(",", vec![to_b, x]);
    let a = b.variable("A", join);
    let to_a = b.reference("A");
    let bb = b.variable("B", to_a);
    let (ast, _, diag) = fold(b.build(vec![a, bb]));

    assert_eq!(diag.count_of(DiagnosticKind::CircularReference), 2);
    assert_eq!(value(&ast, bb), "ref(A)");
    insta::assert_snapshot!(value(&ast, a), @r#"join(",", [ref(B), "x"])"#);
}

#[test]
fn split_literal_string() {
    let res = folded(|b| {
        let d = b.string(",");
        let s = b.string("a,b,c");
        b.split(d, s)
    });

    insta::assert_snapshot!(res, @r#"["a", "b", "c"]"#);
}

#[test]
fn find_in_map_with_literal_keys() {
    let mut b = AstBuilder::new("Demo");
    let ami = b.string("ami-123");
    let region = b.object(vec![("Ami", ami)]);
    let table = b.object(vec![("us-east-1", region)]);
    let mapping = b.mapping("Regions", table);
    let k1 = b.string("us-east-1");
    let k2 = b.string("Ami");
    let found = b.find_in_map("Regions", k1, k2);
    let hit = b.variable("Hit", found);
    let r = b.reference("AWS::Region");
    let k3 = b.string("Ami");
    let open = b.find_in_map("Regions", r, k3);
    let miss = b.variable("Miss", open);
    let (ast, _, _) = fold(b.build(vec![mapping, hit, miss]));

    assert_eq!(value(&ast, hit), r#""ami-123""#);
    assert_eq!(
        value(&ast, miss),
        r#"find-in-map(Regions, ref(AWS::Region), "Ami")"#
    );
}

#[test]
fn second_run_is_a_no_op() {
    let mut b = AstBuilder::new("Demo");
    let param = b.parameter("Param", "String", None);
    let x = b.reference("Param");
    let lit = b.string("a");
    let sub = b.sub("${P1}:${P2}", vec![("P1", x), ("P2", lit)]);
    let t = b.bool(true);
    let y = b.reference("Param");
    let and = b.and(t, y);
    let list = b.list(vec![sub, and]);
    let var = b.variable("V", list);
    let mut ast = b.build(vec![param, var]);

    let mut diag = Diagnostics::new();
    let directory = bind(&mut ast, &mut diag);
    let first = evaluate(&mut ast, &directory, 1024, &mut diag).unwrap();
    let before = value(&ast, var);
    let second = evaluate(&mut ast, &directory, 1024, &mut diag).unwrap();

    assert!(first.substitutions > 0);
    assert_eq!(second.substitutions, 0);
    assert_eq!(second.passes, 1);
    assert_eq!(second.reinlined, 0);
    assert_eq!(value(&ast, var), before);
    insta::assert_snapshot!(before, @r#"[sub("${Param}:a"), ref(Param)]"#);
}

#[test]
fn running_out_of_fuel_is_fatal() {
    let mut b = AstBuilder::new("Demo");
    let x = b.string("x");
    let w = b.variable("W", x);
    let r = b.reference("W");
    let v = b.variable("V", r);
    let (_, result, _) = fold_with(b.build(vec![w, v]), 1);

    assert!(matches!(
        result,
        Err(Error::EvaluationFuelExhausted { passes: 1 })
    ));
}
