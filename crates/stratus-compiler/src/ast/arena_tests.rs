use indexmap::{IndexMap, IndexSet};

use super::printer::render_expr;
use super::{AstBuilder, Decl, DeclKind, Dependency, Guard, NodeId, ResourceDecl};

#[test]
fn alloc_links_children_to_parent() {
    let mut b = AstBuilder::new("Demo");
    let a = b.string("a");
    let c = b.string("c");
    let list = b.list(vec![a, c]);
    let var = b.variable("V", list);
    let ast = b.build(vec![var]);

    assert_eq!(ast.parent(a), Some(list));
    assert_eq!(ast.parent(c), Some(list));
    assert_eq!(ast.parent(list), Some(var));
    assert_eq!(ast.parent(var), Some(ast.root()));
    assert_eq!(ast.parent(ast.root()), None);
}

#[test]
fn resource_children_follow_field_order() {
    let mut b = AstBuilder::new("Demo");
    let cond = b.condition_ref("IsProd");
    let props = b.object(vec![]);
    let existing = b.string("arn:aws:s3:::bucket");
    let res = b.resource(
        "Bucket",
        ResourceDecl {
            resource_type: Some("AWS::S3::Bucket".into()),
            if_condition: Some(cond),
            properties: Some(props),
            value: Some(existing),
            ..ResourceDecl::default()
        },
    );
    let alias = b.reference("Other");
    b.reference_expression(res, alias);
    let ast = b.build(vec![res]);

    assert_eq!(ast.children(res), vec![cond, props, existing, alias]);
}

#[test]
fn exprs_and_decls_in_document_order() {
    let mut b = AstBuilder::new("Demo");
    let one = b.string("one");
    let first = b.variable("First", one);
    let two = b.string("two");
    let inner = b.variable("Inner", two);
    let group = b.group("Group", vec![inner]);
    let three = b.string("three");
    let last = b.variable("Last", three);
    let ast = b.build(vec![first, group, last]);

    assert_eq!(ast.decls(), vec![first, group, inner, last]);
    assert_eq!(ast.exprs(), vec![one, two, three]);
}

#[test]
fn enclosing_decl_walks_up() {
    let mut b = AstBuilder::new("Demo");
    let leaf = b.reference("X");
    let list = b.list(vec![leaf]);
    let var = b.variable("V", list);
    let ast = b.build(vec![var]);

    assert_eq!(ast.enclosing_decl(leaf), Some(var));
    assert_eq!(ast.enclosing_decl(var), Some(var));
    assert_eq!(ast.enclosing_decl(ast.root()), None);
}

#[test]
fn substitute_replaces_slot_and_relinks_parent() {
    let mut b = AstBuilder::new("Demo");
    let old = b.reference("X");
    let list = b.list(vec![old]);
    let var = b.variable("V", list);
    let mut ast = b.build(vec![var]);

    let span = ast.span(old);
    let new = ast.alloc_expr(super::Expr::Literal(super::Literal::string("x")), span);
    let count = ast.substitute(|_, id| (id == old).then_some(new));

    assert_eq!(count, 1);
    assert_eq!(ast.parent(new), Some(list));
    assert_eq!(ast.parent(old), None);
    insta::assert_snapshot!(render_expr(&ast, list), @r#"["x"]"#);
}

#[test]
fn apply_follows_replacement_chains() {
    let mut b = AstBuilder::new("Demo");
    let a = b.reference("A");
    let var = b.variable("V", a);
    let bb = b.reference("B");
    let c = b.string("c");
    let mut ast = b.build(vec![var]);

    let mut replacements = IndexMap::new();
    replacements.insert(a, bb);
    replacements.insert(bb, c);
    let count = ast.apply(&replacements);

    assert_eq!(count, 1);
    assert_eq!(ast.children(var), vec![c]);
    assert_eq!(ast.parent(c), Some(var));
}

#[test]
fn apply_descends_into_replacement() {
    let mut b = AstBuilder::new("Demo");
    let a = b.reference("A");
    let var = b.variable("V", a);
    let inner = b.reference("Inner");
    let wrapper = b.list(vec![inner]);
    let folded = b.string("folded");
    let mut ast = b.build(vec![var]);

    let mut replacements = IndexMap::new();
    replacements.insert(a, wrapper);
    replacements.insert(inner, folded);
    let count = ast.apply(&replacements);

    assert_eq!(count, 2);
    insta::assert_snapshot!(render_expr(&ast, wrapper), @r#"["folded"]"#);
}

#[test]
fn final_literal_is_never_replaced() {
    let mut b = AstBuilder::new("Demo");
    let fixed = b.final_string("${Keep}");
    let var = b.variable("V", fixed);
    let other = b.string("other");
    let mut ast = b.build(vec![var]);

    let count = ast.substitute(|_, id| (id == fixed).then_some(other));

    assert_eq!(count, 0);
    assert_eq!(ast.children(var), vec![fixed]);
}

#[test]
fn deep_copy_allocates_fresh_subtree() {
    let mut b = AstBuilder::new("Demo");
    let x = b.reference("X");
    let y = b.string("y");
    let join = b.join(",", vec![x, y]);
    let var = b.variable("V", join);
    let mut ast = b.build(vec![var]);

    let copy = ast.deep_copy(join);

    assert_ne!(copy, join);
    assert_eq!(ast.parent(copy), None);
    let copied_children = ast.children(copy);
    assert!(copied_children.iter().all(|c| *c != x && *c != y));
    assert!(copied_children.iter().all(|c| ast.parent(*c) == Some(copy)));
    assert_eq!(render_expr(&ast, copy), render_expr(&ast, join));
}

#[test]
fn detach_removes_list_element() {
    let mut b = AstBuilder::new("Demo");
    let a = b.string("a");
    let c = b.string("c");
    let list = b.list(vec![a, c]);
    let var = b.variable("V", list);
    let mut ast = b.build(vec![var]);

    assert!(ast.detach(a));
    assert_eq!(ast.parent(a), None);
    insta::assert_snapshot!(render_expr(&ast, list), @r#"["c"]"#);
    assert!(!ast.exprs().contains(&a));
}

#[test]
fn detach_refuses_fixed_slot() {
    let mut b = AstBuilder::new("Demo");
    let inner = b.bool(true);
    let not = b.not(inner);
    let var = b.variable("V", not);
    let mut ast = b.build(vec![var]);

    assert!(!ast.detach(inner));
    assert_eq!(ast.parent(inner), Some(not));
}

#[test]
fn alias_source_prefers_reference_expression() {
    let mut b = AstBuilder::new("Demo");
    let value = b.string("v");
    let plain = b.variable("Plain", value);
    let other = b.string("w");
    let aliased = b.variable("Aliased", other);
    let alias = b.reference("Plain");
    b.reference_expression(aliased, alias);
    let ast = b.build(vec![plain, aliased]);

    assert_eq!(ast.decl(plain).alias_source(), Some(value));
    assert_eq!(ast.decl(aliased).alias_source(), Some(alias));
}

fn dep(target: &str, guards: &[&str]) -> Dependency {
    Dependency {
        target: target.into(),
        guards: guards.iter().map(|g| Guard::condition(*g)).collect::<IndexSet<_>>(),
        origin: NodeId::from_raw(0),
    }
}

#[test]
fn unique_dependencies_merge_guards() {
    let mut decl = Decl::new("R", DeclKind::Group(Default::default()));
    decl.dependencies = vec![
        dep("A", &["C1", "C2"]),
        dep("B", &["C1"]),
        dep("A", &["C2"]),
        dep("B", &[]),
    ];

    let unique = decl.unique_dependencies();

    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0].target, "A");
    assert_eq!(
        unique[0].guards.iter().cloned().collect::<Vec<_>>(),
        vec![Guard::condition("C2")]
    );
    assert_eq!(unique[1].target, "B");
    assert!(!unique[1].is_conditional());
}

#[test]
fn dependency_serializes_to_json() {
    let mut edge = dep("Bucket", &["IsProd"]);
    edge.guards.insert(Guard::condition("IsDev").negated());

    let json = serde_json::to_string(&edge).unwrap();

    insta::assert_snapshot!(json, @r#"{"target":"Bucket","guards":[{"Condition":{"name":"IsProd","negated":false}},{"Condition":{"name":"IsDev","negated":true}}],"origin":0}"#);
}

#[test]
#[should_panic(expected = "read before binding")]
fn full_name_before_binding_panics() {
    let decl = Decl::new("Bucket", DeclKind::Group(Default::default()));
    let _ = decl.full_name();
}

#[test]
#[should_panic(expected = "assigned once")]
fn full_name_assigned_twice_panics() {
    let mut decl = Decl::new("Bucket", DeclKind::Group(Default::default()));
    decl.set_full_name("Bucket".into());
    decl.set_full_name("Other.Bucket".into());
}
