//! Compact textual rendering of module trees.

use std::fmt::Write;

use super::{Ast, Decl, DeclKind, Dependency, Expr, Guard, NodeId, NodeKind, Value};

/// Render one expression subtree on a single line.
pub fn render_expr(ast: &Ast, id: NodeId) -> String {
    let mut out = String::new();
    write_expr(ast, id, &mut out).expect("String write never fails");
    out
}

/// Render a dependency guard, `!` marking a negated one.
pub fn render_guard(ast: &Ast, guard: &Guard) -> String {
    match guard {
        Guard::Condition { name, negated } => format!("{}{name}", bang(*negated)),
        Guard::Expr { node, negated } => format!("{}{}", bang(*negated), render_expr(ast, *node)),
    }
}

fn bang(negated: bool) -> &'static str {
    if negated { "!" } else { "" }
}

pub struct AstPrinter<'a> {
    ast: &'a Ast,
    dependencies: bool,
}

impl<'a> AstPrinter<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            dependencies: false,
        }
    }

    /// Also print the edges recorded by the dependency resolver.
    pub fn with_dependencies(mut self, value: bool) -> Self {
        self.dependencies = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let module = self.ast.module();
        write!(w, "module {}", module.name)?;
        if let Some(version) = &module.version {
            write!(w, " @ {version}")?;
        }
        writeln!(w)?;
        for &pragma in &module.pragmas {
            writeln!(w, "  pragma {}", render_expr(self.ast, pragma))?;
        }
        for using in &module.usings {
            write!(w, "  using {}", using.module)?;
            if let Some(params) = using.parameters {
                write!(w, " {}", render_expr(self.ast, params))?;
            }
            writeln!(w)?;
        }
        for &item in &module.items {
            self.format_decl(w, item, 1)?;
        }
        Ok(())
    }

    fn format_decl(&self, w: &mut impl Write, id: NodeId, depth: usize) -> std::fmt::Result {
        let decl = self.ast.decl(id);
        let indent = "  ".repeat(depth);
        let name = decl.try_full_name().unwrap_or(&decl.local_name);
        writeln!(w, "{indent}{} {name}", decl.kind.keyword())?;

        let field_indent = "  ".repeat(depth + 1);
        for (label, text) in self.fields(decl) {
            writeln!(w, "{field_indent}{label}: {text}")?;
        }
        if let Some(reference) = decl.reference_expression {
            writeln!(w, "{field_indent}reference: {}", render_expr(self.ast, reference))?;
        }
        if self.dependencies {
            for dep in &decl.dependencies {
                writeln!(w, "{field_indent}-> {}", self.format_dependency(dep))?;
            }
        }
        for &nested in decl.nested_items() {
            self.format_decl(w, nested, depth + 1)?;
        }
        Ok(())
    }

    fn format_dependency(&self, dep: &Dependency) -> String {
        if dep.guards.is_empty() {
            return dep.target.clone();
        }
        let guards: Vec<String> = dep
            .guards
            .iter()
            .map(|g| render_guard(self.ast, g))
            .collect();
        format!("{} when {}", dep.target, guards.join(" && "))
    }

    fn fields(&self, decl: &Decl) -> Vec<(&'static str, String)> {
        let ast = self.ast;
        let expr = |id: NodeId| render_expr(ast, id);
        let mut out = Vec::new();
        match &decl.kind {
            DeclKind::Parameter(p) => {
                out.push(("type", p.type_name.clone()));
                out.extend(p.default.map(|d| ("default", expr(d))));
                if !p.allowed_values.is_empty() {
                    out.push(("allowed", p.allowed_values.join(", ")));
                }
            }
            DeclKind::Variable(v) => {
                out.extend(v.type_name.clone().map(|t| ("type", t)));
                out.push(("value", expr(v.value)));
            }
            DeclKind::Resource(r) => {
                out.extend(r.resource_type.clone().map(|t| ("type", t)));
                out.extend(r.if_condition.map(|c| ("if", expr(c))));
                out.extend(r.properties.map(|p| ("properties", expr(p))));
                out.extend(r.value.map(|v| ("value", expr(v))));
                if !r.depends_on.is_empty() {
                    out.push(("depends-on", r.depends_on.join(", ")));
                }
            }
            DeclKind::Function(f) => {
                out.extend(f.if_condition.map(|c| ("if", expr(c))));
                out.extend(f.properties.map(|p| ("properties", expr(p))));
                out.extend(f.environment.map(|e| ("environment", expr(e))));
                out.extend(f.runtime.clone().map(|r| ("runtime", r)));
                out.extend(f.handler.clone().map(|h| ("handler", h)));
            }
            DeclKind::Condition(c) => out.push(("value", expr(c.value))),
            DeclKind::Mapping(m) => out.push(("value", expr(m.value))),
            DeclKind::ResourceType(t) => out.push(("handler", expr(t.handler))),
            DeclKind::Macro(m) => out.push(("handler", expr(m.handler))),
            DeclKind::Nested(n) => {
                out.push(("module", n.module.clone()));
                out.extend(n.parameters.map(|p| ("parameters", expr(p))));
                if !n.depends_on.is_empty() {
                    out.push(("depends-on", n.depends_on.join(", ")));
                }
            }
            DeclKind::Package(p) => out.push(("files", p.files.clone())),
            DeclKind::Import(i) => out.push(("module", i.module.clone())),
            DeclKind::Group(_) => {}
        }
        out
    }
}

fn write_value(value: &Value, w: &mut impl Write) -> std::fmt::Result {
    match value {
        Value::String(s) => write!(w, "{s:?}"),
        other => write!(w, "{}", other.to_text()),
    }
}

fn write_list(ast: &Ast, ids: &[NodeId], w: &mut impl Write) -> std::fmt::Result {
    w.write_char('[')?;
    for (i, &id) in ids.iter().enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        write_expr(ast, id, w)?;
    }
    w.write_char(']')
}

fn write_fields<'f>(
    ast: &Ast,
    fields: impl Iterator<Item = (&'f String, &'f NodeId)>,
    w: &mut impl Write,
) -> std::fmt::Result {
    w.write_char('{')?;
    for (i, (key, &id)) in fields.enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        write!(w, "{key}: ")?;
        write_expr(ast, id, w)?;
    }
    w.write_char('}')
}

fn write_call(ast: &Ast, name: &str, args: &[NodeId], w: &mut impl Write) -> std::fmt::Result {
    write!(w, "{name}(")?;
    for (i, &id) in args.iter().enumerate() {
        if i > 0 {
            w.write_str(", ")?;
        }
        write_expr(ast, id, w)?;
    }
    w.write_char(')')
}

fn write_expr(ast: &Ast, id: NodeId, w: &mut impl Write) -> std::fmt::Result {
    let expr = match ast.kind(id) {
        NodeKind::Expr(expr) => expr,
        NodeKind::Decl(decl) => return write!(w, "<decl {}>", decl.local_name),
        NodeKind::Module(module) => return write!(w, "<module {}>", module.name),
    };
    match expr {
        Expr::Literal(lit) => write_value(&lit.value, w),
        Expr::Reference { name } => write!(w, "ref({name})"),
        Expr::GetAtt { name, attribute } => write!(w, "getatt({name}, {attribute})"),
        Expr::ConditionRef { name } => write!(w, "condition({name})"),
        Expr::IsDefined { name } => write!(w, "is-defined({name})"),
        Expr::Join { delimiter, values } => {
            write!(w, "join({delimiter:?}, ")?;
            write_list(ast, values, w)?;
            w.write_char(')')
        }
        Expr::Select { index, values } => {
            w.write_str("select(")?;
            write_expr(ast, *index, w)?;
            w.write_str(", ")?;
            write_list(ast, values, w)?;
            w.write_char(')')
        }
        Expr::Split { delimiter, source } => write_call(ast, "split", &[*delimiter, *source], w),
        Expr::FindInMap {
            map_name,
            top_key,
            second_key,
        } => {
            write!(w, "find-in-map({map_name}, ")?;
            write_expr(ast, *top_key, w)?;
            w.write_str(", ")?;
            write_expr(ast, *second_key, w)?;
            w.write_char(')')
        }
        Expr::Base64(inner) => write_call(ast, "base64", &[*inner], w),
        Expr::ImportValue(inner) => write_call(ast, "import-value", &[*inner], w),
        Expr::Sub(sub) => {
            write!(w, "sub({:?}", sub.format)?;
            if !sub.parameters.is_empty() {
                w.write_str(", ")?;
                write_fields(ast, sub.parameters.iter(), w)?;
            }
            w.write_char(')')
        }
        Expr::If {
            condition,
            if_true,
            if_false,
        } => write_call(ast, "if", &[*condition, *if_true, *if_false], w),
        Expr::And { lhs, rhs } => write_call(ast, "and", &[*lhs, *rhs], w),
        Expr::Or { lhs, rhs } => write_call(ast, "or", &[*lhs, *rhs], w),
        Expr::Not(inner) => write_call(ast, "not", &[*inner], w),
        Expr::Equals { lhs, rhs } => write_call(ast, "equals", &[*lhs, *rhs], w),
        Expr::List(items) => write_list(ast, items, w),
        Expr::Object(fields) => write_fields(ast, fields.iter(), w),
    }
}
