//! Programmatic tree construction.
//!
//! The parser front end and the tests build module trees through
//! [`AstBuilder`]. Every node gets the span set by the last [`AstBuilder::at`]
//! call, so a parser can position nodes as it goes.

use indexmap::IndexMap;
use rowan::TextRange;
use stratus_core::SourceId;

use crate::Span;

use super::{
    Ast, ConditionDecl, Decl, DeclKind, Expr, FunctionDecl, GroupDecl, ImportDecl, Literal,
    MacroDecl, MappingDecl, Module, NodeId, NodeKind, ParameterDecl, ResourceDecl,
    ResourceTypeDecl, Sub, UsingModule, Value, VariableDecl,
};

pub struct AstBuilder {
    ast: Ast,
    module: Module,
    source: SourceId,
    range: TextRange,
}

impl AstBuilder {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            ast: Ast::empty(),
            module: Module {
                name: module_name.into(),
                ..Module::default()
            },
            source: SourceId::default(),
            range: TextRange::default(),
        }
    }

    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = source;
        self
    }

    /// Position subsequent nodes at `range`.
    pub fn at(&mut self, range: TextRange) -> &mut Self {
        self.range = range;
        self
    }

    fn span(&self) -> Span {
        Span::new(self.source, self.range)
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.module.version = Some(version.into());
        self
    }

    pub fn secret(&mut self, secret: impl Into<String>) -> &mut Self {
        self.module.secrets.push(secret.into());
        self
    }

    pub fn pragma(&mut self, pragma: NodeId) -> &mut Self {
        self.module.pragmas.push(pragma);
        self
    }

    pub fn using(&mut self, module: impl Into<String>, parameters: Option<NodeId>) -> &mut Self {
        self.module.usings.push(UsingModule {
            module: module.into(),
            parameters,
        });
        self
    }

    // Expressions

    pub fn expr(&mut self, expr: Expr) -> NodeId {
        let span = self.span();
        self.ast.alloc_expr(expr, span)
    }

    pub fn literal(&mut self, literal: Literal) -> NodeId {
        self.expr(Expr::Literal(literal))
    }

    pub fn string(&mut self, s: impl Into<String>) -> NodeId {
        self.literal(Literal::string(s))
    }

    pub fn number(&mut self, n: f64) -> NodeId {
        self.literal(Literal::number(n))
    }

    pub fn bool(&mut self, b: bool) -> NodeId {
        self.literal(Literal::bool(b))
    }

    /// String literal that folding never touches.
    pub fn final_string(&mut self, s: impl Into<String>) -> NodeId {
        self.literal(Literal {
            value: Value::String(s.into()),
            is_final: true,
            from_existence_check: false,
        })
    }

    pub fn reference(&mut self, name: impl Into<String>) -> NodeId {
        self.expr(Expr::Reference { name: name.into() })
    }

    pub fn get_att(&mut self, name: impl Into<String>, attribute: impl Into<String>) -> NodeId {
        self.expr(Expr::GetAtt {
            name: name.into(),
            attribute: attribute.into(),
        })
    }

    pub fn condition_ref(&mut self, name: impl Into<String>) -> NodeId {
        self.expr(Expr::ConditionRef { name: name.into() })
    }

    pub fn join(&mut self, delimiter: impl Into<String>, values: Vec<NodeId>) -> NodeId {
        self.expr(Expr::Join {
            delimiter: delimiter.into(),
            values,
        })
    }

    pub fn select(&mut self, index: NodeId, values: Vec<NodeId>) -> NodeId {
        self.expr(Expr::Select { index, values })
    }

    pub fn split(&mut self, delimiter: NodeId, source: NodeId) -> NodeId {
        self.expr(Expr::Split { delimiter, source })
    }

    pub fn find_in_map(
        &mut self,
        map_name: impl Into<String>,
        top_key: NodeId,
        second_key: NodeId,
    ) -> NodeId {
        self.expr(Expr::FindInMap {
            map_name: map_name.into(),
            top_key,
            second_key,
        })
    }

    pub fn base64(&mut self, value: NodeId) -> NodeId {
        self.expr(Expr::Base64(value))
    }

    pub fn import_value(&mut self, value: NodeId) -> NodeId {
        self.expr(Expr::ImportValue(value))
    }

    pub fn sub(&mut self, format: impl Into<String>, parameters: Vec<(&str, NodeId)>) -> NodeId {
        let mut sub = Sub::new(format);
        sub.parameters = parameters
            .into_iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        self.expr(Expr::Sub(sub))
    }

    pub fn if_(&mut self, condition: NodeId, if_true: NodeId, if_false: NodeId) -> NodeId {
        self.expr(Expr::If {
            condition,
            if_true,
            if_false,
        })
    }

    pub fn and(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expr(Expr::And { lhs, rhs })
    }

    pub fn or(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expr(Expr::Or { lhs, rhs })
    }

    pub fn not(&mut self, value: NodeId) -> NodeId {
        self.expr(Expr::Not(value))
    }

    pub fn equals(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.expr(Expr::Equals { lhs, rhs })
    }

    pub fn is_defined(&mut self, name: impl Into<String>) -> NodeId {
        self.expr(Expr::IsDefined { name: name.into() })
    }

    pub fn list(&mut self, items: Vec<NodeId>) -> NodeId {
        self.expr(Expr::List(items))
    }

    pub fn object(&mut self, fields: Vec<(&str, NodeId)>) -> NodeId {
        let fields: IndexMap<String, NodeId> = fields
            .into_iter()
            .map(|(key, id)| (key.to_string(), id))
            .collect();
        self.expr(Expr::Object(fields))
    }

    // Declarations

    pub fn decl(&mut self, local_name: impl Into<String>, kind: DeclKind) -> NodeId {
        let span = self.span();
        self.ast
            .alloc(NodeKind::Decl(Decl::new(local_name, kind)), span)
    }

    pub fn parameter(&mut self, name: &str, type_name: &str, default: Option<NodeId>) -> NodeId {
        self.decl(
            name,
            DeclKind::Parameter(ParameterDecl {
                type_name: type_name.to_string(),
                default,
                ..ParameterDecl::default()
            }),
        )
    }

    pub fn variable(&mut self, name: &str, value: NodeId) -> NodeId {
        self.decl(
            name,
            DeclKind::Variable(VariableDecl {
                type_name: None,
                value,
            }),
        )
    }

    pub fn resource(&mut self, name: &str, resource: ResourceDecl) -> NodeId {
        self.decl(name, DeclKind::Resource(resource))
    }

    pub fn function(&mut self, name: &str, function: FunctionDecl) -> NodeId {
        self.decl(name, DeclKind::Function(function))
    }

    pub fn condition(&mut self, name: &str, value: NodeId) -> NodeId {
        self.decl(name, DeclKind::Condition(ConditionDecl { value }))
    }

    pub fn mapping(&mut self, name: &str, value: NodeId) -> NodeId {
        self.decl(name, DeclKind::Mapping(MappingDecl { value }))
    }

    pub fn macro_decl(&mut self, name: &str, handler: NodeId) -> NodeId {
        self.decl(name, DeclKind::Macro(MacroDecl { handler }))
    }

    pub fn resource_type(&mut self, name: &str, handler: NodeId) -> NodeId {
        self.decl(
            name,
            DeclKind::ResourceType(ResourceTypeDecl {
                handler,
                properties: Vec::new(),
                attributes: Vec::new(),
            }),
        )
    }

    pub fn group(&mut self, name: &str, items: Vec<NodeId>) -> NodeId {
        self.decl(name, DeclKind::Group(GroupDecl { items }))
    }

    pub fn import(&mut self, name: &str, module: &str) -> NodeId {
        self.decl(
            name,
            DeclKind::Import(ImportDecl {
                module: module.to_string(),
                type_name: None,
            }),
        )
    }

    /// Make `decl` stand for `expr` wherever it is referenced.
    pub fn reference_expression(&mut self, decl: NodeId, expr: NodeId) -> &mut Self {
        self.ast.decl_mut(decl).reference_expression = Some(expr);
        self.ast.link_child(decl, expr);
        self
    }

    /// Finish the module with the given top-level items.
    pub fn build(mut self, items: Vec<NodeId>) -> Ast {
        self.module.items = items;
        let span = self.span();
        let root = self.ast.alloc(NodeKind::Module(self.module), span);
        self.ast.set_root(root);
        self.ast
    }
}
