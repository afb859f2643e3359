use indexmap::IndexMap;

use super::NodeId;

/// Template-provided names that are always defined.
pub const PSEUDO_PARAMETERS: &[&str] = &[
    "AWS::AccountId",
    "AWS::NoValue",
    "AWS::NotificationARNs",
    "AWS::Partition",
    "AWS::Region",
    "AWS::StackId",
    "AWS::StackName",
    "AWS::URLSuffix",
];

/// Pseudo parameter that removes the enclosing property when it is selected.
pub const NO_VALUE: &str = "AWS::NoValue";

pub fn is_pseudo_parameter(name: &str) -> bool {
    PSEUDO_PARAMETERS.contains(&name)
}

/// Expression node. Operands are ids of other nodes in the same arena.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Expr {
    Literal(Literal),
    /// Reference to an item by full name, or to a pseudo parameter.
    Reference { name: String },
    /// Attribute of a resource.
    GetAtt { name: String, attribute: String },
    /// Reference to a condition declaration.
    ConditionRef { name: String },
    Join { delimiter: String, values: Vec<NodeId> },
    Select { index: NodeId, values: Vec<NodeId> },
    Split { delimiter: NodeId, source: NodeId },
    FindInMap {
        map_name: String,
        top_key: NodeId,
        second_key: NodeId,
    },
    Base64(NodeId),
    ImportValue(NodeId),
    /// Interpolated string.
    Sub(Sub),
    If {
        condition: NodeId,
        if_true: NodeId,
        if_false: NodeId,
    },
    And { lhs: NodeId, rhs: NodeId },
    Or { lhs: NodeId, rhs: NodeId },
    Not(NodeId),
    Equals { lhs: NodeId, rhs: NodeId },
    /// Whether an item or pseudo parameter with this name exists.
    IsDefined { name: String },
    List(Vec<NodeId>),
    Object(IndexMap<String, NodeId>),
}

impl Expr {
    pub fn keyword(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Reference { .. } => "ref",
            Expr::GetAtt { .. } => "getatt",
            Expr::ConditionRef { .. } => "condition",
            Expr::Join { .. } => "join",
            Expr::Select { .. } => "select",
            Expr::Split { .. } => "split",
            Expr::FindInMap { .. } => "find-in-map",
            Expr::Base64(_) => "base64",
            Expr::ImportValue(_) => "import-value",
            Expr::Sub(_) => "sub",
            Expr::If { .. } => "if",
            Expr::And { .. } => "and",
            Expr::Or { .. } => "or",
            Expr::Not(_) => "not",
            Expr::Equals { .. } => "equals",
            Expr::IsDefined { .. } => "is-defined",
            Expr::List(_) => "list",
            Expr::Object(_) => "object",
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expr::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    /// Whether this is a literal that must never be rewritten.
    pub fn is_final(&self) -> bool {
        matches!(self, Expr::Literal(Literal { is_final: true, .. }))
    }

    /// Child ids in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Expr::Literal(_)
            | Expr::Reference { .. }
            | Expr::GetAtt { .. }
            | Expr::ConditionRef { .. }
            | Expr::IsDefined { .. } => Vec::new(),
            Expr::Join { values, .. } => values.clone(),
            Expr::Select { index, values } => {
                let mut out = vec![*index];
                out.extend(values.iter().copied());
                out
            }
            Expr::Split { delimiter, source } => vec![*delimiter, *source],
            Expr::FindInMap {
                top_key,
                second_key,
                ..
            } => vec![*top_key, *second_key],
            Expr::Base64(inner) | Expr::ImportValue(inner) | Expr::Not(inner) => vec![*inner],
            Expr::Sub(sub) => sub.parameters.values().copied().collect(),
            Expr::If {
                condition,
                if_true,
                if_false,
            } => vec![*condition, *if_true, *if_false],
            Expr::And { lhs, rhs } | Expr::Or { lhs, rhs } | Expr::Equals { lhs, rhs } => {
                vec![*lhs, *rhs]
            }
            Expr::List(items) => items.clone(),
            Expr::Object(fields) => fields.values().copied().collect(),
        }
    }

    pub(crate) fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            Expr::Literal(_)
            | Expr::Reference { .. }
            | Expr::GetAtt { .. }
            | Expr::ConditionRef { .. }
            | Expr::IsDefined { .. } => Vec::new(),
            Expr::Join { values, .. } => values.iter_mut().collect(),
            Expr::Select { index, values } => {
                let mut out = vec![index];
                out.extend(values.iter_mut());
                out
            }
            Expr::Split { delimiter, source } => vec![delimiter, source],
            Expr::FindInMap {
                top_key,
                second_key,
                ..
            } => vec![top_key, second_key],
            Expr::Base64(inner) | Expr::ImportValue(inner) | Expr::Not(inner) => vec![inner],
            Expr::Sub(sub) => sub.parameters.values_mut().collect(),
            Expr::If {
                condition,
                if_true,
                if_false,
            } => vec![condition, if_true, if_false],
            Expr::And { lhs, rhs } | Expr::Or { lhs, rhs } | Expr::Equals { lhs, rhs } => {
                vec![lhs, rhs]
            }
            Expr::List(items) => items.iter_mut().collect(),
            Expr::Object(fields) => fields.values_mut().collect(),
        }
    }
}

/// Interpolated string: a format with `${Name}` placeholders and a table of
/// local parameters bound to expressions.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Sub {
    pub format: String,
    pub parameters: IndexMap<String, NodeId>,
}

impl Sub {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            parameters: IndexMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum Value {
    String(String),
    Bool(bool),
    Number(f64),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view, accepting integral numbers and numeric strings.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Some(*n as usize),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text the value contributes when spliced into a string.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Value::Number(n) => n.to_string(),
        }
    }
}

/// Typed constant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Literal {
    pub value: Value,
    /// Never rewritten again once set.
    pub is_final: bool,
    /// Produced by folding an `is-defined` check; such conditions are
    /// expected to be constant and do not warn.
    pub from_existence_check: bool,
}

impl Literal {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            is_final: false,
            from_existence_check: false,
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(Value::String(s.into()))
    }

    pub fn bool(b: bool) -> Self {
        Self::new(Value::Bool(b))
    }

    pub fn number(n: f64) -> Self {
        Self::new(Value::Number(n))
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn with_existence_check(mut self, from_existence_check: bool) -> Self {
        self.from_existence_check = from_existence_check;
        self
    }
}
