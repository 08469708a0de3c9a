//! Semantic query facade
//!
//! Analyzers ask three kinds of questions about a node: what type does this
//! expression have, what constant does it evaluate to, and which members
//! named `X` are visible on a type at a given position. [`SemanticModel`] is
//! the seam for those questions; [`LocalSemanticModel`] answers them from a
//! single document and a [`TypeCatalog`].
//!
//! A model is bound to one tree value. Nodes from any other tree (including
//! an edited copy of the bound one) are unresolved.

mod catalog;
mod local;

pub use catalog::{Accessibility, ExtensionDecl, MemberDecl, MemberKind, TypeCatalog, TypeDecl};
pub use local::LocalSemanticModel;

use std::fmt;

use rowan::TextSize;

use crate::cst::SyntaxNode;
use crate::cst::ast;

/// A possibly generic type: `Task`, `Task<int>`, `Dictionary<string, List<int>>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Catalogue key: `Name` for plain types, ``Name`N`` for generic ones
    pub fn metadata_name(&self) -> String {
        metadata_name(&self.name, self.args.len())
    }

    pub fn is(&self, name: &str) -> bool {
        self.args.is_empty() && self.name == name
    }

    /// Parse the textual form used in catalogues, e.g. `Task<T>`
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.char_indices().peekable();
        let ty = parse_type(text, &mut chars)?;
        skip_spaces(&mut chars);
        chars.peek().is_none().then_some(ty)
    }

    /// Type written in source
    pub fn from_syntax(ty: &ast::TypeRef) -> Option<Self> {
        let args = ty
            .type_args()
            .map(|arg| Self::from_syntax(&arg))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::generic(ty.name()?, args))
    }

    /// Replace type parameters by their bound arguments
    pub fn substitute(&self, params: &[String], args: &[TypeRef]) -> Self {
        if self.args.is_empty()
            && let Some(idx) = params.iter().position(|p| p == &self.name)
            && let Some(bound) = args.get(idx)
        {
            return bound.clone();
        }
        Self {
            name: self.name.clone(),
            args: self
                .args
                .iter()
                .map(|arg| arg.substitute(params, args))
                .collect(),
        }
    }
}

pub(crate) fn metadata_name(name: &str, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{name}`{arity}")
    }
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn skip_spaces(chars: &mut Chars<'_>) {
    while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
}

fn parse_type(text: &str, chars: &mut Chars<'_>) -> Option<TypeRef> {
    skip_spaces(chars);
    let start = chars.peek()?.0;
    let mut end = start;
    while let Some((idx, c)) = chars.next_if(|(_, c)| c.is_alphanumeric() || *c == '_' || *c == '.')
    {
        end = idx + c.len_utf8();
    }
    if end == start {
        return None;
    }
    let name = &text[start..end];

    skip_spaces(chars);
    let mut args = Vec::new();
    if chars.next_if(|(_, c)| *c == '<').is_some() {
        loop {
            args.push(parse_type(text, chars)?);
            skip_spaces(chars);
            match chars.next()?.1 {
                ',' => continue,
                '>' => break,
                _ => return None,
            }
        }
    }
    Some(TypeRef::generic(name, args))
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (idx, arg) in self.args.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Compile-time value of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    String(String),
    Null,
}

/// A member visible on a type, with type parameters already substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSymbol {
    pub name: String,
    pub kind: MemberKind,
    pub containing_type: TypeRef,
    /// Parameter types; empty for properties
    pub parameters: Vec<TypeRef>,
    /// Return type of a method, value type of a property
    pub ty: TypeRef,
    pub accessibility: Accessibility,
    pub is_static: bool,
    /// Extension method invoked with instance syntax
    pub is_extension: bool,
}

impl MemberSymbol {
    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    /// A method taking exactly one parameter of type `ty`
    pub fn has_single_parameter(&self, ty: &str) -> bool {
        self.is_method() && matches!(self.parameters.as_slice(), [param] if param.is(ty))
    }
}

/// Read-only semantic queries over one tree value
pub trait SemanticModel: Send + Sync {
    /// Static type of an expression node
    fn type_of(&self, expr: &SyntaxNode) -> Option<TypeRef>;

    /// Constant value of an expression node
    fn constant_value(&self, expr: &SyntaxNode) -> Option<ConstantValue>;

    /// Accessible members named `name` on `ty`, as seen from `position`,
    /// extension methods included
    fn lookup_members(&self, position: TextSize, ty: &TypeRef, name: &str) -> Vec<MemberSymbol>;

    /// Whether the type universe declares ``metadata_name`` (e.g. ``Task`1``)
    fn has_type(&self, metadata_name: &str) -> bool;

    /// Whether values of `ty` can be awaited
    ///
    /// An awaitable type has an accessible instance `GetAwaiter()` taking no
    /// parameters, whose return type exposes an `IsCompleted` property of type
    /// `bool` and an accessible parameterless `GetResult()` method.
    fn is_awaitable(&self, position: TextSize, ty: &TypeRef) -> bool {
        let awaiters: Vec<TypeRef> = self
            .lookup_members(position, ty, "GetAwaiter")
            .into_iter()
            .filter(|m| m.is_method() && !m.is_static && m.parameters.is_empty())
            .map(|m| m.ty)
            .collect();

        awaiters.iter().any(|awaiter| {
            let is_completed = self
                .lookup_members(position, awaiter, "IsCompleted")
                .iter()
                .any(|m| m.is_property() && !m.is_static && m.ty.is("bool"));
            let get_result = self
                .lookup_members(position, awaiter, "GetResult")
                .iter()
                .any(|m| m.is_method() && !m.is_static && m.parameters.is_empty());
            is_completed && get_result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_parse_and_display() {
        let ty = TypeRef::parse("Dictionary<string, List< int >>").unwrap();
        assert_eq!(ty.metadata_name(), "Dictionary`2");
        assert_eq!(ty.to_string(), "Dictionary<string, List<int>>");
        assert_eq!(TypeRef::parse("Task<int"), None);
        assert_eq!(TypeRef::parse("Task>"), None);
    }

    #[test]
    fn test_substitute_type_parameters() {
        let ty = TypeRef::parse("ConfiguredTaskAwaitable<T>").unwrap();
        let bound = ty.substitute(&["T".to_string()], &[TypeRef::named("int")]);
        assert_eq!(bound.to_string(), "ConfiguredTaskAwaitable<int>");
    }

    #[test]
    fn test_single_parameter() {
        let method = MemberSymbol {
            name: "ConfigureAwait".into(),
            kind: MemberKind::Method,
            containing_type: TypeRef::named("Task"),
            parameters: vec![TypeRef::named("bool")],
            ty: TypeRef::named("ConfiguredTaskAwaitable"),
            accessibility: Accessibility::Public,
            is_static: false,
            is_extension: false,
        };
        assert!(method.has_single_parameter("bool"));
        assert!(!method.has_single_parameter("int"));
    }
}
