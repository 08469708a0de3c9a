//! Single-document semantic model
//!
//! Types come from three places: declarations in the document (parameters,
//! locals, method return types), literals, and the [`TypeCatalog`] for member
//! signatures. Anything else is unresolved, which callers treat as "no
//! answer" rather than an error.

use std::sync::Arc;

use dashmap::DashMap;
use rowan::{GreenNode, TextRange, TextSize};

use super::{ConstantValue, MemberSymbol, SemanticModel, TypeCatalog, TypeRef};
use crate::cst::ast::{self, AstNode, Expr};
use crate::cst::{SyntaxKind, SyntaxNode, SyntaxTree};
use crate::semantic::catalog::Accessibility;

/// Receiver of a member access
enum Receiver {
    /// An expression value: instance members and extension methods
    Value(TypeRef),
    /// A type name: static members only
    Type(TypeRef),
}

/// [`SemanticModel`] over one [`SyntaxTree`] value
pub struct LocalSemanticModel {
    root: GreenNode,
    catalog: Arc<TypeCatalog>,
    types: DashMap<(SyntaxKind, TextRange), Option<TypeRef>>,
}

impl LocalSemanticModel {
    pub fn new(tree: &SyntaxTree, catalog: Arc<TypeCatalog>) -> Self {
        Self {
            root: tree.green().clone(),
            catalog,
            types: DashMap::new(),
        }
    }

    /// Model with the built-in task types
    pub fn with_task_types(tree: &SyntaxTree) -> Self {
        Self::new(tree, Arc::new(TypeCatalog::with_task_types()))
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    fn owns(&self, node: &SyntaxNode) -> bool {
        let root = node.ancestors().last().unwrap_or_else(|| node.clone());
        std::ptr::eq(&*root.green(), &*self.root)
    }

    fn infer(&self, node: &SyntaxNode) -> Option<TypeRef> {
        let key = (node.kind(), node.text_range());
        if let Some(cached) = self.types.get(&key) {
            return cached.clone();
        }

        let ty = Expr::cast(node.clone()).and_then(|expr| self.infer_expr(&expr));
        if ty.is_none() {
            tracing::trace!(kind = ?node.kind(), range = ?node.text_range(), "unresolved type");
        }
        self.types.insert(key, ty.clone());
        ty
    }

    fn infer_expr(&self, expr: &Expr) -> Option<TypeRef> {
        match expr {
            Expr::Literal(literal) => match literal.token()?.kind() {
                SyntaxKind::TrueKw | SyntaxKind::FalseKw => Some(TypeRef::named("bool")),
                SyntaxKind::IntNumber => Some(TypeRef::named("int")),
                SyntaxKind::String => Some(TypeRef::named("string")),
                _ => None,
            },
            Expr::Name(name) => self.resolve_name(name.syntax(), &name.text()?),
            Expr::Paren(paren) => self.infer(paren.expr()?.syntax()),
            Expr::Await(await_expr) => {
                let operand = await_expr.expr()?;
                let position = operand.syntax().text_range().start();
                let ty = self.infer(operand.syntax())?;
                let awaiter = self.single_method(position, &ty, "GetAwaiter", 0)?;
                self.single_method(position, &awaiter, "GetResult", 0)
            }
            Expr::MemberAccess(access) => {
                let name = access.name()?;
                let position = access.syntax().text_range().start();
                self.members_on(position, &access.receiver()?, &name)
                    .into_iter()
                    .find(MemberSymbol::is_property)
                    .map(|property| property.ty)
            }
            Expr::Invocation(call) => {
                let arity = call.arguments().len();
                match call.callee()? {
                    Expr::MemberAccess(access) => {
                        let name = access.name()?;
                        let position = access.syntax().text_range().start();
                        self.members_on(position, &access.receiver()?, &name)
                            .into_iter()
                            .find(|m| m.is_method() && m.parameters.len() == arity)
                            .map(|method| method.ty)
                    }
                    Expr::Name(name) => self.local_method_return(call.syntax(), &name.text()?, arity),
                    _ => None,
                }
            }
            Expr::Binary(binary) => {
                let op = binary.op()?.kind();
                match op {
                    SyntaxKind::Eq => self.infer(binary.lhs()?.syntax()),
                    SyntaxKind::Plus | SyntaxKind::Minus | SyntaxKind::Star | SyntaxKind::Slash => {
                        let lhs = self.infer(binary.lhs()?.syntax())?;
                        let rhs = self.infer(binary.rhs()?.syntax())?;
                        if op == SyntaxKind::Plus && (lhs.is("string") || rhs.is("string")) {
                            Some(TypeRef::named("string"))
                        } else if lhs.is("int") && rhs.is("int") {
                            Some(lhs)
                        } else {
                            None
                        }
                    }
                    _ => Some(TypeRef::named("bool")),
                }
            }
            Expr::Prefix(prefix) => match prefix.op()?.kind() {
                SyntaxKind::Bang => Some(TypeRef::named("bool")),
                SyntaxKind::Minus => self
                    .infer(prefix.operand()?.syntax())
                    .filter(|ty| ty.is("int")),
                _ => None,
            },
        }
    }

    /// Return type of the only method `name` with `arity` parameters
    fn single_method(
        &self,
        position: TextSize,
        ty: &TypeRef,
        name: &str,
        arity: usize,
    ) -> Option<TypeRef> {
        self.lookup_members(position, ty, name)
            .into_iter()
            .find(|m| m.is_method() && !m.is_static && m.parameters.len() == arity)
            .map(|m| m.ty)
    }

    fn receiver(&self, expr: &Expr) -> Option<Receiver> {
        if let Some(ty) = self.infer(expr.syntax()) {
            return Some(Receiver::Value(ty));
        }
        if let Expr::Name(name) = expr
            && let Some(text) = name.text()
            && self.catalog.contains(&text)
        {
            return Some(Receiver::Type(TypeRef::named(text)));
        }
        None
    }

    fn members_on(&self, position: TextSize, receiver: &Expr, name: &str) -> Vec<MemberSymbol> {
        match self.receiver(receiver) {
            Some(Receiver::Value(ty)) => self.lookup_members(position, &ty, name),
            Some(Receiver::Type(ty)) => self
                .lookup_members(position, &ty, name)
                .into_iter()
                .filter(|m| m.is_static && !m.is_extension)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Innermost declaration of `name` visible at `node`: an earlier local in
    /// an enclosing scope, then a parameter of the enclosing method
    fn resolve_name(&self, node: &SyntaxNode, name: &str) -> Option<TypeRef> {
        let start = node.text_range().start();

        for scope in node.ancestors() {
            let local = scope
                .children()
                .filter_map(ast::LocalDecl::cast)
                .filter(|decl| decl.syntax().text_range().end() <= start)
                .filter(|decl| decl.name().as_deref() == Some(name))
                .last();
            if let Some(decl) = local {
                return match decl.ty() {
                    Some(ty) => TypeRef::from_syntax(&ty),
                    None => self.infer(decl.initializer()?.syntax()),
                };
            }

            if let Some(method) = ast::MethodDecl::cast(scope)
                && let Some(param) = method
                    .parameter_list()
                    .into_iter()
                    .flat_map(|list| list.parameters())
                    .find(|param| param.name().as_deref() == Some(name))
            {
                return TypeRef::from_syntax(&param.ty()?);
            }
        }
        None
    }

    /// Return type of a method declared next to the call site
    fn local_method_return(&self, call: &SyntaxNode, name: &str, arity: usize) -> Option<TypeRef> {
        let container = call
            .ancestors()
            .find(|n| matches!(n.kind(), SyntaxKind::ClassDecl | SyntaxKind::CompilationUnit))?;

        container
            .children()
            .filter_map(ast::MethodDecl::cast)
            .find(|method| {
                method.name().as_deref() == Some(name)
                    && method
                        .parameter_list()
                        .is_some_and(|list| list.parameters().count() == arity)
            })
            .and_then(|method| TypeRef::from_syntax(&method.return_type()?))
    }

    /// Name of the class declaration enclosing `position`
    fn enclosing_class(&self, position: TextSize) -> Option<String> {
        let root = SyntaxNode::new_root(self.root.clone());
        if !root.text_range().contains_inclusive(position) {
            return None;
        }
        let token = root.token_at_offset(position).right_biased()?;
        token
            .parent_ancestors()
            .find_map(ast::ClassDecl::cast)
            .and_then(|class| class.name())
    }

    fn is_accessible(&self, member: &MemberSymbol, position: TextSize) -> bool {
        match member.accessibility {
            Accessibility::Public | Accessibility::Internal => true,
            Accessibility::Protected | Accessibility::Private => {
                self.enclosing_class(position).as_deref() == Some(member.containing_type.name.as_str())
            }
        }
    }
}

impl SemanticModel for LocalSemanticModel {
    fn type_of(&self, expr: &SyntaxNode) -> Option<TypeRef> {
        if !self.owns(expr) {
            tracing::debug!(kind = ?expr.kind(), "node from another tree, unresolved");
            return None;
        }
        self.infer(expr)
    }

    fn constant_value(&self, expr: &SyntaxNode) -> Option<ConstantValue> {
        if !self.owns(expr) {
            return None;
        }
        constant_of(&Expr::cast(expr.clone())?)
    }

    fn lookup_members(&self, position: TextSize, ty: &TypeRef, name: &str) -> Vec<MemberSymbol> {
        let mut members = self.catalog.declared_members(ty, name);
        members.extend(self.catalog.extension_methods(ty, name));
        members.retain(|member| self.is_accessible(member, position));
        members
    }

    fn has_type(&self, metadata_name: &str) -> bool {
        self.catalog.contains(metadata_name)
    }
}

fn constant_of(expr: &Expr) -> Option<ConstantValue> {
    match expr {
        Expr::Literal(literal) => {
            let token = literal.token()?;
            match token.kind() {
                SyntaxKind::TrueKw => Some(ConstantValue::Bool(true)),
                SyntaxKind::FalseKw => Some(ConstantValue::Bool(false)),
                SyntaxKind::NullKw => Some(ConstantValue::Null),
                SyntaxKind::IntNumber => token.text().parse().ok().map(ConstantValue::Int),
                SyntaxKind::String => {
                    let text = token.text();
                    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
                    Some(ConstantValue::String(inner.to_string()))
                }
                _ => None,
            }
        }
        Expr::Paren(paren) => constant_of(&paren.expr()?),
        Expr::Prefix(prefix) => match (prefix.op()?.kind(), constant_of(&prefix.operand()?)?) {
            (SyntaxKind::Bang, ConstantValue::Bool(value)) => Some(ConstantValue::Bool(!value)),
            (SyntaxKind::Minus, ConstantValue::Int(value)) => {
                value.checked_neg().map(ConstantValue::Int)
            }
            _ => None,
        },
        _ => None,
    }
}
