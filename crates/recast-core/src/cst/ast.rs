//! Typed AST layer over CST
//!
//! Zero-cost wrappers over [`SyntaxNode`] exposing the typed children of each
//! node kind. [`AnyNode`] is the tagged union over every node kind; matching on
//! it is exhaustive, so adding a kind forces every dispatch site to handle it.
//!
//! # Example
//!
//! ```
//! use recast_core::cst::{parse, ast::{AstNode, MethodDecl}};
//!
//! let parse = parse("void M(int a, int b) { }");
//! let method = parse.syntax().children().find_map(MethodDecl::cast).unwrap();
//!
//! assert_eq!(method.name().as_deref(), Some("M"));
//! assert_eq!(method.parameter_list().unwrap().parameters().count(), 2);
//! ```

use super::{SyntaxKind, SyntaxNode, SyntaxNodeExt, SyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

/// First child node castable to `N`
fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

/// Child nodes castable to `N`, in order
fn children<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    parent.children().filter_map(N::cast)
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(
    /// Root of a parsed document
    CompilationUnit => CompilationUnit
);
ast_node!(ClassDecl => ClassDecl);
ast_node!(
    /// `modifiers Type Name(params) { body }`
    MethodDecl => MethodDecl
);
ast_node!(
    /// Bracketed, comma-separated parameters: `(int a, string b)`
    ParameterList => ParameterList
);
ast_node!(Parameter => Parameter);
ast_node!(
    /// `Name` or `Name<Arg, ...>`
    TypeRef => TypeRef
);
ast_node!(TypeArgList => TypeArgList);

impl CompilationUnit {
    pub fn classes(&self) -> impl Iterator<Item = ClassDecl> + use<> {
        children(&self.syntax)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDecl> + use<> {
        children(&self.syntax)
    }
}

impl ClassDecl {
    pub fn name(&self) -> Option<String> {
        self.syntax
            .child_token(SyntaxKind::Ident)
            .map(|t| t.text().to_string())
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDecl> + use<> {
        children(&self.syntax)
    }
}

impl MethodDecl {
    pub fn name(&self) -> Option<String> {
        self.syntax
            .child_token(SyntaxKind::Ident)
            .map(|t| t.text().to_string())
    }

    pub fn return_type(&self) -> Option<TypeRef> {
        child(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        child(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child(&self.syntax)
    }

    pub fn is_async(&self) -> bool {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == SyntaxKind::ModifierKw && t.text() == "async")
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + use<> {
        children(&self.syntax)
    }

    pub fn l_paren(&self) -> Option<SyntaxToken> {
        self.syntax.child_token(SyntaxKind::LParen)
    }

    pub fn r_paren(&self) -> Option<SyntaxToken> {
        self.syntax.child_token(SyntaxKind::RParen)
    }
}

impl Parameter {
    pub fn ty(&self) -> Option<TypeRef> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<String> {
        self.syntax
            .child_token(SyntaxKind::Ident)
            .map(|t| t.text().to_string())
    }
}

impl TypeRef {
    pub fn name(&self) -> Option<String> {
        self.syntax
            .child_token(SyntaxKind::Ident)
            .map(|t| t.text().to_string())
    }

    pub fn type_args(&self) -> impl Iterator<Item = TypeRef> + use<> {
        child::<TypeArgList>(&self.syntax)
            .into_iter()
            .flat_map(|list| children::<TypeRef>(&list.syntax).collect::<Vec<_>>())
    }
}

// ============================================================================
// Statements
// ============================================================================

ast_node!(
    /// `{ stmt* }`
    Block => Block
);
ast_node!(
    /// `if (condition) stmt else-clause?`
    IfStmt => IfStmt
);
ast_node!(
    /// `else stmt`; an `IfStmt` child makes it an `else if` continuation
    ElseClause => ElseClause
);
ast_node!(
    /// `switch (expr) { section* }`
    SwitchStmt => SwitchStmt
);
ast_node!(
    /// One or more labels followed by the statements they guard
    SwitchSection => SwitchSection
);
ast_node!(CaseLabel => CaseLabel);
ast_node!(PatternLabel => PatternLabel);
ast_node!(RangeLabel => RangeLabel);
ast_node!(DefaultLabel => DefaultLabel);
ast_node!(BreakStmt => BreakStmt);
ast_node!(ReturnStmt => ReturnStmt);
ast_node!(WhileStmt => WhileStmt);
ast_node!(ExprStmt => ExprStmt);
ast_node!(LocalDecl => LocalDecl);

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.syntax)
    }

    pub fn l_brace(&self) -> Option<SyntaxToken> {
        self.syntax.child_token(SyntaxKind::LBrace)
    }

    pub fn r_brace(&self) -> Option<SyntaxToken> {
        self.syntax.child_token(SyntaxKind::RBrace)
    }
}

impl IfStmt {
    pub fn condition(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    /// The statement taken when the condition holds
    pub fn then_branch(&self) -> Option<Stmt> {
        child(&self.syntax)
    }

    pub fn else_clause(&self) -> Option<ElseClause> {
        child(&self.syntax)
    }

    /// The conditional whose `else` branch is this one, if any
    pub fn previous_if(&self) -> Option<IfStmt> {
        let else_clause = ElseClause::cast(self.syntax.parent()?)?;
        IfStmt::cast(else_clause.syntax.parent()?)
    }

    /// The first conditional of the chain this one belongs to
    pub fn chain_head(&self) -> IfStmt {
        let mut head = self.clone();
        while let Some(previous) = head.previous_if() {
            head = previous;
        }
        head
    }
}

impl ElseClause {
    pub fn statement(&self) -> Option<Stmt> {
        child(&self.syntax)
    }

    pub fn else_kw(&self) -> Option<SyntaxToken> {
        self.syntax.child_token(SyntaxKind::ElseKw)
    }
}

impl SwitchStmt {
    /// The discriminant expression
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn sections(&self) -> impl Iterator<Item = SwitchSection> + use<> {
        children(&self.syntax)
    }
}

impl SwitchSection {
    pub fn labels(&self) -> impl Iterator<Item = SwitchLabel> + use<> {
        children(&self.syntax)
    }

    pub fn statements(&self) -> impl Iterator<Item = Stmt> + use<> {
        children(&self.syntax)
    }

    /// Whether one of the labels is `default:`
    pub fn is_default(&self) -> bool {
        self.labels()
            .any(|label| matches!(label, SwitchLabel::Default(_)))
    }
}

impl CaseLabel {
    pub fn value(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl ReturnStmt {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl WhileStmt {
    pub fn condition(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn body(&self) -> Option<Stmt> {
        child(&self.syntax)
    }
}

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl LocalDecl {
    /// Declared type, `None` for `var`
    pub fn ty(&self) -> Option<TypeRef> {
        child(&self.syntax)
    }

    pub fn name(&self) -> Option<String> {
        self.syntax
            .child_token(SyntaxKind::Ident)
            .map(|t| t.text().to_string())
    }

    pub fn initializer(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(NameExpr => NameExpr);
ast_node!(Literal => Literal);
ast_node!(ParenExpr => ParenExpr);
ast_node!(
    /// `lhs op rhs`, including assignment
    BinaryExpr => BinaryExpr
);
ast_node!(PrefixExpr => PrefixExpr);
ast_node!(
    /// `await expr`
    AwaitExpr => AwaitExpr
);
ast_node!(
    /// `receiver.Name`
    MemberAccessExpr => MemberAccessExpr
);
ast_node!(
    /// `callee(args)`
    InvocationExpr => InvocationExpr
);
ast_node!(ArgList => ArgList);
ast_node!(Argument => Argument);
ast_node!(ErrorNode => Error);

impl NameExpr {
    pub fn ident(&self) -> Option<SyntaxToken> {
        self.syntax.child_token(SyntaxKind::Ident)
    }

    pub fn text(&self) -> Option<String> {
        self.ident().map(|t| t.text().to_string())
    }
}

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl ParenExpr {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn rhs(&self) -> Option<Expr> {
        children(&self.syntax).nth(1)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind().binary_precedence().is_some() || t.kind() == SyntaxKind::Eq)
    }
}

impl PrefixExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn operand(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl AwaitExpr {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

impl MemberAccessExpr {
    pub fn receiver(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    /// The member-access operator token
    pub fn dot(&self) -> Option<SyntaxToken> {
        self.syntax.child_token(SyntaxKind::Dot)
    }

    pub fn name(&self) -> Option<String> {
        self.syntax
            .child_token(SyntaxKind::Ident)
            .map(|t| t.text().to_string())
    }
}

impl InvocationExpr {
    pub fn callee(&self) -> Option<Expr> {
        child(&self.syntax)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child(&self.syntax)
    }

    pub fn arguments(&self) -> Vec<Argument> {
        self.arg_list()
            .map(|list| children(&list.syntax).collect())
            .unwrap_or_default()
    }
}

impl Argument {
    pub fn expr(&self) -> Option<Expr> {
        child(&self.syntax)
    }
}

// ============================================================================
// Unions
// ============================================================================

/// Any statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    Block(Block),
    If(IfStmt),
    Switch(SwitchStmt),
    Break(BreakStmt),
    Return(ReturnStmt),
    While(WhileStmt),
    Expr(ExprStmt),
    Local(LocalDecl),
}

impl AstNode for Stmt {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_stmt()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let stmt = match node.kind() {
            SyntaxKind::Block => Stmt::Block(Block { syntax: node }),
            SyntaxKind::IfStmt => Stmt::If(IfStmt { syntax: node }),
            SyntaxKind::SwitchStmt => Stmt::Switch(SwitchStmt { syntax: node }),
            SyntaxKind::BreakStmt => Stmt::Break(BreakStmt { syntax: node }),
            SyntaxKind::ReturnStmt => Stmt::Return(ReturnStmt { syntax: node }),
            SyntaxKind::WhileStmt => Stmt::While(WhileStmt { syntax: node }),
            SyntaxKind::ExprStmt => Stmt::Expr(ExprStmt { syntax: node }),
            SyntaxKind::LocalDecl => Stmt::Local(LocalDecl { syntax: node }),
            _ => return None,
        };
        Some(stmt)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::Block(it) => &it.syntax,
            Stmt::If(it) => &it.syntax,
            Stmt::Switch(it) => &it.syntax,
            Stmt::Break(it) => &it.syntax,
            Stmt::Return(it) => &it.syntax,
            Stmt::While(it) => &it.syntax,
            Stmt::Expr(it) => &it.syntax,
            Stmt::Local(it) => &it.syntax,
        }
    }
}

/// Any expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Name(NameExpr),
    Literal(Literal),
    Paren(ParenExpr),
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Await(AwaitExpr),
    MemberAccess(MemberAccessExpr),
    Invocation(InvocationExpr),
}

impl AstNode for Expr {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_expr()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::NameExpr => Expr::Name(NameExpr { syntax: node }),
            SyntaxKind::Literal => Expr::Literal(Literal { syntax: node }),
            SyntaxKind::ParenExpr => Expr::Paren(ParenExpr { syntax: node }),
            SyntaxKind::BinaryExpr => Expr::Binary(BinaryExpr { syntax: node }),
            SyntaxKind::PrefixExpr => Expr::Prefix(PrefixExpr { syntax: node }),
            SyntaxKind::AwaitExpr => Expr::Await(AwaitExpr { syntax: node }),
            SyntaxKind::MemberAccessExpr => {
                Expr::MemberAccess(MemberAccessExpr { syntax: node })
            }
            SyntaxKind::InvocationExpr => Expr::Invocation(InvocationExpr { syntax: node }),
            _ => return None,
        };
        Some(expr)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Name(it) => &it.syntax,
            Expr::Literal(it) => &it.syntax,
            Expr::Paren(it) => &it.syntax,
            Expr::Binary(it) => &it.syntax,
            Expr::Prefix(it) => &it.syntax,
            Expr::Await(it) => &it.syntax,
            Expr::MemberAccess(it) => &it.syntax,
            Expr::Invocation(it) => &it.syntax,
        }
    }
}

impl Expr {
    /// Binding power of the expression's outermost operator
    ///
    /// Assignment is 0, binary operators use their token precedence, every
    /// other expression binds tighter than any binary operator.
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(binary) => binary
                .op()
                .and_then(|op| op.kind().binary_precedence())
                .unwrap_or(0),
            _ => u8::MAX,
        }
    }
}

/// Any switch label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SwitchLabel {
    Case(CaseLabel),
    Pattern(PatternLabel),
    Range(RangeLabel),
    Default(DefaultLabel),
}

impl AstNode for SwitchLabel {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_switch_label()
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        let label = match node.kind() {
            SyntaxKind::CaseLabel => SwitchLabel::Case(CaseLabel { syntax: node }),
            SyntaxKind::PatternLabel => SwitchLabel::Pattern(PatternLabel { syntax: node }),
            SyntaxKind::RangeLabel => SwitchLabel::Range(RangeLabel { syntax: node }),
            SyntaxKind::DefaultLabel => SwitchLabel::Default(DefaultLabel { syntax: node }),
            _ => return None,
        };
        Some(label)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            SwitchLabel::Case(it) => &it.syntax,
            SwitchLabel::Pattern(it) => &it.syntax,
            SwitchLabel::Range(it) => &it.syntax,
            SwitchLabel::Default(it) => &it.syntax,
        }
    }
}

/// Tagged union over every node kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnyNode {
    CompilationUnit(CompilationUnit),
    ClassDecl(ClassDecl),
    MethodDecl(MethodDecl),
    ParameterList(ParameterList),
    Parameter(Parameter),
    TypeRef(TypeRef),
    TypeArgList(TypeArgList),
    Stmt(Stmt),
    ElseClause(ElseClause),
    SwitchSection(SwitchSection),
    SwitchLabel(SwitchLabel),
    Expr(Expr),
    ArgList(ArgList),
    Argument(Argument),
    Error(ErrorNode),
}

impl AstNode for AnyNode {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_node() && kind != SyntaxKind::Unknown
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        use SyntaxKind as K;

        let any = match node.kind() {
            K::CompilationUnit => AnyNode::CompilationUnit(CompilationUnit { syntax: node }),
            K::ClassDecl => AnyNode::ClassDecl(ClassDecl { syntax: node }),
            K::MethodDecl => AnyNode::MethodDecl(MethodDecl { syntax: node }),
            K::ParameterList => AnyNode::ParameterList(ParameterList { syntax: node }),
            K::Parameter => AnyNode::Parameter(Parameter { syntax: node }),
            K::TypeRef => AnyNode::TypeRef(TypeRef { syntax: node }),
            K::TypeArgList => AnyNode::TypeArgList(TypeArgList { syntax: node }),
            K::ElseClause => AnyNode::ElseClause(ElseClause { syntax: node }),
            K::SwitchSection => AnyNode::SwitchSection(SwitchSection { syntax: node }),
            K::ArgList => AnyNode::ArgList(ArgList { syntax: node }),
            K::Argument => AnyNode::Argument(Argument { syntax: node }),
            K::Error => AnyNode::Error(ErrorNode { syntax: node }),
            kind if kind.is_stmt() => AnyNode::Stmt(Stmt::cast(node)?),
            kind if kind.is_expr() => AnyNode::Expr(Expr::cast(node)?),
            kind if kind.is_switch_label() => AnyNode::SwitchLabel(SwitchLabel::cast(node)?),
            _ => return None,
        };
        Some(any)
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            AnyNode::CompilationUnit(it) => &it.syntax,
            AnyNode::ClassDecl(it) => &it.syntax,
            AnyNode::MethodDecl(it) => &it.syntax,
            AnyNode::ParameterList(it) => &it.syntax,
            AnyNode::Parameter(it) => &it.syntax,
            AnyNode::TypeRef(it) => &it.syntax,
            AnyNode::TypeArgList(it) => &it.syntax,
            AnyNode::Stmt(it) => it.syntax(),
            AnyNode::ElseClause(it) => &it.syntax,
            AnyNode::SwitchSection(it) => &it.syntax,
            AnyNode::SwitchLabel(it) => it.syntax(),
            AnyNode::Expr(it) => it.syntax(),
            AnyNode::ArgList(it) => &it.syntax,
            AnyNode::Argument(it) => &it.syntax,
            AnyNode::Error(it) => &it.syntax,
        }
    }
}
