//! Syntax kind enumeration for the recast CST
//!
//! Every node and token in the tree carries one of these kinds. Discriminants
//! are grouped in ranges so that the classification helpers stay cheap.

use std::fmt;

/// Syntax kind for language elements
///
/// - Trivia (0-9)
/// - Keywords (10-49)
/// - Punctuation and operators (50-99)
/// - Literals and identifiers (100-119)
/// - Structural nodes (200+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Spaces and tabs
    Whitespace = 0,
    /// `\n` or `\r\n`
    Newline = 1,
    /// `// ...`
    CommentLine = 2,
    /// `/* ... */`
    CommentBlock = 3,

    // ==================
    // Keywords (10-49)
    // ==================
    IfKw = 10,
    ElseKw = 11,
    SwitchKw = 12,
    CaseKw = 13,
    DefaultKw = 14,
    BreakKw = 15,
    ReturnKw = 16,
    AwaitKw = 17,
    TrueKw = 18,
    FalseKw = 19,
    NullKw = 20,
    ClassKw = 21,
    VarKw = 22,
    WhileKw = 23,
    WhenKw = 24,
    /// `public`, `private`, `static`, `async`, `ref`, `out`, ...
    ModifierKw = 25,

    // ==================
    // Punctuation (50-99)
    // ==================
    LParen = 50,
    RParen = 51,
    LBrace = 52,
    RBrace = 53,
    Comma = 54,
    Semicolon = 55,
    Colon = 56,
    Dot = 57,
    DotDot = 58,
    Eq = 59,
    EqEq = 60,
    NotEq = 61,
    PipePipe = 62,
    AmpAmp = 63,
    Plus = 64,
    Minus = 65,
    Star = 66,
    Slash = 67,
    Lt = 68,
    Gt = 69,
    LtEq = 70,
    GtEq = 71,
    Bang = 72,

    // ==================
    // Literals (100-119)
    // ==================
    Ident = 100,
    IntNumber = 101,
    String = 102,

    // ==================
    // Nodes (200+)
    // ==================
    CompilationUnit = 200,
    ClassDecl = 201,
    MethodDecl = 202,
    ParameterList = 203,
    Parameter = 204,
    TypeRef = 205,
    TypeArgList = 206,

    Block = 220,
    IfStmt = 221,
    ElseClause = 222,
    SwitchStmt = 223,
    SwitchSection = 224,
    CaseLabel = 225,
    PatternLabel = 226,
    RangeLabel = 227,
    DefaultLabel = 228,
    BreakStmt = 229,
    ReturnStmt = 230,
    WhileStmt = 231,
    ExprStmt = 232,
    LocalDecl = 233,

    NameExpr = 250,
    Literal = 251,
    ParenExpr = 252,
    BinaryExpr = 253,
    PrefixExpr = 254,
    AwaitExpr = 255,
    MemberAccessExpr = 256,
    InvocationExpr = 257,
    ArgList = 258,
    Argument = 259,

    /// Unrecognised input, kept verbatim
    Error = 400,
    /// Unknown raw kind
    Unknown = 401,
}

impl SyntaxKind {
    /// Check if this is a trivia kind (whitespace, comments, newlines)
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::CommentLine | Self::CommentBlock
        )
    }

    /// Whitespace or line break, i.e. trivia that carries no text worth keeping
    pub const fn is_layout(self) -> bool {
        matches!(self, Self::Whitespace | Self::Newline)
    }

    pub const fn is_comment(self) -> bool {
        matches!(self, Self::CommentLine | Self::CommentBlock)
    }

    pub const fn is_keyword(self) -> bool {
        (self as u16) >= 10 && (self as u16) < 50
    }

    pub const fn is_punct(self) -> bool {
        (self as u16) >= 50 && (self as u16) < 100
    }

    pub const fn is_literal(self) -> bool {
        (self as u16) >= 100 && (self as u16) < 120
    }

    /// Check if this is a node kind (vs token kind)
    pub const fn is_node(self) -> bool {
        (self as u16) >= 200
    }

    pub const fn is_stmt(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::IfStmt
                | Self::SwitchStmt
                | Self::BreakStmt
                | Self::ReturnStmt
                | Self::WhileStmt
                | Self::ExprStmt
                | Self::LocalDecl
        )
    }

    pub const fn is_expr(self) -> bool {
        matches!(
            self,
            Self::NameExpr
                | Self::Literal
                | Self::ParenExpr
                | Self::BinaryExpr
                | Self::PrefixExpr
                | Self::AwaitExpr
                | Self::MemberAccessExpr
                | Self::InvocationExpr
        )
    }

    pub const fn is_switch_label(self) -> bool {
        matches!(
            self,
            Self::CaseLabel | Self::PatternLabel | Self::RangeLabel | Self::DefaultLabel
        )
    }

    /// Map an identifier-like word to its keyword kind
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "if" => Self::IfKw,
            "else" => Self::ElseKw,
            "switch" => Self::SwitchKw,
            "case" => Self::CaseKw,
            "default" => Self::DefaultKw,
            "break" => Self::BreakKw,
            "return" => Self::ReturnKw,
            "await" => Self::AwaitKw,
            "true" => Self::TrueKw,
            "false" => Self::FalseKw,
            "null" => Self::NullKw,
            "class" => Self::ClassKw,
            "var" => Self::VarKw,
            "while" => Self::WhileKw,
            "when" => Self::WhenKw,
            "public" | "private" | "protected" | "internal" | "static" | "async" | "readonly"
            | "ref" | "out" | "in" | "params" => Self::ModifierKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical source text for fixed-text tokens
    pub const fn fixed_text(self) -> Option<&'static str> {
        let text = match self {
            Self::IfKw => "if",
            Self::ElseKw => "else",
            Self::SwitchKw => "switch",
            Self::CaseKw => "case",
            Self::DefaultKw => "default",
            Self::BreakKw => "break",
            Self::ReturnKw => "return",
            Self::AwaitKw => "await",
            Self::TrueKw => "true",
            Self::FalseKw => "false",
            Self::NullKw => "null",
            Self::ClassKw => "class",
            Self::VarKw => "var",
            Self::WhileKw => "while",
            Self::WhenKw => "when",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::Eq => "=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::PipePipe => "||",
            Self::AmpAmp => "&&",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Bang => "!",
            _ => return None,
        };
        Some(text)
    }

    /// Binding power of a binary operator token, higher binds tighter
    pub const fn binary_precedence(self) -> Option<u8> {
        let prec = match self {
            Self::PipePipe => 1,
            Self::AmpAmp => 2,
            Self::EqEq | Self::NotEq => 3,
            Self::Lt | Self::Gt | Self::LtEq | Self::GtEq => 4,
            Self::Plus | Self::Minus => 5,
            Self::Star | Self::Slash => 6,
            _ => return None,
        };
        Some(prec)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(SyntaxKind::Whitespace.is_trivia());
        assert!(SyntaxKind::Newline.is_layout());
        assert!(SyntaxKind::CommentBlock.is_comment());
        assert!(!SyntaxKind::CommentLine.is_layout());
        assert!(!SyntaxKind::Ident.is_trivia());
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(SyntaxKind::from_keyword("switch"), Some(SyntaxKind::SwitchKw));
        assert_eq!(SyntaxKind::from_keyword("async"), Some(SyntaxKind::ModifierKw));
        assert_eq!(SyntaxKind::from_keyword("ConfigureAwait"), None);
        assert!(SyntaxKind::SwitchKw.is_keyword());
    }

    #[test]
    fn test_node_ranges() {
        assert!(SyntaxKind::IfStmt.is_node());
        assert!(SyntaxKind::IfStmt.is_stmt());
        assert!(SyntaxKind::AwaitExpr.is_expr());
        assert!(!SyntaxKind::LParen.is_node());
        assert!(SyntaxKind::RangeLabel.is_switch_label());
    }

    #[test]
    fn test_precedence_ordering() {
        let or = SyntaxKind::PipePipe.binary_precedence().unwrap();
        let eq = SyntaxKind::EqEq.binary_precedence().unwrap();
        let add = SyntaxKind::Plus.binary_precedence().unwrap();
        assert!(or < eq && eq < add);
        assert_eq!(SyntaxKind::Dot.binary_precedence(), None);
    }
}
