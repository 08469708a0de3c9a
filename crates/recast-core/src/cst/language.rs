//! Rowan language implementation
//!
//! Connects [`SyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::SyntaxKind;

/// Zero-sized marker tying [`SyntaxKind`] to Rowan's tree types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecastLanguage;

impl Language for RecastLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        use SyntaxKind::*;

        match raw.0 {
            // Trivia
            0 => Whitespace,
            1 => Newline,
            2 => CommentLine,
            3 => CommentBlock,

            // Keywords
            10 => IfKw,
            11 => ElseKw,
            12 => SwitchKw,
            13 => CaseKw,
            14 => DefaultKw,
            15 => BreakKw,
            16 => ReturnKw,
            17 => AwaitKw,
            18 => TrueKw,
            19 => FalseKw,
            20 => NullKw,
            21 => ClassKw,
            22 => VarKw,
            23 => WhileKw,
            24 => WhenKw,
            25 => ModifierKw,

            // Punctuation
            50 => LParen,
            51 => RParen,
            52 => LBrace,
            53 => RBrace,
            54 => Comma,
            55 => Semicolon,
            56 => Colon,
            57 => Dot,
            58 => DotDot,
            59 => Eq,
            60 => EqEq,
            61 => NotEq,
            62 => PipePipe,
            63 => AmpAmp,
            64 => Plus,
            65 => Minus,
            66 => Star,
            67 => Slash,
            68 => Lt,
            69 => Gt,
            70 => LtEq,
            71 => GtEq,
            72 => Bang,

            // Literals
            100 => Ident,
            101 => IntNumber,
            102 => String,

            // Declarations
            200 => CompilationUnit,
            201 => ClassDecl,
            202 => MethodDecl,
            203 => ParameterList,
            204 => Parameter,
            205 => TypeRef,
            206 => TypeArgList,

            // Statements
            220 => Block,
            221 => IfStmt,
            222 => ElseClause,
            223 => SwitchStmt,
            224 => SwitchSection,
            225 => CaseLabel,
            226 => PatternLabel,
            227 => RangeLabel,
            228 => DefaultLabel,
            229 => BreakStmt,
            230 => ReturnStmt,
            231 => WhileStmt,
            232 => ExprStmt,
            233 => LocalDecl,

            // Expressions
            250 => NameExpr,
            251 => Literal,
            252 => ParenExpr,
            253 => BinaryExpr,
            254 => PrefixExpr,
            255 => AwaitExpr,
            256 => MemberAccessExpr,
            257 => InvocationExpr,
            258 => ArgList,
            259 => Argument,

            400 => Error,
            _ => {
                tracing::warn!("Unknown syntax kind: {}", raw.0);
                Unknown
            }
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let kinds = [
            SyntaxKind::Whitespace,
            SyntaxKind::CommentBlock,
            SyntaxKind::ModifierKw,
            SyntaxKind::Bang,
            SyntaxKind::String,
            SyntaxKind::SwitchSection,
            SyntaxKind::Argument,
            SyntaxKind::Error,
        ];

        for &kind in &kinds {
            let raw = RecastLanguage::kind_to_raw(kind);
            let back = RecastLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "Roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_unknown_raw_kind() {
        assert_eq!(
            RecastLanguage::kind_from_raw(rowan::SyntaxKind(999)),
            SyntaxKind::Unknown
        );
    }
}
