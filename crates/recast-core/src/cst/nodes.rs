//! Type aliases and navigation helpers for recast CST nodes

use rowan::{Direction, NodeOrToken, TextRange};

use super::{RecastLanguage, SyntaxKind};

/// A node in the red tree, created on demand from a [`rowan::GreenNode`]
pub type SyntaxNode = rowan::SyntaxNode<RecastLanguage>;

/// A token (keyword, identifier, punctuation or trivia) in the red tree
pub type SyntaxToken = rowan::SyntaxToken<RecastLanguage>;

/// Either a node or a token
pub type SyntaxElement = rowan::SyntaxElement<RecastLanguage>;

/// Iterator over child nodes
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<RecastLanguage>;

/// Extension methods for [`SyntaxNode`]
pub trait SyntaxNodeExt {
    /// First non-trivia token inside this node
    fn first_significant_token(&self) -> Option<SyntaxToken>;

    /// Last non-trivia token inside this node
    fn last_significant_token(&self) -> Option<SyntaxToken>;

    /// Range without leading and trailing trivia
    fn trimmed_range(&self) -> TextRange;

    /// Source text without leading and trailing trivia
    fn trimmed_text(&self) -> String;

    /// Direct child tokens of `kind`, trivia skipped
    fn child_token(&self, kind: SyntaxKind) -> Option<SyntaxToken>;

    /// Whether the trimmed text spans more than one line
    fn is_multiline(&self) -> bool;
}

impl SyntaxNodeExt for SyntaxNode {
    fn first_significant_token(&self) -> Option<SyntaxToken> {
        self.descendants_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|t| !t.kind().is_trivia())
    }

    fn last_significant_token(&self) -> Option<SyntaxToken> {
        let mut token = self.last_token()?;
        while token.kind().is_trivia() {
            token = token.prev_token()?;
            if !self.text_range().contains_range(token.text_range()) {
                return None;
            }
        }
        Some(token)
    }

    fn trimmed_range(&self) -> TextRange {
        match (self.first_significant_token(), self.last_significant_token()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.text_range().start(), last.text_range().end())
            }
            _ => TextRange::empty(self.text_range().start()),
        }
    }

    fn trimmed_text(&self) -> String {
        let range = self.trimmed_range() - self.text_range().start();
        self.text().to_string()[range].to_string()
    }

    fn child_token(&self, kind: SyntaxKind) -> Option<SyntaxToken> {
        self.children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|t| t.kind() == kind)
    }

    fn is_multiline(&self) -> bool {
        self.trimmed_text().contains('\n')
    }
}

/// Extension methods for [`SyntaxToken`]
pub trait SyntaxTokenExt {
    fn is_trivia(&self) -> bool;

    /// Closest non-trivia token after this one
    fn next_significant(&self) -> Option<SyntaxToken>;

    /// Closest non-trivia token before this one
    fn prev_significant(&self) -> Option<SyntaxToken>;

    /// Sibling tokens of the same parent following this one, in order
    fn following_siblings(&self) -> Vec<SyntaxToken>;
}

impl SyntaxTokenExt for SyntaxToken {
    fn is_trivia(&self) -> bool {
        self.kind().is_trivia()
    }

    fn next_significant(&self) -> Option<SyntaxToken> {
        let mut token = self.next_token()?;
        while token.kind().is_trivia() {
            token = token.next_token()?;
        }
        Some(token)
    }

    fn prev_significant(&self) -> Option<SyntaxToken> {
        let mut token = self.prev_token()?;
        while token.kind().is_trivia() {
            token = token.prev_token()?;
        }
        Some(token)
    }

    fn following_siblings(&self) -> Vec<SyntaxToken> {
        self.siblings_with_tokens(Direction::Next)
            .skip(1)
            .filter_map(NodeOrToken::into_token)
            .collect()
    }
}
