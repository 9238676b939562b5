use crate::error::Span;
use crate::token::{Keyword, Token, TokenKind};

/// One parsed statement or sub-expression.
///
/// Leaves have no children, unary operators, keywords and calls only use
/// `left`, binary operators use both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub root: Token,
    pub left: Option<Box<AstNode>>,
    pub right: Option<Box<AstNode>>,
}

impl AstNode {
    pub fn leaf(root: Token) -> Self {
        Self {
            root,
            left: None,
            right: None,
        }
    }

    pub fn unary(root: Token, operand: Option<AstNode>) -> Self {
        Self {
            root,
            left: operand.map(Box::new),
            right: None,
        }
    }

    pub fn binary(root: Token, left: Option<AstNode>, right: Option<AstNode>) -> Self {
        Self {
            root,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn keyword(&self) -> Option<Keyword> {
        self.root.keyword()
    }

    pub fn variable_name(&self) -> Option<&str> {
        match &self.root.kind {
            TokenKind::Variable(name) if self.is_leaf() => Some(name),
            _ => None,
        }
    }

    /// Span of the whole subtree.
    pub fn span(&self) -> Span {
        let mut span = self.root.span.clone();
        if let Some(left) = &self.left {
            span = span.to(&left.span());
        }
        if let Some(right) = &self.right {
            span = span.to(&right.span());
        }
        span
    }

    /// Flatten a comma chain into its operands in source order.
    pub fn comma_operands(&self) -> Vec<&AstNode> {
        let mut operands = Vec::new();
        self.collect_comma_operands(&mut operands);
        operands
    }

    fn collect_comma_operands<'a>(&'a self, operands: &mut Vec<&'a AstNode>) {
        if self.root.kind == TokenKind::Operation(crate::token::Operator::Comma) {
            if let Some(left) = &self.left {
                left.collect_comma_operands(operands);
            }
            if let Some(right) = &self.right {
                right.collect_comma_operands(operands);
            }
        } else {
            operands.push(self);
        }
    }
}
