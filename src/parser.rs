use crate::ast::AstNode;
use crate::error::{ScriptError, Span};
use crate::token::{Token, TokenKind, TokenSeq};

/// Builds the tree for one statement by splitting its token sequence at the
/// loosest top-level operator, recursively.
pub struct Parser {
    tokens: TokenSeq,
}

impl Parser {
    pub fn new(tokens: TokenSeq) -> Self {
        Self { tokens }
    }

    /// Consume the sequence and return the statement tree.
    pub fn parse(self) -> Result<AstNode, ScriptError> {
        let span = self.tokens.span().unwrap_or_else(|| Span::single(0));
        match build(self.tokens, &span)? {
            Some(tree) => Ok(tree),
            None => Err(ScriptError::parse_error_with_help(
                span,
                "Empty parentheses are not allowed".to_string(),
                "Put an expression between the brackets, e.g. '(1 + 2)'.".to_string(),
            )),
        }
    }
}

/// Parse a span. `Ok(None)` means the span was an empty bracket pair, which
/// becomes an absent child.
fn build(mut tokens: TokenSeq, context: &Span) -> Result<Option<AstNode>, ScriptError> {
    if tokens.is_empty() {
        return Err(ScriptError::parse_error(
            context.clone(),
            "Expected expression".to_string(),
        ));
    }

    // Peel off brackets that enclose the whole span.
    while let Some(head) = tokens.head() {
        if !head.is_left_bracket() {
            break;
        }
        let close = tokens
            .matching_bracket(0)
            .ok_or_else(|| unmatched_open(head))?;
        if close + 1 != tokens.len() {
            break;
        }
        tokens.strip_ends();
        if tokens.is_empty() {
            return Ok(None);
        }
    }

    if tokens.len() == 1 {
        return leaf(tokens).map(Some);
    }

    let head_is_command = match tokens.head() {
        Some(head) => head.keyword().is_some() || head.builtin().is_some(),
        None => false,
    };
    if head_is_command {
        return prefix(tokens).map(Some);
    }

    match loosest_operator(&tokens)? {
        Some(index) => {
            let (before, op, after) = tokens
                .split_around(index)
                .ok_or_else(|| ScriptError::parse_error(context.clone(), "Bad split".to_string()))?;
            let left = build(before, &op.span)?;
            let right = build(after, &op.span)?;
            Ok(Some(AstNode::binary(op, left, right)))
        }
        None => prefix(tokens).map(Some),
    }
}

fn leaf(tokens: TokenSeq) -> Result<AstNode, ScriptError> {
    let (token, _) = tokens
        .split_first()
        .ok_or_else(|| ScriptError::parse_error(Span::single(0), "Expected expression".to_string()))?;
    match &token.kind {
        TokenKind::Variable(_)
        | TokenKind::Number(_)
        | TokenKind::Function(_)
        | TokenKind::Keyword(_) => Ok(AstNode::leaf(token)),
        TokenKind::LeftBracket => Err(unmatched_open(&token)),
        TokenKind::RightBracket => Err(unmatched_close(&token)),
        TokenKind::Operation(op) | TokenKind::UnaryOperation(op) => {
            Err(ScriptError::parse_error_with_help(
                token.span.clone(),
                format!("Operator '{}' is missing its operand", op),
                "Operators need an expression on each side, e.g. 'a + b' or '-a'.".to_string(),
            ))
        }
    }
}

/// The head token becomes the root and the rest of the span its only child:
/// keywords, calls and unary operators.
fn prefix(tokens: TokenSeq) -> Result<AstNode, ScriptError> {
    let (head, rest) = tokens
        .split_first()
        .ok_or_else(|| ScriptError::parse_error(Span::single(0), "Expected expression".to_string()))?;

    match &head.kind {
        TokenKind::Keyword(_) | TokenKind::Function(_) | TokenKind::UnaryOperation(_) => {
            let operand = build(rest, &head.span)?;
            Ok(AstNode::unary(head, operand))
        }
        _ => {
            let unexpected = rest.head().cloned().unwrap_or_else(|| head.clone());
            Err(ScriptError::parse_error(
                unexpected.span.clone(),
                format!("Unexpected token '{}' after '{}'", unexpected, head),
            ))
        }
    }
}

/// Index of the top-level binary operator with the lowest precedence. Ties go
/// to the rightmost one so equal operators associate to the left.
fn loosest_operator(tokens: &TokenSeq) -> Result<Option<usize>, ScriptError> {
    let mut chosen: Option<(usize, u8)> = None;
    let mut index = 0;

    while let Some(token) = tokens.get(index) {
        match &token.kind {
            TokenKind::LeftBracket => {
                index = tokens
                    .matching_bracket(index)
                    .ok_or_else(|| unmatched_open(token))?;
            }
            TokenKind::RightBracket => return Err(unmatched_close(token)),
            TokenKind::Operation(op) => {
                let precedence = op.precedence();
                if chosen.map_or(true, |(_, lowest)| precedence <= lowest) {
                    chosen = Some((index, precedence));
                }
            }
            _ => {}
        }
        index += 1;
    }

    Ok(chosen.map(|(index, _)| index))
}

fn unmatched_open(token: &Token) -> ScriptError {
    ScriptError::parse_error_with_help(
        token.span.clone(),
        "Expected ')' after expression".to_string(),
        "Every '(' needs a matching ')' on the same line.".to_string(),
    )
}

fn unmatched_close(token: &Token) -> ScriptError {
    ScriptError::parse_error(
        token.span.clone(),
        "Unmatched ')'".to_string(),
    )
}

/// Convenience wrapper used by the engine and the tests.
pub fn parse(tokens: TokenSeq) -> Result<AstNode, ScriptError> {
    Parser::new(tokens).parse()
}
