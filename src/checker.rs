//! Fail-fast syntax validation of a token sequence, run ahead of the AST builder.
//!
//! Every token is checked by the validator for its kind, which mostly looks at
//! the kind of the token that follows it.

use crate::error::{ScriptError, Span};
use crate::token::{Builtin, Keyword, Operator, TokenKind, TokenSeq};

/// Token kinds without payload, used for the allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Variable,
    Number,
    Operation,
    UnaryOperation,
    LeftBracket,
    RightBracket,
    Function,
    Keyword,
}

impl Class {
    fn of(kind: &TokenKind) -> Class {
        match kind {
            TokenKind::Variable(_) => Class::Variable,
            TokenKind::Number(_) => Class::Number,
            TokenKind::Operation(_) => Class::Operation,
            TokenKind::UnaryOperation(_) => Class::UnaryOperation,
            TokenKind::LeftBracket => Class::LeftBracket,
            TokenKind::RightBracket => Class::RightBracket,
            TokenKind::Function(_) => Class::Function,
            TokenKind::Keyword(_) => Class::Keyword,
        }
    }
}

/// Tokens that may start an operand.
const OPERAND_START: &[Class] = &[
    Class::Variable,
    Class::Number,
    Class::UnaryOperation,
    Class::LeftBracket,
    Class::Function,
];

const AFTER_OPERAND: &[Class] = &[Class::Operation, Class::RightBracket];

type Validator = fn(&TokenSeq, usize) -> Result<(), ScriptError>;

/// Validators indexed by `Class as usize`.
const VALIDATORS: [Validator; 8] = [
    check_operand,
    check_operand,
    check_operation,
    check_unary_operation,
    check_left_bracket,
    check_right_bracket,
    check_function,
    check_keyword,
];

/// Validate the whole sequence, stopping at the first offending token.
pub fn check(tokens: &TokenSeq) -> Result<(), ScriptError> {
    for (index, token) in tokens.iter().enumerate() {
        let validator = VALIDATORS[Class::of(&token.kind) as usize];
        validator(tokens, index)?;
    }
    Ok(())
}

fn token_span(tokens: &TokenSeq, index: usize) -> Span {
    tokens
        .get(index)
        .map(|token| token.span.clone())
        .unwrap_or_else(|| Span::single(0))
}

/// The next token, if any, must be one of `allowed`.
fn expect_next(tokens: &TokenSeq, index: usize, allowed: &[Class]) -> Result<(), ScriptError> {
    match tokens.next(index) {
        Some(next) if !allowed.contains(&Class::of(&next.kind)) => Err(ScriptError::syntax_error(
            next.span.clone(),
            format!("\"{}\" is unexpected token", next),
        )),
        _ => Ok(()),
    }
}

fn require_next(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    if tokens.next(index).is_some() {
        return Ok(());
    }
    let current = token_span(tokens, index);
    let token = tokens.get(index).map(|t| t.to_string()).unwrap_or_default();
    Err(ScriptError::syntax_error(
        Span::single(current.end),
        format!("any token missing after \"{}\"", token),
    ))
}

fn require_last(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    match tokens.next(index) {
        None => Ok(()),
        Some(next) => {
            let token = tokens.get(index).map(|t| t.to_string()).unwrap_or_default();
            Err(ScriptError::syntax_error(
                next.span.clone(),
                format!("any token can't exist after \"{}\"", token),
            ))
        }
    }
}

/// The line must end with `)`.
fn require_closing_tail(tokens: &TokenSeq) -> Result<(), ScriptError> {
    match tokens.tail() {
        Some(last) if last.is_right_bracket() => Ok(()),
        Some(last) => Err(ScriptError::syntax_error(
            last.span.clone(),
            "In this line, any token can't exist after \")\"".to_string(),
        )),
        None => Ok(()),
    }
}

fn check_operand(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    expect_next(tokens, index, AFTER_OPERAND)
}

fn check_operation(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    require_next(tokens, index)?;
    expect_next(tokens, index, OPERAND_START)
}

fn check_unary_operation(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    require_next(tokens, index)?;
    expect_next(
        tokens,
        index,
        &[
            Class::Variable,
            Class::Number,
            Class::LeftBracket,
            Class::Function,
        ],
    )
}

fn check_left_bracket(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    require_next(tokens, index)?;
    expect_next(
        tokens,
        index,
        &[
            Class::Variable,
            Class::Number,
            Class::UnaryOperation,
            Class::LeftBracket,
            Class::RightBracket,
            Class::Function,
            Class::Keyword,
        ],
    )?;

    if tokens.matching_bracket(index).is_none() {
        return Err(ScriptError::syntax_error(
            token_span(tokens, index),
            "missing \")\" corresponding to \"(\"".to_string(),
        ));
    }
    Ok(())
}

fn check_right_bracket(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    expect_next(tokens, index, AFTER_OPERAND)
}

fn check_function(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    let builtin = tokens.get(index).and_then(|token| token.builtin());

    match builtin {
        Some(Builtin::Exit) => return expect_next(tokens, index, &[Class::LeftBracket]),
        Some(Builtin::Print) => {
            require_next(tokens, index)?;
            return expect_next(tokens, index, OPERAND_START);
        }
        None => {}
    }

    require_next(tokens, index)?;
    expect_next(tokens, index, &[Class::LeftBracket])?;

    let after_func = tokens
        .prev(index)
        .map_or(false, |prev| prev.keyword() == Some(Keyword::Func));
    if after_func {
        check_parameter_list(tokens, index)?;
    }
    Ok(())
}

/// `func name(a, b)`: only names and commas inside the brackets, nothing after.
fn check_parameter_list(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    require_closing_tail(tokens)?;

    let last = tokens.len() - 1;
    for position in (index + 2)..last {
        let Some(token) = tokens.get(position) else {
            break;
        };
        let allowed = matches!(token.kind, TokenKind::Variable(_))
            || token.kind == TokenKind::Operation(Operator::Comma);
        if !allowed {
            return Err(ScriptError::syntax_error(
                token.span.clone(),
                format!("\"{}\" is unexpected token", token),
            ));
        }
    }
    Ok(())
}

fn check_keyword(tokens: &TokenSeq, index: usize) -> Result<(), ScriptError> {
    let Some(keyword) = tokens.get(index).and_then(|token| token.keyword()) else {
        return Ok(());
    };

    match keyword {
        Keyword::Func => {
            require_next(tokens, index)?;
            expect_next(tokens, index, &[Class::Function])
        }
        Keyword::End | Keyword::Else => require_last(tokens, index),
        Keyword::Return => expect_next(tokens, index, OPERAND_START),
        Keyword::If | Keyword::While => {
            require_next(tokens, index)?;
            expect_next(tokens, index, &[Class::LeftBracket])?;
            require_closing_tail(tokens)
        }
    }
}
