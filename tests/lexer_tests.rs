use linescript::error::ErrorKind;
use linescript::lexer::tokenize;
use linescript::token::{Keyword, Operator, TokenKind};

fn kinds(line: &str) -> Vec<TokenKind> {
    tokenize(line).expect("line should tokenize").kinds()
}

fn var(name: &str) -> TokenKind {
    TokenKind::Variable(name.to_string())
}

fn func(name: &str) -> TokenKind {
    TokenKind::Function(name.to_string())
}

#[test]
fn binary_expression_without_spaces() {
    assert_eq!(
        kinds("a+b"),
        vec![var("a"), TokenKind::Operation(Operator::Plus), var("b")]
    );
}

#[test]
fn operator_after_operator_is_unary() {
    assert_eq!(
        kinds("a + -b"),
        vec![
            var("a"),
            TokenKind::Operation(Operator::Plus),
            TokenKind::UnaryOperation(Operator::Minus),
            var("b"),
        ]
    );
    assert_eq!(
        kinds("-5"),
        vec![TokenKind::UnaryOperation(Operator::Minus), TokenKind::Number(5)]
    );
}

#[test]
fn assignment_followed_by_negative_number() {
    assert_eq!(
        kinds("a=-1"),
        vec![
            var("a"),
            TokenKind::Operation(Operator::Assign),
            TokenKind::UnaryOperation(Operator::Minus),
            TokenKind::Number(1),
        ]
    );
}

#[test]
fn two_character_operators() {
    assert_eq!(
        kinds("x += 10"),
        vec![var("x"), TokenKind::Operation(Operator::AddAssign), TokenKind::Number(10)]
    );
    assert_eq!(
        kinds("a==b"),
        vec![var("a"), TokenKind::Operation(Operator::Equal), var("b")]
    );
    assert_eq!(
        kinds("a <= b"),
        vec![var("a"), TokenKind::Operation(Operator::LessEqual), var("b")]
    );
}

#[test]
fn equals_only_extends_a_single_character_operator() {
    assert_eq!(
        kinds("a===b"),
        vec![
            var("a"),
            TokenKind::Operation(Operator::Equal),
            TokenKind::UnaryOperation(Operator::Assign),
            var("b"),
        ]
    );
}

#[test]
fn name_followed_by_bracket_is_a_call() {
    assert_eq!(
        kinds("add(2,3)"),
        vec![
            func("add"),
            TokenKind::LeftBracket,
            TokenKind::Number(2),
            TokenKind::Operation(Operator::Comma),
            TokenKind::Number(3),
            TokenKind::RightBracket,
        ]
    );
    // A space in between makes it a variable.
    assert_eq!(kinds("add (1)")[0], var("add"));
}

#[test]
fn keywords_and_builtins() {
    assert_eq!(
        kinds("while(i<3)"),
        vec![
            TokenKind::Keyword(Keyword::While),
            TokenKind::LeftBracket,
            var("i"),
            TokenKind::Operation(Operator::Less),
            TokenKind::Number(3),
            TokenKind::RightBracket,
        ]
    );
    assert_eq!(kinds("print x"), vec![func("print"), var("x")]);
    assert_eq!(kinds("exit"), vec![func("exit")]);
    assert_eq!(
        kinds("func f(a)"),
        vec![
            TokenKind::Keyword(Keyword::Func),
            func("f"),
            TokenKind::LeftBracket,
            var("a"),
            TokenKind::RightBracket,
        ]
    );
    assert_eq!(kinds("end"), vec![TokenKind::Keyword(Keyword::End)]);
}

#[test]
fn comments_and_blank_lines() {
    assert!(kinds("").is_empty());
    assert!(kinds("   ").is_empty());
    assert!(kinds("# just a note").is_empty());
    assert_eq!(
        kinds("x = 1 # set x"),
        vec![var("x"), TokenKind::Operation(Operator::Assign), TokenKind::Number(1)]
    );
}

#[test]
fn spans_cover_each_lexeme() {
    let tokens = tokenize("ab + 12").expect("line should tokenize");
    let spans: Vec<(usize, usize)> = tokens
        .iter()
        .map(|token| (token.span.start, token.span.end))
        .collect();
    assert_eq!(spans, vec![(0, 2), (3, 4), (5, 7)]);
}

#[test]
fn trailing_operator_is_rejected() {
    let error = tokenize("1 +").unwrap_err();
    assert_eq!(error.kind, ErrorKind::LexError);
    assert!(error.message.contains("Expected operand after '+'"));
}

#[test]
fn letter_inside_number_is_rejected() {
    let error = tokenize("x = 3y").unwrap_err();
    assert_eq!(error.kind, ErrorKind::LexError);
    assert_eq!(error.span.start, 4);
}

#[test]
fn unknown_character_is_rejected() {
    let error = tokenize("a $ b").unwrap_err();
    assert_eq!(error.kind, ErrorKind::LexError);
    assert_eq!(error.message, "Unexpected character: '$'");
}

#[test]
fn number_out_of_range_is_rejected() {
    let error = tokenize("x = 99999999999999999999").unwrap_err();
    assert_eq!(error.kind, ErrorKind::LexError);
    assert!(error.message.contains("Invalid integer"));
}
