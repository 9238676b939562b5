use crate::error::Span;
use std::fmt;

/// Binary and unary operator lexemes. Which arity is meant is decided by the
/// token kind the lexer assigns, not by the operator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Comma,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
}

impl Operator {
    pub fn from_lexeme(lexeme: &str) -> Option<Operator> {
        let op = match lexeme {
            "," => Operator::Comma,
            "=" => Operator::Assign,
            "+=" => Operator::AddAssign,
            "-=" => Operator::SubAssign,
            "*=" => Operator::MulAssign,
            "/=" => Operator::DivAssign,
            "%=" => Operator::ModAssign,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<" => Operator::Less,
            ">" => Operator::Greater,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "+" => Operator::Plus,
            "-" => Operator::Minus,
            "*" => Operator::Star,
            "/" => Operator::Slash,
            "%" => Operator::Percent,
            "!" => Operator::Bang,
            _ => return None,
        };
        Some(op)
    }

    pub fn lexeme(self) -> &'static str {
        match self {
            Operator::Comma => ",",
            Operator::Assign => "=",
            Operator::AddAssign => "+=",
            Operator::SubAssign => "-=",
            Operator::MulAssign => "*=",
            Operator::DivAssign => "/=",
            Operator::ModAssign => "%=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::Bang => "!",
        }
    }

    /// Binding strength used by the AST builder; the lowest splits first.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Comma => 0,
            Operator::Assign
            | Operator::AddAssign
            | Operator::SubAssign
            | Operator::MulAssign
            | Operator::DivAssign
            | Operator::ModAssign => 1,
            Operator::Equal | Operator::NotEqual => 2,
            Operator::Less | Operator::Greater | Operator::LessEqual | Operator::GreaterEqual => 3,
            Operator::Plus | Operator::Minus => 4,
            Operator::Star | Operator::Slash | Operator::Percent => 5,
            // Never a valid binary operator; binds tightest so it never hides a real split.
            Operator::Bang => 6,
        }
    }

    pub fn is_assignment(self) -> bool {
        self.precedence() == 1
    }

    /// Operators that may take a trailing `=` to form a two-character operator.
    pub fn accepts_equals(c: char) -> bool {
        matches!(c, '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!')
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.lexeme())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Func,
    End,
    Return,
    If,
    Else,
    While,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        let keyword = match word {
            "func" => Keyword::Func,
            "end" => Keyword::End,
            "return" => Keyword::Return,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Func => "func",
            Keyword::End => "end",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Exit,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "print" => Some(Builtin::Print),
            "exit" => Some(Builtin::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Variable(String),
    Number(i64),
    Operation(Operator),
    UnaryOperation(Operator),
    LeftBracket,
    RightBracket,
    Function(String),
    Keyword(Keyword),
}

impl TokenKind {
    /// Kinds after which an operator is binary rather than unary.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Variable(_) | TokenKind::Number(_) | TokenKind::RightBracket
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Variable(_) => "variable",
            TokenKind::Number(_) => "number",
            TokenKind::Operation(_) => "operator",
            TokenKind::UnaryOperation(_) => "unary operator",
            TokenKind::LeftBracket => "'('",
            TokenKind::RightBracket => "')'",
            TokenKind::Function(_) => "function",
            TokenKind::Keyword(_) => "keyword",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_left_bracket(&self) -> bool {
        self.kind == TokenKind::LeftBracket
    }

    pub fn is_right_bracket(&self) -> bool {
        self.kind == TokenKind::RightBracket
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn builtin(&self) -> Option<Builtin> {
        match &self.kind {
            TokenKind::Function(name) => Builtin::from_name(name),
            _ => None,
        }
    }

    pub fn binary_operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operation(op) => Some(op),
            _ => None,
        }
    }
}

/// Printable value of the token, as quoted in diagnostics.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            TokenKind::Variable(name) | TokenKind::Function(name) => write!(f, "{}", name),
            TokenKind::Number(value) => write!(f, "{}", value),
            TokenKind::Operation(op) | TokenKind::UnaryOperation(op) => write!(f, "{}", op),
            TokenKind::LeftBracket => write!(f, "("),
            TokenKind::RightBracket => write!(f, ")"),
            TokenKind::Keyword(keyword) => write!(f, "{}", keyword),
        }
    }
}

/// An ordered token sequence with a single head and a single tail.
///
/// Positions play the role of links: the predecessor of `i` is `i - 1` and
/// its successor is `i + 1`. Splitting moves tokens out by value, so every
/// token ends up owned by exactly one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSeq {
    tokens: Vec<Token>,
}

impl TokenSeq {
    pub fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn head(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn tail(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn prev(&self, index: usize) -> Option<&Token> {
        index.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    pub fn next(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index + 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|token| token.kind.clone()).collect()
    }

    /// Index of the `)` closing the `(` at `open`, counting nested pairs.
    pub fn matching_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LeftBracket => depth += 1,
                TokenKind::RightBracket => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Remove the head and tail tokens, returning them.
    pub fn strip_ends(&mut self) -> Option<(Token, Token)> {
        if self.tokens.len() < 2 {
            return None;
        }
        let last = self.tokens.pop()?;
        let first = self.tokens.remove(0);
        Some((first, last))
    }

    /// Detach the head token; the remainder keeps its order.
    pub fn split_first(mut self) -> Option<(Token, TokenSeq)> {
        if self.tokens.is_empty() {
            return None;
        }
        let first = self.tokens.remove(0);
        Some((first, self))
    }

    /// Cut the sequence around `index`: everything before it, the token itself,
    /// and everything after it.
    pub fn split_around(mut self, index: usize) -> Option<(TokenSeq, Token, TokenSeq)> {
        if index >= self.tokens.len() {
            return None;
        }
        let mut after = self.tokens.split_off(index);
        let pivot = after.remove(0);
        Some((self, pivot, TokenSeq { tokens: after }))
    }

    /// Span covering every token of the sequence.
    pub fn span(&self) -> Option<Span> {
        let first = self.tokens.first()?;
        let last = self.tokens.last()?;
        Some(first.span.to(&last.span))
    }
}

impl From<Vec<Token>> for TokenSeq {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl IntoIterator for TokenSeq {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenSeq {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
