use crate::error::{ScriptError, Span};
use crate::token::{Builtin, Keyword, Operator, Token, TokenKind, TokenSeq};
use log::trace;

/// Lexer states. Each one except `Init`, `End` and `Error` has a token in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Symbol,
    Number,
    Operation,
    Bracket,
    End,
    Error,
}

/// Character classes the transition tables are indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Letter,
    Digit,
    Operator,
    Bracket,
    Space,
    Eol,
    Other,
}

/// What to do with the buffer and the incoming character on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Reject,
    Skip,
    Add,
    EmitSymbol,
    EmitNumber,
    EmitOperation,
    EmitBracket,
}

const STATE_COUNT: usize = 7;
const INPUT_COUNT: usize = 7;

const TRANSITIONS: [[State; INPUT_COUNT]; STATE_COUNT] = {
    use State::*;
    [
        //  letter  digit   op         bracket  space  eol  other
        [Symbol, Number, Operation, Bracket, Init, End, Error], // init
        [Symbol, Symbol, Operation, Bracket, Init, End, Error], // symbol
        [Error, Number, Operation, Bracket, Init, End, Error],  // number
        [Symbol, Number, Operation, Bracket, Init, Error, Error], // operation
        [Symbol, Number, Operation, Bracket, Init, End, Error], // bracket
        [End, End, End, End, End, End, End],                    // end
        [Error, Error, Error, Error, Error, Error, Error],       // error
    ]
};

const ACTIONS: [[Action; INPUT_COUNT]; STATE_COUNT] = {
    use Action::*;
    const S: Action = EmitSymbol;
    const N: Action = EmitNumber;
    const O: Action = EmitOperation;
    const B: Action = EmitBracket;
    [
        //  letter digit op  bracket space eol   other
        [Add, Add, Add, Add, Skip, Skip, Reject], // init
        [Add, Add, S, S, S, S, Reject],           // symbol
        [Reject, Add, N, N, N, N, Reject],        // number
        [O, O, O, O, O, Reject, Reject],          // operation
        [B, B, B, B, B, B, Reject],               // bracket
        [Skip, Skip, Skip, Skip, Skip, Skip, Skip], // end
        [Skip, Skip, Skip, Skip, Skip, Skip, Skip], // error
    ]
};

/// Marks the end of the line; `#` is classified the same way.
const EOL: char = '\0';

fn classify(c: char) -> Input {
    match c {
        'a'..='z' | 'A'..='Z' | '_' => Input::Letter,
        '0'..='9' => Input::Digit,
        '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | ',' => Input::Operator,
        '(' | ')' => Input::Bracket,
        ' ' | '\t' => Input::Space,
        EOL | '#' => Input::Eol,
        _ => Input::Other,
    }
}

/// Character-at-a-time tokenizer for one source line.
pub struct Lexer {
    source: String,
    buffer: String,
    buffer_start: usize,
    tokens: TokenSeq,
    state: State,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        Self {
            source,
            buffer: String::new(),
            buffer_start: 0,
            tokens: TokenSeq::new(),
            state: State::Init,
        }
    }

    /// Run the whole line through the state machine. An empty or comment-only
    /// line yields an empty sequence.
    pub fn tokenize(mut self) -> Result<TokenSeq, ScriptError> {
        let source = std::mem::take(&mut self.source);
        let mut length = 0;
        for (pos, c) in source.chars().enumerate() {
            self.input(pos, c)?;
            length = pos + 1;
        }
        self.input(length, EOL)?;

        trace!("tokenize {:?} -> {} tokens", source, self.tokens.len());
        Ok(self.tokens)
    }

    fn input(&mut self, pos: usize, c: char) -> Result<(), ScriptError> {
        let input = classify(c);
        let next = TRANSITIONS[self.state as usize][input as usize];
        let action = ACTIONS[self.state as usize][input as usize];

        if next == State::Error {
            return Err(self.reject(pos, c));
        }

        match action {
            Action::Reject => return Err(self.reject(pos, c)),
            Action::Skip => {}
            Action::Add => self.add(pos, c),
            Action::EmitSymbol => {
                self.emit_symbol(c);
                self.add(pos, c);
            }
            Action::EmitNumber => {
                self.emit_number()?;
                self.add(pos, c);
            }
            Action::EmitOperation => {
                if c == '=' && self.extends_operator() {
                    self.buffer.push(c);
                    return Ok(());
                }
                self.emit_operation()?;
                self.add(pos, c);
            }
            Action::EmitBracket => {
                self.emit_bracket();
                self.add(pos, c);
            }
        }

        self.state = next;
        if matches!(self.state, State::Init | State::End) {
            self.buffer.clear();
        }
        Ok(())
    }

    fn reject(&self, pos: usize, c: char) -> ScriptError {
        match (self.state, classify(c)) {
            (State::Number, Input::Letter) => ScriptError::lex_error(
                Span::new(self.buffer_start, pos + 1),
                format!("Unexpected character '{}' in number '{}'", c, self.buffer),
            ),
            (State::Operation, Input::Eol) => ScriptError::lex_error(
                Span::new(self.buffer_start, pos),
                format!("Expected operand after '{}'", self.buffer),
            ),
            _ => ScriptError::lex_error(
                Span::single(pos),
                format!("Unexpected character: '{}'", c),
            ),
        }
    }

    fn add(&mut self, pos: usize, c: char) {
        if self.buffer.is_empty() {
            self.buffer_start = pos;
        }
        self.buffer.push(c);
    }

    fn extends_operator(&self) -> bool {
        let mut chars = self.buffer.chars();
        matches!((chars.next(), chars.next()), (Some(first), None) if Operator::accepts_equals(first))
    }

    fn buffer_span(&self) -> Span {
        Span::new(
            self.buffer_start,
            self.buffer_start + self.buffer.chars().count(),
        )
    }

    /// `next` is the character that ended the word; a user name directly
    /// followed by `(` is a call.
    fn emit_symbol(&mut self, next: char) {
        let word = self.buffer.as_str();
        let kind = if Builtin::from_name(word).is_some() {
            TokenKind::Function(word.to_string())
        } else if let Some(keyword) = Keyword::from_word(word) {
            TokenKind::Keyword(keyword)
        } else if next == '(' {
            TokenKind::Function(word.to_string())
        } else {
            TokenKind::Variable(word.to_string())
        };
        self.push_token(kind);
    }

    fn emit_number(&mut self) -> Result<(), ScriptError> {
        let value = self.buffer.parse::<i64>().map_err(|_| {
            ScriptError::lex_error(
                self.buffer_span(),
                format!("Invalid integer: {}", self.buffer),
            )
        })?;
        self.push_token(TokenKind::Number(value));
        Ok(())
    }

    /// An operator is unary unless it follows something that ends an operand.
    fn emit_operation(&mut self) -> Result<(), ScriptError> {
        let op = Operator::from_lexeme(&self.buffer).ok_or_else(|| {
            ScriptError::lex_error(
                self.buffer_span(),
                format!("Unknown operator: '{}'", self.buffer),
            )
        })?;
        let binary = self
            .tokens
            .tail()
            .map_or(false, |last| last.kind.ends_operand());
        let kind = if binary {
            TokenKind::Operation(op)
        } else {
            TokenKind::UnaryOperation(op)
        };
        self.push_token(kind);
        Ok(())
    }

    fn emit_bracket(&mut self) {
        let kind = if self.buffer.starts_with('(') {
            TokenKind::LeftBracket
        } else {
            TokenKind::RightBracket
        };
        self.push_token(kind);
    }

    fn push_token(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.buffer_span());
        self.tokens.push(token);
        self.buffer.clear();
    }
}

/// Tokenize a single line.
pub fn tokenize(line: &str) -> Result<TokenSeq, ScriptError> {
    Lexer::new(line.to_string()).tokenize()
}
