// linescript: a line-at-a-time interpreter for a small imperative language.
//
// Each submitted line is stored, lexed, checked and parsed on its own; the
// engine keeps enough state between lines to run multi-line blocks.

pub mod ast;
pub mod checker;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod function;
pub mod lexer;
pub mod parser;
pub mod program;
pub mod repl;
pub mod runner;
pub mod scope;
pub mod token;

pub use ast::AstNode;
pub use config::EngineConfig;
pub use control::State;
pub use engine::{Engine, Flow};
pub use error::{Diagnostic, ErrorKind, ScriptError, Span};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, Parser};
pub use token::{Token, TokenKind, TokenSeq};

pub use repl::start as start_repl;
pub use runner::run;
