use crate::ast::AstNode;
use crate::checker;
use crate::config::EngineConfig;
use crate::control::{BlockFrame, BlockKind, ControlStack, State};
use crate::error::{Diagnostic, ErrorKind, ScriptError, Span};
use crate::function::{Function, FunctionTable};
use crate::lexer;
use crate::parser;
use crate::program::ProgramStore;
use crate::scope::ScopeStack;
use crate::token::{Builtin, Keyword, Operator, TokenKind};
use log::debug;
use std::io::{self, Stdout, Write};

/// What the caller should do after a line was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Why evaluation of a statement stopped early.
enum Fault {
    /// Raised by the statement being evaluated; not yet tied to a line.
    Statement(ScriptError),
    /// Raised by a line run on behalf of a call, already tied to that line.
    Located(Diagnostic),
    /// `exit` was executed.
    Halt,
}

impl From<ScriptError> for Fault {
    fn from(error: ScriptError) -> Self {
        Fault::Statement(error)
    }
}

type Exec<T> = Result<T, Fault>;

/// Incremental interpreter: every submitted line is stored, then the engine
/// fetches and executes stored lines until it catches up with the tail.
///
/// Everything needed to resume between two submits lives in the engine
/// itself: the automaton state, the control stack and the program cursor.
pub struct Engine<W: Write = Stdout> {
    config: EngineConfig,
    program: ProgramStore,
    functions: FunctionTable,
    scopes: ScopeStack,
    control: ControlStack,
    state: State,
    return_value: Option<i64>,
    diagnostics: Vec<Diagnostic>,
    steps: u64,
    output: W,
}

impl Engine<Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Engine<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Engine<W> {
    /// Engine whose `print` output goes to `output`.
    pub fn with_output(output: W) -> Self {
        Self::with_config(EngineConfig::default(), output)
    }

    pub fn with_config(config: EngineConfig, output: W) -> Self {
        Self {
            config,
            program: ProgramStore::new(),
            functions: FunctionTable::new(),
            scopes: ScopeStack::new(),
            control: ControlStack::new(),
            state: State::Run,
            return_value: None,
            diagnostics: Vec::new(),
            steps: 0,
            output,
        }
    }

    /// Append `line` to the program and run everything that became runnable.
    ///
    /// Recoverable errors are collected for [`Engine::take_diagnostics`]. A
    /// fatal error is returned and leaves the engine in the End state.
    pub fn submit(&mut self, line: &str) -> Result<Flow, Diagnostic> {
        if self.state == State::End {
            return Ok(Flow::Exit);
        }

        self.program.store(line);
        self.steps = 0;

        if let Err(diagnostic) = self.run_pending() {
            if diagnostic.kind() == ErrorKind::Interrupted {
                self.interrupt();
                self.diagnostics.push(diagnostic);
            } else {
                self.set_state(State::End);
                return Err(diagnostic);
            }
        }

        if self.state == State::End {
            Ok(Flow::Exit)
        } else {
            Ok(Flow::Continue)
        }
    }

    /// True while a `func`, `if` or `while` block is still waiting for its `end`.
    pub fn is_awaiting_block_close(&self) -> bool {
        matches!(
            self.state,
            State::DefiningFunction | State::DefiningCondition | State::Skip
        )
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Value of `name` in the innermost scope, without creating it.
    pub fn variable(&self, name: &str) -> Option<i64> {
        self.scopes.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn program(&self) -> &ProgramStore {
        &self.program
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn set_state(&mut self, state: State) {
        if self.state != state {
            debug!("state {} -> {}", self.state, state);
            self.state = state;
        }
    }

    /// Drop everything the interrupted submit left open.
    fn interrupt(&mut self) {
        debug!("interrupted at [{}]", self.program.address());
        self.control.clear();
        self.scopes.truncate(0);
        self.return_value = None;
        self.program.jump(self.program.last_address());
        self.set_state(State::Run);
    }

    fn run_pending(&mut self) -> Result<(), Diagnostic> {
        while self.state != State::End {
            let Some((address, line)) = self.program.fetch() else {
                break;
            };
            self.execute_line(address, &line)?;
        }
        Ok(())
    }

    /// Handle one fetched line in the current state. Only fatal and
    /// interrupting errors escape; the rest become diagnostics.
    fn execute_line(&mut self, address: usize, line: &str) -> Result<(), Diagnostic> {
        let result = match self.count_step() {
            Ok(()) => match self.state {
                State::Run => self.run_line(address, line),
                State::End => Ok(()),
                _ => self.track_line(line),
            },
            Err(fault) => Err(fault),
        };

        match result {
            Ok(()) | Err(Fault::Halt) => Ok(()),
            Err(Fault::Located(diagnostic)) => Err(diagnostic),
            Err(Fault::Statement(error)) => {
                let diagnostic = Diagnostic::new(error, line, address);
                if diagnostic.is_fatal() || diagnostic.kind() == ErrorKind::Interrupted {
                    Err(diagnostic)
                } else {
                    debug!("recoverable error at [{}]: {}", address, diagnostic.error);
                    self.diagnostics.push(diagnostic);
                    Ok(())
                }
            }
        }
    }

    fn count_step(&mut self) -> Exec<()> {
        self.steps += 1;
        match self.config.max_steps {
            Some(limit) if self.steps > limit => Err(Fault::Statement(ScriptError::interrupted(
                Span::single(0),
                format!("step limit exceeded ({} statements)", limit),
            ))),
            _ => Ok(()),
        }
    }

    /// Lex, check and parse one line. `None` for blank and comment-only lines.
    fn statement(&self, line: &str) -> Result<Option<AstNode>, ScriptError> {
        let tokens = lexer::tokenize(line)?;
        if tokens.is_empty() {
            return Ok(None);
        }
        if self.config.syntax_check {
            checker::check(&tokens)?;
        }
        parser::parse(tokens).map(Some)
    }

    fn run_line(&mut self, address: usize, line: &str) -> Exec<()> {
        let Some(tree) = self.statement(line)? else {
            return Ok(());
        };
        match tree.keyword() {
            Some(keyword) => self.execute_keyword(keyword, &tree, address),
            None => self.evaluate(&tree).map(|_| ()),
        }
    }

    /// Block bookkeeping for lines that are consumed but not executed.
    fn track_line(&mut self, line: &str) -> Exec<()> {
        let keyword = match self.statement(line) {
            Ok(Some(tree)) => tree.keyword(),
            _ => None,
        };
        let span = Span::new(0, line.len().max(1));

        match keyword {
            Some(Keyword::Func) => {
                self.control
                    .push(BlockFrame::new(BlockKind::Function, self.state, None));
            }
            Some(Keyword::If) => {
                self.control
                    .push(BlockFrame::new(BlockKind::If, self.state, None));
            }
            Some(Keyword::While) => {
                self.control
                    .push(BlockFrame::new(BlockKind::While, self.state, None));
            }
            Some(Keyword::End) => {
                let frame = self.pop_frame(span, "end")?;
                if self.state == State::DefiningCondition && frame.saved_state == State::Run {
                    // The deferred header is run again now that its body is stored.
                    if let Some(header) = frame.return_address {
                        self.program.jump(header);
                    }
                }
                self.set_state(frame.saved_state);
            }
            Some(Keyword::Else) if self.state == State::Skip => {
                let frame = self.if_frame(span)?;
                let resume = frame.saved_state == State::Run;
                frame.else_seen = true;
                if resume {
                    self.set_state(State::Run);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn pop_frame(&mut self, span: Span, keyword: &str) -> Exec<BlockFrame> {
        self.control.pop().ok_or_else(|| {
            Fault::Statement(ScriptError::structural(
                span,
                format!("'{}' without an open block", keyword),
            ))
        })
    }

    /// Innermost frame, which must be an `if` whose `else` was not passed yet.
    fn if_frame(&mut self, span: Span) -> Exec<&mut BlockFrame> {
        let frame = match self.control.top_mut() {
            Some(frame) if frame.kind == BlockKind::If => frame,
            _ => {
                return Err(Fault::Statement(ScriptError::structural(
                    span,
                    "'else' without a matching 'if'".to_string(),
                )))
            }
        };
        if frame.else_seen {
            return Err(Fault::Statement(ScriptError::syntax_error(
                span,
                "'if' block already has an 'else'".to_string(),
            )));
        }
        Ok(frame)
    }

    fn execute_keyword(&mut self, keyword: Keyword, tree: &AstNode, address: usize) -> Exec<()> {
        let span = tree.root.span.clone();
        match keyword {
            Keyword::Func => self.define_function(tree, address),
            Keyword::If | Keyword::While => self.open_condition(keyword, tree, address),
            Keyword::Else => {
                self.if_frame(span)?.else_seen = true;
                self.set_state(State::Skip);
                Ok(())
            }
            Keyword::End => {
                let frame = self.pop_frame(span, "end")?;
                self.set_state(frame.saved_state);
                match frame.kind {
                    BlockKind::Function => {
                        if let Some(caller) = frame.return_address {
                            self.return_value = Some(0);
                            self.program.jump(caller);
                        }
                    }
                    BlockKind::While => {
                        if let Some(header) = frame.return_address {
                            self.program.jump(header);
                        }
                    }
                    BlockKind::If => {}
                }
                Ok(())
            }
            Keyword::Return => self.return_from_call(tree),
        }
    }

    /// Register the function and consume its body without running it.
    fn define_function(&mut self, tree: &AstNode, address: usize) -> Exec<()> {
        self.control
            .push(BlockFrame::new(BlockKind::Function, self.state, None));
        self.set_state(State::DefiningFunction);

        let header = tree.left.as_deref().ok_or_else(|| {
            ScriptError::syntax_error(tree.span(), "'func' needs a name".to_string())
        })?;
        let name = match &header.root.kind {
            TokenKind::Function(name) if header.root.builtin().is_none() => name,
            TokenKind::Function(name) => {
                return Err(Fault::Statement(ScriptError::runtime_error(
                    header.root.span.clone(),
                    format!("'{}' is a builtin and cannot be redefined", name),
                )))
            }
            _ => {
                return Err(Fault::Statement(ScriptError::syntax_error(
                    header.root.span.clone(),
                    format!("\"{}\" is not a function name", header.root),
                )))
            }
        };

        let mut function = Function::new(name, address);
        if let Some(params) = header.left.as_deref() {
            for param in params.comma_operands() {
                let param_name = param.variable_name().ok_or_else(|| {
                    ScriptError::syntax_error(
                        param.span(),
                        format!("\"{}\" is not a parameter name", param.root),
                    )
                })?;
                function.add_param(param_name);
            }
        }
        self.functions.define(function);
        Ok(())
    }

    fn open_condition(&mut self, keyword: Keyword, tree: &AstNode, address: usize) -> Exec<()> {
        let kind = if keyword == Keyword::If {
            BlockKind::If
        } else {
            BlockKind::While
        };
        // Loop back one line before the header so the next fetch re-reads it.
        let header = address - 1;

        if address == self.program.last_address() {
            self.control
                .push(BlockFrame::new(kind, State::Run, Some(header)));
            self.set_state(State::DefiningCondition);
            return Ok(());
        }

        let condition = match tree.left.as_deref() {
            Some(condition) => self.evaluate(condition),
            None => Err(Fault::Statement(ScriptError::runtime_error(
                tree.span(),
                format!("'{}' needs a condition", keyword),
            ))),
        };

        let taken = match condition {
            Ok(value) => value != 0,
            Err(Fault::Statement(error)) => {
                self.control.push(BlockFrame::new(kind, self.state, None));
                self.set_state(State::Skip);
                return Err(Fault::Statement(error));
            }
            Err(other) => return Err(other),
        };

        let return_address = if kind == BlockKind::While && taken {
            Some(header)
        } else {
            None
        };
        self.control
            .push(BlockFrame::new(kind, self.state, return_address));
        if !taken {
            self.set_state(State::Skip);
        }
        Ok(())
    }

    fn return_from_call(&mut self, tree: &AstNode) -> Exec<()> {
        if !self.control.in_call() {
            return Err(Fault::Statement(ScriptError::runtime_error(
                tree.span(),
                "'return' outside of a function".to_string(),
            )));
        }

        let value = match tree.left.as_deref() {
            Some(operand) => self.evaluate(operand)?,
            None => 0,
        };

        while let Some(frame) = self.control.pop() {
            if frame.is_call() {
                self.set_state(frame.saved_state);
                if let Some(caller) = frame.return_address {
                    self.program.jump(caller);
                }
                break;
            }
        }
        self.return_value = Some(value);
        Ok(())
    }

    fn evaluate(&mut self, node: &AstNode) -> Exec<i64> {
        match &node.root.kind {
            TokenKind::Number(value) => Ok(*value),
            TokenKind::Variable(name) => Ok(self.scopes.resolve_or_default(name)),
            TokenKind::Operation(op) => self.evaluate_binary(*op, node),
            TokenKind::UnaryOperation(op) => self.evaluate_unary(*op, node),
            TokenKind::Function(name) => match node.root.builtin() {
                Some(Builtin::Print) => self.print(node),
                Some(Builtin::Exit) => {
                    self.set_state(State::End);
                    Err(Fault::Halt)
                }
                None => self.call_function(name, node),
            },
            TokenKind::Keyword(keyword) => Err(Fault::Statement(ScriptError::runtime_error(
                node.root.span.clone(),
                format!("'{}' cannot be used inside an expression", keyword),
            ))),
            TokenKind::LeftBracket | TokenKind::RightBracket => Err(Fault::Statement(
                ScriptError::runtime_error(node.root.span.clone(), "Stray bracket".to_string()),
            )),
        }
    }

    fn evaluate_binary(&mut self, op: Operator, node: &AstNode) -> Exec<i64> {
        let left = operand(node, &node.left)?;
        let right = operand(node, &node.right)?;

        if op.is_assignment() {
            return self.assign(op, node, left, right);
        }

        if op == Operator::Comma {
            self.evaluate(left)?;
            return self.evaluate(right);
        }

        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;
        self.arithmetic(op, lhs, rhs, node)
    }

    fn arithmetic(&self, op: Operator, lhs: i64, rhs: i64, node: &AstNode) -> Exec<i64> {
        let value = match op {
            Operator::Plus | Operator::AddAssign => lhs.wrapping_add(rhs),
            Operator::Minus | Operator::SubAssign => lhs.wrapping_sub(rhs),
            Operator::Star | Operator::MulAssign => lhs.wrapping_mul(rhs),
            Operator::Slash | Operator::DivAssign => {
                checked(lhs.checked_div(rhs), rhs, node)?
            }
            Operator::Percent | Operator::ModAssign => {
                checked(lhs.checked_rem(rhs), rhs, node)?
            }
            Operator::Equal => i64::from(lhs == rhs),
            Operator::NotEqual => i64::from(lhs != rhs),
            Operator::Less => i64::from(lhs < rhs),
            Operator::Greater => i64::from(lhs > rhs),
            Operator::LessEqual => i64::from(lhs <= rhs),
            Operator::GreaterEqual => i64::from(lhs >= rhs),
            Operator::Comma | Operator::Assign | Operator::Bang => {
                return Err(Fault::Statement(ScriptError::runtime_error(
                    node.root.span.clone(),
                    format!("'{}' is not a binary operator", op),
                )))
            }
        };
        Ok(value)
    }

    fn assign(&mut self, op: Operator, node: &AstNode, target: &AstNode, value: &AstNode) -> Exec<i64> {
        let name = target.variable_name().ok_or_else(|| {
            ScriptError::runtime_error_with_help(
                target.span(),
                format!("Cannot assign to '{}'", target.root),
                "Only a plain variable can appear on the left of an assignment.".to_string(),
            )
        })?;

        let rhs = self.evaluate(value)?;
        let result = if op == Operator::Assign {
            rhs
        } else {
            let current = self.scopes.resolve_or_default(name);
            self.arithmetic(op, current, rhs, node)?
        };
        self.scopes.assign(name, result);
        Ok(result)
    }

    fn evaluate_unary(&mut self, op: Operator, node: &AstNode) -> Exec<i64> {
        let inner = operand(node, &node.left)?;
        let value = self.evaluate(inner)?;
        match op {
            Operator::Minus => Ok(value.wrapping_neg()),
            Operator::Plus => Ok(value),
            Operator::Bang => Ok(i64::from(value == 0)),
            _ => Err(Fault::Statement(ScriptError::runtime_error(
                node.root.span.clone(),
                format!("'{}' is not a unary operator", op),
            ))),
        }
    }

    fn print(&mut self, node: &AstNode) -> Exec<i64> {
        let arguments = operand(node, &node.left)?;
        let mut values = Vec::new();
        for argument in arguments.comma_operands() {
            values.push(self.evaluate(argument)?);
        }

        let text = values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.output, "{}", text).map_err(|error| {
            ScriptError::runtime_error(node.root.span.clone(), format!("print failed: {}", error))
        })?;

        Ok(values.last().copied().unwrap_or(0))
    }

    /// Run a user function's body from the program store and return its value.
    fn call_function(&mut self, name: &str, node: &AstNode) -> Exec<i64> {
        let function = self.functions.get(name).cloned().ok_or_else(|| {
            ScriptError::runtime_error(
                node.root.span.clone(),
                format!("Undefined function '{}'", name),
            )
        })?;

        let arguments = node
            .left
            .as_deref()
            .map(AstNode::comma_operands)
            .unwrap_or_default();
        if arguments.len() != function.arity() {
            return Err(Fault::Statement(ScriptError::runtime_error_with_help(
                node.span(),
                format!(
                    "'{}' expects {} argument(s) but got {}",
                    name,
                    function.arity(),
                    arguments.len()
                ),
                format!("Declared as {}({}).", name, function.params.join(", ")),
            )));
        }

        if self.scopes.depth() >= self.config.max_call_depth {
            return Err(Fault::Statement(ScriptError::trap(
                node.root.span.clone(),
                format!("call depth limit exceeded ({} calls)", self.config.max_call_depth),
            )));
        }

        // Arguments are evaluated in the caller's scope.
        let mut frame = self.scopes.new_frame();
        for (param, argument) in function.params.iter().zip(arguments) {
            let value = self.evaluate(argument)?;
            frame.set(param, value);
        }

        debug!("call {} from [{}]", name, self.program.address());
        self.scopes.push(frame);
        self.control.push(BlockFrame::new(
            BlockKind::Function,
            self.state,
            Some(self.program.address()),
        ));
        self.program.jump(function.entry);

        let result = self.run_body(name);
        self.scopes.pop();
        result
    }

    fn run_body(&mut self, name: &str) -> Exec<i64> {
        loop {
            if let Some(value) = self.return_value.take() {
                debug!("{} returned {}", name, value);
                return Ok(value);
            }
            if self.state == State::End {
                return Err(Fault::Halt);
            }
            let Some((address, line)) = self.program.fetch() else {
                return Err(Fault::Statement(ScriptError::structural(
                    Span::single(0),
                    format!("body of '{}' ended before its 'end'", name),
                )));
            };
            self.execute_line(address, &line).map_err(Fault::Located)?;
        }
    }
}

fn operand<'a>(node: &'a AstNode, child: &'a Option<Box<AstNode>>) -> Exec<&'a AstNode> {
    child.as_deref().ok_or_else(|| {
        Fault::Statement(ScriptError::runtime_error(
            node.root.span.clone(),
            format!("'{}' is missing an operand", node.root),
        ))
    })
}

/// Division and remainder by zero trap; the only other failure is overflow.
fn checked(result: Option<i64>, divisor: i64, node: &AstNode) -> Exec<i64> {
    result.ok_or_else(|| {
        let message = if divisor == 0 {
            "division by zero".to_string()
        } else {
            "integer overflow in division".to_string()
        };
        Fault::Statement(ScriptError::trap(node.root.span.clone(), message))
    })
}
