use log::trace;
use std::fmt;

/// States of the execution automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Statements are evaluated.
    Run,
    /// Consuming the body of a `func` block without running it.
    DefiningFunction,
    /// Consuming an `if`/`while` block whose body was not submitted yet.
    DefiningCondition,
    /// Inside a branch that is not taken.
    Skip,
    /// `exit` was executed; nothing more is fetched.
    End,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            State::Run => "run",
            State::DefiningFunction => "defining function",
            State::DefiningCondition => "defining condition",
            State::Skip => "skip",
            State::End => "end",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Function,
    If,
    While,
}

/// One open block: what opened it, the automaton state to restore when it
/// closes, and where to jump back to (call return address, loop header, or
/// deferred block header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFrame {
    pub kind: BlockKind,
    pub saved_state: State,
    pub return_address: Option<usize>,
    /// Set once the `else` of an `if` block has been passed.
    pub else_seen: bool,
}

impl BlockFrame {
    pub fn new(kind: BlockKind, saved_state: State, return_address: Option<usize>) -> Self {
        Self {
            kind,
            saved_state,
            return_address,
            else_seen: false,
        }
    }

    /// Frame pushed by a function call, as opposed to a definition.
    pub fn is_call(&self) -> bool {
        self.kind == BlockKind::Function && self.return_address.is_some()
    }
}

/// The engine's block stack. Return address, saved state and block kind are
/// kept in one frame so the three always have the same depth.
#[derive(Debug, Clone, Default)]
pub struct ControlStack {
    frames: Vec<BlockFrame>,
}

impl ControlStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: BlockFrame) {
        trace!(
            "push {:?} (saved {}, return {:?}) depth {}",
            frame.kind,
            frame.saved_state,
            frame.return_address,
            self.frames.len() + 1
        );
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<BlockFrame> {
        let frame = self.frames.pop()?;
        trace!("pop {:?} depth {}", frame.kind, self.frames.len());
        Some(frame)
    }

    pub fn top(&self) -> Option<&BlockFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut BlockFrame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Whether a call frame is open, i.e. `return` has somewhere to go.
    pub fn in_call(&self) -> bool {
        self.frames.iter().any(BlockFrame::is_call)
    }
}
