use log::trace;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: i64,
    /// Depth of the scope frame the variable lives in; 0 is the global frame.
    pub depth: usize,
}

/// Variables of one call frame.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    values: HashMap<String, Variable>,
    depth: usize,
}

impl Scope {
    pub fn new(depth: usize) -> Self {
        Self {
            values: HashMap::new(),
            depth,
        }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).map(|variable| variable.value)
    }

    pub fn set(&mut self, name: &str, value: i64) {
        let depth = self.depth;
        self.values
            .entry(name.to_string())
            .and_modify(|variable| variable.value = value)
            .or_insert_with(|| Variable {
                name: name.to_string(),
                value,
                depth,
            });
    }

    /// Value of `name`, creating it with 0 when it does not exist yet.
    pub fn resolve_or_default(&mut self, name: &str) -> i64 {
        let depth = self.depth;
        self.values
            .entry(name.to_string())
            .or_insert_with(|| {
                trace!("create variable {} at depth {}", name, depth);
                Variable {
                    name: name.to_string(),
                    value: 0,
                    depth,
                }
            })
            .value
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Active scope frames, innermost last. Lookups only ever see the innermost
/// frame: globals are invisible inside a call.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Scope::new(0)],
        }
    }

    /// Fresh frame for a call, sitting one level above the current innermost.
    pub fn new_frame(&self) -> Scope {
        Scope::new(self.frames.len())
    }

    pub fn push(&mut self, scope: Scope) {
        trace!("push scope depth {}", scope.depth);
        self.frames.push(scope);
    }

    /// Drop the innermost frame. The global frame is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.frames.len() <= 1 {
            return None;
        }
        let scope = self.frames.pop();
        trace!("pop scope, depth now {}", self.frames.len() - 1);
        scope
    }

    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Drop frames until only `depth + 1` remain.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth + 1);
    }

    fn innermost(&mut self) -> &mut Scope {
        if self.frames.is_empty() {
            self.frames.push(Scope::new(0));
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn resolve_or_default(&mut self, name: &str) -> i64 {
        self.innermost().resolve_or_default(name)
    }

    pub fn assign(&mut self, name: &str, value: i64) {
        trace!("assign {} = {}", name, value);
        self.innermost().set(name, value);
    }

    /// Read without creating.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.frames.last().and_then(|scope| scope.get(name))
    }

    pub fn innermost_len(&self) -> usize {
        self.frames.last().map_or(0, Scope::len)
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
