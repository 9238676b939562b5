use log::{debug, trace};

/// A user-defined function: where its body starts and what its parameters are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// Address of the `func` line; the body starts at the next address.
    pub entry: usize,
    pub params: Vec<String>,
}

impl Function {
    pub fn new(name: &str, entry: usize) -> Self {
        Self {
            name: name.to_string(),
            entry,
            params: Vec::new(),
        }
    }

    pub fn add_param(&mut self, name: &str) {
        trace!("function {} param {}", self.name, name);
        self.params.push(name.to_string());
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Registry of defined functions, looked up by exact name.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: Vec<Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    /// Register `function`, replacing an earlier definition with the same name.
    pub fn define(&mut self, function: Function) {
        debug!(
            "define {}({}) at {}",
            function.name,
            function.params.join(", "),
            function.entry
        );
        match self.functions.iter_mut().find(|f| f.name == function.name) {
            Some(existing) => *existing = function,
            None => self.functions.push(function),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        trace!("lookup function {}", name);
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
