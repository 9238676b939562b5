use log::trace;

/// Append-only, addressable history of every submitted source line.
///
/// Address 0 holds an empty line that counts as already fetched, so the
/// address just before any real line is always a valid jump target.
#[derive(Debug, Clone)]
pub struct ProgramStore {
    lines: Vec<String>,
    cursor: usize,
}

impl ProgramStore {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor: 0,
        }
    }

    /// Append a line, returning its address.
    pub fn store(&mut self, line: &str) -> usize {
        self.lines.push(line.to_string());
        let address = self.lines.len() - 1;
        trace!("store [{}] {:?}", address, line);
        address
    }

    /// Advance the cursor and return the line it now designates, or `None`
    /// once the cursor sits on the last stored line.
    pub fn fetch(&mut self) -> Option<(usize, String)> {
        let next = self.cursor + 1;
        let line = self.lines.get(next)?;
        self.cursor = next;
        trace!("fetch [{}] {:?}", next, line);
        Some((next, line.clone()))
    }

    /// Reposition the cursor; the next fetch returns the line after `address`.
    pub fn jump(&mut self, address: usize) {
        trace!("jump {} -> {}", self.cursor, address);
        self.cursor = address.min(self.last_address());
    }

    /// Address of the line most recently fetched.
    pub fn address(&self) -> usize {
        self.cursor
    }

    pub fn last_address(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor == self.last_address()
    }

    pub fn line(&self, address: usize) -> Option<&str> {
        self.lines.get(address).map(String::as_str)
    }

    /// Number of stored lines, including the empty line at address 0.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() <= 1
    }
}

impl Default for ProgramStore {
    fn default() -> Self {
        Self::new()
    }
}
