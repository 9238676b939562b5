use crate::config::EngineConfig;
use crate::engine::{Engine, Flow};
use crate::error::Diagnostic;
use log::warn;
use std::io::{self, Write};

/// Feed a whole script to a fresh engine, one line at a time.
pub fn run(source: &str, filename: Option<&str>, config: EngineConfig) -> Result<(), Diagnostic> {
    let mut engine = Engine::with_config(config, io::stdout());
    run_source(&mut engine, source, filename)
}

/// Submit every line of `source`, reporting diagnostics as they appear.
/// Stops after `exit` or the first fatal error.
pub fn run_source<W: Write>(
    engine: &mut Engine<W>,
    source: &str,
    filename: Option<&str>,
) -> Result<(), Diagnostic> {
    for line in source.lines() {
        let line = line.trim_end_matches('\r');
        if is_blank(line) {
            continue;
        }
        if submit_line(engine, line, filename)? == Flow::Exit {
            return Ok(());
        }
    }

    if engine.is_awaiting_block_close() {
        warn!(
            "{}: input ended inside an open block",
            filename.unwrap_or("<input>")
        );
    }
    Ok(())
}

/// Submit one line and print whatever went wrong while running it.
pub fn submit_line<W: Write>(
    engine: &mut Engine<W>,
    line: &str,
    filename: Option<&str>,
) -> Result<Flow, Diagnostic> {
    let result = engine.submit(line);
    for diagnostic in engine.take_diagnostics() {
        diagnostic.report(filename);
    }
    result.map_err(|diagnostic| {
        diagnostic.report(filename);
        diagnostic
    })
}

/// Lines the engine never needs to see.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#')
}
