use crate::config::EngineConfig;
use crate::engine::{Engine, Flow};
use crate::runner::{is_blank, submit_line};
use std::io::{self, Write};

/// Interactive loop. The engine persists between lines, so blocks can be
/// typed one line at a time; a secondary prompt shows while one is open.
pub fn start(config: EngineConfig) {
    println!("linescript v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let mut engine = Engine::with_config(config, io::stdout());

    loop {
        let prompt = if engine.is_awaiting_block_close() {
            "... "
        } else {
            "> "
        };
        print!("{}", prompt);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim_end_matches(&['\n', '\r'][..]);
                if is_blank(line) {
                    continue;
                }
                match submit_line(&mut engine, line, None) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) | Err(_) => break,
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}
