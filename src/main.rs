use clap::{value_parser, Arg, ArgAction, Command};
use linescript::{repl, runner, EngineConfig};
use log::Level;
use std::fs;
use std::path::Path;

fn main() {
    let matches = Command::new("linescript")
        .about("Line-at-a-time interpreter with functions, conditionals and loops")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-check")
                .long("no-check")
                .help("Skip the syntax checker and go straight to the parser")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-steps")
                .long("max-steps")
                .value_name("N")
                .help("Interrupt a line after it has run N statements")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .help("Log every fetch, jump and stack operation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Log state transitions and function calls")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("trace") {
        Some(Level::Trace)
    } else if matches.get_flag("debug") {
        Some(Level::Debug)
    } else {
        None
    };
    if let Some(level) = level {
        if let Err(error) = simple_logger::init_with_level(level) {
            eprintln!("Could not install logger: {}", error);
        }
    }

    let config = EngineConfig::new()
        .with_syntax_check(!matches.get_flag("no-check"))
        .with_max_steps(matches.get_one::<u64>("max-steps").copied());

    match matches.get_one::<String>("file") {
        Some(file_path) if !matches.get_flag("interactive") => run_file(file_path, config),
        _ => repl::start(config),
    }
}

fn run_file(path: &str, config: EngineConfig) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        std::process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            if runner::run(&source, Some(&filename), config).is_err() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
