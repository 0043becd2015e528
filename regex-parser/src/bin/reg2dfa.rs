//! `reg2dfa`: turns regexes and NFA descriptions into automaton descriptions.
//!
//! Every input is processed independently. A failing input is reported on stderr and skipped;
//! the exit code is 1 if anything failed.

use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, value_parser};
use log::{LevelFilter, debug, info};
use regex_parser::gerber::text::content_lines;
use regex_parser::gerber::{Dfa, Nfa};
use regex_parser::{Error, compile, parse, regex_to_dfa};

// MARK: Args

/// Inline regex (-e/--regex), repeatable.
fn regex_arg() -> Arg {
    Arg::new("regex")
        .short('e')
        .long("regex")
        .value_name("REGEX")
        .action(ArgAction::Append)
        .help("Inline regular expression")
}

/// Input files (positional).
fn files_arg() -> Arg {
    Arg::new("files")
        .value_name("FILE")
        .num_args(0..)
        .value_parser(value_parser!(PathBuf))
        .help("Input files")
}

/// Read NFA files in the transition-table layout (--table).
fn table_arg() -> Arg {
    Arg::new("table")
        .long("table")
        .action(ArgAction::SetTrue)
        .help("Read NFA files as transition tables (start, end, total, symbols, rows)")
}

/// DFA description to match against (--dfa).
fn dfa_file_arg() -> Arg {
    Arg::new("dfa")
        .long("dfa")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("DFA description file")
}

/// Strings to run through the automaton (positional).
fn inputs_arg() -> Arg {
    Arg::new("inputs")
        .value_name("INPUT")
        .num_args(1..)
        .required(true)
        .help("Strings to match")
}

/// Verbosity (-v, repeatable).
fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("More logging (-v info, -vv debug, -vvv trace)")
}

/// Silence logging (-q/--quiet).
fn quiet_arg() -> Arg {
    Arg::new("quiet")
        .short('q')
        .long("quiet")
        .action(ArgAction::SetTrue)
        .global(true)
        .conflicts_with("verbose")
        .help("Disable logging")
}

fn build_cli() -> Command {
    Command::new("reg2dfa")
        .about("Regular expressions to NFA and DFA descriptions")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .arg(quiet_arg())
        .subcommand(
            Command::new("nfa")
                .about("Print the Thompson NFA of each regex")
                .arg(regex_arg())
                .arg(files_arg().help("Files with one regex per line")),
        )
        .subcommand(
            Command::new("dfa")
                .about("Convert NFA description files to DFA descriptions")
                .arg(table_arg())
                .arg(files_arg().help("NFA description files")),
        )
        .subcommand(
            Command::new("compile")
                .about("Print the DFA of each regex")
                .arg(regex_arg())
                .arg(files_arg().help("Files with one regex per line")),
        )
        .subcommand(
            Command::new("match")
                .about("Run strings through a regex or a DFA description")
                .arg(regex_arg().action(ArgAction::Set))
                .arg(dfa_file_arg())
                .group(
                    ArgGroup::new("automaton")
                        .args(["regex", "dfa"])
                        .required(true),
                )
                .arg(inputs_arg()),
        )
}

// MARK: Logging

fn log_level(matches: &ArgMatches) -> LevelFilter {
    if matches.get_flag("quiet") {
        return LevelFilter::Off;
    }
    match matches.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

// MARK: Batch

/// Output sinks, failure count and output separation across inputs.
struct Batch<'a> {
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
    failed: usize,
    printed: bool,
}

impl<'a> Batch<'a> {
    fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self {
            out,
            err,
            failed: 0,
            printed: false,
        }
    }

    fn fail(&mut self, input: impl Display, error: impl Display) -> io::Result<()> {
        writeln!(self.err, "error: {input}: {error}")?;
        self.failed += 1;
        Ok(())
    }

    /// Prints one automaton description, headed by a comment naming its input.
    fn emit(&mut self, input: impl Display, description: impl Display) -> io::Result<()> {
        if self.printed {
            writeln!(self.out)?;
        }
        writeln!(self.out, "# {input}")?;
        write!(self.out, "{description}")?;
        self.printed = true;
        Ok(())
    }
}

fn files(matches: &ArgMatches) -> impl Iterator<Item = &PathBuf> {
    matches.get_many::<PathBuf>("files").into_iter().flatten()
}

fn read(path: &Path, batch: &mut Batch) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) => {
            batch.fail(path.display(), err)?;
            Ok(None)
        }
    }
}

/// Inline regexes first, then every content line of every file, labelled for error reports.
fn regex_inputs(matches: &ArgMatches, batch: &mut Batch) -> io::Result<Vec<(String, String)>> {
    let mut inputs: Vec<(String, String)> = matches
        .get_many::<String>("regex")
        .into_iter()
        .flatten()
        .map(|regex| (regex.clone(), regex.clone()))
        .collect();

    for path in files(matches) {
        let Some(text) = read(path, batch)? else {
            continue;
        };
        for (line, regex) in content_lines(&text) {
            inputs.push((format!("{}:{line}", path.display()), regex.trim().to_owned()));
        }
    }
    Ok(inputs)
}

// MARK: Commands

fn run_nfa(matches: &ArgMatches, batch: &mut Batch) -> io::Result<()> {
    for (label, regex) in regex_inputs(matches, batch)? {
        let compiled = parse(&regex)
            .map_err(Error::from)
            .and_then(|tree| Ok((compile(&tree)?, tree)));
        match compiled {
            Ok((nfa, tree)) => batch.emit(format!("{label} => {tree}"), nfa)?,
            Err(err) => batch.fail(label, err)?,
        }
    }
    Ok(())
}

fn run_dfa(matches: &ArgMatches, batch: &mut Batch) -> io::Result<()> {
    let table = matches.get_flag("table");
    for path in files(matches) {
        let Some(text) = read(path, batch)? else {
            continue;
        };
        let nfa = if table {
            Nfa::from_table_str(&text)
        } else {
            text.parse::<Nfa>()
        };
        match nfa.and_then(|nfa| Dfa::from_nfa(&nfa)) {
            Ok(dfa) => batch.emit(path.display(), dfa)?,
            Err(err) => batch.fail(path.display(), err)?,
        }
    }
    Ok(())
}

fn run_compile(matches: &ArgMatches, batch: &mut Batch) -> io::Result<()> {
    for (label, regex) in regex_inputs(matches, batch)? {
        match regex_to_dfa(&regex) {
            Ok(dfa) => batch.emit(label, dfa)?,
            Err(err) => batch.fail(label, err)?,
        }
    }
    Ok(())
}

fn run_match(matches: &ArgMatches, batch: &mut Batch) -> io::Result<()> {
    let dfa = if let Some(regex) = matches.get_one::<String>("regex") {
        match regex_to_dfa(regex) {
            Ok(dfa) => dfa,
            Err(err) => return batch.fail(regex, err),
        }
    } else if let Some(path) = matches.get_one::<PathBuf>("dfa") {
        let Some(text) = read(path, batch)? else {
            return Ok(());
        };
        match text.parse::<Dfa>() {
            Ok(dfa) => dfa,
            Err(err) => return batch.fail(path.display(), err),
        }
    } else {
        return Ok(());
    };
    debug!("matching against a {}-state dfa", dfa.len());

    for input in matches.get_many::<String>("inputs").into_iter().flatten() {
        let verdict = if dfa.simulate_iter(input.chars()) {
            "accept"
        } else {
            "reject"
        };
        writeln!(batch.out, "{verdict} {input}")?;
    }
    Ok(())
}

/// Dispatches the chosen subcommand and returns how many inputs failed.
fn run(matches: &ArgMatches, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<usize> {
    let mut batch = Batch::new(out, err);
    match matches.subcommand() {
        Some(("nfa", m)) => run_nfa(m, &mut batch)?,
        Some(("dfa", m)) => run_dfa(m, &mut batch)?,
        Some(("compile", m)) => run_compile(m, &mut batch)?,
        Some(("match", m)) => run_match(m, &mut batch)?,
        _ => unreachable!("clap should have caught this"),
    }
    batch.out.flush()?;
    Ok(batch.failed)
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    if let Err(err) = init_logging(log_level(&matches)) {
        eprintln!("warning: logging unavailable: {err}");
    }

    let stdout = io::stdout();
    let stderr = io::stderr();
    match run(&matches, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            info!("{failed} input(s) failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
