use std::{fs, path::Path, path::PathBuf, process};

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, LevelFilter};

use ll1_bootstrap::{
    compile_grammar, parse_grammar_description, parse_source, parser::bootstrap::bootstrap_table,
    ConflictPolicy, Error, LL1Table, Result,
};

#[derive(Debug, Parser)]
#[command(
    name = "ll1-bootstrap",
    version,
    about = "Builds LL(1) tables from grammar descriptions and parses with them."
)]
struct Args {
    /// Increase message verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a grammar description and write the bootstrap and target tables.
    Compile {
        grammar: PathBuf,
        #[arg(long, default_value = "initial.json")]
        bootstrap_table: PathBuf,
        #[arg(long, default_value = "calctable.json")]
        table: PathBuf,
        /// "first-match" or "reject"
        #[arg(long, default_value = "first-match")]
        policy: ConflictPolicy,
    },
    /// Parse and evaluate an arithmetic source file with a compiled table.
    Run {
        source: PathBuf,
        #[arg(long, default_value = "calctable.json")]
        table: PathBuf,
    },
    /// Print the productions, First/Follow sets and LL(1) table of a grammar description.
    Table {
        grammar: PathBuf,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

fn init_logger(args: &Args) {
    let level = if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn compile(
    grammar: &Path,
    bootstrap_path: &Path,
    table_path: &Path,
    policy: ConflictPolicy,
) -> Result<()> {
    let text = read(grammar)?;
    let (bootstrap, table) = compile_grammar(&text, policy)?;
    bootstrap.save(bootstrap_path)?;
    table.save(table_path)?;
    println!("Success");
    Ok(())
}

fn run(source: &Path, table_path: &Path) -> Result<()> {
    let table = LL1Table::load(table_path)?;
    let text = read(source)?;
    let root = parse_source(&text, &table)?;
    debug!("parse tree:\n{}", root.to_plaintext());
    let result = ll1_bootstrap::calculator::compute(&root)?;
    println!("RESULT: {}", result);
    Ok(())
}

fn print_table(grammar: &Path, format: OutputFormat) -> Result<()> {
    let text = read(grammar)?;
    let bootstrap = bootstrap_table()?;
    let g = parse_grammar_description(&text, &bootstrap)?;
    let first_follow = g.calculate_first_follow();
    let t = g.generate_ll1_parsing_table_with(&first_follow, ConflictPolicy::FirstMatch)?;
    info!("{} conflicting cells", t.conflicts().len());

    let productions = g.to_production_output_vec();
    let sets = first_follow.to_non_terminal_output_vec();
    match format {
        OutputFormat::Plain => {
            println!("{}\n", productions.to_plaintext());
            println!("{}\n", sets.to_plaintext());
            println!("{}", t.to_plaintext());
        }
        OutputFormat::Latex => {
            println!("{}\n", productions.to_latex());
            println!("{}\n", sets.to_latex());
            println!("{}", t.to_latex());
        }
        OutputFormat::Json => {
            println!("{}", sets.to_json()?);
            println!("{}", t.to_json()?);
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logger(&args);

    let result = match &args.command {
        Command::Compile {
            grammar,
            bootstrap_table,
            table,
            policy,
        } => compile(grammar, bootstrap_table, table, *policy),
        Command::Run { source, table } => run(source, table),
        Command::Table { grammar, format } => print_table(grammar, *format),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
