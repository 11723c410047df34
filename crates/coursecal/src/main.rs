use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use coursecal::{sheet, AddressBook, CalendarSink, ConverterConfig, ScheduleConverter};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(
    name = "coursecal",
    about = "Convert a course schedule export (.xlsx) into a calendar file (.ics)",
    version
)]
struct Args {
    /// Schedule workbook; when omitted, *.xlsx files in the current directory are offered
    input: Option<PathBuf>,

    /// Building address table (CSV: building name, code, address)
    #[arg(short, long, default_value = "Address.csv")]
    addresses: PathBuf,

    /// Output calendar path [default: input with an .ics extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON converter configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Log each row and pattern as it is converted
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let input = match args.input {
        Some(input) => input,
        None => match select_input()? {
            Some(input) => input,
            None => {
                println!("\nOperation cancelled");
                return Ok(());
            }
        },
    };
    let output = args
        .output
        .unwrap_or_else(|| input.with_extension("ics"));

    let config = match &args.config {
        Some(path) => ConverterConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ConverterConfig::default(),
    };

    let events = convert(&input, &output, &args.addresses, &config)?;

    println!("✓ Created {events} calendar events");
    println!("✓ Calendar saved to: {}", output.display());
    Ok(())
}

/// Runs the full conversion and returns the number of events written.
fn convert(
    input: &Path,
    output: &Path,
    addresses: &Path,
    config: &ConverterConfig,
) -> anyhow::Result<usize> {
    info!(input = %input.display(), "Processing schedule");

    let book = AddressBook::load(addresses)
        .with_context(|| format!("Failed to load address table {}", addresses.display()))?;
    let rows = sheet::read_schedule(input)
        .with_context(|| format!("Failed to read schedule {}", input.display()))?;

    let converter = ScheduleConverter::new(&book, config)?;
    let events = converter.convert(&rows).context("Conversion failed")?;

    let mut sink = CalendarSink::new(config);
    sink.extend(&events);
    sink.write_to(output)
        .with_context(|| format!("Failed to write calendar {}", output.display()))?;

    Ok(sink.len())
}

/// Finds schedule workbooks in the current directory and lets the user pick
/// one when there are several. Returns `None` if the user cancels.
fn select_input() -> anyhow::Result<Option<PathBuf>> {
    let mut candidates: Vec<PathBuf> = glob::glob("*.xlsx")
        .context("Invalid workbook glob")?
        .filter_map(Result::ok)
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => bail!("No .xlsx files found in the current directory"),
        1 => {
            let input = candidates.remove(0);
            println!("Found schedule file: {}", input.display());
            Ok(Some(input))
        }
        n => {
            println!("Found {n} .xlsx files:");
            for (idx, path) in candidates.iter().enumerate() {
                println!("  {}. {}", idx + 1, path.display());
            }
            let stdin = io::stdin();
            Ok(prompt_choice(&mut stdin.lock(), &mut io::stdout(), n)?
                .map(|idx| candidates.swap_remove(idx)))
        }
    }
}

/// Reads 1-based choices until one is in range. Returns the 0-based index, or
/// `None` on end of input or a non-numeric answer.
fn prompt_choice(
    input: &mut impl BufRead,
    out: &mut impl Write,
    count: usize,
) -> io::Result<Option<usize>> {
    loop {
        write!(out, "\nEnter the number of the file to process: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=count).contains(&choice) => return Ok(Some(choice - 1)),
            Ok(_) => writeln!(out, "Please enter a number between 1 and {count}")?,
            Err(_) => return Ok(None),
        }
    }
}
