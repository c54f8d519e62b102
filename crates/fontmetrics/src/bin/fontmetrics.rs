use fontmetrics::{FontMetrics, MetricsConfig, RangeTable, Strategy};
use std::env;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Eq)]
enum RangesArg {
    Builtin(String),
    File(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Inspect {
        index: Option<PathBuf>,
    },
    Measure {
        index: Option<PathBuf>,
        texts: Vec<String>,
        chars: bool,
    },
    Export {
        index: Option<PathBuf>,
        ranges: RangesArg,
        output: PathBuf,
    },
}

fn print_usage() {
    eprintln!(
        "Usage:\n\
         \x20 fontmetrics inspect [--index <file>]\n\
         \x20 fontmetrics measure [--index <file>] [--chars] <text>...\n\
         \x20 fontmetrics export [--index <file>] --ranges <file|builtin:NAME> --output <file>\n\
         \n\
         The index defaults to $FONTMETRICS_INDEX.\n\
         \n\
         Example:\n\
         \x20 fontmetrics measure --index /tmp/fontmetrics.bin \"Hello World!\""
    );
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| "missing command".to_string())?;

    let mut index: Option<PathBuf> = None;
    let mut ranges: Option<RangesArg> = None;
    let mut output: Option<PathBuf> = None;
    let mut chars = false;
    let mut positional: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--index" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--index requires a value".to_string())?;
                index = Some(PathBuf::from(value));
            }
            "--ranges" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--ranges requires a value".to_string())?;
                ranges = Some(match value.strip_prefix("builtin:") {
                    Some(name) => RangesArg::Builtin(name.to_string()),
                    None => RangesArg::File(PathBuf::from(value)),
                });
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--output requires a value".to_string())?;
                output = Some(PathBuf::from(value));
            }
            "--chars" => chars = true,
            "--" => positional.extend(args.by_ref()),
            _ => positional.push(arg),
        }
    }

    match command.as_str() {
        "inspect" => Ok(Command::Inspect { index }),
        "measure" => {
            if positional.is_empty() {
                return Err("measure requires at least one text".to_string());
            }
            Ok(Command::Measure {
                index,
                texts: positional,
                chars,
            })
        }
        "export" => Ok(Command::Export {
            index,
            ranges: ranges.ok_or_else(|| "missing --ranges".to_string())?,
            output: output.ok_or_else(|| "missing --output".to_string())?,
        }),
        other => Err(format!("unknown command {other:?}")),
    }
}

fn open_metrics(index: Option<PathBuf>) -> Result<FontMetrics, Box<dyn Error>> {
    let mut config = MetricsConfig::from_env()?.with_strategy(Strategy::Index);
    if let Some(path) = index {
        config = config.with_index_path(path);
    }
    Ok(FontMetrics::resolve(&config, None)?)
}

fn load_ranges(arg: &RangesArg) -> Result<RangeTable, Box<dyn Error>> {
    match arg {
        RangesArg::Builtin(name) => RangeTable::builtin(name).ok_or_else(|| {
            let known: Vec<&str> = RangeTable::builtin_names().collect();
            format!("unknown builtin range set {name:?} (known: {})", known.join(", ")).into()
        }),
        RangesArg::File(path) => Ok(RangeTable::load(path)?),
    }
}

fn describe(c: char) -> String {
    if c.is_control() {
        format!("U+{:04X}", u32::from(c))
    } else {
        format!("U+{:04X} {c:?}", u32::from(c))
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let command = parse_args(env::args().skip(1)).inspect_err(|_| {
        print_usage();
    })?;

    match command {
        Command::Inspect { index } => {
            let metrics = open_metrics(index)?;
            let index = metrics.index().ok_or("index backend not active")?;
            println!("ranges:  {}", index.range_count());
            println!(
                "widths:  {} (ranges cover {})",
                index.width_count(),
                index.expected_width_count()
            );
            println!("bytes:   {}", index.encoded_len());
            println!("search:  {:?}", index.search_mode());
            for range in index.ranges() {
                println!("  {range}  {}", range.len());
            }
        }
        Command::Measure {
            index,
            texts,
            chars,
        } => {
            let metrics = open_metrics(index)?;
            for text in &texts {
                println!("{text:?} => {}", metrics.text_width(text));
                if chars {
                    for c in text.chars() {
                        println!("  {} => {}", describe(c), metrics.width_of(u32::from(c)));
                    }
                }
            }
        }
        Command::Export {
            index,
            ranges,
            output,
        } => {
            let metrics = open_metrics(index)?;
            let table = load_ranges(&ranges)?;
            let exported = metrics.export(&table)?;
            exported.save(&output)?;
            println!(
                "wrote {} ranges, {} widths to {}",
                exported.range_count(),
                exported.width_count(),
                output.display()
            );
        }
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("fontmetrics error: {err}");
        std::process::exit(1);
    }
}
