use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use sidc::prelude::*;
use symbology::{
    EngineConfig, EngineError, Folder, GeoPoint, Hints, NullRenderer, ShapeMask, ShapeType,
    SymbologyEngine,
};

/// Translate, validate and look up MIL-STD-2525 symbol codes.
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// JSON configuration file naming the tables to use.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// File of 2525C,2525D code pairs (overrides the configuration
    /// file).
    #[clap(long, global = true)]
    code_pairs: Option<PathBuf>,

    /// JSON file of 2525C symbol definitions.
    #[clap(long, global = true)]
    symbols_c: Option<PathBuf>,

    /// JSON file of 2525D symbol definitions (also used for 2525E).
    #[clap(long, global = true)]
    symbols_d: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a code into another generation of the standard.
    Translate {
        code: String,
        /// Generation to translate to (c, d or e).
        #[clap(long)]
        to: Generation,
        /// Generation of CODE, if it can't be worked out from the code.
        #[clap(long)]
        from: Option<Generation>,
        /// Fail rather than discard information identifying the
        /// symbol.
        #[clap(long)]
        exact: bool,
    },
    /// Print the normalized and basic forms of a code.
    Normalize {
        code: String,
        #[clap(long)]
        generation: Option<Generation>,
    },
    /// Check that a code is well-formed.
    Validate { code: String },
    /// Describe the symbol with this code.
    Show { code: String },
    /// Search symbol names.
    Find {
        query: String,
        #[clap(long, default_value = "c")]
        generation: Generation,
        /// Only list symbols which can be drawn with this shape.
        #[clap(long)]
        shape: Vec<ShapeType>,
    },
    /// Print the catalog's folder tree.
    Tree {
        #[clap(long, default_value = "c")]
        generation: Generation,
        /// Also list the symbols in each folder.
        #[clap(long)]
        symbols: bool,
    },
    /// Derive control points for a symbol from the points of a drawn
    /// shape.
    Derive {
        code: String,
        /// A drawn point, as LATITUDE,LONGITUDE.  Repeat for each point.
        #[clap(long = "point", value_parser = parse_point, required = true)]
        points: Vec<GeoPoint>,
        /// The kind of shape drawn.
        #[clap(long)]
        shape: Option<ShapeType>,
        /// Where the label should go, as LATITUDE,LONGITUDE.
        #[clap(long, value_parser = parse_point)]
        label: Option<GeoPoint>,
    },
}

fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (latitude, longitude) = s
        .split_once(',')
        .ok_or_else(|| format!("'{s}' is not of the form LATITUDE,LONGITUDE"))?;
    let coordinate = |text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad coordinate '{text}' in '{s}': {e}"))
    };
    Ok(GeoPoint::new(coordinate(latitude)?, coordinate(longitude)?))
}

#[derive(Debug)]
enum Fail {
    /// We were not able to set up logging or load the tables.
    InitialisationFailure(String),
    Engine(EngineError),
    Malformed(MalformedCode),
    NotFound(String),
    Output(serde_json::Error),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
            Fail::Engine(e) => e.fmt(f),
            Fail::Malformed(e) => e.fmt(f),
            Fail::NotFound(msg) => f.write_str(msg.as_str()),
            Fail::Output(e) => write!(f, "failed to generate output: {e}"),
        }
    }
}

impl Error for Fail {}

fn engine_config(cli: &Cli) -> Result<EngineConfig, Fail> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path).map_err(Fail::Engine)?,
        None => EngineConfig::default(),
    };
    if cli.code_pairs.is_some() {
        config.code_pairs = cli.code_pairs.clone();
    }
    if cli.symbols_c.is_some() {
        config.symbols_c = cli.symbols_c.clone();
    }
    if cli.symbols_d.is_some() {
        config.symbols_d = cli.symbols_d.clone();
    }
    Ok(config)
}

fn detect(code: &str, stated: Option<Generation>) -> Result<Generation, Fail> {
    stated.or_else(|| Generation::detect(code)).ok_or_else(|| {
        Fail::NotFound(format!(
            "cannot tell which generation of the standard '{code}' belongs to"
        ))
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Fail> {
    let text = serde_json::to_string_pretty(value).map_err(Fail::Output)?;
    println!("{text}");
    Ok(())
}

fn print_folder(folder: &Folder, depth: usize, with_symbols: bool) {
    let indent = "  ".repeat(depth);
    match folder.symbol() {
        Some(symbol) => println!(
            "{indent}{}/ [{}] ({})",
            folder.name(),
            folder.content_mask(),
            symbol.code
        ),
        None => println!("{indent}{}/ [{}]", folder.name(), folder.content_mask()),
    }
    for child in folder.children() {
        print_folder(child, depth + 1, with_symbols);
    }
    if with_symbols {
        for symbol in folder.symbols() {
            println!(
                "{indent}  {} {} [{}]",
                symbol.code,
                symbol.name(),
                symbol.content_mask
            );
        }
    }
}

fn run_command(engine: &SymbologyEngine, command: &Command) -> Result<(), Fail> {
    match command {
        Command::Translate {
            code,
            to,
            from,
            exact,
        } => {
            let from = detect(code, *from)?;
            let translator = engine.translator();
            let translation = if *exact {
                translator
                    .translate_exact(code, from, *to)
                    .map(|code| Translation {
                        code,
                        reduction: Reduction::Exact,
                    })
            } else {
                translator.translate_detailed(code, from, *to)
            };
            match translation {
                Some(t) if t.reduction.is_degraded() => {
                    println!("{}\t({})", t.code, t.reduction);
                    Ok(())
                }
                Some(t) => {
                    println!("{}", t.code);
                    Ok(())
                }
                None => Err(Fail::NotFound(format!("no {to} equivalent of {code}"))),
            }
        }
        Command::Normalize { code, generation } => {
            let generation = detect(code, *generation)?;
            println!("{}", normalize(code, generation));
            println!("{}", basic_code(code, generation));
            Ok(())
        }
        Command::Validate { code } => {
            let parsed = validate(code).map_err(Fail::Malformed)?;
            println!("{parsed}: valid {} code", parsed.generation());
            Ok(())
        }
        Command::Show { code } => match engine.get_symbol(code) {
            Some(symbol) => print_json(symbol.as_ref()),
            None => Err(Fail::NotFound(format!("no symbol {code}"))),
        },
        Command::Find {
            query,
            generation,
            shape,
        } => {
            let mask: Option<ShapeMask> = if shape.is_empty() {
                None
            } else {
                Some(shape.iter().copied().collect())
            };
            for symbol in engine.find(*generation, query, mask) {
                println!("{}\t{}", symbol.code, symbol.full_name);
            }
            Ok(())
        }
        Command::Tree {
            generation,
            symbols,
        } => {
            let root = engine.catalog(*generation).root();
            for folder in root.children() {
                print_folder(folder, 0, *symbols);
            }
            Ok(())
        }
        Command::Derive {
            code,
            points,
            shape,
            label,
        } => {
            let hints = Hints {
                shape: *shape,
                label: *label,
            };
            match engine.derive_for_code(code, points, &hints) {
                Some(set) => print_json(&set),
                None => Err(Fail::NotFound(format!(
                    "cannot derive control points for {code} from the given points"
                ))),
            }
        }
    }
}

fn run_milsym() -> Result<(), Fail> {
    let cli = Cli::parse();

    // See
    // https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/index.html#filtering-events-with-environment-variables
    // for instructions on how to select which trace messages get
    // printed.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let config = engine_config(&cli)?;
    let engine = SymbologyEngine::from_config(&config, Arc::new(NullRenderer)).map_err(Fail::Engine)?;

    let span = span!(Level::ERROR, "milsym", command=?cli.command);
    let _enter = span.enter();
    let result = run_command(&engine, &cli.command);
    if let Err(e) = &result {
        event!(Level::DEBUG, "command failed: {:?}", e);
    }
    result
}

fn main() {
    match run_milsym() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
