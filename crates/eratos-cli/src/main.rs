use eratos::render::{Session, SessionError};
use eratos::{Catalog, Document, EngineConfig, SummaryIndex};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Eratos(eratos::Error),
    Session(SessionError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Eratos(err) => write!(f, "{err}"),
            CliError::Session(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<eratos::Error> for CliError {
    fn from(value: eratos::Error) -> Self {
        Self::Eratos(value)
    }
}

impl From<SessionError> for CliError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Normalize,
    Validate,
    Project,
    Layout,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    catalog: Option<String>,
    summary: Option<String>,
    config: Option<String>,
    sizes: Option<String>,
    expand_all: bool,
}

fn usage() -> &'static str {
    "eratos-cli\n\
\n\
USAGE:\n\
  eratos-cli [normalize] [--pretty] [<path>|-]\n\
  eratos-cli validate [--pretty] [<path>|-]\n\
  eratos-cli project [--pretty] [--catalog <path>] [--summary <path>] [<path>|-]\n\
  eratos-cli layout [--pretty] [--catalog <path>] [--summary <path>] [--config <path>] [--sizes <path>] [--expand-all] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - validate reports invariant violations of the document as given, before normalization.\n\
  - --config accepts JSON, or YAML when the file ends in .yaml/.yml.\n\
  - --sizes is a JSON object of measured sizes: {\"<id>\": {\"width\": w, \"height\": h}}.\n\
  - layout prints positions plus the visibility of every edge.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "normalize" => args.command = Command::Normalize,
            "validate" => args.command = Command::Validate,
            "project" => args.command = Command::Project,
            "layout" => args.command = Command::Layout,
            "--pretty" => args.pretty = true,
            "--expand-all" => args.expand_all = true,
            "--catalog" | "--summary" | "--config" | "--sizes" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let slot = match a.as_str() {
                    "--catalog" => &mut args.catalog,
                    "--summary" => &mut args.summary,
                    "--config" => &mut args.config,
                    _ => &mut args.sizes,
                };
                *slot = Some(path.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => args.input = Some("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let yaml = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    Ok(if yaml {
        EngineConfig::from_yaml_str(&text)?
    } else {
        EngineConfig::from_json_str(&text)?
    })
}

fn load_lookups(args: &Args) -> Result<(Catalog, SummaryIndex), CliError> {
    let catalog = match args.catalog.as_deref() {
        Some(path) => Catalog::from_json_str(&std::fs::read_to_string(path)?)?,
        None => Catalog::new(),
    };
    let summaries = match args.summary.as_deref() {
        Some(path) => SummaryIndex::from_json_str(&std::fs::read_to_string(path)?)?,
        None => SummaryIndex::new(),
    };
    Ok((catalog, summaries))
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    layout: &'a eratos::render::PositionedGraph,
    visibility: &'a std::collections::BTreeMap<String, bool>,
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Normalize => {
            let mut doc = Document::from_json_str(&text)?;
            eratos::normalize_in_place(&mut doc);
            write_json(&doc, args.pretty)
        }
        Command::Validate => {
            let doc = Document::from_json_str(&text)?;
            let violations: Vec<String> = eratos::validate(&doc)
                .iter()
                .map(ToString::to_string)
                .collect();
            write_json(&violations, args.pretty)
        }
        Command::Project => {
            let (catalog, summaries) = load_lookups(&args)?;
            let mut doc = Document::from_json_str(&text)?;
            eratos::normalize_in_place(&mut doc);
            let graph = eratos::render::project(&doc, &catalog, &summaries);
            write_json(&graph, args.pretty)
        }
        Command::Layout => {
            let config = load_config(args.config.as_deref())?;
            let (catalog, summaries) = load_lookups(&args)?;
            let mut session =
                Session::from_json_str(&text, &config)?.with_lookups(catalog, summaries);
            if let Some(path) = args.sizes.as_deref() {
                let sizes = eratos::render::sizes_from_json(&std::fs::read_to_string(path)?)
                    .map_err(SessionError::from)?;
                for (id, size) in sizes {
                    if session.graph().node(&id).is_some() {
                        session.measure(&id, size.width, size.height)?;
                    }
                }
            }
            if args.expand_all {
                let ids: Vec<String> = session.graph().nodes.iter().map(|n| n.id.clone()).collect();
                for id in ids {
                    session.expand(&id, true)?;
                }
            }
            let layout = session.layout();
            let visibility = session.visibility();
            write_json(
                &LayoutOut {
                    layout: &layout,
                    visibility: &visibility,
                },
                args.pretty,
            )
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
