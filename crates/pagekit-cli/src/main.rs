//! pagekit CLI: inspect templates, decode stored pages and write sections.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use pagekit_codec::{parse_json_template, parse_yaml_template, PageCodec, ParsedTemplate};
use pagekit_core::prelude::{EditorConfig, PageState, SectionStore};
use pagekit_io::{build_store_from_config, StoreResponse};
use pagekit_session::EditorSession;

#[derive(Parser)]
#[command(name = "pagekit")]
#[command(about = "Schema-driven page sections: decode, encode and store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct StoreArgs {
    /// Store URI (e.g. file:///srv/pages, memory://); overrides PAGEKIT_STORE_URI
    #[arg(long)]
    store_uri: Option<String>,

    /// Store directory; overrides PAGEKIT_STORE_DIR
    #[arg(long)]
    store_dir: Option<String>,

    /// Write compact JSON documents
    #[arg(long)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a page template (YAML or JSON)
    Validate {
        /// Path to the template file
        #[arg(short, long)]
        template: PathBuf,
    },

    /// Decode a raw page document file into canonical sections
    Decode {
        #[arg(short, long)]
        template: PathBuf,

        /// Raw page document (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Only this section
        #[arg(long)]
        section: Option<String>,
    },

    /// Encode canonical page state (JSON) into persisted section records
    Encode {
        #[arg(short, long)]
        template: PathBuf,

        /// Canonical page state, as printed by `decode` or `show`
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        section: Option<String>,
    },

    /// Load a page from the store and print its canonical sections
    Show {
        #[arg(short, long)]
        template: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Encode canonical page state and write it to the store
    Save {
        #[arg(short, long)]
        template: PathBuf,

        #[arg(short, long)]
        input: PathBuf,

        /// Only this section (default: every section)
        #[arg(long)]
        section: Option<String>,

        #[command(flatten)]
        store: StoreArgs,
    },
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { template } => validate(&template),
        Commands::Decode {
            template,
            input,
            section,
        } => decode(&template, &input, section.as_deref()),
        Commands::Encode {
            template,
            input,
            section,
        } => encode(&template, &input, section.as_deref()),
        Commands::Show { template, store } => show(&template, &store),
        Commands::Save {
            template,
            input,
            section,
            store,
        } => save(&template, &input, section.as_deref(), &store),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn load_template(path: &Path) -> Result<ParsedTemplate, Box<dyn std::error::Error>> {
    let src = fs::read_to_string(path)?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json_template(&src)?,
        _ => parse_yaml_template(&src)?,
    };
    Ok(parsed)
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn print_json(v: &Value) -> CliResult {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}

fn editor_config(args: &StoreArgs) -> EditorConfig {
    let mut cfg = EditorConfig::from_env();
    apply_store_args(&mut cfg, args);
    cfg
}

fn apply_store_args(cfg: &mut EditorConfig, args: &StoreArgs) {
    if let Some(uri) = &args.store_uri {
        cfg.store_uri = Some(uri.clone());
    }
    if let Some(dir) = &args.store_dir {
        cfg.store_dir = dir.clone();
    }
    if args.compact {
        cfg.pretty_json = false;
    }
}

fn validate(template: &Path) -> CliResult {
    let parsed = load_template(template)?;
    for w in &parsed.warnings {
        println!("warning: {w}");
    }
    println!(
        "✓ Template '{}' is valid ({} sections)",
        parsed.template.page,
        parsed.template.sections.len()
    );
    Ok(())
}

fn decode(template: &Path, input: &Path, section: Option<&str>) -> CliResult {
    let codec = PageCodec::from_config(load_template(template)?.template, &EditorConfig::from_env());
    let raw = read_json(input)?;
    match section {
        Some(key) => {
            let fields = codec
                .decode_section(&raw, key)
                .ok_or_else(|| format!("template has no section '{key}'"))?;
            print_json(&serde_json::to_value(fields)?)
        }
        None => print_json(&serde_json::to_value(codec.decode(Some(&raw)))?),
    }
}

fn encode(template: &Path, input: &Path, section: Option<&str>) -> CliResult {
    let codec = PageCodec::from_config(load_template(template)?.template, &EditorConfig::from_env());
    let state: PageState = serde_json::from_value(read_json(input)?)?;
    let mut out = Map::new();
    for (key, record) in codec.encode(&state) {
        if section.map_or(true, |s| s == key) {
            out.insert(key, record.to_value());
        }
    }
    if let Some(key) = section {
        if out.is_empty() {
            return Err(format!("template has no section '{key}'").into());
        }
    }
    print_json(&Value::Object(out))
}

fn show(template: &Path, args: &StoreArgs) -> CliResult {
    let cfg = editor_config(args);
    let store = build_store_from_config(&cfg.store_config())?;
    let codec = PageCodec::from_config(load_template(template)?.template, &cfg);
    let session = EditorSession::open(store, codec)?;
    print_json(&serde_json::to_value(session.state())?)
}

fn save(template: &Path, input: &Path, section: Option<&str>, args: &StoreArgs) -> CliResult {
    let cfg = editor_config(args);
    let store = build_store_from_config(&cfg.store_config())?;
    let codec = PageCodec::from_config(load_template(template)?.template, &cfg);
    let state: PageState = serde_json::from_value(read_json(input)?)?;

    let mut written = Vec::new();
    let mut failure = None;
    for (key, record) in codec.encode(&state) {
        if section.is_some_and(|s| s != key) {
            continue;
        }
        // One section at a time; stop at the first failure.
        match store.set(codec.page_key(), &key, &record) {
            Ok(()) => written.push(Value::String(key)),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    tracing::info!(page = %codec.page_key(), written = written.len(), failed = failure.is_some(), "save finished");
    let response = match failure {
        None => StoreResponse::ok(Some(Value::Array(written))),
        Some(e) => StoreResponse::failed(e.to_string()),
    };
    print_json(&serde_json::to_value(&response)?)?;
    response.into_result()?;
    Ok(())
}
