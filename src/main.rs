//! `bilingual` 命令行入口
//!
//! 把带翻译标记的 HTML 渲染为可切换的双语文档，并管理磁盘上的翻译快照。

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bilingual::env::{self, EnvVar};
use bilingual::translation::routes::TranslationMap;
use bilingual::{BilingualConfig, BilingualEngine, BilingualError, BilingualResult};
use bilingual::{DefaultView, SingleElementMode};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    fn as_str(self) -> &'static str {
        match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliView {
    Translation,
    Original,
}

impl From<CliView> for DefaultView {
    fn from(view: CliView) -> Self {
        match view {
            CliView::Translation => DefaultView::Translation,
            CliView::Original => DefaultView::Original,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Reconstruct,
    CloneReplace,
}

impl From<CliMode> for SingleElementMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Reconstruct => SingleElementMode::Reconstruct,
            CliMode::CloneReplace => SingleElementMode::CloneReplace,
        }
    }
}

/// Render toggleable bilingual blocks into HTML documents
#[derive(Parser, Debug)]
#[command(name = "bilingual", version, about, after_long_help = env::generate_env_docs())]
struct Cli {
    /// Configuration file (TOML, or JSON when the name ends with .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot database path
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render marked blocks of an HTML document
    Render(RenderArgs),

    /// Print all stored translation data as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all stored translation data with the contents of a JSON file
    Import {
        /// JSON file, `-` for stdin
        input: PathBuf,
    },

    /// List stored routes
    Routes,

    /// Remove the translation data of one route
    Remove {
        /// Route, e.g. /docs/ or /docs/index.html
        route: String,
    },

    /// Remove all stored translation data
    Clear,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input HTML file, `-` for stdin
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Route translation table (JSON); without it the stored snapshot is used
    #[arg(short, long)]
    translations: Option<PathBuf>,

    /// Common text translations (JSON object of text -> translation)
    #[arg(long)]
    common: Option<PathBuf>,

    /// Route of the document, e.g. /docs/index.html
    #[arg(short, long, conflicts_with = "url")]
    route: Option<String>,

    /// Page URL the route is derived from
    #[arg(short, long)]
    url: Option<String>,

    /// Initially visible view
    #[arg(long, value_enum)]
    default_view: Option<CliView>,

    /// How single non-heading elements are rendered
    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    /// Do not inject the toggle stylesheet and script
    #[arg(long)]
    no_assets: bool,

    /// Skip common text replacement
    #[arg(long)]
    no_common: bool,
}

fn init_logging(cli_level: Option<CliLogLevel>) {
    let level = match cli_level {
        Some(level) => level.as_str().to_string(),
        None => env::core::LogLevel::get().unwrap_or_else(|e| {
            eprintln!("{}", e);
            "info".to_string()
        }),
    };
    let no_color = env::core::NoColor::get().unwrap_or(false);
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> BilingualResult<BilingualConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = BilingualConfig::load_from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => BilingualConfig::load()?,
    };

    if let Some(storage) = &cli.storage {
        config.storage_path = storage.clone();
    }

    config.validate()?;
    Ok(config)
}

fn read_input(path: &Path) -> BilingualResult<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path)
            .map_err(|e| BilingualError::IoError(format!("{}: {}", path.display(), e)))
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> BilingualResult<()> {
    match path {
        Some(path) => fs::write(path, data)
            .map_err(|e| BilingualError::IoError(format!("{}: {}", path.display(), e))),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn failed(operation: &str) -> BilingualError {
    BilingualError::StorageError(format!("{}失败", operation))
}

fn render(mut config: BilingualConfig, args: &RenderArgs) -> BilingualResult<()> {
    if let Some(view) = args.default_view {
        config.default_view = view.into();
    }
    if let Some(mode) = args.mode {
        config.single_element_mode = mode.into();
    }
    if args.no_assets {
        config.inject_assets = false;
    }
    if args.no_common {
        config.process_common = false;
    }

    let mut engine = match &args.translations {
        Some(path) => {
            let mut engine = BilingualEngine::in_memory(config)?;
            let json = String::from_utf8_lossy(&read_input(path)?).to_string();
            if !engine.import_all_data(&json) {
                return Err(BilingualError::ParseError(format!(
                    "无法读取翻译数据: {}",
                    path.display()
                )));
            }
            engine
        }
        None => BilingualEngine::open(config)?,
    };

    if let Some(common) = &args.common {
        let entries: TranslationMap = serde_json::from_slice(&read_input(common)?)?;
        engine.set_common_translations(entries);
    }

    match (&args.route, &args.url) {
        (Some(route), _) => engine.set_route(route),
        (None, Some(url)) => engine.set_route_from_url(url)?,
        (None, None) => {}
    }

    let input = read_input(&args.input)?;
    let (output, report) = engine.process_html_with_report(&input)?;
    write_output(args.output.as_deref(), &output)?;

    if !report.completed {
        return Err(BilingualError::DomError("文档只处理了一部分".to_string()));
    }
    Ok(())
}

fn run(cli: &Cli) -> BilingualResult<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Render(args) => render(config, args),
        Commands::Export { output } => {
            let engine = BilingualEngine::open(config)?;
            let mut json = engine.export_all_data()?;
            json.push('\n');
            write_output(output.as_deref(), json.as_bytes())
        }
        Commands::Import { input } => {
            let mut engine = BilingualEngine::open(config)?;
            let json = String::from_utf8_lossy(&read_input(input)?).to_string();
            if engine.import_all_data(&json) {
                tracing::info!("已导入 {} 个路由", engine.stored_routes().len());
                Ok(())
            } else {
                Err(failed("导入翻译数据"))
            }
        }
        Commands::Routes => {
            let engine = BilingualEngine::open(config)?;
            let mut listing = String::new();
            for route in engine.stored_routes() {
                listing.push_str(&route);
                listing.push('\n');
            }
            write_output(None, listing.as_bytes())
        }
        Commands::Remove { route } => {
            let mut engine = BilingualEngine::open(config)?;
            if engine.remove_route_data(route) {
                Ok(())
            } else {
                Err(failed("删除路由数据"))
            }
        }
        Commands::Clear => {
            let mut engine = BilingualEngine::open(config)?;
            if engine.clear_all_data() {
                Ok(())
            } else {
                Err(failed("清除翻译数据"))
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
