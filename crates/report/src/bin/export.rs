use std::fmt;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use progress_core::model::{CompanyId, ProgressFilterDraft};
use provider::{ProgressProvider, RemoteProvider, SyntheticProvider};
use report::export::{EXPORT_PAGE_SIZE, FileSink};
use report::{ExportDelivery, ExportService};

#[derive(Debug, Clone)]
struct Args {
    company: String,
    search: Option<String>,
    course: Option<String>,
    completed: Option<String>,
    out_dir: String,
    page_size: u32,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPageSize { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPageSize { raw } => write!(f, "invalid --page-size value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut company =
            std::env::var("PROGRESS_COMPANY").unwrap_or_else(|_| "meridian-works".into());
        let mut search: Option<String> = None;
        let mut course: Option<String> = None;
        let mut completed: Option<String> = None;
        let mut out_dir = std::env::var("PROGRESS_EXPORT_DIR").unwrap_or_else(|_| ".".into());
        let mut page_size = EXPORT_PAGE_SIZE;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--company" => {
                    company = require_value(&mut args, "--company")?;
                }
                "--search" => {
                    search = Some(require_value(&mut args, "--search")?);
                }
                "--course" => {
                    course = Some(require_value(&mut args, "--course")?);
                }
                "--completed" => {
                    completed = Some(require_value(&mut args, "--completed")?);
                }
                "--out" => {
                    out_dir = require_value(&mut args, "--out")?;
                }
                "--page-size" => {
                    let value = require_value(&mut args, "--page-size")?;
                    page_size = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidPageSize { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            company,
            search,
            course,
            completed,
            out_dir,
            page_size,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p report --bin export -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --company <slug>          Company to export (default: meridian-works)");
    eprintln!("  --search <text>           Filter rows by learner name or email");
    eprintln!("  --course <id>             Filter rows to one course ('all' clears)");
    eprintln!("  --completed <choice>      completed | in-progress | all");
    eprintln!("  --out <dir>               Output directory (default: .)");
    eprintln!("  --page-size <n>           Rows fetched per request (default: 100)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROGRESS_COMPANY, PROGRESS_EXPORT_DIR");
    eprintln!("  PROGRESS_API_URL, PROGRESS_API_TOKEN   Use the GraphQL backend");
    eprintln!("                                         instead of synthetic data");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let filter = ProgressFilterDraft {
        search_user: args.search.clone(),
        course_id: args.course.clone(),
        completed: args.completed.clone(),
        limit: None,
        offset: None,
    }
    .normalize();

    let provider: Arc<dyn ProgressProvider> = match RemoteProvider::from_env() {
        Some(remote) => Arc::new(remote),
        None => Arc::new(SyntheticProvider::new(CompanyId::new(args.company.clone()))),
    };

    let sink = Arc::new(FileSink::new(&args.out_dir));
    let service = ExportService::new(provider, sink).with_page_size(args.page_size);

    match service.export(&filter).await? {
        ExportDelivery::Delivered { filename, rows } => {
            println!("Exported {rows} rows to {}/{filename}", args.out_dir);
        }
        ExportDelivery::Canceled { downloaded } => {
            println!("Export canceled after {downloaded} rows; no file written");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
