mod cli;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use course_grader::grading::RngSource;
use course_grader::page::Page;
use course_grader::state;

/// An interactive grader for course pages
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct AppArgs {
    /// The root of the course, a course.config (json) file should be located here.
    #[arg(name = "ROOT")]
    root: String,
    /// Seed for shuffling choices, to get the same page every run.
    #[arg(long = "seed")]
    seed: Option<u64>,
    /// Log as json lines instead of plain text.
    #[arg(long = "log-json")]
    log_json: bool,
}

fn init_logging(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn init(args: &AppArgs) -> Result<(std::path::PathBuf, Page), String> {
    let (root, config) = state::get_config(&args.root)?;
    let page = match args.seed {
        Some(seed) => config.build_page(&mut RngSource(StdRng::seed_from_u64(seed))),
        None => config.build_page(&mut RngSource(rand::rng())),
    };
    page.map(|page| (root, page))
        .map_err(|e| format!("Invalid course.config: {}\n", e))
}

#[tokio::main]
async fn main() {
    let args = AppArgs::parse();
    init_logging(args.log_json);

    match init(&args) {
        Ok((root, page)) => {
            println!("Starting course grader in: {:?}", root);
            println!("Page: {} ({} questions)", page.title(), page.questions().len());

            let state = state::create_course_state(root, page);
            cli::start(state).await;
        },
        Err(e) => {
            println!("{}", e);
        }
    };
}
