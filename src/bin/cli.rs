use anyhow::{bail, Context, Result};
use bookrec::algorithms::Pipeline;
use bookrec::services::data_source;
use bookrec::{init_tracing, Config};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the book pipeline once and print recommendations", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Book identifier to recommend from
    #[arg(long, conflicts_with_all = ["title", "random"])]
    isbn: Option<String>,

    /// Book title to recommend from
    #[arg(long, conflicts_with = "random")]
    title: Option<String>,

    /// Pick a random recommendable book
    #[arg(long)]
    random: bool,

    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Print the cleaning report as JSON
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing();

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, using default configuration");
        Config::default()
    };

    let source = data_source::from_config(&config)
        .await
        .context("failed to open data source")?;
    let raw = source.load_all().await.context("failed to load raw tables")?;

    let pipeline = Pipeline::from_config(&config);
    let output = tokio::task::spawn_blocking(move || pipeline.run(&raw)).await??;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&output.cleaning)?);
    }

    let model = &output.model;
    let book_id = match (args.isbn, args.title, args.random) {
        (Some(isbn), _, _) => isbn,
        (None, Some(title), _) => model.resolve_identifier_for_title(&title)?,
        (None, None, true) => model
            .random_item(&mut rand::thread_rng())
            .cloned()
            .context("similarity matrix is empty")?,
        (None, None, false) if args.report => return Ok(()),
        (None, None, false) => bail!("pass one of --isbn, --title or --random"),
    };

    let count = args.count.unwrap_or(config.recommendation.default_count);
    let selected = model
        .book_info(&book_id)
        .map(|info| info.title)
        .unwrap_or_else(|_| book_id.clone());
    println!("Recommendations for \"{}\" ({}):", selected, book_id);

    match model.recommend_with_metadata(&book_id, count) {
        Ok(items) => {
            for (rank, item) in items.iter().enumerate() {
                println!("{:>3}. {} [{}] {:.4}", rank + 1, item.title, item.book_id, item.score);
            }
        }
        Err(e) if e.is_recoverable() => eprintln!("{e}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
