use anyhow::{Context, Result};
use clap::Parser;
use pokedex::api::PokeApiClient;
use pokedex::catalog::{Catalog, Item};
use pokedex::config::Config;
use pokedex::detail::DetailEvent;
use pokedex::list::ListEvent;
use pokedex::util::strip_control_chars;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

mod app;
mod ui;

use app::App;

/// Get the config directory path (~/.config/pokedex/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("pokedex"))
}

#[derive(Parser, Debug)]
#[command(name = "pokedex", about = "Terminal Pokédex backed by PokeAPI")]
struct Args {
    /// Config file (default: ~/.config/pokedex/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the catalog service root
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the number of entries fetched per page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Print one entry and exit instead of starting the TUI
    #[arg(long, value_name = "NAME")]
    show: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of --show output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    config.validate().context("Invalid command-line override")?;

    let client = PokeApiClient::new(&config.base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;
    tracing::debug!(
        base_url = %client.base_url(),
        page_size = config.page_size,
        "Catalog client ready"
    );

    if let Some(name) = args.show {
        let item = client
            .fetch_detail(&name)
            .await
            .with_context(|| format!("Failed to look up '{}'", name))?;
        print!("{}", format_entry(&item));
        return Ok(());
    }

    let (list_tx, list_rx) = mpsc::channel::<ListEvent>(32);
    let (detail_tx, detail_rx) = mpsc::channel::<DetailEvent>(32);

    let mut app = App::new(Arc::new(client), config.page_size, list_tx, detail_tx);

    ui::run(&mut app, list_rx, detail_rx).await?;

    Ok(())
}

/// Plain-text rendering of an entry for `--show`.
///
/// Upstream text is stripped of control characters before it reaches the
/// terminal.
fn format_entry(item: &Item) -> String {
    let types: Vec<String> = item
        .type_names()
        .iter()
        .map(|t| strip_control_chars(t).into_owned())
        .collect();
    let mut out = format!(
        "#{:03} {}\nHeight: {:.1} m\nWeight: {:.1} kg\nTypes:  {}\n",
        item.id,
        strip_control_chars(&item.display_name()),
        item.height_m(),
        item.weight_kg(),
        types.join(", ")
    );
    for stat in &item.stats {
        out.push_str(&format!(
            "  {:<16} {:>3}\n",
            strip_control_chars(&stat.name),
            stat.base_stat
        ));
    }
    if let Some(url) = item.image_url() {
        out.push_str(&format!("Artwork: {}\n", strip_control_chars(url)));
    }
    out
}
