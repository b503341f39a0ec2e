use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod bookmarks;
mod catalog;
mod cli;
mod config;
mod eid;
mod semantic;
mod storage;
#[cfg(test)]
mod tests;
mod web;

use app::{BrowseResponse, ToolHub};
use bookmarks::BookmarkSet;
use config::Config;

const NO_RESULTS_NOTICE: &str = "No tools found matching your query. Try a different search term.";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolhub=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::Args::parse();

    let base_path = config::base_path()?;
    let config = Config::load_with(&base_path)?;

    let hub = ToolHub::from_config(&config).with_context(|| {
        format!(
            "failed to load tool catalog from {}",
            config.resolved_catalog_path().display()
        )
    })?;

    match args.command {
        cli::Command::Categories {} => {
            for category in hub.category_options() {
                println!("{category}");
            }
            Ok(())
        }

        cli::Command::Search {
            query,
            category,
            json,
        } => {
            hub.initialize()
                .context("failed to load the embedding model")?;

            // one-shot search: a fresh session with nothing saved
            let bookmarks = BookmarkSet::new();
            let response = hub.browse(query.as_deref(), &category, &bookmarks)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_cards(&response);
            }
            Ok(())
        }

        cli::Command::Serve { listen } => {
            hub.initialize()
                .context("failed to load the embedding model")?;

            let listen = listen.unwrap_or_else(|| config.web.listen.clone());
            web::start_daemon(hub, &listen, config.web.session_ttl())
        }
    }
}

fn print_cards(response: &BrowseResponse) {
    if response.no_results {
        println!("{NO_RESULTS_NOTICE}");
        return;
    }

    for card in &response.cards {
        match card.similarity {
            Some(similarity) => println!("#{} {} ({similarity:.3})", card.id, card.name),
            None => println!("#{} {}", card.id, card.name),
        }
        if let Some(category) = &card.category {
            println!("  {category}");
        }
        if !card.description.is_empty() {
            println!("  {}", card.description);
        }
        println!("  {}", card.url);
        println!();
    }

    println!("{} tools", response.cards.len());
}
