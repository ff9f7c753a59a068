use anyhow::Result;
use clap::{Parser, Subcommand};

use bookdex::backend::{BackendKind, select_backend};
use bookdex::cache::{BrowseCache, DEFAULT_CATEGORIES};
use bookdex::config::CONFIG;
use bookdex::context::AppContext;
use bookdex::cover::cover_candidates;
use bookdex::dispatcher::QueryDispatcher;
use bookdex::models::{Book, SearchQuery, page_count};

#[derive(Parser)]
#[command(name = "bookdex", about = "Search a remote book catalog from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the catalog by structured fields and/or free text
    Search {
        /// Free-text query term
        term: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        publisher: Option<String>,
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        extension: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Also print content-network download links
        #[arg(long)]
        links: bool,
    },
    /// Browse a category tab, optionally loading further pages
    Browse {
        /// Category label; omit to prefetch the default tab set
        category: Option<String>,
        /// Number of additional "load more" pages after the first
        #[arg(long, default_value_t = 0)]
        more: usize,
    },
    /// Print the content-network gateways in use
    Gateways,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let kind: BackendKind = CONFIG.backend.parse()?;
    let backend = select_backend(kind)?;

    match cli.command {
        Command::Search {
            term,
            title,
            author,
            publisher,
            isbn,
            language,
            extension,
            limit,
            offset,
            links,
        } => {
            let query = SearchQuery {
                query: term,
                title,
                author,
                publisher,
                isbn,
                language,
                extension,
                limit,
                offset,
                ..Default::default()
            };
            let results = backend.search(&query).await?;
            let ctx = if links {
                Some(AppContext::init(&reqwest::Client::new(), &CONFIG.gateways_url).await)
            } else {
                None
            };
            for book in &results.books {
                print_book(book);
                if let Some(ctx) = &ctx {
                    for link in ctx.download_links(book) {
                        println!("      {link}");
                    }
                }
            }
            println!(
                "total: {} ({} pages of {})",
                results.total,
                page_count(results.total, limit.max(1)),
                limit.max(1)
            );
        }
        Command::Browse { category, more } => {
            let dispatcher = QueryDispatcher::new(backend);
            let cache = BrowseCache::new(dispatcher, CONFIG.page_size, CONFIG.shuffle_first_page);
            match category {
                None => {
                    let loaded = cache.prefetch(DEFAULT_CATEGORIES.iter().copied()).await;
                    for category in DEFAULT_CATEGORIES {
                        println!(
                            "{category}: {} of {} records",
                            cache.len(category),
                            cache.total(category).unwrap_or(0)
                        );
                    }
                    println!(
                        "prefetched {loaded} records across {} tabs",
                        DEFAULT_CATEGORIES.len()
                    );
                }
                Some(category) => {
                    cache.activate(&category).await;
                    for _ in 0..more {
                        if cache.load_more(&category).await == 0 {
                            break;
                        }
                    }
                    if let Some(books) = cache.snapshot(&category) {
                        for book in &books {
                            print_book(book);
                        }
                        println!(
                            "{category}: {} of {} records loaded ({} pages)",
                            books.len(),
                            cache.total(&category).unwrap_or(0),
                            cache.page_count(&category)
                        );
                    } else {
                        println!("{category}: no results");
                    }
                }
            }
        }
        Command::Gateways => {
            let ctx = AppContext::init(&reqwest::Client::new(), &CONFIG.gateways_url).await;
            for gateway in ctx.gateways() {
                println!("{gateway}");
            }
        }
    }
    Ok(())
}

fn print_book(book: &Book) {
    let year = book.year.map(|y| format!(" ({y})")).unwrap_or_default();
    let publisher = book
        .publisher
        .as_deref()
        .map(|p| format!(" - {p}"))
        .unwrap_or_default();
    println!(
        "{:>8}  {} - {}{publisher}{year} [{}] {}",
        book.id,
        book.title,
        book.author,
        book.extension,
        book.human_filesize()
    );
    let cover = cover_candidates(book, &CONFIG.cover_base_url, &CONFIG.md5_cover_base_url);
    tracing::debug!(book = book.id, cover = ?cover, "cover candidates");
}
