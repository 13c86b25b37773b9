//! Stacks - P2P academic library node

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stacks_core::{Resource, ResourceType};
use stacks_index::{SearchFilters, SortKey, SortOrder};
use stacks_node::config::{expand_path, Config};
use stacks_node::{seed, Node};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stacks")]
#[command(about = "Reputation-driven academic resource sharing", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "~/.stacks/config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalogue
    Search {
        /// Free-text query (matches title, filename, subject)
        #[arg(default_value = "")]
        query: String,

        /// Only resources in this subject
        #[arg(long)]
        subject: Option<String>,

        /// Only resources of this type (pdf, document, presentation, spreadsheet, other)
        #[arg(long = "type")]
        resource_type: Option<ResourceType>,

        /// Minimum average rating
        #[arg(long, default_value = "0")]
        min_rating: f64,

        /// Required tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Sort key: relevance, rating, or downloads
        #[arg(long, default_value = "relevance")]
        sort_by: String,

        /// Sort order: asc or desc
        #[arg(long, default_value = "asc")]
        order: String,

        /// Page number (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Results per page (0 uses the configured default)
        #[arg(long, default_value = "0")]
        page_size: usize,
    },

    /// List resources in a subject
    Subject {
        #[arg(required = true)]
        subject: String,
    },

    /// List resources carrying a tag
    Tag {
        #[arg(required = true)]
        tag: String,
    },

    /// Suggest titles and subjects for a partial query
    Suggest {
        #[arg(required = true)]
        partial: String,
    },

    /// Show network-wide reputation statistics
    Stats,

    /// Recalculate every account's reputation
    Recalc,

    /// Show accounts with the highest reputation
    Leaderboard {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show reputation details for an account
    Reputation {
        #[arg(required = true)]
        username: String,
    },

    /// Most downloaded resources
    Popular {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Most recently added resources
    Recent {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Highest rated resources
    TopRated {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show catalogue statistics
    LibraryStats,

    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::load_or_default(&expand_path(&cli.config))?;
    let node = Node::new(&config);
    seed::seed_demo(&node)?;

    run(&node, cli).await
}

async fn run(node: &Node, cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Search {
            query,
            subject,
            resource_type,
            min_rating,
            tags,
            sort_by,
            order,
            page,
            page_size,
        } => {
            let filters = SearchFilters {
                subject,
                resource_type,
                min_rating,
                tags,
                sort_by: sort_by.parse::<SortKey>()?,
                sort_order: order.parse::<SortOrder>()?,
                page,
                page_size,
            };
            let results = node.search.search(&query, &filters)?;
            emit(json, &results, || {
                if results.results.is_empty() {
                    println!("No results found for '{}'", results.query);
                    return;
                }
                println!(
                    "Showing {} of {} results (page {}, {} per page):",
                    results.results.len(),
                    results.total_count,
                    results.page,
                    results.page_size
                );
                println!();
                for (i, result) in results.results.iter().enumerate() {
                    let n = (results.page - 1) * results.page_size + i + 1;
                    print_resource(n, &result.resource);
                    println!("   Relevance: {:.2}", result.relevance);
                    println!("   Peers: {}", result.available_peers);
                    println!();
                }
            })?;
        }
        Commands::Subject { subject } => {
            let resources = node.search.search_by_subject(&subject)?;
            emit(json, &resources, || print_resources(&resources))?;
        }
        Commands::Tag { tag } => {
            let resources = node.search.search_by_tag(&tag)?;
            emit(json, &resources, || print_resources(&resources))?;
        }
        Commands::Suggest { partial } => {
            let suggestions = node.search.suggestions(&partial)?;
            emit(json, &suggestions, || {
                for s in &suggestions {
                    println!("{}", s);
                }
            })?;
        }
        Commands::Stats => {
            let stats = node.reputation.network_stats()?;
            emit(json, &stats, || {
                println!("Accounts: {}", stats.total_users);
                println!("  Contributors: {}", stats.contributors);
                println!("  Neutral:      {}", stats.neutral);
                println!("  Leechers:     {}", stats.leechers);
                println!("Average score: {:.2}", stats.average_score);
            })?;
        }
        Commands::Recalc => {
            let report = node.reputation.recalculate_all()?;
            emit(json, &report, || {
                println!(
                    "Recalculated {} account(s), {} skipped",
                    report.updated(),
                    report.skipped()
                );
            })?;
        }
        Commands::Leaderboard { limit } => {
            let accounts = node.reputation.leaderboard(limit)?;
            emit(json, &accounts, || {
                for (i, account) in accounts.iter().enumerate() {
                    println!(
                        "{}. {} - {} ({})",
                        i + 1,
                        account.username,
                        account.score,
                        account.tier
                    );
                }
            })?;
        }
        Commands::Reputation { username } => {
            let account = node.accounts.get_account_by_username(&username)?;
            let info = node.reputation.reputation_info(&account.id)?;
            emit(json, &info, || {
                println!("{} ({})", account.username, info.account_id);
                println!("Score: {} ({})", info.score, info.tier);
                println!("Uploads: {}", info.uploads);
                println!("Downloads: {}", info.downloads);
                println!("Average rating: {:.2}", info.average_rating);
                println!("Speed: {:.0}%", info.throttle * 100.0);
            })?;
        }
        Commands::Popular { limit } => {
            let resources = node.library.popular(limit)?;
            emit(json, &resources, || print_resources(&resources))?;
        }
        Commands::Recent { limit } => {
            let resources = node.library.recent(limit)?;
            emit(json, &resources, || print_resources(&resources))?;
        }
        Commands::TopRated { limit } => {
            let resources = node.library.top_rated(limit)?;
            emit(json, &resources, || print_resources(&resources))?;
        }
        Commands::LibraryStats => {
            let stats = node.library.statistics()?;
            emit(json, &stats, || {
                println!("Resources: {}", stats.total_resources);
                println!("Downloads: {}", stats.total_downloads);
                println!("Ratings: {}", stats.total_ratings);
                println!("By subject:");
                for (subject, count) in &stats.by_subject {
                    println!("  {}: {}", subject, count);
                }
                println!("By type:");
                for (resource_type, count) in &stats.by_type {
                    println!("  {}: {}", resource_type, count);
                }
            })?;
        }
        Commands::Init => init_config(&cli.config).await?,
    }

    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}

fn print_resources(resources: &[Resource]) {
    if resources.is_empty() {
        println!("Nothing found");
    }
    for (i, resource) in resources.iter().enumerate() {
        print_resource(i + 1, resource);
    }
}

fn print_resource(n: usize, resource: &Resource) {
    println!(
        "{}. {} [{}] ({}, {})",
        n, resource.title, resource.subject, resource.filename, resource.resource_type
    );
    println!(
        "   Rating: {:.2} ({} ratings), {} downloads",
        resource.average_rating, resource.total_ratings, resource.download_count
    );
    if !resource.tags.is_empty() {
        println!("   Tags: {}", resource.tags.join(", "));
    }
}

async fn init_config(path: &str) -> Result<()> {
    let config_path = expand_path(path);

    if Config::write_default(&config_path).await? {
        println!("Initialized Stacks config at: {}", config_path.display());
    } else {
        println!("Config already exists at: {}", config_path.display());
    }

    Ok(())
}
