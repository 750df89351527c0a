//! # kardex CLI
//!
//! Command-line interface to the kardex template catalog. Runs against the
//! in-memory gateway seeded with the sample catalog, so every invocation
//! starts from the same data.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kardex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List templates under a category view with optional filters
    List {
        /// Category view: disease, type, or tag
        #[arg(long, default_value = "disease")]
        view: String,

        /// Category value inside the view ("all" for no narrowing)
        #[arg(long, default_value = "all")]
        category: String,

        /// Only favorites
        #[arg(long)]
        favorites: bool,

        /// Filter by diseases (comma separated)
        #[arg(long, value_delimiter = ',')]
        diseases: Vec<String>,

        /// Filter by template types (comma separated)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Filter by tags, any match keeps the template (comma separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Keyword, matched literally and by pinyin
        #[arg(long)]
        keyword: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Search templates by keyword (literal or pinyin)
    Search {
        /// Search keyword
        keyword: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show a single template in full
    Show {
        /// Template id
        id: String,

        /// Print in clipboard form, one "title：content" line per section
        #[arg(long)]
        text: bool,
    },

    /// Toggle a template's favorite flag
    Favorite {
        /// Template id
        id: String,
    },

    /// Show facet buckets with template counts
    Facets {
        /// Facet: disease, type, or tag
        #[arg(default_value = "disease")]
        kind: String,
    },

    /// Show cache statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let controller = commands::bootstrap().await?;

    match cli.command {
        Commands::List {
            view,
            category,
            favorites,
            diseases,
            types,
            tags,
            keyword,
            json,
        } => {
            let opts = commands::ListOptions {
                view,
                category,
                favorites,
                diseases,
                types,
                tags,
                keyword,
                json,
            };
            commands::list_templates(&controller, opts).await
        }
        Commands::Search { keyword, json } => {
            commands::search_templates(&controller, &keyword, json).await
        }
        Commands::Show { id, text } => commands::show_template(&controller, &id, text).await,
        Commands::Favorite { id } => commands::toggle_favorite(&controller, &id).await,
        Commands::Facets { kind } => commands::show_facets(&controller, &kind).await,
        Commands::Stats => commands::show_stats(&controller).await,
    }
}
