//! FluxLib command-line client
//!
//! Drives the client state layer from a terminal: the session persists in
//! the configured state file between invocations.

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use fluxlib_client::{
    config::{AppConfig, LoggingConfig},
    interaction::{AutoConfirm, Confirmer, Prompt},
    models::user::Credentials,
    services::events::Event,
    views::{
        borrow_manage::{BorrowManageView, SortOrder},
        catalog::{category_label, CatalogView},
        chat::ChatView,
        comments::CommentsView,
        home::HomeView,
    },
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "fluxlib")]
#[command(about = "FluxLib library client", long_about = None)]
struct Cli {
    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and keep the session for later commands
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "FLUXLIB_PASSWORD")]
        password: String,
        /// Code granting temporary admin rights
        #[arg(long)]
        admin_code: Option<String>,
    },
    /// Drop the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Library announcements
    News,
    /// Browse the catalog
    Books {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 12)]
        size: u32,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Borrow a book
    Borrow {
        book_id: String,
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// List my borrow records
    Borrows,
    /// Return borrow records by id
    Return {
        #[arg(required = true)]
        borrow_ids: Vec<String>,
    },
    /// Show the comments of a book
    Comments { book_id: String },
    /// Ask the AI assistant
    Ask { question: String },
}

/// Confirmation through a y/N question on the terminal
struct TerminalConfirm;

#[async_trait]
impl Confirmer for TerminalConfirm {
    async fn confirm(&self, prompt: &Prompt) -> bool {
        println!("{}: {} [y/N]", prompt.title, prompt.message);
        let answer = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await;

        matches!(answer, Ok(Ok(line)) if line.trim().eq_ignore_ascii_case("y"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    let _guard = init_tracing(&config.logging)?;

    tracing::debug!("Starting FluxLib client v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(config).context("failed to initialize client state")?;
    let notices = spawn_notice_printer(&state);

    let result = run(&state, cli).await;

    // Dropping the last event bus handle ends the printer's stream
    drop(state);
    if let Err(e) = notices.await {
        tracing::warn!(error = %e, "notice printer stopped abnormally");
    }

    result
}

async fn run(state: &AppState, cli: Cli) -> anyhow::Result<()> {
    let services = &state.services;
    let confirmer: Box<dyn Confirmer> = if cli.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(TerminalConfirm)
    };

    match cli.command {
        Commands::Login {
            email,
            password,
            admin_code,
        } => {
            let credentials = Credentials {
                email,
                password,
                admin_code,
            };
            let profile = services.session.login(&credentials).await?;
            println!("Logged in as {} ({})", profile.email, profile.user_id);
        }
        Commands::Logout => {
            services.logout().await;
            println!("Logged out");
        }
        Commands::Whoami => match services.session.session().token().await {
            Some(_) => {
                let profile = services.session.session().profile().await;
                println!("{} <{}> role={}", profile.display_name, profile.email, profile.role);
            }
            None => println!("Not logged in"),
        },
        Commands::News => {
            let mut home = HomeView::new(services.gateway.clone(), services.events.clone());
            home.load().await?;
            for announcement in &home.announcements {
                println!("* {}\n  {}", announcement.title, announcement.content);
            }
        }
        Commands::Books {
            page,
            size,
            search,
            category,
        } => {
            let mut catalog = CatalogView::new(services.books.clone(), services.events.clone());
            catalog.page = page;
            catalog.page_size = size;
            catalog.load().await?;
            if let Some(category) = category {
                catalog.apply_category(&category);
            }
            if let Some(search) = search {
                catalog.apply_search(&search);
            }
            for book in catalog.visible() {
                println!(
                    "{:<12} {:<40} {:<24} {:<12} stock={} {}",
                    book.id,
                    book.title,
                    book.author,
                    category_label(&book.category),
                    book.stock,
                    book.status.label()
                );
            }
            println!("page {} / {} books", catalog.page, catalog.total);
        }
        Commands::Borrow { book_id, days } => {
            let borrow_id = services.books.borrow(&book_id, days).await?;
            match borrow_id {
                Some(id) => println!("Borrowed {} (record {})", book_id, id),
                None => println!("Borrowed {}", book_id),
            }
        }
        Commands::Borrows => {
            let mut view = BorrowManageView::new(services.borrows.clone(), services.events.clone());
            view.sort_by(SortOrder::Status).await;
            view.load().await?;
            for record in view.records().await {
                println!(
                    "{:<12} {:<40} {:?} due={}",
                    record.id,
                    record.book_title,
                    record.status,
                    record
                        .due_at()
                        .map(|due| due.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                );
            }
        }
        Commands::Return { borrow_ids } => {
            let mut view = BorrowManageView::new(services.borrows.clone(), services.events.clone());
            view.load().await?;
            view.set_selection(borrow_ids);
            let count = view.return_selected(confirmer.as_ref()).await?;
            println!("{} book(s) returned", count);
        }
        Commands::Comments { book_id } => {
            let mut view = CommentsView::new(book_id, services.gateway.clone(), services.events.clone());
            view.fetch().await?;
            for thread in &view.threads {
                print_thread(thread, 0);
            }
            println!("{} comment(s)", view.total_count());
        }
        Commands::Ask { question } => {
            let mut chat = ChatView::new(
                services.gateway.clone(),
                services.storage.clone(),
                state.config.chat.clone(),
            );
            chat.load().await;
            chat.ask(&question).await?;
            if let Some(reply) = chat.messages.last() {
                println!("{}", reply.content);
            }
        }
    }

    Ok(())
}

fn print_thread(thread: &fluxlib_client::models::CommentThread, depth: usize) {
    println!(
        "{}- {} ({} likes): {}",
        "  ".repeat(depth),
        thread.user_display_name,
        thread.likes,
        thread.content
    );
    for reply in &thread.replies {
        print_thread(reply, depth + 1);
    }
}

/// Print notices raised by the stores and the gateway
fn spawn_notice_printer(state: &AppState) -> tokio::task::JoinHandle<()> {
    let mut events = state.services.events.stream();
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(Event::Notice(notice)) if notice.is_error() => eprintln!("error: {}", notice),
                Ok(Event::Notice(notice)) => println!("{}", notice),
                Ok(other) => tracing::debug!(?other, "event"),
                Err(e) => tracing::warn!(error = %e, "notice printer lagged"),
            }
        }
    })
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fluxlib_client={},fluxlib={}", logging.level, logging.level).into());

    let console = match logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let (file, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "fluxlib.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}
