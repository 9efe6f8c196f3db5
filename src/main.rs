mod common;
mod config;
mod error;
mod listings;
mod messaging;
mod network;
mod storage;
mod ui;

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use listings::ListingFilter;
use messaging::MessagingSession;
use network::{ApiClient, ApiWorker, Registration};
use storage::{IdentityProvider, SessionStore};
use tokio::sync::mpsc;
use ui::MessagesApp;

#[derive(Parser)]
#[command(
    name = "campus_chat",
    version,
    about = "Direct messaging client for the campus marketplace"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Backend base URL; beats both the config file and CAMPUS_API_URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
    /// Name to message as when nobody is signed in
    #[arg(long, value_name = "NAME")]
    guest: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session for the messaging window
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store its session
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        college: String,
    },
    /// Forget the stored session
    Logout,
    /// Browse marketplace listings, nine per page
    Listings {
        /// Match against title and description
        #[arg(long, default_value = "")]
        search: String,
        /// Only show these categories (repeatable)
        #[arg(long = "category", value_name = "NAME")]
        categories: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one listing in full
    Listing { id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config)
        .with_env_overrides(std::env::var(config::API_URL_ENV).ok());
    if let Some(url) = cli.api_url {
        app_config.api_base_url = url;
    }
    if cli.guest.is_some() {
        app_config.guest_username = cli.guest;
    }

    let identity_provider = Arc::new(IdentityProvider::open(SessionStore::new(
        &app_config.session_file,
    )));
    let client = ApiClient::new(&app_config.api_base_url, identity_provider.subscribe());

    match cli.command {
        Some(Command::Login { username, password }) => {
            let session = client.login(&username, &password).await?;
            identity_provider.sign_in(session)?;
            println!("Signed in as {username}");
        }
        Some(Command::Register {
            username,
            email,
            password,
            college,
        }) => {
            let registration = Registration {
                username,
                email,
                password,
                college,
            };
            let session = client.register(&registration).await?;
            identity_provider.sign_in(session)?;
            println!("Registered and signed in as {}", registration.username);
        }
        Some(Command::Logout) => {
            identity_provider.sign_out()?;
            println!("Signed out");
        }
        Some(Command::Listings {
            search,
            categories,
            page,
        }) => {
            let posts = client.posts().await?;
            let filter = ListingFilter { search, categories };
            let page = listings::browse(&posts, &filter, page);
            if page.items.is_empty() {
                println!("No posts found. Try adjusting your filters.");
            } else {
                for post in &page.items {
                    println!("{}", listings::summary_line(post));
                }
                println!(
                    "Page {} of {} ({} listings)",
                    page.page, page.total_pages, page.total_matches
                );
            }
        }
        Some(Command::Listing { id }) => match client.post(id).await? {
            Some(post) => println!("{}", listings::detail(&post)),
            None => println!("Post {id} not found. It doesn't exist or has been removed."),
        },
        None => run_messages_window(client, identity_provider, app_config.guest_username)?,
    }

    Ok(())
}

fn run_messages_window(
    client: ApiClient,
    identity_provider: Arc<IdentityProvider>,
    guest_username: Option<String>,
) -> Result<(), eframe::Error> {
    // View -> worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Worker -> view
    let (event_tx, event_rx) = mpsc::channel(100);

    let base_url = client.base_url().to_string();
    tokio::spawn(ApiWorker::new(Arc::new(client), event_tx, cmd_rx).run());

    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Campus Marketplace Messages",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("MessagesApp should only be initialized once");

            let mut session =
                MessagingSession::new(identity_provider.current_identity(), cmd_tx.clone());
            if let Some(name) = guest_username.as_deref() {
                session.set_guest_username(name);
            }
            log::info!("Messaging window opened against {base_url}");

            Ok(Box::new(MessagesApp::new(
                cc,
                session,
                event_receiver,
                Arc::clone(&identity_provider),
            )))
        }),
    )
}
