/// Lyra - headless music client
use clap::{Parser, Subcommand};
use lyra_cli::{App, LyraConfig, OutgoingMessage, PlayRequest};
use lyra_playback::LoopMode;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "Browse, play and chat against a seeded Lyra backend", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed fixture (overrides the configuration)
    #[arg(long, global = true, env = "LYRA_FIXTURE")]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an album with its author and tracks
    Album {
        /// Album id
        id: String,
    },
    /// Show an artist with listener count, albums and tracks
    Artist {
        /// User id of the artist
        id: String,
    },
    /// Play an album through the simulated output
    Play {
        /// Album id
        album: String,
        /// Track to start from
        #[arg(short, long)]
        start: Option<String>,
        /// Loop mode: off, all or one
        #[arg(short, long = "loop")]
        loop_mode: Option<LoopMode>,
        /// Number of tracks to play to the end
        #[arg(short, long, default_value_t = 0)]
        advance: usize,
    },
    /// Show a user's chats through the live synchronizer
    Chats {
        /// User id
        user: String,
        /// Send a message to this user first
        #[arg(long, requires = "text")]
        to: Option<String>,
        /// Message text
        #[arg(long)]
        text: Option<String>,
    },
    /// List moderation reports, newest first
    Reports,
    /// Sign in and show the session state
    Login {
        email: String,
        password: String,
    },
    /// Show or switch the saved theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = LyraConfig::load(cli.config.as_deref())?;
    if let Some(fixture) = cli.fixture {
        config.backend.fixture = Some(fixture);
    }
    config.validate()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app = App::new(config)?;
    tracing::debug!("Backend seeded");

    let report = match cli.command {
        Commands::Album { id } => app.album(&id).await?,
        Commands::Artist { id } => app.artist(&id).await?,
        Commands::Play {
            album,
            start,
            loop_mode,
            advance,
        } => {
            app.play(PlayRequest {
                album,
                start,
                loop_mode,
                advance,
            })
            .await?
        }
        Commands::Chats { user, to, text } => {
            let outgoing = to.zip(text).map(|(to, text)| OutgoingMessage { to, text });
            app.chats(&user, outgoing).await?
        }
        Commands::Reports => app.reports().await?,
        Commands::Login { email, password } => app.login(&email, &password).await?,
        Commands::Theme { toggle } => app.theme(toggle)?,
    };

    print!("{report}");
    Ok(())
}
