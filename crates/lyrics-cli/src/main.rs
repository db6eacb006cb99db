use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lyrics_acquire::credentials::{AuthPlacement, Credentials};
use lyrics_acquire::{azlyrics, genius, genius_page, http};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lyrics")]
#[command(about = "Lyrics acquisition, catalogue cleanup, and emotion analysis tool")]
#[command(version)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(clap::Args)]
struct GeniusArgs {
    /// Directory containing *.id credential files
    #[arg(short, long, default_value = ".")]
    credentials_dir: PathBuf,

    /// Credential name (file stem) holding the API token
    #[arg(long, default_value = genius::DEFAULT_CREDENTIAL)]
    credential: String,

    /// Send the token as an Authorization header instead of a query parameter
    #[arg(long)]
    auth_header: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Genius and list the matching artists
    Search {
        /// Search text, usually an artist name
        query: String,

        #[command(flatten)]
        genius: GeniusArgs,
    },

    /// Show an artist's details from Genius as JSON
    Artist {
        /// Genius artist ID (e.g., 24580)
        artist_id: u64,

        #[command(flatten)]
        genius: GeniusArgs,
    },

    /// Fetch an artist's full song list from Genius into a CSV
    Songs {
        /// Genius artist ID (e.g., 24580)
        #[arg(short, long)]
        artist_id: u64,

        /// Songs per API page (max 50)
        #[arg(long, default_value_t = genius::MAX_PER_PAGE)]
        per_page: u32,

        /// Seconds to wait between API pages
        #[arg(long, default_value_t = 0.5)]
        page_delay: f64,

        /// Output CSV path
        #[arg(short, long, default_value = "artist_songs.csv")]
        output: PathBuf,

        #[command(flatten)]
        genius: GeniusArgs,
    },

    /// Filter a songs CSV by primary artist and title keywords
    Clean {
        /// Input songs CSV
        #[arg(short, long, default_value = "artist_songs.csv")]
        input: PathBuf,

        /// Output songs CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Keep only songs whose primary artist is exactly this name
        #[arg(short, long)]
        artist: Option<String>,

        /// Regex matched against lowercased titles; matching songs are dropped ("" keeps all)
        #[arg(short, long, default_value = lyrics_catalog::filter::DEFAULT_EXCLUDE)]
        exclude: String,
    },

    /// Scrape lyrics pages
    Scrape {
        #[command(subcommand)]
        source: ScrapeSource,
    },

    /// Classify every lyric line of a corpus by emotion
    Analyze {
        /// Corpus directory (one directory per album, one .txt per song)
        #[arg(short = 'C', long, default_value = "data/lyrics")]
        corpus: PathBuf,

        /// Directory containing *.id credential files
        #[arg(short, long, default_value = ".")]
        credentials_dir: PathBuf,

        /// Credential name (file stem) holding the inference API token
        #[arg(long, default_value = lyrics_analyze::classifier::DEFAULT_CREDENTIAL)]
        credential: String,

        /// Text classification endpoint
        #[arg(long, default_value = lyrics_analyze::classifier::DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Predictions kept per line
        #[arg(long, default_value_t = lyrics_analyze::classifier::DEFAULT_TOP_K)]
        top_k: usize,

        /// Lines sent per request
        #[arg(long, default_value_t = lyrics_analyze::classifier::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Render one song of an album analysis as an HTML page
    Render {
        /// Album analysis JSON written by `analyze`
        #[arg(short, long)]
        input: PathBuf,

        /// Song name (file stem); lists the available songs when omitted
        #[arg(short, long)]
        song: Option<String>,

        /// Output HTML path
        #[arg(short, long, default_value = "lyrics.html")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum ScrapeSource {
    /// Genius song pages listed in a songs CSV
    Genius {
        /// Songs CSV (title,url,primary_artist)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the lyrics files
        #[arg(short = 'O', long, default_value = "data/lyrics")]
        output_dir: PathBuf,

        /// Seconds to wait between requests
        #[arg(long, default_value_t = 1.0)]
        delay: f64,

        /// Stop at the first failed request
        #[arg(long)]
        stop_on_error: bool,
    },

    /// Every album of an AZLyrics artist page
    Azlyrics {
        /// Artist page URL (e.g., https://www.azlyrics.com/c/caparezza.html)
        #[arg(short, long)]
        url: String,

        /// Directory for album folders
        #[arg(short = 'O', long, default_value = "data/lyrics")]
        output_dir: PathBuf,

        /// Seconds to wait between songs
        #[arg(long, default_value_t = 10.0)]
        song_delay: f64,

        /// Seconds to wait between albums
        #[arg(long, default_value_t = 10.0)]
        album_delay: f64,

        /// Skip songs already saved by an earlier run
        #[arg(long)]
        resume: bool,
    },
}

fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("Invalid delay: {value}"))
}

fn genius_client(args: &GeniusArgs, http: reqwest::Client) -> Result<genius::GeniusClient> {
    let credentials = Credentials::load(&args.credentials_dir)?;
    let placement = if args.auth_header {
        AuthPlacement::Header
    } else {
        AuthPlacement::QueryParam
    };
    Ok(genius::GeniusClient::new(http, credentials).with_credential(&args.credential, placement))
}

fn render(input: &Path, song: Option<&str>, output: &Path) -> Result<()> {
    let rows = lyrics_analyze::read_analysis(input)?;
    let names = lyrics_analyze::render::song_names(&rows);

    let Some(song) = song else {
        for name in &names {
            println!("{name}");
        }
        return Ok(());
    };
    anyhow::ensure!(
        names.contains(&song),
        "No song '{song}' in {}",
        input.display()
    );

    let html = lyrics_analyze::render::render_song_html(&rows, song);
    std::fs::write(output, html)?;
    tracing::info!(song = %song, path = %output.display(), "Wrote lyrics page");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    let client = http::build_client(Duration::from_secs(cli.timeout))?;

    match cli.command {
        Commands::Search { query, genius } => {
            tracing::info!(query = %query, "Searching Genius");
            let artists = genius_client(&genius, client)?.search(&query).await?;
            if artists.is_empty() {
                tracing::warn!("No artists found");
            }
            for artist in &artists {
                println!("{}\t{}\t{}", artist.id, artist.name, artist.url);
            }
        }
        Commands::Artist { artist_id, genius } => {
            tracing::info!(artist_id, "Fetching artist");
            let artist = genius_client(&genius, client)?.artist(artist_id).await?;
            println!("{}", serde_json::to_string_pretty(&artist)?);
        }
        Commands::Songs {
            artist_id,
            per_page,
            page_delay,
            output,
            genius,
        } => {
            tracing::info!(artist_id, output = %output.display(), "Fetching all songs");
            let client = genius_client(&genius, client)?.with_page_delay(seconds(page_delay)?);
            let songs = genius::fetch_catalog(&client, artist_id, per_page, &output).await?;
            tracing::info!(songs = songs.len(), "Found songs");
        }
        Commands::Clean {
            input,
            output,
            artist,
            exclude,
        } => {
            tracing::info!(input = %input.display(), output = %output.display(), "Cleaning song list");
            let filter = lyrics_catalog::SongFilter::new(artist, Some(&exclude))?;
            lyrics_catalog::clean(&input, &output, &filter)?;
        }
        Commands::Scrape { source } => match source {
            ScrapeSource::Genius {
                input,
                output_dir,
                delay,
                stop_on_error,
            } => {
                let songs = lyrics_catalog::read_songs(&input)?;
                tracing::info!(songs = songs.len(), output_dir = %output_dir.display(), "Scraping Genius pages");
                let report = genius_page::scrape_catalog(
                    &client,
                    &songs,
                    &output_dir,
                    seconds(delay)?,
                    stop_on_error,
                )
                .await?;
                if report.failed > 0 {
                    tracing::warn!(failed = report.failed, "Some songs could not be scraped");
                }
            }
            ScrapeSource::Azlyrics {
                url,
                output_dir,
                song_delay,
                album_delay,
                resume,
            } => {
                let options = azlyrics::ScrapeOptions {
                    song_delay: seconds(song_delay)?,
                    album_delay: seconds(album_delay)?,
                    skip_existing: resume,
                };
                tracing::info!(url = %url, output_dir = %output_dir.display(), resume, "Scraping AZLyrics");
                azlyrics::scrape_artist(&client, &url, &output_dir, &options).await?;
            }
        },
        Commands::Analyze {
            corpus,
            credentials_dir,
            credential,
            endpoint,
            top_k,
            batch_size,
        } => {
            tracing::info!(corpus = %corpus.display(), endpoint = %endpoint, "Analyzing corpus");
            let credentials = Credentials::load(&credentials_dir)?;
            let classifier =
                lyrics_analyze::InferenceClassifier::from_credentials(client, &endpoint, &credentials, &credential)?
                    .with_top_k(top_k)
                    .with_batch_size(batch_size);
            let report = lyrics_analyze::analyze_corpus(&corpus, &classifier).await?;
            tracing::info!(
                written = report.albums_written,
                skipped = report.albums_skipped,
                lines = report.lines,
                "Analysis finished"
            );
        }
        Commands::Render { input, song, output } => {
            render(&input, song.as_deref(), &output)?;
        }
    }

    Ok(())
}
