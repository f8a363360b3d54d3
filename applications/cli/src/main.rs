/// Moodify - photo-to-music companion
use anyhow::Context;
use clap::{Parser, Subcommand};
use moodify::{
    artwork::SourceArtworkLoader,
    config::MoodifyConfig,
    console::{self, ConsoleInput},
    devices::{FileCamera, HeadlessPlayer},
    Session, SessionConfig, SessionDeps,
};
use moodify_client::{AudioPayload, InferenceClient, InferredTrack};
use moodify_tint::{derive_theme, ArtworkSampler, ThemeInputProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "moodify")]
#[command(about = "Take a photo, hear your mood", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Run {
        /// Image file or directory the camera reads from
        #[arg(short, long)]
        photos: Option<PathBuf>,
    },
    /// Send one photo to the API and print the result
    Submit {
        /// Photo to upload
        photo: PathBuf,
    },
    /// Ask the API for a specific track
    Request {
        #[arg(short, long)]
        artist: String,
        #[arg(short, long)]
        title: String,
    },
    /// Print the theme derived from an artwork image
    Tint {
        /// Artwork image path
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "moodify=info,moodify_playback=info,moodify_tint=info,moodify_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = MoodifyConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Run { photos } => run(config, photos).await?,
        Commands::Submit { photo } => submit(&config, photo).await?,
        Commands::Request { artist, title } => request(&config, &artist, &title).await?,
        Commands::Tint { image } => tint(&config, image).await?,
    }

    Ok(())
}

async fn run(config: MoodifyConfig, photos: Option<PathBuf>) -> anyhow::Result<()> {
    let photos = photos
        .or_else(|| config.capture.photos.clone())
        .context("No photo source; pass --photos or set capture.photos")?;

    let client = InferenceClient::new(config.client_config())?;
    let (player_tx, player_rx) = mpsc::unbounded_channel();

    let deps = SessionDeps {
        camera: Arc::new(FileCamera::new(photos)),
        inference: Arc::new(client.clone()),
        player: Box::new(HeadlessPlayer::new(player_tx, config.fallback_duration())),
        player_events: player_rx,
        artwork: Arc::new(SourceArtworkLoader::new(client)),
        theme_inputs: Arc::new(config.theme_inputs()?),
    };
    let session_config = SessionConfig {
        playback: config.playback_config(),
        capture: config.capture_config(),
        tint: config.tint_config(),
        initial_track: config.initial_track(),
    };

    let (session, handle, mut notices) = Session::new(session_config, deps);
    let session_task = tokio::spawn(session.run());

    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            println!("{}", console::describe_notice(&notice));
        }
    });

    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match console::parse_line(&line) {
                    Ok(Some(ConsoleInput::Command(command))) => handle.send(command).await?,
                    Ok(Some(ConsoleInput::Status)) => {
                        let snapshot = handle.snapshot().await?;
                        println!("{}", console::describe_snapshot(&snapshot));
                    }
                    Ok(Some(ConsoleInput::Help)) => println!("{}", console::HELP),
                    Ok(Some(ConsoleInput::Quit)) => break,
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await?;
    session_task.await?;
    Ok(())
}

fn print_track(track: &InferredTrack) {
    println!("Title:  {}", track.metadata.title);
    if !track.metadata.artist.is_empty() {
        println!("Artist: {}", track.metadata.artist);
    }
    if !track.metadata.album.is_empty() {
        println!("Album:  {}", track.metadata.album);
    }
    if let Some(cover) = &track.metadata.cover {
        println!("Cover:  {cover}");
    }
    if let Some(mood) = &track.mood {
        println!("Mood:   {mood}");
    }
    match &track.audio {
        AudioPayload::Remote(url) => println!("Audio:  {url}"),
        AudioPayload::Stream { bytes, mime } => {
            println!("Audio:  {} bytes of {mime}", bytes.len());
        }
    }
}

async fn submit(config: &MoodifyConfig, photo: PathBuf) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&photo)
        .await
        .with_context(|| format!("Failed to read {}", photo.display()))?;

    let client = InferenceClient::new(config.client_config())?;
    let track = client.submit_photo(bytes.into()).await?;
    print_track(&track);
    Ok(())
}

async fn request(config: &MoodifyConfig, artist: &str, title: &str) -> anyhow::Result<()> {
    let client = InferenceClient::new(config.client_config())?;
    let track = client.request_track(artist, title).await?;
    print_track(&track);
    Ok(())
}

async fn tint(config: &MoodifyConfig, image: PathBuf) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;

    let inputs = config.theme_inputs()?;
    let sampler = ArtworkSampler::new(config.theme.sample_size, 1);
    let sample = sampler.sample(&image.display().to_string(), &bytes)?;
    let theme = derive_theme(sample, &inputs.layer_styles()?);

    println!("Average:      {} ({sample})", sample.to_hex());
    println!("Tint:         {}", theme.tint.to_hex());
    println!("Tint dark:    {}", theme.tint_dark.to_hex());
    println!("Text on tint: {}", theme.text_on_tint.to_hex());
    println!("Text dark:    {}", theme.text_dark.to_hex());
    Ok(())
}
