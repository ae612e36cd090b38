// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use movietime::application::commands::*;
use movietime::application::{AppState, ErrorResponse};
use movietime::config::AppConfig;
use movietime::domain::ListCategory;
use movietime::integrations::InMemoryRemoteStore;

#[derive(Parser)]
#[command(name = "movietime", about = "Browse movies, find showtimes and keep watch lists")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a curated category (now-playing, popular, top-rated, upcoming)
    Browse { category: ListCategory },
    /// Search movies by title
    Search { title: String },
    /// Movie, credits, trailer and similar titles
    Details { movie_id: i64 },
    /// Screenings of a movie near a city
    Showtimes {
        title: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        country: String,
    },
    /// Show the lists saved for offline viewing
    Offline {
        /// Delete the saved lists instead
        #[arg(long)]
        clear: bool,
    },
    /// Run a scripted session against an in-process store and save the lists offline
    Session {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        username: String,
        /// Watched movie as ID or ID:SCORE, repeatable
        #[arg(long, value_parser = parse_watched)]
        watched: Vec<(i64, Option<u8>)>,
        /// Movie ID to watch later, repeatable
        #[arg(long)]
        to_watch: Vec<i64>,
        #[arg(long)]
        private: bool,
    },
    /// Print the e-mail used by the last session
    LastEmail,
}

fn parse_watched(raw: &str) -> Result<(i64, Option<u8>), String> {
    let (id, score) = match raw.split_once(':') {
        Some((id, score)) => (id, Some(score)),
        None => (raw, None),
    };
    let id = id.parse().map_err(|_| format!("invalid movie id: {}", id))?;
    let score = score
        .map(|score| score.parse().map_err(|_| format!("invalid review score: {}", score)))
        .transpose()?;
    Ok((id, score))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a command outcome; an error response becomes the process error
fn report<T: Serialize>(outcome: Result<T, ErrorResponse>) -> Result<()> {
    match outcome {
        Ok(value) => print_json(&value),
        Err(response) => {
            eprintln!("{}", serde_json::to_string_pretty(&response)?);
            anyhow::bail!(response.message)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let store = Arc::new(InMemoryRemoteStore::new());
    let state = AppState::new(config, store).context("initializing application state")?;

    match cli.command {
        Command::Browse { category } => report(browse_movies(&state, category).await),
        Command::Search { title } => report(search_movies(&state, &title).await),
        Command::Details { movie_id } => report(get_movie_details(&state, movie_id).await),
        Command::Showtimes { title, city, country } => {
            report(find_showtimes(&state, &title, &city, &country).await)
        }
        Command::Offline { clear: true } => report(clear_offline_lists(&state)),
        Command::Offline { clear: false } => report(get_offline_lists(&state)),
        Command::Session {
            email,
            password,
            username,
            watched,
            to_watch,
            private,
        } => {
            let script = SessionScript {
                email,
                password,
                username,
                watched,
                to_watch,
                make_private: private,
            };
            report(run_session_script(&state, &script).await)?;
            sign_out(&state)
                .await
                .map_err(|response| anyhow::anyhow!(response.message))
        }
        Command::LastEmail => report(last_email(&state)),
    }
}
