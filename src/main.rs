#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod battery;
mod cli;
mod core;
mod error;
mod loader;
mod market;
mod prelude;
mod quantity;
mod report;
mod tables;

use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command, inspect, optimise},
    prelude::*,
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Optimise(args) => optimise(&args),
        Command::Inspect(args) => inspect(&args),
    }
}
