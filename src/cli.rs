mod input;
mod inspect;
mod optimise;

use clap::{Parser, Subcommand};

pub use self::{inspect::inspect, optimise::optimise};
use crate::cli::{inspect::InspectArgs, optimise::OptimiseArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: load the inputs, optimise the schedule, and print it.
    #[clap(name = "optimise")]
    Optimise(Box<OptimiseArgs>),

    /// Build the model and print its dimensions without solving it.
    #[clap(name = "inspect")]
    Inspect(Box<InspectArgs>),
}
