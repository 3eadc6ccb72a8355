use clap::Parser;

use crate::{
    cli::input::InputArgs,
    prelude::*,
    tables::{build_config_table, build_statistics_table},
};

#[derive(Parser)]
pub struct InspectArgs {
    #[clap(flatten)]
    pub input: InputArgs,
}

#[instrument(skip_all)]
pub fn inspect(args: &InspectArgs) -> Result {
    let optimisation = args.input.build()?;
    println!("{}", build_config_table(optimisation.config()));
    println!("{}", build_statistics_table(&optimisation.model().problem));
    Ok(())
}
