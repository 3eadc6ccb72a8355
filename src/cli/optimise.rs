use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::input::InputArgs,
    prelude::*,
    report::Report,
    tables::{build_config_table, build_steps_table, build_summary_table},
};

#[derive(Parser)]
pub struct OptimiseArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Export the configuration, the run, and the summary as CSV files into this directory.
    #[clap(long = "report-dir", env = "REPORT_DIR")]
    pub report_dir: Option<PathBuf>,
}

#[instrument(skip_all)]
pub fn optimise(args: &OptimiseArgs) -> Result {
    let mut optimisation = args.input.build()?;
    optimisation.solve(&args.input.settings.solver)?;
    let solution = optimisation.solution()?;
    let config = optimisation.config();

    println!("{}", build_config_table(config));
    println!("{}", build_steps_table(&solution, config));
    println!("{}", build_summary_table(&solution.summary, solution.objective_value));

    if let Some(report_dir) = &args.report_dir {
        Report { config, solution: &solution }.write_to(report_dir)?;
    }
    Ok(())
}
