//! `bundle` subcommand: the frozen-tree packaging pipeline.

use crate::cli::BundleArgs;
use crate::error::Result;
use crate::pipeline::install::InstallContext;
use crate::pipeline::target::{BuildTarget, EnvSignals};
use crate::pipeline::Pipeline;

/// Runs the packaging pipeline for the detected build target.
pub async fn run(args: &BundleArgs) -> Result<i32> {
    // Environment signals are read exactly once, here.
    let target = BuildTarget::from_signals(&EnvSignals::from_env());

    let ctx = InstallContext::new(&args.work_dir, &args.python);
    let pipeline = Pipeline::new(target, ctx, args.output_channel.clone());

    let tree = pipeline.run(args.version.clone()).await?;
    println!("{}", tree.display());
    Ok(0)
}
