mod annotate;
mod args;
mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use faceswap_core::{FaceSwapPipeline, SwapError, load_input};
use faceswap_utils::{configure_telemetry, init_logging};
use log::{LevelFilter, error, info, warn};

use crate::{
    annotate::annotate_image,
    args::SwapArgs,
    config::{apply_cli_overrides, load_settings, resolve_output_path},
};

fn main() -> ExitCode {
    let args = match SwapArgs::try_parse() {
        Ok(args) => args,
        Err(err) => return usage_exit(&err),
    };
    let default_level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    if let Err(err) = init_logging(default_level) {
        eprintln!("failed to initialize logging: {err:#}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = match err.downcast_ref::<SwapError>() {
                Some(swap) => swap.user_message(),
                None => format!("{err:#}"),
            };
            error!("{message}");
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Print a clap error or help text. Help and version succeed; usage errors exit with 1 like every
/// other failure.
fn usage_exit(err: &clap::Error) -> ExitCode {
    if let Err(io) = err.print() {
        eprintln!("{err}: {io}");
    }
    if err.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(args: &SwapArgs) -> Result<()> {
    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, args);
    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    // Decode both inputs before paying for model loading.
    let source = load_input(&args.source)?;
    let target = load_input(&args.target)?;

    info!(
        "Loading models from {}",
        settings.models.directory.display()
    );
    let pipeline = FaceSwapPipeline::from_settings(&settings)?;

    let quality = settings.quality;
    info!(
        "Swapping {} onto {} at {} quality",
        args.source.display(),
        args.target.display(),
        quality.as_label()
    );
    let outcome = pipeline.process(&source, &target, quality)?;

    if let Some(dir) = args.annotate.as_ref() {
        for (image, faces, path, role) in [
            (&source, &outcome.source_faces, &args.source, "source"),
            (&target, &outcome.target_faces, &args.target, "target"),
        ] {
            match annotate_image(image, faces, path, role, dir) {
                Ok(written) => info!("Annotated {role} saved to {}", written.display()),
                Err(err) => warn!("Failed to annotate {}: {err:#}", path.display()),
            }
        }
    }

    let destination = resolve_output_path(
        args.output.as_deref(),
        &settings.output.directory,
        quality,
        &args.target,
        &args.source,
    );
    pipeline
        .save(&outcome.image, &destination)
        .with_context(|| format!("could not save the swap result for {}", args.target.display()))?;

    info!(
        "Result saved to {} ({} face(s) swapped in {:.2?})",
        destination.display(),
        outcome.swapped_faces,
        outcome.elapsed
    );
    println!("{}", destination.display());
    Ok(())
}
