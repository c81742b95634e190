//! Reports overlapping particles in a scene file

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use hpmc_overlap::config::{Config, SceneConfig};
use hpmc_overlap::drift::remove_drift;
use hpmc_overlap::foundation::logging::{self, info, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;

struct CheckOptions {
    scene: PathBuf,
    serial: bool,
    brute_force: bool,
    fail_on_overlap: bool,
    remove_drift: bool,
    output: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let matches = Command::new("overlap_check")
        .about("Loads a scene file and reports every pair of overlapping particles")
        .arg(
            Arg::new("scene")
                .value_name("FILE")
                .help("Scene file (.toml or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("serial")
                .long("serial")
                .help("Run the narrow phase on one thread")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("brute-force")
                .long("brute-force")
                .help("Test all pairs instead of using the cell list")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fail-on-overlap")
                .long("fail-on-overlap")
                .help("Exit with status 1 if any pair overlaps")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("remove-drift")
                .long("remove-drift")
                .help("Shift particles back onto their reference sites before checking")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the (drift-corrected) scene, with image flags, to this file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::init_with_level(level);

    let options = CheckOptions {
        scene: matches
            .get_one::<String>("scene")
            .map(PathBuf::from)
            .context("Missing scene file")?,
        serial: matches.get_flag("serial"),
        brute_force: matches.get_flag("brute-force"),
        fail_on_overlap: matches.get_flag("fail-on-overlap"),
        remove_drift: matches.get_flag("remove-drift"),
        output: matches.get_one::<String>("output").map(PathBuf::from),
    };

    let overlapping = run(&options)?;
    if overlapping && options.fail_on_overlap {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Returns whether any pair overlaps
fn run(options: &CheckOptions) -> Result<bool> {
    let mut config = SceneConfig::load_from_file(&options.scene)
        .with_context(|| format!("Failed to load scene {}", options.scene.display()))?;
    let mut scene = config.build().context("Invalid scene")?;

    if options.remove_drift {
        let references = scene
            .references
            .as_deref()
            .context("--remove-drift needs a reference site on every particle")?;
        let shift = remove_drift(&mut scene.positions, &mut scene.images, references, &scene.box_dim)?;
        info!("Removed drift ({:.6}, {:.6}, {:.6})", shift.x, shift.y, shift.z);
        config.store_particle_state(&scene);
    }

    if let Some(output) = &options.output {
        config
            .save_to_file(output)
            .with_context(|| format!("Failed to write scene {}", output.display()))?;
        info!("Wrote scene to {}", output.display());
    }

    let system = scene.overlap_system().with_parallel(!options.serial);
    let report = if options.brute_force {
        system.find_overlaps_brute_force(&scene.positions, &scene.instances)?
    } else {
        system.find_overlaps(&scene.positions, &scene.instances)?
    };

    for pair in &report.pairs {
        println!("{pair}");
    }
    info!(
        "{} overlapping pairs among {} particles ({} candidates tested, {} numerical give-ups)",
        report.pairs.len(),
        scene.positions.len(),
        report.candidates,
        report.err_count
    );

    Ok(report.has_overlaps())
}
