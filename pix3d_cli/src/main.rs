//! pix3d command line
//!
//! Opens a project directory, loads a level (or the default scene), runs the
//! behavior loop for a number of frames and optionally saves the result.

use std::path::PathBuf;
use std::process;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use futures::executor::block_on;
use pix3d_core::config::{Config, ConfigError};
use pix3d_core::core::config::EditorConfig;
use pix3d_core::foundation::logging;
use pix3d_core::project::{ProjectError, RecentProjects};
use pix3d_core::session::{EditorSession, SessionError};
use thiserror::Error;

const DEFAULT_CONFIG: &str = "pix3d.toml";
const DEFAULT_DT: f32 = 1.0 / 60.0;

#[derive(Error, Debug)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Project(#[from] ProjectError),
}

#[derive(Debug, Default)]
struct Args {
    project: Option<PathBuf>,
    scene: Option<String>,
    ticks: u32,
    dt: Option<f32>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    list_recent: bool,
}

fn command() -> Command {
    Command::new("pix3d")
        .about("Opens a pix3d project, runs its scene and optionally saves the result")
        .arg(
            Arg::new("project")
                .value_name("PROJECT_DIR")
                .help("Project directory to open")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("recent"),
        )
        .arg(
            Arg::new("scene")
                .long("scene")
                .value_name("KEY")
                .help("Scene document to load instead of the default scene"),
        )
        .arg(
            Arg::new("ticks")
                .long("ticks")
                .value_name("N")
                .help("Number of frames to run")
                .value_parser(value_parser!(u32))
                .default_value("0"),
        )
        .arg(
            Arg::new("dt")
                .long("dt")
                .value_name("SECONDS")
                .help("Frame duration")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .value_name("FILE")
                .help("Write the scene JSON here after running")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Editor configuration (TOML or RON)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recent")
                .long("recent")
                .help("List recently opened projects and exit")
                .action(ArgAction::SetTrue),
        )
}

impl Args {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            project: matches.get_one::<PathBuf>("project").cloned(),
            scene: matches.get_one::<String>("scene").cloned(),
            ticks: matches.get_one::<u32>("ticks").copied().unwrap_or(0),
            dt: matches.get_one::<f32>("dt").copied(),
            out: matches.get_one::<PathBuf>("out").cloned(),
            config: matches.get_one::<PathBuf>("config").cloned(),
            list_recent: matches.get_flag("recent"),
        }
    }
}

fn recent_projects_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pix3d")
        .join("recent_projects.ron")
}

fn run(args: Args) -> Result<(), CliError> {
    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = EditorConfig::load_or_default(&config_path)?;
    config.validate()?;
    logging::init_with_level(&config.log_level);

    let recent_path = recent_projects_path();
    let mut recent = RecentProjects::load(&recent_path, config.project.recent_limit)?;

    if args.list_recent {
        for entry in recent.entries() {
            println!("{}\t{}", entry.name, entry.path.display());
        }
        return Ok(());
    }
    let Some(project) = args.project else {
        return Ok(());
    };

    let mut session = EditorSession::new(config);
    let opened = match block_on(session.open_project(&project)) {
        Ok(opened) => opened,
        Err(e) => {
            // Broken entries drop out of the list
            if recent.forget(&project) {
                recent.save(&recent_path)?;
            }
            return Err(e.into());
        }
    };
    recent.remember(opened.scan.root.clone());
    recent.save(&recent_path)?;

    println!(
        "Opened {}: {} asset(s), {} failed to load",
        opened.scan.root.display(),
        opened.scan.assets.len(),
        opened.summary.failures.len()
    );
    for failure in &opened.summary.failures {
        println!("  {} '{}': {}", failure.category, failure.key, failure.error);
    }

    match &args.scene {
        Some(key) => {
            let report = block_on(session.load_scene_by_key(key))?;
            println!("Loaded '{}': {} object(s), {} skipped", key, report.loaded.len(), report.skipped.len());
            for skipped in &report.skipped {
                println!("  #{} '{}': {:?}", skipped.index, skipped.name, skipped.reason);
            }
        }
        None => session.create_default_scene(),
    }

    let dt = args.dt.unwrap_or(DEFAULT_DT);
    let mut removed = 0;
    for _ in 0..args.ticks {
        removed += session.tick(dt).removals.len();
    }
    if args.ticks > 0 {
        log::info!("Ran {} tick(s) of {:.4}s, {} object(s) removed", args.ticks, dt, removed);
    }

    if let Some(out) = &args.out {
        session.save_scene(out)?;
        println!("Saved scene to {}", out.display());
    }
    Ok(())
}

fn main() {
    let args = Args::from_matches(&command().get_matches());
    if let Err(e) = run(args) {
        eprintln!("{e}");
        process::exit(1);
    }
}
