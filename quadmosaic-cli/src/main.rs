use clap::Parser;
use quadmosaic::io::ImageFileCodec;
use quadmosaic::{
    DecompositionParams, FrameJob, FrameScheduler, RenderConfig, RgbColor, RunReport, Strategy,
    SubdivisionPolicy,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "QuadMosaic CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyConfig {
    MergeOnUnwind,
    TopDown,
}

impl From<StrategyConfig> for Strategy {
    fn from(value: StrategyConfig) -> Self {
        match value {
            StrategyConfig::MergeOnUnwind => Strategy::MergeOnUnwind,
            StrategyConfig::TopDown => Strategy::TopDown,
        }
    }
}

/// Path patterns contain `{}`, replaced by the frame index.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    anim: String,
    anim_start: usize,
    repeat: usize,
    input: String,
    input_start: usize,
    output: String,
    mode: String,
    similarity: u32,
    background: String,
    min_size: usize,
    strategy: StrategyConfig,
    normalize_leaf: bool,
    output_height: Option<usize>,
    threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        let render = RenderConfig::default();
        Self {
            anim: "res/{}.png".to_string(),
            anim_start: 0,
            repeat: render.repeat,
            input: "in/img_{}.png".to_string(),
            input_start: 1,
            output: "out/img_{}.png".to_string(),
            mode: "color".to_string(),
            similarity: 16,
            background: "#000000".to_string(),
            min_size: render.params.min_size,
            strategy: StrategyConfig::MergeOnUnwind,
            normalize_leaf: render.normalize_leaf,
            output_height: render.output_height,
            threads: render.threads,
        }
    }
}

impl Config {
    fn render_config(&self) -> Result<RenderConfig, Box<dyn std::error::Error>> {
        Ok(RenderConfig {
            params: DecompositionParams {
                min_size: self.min_size,
                background: RgbColor::from_hex(&self.background)?,
            },
            policy: SubdivisionPolicy::from_mode(&self.mode, self.similarity)?,
            strategy: self.strategy.into(),
            repeat: self.repeat,
            output_height: self.output_height,
            normalize_leaf: self.normalize_leaf,
            threads: self.threads,
        })
    }
}

fn expand(pattern: &str, index: usize) -> PathBuf {
    PathBuf::from(pattern.replace("{}", &index.to_string()))
}

/// Existing files matching `pattern` for consecutive indices from `start`.
///
/// Stops at the first missing path, or when expansion stops producing new
/// paths (a pattern without `{}`).
fn discover(pattern: &str, start: usize) -> Vec<(usize, PathBuf)> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for index in start.. {
        let path = expand(pattern, index);
        if !path.is_file() || !seen.insert(path.clone()) {
            break;
        }
        found.push((index, path));
    }
    found
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("quadmosaic=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config: Config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let report = render(&config)?;

    for failure in &report.failures {
        eprintln!(
            "frame {} ({}): {}",
            failure.index,
            failure.input.display(),
            failure.error
        );
    }
    // Only setup errors change the exit status.
    println!(
        "rendered {} of {} frames",
        report.rendered,
        report.total()
    );
    Ok(())
}

/// Validates `config`, discovers frames and renders them.
fn render(config: &Config) -> Result<RunReport, Box<dyn std::error::Error>> {
    let render = config.render_config()?;

    let animation: Vec<PathBuf> = discover(&config.anim, config.anim_start)
        .into_iter()
        .map(|(_, path)| path)
        .collect();
    if animation.is_empty() {
        return Err(format!("no animation frames found for pattern {}", config.anim).into());
    }
    let jobs: Vec<FrameJob> = discover(&config.input, config.input_start)
        .into_iter()
        .map(|(index, input)| FrameJob {
            index,
            input,
            output: expand(&config.output, index),
        })
        .collect();
    tracing::info!(
        animation_frames = animation.len(),
        input_frames = jobs.len(),
        "discovered frames"
    );

    let scheduler = FrameScheduler::new(ImageFileCodec, animation, render)?;
    Ok(scheduler.run(&jobs)?)
}

#[cfg(test)]
mod tests {
    use super::{discover, expand, render, Config};
    use quadmosaic::io::save_surface;
    use quadmosaic::{MosaicError, PixelSurface, RgbColor};
    use std::path::{Path, PathBuf};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quadmosaic-cli-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn pattern(dir: &Path, name: &str) -> String {
        format!("{}/{name}", dir.display())
    }

    #[test]
    fn expand_replaces_every_placeholder() {
        assert_eq!(expand("out/{}/img_{}.png", 7), PathBuf::from("out/7/img_7.png"));
        assert_eq!(expand("static.png", 3), PathBuf::from("static.png"));
    }

    #[test]
    fn discover_stops_at_gap_and_on_repeat() {
        let dir = std::env::temp_dir().join(format!("quadmosaic-discover-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for i in [1, 2, 4] {
            std::fs::write(dir.join(format!("f{i}.png")), b"x").unwrap();
        }
        let pattern = format!("{}/f{{}}.png", dir.display());
        let found: Vec<usize> = discover(&pattern, 1).into_iter().map(|(i, _)| i).collect();
        assert_eq!(found, vec![1, 2]);

        let fixed = format!("{}/f1.png", dir.display());
        assert_eq!(discover(&fixed, 0).len(), 1);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn example_config_parses() {
        let config: Config = serde_json::from_str(super::EXAMPLE_JSON).unwrap();
        assert_eq!(config.repeat, 2);
        let render = config.render_config().unwrap();
        assert_eq!(render.params.min_size, 8);
    }

    #[test]
    fn failed_frames_are_reported_not_returned() {
        let dir = scratch_dir("failures");
        let leaf = PixelSurface::solid(4, 4, 4, RgbColor::WHITE).unwrap();
        save_surface(&leaf, dir.join("anim_0.png")).unwrap();
        let frame = PixelSurface::solid(16, 16, 3, RgbColor::gray(90)).unwrap();
        save_surface(&frame, dir.join("in_1.png")).unwrap();
        std::fs::write(dir.join("in_2.png"), b"not an image").unwrap();

        let config = Config {
            anim: pattern(&dir, "anim_{}.png"),
            input: pattern(&dir, "in_{}.png"),
            output: pattern(&dir, "out/out_{}.png"),
            threads: Some(2),
            ..Config::default()
        };
        let report = render(&config).unwrap();
        assert_eq!(report.rendered, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert!(dir.join("out/out_1.png").is_file());
        assert!(!dir.join("out/out_2.png").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn configuration_errors_come_before_discovery() {
        let dir = scratch_dir("bad-mode");
        let config = Config {
            anim: pattern(&dir, "missing_{}.png"),
            mode: "sepia".to_string(),
            ..Config::default()
        };
        let err = render(&config).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MosaicError>(),
            Some(&MosaicError::UnknownPolicyMode {
                mode: "sepia".to_string()
            })
        );

        let config = Config {
            anim: pattern(&dir, "missing_{}.png"),
            background: "#12".to_string(),
            ..Config::default()
        };
        let err = render(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MosaicError>(),
            Some(MosaicError::InvalidColor { .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
