use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

mod config;
mod motion;
mod preview;
mod site;
mod workflow;

use config::Config;
use motion::compute_timeline;
use preview::{DiagramScene, PreviewOptions, WorkflowScene};
use site::{build_sitemap, discover_pages, resolve_base_url, with_extra_pages, BaseUrl, Robots};
use workflow::DiagramKind;

#[derive(Parser, Debug)]
#[command(author, version, about = "Diagram animations and sitemap tooling for the Adeloop docs site")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the sitemap for the docs content tree
    Sitemap {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = SitemapFormat::Xml)]
        format: SitemapFormat,

        /// Overrides `site.content_dir`
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },
    /// Generate robots.txt
    Robots {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the fade keyframes of a step diagram
    Timeline {
        /// Number of steps in the diagram
        #[arg(long)]
        steps: usize,

        /// Only print this step
        #[arg(long)]
        step: Option<usize>,
    },
    /// Animate a diagram in the terminal; without a diagram, run the workflow demo
    Preview {
        #[arg(value_enum)]
        diagram: Option<DiagramKind>,

        /// Stop after this many seconds
        #[arg(long, value_parser = parse_seconds)]
        seconds: Option<Duration>,

        /// Seed for the particle spawner
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SitemapFormat {
    Xml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    match cli.command {
        Command::Sitemap { out, format, content_dir } => {
            let base = base_url(&config)?;
            let content_dir = content_dir.unwrap_or_else(|| config.site.content_dir.clone());
            let pages = discover_pages(&content_dir, &config.site.docs_prefix)
                .with_context(|| format!("scanning {}", content_dir.display()))?;
            let pages = with_extra_pages(pages, &config.site.extra_pages);
            let sitemap = build_sitemap(&base, &pages, &content_dir, SystemTime::now());
            info!("sitemap has {} entries", sitemap.entries.len());
            let body = match format {
                SitemapFormat::Xml => sitemap.to_xml(),
                SitemapFormat::Json => sitemap.to_json()?,
            };
            emit(out.as_deref(), &body)?;
        }
        Command::Robots { out } => {
            let base = base_url(&config)?;
            emit(out.as_deref(), &Robots::for_site(&base).to_text())?;
        }
        Command::Timeline { steps, step } => {
            anyhow::ensure!(steps > 0, "--steps must be at least 1");
            if let Some(step) = step {
                anyhow::ensure!(step < steps, "--step must be below {steps}");
            }
            let fade = config.animation.fade();
            let mut output = io::stdout().lock();
            let indexes = match step {
                Some(step) => step..step + 1,
                None => 0..steps,
            };
            for index in indexes {
                let timeline = compute_timeline(index, steps, &fade);
                writeln!(output, "step {index}")?;
                writeln!(output, "  keyTimes=\"{}\"", timeline.key_times_attr())?;
                writeln!(output, "  values=\"{}\"", timeline.values_attr())?;
            }
        }
        Command::Preview { diagram, seconds, seed } => {
            let options = PreviewOptions {
                tick: config.particles.tick(),
                run_for: seconds,
                reveal: config.reveal.clone(),
            };
            match diagram {
                Some(kind) => {
                    let mut scene = DiagramScene::new(kind, &config.animation);
                    preview::run(&mut scene, &options)?;
                }
                None => {
                    let rng = seed.map(fastrand::Rng::with_seed).unwrap_or_default();
                    let mut scene = WorkflowScene::new(config.workflow.clone(), config.particles.clone(), rng);
                    preview::run(&mut scene, &options)?;
                }
            }
        }
    }
    Ok(())
}

fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let seconds: f32 = raw.parse().map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if !seconds.is_finite() {
        return Err(format!("'{raw}' is not a finite number of seconds"));
    }
    Duration::try_from_secs_f32(seconds).map_err(|e| format!("'{raw}' is not a valid duration: {e}"))
}

fn base_url(config: &Config) -> Result<BaseUrl> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let base = resolve_base_url(config.site.base_url.as_deref(), &env).context("resolving site url")?;
    info!("using base url {base}");
    Ok(base)
}

fn emit(out: Option<&Path>, body: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => io::stdout().lock().write_all(body.as_bytes())?,
    }
    Ok(())
}
