use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

/// Top level configuration, loaded from YAML.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub particles: ParticleConfig,

    #[serde(default)]
    pub reveal: RevealConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl Config {
    /// Load the config at `path`, or the default location when none is given.
    ///
    /// A missing file at the default location is not an error.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(path.to_path_buf(), e))?;
        Self::parse(&contents)
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, ConfigLoadError> {
        // An empty document deserializes to unit, which serde_yaml won't turn into a struct.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the animation code can't turn into timelines or durations.
    fn validate(&self) -> Result<(), ConfigLoadError> {
        let animation = &self.animation;
        if !(animation.cycle_seconds > 0.0) || Duration::try_from_secs_f32(animation.cycle_seconds).is_err() {
            return Err(ConfigLoadError::OutOfRange("animation.cycle_seconds", animation.cycle_seconds));
        }
        let fractions = [
            ("animation.dim_opacity", animation.dim_opacity),
            ("animation.bright_opacity", animation.bright_opacity),
            ("animation.ramp", animation.ramp),
            ("particles.spawn_probability", self.particles.spawn_probability),
            ("reveal.threshold", self.reveal.threshold),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigLoadError::OutOfRange(field, value));
            }
        }
        Ok(())
    }

    fn default_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("", "", "adeloop-site")?;
        Some(dirs.config_dir().join("config.yaml"))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read config file {0}: {1}")]
    Io(PathBuf, io::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_yaml::Error),

    #[error("{0} is out of range: {1}")]
    OutOfRange(&'static str, f32),
}

/// Where the docs live and how they map to URLs.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SiteConfig {
    /// Overrides every environment-derived base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    #[serde(default = "default_docs_prefix")]
    pub docs_prefix: String,

    /// Pages that don't map one-to-one onto a content file.
    #[serde(default)]
    pub extra_pages: Vec<ExtraPage>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            content_dir: default_content_dir(),
            docs_prefix: default_docs_prefix(),
            extra_pages: Vec::new(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content/docs")
}

fn default_docs_prefix() -> String {
    "/docs".into()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ExtraPage {
    pub url: String,

    /// Path relative to the content directory; the extension may be omitted.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Step highlight cycle used by every diagram.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AnimationConfig {
    #[serde(default = "default_cycle_seconds")]
    pub cycle_seconds: f32,

    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f32,

    #[serde(default = "default_bright_opacity")]
    pub bright_opacity: f32,

    #[serde(default = "default_ramp")]
    pub ramp: f32,
}

impl AnimationConfig {
    pub(crate) fn cycle(&self) -> Duration {
        Duration::try_from_secs_f32(self.cycle_seconds.max(0.001)).unwrap_or(Duration::from_secs(8))
    }

    pub(crate) fn fade(&self) -> FadeConfig {
        FadeConfig { dim_opacity: self.dim_opacity, bright_opacity: self.bright_opacity, ramp: self.ramp }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            cycle_seconds: default_cycle_seconds(),
            dim_opacity: default_dim_opacity(),
            bright_opacity: default_bright_opacity(),
            ramp: default_ramp(),
        }
    }
}

fn default_cycle_seconds() -> f32 {
    8.0
}

fn default_dim_opacity() -> f32 {
    0.1
}

fn default_bright_opacity() -> f32 {
    1.0
}

fn default_ramp() -> f32 {
    0.04
}

/// The levels and ramp a step timeline is built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FadeConfig {
    pub dim_opacity: f32,
    pub bright_opacity: f32,
    pub ramp: f32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        AnimationConfig::default().fade()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ParticleConfig {
    /// Maximum live particles per edge.
    #[serde(default = "default_particle_cap")]
    pub cap: usize,

    #[serde(default = "default_spawn_probability")]
    pub spawn_probability: f32,

    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// How long a particle takes to travel a whole edge.
    #[serde(default = "default_traversal_millis")]
    pub traversal_millis: u64,
}

impl ParticleConfig {
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }

    pub(crate) fn progress_per_tick(&self) -> f32 {
        self.tick_millis.max(1) as f32 / self.traversal_millis.max(1) as f32
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            cap: default_particle_cap(),
            spawn_probability: default_spawn_probability(),
            tick_millis: default_tick_millis(),
            traversal_millis: default_traversal_millis(),
        }
    }
}

fn default_particle_cap() -> usize {
    2
}

fn default_spawn_probability() -> f32 {
    0.6
}

fn default_tick_millis() -> u64 {
    30
}

fn default_traversal_millis() -> u64 {
    750
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RevealConfig {
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f32,

    #[serde(default = "default_fade_millis")]
    pub fade_millis: u64,
}

impl RevealConfig {
    pub(crate) fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_millis)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { threshold: default_reveal_threshold(), fade_millis: default_fade_millis() }
    }
}

fn default_reveal_threshold() -> f32 {
    0.06
}

fn default_fade_millis() -> u64 {
    700
}

/// Pacing of the interactive workflow demo.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct WorkflowConfig {
    #[serde(default = "default_step_millis")]
    pub step_millis: u64,

    #[serde(default = "default_result_delay_millis")]
    pub result_delay_millis: u64,

    #[serde(default = "default_pause_millis")]
    pub pause_millis: u64,

    /// Earlier log lines kept on screen when a step appends its own.
    #[serde(default = "default_log_history")]
    pub log_history: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            step_millis: default_step_millis(),
            result_delay_millis: default_result_delay_millis(),
            pause_millis: default_pause_millis(),
            log_history: default_log_history(),
        }
    }
}

fn default_step_millis() -> u64 {
    1000
}

fn default_result_delay_millis() -> u64 {
    600
}

fn default_pause_millis() -> u64 {
    4000
}

fn default_log_history() -> usize {
    4
}
