use clap::Parser;
use serde::{Deserialize, Serialize};
use sheetmatch::io::{load_gray_image, load_rgb_image};
use sheetmatch::{
    annotations, default_scales, BestReport, Detection, EngineConfig, MatchEngine, MatchReport,
    Preprocess, Suppression, Template,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Sheetmatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    /// All matches above threshold, NMS-reduced.
    Matches,
    /// Single best candidate across templates, no threshold gate.
    Best,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SuppressionConfig {
    Global,
    PerTemplate,
}

impl From<SuppressionConfig> for Suppression {
    fn from(value: SuppressionConfig) -> Self {
        match value {
            SuppressionConfig::Global => Suppression::Global,
            SuppressionConfig::PerTemplate => Suppression::PerTemplate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum PreprocessConfig {
    Raw,
    Clahe {
        #[serde(default = "default_clahe_tile")]
        tile_size: usize,
        #[serde(default = "default_clahe_clip")]
        clip_limit: f32,
    },
    EdgeMap {
        #[serde(default = "default_edge_low")]
        low: f32,
        #[serde(default = "default_edge_high")]
        high: f32,
    },
}

fn default_clahe_tile() -> usize {
    sheetmatch::preprocess::DEFAULT_CLAHE_TILE
}

fn default_clahe_clip() -> f32 {
    sheetmatch::preprocess::DEFAULT_CLAHE_CLIP
}

fn default_edge_low() -> f32 {
    sheetmatch::preprocess::DEFAULT_EDGE_LOW
}

fn default_edge_high() -> f32 {
    sheetmatch::preprocess::DEFAULT_EDGE_HIGH
}

impl From<PreprocessConfig> for Preprocess {
    fn from(value: PreprocessConfig) -> Self {
        match value {
            PreprocessConfig::Raw => Preprocess::Raw,
            PreprocessConfig::Clahe {
                tile_size,
                clip_limit,
            } => Preprocess::Clahe {
                tile_size,
                clip_limit,
            },
            PreprocessConfig::EdgeMap { low, high } => Preprocess::EdgeMap { low, high },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    name: String,
    path: String,
    #[serde(default)]
    threshold: Option<f32>,
    #[serde(default)]
    scales: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EngineConfigJson {
    threshold: f32,
    scales: Vec<f32>,
    nms_iou: f32,
    preprocess: PreprocessConfig,
    suppression: SuppressionConfig,
    max_per_scale: usize,
    min_template_dim: usize,
    parallel: bool,
}

impl Default for EngineConfigJson {
    fn default() -> Self {
        let cfg = EngineConfig::default();
        Self {
            threshold: cfg.threshold,
            scales: default_scales(),
            nms_iou: cfg.nms_iou,
            preprocess: PreprocessConfig::Clahe {
                tile_size: default_clahe_tile(),
                clip_limit: default_clahe_clip(),
            },
            suppression: SuppressionConfig::Global,
            max_per_scale: cfg.max_per_scale,
            min_template_dim: cfg.min_template_dim,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    templates: Vec<TemplateEntry>,
    mode: ModeConfig,
    output_path: Option<String>,
    overlay_path: Option<String>,
    engine: EngineConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            templates: Vec::new(),
            mode: ModeConfig::Matches,
            output_path: None,
            overlay_path: None,
            engine: EngineConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    template: String,
    score: f32,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    scale: f32,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        Self {
            template: value.template.clone(),
            score: value.score,
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
            scale: value.scale,
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchesOutput {
    detections: Vec<DetectionRecord>,
    best_seen: Option<DetectionRecord>,
}

impl From<&MatchReport> for MatchesOutput {
    fn from(report: &MatchReport) -> Self {
        Self {
            detections: report.detections.iter().map(DetectionRecord::from).collect(),
            best_seen: report.best_seen.as_ref().map(DetectionRecord::from),
        }
    }
}

#[derive(Debug, Serialize)]
struct TemplateBestRecord {
    template: String,
    best: Option<DetectionRecord>,
}

#[derive(Debug, Serialize)]
struct BestOutput {
    best: Option<DetectionRecord>,
    per_template: Vec<TemplateBestRecord>,
}

impl From<&BestReport> for BestOutput {
    fn from(report: &BestReport) -> Self {
        Self {
            best: report.best.as_ref().map(DetectionRecord::from),
            per_template: report
                .per_template
                .iter()
                .map(|entry| TemplateBestRecord {
                    template: entry.template.clone(),
                    best: entry.best.as_ref().map(DetectionRecord::from),
                })
                .collect(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("sheetmatch=debug".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }
    if config.templates.is_empty() {
        return Err("at least one template must be listed in the config".into());
    }

    let target = load_gray_image(&config.image_path)?;
    let mut templates = Vec::with_capacity(config.templates.len());
    for entry in &config.templates {
        let img = load_gray_image(&entry.path)?;
        let mut template = Template::new(
            entry.name.clone(),
            img.data().to_vec(),
            img.width(),
            img.height(),
        )?;
        if let Some(threshold) = entry.threshold {
            template = template.with_threshold(threshold);
        }
        if let Some(scales) = entry.scales.clone() {
            template = template.with_scales(scales);
        }
        templates.push(template);
    }

    let engine = MatchEngine::new(EngineConfig {
        threshold: config.engine.threshold,
        scales: config.engine.scales,
        nms_iou: config.engine.nms_iou,
        preprocess: config.engine.preprocess.into(),
        suppression: config.engine.suppression.into(),
        max_per_scale: config.engine.max_per_scale,
        min_template_dim: config.engine.min_template_dim,
        parallel: config.engine.parallel,
    })?;

    let json = match config.mode {
        ModeConfig::Matches => {
            let report = engine.find_matches(target.view(), &templates)?;
            if let Some(path) = &config.overlay_path {
                write_overlay(&config.image_path, path, &report)?;
            }
            serde_json::to_string_pretty(&MatchesOutput::from(&report))?
        }
        ModeConfig::Best => {
            let report = engine.find_best(target.view(), &templates)?;
            serde_json::to_string_pretty(&BestOutput::from(&report))?
        }
    };

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

fn write_overlay(
    image_path: &str,
    overlay_path: &str,
    report: &MatchReport,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut canvas = load_rgb_image(image_path)?;
    let boxes = annotations(&report.detections);
    sheetmatch::annotate::draw_annotations(&mut canvas, &boxes, image::Rgb([0, 200, 0]), 3);
    canvas.save(overlay_path)?;
    Ok(())
}
