//! sight_guide_replay - decode a recorded detector output and print what would be said.
//!
//! The tensor file is JSON: `{"shape": [1, 84, 8400], "data": [...]}`.

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use sight_guide::speech::RecordingSpeech;
use sight_guide::{Announcer, DetectionPipeline, FrameReport, GuideConfig, LabelMap, RelevancePolicy};

#[derive(Parser, Debug)]
#[command(name = "sight_guide_replay", about = "Decode a recorded detector output tensor")]
struct Args {
    /// JSON tensor dump
    #[arg(long)]
    tensor: PathBuf,
    /// Upright frame width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Upright frame height in pixels
    #[arg(long, default_value_t = 640)]
    height: u32,
    /// Label map JSON keyed by class index; COCO names when omitted
    #[arg(long)]
    labels: Option<PathBuf>,
    /// GuideConfig JSON
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also run one guidance update toward this label
    #[arg(long)]
    find: Option<String>,
}

#[derive(Deserialize)]
struct TensorDump {
    shape: Vec<usize>,
    data: Vec<f32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GuideConfig::from_json_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => GuideConfig::default(),
    };
    let labels = match &args.labels {
        Some(path) => LabelMap::from_json_file(path).with_context(|| format!("loading labels {}", path.display()))?,
        None => LabelMap::coco(),
    };

    let text = std::fs::read_to_string(&args.tensor)
        .with_context(|| format!("reading tensor {}", args.tensor.display()))?;
    let dump: TensorDump = serde_json::from_str(&text)?;
    log::info!("Replaying tensor {:?} for a {}x{} frame", dump.shape, args.width, args.height);

    let pipeline = DetectionPipeline::new(&config, labels);
    let detections = pipeline.process(&dump.shape, &dump.data, args.width, args.height);
    let report = FrameReport::new(detections, args.width, args.height);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let picked = RelevancePolicy::new(&config).pick_for_manual_speech(&report.detections);
    println!("manual: {}", RelevancePolicy::format_for_speech(&picked, true));

    if let Some(target) = &args.find {
        let speech = Arc::new(RecordingSpeech::new());
        let mut announcer = Announcer::new(&config, speech.clone(), true);
        announcer.toggle_find(target);
        announcer.on_report(&report);
        for line in speech.spoken() {
            println!("guidance: {line}");
        }
    }
    Ok(())
}
