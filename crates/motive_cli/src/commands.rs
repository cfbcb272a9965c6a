//! Subcommand implementations

use crate::config::MotiveToml;
use anyhow::{bail, Context, Result};
use motive_animation::generator_easing::builtin_generator_easing;
use motive_animation::native::map_easing_to_native;
use motive_animation::scroll::{preset, resolve_offsets, update_axis_info, Axis, Intersection, ScrollInfo, Viewport};
use motive_animation::{GeneratorKind, Segment, SequenceBuilder, SequenceOptions, Transition, TransitionType};
use motive_core::Capabilities;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

/// Sequence file: a bare segment list, or segments with options
#[derive(Deserialize)]
#[serde(untagged)]
enum SequenceFile {
    Segments(Vec<Segment>),
    WithOptions {
        segments: Vec<Segment>,
        #[serde(default)]
        options: SequenceOptions,
    },
}

pub fn sequence(config: &MotiveToml, path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read sequence file: {}", path.display()))?;
    let (segments, options) = match serde_json::from_str::<SequenceFile>(&content)
        .with_context(|| format!("Invalid sequence file: {}", path.display()))?
    {
        SequenceFile::Segments(segments) => (segments, SequenceOptions::default()),
        SequenceFile::WithOptions { segments, options } => (segments, options),
    };

    tracing::info!(segments = segments.len(), "building sequence");
    let definition = SequenceBuilder::new(&config.motion)
        .with_options(options)
        .build(&segments)?;
    Ok(serde_json::to_value(&definition)?)
}

pub struct SpringArgs {
    pub stiffness: Option<f64>,
    pub damping: Option<f64>,
    pub mass: Option<f64>,
    pub duration: Option<f64>,
    pub bounce: Option<f64>,
    pub velocity: Option<f64>,
    pub distance: f64,
}

pub fn spring(config: &MotiveToml, args: &SpringArgs) -> Result<Value> {
    let transition = Transition {
        kind: Some(TransitionType::Spring),
        stiffness: args.stiffness,
        damping: args.damping,
        mass: args.mass,
        duration: args.duration,
        bounce: args.bounce,
        velocity: args.velocity,
        ..Transition::default()
    };
    let options = transition.generator_options(Vec::new());
    let easing = builtin_generator_easing(GeneratorKind::Spring, &options, args.distance, &config.motion)?;

    let count = config.output.samples.max(1);
    let samples: Vec<Value> = (0..=count)
        .map(|i| {
            let t = i as f64 / count as f64;
            json!({ "t": t, "value": easing.ease.apply(t) })
        })
        .collect();
    let capabilities = Capabilities {
        linear_easing: true,
        ..Capabilities::default()
    };
    let native = map_easing_to_native(&easing.ease, easing.duration * 1000.0, &capabilities, &config.motion);

    Ok(json!({
        "duration": easing.duration,
        "samples": samples,
        "native": native.to_string(),
    }))
}

pub struct ScrollArgs {
    pub scroll_length: f64,
    pub client_length: f64,
    pub target_offset: Option<f64>,
    pub target_length: Option<f64>,
    pub offset: Vec<String>,
}

/// Parse `--offset` values: one preset name, or one edge pair per breakpoint
fn parse_offsets(values: &[String]) -> Result<Vec<Intersection>> {
    if let [name] = values {
        if let Some(offsets) = preset(name) {
            return Ok(offsets);
        }
    }
    values
        .iter()
        .map(|value| {
            value
                .parse::<Intersection>()
                .map_err(|reason| anyhow::anyhow!(reason))
                .with_context(|| format!("Invalid scroll offset `{value}`"))
        })
        .collect()
}

pub fn scroll(config: &MotiveToml, args: &ScrollArgs) -> Result<Value> {
    if args.client_length > args.scroll_length {
        bail!(
            "client length {} exceeds scroll length {}",
            args.client_length,
            args.scroll_length
        );
    }
    let offsets = parse_offsets(&args.offset)?;
    let scrollable = args.scroll_length - args.client_length;

    let mut info = ScrollInfo::default();
    info.y.container_length = args.client_length;
    info.y.target_offset = args.target_offset.unwrap_or(0.0);
    info.y.target_length = args.target_length.unwrap_or(args.scroll_length);
    let viewport = Viewport::default();

    let count = config.output.samples.max(1);
    let mut samples = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let position = scrollable * i as f64 / count as f64;
        update_axis_info(&mut info.y, position, scrollable, 0.0, config.motion.scroll_velocity_stale_ms);
        if !offsets.is_empty() || args.target_offset.is_some() || args.target_length.is_some() {
            resolve_offsets(&mut info, Axis::Y, &offsets, &viewport);
        }
        samples.push(json!({ "scroll": position, "progress": info.y.progress }));
    }

    Ok(json!({
        "offset": info.y.offset,
        "samples": samples,
    }))
}
