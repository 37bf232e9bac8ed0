mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use deconstruct::config::{self, Config};
use deconstruct::{audio, Feature, Session};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config::find_config(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) if cli.config.is_some() => return Err(err),
            Err(err) => {
                log::warn!("{:#}", err);
                Config::default()
            }
        },
        None => Config::default(),
    };

    if cli.list_features {
        return list_features(cli.json);
    }

    let input = cli.input.as_ref().context("Input audio file is required")?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let mut settings = config.analysis.clone();
    cli.apply(&mut settings);
    settings.validate().context("Invalid analysis settings")?;

    let features: Vec<Feature> = if !cli.features.is_empty() {
        cli.features.clone()
    } else {
        let configured = config.output.resolved_features();
        if configured.is_empty() { Feature::ALL.to_vec() } else { configured }
    };
    let channel = cli.channel.unwrap_or(config.output.channel);
    let output_dir = cli.output_dir.clone().unwrap_or_else(|| config.output.directory.clone());

    log::info!("deconstruct - audio feature extraction");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", output_dir.display());
    log::info!(
        "Window: {}ms, hop: {}%, normalize: {}, smoothing: {}",
        settings.window_size_ms,
        settings.hop_size_pct,
        settings.normalize_output,
        if settings.smooth_output { format!("{}ms", settings.smooth_time_ms) } else { "off".into() }
    );

    // 1. Decode audio
    log::info!("Decoding audio...");
    let signal = audio::decode::decode_audio(input)?;
    let source_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string();

    let mut session = Session::new();
    session.load(signal, source_name);

    // 2. Extract
    let pb = ProgressBar::new(features.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} features {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    for feature in &features {
        pb.set_message(feature.name());
        session.extract(*feature, channel, &settings)?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    // 3. Optional import of an edited curve
    if let (Some(path), Some(feature)) = (cli.import.as_ref(), cli.import_into) {
        match cli.import_output {
            Some(output) => {
                session.import(feature, output, path)?;
            }
            None => {
                let restored = session.import_feature(feature, path)?;
                log::info!("Restored {} output(s) of {} from {}", restored, feature, path.display());
            }
        }
    }

    // 4. Export
    let written = session.export_all(&output_dir)?;
    log::info!("Done! Wrote {} file(s) to {}", written.len(), output_dir.display());
    Ok(())
}

fn list_features(json: bool) -> Result<()> {
    let descriptors: Vec<_> = Feature::ALL.iter().map(|f| f.descriptor()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }
    println!("Available features:");
    for d in &descriptors {
        println!(
            "  {:<12} {}  {}{}",
            d.name,
            d.colour,
            d.output_names.join(", "),
            if d.supports_multichannel { "  (multichannel)" } else { "" }
        );
    }
    Ok(())
}
