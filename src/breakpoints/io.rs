//! Plain-text breakpoint files.
//!
//! ```text
//! # deconstruct Breakpoint File
//! # Feature: Amplitude
//! # Source: drums
//! # Sample Rate: 44100 Hz
//! # Generated: 2026-01-01 12:00:00
//! # Format: time(seconds) value
//!
//! # RMS
//! 0.000000	0.125000
//! 0.007483	0.250000
//!
//! # Peak
//! ...
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use super::{Breakpoint, FeatureResult};
use crate::analysis::Feature;

/// What goes into the `#` header of an exported file.
#[derive(Clone, Debug)]
pub struct ExportHeader<'a> {
    pub feature: Feature,
    pub source: &'a str,
    pub sample_rate: f64,
    pub generated: DateTime<Local>,
}

impl<'a> ExportHeader<'a> {
    pub fn now(feature: Feature, source: &'a str, sample_rate: f64) -> Self {
        Self {
            feature,
            source,
            sample_rate,
            generated: Local::now(),
        }
    }
}

/// A run of points under one `# <name>` line.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub name: Option<String>,
    pub points: Vec<Breakpoint>,
}

/// Name an output gets in the file.
pub fn output_label(feature: Feature, index: usize) -> String {
    feature
        .output_name(index)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Output {}", index + 1))
}

pub fn write_feature<W: Write>(out: &mut W, header: &ExportHeader<'_>, result: &FeatureResult) -> io::Result<()> {
    writeln!(out, "# deconstruct Breakpoint File")?;
    writeln!(out, "# Feature: {}", header.feature)?;
    writeln!(out, "# Source: {}", header.source)?;
    writeln!(out, "# Sample Rate: {} Hz", header.sample_rate)?;
    writeln!(out, "# Generated: {}", header.generated.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "# Format: time(seconds) value")?;
    writeln!(out)?;

    for (i, series) in result.outputs().iter().enumerate() {
        writeln!(out, "# {}", output_label(header.feature, i))?;
        for p in series {
            writeln!(out, "{:.6}\t{:.6}", p.time, p.value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_feature_file(path: &Path, header: &ExportHeader<'_>, result: &FeatureResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create breakpoint file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_feature(&mut out, header, result)
        .and_then(|_| out.flush())
        .with_context(|| format!("Failed to write breakpoint file: {}", path.display()))
}

/// Splits a line into its data part and its `#` comment, if any.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once('#') {
        Some((data, comment)) => (data.trim(), Some(comment.trim())),
        None => (line.trim(), None),
    }
}

fn parse_point(data: &str) -> Option<Breakpoint> {
    let mut tokens = data.split_whitespace();
    let time = tokens.next()?.parse::<f64>().ok()?;
    let value = tokens.next()?.parse::<f64>().ok()?;
    (time.is_finite() && value.is_finite()).then(|| Breakpoint::new(time, value))
}

/// Every `(time, value)` line of the text, comments and junk skipped.
pub fn parse_points(text: &str) -> Vec<Breakpoint> {
    text.lines()
        .filter_map(|line| parse_point(split_comment(line).0))
        .collect()
}

/// Groups points by the nearest preceding comment-only line.
///
/// Header comments are superseded by the output-name line that follows
/// them, so an exported file yields one named block per non-empty output.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut pending_name: Option<String> = None;

    for line in text.lines() {
        let (data, comment) = split_comment(line);
        if data.is_empty() {
            if let Some(comment) = comment {
                pending_name = Some(comment.to_string());
            }
            continue;
        }
        let Some(point) = parse_point(data) else {
            continue;
        };
        let name = pending_name.take();
        if name.is_none() {
            if let Some(block) = blocks.last_mut() {
                block.points.push(point);
                continue;
            }
        }
        blocks.push(Block {
            name,
            points: vec![point],
        });
    }
    blocks
}

pub fn read_points(path: &Path) -> Result<Vec<Breakpoint>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read breakpoint file: {}", path.display()))?;
    Ok(parse_points(&text))
}

pub fn read_blocks(path: &Path) -> Result<Vec<Block>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read breakpoint file: {}", path.display()))?;
    Ok(parse_blocks(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::BreakpointSeries;

    fn sample_result() -> FeatureResult {
        FeatureResult::from_outputs(vec![
            BreakpointSeries::from_points(vec![
                Breakpoint::new(0.0, 0.123456789),
                Breakpoint::new(0.0075, -0.5),
                Breakpoint::new(1.25, 1.0),
            ]),
            BreakpointSeries::from_points(vec![Breakpoint::new(0.0, 0.9), Breakpoint::new(0.0075, 0.8)]),
        ])
    }

    fn export(result: &FeatureResult) -> String {
        let header = ExportHeader::now(Feature::Amplitude, "drums", 44100.0);
        let mut buf = Vec::new();
        write_feature(&mut buf, &header, result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn export_layout() {
        let text = export(&sample_result());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# deconstruct Breakpoint File");
        assert_eq!(lines[1], "# Feature: Amplitude");
        assert_eq!(lines[2], "# Source: drums");
        assert_eq!(lines[3], "# Sample Rate: 44100 Hz");
        assert!(lines[4].starts_with("# Generated: "));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "# RMS");
        assert_eq!(lines[8], "0.000000\t0.123457");
        assert_eq!(lines[9], "0.007500\t-0.500000");
        assert_eq!(lines[11], "");
        assert_eq!(lines[12], "# Peak");
    }

    #[test]
    fn single_output_round_trip() {
        let original = sample_result();
        let only_rms = FeatureResult::from_outputs(vec![original.output(0).unwrap().clone()]);
        let parsed = parse_points(&export(&only_rms));
        let expected = original.output(0).unwrap().points();
        assert_eq!(parsed.len(), expected.len());
        for (a, b) in parsed.iter().zip(expected) {
            assert!((a.time - b.time).abs() <= 5e-7);
            assert!((a.value - b.value).abs() <= 5e-7);
        }
    }

    #[test]
    fn blocks_follow_output_names() {
        let blocks = parse_blocks(&export(&sample_result()));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name.as_deref(), Some("RMS"));
        assert_eq!(blocks[0].points.len(), 3);
        assert_eq!(blocks[1].name.as_deref(), Some("Peak"));
        assert_eq!(blocks[1].points[1], Breakpoint::new(0.0075, 0.8));
    }

    #[test]
    fn tolerant_parsing() {
        let text = "# header\n\n1.5 2.5 # trailing note\nnot a number\n3.0\n  4\t-1  extra\nnan 1\n";
        assert_eq!(
            parse_points(text),
            vec![Breakpoint::new(1.5, 2.5), Breakpoint::new(4.0, -1.0)]
        );
    }

    #[test]
    fn unnamed_points_form_one_block() {
        let blocks = parse_blocks("0 1\n1 2\n");
        assert_eq!(blocks, vec![Block {
            name: None,
            points: vec![Breakpoint::new(0.0, 1.0), Breakpoint::new(1.0, 2.0)],
        }]);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amp.txt");
        let header = ExportHeader::now(Feature::Amplitude, "drums", 48000.0);
        write_feature_file(&path, &header, &sample_result()).unwrap();
        let blocks = read_blocks(&path).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(read_points(&path).unwrap().len(), 5);
        assert!(read_points(&dir.path().join("missing.txt")).is_err());
    }
}
