//! Input-file parsing: a segment count, the bounding rectangle, then one
//! segment per line.

use std::{fs, path::Path};

use anyhow::{Context, bail};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::math::{Coord, Point, Rect, Segment};

/// A parsed input file: the bounding rectangle and the segments to insert,
/// in file order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    pub bbox: Rect,
    pub segments: Vec<Segment>,
}

pub fn load_scene_from_file(path: impl AsRef<Path>) -> anyhow::Result<Scene> {
    let path = path.as_ref();
    let file_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_scene(&file_str).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parses the text format: line 1 the declared segment count, line 2 the
/// rectangle as `x_lo y_lo x_hi y_hi`, then `x1 y1 x2 y2` per segment.
/// Endpoints arriving right-to-left are swapped so the left endpoint comes
/// first; blank lines are skipped.
pub fn parse_scene(input: &str) -> anyhow::Result<Scene> {
    let mut lines = input.lines().filter(|line| !line.trim().is_empty());

    let declared: usize = lines
        .next()
        .context("file is empty")?
        .trim()
        .parse()
        .context("first line is not a segment count")?;

    let [x_lo, y_lo, x_hi, y_hi] = four_numbers(lines.next().context("missing bounding-box line")?)?;
    let bbox = Rect::new(Point::new(x_lo, y_lo), Point::new(x_hi, y_hi))
        .context("bounding box is empty or inverted")?;

    let mut segments = Vec::new();
    for line in lines {
        let [x1, y1, x2, y2] = four_numbers(line)?;
        let seg = Segment::new(Point::new(x1, y1), Point::new(x2, y2))
            .with_context(|| format!("bad segment line {line:?}"))?;
        segments.push(seg);
    }

    if segments.len() != declared {
        warn!("file declares {declared} segment(s) but contains {}", segments.len());
    }

    Ok(Scene { bbox, segments })
}

fn four_numbers(line: &str) -> anyhow::Result<[Coord; 4]> {
    let vals: Vec<Coord> = line
        .split_whitespace()
        .map(|tok| tok.parse().with_context(|| format!("bad number {tok:?} in {line:?}")))
        .collect::<Result<_, _>>()?;
    let &[a, b, c, d] = vals.as_slice() else {
        bail!("expected four numbers, got {} in {line:?}", vals.len());
    };
    Ok([a, b, c, d])
}
