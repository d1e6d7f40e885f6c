//! SVG-style path data (`d` attribute syntax) for a [`Path`].
//!
//! Only absolute `M`, `L`, `A`, `Q`, `C` and `Z` commands are used. Arcs are written
//! in endpoint form and read back as circular arcs. Arcs with `rx != ry` are not
//! reconstructed: they become a straight line between their endpoints. That is an
//! accepted approximation which downstream assets are calibrated against, and it is
//! reported through [`GeometryWarning`].

use crate::error::{Result, SigilError};
use crate::geometry::arc::ArcSpec;
use crate::path::{PaintFlags, Path, Segment, Subpath};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::warn;
use usvg::tiny_skia_path::Point;

/// Relative tolerance under which `rx` and `ry` count as the same radius.
const CIRCULAR_EPS: f32 = 1e-3;

/// One subpath in transport form: its path data plus how it was painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubpathData {
    pub d: String,
    #[serde(default)]
    pub stroke: bool,
    #[serde(default)]
    pub fill: bool,
}

/// A non-fatal approximation made while reading path data.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryWarning {
    /// An elliptical arc was replaced by a line from `from` to `to`.
    EllipticalArc {
        offset: usize,
        rx: f32,
        ry: f32,
        from: Point,
        to: Point,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedPathData {
    pub segments: Vec<Segment>,
    pub warnings: Vec<GeometryWarning>,
}

fn push_point(out: &mut String, p: Point) {
    let _ = write!(out, " {} {}", p.x, p.y);
}

fn push_arc_command(out: &mut String, radius: f32, large_arc: bool, sweep: bool, to: Point) {
    let _ = write!(
        out,
        "A {radius} {radius} 0 {} {}",
        large_arc as u8, sweep as u8
    );
    push_point(out, to);
}

/// Write the segments of one subpath as path data.
pub fn segments_to_path_data(segments: &[Segment]) -> String {
    let mut out = String::new();
    let mut current: Option<Point> = None;
    let mut start: Option<Point> = None;

    for segment in segments {
        if !out.is_empty() {
            out.push(' ');
        }
        // Drawing with no current point starts one where the canvas would.
        if current.is_none() {
            let implicit = match segment {
                Segment::LineTo(p) => Some(*p),
                Segment::QuadTo { ctrl, .. } => Some(*ctrl),
                Segment::CubicTo { ctrl1, .. } => Some(*ctrl1),
                _ => None,
            };
            if let Some(p) = implicit {
                out.push('M');
                push_point(&mut out, p);
                current = Some(p);
                start = Some(p);
                if matches!(segment, Segment::LineTo(_)) {
                    continue;
                }
                out.push(' ');
            }
        }
        match segment {
            Segment::MoveTo(p) => {
                out.push('M');
                push_point(&mut out, *p);
                current = Some(*p);
                start = Some(*p);
            }
            Segment::LineTo(p) => {
                out.push('L');
                push_point(&mut out, *p);
                start = start.or(Some(*p));
                current = Some(*p);
            }
            Segment::QuadTo { ctrl, to } => {
                out.push('Q');
                push_point(&mut out, *ctrl);
                push_point(&mut out, *to);
                start = start.or(Some(*to));
                current = Some(*to);
            }
            Segment::CubicTo { ctrl1, ctrl2, to } => {
                out.push('C');
                push_point(&mut out, *ctrl1);
                push_point(&mut out, *ctrl2);
                push_point(&mut out, *to);
                start = start.or(Some(*to));
                current = Some(*to);
            }
            Segment::Close => {
                out.push('Z');
                current = start;
            }
            Segment::Arc(arc) => {
                let from = arc.start_point();
                match current {
                    None => {
                        out.push('M');
                        push_point(&mut out, from);
                        out.push(' ');
                        start = Some(from);
                    }
                    Some(p) if p != from => {
                        out.push('L');
                        push_point(&mut out, from);
                        out.push(' ');
                    }
                    Some(_) => {}
                }

                let sweep = !arc.counter_clockwise;
                let end = if arc.is_full_circle() {
                    // One arc command with identical endpoints draws nothing, so go
                    // through the opposite point.
                    let opposite_angle = if arc.counter_clockwise {
                        arc.start_angle - std::f32::consts::PI
                    } else {
                        arc.start_angle + std::f32::consts::PI
                    };
                    let opposite = arc.point_at(opposite_angle);
                    push_arc_command(&mut out, arc.radius, false, sweep, opposite);
                    out.push(' ');
                    push_arc_command(&mut out, arc.radius, false, sweep, from);
                    from
                } else {
                    let end = arc.end_point();
                    push_arc_command(&mut out, arc.radius, arc.is_large_arc(), sweep, end);
                    end
                };
                current = Some(end);
            }
        }
    }
    out
}

/// Write every subpath of `path` with its paint flags.
pub fn to_path_data(path: &Path) -> Vec<SubpathData> {
    path.subpaths
        .iter()
        .map(|subpath| SubpathData {
            d: segments_to_path_data(&subpath.segments),
            stroke: subpath.paint.stroke,
            fill: subpath.paint.fill,
        })
        .collect()
}

#[derive(Debug, PartialEq)]
enum Token {
    Command(char),
    Number(f32),
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn skip_separators(&mut self) {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        self.pos += rest.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<(usize, Token)> {
        let saved = self.pos;
        let token = self.next_token();
        self.pos = saved;
        token.ok().flatten()
    }

    fn next_token(&mut self) -> Result<Option<(usize, Token)>> {
        self.skip_separators();
        let offset = self.pos;
        let bytes = self.src.as_bytes();
        let Some(&first) = bytes.get(offset) else {
            return Ok(None);
        };

        if first.is_ascii_alphabetic() && first != b'e' && first != b'E' {
            self.pos += 1;
            return Ok(Some((offset, Token::Command(first as char))));
        }

        let mut end = offset;
        if matches!(bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let mut seen_dot = false;
        let mut seen_exp = false;
        while let Some(&b) = bytes.get(end) {
            match b {
                b'0'..=b'9' => end += 1,
                b'.' if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    end += 1;
                }
                b'e' | b'E' if !seen_exp => {
                    seen_exp = true;
                    end += 1;
                    if matches!(bytes.get(end), Some(b'+' | b'-')) {
                        end += 1;
                    }
                }
                _ => break,
            }
        }

        let text = &self.src[offset..end];
        let value: f32 = text.parse().map_err(|_| {
            let found = if text.is_empty() {
                self.src[offset..].chars().next().map(String::from).unwrap_or_default()
            } else {
                text.to_string()
            };
            SigilError::InvalidPathData {
                offset,
                reason: format!("expected a number, found `{found}`"),
            }
        })?;
        if !value.is_finite() {
            return Err(SigilError::InvalidPathData {
                offset,
                reason: format!("number `{text}` is out of range"),
            });
        }
        self.pos = end;
        Ok(Some((offset, Token::Number(value))))
    }

    fn number(&mut self) -> Result<f32> {
        match self.next_token()? {
            Some((_, Token::Number(value))) => Ok(value),
            Some((offset, Token::Command(c))) => Err(SigilError::InvalidPathData {
                offset,
                reason: format!("expected a number, found command `{c}`"),
            }),
            None => Err(SigilError::InvalidPathData {
                offset: self.src.len(),
                reason: "unexpected end of path data".to_string(),
            }),
        }
    }

    fn point(&mut self) -> Result<Point> {
        Ok(Point::from_xy(self.number()?, self.number()?))
    }

    fn flag(&mut self) -> Result<bool> {
        self.skip_separators();
        let offset = self.pos;
        match self.number()? {
            v if v == 0.0 => Ok(false),
            v if v == 1.0 => Ok(true),
            v => Err(SigilError::InvalidPathData {
                offset,
                reason: format!("arc flag must be 0 or 1, got {v}"),
            }),
        }
    }
}

/// Reads path data back into segments.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathDataParser {
    strict: bool,
}

impl PathDataParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that fails with [`SigilError::UnsupportedGeometry`] on elliptical arcs
    /// instead of degrading them to lines.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn parse(&self, d: &str) -> Result<ParsedPathData> {
        let mut tokens = Tokenizer::new(d);
        let mut parsed = ParsedPathData::default();
        let mut current: Option<Point> = None;
        let mut start: Option<Point> = None;
        let mut command: Option<char> = None;

        loop {
            let Some((offset, token)) = tokens.peek() else {
                // Surface tokenizer errors, otherwise we're at the end.
                tokens.next_token()?;
                break;
            };
            let cmd = match token {
                Token::Command(c) => {
                    tokens.next_token()?;
                    c
                }
                // Extra coordinates repeat the previous command; after `M` they are lines.
                Token::Number(_) => match command {
                    Some('M') => 'L',
                    Some(c) if c != 'Z' => c,
                    _ => {
                        return Err(SigilError::InvalidPathData {
                            offset,
                            reason: "coordinates without a command".to_string(),
                        });
                    }
                },
            };

            match cmd {
                'M' => {
                    let p = tokens.point()?;
                    parsed.segments.push(Segment::MoveTo(p));
                    current = Some(p);
                    start = Some(p);
                }
                'L' => {
                    let p = tokens.point()?;
                    parsed.segments.push(Segment::LineTo(p));
                    start = start.or(Some(p));
                    current = Some(p);
                }
                'Q' => {
                    let ctrl = tokens.point()?;
                    let to = tokens.point()?;
                    parsed.segments.push(Segment::QuadTo { ctrl, to });
                    start = start.or(Some(to));
                    current = Some(to);
                }
                'C' => {
                    let ctrl1 = tokens.point()?;
                    let ctrl2 = tokens.point()?;
                    let to = tokens.point()?;
                    parsed.segments.push(Segment::CubicTo { ctrl1, ctrl2, to });
                    start = start.or(Some(to));
                    current = Some(to);
                }
                'Z' | 'z' => {
                    parsed.segments.push(Segment::Close);
                    current = start;
                }
                'A' => {
                    let rx = tokens.number()?.abs();
                    let ry = tokens.number()?.abs();
                    let _rotation = tokens.number()?;
                    let large_arc = tokens.flag()?;
                    let sweep = tokens.flag()?;
                    let to = tokens.point()?;
                    let Some(from) = current else {
                        return Err(SigilError::InvalidPathData {
                            offset,
                            reason: "arc without a current point".to_string(),
                        });
                    };
                    self.push_arc(&mut parsed, offset, from, to, rx, ry, large_arc, sweep)?;
                    current = Some(to);
                }
                other => {
                    return Err(SigilError::InvalidPathData {
                        offset,
                        reason: format!("unsupported command `{other}`"),
                    });
                }
            }
            command = Some(if cmd == 'z' { 'Z' } else { cmd });
        }

        Ok(parsed)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_arc(
        &self,
        parsed: &mut ParsedPathData,
        offset: usize,
        from: Point,
        to: Point,
        rx: f32,
        ry: f32,
        large_arc: bool,
        sweep: bool,
    ) -> Result<()> {
        if from == to {
            return Ok(());
        }
        if rx == 0.0 || ry == 0.0 {
            parsed.segments.push(Segment::LineTo(to));
            return Ok(());
        }
        let circular = (rx - ry).abs() <= CIRCULAR_EPS * rx.max(ry);
        if !circular {
            if self.strict {
                return Err(SigilError::UnsupportedGeometry { rx, ry });
            }
            warn!(offset, rx, ry, "Elliptical arc approximated by a straight line");
            parsed.warnings.push(GeometryWarning::EllipticalArc {
                offset,
                rx,
                ry,
                from,
                to,
            });
            parsed.segments.push(Segment::LineTo(to));
            return Ok(());
        }

        match ArcSpec::from_endpoints(from, to, rx.max(ry), large_arc, sweep) {
            Some(arc) => parsed.segments.push(Segment::Arc(arc)),
            None => parsed.segments.push(Segment::LineTo(to)),
        }
        Ok(())
    }
}

pub fn parse_path_data(d: &str) -> Result<ParsedPathData> {
    PathDataParser::new().parse(d)
}

/// Rebuild a [`Path`] from transported subpaths, collecting approximation warnings.
pub fn path_from_data(
    parser: &PathDataParser,
    data: &[SubpathData],
) -> Result<(Path, Vec<GeometryWarning>)> {
    let mut path = Path::default();
    let mut warnings = Vec::new();
    for entry in data {
        let parsed = parser.parse(&entry.d)?;
        warnings.extend(parsed.warnings);
        path.subpaths.push(Subpath::new(
            parsed.segments,
            PaintFlags {
                stroke: entry.stroke,
                fill: entry.fill,
            },
        ));
    }
    Ok((path, warnings))
}
