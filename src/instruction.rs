//! The closed set of drawing verbs a sigil is described with.
//!
//! Instructions arrive as JSON produced by an external generator, one object per call:
//! `{"verb": "arc", "args": [50, 50, 20, 0, 6.2832, false]}`. Decoding only pattern
//! matches on the verb name and reads literal numbers; nothing is ever evaluated.

use crate::config::ResourceLimits;
use crate::error::{ResourceLimit, Result, SigilError};
use crate::geometry::arc::ArcSpec;
use serde_json::{Value, json};
use usvg::tiny_skia_path::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    MoveTo(Point),
    LineTo(Point),
    Arc(ArcSpec),
    QuadraticCurve { ctrl: Point, to: Point },
    CubicCurve { ctrl1: Point, ctrl2: Point, to: Point },
    ClosePath,
    BeginPath,
    Stroke,
    Fill,
}

impl Instruction {
    pub fn verb(&self) -> &'static str {
        match self {
            Instruction::MoveTo(_) => "moveTo",
            Instruction::LineTo(_) => "lineTo",
            Instruction::Arc(_) => "arc",
            Instruction::QuadraticCurve { .. } => "quadraticCurveTo",
            Instruction::CubicCurve { .. } => "bezierCurveTo",
            Instruction::ClosePath => "closePath",
            Instruction::BeginPath => "beginPath",
            Instruction::Stroke => "stroke",
            Instruction::Fill => "fill",
        }
    }

    /// Decode one instruction object. `index` is only used for error reporting.
    pub fn from_json(index: usize, value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(SigilError::malformed(index, "expected an object"));
        };
        let verb = match map.get("verb") {
            Some(Value::String(verb)) => verb.as_str(),
            Some(_) => return Err(SigilError::malformed(index, "verb must be a string")),
            None => return Err(SigilError::malformed(index, "missing verb")),
        };
        let args: &[Value] = match map.get("args") {
            Some(Value::Array(args)) => args,
            Some(Value::Null) | None => &[],
            Some(_) => return Err(SigilError::malformed(index, "args must be an array")),
        };
        let args = Args { index, verb, args };

        let instruction = match verb {
            "moveTo" => {
                args.expect_len(2, 2)?;
                Instruction::MoveTo(args.point(0)?)
            }
            "lineTo" => {
                args.expect_len(2, 2)?;
                Instruction::LineTo(args.point(0)?)
            }
            "arc" => {
                args.expect_len(5, 6)?;
                Instruction::Arc(ArcSpec {
                    center: args.point(0)?,
                    radius: args.number(2)?,
                    start_angle: args.number(3)?,
                    end_angle: args.number(4)?,
                    counter_clockwise: args.flag(5)?,
                })
            }
            "quadraticCurveTo" | "quadraticCurve" => {
                args.expect_len(4, 4)?;
                Instruction::QuadraticCurve {
                    ctrl: args.point(0)?,
                    to: args.point(2)?,
                }
            }
            "bezierCurveTo" | "cubicCurveTo" | "cubicCurve" => {
                args.expect_len(6, 6)?;
                Instruction::CubicCurve {
                    ctrl1: args.point(0)?,
                    ctrl2: args.point(2)?,
                    to: args.point(4)?,
                }
            }
            "closePath" => {
                args.expect_len(0, 0)?;
                Instruction::ClosePath
            }
            "beginPath" => {
                args.expect_len(0, 0)?;
                Instruction::BeginPath
            }
            "stroke" => {
                args.expect_len(0, 0)?;
                Instruction::Stroke
            }
            "fill" => {
                args.expect_len(0, 0)?;
                Instruction::Fill
            }
            other => {
                return Err(SigilError::malformed(
                    index,
                    format!("unknown verb `{other}`"),
                ));
            }
        };
        Ok(instruction)
    }

    pub fn to_json(&self) -> Value {
        let args: Vec<Value> = match self {
            Instruction::MoveTo(p) | Instruction::LineTo(p) => vec![json!(p.x), json!(p.y)],
            Instruction::Arc(arc) => vec![
                json!(arc.center.x),
                json!(arc.center.y),
                json!(arc.radius),
                json!(arc.start_angle),
                json!(arc.end_angle),
                json!(arc.counter_clockwise),
            ],
            Instruction::QuadraticCurve { ctrl, to } => {
                vec![json!(ctrl.x), json!(ctrl.y), json!(to.x), json!(to.y)]
            }
            Instruction::CubicCurve { ctrl1, ctrl2, to } => vec![
                json!(ctrl1.x),
                json!(ctrl1.y),
                json!(ctrl2.x),
                json!(ctrl2.y),
                json!(to.x),
                json!(to.y),
            ],
            Instruction::ClosePath
            | Instruction::BeginPath
            | Instruction::Stroke
            | Instruction::Fill => vec![],
        };
        json!({ "verb": self.verb(), "args": args })
    }
}

struct Args<'a> {
    index: usize,
    verb: &'a str,
    args: &'a [Value],
}

impl Args<'_> {
    fn expect_len(&self, min: usize, max: usize) -> Result<()> {
        let len = self.args.len();
        if len < min || len > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} to {max}")
            };
            return Err(SigilError::malformed(
                self.index,
                format!("`{}` expects {expected} arguments, got {len}", self.verb),
            ));
        }
        Ok(())
    }

    fn number(&self, i: usize) -> Result<f32> {
        let value = self.args[i].as_f64().ok_or_else(|| {
            SigilError::malformed(
                self.index,
                format!("`{}` argument {i} must be a number", self.verb),
            )
        })?;
        let value = value as f32;
        if !value.is_finite() {
            return Err(SigilError::malformed(
                self.index,
                format!("`{}` argument {i} is not a finite f32", self.verb),
            ));
        }
        Ok(value)
    }

    fn point(&self, i: usize) -> Result<Point> {
        Ok(Point::from_xy(self.number(i)?, self.number(i + 1)?))
    }

    fn flag(&self, i: usize) -> Result<bool> {
        match self.args.get(i) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(SigilError::malformed(
                self.index,
                format!("`{}` argument {i} must be a boolean", self.verb),
            )),
        }
    }
}

/// Decode a JSON array of instruction objects, enforcing the instruction budget first.
pub fn decode_instructions(json: &str, limits: &ResourceLimits) -> Result<Vec<Instruction>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SigilError::malformed(0, format!("invalid JSON: {e}")))?;
    let Value::Array(entries) = value else {
        return Err(SigilError::malformed(0, "expected a JSON array of instructions"));
    };
    if entries.len() > limits.max_instructions {
        return Err(SigilError::ResourceLimitExceeded(
            ResourceLimit::Instructions {
                count: entries.len(),
                max: limits.max_instructions,
            },
        ));
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| Instruction::from_json(i, entry))
        .collect()
}

pub fn encode_instructions(instructions: &[Instruction]) -> String {
    Value::Array(instructions.iter().map(Instruction::to_json).collect()).to_string()
}
