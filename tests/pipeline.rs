use sigil_sdf::cpu_renderer::{CpuRasterizer, Rasterizer};
use sigil_sdf::deadline::Deadline;
use sigil_sdf::distance_field::DistanceField;
use sigil_sdf::geometry::arc::ArcSpec;
use sigil_sdf::geometry::transform::SigilTransform;
use sigil_sdf::interpreter::interpret;
use sigil_sdf::path::{Path, Segment};
use sigil_sdf::png_writer::has_png_signature;
use sigil_sdf::svg_parser::{PathDataParser, SubpathData, path_from_data, to_path_data};
use sigil_sdf::{
    DistanceMethod, ErrorKind, Instruction, SigilConfig, SigilError, SigilGenerator,
    decode_instructions, generate_sigil,
};
use std::f32::consts::TAU;
use std::time::{Duration, Instant};
use usvg::tiny_skia_path::Point;

fn pt(x: f32, y: f32) -> Point {
    Point::from_xy(x, y)
}

fn circle(cx: f32, cy: f32, r: f32) -> Instruction {
    Instruction::Arc(ArcSpec {
        center: pt(cx, cy),
        radius: r,
        start_angle: 0.0,
        end_angle: TAU,
        counter_clockwise: false,
    })
}

fn field_for(instructions: &[Instruction], config: SigilConfig) -> DistanceField {
    let generator = SigilGenerator::new(config).unwrap();
    let path = interpret(instructions, &generator.config().limits).unwrap();
    generator
        .render_field(&path, &Deadline::unbounded())
        .unwrap()
}

#[test]
fn diagonal_stroke_64() {
    let instructions = [
        Instruction::MoveTo(pt(10.0, 10.0)),
        Instruction::LineTo(pt(90.0, 90.0)),
        Instruction::Stroke,
    ];
    let config = SigilConfig::with_output_size(64, 64);

    let texture = generate_sigil(&instructions, &config).unwrap();
    assert_eq!((texture.width, texture.height), (64, 64));
    assert!(has_png_signature(&texture.data));

    let field = field_for(&instructions, config);
    assert_eq!(field.values().len(), 64 * 64);
    // Source (50, 50) lands on output (32, 32).
    let on_line = field.get(32, 32);
    assert!(on_line.abs_diff(128) <= 10, "on line {on_line}");
    let corner = field.get(0, 63);
    assert!(corner <= 28 || corner == 1, "corner {corner}");
}

#[test]
fn stroked_circle_ring_128() {
    let instructions = [circle(50.0, 50.0, 20.0), Instruction::Stroke];
    let field = field_for(&instructions, SigilConfig::with_output_size(128, 128));

    // Radius 20 in canvas units is 25.6 output pixels around (64, 64).
    let ring = field.get(89, 64);
    assert!(ring >= 128, "ring {ring}");
    // Walking outward, the first inside pixel and the last outside one straddle
    // the boundary at distance 1, so both sit within 127 / 32 of 128.
    let first_inside = (64..128u32)
        .find(|&x| field.get(x, 64) >= 128)
        .expect("ring crosses the row");
    assert!((86..=90).contains(&first_inside), "inner edge at {first_inside}");
    for x in [first_inside - 1, first_inside] {
        let value = field.get(x, 64);
        assert!(value.abs_diff(128) <= 8, "x {x} value {value}");
    }
    let center = field.get(64, 64);
    assert!(center > 1 && center < 60, "center {center}");

    // Moving toward the ring from the center the value rises, past it the value falls.
    let inner: Vec<u8> = (64..=84).step_by(4).map(|x| field.get(x, 64)).collect();
    assert!(inner.windows(2).all(|w| w[0] < w[1]), "{inner:?}");
    let outer: Vec<u8> = (92..=124).step_by(4).map(|x| field.get(x, 64)).collect();
    assert!(outer.windows(2).all(|w| w[0] >= w[1]), "{outer:?}");
    assert_eq!(field.get(127, 0), 1);
}

#[test]
fn composite_bridge_round_trip() {
    let instructions = [
        Instruction::BeginPath,
        circle(50.0, 50.0, 30.0),
        Instruction::Stroke,
        Instruction::BeginPath,
        circle(40.0, 45.0, 4.0),
        Instruction::Fill,
        Instruction::BeginPath,
        circle(60.0, 45.0, 4.0),
        Instruction::Fill,
    ];
    let config = SigilConfig {
        search_radius: 8,
        ..SigilConfig::with_output_size(96, 96)
    };
    let generator = SigilGenerator::new(config).unwrap();
    let path = interpret(&instructions, &generator.config().limits).unwrap();
    assert_eq!(path.subpaths.len(), 3);

    let json = serde_json::to_string(&to_path_data(&path)).unwrap();
    let data: Vec<SubpathData> = serde_json::from_str(&json).unwrap();
    let (restored, warnings) = path_from_data(&PathDataParser::strict(), &data).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(restored.subpaths.len(), 3);
    assert!(restored.subpaths[0].paint.stroke);
    assert!(restored.subpaths[1].paint.fill && restored.subpaths[2].paint.fill);

    let texture = generator
        .generate_path(&restored, &Deadline::unbounded())
        .unwrap();
    assert!(has_png_signature(&texture.data));
    assert_eq!((texture.width, texture.height), (96, 96));
}

#[test]
fn full_circle_is_written_as_two_arcs() {
    let instructions = [circle(50.0, 50.0, 20.0), Instruction::Stroke];
    let path = interpret(&instructions, &Default::default()).unwrap();
    let data = to_path_data(&path);
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].d.matches('A').count(), 2, "{}", data[0].d);

    let (restored, _) = path_from_data(&PathDataParser::new(), &data).unwrap();
    let config = SigilConfig::with_output_size(64, 64);
    let grid = CpuRasterizer
        .rasterize(
            &restored,
            &SigilTransform::from_config(&config),
            config.stroke_width,
            64,
            64,
            &Deadline::unbounded(),
        )
        .unwrap();
    let bounds = grid.occupied_bounds().expect("ring is drawn");
    // Ring of radius 12.8 around the center, with a 2 px stroke.
    assert!((bounds.width() - 27.6).abs() <= 2.0, "{bounds:?}");
    // The center of the ring stays empty.
    assert!(!grid.get(32, 32));
}

#[test]
fn round_trip_keeps_segments() {
    let mut path = Path::default();
    path.subpaths.push(sigil_sdf::path::Subpath::new(
        vec![
            Segment::MoveTo(pt(10.0, 20.0)),
            Segment::LineTo(pt(30.5, 20.25)),
            Segment::QuadTo {
                ctrl: pt(40.0, 0.0),
                to: pt(50.0, 20.0),
            },
            Segment::CubicTo {
                ctrl1: pt(60.0, 40.0),
                ctrl2: pt(70.0, 0.125),
                to: pt(80.0, 20.0),
            },
            Segment::Close,
        ],
        sigil_sdf::path::PaintFlags {
            stroke: true,
            fill: false,
        },
    ));
    let (restored, warnings) =
        path_from_data(&PathDataParser::new(), &to_path_data(&path)).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(restored, path);
}

#[test]
fn output_is_deterministic() {
    let instructions = [
        circle(50.0, 50.0, 25.0),
        Instruction::Stroke,
        Instruction::BeginPath,
        Instruction::MoveTo(pt(20.0, 80.0)),
        Instruction::CubicCurve {
            ctrl1: pt(30.0, 10.0),
            ctrl2: pt(70.0, 10.0),
            to: pt(80.0, 80.0),
        },
        Instruction::Stroke,
    ];
    let config = SigilConfig::with_output_size(48, 48);
    let first = generate_sigil(&instructions, &config).unwrap();
    let second = generate_sigil(&instructions, &config).unwrap();
    assert_eq!(first.data, second.data);
}

#[test]
fn artwork_scale_halves_and_centers() {
    let instructions = [
        Instruction::MoveTo(pt(20.0, 20.0)),
        Instruction::LineTo(pt(80.0, 20.0)),
        Instruction::LineTo(pt(80.0, 80.0)),
        Instruction::LineTo(pt(20.0, 80.0)),
        Instruction::ClosePath,
        Instruction::Fill,
    ];
    let path = interpret(&instructions, &Default::default()).unwrap();

    let bounds_at = |artwork_scale: f32| {
        let config = SigilConfig {
            artwork_scale,
            ..SigilConfig::with_output_size(100, 100)
        };
        CpuRasterizer
            .rasterize(
                &path,
                &SigilTransform::from_config(&config),
                config.stroke_width,
                100,
                100,
                &Deadline::unbounded(),
            )
            .unwrap()
            .occupied_bounds()
            .unwrap()
    };

    let full = bounds_at(1.0);
    let half = bounds_at(0.5);
    assert!((full.width() / 2.0 - half.width()).abs() <= 1.0, "{full:?} {half:?}");
    assert!((full.height() / 2.0 - half.height()).abs() <= 1.0, "{full:?} {half:?}");
    let [cx, cy] = half.mid_point();
    assert!((cx - 50.0).abs() <= 1.0 && (cy - 50.0).abs() <= 1.0, "{half:?}");
}

#[test]
fn unpainted_input_is_empty_path() {
    let config = SigilConfig::with_output_size(16, 16);
    assert_eq!(
        generate_sigil(&[], &config).unwrap_err().kind(),
        ErrorKind::EmptyPath
    );
    assert_eq!(
        generate_sigil(&[Instruction::BeginPath, Instruction::ClosePath], &config)
            .unwrap_err()
            .kind(),
        ErrorKind::EmptyPath
    );
}

#[test]
fn paint_without_geometry_is_empty_path() {
    let config = SigilConfig::with_output_size(16, 16);
    let cases: [&[Instruction]; 3] = [
        &[Instruction::Stroke],
        &[Instruction::BeginPath, Instruction::ClosePath, Instruction::Fill],
        &[Instruction::MoveTo(pt(5.0, 5.0)), Instruction::Stroke],
    ];
    for instructions in cases {
        assert_eq!(
            generate_sigil(instructions, &config).unwrap_err().kind(),
            ErrorKind::EmptyPath,
            "{instructions:?}"
        );
    }
}

#[test]
fn time_budget_bounds_wall_clock() {
    let mut config = SigilConfig {
        search_radius: 256,
        ..SigilConfig::with_output_size(256, 256)
    };
    config.limits.time_budget_ms = 20;
    let instructions = [circle(50.0, 50.0, 20.0), Instruction::Stroke];

    let started = Instant::now();
    let err = generate_sigil(&instructions, &config).unwrap_err();
    let elapsed = started.elapsed();
    assert_eq!(err.kind(), ErrorKind::ResourceLimitExceeded);
    assert!(elapsed < Duration::from_millis(200), "{elapsed:?}");
}

#[test]
fn unknown_verb_is_rejected() {
    let json = r#"[{"verb": "moveTo", "args": [1, 2]}, {"verb": "eval", "args": ["x"]}]"#;
    let err = decode_instructions(json, &Default::default()).unwrap_err();
    assert!(
        matches!(err, SigilError::MalformedInstruction { index: 1, .. }),
        "{err}"
    );
}

#[test]
fn exact_method_matches_bounded() {
    let instructions = [
        circle(50.0, 50.0, 20.0),
        Instruction::Stroke,
        Instruction::BeginPath,
        circle(50.0, 50.0, 5.0),
        Instruction::Fill,
    ];
    let bounded = SigilConfig {
        search_radius: 12,
        ..SigilConfig::with_output_size(64, 64)
    };
    let exact = SigilConfig {
        distance_method: DistanceMethod::Exact,
        ..bounded.clone()
    };
    assert_eq!(
        field_for(&instructions, bounded),
        field_for(&instructions, exact)
    );
}

#[test]
fn segment_budget_is_enforced() {
    let mut config = SigilConfig::with_output_size(16, 16);
    config.limits.max_segments = 3;
    let instructions: Vec<Instruction> = (0..5)
        .map(|i| Instruction::LineTo(pt(i as f32 * 10.0, 5.0)))
        .chain([Instruction::Stroke])
        .collect();
    assert_eq!(
        generate_sigil(&instructions, &config).unwrap_err().kind(),
        ErrorKind::ResourceLimitExceeded
    );
}

#[test]
fn batch_keeps_request_order() {
    let config = SigilConfig {
        search_radius: 6,
        ..SigilConfig::with_output_size(32, 32)
    };
    let generator = SigilGenerator::new(config).unwrap();
    let requests: Vec<Vec<Instruction>> = (1..=6)
        .map(|i| vec![circle(50.0, 50.0, i as f32 * 6.0), Instruction::Stroke])
        .collect();

    let batch = generator.generate_batch(&requests, 4);
    assert_eq!(batch.len(), requests.len());
    for (request, result) in requests.iter().zip(&batch) {
        let expected = generator.generate(request).unwrap();
        assert_eq!(result.as_ref().unwrap(), &expected);
    }
}
