use anyhow::{Context, bail};
use sigil_sdf::deadline::Deadline;
use sigil_sdf::interpreter::interpret;
use sigil_sdf::png_writer::save_png;
use sigil_sdf::svg_parser::to_path_data;
use sigil_sdf::{SigilConfig, SigilGenerator, decode_instructions};
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "usage: sigil-sdf <instructions.json> <out.png> [config.json] [--path-data]";

struct Args {
    input: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    print_path_data: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut print_path_data = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--path-data" => print_path_data = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    let (Some(input), Some(output)) = (positional.next(), positional.next()) else {
        bail!("{USAGE}");
    };
    let config = positional.next();
    if positional.next().is_some() {
        bail!("{USAGE}");
    }
    Ok(Args {
        input,
        output,
        config,
        print_path_data,
    })
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SigilConfig> {
    let Some(path) = path else {
        return Ok(SigilConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::fmt().init();

    let args = parse_args()?;
    let config = load_config(args.config.as_ref())?;
    let generator = SigilGenerator::new(config).context("invalid configuration")?;
    let limits = &generator.config().limits;

    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let deadline = Deadline::start(limits.time_budget());
    let instructions = decode_instructions(&json, limits)?;
    let path = interpret(&instructions, limits)?;

    if args.print_path_data {
        println!("{}", serde_json::to_string_pretty(&to_path_data(&path))?);
    }

    let texture = generator.generate_path(&path, &deadline)?;
    save_png(&args.output, &texture)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    eprintln!("{}", serde_json::to_string(&texture)?);
    Ok(())
}
