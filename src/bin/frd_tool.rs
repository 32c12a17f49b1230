use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use frd_tools_lib::texture_pipeline::{
    load_directory, tile, AtlasMapping, AtlasOptions, AtlasPacker,
};
use tracing::Level;

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  frd-tool inspect <file.frd> [-v]");
    eprintln!("  frd-tool atlas <texture_dir> <size|auto> [--uv-map] [--frd <file.frd>]");
    eprintln!("                 [--shift-y <f>] [--config <options.json>] [-v]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  frd-tool inspect TR02.FRD");
    eprintln!("  frd-tool atlas ./tr02 1024 --uv-map");
    eprintln!("  frd-tool atlas ./tr02 1024 --frd TR02.FRD --shift-y 0.5");
    std::process::exit(1);
}

struct AtlasArgs {
    dir: PathBuf,
    size: Option<u32>,
    uv_map: bool,
    frd: Option<PathBuf>,
    shift_y: Option<f64>,
    config: Option<PathBuf>,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> anyhow::Result<&'a str> {
    match args.get(i + 1) {
        Some(v) => Ok(v.as_str()),
        None => bail!("{} requires a value", flag),
    }
}

fn parse_atlas_args(args: &[String]) -> anyhow::Result<AtlasArgs> {
    if args.len() < 2 {
        usage();
    }
    let size = match args[1].as_str() {
        "auto" => None,
        s => Some(s.parse().with_context(|| format!("invalid atlas size '{}'", s))?),
    };
    let mut parsed = AtlasArgs {
        dir: PathBuf::from(&args[0]),
        size,
        uv_map: false,
        frd: None,
        shift_y: None,
        config: None,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-u" | "--uv-map" => {
                parsed.uv_map = true;
                i += 1;
            }
            "--frd" => {
                parsed.frd = Some(PathBuf::from(value(args, i, "--frd")?));
                i += 2;
            }
            "--shift-y" => {
                let raw = value(args, i, "--shift-y")?;
                parsed.shift_y = Some(
                    raw.parse()
                        .with_context(|| format!("invalid --shift-y '{}'", raw))?,
                );
                i += 2;
            }
            "--config" => {
                parsed.config = Some(PathBuf::from(value(args, i, "--config")?));
                i += 2;
            }
            "-v" | "--verbose" => i += 1,
            other => bail!("unknown argument '{}'", other),
        }
    }
    Ok(parsed)
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let track = frd_tools_lib::load(path)
        .with_context(|| format!("failed to decode {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&track.summary())?);
    Ok(())
}

fn atlas(args: AtlasArgs) -> anyhow::Result<()> {
    let mut options = match &args.config {
        Some(path) => AtlasOptions::from_json_file(path)
            .with_context(|| format!("failed to read options {}", path.display()))?,
        None => AtlasOptions::default(),
    };
    if let Some(shift_y) = args.shift_y {
        options.shift_y = shift_y;
    }

    let pairs = load_directory(&args.dir)?;
    options.atlas_size = match args.size {
        Some(size) => size,
        None => tile::smallest_atlas_size(pairs.iter().map(|p| p.size())),
    };
    let packer = AtlasPacker::build(options.atlas_size, &pairs)?;

    let cutouts = pairs.iter().filter(|p| p.is_cutout).count();
    eprintln!(
        "Packed {} textures ({} cutout) into {}x{}",
        pairs.len(),
        cutouts,
        options.atlas_size,
        options.atlas_size
    );

    let (albedo, mask) = packer.save(&args.dir)?;
    eprintln!("  Atlas: {}", albedo.display());
    eprintln!("  Mask:  {}", mask.display());

    let mut stem = args.dir.as_os_str().to_owned();
    stem.push("-uv_mapping.json");
    let mapping_path = PathBuf::from(stem);

    if let Some(frd_path) = &args.frd {
        let track = frd_tools_lib::load(frd_path)
            .with_context(|| format!("failed to decode {}", frd_path.display()))?;
        let mapping = AtlasMapping::remap_track(&packer, &track, options.shift_y)?;
        mapping.write_json(&mapping_path)?;
        eprintln!("  Track UV mapping ({} entries): {}", mapping.len(), mapping_path.display());
    } else if args.uv_map {
        let mapping = AtlasMapping::from_packer(&packer);
        mapping.write_json(&mapping_path)?;
        eprintln!("  UV mapping ({} entries): {}", mapping.len(), mapping_path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match args.get(1).map(String::as_str) {
        Some("inspect") => match args.get(2) {
            Some(path) => inspect(Path::new(path)),
            None => usage(),
        },
        Some("atlas") => atlas(parse_atlas_args(&args[2..])?),
        _ => usage(),
    }
}
