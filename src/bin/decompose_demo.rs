use collage::config::{self, RuntimeConfig};
use collage::decompose::Decomposer;
use collage::features::Feature;
use collage::raster::io::load_color_image;
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut config: Option<RuntimeConfig> = None;
    let mut input: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from("decomposition");
    let mut watershed = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                config = Some(config::load_config(Path::new(&path))?);
            }
            "--out" => {
                out_dir = PathBuf::from(
                    args.next().ok_or_else(|| "--out requires a path".to_string())?,
                );
            }
            "--watershed" => watershed = true,
            "--help" | "-h" => {
                println!(
                    "usage: decompose_demo [--config FILE] [--out DIR] [--watershed] [IMAGE]"
                );
                return Ok(());
            }
            other if input.is_none() => input = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument {other}")),
        }
    }

    let (input_path, decomposer) = match config {
        Some(config) => {
            if let Some(dir) = &config.output.output_dir {
                out_dir = dir.clone();
            }
            (config.input_path.clone(), config.decomposer())
        }
        None => {
            let input = input.ok_or_else(|| "no input image given".to_string())?;
            let decomposer = if watershed {
                Decomposer::Watershed(Default::default())
            } else {
                Decomposer::MeanShift(Default::default())
            };
            (input, decomposer)
        }
    };
    let image = load_color_image(&input_path)?;
    println!(
        "decomposing {} ({}x{}) with {}",
        input_path.display(),
        image.w,
        image.h,
        decomposer.method_name()
    );

    let mut graph = decomposer.run_batch(&image, &out_dir)?;
    let (fx, fy) = graph.prepare();
    println!("segments: {}", graph.len());
    println!(
        "suggested feature axes: {} / {}",
        Feature::label(fx),
        Feature::label(fy)
    );
    println!("snapshots and report written to {}", out_dir.display());

    Ok(())
}
