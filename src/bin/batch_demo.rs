use collage::arrange::{Arranger, ClusteredParams, ForceDirectedParams};
use collage::config::{self, RuntimeConfig};
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
    let mut positional: Vec<PathBuf> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                config = Some(config::load_config(Path::new(&path))?);
            }
            "--help" | "-h" => {
                println!("usage: batch_demo [--config FILE] [IMAGE [OUT_DIR]]");
                return Ok(());
            }
            other => positional.push(PathBuf::from(other)),
        }
    }

    let (input_path, out_dir, decomposer) = match config {
        Some(config) => {
            let out = config
                .output
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("batch"));
            (config.input_path.clone(), out, config.decomposer())
        }
        None => {
            let input = positional
                .first()
                .cloned()
                .ok_or_else(|| "no input image given".to_string())?;
            let out = positional
                .get(1)
                .cloned()
                .unwrap_or_else(|| PathBuf::from("batch"));
            (input, out, collage::Decomposer::MeanShift(Default::default()))
        }
    };

    let image = load_color_image(&input_path)?;
    println!(
        "batch run on {} ({}x{})",
        input_path.display(),
        image.w,
        image.h
    );

    let mut graph = decomposer.run_batch(&image, &out_dir.join("decompose"))?;
    let (fx, fy) = graph.prepare();
    println!(
        "decomposed into {} segments, suggested axes {} / {}",
        graph.len(),
        Feature::label(fx),
        Feature::label(fy)
    );

    let force_directed = Arranger::ForceDirected(ForceDirectedParams::default());
    force_directed.run_batch(&mut graph, &out_dir.join("force_directed"))?;
    println!("force-directed sweep written to {}", out_dir.join("force_directed").display());

    let clustered = Arranger::Clustered(ClusteredParams::default());
    clustered.run_batch(&mut graph, &out_dir.join("clustered"))?;
    println!("clustered sweep written to {}", out_dir.join("clustered").display());

    Ok(())
}
