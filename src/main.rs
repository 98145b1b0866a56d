use collage::prelude::*;

fn main() {
    // Demo stub: decomposes a synthetic two-tone image and arranges it
    let w = 64usize;
    let h = 48usize;
    let mut image: Raster<Color> = Raster::new(w, h);
    for y in 0..h {
        for x in 0..w {
            *image.at_mut(x, y) = if x < w / 2 {
                Color::from_rgb(200, 40, 40)
            } else {
                Color::from_rgb(40, 40, 200)
            };
        }
    }

    let decomposer = Decomposer::MeanShift(MeanShiftParams {
        sigma_pos: 4.0,
        min_size: 10,
        ..Default::default()
    });
    let mut graph = match decomposer.run(&image) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    let (fx, fy) = graph.prepare();
    println!(
        "segments={} suggested_axes=({}, {})",
        graph.len(),
        Feature::label(fx),
        Feature::label(fy)
    );

    let arranger = Arranger::ForceDirected(ForceDirectedParams::default());
    match arranger.run(&mut graph) {
        Ok(layout) => println!("placed={}", layout.members.len()),
        Err(err) => eprintln!("arrangement skipped: {err}"),
    }
}
