use std::path::PathBuf;

use silhouette::io::load_image;
use silhouette::{analyze_with_color, AnalysisParams, DescriptorKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: analyze_image <image_path>");
        return Ok(());
    };

    let loaded = load_image(&path)?;
    let analysis = analyze_with_color(loaded.gray, Some(loaded.color), &AnalysisParams::default())?;

    println!("{} ({:?} selection)", path.display(), analysis.selection());
    let desc = analysis.descriptors();
    for kind in DescriptorKind::ALL {
        println!("  {:<22} {:>10.4}", kind.name(), desc.get(kind));
    }
    for entry in &analysis.distances.entries {
        println!("  {:<22} {:>10.4}", entry.kind.name(), entry.distance);
    }
    for kind in analysis.distances.missing() {
        println!("  {:<22} {:>10}", kind.name(), "no contour");
    }
    Ok(())
}
