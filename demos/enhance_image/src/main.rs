use argh::FromArgs;
use std::path::PathBuf;

use roofsight::pipeline::{self, codec, Enhancer, PipelineConfig, ProcessingOptions};

#[derive(FromArgs)]
/// Enhance an aerial roof capture and write it with its metadata
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// path of the output image; .jpg/.jpeg writes JPEG, anything else PNG
    #[argh(option, short = 'o')]
    output_path: PathBuf,

    /// optional JSON file with pipeline tunables
    #[argh(option)]
    config: Option<PathBuf>,

    /// latitude of the capture center in degrees
    #[argh(option, default = "0.0")]
    latitude: f64,

    /// map zoom level of the capture
    #[argh(option, default = "20.0")]
    zoom: f64,

    /// working width in pixels, 0 keeps the input width
    #[argh(option, default = "0")]
    width: usize,

    /// working height in pixels, 0 keeps the input height
    #[argh(option, default = "0")]
    height: usize,

    /// posterize the image by color instead of enhancing it
    #[argh(switch)]
    segment: bool,

    /// render the pitch visualization instead of enhancing
    #[argh(switch)]
    pitch: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let enhancer = Enhancer::new(config);

    let input = codec::read_image(&args.image_path)?;
    log::info!("read {} ({})", args.image_path.display(), input.size());

    if args.segment {
        let out = enhancer.segment(&input);
        codec::write_image(
            &args.output_path,
            &out,
            enhancer.config().segmentation_jpeg_quality,
        )?;
        return Ok(());
    }

    if args.pitch {
        // false-color slopes keep hard boundaries, so pitch output is always PNG
        let out = pipeline::enhance_roof_pitch(&input);
        std::fs::write(&args.output_path, codec::encode_png(&out)?)?;
        log::info!("wrote pitch visualization to {}", args.output_path.display());
        return Ok(());
    }

    let mut options = ProcessingOptions {
        latitude: args.latitude,
        zoom: args.zoom,
        ..Default::default()
    };
    options.dimensions.width = args.width;
    options.dimensions.height = args.height;

    let result = enhancer.enhance(input, &options);
    if let Some(reason) = &result.degraded {
        log::warn!("enhancement degraded: {}", reason);
    }
    println!(
        "quality {} -> {} ({})",
        result.initial_quality,
        result.quality_score,
        result.stages_applied.join(", ")
    );

    codec::write_image(&args.output_path, &result.buffer, enhancer.config().jpeg_quality)?;

    let metadata_path = args.output_path.with_extension("json");
    std::fs::write(
        &metadata_path,
        serde_json::to_string_pretty(&result.metadata)?,
    )?;
    log::info!("wrote metadata to {}", metadata_path.display());

    Ok(())
}
