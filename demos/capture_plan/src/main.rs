use argh::FromArgs;

use roofsight::framing::{CaptureMode, FramingCalculator, PropertySize, Viewport};

#[derive(FromArgs)]
/// Plan the zoom, heading and tilt of the captures of a property
struct Args {
    /// latitude of the property in degrees
    #[argh(option)]
    latitude: f64,

    /// property width in meters
    #[argh(option)]
    width: Option<f64>,

    /// property depth in meters
    #[argh(option)]
    height: Option<f64>,

    /// building footprint area in square meters, used when no size is given
    #[argh(option)]
    building_area: Option<f64>,

    /// viewport width in pixels
    #[argh(option, default = "1200")]
    viewport_width: u32,

    /// viewport height in pixels
    #[argh(option, default = "800")]
    viewport_height: u32,

    /// tilt the side views for a perspective capture
    #[argh(switch)]
    perspective: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let property = match (args.width, args.height, args.building_area) {
        (Some(width), Some(height), _) => PropertySize::new(width, height)?,
        (_, _, Some(area)) => PropertySize::from_building_area(area)?,
        _ => {
            log::info!("no property size given, using the default estimate");
            PropertySize::default_estimate()
        }
    };

    let mode = if args.perspective {
        CaptureMode::Perspective
    } else {
        CaptureMode::Flat
    };

    let calculator = FramingCalculator::default();
    let viewport = Viewport::new(args.viewport_width, args.viewport_height);
    let plan = calculator.plan_capture(&property, args.latitude, viewport, mode)?;

    let report = calculator.validate_fit(
        property.width_m,
        property.height_m,
        plan.zoom_plan.optimal_zoom,
        args.latitude,
        viewport,
    )?;
    if let Some(warning) = &report.warning {
        log::warn!("{}", warning);
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
