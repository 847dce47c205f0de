use image::ImageReader;
use lepimetry::convert::{mask_from_luma, rgb_view};
use lepimetry::core::specimen_scope;
use lepimetry::{PipelineParams, SpecimenInputs, SpecimenPipeline};

#[cfg(feature = "tracing")]
use lepimetry::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use lepimetry::core::init_with_level;

fn load_mask(path: &str) -> Result<lepimetry::BinaryMask, Box<dyn std::error::Error>> {
    Ok(mask_from_luma(&ImageReader::open(path)?.decode()?.to_luma8()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    init_with_level(log::LevelFilter::Info)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [config, rgb, ruler, specimen, rest @ ..] = args.as_slice() else {
        eprintln!("Usage: measure_masks <config.json> <rgb.png> <ruler.png> <specimen.png> [tags.png]");
        return Ok(());
    };

    let params: PipelineParams = serde_json::from_str(&std::fs::read_to_string(config)?)?;
    let _scope = specimen_scope(rgb.as_str());
    let rgb = ImageReader::open(rgb)?.decode()?.to_rgb8();
    let ruler = load_mask(ruler)?;
    let specimen = load_mask(specimen)?;
    let tags = rest.first().map(|p| load_mask(p)).transpose()?;

    let report = SpecimenPipeline::new(params).run(&SpecimenInputs {
        rgb: rgb_view(&rgb),
        ruler: &ruler,
        specimen: &specimen,
        tags: tags.as_ref(),
    })?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
