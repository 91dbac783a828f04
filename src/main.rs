use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use patchscan::config::{
    DEFAULT_CONF_THRESHOLD, DEFAULT_GRID_PADDING, DEFAULT_IOU_THRESHOLD,
    DEFAULT_MAX_GRID_COLUMNS, DEFAULT_PATCH_SIZE, DEFAULT_STRIDE,
};
use patchscan::{DetectionPipeline, DetectionReport, TilingConfig, YoloDetector, YoloParams, image_io, logging};

#[derive(Parser)]
#[command(name = "patchscan")]
#[command(about = "Detect people in large images by running a detector over overlapping patches")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Detection model (.onnx or .rten)
    #[arg(long, env = "MODEL_PATH", default_value = "util/yolo11n.onnx")]
    model: PathBuf,

    /// Patch side in pixels; should match the model input size
    #[arg(long, env = "PATCH_SIZE", default_value_t = DEFAULT_PATCH_SIZE)]
    patch_size: u32,

    /// Distance between patch origins
    #[arg(long, env = "STRIDE", default_value_t = DEFAULT_STRIDE)]
    stride: u32,

    /// Drop detections below this confidence
    #[arg(long, env = "CONF_THRESHOLD", default_value_t = DEFAULT_CONF_THRESHOLD)]
    conf_threshold: f32,

    /// Reserved; overlapping detections are not merged
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = DEFAULT_IOU_THRESHOLD)]
    iou_threshold: f32,

    /// Columns in the patch overview image
    #[arg(long, default_value_t = DEFAULT_MAX_GRID_COLUMNS)]
    max_grid_columns: usize,

    /// Gap between cells of the patch overview image
    #[arg(long, default_value_t = DEFAULT_GRID_PADDING)]
    grid_padding: u32,

    /// Only keep these model class ids (comma separated, e.g. "0" for person)
    #[arg(long, value_delimiter = ',')]
    classes: Vec<usize>,

    /// Directory for patches.png and result.png
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Also write detections.json
    #[arg(long)]
    json: bool,

    /// Save every patch visualization to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Run patch inference in parallel
    #[arg(long)]
    parallel: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init_logging(args.verbose);

    let config = TilingConfig::default()
        .with_patch_size(args.patch_size)
        .with_stride(args.stride)
        .with_conf_threshold(args.conf_threshold)
        .with_iou_threshold(args.iou_threshold)
        .with_grid(args.max_grid_columns, args.grid_padding);
    config.validate()?;

    // Fail on a bad debug directory before spending time on inference
    let debug_dir = args
        .debug_out
        .as_deref()
        .map(image_io::prepare_debug_dir)
        .transpose()?;

    info!("Loading image: {}", args.image_path.display());
    let img = image_io::load_image(&args.image_path)?;
    info!("Image loaded: {}x{}", img.width(), img.height());

    info!("Loading model: {}", args.model.display());
    let params = YoloParams {
        input_size: args.patch_size,
        classes: (!args.classes.is_empty()).then(|| args.classes.clone()),
        ..YoloParams::default()
    };
    let detector = YoloDetector::load(&args.model, params)?;

    let pipeline = DetectionPipeline::new(Arc::new(detector), config).with_parallel(args.parallel);
    let output = pipeline.run(&img)?;

    std::fs::create_dir_all(&args.output_dir)?;
    let grid_path = args.output_dir.join("patches.png");
    let result_path = args.output_dir.join("result.png");
    image_io::save_png(&output.patch_grid, &grid_path)?;
    image_io::save_png(&output.annotated, &result_path)?;
    info!("Saved {} and {}", grid_path.display(), result_path.display());

    if args.json {
        let report_path = args.output_dir.join("detections.json");
        DetectionReport::from_output(&output).write(&report_path)?;
        info!("Saved {}", report_path.display());
    }

    if let Some(dir) = debug_dir {
        for patch in &output.patches {
            let path = dir.join(format!("patch_{:03}.png", patch.index));
            image_io::save_png(&patch.visualization, &path)?;
        }
        info!("Saved {} patch images to {}", output.patches.len(), dir.display());
    }

    println!("\n=== Person Detection Results ===");
    println!("Patches processed: {}", output.patches.len());
    println!("Total detections: {}", output.detections.len());
    if args.verbose {
        for (i, det) in output.detections.iter().enumerate() {
            println!(
                "  {}: class {} at ({:.0}, {:.0})-({:.0}, {:.0}) - confidence: {:.2}",
                i + 1,
                det.class_id,
                det.x1,
                det.y1,
                det.x2,
                det.y2,
                det.confidence
            );
        }
    }

    Ok(())
}
