mod common;

use std::sync::Arc;

use common::*;
use image::DynamicImage;
use patchscan::{DetectionReport, image_io};

fn pipeline(detector: Arc<dyn Detector>) -> DetectionPipeline {
    DetectionPipeline::new(detector, TilingConfig::default())
}

#[test]
fn test_overlapping_patches_report_every_duplicate() -> anyhow::Result<()> {
    // 1000x700 with S=640, T=80: origins x in {0, 80, 160, 240, 320}, y = 0
    let img = image_with_square(1000, 700, 700, 400, 20, 30);
    let output = pipeline(Arc::new(BrightSpotDetector)).run(&img)?;

    assert_eq!(output.patches.len(), 5);
    assert!(!output.padding.was_padded);

    // Every patch that fully contains the square reports it; nothing is merged
    let expected = Detection::new(700.0, 400.0, 720.0, 430.0, 0.9, 0);
    assert_eq!(output.detections, vec![expected; 4]);

    let per_patch: Vec<usize> = output.patches.iter().map(|p| p.detections.len()).collect();
    assert_eq!(per_patch, vec![0, 1, 1, 1, 1]);

    // Patch-local boxes keep patch coordinates
    let second = &output.patches[1];
    assert_eq!(second.x_offset, 80);
    assert_eq!(second.detections[0], Detection::new(620.0, 400.0, 640.0, 430.0, 0.9, 0));
    assert_eq!(*second.visualization.get_pixel(620, 415), GREEN);

    assert_eq!(output.annotated.dimensions(), (1000, 700));
    assert_eq!(*output.annotated.get_pixel(700, 415), GREEN);

    // Five cells in one row, captions above
    assert_eq!(output.patch_grid.dimensions(), (5 * 640 + 4 * 10, 640 + 20));
    Ok(())
}

#[test]
fn test_padded_result_is_cropped_to_input_size() -> anyhow::Result<()> {
    let img = image_with_square(300, 200, 10, 10, 10, 10);
    let output = pipeline(Arc::new(BrightSpotDetector)).run(&img)?;

    assert!(output.padding.was_padded);
    assert_eq!(output.padding.original_size(), (200, 300));
    assert_eq!(output.patches.len(), 1);
    assert_eq!(output.annotated.dimensions(), (300, 200));
    assert_eq!(output.detections, vec![Detection::new(10.0, 10.0, 20.0, 20.0, 0.9, 0)]);
    assert_eq!(*output.annotated.get_pixel(10, 15), GREEN);
    assert_eq!(output.patch_grid.dimensions(), (640, 660));
    Ok(())
}

#[test]
fn test_confidence_threshold_applies_per_patch() -> anyhow::Result<()> {
    let detector = FixedDetector::new(vec![
        Detection::new(1.0, 1.0, 5.0, 5.0, 0.39, 0),
        Detection::new(1.0, 1.0, 5.0, 5.0, 0.40, 0),
        Detection::new(1.0, 1.0, 5.0, 5.0, 0.90, 0),
    ]);
    let img = DynamicImage::ImageRgb8(gradient_image(700, 700));

    let output = pipeline(detector.clone()).run(&img)?;

    assert_eq!(detector.call_count(), 1);
    assert_eq!(output.detections.len(), 2);
    assert!(output.detections.iter().all(|d| d.confidence >= 0.40));
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected_before_inference() {
    let detector = FixedDetector::new(Vec::new());
    let img = DynamicImage::ImageRgb8(gradient_image(64, 64));

    for config in [
        TilingConfig::default().with_stride(0),
        TilingConfig::default().with_patch_size(0),
        TilingConfig::default().with_conf_threshold(1.5),
        TilingConfig::default().with_iou_threshold(f32::NAN),
        TilingConfig::default().with_grid(0, 10),
    ] {
        let result = DetectionPipeline::new(detector.clone(), config).run(&img);
        assert!(matches!(result, Err(TileError::Configuration(_))));
    }
    assert_eq!(detector.call_count(), 0);
}

#[test]
fn test_detector_failure_aborts_the_run() {
    let img = DynamicImage::ImageRgb8(gradient_image(700, 700));
    let err = pipeline(Arc::new(FailingDetector)).run(&img).unwrap_err();

    match &err {
        TileError::DetectorFailure { patch_index, .. } => assert_eq!(*patch_index, 0),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("inference backend unavailable"));
}

#[test]
fn test_malformed_detector_output_is_a_failure() {
    let img = DynamicImage::ImageRgb8(gradient_image(640, 640));
    let result = pipeline(Arc::new(MalformedDetector)).run(&img);
    assert!(matches!(result, Err(TileError::DetectorFailure { .. })));
}

#[test]
fn test_oversized_boxes_are_drawn_without_failing() -> anyhow::Result<()> {
    let detector = FixedDetector::new(vec![Detection::new(-1e10, -1e10, 1e10, 1e10, 0.9, 0)]);
    let img = DynamicImage::ImageRgb8(gradient_image(640, 640));

    let output = pipeline(detector).run(&img)?;

    assert_eq!(output.detections.len(), 1);
    assert_eq!(output.annotated.dimensions(), (640, 640));
    Ok(())
}

#[test]
fn test_empty_image_is_invalid() {
    let img = DynamicImage::new_rgb8(0, 0);
    let result = pipeline(Arc::new(BrightSpotDetector)).run(&img);
    assert!(matches!(result, Err(TileError::InvalidImage(_))));
}

#[test]
fn test_parallel_run_matches_sequential() -> anyhow::Result<()> {
    let img = image_with_square(900, 800, 500, 300, 40, 60);
    let config = TilingConfig::default().with_patch_size(256).with_stride(128);

    let sequential = DetectionPipeline::new(Arc::new(BrightSpotDetector), config.clone()).run(&img)?;
    let parallel = DetectionPipeline::new(Arc::new(BrightSpotDetector), config)
        .with_parallel(true)
        .run(&img)?;

    assert!(!sequential.detections.is_empty());
    assert_eq!(sequential.detections, parallel.detections);
    assert_eq!(sequential.patch_grid, parallel.patch_grid);
    assert_eq!(sequential.annotated, parallel.annotated);
    let offsets = |o: &DetectionOutput| -> Vec<(usize, u32, u32)> {
        o.patches.iter().map(|p| (p.index, p.x_offset, p.y_offset)).collect()
    };
    assert_eq!(offsets(&sequential), offsets(&parallel));
    Ok(())
}

#[test]
fn test_repeated_runs_are_identical() -> anyhow::Result<()> {
    let img = image_with_square(1300, 700, 100, 100, 50, 50);
    let pipeline = pipeline(Arc::new(BrightSpotDetector));

    let first = pipeline.run(&img)?;
    let second = pipeline.run(&img)?;

    assert_eq!(first.detections, second.detections);
    assert_eq!(first.patch_grid, second.patch_grid);
    assert_eq!(first.annotated, second.annotated);
    Ok(())
}

#[test]
fn test_report_summarises_run() -> anyhow::Result<()> {
    let img = image_with_square(1000, 700, 700, 400, 20, 30);
    let output = pipeline(Arc::new(BrightSpotDetector)).run(&img)?;

    let json: serde_json::Value = serde_json::from_str(&DetectionReport::from_output(&output).to_json()?)?;

    assert_eq!(json["image"]["width"], 1000);
    assert_eq!(json["image"]["height"], 700);
    assert_eq!(json["patch_count"], 5);
    assert_eq!(json["padding"]["was_padded"], false);
    assert_eq!(json["detections"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["patches"][1]["x_offset"], 80);
    assert_eq!(json["patches"][0]["detection_count"], 0);
    Ok(())
}

#[test]
fn test_outputs_round_trip_through_png() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let img = image_with_square(300, 200, 10, 10, 10, 10);
    let output = pipeline(Arc::new(BrightSpotDetector)).run(&img)?;

    let path = dir.path().join("result.png");
    image_io::save_png(&output.annotated, &path)?;
    let reloaded = image_io::load_image(&path)?.to_rgb8();

    assert_eq!(reloaded, output.annotated);
    Ok(())
}

#[test]
fn test_undecodable_input_is_invalid_image() {
    assert!(matches!(
        image_io::decode_image(b"definitely not a png"),
        Err(TileError::InvalidImage(_))
    ));
    assert!(matches!(
        image_io::load_image(std::path::Path::new("/nonexistent/input.png")),
        Err(TileError::InvalidImage(_))
    ));
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let fresh = dir.path().join("debug");
    assert!(image_io::prepare_debug_dir(&fresh).is_ok());
    assert!(fresh.is_dir());

    std::fs::write(fresh.join("leftover.png"), b"x")?;
    assert!(matches!(
        image_io::prepare_debug_dir(&fresh),
        Err(TileError::Configuration(_))
    ));
    Ok(())
}
