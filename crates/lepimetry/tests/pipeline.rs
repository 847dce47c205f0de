use approx::assert_abs_diff_eq;
use lepimetry::{
    specimen_fingerprint, BinaryMask, LandmarkMethod, Memo, MemoCache, Pixel, PipelineParams,
    RgbImageView, SpecimenInputs, SpecimenPipeline, SpecimenReport,
};

const W: usize = 2400;
const H: usize = 1300;

/// Rectangular wings, body and head on a 2000x1000 canvas.
fn fake_butterfly(mask: &mut BinaryMask) {
    mask.fill_rect(250..500, 250..500, true);
    mask.fill_rect(250..500, 1500..1750, true);
    mask.fill_rect(500..900, 400..1600, true);
    mask.fill_rect(250..500, 800..1200, true);
}

/// White image with a ruler band below the specimen: 2 px ticks every 10
/// columns, long ones every 20.
fn scene() -> (Vec<u8>, BinaryMask, BinaryMask, BinaryMask) {
    let mut rgb = vec![255u8; W * H * 3];
    for x in (0..W).filter(|x| x % 10 < 2) {
        let rows = if x % 20 < 2 { 1120..1280 } else { 1120..1220 };
        for y in rows {
            let i = (y * W + x) * 3;
            rgb[i..i + 3].fill(0);
        }
    }

    let mut ruler = BinaryMask::new(W, H);
    ruler.fill_rect(1100..1300, 0..W, true);

    let mut specimen = BinaryMask::new(W, H);
    fake_butterfly(&mut specimen);

    let mut tags = BinaryMask::new(W, H);
    tags.fill_rect(100..400, 2100..2350, true);

    (rgb, ruler, specimen, tags)
}

fn run(params: PipelineParams) -> SpecimenReport {
    let (rgb, ruler, specimen, tags) = scene();
    let view = RgbImageView::new(W, H, &rgb).expect("valid buffer");
    SpecimenPipeline::new(params)
        .run(&SpecimenInputs {
            rgb: view,
            ruler: &ruler,
            specimen: &specimen,
            tags: Some(&tags),
        })
        .expect("pipeline")
}

#[test]
fn ruler_and_layout_are_recovered() {
    let report = run(PipelineParams::default());

    assert_abs_diff_eq!(report.scale.tick_spacing, 10.0, epsilon = 1e-9);
    assert_eq!(report.scale.top_row, 1100);
    assert_eq!(report.scale.first_tick_col, 240);
    assert_eq!(report.tags_edge, 2100);
    assert_eq!(report.tick_positions.len(), 217);
    assert_eq!(report.tick_positions[0], 240.0);

    assert_eq!(report.split_col, 999);
    assert_eq!(report.landmarks.body_center.y, 574);
    assert_eq!(report.landmarks.body_center.x, 999);
}

#[test]
fn landmarks_sit_on_tips_and_notches() {
    let report = run(PipelineParams::default());
    let lm = &report.landmarks;

    // Corners of the wings grown by the two pre-dilation steps.
    assert_eq!(lm.outer_pix_l, Pixel::new(250, 248));
    assert_eq!(lm.outer_pix_r, Pixel::new(250, 1751));
    // Floor of the notch between wing and head, two rows above the body.
    assert_eq!(lm.inner_pix_l, Pixel::new(497, 797));
    assert_eq!(lm.inner_pix_r, Pixel::new(497, 1202));

    assert_eq!(report.left.landmarks.outer, lm.outer_pix_l);
    assert_eq!(report.right.landmarks.inner, lm.inner_pix_r);
    assert!(report.right.smoothed.iter().all(|p| p.x >= 999.0));
}

#[test]
fn contour_walk_finds_the_outer_tips() {
    let mut params = PipelineParams::default();
    params.landmarks.method = LandmarkMethod::Contour;
    let report = run(params);
    let lm = &report.landmarks;

    assert!((lm.outer_pix_l.y - 250).abs() <= 15, "{:?}", lm.outer_pix_l);
    assert!((lm.outer_pix_l.x - 250).abs() <= 15, "{:?}", lm.outer_pix_l);
    assert!((lm.outer_pix_r.y - 250).abs() <= 15, "{:?}", lm.outer_pix_r);
    assert!((lm.outer_pix_r.x - 1749).abs() <= 15, "{:?}", lm.outer_pix_r);

    // The walk may stop on a smoothing ripple before the notch; it still
    // ends on the body side of the tip.
    assert!(lm.inner_pix_l.x > lm.outer_pix_l.x);
    assert!(lm.inner_pix_r.x < lm.outer_pix_r.x);
    assert!(report.left.landmarks.walk.is_some());
}

#[test]
fn millimeters_follow_half_millimeter_ticks() {
    let report = run(PipelineParams::default());
    let m = &report.measurements;

    // 10 px per 0.5 mm tick: 20 px per millimeter.
    for (px, mm) in m.pixels.values().into_iter().zip(m.millimeters.values()) {
        assert_abs_diff_eq!(mm, px / 20.0, epsilon = 0.01);
    }
    assert!(m.millimeters.dist_span > 70.0);

    let json = serde_json::to_string(&report).expect("serialize");
    let back: SpecimenReport = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.landmarks, report.landmarks);
    assert_eq!(back.measurements, report.measurements);
}

#[test]
fn memo_cache_skips_repeated_images() {
    let (rgb, ruler, specimen, tags) = scene();
    let view = RgbImageView::new(W, H, &rgb).expect("valid buffer");
    let inputs = SpecimenInputs {
        rgb: view,
        ruler: &ruler,
        specimen: &specimen,
        tags: Some(&tags),
    };
    let pipeline = SpecimenPipeline::default();
    let key = specimen_fingerprint(&inputs, pipeline.params());

    let cache = MemoCache::new();
    let first = cache
        .get_or_compute(key, || pipeline.run(&inputs))
        .expect("first run");
    let second = cache
        .get_or_compute(key, || -> Result<SpecimenReport, lepimetry::PipelineError> {
            panic!("cached value expected")
        })
        .expect("cached");
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);

    let other = SpecimenInputs { tags: None, ..inputs };
    assert_ne!(specimen_fingerprint(&other, pipeline.params()), key);
}
