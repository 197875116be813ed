//! End-to-end scenarios exercising the public API: known-signal metric
//! values, boundary relocation on real material, and full pipeline runs.

use std::time::Duration;

use approx_eq::assert_approx_eq;
use audio_quality::{
    BoundaryOptimizer, QualityAnalyzer, QualityLevel, QualityProfile, QualityThresholds,
    SampleBuffer, SegmentOptions, SegmentPipeline, SegmentRequest, SILENCE_DB, silence, sine_wave,
    snr_db, stereo_sine_wave, thd_plus_n_db,
};

#[test]
fn sine_reference_levels() {
    // 440 Hz at amplitude 0.5: peak -6.02 dBFS, RMS -9.03 dBFS, crest
    // factor 3.01 dB, all within 0.1 dB.
    let audio = sine_wave::<f64>(440.0, Duration::from_secs(1), 44100, 0.5);
    let analyzer = QualityAnalyzer::new(QualityThresholds::default()).expect("valid thresholds");
    let metrics = analyzer.analyze(&audio, None).expect("analysis succeeds");

    assert_approx_eq!(metrics.peak_level_db.expect("measured"), -6.02, 0.1);
    assert_approx_eq!(metrics.rms_level_db.expect("measured"), -9.03, 0.1);
    assert_approx_eq!(metrics.crest_factor_db.expect("measured"), 3.01, 0.1);
}

#[test]
fn one_percent_error_measures_forty_db() {
    let reference = sine_wave::<f64>(440.0, Duration::from_secs(1), 44100, 0.5);
    let degraded = SampleBuffer::new_mono(
        reference.primary_channel().mapv(|x| x * 1.01),
        44100,
    );

    assert_approx_eq!(thd_plus_n_db(&degraded, &reference), -40.0, 0.1);
    assert_approx_eq!(snr_db(&degraded, &reference), 40.0, 0.1);
}

#[test]
fn silence_analyzes_without_errors() {
    let quiet = silence::<f64>(Duration::from_secs(1), 44100);
    let analyzer = QualityAnalyzer::new(QualityThresholds::default()).expect("valid thresholds");
    let metrics = analyzer.analyze(&quiet, None).expect("silence is analyzable");

    assert_eq!(metrics.peak_level_db, Some(SILENCE_DB));
    assert_eq!(metrics.rms_level_db, Some(SILENCE_DB));
    assert!(metrics.quality_level.is_some());
    let score = metrics.quality_score.expect("scored");
    assert!((0.0..=100.0).contains(&score));
}

#[test]
fn boundary_relocation_on_one_khz_tone() {
    // Nominal cuts at 990 ms and 1010 ms into a 1 kHz tone land within the
    // 5 ms search window of a zero crossing; the chosen samples carry less
    // than 0.1% of the peak amplitude.
    let tone = sine_wave::<f64>(1000.0, Duration::from_secs(2), 44100, 0.8);
    let optimizer = BoundaryOptimizer::new(5.0);
    let half_window = (0.005 * 44100.0 / 2.0) as usize;

    for time_ms in [990.0, 1010.0] {
        let nominal = (time_ms / 1000.0 * 44100.0) as usize;
        let optimized = optimizer.optimize(time_ms, &tone);
        assert!(optimized.abs_diff(nominal) <= half_window);
        assert!(tone.primary_channel()[optimized].abs() <= 1e-3 * tone.peak());
    }
}

#[test]
fn full_pipeline_run_on_stereo_material() {
    let source = stereo_sine_wave::<f64>(440.0, Duration::from_secs(3), 44100, 0.5);
    let pipeline = SegmentPipeline::new(SegmentOptions::default(), QualityThresholds::default())
        .expect("valid configuration");

    let outcome = pipeline
        .process_segment(&source, &SegmentRequest::new(500.0, 2500.0, "chorus"))
        .expect("segment extracts");

    assert_eq!(outcome.buffer.num_channels(), 2);
    assert!((outcome.duration_ms - 2000.0).abs() < 10.0);
    let metrics = outcome.metrics.expect("validation ran");
    assert_eq!(metrics.channels, Some(2));
    // The edges fade to zero while the source keeps its full amplitude.
    assert!(outcome.buffer.primary_channel()[0].abs() < 1e-5);
    assert!(source.peak() > 0.49);
}

#[test]
fn dithered_full_scale_output_never_clips() {
    let source = sine_wave::<f64>(440.0, Duration::from_secs(1), 44100, 1.0);
    let options = SegmentOptions {
        fade_enabled: false,
        dither_amplitude: 1e-3,
        dither_seed: Some(11),
        quality_validation: false,
        ..SegmentOptions::default()
    };
    let pipeline = SegmentPipeline::new(options, QualityThresholds::default())
        .expect("valid configuration");

    let outcome = pipeline
        .process_segment(&source, &SegmentRequest::new(0.0, 1000.0, "hot"))
        .expect("segment extracts");
    assert!(outcome.buffer.peak() <= 1.0);
}

#[test]
fn pass_through_pipeline_is_idempotent() {
    let options = SegmentOptions {
        fade_enabled: false,
        dither_enabled: false,
        boundary_window_ms: 0.0,
        ..SegmentOptions::default()
    };
    let source = sine_wave::<f64>(440.0, Duration::from_secs(1), 44100, 0.5);
    let pipeline = SegmentPipeline::new(options, QualityThresholds::default())
        .expect("valid configuration");
    let request = SegmentRequest::new(100.0, 900.0, "copy");

    let first = pipeline.process_segment(&source, &request).expect("extracts");
    let second = pipeline.process_segment(&source, &request).expect("extracts");
    assert_eq!(first.buffer, second.buffer);

    // Bit-exact extraction classifies as excellent against any profile's
    // reference comparison.
    let metrics = first.metrics.expect("validation ran");
    assert_eq!(metrics.quality_level, Some(QualityLevel::Excellent));
    assert_eq!(metrics.dynamic_range_pct, Some(100.0));
}

#[test]
fn stricter_profiles_never_classify_higher() {
    // The same mildly degraded signal, classified against each profile from
    // strictest to most permissive, yields a monotonically non-decreasing
    // level.
    let reference = sine_wave::<f64>(440.0, Duration::from_secs(1), 44100, 0.5);
    let degraded = SampleBuffer::new_mono(
        reference.primary_channel().mapv(|x| x * 1.0001),
        44100,
    );

    let mut previous: Option<QualityLevel> = None;
    for profile in [
        QualityProfile::Studio,
        QualityProfile::Professional,
        QualityProfile::Standard,
        QualityProfile::Basic,
    ] {
        let analyzer = QualityAnalyzer::new(QualityThresholds::for_profile(profile))
            .expect("valid thresholds");
        let metrics = analyzer
            .analyze(&degraded, Some(&reference))
            .expect("analysis succeeds");
        let level = metrics.quality_level.expect("classified");
        if let Some(previous) = previous {
            assert!(level >= previous, "{profile:?} classified below a stricter profile");
        }
        previous = Some(level);
    }
}

#[cfg(feature = "batch-processing")]
#[test]
fn batch_reports_distribution_and_failures() {
    let source = sine_wave::<f64>(440.0, Duration::from_secs(2), 44100, 0.5);
    let options = SegmentOptions {
        fade_enabled: false,
        dither_enabled: false,
        ..SegmentOptions::default()
    };
    let pipeline = SegmentPipeline::new(options, QualityThresholds::default())
        .expect("valid configuration");

    let requests = vec![
        SegmentRequest::new(0.0, 500.0, "a"),
        SegmentRequest::new(600.0, 600.0, "degenerate"),
        SegmentRequest::new(700.0, 1200.0, "b"),
        SegmentRequest::new(1300.0, 1800.0, "c"),
    ];
    let batch = pipeline.process_batch(&source, &requests);

    assert_eq!(batch.processed(), 3);
    assert_eq!(batch.failed(), 1);
    let distribution = batch.quality_distribution();
    assert_eq!(distribution.values().sum::<usize>(), 3);
    assert_eq!(distribution.get(&QualityLevel::Excellent), Some(&3));
}
