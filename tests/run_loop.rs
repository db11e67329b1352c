use image::RgbImage;
use scout_vision::config::VisionConfig;
use scout_vision::core_modules::frame::Frame;
use scout_vision::io::synthetic::{backdrop, with_block, with_disk};
use scout_vision::io::{HeadlessDisplay, ImageSequenceSource, SnapshotDisplay, SyntheticSource};
use scout_vision::runner::quit_channel;
use scout_vision::{Mode, QuitSignal, Runner, RunnerOptions, StopReason, VisionError, VisionPipeline};

fn runner(mode: Mode) -> Runner {
    Runner::new(VisionPipeline::new(mode, &VisionConfig::default()), RunnerOptions::default())
}

fn lines(sink: Vec<u8>) -> Vec<String> {
    String::from_utf8(sink).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn motion_stream_writes_one_status_line_per_frame() {
    let base = backdrop(640, 480, [60, 60, 60]);
    let frames = vec![
        base.clone(),
        base.clone(),
        with_block(&base, 300, 200, 90, 90, [240, 240, 240]),
        base.clone(),
    ];
    let mut source = SyntheticSource::new(frames);
    let mut display = HeadlessDisplay::new();
    let mut sink = Vec::new();

    let summary = runner(Mode::Motion)
        .run(&mut source, &mut display, &mut sink, &QuitSignal::never())
        .unwrap();

    assert_eq!(
        lines(sink),
        vec!["Normal", "Normal", "Moving Object detected", "Normal"]
    );
    assert_eq!(summary.frames, 4);
    assert_eq!(summary.motion_frames, 1);
    assert_eq!(summary.stop_reason, StopReason::EndOfStream);
    assert_eq!(display.shown(), 4);
    assert_eq!(source.releases(), 1);
}

#[test]
fn tracking_stream_writes_only_commands() {
    let base = backdrop(900, 600, [200, 200, 190]);
    let frames = vec![
        with_disk(&base, (60, 300), 40, [20, 40, 220]),
        base.clone(),
        with_disk(&base, (300, 300), 40, [20, 40, 220]),
        with_disk(&base, (800, 300), 40, [20, 40, 220]),
        with_disk(&base, (450, 300), 5, [20, 40, 220]),
    ];
    let mut source = SyntheticSource::new(frames);
    let mut sink = Vec::new();

    let summary = runner(Mode::Tracking)
        .run(&mut source, &mut HeadlessDisplay::new(), &mut sink, &QuitSignal::never())
        .unwrap();

    assert_eq!(lines(sink), vec!["Left", "Front", "Right"]);
    assert_eq!(summary.commands, 3);
    assert_eq!(summary.frames, 5);
}

#[test]
fn forced_read_failure_releases_exactly_once() {
    let base = backdrop(320, 240, [60, 60, 60]);
    let mut source = SyntheticSource::new(vec![base.clone(), base.clone(), base]).failing_after(2);
    let mut sink = Vec::new();

    let err = runner(Mode::Motion)
        .run(&mut source, &mut HeadlessDisplay::new(), &mut sink, &QuitSignal::never())
        .unwrap_err();

    assert!(matches!(err, VisionError::FrameRead(_)));
    assert_eq!(source.releases(), 1);
    assert_eq!(lines(sink).len(), 2);
}

#[test]
fn empty_frame_fails_in_both_modes_and_releases_once() {
    for mode in [Mode::Motion, Mode::Tracking] {
        let empty = Frame::from_rgb_image(RgbImage::new(0, 0));
        let mut source = SyntheticSource::new(vec![empty]);

        let err = runner(mode)
            .run(&mut source, &mut HeadlessDisplay::new(), &mut Vec::new(), &QuitSignal::never())
            .unwrap_err();

        assert!(matches!(err, VisionError::EmptyFrame { .. }), "{mode:?}: {err}");
        assert_eq!(source.releases(), 1);
    }
}

#[test]
fn scripted_quit_key_ends_the_session() {
    let base = backdrop(320, 240, [60, 60, 60]);
    let mut source = SyntheticSource::new(vec![base; 10]);
    let mut display = HeadlessDisplay::with_keys([None, None, Some('q')]);

    let summary = runner(Mode::Motion)
        .run(&mut source, &mut display, &mut Vec::new(), &QuitSignal::never())
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::QuitKey);
    assert_eq!(summary.frames, 3);
    assert_eq!(source.delivered(), 3);
    assert_eq!(source.releases(), 1);
}

#[tokio::test]
async fn quit_signal_from_another_task_stops_the_loop() {
    let (handle, signal) = quit_channel();
    tokio::spawn(async move { handle.quit() }).await.unwrap();

    let summary = tokio::task::spawn_blocking(move || {
        let base = backdrop(320, 240, [60, 60, 60]);
        let mut source = SyntheticSource::new(vec![base; 3]);
        runner(Mode::Motion).run(&mut source, &mut HeadlessDisplay::new(), &mut Vec::new(), &signal)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.stop_reason, StopReason::QuitSignal);
    assert_eq!(summary.frames, 0);
}

#[test]
fn image_directory_runs_end_to_end_with_snapshots() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let base = backdrop(500, 375, [50, 50, 50]);
    let scenes = [
        base.clone(),
        with_block(&base, 200, 150, 70, 70, [230, 230, 230]),
    ];
    for (i, scene) in scenes.iter().enumerate() {
        scene.to_rgb_image().save(input.path().join(format!("frame_{i:04}.png"))).unwrap();
    }

    let mut source = ImageSequenceSource::open(input.path()).unwrap();
    let mut display = SnapshotDisplay::new(output.path()).unwrap();
    let mut sink = Vec::new();
    let options = RunnerOptions {
        max_frames: Some(5),
        ..RunnerOptions::default()
    };
    let summary = Runner::new(VisionPipeline::new(Mode::Motion, &VisionConfig::default()), options)
        .run(&mut source, &mut display, &mut sink, &QuitSignal::never())
        .unwrap();

    assert_eq!(lines(sink), vec!["Normal", "Moving Object detected"]);
    assert_eq!(summary.stop_reason, StopReason::EndOfStream);
    assert!(source.is_released());
    assert_eq!(display.written().len(), 2);

    let annotated = image::open(&display.written()[1]).unwrap().to_rgb8();
    assert_eq!(annotated.width(), 500);
    assert!(annotated.pixels().any(|p| p.0 == [0, 255, 0]));
}
