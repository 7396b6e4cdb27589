mod common;

use texcube_engine::core::{run_headless, HeadlessOptions, Renderer, RendererConfig, UpdateStep};
use texcube_engine::frame::CLEAR_COLOR;
use texcube_engine::model::Face;
use texcube_engine::swapchain::SwapChain;
use texcube_engine::{ErrorKind, RenderError};

fn clear_rgba() -> [u8; 4] {
    [CLEAR_COLOR.r, CLEAR_COLOR.g, CLEAR_COLOR.b, CLEAR_COLOR.a].map(|c| (c * 255.0).round() as u8)
}

#[test]
fn frames_alternate_back_buffers_and_advance_the_fence_by_one() {
    let Some(device) = common::device_init("frames_alternate_back_buffers_and_advance_the_fence_by_one")
    else {
        return;
    };

    let summary = run_headless(HeadlessOptions {
        device,
        frames: 5,
        ..HeadlessOptions::default()
    })
    .expect("headless run");

    // The texture upload is the first signal.
    assert_eq!(summary.initial_fence, 1);

    let targets: Vec<usize> = summary.frames.iter().map(|f| f.target_index).collect();
    assert_eq!(targets, vec![0, 1, 0, 1, 0]);

    let fences: Vec<u64> = summary.frames.iter().map(|f| f.fence_value).collect();
    assert_eq!(fences, vec![2, 3, 4, 5, 6]);
    assert_eq!(summary.final_fence(), 6);

    for frame in &summary.frames {
        assert_eq!(frame.draws as usize, Face::ALL.len());
    }
}

#[test]
fn captured_frame_shows_the_cube_over_the_clear_color() {
    let Some(device) = common::device_init("captured_frame_shows_the_cube_over_the_clear_color") else {
        return;
    };

    let summary = run_headless(HeadlessOptions {
        device,
        frames: 2,
        capture: true,
        ..HeadlessOptions::default()
    })
    .expect("headless run");

    let frame = summary.capture.expect("headless capture");
    assert_eq!((frame.width, frame.height), (1280, 720));

    let clear = clear_rgba();
    for (x, y) in [(0, 0), (1279, 0), (0, 719), (1279, 719)] {
        let px = frame.pixel(x, y).expect("corner pixel");
        assert!(
            common::approx_rgba(px, clear, 1),
            "corner ({x}, {y}) is {px:?}, expected clear color {clear:?}"
        );
    }

    let centre = frame.pixel(640, 360).expect("centre pixel");
    assert!(
        !common::approx_rgba(centre, clear, 1),
        "centre pixel {centre:?} should be covered by the cube"
    );
    assert_eq!(centre[3], 255);
}

#[test]
fn zero_update_leaves_the_transforms_untouched() {
    let Some(ctx) = common::device_context("zero_update_leaves_the_transforms_untouched") else {
        return;
    };

    let mut renderer = Renderer::headless(ctx, &RendererConfig::default()).expect("renderer");
    let before = renderer.transform_bytes().to_vec();

    renderer.update(0.0).expect("update");
    assert_eq!(renderer.transform_bytes(), before.as_slice());

    let step = UpdateStep::default();
    renderer.update(step.delta(0.016)).expect("update");
    assert_ne!(renderer.transform_bytes(), before.as_slice());

    renderer.render().expect("render");
    assert_eq!(renderer.completed_fence(), renderer.last_signaled_fence());
    assert_eq!(renderer.current_back_buffer_index(), 1);
    assert_eq!(renderer.frames_rendered(), 1);
    assert!(renderer.swapchain().is_headless());
    assert_eq!(renderer.swapchain().presented_frames(), 1);
}

#[test]
fn stale_frame_target_is_rejected_after_present() {
    let Some(ctx) = common::device_context("stale_frame_target_is_rejected_after_present") else {
        return;
    };

    let mut chain = SwapChain::headless(&ctx, 64, 64).expect("swap chain");
    let first = chain.acquire(&ctx).expect("acquire");
    let stale = chain.acquire(&ctx).expect("acquire");
    assert_eq!((first.index, stale.index), (0, 0));

    chain.present(first).expect("present");
    assert_eq!(chain.presented_frames(), 1);
    assert_eq!(chain.current_back_buffer_index(), 1);

    let err = chain.begin_target(&stale).unwrap_err();
    assert!(
        matches!(err, RenderError::TargetMismatch { bound: 0, current: 1 }),
        "unexpected error: {err}"
    );
    assert!(matches!(
        chain.present(stale),
        Err(RenderError::TargetMismatch { bound: 0, current: 1 })
    ));
    assert_eq!(chain.presented_frames(), 1);
}

#[test]
fn destroy_is_idempotent_and_stops_rendering() {
    let Some(ctx) = common::device_context("destroy_is_idempotent_and_stops_rendering") else {
        return;
    };

    let mut renderer = Renderer::headless(ctx, &RendererConfig::default()).expect("renderer");
    renderer.render().expect("render");

    renderer.destroy().expect("first destroy");
    renderer.destroy().expect("second destroy");
    assert!(renderer.render().is_err());
}

#[test]
fn missing_texture_fails_initialization() {
    let Some(ctx) = common::device_context("missing_texture_fails_initialization") else {
        return;
    };

    let config = RendererConfig {
        texture_path: "does/not/exist.dds".into(),
        ..RendererConfig::default()
    };
    let err = Renderer::headless(ctx, &config).err().expect("missing texture must fail");
    assert_eq!(err.kind(), ErrorKind::Asset);
}

#[test]
fn broken_shader_fails_initialization() {
    let Some(ctx) = common::device_context("broken_shader_fails_initialization") else {
        return;
    };

    let dir = std::env::temp_dir().join(format!("texcube-shader-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let shader_path = dir.join("broken.wgsl");
    std::fs::write(&shader_path, "@vertex fn vs_main( -> {").expect("write shader");

    let config = RendererConfig {
        shader_path: shader_path.clone(),
        ..RendererConfig::default()
    };
    let err = Renderer::headless(ctx, &config).err().expect("broken shader must fail");
    assert_eq!(err.kind(), ErrorKind::Shader);
    assert!(err.to_string().contains("broken.wgsl"));

    let _ = std::fs::remove_dir_all(&dir);
}
