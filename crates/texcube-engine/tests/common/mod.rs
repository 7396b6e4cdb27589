//! Shared helpers for `texcube-engine` integration tests.
//!
//! GPU tests skip when no adapter is available unless `TEXCUBE_REQUIRE_GPU`
//! is set, in which case a missing adapter fails the test.

#![allow(dead_code)]

use texcube_engine::device::{DeviceContext, DeviceInit, FeatureLevel};

pub fn require_gpu() -> bool {
    let Ok(raw) = std::env::var("TEXCUBE_REQUIRE_GPU") else {
        return false;
    };

    let v = raw.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

pub fn skip_or_panic(test_name: &str, reason: &str) {
    if require_gpu() {
        panic!("TEXCUBE_REQUIRE_GPU is enabled but {test_name} cannot run: {reason}");
    }
    eprintln!("skipping {test_name}: {reason}");
}

/// Device parameters that work on this machine: a core-level hardware
/// adapter if there is one, else a downlevel software adapter.
pub fn device_init(test_name: &str) -> Option<DeviceInit> {
    let candidates = [
        DeviceInit::default(),
        DeviceInit {
            feature_level: FeatureLevel::Downlevel,
            use_software_adapter: true,
            ..DeviceInit::default()
        },
    ];

    let mut last_err = None;
    for init in candidates {
        match pollster::block_on(DeviceContext::new(init.clone())) {
            Ok(_) => return Some(init),
            Err(e) => last_err = Some(e),
        }
    }

    let reason = last_err.map_or_else(|| "no adapter".to_owned(), |e| e.to_string());
    skip_or_panic(test_name, &reason);
    None
}

pub fn device_context(test_name: &str) -> Option<DeviceContext> {
    let init = device_init(test_name)?;
    match pollster::block_on(DeviceContext::new(init)) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            skip_or_panic(test_name, &e.to_string());
            None
        }
    }
}

/// True when every channel of `got` is within `tolerance` of `want`.
pub fn approx_rgba(got: [u8; 4], want: [u8; 4], tolerance: u8) -> bool {
    got.iter()
        .zip(want.iter())
        .all(|(g, w)| g.abs_diff(*w) <= tolerance)
}
