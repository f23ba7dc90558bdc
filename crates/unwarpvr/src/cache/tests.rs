use super::*;
use crate::config::{EyeConfig, WarpDirection};
use crate::device::{Device, SdkVersion, DEFAULT_EYE_RELIEF};
use crate::error::{ConfigError, WarpError};

fn dk2() -> DeviceProfile {
    DeviceProfile::lookup(Device::RiftDk2, SdkVersion::V0_4, DEFAULT_EYE_RELIEF)
        .expect("dk2 profile")
}

fn build(eye: &EyeConfig, output: [u32; 2], source: [u32; 2]) -> WarpCache {
    CacheBuilder::new(&dk2(), eye)
        .build(output, source)
        .expect("cache build")
}

#[test]
fn scenario_a_eye_centers_follow_lens_offset() {
    let cache = build(&EyeConfig::default(), [1920, 1080], [1920, 1080]);
    assert_eq!(cache.len(), 1920 * 1080 * 3);

    // Left lens center sits about 0.00986 NDC left of the half center.
    let [x0, y0] = cache.source_pixel(540, 480, Channel::Green).expect("eye 0");
    assert!((474..=476).contains(&x0), "eye 0 x = {x0}");
    assert!((539..=541).contains(&y0), "eye 0 y = {y0}");

    let [x1, y1] = cache.source_pixel(540, 1440, Channel::Green).expect("eye 1");
    assert!((1443..=1445).contains(&x1), "eye 1 x = {x1}");
    assert!((539..=541).contains(&y1), "eye 1 y = {y1}");

    // All three channels agree at the optical center.
    for ch in Channel::ALL {
        assert_eq!(cache.source_pixel(540, 480, ch), Some([x0, y0]));
    }
}

#[test]
fn eyes_are_mirror_images() {
    let cache = build(&EyeConfig::default(), [1920, 1080], [1920, 1080]);
    for row in (100..980).step_by(37) {
        for col in (100..860).step_by(23) {
            for ch in Channel::ALL {
                let left = cache.source_pixel(row, col, ch);
                let right = cache.source_pixel(row, 960 + (960 - col), ch);
                let (Some([c0, r0]), Some([c1, r1])) = (left, right) else {
                    panic!("interior sample ({row}, {col}, {ch:?}) has no source");
                };
                assert!(r0.abs_diff(r1) <= 1, "rows {r0} vs {r1}");
                assert!(c1 >= 960, "right eye reads left half at col {col}");
                let sum = c0 + (c1 - 960);
                assert!((958..=961).contains(&sum), "cols {c0} + {c1} at ({row}, {col})");
            }
        }
    }
}

#[test]
fn scenario_b_left_eye_only_spans_full_width() {
    let eye = EyeConfig {
        left_eye_only: true,
        ..EyeConfig::default()
    };
    let cache = build(&eye, [1920, 1080], [1920, 1080]);

    for col in 480..=1440 {
        for ch in Channel::ALL {
            assert!(
                cache.entry(540, col, ch).is_some(),
                "middle row col {col} {ch:?} has no source"
            );
        }
    }
    let mut beyond_half = 0;
    for row in 0..1080 {
        for col in 0..1920 {
            if let Some([x, _]) = cache.source_pixel(row, col, Channel::Green) {
                assert!(x < 960, "({row}, {col}) reads second half");
                if col >= 960 {
                    beyond_half += 1;
                }
            }
        }
    }
    assert!(beyond_half > 0);
}

#[test]
fn scenario_c_oversized_output_blanks_corners() {
    let cache = build(&EyeConfig::default(), [3840, 2160], [1920, 1080]);
    for (row, col) in [(0, 0), (0, 1919), (2159, 0), (2159, 1920), (0, 3839), (2159, 3839)] {
        for ch in Channel::ALL {
            assert_eq!(cache.entry(row, col, ch), None, "corner ({row}, {col})");
        }
    }
    // Optical centers still resolve.
    assert!(cache.entry(1080, 960, Channel::Green).is_some());
    assert!(cache.entry(1080, 2880, Channel::Green).is_some());
}

#[test]
fn scenario_d_mono_ignores_swap() {
    let mono = EyeConfig {
        mono: true,
        ..EyeConfig::default()
    };
    let swapped = EyeConfig {
        swap_eyes: true,
        ..mono.clone()
    };
    let a = build(&mono, [1920, 1080], [960, 1080]);
    let b = build(&swapped, [1920, 1080], [960, 1080]);
    assert_eq!(a.entries(), b.entries());

    let [x0, _] = a.source_pixel(540, 480, Channel::Green).expect("eye 0");
    let [x1, _] = a.source_pixel(540, 1440, Channel::Green).expect("eye 1");
    assert!((474..=476).contains(&x0));
    assert!((483..=485).contains(&x1));
    let limit = (960 * 1080 * 3) as i32;
    assert!(a.entries().iter().all(|&e| e == NO_SOURCE || (0..limit).contains(&e)));
}

#[test]
fn swap_exchanges_source_halves() {
    let eye = EyeConfig {
        swap_eyes: true,
        ..EyeConfig::default()
    };
    let cache = build(&eye, [960, 540], [1920, 1080]);
    let [x0, _] = cache.source_pixel(270, 240, Channel::Green).expect("eye 0");
    let [x1, _] = cache.source_pixel(270, 720, Channel::Green).expect("eye 1");
    assert!(x0 >= 960);
    assert!(x1 < 960);
}

#[test]
fn rebuild_is_idempotent() {
    let eye = EyeConfig::default();
    let a = build(&eye, [640, 360], [1280, 720]);
    let b = build(&eye, [640, 360], [1280, 720]);
    assert_eq!(a.key(), b.key());
    assert_eq!(a.entries(), b.entries());
}

#[test]
fn entries_address_matching_channel() {
    let cache = build(&EyeConfig::default(), [320, 180], [640, 360]);
    let limit = (640 * 360 * 3) as i32;
    for (i, &e) in cache.entries().iter().enumerate() {
        if e != NO_SOURCE {
            assert!((0..limit).contains(&e));
            assert_eq!(e as usize % 3, i % 3);
        }
    }
}

#[test]
fn odd_stereo_width_leaves_last_column_blank() {
    let cache = build(&EyeConfig::default(), [11, 4], [20, 4]);
    for row in 0..4 {
        for ch in Channel::ALL {
            assert_eq!(cache.entry(row, 10, ch), None);
        }
    }
}

#[test]
fn forward_center_moves_opposite_to_reverse() {
    let forward = EyeConfig {
        direction: WarpDirection::Forward,
        ..EyeConfig::default()
    };
    let cache = build(&forward, [1920, 1080], [1920, 1080]);
    let [x0, y0] = cache.source_pixel(540, 480, Channel::Green).expect("eye 0");
    assert!((483..=486).contains(&x0), "forward eye 0 x = {x0}");
    assert!((539..=541).contains(&y0));
}

#[test]
fn forward_pushes_edges_outward() {
    let forward = EyeConfig {
        direction: WarpDirection::Forward,
        ..EyeConfig::default()
    };
    let fwd = build(&forward, [1920, 1080], [1920, 1080]);
    let rev = build(&EyeConfig::default(), [1920, 1080], [1920, 1080]);
    // Pre-distortion magnifies, so more of the edge leaves the source.
    assert!(fwd.sentinel_count() > rev.sentinel_count());
}

#[test]
fn target_ppd_rescales_input() {
    let profile = dk2();
    let native = profile.pixels_per_degree();
    let with_ppd = |ppd: f32| EyeConfig {
        direction: WarpDirection::Forward,
        target_ppd: Some(ppd),
        ..EyeConfig::default()
    };
    let dense = CacheBuilder::new(&profile, &with_ppd(2.0 * native))
        .build([960, 540], [1920, 1080])
        .expect("dense");
    let sparse = CacheBuilder::new(&profile, &with_ppd(0.5 * native))
        .build([960, 540], [1920, 1080])
        .expect("sparse");
    assert!(dense.sentinel_count() > sparse.sentinel_count());
}

#[test]
fn rejects_target_ppd_in_reverse() {
    let eye = EyeConfig {
        target_ppd: Some(10.0),
        ..EyeConfig::default()
    };
    let err = CacheBuilder::new(&dk2(), &eye)
        .build([64, 64], [64, 64])
        .unwrap_err();
    assert_eq!(
        err,
        WarpError::Config(ConfigError::ForwardOnlyOption("target_ppd"))
    );
}

#[test]
fn rejects_oversized_and_empty_sources() {
    let eye = EyeConfig::default();
    let err = CacheBuilder::new(&dk2(), &eye)
        .build([16, 16], [50_000, 50_000])
        .unwrap_err();
    assert!(matches!(
        err,
        WarpError::Config(ConfigError::SourceTooLarge { .. })
    ));
    let err = CacheBuilder::new(&dk2(), &eye)
        .build([16, 16], [1, 16])
        .unwrap_err();
    assert!(matches!(
        err,
        WarpError::Config(ConfigError::InvalidDimensions { .. })
    ));
}

#[test]
fn unallocatable_table_is_a_resource_error() {
    let eye = EyeConfig::default();
    // Entry count overflows usize.
    let err = CacheBuilder::new(&dk2(), &eye)
        .build([u32::MAX, u32::MAX], [64, 64])
        .unwrap_err();
    assert!(matches!(err, WarpError::Resource(_)), "{err:?}");

    // Representable count, but beyond what any allocator will reserve.
    let err = CacheBuilder::new(&dk2(), &eye)
        .build([u32::MAX, u32::MAX / 4], [64, 64])
        .unwrap_err();
    assert!(matches!(err, WarpError::Resource(_)), "{err:?}");
}

#[test]
fn dk1_profiles_build() {
    for sdk in [SdkVersion::V0_2, SdkVersion::V0_4] {
        let profile = DeviceProfile::lookup(Device::RiftDk1, sdk, 0).expect("dk1");
        let cache = CacheBuilder::new(&profile, &EyeConfig::default())
            .build([640, 400], [1280, 800])
            .expect("build");
        assert!(cache.entry(200, 160, Channel::Green).is_some(), "sdk {sdk}");
        assert!(cache.sentinel_count() < cache.len());
    }
}
