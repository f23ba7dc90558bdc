use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use unwarpvr::{
    CacheBuilder, Channel, Device, DeviceProfile, EyeConfig, FrameMut, FrameRef, InverseSearch,
    Inverter, Resampler, SdkVersion, WarpDirection,
};

fn dk2() -> DeviceProfile {
    DeviceProfile::lookup(Device::RiftDk2, SdkVersion::V0_4, 3)
        .expect("dk2 is in the device table")
}

fn make_rsq_fixture(n: usize, max: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.0..max)).collect()
}

fn make_frame_fixture(w: u32, h: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(w, h, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
}

fn bench_scale_at(c: &mut Criterion) {
    let samples = make_rsq_fixture(4096, 1.5, 3);
    for (device, sdk) in DeviceProfile::known_profiles() {
        let model = DeviceProfile::lookup(device, sdk, 3)
            .expect("table entry")
            .channel_model(Channel::Red);
        let name = format!("scale_at_{}_{}_4096", model.curve.family_name(), sdk);
        c.bench_function(&name, |b| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for &rsq in &samples {
                    acc += model.scale_at(black_box(rsq));
                }
                black_box(acc)
            })
        });
    }
}

fn bench_invert(c: &mut Criterion) {
    let inverter = Inverter::new(dk2().channel_model(Channel::Blue), InverseSearch::default());
    let targets = make_rsq_fixture(4096, inverter.usable_limit(), 5);

    c.bench_function("invert_dk2_4096", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for &t in &targets {
                acc += inverter.invert(black_box(t));
            }
            black_box(acc)
        })
    });
}

fn bench_cache_build(c: &mut Criterion) {
    let profile = dk2();
    let reverse = EyeConfig::default();
    let forward = EyeConfig {
        direction: WarpDirection::Forward,
        ..EyeConfig::default()
    };

    c.bench_function("cache_build_reverse_960x540", |b| {
        b.iter(|| {
            let cache = CacheBuilder::new(&profile, &reverse)
                .build(black_box([960, 540]), [1920, 1080])
                .expect("valid geometry");
            black_box(cache.len())
        })
    });

    c.bench_function("cache_build_forward_960x540", |b| {
        b.iter(|| {
            let cache = CacheBuilder::new(&profile, &forward)
                .build(black_box([960, 540]), [1920, 1080])
                .expect("valid geometry");
            black_box(cache.len())
        })
    });
}

fn bench_resample(c: &mut Criterion) {
    let profile = dk2();
    let cache = CacheBuilder::new(&profile, &EyeConfig::default())
        .build([1920, 1080], [1920, 1080])
        .expect("valid geometry");
    let src = make_frame_fixture(1920, 1080, 11);
    let mut out = vec![0u8; 1920 * 1080 * 3];

    c.bench_function("resample_1920x1080", |b| {
        b.iter(|| {
            let mut dst = FrameMut::packed(&mut out, 1920, 1080).expect("sized buffer");
            Resampler::new(&cache)
                .apply(black_box(&FrameRef::from_image(&src)), &mut dst)
                .expect("matching frames");
        })
    });
}

criterion_group!(
    hotpaths,
    bench_scale_at,
    bench_invert,
    bench_cache_build,
    bench_resample
);
criterion_main!(hotpaths);
