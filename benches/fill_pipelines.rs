//! Throughput of the span kernels and the three backends.
//!
//! Run with: `cargo bench --bench fill_pipelines`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use raster_pipe::compose::{blend_span_lanes, blend_span_scalar};
use raster_pipe::{
    create_renderer, Command, ExtendMode, Gradient, GradientQuality, PixelFormat, PointD, RendererConfig,
    Rgba32, Style,
};

fn bench_span_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("span_kernels");
    let len = 4096;
    group.throughput(Throughput::Elements(len as u64));

    let src: Vec<u32> = (0..len as u32).map(|i| 0x8000_0000 | (i & 0x7F) * 0x0001_0101).collect();
    let covers: Vec<u8> = (0..len).map(|i| if i % 5 == 0 { 128 } else { 255 }).collect();
    let mut dst = vec![0xFF20_2020u32; len];

    group.bench_function("scalar", |b| {
        b.iter(|| blend_span_scalar(black_box(&mut dst), black_box(&src), black_box(&covers)))
    });
    group.bench_function("lanes_8", |b| {
        b.iter(|| blend_span_lanes::<8>(black_box(&mut dst), black_box(&src), black_box(&covers)))
    });
    group.bench_function("lanes_16", |b| {
        b.iter(|| blend_span_lanes::<16>(black_box(&mut dst), black_box(&src), black_box(&covers)))
    });
    group.finish();
}

fn bench_backends(c: &mut Criterion) {
    let mut gradient = Gradient::radial(256.0, 256.0, 200.0, 300.0, 240.0);
    gradient
        .add_stop(0.0, Rgba32::new(0xFFFF_0000))
        .add_stop(0.5, Rgba32::new(0x8000_FF00))
        .add_stop(1.0, Rgba32::new(0xFFFF_0000))
        .set_extend_mode(ExtendMode::Reflect);
    let style = Style::Gradient(gradient);
    let command = Command::FillPolygon(
        (0..10)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 10.0;
                let r = if i % 2 == 0 { 250.0 } else { 120.0 };
                PointD::new(256.0 + r * a.cos(), 256.0 + r * a.sin())
            })
            .collect(),
    );

    let mut group = c.benchmark_group("backends_513");
    for (name, config) in [
        ("reference", RendererConfig::reference()),
        ("pipeline", RendererConfig::pipeline(None)),
        ("threaded_4", RendererConfig::threaded(4)),
    ] {
        let mut renderer = match create_renderer(513, 513, PixelFormat::Prgb32, &config) {
            Ok(r) => r,
            Err(e) => panic!("{}: {}", name, e),
        };
        renderer.set_gradient_quality(GradientQuality::Dither);
        group.bench_function(name, |b| {
            b.iter(|| {
                renderer.submit(black_box(&command), black_box(&style)).ok();
                renderer.flush().ok();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_span_kernels, bench_backends);
criterion_main!(benches);
