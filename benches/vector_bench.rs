use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use probekit::containers::Vector;
use probekit::memory::{RawAllocator, TemporaryAllocator};

fn bench_small_appends(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_small_appends");

    // Sizes at and just past the inline capacity.
    for size in [2usize, 4, 8, 16] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("Vector<_, 4>", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec: Vector<u64, 4> = Vector::new();
                for i in 0..size {
                    vec.append(black_box(i as u64));
                }
                black_box(vec)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vector<_, 4, Raw>", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec: Vector<u64, 4, RawAllocator> = Vector::new();
                for i in 0..size {
                    vec.append(black_box(i as u64));
                }
                black_box(vec)
            });
        });

        group.bench_with_input(BenchmarkId::new("std::Vec", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec = Vec::new();
                for i in 0..size {
                    vec.push(black_box(i as u64));
                }
                black_box(vec)
            });
        });
    }

    group.finish();
}

fn bench_large_appends(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_large_appends");

    for size in [1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("Vector", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec: Vector<u64, 4> = Vector::new();
                for i in 0..size {
                    vec.append(black_box(i as u64));
                }
                black_box(vec)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vector_reserved", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec: Vector<u64, 4> = Vector::new();
                vec.reserve(size);
                for i in 0..size {
                    // SAFETY: capacity was reserved above.
                    unsafe { vec.append_unchecked(black_box(i as u64)) };
                }
                black_box(vec)
            });
        });

        group.bench_with_input(BenchmarkId::new("std::Vec", size), &size, |b, &size| {
            b.iter(|| {
                let mut vec = Vec::new();
                for i in 0..size {
                    vec.push(black_box(i as u64));
                }
                black_box(vec)
            });
        });
    }

    group.finish();
}

fn bench_scratch_buffers(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_scratch_buffers");
    let size = 1_000usize;
    group.throughput(Throughput::Elements(size as u64));

    // Allocate-fill-drop cycles, the pattern the temporary pool serves.
    group.bench_function("TemporaryAllocator", |b| {
        b.iter(|| {
            let mut scratch: Vector<u32, 0, TemporaryAllocator> = Vector::new();
            scratch.reserve(size);
            scratch.extend((0..size as u32).map(black_box));
            black_box(scratch.iter().sum::<u32>())
        });
    });

    group.bench_function("GuardedAllocator", |b| {
        b.iter(|| {
            let mut scratch: Vector<u32, 0> = Vector::new();
            scratch.reserve(size);
            scratch.extend((0..size as u32).map(black_box));
            black_box(scratch.iter().sum::<u32>())
        });
    });

    group.bench_function("std::Vec", |b| {
        b.iter(|| {
            let mut scratch = Vec::with_capacity(size);
            scratch.extend((0..size as u32).map(black_box));
            black_box(scratch.iter().sum::<u32>())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_small_appends,
    bench_large_appends,
    bench_scratch_buffers
);
criterion_main!(benches);
