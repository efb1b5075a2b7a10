//! Hot-path benchmarks: replacer operations and single-page I/O.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pagestore::buffer::replacer::{LruReplacer, Replacer};
use pagestore::common::config::DiskManagerConfig;
use pagestore::{DiskManager, FrameId, PageNo, PAGE_SIZE};

fn bench_replacer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_replacer");

    for pool_size in [64usize, 1024, 16384] {
        group.bench_with_input(
            BenchmarkId::new("unpin_victim", pool_size),
            &pool_size,
            |b, &n| {
                let replacer = LruReplacer::new(n);
                b.iter(|| {
                    for id in 0..n {
                        replacer.unpin(FrameId::new(id));
                    }
                    while let Some(frame_id) = replacer.victim() {
                        black_box(frame_id);
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("pin_unpin_cycle", pool_size),
            &pool_size,
            |b, &n| {
                let replacer = LruReplacer::new(n);
                for id in 0..n {
                    replacer.unpin(FrameId::new(id));
                }
                let mut next = 0;
                b.iter(|| {
                    let frame_id = FrameId::new(next % n);
                    replacer.pin(frame_id);
                    replacer.unpin(frame_id);
                    next += 7;
                });
            },
        );
    }

    group.finish();
}

fn bench_page_io(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let dm = DiskManager::new(DiskManagerConfig::in_dir(dir.path()));
    let path = dir.path().join("bench.db");
    dm.create_file(&path).unwrap();
    let fd = dm.open_file(&path).unwrap();

    let data = [0x5Au8; PAGE_SIZE];
    for n in 0..256 {
        dm.write_page(fd, PageNo::new(n), &data).unwrap();
    }

    let mut group = c.benchmark_group("disk_manager");
    group.bench_function("write_page", |b| {
        let mut n = 0u32;
        b.iter(|| {
            dm.write_page(fd, PageNo::new(n % 256), black_box(&data)).unwrap();
            n += 1;
        });
    });
    group.bench_function("read_page", |b| {
        let mut out = [0u8; PAGE_SIZE];
        let mut n = 0u32;
        b.iter(|| {
            dm.read_page(fd, PageNo::new(n % 256), &mut out).unwrap();
            black_box(&out);
            n += 1;
        });
    });
    group.finish();
}

criterion_group!(benches, bench_replacer, bench_page_io);
criterion_main!(benches);
