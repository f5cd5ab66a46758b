use acelp_core::{
    pack, search_codebook, unpack, CodebookSearch, Mode, SearchConfig, SearchInput, SearchJob,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// --- Common benchmark input ---
const L_CODE: usize = 40;
const BATCH_JOBS: usize = 64;

/// Damped resonance in Q12, the shape of a weighted synthesis filter response
fn impulse() -> [i16; L_CODE] {
    let mut h = [0i16; L_CODE];
    for (n, v) in h.iter_mut().enumerate() {
        let a = 4096.0 * 0.86f64.powi(n as i32) * (0.9 * n as f64).cos();
        *v = a.round() as i16;
    }
    h
}

fn target(phase: usize) -> [i16; L_CODE] {
    let mut x = [0i16; L_CODE];
    for (n, v) in x.iter_mut().enumerate() {
        let a = 3000.0 * ((n + phase) as f64 * 0.37).sin()
            + 1200.0 * ((n * 3 + phase) as f64 * 0.11).cos();
        *v = a as i16;
    }
    x
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("codebook_search");
    let x = target(0);
    let res = target(7);
    let h0 = impulse();

    for mode in Mode::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, &mode| {
            let input = SearchInput::new(&x)
                .with_residual(&res)
                .with_pitch(57, 9830)
                .with_gain_pit(3000);
            b.iter(|| {
                let mut h = h0;
                black_box(search_codebook(mode, black_box(&input), &mut h).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_packing");
    let x = target(3);
    let res = target(11);

    for mode in [Mode::MR475, Mode::MR795, Mode::MR102, Mode::MR122] {
        let mut h = impulse();
        let out = search_codebook(mode, &SearchInput::new(&x).with_residual(&res), &mut h).unwrap();
        group.bench_with_input(BenchmarkId::new("pack_unpack", mode), &out, |b, out| {
            b.iter(|| {
                let packed = pack(mode, 0, black_box(&out.codevector)).unwrap();
                black_box(unpack(&packed, 0).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_search");
    group.throughput(Throughput::Elements(BATCH_JOBS as u64));

    let targets: Vec<_> = (0..BATCH_JOBS).map(target).collect();
    let residuals: Vec<_> = (0..BATCH_JOBS).map(|i| target(i + 5)).collect();

    for (label, threshold) in [("sequential", usize::MAX), ("parallel", 1)] {
        let search = CodebookSearch::new(
            SearchConfig::new(Mode::MR122).with_min_parallel_batch(threshold),
        )
        .unwrap();

        group.bench_function(label, |b| {
            b.iter(|| {
                let mut impulses = vec![impulse(); BATCH_JOBS];
                let mut jobs: Vec<_> = impulses
                    .iter_mut()
                    .enumerate()
                    .map(|(i, h)| {
                        let input = SearchInput::new(&targets[i])
                            .with_residual(&residuals[i])
                            .with_subframe(i % 4);
                        SearchJob::new(input, h)
                    })
                    .collect();
                black_box(search.search_batch(&mut jobs))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search, bench_packing, bench_batch);
criterion_main!(benches);
