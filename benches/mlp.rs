use criterion::{Criterion, black_box, criterion_group, criterion_main};

use dense_mlp::{Matrix, Mlp};

fn matrix_multiply_bench(c: &mut Criterion) {
    let mut a = Matrix::new(128, 256).unwrap();
    let mut b = Matrix::new(256, 64).unwrap();
    a.randomize_seeded(0);
    b.randomize_seeded(1);

    c.bench_function("matrix_multiply_128x256_256x64", |bench| {
        bench.iter(|| black_box(a.multiply(black_box(&b)).unwrap()))
    });
}

fn mlp_feedforward_bench(c: &mut Criterion) {
    let mut mlp = Mlp::new_with_seed(&[128, 256, 256, 10], 0).unwrap();
    let input = Matrix::column(&vec![0.1; mlp.input_dim()]).unwrap();

    c.bench_function("mlp_feedforward_128_256_256_10", |b| {
        b.iter(|| black_box(mlp.feedforward(black_box(&input)).unwrap()))
    });
}

fn mlp_train_bench(c: &mut Criterion) {
    let mut mlp = Mlp::new_with_seed(&[128, 256, 256, 10], 0).unwrap();
    let input = Matrix::column(&vec![0.1; mlp.input_dim()]).unwrap();
    let target = Matrix::column(&vec![0.0; mlp.output_dim()]).unwrap();

    c.bench_function("mlp_train_128_256_256_10", |b| {
        b.iter(|| black_box(mlp.train(black_box(&input), &target, 1e-3).unwrap()))
    });
}

criterion_group!(
    benches,
    matrix_multiply_bench,
    mlp_feedforward_bench,
    mlp_train_bench
);
criterion_main!(benches);
