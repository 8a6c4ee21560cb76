use dense_mlp::{Dataset, Error, FitConfig, Matrix, Mlp, Phase, Shuffle, loss};

fn col(values: &[f64]) -> Matrix {
    Matrix::column(values).unwrap()
}

fn and_examples() -> Vec<(Matrix, Matrix)> {
    vec![
        (col(&[0.0, 0.0]), col(&[0.0])),
        (col(&[0.0, 1.0]), col(&[0.0])),
        (col(&[1.0, 0.0]), col(&[0.0])),
        (col(&[1.0, 1.0]), col(&[1.0])),
    ]
}

#[test]
fn network_2_3_1_has_two_layers_with_expected_shapes() {
    let mlp = Mlp::new_with_seed(&[2, 3, 1], 7).unwrap();
    let shapes: Vec<_> = mlp
        .layers()
        .iter()
        .map(|l| (l.weights().shape(), l.biases().shape()))
        .collect();
    assert_eq!(shapes, vec![((3, 2), (3, 1)), ((1, 3), (1, 1))]);
}

#[test]
fn fewer_than_two_sizes_is_rejected() {
    let err = Mlp::new_with_seed(&[4], 0).unwrap_err();
    assert!(matches!(err, Error::InvalidConstruction(_)));
    assert!(err.to_string().contains("at least 2"));
}

#[test]
fn single_train_step_decreases_error_on_xor_example() {
    let mut mlp = Mlp::new_with_seed(&[2, 2, 1], 5).unwrap();
    let x = col(&[1.0, 1.0]);
    let t = col(&[0.0]);

    let before = loss::sum_squared_error(&mlp.feedforward(&x).unwrap(), &t).unwrap();
    mlp.train(&x, &t, 0.01).unwrap();
    let after = loss::sum_squared_error(&mlp.feedforward(&x).unwrap(), &t).unwrap();

    assert!(after < before, "before={before} after={after}");
}

#[test]
fn repeated_training_learns_logical_and() {
    let mut mlp = Mlp::new_with_seed(&[2, 3, 1], 1).unwrap();
    let data = and_examples();

    for _ in 0..10_000 {
        for (x, t) in &data {
            mlp.train(x, t, 0.5).unwrap();
        }
    }

    for (x, t) in &data {
        let y = mlp.feedforward(x).unwrap();
        let diff = (y.as_slice()[0] - t.as_slice()[0]).abs();
        assert!(diff < 0.1, "input {:?}: output {y} too far from {t}", x.as_slice());
    }
}

#[test]
fn fit_matches_manual_epoch_loop() {
    let data = and_examples();
    let rows: Vec<Vec<f64>> = data.iter().map(|(x, _)| x.as_slice().to_vec()).collect();
    let targets: Vec<Vec<f64>> = data.iter().map(|(_, t)| t.as_slice().to_vec()).collect();
    let dataset = Dataset::from_rows(&rows, &targets).unwrap();

    let mut manual = Mlp::new_with_seed(&[2, 2, 1], 3).unwrap();
    let mut fitted = manual.clone();

    for _ in 0..50 {
        for (x, t) in &data {
            manual.train(x, t, 0.3).unwrap();
        }
    }
    fitted
        .fit(
            &dataset,
            FitConfig {
                epochs: 50,
                learning_rate: 0.3,
                shuffle: Shuffle::None,
                log_every: 0,
            },
        )
        .unwrap();

    for (a, b) in manual.layers().iter().zip(fitted.layers()) {
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.biases(), b.biases());
    }
}

#[test]
fn batched_step_equals_sum_of_column_gradients() {
    let base = Mlp::new_with_seed(&[2, 3, 1], 8).unwrap();
    let batch = Matrix::from_rows(&[[0.0, 1.0], [1.0, 1.0]]).unwrap();
    let targets = Matrix::from_rows(&[[1.0, 0.0]]).unwrap();

    let mut batched = base.clone();
    batched.train(&batch, &targets, 0.1).unwrap();
    assert_eq!(batched.phase(), Phase::Updated);

    // Same step computed from the per-column deltas of the unmodified network.
    let mut expected: Vec<Matrix> = base.layers().iter().map(|l| l.weights().copy()).collect();
    for (x, t) in [(col(&[0.0, 1.0]), col(&[1.0])), (col(&[1.0, 1.0]), col(&[0.0]))] {
        let mut p = base.clone();
        p.feedforward(&x).unwrap();
        p.backpropagate(&t).unwrap();
        let mut input = x.copy();
        for (li, layer) in p.layers().iter().enumerate() {
            let delta = layer.delta().unwrap();
            let step = delta.multiply(&input.transpose().unwrap()).unwrap().scale(0.1).unwrap();
            expected[li] = expected[li].add(&step).unwrap();
            input = layer.outputs().unwrap().copy();
        }
    }

    for (layer, want) in batched.layers().iter().zip(&expected) {
        for (a, b) in layer.weights().as_slice().iter().zip(want.as_slice()) {
            approx::assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}
