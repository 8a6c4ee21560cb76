use dense_mlp::{Dataset, FitConfig, Mlp, Shuffle};

fn main() -> dense_mlp::Result<()> {
    env_logger::init();

    // Classic XOR dataset.
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    // 2 -> 4 -> 1, sigmoid everywhere.
    let mut mlp = Mlp::new_with_seed(&[2, 4, 1], 0)?;

    let report = mlp.fit(
        &train,
        FitConfig {
            epochs: 10_000,
            learning_rate: 0.5,
            shuffle: Shuffle::Seeded(0),
            log_every: 1_000,
        },
    )?;

    println!(
        "final_loss_from_fit={} train_mse={}",
        report.final_loss,
        mlp.evaluate_mse(&train)?
    );

    for (input, _) in train.iter() {
        let y = mlp.feedforward(input)?;
        print!("x={:?} y=", input.as_slice());
        println!("{y}");
    }

    Ok(())
}
