use dense_mlp::{Matrix, Mlp};

fn main() -> dense_mlp::Result<()> {
    env_logger::init();

    let samples = [
        ([0.0, 0.0], 0.0),
        ([0.0, 1.0], 0.0),
        ([1.0, 0.0], 0.0),
        ([1.0, 1.0], 1.0),
    ];
    let data = samples
        .iter()
        .map(|(x, t)| Ok((Matrix::column(x)?, Matrix::column(&[*t])?)))
        .collect::<dense_mlp::Result<Vec<_>>>()?;

    // Non-reproducible init, like a quick experiment would use.
    let mut mlp = Mlp::new_with_time_seed(&[2, 2, 1], 42)?;

    // The epoch loop is the caller's: one `train` step per example.
    for epoch in 0..5_000 {
        let mut loss = 0.0;
        for (x, t) in &data {
            loss += mlp.train(x, t, 0.5)?;
        }
        if epoch % 1_000 == 0 {
            log::info!("epoch {epoch}: loss={loss:.6}");
        }
    }

    for (x, t) in &data {
        let y = mlp.feedforward(x)?;
        println!(
            "{:?} -> {:.4} (target {})",
            x.as_slice(),
            y.as_slice()[0],
            t.as_slice()[0]
        );
    }
    println!("output layer weights:{}", mlp.layers()[1].weights());

    Ok(())
}
