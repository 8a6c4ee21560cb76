use dense_mlp::activation::{Sigmoid, Tanh};
use dense_mlp::{Dataset, FitConfig, Mlp, MlpBuilder};

fn main() -> dense_mlp::Result<()> {
    env_logger::init();

    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    let mut mlp = MlpBuilder::new(2)?
        .add_layer(4, Tanh)?
        .add_layer(1, Sigmoid)?
        .build_with_seed(0)?;

    mlp.fit(
        &train,
        FitConfig {
            epochs: 2_000,
            ..FitConfig::default()
        },
    )?;

    let path = std::env::temp_dir().join("dense_mlp_xor.json");
    mlp.save_json(&path)?;

    let loaded = Mlp::load_json(&path)?;
    println!(
        "saved and loaded model: {} (train_mse before={} after={})",
        path.display(),
        mlp.evaluate_mse(&train)?,
        loaded.evaluate_mse(&train)?
    );
    Ok(())
}
