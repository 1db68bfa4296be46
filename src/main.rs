use std::error::Error;

use rust_linear::{Dataset, Model, TrainConfig, logging, train};
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_logging()?;

    let data = Dataset::from_rows(&[vec![1.0, 2.0, 3.0]], &[vec![0.0, 1.0]])?;
    let mut model = Model::constant(2, 3, 0.1);

    let report = train(&data, &mut model, &TrainConfig::default())?;

    info!(
        final_loss = ?report.final_loss(),
        weights = ?model.weights().to_rows(),
        biases = ?model.biases(),
        "done"
    );
    Ok(())
}
