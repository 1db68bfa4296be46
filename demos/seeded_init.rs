use rust_linear::{Dataset, Model, TrainConfig, Transform};

fn main() -> rust_linear::Result<()> {
    let data = Dataset::from_rows(
        &[vec![0.5, 1.0], vec![1.0, 0.5], vec![0.2, 0.9]],
        &[vec![0.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
    )?;

    let mut model = Model::new_with_seed(2, 2, 0)?;
    println!("initial weights={:?}", model.weights().to_rows());

    let report = model.fit(
        &data,
        &TrainConfig {
            iterations: 25,
            transform: Transform::Identity,
            ..TrainConfig::default()
        },
    )?;

    for (i, step) in report.steps.iter().enumerate().step_by(5) {
        println!(
            "iter={i} loss={} loss_derivative={} class_loss={:?}",
            step.loss, step.loss_derivative, step.class_loss
        );
    }
    println!(
        "weights={:?} biases={:?}",
        model.weights().to_rows(),
        model.biases()
    );
    Ok(())
}
