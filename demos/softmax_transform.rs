use rust_linear::{Dataset, Model, TrainConfig, Transform, logging};

fn main() -> rust_linear::Result<()> {
    if let Err(err) = logging::init_logging() {
        eprintln!("logging disabled: {err}");
    }

    // Two samples, three features, two one-hot classes.
    let data = Dataset::from_rows(
        &[vec![1.0, 0.0, 0.5], vec![0.0, 1.0, 0.5]],
        &[vec![1.0, 0.0], vec![0.0, 1.0]],
    )?;
    let mut model = Model::new(2, 3);

    let report = model.fit(
        &data,
        &TrainConfig {
            iterations: 50,
            transform: Transform::Softmax,
            fail_on_non_finite: true,
            ..TrainConfig::default()
        },
    )?;

    let pred = model.predict(data.inputs(), Transform::Softmax)?;
    println!("final_loss={:?}", report.final_loss());
    println!("pred={:?}", pred.to_rows());
    Ok(())
}
