use rust_linear::{Dataset, Matrix, Model, TrainConfig, Transform, train};

fn demo() -> (Dataset, Model) {
    let data = Dataset::from_rows(&[vec![1.0, 2.0, 3.0]], &[vec![0.0, 1.0]]).unwrap();
    (data, Model::constant(2, 3, 0.1))
}

#[test]
fn default_demo_runs_one_hundred_iterations() {
    let (data, mut model) = demo();
    let report = train(&data, &mut model, &TrainConfig::default()).unwrap();

    assert_eq!(report.steps.len(), 100);
    assert_eq!(model.weights().shape(), (2, 3));
    assert_eq!(model.biases().len(), 2);
}

#[test]
fn default_demo_loss_goes_down_early() {
    let (data, mut model) = demo();
    let report = train(&data, &mut model, &TrainConfig::default()).unwrap();
    let losses = report.losses();

    // The initial scores are 0.6, so ln() makes both predictions negative and the first
    // loss is NaN. The update itself stays finite and lifts the scores above 1.
    assert!(losses[0].is_nan());
    assert!(model.weights().as_slice().iter().all(|w| w.is_finite()));

    let early = &losses[1..=5];
    assert!(early.iter().all(|l| l.is_finite()), "{early:?}");
    for pair in early.windows(2) {
        assert!(pair[1] <= pair[0], "loss went up: {early:?}");
    }
    assert!(early[4] < early[0]);
}

#[test]
fn default_demo_moves_predictions_toward_targets() {
    let (data, mut model) = demo();
    let cfg = TrainConfig {
        iterations: 20,
        ..TrainConfig::default()
    };
    train(&data, &mut model, &cfg).unwrap();

    let pred = model.predict(data.inputs(), Transform::Log).unwrap();
    // target 0
    assert!(pred[(0, 0)] > 0.0 && pred[(0, 0)] < 0.1, "{:?}", pred);
    // target 1
    assert!(pred[(0, 1)] > 0.99 && pred[(0, 1)] < 1.0, "{:?}", pred);
}

#[test]
fn training_is_deterministic() {
    let (data, mut a) = demo();
    let (_, mut b) = demo();
    let cfg = TrainConfig {
        iterations: 10,
        ..TrainConfig::default()
    };
    let ra = train(&data, &mut a, &cfg).unwrap();
    let rb = train(&data, &mut b, &cfg).unwrap();

    assert_eq!(a, b);
    let bits = |v: Vec<f32>| v.into_iter().map(f32::to_bits).collect::<Vec<_>>();
    assert_eq!(bits(ra.losses()), bits(rb.losses()));
}

#[test]
fn multi_sample_dataset_trains_with_softmax() {
    let inputs = Matrix::from_rows(&[
        vec![0.5, 1.0],
        vec![1.0, 0.5],
        vec![0.25, 0.75],
        vec![0.75, 0.25],
    ])
    .unwrap();
    let targets = Matrix::from_rows(&[
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![0.0, 1.0],
    ])
    .unwrap();
    let data = Dataset::new(inputs, targets).unwrap();

    let initial = Model::new_with_seed(2, 2, 42).unwrap();
    let mut model = initial.clone();
    let cfg = TrainConfig {
        iterations: 5,
        transform: Transform::Softmax,
        fail_on_non_finite: true,
        ..TrainConfig::default()
    };

    // Softmax keeps every prediction strictly inside (0, 1), so nothing goes non-finite.
    let report = model.fit(&data, &cfg).unwrap();
    assert_eq!(report.steps.len(), 5);
    assert!(report.steps.iter().all(|s| s.class_loss.len() == 2));
    assert_ne!(model, initial);
}
