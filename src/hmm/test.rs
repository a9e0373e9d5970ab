use super::{init::perturbed_row, *};
use crate::{
    assert_fp_eq,
    data::{Alphabet, ObservationSequence},
    generate::sample_observations,
    math::Matrix,
};
use rand_xoshiro::{Xoshiro256PlusPlus, rand_core::SeedableRng};

fn two_state_model() -> Model {
    Model::new(
        vec![0.6, 0.4],
        Matrix::<f64>::from_rows(&[[0.7, 0.3], [0.4, 0.6]]).unwrap(),
        Matrix::<f64>::from_rows(&[[0.5, 0.5], [0.5, 0.5]]).unwrap(),
    )
    .unwrap()
}

fn generating_model() -> Model {
    Model::new(
        vec![0.8, 0.2],
        Matrix::<f64>::from_rows(&[[0.9, 0.1], [0.2, 0.8]]).unwrap(),
        Matrix::<f64>::from_rows(&[[0.7, 0.2, 0.1], [0.1, 0.3, 0.6]]).unwrap(),
    )
    .unwrap()
}

fn seeded_model(n_states: usize, n_symbols: usize, seed: u64) -> Model {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    random_model(&mut rng, n_states, n_symbols, &Perturbation::default(), None).unwrap()
}

fn obs(symbols: &[usize], n_symbols: usize) -> ObservationSequence {
    ObservationSequence::new(symbols.to_vec(), n_symbols).unwrap()
}

#[test]
fn alpha_rows_are_distributions() {
    let (_, o) = sample_observations(&generating_model(), 300, 11);
    let pass = forward(&seeded_model(2, 3, 1), &o).unwrap();

    assert_eq!(pass.alpha().shape(), (300, 2));
    assert_eq!(pass.scale().len(), 300);
    for sum in pass.alpha().row_sums() {
        assert_fp_eq!(@absolute, sum, 1.0, 1e-9);
    }
    assert!(pass.scale().iter().all(|&c| c.is_finite() && c > 0.0));
}

#[test]
fn forward_backward_products_recover_scale() {
    let (_, o) = sample_observations(&generating_model(), 200, 5);
    let model = seeded_model(2, 3, 2);
    let pass = forward(&model, &o).unwrap();
    let beta = backward(&model, &o, pass.scale()).unwrap();

    let last = o.len() - 1;
    for &b in beta.row(last) {
        assert_fp_eq!(b, pass.scale()[last]);
    }
    for t in 0..o.len() {
        let product: f64 = pass.alpha().row(t).iter().zip(beta.row(t)).map(|(a, b)| a * b).sum();
        assert_fp_eq!(product, pass.scale()[t], 1e-9);
    }
}

#[test]
fn posteriors_are_consistent() {
    let (_, o) = sample_observations(&generating_model(), 150, 8);
    let model = seeded_model(2, 3, 3);
    let pass = forward(&model, &o).unwrap();
    let beta = backward(&model, &o, pass.scale()).unwrap();
    let post = posteriors(&model, &o, pass.alpha(), &beta).unwrap();

    assert_eq!(post.gamma().shape(), (150, 2));
    assert_eq!(post.di_gamma().len(), 149);
    for sum in post.gamma().row_sums() {
        assert_fp_eq!(@absolute, sum, 1.0, 1e-9);
    }
    for (t, xi) in post.di_gamma().iter().enumerate() {
        assert_fp_eq!(@absolute, xi.as_slice().iter().sum::<f64>(), 1.0, 1e-9);
        assert_fp_eq!(@absolute, xi.row_sums(), post.gamma().row(t).to_vec(), 1e-9);
    }
}

#[test]
fn long_sequences_do_not_underflow() {
    let (_, o) = sample_observations(&generating_model(), 20_000, 13);
    let log_prob = generating_model().log_likelihood(&o).unwrap();
    assert!(log_prob.is_finite());
    assert!(log_prob < 0.0);
}

#[test]
fn uninformative_emissions() {
    let mut model = two_state_model();
    let o = obs(&[0, 1, 0, 1], 2);

    let log_prob = em_step(&mut model, &o, true).unwrap();
    assert_fp_eq!(log_prob, 4.0 * 0.5_f64.ln());

    // Every emission is equally likely in both states, so the posteriors are
    // the prior state marginals 0.6, 0.58, 0.574, 0.5722
    assert_fp_eq!(model.initial().to_vec(), vec![0.6, 0.4]);
    assert_fp_eq!(model.transition().row(0).to_vec(), vec![0.7, 0.3]);
    assert_fp_eq!(model.transition().row(1).to_vec(), vec![0.4, 0.6]);
    assert_fp_eq!(model.emission()[(0, 0)], 1.174 / 2.3262);
    assert_fp_eq!(model.emission()[(1, 0)], 0.826 / 1.6738);
    assert!(model.is_row_stochastic(1e-12));
}

#[test]
fn symmetric_model_keeps_uniform_emissions() {
    let mut model = Model::new(
        vec![0.5, 0.5],
        Matrix::<f64>::from_rows(&[[0.7, 0.3], [0.3, 0.7]]).unwrap(),
        Matrix::new(0.5, 2, 2),
    )
    .unwrap();

    em_step(&mut model, &obs(&[0, 1, 0, 1], 2), true).unwrap();
    assert_fp_eq!(model.emission().as_slice().to_vec(), vec![0.5; 4]);
    assert_fp_eq!(model.initial().to_vec(), vec![0.5, 0.5]);
}

#[test]
fn unseen_symbol_gets_zero_emission() {
    let mut model = seeded_model(2, 3, 4);
    em_step(&mut model, &obs(&[0, 1, 1, 0, 1], 3), true).unwrap();

    for i in 0..2 {
        assert_eq!(model.emission()[(i, 2)], 0.0);
    }
    assert!(model.emission().as_slice().iter().all(|p| !p.is_nan()));
    assert!(model.is_row_stochastic(1e-9));
}

#[test]
fn unreachable_state_is_degenerate() {
    // State 1 has no initial probability and nothing moves into it
    let model = Model::new(
        vec![1.0, 0.0],
        Matrix::<f64>::from_rows(&[[1.0, 0.0], [1.0, 0.0]]).unwrap(),
        Matrix::new(0.5, 2, 2),
    )
    .unwrap();
    let o = obs(&[0, 1, 1], 2);

    let mut trained = model.clone();
    assert_eq!(
        em_step(&mut trained, &o, true),
        Err(Degeneracy::TransitionOccupancy { state: 1 })
    );
    assert_eq!(trained, model);

    assert_eq!(
        em_step(&mut trained, &o, false),
        Err(Degeneracy::StateOccupancy { state: 1 })
    );
    assert_eq!(trained, model);
}

#[test]
fn impossible_symbol_is_degenerate() {
    let model = Model::new(
        vec![0.5, 0.5],
        Matrix::new(0.5, 2, 2),
        Matrix::<f64>::from_rows(&[[1.0, 0.0], [1.0, 0.0]]).unwrap(),
    )
    .unwrap();

    assert_eq!(
        forward(&model, &obs(&[0, 0, 1], 2)).unwrap_err(),
        Degeneracy::ForwardMass { t: 2 }
    );
    assert_eq!(
        model.log_likelihood(&obs(&[1], 2)),
        Err(HmmError::Degenerate(Degeneracy::ForwardMass { t: 0 }))
    );
}

#[test]
fn score_rejects_non_finite() {
    assert_fp_eq!(log_likelihood(&[2.0, 4.0]).unwrap(), -(8.0_f64.ln()));
    assert_eq!(log_likelihood(&[f64::INFINITY]), Err(Degeneracy::NonFiniteScore));
}

#[test]
fn likelihood_never_decreases() {
    let (_, o) = sample_observations(&generating_model(), 500, 21);
    let config = TrainingConfig::new(2, 3).with_min_iters(50);
    let mut model = seeded_model(2, 3, 5);

    let summary = BaumWelch::new(&config).fit(&mut model, &o).unwrap();
    assert!(summary.iterations >= 50);
    assert_eq!(summary.history.len(), summary.iterations);
    for pair in summary.history.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-6, "{} then {}", pair[0], pair[1]);
    }
    assert!(model.is_row_stochastic(1e-9));
    assert_fp_eq!(summary.log_prob, model.log_likelihood(&o).unwrap());
}

#[test]
fn converged_model_is_a_fixed_point() {
    let (_, o) = sample_observations(&generating_model(), 400, 34);
    let config = TrainingConfig::new(2, 3).with_min_iters(10).with_max_iters(20_000);
    let mut model = seeded_model(2, 3, 6);

    let summary = BaumWelch::new(&config).fit(&mut model, &o).unwrap();
    assert!(summary.converged);

    let before = em_step(&mut model, &o, true).unwrap();
    let after = em_step(&mut model, &o, true).unwrap();
    assert_fp_eq!(@absolute, before, summary.log_prob, 1e-9);
    assert!((after - before).abs() <= config.epsilon);
}

#[test]
fn at_least_one_iteration() {
    let config = TrainingConfig::new(2, 2).with_min_iters(0).with_epsilon(f64::INFINITY);
    let mut model = two_state_model();

    let summary = BaumWelch::new(&config).fit(&mut model, &obs(&[0, 1, 0, 1], 2)).unwrap();
    assert_eq!(summary.iterations, 1);
    assert!(summary.converged);
}

#[test]
fn iteration_cap() {
    let (_, o) = sample_observations(&generating_model(), 100, 2);
    let config = TrainingConfig::new(2, 3).with_max_iters(3).with_epsilon(0.0);
    let mut model = seeded_model(2, 3, 7);

    let summary = BaumWelch::new(&config).fit(&mut model, &o).unwrap();
    assert_eq!(summary.iterations, 3);
    assert!(!summary.converged);
}

#[test]
fn frozen_transitions() {
    let (_, o) = sample_observations(&generating_model(), 200, 9);
    let config = TrainingConfig::new(2, 3)
        .with_min_iters(20)
        .with_reestimate_transitions(false);
    let mut model = seeded_model(2, 3, 8);
    let transition = model.transition().clone();

    BaumWelch::new(&config).fit(&mut model, &o).unwrap();
    assert_eq!(model.transition(), &transition);
    assert!(model.is_row_stochastic(1e-9));
}

#[test]
fn fit_checks_the_sequence() {
    let config = TrainingConfig::new(2, 2);
    let mut model = two_state_model();

    assert_eq!(
        BaumWelch::new(&config).fit(&mut model, &obs(&[], 2)),
        Err(HmmError::EmptySequence)
    );
    assert!(matches!(
        BaumWelch::new(&config).fit(&mut model, &obs(&[0, 2], 3)),
        Err(HmmError::ShapeMismatch { .. })
    ));
}

#[test]
fn fit_rejects_invalid_config() {
    let o = obs(&[0, 1, 1, 0], 2);
    let mut model = two_state_model();

    let negative = TrainingConfig::new(2, 2).with_epsilon(-1.0);
    assert_eq!(
        BaumWelch::new(&negative).fit(&mut model, &o),
        Err(HmmError::InvalidEpsilon(-1.0))
    );
    let nan = TrainingConfig::new(2, 2).with_epsilon(f64::NAN);
    assert!(matches!(
        BaumWelch::new(&nan).fit(&mut model, &o),
        Err(HmmError::InvalidEpsilon(_))
    ));
    assert_eq!(model, two_state_model());
}

#[test]
fn model_validation() {
    assert_eq!(
        Model::new(vec![], Matrix::new(0.0, 0, 0), Matrix::new(0.0, 0, 2)),
        Err(HmmError::ZeroStates)
    );
    assert!(matches!(
        Model::new(vec![0.5, 0.5], Matrix::new(0.5, 2, 3), Matrix::new(0.5, 2, 2)),
        Err(HmmError::ShapeMismatch {
            what: "transition matrix",
            ..
        })
    ));
    assert!(matches!(
        Model::new(vec![0.7, 0.7], Matrix::new(0.5, 2, 2), Matrix::new(0.5, 2, 2)),
        Err(HmmError::NotStochastic {
            what: "initial distribution",
            ..
        })
    ));
    assert!(matches!(
        Model::new(vec![0.5, 0.5], Matrix::new(0.5, 2, 2), Matrix::new(0.4, 2, 2)),
        Err(HmmError::NotStochastic {
            what: "emission matrix",
            row: 0,
            ..
        })
    ));
}

#[test]
fn dominant_states_and_report() {
    let model = generating_model();
    assert_eq!(model.dominant_states(), vec![0, 1, 1]);

    let report = model.to_string();
    assert!(report.starts_with("A:\n"));
    assert!(report.contains("B^T:"));
    assert!(report.contains("state = 1"));
    assert!(report.contains("pi:"));

    let letters = seeded_model(2, 27, 1).to_string();
    assert!(letters.contains(" a  |"));
    assert!(letters.contains("' ' |"));
}

#[test]
fn perturbed_rows() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

    for len in [1, 2, 26, 27] {
        let row = perturbed_row(&mut rng, len, 0.002).unwrap();
        assert_eq!(row.len(), len);
        assert_fp_eq!(@absolute, row.iter().sum::<f64>(), 1.0, 1e-12);
        assert!(row.iter().all(|&p| p > 0.0));
    }

    let uniform = perturbed_row(&mut rng, 4, 0.0).unwrap();
    assert_fp_eq!(uniform, vec![0.25; 4]);

    assert_eq!(
        perturbed_row(&mut rng, 2, 1.0),
        Err(HmmError::PerturbationTooLarge { len: 2, scale: 1.0 })
    );
}

#[test]
fn random_models_are_valid() {
    let model = seeded_model(3, 27, 42);
    assert_eq!(model.n_states(), 3);
    assert_eq!(model.n_symbols(), 27);
    assert!(model.is_row_stochastic(1e-12));
    assert_ne!(model, seeded_model(3, 27, 43));
    assert_eq!(model, seeded_model(3, 27, 42));

    let fixed = Matrix::<f64>::from_rows(&[[0.1, 0.9], [0.5, 0.5]]).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
    let model = random_model(&mut rng, 2, 4, &Perturbation::default(), Some(&fixed)).unwrap();
    assert_eq!(model.transition(), &fixed);
}

#[test]
fn digraphs() {
    let o = Alphabet::Letters.encode(b"abab");

    let a = digraph_transitions(&o, 0);
    assert_eq!(a.shape(), (26, 26));
    assert_eq!(a[(0, 1)], 1.0);
    assert_eq!(a[(1, 0)], 1.0);
    assert_fp_eq!(a.row(2).to_vec(), vec![1.0 / 26.0; 26]);

    let a = digraph_transitions(&o, 1);
    assert_fp_eq!(a[(0, 1)], 3.0 / 28.0);
    assert_fp_eq!(a[(0, 0)], 1.0 / 28.0);
    assert!(a.is_row_stochastic(1e-12));
}

#[test]
fn config_validation() {
    assert_eq!(TrainingConfig::new(0, 2).validate(), Err(HmmError::ZeroStates));
    assert_eq!(TrainingConfig::new(2, 0).validate(), Err(HmmError::ZeroSymbols));
    assert_eq!(
        TrainingConfig::new(2, 2).with_epsilon(-1.0).validate(),
        Err(HmmError::InvalidEpsilon(-1.0))
    );
    assert!(matches!(
        TrainingConfig::new(2, 2).with_epsilon(f64::NAN).validate(),
        Err(HmmError::InvalidEpsilon(_))
    ));
    assert!(TrainingConfig::new(2, 2).with_epsilon(f64::INFINITY).validate().is_ok());

    let bad = Perturbation {
        emission: -0.1,
        ..Perturbation::default()
    };
    assert_eq!(
        TrainingConfig::new(2, 2).with_perturbation(bad).validate(),
        Err(HmmError::InvalidPerturbation(-0.1))
    );

    let config = TrainingConfig::new(3, 2).with_fixed_transitions(Matrix::new(0.5, 2, 2));
    assert!(!config.reestimate_transitions);
    assert!(matches!(config.validate(), Err(HmmError::ShapeMismatch { .. })));

    let config = TrainingConfig::new(2, 2).with_fixed_transitions(Matrix::new(0.3, 2, 2));
    assert!(matches!(config.validate(), Err(HmmError::NotStochastic { .. })));
}

fn candidate(log_prob: f64, restart: usize) -> BestModel {
    BestModel {
        model: two_state_model(),
        log_prob,
        restart,
        iterations: 1,
    }
}

#[test]
fn tracker_keeps_the_first_best() {
    let mut tracker = BestTracker::new();
    assert_eq!(tracker.best_log_prob(), f64::NEG_INFINITY);

    assert!(!tracker.offer(candidate(f64::NEG_INFINITY, 0)));
    assert!(!tracker.offer(candidate(f64::NAN, 1)));
    assert!(tracker.best().is_none());

    assert!(tracker.offer(candidate(-10.0, 2)));
    assert!(!tracker.offer(candidate(-10.0, 3)));
    assert!(!tracker.offer(candidate(-12.0, 4)));
    assert!(tracker.offer(candidate(-9.5, 5)));
    assert!(!tracker.offer(candidate(-9.5, 6)));

    let best = tracker.finish(7).unwrap();
    assert_eq!(best.restart, 5);
    assert_eq!(best.log_prob, -9.5);

    assert_eq!(BestTracker::new().finish(3), Err(HmmError::NoValidModel { restarts: 3 }));
}

#[test]
fn no_restarts_no_model() {
    let config = TrainingConfig::new(2, 2).with_restarts(0).with_seed(1);
    assert_eq!(
        RandomRestartOptimizer::new(config).run(&obs(&[0, 1], 2)),
        Err(HmmError::NoValidModel { restarts: 0 })
    );
}

#[test]
fn every_restart_degenerates() {
    // A single observation has no transitions to re-estimate `A` from
    let config = TrainingConfig::new(2, 2).with_restarts(3).with_seed(1);
    assert_eq!(
        RandomRestartOptimizer::new(config).run(&obs(&[1], 2)),
        Err(HmmError::NoValidModel { restarts: 3 })
    );

    let config = TrainingConfig::new(2, 2)
        .with_restarts(3)
        .with_seed(1)
        .with_reestimate_transitions(false);
    assert!(RandomRestartOptimizer::new(config).run(&obs(&[1], 2)).is_ok());
}

#[test]
fn configuration_errors_are_fatal() {
    let config = TrainingConfig::new(2, 3).with_restarts(3);
    assert!(matches!(
        RandomRestartOptimizer::new(config).run(&obs(&[0, 1], 2)),
        Err(HmmError::ShapeMismatch { .. })
    ));

    let config = TrainingConfig::new(2, 2).with_perturbation(Perturbation {
        initial: 0.9,
        ..Perturbation::default()
    });
    assert_eq!(
        RandomRestartOptimizer::new(config).run(&obs(&[0, 1], 2)),
        Err(HmmError::PerturbationTooLarge { len: 2, scale: 0.9 })
    );
}

#[test]
fn restarts_are_reproducible() {
    let (_, o) = sample_observations(&generating_model(), 300, 17);
    let config = TrainingConfig::new(2, 3).with_restarts(5).with_min_iters(20).with_seed(99);

    let first = RandomRestartOptimizer::new(config.clone()).run(&o).unwrap();
    let second = RandomRestartOptimizer::new(config).run(&o).unwrap();
    assert_eq!(first, second);
    assert_fp_eq!(@absolute, first.model, second.model, 1e-12);
    assert!(first.restart < 5);
    assert!(first.model.is_row_stochastic(1e-9));
    assert_fp_eq!(first.log_prob, first.model.log_likelihood(&o).unwrap());
}

#[test]
fn single_pass_restarts() {
    let config = TrainingConfig::new(2, 2)
        .with_restarts(4)
        .with_min_iters(0)
        .with_epsilon(f64::INFINITY)
        .with_seed(5);
    let best = RandomRestartOptimizer::new(config).run(&obs(&[0, 1, 0, 1], 2)).unwrap();
    assert_eq!(best.iterations, 1);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_restarts_match_sequential() {
    use crate::generate::restart_seeds;

    let (_, o) = sample_observations(&generating_model(), 300, 23);
    let config = TrainingConfig::new(2, 3).with_restarts(8).with_min_iters(15).with_seed(99);

    let mut expected: Option<BestModel> = None;
    for (restart, seed) in restart_seeds(99, 8).into_iter().enumerate() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut model = random_model(&mut rng, 2, 3, &config.perturbation, None).unwrap();
        let summary = BaumWelch::new(&config).fit(&mut model, &o).unwrap();
        if expected.as_ref().is_none_or(|best| summary.log_prob > best.log_prob) {
            expected = Some(BestModel {
                model,
                log_prob: summary.log_prob,
                restart,
                iterations: summary.iterations,
            });
        }
    }

    let best = RandomRestartOptimizer::new(config).run(&o).unwrap();
    assert_eq!(Some(best), expected);
}
