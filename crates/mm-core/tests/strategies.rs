use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use approx::assert_relative_eq;
use half::f16;
use mm_core::{
    Algebra, BlockSize, Executor, Instrumented, LeafTask, Matrix, MatrixError, Region,
    SequentialExecutor, Strategy, TaskOutcome,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Runs tasks in order on the calling thread and remembers every write
/// region it was handed.
#[derive(Debug, Default)]
struct RecordingExecutor {
    regions: Mutex<Vec<Region>>,
    calls: AtomicUsize,
}

impl RecordingExecutor {
    fn regions(&self) -> Vec<Region> {
        self.regions.lock().unwrap().clone()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Executor for RecordingExecutor {
    fn name(&self) -> &str {
        "recording"
    }

    fn run_all<'scope>(&self, tasks: Vec<LeafTask<'scope>>) -> Vec<TaskOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.regions
            .lock()
            .unwrap()
            .extend(tasks.iter().map(|t| t.region()));
        tasks.into_iter().map(LeafTask::run).collect()
    }
}

fn random_matrix(rows: usize, cols: usize, rng: &mut StdRng) -> Matrix<i64> {
    Matrix::with_generator(rows, cols, Algebra::standard(), || rng.gen_range(1..9)).unwrap()
}

fn all_strategies() -> Vec<Strategy> {
    let mut strategies = vec![Strategy::Iterative, Strategy::RecursiveVector];
    for t in [1, 2, 4, 10, 100] {
        strategies.push(Strategy::RecursiveBox(BlockSize::new(t, t).unwrap()));
    }
    strategies.push(Strategy::RecursiveBox(BlockSize::new(1, 3).unwrap()));
    strategies.push(Strategy::RecursiveBox(BlockSize::new(5, 2).unwrap()));
    strategies
}

#[test]
fn test_2x2_example_under_every_strategy() {
    let a = Matrix::from_vec(2, 2, vec![1, 2, 3, 4], Algebra::<i64>::standard()).unwrap();
    let b = Matrix::from_vec(2, 2, vec![5, 6, 7, 8], Algebra::standard()).unwrap();
    let seq = SequentialExecutor::new();

    assert_eq!(a.multiply_iterative(&b, &seq).unwrap().as_slice(), &[19, 22, 43, 50]);
    assert_eq!(
        a.multiply_recursive_vector(&b, &seq).unwrap().as_slice(),
        &[19, 22, 43, 50]
    );
    assert_eq!(
        a.multiply_recursive_box(&b, BlockSize::default(), &seq)
            .unwrap()
            .as_slice(),
        &[19, 22, 43, 50]
    );
}

#[test]
fn test_edge_shapes_agree() {
    let mut rng = StdRng::seed_from_u64(7);
    let seq = SequentialExecutor::new();
    let shapes = [
        (1, 1, 1),
        (1, 5, 1),
        (5, 1, 5),
        (1, 5, 7),
        (5, 1, 1),
        (3, 0, 4),
        (0, 3, 4),
        (4, 3, 0),
        (7, 7, 7),
        (47, 23, 32),
    ];
    for (m, k, n) in shapes {
        let a = random_matrix(m, k, &mut rng);
        let b = random_matrix(k, n, &mut rng);
        let expected = a.multiply_reference(&b).unwrap();
        assert_eq!((expected.rows(), expected.cols()), (m, n));
        for strategy in all_strategies() {
            let c = a.multiply(&b, strategy, &seq).unwrap();
            assert_eq!(c, expected, "{} on {}x{}x{}", strategy, m, k, n);
        }
    }
}

#[test]
fn test_incompatible_dimensions_spawn_nothing() {
    let a = Matrix::new(3, 4, Algebra::<i64>::standard()).unwrap();
    let b = Matrix::new(5, 2, Algebra::<i64>::standard()).unwrap();
    let spy = RecordingExecutor::default();

    for strategy in all_strategies() {
        let err = a.multiply(&b, strategy, &spy).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::IncompatibleDimensions { m: 3, k: 4, k2: 5, n: 2 }
        ));
    }
    assert_eq!(spy.calls(), 0);
    assert!(spy.regions().is_empty());
}

#[test]
fn test_block_size_changes_task_count_not_result() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = random_matrix(37, 19, &mut rng);
    let b = random_matrix(19, 29, &mut rng);
    let expected = a.multiply_reference(&b).unwrap();
    let seq = SequentialExecutor::new();

    let mut previous = usize::MAX;
    for t in [1, 2, 4, 10, 100] {
        let counting = Instrumented::new(&seq);
        let c = a
            .multiply_recursive_box(&b, BlockSize::new(t, t).unwrap(), &counting)
            .unwrap();
        assert_eq!(c, expected, "block {}", t);
        assert!(counting.tasks() <= previous, "block {} spawned more tasks", t);
        previous = counting.tasks();
    }
    // The whole 37x29 result fits one 100x100 block.
    assert_eq!(previous, 1);

    // Growing only one threshold is monotone as well.
    let mut previous = usize::MAX;
    for t in [1, 2, 4, 10, 100] {
        let counting = Instrumented::new(&seq);
        a.multiply_recursive_box(&b, BlockSize::new(2, t).unwrap(), &counting)
            .unwrap();
        assert!(counting.tasks() <= previous);
        previous = counting.tasks();
    }
}

#[test]
fn test_cell_strategies_spawn_one_task_per_cell() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = random_matrix(9, 4, &mut rng);
    let b = random_matrix(4, 6, &mut rng);
    let seq = SequentialExecutor::new();

    for strategy in [
        Strategy::Iterative,
        Strategy::RecursiveVector,
        Strategy::RecursiveBox(BlockSize::CELL),
    ] {
        let counting = Instrumented::new(&seq);
        a.multiply(&b, strategy, &counting).unwrap();
        assert_eq!(counting.tasks(), 54, "{}", strategy);
    }
}

#[test]
fn test_leaf_write_sets_partition_the_result() {
    let mut rng = StdRng::seed_from_u64(5);
    for (m, k, n) in [(1, 1, 1), (6, 3, 5), (13, 4, 9), (2, 2, 17)] {
        let a = random_matrix(m, k, &mut rng);
        let b = random_matrix(k, n, &mut rng);
        for strategy in all_strategies() {
            let spy = RecordingExecutor::default();
            a.multiply(&b, strategy, &spy).unwrap();

            let mut seen = HashSet::new();
            let mut written = 0;
            for region in spy.regions() {
                for (r, c) in region.cells() {
                    assert!(r < m && c < n, "{} wrote outside the result", strategy);
                    seen.insert((r, c));
                    written += 1;
                }
            }
            assert_eq!(written, m * n, "{} wrote a cell twice", strategy);
            assert_eq!(seen.len(), m * n, "{} missed a cell", strategy);
        }
    }
}

#[test]
fn test_vector_splits_rows_before_columns() {
    let a = Matrix::new(3, 2, Algebra::<i64>::standard()).unwrap();
    let b = Matrix::new(2, 4, Algebra::<i64>::standard()).unwrap();
    let spy = RecordingExecutor::default();
    a.multiply_recursive_vector(&b, &spy).unwrap();

    // Rows are halved to single rows first, each of which is then split
    // into cells, so a sequential run visits cells in row-major order.
    let expected: Vec<Region> = Region::new(0, 0, 3, 4)
        .cells()
        .map(|(r, c)| Region::cell(r, c))
        .collect();
    assert_eq!(spy.regions(), expected);
}

#[test]
fn test_box_leaves_respect_thresholds() {
    let a = Matrix::new(11, 3, Algebra::<i64>::standard()).unwrap();
    let b = Matrix::new(3, 7, Algebra::<i64>::standard()).unwrap();
    let spy = RecordingExecutor::default();
    a.multiply_recursive_box(&b, BlockSize::new(3, 2).unwrap(), &spy)
        .unwrap();
    for region in spy.regions() {
        assert!(region.rows >= 1 && region.rows <= 3, "{}", region);
        assert!(region.cols >= 1 && region.cols <= 2, "{}", region);
    }
    // 11 rows -> 5 + 6 -> 2 + 3 + 3 + 3; 7 cols -> 3 + 4 -> 1 + 2 + 2 + 2.
    assert_eq!(spy.regions().len(), 16);
}

#[test]
fn test_boolean_reachability() {
    // Edges 0->1, 1->2, 2->3, 3->0, 0->2.
    let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)];
    let adjacency = Matrix::from_fn(4, 4, Algebra::boolean(), |r, c| {
        edges.contains(&(r, c))
    })
    .unwrap();

    // Two-step reachability.
    let expected = Matrix::from_fn(4, 4, Algebra::boolean(), |r, c| {
        edges
            .iter()
            .any(|&(from, mid)| from == r && edges.contains(&(mid, c)))
    })
    .unwrap();
    assert!(*expected.get(0, 3).unwrap());
    assert!(!*expected.get(1, 0).unwrap());

    let seq = SequentialExecutor::new();
    for strategy in all_strategies() {
        let two_steps = adjacency.multiply(&adjacency, strategy, &seq).unwrap();
        assert_eq!(two_steps, expected, "{}", strategy);
        assert_eq!(
            two_steps.description(),
            "false false true true\nfalse false false true\ntrue false false false\nfalse true true false"
        );
    }
}

#[test]
fn test_min_plus_shortest_paths() {
    // C[0,0] = min(0+0, 3+5) = 0
    // C[0,1] = min(0+2, 3+0) = 2
    // C[1,0] = min(7+0, 1+5) = 6
    // C[1,1] = min(7+2, 1+0) = 1
    let a = Matrix::from_vec(2, 2, vec![0.0, 3.0, 7.0, 1.0], Algebra::min_plus()).unwrap();
    let b = Matrix::from_vec(2, 2, vec![0.0, 2.0, 5.0, 0.0], Algebra::min_plus()).unwrap();
    let seq = SequentialExecutor::new();
    for strategy in all_strategies() {
        let c = a.multiply(&b, strategy, &seq).unwrap();
        for (got, want) in c.as_slice().iter().zip([0.0, 2.0, 6.0, 1.0]) {
            assert_relative_eq!(*got, want);
        }
        // The product keeps the operand's algebra.
        assert_eq!(*c.algebra().zero(), f64::INFINITY);
    }
}

#[test]
fn test_float_products_are_bit_identical() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut next = || rng.gen_range(-1.0..1.0);
    let a = Matrix::with_generator(12, 31, Algebra::<f64>::standard(), &mut next).unwrap();
    let b = Matrix::with_generator(31, 10, Algebra::<f64>::standard(), &mut next).unwrap();
    let expected = a.multiply_reference(&b).unwrap();
    let seq = SequentialExecutor::new();
    for strategy in all_strategies() {
        let c = a.multiply(&b, strategy, &seq).unwrap();
        let same_bits = c
            .as_slice()
            .iter()
            .zip(expected.as_slice())
            .all(|(x, y)| x.to_bits() == y.to_bits());
        assert!(same_bits, "{}", strategy);
    }
    let naive: f64 = (0..31)
        .map(|i| a.get(3, i).unwrap() * b.get(i, 4).unwrap())
        .sum();
    assert_relative_eq!(*expected.get(3, 4).unwrap(), naive, epsilon = 1e-12);
}

#[test]
fn test_half_precision_algebra() {
    let h = |v: f32| f16::from_f32(v);
    let a = Matrix::from_vec(2, 2, vec![h(1.0), h(2.0), h(3.0), h(4.0)], Algebra::standard())
        .unwrap();
    let b = Matrix::from_vec(2, 2, vec![h(5.0), h(6.0), h(7.0), h(8.0)], Algebra::standard())
        .unwrap();
    let c = a
        .multiply_recursive_box(&b, BlockSize::CELL, &SequentialExecutor::new())
        .unwrap();
    let values: Vec<f32> = c.as_slice().iter().map(|v| v.to_f32()).collect();
    assert_eq!(values, vec![19.0, 22.0, 43.0, 50.0]);
}

#[test]
fn test_failing_algebra_reports_every_leaf() {
    let algebra = Algebra::new(
        |a: &i64, b: &i64| {
            if *a == 13 {
                panic!("unlucky operand");
            }
            a * b
        },
        |a: &i64, b: &i64| a + b,
        0,
    );
    // Only row 1 of the left operand holds a 13.
    let a = Matrix::from_vec(3, 2, vec![1, 2, 13, 4, 5, 6], algebra).unwrap();
    let b = Matrix::from_vec(2, 4, vec![1; 8], Algebra::standard()).unwrap();
    let spy = RecordingExecutor::default();

    let err = a.multiply_recursive_vector(&b, &spy).unwrap_err();
    match err {
        MatrixError::TaskFailure {
            failed,
            total,
            failures,
        } => {
            assert_eq!(total, 12);
            assert_eq!(failed, 4);
            assert!(failures.iter().all(|f| f.region.row == 1));
            assert!(failures.iter().all(|f| f.message == "unlucky operand"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Every leaf was handed to the executor despite the failures.
    assert_eq!(spy.regions().len(), 12);
}

fn shape() -> impl proptest::strategy::Strategy<Value = (usize, usize, usize, u64)> {
    (0usize..12, 0usize..12, 0usize..12, any::<u64>())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        ..Default::default()
    })]

    #[test]
    fn strategies_match_reference((m, k, n, seed) in shape(), rows in 1usize..6, cols in 1usize..6) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = random_matrix(m, k, &mut rng);
        let b = random_matrix(k, n, &mut rng);
        let expected = a.multiply_reference(&b).unwrap();
        let seq = SequentialExecutor::new();

        prop_assert_eq!(&a.multiply_iterative(&b, &seq).unwrap(), &expected);
        prop_assert_eq!(&a.multiply_recursive_vector(&b, &seq).unwrap(), &expected);
        let block = BlockSize::new(rows, cols).unwrap();
        prop_assert_eq!(&a.multiply_recursive_box(&b, block, &seq).unwrap(), &expected);
    }
}
