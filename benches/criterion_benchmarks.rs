use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use auto_node::{Node, Traversal};

fn build_chain(x: &Node, len: usize) -> Node {
  let mut result = x.sin();
  for _ in 0..len {
    result = (&result * &result).sin() + result.cos();
  }
  result
}

fn forward_chain(c: &mut Criterion) {
  let mut group = c.benchmark_group("forward_chain");

  for chain_len in [10, 50, 100, 500, 1000] {
    group.throughput(Throughput::Elements(chain_len as u64));
    group.bench_with_input(
      BenchmarkId::from_parameter(chain_len),
      &chain_len,
      |b, &len| {
        b.iter(|| {
          let x = Node::with_gradient(black_box(0.3), 1.0);
          let result = build_chain(&x, len);
          black_box(result.forward())
        });
      },
    );
  }
  group.finish();
}

fn backward_chain(c: &mut Criterion) {
  let mut group = c.benchmark_group("backward_chain");

  for chain_len in [10, 50, 100, 500, 1000] {
    group.throughput(Throughput::Elements(chain_len as u64));
    group.bench_with_input(
      BenchmarkId::from_parameter(chain_len),
      &chain_len,
      |b, &len| {
        let x = Node::new(black_box(0.3));
        let result = build_chain(&x, len);
        b.iter(|| {
          let deltas = result.reverse();
          black_box(deltas[&x])
        });
      },
    );
  }
  group.finish();
}

fn backward_traversal(c: &mut Criterion) {
  let mut group = c.benchmark_group("backward_traversal");

  let x = Node::new(0.3);
  let result = build_chain(&x, 500);
  for traversal in [Traversal::Topological, Traversal::Worklist] {
    group.bench_with_input(
      BenchmarkId::from_parameter(format!("{:?}", traversal)),
      &traversal,
      |b, &traversal| {
        b.iter(|| {
          let deltas = result.reverse_with(traversal);
          black_box(deltas[&x])
        });
      },
    );
  }
  group.finish();
}

fn wide_sum(c: &mut Criterion) {
  let mut group = c.benchmark_group("wide_sum");

  for width in [10, 100, 1000] {
    group.throughput(Throughput::Elements(width as u64));
    group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
      let leaves: Vec<Node> = (0..width).map(|i| Node::new(i as f64 * 0.01)).collect();
      b.iter(|| {
        let mut sum = leaves[0].sin();
        for leaf in &leaves[1..] {
          sum = sum + leaf.tan() * leaf;
        }
        let deltas = sum.reverse();
        black_box(deltas.len())
      });
    });
  }
  group.finish();
}

criterion_group!(
  name = benches;
  config = Criterion::default().measurement_time(Duration::from_secs(10));
  targets =
    forward_chain,
    backward_chain,
    backward_traversal,
    wide_sum,
);

criterion_main!(benches);
