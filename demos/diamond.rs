use auto_node::{Node, Traversal};

/// z = cos(u) + u with u = sin(x): u reaches z directly and through cos(u)
fn main() {
  env_logger::init();

  let x = Node::with_gradient(0.7, 1.0);
  let u = x.sin();
  let z = u.cos() + &u;

  println!("{:?}", z);
  println!("forward:              dz/dx = {}", z.forward());
  for traversal in [Traversal::Topological, Traversal::Worklist] {
    let dz = z.reverse_with(traversal);
    println!("{:<21} dz/dx = {}", format!("{:?}:", traversal), dz[&x]);
  }

  if let Err(err) = (&z / &Node::new(0.0)).check_finite() {
    println!("dividing by zero: {}", err);
  }
}
