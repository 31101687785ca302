use log::info;

use auto_node::Node;

fn main() {
  env_logger::init();

  // x is the variable of differentiation for forward mode, y is left unseeded
  let x = Node::with_gradient(2.0, 1.0);
  let y = Node::new(5.0);
  let z = x.tan().cos().sin();

  // walk the graph behind z, visible with RUST_LOG=info
  z.log_lineage();

  let dz = z.reverse();
  info!("{:?}", dz);
  println!("z = {}", z);
  println!("Forward gradient wrt to x is: {}", z.forward());
  println!("Gradient wrt to x is: {}", dz[&x]);
  println!("Gradient wrt to y is {}", dz[&y]);
}
