//! Backward pass over the recorded op graph

use crate::autograd::Tensor;
use ndarray::Array1;
use std::collections::HashSet;
use std::rc::Rc;

/// A node of the computational graph
///
/// `backward` reads the gradient of the node's output and adds the
/// corresponding gradients into its inputs. It must not recurse: ordering
/// is handled by [`backward`], which runs every node exactly once after all
/// of its consumers.
pub trait BackwardOp {
    /// Propagate the output gradient into the inputs
    fn backward(&self);

    /// Backward ops of inputs that were themselves produced by an op
    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>>;
}

fn node_key(op: &Rc<dyn BackwardOp>) -> *const () {
    Rc::as_ptr(op) as *const ()
}

/// Nodes reachable from `root`, inputs before consumers
fn post_order(root: Rc<dyn BackwardOp>) -> Vec<Rc<dyn BackwardOp>> {
    let mut visited: HashSet<*const ()> = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<(Rc<dyn BackwardOp>, bool)> = vec![(root, false)];

    while let Some((op, expanded)) = stack.pop() {
        if expanded {
            order.push(op);
            continue;
        }
        if !visited.insert(node_key(&op)) {
            continue;
        }
        let inputs = op.inputs();
        stack.push((op, true));
        for input in inputs {
            if !visited.contains(&node_key(&input)) {
                stack.push((input, false));
            }
        }
    }

    order
}

/// Perform backward pass from `tensor`
///
/// Seeds the output gradient with `grad_output`, or with ones for a scalar
/// loss, then runs every reachable op once in reverse topological order.
pub fn backward(tensor: &Tensor, grad_output: Option<Array1<f32>>) {
    match grad_output {
        Some(grad) => tensor.set_grad(grad),
        None => tensor.set_grad(Array1::ones(tensor.len())),
    }

    if let Some(root) = tensor.backward_op() {
        for op in post_order(root).iter().rev() {
            op.backward();
        }
    }
}
