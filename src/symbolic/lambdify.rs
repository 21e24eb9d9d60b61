use ndarray as nd;
use rayon::prelude::*;

use super::expr::Expr;
use crate::error::{SpectralError, SpectralResult};
use crate::spectral::{LocalMesh, PhysicalField};

/// Expression tree with variables resolved to argument positions.
#[derive(Clone, Debug)]
enum Node {
    Const(f64),
    Arg(usize),
    Add(Box<Node>, Box<Node>),
    Mul(Box<Node>, Box<Node>),
    Neg(Box<Node>),
    Pow(Box<Node>, i32),
    Sin(Box<Node>),
    Cos(Box<Node>),
}

impl Node {
    fn compile(expr: &Expr, args: &[&str]) -> SpectralResult<Node> {
        let node = match expr {
            Expr::Const(v) => Node::Const(*v),
            Expr::Var(name) => {
                let pos = args
                    .iter()
                    .position(|a| *a == name.as_str())
                    .ok_or_else(|| SpectralError::UnboundSymbol(name.clone()))?;
                Node::Arg(pos)
            }
            Expr::Add(l, r) => Node::Add(
                Box::new(Node::compile(l, args)?),
                Box::new(Node::compile(r, args)?),
            ),
            Expr::Mul(l, r) => Node::Mul(
                Box::new(Node::compile(l, args)?),
                Box::new(Node::compile(r, args)?),
            ),
            Expr::Neg(e) => Node::Neg(Box::new(Node::compile(e, args)?)),
            Expr::Pow(e, n) => Node::Pow(Box::new(Node::compile(e, args)?), *n),
            Expr::Sin(e) => Node::Sin(Box::new(Node::compile(e, args)?)),
            Expr::Cos(e) => Node::Cos(Box::new(Node::compile(e, args)?)),
        };
        Ok(node)
    }

    fn eval(&self, values: &[f64]) -> f64 {
        match self {
            Node::Const(v) => *v,
            Node::Arg(i) => values[*i],
            Node::Add(l, r) => l.eval(values) + r.eval(values),
            Node::Mul(l, r) => l.eval(values) * r.eval(values),
            Node::Neg(e) => -e.eval(values),
            Node::Pow(e, n) => e.eval(values).powi(*n),
            Node::Sin(e) => e.eval(values).sin(),
            Node::Cos(e) => e.eval(values).cos(),
        }
    }
}

/// Numeric evaluator compiled from an [`Expr`] with a fixed argument order.
#[derive(Clone, Debug)]
pub struct Lambda {
    args: Vec<String>,
    root: Node,
}

impl Expr {
    /// Compiles the expression into a [`Lambda`] taking `args` positionally.
    ///
    /// Fails with [`SpectralError::UnboundSymbol`] when the expression uses a
    /// variable that is not listed in `args`.
    pub fn lambdify(&self, args: &[&str]) -> SpectralResult<Lambda> {
        Ok(Lambda {
            args: args.iter().map(|a| a.to_string()).collect(),
            root: Node::compile(self, args)?,
        })
    }
}

impl Lambda {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Evaluates at a single argument tuple.
    pub fn call(&self, values: &[f64]) -> SpectralResult<f64> {
        if values.len() != self.arity() {
            return Err(SpectralError::Arity {
                expected: self.arity(),
                actual: values.len(),
            });
        }
        Ok(self.root.eval(values))
    }

    fn call3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.root.eval(&[x, y, z])
    }

    fn ensure_arity(&self, expected: usize) -> SpectralResult<()> {
        if self.arity() != expected {
            return Err(SpectralError::Arity {
                expected,
                actual: self.arity(),
            });
        }
        Ok(())
    }

    /// Evaluates on every point of a tensor-product mesh.
    ///
    /// The result has the mesh shape `(N0, N1, N2)`.
    pub fn on_mesh(&self, mesh: &LocalMesh) -> SpectralResult<PhysicalField> {
        self.ensure_arity(3)?;
        let [nx, ny, nz] = mesh.shape();
        let (x, y, z) = (&mesh.x, &mesh.y, &mesh.z);
        let values: Vec<f64> = (0..nx * ny * nz)
            .into_par_iter()
            .map(|idx| {
                let i = idx / (ny * nz);
                let j = (idx / nz) % ny;
                let k = idx % nz;
                self.call3(x[i], y[j], z[k])
            })
            .collect();
        Ok(nd::Array3::from_shape_vec((nx, ny, nz), values)?)
    }

    /// Evaluates at scattered points stored column-wise in a `(3, n)` array.
    pub fn at_points(&self, points: nd::ArrayView2<f64>) -> SpectralResult<nd::Array1<f64>> {
        self.ensure_arity(3)?;
        if points.nrows() != 3 {
            return Err(SpectralError::InvalidPoints(points.shape().to_vec()));
        }
        Ok(points
            .columns()
            .into_iter()
            .map(|p| self.call3(p[0], p[1], p[2]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambdify_evaluates_in_argument_order() {
        let vars = Expr::symbols("x, y");
        let e = 2.0 * vars[0].clone() * vars[1].clone().sin();
        let f = e.lambdify(&["y", "x"]).unwrap();
        let got = f.call(&[0.5, 3.0]).unwrap();
        assert!((got - 6.0 * 0.5_f64.sin()).abs() < 1e-15);
    }

    #[test]
    fn test_lambdify_unbound_symbol() {
        let e = Expr::var("x") + Expr::var("w");
        match e.lambdify(&["x", "y", "z"]) {
            Err(SpectralError::UnboundSymbol(name)) => assert_eq!(name, "w"),
            other => panic!("expected UnboundSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_call_checks_arity() {
        let f = Expr::var("x").lambdify(&["x", "y"]).unwrap();
        assert!(matches!(
            f.call(&[1.0]),
            Err(SpectralError::Arity {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_on_mesh_matches_pointwise_calls() {
        let vars = Expr::symbols("x, y, z");
        let e = vars[0].clone() + 10.0 * vars[1].clone() + 100.0 * vars[2].clone();
        let f = e.lambdify(&["x", "y", "z"]).unwrap();
        let mesh = LocalMesh {
            x: nd::arr1(&[0.0, 1.0]),
            y: nd::arr1(&[0.0, 1.0, 2.0]),
            z: nd::arr1(&[0.5, 1.5, 2.5, 3.5]),
        };
        let values = f.on_mesh(&mesh).unwrap();
        assert_eq!(values.shape(), &[2, 3, 4]);
        for ((i, j, k), v) in values.indexed_iter() {
            let expected = mesh.x[i] + 10.0 * mesh.y[j] + 100.0 * mesh.z[k];
            assert!((v - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_at_points_uses_column_convention() {
        let vars = Expr::symbols("x, y, z");
        let e = vars[0].clone() * vars[1].clone() * vars[2].clone();
        let f = e.lambdify(&["x", "y", "z"]).unwrap();
        let points = nd::arr2(&[[0.2, 0.3], [0.1, 0.5], [0.3, 0.6]]);
        let values = f.at_points(points.view()).unwrap();
        assert!((values[0] - 0.2 * 0.1 * 0.3).abs() < 1e-15);
        assert!((values[1] - 0.3 * 0.5 * 0.6).abs() < 1e-15);

        let bad = nd::Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            f.at_points(bad.view()),
            Err(SpectralError::InvalidPoints(_))
        ));
    }
}
