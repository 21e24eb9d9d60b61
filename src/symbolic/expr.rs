use std::fmt;

/// Symbolic expression over named real variables.
///
/// Trees are built through the smart constructors ([`Expr::sum`],
/// [`Expr::product`], ...) and the operator impls, which fold constants and drop
/// additive zeros and multiplicative ones. This keeps repeated
/// differentiation from blowing up the tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(f64),
    Var(String),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Pow(Box<Expr>, i32),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Neg(expr) => write!(f, "-{}", expr),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Sin(expr) => write!(f, "sin({})", expr),
            Expr::Cos(expr) => write!(f, "cos({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::sum(self, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::sum(self, Expr::negate(rhs))
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::product(self, rhs)
    }
}

impl std::ops::Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        Expr::product(Expr::Const(self), rhs)
    }
}

impl std::ops::Sub<Expr> for f64 {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Self::Output {
        Expr::Const(self) - rhs
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::negate(self)
    }
}

impl Expr {
    /// Creates variables from a comma separated list, e.g. `"x, y, z"`.
    pub fn symbols(names: &str) -> Vec<Expr> {
        names
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(v) if *v == 0.0)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(v) if *v == 1.0)
    }

    pub fn sum(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
            (l, r) if l.is_zero() => r,
            (l, r) if r.is_zero() => l,
            (l, r) => Expr::Add(Box::new(l), Box::new(r)),
        }
    }

    pub fn product(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
            (l, r) if l.is_zero() || r.is_zero() => Expr::Const(0.0),
            (l, r) if l.is_one() => r,
            (l, r) if r.is_one() => l,
            // Keep constants on the left so nested scalings fold.
            (Expr::Const(a), Expr::Mul(inner_l, inner_r)) => match *inner_l {
                Expr::Const(b) => Expr::product(Expr::Const(a * b), *inner_r),
                inner_l => Expr::Mul(
                    Box::new(Expr::Const(a)),
                    Box::new(Expr::Mul(Box::new(inner_l), inner_r)),
                ),
            },
            (l, Expr::Const(b)) => Expr::product(Expr::Const(b), l),
            (l, r) => Expr::Mul(Box::new(l), Box::new(r)),
        }
    }

    pub fn negate(expr: Expr) -> Expr {
        match expr {
            Expr::Const(a) => Expr::Const(-a),
            Expr::Neg(inner) => *inner,
            Expr::Mul(l, r) => match *l {
                Expr::Const(a) => Expr::product(Expr::Const(-a), *r),
                l => Expr::Neg(Box::new(Expr::Mul(Box::new(l), r))),
            },
            e => Expr::Neg(Box::new(e)),
        }
    }

    pub fn powi(self, exp: i32) -> Expr {
        match (self, exp) {
            (_, 0) => Expr::Const(1.0),
            (base, 1) => base,
            (Expr::Const(a), n) => Expr::Const(a.powi(n)),
            (base, n) => Expr::Pow(Box::new(base), n),
        }
    }

    pub fn sin(self) -> Expr {
        match self {
            Expr::Const(a) => Expr::Const(a.sin()),
            e => Expr::Sin(Box::new(e)),
        }
    }

    pub fn cos(self) -> Expr {
        match self {
            Expr::Const(a) => Expr::Const(a.cos()),
            e => Expr::Cos(Box::new(e)),
        }
    }

    /// Partial derivative with respect to `var`.
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Var(name) => Expr::Const(if name == var { 1.0 } else { 0.0 }),
            Expr::Add(lhs, rhs) => Expr::sum(lhs.diff(var), rhs.diff(var)),
            Expr::Mul(lhs, rhs) => Expr::sum(
                Expr::product(lhs.diff(var), (**rhs).clone()),
                Expr::product((**lhs).clone(), rhs.diff(var)),
            ),
            Expr::Neg(expr) => Expr::negate(expr.diff(var)),
            Expr::Pow(base, n) => Expr::product(
                Expr::product(Expr::Const(*n as f64), (**base).clone().powi(n - 1)),
                base.diff(var),
            ),
            Expr::Sin(expr) => Expr::product((**expr).clone().cos(), expr.diff(var)),
            Expr::Cos(expr) => Expr::negate(Expr::product((**expr).clone().sin(), expr.diff(var))),
        }
    }

    /// `n`-th partial derivative with respect to `var`.
    pub fn diff_n(&self, var: &str, n: usize) -> Expr {
        (0..n).fold(self.clone(), |acc, _| acc.diff(var))
    }

    /// Mixed partial derivative, e.g. `&[("x", 2), ("y", 2)]` for `∂²ₓ∂²ᵧ`.
    pub fn derivative(&self, orders: &[(&str, usize)]) -> Expr {
        orders
            .iter()
            .fold(self.clone(), |acc, (var, n)| acc.diff_n(var, *n))
    }

    /// Biharmonic operator `∇⁴` in Cartesian coordinates `vars`.
    ///
    /// Expanded as the sum of the pure fourth derivatives and twice the mixed
    /// `∂²∂²` derivatives of every axis pair.
    pub fn biharmonic(&self, vars: [&str; 3]) -> Expr {
        let [x, y, z] = vars;
        let mut out = self.diff_n(x, 4);
        out = out + self.diff_n(y, 4);
        out = out + self.diff_n(z, 4);
        out = out + 2.0 * self.derivative(&[(x, 2), (y, 2)]);
        out = out + 2.0 * self.derivative(&[(x, 2), (z, 2)]);
        out = out + 2.0 * self.derivative(&[(y, 2), (z, 2)]);
        out
    }

    /// Names of all variables in the expression, in first-seen order.
    pub fn free_symbols(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut Vec<String>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(name) => {
                if !out.iter().any(|n| n == name) {
                    out.push(name.clone());
                }
            }
            Expr::Add(lhs, rhs) | Expr::Mul(lhs, rhs) => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
            Expr::Neg(e) | Expr::Pow(e, _) | Expr::Sin(e) | Expr::Cos(e) => {
                e.collect_symbols(out)
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Const(_) | Expr::Var(_) => 1,
            Expr::Add(lhs, rhs) | Expr::Mul(lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
            Expr::Neg(e) | Expr::Pow(e, _) | Expr::Sin(e) | Expr::Cos(e) => 1 + e.node_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &Expr, x: f64, y: f64) -> f64 {
        match expr {
            Expr::Const(v) => *v,
            Expr::Var(name) if name == "x" => x,
            Expr::Var(name) if name == "y" => y,
            Expr::Var(name) => panic!("unexpected variable {name}"),
            Expr::Add(l, r) => eval(l, x, y) + eval(r, x, y),
            Expr::Mul(l, r) => eval(l, x, y) * eval(r, x, y),
            Expr::Neg(e) => -eval(e, x, y),
            Expr::Pow(e, n) => eval(e, x, y).powi(*n),
            Expr::Sin(e) => eval(e, x, y).sin(),
            Expr::Cos(e) => eval(e, x, y).cos(),
        }
    }

    #[test]
    fn test_symbols() {
        let vars = Expr::symbols("x, y,z,");
        assert_eq!(vars, vec![Expr::var("x"), Expr::var("y"), Expr::var("z")]);
    }

    #[test]
    fn test_constant_folding() {
        let x = Expr::var("x");
        assert_eq!(Expr::Const(2.0) * Expr::Const(3.0), Expr::Const(6.0));
        assert_eq!(x.clone() * Expr::Const(1.0), x);
        assert_eq!(x.clone() + Expr::Const(0.0), x);
        assert!((x.clone() * Expr::Const(0.0)).is_zero());
        assert_eq!(-(-x.clone()), x);
        assert_eq!(2.0 * (3.0 * x.clone()), 6.0 * x);
    }

    #[test]
    fn test_diff_sin_chain_rule() {
        let x = Expr::var("x");
        let e = (2.0 * x).sin();
        let d = e.diff("x");
        for &xv in &[0.0_f64, 0.3, -0.7] {
            let expected = 2.0 * (2.0 * xv).cos();
            assert!((eval(&d, xv, 0.0) - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn test_diff_polynomial() {
        let x = Expr::var("x");
        // d^4/dx^4 of (1 - x^2) x^4 = 24 - 360 x^2
        let e = (1.0 - x.clone().powi(2)) * x.powi(4);
        let d4 = e.diff_n("x", 4);
        for &xv in &[0.0, 0.5, -1.0] {
            let expected = 24.0 - 360.0 * xv * xv;
            let got = eval(&d4, xv, 0.0);
            assert!((got - expected).abs() < 1e-10, "x={xv}: {got} vs {expected}");
        }
    }

    #[test]
    fn test_mixed_derivative() {
        let (x, y) = (Expr::var("x"), Expr::var("y"));
        // d^2/dx^2 d^2/dy^2 of sin(x) cos(2y) = 4 sin(x) cos(2y)
        let e = x.sin() * (2.0 * y).cos();
        let d = e.derivative(&[("x", 2), ("y", 2)]);
        let (xv, yv) = (0.4_f64, 1.1_f64);
        let expected = 4.0 * xv.sin() * (2.0 * yv).cos();
        assert!((eval(&d, xv, yv) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_of_other_variable_is_zero() {
        let (x, y) = (Expr::var("x"), Expr::var("y"));
        let e = x.sin() * y.cos();
        assert!(e.diff_n("z", 1).is_zero());
    }

    #[test]
    fn test_free_symbols() {
        let vars = Expr::symbols("x, y");
        let e = vars[1].clone().sin() * vars[0].clone() + vars[1].clone();
        assert_eq!(e.free_symbols(), vec!["y".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_display() {
        let x = Expr::var("x");
        assert_eq!(format!("{}", (2.0 * x).sin()), "sin((2 * x))");
    }
}
