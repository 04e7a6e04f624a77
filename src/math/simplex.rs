//! Nelder–Mead downhill simplex minimizer.
//!
//! We repeatedly minimize small (2-parameter) least-squares objectives whose
//! curvature varies by orders of magnitude between trials, so the method needs
//! to be derivative-free and robust to poles in the objective.
//!
//! Implementation choices:
//! - Standard coefficients: reflection 1, expansion 2, contraction 1/2,
//!   shrink 1/2.
//! - Non-finite objective values rank as `+inf`, so the simplex walks away
//!   from poles and overflow instead of failing.
//! - Termination needs both a small simplex (`x_tolerance`, relative to the
//!   best vertex) and a flat simplex (`f_tolerance`, absolute).
//! - A converged search can be restarted around its best vertex. This guards
//!   against the simplex collapsing onto a line away from the minimum.
//! - Running out of iterations is not an error: the best vertex is returned
//!   with `converged = false`.

use nalgebra::SVector;

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Knobs of the simplex search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOptions {
    /// Iteration cap summed over all restarts.
    pub max_iterations: usize,
    /// Simplex size tolerance, relative to `max(1, |best|_inf)`.
    pub x_tolerance: f64,
    /// Objective spread tolerance across vertices.
    pub f_tolerance: f64,
    /// Initial edge length as a fraction of each start coordinate.
    pub initial_step: f64,
    /// Initial edge length for start coordinates equal to zero.
    pub zero_step: f64,
    /// Extra searches launched from the best vertex after convergence.
    pub restarts: usize,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
            initial_step: 0.05,
            zero_step: 0.00025,
            restarts: 2,
        }
    }
}

/// Result of a simplex search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOutcome<const N: usize> {
    pub point: SVector<f64, N>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
struct Vertex<const N: usize> {
    x: SVector<f64, N>,
    f: f64,
}

/// Minimize `f` starting from `start`.
pub fn minimize<const N: usize, F>(f: F, start: SVector<f64, N>, opts: &SimplexOptions) -> SimplexOutcome<N>
where
    F: Fn(&SVector<f64, N>) -> f64,
{
    let eval = |x: &SVector<f64, N>| sanitize(f(x));

    let mut best = Vertex { x: start, f: eval(&start) };
    let mut iterations = 0usize;
    let mut converged = false;

    for round in 0..=opts.restarts {
        let budget = opts.max_iterations.saturating_sub(iterations);
        if budget == 0 {
            converged = false;
            break;
        }

        let (vertex, used, round_converged) = search(&eval, best.x, budget, opts);
        iterations += used;

        let improvement = best.f - vertex.f;
        if vertex.f <= best.f {
            best = vertex;
        }
        converged = round_converged;

        // Stop when a round runs out of budget or a restart no longer improves the optimum.
        if !round_converged || (round > 0 && improvement <= opts.f_tolerance) {
            break;
        }
    }

    SimplexOutcome {
        point: best.x,
        value: best.f,
        iterations,
        converged,
    }
}

fn search<const N: usize, E>(
    eval: &E,
    start: SVector<f64, N>,
    budget: usize,
    opts: &SimplexOptions,
) -> (Vertex<N>, usize, bool)
where
    E: Fn(&SVector<f64, N>) -> f64,
{
    let mut simplex = initial_simplex(eval, start, opts);
    sort(&mut simplex);

    let mut iterations = 0usize;
    while iterations < budget {
        if has_converged(&simplex, opts) {
            return (simplex[0], iterations, true);
        }
        iterations += 1;

        let worst = simplex[N];
        let centroid = simplex[..N]
            .iter()
            .fold(SVector::<f64, N>::zeros(), |acc, v| acc + v.x)
            / N as f64;

        let xr = centroid + (centroid - worst.x) * ALPHA;
        let fr = eval(&xr);

        if fr < simplex[0].f {
            let xe = centroid + (xr - centroid) * GAMMA;
            let fe = eval(&xe);
            simplex[N] = if fe < fr { Vertex { x: xe, f: fe } } else { Vertex { x: xr, f: fr } };
        } else if fr < simplex[N - 1].f {
            simplex[N] = Vertex { x: xr, f: fr };
        } else {
            let accepted = if fr < worst.f {
                let xc = centroid + (xr - centroid) * RHO;
                let fc = eval(&xc);
                (fc <= fr).then_some(Vertex { x: xc, f: fc })
            } else {
                let xcc = centroid + (worst.x - centroid) * RHO;
                let fcc = eval(&xcc);
                (fcc < worst.f).then_some(Vertex { x: xcc, f: fcc })
            };

            match accepted {
                Some(v) => simplex[N] = v,
                None => shrink(eval, &mut simplex),
            }
        }

        sort(&mut simplex);
    }

    let done = has_converged(&simplex, opts);
    (simplex[0], iterations, done)
}

fn initial_simplex<const N: usize, E>(eval: &E, start: SVector<f64, N>, opts: &SimplexOptions) -> Vec<Vertex<N>>
where
    E: Fn(&SVector<f64, N>) -> f64,
{
    let mut simplex = Vec::with_capacity(N + 1);
    simplex.push(Vertex { x: start, f: eval(&start) });
    for k in 0..N {
        let mut x = start;
        x[k] = if x[k] != 0.0 {
            x[k] * (1.0 + opts.initial_step)
        } else {
            opts.zero_step
        };
        simplex.push(Vertex { x, f: eval(&x) });
    }
    simplex
}

fn shrink<const N: usize, E>(eval: &E, simplex: &mut [Vertex<N>])
where
    E: Fn(&SVector<f64, N>) -> f64,
{
    let best = simplex[0].x;
    for v in simplex.iter_mut().skip(1) {
        v.x = best + (v.x - best) * SIGMA;
        v.f = eval(&v.x);
    }
}

fn has_converged<const N: usize>(simplex: &[Vertex<N>], opts: &SimplexOptions) -> bool {
    let best = &simplex[0];
    let scale = best.x.amax().max(1.0);
    let size = simplex[1..]
        .iter()
        .map(|v| (v.x - best.x).amax())
        .fold(0.0, f64::max);
    let spread = simplex[1..]
        .iter()
        .map(|v| (v.f - best.f).abs())
        .fold(0.0, f64::max);
    size <= opts.x_tolerance * scale && spread <= opts.f_tolerance
}

fn sort<const N: usize>(simplex: &mut [Vertex<N>]) {
    simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
}

fn sanitize(v: f64) -> f64 {
    if v.is_nan() { f64::INFINITY } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn minimizes_shifted_quadratic() {
        let f = |x: &Vector2<f64>| (x[0] - 3.0).powi(2) + 10.0 * (x[1] + 1.0).powi(2);
        let out = minimize(f, Vector2::new(0.0, 0.0), &SimplexOptions::default());
        assert!(out.converged);
        assert!((out.point[0] - 3.0).abs() < 1e-6, "{:?}", out.point);
        assert!((out.point[1] + 1.0).abs() < 1e-6, "{:?}", out.point);
    }

    #[test]
    fn minimizes_rosenbrock() {
        let f = |x: &Vector2<f64>| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let out = minimize(f, Vector2::new(-1.2, 1.0), &SimplexOptions::default());
        assert!(out.converged);
        assert!((out.point[0] - 1.0).abs() < 1e-5, "{:?}", out.point);
        assert!((out.point[1] - 1.0).abs() < 1e-5, "{:?}", out.point);
    }

    #[test]
    fn iteration_cap_returns_best_vertex_unconverged() {
        let f = |x: &Vector2<f64>| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let opts = SimplexOptions {
            max_iterations: 5,
            ..SimplexOptions::default()
        };
        let out = minimize(f, Vector2::new(-1.2, 1.0), &opts);
        assert!(!out.converged);
        assert_eq!(out.iterations, 5);
        assert!(out.value <= f(&Vector2::new(-1.2, 1.0)));
    }

    #[test]
    fn walks_away_from_nan_region() {
        // Undefined for x0 < 0; the search must stay in the valid half-plane.
        let f = |x: &Vector2<f64>| (x[0].sqrt() - 2.0).powi(2) + x[1] * x[1];
        let out = minimize(f, Vector2::new(1.0, 0.5), &SimplexOptions::default());
        assert!(out.value.is_finite());
        assert!((out.point[0] - 4.0).abs() < 1e-5, "{:?}", out.point);
    }

    #[test]
    fn deterministic_for_same_inputs() {
        let f = |x: &Vector2<f64>| (x[0] - 0.3).powi(2) + (x[1] * x[0] - 1.0).powi(2);
        let a = minimize(f, Vector2::new(1.0, 1.0), &SimplexOptions::default());
        let b = minimize(f, Vector2::new(1.0, 1.0), &SimplexOptions::default());
        assert_eq!(a, b);
    }
}
