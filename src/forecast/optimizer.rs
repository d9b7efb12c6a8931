//! Bounded Nelder-Mead simplex search used to pick smoothing parameters.

use std::cmp::Ordering;

/// Per-dimension box constraints.
#[derive(Debug, Clone)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    fn clamp(&self, point: &mut [f64]) {
        for (i, v) in point.iter_mut().enumerate() {
            *v = v.clamp(self.lower[i], self.upper[i]);
        }
    }
}

fn by_value(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Minimizes `f` inside `bounds`, starting from `initial`.
///
/// Deterministic: the same objective, start and bounds always walk the same
/// simplex. Stops after `max_iter` iterations or once the simplex diameter
/// drops below `tol`.
///
/// # Returns
///
/// The best vertex found.
pub fn minimize<F>(f: F, initial: &[f64], bounds: &Bounds, max_iter: usize, tol: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let dim = initial.len();
    if dim == 0 {
        return Vec::new();
    }
    let n = dim + 1;

    let mut start = initial.to_vec();
    bounds.clamp(&mut start);

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n);
    simplex.push(start.clone());
    for i in 0..dim {
        let mut vertex = start.clone();
        let step = (bounds.upper[i] - bounds.lower[i]) * 0.1;
        vertex[i] = (vertex[i] + step).min(bounds.upper[i]);
        if (vertex[i] - start[i]).abs() < 1e-12 {
            vertex[i] = (vertex[i] - step).max(bounds.lower[i]);
        }
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

    for _ in 0..max_iter {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| by_value(&values[a], &values[b]));

        let best = order[0];
        let worst = order[n - 1];
        let second_worst = order[n - 2];

        let diameter = simplex[best]
            .iter()
            .zip(&simplex[worst])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0_f64, f64::max);
        if diameter < tol {
            return simplex[best].clone();
        }

        let mut centroid = vec![0.0; dim];
        for &idx in &order[..n - 1] {
            for (c, v) in centroid.iter_mut().zip(&simplex[idx]) {
                *c += v;
            }
        }
        for c in &mut centroid {
            *c /= (n - 1) as f64;
        }

        let toward = |from: &[f64], scale: f64| -> Vec<f64> {
            let mut p: Vec<f64> = centroid
                .iter()
                .zip(from)
                .map(|(&c, &x)| c + scale * (x - c))
                .collect();
            bounds.clamp(&mut p);
            p
        };

        let reflected = toward(&simplex[worst], -1.0);
        let f_reflected = f(&reflected);

        if f_reflected < values[best] {
            let expanded = toward(&simplex[worst], -2.0);
            let f_expanded = f(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        // Contract toward whichever of reflected/worst is better.
        let (from, f_from) = if f_reflected < values[worst] {
            (reflected, f_reflected)
        } else {
            (simplex[worst].clone(), values[worst])
        };
        let contracted = toward(&from, 0.5);
        let f_contracted = f(&contracted);
        if f_contracted < f_from {
            simplex[worst] = contracted;
            values[worst] = f_contracted;
            continue;
        }

        // Shrink toward the best vertex.
        let anchor = simplex[best].clone();
        for &idx in &order[1..] {
            for (v, a) in simplex[idx].iter_mut().zip(&anchor) {
                *v = 0.5 * (*v + a);
            }
            bounds.clamp(&mut simplex[idx]);
            values[idx] = f(&simplex[idx]);
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| by_value(a, b))
        .map_or(0, |(i, _)| i);
    simplex[best].clone()
}
