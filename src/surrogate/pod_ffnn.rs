//! POD-encoded feedforward surrogate.
//!
//! Solutions are compressed to a handful of POD coefficients (the
//! encoder/decoder pair), and a one-hidden-layer tanh network (the feedforward
//! head) learns the map from normalized parameters to normalized coefficients
//! by mini-batch gradient descent. Predictions decode back through the basis.

use crate::error::Pod2gError;
use crate::reduction::pod_basis;
use crate::surrogate::Surrogate;
use faer::{Mat, MatRef};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Builder-style configuration, consumed once at construction.
#[derive(Clone, Debug)]
pub struct PodFfnnSurrogateBuilder {
    /// Latent size of the encoder (retained POD components).
    pub num_components: usize,
    pub hidden_size: usize,
    pub learning_rate: f64,
    pub num_epochs: usize,
    pub batch_size: usize,
    /// Minimum fraction of samples held out as a contiguous test set.
    pub min_test_split: f64,
    /// Seed for weight initialization; training is fully deterministic.
    pub seed: u64,
}

impl Default for PodFfnnSurrogateBuilder {
    fn default() -> Self {
        Self {
            num_components: 8,
            hidden_size: 64,
            learning_rate: 1e-3,
            num_epochs: 300,
            batch_size: 20,
            min_test_split: 0.2,
            seed: 0,
        }
    }
}

impl PodFfnnSurrogateBuilder {
    pub fn build(self) -> PodFfnnSurrogate {
        PodFfnnSurrogate { config: self, trained: None }
    }
}

struct Normalization {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl Normalization {
    fn fit(rows: &[Vec<f64>]) -> Self {
        let dim = rows[0].len();
        let n = rows.len() as f64;
        let mut mean = vec![0.0; dim];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut std = vec![0.0; dim];
        for row in rows {
            for ((s, v), m) in std.iter_mut().zip(row).zip(&mean) {
                *s += (v - m) * (v - m) / n;
            }
        }
        for s in &mut std {
            *s = s.sqrt();
            if *s < 1e-12 {
                *s = 1.0;
            }
        }
        Self { mean, std }
    }

    fn apply(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    fn invert(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(v, (m, s))| v * s + m)
            .collect()
    }
}

struct TrainedState {
    basis: Mat<f64>, // n_dofs x k
    param_norm: Normalization,
    latent_norm: Normalization,
    w1: Vec<Vec<f64>>, // hidden x n_params
    b1: Vec<f64>,
    w2: Vec<Vec<f64>>, // k x hidden
    b2: Vec<f64>,
    num_parameters: usize,
}

impl TrainedState {
    fn forward(&self, u: &[f64]) -> Vec<f64> {
        let h: Vec<f64> = self
            .w1
            .iter()
            .zip(&self.b1)
            .map(|(row, b)| (row.iter().zip(u).map(|(w, x)| w * x).sum::<f64>() + b).tanh())
            .collect();
        self.w2
            .iter()
            .zip(&self.b2)
            .map(|(row, b)| row.iter().zip(&h).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

/// Predict-only after a single training pass; see [`Surrogate`].
pub struct PodFfnnSurrogate {
    config: PodFfnnSurrogateBuilder,
    trained: Option<TrainedState>,
}

impl PodFfnnSurrogate {
    pub fn is_trained(&self) -> bool {
        self.trained.is_some()
    }
}

impl Surrogate for PodFfnnSurrogate {
    fn train_and_evaluate(
        &mut self,
        parameters: MatRef<'_, f64>,
        solutions: MatRef<'_, f64>,
    ) -> Result<f64, Pod2gError> {
        if self.trained.is_some() {
            return Err(Pod2gError::PreconditionViolation(
                "surrogate training is a one-time operation",
            ));
        }
        let samples = parameters.nrows();
        if samples == 0 || solutions.nrows() != samples {
            return Err(Pod2gError::InconsistentTrainingData(format!(
                "{} parameter rows vs {} solution rows",
                samples,
                solutions.nrows()
            )));
        }
        let n_params = parameters.ncols();
        let n_dofs = solutions.ncols();

        // contiguous split: leading rows train, trailing rows evaluate
        let n_test = if samples >= 5 {
            ((samples as f64 * self.config.min_test_split).ceil() as usize).min(samples - 1)
        } else {
            0
        };
        let n_train = samples - n_test;

        // encoder: POD basis of the training solutions (snapshots as columns)
        let snapshots = Mat::from_fn(n_dofs, n_train, |i, j| solutions[(j, i)]);
        let basis = pod_basis(snapshots.as_ref(), self.config.num_components, true)?;
        let k = basis.ncols();

        let encode = |s: usize| -> Vec<f64> {
            (0..k)
                .map(|c| (0..n_dofs).map(|i| basis[(i, c)] * solutions[(s, i)]).sum())
                .collect()
        };
        let params_row =
            |s: usize| -> Vec<f64> { (0..n_params).map(|j| parameters[(s, j)]).collect() };

        let train_params: Vec<Vec<f64>> = (0..n_train).map(params_row).collect();
        let train_latent: Vec<Vec<f64>> = (0..n_train).map(encode).collect();
        let param_norm = Normalization::fit(&train_params);
        let latent_norm = Normalization::fit(&train_latent);
        let inputs: Vec<Vec<f64>> = train_params.iter().map(|p| param_norm.apply(p)).collect();
        let targets: Vec<Vec<f64>> = train_latent.iter().map(|c| latent_norm.apply(c)).collect();

        // one-hidden-layer tanh head, deterministic init
        let hidden = self.config.hidden_size.max(1);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut init = |rows: usize, cols: usize| -> Vec<Vec<f64>> {
            let scale = (6.0 / (rows + cols) as f64).sqrt();
            (0..rows)
                .map(|_| (0..cols).map(|_| scale * (2.0 * rng.r#gen::<f64>() - 1.0)).collect())
                .collect()
        };
        let mut w1 = init(hidden, n_params);
        let mut w2 = init(k, hidden);
        let mut b1 = vec![0.0; hidden];
        let mut b2 = vec![0.0; k];

        let batch = self.config.batch_size.max(1).min(n_train);
        let lr = self.config.learning_rate;
        for _epoch in 0..self.config.num_epochs {
            for start in (0..n_train).step_by(batch) {
                let end = (start + batch).min(n_train);
                let scale = lr / (end - start) as f64;
                let mut gw1 = vec![vec![0.0; n_params]; hidden];
                let mut gb1 = vec![0.0; hidden];
                let mut gw2 = vec![vec![0.0; hidden]; k];
                let mut gb2 = vec![0.0; k];
                for s in start..end {
                    let u = &inputs[s];
                    let h: Vec<f64> = w1
                        .iter()
                        .zip(&b1)
                        .map(|(row, b)| {
                            (row.iter().zip(u).map(|(w, x)| w * x).sum::<f64>() + b).tanh()
                        })
                        .collect();
                    let out: Vec<f64> = w2
                        .iter()
                        .zip(&b2)
                        .map(|(row, b)| row.iter().zip(&h).map(|(w, x)| w * x).sum::<f64>() + b)
                        .collect();
                    let err: Vec<f64> =
                        out.iter().zip(&targets[s]).map(|(o, t)| o - t).collect();
                    for (c, e) in err.iter().enumerate() {
                        gb2[c] += e;
                        for (j, hj) in h.iter().enumerate() {
                            gw2[c][j] += e * hj;
                        }
                    }
                    for j in 0..hidden {
                        let back: f64 = err.iter().enumerate().map(|(c, e)| e * w2[c][j]).sum();
                        let dh = back * (1.0 - h[j] * h[j]);
                        gb1[j] += dh;
                        for (i, ui) in u.iter().enumerate() {
                            gw1[j][i] += dh * ui;
                        }
                    }
                }
                for j in 0..hidden {
                    b1[j] -= scale * gb1[j];
                    for i in 0..n_params {
                        w1[j][i] -= scale * gw1[j][i];
                    }
                }
                for c in 0..k {
                    b2[c] -= scale * gb2[c];
                    for j in 0..hidden {
                        w2[c][j] -= scale * gw2[c][j];
                    }
                }
            }
        }

        let state = TrainedState {
            basis,
            param_norm,
            latent_norm,
            w1,
            b1,
            w2,
            b2,
            num_parameters: n_params,
        };

        // held-out reconstruction loss in solution space
        let eval_range = if n_test > 0 { n_train..samples } else { 0..n_train };
        let mut loss = 0.0;
        let mut count = 0usize;
        for s in eval_range {
            let u = state.param_norm.apply(&params_row(s));
            let coeffs = state.latent_norm.invert(&state.forward(&u));
            for i in 0..n_dofs {
                let rec: f64 = (0..state.basis.ncols())
                    .map(|c| state.basis[(i, c)] * coeffs[c])
                    .sum();
                let d = rec - solutions[(s, i)];
                loss += d * d;
                count += 1;
            }
        }
        let loss = loss / count.max(1) as f64;
        log::info!(
            "surrogate trained on {n_train} samples ({n_test} held out), latent size {k}, eval mse {loss:.3e}"
        );
        self.trained = Some(state);
        Ok(loss)
    }

    fn predict(&self, parameters: &[f64]) -> Result<Vec<f64>, Pod2gError> {
        let state = self.trained.as_ref().ok_or(Pod2gError::PreconditionViolation(
            "surrogate prediction requested before training",
        ))?;
        if parameters.len() != state.num_parameters {
            return Err(Pod2gError::InvalidInput(format!(
                "parameter vector has length {}, surrogate was trained on {}",
                parameters.len(),
                state.num_parameters
            )));
        }
        let u = state.param_norm.apply(parameters);
        let coeffs = state.latent_norm.invert(&state.forward(&u));
        let n_dofs = state.basis.nrows();
        Ok((0..n_dofs)
            .map(|i| (0..state.basis.ncols()).map(|c| state.basis[(i, c)] * coeffs[c]).sum())
            .collect())
    }
}
