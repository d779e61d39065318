//! Seams to the training framework. The evaluation core never builds models,
//! loads datasets or runs forward passes itself; a framework binding provides
//! these traits.

use std::path::Path;

use crate::error::{EvalError, Result};

/// Dense output of one forward pass, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub data: Vec<f64>,
    pub shape: Vec<usize>,
}

impl Tensor {
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Self {
        Self { data, shape }
    }

    /// A `[n]` tensor over `data`.
    pub fn vector(data: Vec<f64>) -> Self {
        let n = data.len();
        Self {
            data,
            shape: vec![n],
        }
    }

    /// Reduces `[B]`, `[B, 1]` or any shape to its element sequence.
    pub fn flatten(self) -> Result<Vec<f64>> {
        let numel: usize = self.shape.iter().product();
        if numel != self.data.len() {
            return Err(EvalError::shape(
                format!("tensor of shape {:?}", self.shape),
                numel,
                self.data.len(),
            ));
        }
        Ok(self.data)
    }
}

/// Model output with or without a per-sample weight channel.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutput {
    Scored(Tensor),
    ScoredWeighted(Tensor, Tensor),
}

impl InferenceOutput {
    /// Flattens both channels. A missing weight channel yields weight 1.0 for
    /// every sample.
    pub fn resolve(self) -> Result<(Vec<f64>, Vec<f64>)> {
        match self {
            InferenceOutput::Scored(y) => {
                let y = y.flatten()?;
                tracing::debug!("no weight channel; using unit weights for {} samples", y.len());
                let w = vec![1.0; y.len()];
                Ok((y, w))
            }
            InferenceOutput::ScoredWeighted(y, w) => Ok((y.flatten()?, w.flatten()?)),
        }
    }
}

/// One batch as yielded by the dataset. `input` is opaque to this crate.
#[derive(Debug, Clone)]
pub struct Batch<I> {
    pub entity_ids: Vec<String>,
    pub frames: Vec<f64>,
    pub targets: Vec<f64>,
    pub input: I,
}

pub type BatchIter<'a, I> = Box<dyn Iterator<Item = Result<Batch<I>>> + 'a>;

pub trait Model<I> {
    /// Loads weights from `path` and moves the model to its execution device.
    fn load_checkpoint(&mut self, path: &Path) -> Result<()>;

    fn infer(&mut self, input: &I) -> Result<InferenceOutput>;
}

pub trait Dataset {
    type Input;

    /// Opens a non-shuffled pass over `split`.
    fn open(&mut self, split: &str) -> Result<BatchIter<'_, Self::Input>>;
}

/// Accelerator scratch memory released after every batch.
pub trait ScratchMemory {
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoScratch;

impl ScratchMemory for NoScratch {
    fn release(&mut self) {}
}

#[cfg(test)]
#[path = "../../tests/src_inline/inference/tests.rs"]
mod tests;
