//! ONNX graph loading and execution on top of `tract-onnx`.

use std::{fmt::Write, path::Path};

use anyhow::{Context, Result};
use log::{debug, warn};
use tract_onnx::prelude::{
    DatumExt, Framework, Graph, InferenceFact, InferenceModelExt, IntoTensor, SimplePlan, Tensor,
    TypedFact, TypedOp,
};

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A runnable ONNX graph plus a human readable label used in log and error messages.
#[derive(Debug)]
pub struct OnnxModel {
    label: String,
    runnable: RunnableModel,
}

impl OnnxModel {
    /// Parse and optimize the graph at `path`.
    ///
    /// `input_shapes` pins the shape of the leading inputs (in graph order); pass an empty slice
    /// to keep the shapes declared by the file. When optimization fails the decluttered graph is
    /// used instead.
    pub fn load<P: AsRef<Path>>(path: P, label: &str, input_shapes: &[&[usize]]) -> Result<Self> {
        let path = path.as_ref();
        anyhow::ensure!(path.exists(), "model file not found: {}", path.display());

        let runnable = match load_runnable(path, label, input_shapes, true) {
            Ok(model) => {
                debug!("{label} model {} optimized successfully", path.display());
                model
            }
            Err(opt_err) => {
                let optimize_msg = format!("{opt_err}");
                let mut chain_msg = String::new();
                for cause in opt_err.chain() {
                    let _ = writeln!(&mut chain_msg, "  - {cause}");
                }
                warn!(
                    "{label} model {} failed optimized load ({optimize_msg}); falling back to decluttered graph.\nError chain:\n{}",
                    path.display(),
                    chain_msg.trim_end()
                );
                load_runnable(path, label, input_shapes, false).with_context(|| {
                    format!(
                        "fallback to decluttered {label} graph failed after optimize error: {optimize_msg}"
                    )
                })?
            }
        };

        Ok(Self {
            label: label.to_string(),
            runnable,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Names of the graph inputs in the order `run` expects them.
    pub fn input_names(&self) -> Vec<String> {
        let model = self.runnable.model();
        model
            .input_outlets()
            .map(|outlets| {
                outlets
                    .iter()
                    .map(|outlet| model.node(outlet.node).name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Execute the graph and return every output as an owned tensor.
    pub fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>> {
        let outputs = self
            .runnable
            .run(inputs.into_iter().map(|t| t.into()).collect())
            .map_err(|e| anyhow::anyhow!("{} execution failed: {e}", self.label))?;
        anyhow::ensure!(!outputs.is_empty(), "{} model produced no outputs", self.label);
        Ok(outputs.into_iter().map(|value| value.into_tensor()).collect())
    }

    /// Execute a single-input graph and return its first output.
    pub fn run_single(&self, input: Tensor) -> Result<Tensor> {
        let mut outputs = self.run(vec![input])?;
        Ok(outputs.swap_remove(0))
    }
}

fn load_runnable(
    path: &Path,
    label: &str,
    input_shapes: &[&[usize]],
    optimized: bool,
) -> Result<RunnableModel> {
    let mut model = tract_onnx::onnx()
        .model_for_path(path)
        .with_context(|| format!("failed to parse ONNX graph from {}", path.display()))?;

    for (index, shape) in input_shapes.iter().enumerate() {
        let fact: InferenceFact = f32::fact(shape.to_vec()).into();
        model = model
            .with_input_fact(index, fact)
            .map_err(|e| anyhow::anyhow!("unable to pin {label} input {index} to {shape:?}: {e}"))?;
    }

    if optimized {
        model
            .into_optimized()
            .map_err(|e| anyhow::anyhow!("unable to optimize {label} graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make {label} graph runnable: {e}"))
    } else {
        model
            .into_typed()
            .map_err(|e| anyhow::anyhow!("unable to type-check {label} graph: {e}"))?
            .into_decluttered()
            .map_err(|e| anyhow::anyhow!("unable to declutter {label} graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make {label} graph runnable: {e}"))
    }
}

/// Build an `f32` tensor from a contiguous ndarray.
pub(crate) fn tensor_from_array<D: ndarray::Dimension>(array: ndarray::Array<f32, D>) -> Result<Tensor> {
    let shape = array.shape().to_vec();
    let data: Vec<f32> = if array.is_standard_layout() {
        let (data, _) = array.into_raw_vec_and_offset();
        data
    } else {
        array.iter().copied().collect()
    };
    Tensor::from_shape(&shape, &data).map_err(|e| anyhow::anyhow!("failed to build tensor: {e}"))
}
