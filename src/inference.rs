// src/inference.rs

use crate::landmarks::{Landmark, LandmarkFrame, NUM_LANDMARKS};
use crate::pipeline::LandmarkOracle;
use crate::preprocessing::{preprocess, Letterbox};
use crate::types::{ModelConfig, TensorLayout};
use anyhow::{ensure, Context, Result};
use ndarray::ArrayView2;
use opencv::{core::Mat, imgproc, prelude::*};
use ort::{
    execution_providers::CUDAExecutionProvider,
    session::{builder::GraphOptimizationLevel, Session},
};
use tracing::{debug, info};

/// Full-body landmark model (BlazePose layout: 33 joints, optionally
/// followed by auxiliary points, each as x, y, z, visibility[, presence]
/// in model-input pixels).
pub struct PoseEstimator {
    session: Session,
    config: ModelConfig,
    input_name: String,
}

impl PoseEstimator {
    pub fn new(config: ModelConfig) -> Result<Self> {
        info!("Initializing pose estimator");
        info!("Model path: {}", config.path);

        let mut session_builder = Session::builder()?;

        if config.use_cuda {
            info!("Enabling CUDA execution provider");
            session_builder =
                session_builder.with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(0)
                    .build()])?;
        }

        let session = session_builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.num_threads)?
            .with_inter_threads(1)?
            .commit_from_file(&config.path)
            .with_context(|| format!("Failed to load pose model {}", config.path))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .context("Pose model has no inputs")?;

        info!(
            "✓ Pose estimator ready ({}x{} {:?}, input '{}')",
            config.input_width, config.input_height, config.layout, input_name
        );

        Ok(Self {
            session,
            config,
            input_name,
        })
    }

    fn infer(&mut self, input: Vec<f32>) -> Result<(Vec<f32>, Vec<i64>, Option<f32>)> {
        let (w, h) = (self.config.input_width, self.config.input_height);
        let shape = match self.config.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        };

        let input_value =
            ort::value::Value::from_array((shape.as_slice(), input.into_boxed_slice()))?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_value])?;

        let (landmark_shape, landmark_data) = outputs[0].try_extract_tensor::<f32>()?;
        let landmark_shape: Vec<i64> = landmark_shape.iter().copied().collect();
        let landmarks = landmark_data.to_vec();

        // Second output, when present, is the single pose-presence score
        let presence = if outputs.len() > 1 {
            let (_, flag) = outputs[1].try_extract_tensor::<f32>()?;
            flag.first().copied()
        } else {
            None
        };

        Ok((landmarks, landmark_shape, presence))
    }
}

impl LandmarkOracle<Mat> for PoseEstimator {
    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkFrame>> {
        let (width, height) = (frame.cols() as usize, frame.rows() as usize);

        let mut rgb_mat = Mat::default();
        imgproc::cvt_color(frame, &mut rgb_mat, imgproc::COLOR_BGR2RGB, 0)?;
        let (input, letterbox) = preprocess(
            rgb_mat.data_bytes()?,
            width,
            height,
            self.config.input_width,
            self.config.input_height,
            self.config.layout,
        )?;

        let (data, shape, presence) = self.infer(input)?;

        if let Some(score) = presence.map(to_probability) {
            if score < self.config.min_detection_confidence {
                debug!("Pose presence {:.2} below threshold", score);
                return Ok(None);
            }
        }

        let landmarks = decode_landmarks(&data, &shape, &letterbox)?;
        debug!("Decoded {} landmarks from output {:?}", landmarks.len(), shape);
        Ok(Some(landmarks))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Scores already in [0, 1] are kept, anything else is treated as a logit.
fn to_probability(score: f32) -> f32 {
    if (0.0..=1.0).contains(&score) {
        score
    } else {
        sigmoid(score)
    }
}

/// Values per landmark, from the tensor shape when it is `[1, N, K]` with
/// at least a full body of rows, otherwise inferred from the flat length.
fn landmark_stride(len: usize, shape: &[i64]) -> Option<usize> {
    if shape.len() == 3 && shape[1] >= NUM_LANDMARKS as i64 && shape[2] > 0 {
        return Some(shape[2] as usize);
    }
    [5, 4, 3]
        .into_iter()
        .find(|&k| len % k == 0 && len / k >= NUM_LANDMARKS)
}

pub fn decode_landmarks(
    data: &[f32],
    shape: &[i64],
    letterbox: &Letterbox,
) -> Result<LandmarkFrame> {
    let stride = landmark_stride(data.len(), shape)
        .with_context(|| format!("Unrecognized landmark output {:?}", shape))?;
    ensure!(stride >= 2, "Landmark stride {} too small", stride);

    let rows = data.len() / stride;
    ensure!(
        rows >= NUM_LANDMARKS,
        "Model produced {} landmarks, need {}",
        rows,
        NUM_LANDMARKS
    );

    let view = ArrayView2::from_shape((rows, stride), &data[..rows * stride])?;
    let points = view
        .outer_iter()
        .take(NUM_LANDMARKS)
        .map(|row| {
            let (x, y) = letterbox.to_normalized(row[0], row[1]);
            let visibility = if stride > 3 { sigmoid(row[3]) } else { 1.0 };
            Landmark::new(x, y, visibility)
        })
        .collect();

    Ok(LandmarkFrame::new(points))
}
