//! Head detection with a YOLO model through `usls`.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use kurbo::{Rect, Size};
use tracing::{debug, warn};
use usls::{DType, DataLoader, Device, Options, Scale, Task, models::YOLO};

use crate::face::{FaceDetector, FaceRect};
use crate::host::SlideImage;

pub const DEFAULT_MODEL_FILE: &str = "yolo/v8-head-fp16.onnx";

/// An image backed by a file the model can read.
///
/// Detections come back in file pixels and are mapped onto
/// [`SlideImage::size`].
pub trait PhotoFile: SlideImage + AsRef<Path> {
    fn pixel_size(&self) -> Size;
}

/// Faces found by a YOLO head model.
pub struct YoloFaceDetector {
    model: Mutex<YOLO>,
    filter_classes: Vec<usize>,
}

impl YoloFaceDetector {
    pub fn new(model_file: &str, filter_classes: Vec<usize>) -> Result<Self> {
        let options = Options::yolo()
            .with_model_file(model_file)
            .with_model_task(Task::ObjectDetection)
            .with_model_version(8.into())
            .with_model_scale(Scale::S)
            .with_model_dtype(DType::Fp16)
            .with_model_device(Device::Auto(0))
            .with_trt_fp16(true)
            .with_model_ixx(0, 0, (1, 1, 4).into())
            .with_model_ixx(0, 2, (224, 640, 1280).into())
            .with_model_ixx(0, 3, (224, 640, 1280).into())
            .with_class_confs(&[0.2, 0.15])
            .with_topk(5)
            .retain_classes(&filter_classes);

        let model = YOLO::try_from(options.commit()?)
            .with_context(|| format!("failed to load face model {model_file}"))?;
        debug!(model_file, "face model loaded");

        Ok(Self {
            model: Mutex::new(model),
            filter_classes,
        })
    }

    /// Detections in file pixels.
    pub fn detect(&self, image_path: &Path) -> Result<Vec<FaceRect>> {
        let path = image_path
            .to_str()
            .with_context(|| format!("non UTF-8 path {}", image_path.display()))?;

        let mut model = self
            .model
            .lock()
            .map_err(|_| anyhow::anyhow!("face model lock poisoned"))?;
        let dl = DataLoader::new(path)?
            .with_batch(model.batch() as _)
            .build()?;

        let mut faces = Vec::new();
        for xs in &dl {
            let ys = model.forward(&xs)?;
            for y in ys.iter() {
                let Some(hbbs) = y.hbbs() else { continue };
                for hbb in hbbs.iter() {
                    let meta = hbb.meta();
                    let wanted = meta.id().is_some_and(|id| self.filter_classes.contains(&id));
                    if wanted && meta.confidence().is_some() {
                        faces.push(Rect::new(
                            hbb.x() as f64,
                            hbb.y() as f64,
                            hbb.xmax() as f64,
                            hbb.ymax() as f64,
                        ));
                    }
                }
            }
        }
        Ok(faces)
    }
}

/// Maps a rectangle from `from` pixels onto an image of size `to`.
fn rescale(face: FaceRect, from: Size, to: Size) -> FaceRect {
    if from.width <= 0.0 || from.height <= 0.0 {
        return face;
    }
    let (sx, sy) = (to.width / from.width, to.height / from.height);
    Rect::new(face.x0 * sx, face.y0 * sy, face.x1 * sx, face.y1 * sy)
}

impl<I: PhotoFile + Send + Sync> FaceDetector<I> for YoloFaceDetector {
    fn all_faces(&self, image: &I) -> Vec<FaceRect> {
        match self.detect(image.as_ref()) {
            Ok(faces) => {
                debug!(path = %image.as_ref().display(), faces = faces.len(), "faces detected");
                faces
                    .into_iter()
                    .map(|face| rescale(face, image.pixel_size(), image.size()))
                    .collect()
            }
            Err(e) => {
                warn!(path = %image.as_ref().display(), error = %e, "face detection failed");
                Vec::new()
            }
        }
    }
}
