use anyhow::{anyhow, ensure, Context, Result};
use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayView2, ArrayViewD, Axis, Ix2, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;
use std::fs;
use std::sync::Mutex;
use tracing::{debug, info};

use crate::application::ports::ObjectDetectorPort;
use crate::domain::detection::{BoundingBox, DetectedObject};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::image::Image;
use crate::domain::model::YoloParams;

const COCO_CLASSES: [&str; 80] = [
    "persona", "bicicleta", "coche", "motocicleta", "avión", "autobús", "tren", "camión", "barco",
    "semáforo", "hidrante", "señal de stop", "parquímetro", "banco", "pájaro", "gato", "perro",
    "caballo", "oveja", "vaca", "elefante", "oso", "cebra", "jirafa", "mochila", "paraguas",
    "bolso", "corbata", "maleta", "frisbee", "esquís", "snowboard", "pelota", "cometa",
    "bate de béisbol", "guante de béisbol", "monopatín", "tabla de surf", "raqueta de tenis",
    "botella", "copa de vino", "taza", "tenedor", "cuchillo", "cuchara", "tazón", "plátano",
    "manzana", "sándwich", "naranja", "brócoli", "zanahoria", "perrito caliente", "pizza",
    "donut", "pastel", "silla", "sofá", "planta", "cama", "mesa", "inodoro", "televisor",
    "portátil", "ratón", "mando", "teclado", "móvil", "microondas", "horno", "tostadora",
    "fregadero", "nevera", "libro", "reloj", "jarrón", "tijeras", "peluche", "secador", "cepillo",
];

/// Motor YOLO sobre ONNX Runtime. La sesión se protege con un `Mutex`
/// para compartir un único motor entre peticiones concurrentes.
pub struct OnnxYoloEngine {
    session: Mutex<Session>,
    params: YoloParams,
}

impl OnnxYoloEngine {
    pub fn load(path: &str, params: YoloParams) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let model_bytes = fs::read(path).with_context(|| format!("Failed to read model {path}"))?;
        let session = builder.commit_from_memory(&model_bytes)?;

        info!("✓ Modelo YOLO cargado desde {}", path);
        Ok(Self { session: Mutex::new(session), params })
    }

    pub fn infer(&self, rgb: &RgbImage) -> Result<Vec<DetectedObject>> {
        let imgsz = self.params.input_size as usize;
        let input = preprocess(rgb, imgsz);

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let (data, _) = input.into_raw_vec_and_offset();
        let input_tensor = Tensor::from_array((input_shape, data))?;

        // La salida se copia para soltar el lock antes del post-proceso.
        let output = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
            let outputs = session.run(ort::inputs![input_tensor])?;
            let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

            let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
            check_output_dims(&dims)?;
            let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
            array_view
                .index_axis(Axis(0), 0)
                .into_dimensionality::<Ix2>()?
                .to_owned()
        };

        let sx = rgb.width() as f32 / imgsz as f32;
        let sy = rgb.height() as f32 / imgsz as f32;
        let candidates = decode_candidates(output.view(), (sx, sy), self.params.conf_threshold);
        debug!(candidates = candidates.len(), "Candidatos YOLO sobre el umbral");

        Ok(finalize(candidates, rgb.width(), rgb.height(), &self.params))
    }
}

impl ObjectDetectorPort for OnnxYoloEngine {
    fn detect_objects(&self, image: &Image) -> DomainResult<Vec<DetectedObject>> {
        self.infer(image.rgb())
            .map_err(|e| DomainError::Analysis(format!("object detection failed: {e:#}")))
    }
}

/// La salida debe ser `[lote, 4 + clases, candidatos]` con al menos una clase.
fn check_output_dims(dims: &[usize]) -> Result<()> {
    ensure!(dims.len() == 3 && dims[0] > 0, "unexpected YOLO output shape {:?}", dims);
    ensure!(dims[1] > 4, "YOLO output has no class scores: shape {:?}", dims);
    Ok(())
}

/// Tensor NCHW normalizado a [0, 1].
fn preprocess(rgb: &RgbImage, imgsz: usize) -> Array4<f32> {
    let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Nearest);

    let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
    for (x, y, pixel) in resized.enumerate_pixels() {
        input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
        input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
        input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
    }
    input
}

/// Decodifica una salida `[4 + clases, candidatos]` (cx, cy, w, h, puntuaciones...)
/// a cajas en coordenadas de la imagen original.
fn decode_candidates(view: ArrayView2<f32>, scale: (f32, f32), conf_threshold: f32) -> Vec<DetectedObject> {
    let (sx, sy) = scale;
    let mut detections = Vec::new();

    for i in 0..view.shape()[1] {
        let scores = view.slice(s![4.., i]);
        let Some((class_id, &max_score)) = scores
            .indexed_iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if max_score > conf_threshold {
            let cx = view[[0, i]];
            let cy = view[[1, i]];
            let w = view[[2, i]];
            let h = view[[3, i]];

            detections.push(DetectedObject {
                label: COCO_CLASSES.get(class_id).unwrap_or(&"objeto").to_string(),
                class_id,
                score: max_score,
                bbox: BoundingBox::from_corners(
                    (cx - w / 2.0) * sx,
                    (cy - h / 2.0) * sy,
                    (cx + w / 2.0) * sx,
                    (cy + h / 2.0) * sy,
                ),
            });
        }
    }
    detections
}

/// NMS por clase, recorte a la imagen y límite de detecciones.
/// El orden es por puntuación descendente; los empates conservan el orden de candidato.
fn finalize(candidates: Vec<DetectedObject>, width: u32, height: u32, params: &YoloParams) -> Vec<DetectedObject> {
    non_max_suppression(candidates, params.iou_threshold)
        .into_iter()
        .take(params.max_detections)
        .map(|mut det| {
            det.bbox = det.bbox.clamp_to(width, height);
            det
        })
        .collect()
}

fn non_max_suppression(mut detections: Vec<DetectedObject>, iou_threshold: f32) -> Vec<DetectedObject> {
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut result: Vec<DetectedObject> = Vec::new();
    for det in detections {
        let suppressed = result
            .iter()
            .any(|kept| kept.class_id == det.class_id && kept.bbox.iou(&det.bbox) >= iou_threshold);
        if !suppressed {
            result.push(det);
        }
    }
    result
}
