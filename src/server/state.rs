use std::sync::Arc;

use super::view::IndexTemplate;
use crate::predict_pipeline::StrokePredictor;
use crate::train_pipeline::TrainRunner;

/// Shared by every handler; holds no per-request mutable state.
pub struct AppState {
    pub trainer: Arc<dyn TrainRunner>,
    pub predictor: Arc<dyn StrokePredictor>,
    pub index: IndexTemplate,
}

impl AppState {
    pub fn new(
        trainer: Arc<dyn TrainRunner>,
        predictor: Arc<dyn StrokePredictor>,
        index: IndexTemplate,
    ) -> Self {
        Self {
            trainer,
            predictor,
            index,
        }
    }
}
