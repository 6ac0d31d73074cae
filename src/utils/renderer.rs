use burn::train::renderer::{MetricState, MetricsRenderer, TrainingProgress};
use derive_new::new;
use log::info;

/// A simple renderer for TUI-disabled modes
#[derive(new)]
pub struct Simple {}

impl MetricsRenderer for Simple {
    fn update_train(&mut self, _state: MetricState) {}

    fn update_valid(&mut self, _state: MetricState) {}

    fn render_train(&mut self, item: TrainingProgress) {
        info!(
            "train epoch {}/{} iteration {}",
            item.epoch, item.epoch_total, item.iteration
        );
    }

    fn render_valid(&mut self, item: TrainingProgress) {
        info!(
            "valid epoch {}/{} iteration {}",
            item.epoch, item.epoch_total, item.iteration
        );
    }
}
