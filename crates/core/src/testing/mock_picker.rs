//! Mock picker for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::picker::{InputPicker, PickerError};
use crate::session::SelectedInput;

/// Mock implementation of the InputPicker trait.
///
/// Returns the configured input on every pick, or `None` when the user
/// "backs out".
#[derive(Debug, Clone, Default)]
pub struct MockPicker {
    input: Arc<RwLock<Option<SelectedInput>>>,
    /// If set, the next pick fails with this error.
    next_error: Arc<RwLock<Option<PickerError>>>,
    pick_count: Arc<AtomicUsize>,
}

impl MockPicker {
    /// A picker whose user always chooses `input`.
    pub fn returning(input: SelectedInput) -> Self {
        Self {
            input: Arc::new(RwLock::new(Some(input))),
            ..Default::default()
        }
    }

    /// A picker whose user always backs out.
    pub fn cancelled() -> Self {
        Self::default()
    }

    /// Configure the next pick to fail with the given error.
    pub async fn set_next_error(&self, error: PickerError) {
        *self.next_error.write().await = Some(error);
    }

    pub fn pick_count(&self) -> usize {
        self.pick_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InputPicker for MockPicker {
    async fn pick(&self) -> Result<Option<SelectedInput>, PickerError> {
        self.pick_count.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        Ok(self.input.read().await.clone())
    }
}
