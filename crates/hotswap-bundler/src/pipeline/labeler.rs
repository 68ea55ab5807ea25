use std::borrow::Cow;

use async_trait::async_trait;

use super::Stage;
use crate::{ModuleIndex, ModuleRecord, Result};

/// Host labeler: assigns positions 1, 2, 3, ... in stream order.
///
/// Installed at the head of the label stage so later handlers observe
/// definitive positions.
#[derive(Debug)]
pub struct IndexLabeler {
    next: u64,
}

impl IndexLabeler {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for IndexLabeler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for IndexLabeler {
    fn name(&self) -> Cow<'static, str> {
        "index-labeler".into()
    }

    async fn transform(&mut self, mut record: ModuleRecord) -> Result<Option<ModuleRecord>> {
        record.index = Some(ModuleIndex::Number(self.next));
        self.next += 1;
        Ok(Some(record))
    }
}
