//! Repository Module
//!
//! The option repository collaborator: where option rows come from, and
//! how option labels are joined into a query.

mod criteria;
mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AttributeMetadata, OptionRow, StoreId};
use crate::query::{Expr, QueryPlan, SelectQuery};

// Re-export public types
pub use criteria::{OptionCriteria, PreloadFilter};
pub use memory::{MemoryOptionRepository, OptionRecord};

/// Source of option rows and option-label joins.
#[async_trait]
pub trait OptionRepository: Send + Sync {
    /// Fetches every option row matching `criteria`, ordered by position.
    async fn fetch_options(&self, criteria: &OptionCriteria) -> anyhow::Result<Vec<OptionRow>>;

    /// Joins the option label tables against `value_expr` (an option id
    /// expression) and selects the resolved label under the attribute code.
    fn add_option_value_to_query(
        &self,
        query: &mut dyn SelectQuery,
        attribute: &AttributeMetadata,
        value_expr: Expr,
    ) -> Result<()>;

    /// Select used to populate the attribute's flat table columns.
    fn flat_update_select(
        &self,
        _attribute: &AttributeMetadata,
        _store_id: StoreId,
    ) -> Result<Option<QueryPlan>> {
        Ok(None)
    }
}
