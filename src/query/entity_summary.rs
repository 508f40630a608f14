use std::collections::HashMap;

use serde::Serialize;

use crate::classify::{classify_entity, EntityType};
use crate::query::metrics::share_of_total;
use crate::query::view::View;
use crate::types::{Dimension, QueryError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTypeSummary {
    pub entity_type: EntityType,
    pub recipients: usize,
    pub amount: f64,
    pub payments: u64,
    /// Fraction of the view's amount.
    pub share: f64,
}

/// Classify every recipient in `view` and total them per entity type.
///
/// Only types with at least one recipient appear. Ordered by amount
/// descending, then by the catalog order of `EntityType`.
pub fn summarize_entity_types(view: &View<'_>) -> Result<Vec<EntityTypeSummary>, QueryError> {
    if !view.kind().key_shape().contains(&Dimension::Recipient) {
        return Err(QueryError::UnknownField {
            field: Dimension::Recipient,
            table: view.kind(),
        });
    }

    let mut totals: HashMap<EntityType, (usize, f64, u64)> = HashMap::new();
    for row in view.iter() {
        let Some(recipient) = row.key.recipient.as_deref() else {
            continue;
        };
        let entry = totals.entry(classify_entity(recipient)).or_default();
        entry.0 += 1;
        entry.1 += row.amount;
        entry.2 += row.payments;
    }

    let view_amount = view.total_amount();
    let mut summaries: Vec<EntityTypeSummary> = EntityType::ALL
        .iter()
        .filter_map(|entity_type| {
            let &(recipients, amount, payments) = totals.get(entity_type)?;
            Some(EntityTypeSummary {
                entity_type: *entity_type,
                recipients,
                amount,
                payments,
                share: share_of_total(amount, view_amount),
            })
        })
        .collect();
    // stable: ties keep catalog order
    summaries.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    Ok(summaries)
}
