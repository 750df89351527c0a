//! Facet index
//!
//! Derives the distinct values and counts for one facet axis from the
//! current template collection. Buckets are ordered by first occurrence
//! while walking the input in its given order; a full recompute per call is
//! always only one pass over a bounded collection.

use kardex_types::{FacetBucket, FacetKind, Template};
use std::collections::HashMap;

/// Distinct `(value, count)` buckets for a facet over the given templates
///
/// Disease and type contribute one bucket per template; a template counts
/// toward every tag it carries.
pub fn buckets(templates: &[Template], kind: FacetKind) -> Vec<FacetBucket> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();

    let mut bump = |value: &str| {
        let count = counts.entry(value.to_string()).or_insert(0);
        if *count == 0 {
            order.push(value.to_string());
        }
        *count += 1;
    };

    for template in templates {
        match kind {
            FacetKind::Disease => bump(&template.disease),
            FacetKind::TemplateType => bump(&template.template_type),
            FacetKind::Tag => {
                for tag in &template.tags {
                    bump(tag.as_str());
                }
            }
        }
    }

    order
        .into_iter()
        .map(|value| {
            let count = counts[&value];
            FacetBucket { value, count }
        })
        .collect()
}
