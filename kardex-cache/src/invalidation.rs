//! Mutation-to-invalidation mapping
//!
//! A static table from each mutation kind to the query identities that must
//! be treated as stale once that mutation commits. Plans are applied only
//! after the backend call resolves successfully; a failed mutation
//! invalidates nothing.

use crate::key::QueryKind;
use crate::store::CacheStore;
use kardex_types::TemplateId;

/// A committed backend mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SaveTemplate(TemplateId),
    DeleteTemplate(TemplateId),
    ToggleFavorite(TemplateId),
    SaveTag,
    SaveDisease,
    SaveTemplateType,
    /// First-run store initialization; resets everything
    InitializeStore,
}

/// The cache work a committed mutation requires
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationPlan {
    /// Identities to mark stale (value stays servable until refetched)
    pub invalidate: Vec<QueryKind>,

    /// Identities to delete outright (serving them would be wrong)
    pub remove: Vec<QueryKind>,

    /// Drop the whole store
    pub reset: bool,
}

/// Look up the invalidation plan for a mutation
pub fn invalidation_plan(mutation: &Mutation) -> InvalidationPlan {
    match mutation {
        Mutation::SaveTemplate(id) => InvalidationPlan {
            invalidate: vec![
                QueryKind::AllTemplates,
                QueryKind::AllDiseases,
                QueryKind::AllTemplateTypes,
                QueryKind::AllTags,
                QueryKind::TemplateById(id.clone()),
            ],
            ..Default::default()
        },
        Mutation::DeleteTemplate(id) => InvalidationPlan {
            invalidate: vec![
                QueryKind::AllTemplates,
                QueryKind::AllDiseases,
                QueryKind::AllTemplateTypes,
            ],
            remove: vec![QueryKind::TemplateById(id.clone())],
            ..Default::default()
        },
        Mutation::ToggleFavorite(id) => InvalidationPlan {
            invalidate: vec![
                QueryKind::AllTemplates,
                QueryKind::TemplateById(id.clone()),
            ],
            ..Default::default()
        },
        Mutation::SaveTag => InvalidationPlan {
            invalidate: vec![QueryKind::AllTags],
            ..Default::default()
        },
        Mutation::SaveDisease => InvalidationPlan {
            invalidate: vec![QueryKind::AllDiseases],
            ..Default::default()
        },
        Mutation::SaveTemplateType => InvalidationPlan {
            invalidate: vec![QueryKind::AllTemplateTypes],
            ..Default::default()
        },
        Mutation::InitializeStore => InvalidationPlan {
            reset: true,
            ..Default::default()
        },
    }
}

impl CacheStore {
    /// Apply a plan in full: either the mutation committed and every listed
    /// identity is handled, or this is never called
    pub fn apply(&self, plan: &InvalidationPlan) {
        if plan.reset {
            self.clear();
            return;
        }
        for kind in &plan.invalidate {
            self.invalidate(kind);
        }
        for kind in &plan.remove {
            self.remove(kind);
        }
    }
}
