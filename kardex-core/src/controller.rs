//! Catalog state controller
//!
//! Owns the session state (active view, selected category and template,
//! panel flags) and mediates every read and mutation between callers and the
//! cache. Reads go through the cache store with the read retry policy;
//! mutations go gateway-first with the write policy and apply their
//! invalidation plan only after the backend commits. Context is explicit:
//! the controller is a plain value callers hold, not process-global state.

use std::sync::Arc;

use futures::FutureExt;
use kardex_cache::{
    invalidation_plan, CachePolicy, CacheStats, CacheStore, CachedValue, GatewayError, Mutation,
    QueryKind, QuerySpec, Snapshot,
};
use kardex_types::{
    CategorySelection, DiseaseInfo, FacetBucket, FacetKind, FilterOptions, Tag, Template,
    TemplateId, TemplateTypeInfo,
};
use parking_lot::Mutex;

use crate::facets;
use crate::filter::{self, SearchState};
use crate::gateway::{Gateway, GatewayResult, RetryPolicy};

/// Per-session interaction state
#[derive(Debug, Default)]
struct Session {
    search: SearchState,
    selected: Option<TemplateId>,
    filter_panel_open: bool,
    edit_mode: bool,
    initialized: bool,
}

/// Last computed visible set, keyed by collection identity and search state.
/// The collection key is the Arc pointer of the cached snapshot, so any
/// refetch produces a new key without comparing contents.
struct VisibleMemo {
    templates_ptr: usize,
    state: SearchState,
    result: Arc<Vec<Template>>,
}

/// The reactive catalog facade
pub struct Controller {
    gateway: Arc<dyn Gateway>,
    cache: Arc<CacheStore>,
    read_retry: RetryPolicy,
    write_retry: RetryPolicy,
    session: Mutex<Session>,
    visible_memo: Mutex<Option<VisibleMemo>>,
}

impl Controller {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_policies(
            gateway,
            CachePolicy::default(),
            RetryPolicy::reads(),
            RetryPolicy::writes(),
        )
    }

    pub fn with_policies(
        gateway: Arc<dyn Gateway>,
        policy: CachePolicy,
        read_retry: RetryPolicy,
        write_retry: RetryPolicy,
    ) -> Self {
        Controller {
            gateway,
            cache: Arc::new(CacheStore::with_policy(policy)),
            read_retry,
            write_retry,
            session: Mutex::new(Session::default()),
            visible_memo: Mutex::new(None),
        }
    }

    /// First-run sequence: prepare the store, seed the sample catalog if the
    /// store is empty, and reset the cache so every query starts cold.
    pub async fn bootstrap(&self) -> GatewayResult<()> {
        if self.session.lock().initialized {
            return Ok(());
        }
        let gateway = &self.gateway;
        self.read_retry
            .run(|| async { gateway.init_store().await })
            .await?;
        let templates = self
            .read_retry
            .run(|| async { gateway.list_templates().await })
            .await?;
        if templates.is_empty() {
            self.read_retry
                .run(|| async { gateway.seed_sample_data().await })
                .await?;
            tracing::info!("empty store, seeded sample catalog");
        }
        self.cache.apply(&invalidation_plan(&Mutation::InitializeStore));
        self.session.lock().initialized = true;
        Ok(())
    }

    // -- cached reads --------------------------------------------------

    pub async fn templates(&self) -> GatewayResult<Arc<Vec<Template>>> {
        let value = self
            .cache
            .fetch(&QueryKind::AllTemplates, self.templates_fetch())
            .await?;
        Ok(value.as_templates().unwrap_or_default())
    }

    pub async fn template(&self, id: &TemplateId) -> GatewayResult<Option<Arc<Template>>> {
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        let fetch_id = id.clone();
        let value = self
            .cache
            .fetch(&QueryKind::TemplateById(id.clone()), move || {
                async move {
                    let result = retry
                        .run(|| {
                            let gateway = gateway.clone();
                            let id = fetch_id.clone();
                            async move { gateway.get_template(&id).await }
                        })
                        .await;
                    match result {
                        Ok(template) => Ok(CachedValue::Template(Some(Arc::new(template)))),
                        // Absence is a cacheable answer, not a fetch failure
                        Err(GatewayError::NotFound(_)) => Ok(CachedValue::Template(None)),
                        Err(err) => Err(err),
                    }
                }
                .boxed()
            })
            .await?;
        Ok(value.as_template())
    }

    pub async fn diseases(&self) -> GatewayResult<Arc<Vec<DiseaseInfo>>> {
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        let value = self
            .cache
            .fetch(&QueryKind::AllDiseases, move || {
                async move {
                    retry
                        .run(|| {
                            let gateway = gateway.clone();
                            async move { gateway.list_diseases().await }
                        })
                        .await
                        .map(|diseases| CachedValue::Diseases(Arc::new(diseases)))
                }
                .boxed()
            })
            .await?;
        Ok(value.as_diseases().unwrap_or_default())
    }

    pub async fn template_types(&self) -> GatewayResult<Arc<Vec<TemplateTypeInfo>>> {
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        let value = self
            .cache
            .fetch(&QueryKind::AllTemplateTypes, move || {
                async move {
                    retry
                        .run(|| {
                            let gateway = gateway.clone();
                            async move { gateway.list_template_types().await }
                        })
                        .await
                        .map(|types| CachedValue::TemplateTypes(Arc::new(types)))
                }
                .boxed()
            })
            .await?;
        Ok(value.as_template_types().unwrap_or_default())
    }

    pub async fn tags(&self) -> GatewayResult<Arc<Vec<Tag>>> {
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        let value = self
            .cache
            .fetch(&QueryKind::AllTags, move || {
                async move {
                    retry
                        .run(|| {
                            let gateway = gateway.clone();
                            async move { gateway.list_tags().await }
                        })
                        .await
                        .map(|tags| CachedValue::Tags(Arc::new(tags)))
                }
                .boxed()
            })
            .await?;
        Ok(value.as_tags().unwrap_or_default())
    }

    /// Backend-side search, cached under its own per-keyword identity.
    /// A blank keyword never reaches the gateway.
    pub async fn search_remote(&self, keyword: &str) -> GatewayResult<Arc<Vec<Template>>> {
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        let fetch_keyword = keyword.clone();
        let value = self
            .cache
            .fetch(&QueryKind::Search(keyword), move || {
                async move {
                    retry
                        .run(|| {
                            let gateway = gateway.clone();
                            let keyword = fetch_keyword.clone();
                            async move { gateway.search_templates(&keyword).await }
                        })
                        .await
                        .map(|hits| CachedValue::SearchResults(Arc::new(hits)))
                }
                .boxed()
            })
            .await?;
        Ok(value.as_templates().unwrap_or_default())
    }

    // -- non-blocking reads --------------------------------------------

    /// Snapshot of the template collection. Before bootstrap the query is
    /// uninitialized and never fetches; afterwards a stale or missing entry
    /// triggers a background refetch.
    pub fn read_templates(&self) -> Snapshot {
        let spec = if self.session.lock().initialized {
            QuerySpec::active(QueryKind::AllTemplates)
        } else {
            QuerySpec::uninitialized(QueryKind::AllTemplates)
        };
        self.cache.read(&spec, self.templates_fetch())
    }

    /// Snapshot of the ad-hoc search for the current keyword. Disabled, not
    /// merely idle, while the keyword is blank.
    pub fn read_search(&self) -> Snapshot {
        let (keyword, initialized) = {
            let session = self.session.lock();
            (
                session.search.keyword.trim().to_string(),
                session.initialized,
            )
        };
        let kind = QueryKind::Search(keyword.clone());
        let spec = if !initialized {
            QuerySpec::uninitialized(kind)
        } else if keyword.is_empty() {
            QuerySpec::disabled(kind)
        } else {
            QuerySpec::active(kind)
        };
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        self.cache.read(&spec, move || {
            async move {
                retry
                    .run(|| {
                        let gateway = gateway.clone();
                        let keyword = keyword.clone();
                        async move { gateway.search_templates(&keyword).await }
                    })
                    .await
                    .map(|hits| CachedValue::SearchResults(Arc::new(hits)))
            }
            .boxed()
        })
    }

    /// Snapshot of the selected template, or `None` when nothing is selected
    pub fn read_selected(&self) -> Option<Snapshot> {
        let (selected, initialized) = {
            let session = self.session.lock();
            (session.selected.clone(), session.initialized)
        };
        let id = selected?;
        let kind = QueryKind::TemplateById(id.clone());
        let spec = if initialized {
            QuerySpec::active(kind)
        } else {
            QuerySpec::uninitialized(kind)
        };
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        Some(self.cache.read(&spec, move || {
            async move {
                let result = retry
                    .run(|| {
                        let gateway = gateway.clone();
                        let id = id.clone();
                        async move { gateway.get_template(&id).await }
                    })
                    .await;
                match result {
                    Ok(template) => Ok(CachedValue::Template(Some(Arc::new(template)))),
                    Err(GatewayError::NotFound(_)) => Ok(CachedValue::Template(None)),
                    Err(err) => Err(err),
                }
            }
            .boxed()
        }))
    }

    fn templates_fetch(
        &self,
    ) -> impl FnOnce() -> futures::future::BoxFuture<'static, Result<CachedValue, GatewayError>>
    {
        let gateway = self.gateway.clone();
        let retry = self.read_retry;
        move || {
            async move {
                retry
                    .run(|| {
                        let gateway = gateway.clone();
                        async move { gateway.list_templates().await }
                    })
                    .await
                    .map(|templates| CachedValue::Templates(Arc::new(templates)))
            }
            .boxed()
        }
    }

    // -- derived views -------------------------------------------------

    /// The visible template subset for the current session state
    pub async fn visible(&self) -> GatewayResult<Arc<Vec<Template>>> {
        let templates = self.templates().await?;
        let state = self.session.lock().search.clone();
        Ok(self.visible_from(&templates, &state))
    }

    /// Memoized filter application: recomputes only when the collection
    /// snapshot or the search state changed since the last call
    pub fn visible_from(
        &self,
        templates: &Arc<Vec<Template>>,
        state: &SearchState,
    ) -> Arc<Vec<Template>> {
        let templates_ptr = Arc::as_ptr(templates) as usize;
        let mut memo = self.visible_memo.lock();
        if let Some(hit) = memo.as_ref() {
            if hit.templates_ptr == templates_ptr && &hit.state == state {
                return hit.result.clone();
            }
        }
        let result = Arc::new(filter::visible(templates, state));
        *memo = Some(VisibleMemo {
            templates_ptr,
            state: state.clone(),
            result: result.clone(),
        });
        result
    }

    /// Buckets for the requested facet, in collection order
    pub async fn facet_buckets(&self, kind: FacetKind) -> GatewayResult<Vec<FacetBucket>> {
        let templates = self.templates().await?;
        Ok(facets::buckets(&templates, kind))
    }

    // -- session transitions -------------------------------------------

    /// Switch the category view. Resets the category to All, then selects
    /// the first visible template in the same call.
    pub async fn switch_view(&self, view: FacetKind) -> GatewayResult<()> {
        {
            let mut session = self.session.lock();
            session.search.view = view;
            session.search.category = CategorySelection::All;
        }
        self.reselect_first_visible().await
    }

    /// Select a category inside the active view. Phase one updates the
    /// state; phase two recomputes the visible set and moves the selection
    /// to its first template (or clears it), synchronously within this call.
    pub async fn select_category(&self, category: CategorySelection) -> GatewayResult<()> {
        self.session.lock().search.category = category;
        self.reselect_first_visible().await
    }

    async fn reselect_first_visible(&self) -> GatewayResult<()> {
        let visible = self.visible().await?;
        self.select_template(visible.first().map(|t| t.id.clone()));
        Ok(())
    }

    /// Select a template (or clear the selection). The selected by-id entry
    /// is pinned so eviction never drops it mid-view.
    pub fn select_template(&self, id: Option<TemplateId>) {
        let mut session = self.session.lock();
        if session.selected == id {
            return;
        }
        if let Some(previous) = session.selected.take() {
            self.cache.unpin(&QueryKind::TemplateById(previous));
        }
        if let Some(id) = id {
            self.cache.pin(&QueryKind::TemplateById(id.clone()));
            session.selected = Some(id);
        }
    }

    pub fn selected(&self) -> Option<TemplateId> {
        self.session.lock().selected.clone()
    }

    /// Fetch the currently selected template through the cache
    pub async fn selected_template(&self) -> GatewayResult<Option<Arc<Template>>> {
        match self.selected() {
            Some(id) => self.template(&id).await,
            None => Ok(None),
        }
    }

    pub fn set_search_keyword(&self, keyword: impl Into<String>) {
        self.session.lock().search.keyword = keyword.into();
    }

    pub fn set_filter_options(&self, filter: FilterOptions) {
        self.session.lock().search.filter = filter;
    }

    pub fn search_state(&self) -> SearchState {
        self.session.lock().search.clone()
    }

    pub fn toggle_filter_panel(&self) -> bool {
        let mut session = self.session.lock();
        session.filter_panel_open = !session.filter_panel_open;
        session.filter_panel_open
    }

    pub fn filter_panel_open(&self) -> bool {
        self.session.lock().filter_panel_open
    }

    pub fn set_edit_mode(&self, on: bool) {
        self.session.lock().edit_mode = on;
    }

    pub fn edit_mode(&self) -> bool {
        self.session.lock().edit_mode
    }

    // -- mutations -----------------------------------------------------

    /// Create or replace a template. The cache is touched only after the
    /// gateway commits; a failed save leaves every entry as it was.
    pub async fn save_template(&self, template: Template) -> GatewayResult<Template> {
        let gateway = self.gateway.clone();
        let saved = self
            .write_retry
            .run(|| {
                let gateway = gateway.clone();
                let template = template.clone();
                async move { gateway.save_template(template).await }
            })
            .await?;
        self.cache
            .apply(&invalidation_plan(&Mutation::SaveTemplate(saved.id.clone())));
        Ok(saved)
    }

    /// Delete a template. On commit the by-id entry is removed outright and
    /// a matching selection is cleared.
    pub async fn delete_template(&self, id: &TemplateId) -> GatewayResult<()> {
        let gateway = self.gateway.clone();
        let delete_id = id.clone();
        self.write_retry
            .run(|| {
                let gateway = gateway.clone();
                let id = delete_id.clone();
                async move { gateway.delete_template(&id).await }
            })
            .await?;
        {
            let mut session = self.session.lock();
            if session.selected.as_ref() == Some(id) {
                session.selected = None;
                self.cache.unpin(&QueryKind::TemplateById(id.clone()));
            }
        }
        self.cache
            .apply(&invalidation_plan(&Mutation::DeleteTemplate(id.clone())));
        Ok(())
    }

    /// Flip the favorite flag; returns the committed value
    pub async fn toggle_favorite(&self, id: &TemplateId) -> GatewayResult<bool> {
        let gateway = self.gateway.clone();
        let toggle_id = id.clone();
        let flipped = self
            .write_retry
            .run(|| {
                let gateway = gateway.clone();
                let id = toggle_id.clone();
                async move { gateway.toggle_favorite(&id).await }
            })
            .await?;
        self.cache
            .apply(&invalidation_plan(&Mutation::ToggleFavorite(id.clone())));
        Ok(flipped)
    }

    pub async fn save_tag(&self, tag: Tag) -> GatewayResult<Tag> {
        let gateway = self.gateway.clone();
        let saved = self
            .write_retry
            .run(|| {
                let gateway = gateway.clone();
                let tag = tag.clone();
                async move { gateway.save_tag(tag).await }
            })
            .await?;
        self.cache.apply(&invalidation_plan(&Mutation::SaveTag));
        Ok(saved)
    }

    pub async fn save_disease(&self, name: &str) -> GatewayResult<()> {
        let gateway = self.gateway.clone();
        let save_name = name.to_string();
        self.write_retry
            .run(|| {
                let gateway = gateway.clone();
                let name = save_name.clone();
                async move { gateway.save_disease(&name).await }
            })
            .await?;
        self.cache.apply(&invalidation_plan(&Mutation::SaveDisease));
        Ok(())
    }

    pub async fn save_template_type(&self, name: &str) -> GatewayResult<()> {
        let gateway = self.gateway.clone();
        let save_name = name.to_string();
        self.write_retry
            .run(|| {
                let gateway = gateway.clone();
                let name = save_name.clone();
                async move { gateway.save_template_type(&name).await }
            })
            .await?;
        self.cache
            .apply(&invalidation_plan(&Mutation::SaveTemplateType));
        Ok(())
    }

    // -- maintenance ---------------------------------------------------

    /// Mark every collection and vocabulary entry stale; values stay
    /// servable until their refetches land
    pub fn refresh(&self) {
        for kind in [
            QueryKind::AllTemplates,
            QueryKind::AllDiseases,
            QueryKind::AllTemplateTypes,
            QueryKind::AllTags,
        ] {
            self.cache.invalidate(&kind);
        }
    }

    /// Drop expired and husk entries; pinned and in-flight entries survive
    pub fn evict(&self) -> usize {
        self.cache.evict()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
