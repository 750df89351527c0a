//! In-memory gateway
//!
//! Backing store used by the CLI and by tests. Holds the whole catalog behind
//! a mutex and derives the facet vocabularies from the templates on demand.
//! Failure injection and per-operation call counters make it usable as a
//! deterministic stand-in for a real backend.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use kardex_cache::GatewayError;
use kardex_types::{DiseaseInfo, Tag, TagId, Template, TemplateId, TemplateTypeInfo};
use parking_lot::Mutex;

use crate::gateway::{Gateway, GatewayResult};
use crate::pinyin;
use crate::sample;

#[derive(Default)]
struct MemoryState {
    initialized: bool,
    templates: Vec<Template>,
    tags: Vec<Tag>,
    diseases: Vec<String>,
    template_types: Vec<String>,
}

/// Mutex-backed [`Gateway`] with the full command surface.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
    failures: Mutex<VecDeque<GatewayError>>,
    calls: Mutex<HashMap<&'static str, u64>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error to be returned by the next gateway call, ahead of any
    /// already queued. Consumed in FIFO order across all operations.
    pub fn inject_failure(&self, error: GatewayError) {
        self.failures.lock().push_back(error);
    }

    /// Number of times `op` has been invoked, by method name.
    pub fn call_count(&self, op: &str) -> u64 {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    /// Replaces the template set wholesale. Bypasses validation.
    pub fn import_templates(&self, templates: Vec<Template>) {
        self.state.lock().templates = templates;
    }

    pub fn clear_templates(&self) {
        self.state.lock().templates.clear();
    }

    fn begin(&self, op: &'static str) -> GatewayResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Distinct values in first-occurrence order, explicit entries first.
fn merge_vocabulary<'a>(
    explicit: impl Iterator<Item = &'a str>,
    derived: impl Iterator<Item = &'a str>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in explicit.chain(derived) {
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

fn count_templates(templates: &[Template], matches: impl Fn(&Template) -> bool) -> u32 {
    templates.iter().filter(|t| matches(t)).count() as u32
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn init_store(&self) -> GatewayResult<()> {
        self.begin("init_store")?;
        self.state.lock().initialized = true;
        Ok(())
    }

    async fn list_templates(&self) -> GatewayResult<Vec<Template>> {
        self.begin("list_templates")?;
        Ok(self.state.lock().templates.clone())
    }

    async fn get_template(&self, id: &TemplateId) -> GatewayResult<Template> {
        self.begin("get_template")?;
        self.state
            .lock()
            .templates
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("template {id}")))
    }

    async fn save_template(&self, mut template: Template) -> GatewayResult<Template> {
        self.begin("save_template")?;
        if template.id.as_str().is_empty() {
            return Err(GatewayError::Validation("template id must not be empty".into()));
        }
        if template.title.trim().is_empty() {
            return Err(GatewayError::Validation("template title must not be empty".into()));
        }
        template.updated_at = Utc::now();
        let mut state = self.state.lock();
        match state.templates.iter().position(|t| t.id == template.id) {
            Some(idx) => {
                template.created_at = state.templates[idx].created_at;
                state.templates[idx] = template.clone();
            }
            None => state.templates.push(template.clone()),
        }
        Ok(template)
    }

    async fn delete_template(&self, id: &TemplateId) -> GatewayResult<()> {
        self.begin("delete_template")?;
        let mut state = self.state.lock();
        let before = state.templates.len();
        state.templates.retain(|t| &t.id != id);
        if state.templates.len() == before {
            return Err(GatewayError::NotFound(format!("template {id}")));
        }
        Ok(())
    }

    async fn toggle_favorite(&self, id: &TemplateId) -> GatewayResult<bool> {
        self.begin("toggle_favorite")?;
        let mut state = self.state.lock();
        let template = state
            .templates
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| GatewayError::NotFound(format!("template {id}")))?;
        template.is_favorite = !template.is_favorite;
        template.updated_at = Utc::now();
        Ok(template.is_favorite)
    }

    async fn search_templates(&self, keyword: &str) -> GatewayResult<Vec<Template>> {
        self.begin("search_templates")?;
        let keyword = keyword.trim();
        let state = self.state.lock();
        if keyword.is_empty() {
            return Ok(state.templates.clone());
        }
        Ok(state
            .templates
            .iter()
            .filter(|t| {
                pinyin::matches(&t.title, keyword)
                    || t.sections.iter().any(|s| {
                        pinyin::matches(&s.title, keyword) || pinyin::matches(&s.content, keyword)
                    })
            })
            .cloned()
            .collect())
    }

    async fn list_diseases(&self) -> GatewayResult<Vec<DiseaseInfo>> {
        self.begin("list_diseases")?;
        let state = self.state.lock();
        let names = merge_vocabulary(
            state.diseases.iter().map(String::as_str),
            state.templates.iter().map(|t| t.disease.as_str()),
        );
        Ok(names
            .into_iter()
            .map(|name| {
                let template_count = count_templates(&state.templates, |t| t.disease == name);
                DiseaseInfo { name, template_count }
            })
            .collect())
    }

    async fn list_template_types(&self) -> GatewayResult<Vec<TemplateTypeInfo>> {
        self.begin("list_template_types")?;
        let state = self.state.lock();
        let names = merge_vocabulary(
            state.template_types.iter().map(String::as_str),
            state.templates.iter().map(|t| t.template_type.as_str()),
        );
        Ok(names
            .into_iter()
            .map(|name| {
                let template_count =
                    count_templates(&state.templates, |t| t.template_type == name);
                TemplateTypeInfo { name, template_count }
            })
            .collect())
    }

    async fn list_tags(&self) -> GatewayResult<Vec<Tag>> {
        self.begin("list_tags")?;
        let state = self.state.lock();
        let mut tags: Vec<Tag> = Vec::new();
        let mut push = |id: &TagId, color: Option<String>| {
            if !tags.iter().any(|t: &Tag| &t.id == id) {
                let template_count = count_templates(&state.templates, |t| t.has_tag(id));
                tags.push(Tag {
                    id: id.clone(),
                    name: id.as_str().to_string(),
                    color,
                    template_count: Some(template_count),
                });
            }
        };
        for tag in &state.tags {
            push(&tag.id, tag.color.clone());
        }
        for template in &state.templates {
            for id in &template.tags {
                push(id, None);
            }
        }
        Ok(tags)
    }

    async fn save_disease(&self, name: &str) -> GatewayResult<()> {
        self.begin("save_disease")?;
        if name.trim().is_empty() {
            return Err(GatewayError::Validation("disease name must not be empty".into()));
        }
        let mut state = self.state.lock();
        if !state.diseases.iter().any(|d| d == name) {
            state.diseases.push(name.to_string());
        }
        Ok(())
    }

    async fn save_template_type(&self, name: &str) -> GatewayResult<()> {
        self.begin("save_template_type")?;
        if name.trim().is_empty() {
            return Err(GatewayError::Validation(
                "template type name must not be empty".into(),
            ));
        }
        let mut state = self.state.lock();
        if !state.template_types.iter().any(|t| t == name) {
            state.template_types.push(name.to_string());
        }
        Ok(())
    }

    async fn save_tag(&self, tag: Tag) -> GatewayResult<Tag> {
        self.begin("save_tag")?;
        if tag.name.trim().is_empty() {
            return Err(GatewayError::Validation("tag name must not be empty".into()));
        }
        let mut state = self.state.lock();
        match state.tags.iter().position(|t| t.id == tag.id) {
            Some(idx) => state.tags[idx] = tag.clone(),
            None => state.tags.push(tag.clone()),
        }
        Ok(tag)
    }

    async fn seed_sample_data(&self) -> GatewayResult<()> {
        self.begin("seed_sample_data")?;
        self.state.lock().templates = sample::sample_templates();
        Ok(())
    }
}
