//! CLI command implementations

use std::sync::Arc;

use anyhow::{bail, Context};
use kardex_core::{Controller, MemoryGateway, SearchState};
use kardex_types::{CategorySelection, FacetKind, FilterOptions, TagId, Template, TemplateId};

/// Build a controller over the in-memory gateway and run the first-use
/// sequence, which seeds the sample catalog into the empty store.
pub async fn bootstrap() -> anyhow::Result<Controller> {
    let controller = Controller::new(Arc::new(MemoryGateway::new()));
    controller
        .bootstrap()
        .await
        .context("failed to initialize the template store")?;
    Ok(controller)
}

pub struct ListOptions {
    pub view: String,
    pub category: String,
    pub favorites: bool,
    pub diseases: Vec<String>,
    pub types: Vec<String>,
    pub tags: Vec<String>,
    pub keyword: Option<String>,
    pub json: bool,
}

fn parse_facet(s: &str) -> anyhow::Result<FacetKind> {
    match FacetKind::from_str(s) {
        Some(kind) => Ok(kind),
        None => bail!("unknown facet '{}', expected disease, type, or tag", s),
    }
}

pub async fn list_templates(controller: &Controller, opts: ListOptions) -> anyhow::Result<()> {
    let state = SearchState {
        view: parse_facet(&opts.view)?,
        category: if opts.category.eq_ignore_ascii_case("all") {
            CategorySelection::All
        } else {
            CategorySelection::Value(opts.category)
        },
        filter: FilterOptions {
            is_favorite: opts.favorites,
            diseases: opts.diseases,
            template_types: opts.types,
            tags: opts.tags.into_iter().map(TagId::new).collect(),
        },
        keyword: opts.keyword.unwrap_or_default(),
    };

    let templates = controller.templates().await?;
    let visible = controller.visible_from(&templates, &state);
    if opts.json {
        println!("{}", serde_json::to_string_pretty(visible.as_ref())?);
    } else {
        print_template_lines(&visible);
        let narrowed = !state.category.is_all()
            || !state.filter.is_empty()
            || !state.keyword.trim().is_empty();
        if narrowed {
            println!("{} of {} templates", visible.len(), templates.len());
        } else {
            println!("{} templates", templates.len());
        }
    }
    Ok(())
}

pub async fn search_templates(
    controller: &Controller,
    keyword: &str,
    json: bool,
) -> anyhow::Result<()> {
    let hits = controller.search_remote(keyword).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(hits.as_ref())?);
    } else {
        print_template_lines(&hits);
        println!("{} match(es) for '{}'", hits.len(), keyword);
    }
    Ok(())
}

pub async fn show_template(controller: &Controller, id: &str, text: bool) -> anyhow::Result<()> {
    let id = TemplateId::new(id);
    let template = controller
        .template(&id)
        .await?
        .with_context(|| format!("no template with id '{}'", id))?;

    if text {
        println!("{}", template.clipboard_text());
        return Ok(());
    }

    println!("{} {}", template.id, template.title);
    println!(
        "  {} / {} / [{}]{}",
        template.disease,
        template.template_type,
        template
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        if template.is_favorite { " ★" } else { "" },
    );
    for section in &template.sections {
        println!("  {}：{}", section.title, section.content);
    }
    Ok(())
}

pub async fn toggle_favorite(controller: &Controller, id: &str) -> anyhow::Result<()> {
    let id = TemplateId::new(id);
    let favorite = controller.toggle_favorite(&id).await?;
    println!(
        "{} is {} a favorite",
        id,
        if favorite { "now" } else { "no longer" }
    );
    Ok(())
}

pub async fn show_facets(controller: &Controller, kind: &str) -> anyhow::Result<()> {
    let kind = parse_facet(kind)?;
    let buckets = controller.facet_buckets(kind).await?;
    for bucket in &buckets {
        println!("{:4}  {}", bucket.count, bucket.value);
    }
    println!("{} {} bucket(s)", buckets.len(), kind.as_str());
    Ok(())
}

pub async fn show_stats(controller: &Controller) -> anyhow::Result<()> {
    // Touch the collection so the stats reflect at least one read
    controller.templates().await?;
    println!("{}", controller.cache_stats());
    Ok(())
}

fn print_template_lines(templates: &[Template]) {
    for template in templates {
        println!(
            "{:>3}  {}{}  ({}, {})",
            template.id.as_str(),
            template.title,
            if template.is_favorite { " ★" } else { "" },
            template.disease,
            template.template_type,
        );
    }
}
