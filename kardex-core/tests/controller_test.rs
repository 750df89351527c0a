//! End-to-end controller behavior against the in-memory gateway

use std::sync::Arc;

use kardex_core::{Controller, GatewayError, MemoryGateway};
use kardex_types::{CategorySelection, FilterOptions, TagId, TemplateId};

fn setup() -> (Arc<MemoryGateway>, Controller) {
    let gateway = Arc::new(MemoryGateway::new());
    let controller = Controller::new(gateway.clone());
    (gateway, controller)
}

#[tokio::test]
async fn test_bootstrap_seeds_empty_store_once() {
    let (gateway, controller) = setup();
    controller.bootstrap().await.unwrap();
    controller.bootstrap().await.unwrap();

    assert_eq!(gateway.call_count("seed_sample_data"), 1);
    let templates = controller.templates().await.unwrap();
    assert_eq!(templates.len(), 30);
}

#[tokio::test]
async fn test_bootstrap_keeps_existing_data() {
    let (gateway, controller) = setup();
    gateway.import_templates(kardex_core::sample::sample_templates()[..3].to_vec());
    controller.bootstrap().await.unwrap();

    assert_eq!(gateway.call_count("seed_sample_data"), 0);
    assert_eq!(controller.templates().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_save_is_visible_after_refetch() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();
    let before = controller.templates().await.unwrap();

    let mut template = before[0].clone();
    template.title = "原发性高血压病历模板".to_string();
    controller.save_template(template).await.unwrap();

    let after = controller.templates().await.unwrap();
    assert_eq!(after[0].title, "原发性高血压病历模板");
    let by_id = controller
        .template(&TemplateId::new("1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.title, "原发性高血压病历模板");
}

#[tokio::test]
async fn test_delete_clears_selection_and_by_id_entry() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();
    let id = TemplateId::new("5");
    controller.select_template(Some(id.clone()));

    controller.delete_template(&id).await.unwrap();

    assert_eq!(controller.selected(), None);
    assert_eq!(controller.template(&id).await.unwrap(), None);
    let templates = controller.templates().await.unwrap();
    assert!(templates.iter().all(|t| t.id != id));
}

#[tokio::test(start_paused = true)]
async fn test_failed_mutation_leaves_cache_untouched() {
    let (gateway, controller) = setup();
    controller.bootstrap().await.unwrap();
    let before = controller.templates().await.unwrap();
    let lists_before = gateway.call_count("list_templates");

    gateway.inject_failure(GatewayError::Transport("connection reset".into()));
    gateway.inject_failure(GatewayError::Transport("connection reset".into()));
    let result = controller.toggle_favorite(&TemplateId::new("2")).await;

    assert!(matches!(result, Err(GatewayError::Transport(_))));
    assert_eq!(gateway.call_count("toggle_favorite"), 2);

    // Entry was never invalidated, so this read is served from cache
    let after = controller.templates().await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(gateway.call_count("list_templates"), lists_before);
    assert!(!after[1].is_favorite);
}

#[tokio::test(start_paused = true)]
async fn test_transient_write_failure_recovers_on_retry() {
    let (gateway, controller) = setup();
    controller.bootstrap().await.unwrap();

    gateway.inject_failure(GatewayError::Transport("timeout".into()));
    let flipped = controller
        .toggle_favorite(&TemplateId::new("2"))
        .await
        .unwrap();

    assert!(flipped);
    assert_eq!(gateway.call_count("toggle_favorite"), 2);
    let after = controller.templates().await.unwrap();
    assert!(after[1].is_favorite);
}

#[tokio::test]
async fn test_concurrent_reads_share_one_fetch() {
    let (gateway, controller) = setup();
    controller.bootstrap().await.unwrap();
    let lists_before = gateway.call_count("list_templates");

    let (a, b, c) = tokio::join!(
        controller.templates(),
        controller.templates(),
        controller.templates()
    );

    assert_eq!(gateway.call_count("list_templates"), lists_before + 1);
    let a = a.unwrap();
    assert!(Arc::ptr_eq(&a, &b.unwrap()));
    assert!(Arc::ptr_eq(&a, &c.unwrap()));
}

#[tokio::test]
async fn test_select_category_picks_first_visible() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();

    controller
        .select_category(CategorySelection::Value("心血管疾病".to_string()))
        .await
        .unwrap();

    assert_eq!(controller.selected(), Some(TemplateId::new("1")));
    let visible = controller.visible().await.unwrap();
    let ids: Vec<&str> = visible.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_category_change_always_resets_selection() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();
    controller.select_template(Some(TemplateId::new("3")));

    controller
        .select_category(CategorySelection::Value("心血管疾病".to_string()))
        .await
        .unwrap();

    // Even a still-visible selection moves to the first visible template
    assert_eq!(controller.selected(), Some(TemplateId::new("1")));
}

#[tokio::test]
async fn test_empty_visible_set_clears_selection() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();
    controller.select_template(Some(TemplateId::new("2")));
    controller.set_filter_options(FilterOptions {
        is_favorite: true,
        ..Default::default()
    });

    // No favorites among the endocrine templates
    controller
        .select_category(CategorySelection::Value("内分泌疾病".to_string()))
        .await
        .unwrap();

    assert!(controller.visible().await.unwrap().is_empty());
    assert_eq!(controller.selected(), None);
}

#[tokio::test]
async fn test_phonetic_keyword_narrows_visible_set() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();
    controller.set_search_keyword("gaoxueya");

    // Title hit on id 1 plus section-content hits on ids 3 and 15
    let visible = controller.visible().await.unwrap();
    let ids: Vec<&str> = visible.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3", "15"]);
}

#[tokio::test]
async fn test_tag_filter_keeps_any_match() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();
    controller.set_filter_options(FilterOptions {
        tags: vec![TagId::new("儿科"), TagId::new("骨科")],
        ..Default::default()
    });

    let visible = controller.visible().await.unwrap();
    let ids: Vec<&str> = visible.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["6", "8", "26"]);
}

#[tokio::test]
async fn test_remote_search_is_cached_per_keyword() {
    let (gateway, controller) = setup();
    controller.bootstrap().await.unwrap();

    let first = controller.search_remote("tangniaobing").await.unwrap();
    let second = controller.search_remote("tangniaobing").await.unwrap();
    assert_eq!(gateway.call_count("search_templates"), 1);
    assert_eq!(first.len(), 1);
    assert!(Arc::ptr_eq(&first, &second));

    controller.search_remote("gxy").await.unwrap();
    assert_eq!(gateway.call_count("search_templates"), 2);
}

#[tokio::test]
async fn test_blank_remote_search_never_calls_gateway() {
    let (gateway, controller) = setup();
    controller.bootstrap().await.unwrap();

    let hits = controller.search_remote("   ").await.unwrap();
    assert!(hits.is_empty());
    assert_eq!(gateway.call_count("search_templates"), 0);
}

#[tokio::test]
async fn test_facet_buckets_follow_collection_order() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();

    let buckets = controller
        .facet_buckets(kardex_types::FacetKind::Disease)
        .await
        .unwrap();
    assert_eq!(buckets[0].value, "心血管疾病");
    assert_eq!(buckets[0].count, 2);
}

#[tokio::test]
async fn test_mutation_refreshes_facet_counts() {
    let (_, controller) = setup();
    controller.bootstrap().await.unwrap();
    let before = controller.diseases().await.unwrap();
    let cardio_before = before
        .iter()
        .find(|d| d.name == "心血管疾病")
        .map(|d| d.template_count)
        .unwrap();

    let mut template = controller.templates().await.unwrap()[4].clone();
    template.disease = "心血管疾病".to_string();
    controller.save_template(template).await.unwrap();

    let after = controller.diseases().await.unwrap();
    let cardio_after = after
        .iter()
        .find(|d| d.name == "心血管疾病")
        .map(|d| d.template_count)
        .unwrap();
    assert_eq!(cardio_after, cardio_before + 1);
}
