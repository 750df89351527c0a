//! Faceted filter engine
//!
//! Computes the visible template subset as a pure function of the template
//! collection and the current search state. Stages apply in a fixed order,
//! each narrowing the previous result; the output preserves input order.

use crate::pinyin::matches;
use kardex_types::{CategorySelection, FacetKind, FilterOptions, Template};

/// The complete search state driving the visible set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchState {
    /// Active category view
    pub view: FacetKind,

    /// Selected category inside the view
    pub category: CategorySelection,

    /// Multi-select filter options
    pub filter: FilterOptions,

    /// Search keyword, matched natively and phonetically
    pub keyword: String,
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState {
            view: FacetKind::Disease,
            category: CategorySelection::All,
            filter: FilterOptions::default(),
            keyword: String::new(),
        }
    }
}

/// The order-preserving visible subsequence of `templates` under `state`
///
/// Stage order: keyword, category, favorite, multi-select disease/type,
/// tag intersection. Stages 3-5 are independent AND filters and compose
/// with the category stage rather than replacing it.
pub fn visible(templates: &[Template], state: &SearchState) -> Vec<Template> {
    let mut result: Vec<&Template> = templates.iter().collect();

    let keyword = state.keyword.trim();
    if !keyword.is_empty() {
        result.retain(|template| {
            matches(&template.title, keyword)
                || template
                    .sections
                    .iter()
                    .any(|s| matches(&s.title, keyword) || matches(&s.content, keyword))
        });
    }

    if let CategorySelection::Value(category) = &state.category {
        result.retain(|template| match state.view {
            FacetKind::Disease => template.disease == *category,
            FacetKind::TemplateType => template.template_type == *category,
            FacetKind::Tag => template.tags.iter().any(|tag| tag.as_str() == category),
        });
    }

    if state.filter.is_favorite {
        result.retain(|template| template.is_favorite);
    }

    if !state.filter.diseases.is_empty() {
        result.retain(|template| state.filter.diseases.contains(&template.disease));
    }

    if !state.filter.template_types.is_empty() {
        result.retain(|template| state.filter.template_types.contains(&template.template_type));
    }

    if !state.filter.tags.is_empty() {
        // OR semantics: any shared tag keeps the template
        result.retain(|template| template.tags.iter().any(|tag| state.filter.tags.contains(tag)));
    }

    result.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_templates;
    use kardex_types::TagId;

    fn ids(templates: &[Template]) -> Vec<&str> {
        templates.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_default_state_keeps_everything() {
        let templates = sample_templates();
        let result = visible(&templates, &SearchState::default());
        assert_eq!(result.len(), templates.len());
        assert_eq!(ids(&result), ids(&templates));
    }

    #[test]
    fn test_phonetic_keyword_stage() {
        let templates = sample_templates();
        let state = SearchState {
            keyword: "gaoxueya".to_string(),
            ..Default::default()
        };

        // Id 1 matches on its title; 3 and 15 carry 高血压 in their
        // history sections, which the keyword stage also searches
        let result = visible(&templates, &state);
        assert_eq!(ids(&result), vec!["1", "3", "15"]);
    }

    #[test]
    fn test_keyword_title_only_fixture() {
        let mut only_titles = sample_templates()[..2].to_vec();
        for template in &mut only_titles {
            template.sections.clear();
        }

        let state = SearchState {
            keyword: "gaoxueya".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&visible(&only_titles, &state)), vec!["1"]);
    }

    #[test]
    fn test_whitespace_keyword_is_skipped() {
        let templates = sample_templates();
        let state = SearchState {
            keyword: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(visible(&templates, &state).len(), templates.len());
    }

    #[test]
    fn test_keyword_searches_section_content() {
        let templates = sample_templates();
        let state = SearchState {
            // Section content of id 3, not in any title
            keyword: "胸骨后压榨性疼痛".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&visible(&templates, &state)), vec!["3"]);
    }

    #[test]
    fn test_category_and_favorite_compose() {
        let templates = sample_templates();
        let state = SearchState {
            view: FacetKind::Disease,
            category: CategorySelection::Value("心血管疾病".to_string()),
            filter: FilterOptions {
                is_favorite: true,
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(ids(&visible(&templates, &state)), vec!["1", "3"]);
    }

    #[test]
    fn test_tag_view_category() {
        let templates = sample_templates();
        let state = SearchState {
            view: FacetKind::Tag,
            category: CategorySelection::Value("外科手术".to_string()),
            ..Default::default()
        };

        assert_eq!(ids(&visible(&templates, &state)), vec!["6", "9"]);
    }

    #[test]
    fn test_tag_filter_or_semantics() {
        let templates = sample_templates();
        let state = SearchState {
            filter: FilterOptions {
                tags: vec![TagId::new("儿科"), TagId::new("骨科")],
                ..Default::default()
            },
            ..Default::default()
        };

        // Any shared tag keeps the template
        assert_eq!(ids(&visible(&templates, &state)), vec!["6", "8", "26"]);
    }

    #[test]
    fn test_idempotent() {
        let templates = sample_templates();
        let state = SearchState {
            view: FacetKind::TemplateType,
            category: CategorySelection::Value("急诊病历".to_string()),
            keyword: "bingli".to_string(),
            ..Default::default()
        };

        let once = visible(&templates, &state);
        let twice = visible(&once, &state);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extra_filter_narrows_monotonically() {
        let templates = sample_templates();
        let base = SearchState {
            view: FacetKind::Disease,
            category: CategorySelection::Value("呼吸系统疾病".to_string()),
            ..Default::default()
        };
        let narrowed = SearchState {
            filter: FilterOptions {
                template_types: vec!["住院病历".to_string()],
                ..Default::default()
            },
            ..base.clone()
        };

        let wide = visible(&templates, &base);
        let narrow = visible(&templates, &narrowed);
        assert!(narrow.len() <= wide.len());
        assert!(narrow.iter().all(|t| wide.contains(t)));
    }

    #[test]
    fn test_order_preserved() {
        let templates = sample_templates();
        let state = SearchState {
            filter: FilterOptions {
                is_favorite: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let result = visible(&templates, &state);
        let positions: Vec<usize> = result
            .iter()
            .map(|t| templates.iter().position(|u| u.id == t.id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
