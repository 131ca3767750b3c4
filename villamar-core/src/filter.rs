use crate::content::{
    blocks_to_plain_text, CompletionStatus, Lifestyle, MarketType, Project, Property,
    PropertyCategory,
};

/// Facet selection over a loaded property collection.
///
/// Every facet left at `None` (or empty, for the set facets) imposes no
/// constraint; active facets combine as an AND conjunction. Applying a filter
/// never reorders the source collection.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub market_type: Option<MarketType>,
    pub category: Option<PropertyCategory>,
    pub lifestyle: Option<Lifestyle>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_area: Option<u32>,
    pub max_area: Option<u32>,
    pub min_bedrooms: Option<u32>,
    pub amenities: Vec<String>,
    pub status: Option<CompletionStatus>,
    pub locations: Vec<String>,
    pub query: Option<String>,
}

impl PropertyFilter {
    pub fn is_empty(&self) -> bool {
        self.market_type.is_none()
            && self.category.is_none()
            && self.lifestyle.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_area.is_none()
            && self.max_area.is_none()
            && self.min_bedrooms.is_none()
            && self.amenities.is_empty()
            && self.status.is_none()
            && self.locations.is_empty()
            && !self.has_query()
    }

    fn has_query(&self) -> bool {
        self.query
            .as_deref()
            .is_some_and(|q| !q.trim().is_empty())
    }

    pub fn matches(&self, property: &Property) -> bool {
        if let Some(market) = self.market_type {
            if property.market_type != Some(market) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if property.category != Some(category) {
                return false;
            }
        }
        if let Some(lifestyle) = self.lifestyle {
            if property.lifestyle != Some(lifestyle) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if property.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if property.price > max {
                return false;
            }
        }
        if let Some(min) = self.min_area {
            if property.area < min {
                return false;
            }
        }
        if let Some(max) = self.max_area {
            if property.area > max {
                return false;
            }
        }
        if let Some(min) = self.min_bedrooms {
            if property.bedrooms < min {
                return false;
            }
        }
        if !self.amenities.is_empty() {
            let have: Vec<String> = property
                .amenities
                .iter()
                .map(|a| a.to_lowercase())
                .collect();
            let all_present = self
                .amenities
                .iter()
                .all(|want| have.iter().any(|a| *a == want.to_lowercase()));
            if !all_present {
                return false;
            }
        }
        if let Some(status) = self.status {
            // Completion status derives from the market: off-plan listings are
            // under construction, everything else is ready stock.
            let listing_status = match property.market_type {
                Some(MarketType::OffPlan) => CompletionStatus::UnderConstruction,
                _ => CompletionStatus::Ready,
            };
            if listing_status != status {
                return false;
            }
        }
        if !self.locations.is_empty() {
            let location = property.location.to_lowercase();
            let any_match = self
                .locations
                .iter()
                .any(|wanted| location.contains(&wanted.to_lowercase()));
            if !any_match {
                return false;
            }
        }
        if self.has_query() {
            let query = self.query.as_deref().unwrap_or_default().to_lowercase();
            if !property_text_match(property, &query) {
                return false;
            }
        }
        true
    }

    /// Narrow `source` to the matching subset, preserving source order.
    pub fn apply<'a>(&self, source: &'a [Property]) -> Vec<&'a Property> {
        source.iter().filter(|p| self.matches(p)).collect()
    }
}

fn property_text_match(property: &Property, query: &str) -> bool {
    if property.title.to_lowercase().contains(query) {
        return true;
    }
    if let Some(excerpt) = &property.excerpt {
        if excerpt.to_lowercase().contains(query) {
            return true;
        }
    }
    if let Some(category) = property.category {
        if category.label().to_lowercase().contains(query) {
            return true;
        }
    }
    false
}

/// Facet selection over a loaded project collection. Same conjunction and
/// ordering rules as [`PropertyFilter`].
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<CompletionStatus>,
    pub developer: Option<String>,
    pub locations: Vec<String>,
    pub query: Option<String>,
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.developer.is_none()
            && self.locations.is_empty()
            && !self.has_query()
    }

    fn has_query(&self) -> bool {
        self.query
            .as_deref()
            .is_some_and(|q| !q.trim().is_empty())
    }

    pub fn matches(&self, project: &Project) -> bool {
        if let Some(status) = self.status {
            if project.completion_status != Some(status) {
                return false;
            }
        }
        if let Some(developer) = &self.developer {
            let matched = project
                .developer
                .as_ref()
                .is_some_and(|d| d.slug.current == *developer);
            if !matched {
                return false;
            }
        }
        if !self.locations.is_empty() {
            let location = project.location.to_lowercase();
            let any_match = self
                .locations
                .iter()
                .any(|wanted| location.contains(&wanted.to_lowercase()));
            if !any_match {
                return false;
            }
        }
        if self.has_query() {
            let query = self.query.as_deref().unwrap_or_default().to_lowercase();
            if !project_text_match(project, &query) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, source: &'a [Project]) -> Vec<&'a Project> {
        source.iter().filter(|p| self.matches(p)).collect()
    }
}

fn project_text_match(project: &Project, query: &str) -> bool {
    if project.name.to_lowercase().contains(query) {
        return true;
    }
    if let Some(excerpt) = &project.excerpt {
        if excerpt.to_lowercase().contains(query) {
            return true;
        }
    }
    if project.location.to_lowercase().contains(query) {
        return true;
    }
    blocks_to_plain_text(&project.description)
        .to_lowercase()
        .contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Slug;

    fn property(id: &str, title: &str, market: Option<MarketType>) -> Property {
        Property {
            id: id.to_string(),
            title: title.to_string(),
            slug: Slug::new(id),
            location: "Palm Jumeirah, Dubai".to_string(),
            price: 5_000_000,
            bedrooms: 3,
            bathrooms: 3,
            area: 2_400,
            category: Some(PropertyCategory::Villa),
            market_type: market,
            status: None,
            excerpt: Some("Private beach access".to_string()),
            main_image: None,
            gallery: vec![],
            description: vec![],
            amenities: vec!["Pool".to_string(), "Gym".to_string()],
            lifestyle: Some(Lifestyle::Beachfront),
            featured: false,
            project: None,
            developer: None,
            neighborhood: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn sample_set() -> Vec<Property> {
        vec![
            property("p1", "Palm Villa One", Some(MarketType::Buy)),
            property("p2", "Marina Apartment", Some(MarketType::Buy)),
            property("p3", "Downtown Loft", Some(MarketType::Rent)),
            property("p4", "Creek Tower Residence", Some(MarketType::OffPlan)),
            property("p5", "Hills Mansion", Some(MarketType::Rent)),
        ]
    }

    #[test]
    fn test_market_type_facet_preserves_order() {
        // Five market types [buy, buy, rent, off-plan, rent]: rent selects the
        // items at original indices 2 and 4, in that order.
        let source = sample_set();
        let filter = PropertyFilter {
            market_type: Some(MarketType::Rent),
            ..Default::default()
        };
        let result = filter.apply(&source);
        let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p5"]);
    }

    #[test]
    fn test_empty_filter_returns_source_unchanged() {
        let source = sample_set();
        let filter = PropertyFilter::default();
        assert!(filter.is_empty());
        let result = filter.apply(&source);
        assert_eq!(result.len(), source.len());
        for (kept, original) in result.iter().zip(source.iter()) {
            assert_eq!(kept.id, original.id);
        }
    }

    #[test]
    fn test_filtered_is_subset_of_source() {
        let source = sample_set();
        let filter = PropertyFilter {
            min_price: Some(1),
            max_price: Some(10_000_000),
            min_bedrooms: Some(2),
            ..Default::default()
        };
        let result = filter.apply(&source);
        for item in &result {
            assert!(source.iter().any(|p| p.id == item.id));
        }
    }

    #[test]
    fn test_conjunction_requires_every_active_facet() {
        let source = sample_set();
        let filter = PropertyFilter {
            market_type: Some(MarketType::Buy),
            min_price: Some(6_000_000),
            ..Default::default()
        };
        // Both buy listings are priced at 5M, below the floor.
        assert!(filter.apply(&source).is_empty());

        let filter = PropertyFilter {
            market_type: Some(MarketType::Buy),
            min_price: Some(4_000_000),
            ..Default::default()
        };
        assert_eq!(filter.apply(&source).len(), 2);
    }

    #[test]
    fn test_text_search_is_case_insensitive() {
        let source = sample_set();
        let upper = PropertyFilter {
            query: Some("Villa".to_string()),
            ..Default::default()
        };
        let lower = PropertyFilter {
            query: Some("villa".to_string()),
            ..Default::default()
        };
        let upper_ids: Vec<&str> = upper.apply(&source).iter().map(|p| p.id.as_str()).collect();
        let lower_ids: Vec<&str> = lower.apply(&source).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(upper_ids, lower_ids);
        // Every sample listing is categorized Villa, so all five match.
        assert_eq!(upper_ids.len(), 5);
    }

    #[test]
    fn test_text_search_covers_title_excerpt_and_category() {
        let mut source = sample_set();
        source[2].excerpt = Some("Steps from the metro".to_string());
        source[2].category = Some(PropertyCategory::Apartment);

        let by_title = PropertyFilter {
            query: Some("loft".to_string()),
            ..Default::default()
        };
        assert_eq!(by_title.apply(&source).len(), 1);

        let by_excerpt = PropertyFilter {
            query: Some("METRO".to_string()),
            ..Default::default()
        };
        assert_eq!(by_excerpt.apply(&source).len(), 1);

        let by_category = PropertyFilter {
            query: Some("apartment".to_string()),
            ..Default::default()
        };
        // Matches the retitled p3 by category and p2 by title.
        assert_eq!(by_category.apply(&source).len(), 2);
    }

    #[test]
    fn test_blank_query_is_no_constraint() {
        let source = sample_set();
        let filter = PropertyFilter {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&source).len(), source.len());
    }

    #[test]
    fn test_amenity_set_requires_all_selected() {
        let mut source = sample_set();
        source[0].amenities = vec!["Pool".to_string()];
        let filter = PropertyFilter {
            amenities: vec!["pool".to_string(), "gym".to_string()],
            ..Default::default()
        };
        let ids: Vec<&str> = filter.apply(&source).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3", "p4", "p5"]);
    }

    #[test]
    fn test_empty_source_yields_empty_result() {
        let filter = PropertyFilter {
            market_type: Some(MarketType::Buy),
            ..Default::default()
        };
        assert!(filter.apply(&[]).is_empty());
    }

    #[test]
    fn test_completion_status_derived_from_market() {
        let source = sample_set();
        let filter = PropertyFilter {
            status: Some(CompletionStatus::UnderConstruction),
            ..Default::default()
        };
        let ids: Vec<&str> = filter.apply(&source).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p4"]);
    }

    #[test]
    fn test_project_filter_by_developer_and_status() {
        use crate::content::{DocLink, Project};
        let project = |id: &str, dev: &str, status: Option<CompletionStatus>| Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            slug: Slug::new(id),
            location: "Dubai Creek Harbour".to_string(),
            developer: Some(DocLink {
                name: dev.to_string(),
                slug: Slug::new(dev),
            }),
            main_image: None,
            gallery: vec![],
            completion_date: None,
            completion_status: status,
            excerpt: None,
            description: vec![],
            features: vec![],
            coordinates: None,
            property_count: 0,
            updated_at: None,
        };
        let source = vec![
            project("a", "emaar", Some(CompletionStatus::Ready)),
            project("b", "meraas", Some(CompletionStatus::UnderConstruction)),
            project("c", "emaar", Some(CompletionStatus::UnderConstruction)),
        ];
        let filter = ProjectFilter {
            developer: Some("emaar".to_string()),
            status: Some(CompletionStatus::UnderConstruction),
            ..Default::default()
        };
        let ids: Vec<&str> = filter.apply(&source).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }
}
