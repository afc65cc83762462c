use chrono::Utc;
use tracing::{debug, info};

use super::RockAutoClient;
use crate::config::PARTSEARCH_URL;
use crate::error::{ClientError, Result};
use crate::models::{
    PartSearchFilters, PartSearchResult, SearchDropdown, SearchOptions, WhatIsPartCalledResults,
};
use crate::pages::page_input;
use crate::pages::search::{parse_dropdown, parse_search_results, parse_what_is_called};
use crate::session::{RequestKind, Transport};

/// A filter of `None`, empty or `"All"` leaves the dropdown unset.
fn is_active(filter: Option<&str>) -> Option<&str> {
    filter
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("all"))
}

impl<T: Transport> RockAutoClient<T> {
    pub async fn manufacturers(&self, use_cache: bool) -> Result<SearchOptions> {
        self.search_options(SearchDropdown::Manufacturer, use_cache)
            .await
    }

    pub async fn part_groups(&self, use_cache: bool) -> Result<SearchOptions> {
        self.search_options(SearchDropdown::PartGroup, use_cache)
            .await
    }

    pub async fn part_types(&self, use_cache: bool) -> Result<SearchOptions> {
        self.search_options(SearchDropdown::PartType, use_cache)
            .await
    }

    /// Options of one parts-search dropdown.
    ///
    /// One page load fills every dropdown it carries, so asking for the next
    /// one within the dropdown TTL costs no request.
    async fn search_options(
        &self,
        dropdown: SearchDropdown,
        use_cache: bool,
    ) -> Result<SearchOptions> {
        if use_cache {
            let cached = self.cache().dropdown(dropdown);
            if let Some(options) = cached {
                debug!("Using cached {} options", dropdown);
                return Ok(options);
            }
        }

        info!("Fetching {} options", dropdown);
        let page = self.session.get(PARTSEARCH_URL).await?;
        let now = Utc::now();
        let fetched: Vec<SearchOptions> = SearchDropdown::ALL
            .into_iter()
            .filter_map(|which| {
                parse_dropdown(&page.body, which).map(|options| SearchOptions {
                    dropdown: which,
                    options,
                    last_updated: now,
                })
            })
            .collect();

        let requested = fetched.iter().find(|o| o.dropdown == dropdown).cloned();
        {
            let mut cache = self.cache();
            for options in fetched {
                cache.put_dropdown(options);
            }
        }

        requested.ok_or_else(|| ClientError::UnexpectedResponse {
            url: PARTSEARCH_URL.to_string(),
            message: format!("no {dropdown} dropdown on the page"),
        })
    }

    /// Form value for a filter given by display name; unknown names are ignored.
    async fn filter_value(&self, dropdown: SearchDropdown, name: Option<&str>) -> Result<String> {
        let Some(name) = is_active(name) else {
            return Ok(String::new());
        };
        let options = self.search_options(dropdown, true).await?;
        match options.by_name(name) {
            Some(option) => Ok(option.value.clone()),
            None => {
                debug!("No {} named '{}', searching without it", dropdown, name);
                Ok(String::new())
            }
        }
    }

    async fn search_token(&self) -> Result<String> {
        let page = self.session.get(PARTSEARCH_URL).await?;
        page_input(&page.body, "_nck").ok_or_else(|| ClientError::UnexpectedResponse {
            url: PARTSEARCH_URL.to_string(),
            message: "missing form token".to_string(),
        })
    }

    pub async fn search_parts_by_number(
        &self,
        part_number: &str,
        filters: &PartSearchFilters,
    ) -> Result<PartSearchResult> {
        let part_number = part_number.trim();
        if part_number.is_empty() {
            return Err(ClientError::validation("Part number cannot be empty"));
        }
        info!("Searching parts for '{}'", part_number);

        let token = self.search_token().await?;
        let manufacturer = self
            .filter_value(SearchDropdown::Manufacturer, filters.manufacturer.as_deref())
            .await?;
        let part_group = self
            .filter_value(SearchDropdown::PartGroup, filters.part_group.as_deref())
            .await?;
        let part_type = self
            .filter_value(SearchDropdown::PartType, filters.part_type.as_deref())
            .await?;

        let form: Vec<(String, String)> = [
            ("_nck", token.as_str()),
            ("dopartsearch", "1"),
            ("partsearch[partnum][partsearch_007]", part_number),
            ("partsearch[manufacturer][partsearch_007]", manufacturer.as_str()),
            ("partsearch[partgroup][partsearch_007]", part_group.as_str()),
            ("partsearch[parttype][partsearch_007]", part_type.as_str()),
            (
                "partsearch[partname][partsearch_007]",
                filters.part_name.as_deref().unwrap_or_default(),
            ),
            ("partsearch[do][partsearch_007]", "Search"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let response = self
            .session
            .post(PARTSEARCH_URL, &form, RequestKind::Document, Some(PARTSEARCH_URL))
            .await?;
        let parts = parse_search_results(&response.body);

        if self.cache_enabled() {
            self.cache().store_parts(&parts, Some(PARTSEARCH_URL));
        }

        info!("Part search found {} parts", parts.len());
        Ok(PartSearchResult {
            parts,
            search_term: part_number.to_string(),
            manufacturer: is_active(filters.manufacturer.as_deref())
                .unwrap_or("All")
                .to_string(),
            part_group: is_active(filters.part_group.as_deref())
                .unwrap_or("All")
                .to_string(),
        })
    }

    /// Catalog categories matching a free-text description of a part.
    pub async fn what_is_part_called(&self, query: &str) -> Result<WhatIsPartCalledResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::validation("Search query cannot be empty"));
        }
        info!("Looking up what '{}' is called", query);

        let token = self.search_token().await?;
        let form = vec![
            ("_nck".to_string(), token),
            ("topsearchinput[submit]".to_string(), "1".to_string()),
            ("topsearchinput[input]".to_string(), query.to_string()),
            ("btntabsearch".to_string(), "Search".to_string()),
        ];

        let response = self
            .session
            .post(PARTSEARCH_URL, &form, RequestKind::Document, Some(PARTSEARCH_URL))
            .await?;
        let results = parse_what_is_called(&response.body);

        info!("Found {} matching categories", results.len());
        Ok(WhatIsPartCalledResults {
            results,
            search_term: query.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{PageTransport, client, field};
    use crate::config::CacheUpdate;

    const SEARCH_PAGE: &str = r#"<form>
        <input type="hidden" name="_nck" value="tok-9">
        <select id="manufacturer_partsearch_007">
            <option value="">- All -</option>
            <option value="1234">BOSCH</option>
        </select>
        <select id="partgroup_partsearch_007"><option value="9">Brake &amp; Wheel Hub</option></select>
        <select id="parttype_partsearch_007"><option value="5">Brake Pad</option></select>
    </form>
    <table>
        <tr><th>Manufacturer</th><th>Part Number</th><th>Price</th></tr>
        <tr><td>BOSCH</td><td>3330 Premium Oil Filter</td><td>$7.89</td></tr>
    </table>"#;

    #[tokio::test]
    async fn one_page_load_fills_every_dropdown() {
        let client = client(PageTransport::default().with("/en/partsearch/", SEARCH_PAGE));

        let manufacturers = client.manufacturers(true).await.unwrap();
        assert_eq!(manufacturers.count(), 2);
        let groups = client.part_groups(true).await.unwrap();
        assert_eq!(groups.options[0].value, "9");
        assert_eq!(client.session().transport().count(), 1);

        client.part_types(false).await.unwrap();
        assert_eq!(client.session().transport().count(), 2);

        client.clear_search_option_cache();
        client.part_types(true).await.unwrap();
        assert_eq!(client.session().transport().count(), 3);
    }

    #[tokio::test]
    async fn dropdowns_show_in_stats_and_clear_with_the_cache() {
        let client = client(PageTransport::default().with("/en/partsearch/", SEARCH_PAGE));
        client.manufacturers(true).await.unwrap();
        assert_eq!(client.cache_stats().cached_dropdowns, 3);

        assert_eq!(client.clear_expired_caches().dropdowns, 0);
        assert_eq!(client.cache_stats().cached_dropdowns, 3);

        client
            .configure_cache(&CacheUpdate {
                enabled: Some(false),
                ..CacheUpdate::default()
            })
            .unwrap();
        assert_eq!(client.cache_stats().cached_dropdowns, 0);
    }

    #[tokio::test]
    async fn missing_dropdown_is_unexpected() {
        let client = client(PageTransport::default().with("/en/partsearch/", "<form></form>"));
        let err = client.manufacturers(true).await.unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedResponse { .. }));
    }

    #[tokio::test]
    async fn search_resolves_filters_to_form_values() {
        let client = client(PageTransport::default().with("/en/partsearch/", SEARCH_PAGE));
        let filters = PartSearchFilters {
            manufacturer: Some("bosch".to_string()),
            part_group: Some("All".to_string()),
            part_type: Some("Wiper Blade".to_string()),
            part_name: None,
        };

        let result = client.search_parts_by_number("3330", &filters).await.unwrap();
        assert_eq!(result.count(), 1);
        assert_eq!(result.manufacturer, "bosch");
        assert_eq!(result.part_group, "All");

        let form = client.session().transport().form_of("/en/partsearch/");
        assert_eq!(field(&form, "_nck"), Some("tok-9"));
        assert_eq!(field(&form, "partsearch[manufacturer][partsearch_007]"), Some("1234"));
        assert_eq!(field(&form, "partsearch[partgroup][partsearch_007]"), Some(""));
        assert_eq!(field(&form, "partsearch[parttype][partsearch_007]"), Some(""));
        assert_eq!(field(&form, "partsearch[partnum][partsearch_007]"), Some("3330"));
    }

    #[tokio::test]
    async fn blank_inputs_are_rejected_before_any_request() {
        let client = client(PageTransport::default());
        assert!(matches!(
            client.search_parts_by_number("  ", &PartSearchFilters::default()).await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            client.what_is_part_called("").await,
            Err(ClientError::Validation(_))
        ));
        assert_eq!(client.session().transport().count(), 0);
    }

    #[tokio::test]
    async fn what_is_called_posts_top_search() {
        let page = r#"<input name="_nck" value="t">
            <table><tr><td>Brake &amp; Wheel Hub</td><td>Brake Pad</td></tr></table>"#;
        let client = client(PageTransport::default().with("/en/partsearch/", page));

        let results = client.what_is_part_called("brake pads").await.unwrap();
        assert_eq!(results.count(), 1);
        assert_eq!(results.search_term, "brake pads");

        let form = client.session().transport().form_of("/en/partsearch/");
        assert_eq!(field(&form, "topsearchinput[input]"), Some("brake pads"));
    }
}
