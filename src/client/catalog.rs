use std::borrow::Cow;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::RockAutoClient;
use crate::cache::generate_key;
use crate::error::{ClientError, Result};
use crate::extract::absolute_url;
use crate::models::{
    PartInfo, VehicleEngines, VehicleMakes, VehicleModels, VehiclePartCategories,
    VehiclePartsResult, VehicleYears,
};
use crate::pages::catalog::{
    catalog_url, parse_categories, parse_category_parts, parse_engines, parse_makes,
    parse_models, parse_more_info_video, parse_subcategory_parts, parse_years, subcategory_name,
};
use crate::session::Transport;

const NAVCHILDREN: &str = "navchildren[]";

/// `navnode_fetch` payload for one node of a vehicle's catalog tree.
fn navnode_payload(carcode: &str, nodetype: &str, depth: u8, groupname: Option<&str>) -> Value {
    let mut jsn = json!({
        "carcode": carcode,
        "tab": "catalog",
        "idepth": depth,
        "nodetype": nodetype,
        "jsdata": {
            "markets": [{"c": "US"}, {"c": "CA"}],
            "mktlist": "US,CA",
            "Show": 1,
        },
    });
    if let Some(groupname) = groupname {
        jsn["groupname"] = Value::from(groupname);
    }
    json!({ "jsn": jsn })
}

/// Display form of a category group name: `brake+%26+wheel+hub` → `brake & wheel hub`.
fn group_label(group_name: &str) -> String {
    let spaced = group_name.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .unwrap_or(spaced)
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ClientError::validation(format!("{what} cannot be empty")))
    } else {
        Ok(())
    }
}

impl<T: Transport> RockAutoClient<T> {
    pub async fn makes(&self) -> Result<VehicleMakes> {
        info!("Fetching vehicle makes");
        let page = self.session.get(&catalog_url(None, None, None)).await?;
        let makes = parse_makes(&page.body);
        info!("Found {} makes", makes.len());
        Ok(VehicleMakes { makes })
    }

    pub async fn years(&self, make: &str) -> Result<VehicleYears> {
        require(make, "Make")?;
        info!("Fetching years for {}", make);
        let page = self.session.get(&catalog_url(Some(make), None, None)).await?;
        let years = parse_years(&page.body, make);
        info!("Found {} years for {}", years.len(), make);
        Ok(VehicleYears {
            make: make.to_uppercase(),
            years,
        })
    }

    pub async fn models(&self, make: &str, year: i32) -> Result<VehicleModels> {
        require(make, "Make")?;
        info!("Fetching models for {} {}", year, make);
        let page = self
            .session
            .get(&catalog_url(Some(make), Some(year), None))
            .await?;
        let models = parse_models(&page.body, make, year);
        info!("Found {} models for {} {}", models.len(), year, make);
        Ok(VehicleModels {
            make: make.to_uppercase(),
            year,
            models,
        })
    }

    pub async fn engines(&self, make: &str, year: i32, model: &str) -> Result<VehicleEngines> {
        require(make, "Make")?;
        require(model, "Model")?;
        info!("Fetching engines for {} {} {}", year, make, model);
        let page = self
            .session
            .get(&catalog_url(Some(make), Some(year), Some(model)))
            .await?;
        let engines = parse_engines(&page.body, make, year, model);
        info!("Found {} engines", engines.len());
        Ok(VehicleEngines {
            make: make.to_uppercase(),
            year,
            model: model.to_uppercase(),
            engines,
        })
    }

    pub async fn part_categories(
        &self,
        make: &str,
        year: i32,
        model: &str,
        carcode: &str,
    ) -> Result<VehiclePartCategories> {
        require(carcode, "Carcode")?;
        info!("Fetching part categories for carcode {}", carcode);

        let _ = self
            .prime_navigation(&catalog_url(Some(make), Some(year), Some(model)))
            .await;

        let payload = navnode_payload(carcode, "carcode", 3, None);
        let response = self.session.api_request("navnode_fetch", &payload).await?;
        let categories = response
            .section(NAVCHILDREN)
            .map(parse_categories)
            .unwrap_or_default();

        info!("Found {} categories", categories.len());
        Ok(VehiclePartCategories {
            make: make.to_uppercase(),
            year,
            model: model.to_uppercase(),
            carcode: carcode.to_string(),
            categories,
        })
    }

    /// Parts of one category, served from the result cache when possible.
    ///
    /// Listings that carry a part number are also written to the static
    /// cache. Nothing is cached when the request fails.
    pub async fn parts_by_category(
        &self,
        make: &str,
        year: i32,
        model: &str,
        carcode: &str,
        group_name: &str,
    ) -> Result<VehiclePartsResult> {
        require(carcode, "Carcode")?;
        require(group_name, "Category")?;

        let category = group_label(group_name);
        let key = generate_key(make, model, year, Some(carcode), Some(&category));
        let cached = if self.cache_enabled() {
            self.cache().result(&key)
        } else {
            None
        };
        if let Some(hit) = cached {
            debug!("Result cache hit for {}", key);
            return Ok(hit);
        }

        info!("Fetching {} parts for carcode {}", category, carcode);

        let page_url = catalog_url(Some(make), Some(year), Some(model));
        let _ = self.prime_navigation(&page_url).await;

        let payload = navnode_payload(carcode, "groupname", 5, Some(&category));
        let response = self.session.api_request("navnode_fetch", &payload).await?;
        let parts = response
            .section(NAVCHILDREN)
            .map(parse_category_parts)
            .unwrap_or_default();

        let result = VehiclePartsResult {
            make: make.to_uppercase(),
            year,
            model: model.to_uppercase(),
            carcode: carcode.to_string(),
            category,
            parts,
        };

        if self.cache_enabled() {
            let mut cache = self.cache();
            cache.store_parts(&result.parts, Some(&page_url));
            cache.put_result(&key, result.clone());
        }

        info!("Found {} parts", result.count());
        Ok(result)
    }

    /// Individual listings of a subcategory page, with video links looked up
    /// on each part's more-info page.
    pub async fn parts_from_subcategory(
        &self,
        make: &str,
        year: i32,
        model: &str,
        carcode: &str,
        subcategory_url: &str,
    ) -> Result<VehiclePartsResult> {
        let url = absolute_url(subcategory_url)
            .ok_or_else(|| ClientError::validation("Subcategory URL cannot be empty"))?;
        info!("Fetching subcategory listing {}", url);

        let page = self.session.get(&url).await?;
        let mut parts = parse_subcategory_parts(&page.body);
        for part in &mut parts {
            if part.video_url.is_none() {
                part.video_url = self.more_info_video(part).await;
            }
        }

        if self.cache_enabled() {
            self.cache().store_parts(&parts, Some(&url));
        }

        info!("Found {} parts in subcategory", parts.len());
        Ok(VehiclePartsResult {
            make: make.to_uppercase(),
            year,
            model: model.to_uppercase(),
            carcode: carcode.to_string(),
            category: subcategory_name(subcategory_url),
            parts,
        })
    }

    async fn more_info_video(&self, part: &PartInfo) -> Option<String> {
        let info_url = part.info_url.as_deref()?;
        match self.session.get(info_url).await {
            Ok(page) => parse_more_info_video(&page.body),
            Err(e) => {
                warn!("Could not load more-info page for {}: {}", part.name, e);
                None
            }
        }
    }
}
