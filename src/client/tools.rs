use tracing::info;

use super::RockAutoClient;
use crate::error::{ClientError, Result};
use crate::models::{ToolCategories, ToolsResult};
use crate::pages::tools::{category_name, parse_tool_categories, parse_tools, path_level, tools_url};
use crate::session::Transport;

impl<T: Transport> RockAutoClient<T> {
    /// Categories one level below `path`; an empty path lists the top level.
    pub async fn tool_categories(&self, path: &str) -> Result<ToolCategories> {
        let path = path.trim().trim_matches('/');
        info!("Fetching tool categories under '{}'", path);

        let page = self.session.get(&tools_url(path)).await?;
        let categories = parse_tool_categories(&page.body, path);

        info!("Found {} tool categories", categories.len());
        Ok(ToolCategories {
            categories,
            level: path_level(path),
            parent_path: path.to_string(),
        })
    }

    pub async fn tools_by_category(&self, path: &str) -> Result<ToolsResult> {
        let path = path.trim().trim_matches('/');
        if path.is_empty() {
            return Err(ClientError::validation("Tool category path cannot be empty"));
        }
        info!("Fetching tools in '{}'", path);

        let url = tools_url(path);
        let page = self.session.get(&url).await?;
        let tools = parse_tools(&page.body);

        if self.cache_enabled() {
            self.cache().store_tools(&tools, Some(&url));
        }

        info!("Found {} tools", tools.len());
        Ok(ToolsResult {
            tools,
            category: category_name(path),
            category_path: path.to_string(),
        })
    }
}
