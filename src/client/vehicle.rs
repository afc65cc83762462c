use std::fmt;

use tracing::info;

use super::RockAutoClient;
use crate::error::{ClientError, Result};
use crate::models::{Engine, VehiclePartCategories, VehiclePartsResult};
use crate::session::{ReqwestTransport, Transport};

/// One resolved vehicle and engine, borrowing the client that found it.
///
/// Make and model are stored upper-cased.
pub struct Vehicle<'a, T: Transport = ReqwestTransport> {
    client: &'a RockAutoClient<T>,
    make: String,
    year: i32,
    model: String,
    engine: Engine,
}

impl<'a, T: Transport> Vehicle<'a, T> {
    pub fn new(client: &'a RockAutoClient<T>, make: &str, year: i32, model: &str, engine: Engine) -> Self {
        Self {
            client,
            make: make.trim().to_uppercase(),
            year,
            model: model.trim().to_uppercase(),
            engine,
        }
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn carcode(&self) -> &str {
        &self.engine.carcode
    }

    pub async fn part_categories(&self) -> Result<VehiclePartCategories> {
        self.client
            .part_categories(&self.make, self.year, &self.model, self.carcode())
            .await
    }

    pub async fn parts_by_category(&self, group_name: &str) -> Result<VehiclePartsResult> {
        self.client
            .parts_by_category(&self.make, self.year, &self.model, self.carcode(), group_name)
            .await
    }

    pub async fn parts_from_subcategory(&self, subcategory_url: &str) -> Result<VehiclePartsResult> {
        self.client
            .parts_from_subcategory(&self.make, self.year, &self.model, self.carcode(), subcategory_url)
            .await
    }
}

impl<T: Transport> fmt::Display for Vehicle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.year, self.make, self.model, self.engine.description
        )
    }
}

impl<T: Transport> fmt::Debug for Vehicle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vehicle")
            .field("make", &self.make)
            .field("year", &self.year)
            .field("model", &self.model)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RockAutoClient<T> {
    /// Resolves the engines of a make/year/model and binds the one at
    /// `engine_index`.
    pub async fn vehicle(
        &self,
        make: &str,
        year: i32,
        model: &str,
        engine_index: usize,
    ) -> Result<Vehicle<'_, T>> {
        let engines = self.engines(make, year, model).await?;
        if engines.engines.is_empty() {
            return Err(ClientError::validation(format!(
                "No engines found for {year} {make} {model}"
            )));
        }
        let available = engines.count();
        let engine = engines
            .engines
            .into_iter()
            .nth(engine_index)
            .ok_or_else(|| {
                ClientError::validation(format!(
                    "Engine index {engine_index} out of range, {available} engines available"
                ))
            })?;

        info!("Selected engine {} ({})", engine.description, engine.carcode);
        Ok(Vehicle::new(self, make, year, model, engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{PageTransport, client};

    const MODEL_PAGE: &str = r#"
        <a href="/en/catalog/honda,2020,civic,1.5l+l4+turbocharged,3444432">1.5L</a>
        <a href="/en/catalog/honda,2020,civic,2.0l+l4,3444431">2.0L</a>
    "#;

    #[tokio::test]
    async fn picks_engine_by_index() {
        let client = client(PageTransport::default().with("/en/catalog/honda,2020,civic", MODEL_PAGE));

        let vehicle = client.vehicle("honda", 2020, "civic", 1).await.unwrap();
        assert_eq!(vehicle.make(), "HONDA");
        assert_eq!(vehicle.model(), "CIVIC");
        assert_eq!(vehicle.carcode(), "3444431");
        assert_eq!(vehicle.to_string(), "2020 HONDA CIVIC (2.0l l4)");
    }

    #[tokio::test]
    async fn index_out_of_range() {
        let client = client(PageTransport::default().with("/en/catalog/honda,2020,civic", MODEL_PAGE));
        let err = client.vehicle("honda", 2020, "civic", 2).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn scoped_calls_use_the_bound_carcode() {
        let transport = PageTransport::default()
            .with("/en/catalog/honda,2020,civic", MODEL_PAGE)
            .with(
                "navnode_fetch",
                r#"{"html_fill_sections":{"navchildren[]":"<a href='/a'>Engine</a>"}}"#,
            );
        let client = client(transport);

        let vehicle = client.vehicle("Honda", 2020, "Civic", 0).await.unwrap();
        let categories = vehicle.part_categories().await.unwrap();
        assert_eq!(categories.carcode, "3444432");
        assert_eq!(categories.count(), 1);
    }
}
