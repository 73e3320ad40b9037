//! Analytics view fetcher
//!
//! Reads the three precomputed revenue views. Failures are not retried and
//! no partial result is returned.

use crate::config::AppConfig;
use crate::warehouse::{ResultSet, Warehouse};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// One of the precomputed revenue views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsView {
    ByQuarter,
    ByRegion,
    ByProduct,
}

impl AnalyticsView {
    pub fn view_name(&self) -> &'static str {
        match self {
            AnalyticsView::ByQuarter => "V_REVENUE_BY_QUARTER",
            AnalyticsView::ByRegion => "V_REVENUE_BY_REGION",
            AnalyticsView::ByProduct => "V_REVENUE_BY_PRODUCT",
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            AnalyticsView::ByQuarter => "QUARTER",
            AnalyticsView::ByRegion => "QUARTER, REGION",
            AnalyticsView::ByProduct => "QUARTER, PRODUCT",
        }
    }

    /// Human-readable title used by the renderers
    pub fn title(&self) -> &'static str {
        match self {
            AnalyticsView::ByQuarter => "Revenue by Quarter",
            AnalyticsView::ByRegion => "Revenue by Region",
            AnalyticsView::ByProduct => "Revenue by Product",
        }
    }

    pub fn statement(&self, database: &str, schema: &str) -> String {
        format!(
            "SELECT * FROM {}.{}.{} ORDER BY {}",
            database,
            schema,
            self.view_name(),
            self.order_by()
        )
    }
}

/// The three analytic tables fetched for one request
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsTables {
    pub by_quarter: ResultSet,
    pub by_region: ResultSet,
    pub by_product: ResultSet,
}

pub struct AnalyticsFetcher {
    warehouse: Arc<dyn Warehouse>,
    database: String,
    schema: String,
}

impl AnalyticsFetcher {
    pub fn new(warehouse: Arc<dyn Warehouse>, config: &AppConfig) -> Self {
        Self {
            warehouse,
            database: config.db_name.clone(),
            schema: config.schema_name.clone(),
        }
    }

    pub async fn fetch_view(&self, view: AnalyticsView) -> Result<ResultSet> {
        let sql = view.statement(&self.database, &self.schema);
        let rows = self.warehouse.query(&sql).await?;
        debug!(view = view.view_name(), rows = rows.len(), "Fetched analytics view");
        Ok(rows)
    }

    /// Fetch quarter, region and product views in that order
    pub async fn fetch(&self) -> Result<AnalyticsTables> {
        info!(
            database = %self.database,
            schema = %self.schema,
            "Fetching analytics views"
        );

        let by_quarter = self.fetch_view(AnalyticsView::ByQuarter).await?;
        let by_region = self.fetch_view(AnalyticsView::ByRegion).await?;
        let by_product = self.fetch_view(AnalyticsView::ByProduct).await?;

        Ok(AnalyticsTables {
            by_quarter,
            by_region,
            by_product,
        })
    }
}
