//! Site statistics for the admin dashboard.

use anyhow::Result;
use launchdeck_types::catalog::SiteStatistics;
use reqwest::Method;

use super::ApiClient;

impl ApiClient {
    pub async fn site_statistics(&self) -> Result<SiteStatistics> {
        let builder = self.request(Method::GET, "/admin/statistics");
        Self::send_json(builder, "site statistics").await
    }
}
