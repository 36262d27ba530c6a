//! Data center locations.

use crate::client::ApiClient;
use crate::context::Context;
use crate::error::ApiError;
use crate::request::RequestConfig;
use crate::types::Location;

#[derive(Debug, Clone)]
pub struct LocationClient {
    api: ApiClient,
}

impl LocationClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn build_list_locations() -> RequestConfig {
        RequestConfig::get("/v1/config/locations")
    }

    pub fn list_locations(&self, ctx: &Context) -> Result<Vec<Location>, ApiError> {
        self.api
            .form_request(ctx, &Self::build_list_locations())
            .decode()
    }
}
