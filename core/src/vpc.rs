//! Private networks (VPC), scoped to one data center location.

use serde_json::json;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::context::Context;
use crate::error::ApiError;
use crate::request::RequestConfig;
use crate::types::Network;

#[derive(Debug, Clone)]
pub struct VpcClient {
    api: ApiClient,
    location: String,
}

impl VpcClient {
    pub fn new(api: ApiClient, location: &str) -> Self {
        Self {
            api,
            location: location.to_string(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn network_path(&self, id: Uuid) -> String {
        format!("/v1/{}/network/network/{id}", self.location)
    }

    pub fn build_list_networks(&self) -> RequestConfig {
        RequestConfig::get(format!("/v1/{}/network/networks", self.location))
    }

    pub fn build_get_network(&self, id: Uuid) -> RequestConfig {
        RequestConfig::get(self.network_path(id))
    }

    pub fn build_delete_network(&self, id: Uuid) -> RequestConfig {
        RequestConfig::delete(self.network_path(id))
    }

    pub fn build_rename_network(&self, id: Uuid, name: &str) -> RequestConfig {
        RequestConfig::patch(self.network_path(id)).json_value(json!({ "name": name }))
    }

    pub fn build_get_or_create_default_network(&self, name: &str) -> RequestConfig {
        RequestConfig::post(format!("/v1/{}/network/network", self.location)).query_pair("name", name)
    }

    pub fn build_set_default_network(&self, id: Uuid) -> RequestConfig {
        RequestConfig::put(format!("{}/default", self.network_path(id)))
    }

    pub fn list_networks(&self, ctx: &Context) -> Result<Vec<Network>, ApiError> {
        self.api.json_request(ctx, &self.build_list_networks()).decode()
    }

    pub fn get_network(&self, ctx: &Context, id: Uuid) -> Result<Network, ApiError> {
        self.api.json_request(ctx, &self.build_get_network(id)).decode()
    }

    pub fn delete_network(&self, ctx: &Context, id: Uuid) -> Result<(), ApiError> {
        self.api.json_request(ctx, &self.build_delete_network(id)).into_result()?;
        Ok(())
    }

    pub fn rename_network(&self, ctx: &Context, id: Uuid, name: &str) -> Result<(), ApiError> {
        self.api
            .json_request(ctx, &self.build_rename_network(id, name))
            .into_result()?;
        Ok(())
    }

    /// Return the location's default network, creating it as `name` when
    /// there is none yet.
    pub fn get_or_create_default_network(&self, ctx: &Context, name: &str) -> Result<Network, ApiError> {
        self.api
            .json_request(ctx, &self.build_get_or_create_default_network(name))
            .decode()
    }

    pub fn set_default_network(&self, ctx: &Context, id: Uuid) -> Result<(), ApiError> {
        self.api
            .json_request(ctx, &self.build_set_default_network(id))
            .into_result()?;
        Ok(())
    }
}
