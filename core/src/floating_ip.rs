//! Floating IP addresses, scoped to one data center location.

use serde_json::json;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::context::Context;
use crate::error::ApiError;
use crate::request::RequestConfig;
use crate::types::FloatingIp;

#[derive(Debug, Clone)]
pub struct FloatingIpClient {
    api: ApiClient,
    location: String,
}

impl FloatingIpClient {
    pub fn new(api: ApiClient, location: &str) -> Self {
        Self {
            api,
            location: location.to_string(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn collection_path(&self) -> String {
        format!("/v1/{}/network/ip_addresses", self.location)
    }

    pub fn build_list(&self) -> RequestConfig {
        RequestConfig::get(self.collection_path())
    }

    pub fn build_create(&self, name: &str, billing_account_id: u64) -> Result<RequestConfig, ApiError> {
        check_billing_account(billing_account_id)?;
        Ok(RequestConfig::post(self.collection_path())
            .json_value(json!({"name": name, "billing_account_id": billing_account_id})))
    }

    pub fn build_get(&self, address: &str) -> RequestConfig {
        RequestConfig::get(format!("{}/{address}", self.collection_path()))
    }

    pub fn build_update(&self, address: &str, name: &str, billing_account_id: u64) -> Result<RequestConfig, ApiError> {
        check_billing_account(billing_account_id)?;
        Ok(RequestConfig::patch(format!("{}/{address}", self.collection_path()))
            .json_value(json!({"name": name, "billing_account_id": billing_account_id})))
    }

    pub fn build_delete(&self, address: &str) -> RequestConfig {
        RequestConfig::delete(format!("{}/{address}", self.collection_path()))
    }

    pub fn build_assign(&self, address: &str, vm_uuid: Uuid) -> RequestConfig {
        RequestConfig::post(format!("{}/{address}/assign", self.collection_path())).json_value(json!({"vm_uuid": vm_uuid}))
    }

    pub fn build_unassign(&self, address: &str, vm_uuid: Uuid) -> RequestConfig {
        RequestConfig::post(format!("{}/{address}/unassign", self.collection_path()))
            .json_value(json!({"vm_uuid": vm_uuid}))
    }

    pub fn list(&self, ctx: &Context) -> Result<Vec<FloatingIp>, ApiError> {
        self.api.json_request(ctx, &self.build_list()).decode()
    }

    pub fn create(&self, ctx: &Context, name: &str, billing_account_id: u64) -> Result<FloatingIp, ApiError> {
        let cfg = self.build_create(name, billing_account_id)?;
        self.api.json_request(ctx, &cfg).decode()
    }

    pub fn get(&self, ctx: &Context, address: &str) -> Result<FloatingIp, ApiError> {
        self.api.json_request(ctx, &self.build_get(address)).decode()
    }

    pub fn update(&self, ctx: &Context, address: &str, name: &str, billing_account_id: u64) -> Result<(), ApiError> {
        let cfg = self.build_update(address, name, billing_account_id)?;
        self.api.json_request(ctx, &cfg).into_result()?;
        Ok(())
    }

    pub fn delete(&self, ctx: &Context, address: &str) -> Result<(), ApiError> {
        self.api.json_request(ctx, &self.build_delete(address)).into_result()?;
        Ok(())
    }

    pub fn assign(&self, ctx: &Context, address: &str, vm_uuid: Uuid) -> Result<(), ApiError> {
        self.api
            .json_request(ctx, &self.build_assign(address, vm_uuid))
            .into_result()?;
        Ok(())
    }

    pub fn unassign(&self, ctx: &Context, address: &str, vm_uuid: Uuid) -> Result<(), ApiError> {
        self.api
            .json_request(ctx, &self.build_unassign(address, vm_uuid))
            .into_result()?;
        Ok(())
    }
}

fn check_billing_account(id: u64) -> Result<(), ApiError> {
    if id == 0 {
        return Err(ApiError::InvalidArgument(format!("billing account id {id} is invalid")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::client::tests::StubTransport;

    fn client() -> FloatingIpClient {
        FloatingIpClient::new(ApiClient::new("https://api.warren.io", "secret"), "tll")
    }

    #[test]
    fn build_list_is_location_scoped() {
        let cfg = client().build_list();
        assert_eq!(cfg.method, "GET");
        assert_eq!(cfg.path, "/v1/tll/network/ip_addresses");
    }

    #[test]
    fn build_create_sends_name_and_billing_account() {
        let cfg = client().build_create("web", 99).unwrap();
        assert_eq!(cfg.method, "POST");
        assert_eq!(cfg.json, Some(json!({"name": "web", "billing_account_id": 99})));
    }

    #[test]
    fn zero_billing_account_is_rejected() {
        assert!(matches!(client().build_create("web", 0), Err(ApiError::InvalidArgument(_))));
        assert!(matches!(client().build_update("185.1.2.3", "web", 0), Err(ApiError::InvalidArgument(_))));
    }

    #[test]
    fn zero_billing_account_never_reaches_transport() {
        let stub = StubTransport::replying(200, "{}");
        let ips = FloatingIpClient::new(ApiClient::with_transport("https://api.warren.io", "secret", stub.clone()), "tll");
        assert!(ips.create(&Context::background(), "web", 0).is_err());
        assert!(stub.sent().is_empty());
    }

    #[test]
    fn build_update_patches_address() {
        let cfg = client().build_update("185.1.2.3", "web", 5).unwrap();
        assert_eq!(cfg.method, "PATCH");
        assert_eq!(cfg.path, "/v1/tll/network/ip_addresses/185.1.2.3");
    }

    #[test]
    fn build_assign_and_unassign_send_vm_uuid() {
        let vm = Uuid::from_u128(7);
        let assign = client().build_assign("185.1.2.3", vm);
        let unassign = client().build_unassign("185.1.2.3", vm);
        assert_eq!(assign.path, "/v1/tll/network/ip_addresses/185.1.2.3/assign");
        assert_eq!(unassign.path, "/v1/tll/network/ip_addresses/185.1.2.3/unassign");
        assert_eq!(assign.json.unwrap()["vm_uuid"], Value::String(vm.to_string()));
    }

    #[test]
    fn get_decodes_response() {
        let stub = StubTransport::replying(200, r#"{"id":1,"address":"185.1.2.3","name":"web"}"#);
        let ips = FloatingIpClient::new(ApiClient::with_transport("https://api.warren.io", "secret", stub.clone()), "tll");
        let ip = ips.get(&Context::background(), "185.1.2.3").unwrap();
        assert_eq!(ip.address, "185.1.2.3");
        assert_eq!(stub.sent()[0].header("content-type"), Some("application/json"));
    }
}
