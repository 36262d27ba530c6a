//! S3-compatible object storage: the S3 user, its access keys and buckets.
//!
//! Buckets are addressed by name in the query string (reads and deletes) or
//! in the form body (writes). A client bound to a billing account with
//! [`ObjectStorageClient::for_billing_account`] scopes listing and creation
//! to that account.

use std::collections::HashMap;

use crate::client::ApiClient;
use crate::context::Context;
use crate::error::ApiError;
use crate::http::Values;
use crate::request::RequestConfig;
use crate::types::{Bucket, S3Credential, S3UserInfo};

const BUCKET_PATH: &str = "/v1/storage/bucket";
const KEYS_PATH: &str = "/v1/storage/user/keys";

#[derive(Debug, Clone)]
pub struct ObjectStorageClient {
    api: ApiClient,
    billing_account_id: Option<u64>,
}

impl ObjectStorageClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            billing_account_id: None,
        }
    }

    pub fn for_billing_account(self, billing_account_id: u64) -> Self {
        Self {
            billing_account_id: Some(billing_account_id),
            ..self
        }
    }

    pub fn billing_account_id(&self) -> Option<u64> {
        self.billing_account_id
    }

    pub fn build_s3_api_url() -> RequestConfig {
        RequestConfig::get("/v1/storage/api/s3")
    }

    pub fn build_user_info() -> RequestConfig {
        RequestConfig::get("/v1/storage/user")
    }

    pub fn build_user_keys() -> RequestConfig {
        RequestConfig::get(KEYS_PATH)
    }

    pub fn build_generate_user_key() -> RequestConfig {
        RequestConfig::post(KEYS_PATH)
    }

    pub fn build_delete_user_key(access_key: &str) -> RequestConfig {
        RequestConfig::delete(KEYS_PATH).query_pair("access_key", access_key)
    }

    pub fn build_list_buckets(&self) -> RequestConfig {
        let cfg = RequestConfig::get(format!("{BUCKET_PATH}/list"));
        match self.billing_account_id {
            Some(id) => cfg.query_pair("billing_account_id", id.to_string()),
            None => cfg,
        }
    }

    pub fn build_get_bucket(name: &str) -> RequestConfig {
        RequestConfig::get(BUCKET_PATH).query_pair("name", name)
    }

    pub fn build_create_bucket(&self, name: &str) -> RequestConfig {
        let mut form = Values::new();
        form.set("name", name);
        if let Some(id) = self.billing_account_id {
            form.set("billing_account_id", id.to_string());
        }
        RequestConfig::put(BUCKET_PATH).form(form)
    }

    pub fn build_delete_bucket(name: &str) -> RequestConfig {
        RequestConfig::delete(BUCKET_PATH).query_pair("name", name)
    }

    pub fn build_update_bucket_billing_account(name: &str, billing_account_id: u64) -> RequestConfig {
        let mut form = Values::new();
        form.set("name", name)
            .set("billing_account_id", billing_account_id.to_string());
        RequestConfig::patch(BUCKET_PATH).form(form)
    }

    /// Endpoints of the S3 API, keyed by purpose.
    pub fn s3_api_url(&self, ctx: &Context) -> Result<HashMap<String, String>, ApiError> {
        self.api.form_request(ctx, &Self::build_s3_api_url()).decode()
    }

    pub fn user_info(&self, ctx: &Context) -> Result<S3UserInfo, ApiError> {
        self.api.form_request(ctx, &Self::build_user_info()).decode()
    }

    pub fn user_keys(&self, ctx: &Context) -> Result<Vec<S3Credential>, ApiError> {
        self.api.form_request(ctx, &Self::build_user_keys()).decode()
    }

    /// Create a key pair; the provider answers with every key of the user.
    pub fn generate_user_key(&self, ctx: &Context) -> Result<Vec<S3Credential>, ApiError> {
        self.api.form_request(ctx, &Self::build_generate_user_key()).decode()
    }

    pub fn delete_user_key(&self, ctx: &Context, access_key: &str) -> Result<(), ApiError> {
        self.api
            .form_request(ctx, &Self::build_delete_user_key(access_key))
            .into_result()?;
        Ok(())
    }

    pub fn list_buckets(&self, ctx: &Context) -> Result<Vec<Bucket>, ApiError> {
        self.api.form_request(ctx, &self.build_list_buckets()).decode()
    }

    pub fn get_bucket(&self, ctx: &Context, name: &str) -> Result<Bucket, ApiError> {
        self.api.form_request(ctx, &Self::build_get_bucket(name)).decode()
    }

    pub fn create_bucket(&self, ctx: &Context, name: &str) -> Result<Bucket, ApiError> {
        self.api.form_request(ctx, &self.build_create_bucket(name)).decode()
    }

    pub fn delete_bucket(&self, ctx: &Context, name: &str) -> Result<(), ApiError> {
        self.api
            .form_request(ctx, &Self::build_delete_bucket(name))
            .into_result()?;
        Ok(())
    }

    pub fn update_bucket_billing_account(&self, ctx: &Context, name: &str, billing_account_id: u64) -> Result<(), ApiError> {
        self.api
            .form_request(ctx, &Self::build_update_bucket_billing_account(name, billing_account_id))
            .into_result()?;
        Ok(())
    }
}
