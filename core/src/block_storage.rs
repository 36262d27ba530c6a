//! Block storage disks.
//!
//! Every call here is form-encoded; attach and detach address the VM
//! resource endpoint rather than the disk collection.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::context::Context;
use crate::error::ApiError;
use crate::http::Values;
use crate::request::RequestConfig;
use crate::types::{CreateDisk, Disk};

const DISKS_PATH: &str = "/v1/storage/disks";

#[derive(Debug, Clone)]
pub struct BlockStorageClient {
    api: ApiClient,
}

impl BlockStorageClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn build_list_disks() -> RequestConfig {
        RequestConfig::get(DISKS_PATH)
    }

    pub fn build_create_disk(input: &CreateDisk) -> RequestConfig {
        RequestConfig::post(DISKS_PATH).form(input.to_form())
    }

    pub fn build_get_disk(id: Uuid) -> RequestConfig {
        RequestConfig::get(format!("{DISKS_PATH}/{id}"))
    }

    pub fn build_delete_disk(id: Uuid) -> RequestConfig {
        RequestConfig::delete(format!("{DISKS_PATH}/{id}"))
    }

    pub fn build_attach_disk(disk_id: Uuid, vm_id: Uuid) -> RequestConfig {
        RequestConfig::post("/v1/user-resource/vm/storage/attach").form(vm_storage_form(disk_id, vm_id))
    }

    pub fn build_detach_disk(disk_id: Uuid, vm_id: Uuid) -> RequestConfig {
        RequestConfig::post("/v1/user-resource/vm/storage/detach").form(vm_storage_form(disk_id, vm_id))
    }

    pub fn build_update_disk_billing_account(id: Uuid, billing_account_id: u64) -> RequestConfig {
        let mut form = Values::new();
        form.set("billing_account_id", billing_account_id.to_string());
        RequestConfig::patch(format!("{DISKS_PATH}/{id}")).form(form)
    }

    pub fn list_disks(&self, ctx: &Context) -> Result<Vec<Disk>, ApiError> {
        self.api.form_request(ctx, &Self::build_list_disks()).decode()
    }

    pub fn create_disk(&self, ctx: &Context, input: &CreateDisk) -> Result<Disk, ApiError> {
        self.api.form_request(ctx, &Self::build_create_disk(input)).decode()
    }

    pub fn get_disk(&self, ctx: &Context, id: Uuid) -> Result<Disk, ApiError> {
        self.api.form_request(ctx, &Self::build_get_disk(id)).decode()
    }

    pub fn delete_disk(&self, ctx: &Context, id: Uuid) -> Result<(), ApiError> {
        self.api.form_request(ctx, &Self::build_delete_disk(id)).into_result()?;
        Ok(())
    }

    pub fn attach_disk(&self, ctx: &Context, disk_id: Uuid, vm_id: Uuid) -> Result<(), ApiError> {
        self.api
            .form_request(ctx, &Self::build_attach_disk(disk_id, vm_id))
            .into_result()?;
        Ok(())
    }

    pub fn detach_disk(&self, ctx: &Context, disk_id: Uuid, vm_id: Uuid) -> Result<(), ApiError> {
        self.api
            .form_request(ctx, &Self::build_detach_disk(disk_id, vm_id))
            .into_result()?;
        Ok(())
    }

    pub fn update_disk_billing_account(&self, ctx: &Context, id: Uuid, billing_account_id: u64) -> Result<(), ApiError> {
        self.api
            .form_request(ctx, &Self::build_update_disk_billing_account(id, billing_account_id))
            .into_result()?;
        Ok(())
    }
}

fn vm_storage_form(disk_id: Uuid, vm_id: Uuid) -> Values {
    let mut form = Values::new();
    form.set("uuid", vm_id.to_string())
        .set("storage_uuid", disk_id.to_string());
    form
}
