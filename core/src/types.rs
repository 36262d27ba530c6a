//! Resource DTOs exchanged with the Warren API.
//!
//! # Design
//! These types mirror the provider's JSON but are defined independently of
//! the mock server; integration tests catch schema drift between the two.
//! Unknown fields are ignored and most fields default, since the provider
//! adds fields over time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::Values;

/// A data center location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub display_name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_preferred: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order_nr: i64,
    pub slug: String,
    #[serde(default)]
    pub country_code: String,
}

/// A block storage disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Disk {
    pub uuid: Uuid,
    pub size_gb: u32,
    #[serde(default)]
    pub billing_account_id: u64,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source_image_type: Option<SourceImageType>,
    #[serde(default)]
    pub source_image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// What a new disk is populated from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceImageType {
    OsBase,
    Disk,
    Snapshot,
    #[default]
    Empty,
}

impl SourceImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceImageType::OsBase => "OS_BASE",
            SourceImageType::Disk => "DISK",
            SourceImageType::Snapshot => "SNAPSHOT",
            SourceImageType::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for SourceImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form payload for creating a disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateDisk {
    pub size_gb: u32,
    pub billing_account_id: u64,
    pub source_image_type: SourceImageType,
    /// Image name or id; ignored by the provider for `Empty`.
    pub source_image: String,
}

impl CreateDisk {
    pub fn to_form(&self) -> Values {
        let mut form = Values::new();
        form.set("size_gb", self.size_gb.to_string())
            .set("billing_account_id", self.billing_account_id.to_string())
            .set("source_image_type", self.source_image_type.as_str())
            .set("source_image", self.source_image.as_str());
        form
    }
}

/// A floating IP address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FloatingIp {
    pub id: u64,
    pub address: String,
    pub user_id: u64,
    pub billing_account_id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub network_id: Option<Uuid>,
    pub name: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
    pub is_deleted: bool,
    pub is_virtual: bool,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_resource_type: Option<String>,
    pub assigned_to_private_ip: Option<String>,
}

/// An object storage bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Bucket {
    pub name: String,
    pub size_bytes: u64,
    pub billing_account_id: u64,
    pub num_objects: u64,
    pub created_at: String,
    pub modified_at: String,
    pub is_suspended: bool,
}

/// S3 access key pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Credential {
    pub access_key: String,
    pub secret_key: String,
    pub user_id: String,
}

/// The object storage user behind the API key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "PascalCase")]
pub struct S3UserInfo {
    pub display_name: String,
    pub email: String,
    pub max_buckets: u32,
    pub s3_credentials: Vec<S3Credential>,
    pub suspended: u8,
    #[serde(rename = "UserID")]
    pub user_id: String,
}

/// A private network in one location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Network {
    pub vlan_id: u32,
    pub uuid: Uuid,
    pub name: String,
    pub subnet: String,
    pub subnet_ipv6: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_default: bool,
    #[serde(rename = "resources_count")]
    pub resource_count: u32,
    pub vm_uuids: Vec<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}
