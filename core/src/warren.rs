//! One entry point bundling every resource client over a shared `ApiClient`.

use crate::block_storage::BlockStorageClient;
use crate::client::ApiClient;
use crate::floating_ip::FloatingIpClient;
use crate::location::LocationClient;
use crate::object_storage::ObjectStorageClient;
use crate::vpc::VpcClient;

#[derive(Debug, Clone)]
pub struct Warren {
    pub locations: LocationClient,
    pub object_storage: ObjectStorageClient,
    pub block_storage: BlockStorageClient,
    pub vpc: VpcClient,
    pub floating_ips: FloatingIpClient,
}

impl Warren {
    /// `location` scopes location-bound resources (networks, floating IPs);
    /// it may be empty when only global resources are used.
    pub fn new(api: ApiClient, location: &str) -> Self {
        Self {
            locations: LocationClient::new(api.clone()),
            object_storage: ObjectStorageClient::new(api.clone()),
            block_storage: BlockStorageClient::new(api.clone()),
            vpc: VpcClient::new(api.clone(), location),
            floating_ips: FloatingIpClient::new(api, location),
        }
    }

    /// Bundle over a client read from `WARREN_API_BASE_URL` and
    /// `WARREN_API_KEY`.
    pub fn from_env(location: &str) -> Self {
        Self::new(ApiClient::from_env(), location)
    }
}
