pub mod mock_catalog_client;
pub mod mock_platform;
