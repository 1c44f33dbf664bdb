mod download;
mod fetch;
mod fetch_error;

pub use download::{looks_like_image, AssetDownloader, HttpDownloader};
pub use fetch::{asset_file_name, cover_folder_name, fetch_assets, AssetFetch, AssetRecord, AssetSource, FetchSummary};
pub use fetch_error::FetchError;

#[cfg(test)]
pub use download::MockAssetDownloader;
