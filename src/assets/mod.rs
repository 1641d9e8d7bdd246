//! Asset pack loading: sprites, backgrounds, and the per-directory cache.

/// Background canvas construction.
pub mod background;
/// Image decoding helpers.
pub mod decode;
/// Sprite bundles, asset packs, and [`store::AssetCache`].
pub mod store;
