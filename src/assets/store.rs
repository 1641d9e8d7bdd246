use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use image::RgbaImage;

use crate::{
    assets::decode::load_sprite,
    foundation::core::Canvas,
    foundation::error::{MannequinError, MannequinResult},
    rig::descriptor::Rig,
    rig::part::Part,
};

/// Every part sprite of a rig, each RGBA8 at exactly the reference size.
#[derive(Clone, Debug)]
pub struct SpriteBundle {
    sprites: BTreeMap<Part, RgbaImage>,
}

impl SpriteBundle {
    /// Build a bundle from already-decoded sprites; every sprite must be `size`.
    pub fn new(size: Canvas, sprites: BTreeMap<Part, RgbaImage>) -> MannequinResult<Self> {
        for (part, img) in &sprites {
            if img.dimensions() != (size.width, size.height) {
                return Err(MannequinError::validation(format!(
                    "sprite '{part}' is {}x{}, expected {}x{}",
                    img.width(),
                    img.height(),
                    size.width,
                    size.height
                )));
            }
        }
        Ok(Self { sprites })
    }

    /// Sprite for `part`.
    pub fn get(&self, part: Part) -> MannequinResult<&RgbaImage> {
        self.sprites
            .get(&part)
            .ok_or_else(|| MannequinError::validation(format!("no sprite loaded for '{part}'")))
    }
}

/// A loaded asset pack: the validated rig plus its sprites.
#[derive(Debug)]
pub struct AssetPack {
    /// Validated rig description.
    pub rig: Rig,
    /// Sprites resized to the reference size.
    pub sprites: Arc<SpriteBundle>,
}

impl AssetPack {
    /// Parse the rig descriptor in `dir` and load every part sprite.
    ///
    /// Each sprite read bumps `reads`.
    pub fn load(dir: &Path, reads: &AtomicU64) -> MannequinResult<Self> {
        let rig = Rig::load(dir)?;
        let mut sprites = BTreeMap::new();
        for (part, rel) in &rig.parts {
            let path = dir.join(rel);
            reads.fetch_add(1, Ordering::Relaxed);
            sprites.insert(*part, load_sprite(&path, rig.ref_size)?);
        }
        let sprites = SpriteBundle::new(rig.ref_size, sprites)?;
        Ok(Self {
            rig,
            sprites: Arc::new(sprites),
        })
    }
}

/// Asset packs keyed by directory, loaded at most once each.
///
/// Packs are never evicted: the cache grows with every distinct directory it is asked for, and
/// lives as long as its owner.
#[derive(Debug, Default)]
pub struct AssetCache {
    packs: Mutex<HashMap<PathBuf, Arc<AssetPack>>>,
    sprite_reads: AtomicU64,
}

impl AssetCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pack for `dir`, loading it on first use.
    #[tracing::instrument(skip(self), fields(dir = %dir.display()))]
    pub fn get_or_load(&self, dir: &Path) -> MannequinResult<Arc<AssetPack>> {
        let key = cache_key(dir);
        let mut packs = self
            .packs
            .lock()
            .map_err(|_| MannequinError::validation("asset cache lock poisoned"))?;
        if let Some(pack) = packs.get(&key) {
            tracing::debug!("asset pack cache hit");
            return Ok(Arc::clone(pack));
        }

        let pack = Arc::new(AssetPack::load(dir, &self.sprite_reads)?);
        tracing::info!(sprites = pack.rig.parts.len(), "asset pack loaded");
        packs.insert(key, Arc::clone(&pack));
        Ok(pack)
    }

    /// `true` when `dir` has already been loaded.
    pub fn contains(&self, dir: &Path) -> bool {
        self.packs
            .lock()
            .map(|p| p.contains_key(&cache_key(dir)))
            .unwrap_or(false)
    }

    /// Total sprite files read from disk since the cache was created.
    pub fn sprite_reads(&self) -> u64 {
        self.sprite_reads.load(Ordering::Relaxed)
    }

    /// Number of cached packs.
    pub fn len(&self) -> usize {
        self.packs.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// `true` when nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
