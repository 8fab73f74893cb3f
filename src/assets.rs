// assets.rs - Rain asset catalog
//
// The host fetches the images listed by `manifest()` and reports back
// per asset. A failed image is replaced by an emoji placeholder so every
// slot ends up drawable. Rain may only start once nothing is pending.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GardenError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cute,
    Core,
    BeLike,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Cute, Category::Core, Category::BeLike];

    pub fn name(self) -> &'static str {
        match self {
            Category::Cute => "cute",
            Category::Core => "core",
            Category::BeLike => "belike",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Cute => 0,
            Category::Core => 1,
            Category::BeLike => 2,
        }
    }

    fn folder(self) -> &'static str {
        match self {
            Category::Cute => "S_cute",
            Category::Core => "S_core",
            Category::BeLike => "S_beLike",
        }
    }

    fn image_count(self) -> u32 {
        match self {
            Category::Cute => 30,
            Category::Core => 17,
            Category::BeLike => 15,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Category::Cute => "png",
            Category::Core | Category::BeLike => "jpeg",
        }
    }

    fn glyphs(self) -> &'static [&'static str] {
        match self {
            Category::Cute => &["🌸", "🌺", "🌼", "🌻", "🌷", "🌹", "💐", "🏵️"],
            Category::Core => &["⭐", "🌟", "✨", "💫", "🌠", "🌌", "🌑", "🪐"],
            Category::BeLike => &["🦋", "🐝", "🌈", "☀️", "🌙", "⚡", "💧", "🍂"],
        }
    }

    /// Placeholder glyph for the `n`th image of this category
    pub fn placeholder(self, n: u32) -> &'static str {
        let glyphs = self.glyphs();
        glyphs[n as usize % glyphs.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cute" => Ok(Category::Cute),
            "core" => Ok(Category::Core),
            "belike" => Ok(Category::BeLike),
            _ => Err(GardenError::UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetState {
    Pending,
    Loaded,
    /// Image failed; drawn as this glyph instead
    Placeholder(&'static str),
}

#[derive(Clone, Debug)]
pub struct Asset {
    pub id: AssetId,
    pub category: Category,
    pub path: String,
    pub state: AssetState,
}

#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    assets: Vec<Asset>,
    by_category: [Vec<AssetId>; 3],
}

impl AssetCatalog {
    /// Empty catalog: counts as loaded, but nothing can spawn from it.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard image folders under `base`, all pending.
    pub fn standard(base: &str) -> Self {
        let mut catalog = Self::new();
        for category in Category::ALL {
            for i in 1..=category.image_count() {
                let path = format!(
                    "{base}/{}/img ({i}).{}",
                    category.folder(),
                    category.extension()
                );
                catalog.push(category, path);
            }
        }
        catalog
    }

    pub fn push(&mut self, category: Category, path: String) -> AssetId {
        let id = AssetId(self.assets.len() as u32);
        self.assets.push(Asset { id, category, path, state: AssetState::Pending });
        self.by_category[category.index()].push(id);
        id
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Assets the host still has to fetch
    pub fn manifest(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter().filter(|a| a.state == AssetState::Pending)
    }

    pub fn mark_loaded(&mut self, id: AssetId) {
        if let Some(asset) = self.assets.get_mut(id.0 as usize) {
            asset.state = AssetState::Loaded;
        }
        self.log_if_done();
    }

    pub fn mark_failed(&mut self, id: AssetId) {
        let Some(asset) = self.assets.get_mut(id.0 as usize) else { return };
        let n = self.by_category[asset.category.index()]
            .iter()
            .position(|&other| other == id)
            .unwrap_or(0) as u32
            + 1;
        let glyph = asset.category.placeholder(n);
        log::debug!("asset {} failed, using placeholder {glyph}", asset.path);
        asset.state = AssetState::Placeholder(glyph);
        self.log_if_done();
    }

    /// True once no asset is pending
    pub fn is_loaded(&self) -> bool {
        self.assets.iter().all(|a| a.state != AssetState::Pending)
    }

    pub fn count(&self, category: Category) -> usize {
        self.by_category[category.index()].len()
    }

    /// One random category from `active`, then one random asset in it.
    /// `None` when there is nothing to draw from.
    pub fn pick<R: Rng + ?Sized>(&self, active: &[Category], rng: &mut R) -> Option<AssetId> {
        if active.is_empty() {
            return None;
        }
        let category = active[rng.gen_range(0..active.len())];
        let ids = &self.by_category[category.index()];
        if ids.is_empty() {
            return None;
        }
        Some(ids[rng.gen_range(0..ids.len())])
    }

    fn log_if_done(&self) {
        if self.is_loaded() {
            log::info!(
                "rain assets ready: cute({}) core({}) belike({})",
                self.count(Category::Cute),
                self.count(Category::Core),
                self.count(Category::BeLike)
            );
        }
    }
}
