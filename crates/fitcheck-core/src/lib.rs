use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// --- Types ---

/// Closed set of garment categories. Documents written by older app builds
/// may carry category strings we no longer recognize; those deserialize as
/// `Unknown` and are excluded from category-grouped views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Tops,
    Bottoms,
    Jackets,
    Accessories,
    Shoes,
    #[serde(other)]
    Unknown,
}

impl Category {
    /// The recognized categories, in the order selections are scanned.
    pub const ALL: [Category; 5] = [
        Category::Tops,
        Category::Bottoms,
        Category::Jackets,
        Category::Accessories,
        Category::Shoes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Tops => "Tops",
            Category::Bottoms => "Bottoms",
            Category::Jackets => "Jackets",
            Category::Accessories => "Accessories",
            Category::Shoes => "Shoes",
            Category::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub image_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WardrobeItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            image_uri: String::new(),
            description: None,
            created_at: Utc::now(),
        }
    }
}

/// A user's full closet, persisted as one document per wardrobe name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Wardrobe {
    #[serde(default)]
    pub items: Vec<WardrobeItem>,
}

/// The set of items a user selected for one generation request, grouped by
/// category. Built fresh per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    #[serde(default)]
    pub tops: Vec<WardrobeItem>,
    #[serde(default)]
    pub bottoms: Vec<WardrobeItem>,
    #[serde(default)]
    pub jackets: Vec<WardrobeItem>,
    #[serde(default)]
    pub accessories: Vec<WardrobeItem>,
    #[serde(default)]
    pub shoes: Vec<WardrobeItem>,
}

impl SelectionSnapshot {
    /// Group items by category, dropping anything with an unrecognized
    /// category. Input order is preserved within each list.
    pub fn from_items(items: &[WardrobeItem]) -> Self {
        let mut snapshot = SelectionSnapshot::default();
        for item in items {
            match item.category {
                Category::Tops => snapshot.tops.push(item.clone()),
                Category::Bottoms => snapshot.bottoms.push(item.clone()),
                Category::Jackets => snapshot.jackets.push(item.clone()),
                Category::Accessories => snapshot.accessories.push(item.clone()),
                Category::Shoes => snapshot.shoes.push(item.clone()),
                Category::Unknown => {}
            }
        }
        snapshot
    }

    pub fn items_for(&self, category: Category) -> &[WardrobeItem] {
        match category {
            Category::Tops => &self.tops,
            Category::Bottoms => &self.bottoms,
            Category::Jackets => &self.jackets,
            Category::Accessories => &self.accessories,
            Category::Shoes => &self.shoes,
            Category::Unknown => &[],
        }
    }

    /// All items in fixed category order (tops, bottoms, jackets,
    /// accessories, shoes).
    pub fn iter_all(&self) -> impl Iterator<Item = &WardrobeItem> {
        Category::ALL
            .iter()
            .flat_map(move |c| self.items_for(*c).iter())
    }

    pub fn is_empty(&self) -> bool {
        self.iter_all().next().is_none()
    }

    /// A valid outfit needs at least one top and one bottom.
    pub fn has_minimum(&self) -> bool {
        !self.tops.is_empty() && !self.bottoms.is_empty()
    }

    /// Match a slot value back to a selected item so callers can re-attach
    /// image URIs. Exact case-insensitive name match first, scanning all
    /// categories in fixed order; then case-insensitive substring match in
    /// either direction. Returns None when nothing matches — callers render
    /// the slot without an image in that case.
    pub fn find_item_by_name(&self, name: &str) -> Option<&WardrobeItem> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(item) = self
            .iter_all()
            .find(|item| item.name.to_lowercase() == needle)
        {
            return Some(item);
        }

        self.iter_all().find(|item| {
            let candidate = item.name.to_lowercase();
            candidate.contains(&needle) || needle.contains(&candidate)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occasions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

/// Which profile attributes should influence prompt construction and
/// styling-tip selection. A set flag with no backing profile field has no
/// effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationFilters {
    #[serde(default)]
    pub use_gender: bool,
    #[serde(default)]
    pub use_body_type: bool,
    #[serde(default)]
    pub use_lifestyle: bool,
}

/// Fixed outfit roles. An empty string means the slot is unfilled.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSlots {
    #[serde(default)]
    pub top: String,
    #[serde(default)]
    pub bottom: String,
    #[serde(default)]
    pub shoes: String,
    #[serde(default)]
    pub accessory: String,
}

impl OutfitSlots {
    /// Non-empty slot values, in slot order.
    pub fn filled(&self) -> impl Iterator<Item = &str> {
        [
            self.top.as_str(),
            self.bottom.as_str(),
            self.shoes.as_str(),
            self.accessory.as_str(),
        ]
        .into_iter()
        .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedOutfit {
    pub name: String,
    pub items: OutfitSlots,
    pub styling_tip: String,
}

/// A generated outfit the user chose to keep. Layout and positioning of the
/// item images belong to the app shell, not this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedOutfit {
    pub id: String,
    pub name: String,
    pub styling_tip: String,
    #[serde(default)]
    pub item_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Weather context supplied by the external weather collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub condition: String,
    pub temperature: f64,
}

// --- Storage ---

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Resolve the global data directory (~/.fitcheck/).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fitcheck")
}

/// List all wardrobe names (without .closet extension), sorted.
pub fn list_wardrobes() -> Result<Vec<String>, StorageError> {
    list_wardrobes_in(&data_dir())
}

pub fn list_wardrobes_in(dir: &Path) -> Result<Vec<String>, StorageError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name().to_string_lossy().to_string();
            name.strip_suffix(".closet").map(|n| n.to_string())
        })
        .collect();
    names.sort();
    Ok(names)
}

pub fn read_wardrobe(name: &str) -> Result<Wardrobe, StorageError> {
    read_wardrobe_in(&data_dir(), name)
}

pub fn read_wardrobe_in(dir: &Path, name: &str) -> Result<Wardrobe, StorageError> {
    let path = dir.join(format!("{}.closet", name));
    let raw = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write a wardrobe document atomically (temp file + rename) so a partially
/// written closet can never be read back.
pub fn write_wardrobe(name: &str, wardrobe: &Wardrobe) -> Result<(), StorageError> {
    write_wardrobe_in(&data_dir(), name, wardrobe)
}

pub fn write_wardrobe_in(dir: &Path, name: &str, wardrobe: &Wardrobe) -> Result<(), StorageError> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(wardrobe)?;
    let tmp = dir.join(format!(".{}.closet.tmp", name));
    let path = dir.join(format!("{}.closet", name));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

pub fn delete_wardrobe(name: &str) -> Result<(), StorageError> {
    delete_wardrobe_in(&data_dir(), name)
}

pub fn delete_wardrobe_in(dir: &Path, name: &str) -> Result<(), StorageError> {
    let path = dir.join(format!("{}.closet", name));
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

/// Saved outfits live beside the wardrobe in `<name>.outfits`.
pub fn list_saved_outfits(wardrobe: &str) -> Result<Vec<SavedOutfit>, StorageError> {
    list_saved_outfits_in(&data_dir(), wardrobe)
}

pub fn list_saved_outfits_in(dir: &Path, wardrobe: &str) -> Result<Vec<SavedOutfit>, StorageError> {
    let path = dir.join(format!("{}.outfits", wardrobe));
    if !path.exists() {
        return Ok(vec![]);
    }
    let raw = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_outfit(wardrobe: &str, outfit: SavedOutfit) -> Result<(), StorageError> {
    save_outfit_in(&data_dir(), wardrobe, outfit)
}

pub fn save_outfit_in(dir: &Path, wardrobe: &str, outfit: SavedOutfit) -> Result<(), StorageError> {
    let mut outfits = list_saved_outfits_in(dir, wardrobe)?;
    outfits.push(outfit);
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(&outfits)?;
    let tmp = dir.join(format!(".{}.outfits.tmp", wardrobe));
    let path = dir.join(format!("{}.outfits", wardrobe));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Generate the next item ID by scanning existing items ("item-{N}").
pub fn next_item_id(wardrobe: &Wardrobe) -> String {
    let max = wardrobe
        .items
        .iter()
        .filter_map(|i| i.id.strip_prefix("item-").and_then(|s| s.parse::<u64>().ok()))
        .max()
        .unwrap_or(0);
    format!("item-{}", max + 1)
}

/// Generate the next saved-outfit ID ("outfit-{N}").
pub fn next_outfit_id(outfits: &[SavedOutfit]) -> String {
    let max = outfits
        .iter()
        .filter_map(|o| o.id.strip_prefix("outfit-").and_then(|s| s.parse::<u64>().ok()))
        .max()
        .unwrap_or(0);
    format!("outfit-{}", max + 1)
}

// --- Generation settings ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_num_predict() -> u32 {
    220
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_timeout_ms() -> u64 {
    120_000
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            model: String::new(),
            num_predict: default_num_predict(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

pub fn read_settings() -> GenerationSettings {
    let path = settings_path();
    if !path.exists() {
        return GenerationSettings::default();
    }
    fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings(settings: &GenerationSettings) -> Result<(), StorageError> {
    let dir = data_dir();
    fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(settings_path(), json)?;
    Ok(())
}

pub fn endpoint_configured(settings: &GenerationSettings) -> bool {
    !settings.base_url.is_empty() && !settings.model.is_empty()
}
