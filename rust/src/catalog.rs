use anyhow::{anyhow, Context, Result};
use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct GalleryItem {
    pub id: u32,
    pub category: String,
    pub title: String,
    pub image: String,
    pub prompt: String,
}

/// Immutable gallery catalog, loaded once at startup from `gallery.json`.
///
/// A missing file is seeded with the built-in catalog. An unreadable or
/// unparseable file degrades to an empty catalog with a user-visible
/// warning; it never fails the session.
pub struct GalleryCatalog {
    items: Vec<GalleryItem>,
    load_warning: Option<String>,
}

impl GalleryCatalog {
    pub fn load(base_dir: &Path) -> Self {
        let path = base_dir.join("gallery.json");

        if !path.exists() {
            if let Err(err) = seed_default_catalog(&path) {
                return Self {
                    items: Vec::new(),
                    load_warning: Some(format!("Gallery catalog unavailable: {err}")),
                };
            }
        }

        match read_items(&path) {
            Ok(items) => Self {
                items,
                load_warning: None,
            },
            Err(err) => Self {
                items: Vec::new(),
                load_warning: Some(format!("Gallery catalog could not be loaded: {err}")),
            },
        }
    }

    /// The full catalog, unchanged, in file order.
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    pub fn find(&self, id: u32) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// A fresh unbiased permutation of the catalog, truncated to `n`.
    /// Every call reshuffles; no ordering is memoized.
    pub fn sample(&self, n: usize) -> Vec<GalleryItem> {
        let mut drawn = self.items.clone();
        drawn.shuffle(&mut rand::thread_rng());
        drawn.truncate(n);
        drawn
    }
}

fn seed_default_catalog(path: &Path) -> Result<()> {
    let payload = serde_json::to_string_pretty(&default_catalog())
        .context("failed to serialize default catalog")?;
    fs::write(path, payload)
        .with_context(|| format!("failed to seed catalog: {}", path.display()))
}

fn read_items(path: &Path) -> Result<Vec<GalleryItem>> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read json: {}", path.display()))?;
    let raw: Value = serde_json::from_str(&raw_text)
        .with_context(|| format!("failed to parse json: {}", path.display()))?;

    let Some(array) = raw.as_array() else {
        return Err(anyhow!("catalog json is not an array: {}", path.display()));
    };

    let mut items: Vec<GalleryItem> = Vec::new();
    for entry in array {
        let Some(obj) = entry.as_object() else {
            continue;
        };

        let Some(id) = obj
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
        else {
            continue;
        };
        if items.iter().any(|existing| existing.id == id) {
            continue;
        }

        let field = |name: &str| -> Option<String> {
            obj.get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToOwned::to_owned)
        };

        let (Some(title), Some(image), Some(prompt)) =
            (field("title"), field("image"), field("prompt"))
        else {
            continue;
        };
        let category = field("category").unwrap_or_else(|| "general".to_string());

        items.push(GalleryItem {
            id,
            category,
            title,
            image,
            prompt,
        });
    }

    Ok(items)
}

fn default_catalog() -> Vec<GalleryItem> {
    let entries = [
        (
            1,
            "Cyberpunk",
            "Neon Samurai",
            "https://images.unsplash.com/photo-1614850523296-d8c1af93d400?q=80&w=400&auto=format&fit=crop",
            "a neon samurai standing in rain-slick streets, cyberpunk concept art, vivid neon glow",
        ),
        (
            2,
            "Fantasy",
            "Forest Spirit",
            "https://images.unsplash.com/photo-1518709268805-4e9042af9f23?q=80&w=400&auto=format&fit=crop",
            "a glowing forest spirit among ancient trees, watercolor illustration, dreamy pastel haze",
        ),
        (
            3,
            "Sci-Fi",
            "Space Whale",
            "https://images.unsplash.com/photo-1446776811953-b23d57bd21aa?q=80&w=400&auto=format&fit=crop",
            "a colossal whale drifting through a nebula, cinematic matte painting, starlit darkness",
        ),
        (
            4,
            "Portrait",
            "Vintage Cyborg",
            "https://images.unsplash.com/photo-1589254065878-42c9da997008?q=80&w=400&auto=format&fit=crop",
            "a vintage cyborg portrait with brass fittings, 35mm photograph, soft studio light",
        ),
        (
            5,
            "Architecture",
            "Glass Cathedral",
            "https://images.unsplash.com/photo-1487958449943-2429e8be8625?q=80&w=400&auto=format&fit=crop",
            "an impossible glass cathedral at dawn, architectural render, golden hour",
        ),
        (
            6,
            "Urban",
            "Midnight Diner",
            "https://images.unsplash.com/photo-1514933651103-005eec06c04b?q=80&w=400&auto=format&fit=crop",
            "a lonely midnight diner on an empty street, oil painting, moody darkness",
        ),
    ];

    entries
        .into_iter()
        .map(|(id, category, title, image, prompt)| GalleryItem {
            id,
            category: category.to_string(),
            title: title.to_string(),
            image: image.to_string(),
            prompt: prompt.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::GalleryCatalog;
    use std::collections::HashMap;
    use std::collections::HashSet;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_FIXTURE_ID: AtomicU64 = AtomicU64::new(1);

    fn fixture_base() -> std::path::PathBuf {
        let mut base = std::env::temp_dir();
        let sequence = NEXT_FIXTURE_ID.fetch_add(1, Ordering::Relaxed);
        base.push(format!(
            "prompt_studio_catalog_test_{}_{}",
            std::process::id(),
            sequence
        ));
        let _ = fs::remove_dir_all(&base);
        fs::create_dir_all(&base).expect("mkdir fixture");
        base
    }

    #[test]
    fn missing_file_is_seeded_with_builtin_catalog() {
        let base = fixture_base();

        let catalog = GalleryCatalog::load(&base);
        assert!(base.join("gallery.json").exists());
        assert!(catalog.load_warning().is_none());
        assert_eq!(catalog.items().len(), 6);
        assert_eq!(catalog.items()[0].title, "Neon Samurai");

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn broken_file_degrades_to_empty_catalog_with_warning() {
        let base = fixture_base();
        fs::write(base.join("gallery.json"), "{{ nope").expect("write broken");

        let catalog = GalleryCatalog::load(&base);
        assert!(catalog.items().is_empty());
        assert!(catalog
            .load_warning()
            .expect("warning present")
            .contains("could not be loaded"));

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn invalid_and_duplicate_entries_are_skipped() {
        let base = fixture_base();
        fs::write(
            base.join("gallery.json"),
            r#"[
                {"id": 1, "category": "A", "title": "One", "image": "https://example.com/1.jpg", "prompt": "one"},
                {"id": 1, "category": "A", "title": "Dup", "image": "https://example.com/d.jpg", "prompt": "dup"},
                {"id": 2, "title": "Missing image", "prompt": "two"},
                {"id": 3, "title": "Three", "image": "https://example.com/3.jpg", "prompt": "three"}
            ]"#,
        )
        .expect("write fixture");

        let catalog = GalleryCatalog::load(&base);
        let ids: Vec<u32> = catalog.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(catalog.items()[1].category, "general");

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn sample_returns_distinct_items_from_the_catalog() {
        let base = fixture_base();
        let catalog = GalleryCatalog::load(&base);

        for _ in 0..50 {
            let drawn = catalog.sample(4);
            assert_eq!(drawn.len(), 4);

            let ids: HashSet<u32> = drawn.iter().map(|item| item.id).collect();
            assert_eq!(ids.len(), 4, "sample must not repeat items");
            assert!(ids
                .iter()
                .all(|id| catalog.items().iter().any(|item| item.id == *id)));
        }

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn sample_larger_than_catalog_returns_everything() {
        let base = fixture_base();
        let catalog = GalleryCatalog::load(&base);

        let drawn = catalog.sample(100);
        assert_eq!(drawn.len(), catalog.items().len());

        fs::remove_dir_all(base).ok();
    }

    #[test]
    fn shuffle_puts_every_item_first_with_roughly_equal_frequency() {
        let base = fixture_base();
        let catalog = GalleryCatalog::load(&base);
        let trials = 3000;

        let mut first_counts: HashMap<u32, u32> = HashMap::new();
        for _ in 0..trials {
            let drawn = catalog.sample(1);
            *first_counts.entry(drawn[0].id).or_insert(0) += 1;
        }

        // 6 items, expected 500 first-position hits each; the bounds are
        // ~5 standard deviations wide.
        for item in catalog.items() {
            let count = first_counts.get(&item.id).copied().unwrap_or(0);
            assert!(
                (350..=650).contains(&count),
                "item {} appeared first {} times out of {}",
                item.id,
                count,
                trials
            );
        }

        fs::remove_dir_all(base).ok();
    }
}
