use serde::Deserialize;

// ============================================================================
// Domain Types
// ============================================================================

/// A single catalog entry with display and statistical attributes.
///
/// Immutable once built from a detail response. `id` is the unique key used
/// to keep list selection stable when the rendered collection changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub name: String,
    /// Height in decimetres, as reported upstream.
    pub height: u32,
    /// Weight in hectograms, as reported upstream.
    pub weight: u32,
    pub sprites: Sprites,
    /// Ordered by slot.
    pub types: Vec<TypeSlot>,
    /// Ordered as reported upstream (hp, attack, defense, ...).
    pub stats: Vec<StatEntry>,
}

/// Image references for an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sprites {
    pub front_default: Option<String>,
    /// Higher quality artwork, preferred when present.
    pub official_artwork: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSlot {
    pub slot: u8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub name: String,
    pub base_stat: u32,
    pub effort: u32,
}

impl Item {
    /// Name with the first character upper-cased ("pikachu" → "Pikachu").
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }

    /// Height converted to metres.
    pub fn height_m(&self) -> f64 {
        f64::from(self.height) / 10.0
    }

    /// Weight converted to kilograms.
    pub fn weight_kg(&self) -> f64 {
        f64::from(self.weight) / 10.0
    }

    /// Preferred image URL: official artwork first, plain sprite as fallback.
    pub fn image_url(&self) -> Option<&str> {
        self.sprites
            .official_artwork
            .as_deref()
            .or(self.sprites.front_default.as_deref())
    }

    /// Capitalised type names in slot order.
    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| capitalize(&t.name)).collect()
    }
}

/// Upper-case the first character of `s`, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A list entry as returned by the paginated endpoint.
///
/// Carries only the name (the lookup key for the detail endpoint) and the
/// canonical resource URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemSummary {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// One page of summaries plus the upstream continuation flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPage {
    pub results: Vec<ItemSummary>,
    pub has_more: bool,
}

/// One page of fully detailed items.
///
/// Produced by enriching a [`SummaryPage`]; entries whose detail fetch failed
/// are absent, so `items.len()` may be smaller than the requested limit even
/// when `has_more` is true.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailedPage {
    pub items: Vec<Item>,
    pub has_more: bool,
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of `GET /pokemon?limit=&offset=`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[allow(dead_code)] // Part of the upstream contract, kept for Debug output
    #[serde(default)]
    pub count: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<ItemSummary>,
}

impl From<ListResponse> for SummaryPage {
    fn from(resp: ListResponse) -> Self {
        SummaryPage {
            has_more: resp.next.is_some(),
            results: resp.results,
        }
    }
}

/// Body of `GET /pokemon/{name}`, restricted to the fields we display.
#[derive(Debug, Deserialize)]
pub(crate) struct DetailResponse {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: SpritesResponse,
    #[serde(default)]
    pub types: Vec<TypeSlotResponse>,
    #[serde(default)]
    pub stats: Vec<StatResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SpritesResponse {
    pub front_default: Option<String>,
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OtherSprites {
    #[serde(rename = "official-artwork")]
    pub official_artwork: Option<ArtworkResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtworkResponse {
    pub front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedResource {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TypeSlotResponse {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatResponse {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedResource,
}

impl From<DetailResponse> for Item {
    fn from(resp: DetailResponse) -> Self {
        let official_artwork = resp
            .sprites
            .other
            .and_then(|o| o.official_artwork)
            .and_then(|a| a.front_default);

        let mut types: Vec<TypeSlot> = resp
            .types
            .into_iter()
            .map(|t| TypeSlot {
                slot: t.slot,
                name: t.kind.name,
            })
            .collect();
        types.sort_by_key(|t| t.slot);

        Item {
            id: resp.id,
            name: resp.name,
            height: resp.height,
            weight: resp.weight,
            sprites: Sprites {
                front_default: resp.sprites.front_default,
                official_artwork,
            },
            types,
            stats: resp
                .stats
                .into_iter()
                .map(|s| StatEntry {
                    name: s.stat.name,
                    base_stat: s.base_stat,
                    effort: s.effort,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PIKACHU_JSON: &str = r#"{
        "id": 25,
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "base_experience": 112,
        "sprites": {
            "front_default": "https://img.example/25.png",
            "other": {
                "official-artwork": { "front_default": "https://img.example/art/25.png" },
                "home": { "front_default": null }
            }
        },
        "types": [ { "slot": 1, "type": { "name": "electric", "url": "https://x/type/13/" } } ],
        "stats": [
            { "base_stat": 35, "effort": 0, "stat": { "name": "hp", "url": "https://x/stat/1/" } },
            { "base_stat": 90, "effort": 2, "stat": { "name": "speed", "url": "https://x/stat/6/" } }
        ]
    }"#;

    #[test]
    fn test_detail_response_maps_to_item() {
        let resp: DetailResponse = serde_json::from_str(PIKACHU_JSON).unwrap();
        let item = Item::from(resp);

        assert_eq!(item.id, 25);
        assert_eq!(item.display_name(), "Pikachu");
        assert_eq!(item.type_names(), vec!["Electric".to_string()]);
        assert_eq!(item.stats.len(), 2);
        assert_eq!(item.stats[1].name, "speed");
        assert_eq!(item.stats[1].effort, 2);
        assert_eq!(item.image_url(), Some("https://img.example/art/25.png"));
    }

    #[test]
    fn test_image_url_falls_back_to_sprite() {
        let json = r#"{"id": 1, "name": "bulbasaur",
            "sprites": {"front_default": "https://img.example/1.png", "other": null}}"#;
        let item = Item::from(serde_json::from_str::<DetailResponse>(json).unwrap());
        assert_eq!(item.image_url(), Some("https://img.example/1.png"));
    }

    #[test]
    fn test_image_url_none_without_sprites() {
        let json = r#"{"id": 1, "name": "missingno"}"#;
        let item = Item::from(serde_json::from_str::<DetailResponse>(json).unwrap());
        assert_eq!(item.image_url(), None);
    }

    #[test]
    fn test_types_sorted_by_slot() {
        let json = r#"{"id": 6, "name": "charizard", "types": [
            {"slot": 2, "type": {"name": "flying"}},
            {"slot": 1, "type": {"name": "fire"}}
        ]}"#;
        let item = Item::from(serde_json::from_str::<DetailResponse>(json).unwrap());
        assert_eq!(item.type_names(), vec!["Fire", "Flying"]);
    }

    #[test]
    fn test_unit_conversions() {
        let resp: DetailResponse = serde_json::from_str(PIKACHU_JSON).unwrap();
        let item = Item::from(resp);
        assert!((item.height_m() - 0.4).abs() < f64::EPSILON);
        assert!((item.weight_kg() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_list_response_has_more_follows_next_link() {
        let json = r#"{"count": 1302, "next": "https://x/pokemon?offset=20&limit=20",
            "previous": null, "results": [{"name": "bulbasaur", "url": "https://x/pokemon/1/"}]}"#;
        let page = SummaryPage::from(serde_json::from_str::<ListResponse>(json).unwrap());
        assert!(page.has_more);
        assert_eq!(page.results[0].name, "bulbasaur");

        let json = r#"{"count": 1302, "next": null, "previous": null, "results": []}"#;
        let page = SummaryPage::from(serde_json::from_str::<ListResponse>(json).unwrap());
        assert!(!page.has_more);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("mr-mime"), "Mr-mime");
        assert_eq!(capitalize("Already"), "Already");
        assert_eq!(capitalize("élan"), "Élan");
    }
}
