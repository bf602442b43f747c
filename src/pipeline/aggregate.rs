//! Vibe filtering and per-place deduplication of enriched photos.
use crate::types::{EnrichedPhoto, PhotoId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Upper bound on the number of places shown at once.
pub const MAX_PLACES: usize = 50;
pub const TRENDING_LIMIT: usize = 10;

/// The set of selected vibe tags. Tags are stored trimmed and lowercased, in selection order.
///
/// A photo passes when it carries *every* selected tag; an empty filter passes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VibeFilter {
    tags: Vec<String>,
}

impl VibeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new();
        for tag in tags {
            filter.select(tag.as_ref());
        }
        filter
    }

    /// Adds the tag if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, tag: &str) -> bool {
        let tag = normalize(tag);
        if tag.is_empty() {
            return false;
        }
        if let Some(pos) = self.tags.iter().position(|t| *t == tag) {
            self.tags.remove(pos);
            false
        } else {
            self.tags.push(tag);
            true
        }
    }

    pub fn select(&mut self, tag: &str) {
        let tag = normalize(tag);
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&normalize(tag))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn matches(&self, photo: &EnrichedPhoto) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        let vibes: HashSet<String> = photo.vibes.iter().map(|v| normalize(v)).collect();
        self.tags.iter().all(|tag| vibes.contains(tag))
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// One representative photo per place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DedupedPlace {
    pub photo: EnrichedPhoto,
    /// Index of `photo` in the list the place was aggregated from.
    pub source_index: usize,
    /// How many filtered photos collapsed into this place.
    pub group_size: usize,
}

struct Group {
    best: usize,
    size: usize,
}

/// Filters by vibe, collapses photos sharing a place name and caps the result at [`MAX_PLACES`].
pub fn aggregate(photos: &[EnrichedPhoto], filter: &VibeFilter) -> Vec<DedupedPlace> {
    aggregate_capped(photos, filter, MAX_PLACES)
}

/// Like [`aggregate`] with a custom cap.
///
/// Places are grouped by lowercased `place_name` and keep the first-seen order of their
/// group. Within a group the strictly highest rating wins, ties go to the earlier photo.
pub fn aggregate_capped(
    photos: &[EnrichedPhoto],
    filter: &VibeFilter,
    cap: usize,
) -> Vec<DedupedPlace> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for (index, photo) in photos.iter().enumerate() {
        if !filter.matches(photo) {
            continue;
        }
        let key = photo.place_name.to_lowercase();
        match slots.get(&key) {
            Some(&slot) => {
                let group = &mut groups[slot];
                group.size += 1;
                if photo.rating > photos[group.best].rating {
                    group.best = index;
                }
            }
            None => {
                slots.insert(key, groups.len());
                groups.push(Group {
                    best: index,
                    size: 1,
                });
            }
        }
    }

    groups
        .into_iter()
        .take(cap)
        .map(|group| DedupedPlace {
            photo: photos[group.best].clone(),
            source_index: group.best,
            group_size: group.size,
        })
        .collect()
}

/// The best-rated places, highest first. Equal ratings keep their aggregate order.
pub fn trending(places: &[DedupedPlace], limit: usize) -> Vec<DedupedPlace> {
    let mut ranked = places.to_vec();
    ranked.sort_by(|a, b| b.photo.rating.total_cmp(&a.photo.rating));
    ranked.truncate(limit);
    ranked
}

pub fn position_of(photos: &[EnrichedPhoto], id: PhotoId) -> Option<usize> {
    photos.iter().position(|p| p.id == id)
}

/// Looks a photo up by URL. URLs can repeat, the first match wins.
pub fn position_by_url(photos: &[EnrichedPhoto], url: &str) -> Option<usize> {
    photos.iter().position(|p| p.photo_url == url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::wire::PlaceDetails;
    use crate::types::RawPhoto;

    fn photo(
        position: usize,
        url: &str,
        place: &str,
        rating: f64,
        vibes: &[&str],
    ) -> EnrichedPhoto {
        let raw = RawPhoto {
            id: PhotoId { cycle: 1, position },
            photo_url: url.to_string(),
            latitude: 1.0,
            longitude: 1.0,
            feed_vibes: vec![],
        };
        EnrichedPhoto::from_details(
            raw,
            PlaceDetails {
                place_name: Some(place.to_string()),
                vibes: Some(vibes.iter().map(|v| v.to_string()).collect()),
                rating: Some(rating),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_filter_uses_all_selected_tags() {
        let spot = photo(0, "a.jpg", "Lake", 4.0, &["nature", "peaceful"]);

        let both = VibeFilter::from_tags(["nature", "urban"]);
        assert!(!both.matches(&spot), "Every selected tag must be present");

        let nature = VibeFilter::from_tags(["Nature"]);
        assert!(nature.matches(&spot));

        assert!(VibeFilter::new().matches(&spot), "Empty filter passes everything");
    }

    #[test]
    fn test_filter_matching_ignores_case() {
        let spot = photo(0, "a.jpg", "Mural", 4.0, &["Colorful", "STREET"]);
        assert!(VibeFilter::from_tags(["colorful", "street"]).matches(&spot));
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut filter = VibeFilter::new();
        assert!(filter.toggle("Moody"));
        assert!(filter.contains("moody"));
        assert!(!filter.toggle("moody "));
        assert!(filter.is_empty());
        assert!(!filter.toggle("   "), "Blank tags are ignored");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_dedupe_keeps_highest_rating() {
        let photos = vec![
            photo(0, "a.jpg", "Harbourfront", 3.2, &[]),
            photo(1, "b.jpg", "harbourfront", 4.7, &[]),
        ];

        let places = aggregate(&photos, &VibeFilter::new());

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].photo.rating, 4.7);
        assert_eq!(places[0].photo.photo_url, "b.jpg");
        assert_eq!(places[0].source_index, 1);
        assert_eq!(places[0].group_size, 2);
    }

    #[test]
    fn test_ties_keep_first_photo() {
        let photos = vec![
            photo(0, "first.jpg", "Pier", 4.5, &[]),
            photo(1, "second.jpg", "Pier", 4.5, &[]),
        ];
        let places = aggregate(&photos, &VibeFilter::new());
        assert_eq!(places[0].photo.photo_url, "first.jpg");
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let photos = vec![
            photo(0, "a.jpg", "Zoo", 1.0, &[]),
            photo(1, "b.jpg", "Alley", 2.0, &[]),
            photo(2, "c.jpg", "zoo", 5.0, &[]),
            photo(3, "d.jpg", "123", 3.0, &[]),
        ];
        let names: Vec<String> = aggregate(&photos, &VibeFilter::new())
            .into_iter()
            .map(|p| p.photo.place_name)
            .collect();
        assert_eq!(names, vec!["zoo", "Alley", "123"]);
    }

    #[test]
    fn test_filter_runs_before_dedupe() {
        let photos = vec![
            photo(0, "a.jpg", "Park", 4.9, &["urban"]),
            photo(1, "b.jpg", "Park", 3.0, &["nature"]),
        ];
        let places = aggregate(&photos, &VibeFilter::from_tags(["nature"]));

        assert_eq!(places.len(), 1);
        assert_eq!(places[0].photo.photo_url, "b.jpg");
    }

    #[test]
    fn test_caps_at_fifty_places() {
        let photos: Vec<EnrichedPhoto> = (0..60)
            .map(|i| photo(i, &format!("{i}.jpg"), &format!("Place {i}"), 3.0, &[]))
            .collect();

        let places = aggregate(&photos, &VibeFilter::new());

        assert_eq!(places.len(), 50);
        assert_eq!(places[49].photo.place_name, "Place 49");
    }

    #[test]
    fn test_is_deterministic() {
        let photos: Vec<EnrichedPhoto> = (0..20)
            .map(|i| {
                let place = format!("Place {}", i % 7);
                photo(i, &format!("{i}.jpg"), &place, (i % 5) as f64, &[])
            })
            .collect();
        assert_eq!(
            aggregate(&photos, &VibeFilter::new()),
            aggregate(&photos, &VibeFilter::new())
        );
    }

    #[test]
    fn test_selection_round_trip() {
        let photos = vec![
            photo(0, "dup.jpg", "Park", 3.0, &[]),
            photo(1, "dup.jpg", "Alley", 4.0, &[]),
            photo(2, "c.jpg", "Park", 5.0, &[]),
        ];
        let places = aggregate(&photos, &VibeFilter::new());

        for place in &places {
            let by_id = position_of(&photos, place.photo.id).unwrap();
            assert_eq!(by_id, place.source_index);
            assert_eq!(photos[by_id].photo_url, place.photo.photo_url);
            assert!(position_by_url(&photos, &place.photo.photo_url).is_some());
        }
        // The URL lookup is ambiguous for repeated URLs; the id lookup is not.
        assert_eq!(position_by_url(&photos, "dup.jpg"), Some(0));
        assert_eq!(places[1].source_index, 1);
    }

    #[test]
    fn test_trending_sorts_by_rating() {
        let photos: Vec<EnrichedPhoto> = [2.0, 4.8, 3.5, 4.8, 1.0]
            .iter()
            .enumerate()
            .map(|(i, r)| photo(i, &format!("{i}.jpg"), &format!("Place {i}"), *r, &[]))
            .collect();
        let places = aggregate(&photos, &VibeFilter::new());

        let top = trending(&places, 3);

        let urls: Vec<&str> = top.iter().map(|p| p.photo.photo_url.as_str()).collect();
        assert_eq!(urls, vec!["1.jpg", "3.jpg", "2.jpg"]);
    }
}
