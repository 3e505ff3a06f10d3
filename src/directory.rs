//! Search, facility filtering and nearest-first ordering for the map list.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    geo::{Coordinates, format_distance, haversine_km},
    models::CafeSummary,
};

#[derive(Debug, Clone, Default)]
pub struct DirectoryQuery {
    pub text: String,
    pub facility_ids: HashSet<Uuid>,
    pub user_location: Option<Coordinates>,
}

/// A cafe as shown on the map, optionally annotated with its distance from
/// the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeListing {
    #[serde(flatten)]
    pub cafe: CafeSummary,
    pub distance_km: Option<f64>,
    pub distance_label: Option<String>,
}

pub fn matches_text(cafe: &CafeSummary, needle: &str) -> bool {
    needle.is_empty() || cafe.name.to_lowercase().contains(needle)
}

/// True when the cafe offers every selected facility.
pub fn has_all_facilities(cafe: &CafeSummary, required: &HashSet<Uuid>) -> bool {
    if required.is_empty() {
        return true;
    }
    let offered: HashSet<Uuid> = cafe.facilities.iter().map(|f| f.id).collect();
    required.is_subset(&offered)
}

/// Derives the display list from the full cafe list. Input order is kept
/// unless a user location is given, in which case listings are sorted
/// nearest first (stable, listings without a distance last).
pub fn filter_cafes(cafes: &[CafeSummary], query: &DirectoryQuery) -> Vec<CafeListing> {
    let needle = query.text.trim().to_lowercase();

    let mut listings: Vec<CafeListing> = cafes
        .iter()
        .filter(|cafe| matches_text(cafe, &needle))
        .filter(|cafe| has_all_facilities(cafe, &query.facility_ids))
        .filter_map(|cafe| {
            let position = cafe.coordinates()?;
            let distance_km = query
                .user_location
                .map(|origin| haversine_km(origin, position));
            Some(CafeListing {
                cafe: cafe.clone(),
                distance_km,
                distance_label: distance_km.map(format_distance),
            })
        })
        .collect();

    if query.user_location.is_some() {
        listings.sort_by(|a, b| match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    listings
}

/// Parses `a,b,c` into facility ids, skipping blanks and anything that is
/// not a UUID.
pub fn parse_facility_ids(raw: Option<&str>) -> HashSet<Uuid> {
    raw.map(|raw| {
        raw.split(',')
            .filter_map(|part| Uuid::parse_str(part.trim()).ok())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Facility;

    fn facility(id: Uuid) -> Facility {
        Facility {
            id,
            code: format!("f-{id}"),
            label: "Facility".into(),
            icon: None,
        }
    }

    fn cafe(name: &str, coords: Option<(f64, f64)>, facilities: &[Uuid]) -> CafeSummary {
        CafeSummary {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: crate::models::slugify(name),
            address: "Yogyakarta".into(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            parking: None,
            price_min: None,
            price_max: None,
            price_range: None,
            google_maps_url: None,
            instagram_url: None,
            instagram_username: None,
            main_image_id: None,
            images: vec![],
            payment_methods: vec![],
            facilities: facilities.iter().copied().map(facility).collect(),
        }
    }

    fn names(listings: &[CafeListing]) -> Vec<&str> {
        listings.iter().map(|l| l.cafe.name.as_str()).collect()
    }

    #[test]
    fn empty_query_keeps_located_cafes_in_order() {
        let cafes = vec![
            cafe("Alpha", Some((-7.79, 110.36)), &[]),
            cafe("Nowhere", None, &[]),
            cafe("Beta", Some((-7.80, 110.37)), &[]),
            cafe("Half", Some((-7.80, 110.37)), &[]),
        ];
        let mut cafes = cafes;
        cafes[3].longitude = None;

        let out = filter_cafes(&cafes, &DirectoryQuery::default());
        assert_eq!(names(&out), vec!["Alpha", "Beta"]);
        assert!(out.iter().all(|l| l.distance_km.is_none()));
    }

    #[test]
    fn text_match_is_case_insensitive_substring() {
        let cafes = vec![
            cafe("Kopi Klotok", Some((-7.7, 110.4)), &[]),
            cafe("Blanco Coffee", Some((-7.7, 110.4)), &[]),
        ];
        let query = DirectoryQuery {
            text: "  KLOT ".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_cafes(&cafes, &query)), vec!["Kopi Klotok"]);
    }

    #[test]
    fn facility_filter_uses_and_semantics() {
        let wifi = Uuid::new_v4();
        let toilet = Uuid::new_v4();
        let cafes = vec![
            cafe("Both", Some((-7.7, 110.4)), &[wifi, toilet]),
            cafe("WifiOnly", Some((-7.7, 110.4)), &[wifi]),
            cafe("None", Some((-7.7, 110.4)), &[]),
        ];

        let query = DirectoryQuery {
            facility_ids: [wifi, toilet].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(names(&filter_cafes(&cafes, &query)), vec!["Both"]);

        let query = DirectoryQuery {
            facility_ids: [wifi].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(names(&filter_cafes(&cafes, &query)), vec!["Both", "WifiOnly"]);
    }

    #[test]
    fn user_location_sorts_nearest_first_and_is_stable() {
        let cafes = vec![
            cafe("Far", Some((-7.90, 110.40)), &[]),
            cafe("TwinA", Some((-7.80, 110.37)), &[]),
            cafe("Near", Some((-7.7830, 110.3672)), &[]),
            cafe("TwinB", Some((-7.80, 110.37)), &[]),
        ];
        let query = DirectoryQuery {
            user_location: Coordinates::new(-7.7829, 110.3671),
            ..Default::default()
        };
        let out = filter_cafes(&cafes, &query);
        assert_eq!(names(&out), vec!["Near", "TwinA", "TwinB", "Far"]);

        let distances: Vec<f64> = out.iter().map(|l| l.distance_km.unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert!(out[0].distance_label.as_deref().unwrap().ends_with(" m"));
    }

    #[test]
    fn input_is_not_mutated() {
        let cafes = vec![
            cafe("B", Some((-7.9, 110.4)), &[]),
            cafe("A", Some((-7.78, 110.36)), &[]),
        ];
        let before = cafes.clone();
        let query = DirectoryQuery {
            user_location: Coordinates::new(-7.78, 110.36),
            ..Default::default()
        };
        let _ = filter_cafes(&cafes, &query);
        assert_eq!(cafes, before);
    }

    #[test]
    fn facility_ids_parse_leniently() {
        let id = Uuid::new_v4();
        let raw = format!(" {id}, ,not-a-uuid");
        let parsed = parse_facility_ids(Some(&raw));
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains(&id));
        assert!(parse_facility_ids(None).is_empty());
    }
}
