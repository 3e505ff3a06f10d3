use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;
use wfc_jogja_api::{
    directory::{DirectoryQuery, filter_cafes, parse_facility_ids},
    favorites::{FavoriteSet, MemoryFavoriteStore},
    geo::Coordinates,
    models::{CafeSummary, Facility, slugify},
    opening_hours::{DayOfWeek, DaySchedule, Locale, StatusReason, parse_wall_clock, status_at},
};

fn facility(code: &str) -> Facility {
    Facility {
        id: Uuid::new_v4(),
        code: code.into(),
        label: code.to_uppercase(),
        icon: None,
    }
}

fn cafe(name: &str, lat: f64, lng: f64, facilities: Vec<Facility>) -> CafeSummary {
    CafeSummary {
        id: Uuid::new_v4(),
        name: name.into(),
        slug: slugify(name),
        address: "Yogyakarta".into(),
        latitude: Some(lat),
        longitude: Some(lng),
        parking: Some("Motor, Mobil".into()),
        price_min: None,
        price_max: None,
        price_range: None,
        google_maps_url: None,
        instagram_url: None,
        instagram_username: None,
        main_image_id: None,
        images: Vec::new(),
        payment_methods: Vec::new(),
        facilities,
    }
}

fn at(day: u32, hh: u32, mm: u32) -> NaiveDateTime {
    // October 2026: the 19th is a Monday.
    NaiveDate::from_ymd_opt(2026, 10, day)
        .and_then(|d| d.and_hms_opt(hh, mm, 0))
        .expect("valid date")
}

fn schedule(day: DayOfWeek, open: &str, close: &str) -> DaySchedule {
    DaySchedule {
        day,
        open_time: parse_wall_clock(open),
        close_time: parse_wall_clock(close),
        is_closed: false,
        is_open_24_hours: false,
    }
}

#[test]
fn search_filters_and_sorts_nearest_first() {
    let wifi = facility("wifi");
    let outlet = facility("power_outlet");
    let cafes = vec![
        // Far away, north of the city.
        cafe("Kopi Kaliurang", -7.6000, 110.4200, vec![wifi.clone(), outlet.clone()]),
        cafe("Blanco Coffee & Books", -7.7956, 110.3695, vec![wifi.clone(), outlet.clone()]),
        cafe("Warung Kopi", -7.7900, 110.3650, vec![wifi.clone()]),
    ];

    let query = DirectoryQuery {
        text: "  KOPI ".into(),
        facility_ids: parse_facility_ids(Some(&format!("{}, {}", wifi.id, outlet.id))),
        user_location: Coordinates::new(-7.7829, 110.3671),
    };
    let listings = filter_cafes(&cafes, &query);
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].cafe.name, "Kopi Kaliurang");

    let everything = DirectoryQuery {
        user_location: Coordinates::new(-7.7829, 110.3671),
        ..DirectoryQuery::default()
    };
    let names: Vec<_> = filter_cafes(&cafes, &everything)
        .into_iter()
        .map(|l| l.cafe.name)
        .collect();
    assert_eq!(names, ["Warung Kopi", "Blanco Coffee & Books", "Kopi Kaliurang"]);
}

#[test]
fn listing_without_location_has_no_distance() {
    let cafes = vec![cafe("Blanco Coffee & Books", -7.7956, 110.3695, Vec::new())];
    let listings = filter_cafes(&cafes, &DirectoryQuery::default());
    assert_eq!(listings.len(), 1);
    assert!(listings[0].distance_km.is_none());
    assert!(listings[0].distance_label.is_none());

    let json = serde_json::to_value(&listings[0]).expect("serialize");
    assert_eq!(json["name"], "Blanco Coffee & Books");
    assert!(json["distanceKm"].is_null());
}

#[test]
fn overnight_hours_roll_past_midnight() {
    let rows = vec![
        schedule(DayOfWeek::Monday, "18:00", "02:00"),
        schedule(DayOfWeek::Tuesday, "07:00", "00:00"),
    ];

    assert!(status_at(&rows, at(19, 23, 0)).is_open);
    assert!(status_at(&rows, at(19, 1, 30)).is_open);
    assert!(!status_at(&rows, at(19, 12, 0)).is_open);
    assert!(status_at(&rows, at(20, 23, 45)).is_open);

    let wednesday = status_at(&rows, at(21, 12, 0));
    assert_eq!(wednesday.reason, StatusReason::ClosedToday);
    assert_eq!(wednesday.label(Locale::Id), "Tutup Hari Ini");
}

#[test]
fn unparseable_hours_read_as_closed() {
    let rows = vec![schedule(DayOfWeek::Monday, "9am", "23:00")];
    let status = status_at(&rows, at(19, 12, 0));
    assert!(!status.is_open);
    assert_eq!(status.label(Locale::En), "Closed Now");
}

#[tokio::test]
async fn favorites_survive_a_reload() -> anyhow::Result<()> {
    let store = MemoryFavoriteStore::default();
    let owner = Uuid::new_v4();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let mut set = FavoriteSet::load(&store, owner).await?;
    assert!(set.add(a));
    assert!(set.toggle(b));
    assert!(!set.add(a));
    set.save(&store).await?;

    let mut reloaded = FavoriteSet::load(&store, owner).await?;
    assert_eq!(reloaded.ids(), &[a, b]);
    assert!(!reloaded.toggle(a));
    reloaded.save(&store).await?;

    let other = FavoriteSet::load(&store, Uuid::new_v4()).await?;
    assert!(other.ids().is_empty());
    assert_eq!(FavoriteSet::load(&store, owner).await?.ids(), &[b]);
    Ok(())
}
