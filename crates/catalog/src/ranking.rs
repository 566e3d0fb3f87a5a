//! Ordering of the place listing.
//!
//! Distance ordering needs an observer location. Without one the listing keeps
//! its incoming order and reports [`RankMode::DistanceUnavailable`], which the
//! caller renders as an ordinary state rather than an error.

use foundation::{GeoPoint, stable_total_cmp_f64};
use serde::{Deserialize, Serialize};

use crate::{ListedPlace, RatingKey};

/// Active sort selection of the listing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Distance,
    Rating(RatingKey),
    /// Unrecognised selection; incoming order is kept.
    Unsorted,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "distance" => SortKey::Distance,
            other => RatingKey::parse(other)
                .map(SortKey::Rating)
                .unwrap_or(SortKey::Unsorted),
        }
    }
}

/// How a ranking was actually ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "key")]
pub enum RankMode {
    ByDistance,
    ByRating(RatingKey),
    /// Distance was selected but no observer location is known.
    DistanceUnavailable,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlace {
    pub place: ListedPlace,
    /// Miles from the observer, when the observer location is known.
    pub distance_miles: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub mode: RankMode,
    pub entries: Vec<RankedPlace>,
}

/// Orders `places` by `key`.
///
/// Uses a stable sort: records with equal keys keep their incoming order.
/// Rating keys sort descending with a missing rating counted as zero.
pub fn rank_places(places: Vec<ListedPlace>, key: SortKey, observer: Option<GeoPoint>) -> Ranking {
    let mut entries: Vec<RankedPlace> = places
        .into_iter()
        .map(|place| {
            let distance_miles = observer.map(|o| o.distance_miles(&place.location()));
            RankedPlace {
                place,
                distance_miles,
            }
        })
        .collect();

    let mode = match (key, observer) {
        (SortKey::Distance, Some(_)) => {
            entries.sort_by(|a, b| {
                stable_total_cmp_f64(
                    a.distance_miles.unwrap_or(0.0),
                    b.distance_miles.unwrap_or(0.0),
                )
            });
            RankMode::ByDistance
        }
        (SortKey::Distance, None) => RankMode::DistanceUnavailable,
        (SortKey::Rating(rating), _) => {
            entries.sort_by(|a, b| {
                stable_total_cmp_f64(
                    b.place.rating(rating).unwrap_or(0.0),
                    a.place.rating(rating).unwrap_or(0.0),
                )
            });
            RankMode::ByRating(rating)
        }
        (SortKey::Unsorted, _) => RankMode::Unchanged,
    };

    Ranking { mode, entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_places;
    use foundation::PlaceId;
    use pretty_assertions::assert_eq;

    fn place(id: &str, lat: f64, lng: f64, overall: Option<f64>) -> ListedPlace {
        let mut p = sample_places().remove(0);
        p.id = PlaceId::new(id);
        p.latitude = lat;
        p.longitude = lng;
        p.ratings.overall = overall;
        p
    }

    fn ids(ranking: &Ranking) -> Vec<&str> {
        ranking.entries.iter().map(|e| e.place.id.as_str()).collect()
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!(SortKey::parse("distance"), SortKey::Distance);
        assert_eq!(SortKey::parse("crowding"), SortKey::Rating(RatingKey::Crowding));
        assert_eq!(SortKey::parse("price"), SortKey::Unsorted);
        assert_eq!(SortKey::default(), SortKey::Distance);
    }

    #[test]
    fn distance_sort_is_ascending() {
        let observer = GeoPoint::new(40.0, -74.0);
        let places = vec![
            place("far", 41.0, -74.0, None),
            place("here", 40.0, -74.0, None),
            place("mid", 40.5, -74.0, None),
        ];
        let ranking = rank_places(places, SortKey::Distance, Some(observer));
        assert_eq!(ranking.mode, RankMode::ByDistance);
        assert_eq!(ids(&ranking), vec!["here", "mid", "far"]);
        assert_eq!(ranking.entries[0].distance_miles, Some(0.0));

        let d = ranking.entries[2].distance_miles.unwrap();
        assert!((d - 69.1).abs() < 0.1, "got {d}");

        for pair in ranking.entries.windows(2) {
            assert!(pair[0].distance_miles <= pair[1].distance_miles);
        }
    }

    #[test]
    fn distance_without_observer_keeps_order() {
        let places = vec![
            place("a", 41.0, -74.0, Some(1.0)),
            place("b", 40.0, -74.0, Some(5.0)),
        ];
        let ranking = rank_places(places, SortKey::Distance, None);
        assert_eq!(ranking.mode, RankMode::DistanceUnavailable);
        assert_eq!(ids(&ranking), vec!["a", "b"]);
        assert!(ranking.entries.iter().all(|e| e.distance_miles.is_none()));
    }

    #[test]
    fn rating_sort_is_descending_with_missing_as_zero() {
        let places = vec![
            place("none", 40.0, -74.0, None),
            place("good", 40.0, -74.0, Some(7.5)),
        ];
        let ranking = rank_places(places, SortKey::Rating(RatingKey::Overall), None);
        assert_eq!(ranking.mode, RankMode::ByRating(RatingKey::Overall));
        assert_eq!(ids(&ranking), vec!["good", "none"]);
    }

    #[test]
    fn equal_keys_keep_incoming_order() {
        let places = vec![
            place("first", 40.0, -74.0, Some(3.0)),
            place("top", 40.0, -74.0, Some(4.0)),
            place("second", 40.0, -74.0, Some(3.0)),
            place("third", 40.0, -74.0, Some(3.0)),
        ];
        let ranking = rank_places(places.clone(), SortKey::Rating(RatingKey::Overall), None);
        assert_eq!(ids(&ranking), vec!["top", "first", "second", "third"]);

        let observer = Some(GeoPoint::new(10.0, 10.0));
        let ranking = rank_places(places, SortKey::Distance, observer);
        assert_eq!(ids(&ranking), vec!["first", "top", "second", "third"]);
    }

    #[test]
    fn unknown_key_is_a_no_op() {
        let places = vec![
            place("b", 41.0, -74.0, Some(1.0)),
            place("a", 40.0, -74.0, Some(9.0)),
        ];
        let ranking = rank_places(places, SortKey::Unsorted, Some(GeoPoint::new(40.0, -74.0)));
        assert_eq!(ranking.mode, RankMode::Unchanged);
        assert_eq!(ids(&ranking), vec!["b", "a"]);
        assert!(ranking.entries[0].distance_miles.is_some());
    }
}
