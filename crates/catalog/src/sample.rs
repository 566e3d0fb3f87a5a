//! Built-in listing shown when the backing store is unreachable or empty.

use foundation::PlaceId;

use crate::{AccessRules, Amenities, ListedPlace, Ratings};

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    lat: f64,
    lng: f64,
    created_at: &'static str,
    ratings: Ratings,
    review_count: u32,
    amenities: Amenities,
    access: AccessRules,
}

impl Seed {
    fn build(self) -> ListedPlace {
        ListedPlace {
            id: PlaceId::new(self.id),
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            latitude: self.lat,
            longitude: self.lng,
            created_at: self.created_at.to_string(),
            created_by: None,
            updated_at: self.created_at.to_string(),
            ratings: self.ratings,
            review_count: Some(self.review_count),
            amenities: self.amenities,
            access: self.access,
            notes: None,
            is_approved: true,
            approved_by: None,
        }
    }
}

pub fn sample_places() -> Vec<ListedPlace> {
    let seeds = [
        Seed {
            id: "sample-1",
            name: "Bryant Park Public Restroom",
            description: "Attended restroom behind the library, fresh flowers and art on the walls.",
            lat: 40.7536,
            lng: -73.9832,
            created_at: "2024-06-01T12:00:00Z",
            ratings: Ratings {
                overall: Some(4.6),
                cleanliness: Some(9.0),
                smell: Some(8.5),
                safety: Some(9.0),
                supplies: Some(8.0),
                accessibility: Some(8.0),
                crowding: Some(4.0),
                ..Ratings::default()
            },
            review_count: 128,
            amenities: Amenities {
                accessible: true,
                soap: true,
                paper_towels: true,
                changing_table: true,
                ..Amenities::default()
            },
            access: AccessRules::default(),
        },
        Seed {
            id: "sample-2",
            name: "Grand Central Terminal, Lower Level",
            description: "Large facility near the dining concourse. Busy at rush hour.",
            lat: 40.7527,
            lng: -73.9772,
            created_at: "2024-05-20T09:30:00Z",
            ratings: Ratings {
                overall: Some(3.8),
                cleanliness: Some(7.0),
                smell: Some(6.5),
                safety: Some(8.0),
                supplies: Some(7.0),
                accessibility: Some(9.0),
                crowding: Some(2.0),
                ..Ratings::default()
            },
            review_count: 96,
            amenities: Amenities {
                accessible: true,
                soap: true,
                air_dryer: true,
                changing_station: true,
                ..Amenities::default()
            },
            access: AccessRules::default(),
        },
        Seed {
            id: "sample-3",
            name: "Times Square Coffee Shop",
            description: "Single-stall restroom, ask the barista for the code.",
            lat: 40.7580,
            lng: -73.9855,
            created_at: "2024-05-02T16:45:00Z",
            ratings: Ratings {
                overall: Some(3.2),
                cleanliness: Some(6.0),
                safety: Some(7.0),
                supplies: None,
                crowding: Some(5.0),
                ..Ratings::default()
            },
            review_count: 41,
            amenities: Amenities {
                gender_neutral: true,
                soap: true,
                paper_towels: true,
                ..Amenities::default()
            },
            access: AccessRules {
                requires_purchase: true,
                key_required: true,
            },
        },
        Seed {
            id: "sample-4",
            name: "Central Park Conservatory Garden",
            description: "Seasonal hours, closes at dusk.",
            lat: 40.7940,
            lng: -73.9524,
            created_at: "2024-04-11T08:15:00Z",
            ratings: Ratings {
                overall: Some(4.1),
                cleanliness: Some(8.0),
                smell: Some(7.5),
                safety: Some(7.5),
                supplies: Some(6.5),
                accessibility: Some(6.0),
                crowding: Some(8.0),
                ..Ratings::default()
            },
            review_count: 57,
            amenities: Amenities {
                family_friendly: true,
                soap: true,
                ..Amenities::default()
            },
            access: AccessRules::default(),
        },
        Seed {
            id: "sample-5",
            name: "Penn Station, Amtrak Concourse",
            description: "Past the ticketing hall. Lines can be long.",
            lat: 40.7506,
            lng: -73.9935,
            created_at: "2024-03-28T18:00:00Z",
            ratings: Ratings {
                overall: Some(2.4),
                cleanliness: Some(4.0),
                smell: Some(3.0),
                safety: Some(5.5),
                supplies: Some(5.0),
                accessibility: Some(8.5),
                crowding: Some(1.5),
                ..Ratings::default()
            },
            review_count: 203,
            amenities: Amenities {
                accessible: true,
                air_dryer: true,
                ..Amenities::default()
            },
            access: AccessRules::default(),
        },
        Seed {
            id: "sample-6",
            name: "Hudson Yards, Level 2",
            description: "Shopping center restrooms next to the food hall.",
            lat: 40.7538,
            lng: -74.0008,
            created_at: "2024-03-03T11:20:00Z",
            ratings: Ratings::default(),
            review_count: 0,
            amenities: Amenities {
                accessible: true,
                gender_neutral: true,
                soap: true,
                sanitizer: true,
                tampons: true,
                ..Amenities::default()
            },
            access: AccessRules::default(),
        },
    ];

    seeds.into_iter().map(Seed::build).collect()
}
