use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{ActivityId, FacilityId, PilotId, resolve_asset_url};
use crate::domain::user::User;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    pub publisher: i32,
    pub title: String,
    #[serde(default)]
    pub image_url: String,
    pub active_time: DateTime<Utc>,
    pub departure_airport: String,
    pub arrival_airport: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub distance: i32,
    pub status: i32,
    #[serde(rename = "NOTAMS", default)]
    pub notams: String,
    #[serde(default)]
    pub pilots: Vec<ActivityPilot>,
    #[serde(default)]
    pub controllers: Vec<ActivityController>,
    #[serde(default)]
    pub facilities: Vec<ActivityFacility>,
}

impl Activity {
    /// Rewrites a relative banner path into an absolute URL.
    pub fn resolve_assets(&mut self, backend_url: &str) {
        self.image_url = resolve_asset_url(backend_url, &self.image_url);
    }

    /// Pilot sign-up belonging to the given member, if any.
    pub fn pilot_by_cid(&self, cid: i32) -> Option<&ActivityPilot> {
        self.pilots
            .iter()
            .find(|pilot| pilot.user.as_ref().map(|user| user.cid) == Some(cid))
    }

    /// Facilities nobody has signed up for yet.
    pub fn open_facilities(&self) -> impl Iterator<Item = &ActivityFacility> {
        self.facilities
            .iter()
            .filter(|facility| facility.controller.is_none())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityController {
    pub id: i32,
    pub activity_id: ActivityId,
    pub facility_id: FacilityId,
    pub uid: i32,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityFacility {
    pub id: FacilityId,
    pub activity_id: ActivityId,
    #[serde(default)]
    pub tier2_tower: bool,
    pub min_rating: i32,
    pub callsign: String,
    pub frequency: String,
    #[serde(default)]
    pub controller: Option<ActivityController>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityPilot {
    pub id: PilotId,
    pub activity_id: ActivityId,
    pub uid: i32,
    #[serde(default)]
    pub user: Option<User>,
    pub callsign: String,
    pub aircraft_type: String,
    pub status: i32,
}

/// Facility definition sent when an activity is created or edited.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewActivityFacility {
    pub callsign: String,
    pub frequency: String,
    pub min_rating: i32,
    pub tier2_tower: bool,
}

/// Activity body for create and update requests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewActivity {
    pub title: String,
    pub image_url: String,
    pub active_time: DateTime<Utc>,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub route: String,
    pub distance: i32,
    #[serde(rename = "NOTAMS")]
    pub notams: String,
    pub facilities: Vec<NewActivityFacility>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVITY_JSON: &str = r#"{
        "id": 12, "publisher": 1, "title": "Beijing fly-in",
        "image_url": "images/12.png", "active_time": "2025-03-01T12:00:00Z",
        "departure_airport": "ZSSS", "arrival_airport": "ZBAA",
        "route": "PIKAS G330 PIMOL", "distance": 580, "status": 0,
        "NOTAMS": "Runway 36R closed",
        "pilots": [],
        "controllers": [],
        "facilities": [
            {"id": 1, "activity_id": 12, "min_rating": 5, "callsign": "ZBAA_TWR", "frequency": "118.500"},
            {"id": 2, "activity_id": 12, "min_rating": 6, "callsign": "ZBAA_APP", "frequency": "119.000",
             "controller": {"id": 4, "activity_id": 12, "facility_id": 2, "uid": 9}}
        ]
    }"#;

    #[test]
    fn deserializes_notams_and_facilities() {
        let activity: Activity = serde_json::from_str(ACTIVITY_JSON).expect("valid activity");

        assert_eq!(activity.notams, "Runway 36R closed");
        assert_eq!(activity.facilities.len(), 2);
        let open: Vec<_> = activity.open_facilities().map(|f| f.callsign.as_str()).collect();
        assert_eq!(open, vec!["ZBAA_TWR"]);
    }

    #[test]
    fn resolves_banner_url() {
        let mut activity: Activity = serde_json::from_str(ACTIVITY_JSON).expect("valid activity");
        activity.resolve_assets("https://api.example.org");
        assert_eq!(activity.image_url, "https://api.example.org/images/12.png");
    }
}
