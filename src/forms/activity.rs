//! Forms for activity sign-up and publishing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::activity::{NewActivity, NewActivityFacility};
use crate::domain::types::{Callsign, Rating};
use crate::forms::{FormError, normalize_icao};

#[derive(Clone, Debug, Deserialize, Validate)]
/// Pilot sign-up for an activity.
pub struct PilotSignForm {
    pub callsign: String,
    #[validate(length(min = 1, max = 16))]
    pub aircraft_type: String,
}

/// Body of `POST /activities/{id}/pilots`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PilotSignPayload {
    pub callsign: String,
    pub aircraft_type: String,
}

impl TryFrom<PilotSignForm> for PilotSignPayload {
    type Error = FormError;

    fn try_from(form: PilotSignForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let callsign = Callsign::new(form.callsign).map_err(|_| FormError::InvalidCallsign)?;
        Ok(Self {
            callsign: callsign.as_str().to_string(),
            aircraft_type: form.aircraft_type.trim().to_uppercase(),
        })
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
/// Controller position offered in an activity.
pub struct FacilityForm {
    pub callsign: String,
    #[validate(length(min = 1))]
    pub frequency: String,
    pub min_rating: i32,
    #[serde(default)]
    pub tier2_tower: bool,
}

#[derive(Clone, Debug, Deserialize, Validate)]
/// Activity publish/edit form.
pub struct ActivityForm {
    #[validate(length(min = 1, max = 128))]
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
    #[serde(default)]
    pub notams: String,
    #[serde(default)]
    #[validate(nested)]
    pub facilities: Vec<FacilityForm>,
}

impl TryFrom<ActivityForm> for NewActivity {
    type Error = FormError;

    fn try_from(form: ActivityForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let facilities = form
            .facilities
            .into_iter()
            .map(|facility| {
                let callsign =
                    Callsign::new(facility.callsign).map_err(|_| FormError::InvalidCallsign)?;
                Rating::try_from(facility.min_rating)?;
                Ok(NewActivityFacility {
                    callsign: callsign.as_str().to_string(),
                    frequency: facility.frequency.trim().to_string(),
                    min_rating: facility.min_rating,
                    tier2_tower: facility.tier2_tower,
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        Ok(NewActivity {
            title: form.title.trim().to_string(),
            image_url: form.image_url.trim().to_string(),
            active_time: form.active_time,
            departure_airport: normalize_icao(&form.departure_airport)?,
            arrival_airport: normalize_icao(&form.arrival_airport)?,
            route: form.route.trim().to_uppercase(),
            distance: form.distance.max(0),
            notams: form.notams.trim().to_string(),
            facilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pilot_sign_upper_cases_inputs() {
        let payload = PilotSignPayload::try_from(PilotSignForm {
            callsign: "cca1234".to_string(),
            aircraft_type: " b738 ".to_string(),
        })
        .expect("valid sign-up");
        assert_eq!(payload.callsign, "CCA1234");
        assert_eq!(payload.aircraft_type, "B738");
    }

    #[test]
    fn pilot_sign_requires_aircraft() {
        let result = PilotSignPayload::try_from(PilotSignForm {
            callsign: "CCA1234".to_string(),
            aircraft_type: String::new(),
        });
        assert!(matches!(result, Err(FormError::Validation(_))));
    }

    #[test]
    fn activity_form_validates_airports_and_ratings() {
        let form = ActivityForm {
            title: "Fly-in".to_string(),
            image_url: String::new(),
            active_time: "2025-03-01T12:00:00Z".parse().unwrap(),
            departure_airport: "zsss".to_string(),
            arrival_airport: "zbaa".to_string(),
            route: "pikas g330 pimol".to_string(),
            distance: 580,
            notams: String::new(),
            facilities: vec![FacilityForm {
                callsign: "zbaa_twr".to_string(),
                frequency: "118.500".to_string(),
                min_rating: 5,
                tier2_tower: false,
            }],
        };
        let activity = NewActivity::try_from(form.clone()).expect("valid activity");
        assert_eq!(activity.departure_airport, "ZSSS");
        assert_eq!(activity.route, "PIKAS G330 PIMOL");
        assert_eq!(activity.facilities[0].callsign, "ZBAA_TWR");

        let mut bad = form;
        bad.facilities[0].min_rating = 42;
        assert!(matches!(
            NewActivity::try_from(bad),
            Err(FormError::Constraint(_))
        ));
    }
}
