//! Flight plan filing form.

use serde::Deserialize;
use validator::Validate;

use crate::domain::flight_plan::FlightPlan;
use crate::domain::types::{Callsign, TypeConstraintError};
use crate::forms::{FormError, normalize_icao};

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct FlightPlanForm {
    pub callsign: String,
    /// `I` for IFR, `V` for VFR.
    #[validate(length(equal = 1))]
    pub flight_rules: String,
    #[validate(length(min = 1))]
    pub aircraft: String,
    #[validate(range(min = 0, max = 9999))]
    pub cruise_tas: i32,
    pub departure: String,
    #[validate(range(min = 0, max = 2359))]
    pub departure_time: i32,
    #[validate(length(min = 1))]
    pub altitude: String,
    pub arrival: String,
    #[serde(default)]
    pub alternate: String,
    #[validate(range(min = 0, max = 99))]
    pub route_hours: u32,
    #[validate(range(min = 0, max = 59))]
    pub route_minutes: u32,
    #[validate(range(min = 0, max = 99))]
    pub fuel_hours: u32,
    #[validate(range(min = 0, max = 59))]
    pub fuel_minutes: u32,
    #[serde(default)]
    pub remarks: String,
    #[validate(length(min = 1))]
    pub route: String,
}

impl FlightPlanForm {
    /// Converts the form into the plan filed under `cid`.
    pub fn into_plan(self, cid: i32) -> Result<FlightPlan, FormError> {
        self.validate()?;
        let rules = self.flight_rules.trim().to_uppercase();
        if rules != "I" && rules != "V" {
            return Err(FormError::Constraint(
                TypeConstraintError::InvalidValue(format!(
                    "flight rules `{rules}`"
                )),
            ));
        }
        let callsign = Callsign::new(self.callsign).map_err(|_| FormError::InvalidCallsign)?;
        let alternate = if self.alternate.trim().is_empty() {
            String::new()
        } else {
            normalize_icao(&self.alternate)?
        };
        // Minutes of departure time must also be a valid clock value.
        if self.departure_time % 100 > 59 {
            return Err(FormError::Constraint(
                TypeConstraintError::InvalidValue(format!(
                    "departure time {:04}",
                    self.departure_time
                )),
            ));
        }

        Ok(FlightPlan {
            cid,
            callsign: callsign.as_str().to_string(),
            flight_rules: rules,
            aircraft: self.aircraft.trim().to_uppercase(),
            cruise_tas: self.cruise_tas,
            departure: normalize_icao(&self.departure)?,
            departure_time: self.departure_time,
            altitude: self.altitude.trim().to_uppercase(),
            arrival: normalize_icao(&self.arrival)?,
            alternate,
            route_time_hour: self.route_hours.to_string(),
            route_time_minute: format!("{:02}", self.route_minutes),
            fuel_time_hour: self.fuel_hours.to_string(),
            fuel_time_minute: format!("{:02}", self.fuel_minutes),
            remarks: self.remarks.trim().to_string(),
            route: self.route.trim().to_uppercase(),
            locked: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FlightPlanForm {
        FlightPlanForm {
            callsign: "cca1501".to_string(),
            flight_rules: "i".to_string(),
            aircraft: "b738/m-sdfgw/c".to_string(),
            cruise_tas: 450,
            departure: "zbaa".to_string(),
            departure_time: 1230,
            altitude: "fl331".to_string(),
            arrival: "zsss".to_string(),
            alternate: String::new(),
            route_hours: 2,
            route_minutes: 5,
            fuel_hours: 4,
            fuel_minutes: 0,
            remarks: "/v/".to_string(),
            route: "pik g330 pimol".to_string(),
        }
    }

    #[test]
    fn plan_is_normalized() {
        let plan = form().into_plan(2352).expect("valid plan");
        assert_eq!(plan.callsign, "CCA1501");
        assert_eq!(plan.flight_rules, "I");
        assert_eq!(plan.route_time_minute, "05");
        assert_eq!(plan.alternate, "");
        assert!(!plan.locked);
    }

    #[test]
    fn invalid_departure_minutes_are_rejected() {
        let mut form = form();
        form.departure_time = 1275;
        assert!(form.into_plan(1).is_err());
    }

    #[test]
    fn unknown_flight_rules_are_rejected() {
        let mut form = form();
        form.flight_rules = "Y".to_string();
        assert!(matches!(form.into_plan(1), Err(FormError::Constraint(_))));
    }
}
