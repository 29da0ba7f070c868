use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct FlightPlan {
    pub cid: i32,
    pub callsign: String,
    pub flight_rules: String,
    pub aircraft: String,
    pub cruise_tas: i32,
    pub departure: String,
    /// Planned off-block time encoded as `HHMM`.
    pub departure_time: i32,
    pub altitude: String,
    pub arrival: String,
    #[serde(default)]
    pub alternate: String,
    pub route_time_hour: String,
    pub route_time_minute: String,
    pub fuel_time_hour: String,
    pub fuel_time_minute: String,
    #[serde(default)]
    pub remarks: String,
    pub route: String,
    #[serde(default)]
    pub locked: bool,
}

impl FlightPlan {
    /// One-line summary in the `DEP-ARR ROUTE` style pilots recognise.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {}-{} {} {}",
            self.callsign, self.aircraft, self.departure, self.arrival, self.altitude, self.route
        )
    }
}
