//! Live traffic snapshot published by the flight simulation server.

use serde::{Deserialize, Serialize};

use crate::domain::flight_plan::FlightPlan;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct OnlineGeneral {
    pub version: i32,
    pub generate_time: String,
    pub connected_clients: i32,
    pub online_pilot: i32,
    pub online_controller: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OnlineController {
    pub cid: i32,
    pub callsign: String,
    pub real_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: i32,
    pub facility: i32,
    pub frequency: i32,
    #[serde(default)]
    pub atc_info: Vec<String>,
    pub logon_time: String,
    #[serde(default)]
    pub is_break: bool,
    #[serde(default)]
    pub offline_time: String,
}

impl OnlineController {
    /// Frequency in the `118.500` notation; the server sends kHz offsets such as `18500`.
    pub fn frequency_mhz(&self) -> String {
        let khz = 100_000 + self.frequency;
        format!("{}.{:03}", khz / 1000, khz % 1000)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OnlinePilot {
    pub cid: i32,
    pub callsign: String,
    pub real_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub transponder: String,
    pub heading: i32,
    pub altitude: i32,
    pub ground_speed: i32,
    #[serde(default)]
    pub flight_plan: Option<FlightPlan>,
    pub logon_time: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct OnlineClients {
    pub general: OnlineGeneral,
    #[serde(default)]
    pub controllers: Vec<OnlineController>,
    #[serde(default)]
    pub pilots: Vec<OnlinePilot>,
}

impl OnlineClients {
    pub fn find_pilot(&self, callsign: &str) -> Option<&OnlinePilot> {
        self.pilots
            .iter()
            .find(|pilot| pilot.callsign.eq_ignore_ascii_case(callsign))
    }

    pub fn find_controller(&self, callsign: &str) -> Option<&OnlineController> {
        self.controllers
            .iter()
            .find(|controller| controller.callsign.eq_ignore_ascii_case(callsign))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlightPathPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_is_rendered_in_mhz() {
        let controller = OnlineController {
            cid: 1,
            callsign: "ZBAA_TWR".into(),
            real_name: "Tower".into(),
            latitude: 40.0,
            longitude: 116.5,
            rating: 5,
            facility: 4,
            frequency: 18500,
            atc_info: vec![],
            logon_time: String::new(),
            is_break: false,
            offline_time: String::new(),
        };
        assert_eq!(controller.frequency_mhz(), "118.500");
    }

    #[test]
    fn lookup_ignores_case() {
        let snapshot: OnlineClients = serde_json::from_str(
            r#"{
                "general": {"version": 3, "generate_time": "2025-03-01T12:00:00Z",
                            "connected_clients": 1, "online_pilot": 1, "online_controller": 0},
                "controllers": [],
                "pilots": [{"cid": 2, "callsign": "CCA1234", "real_name": "P", "latitude": 31.1,
                            "longitude": 121.3, "transponder": "2000", "heading": 90,
                            "altitude": 32000, "ground_speed": 450, "logon_time": "x"}]
            }"#,
        )
        .expect("valid snapshot");
        assert!(snapshot.find_pilot("cca1234").is_some());
        assert!(snapshot.find_controller("CCA1234").is_none());
    }
}
