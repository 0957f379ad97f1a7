#![cfg(feature = "serde")]

use agri_j1939::{
    telemetry::{Sample, Telemetry},
    DecoderConfig, EvictionPolicy, Id, Payload, Pgn, RawFrame, DESTINATION_BROADCAST,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde_json::json;

fn frame(pgn: Pgn, data: &[u8], timestamp_ms: u64) -> RawFrame {
    RawFrame::from_slice(Id::new(3, pgn.raw(), 0x00, DESTINATION_BROADCAST), data, timestamp_ms)
}

#[test]
fn decoded_serializes_as_field_map() {
    let decoded = Pgn::EngineSpeed.decode(&Payload([0, 0, 0x10, 0x27, 0, 0, 0, 0]));
    assert_eq!(
        serde_json::to_value(&decoded).unwrap(),
        json!({ "engine_speed": { "value": 1250.0, "unit": "RPM" } })
    );

    let decoded = Pgn::Transmission.decode(&Payload([0x21, 0, 0, 0, 0, 0, 0, 0]));
    assert_eq!(
        serde_json::to_value(&decoded).unwrap(),
        json!({ "gear": { "value": 1 }, "mode": { "value": "PowrShift" } })
    );
}

#[test]
fn fractional_readings_have_no_float_noise() {
    let decoded = Pgn::FuelLevel.decode(&Payload([1, 0, 0, 0, 0, 0, 0, 0]));
    assert_eq!(
        serde_json::to_value(&decoded).unwrap(),
        json!({ "fuel_level": { "value": 0.4, "unit": "%" } })
    );
    assert_eq!(
        serde_json::to_string(&decoded).unwrap(),
        r#"{"fuel_level":{"value":0.4,"unit":"%"}}"#
    );

    let decoded = Pgn::TransmissionSpeed.decode(&Payload([0x35, 0x30, 0, 0, 0, 0, 0, 0]));
    let value = serde_json::to_value(&decoded).unwrap();
    assert_eq!(value["transmission_speed"]["value"], 12.34);
}

#[test]
fn telemetry_snapshot() {
    let telemetry = Telemetry::<CriticalSectionRawMutex>::new();
    let f = frame(Pgn::FuelLevel, &[125], 42);
    telemetry.record(Sample::new(&f, Pgn::FuelLevel.decode(&f.payload())));
    telemetry.record_unsupported();

    let value = telemetry.with(|state| serde_json::to_value(state).unwrap());
    assert_eq!(value["current"]["timestamp_ms"], 42);
    assert_eq!(value["current"]["decoded"]["fuel_level"]["unit"], "%");
    assert_eq!(value["current"]["decoded"]["fuel_level"]["value"], 50.0);
    assert_eq!(value["history"].as_array().unwrap().len(), 1);
    assert_eq!(value["counters"]["unsupported"], 1);
}

#[test]
fn config_from_json() {
    let config: DecoderConfig = serde_json::from_str(r#"{ "policy": "lru" }"#).unwrap();
    assert_eq!(config.capacity, 100);
    assert_eq!(config.policy, EvictionPolicy::Lru);

    let config: DecoderConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, DecoderConfig::default());
}
