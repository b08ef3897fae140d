//! # Telemetry Payload
//!
//! Weather-station readings and their on-air encoding. A node sends one JSON
//! object per packet, terminated by CRLF, with Portuguese key names that the
//! existing gateways expect:
//!
//! ```text
//! {"temperatura":23.45,"pressao":101,"umidade":56.78}\r\n
//! ```
//!
//! Temperature and humidity carry exactly two decimals; pressure is an
//! integer in kPa.

use crate::constants::MAX_HUMIDITY_PCT;
use crate::radio::registers::MAX_PAYLOAD_LEN;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Telemetry payload of {len} bytes exceeds the {max}-byte packet limit")]
    TooLarge { len: usize, max: usize },

    #[error("Telemetry field `{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("Telemetry payload is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Telemetry payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One set of sensor readings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetryReading {
    #[serde(rename = "temperatura")]
    pub temperature_c: f32,
    #[serde(rename = "pressao")]
    pub pressure_kpa: i32,
    #[serde(rename = "umidade")]
    pub humidity_pct: f32,
}

/// Mean of two temperature sensors
pub fn average_temperature(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}

impl TelemetryReading {
    /// Build a reading, capping humidity at 100 %
    pub fn new(temperature_c: f32, pressure_kpa: i32, humidity_pct: f32) -> Self {
        Self {
            temperature_c,
            pressure_kpa,
            humidity_pct: humidity_pct.min(MAX_HUMIDITY_PCT),
        }
    }

    /// Encode as a CRLF-terminated JSON packet
    pub fn to_payload(&self) -> Result<Vec<u8>, TelemetryError> {
        if !self.temperature_c.is_finite() {
            return Err(TelemetryError::NonFinite("temperatura"));
        }
        if !self.humidity_pct.is_finite() {
            return Err(TelemetryError::NonFinite("umidade"));
        }

        let text = format!(
            "{{\"temperatura\":{:.2},\"pressao\":{},\"umidade\":{:.2}}}\r\n",
            self.temperature_c, self.pressure_kpa, self.humidity_pct
        );
        if text.len() > MAX_PAYLOAD_LEN {
            return Err(TelemetryError::TooLarge {
                len: text.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(text.into_bytes())
    }

    /// Decode a packet produced by [`to_payload`](Self::to_payload)
    pub fn from_payload(payload: &[u8]) -> Result<Self, TelemetryError> {
        let text = std::str::from_utf8(payload)?;
        Ok(serde_json::from_str(text.trim_end())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_format() {
        let reading = TelemetryReading::new(23.456, 101, 56.7);
        let payload = reading.to_payload().unwrap();
        assert_eq!(
            payload,
            b"{\"temperatura\":23.46,\"pressao\":101,\"umidade\":56.70}\r\n".to_vec()
        );
    }

    #[test]
    fn test_humidity_capped() {
        let reading = TelemetryReading::new(20.0, 100, 104.2);
        assert_eq!(reading.humidity_pct, 100.0);
    }

    #[test]
    fn test_average_temperature() {
        assert_eq!(average_temperature(20.0, 22.0), 21.0);
        assert_eq!(average_temperature(-1.5, 1.5), 0.0);
    }

    #[test]
    fn test_parse_back() {
        let packet = b"{\"temperatura\":-3.25,\"pressao\":98,\"umidade\":100.00}\r\n";
        let reading = TelemetryReading::from_payload(packet).unwrap();
        assert_eq!(reading.temperature_c, -3.25);
        assert_eq!(reading.pressure_kpa, 98);
        assert_eq!(reading.humidity_pct, 100.0);
    }

    #[test]
    fn test_rejects_non_finite() {
        let reading = TelemetryReading::new(f32::NAN, 100, 50.0);
        assert!(matches!(
            reading.to_payload(),
            Err(TelemetryError::NonFinite("temperatura"))
        ));
    }

    #[test]
    fn test_extreme_values_fit_one_packet() {
        let reading = TelemetryReading::new(-f32::MAX, i32::MIN, -f32::MAX);
        let payload = reading.to_payload().unwrap();
        assert!(payload.len() <= MAX_PAYLOAD_LEN);
        assert!(payload.ends_with(b"\r\n"));
    }

    #[test]
    fn test_garbage_payload() {
        assert!(matches!(
            TelemetryReading::from_payload(&[0xFF, 0xFE]),
            Err(TelemetryError::Utf8(_))
        ));
        assert!(matches!(
            TelemetryReading::from_payload(b"hello"),
            Err(TelemetryError::Parse(_))
        ));
    }
}
