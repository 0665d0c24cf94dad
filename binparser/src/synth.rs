/*!
Synthetic log generation.

Produces a `.bin` file with plausible mask readings so the parser can be
exercised without a device. Short runs of noise are placed between some
records, as seen in real logs.
*/

use anyhow::{Context, Result};
use neuromask_shared::encode::{encode_frame, MAX_RECORD_ID};
use std::path::Path;
use tracing::{debug, info};

/// Noise inserted between records
const INTER_RECORD_NOISE: [u8; 3] = [0x00, 0x13, 0x37];

/// Sensor readings for one synthetic record
fn synthetic_params(index: u32) -> Vec<(u8, f32)> {
    let t = index as f32 * 0.1;

    vec![
        (0x10, 4.0 + 0.5 * t.sin()),           // Exhaled CO2, %
        (0x11, 16.0 + 0.4 * t.cos()),          // Exhaled O2, %
        (0x12, 36.6 + 0.2 * (t * 0.3).sin()),  // Body temperature
        (0x13, 85.0 + 5.0 * (t * 0.5).sin()),  // Humidity of exhalation
        (0x15, 1013.25 + (t * 0.01).sin()),    // Atmosphere pressure
        (0x16, 21.5 + 0.5 * (t * 0.05).cos()), // Outside temperature
        (0x18, 0.02 * (t * 2.0).sin()),        // IMU ax
        (0x19, 0.02 * (t * 2.0).cos()),        // IMU ay
        (0x1A, 1.0 + 0.01 * t.sin()),          // IMU az
        (0x24, 97.0 + (t * 0.2).sin()),        // SpO2
        (0x26, 72.0 + 6.0 * (t * 0.7).sin()),  // Heart rate
        (0x27, index as f32 * 1.5),            // Steps
        (0x28, 100.0 - index as f32 * 0.01),   // Battery charge
    ]
}

/// Generate a synthetic log of up to `records` records.
/// Returns the log bytes and the number of records actually encoded.
pub fn generate_synthetic_log(records: u32, start_timestamp: u32) -> (Vec<u8>, u32) {
    let mut data = Vec::new();
    let mut encoded = 0u32;

    for index in 0..records {
        if index % 10 == 0 {
            data.extend_from_slice(&INTER_RECORD_NOISE);
        }

        let id = index & MAX_RECORD_ID;
        match encode_frame(id, start_timestamp.wrapping_add(index), &synthetic_params(index)) {
            Ok(frame) => {
                data.extend_from_slice(&frame);
                encoded += 1;
            }
            Err(e) => debug!("Skipping synthetic record {}: {}", index, e),
        }
    }

    (data, encoded)
}

/// Write a synthetic log file
pub fn write_synthetic_log<P: AsRef<Path>>(path: P, records: u32, start_timestamp: u32) -> Result<u32> {
    let path = path.as_ref();
    let (data, encoded) = generate_synthetic_log(records, start_timestamp);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    std::fs::write(path, &data)
        .with_context(|| format!("Failed to write synthetic log: {}", path.display()))?;

    info!("🧪 Generated synthetic log {} with {} records ({} bytes)", path.display(), encoded, data.len());
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuromask_shared::{MemorySink, RecordDecoder};
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_synthetic_log_decodes() {
        let (data, encoded) = generate_synthetic_log(50, 1_700_000_000);
        assert!(encoded > 0);

        let decoder = RecordDecoder::with_sink(3, MemorySink::new());
        let records = decoder.decode_reader(Cursor::new(data)).unwrap();

        assert_eq!(records.len(), encoded as usize);
        assert!(decoder.sink().is_empty());
        assert_eq!(records[0].parameters().len(), 13);
        assert_eq!(records[0].get("Heart rate"), Some(72.0));
        assert_eq!(records[0].timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_write_synthetic_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("synthetic.bin");

        let encoded = write_synthetic_log(&path, 5, 0).unwrap();
        assert!(encoded <= 5);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
