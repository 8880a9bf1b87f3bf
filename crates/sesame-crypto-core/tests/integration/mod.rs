mod envelope_roundtrip;
mod kdf_calibration;
mod unlock_to_envelope;
mod concurrent_use;
