//! Fader position ⇄ decibel conversion
//!
//! Behringer consoles map the normalized fader travel (0.0..=1.0) onto four
//! linear segments: -90..-60 dB, -60..-30 dB, -30..-10 dB and -10..+10 dB.

/// Convert a normalized fader position to decibels, rounded to 0.1 dB
///
/// Inputs outside 0.0..=1.0 are clamped.
pub fn fader_to_db(value: f64) -> f64 {
    let f = value.clamp(0.0, 1.0);
    let db = if f >= 0.5 {
        f * 40.0 - 30.0
    } else if f >= 0.25 {
        f * 80.0 - 50.0
    } else if f >= 0.0625 {
        f * 160.0 - 70.0
    } else {
        f * 480.0 - 90.0
    };
    (db * 10.0).round() / 10.0
}

/// Convert decibels to a normalized fader position
///
/// Inputs outside -90..=+10 dB are clamped.
pub fn db_to_fader(db: f64) -> f64 {
    let d = db.clamp(-90.0, 10.0);
    if d >= -10.0 {
        (d + 30.0) / 40.0
    } else if d >= -30.0 {
        (d + 50.0) / 80.0
    } else if d >= -60.0 {
        (d + 70.0) / 160.0
    } else {
        (d + 90.0) / 480.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fader_to_db() {
        assert_eq!(fader_to_db(100.0), 10.0);
        assert_eq!(fader_to_db(0.75), 0.0);
        assert_eq!(fader_to_db(1.0), 10.0);
        assert_eq!(fader_to_db(0.37829911708831787), -19.7);
        assert_eq!(fader_to_db(0.0), -90.0);
    }

    #[test]
    fn test_db_to_fader() {
        assert!(approx(db_to_fader(100.0), 1.0));
        assert!(approx(db_to_fader(0.0), 0.75));
        assert!(approx(db_to_fader(10.0), 1.0));
        assert!(approx(db_to_fader(-19.7), 0.37875));
        assert!(approx(db_to_fader(-90.0), 0.0));
    }

    #[test]
    fn test_segment_boundaries_round_trip() {
        for db in [-60.0, -30.0, -10.0, -6.0, 0.0] {
            assert!(approx(fader_to_db(db_to_fader(db)), db));
        }
    }
}
