//! Normalization of fixed AT reply grammars into typed values.

use std::sync::LazyLock;

use regex::Regex;

use super::{ModemError, ServingSystem};

/// `+CSQ` quality meaning "not known or not detectable".
pub const UNKNOWN_QUALITY: i64 = 99;

/// `+CSS` system identifier meaning "no service".
pub const NO_SERVICE_SID: u32 = 99_999;

const MAX_QUALITY: i64 = 31;
const MAX_BAND_CLASS: i64 = 4;
const MAX_SID: i64 = 32_767;

static SIGNAL_FIELDS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+),\s*([+-]?\d+)").ok());

static SERVING_SYSTEM_FIELDS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+),\s*(\S),\s*([+-]?\d+)").ok());

/// Strip a reply label such as `+GMI:` and any spaces after it.
///
/// Replies without the label are returned with only leading spaces removed.
pub fn strip_response<'a>(reply: &'a str, label: &str) -> &'a str {
    reply
        .strip_prefix(label)
        .unwrap_or(reply)
        .trim_start_matches(' ')
}

/// Parse `+CSQ: <quality>,<ber>` into a 0-100 signal quality.
///
/// # Errors
/// Returns `ModemError::NoService` for quality 99 and `ModemError::Parse`
/// if the reply does not hold two integers after the label
pub fn signal_quality(reply: &str) -> Result<u32, ModemError> {
    const WHAT: &str = "signal quality";

    let fields = reply
        .strip_prefix("+CSQ: ")
        .and_then(|payload| SIGNAL_FIELDS.as_ref()?.captures(payload))
        .ok_or_else(|| ModemError::parse(WHAT, reply))?;

    let quality: i64 = fields[1]
        .parse()
        .map_err(|_| ModemError::parse(WHAT, reply))?;

    if quality == UNKNOWN_QUALITY {
        return Err(ModemError::NoService);
    }

    let normalized = quality.clamp(0, MAX_QUALITY) * 100 / MAX_QUALITY;
    Ok(normalized as u32)
}

/// Parse `+CSS: <class>, <band>, <sid>` into a serving system.
///
/// Both `", "` and `","` separators are accepted. The band class and band
/// are clamped into range; a sid outside 0..=32767 is the no-service sentinel.
///
/// # Errors
/// Returns `ModemError::NoService` for the sentinel sid and
/// `ModemError::Parse` if the three fields cannot be scanned
pub fn serving_system(reply: &str) -> Result<ServingSystem, ModemError> {
    const WHAT: &str = "serving system";
    const LABEL: &str = "+CSS: ";

    let fields = reply
        .find(LABEL)
        .map(|start| &reply[start + LABEL.len()..])
        .and_then(|payload| SERVING_SYSTEM_FIELDS.as_ref()?.captures(payload))
        .ok_or_else(|| ModemError::parse(WHAT, reply))?;

    let band_class: i64 = fields[1]
        .parse()
        .map_err(|_| ModemError::parse(WHAT, reply))?;
    let band = fields[2]
        .chars()
        .next()
        .ok_or_else(|| ModemError::parse(WHAT, reply))?;
    let sid: i64 = fields[3]
        .parse()
        .map_err(|_| ModemError::parse(WHAT, reply))?;

    let sid = if (0..=MAX_SID).contains(&sid) {
        sid as u32
    } else {
        NO_SERVICE_SID
    };
    if sid == NO_SERVICE_SID {
        return Err(ModemError::NoService);
    }

    Ok(ServingSystem {
        band_class: band_class.clamp(0, MAX_BAND_CLASS) as u32,
        band: band.clamp('A', 'Z'),
        sid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::modem::ErrorKind;

    #[test]
    fn signal_quality_rescales_to_percent() {
        assert_eq!(signal_quality("+CSQ: 31,99").unwrap(), 100);
        assert_eq!(signal_quality("+CSQ: 0,99").unwrap(), 0);
        assert_eq!(signal_quality("+CSQ: 15,99").unwrap(), 48);
        assert_eq!(signal_quality("+CSQ: 20, 0").unwrap(), 64);
    }

    #[test]
    fn signal_quality_clamps_out_of_range_values() {
        assert_eq!(signal_quality("+CSQ: 45,99").unwrap(), 100);
        assert_eq!(signal_quality("+CSQ: -3,99").unwrap(), 0);
    }

    #[test]
    fn unknown_quality_is_no_service() {
        let err = signal_quality("+CSQ: 99,99").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoService);
    }

    #[test]
    fn malformed_signal_quality_is_a_parse_error() {
        for reply in ["+CSQ: 20", "+CSQ: ,", "CSQ 20,99", "", "+CSQ: x,y"] {
            let err = signal_quality(reply).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "reply {reply:?}");
        }
    }

    #[test]
    fn serving_system_accepts_both_separators() {
        let expected = ServingSystem {
            band_class: 1,
            band: 'A',
            sid: 100,
        };
        assert_eq!(serving_system("+CSS: 1, A, 100").unwrap(), expected);
        assert_eq!(serving_system("+CSS: 1,A,100").unwrap(), expected);
    }

    #[test]
    fn serving_system_clamps_class_and_band() {
        let system = serving_system("+CSS: 7, z, 4120").unwrap();
        assert_eq!(system.band_class, 4);
        assert_eq!(system.band, 'Z');
        assert_eq!(system.sid, 4120);

        let system = serving_system("+CSS: 2, 5, 0").unwrap();
        assert_eq!(system.band, 'A');
        assert_eq!(system.sid, 0);
    }

    #[test]
    fn out_of_range_sid_is_no_service() {
        for reply in ["+CSS: 1, A, 40000", "+CSS: 1, A, 99999", "+CSS: 1, A, -1"] {
            let err = serving_system(reply).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoService, "reply {reply:?}");
        }
    }

    #[test]
    fn incomplete_serving_system_is_a_parse_error() {
        for reply in ["+CSS: 1, A", "+CSS: ?", "+CSS 1, A, 100", "OK"] {
            let err = serving_system(reply).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "reply {reply:?}");
        }
    }

    #[test]
    fn strip_response_removes_label_and_spaces() {
        assert_eq!(strip_response("+GMI: Novatel Wireless", "+GMI:"), "Novatel Wireless");
        assert_eq!(strip_response("+GSN:   0x8C1A2B3D", "+GSN:"), "0x8C1A2B3D");
        assert_eq!(strip_response("+GMR:", "+GMR:"), "");
        assert_eq!(strip_response("  Q6085BDRGLD", "+GMR:"), "Q6085BDRGLD");
    }
}
