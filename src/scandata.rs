//! Barcode scan data: the symbology identifier table and conversion
//! between the raw data string and the message a reader reports.
//!
//! Scan data is a three character symbology identifier followed by the
//! message payload with FNC1 rendered as GS (0x1D). EAN/UPC primaries are
//! plain digit strings; a composite component follows as a new `]e0`
//! message.

use crate::ai::AiValue;
use crate::error::Gs1Error;
use crate::lint::{parity_digit, validate_parity};

/// The symbologies a session can target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Symbology {
    #[default]
    None,
    DataBarOmni,
    DataBarTruncated,
    DataBarStacked,
    DataBarStackedOmni,
    DataBarLimited,
    DataBarExpanded,
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Gs1128CcA,
    Gs1128CcC,
    Qr,
    Dm,
}

impl TryFrom<i32> for Symbology {
    type Error = Gs1Error;

    fn try_from(value: i32) -> Result<Self, Gs1Error> {
        use Symbology::*;
        let sym = match value {
            0 => None,
            1 => DataBarOmni,
            2 => DataBarTruncated,
            3 => DataBarStacked,
            4 => DataBarStackedOmni,
            5 => DataBarLimited,
            6 => DataBarExpanded,
            7 => UpcA,
            8 => UpcE,
            9 => Ean13,
            10 => Ean8,
            11 => Gs1128CcA,
            12 => Gs1128CcC,
            13 => Qr,
            14 => Dm,
            _ => return Err(Gs1Error::Config("unknown symbology".into())),
        };
        Ok(sym)
    }
}

/// Symbology identifier to (AI mode, default symbology). `]e0` is shared
/// between DataBar Expanded and GS1-128 Composite.
fn sym_id_entry(identifier: &str) -> Option<(bool, Symbology)> {
    let entry = match identifier {
        "]C1" => (true, Symbology::Gs1128CcA),
        "]E0" => (false, Symbology::Ean13),
        "]E4" => (false, Symbology::Ean8),
        "]e0" => (true, Symbology::DataBarExpanded),
        "]d1" => (false, Symbology::Dm),
        "]d2" => (true, Symbology::Dm),
        "]Q1" => (false, Symbology::Qr),
        "]Q3" => (true, Symbology::Qr),
        _ => return None,
    };
    Some(entry)
}

/// Append a message payload to the scan data. GS1 data (leading `^`)
/// drops the leading FNC1, renders the remaining ones as GS and strips a
/// trailing FNC1; plain data loses one escaping backslash from a leading
/// `\...^` run.
fn scancat(out: &mut String, input: &str) {
    if let Some(rest) = input.strip_prefix('^') {
        for c in rest.chars() {
            out.push(if c == '^' { '\x1D' } else { c });
        }
        if rest.ends_with('^') {
            out.pop();
        }
    } else {
        let unescaped = input.trim_start_matches('\\');
        if unescaped.starts_with('^') && input.starts_with('\\') {
            out.push_str(&input[1..]);
        } else {
            out.push_str(input);
        }
    }
}

fn err(message: impl Into<String>) -> Gs1Error {
    Gs1Error::parse(message)
}

/// Normalise the primary data of an EAN/UPC or non-Expanded DataBar
/// symbol to its full digit string, stripping any AI (01) syntax and
/// validating or computing the final check digit.
fn normalise_primary(
    sym: Symbology,
    add_check_digit: bool,
    data: &str,
) -> Result<String, Gs1Error> {
    let (prefix, digits) = match sym {
        Symbology::Ean13 => ("^010", 13),
        Symbology::UpcA | Symbology::UpcE => ("^0100", 12),
        Symbology::Ean8 => ("^01000000", 8),
        _ => ("^01", 14),
    };
    let data = data.strip_prefix(prefix).unwrap_or(data);

    let expected = if add_check_digit { digits - 1 } else { digits };
    if data.len() != expected {
        return Err(if add_check_digit {
            err(format!("primary data must be {} digits without check digit", expected))
        } else {
            err(format!("primary data must be {} digits", expected))
        });
    }
    if !data.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err("primary data must be all digits"));
    }

    // UPC-A is handled as a GTIN-13 with a leading zero.
    let mut primary = String::with_capacity(digits + 1);
    if sym == Symbology::UpcA {
        primary.push('0');
    }
    primary.push_str(data);

    if add_check_digit {
        let d = parity_digit(&primary).ok_or_else(|| err("primary data must be all digits"))?;
        primary.push(d);
    } else if !validate_parity(&primary) {
        return Err(err("primary data check digit is incorrect"));
    }

    if sym == Symbology::DataBarLimited && primary.as_str() > "19999999999999" {
        return Err(err("primary data item value is too large"));
    }

    Ok(primary)
}

/// Render the session data string as scan data for the given symbology.
pub(crate) fn generate_scan_data(
    sym: Symbology,
    add_check_digit: bool,
    data_str: &str,
    elems: &[AiValue],
) -> Result<String, Gs1Error> {
    // Delimit end of linear data.
    let (linear, cc) = match data_str.find('|') {
        Some(i) => (&data_str[..i], Some(&data_str[i + 1..])),
        None => (data_str, None),
    };

    let mut out = String::with_capacity(data_str.len() + 8);

    match sym {
        Symbology::None => {}

        // QR: "]Q1" for plain data, "]Q3" for GS1 data.
        // DM: "]d1" for plain data, "]d2" for GS1 data.
        Symbology::Qr | Symbology::Dm => {
            if data_str.starts_with('^') {
                out.push_str(if sym == Symbology::Qr { "]Q3" } else { "]d2" });
                scancat(&mut out, linear);
            } else {
                out.push_str(if sym == Symbology::Qr { "]Q1" } else { "]d1" });
                scancat(&mut out, data_str);
            }
        }

        // "]C1" for linear-only GS1-128.
        Symbology::Gs1128CcA | Symbology::Gs1128CcC if cc.is_none() => {
            if !linear.starts_with('^') {
                return Err(err("GS1 AI data is required"));
            }
            out.push_str("]C1");
            scancat(&mut out, linear);
        }

        // "]e0" followed by the concatenated AI data of the linear and
        // composite components.
        Symbology::Gs1128CcA | Symbology::Gs1128CcC | Symbology::DataBarExpanded => {
            if !linear.starts_with('^') {
                return Err(err("GS1 AI data is required"));
            }
            out.push_str("]e0");
            scancat(&mut out, linear);

            if let Some(cc) = cc {
                if !cc.starts_with('^') {
                    return Err(err("composite component must be AI data"));
                }
                // A GS follows the linear component only when its final
                // AI is not fixed-length.
                let last_fnc1 = elems
                    .iter()
                    .take_while(|v| v.entry.is_some())
                    .last()
                    .and_then(|v| v.entry)
                    .map(|e| e.fnc1)
                    .unwrap_or(false);
                if last_fnc1 {
                    out.push('\x1D');
                }
                scancat(&mut out, cc);
            }
        }

        Symbology::DataBarOmni
        | Symbology::DataBarTruncated
        | Symbology::DataBarStacked
        | Symbology::DataBarStackedOmni
        | Symbology::DataBarLimited => {
            let primary = normalise_primary(sym, add_check_digit, linear)?;
            out.push_str("]e001"); // rendered as AI (01)
            out.push_str(&primary);

            if let Some(cc) = cc {
                if !cc.starts_with('^') {
                    return Err(err("composite component must be AI data"));
                }
                scancat(&mut out, cc);
            }
        }

        // Primary is "]E0" then 13 digits ("]E4" then 8 for EAN-8); a
        // composite component starts a new "]e0" message.
        Symbology::UpcA | Symbology::UpcE | Symbology::Ean13 | Symbology::Ean8 => {
            let primary = normalise_primary(sym, add_check_digit, linear)?;
            out.push_str(match sym {
                Symbology::Ean8 => "]E4",
                Symbology::UpcE => "]E00", // UPC-E is normalised to 12 digits
                _ => "]E0",
            });
            out.push_str(&primary);

            if let Some(cc) = cc {
                if !cc.starts_with('^') {
                    return Err(err("composite component must be AI data"));
                }
                out.push_str("|]e0");
                scancat(&mut out, cc);
            }
        }
    }

    Ok(out)
}

/// Process scan data into a symbology, a data string and the extracted
/// element buffer.
pub(crate) fn process_scan_data(
    scan_data: &str,
    permit_unknown: bool,
    kq: &[String],
) -> Result<(Symbology, String, Vec<AiValue>), Gs1Error> {
    if !scan_data.starts_with(']') || scan_data.len() < 3 {
        return Err(err("missing symbology identifier"));
    }
    // get() also rejects a multi-byte character straddling the identifier
    let Some((ai_mode, sym)) = scan_data.get(..3).and_then(sym_id_entry) else {
        return Err(err("unsupported symbology identifier"));
    };
    let message = &scan_data[3..];

    let mut elems = Vec::new();

    // EAN/UPC: a fixed-length digit primary, optionally followed by a
    // composite component as a new "]e0" message.
    if sym == Symbology::Ean13 || sym == Symbology::Ean8 {
        let primary_len = if sym == Symbology::Ean13 { 13 } else { 8 };

        if message.len() < primary_len {
            return Err(err("primary scan data is too short"));
        }
        let Some(primary) = message.get(..primary_len) else {
            return Err(err("primary message must only contain digits"));
        };
        if !primary.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err("primary message must only contain digits"));
        }

        let rest = &message[primary_len..];
        let cc = if let Some(cc) = rest.strip_prefix("|]e0") {
            Some(cc)
        } else if !rest.is_empty() {
            return Err(err("primary message is too long"));
        } else {
            None
        };
        if !validate_parity(primary) {
            return Err(err("primary message check digit is incorrect"));
        }

        let mut data_str = String::from(primary);
        if let Some(cc) = cc {
            data_str.push('|');
            let base = data_str.len();
            let converted = convert_gs_to_fnc1(cc)?;
            data_str.push_str(&converted);
            crate::ai::process_data_str(&converted, base, &data_str, permit_unknown, &mut elems)?;
        }
        return Ok((sym, data_str, elems));
    }

    if ai_mode {
        let converted = convert_gs_to_fnc1(message)?;
        crate::ai::process_data_str(&converted, 0, &converted, permit_unknown, &mut elems)?;
        return Ok((sym, converted, elems));
    }

    // Plain data. Disambiguate from GS1 data: "^" -> "\^", "\^" -> "\\^".
    let unescaped = message.trim_start_matches('\\');
    let data_str = if unescaped.starts_with('^') {
        format!("\\{}", message)
    } else {
        message.to_string()
    };

    // A GS1 Digital Link URI is processed immediately.
    if data_str.starts_with("https://") || data_str.starts_with("http://") {
        crate::dl::parse_dl_uri(&data_str, permit_unknown, kq, &mut elems)?;
    }

    Ok((sym, data_str, elems))
}

/// Convert a scan data payload to the internal FNC1 representation,
/// rejecting data `^` characters so they cannot be conflated with FNC1.
fn convert_gs_to_fnc1(payload: &str) -> Result<String, Gs1Error> {
    if payload.contains('^') {
        return Err(err("scan data contains illegal ^ character"));
    }
    let mut out = String::with_capacity(payload.len() + 1);
    out.push('^');
    for c in payload.chars() {
        out.push(if c == '\x1D' { '^' } else { c });
    }
    Ok(out)
}
