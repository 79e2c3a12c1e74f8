//! GS1 Digital Link URIs: parsing a URI into the element buffer and
//! generating a URI from it.
//!
//! The path info of a Digital Link URI carries a primary key AI and its
//! key qualifiers in a prescribed order; every other AI travels as a query
//! parameter. The set of valid key-qualifier sequences is derived from the
//! dictionary and held as a sorted list of space-joined AI sequences so
//! that membership is a binary search.
//!
//! "Convenience alphas" (e.g. `/gtin/0123...`), which have been
//! deprecated, are not supported.

use crate::ai::{self, AiValue};
use crate::dictionary::{self, AiEntry};
use crate::error::Gs1Error;

const CANONICAL_STEM: &str = "https://id.gs1.org";

/// Characters permissible anywhere in a URI, including percent.
const URI_CHARACTERS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~:/?#[]@!$&'()*+,;=%";

/// Unreserved characters that never require escaping in URI components.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// Build the sorted list of valid key-qualifier AI sequences from the
/// primary-key attributes of the dictionary.
///
/// Each attribute names an ordered qualifier sequence for its key; every
/// subsequence that preserves the order is valid, so each qualifier
/// doubles the set of entries generated for its alternative.
pub(crate) fn build_dl_key_qualifiers() -> Vec<String> {
    let mut list: Vec<String> = Vec::new();
    for entry in dictionary::AI_TABLE {
        let Some(alternatives) = entry.dlpkey else { continue };
        for qualifiers in alternatives {
            let base = list.len();
            list.push(entry.ai.to_string());
            for q in *qualifiers {
                for k in base..list.len() {
                    let mut seq = list[k].clone();
                    seq.push(' ');
                    seq.push_str(q);
                    list.push(seq);
                }
            }
        }
    }
    list.sort();
    list.dedup();
    list
}

/// Binary search the key-qualifier list for an exact AI sequence.
fn seq_entry(kq: &[String], seq: &[&str]) -> Option<usize> {
    let joined = seq.join(" ");
    kq.binary_search_by(|e| e.as_str().cmp(&joined)).ok()
}

fn is_dl_pkey(kq: &[String], ai: &str) -> bool {
    !ai.is_empty() && kq.binary_search_by(|e| e.as_str().cmp(ai)).is_ok()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Reverse percent encoding, mapping `+` to space. Malformed or truncated
/// escapes pass through verbatim. Decoded bytes become chars directly, so
/// a non-ASCII byte is later rejected by the character set checks.
fn uri_unescape(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push((hi * 16 + lo) as char);
                i += 3;
                continue;
            }
        }
        out.push(if bytes[i] == b'+' { ' ' } else { bytes[i] as char });
        i += 1;
    }
    out
}

/// Percent-escape everything outside the unreserved set, with space as `+`.
fn uri_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else if b == b' ' {
            out.push('+');
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn dl_err(message: impl Into<String>) -> Gs1Error {
    Gs1Error::DigitalLink(message.into())
}

/// Pad AI (01) values given as GTIN-8, GTIN-12 or GTIN-13 up to a GTIN-14.
fn pad_gtin(entry: &AiEntry, value: String) -> String {
    if entry.ai == "01" && matches!(value.len(), 8 | 12 | 13) {
        format!("{:0>14}", value)
    } else {
        value
    }
}

/// Parse a GS1 Digital Link URI into the element buffer, validating the
/// key to key-qualifier associations in the path info.
///
/// The rightmost `/AI/value` pair whose AI is a primary key roots the DL
/// path info; anything to its left is the stem. Query parameters that are
/// not AIs are retained as ignored entries, except that numeric-only
/// parameters must be known AIs. Spans cover the percent-encoded value in
/// the URI.
pub(crate) fn parse_dl_uri(
    input: &str,
    permit_unknown: bool,
    kq: &[String],
    elems: &mut Vec<AiValue>,
) -> Result<(), Gs1Error> {
    if !input.bytes().all(|b| URI_CHARACTERS.contains(&b)) {
        return Err(dl_err("URI contains illegal characters"));
    }

    let scheme_len = if input.starts_with("https://") {
        8
    } else if input.starts_with("http://") {
        7
    } else {
        return Err(dl_err("scheme must be http:// or https://"));
    };

    let rest = &input[scheme_len..];
    let domain_len = match rest.find('/') {
        Some(n) if n >= 1 => n,
        _ => return Err(dl_err("URI must contain a domain and path info")),
    };
    let pi_off = scheme_len + domain_len;

    // The fragment delimits the end of the data and the query parameter
    // marker the end of the path info.
    let mut data = &input[pi_off..];
    if let Some(h) = data.find('#') {
        data = &data[..h];
    }
    let (pi, qp) = match data.find('?') {
        Some(q) => (&data[..q], Some(&data[q + 1..])),
        None => (data, None),
    };

    // Search backwards from the end of the path info for an "/AI/value"
    // pair whose AI is a DL primary key.
    let mut dp = None;
    let mut end = pi.len();
    while let Some(r) = pi[..end].rfind('/') {
        let Some(p) = pi[..r].rfind('/') else { break };
        let ai = &pi[p + 1..r];
        let Some(entry) = dictionary::lookup_ai_entry(ai, ai.len(), permit_unknown) else {
            break;
        };
        if is_dl_pkey(kq, entry.ai) {
            dp = Some(p);
            break;
        }
        end = p;
    }
    let Some(dp) = dp else {
        return Err(dl_err("no GS1 DL keys found in path info"));
    };

    // Process each AI value pair in the DL path info.
    let path = &pi[dp..];
    let mut path_seq: Vec<&'static str> = Vec::new();
    let mut pos = 0;
    while pos < path.len() {
        pos += 1; // leading '/'
        let Some(sep) = path[pos..].find('/').map(|i| pos + i) else {
            return Err(dl_err("failed to parse DL data"));
        };
        let ai = &path[pos..sep];
        // Known to be present since the backward scan walked over it,
        // except left of the rightmost key where any pair shape goes.
        let Some(entry) = dictionary::lookup_ai_entry(ai, ai.len(), permit_unknown) else {
            return Err(dl_err("failed to parse DL data"));
        };

        let val_start = sep + 1;
        let val_end = path[val_start..].find('/').map(|i| val_start + i).unwrap_or(path.len());
        let value = uri_unescape(&path[val_start..val_end]);
        if value.is_empty() {
            return Err(dl_err(format!("decoded AI ({}) from DL path info is empty", ai)));
        }
        let value = pad_gtin(entry, value);

        ai::length_content_check(ai, entry, &value)?;

        let span = pi_off + dp + val_start..pi_off + dp + val_end;
        elems.push(AiValue::element(entry, ai, value, span));
        path_seq.push(entry.ai);
        pos = val_end;
    }

    // Process the query parameters.
    if let Some(qp) = qp {
        let qp_off = pi_off + pi.len() + 1;
        let mut pos = 0;
        while pos < qp.len() {
            if qp.as_bytes()[pos] == b'&' {
                pos += 1;
                continue;
            }
            let end = qp[pos..].find('&').map(|i| pos + i).unwrap_or(qp.len());
            let param = &qp[pos..end];

            let eq = param.find('=');
            let key = eq.map(|e| &param[..e]);
            let numeric =
                key.is_some_and(|k| !k.is_empty() && k.bytes().all(|b| b.is_ascii_digit()));
            let entry = if numeric {
                let k = key.unwrap_or_default();
                match dictionary::lookup_ai_entry(k, k.len(), permit_unknown) {
                    Some(entry) => Some(entry),
                    None => {
                        return Err(dl_err(format!("unknown AI ({}) in query parameters", k)));
                    }
                }
            } else {
                None
            };

            match (entry, eq) {
                (Some(entry), Some(eq)) => {
                    let ai = &param[..eq];
                    let value = uri_unescape(&param[eq + 1..]);
                    if value.is_empty() {
                        return Err(dl_err(format!(
                            "decoded AI ({}) value from DL query params is empty",
                            ai
                        )));
                    }
                    let value = pad_gtin(entry, value);
                    ai::length_content_check(ai, entry, &value)?;
                    let span = qp_off + pos + eq + 1..qp_off + end;
                    elems.push(AiValue::element(entry, ai, value, span));
                }
                // Singletons and non-numeric parameters are retained
                // undecoded as non-AI data.
                _ => {
                    let span = qp_off + pos..qp_off + end;
                    elems.push(AiValue::ignored_query_param(param, span));
                }
            }

            pos = end;
        }
    }

    if let Some(err) = ai::too_many_ais(elems) {
        return Err(err);
    }

    // The AI sequence in the path info must be a valid key-qualifier
    // association.
    if seq_entry(kq, &path_seq).is_none() {
        return Err(dl_err(
            "the AIs in the path are not a valid key-qualifier sequence for the key",
        ));
    }

    ai::validate_elements(elems)
}

/// Generate a Digital Link URI from the element buffer.
///
/// The first element that is a primary key is placed in the path, along
/// with the key-qualifier sequence matching the most qualifiers present in
/// the buffer. Remaining AIs become query parameters in buffer order with
/// fixed-length AIs first.
pub(crate) fn generate_dl_uri(
    elems: &[AiValue],
    stem: Option<&str>,
    kq: &[String],
) -> Result<String, Gs1Error> {
    let is_elem = |v: &AiValue| v.kind == crate::ai::ElementKind::Element;

    let key = elems
        .iter()
        .filter(|v| is_elem(v))
        .filter_map(|v| v.entry)
        .map(|e| e.ai)
        .find(|ai| is_dl_pkey(kq, ai))
        .ok_or_else(|| dl_err("cannot create a DL URI without a primary key AI"))?;

    // Pick the sequence starting with the chosen key that matches the
    // maximum number of qualifier AIs in the buffer.
    let count_matches = |token: &str| {
        elems
            .iter()
            .filter(|v| is_elem(v))
            .filter(|v| v.entry.map(|e| e.ai) == Some(token))
            .count()
    };
    let mut best: &str = key;
    let mut max_qualifiers = 0;
    for seq in kq.iter().filter(|s| s.starts_with(key) && s[key.len()..].starts_with(' ')) {
        let n: usize = seq.split(' ').skip(1).map(count_matches).sum();
        if n > max_qualifiers {
            max_qualifiers = n;
            best = seq.as_str();
        }
    }

    // Apply the path order from the sequence to the elements. Unordered
    // elements are emitted as query parameter attributes.
    let seq: Vec<&str> = best.split(' ').collect();
    let order: Vec<Option<usize>> = elems
        .iter()
        .map(|v| {
            if !is_elem(v) {
                return None;
            }
            let ai = v.entry.map(|e| e.ai)?;
            seq.iter().position(|&t| t == ai)
        })
        .collect();

    let mut out = String::from(stem.unwrap_or(CANONICAL_STEM));
    if out.ends_with('/') {
        out.pop();
    }

    for i in 0..seq.len() {
        if let Some(v) = order
            .iter()
            .zip(elems)
            .find_map(|(o, v)| (*o == Some(i)).then_some(v))
        {
            out.push('/');
            out.push_str(&v.ai);
            out.push('/');
            out.push_str(&uri_escape(&v.value));
        }
    }

    out.push('?');
    for emit_fixed in [true, false] {
        for (v, o) in elems.iter().zip(&order) {
            if !is_elem(v) || o.is_some() {
                continue;
            }
            let Some(entry) = v.entry else { continue };
            if entry.fnc1 != emit_fixed {
                out.push_str(&v.ai);
                out.push('=');
                out.push_str(&uri_escape(&v.value));
                out.push('&');
            }
        }
    }
    out.pop(); // trailing '?' or '&'

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<String, Gs1Error> {
        let kq = build_dl_key_qualifiers();
        let mut elems = Vec::new();
        parse_dl_uri(input, false, &kq, &mut elems)?;
        Ok(ai::build_data_str(&elems))
    }

    fn parse_unknown(input: &str) -> Result<String, Gs1Error> {
        let kq = build_dl_key_qualifiers();
        let mut elems = Vec::new();
        parse_dl_uri(input, true, &kq, &mut elems)?;
        Ok(ai::build_data_str(&elems))
    }

    fn generate(ai_data: &str, stem: Option<&str>) -> Result<String, Gs1Error> {
        let kq = build_dl_key_qualifiers();
        let mut elems = Vec::new();
        ai::parse_ai_data(ai_data, 0, ai_data, false, &mut elems)?;
        generate_dl_uri(&elems, stem, &kq)
    }

    #[test]
    fn key_qualifier_list_is_sorted_and_complete() {
        let kq = build_dl_key_qualifiers();
        assert!(kq.windows(2).all(|w| w[0] < w[1]));

        for seq in [
            "00",
            "01",
            "01 21",
            "01 10",
            "01 10 21",
            "01 22",
            "01 22 21",
            "01 22 10",
            "01 22 10 21",
            "01 235",
            "253",
            "255",
            "401",
            "402",
            "414",
            "414 254",
            "414 7040",
            "417",
            "417 7040",
            "8003",
            "8004",
            "8004 7040",
            "8006 22 10 21",
            "8010 8011",
            "8013",
            "8017 8019",
            "8018 8019",
        ] {
            let parts: Vec<&str> = seq.split(' ').collect();
            assert!(seq_entry(&kq, &parts).is_some(), "missing {}", seq);
        }

        assert!(seq_entry(&kq, &["01", "21", "10"]).is_none()); // Wrong order
        assert!(seq_entry(&kq, &["10"]).is_none()); // Not a key
    }

    #[test]
    fn unescape() {
        assert_eq!(uri_unescape("test"), "test");
        assert_eq!(uri_unescape("+"), " ");
        assert_eq!(uri_unescape("%20"), " ");
        assert_eq!(uri_unescape("%20AB"), " AB");
        assert_eq!(uri_unescape("A%20B"), "A B");
        assert_eq!(uri_unescape("AB%20"), "AB ");
        assert_eq!(uri_unescape("ABC%2"), "ABC%2"); // Off end
        assert_eq!(uri_unescape("ABCD%"), "ABCD%");
        assert_eq!(uri_unescape("A%20%20B"), "A  B"); // Run together
        assert_eq!(uri_unescape("A%4FB"), "AOB");
        assert_eq!(uri_unescape("A%4fB"), "AOB");
        assert_eq!(uri_unescape("A%4gB"), "A%4gB"); // Non hex digit
        assert_eq!(uri_unescape("A%g4B"), "A%g4B");
    }

    #[test]
    fn escape() {
        assert_eq!(uri_escape("ABCDEFGHIJKLMNOPQRSTUVWXYZ"), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(uri_escape("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrstuvwxyz");
        assert_eq!(uri_escape("0123456789-._~"), "0123456789-._~");
        assert_eq!(
            uri_escape("!\"#%&'()*+,/:;<=>?"),
            "%21%22%23%25%26%27%28%29%2A%2B%2C%2F%3A%3B%3C%3D%3E%3F"
        );
        assert_eq!(uri_escape(" AB"), "+AB");
        assert_eq!(uri_escape("A B"), "A+B");
        assert_eq!(uri_escape("A  B"), "A++B");
    }

    #[test]
    fn parse_rejects_malformed_uris() {
        assert!(parse("").is_err());
        assert!(parse("ftp://a/00/006141411234567890").is_err());
        assert!(parse("http://").is_err());
        assert!(parse("http:///").is_err()); // No domain
        assert!(parse("http://a").is_err()); // No path info
        assert!(parse("http://a/").is_err()); // Minimal domain but no AI info
        assert!(parse("https://00/006141411234567890").is_err()); // No domain
        assert!(parse("https://a/stem/00/006141411234567890/").is_err()); // Ends in slash
    }

    #[test]
    fn parse_path_info() {
        assert_eq!(parse("http://a/00/006141411234567890").unwrap(), "^00006141411234567890");
        assert_eq!(parse("https://a/00/006141411234567890").unwrap(), "^00006141411234567890");
        assert_eq!(
            parse("https://a/more/stem/00/006141411234567890").unwrap(),
            "^00006141411234567890"
        );
        // Fake AI in stem, stop at rightmost key
        assert_eq!(
            parse("https://a/00/faux/00/006141411234567890").unwrap(),
            "^00006141411234567890"
        );
        assert_eq!(
            parse("https://a/01/12312312312333/22/TEST/10/ABC/21/XYZ").unwrap(),
            "^011231231231233322TEST^10ABC^21XYZ"
        );
        assert_eq!(
            parse("https://a/01/12312312312333/235/TEST").unwrap(),
            "^0112312312312333235TEST"
        );
        assert_eq!(parse("https://a/253/1231231231232").unwrap(), "^2531231231231232");
        assert_eq!(
            parse("https://a/253/1231231231232TEST5678901234567").unwrap(),
            "^2531231231231232TEST5678901234567"
        );
        assert!(parse("https://a/253/1231231231232TEST56789012345678").is_err()); // Too long
        assert_eq!(
            parse("https://a/8018/123456789012345675/8019/123").unwrap(),
            "^8018123456789012345675^8019123"
        );
    }

    #[test]
    fn parse_pads_gtin() {
        assert_eq!(parse("https://a/01/12312312312333").unwrap(), "^0112312312312333");
        assert_eq!(parse("https://a/01/2112345678900").unwrap(), "^0102112345678900");
        assert_eq!(parse("https://a/01/416000336108").unwrap(), "^0100416000336108");
        assert_eq!(parse("https://a/01/02345673").unwrap(), "^0100000002345673");
    }

    #[test]
    fn parse_query_params() {
        assert_eq!(
            parse("https://a/stem/00/006141411234567890?").unwrap(), // Empty query params
            "^00006141411234567890"
        );
        // No FNC1 required after fixed-length AI in path info
        assert_eq!(
            parse("https://a/stem/00/006141411234567890?99=ABC").unwrap(),
            "^0000614141123456789099ABC"
        );
        // FNC1 required after variable-length AI in path info
        assert_eq!(parse("https://a/stem/401/12345678?99=ABC").unwrap(), "^40112345678^99ABC");
        assert_eq!(
            parse("https://a/01/12312312312333?99=ABC&98=XYZ").unwrap(),
            "^011231231231233399ABC^98XYZ"
        );
        // Extraneous separators
        assert_eq!(
            parse("https://a/01/12312312312333?&&&99=ABC&&&&&&98=XYZ&&&").unwrap(),
            "^011231231231233399ABC^98XYZ"
        );
    }

    #[test]
    fn parse_skips_non_ai_query_params() {
        for uri in [
            "https://a/01/12312312312333?99=ABC&unknown=666&98=XYZ",
            "https://a/01/12312312312333?unknown=666&99=ABC&98=XYZ",
            "https://a/01/12312312312333?99=ABC&98=XYZ&unknown=666",
            "https://a/01/12312312312333?99=ABC&singleton&98=XYZ",
            "https://a/01/12312312312333?singleton&99=ABC&98=XYZ",
            "https://a/01/12312312312333?99=ABC&98=XYZ&singleton",
            "https://a/01/12312312312333?singleton1&unknown1=555&99=ABC&singleton2&unknown2=6666&98=XYZ&unknown3=777&singleton3",
        ] {
            assert_eq!(parse(uri).unwrap(), "^011231231231233399ABC^98XYZ", "{}", uri);
        }

        // Numeric-only query params must be AIs
        assert!(parse("https://a/01/12312312312333?99=ABC&999=faux").is_err());
    }

    #[test]
    fn parse_percent_escaped_values() {
        assert_eq!(
            parse("https://a/01/12312312312333/22/ABC%2d123?99=ABC&98=XYZ%2f987").unwrap(),
            "^011231231231233322ABC-123^99ABC^98XYZ/987"
        );
        assert_eq!(
            parse("https://id.gs1.org/414/9520123456788/254/32a%2Fb").unwrap(),
            "^414952012345678825432a/b"
        );
    }

    #[test]
    fn parse_ignores_fragment() {
        assert_eq!(
            parse("https://a/01/12312312312333/22/test/10/abc/21/xyz#").unwrap(),
            "^011231231231233322test^10abc^21xyz"
        );
        assert_eq!(
            parse("https://a/01/12312312312333/22/test/10/abc/21/xyz#fragment").unwrap(),
            "^011231231231233322test^10abc^21xyz"
        );
        assert_eq!(
            parse("https://a/stem/00/006141411234567890?99=ABC#fragment").unwrap(),
            "^0000614141123456789099ABC"
        );
    }

    #[test]
    fn parse_specification_examples() {
        assert_eq!(parse("https://id.gs1.org/01/09520123456788").unwrap(), "^0109520123456788");
        assert_eq!(
            parse("https://brand.example.com/01/9520123456788").unwrap(),
            "^0109520123456788"
        );
        assert_eq!(
            parse("https://brand.example.com/some-extra/pathinfo/01/9520123456788").unwrap(),
            "^0109520123456788"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788/22/2A").unwrap(),
            "^0109520123456788222A"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788/10/ABC123").unwrap(),
            "^010952012345678810ABC123"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426").unwrap(),
            "^010952012345678810ABC1^2112345^17180426"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/09520123456788?3103=000195").unwrap(),
            "^01095201234567883103000195"
        );
        assert_eq!(
            parse("https://example.com/01/9520123456788?3103=000195&3922=0299&17=201225").unwrap(),
            "^0109520123456788310300019539220299^17201225"
        );
        assert_eq!(
            parse("https://id.gs1.org/01/9520123456788?17=201225&3103=000195&3922=0299").unwrap(),
            "^010952012345678817201225310300019539220299"
        );
        assert_eq!(
            parse("https://id.gs1.org/00/952012345678912345").unwrap(),
            "^00952012345678912345"
        );
        assert_eq!(
            parse("https://id.gs1.org/00/952012345678912345?02=09520123456788&37=25&10=ABC123")
                .unwrap(),
            "^0095201234567891234502095201234567883725^10ABC123"
        );
        assert_eq!(parse("https://id.gs1.org/414/9520123456788").unwrap(), "^4149520123456788");
        assert_eq!(
            parse("https://example.com/8004/9520614141234567?01=9520123456788").unwrap(),
            "^80049520614141234567^0109520123456788"
        );
    }

    #[test]
    fn parse_unknown_ais() {
        assert!(parse("https://example.com/01/9520123456788/89/ABC123?99=XYZ").is_err());
        assert!(parse("https://example.com/01/9520123456788?99=XYZ&89=ABC123").is_err());

        assert_eq!(
            parse_unknown("https://example.com/01/9520123456788?99=XYZ&89=ABC123").unwrap(),
            "^010952012345678899XYZ^89ABC123"
        );
    }

    #[test]
    fn parse_rejects_invalid_qualifier_sequence() {
        // (21) without the intervening (10) or (22) is fine, but a
        // qualifier of a different key is not.
        assert!(parse("https://a/01/12312312312333/8019/123").is_err());
        // Qualifiers out of order
        assert!(parse("https://a/01/12312312312333/21/XYZ/10/ABC").is_err());
    }

    #[test]
    fn parse_retains_ignored_query_params() {
        let kq = build_dl_key_qualifiers();
        let mut elems = Vec::new();
        parse_dl_uri(
            "https://a/01/12312312312333?singleton&99=ABC&unknown=666",
            false,
            &kq,
            &mut elems,
        )
        .unwrap();
        let ignored: Vec<&str> = elems
            .iter()
            .filter(|v| v.kind == ai::ElementKind::IgnoredQueryParam)
            .map(|v| v.value.as_str())
            .collect();
        assert_eq!(ignored, ["singleton", "unknown=666"]);
    }

    #[test]
    fn parse_records_value_spans() {
        let uri = "https://a/01/12312312312333?99=ABC";
        let kq = build_dl_key_qualifiers();
        let mut elems = Vec::new();
        parse_dl_uri(uri, false, &kq, &mut elems).unwrap();
        assert_eq!(&uri[elems[0].span.clone()], "12312312312333");
        assert_eq!(&uri[elems[1].span.clone()], "ABC");
    }

    #[test]
    fn generate_canonical() {
        assert_eq!(
            generate("(01)12312312312326(21)abc123", None).unwrap(),
            "https://id.gs1.org/01/12312312312326/21/abc123"
        );
    }

    #[test]
    fn generate_with_stem() {
        assert_eq!(
            generate("(01)12312312312326(21)abc123", Some("https://example.com")).unwrap(),
            "https://example.com/01/12312312312326/21/abc123"
        );
        // Trailing slash in the stem is trimmed
        assert_eq!(
            generate("(01)12312312312326(21)abc123", Some("https://example.com/")).unwrap(),
            "https://example.com/01/12312312312326/21/abc123"
        );
    }

    #[test]
    fn generate_orders_path_and_query() {
        assert_eq!(
            generate("(01)12312312312326(22)ABC(10)DEF(21)GHI", Some("https://example.com"))
                .unwrap(),
            "https://example.com/01/12312312312326/22/ABC/10/DEF/21/GHI"
        );
        assert_eq!(
            generate("(01)12312312312326(22)ABC(10)DEF(21)GHI(95)INT", Some("https://example.com"))
                .unwrap(),
            "https://example.com/01/12312312312326/22/ABC/10/DEF/21/GHI?95=INT"
        );
        assert_eq!(
            generate("(21)XYZ(01)12312312312333(10)ABC123(99)XYZ", Some("https://example.com"))
                .unwrap(),
            "https://example.com/01/12312312312333/10/ABC123/21/XYZ?99=XYZ"
        );
    }

    #[test]
    fn generate_picks_first_primary_key() {
        assert_eq!(
            generate(
                "(8017)795260646688514634(99)000001(253)9526064000028000001",
                Some("https://example.com")
            )
            .unwrap(),
            "https://example.com/8017/795260646688514634?99=000001&253=9526064000028000001"
        );
        assert_eq!(
            generate(
                "(253)9526064000028000001(99)000001(8017)795260646688514634",
                Some("https://example.com")
            )
            .unwrap(),
            "https://example.com/253/9526064000028000001?99=000001&8017=795260646688514634"
        );
        // Fixed-length attributes are emitted before variable-length ones
        assert_eq!(
            generate(
                "(253)9526064000028000001(99)000001(01)12312312312326(22)ABC(10)DEF(21)GHI(95)INT",
                Some("https://example.com")
            )
            .unwrap(),
            "https://example.com/253/9526064000028000001?01=12312312312326&99=000001&22=ABC&10=DEF&21=GHI&95=INT"
        );
    }

    #[test]
    fn generate_requires_primary_key() {
        let err = generate("(10)ABC123(99)XYZ", None).unwrap_err();
        assert!(matches!(err, Gs1Error::DigitalLink(_)));
    }
}
