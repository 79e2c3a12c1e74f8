//! AI element strings: the canonical element buffer, the bracketed and raw
//! data string readers and writers, per-element validation and the cross-AI
//! association checks.
//!
//! Internally FNC1 is represented by `^` and the separator between the
//! linear and 2D components of a composite symbol by `|`. Data `^`
//! characters are rejected so they cannot be conflated with FNC1.

use std::ops::Range;

use crate::dictionary::{self, AiEntry, MAX_AIS};
use crate::error::Gs1Error;
use crate::lint::{LintFailure, LintReason};

/// What an extracted buffer entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// An extracted (AI, value) pair.
    Element,
    /// Separator between the linear and composite components of a symbol.
    CompositeSeparator,
    /// An ignored non-numeric query parameter of a Digital Link URI,
    /// stored undecoded in `value`.
    IgnoredQueryParam,
}

/// One entry of the element buffer.
///
/// `span` is the byte range of the raw value in the input the buffer was
/// extracted from; for Digital Link URIs it covers the percent-encoded
/// form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiValue {
    pub kind: ElementKind,
    pub entry: Option<&'static AiEntry>,
    pub ai: String,
    pub value: String,
    pub span: Range<usize>,
}

impl AiValue {
    pub(crate) fn element(
        entry: &'static AiEntry,
        ai: impl Into<String>,
        value: impl Into<String>,
        span: Range<usize>,
    ) -> Self {
        AiValue { kind: ElementKind::Element, entry: Some(entry), ai: ai.into(), value: value.into(), span }
    }

    pub(crate) fn composite_separator(pos: usize) -> Self {
        AiValue {
            kind: ElementKind::CompositeSeparator,
            entry: None,
            ai: String::new(),
            value: String::new(),
            span: pos..pos + 1,
        }
    }

    pub(crate) fn ignored_query_param(param: impl Into<String>, span: Range<usize>) -> Self {
        AiValue {
            kind: ElementKind::IgnoredQueryParam,
            entry: None,
            ai: String::new(),
            value: param.into(),
            span,
        }
    }

    fn is_element(&self) -> bool {
        self.kind == ElementKind::Element
    }
}

pub(crate) fn too_many_ais(elems: &[AiValue]) -> Option<Gs1Error> {
    (elems.len() > MAX_AIS).then(|| Gs1Error::parse("too many AIs"))
}

/// Parse one linear part of a bracketed AI data string, `(ai)value...`,
/// appending extracted elements. `base` is the offset of `part` within the
/// whole input, used for spans and markup.
///
/// A `(` inside a value is written as `\(`.
pub(crate) fn parse_ai_data(
    part: &str,
    base: usize,
    input: &str,
    permit_unknown: bool,
    elems: &mut Vec<AiValue>,
) -> Result<(), Gs1Error> {
    let bytes = part.as_bytes();
    let mut p = 0;

    while p < bytes.len() {
        let ai_start = p;
        if bytes[p] != b'(' {
            return Err(Gs1Error::parse_at(
                "failed to parse AI data",
                input,
                base + p,
                base + part.len(),
            ));
        }
        p += 1;
        let close = part[p..].find(')').map(|i| p + i).ok_or_else(|| {
            Gs1Error::parse_at("failed to parse AI data", input, base + ai_start, base + part.len())
        })?;
        let ai = &part[p..close];
        let entry = dictionary::lookup_ai_entry(ai, ai.len(), permit_unknown).ok_or_else(|| {
            Gs1Error::parse_at(
                format!("unrecognised AI: {}", ai),
                input,
                base + ai_start,
                base + close + 1,
            )
        })?;
        p = close + 1;

        if p == bytes.len() {
            // Message ends after the AI with no value
            return Err(Gs1Error::parse_at(
                "failed to parse AI data",
                input,
                base + ai_start,
                base + part.len(),
            ));
        }

        // Value runs until the next unescaped bracket
        let val_start = p;
        let mut value = String::new();
        loop {
            match part[p..].find('(').map(|i| p + i) {
                None => {
                    value.push_str(&part[p..]);
                    p = bytes.len();
                    break;
                }
                Some(open) => {
                    if open > val_start && bytes[open - 1] == b'\\' {
                        // Escaped data bracket; keep going
                        value.push_str(&part[p..open - 1]);
                        value.push('(');
                        p = open + 1;
                    } else {
                        value.push_str(&part[p..open]);
                        p = open;
                        break;
                    }
                }
            }
        }

        length_content_check(ai, entry, &value)?;

        elems.push(AiValue::element(entry, ai, value, base + val_start..base + p));
        if let Some(err) = too_many_ais(elems) {
            return Err(err);
        }
    }

    Ok(())
}

/// Extract elements from one linear part of a raw data string. The part
/// must begin with the FNC1 character `^`; `base` is its offset within the
/// whole input.
pub(crate) fn process_data_str(
    part: &str,
    base: usize,
    input: &str,
    permit_unknown: bool,
    elems: &mut Vec<AiValue>,
) -> Result<(), Gs1Error> {
    let mut p = match part.strip_prefix('^') {
        Some(rest) => {
            if rest.is_empty() {
                return Err(Gs1Error::parse("the AI data is empty"));
            }
            1
        }
        None => return Err(Gs1Error::parse("missing FNC1 in first position")),
    };

    // AI value lengths are byte counts below, so the data must be ASCII
    // before any of it is sliced
    if let Some((pos, ch)) = part.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(Gs1Error::parse_at(
            "invalid character in AI data",
            input,
            base + pos,
            base + pos + ch.len_utf8(),
        ));
    }

    while p < part.len() {
        let entry = match dictionary::lookup_ai_entry(&part[p..], 0, permit_unknown) {
            // An unknown AI of unknown length cannot be split from its
            // value in raw data
            Some(e) if !e.ai.is_empty() => e,
            _ => {
                let tail: String = part[p..].chars().take(4).collect();
                return Err(Gs1Error::parse_at(
                    format!("no known AI is a prefix of: {}...", tail),
                    input,
                    base + p,
                    base + part.len(),
                ));
            }
        };

        let ai = &part[p..p + entry.ai.len()];
        p += entry.ai.len();

        // Value runs to the next FNC1 or end, reduced to the declared
        // maximum for fixed-length AIs
        let to_sep = part[p..].find('^').unwrap_or(part.len() - p);
        let vallen = to_sep.min(entry.max_length());
        let value = &part[p..p + vallen];

        elems.push(AiValue::element(entry, ai, value, base + p..base + p + vallen));
        if let Some(err) = too_many_ais(elems) {
            return Err(err);
        }

        p += vallen;
        if entry.fnc1 && vallen < to_sep {
            return Err(Gs1Error::parse_at(
                format!("AI ({}) data is too long", ai),
                input,
                base + p,
                base + p + (to_sep - vallen),
            ));
        }

        // Skip FNC1, even after fixed-length AIs
        if part.as_bytes().get(p) == Some(&b'^') {
            p += 1;
        }
    }

    Ok(())
}

/// Length bounds and reserved-character check, applied before component
/// validation since reporting a checksum failure is unhelpful when the
/// value has the wrong length.
pub(crate) fn length_content_check(ai: &str, entry: &AiEntry, value: &str) -> Result<(), Gs1Error> {
    if value.len() < entry.min_length() {
        return Err(lint_error(ai, format!("AI ({}) value is too short", ai), None, value));
    }
    if value.len() > entry.max_length() {
        return Err(lint_error(ai, format!("AI ({}) value is too long", ai), None, value));
    }
    if value.contains('^') {
        return Err(lint_error(ai, format!("AI ({}) contains illegal ^ character", ai), None, value));
    }
    Ok(())
}

/// Build a lint error, with `(ai)pre|bad|post` markup when the failing
/// range is known.
fn lint_error(ai: &str, message: String, failure: Option<LintFailure>, value: &str) -> Gs1Error {
    let markup = match failure {
        Some(f) => {
            let end = (f.pos + f.len).min(value.len());
            format!("({}){}|{}|{}", ai, &value[..f.pos], &value[f.pos..end], &value[end..])
        }
        None => String::new(),
    };
    Gs1Error::Lint { message, markup }
}

/// Validate one element value against its dictionary entry: length bounds,
/// then per component the character set and any extra linters.
pub(crate) fn validate_element(ai: &str, entry: &AiEntry, value: &str) -> Result<(), Gs1Error> {
    if value.is_empty() {
        return Err(lint_error(ai, format!("AI ({}) data is empty", ai), None, value));
    }
    // GS1 character sets are all ASCII; rejecting wider characters here
    // keeps all later slicing and length arithmetic byte-for-character
    if let Some((pos, ch)) = value.char_indices().find(|(_, c)| !c.is_ascii()) {
        let failure = LintFailure { reason: LintReason::IllegalCharacter, pos, len: ch.len_utf8() };
        let message = format!("AI ({}): {}", ai, LintReason::IllegalCharacter);
        return Err(lint_error(ai, message, Some(failure), value));
    }
    length_content_check(ai, entry, value)?;

    let mut p = 0;
    for part in entry.parts {
        let complen = (value.len() - p).min(part.max as usize);
        let compval = &value[p..p + complen];

        if part.opt && complen == 0 {
            continue;
        }
        if complen < part.min as usize {
            return Err(lint_error(ai, format!("AI ({}) data is too short", ai), None, value));
        }

        let run = |res: Result<(), LintFailure>| -> Result<(), Gs1Error> {
            res.map_err(|f| {
                let failure = LintFailure { pos: f.pos + p, ..f };
                lint_error(ai, format!("AI ({}): {}", ai, f.reason), Some(failure), value)
            })
        };
        run(part.cset.check(compval))?;
        for linter in part.linters {
            run(linter.lint(compval))?;
        }

        p += complen;
    }

    Ok(())
}

/// Validate every element of the buffer.
pub(crate) fn validate_elements(elems: &[AiValue]) -> Result<(), Gs1Error> {
    for v in elems.iter().filter(|v| v.is_element()) {
        let entry = v.entry.unwrap_or(&dictionary::UNKNOWN_AI);
        validate_element(&v.ai, entry, &v.value)?;
    }
    Ok(())
}

/// Search the buffer for an element matching an AI prefix pattern such as
/// `01` or `392n` (the digit prefix of the pattern is what is matched).
/// `ignore_ai` prevents an element from matching a self-referencing
/// pattern.
fn ai_exists<'a>(elems: &'a [AiValue], pattern: &str, ignore_ai: Option<&str>) -> Option<&'a str> {
    let prefixlen = pattern.bytes().take_while(|b| b.is_ascii_digit()).count();
    for v in elems.iter().filter(|v| v.is_element()) {
        if v.ai.len() < prefixlen || !v.ai.starts_with(&pattern[..prefixlen]) {
            continue;
        }
        if let Some(ignore) = ignore_ai {
            let n = pattern.len().min(v.ai.len()).min(ignore.len());
            if v.ai.as_bytes()[..n] == ignore.as_bytes()[..n] {
                continue;
            }
        }
        return Some(&v.ai);
    }
    None
}

/// Mutual exclusion: no element may co-occur with an AI matching one of
/// its `ex` patterns.
pub(crate) fn validate_ai_mutex(elems: &[AiValue]) -> Result<(), Gs1Error> {
    for v in elems.iter().filter(|v| v.is_element()) {
        let Some(entry) = v.entry else { continue };
        for pattern in entry.ex {
            if let Some(matched) = ai_exists(elems, pattern, Some(&v.ai)) {
                return Err(Gs1Error::Association(format!(
                    "it is invalid to pair AI ({}) with AI ({})",
                    v.ai, matched
                )));
            }
        }
    }
    Ok(())
}

/// Requisites: each `req` group of each element must be satisfied by at
/// least one present AI.
pub(crate) fn validate_ai_requisites(elems: &[AiValue]) -> Result<(), Gs1Error> {
    for v in elems.iter().filter(|v| v.is_element()) {
        let Some(entry) = v.entry else { continue };
        for group in entry.req {
            if !group.iter().any(|pattern| ai_exists(elems, pattern, Some(&v.ai)).is_some()) {
                return Err(Gs1Error::Association(format!(
                    "required AIs for AI ({}) are not satisfied: {}",
                    v.ai,
                    group.join(",")
                )));
            }
        }
    }
    Ok(())
}

/// Repeated AIs must carry identical values. (Repeats occur when reads of
/// multiple symbols on one label are concatenated.)
pub(crate) fn validate_ai_repeats(elems: &[AiValue]) -> Result<(), Gs1Error> {
    for (i, v) in elems.iter().enumerate().filter(|(_, v)| v.is_element()) {
        for v2 in elems[i + 1..].iter().filter(|v2| v2.is_element()) {
            if v.ai == v2.ai && v.value != v2.value {
                return Err(Gs1Error::Association(format!(
                    "multiple instances of AI ({}) have different values",
                    v.ai
                )));
            }
        }
    }
    Ok(())
}

/// Serialize the buffer as a raw data string with `^` for FNC1, inserting
/// the separator only after variable-length values that are not last in
/// their part.
pub(crate) fn build_data_str(elems: &[AiValue]) -> String {
    let mut out = String::new();
    let mut fnc1_req = true;
    for v in elems {
        match v.kind {
            ElementKind::CompositeSeparator => {
                out.push('|');
                fnc1_req = true;
            }
            ElementKind::IgnoredQueryParam => {}
            ElementKind::Element => {
                if fnc1_req {
                    out.push('^');
                }
                out.push_str(&v.ai);
                out.push_str(&v.value);
                fnc1_req = v.entry.map(|e| e.fnc1).unwrap_or(true);
            }
        }
    }
    out
}

/// Serialize the buffer in bracketed AI syntax, escaping data brackets.
pub(crate) fn build_ai_data_str(elems: &[AiValue]) -> String {
    let mut out = String::new();
    for v in elems {
        match v.kind {
            ElementKind::CompositeSeparator => out.push('|'),
            ElementKind::IgnoredQueryParam => {}
            ElementKind::Element => {
                out.push('(');
                out.push_str(&v.ai);
                out.push(')');
                out.push_str(&v.value.replace('(', "\\("));
            }
        }
    }
    out
}

/// Human-readable interpretation lines, one per element, in buffer order.
pub(crate) fn build_hri(elems: &[AiValue], include_titles: bool) -> Vec<String> {
    elems
        .iter()
        .filter(|v| v.is_element())
        .map(|v| {
            let title = v.entry.map(|e| e.title).filter(|_| include_titles);
            match title {
                Some(t) if !t.is_empty() => format!("{} ({}) {}", t, v.ai, v.value),
                _ => format!("({}) {}", v.ai, v.value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<AiValue>, Gs1Error> {
        let mut elems = Vec::new();
        parse_ai_data(input, 0, input, false, &mut elems)?;
        validate_elements(&elems)?;
        Ok(elems)
    }

    fn extract(input: &str) -> Result<Vec<AiValue>, Gs1Error> {
        let mut elems = Vec::new();
        process_data_str(input, 0, input, false, &mut elems)?;
        validate_elements(&elems)?;
        Ok(elems)
    }

    #[test]
    fn parse_bracketed_elements_in_order() {
        let elems = parse("(01)12312312312333(10)ABC123").unwrap();
        assert_eq!(elems.len(), 2);
        assert_eq!(elems[0].ai, "01");
        assert_eq!(elems[0].value, "12312312312333");
        assert_eq!(elems[0].span, 4..18);
        assert_eq!(elems[1].ai, "10");
        assert_eq!(elems[1].value, "ABC123");
        assert_eq!(build_data_str(&elems), "^011231231231233310ABC123");
    }

    #[test]
    fn separator_only_after_variable_length_values() {
        let elems = parse("(10)ABC123(01)12312312312333(21)XYZ").unwrap();
        // (10) is variable length so needs FNC1; (01) is fixed so does not
        assert_eq!(build_data_str(&elems), "^10ABC123^011231231231233321XYZ");
    }

    #[test]
    fn parse_escaped_bracket_in_value() {
        let elems = parse("(10)AB\\(C(21)X").unwrap();
        assert_eq!(elems[0].value, "AB(C");
        assert_eq!(elems[1].value, "X");
        assert_eq!(build_ai_data_str(&elems), "(10)AB\\(C(21)X");
    }

    #[test]
    fn unterminated_bracket_marks_whole_input() {
        let err = parse("(01123").unwrap_err();
        assert_eq!(err.markup(), Some("|(01123|"));
    }

    #[test]
    fn unrecognised_ai_is_a_parse_error() {
        let err = parse("(89)ABC").unwrap_err();
        assert!(matches!(err, Gs1Error::Parse { .. }));
        assert_eq!(err.to_string(), "unrecognised AI: 89");

        let mut elems = Vec::new();
        parse_ai_data("(89)ABC", 0, "(89)ABC", true, &mut elems).unwrap();
        assert!(elems[0].entry.unwrap().is_unknown());
    }

    #[test]
    fn missing_value_fails() {
        assert!(parse("(01)").is_err());
        assert!(parse("(01)12312312312333(10)").is_err());
    }

    #[test]
    fn lint_failure_markup_names_component_range() {
        let err = parse("(01)12312312312334").unwrap_err();
        assert_eq!(err.to_string(), "AI (01): incorrect check digit");
        assert_eq!(err.markup(), Some("(01)1231231231233|4|"));

        let err = parse("(10)AB\u{7f}C").unwrap_err();
        assert!(matches!(err, Gs1Error::Lint { .. }));
    }

    #[test]
    fn length_bounds_reported_before_linting() {
        let err = parse("(01)123").unwrap_err();
        assert_eq!(err.to_string(), "AI (01) value is too short");
        let err = parse("(10)012345678901234567890").unwrap_err();
        assert_eq!(err.to_string(), "AI (10) value is too long");
    }

    #[test]
    fn multi_component_markup_offsets() {
        // (8001): N4 N5 N3 N1 N1; error in the second component is
        // reported at its offset within the whole value
        let err = parse("(8001)1234A678901234").unwrap_err();
        assert_eq!(err.to_string(), "AI (8001): invalid character");
        assert_eq!(err.markup(), Some("(8001)1234|A|678901234"));
    }

    #[test]
    fn non_ascii_values_are_rejected() {
        let err = parse("(8001)123é567890123").unwrap_err();
        assert_eq!(err.to_string(), "AI (8001): invalid character");
        assert_eq!(err.markup(), Some("(8001)123|é|567890123"));

        let err = extract("^1112345é").unwrap_err();
        assert_eq!(err.to_string(), "invalid character in AI data");
        assert_eq!(err.markup(), Some("^1112345|é|"));
    }

    #[test]
    fn digsig_value_uses_file_safe_base64() {
        assert!(parse("(01)12312312312333(8030)MEQCIB-_xyz0123==").is_ok());
        let err = parse("(01)12312312312333(8030)MEQ+CIB").unwrap_err();
        assert_eq!(err.to_string(), "AI (8030): invalid character");
    }

    #[test]
    fn optional_component_may_be_absent() {
        assert!(parse("(8003)01231231231232").is_ok());
        assert!(parse("(8003)01231231231232SER").is_ok());
    }

    #[test]
    fn extract_raw_data_string() {
        let elems = extract("^011231231231233310ABC123^99XYZ").unwrap();
        assert_eq!(elems.len(), 3);
        assert_eq!(elems[0].ai, "01");
        assert_eq!(elems[1].ai, "10");
        assert_eq!(elems[1].value, "ABC123");
        assert_eq!(elems[2].ai, "99");
        assert_eq!(elems[2].value, "XYZ");
        assert_eq!(build_ai_data_str(&elems), "(01)12312312312333(10)ABC123(99)XYZ");
    }

    #[test]
    fn extract_requires_fnc1_in_first() {
        assert_eq!(extract("0112312312312333").unwrap_err().to_string(), "missing FNC1 in first position");
        assert_eq!(extract("^").unwrap_err().to_string(), "the AI data is empty");
    }

    #[test]
    fn extract_rejects_unknown_prefix() {
        let err = extract("^891234").unwrap_err();
        assert!(err.to_string().starts_with("no known AI is a prefix of"));

        // Even permitting unknown AIs, an AI of unknown length cannot be
        // split from its value
        let mut elems = Vec::new();
        assert!(process_data_str("^891234", 0, "^891234", true, &mut elems).is_err());
    }

    #[test]
    fn extract_overlong_variable_value_fails() {
        let err = extract("^10012345678901234567890").unwrap_err();
        assert_eq!(err.to_string(), "AI (10) data is too long");
    }

    #[test]
    fn fixed_length_value_needs_no_separator() {
        // (11) is fixed length 6, directly followed by (10)
        let elems = extract("^11990102103456").unwrap();
        assert_eq!(elems.len(), 2);
        assert_eq!(elems[0].value, "990102");
        assert_eq!(elems[1].value, "3456");
    }

    #[test]
    fn round_trip_bracketed_raw() {
        let cases = [
            "(01)12312312312333(10)ABC123",
            "(01)12312312312333(21)SER%20123",
            "(8010)0123456(8011)123",
        ];
        for case in cases {
            let elems = parse(case).unwrap();
            let raw = build_data_str(&elems);
            let elems2 = extract(&raw).unwrap();
            let pairs: Vec<_> = elems.iter().map(|v| (&v.ai, &v.value)).collect();
            let pairs2: Vec<_> = elems2.iter().map(|v| (&v.ai, &v.value)).collect();
            assert_eq!(pairs, pairs2, "case {}", case);
        }
    }

    #[test]
    fn mutex_ais_rejected() {
        let elems = parse("(01)12312312312333(02)12312312312333(37)5").unwrap();
        let err = validate_ai_mutex(&elems).unwrap_err();
        assert_eq!(err.to_string(), "it is invalid to pair AI (01) with AI (02)");
        assert!(matches!(err, Gs1Error::Association(_)));
    }

    #[test]
    fn requisites_checked_as_one_of_groups() {
        // (02) requires (37)
        let elems = parse("(02)12312312312333").unwrap();
        let err = validate_ai_requisites(&elems).unwrap_err();
        assert_eq!(err.to_string(), "required AIs for AI (02) are not satisfied: 37");

        let elems = parse("(02)12312312312333(37)5").unwrap();
        assert!(validate_ai_requisites(&elems).is_ok());

        // (10) is satisfied by any one of its group
        let elems = parse("(10)LOT1(02)12312312312333(37)5").unwrap();
        assert!(validate_ai_requisites(&elems).is_ok());
    }

    #[test]
    fn repeated_ais_must_agree() {
        let elems = parse("(10)AAA(01)12312312312333(10)AAA").unwrap();
        assert!(validate_ai_repeats(&elems).is_ok());

        let elems = parse("(10)AAA(01)12312312312333(10)BBB").unwrap();
        let err = validate_ai_repeats(&elems).unwrap_err();
        assert_eq!(err.to_string(), "multiple instances of AI (10) have different values");
    }

    #[test]
    fn hri_lines() {
        let elems = parse("(01)12312312312333(10)ABC123").unwrap();
        assert_eq!(build_hri(&elems, false), vec!["(01) 12312312312333", "(10) ABC123"]);
        assert_eq!(
            build_hri(&elems, true),
            vec!["GTIN (01) 12312312312333", "BATCH/LOT (10) ABC123"]
        );
    }
}
