//! Per-component value linters.
//!
//! Each AI component in the syntax dictionary names a character set and an
//! optional list of extra linters. The set of linters is closed: the
//! dictionary is compiled in, so a dictionary entry can only ever refer to
//! a [`Linter`] variant and dispatch is a plain `match`.
//!
//! A linter failure reports the byte range of the offending characters
//! relative to the component value, which the caller maps back to the
//! original input for markup rendering.

use std::fmt;

/// Character set of a dictionary component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cset {
    /// Digits only.
    N,
    /// GS1 AI encodable character set 82.
    X,
    /// GS1 AI encodable character set 39 (digits, upper case, `#`, `-`, `/`).
    Y,
    /// File-safe / URI-safe base64 alphabet.
    Z,
}

impl Cset {
    pub fn contains(self, ch: char) -> bool {
        match self {
            Cset::N => ch.is_ascii_digit(),
            Cset::X => {
                ch.is_ascii_alphanumeric()
                    || matches!(
                        ch,
                        '!' | '"'
                            | '%'
                            | '&'
                            | '\''
                            | '('
                            | ')'
                            | '*'
                            | '+'
                            | ','
                            | '-'
                            | '.'
                            | '/'
                            | ':'
                            | ';'
                            | '<'
                            | '='
                            | '>'
                            | '?'
                            | '_'
                    )
            }
            Cset::Y => {
                ch.is_ascii_digit() || ch.is_ascii_uppercase() || matches!(ch, '#' | '-' | '/')
            }
            Cset::Z => ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'),
        }
    }

    /// Check every character of `val` against the set. For cset 64 trailing
    /// `=` padding is permitted.
    pub fn check(self, val: &str) -> Result<(), LintFailure> {
        let trimmed = if self == Cset::Z { val.trim_end_matches('=') } else { val };
        for (i, ch) in trimmed.char_indices() {
            if !self.contains(ch) {
                return Err(LintFailure::at(LintReason::IllegalCharacter, i, ch.len_utf8()));
            }
        }
        Ok(())
    }
}

/// Extra value rule named by a dictionary component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linter {
    /// GS1 mod-10 check digit in the final position.
    Csum,
    /// GS1 key: minimum length and a leading GS1 Company Prefix.
    Key,
    /// Date `YYMMDD` with `DD = 00` permitted (whole-month expiry).
    Yymmd0,
    /// Date `YYMMDD`, day of month required.
    Yymmdd,
    /// Date and hour `YYMMDDHH`.
    Yymmddhh,
    /// Time of day `HHMM`.
    Hhmm,
    /// ISO 3166 three-digit numeric country code.
    Iso3166,
    /// Concatenated list of ISO 3166 numeric country codes.
    Iso3166List,
    /// ISO 4217 three-digit numeric currency code.
    Iso4217,
    /// Percent-encoded payload: each `%` is followed by two hex digits.
    Pcenc,
    /// Value must not be all zeros.
    NonZero,
    /// Value must be all zeros.
    Zero,
}

/// Why a component value failed, and where.
///
/// `pos` and `len` are byte offsets relative to the component value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintFailure {
    pub reason: LintReason,
    pub pos: usize,
    pub len: usize,
}

impl LintFailure {
    fn at(reason: LintReason, pos: usize, len: usize) -> Self {
        LintFailure { reason, pos, len }
    }

    fn whole(reason: LintReason, val: &str) -> Self {
        LintFailure { reason, pos: 0, len: val.len() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintReason {
    IllegalCharacter,
    IncorrectCheckDigit,
    WrongLength,
    KeyTooShort,
    KeyMissingCompanyPrefix,
    MonthOutOfRange,
    DayOutOfRange,
    HourOutOfRange,
    MinuteOutOfRange,
    NotIso3166,
    NotIso4217,
    InvalidPercentEncoding,
    MustBeNonZero,
    MustBeZero,
}

impl fmt::Display for LintReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LintReason::IllegalCharacter => "invalid character",
            LintReason::IncorrectCheckDigit => "incorrect check digit",
            LintReason::WrongLength => "incorrect length for this component",
            LintReason::KeyTooShort => "too short for a GS1 key",
            LintReason::KeyMissingCompanyPrefix => "GS1 key must start with a GS1 Company Prefix",
            LintReason::MonthOutOfRange => "month out of range",
            LintReason::DayOutOfRange => "day of month out of range",
            LintReason::HourOutOfRange => "hour out of range",
            LintReason::MinuteOutOfRange => "minute out of range",
            LintReason::NotIso3166 => "not an ISO 3166 numeric country code",
            LintReason::NotIso4217 => "not an ISO 4217 numeric currency code",
            LintReason::InvalidPercentEncoding => "invalid percent encoding",
            LintReason::MustBeNonZero => "value must not be all zeros",
            LintReason::MustBeZero => "value must be all zeros",
        };
        f.write_str(msg)
    }
}

impl Linter {
    pub fn lint(self, val: &str) -> Result<(), LintFailure> {
        match self {
            Linter::Csum => lint_csum(val),
            Linter::Key => lint_key(val),
            Linter::Yymmd0 => lint_yymmdd(val, true),
            Linter::Yymmdd => lint_yymmdd(val, false),
            Linter::Yymmddhh => lint_yymmddhh(val),
            Linter::Hhmm => lint_hhmm(val),
            Linter::Iso3166 => lint_iso3166(val),
            Linter::Iso3166List => lint_iso3166_list(val),
            Linter::Iso4217 => lint_iso4217(val),
            Linter::Pcenc => lint_pcenc(val),
            Linter::NonZero => lint_nonzero(val),
            Linter::Zero => lint_zero(val),
        }
    }
}

/// GS1 check digit for a string of data digits, weights alternating 3 and 1
/// from the rightmost data digit.
pub(crate) fn parity_digit(data: &str) -> Option<char> {
    if data.is_empty() || !data.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut weight = if data.len() % 2 == 1 { 3 } else { 1 };
    let mut parity = 0u32;
    for b in data.bytes() {
        parity += weight * u32::from(b - b'0');
        weight = 4 - weight;
    }
    Some(char::from(b'0' + ((10 - parity % 10) % 10) as u8))
}

/// Whether the final digit of `val` is the correct GS1 check digit over the
/// preceding digits.
pub(crate) fn validate_parity(val: &str) -> bool {
    if val.len() < 2 {
        return false;
    }
    let (data, check) = val.split_at(val.len() - 1);
    parity_digit(data).map(|d| d.to_string() == check).unwrap_or(false)
}

fn first_non_digit(val: &str) -> Option<usize> {
    val.bytes().position(|b| !b.is_ascii_digit())
}

fn lint_csum(val: &str) -> Result<(), LintFailure> {
    if let Some(pos) = first_non_digit(val) {
        return Err(LintFailure::at(LintReason::IllegalCharacter, pos, 1));
    }
    if val.len() < 2 {
        return Err(LintFailure::whole(LintReason::WrongLength, val));
    }
    if !validate_parity(val) {
        return Err(LintFailure::at(LintReason::IncorrectCheckDigit, val.len() - 1, 1));
    }
    Ok(())
}

fn lint_key(val: &str) -> Result<(), LintFailure> {
    if val.len() < 4 {
        return Err(LintFailure::whole(LintReason::KeyTooShort, val));
    }
    if let Some(pos) = val.as_bytes()[..4].iter().position(|b| !b.is_ascii_digit()) {
        return Err(LintFailure::at(LintReason::KeyMissingCompanyPrefix, pos, 1));
    }
    Ok(())
}

fn days_in_month(yy: u32, mm: u32) -> u32 {
    match mm {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        // Two-digit years: every year divisible by 4 is a leap year within
        // the window GS1 dates can express.
        2 => {
            if yy % 4 == 0 {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn lint_yymmdd(val: &str, zero_day_ok: bool) -> Result<(), LintFailure> {
    if let Some(pos) = first_non_digit(val) {
        return Err(LintFailure::at(LintReason::IllegalCharacter, pos, 1));
    }
    if val.len() != 6 {
        return Err(LintFailure::whole(LintReason::WrongLength, val));
    }
    let yy: u32 = val[0..2].parse().unwrap_or(0);
    let mm: u32 = val[2..4].parse().unwrap_or(0);
    let dd: u32 = val[4..6].parse().unwrap_or(0);
    if !(1..=12).contains(&mm) {
        return Err(LintFailure::at(LintReason::MonthOutOfRange, 2, 2));
    }
    if dd == 0 {
        if !zero_day_ok {
            return Err(LintFailure::at(LintReason::DayOutOfRange, 4, 2));
        }
    } else if dd > days_in_month(yy, mm) {
        return Err(LintFailure::at(LintReason::DayOutOfRange, 4, 2));
    }
    Ok(())
}

fn lint_yymmddhh(val: &str) -> Result<(), LintFailure> {
    if let Some(pos) = first_non_digit(val) {
        return Err(LintFailure::at(LintReason::IllegalCharacter, pos, 1));
    }
    if val.len() != 8 {
        return Err(LintFailure::whole(LintReason::WrongLength, val));
    }
    lint_yymmdd(&val[..6], false)?;
    let hh: u32 = val[6..8].parse().unwrap_or(99);
    if hh > 23 {
        return Err(LintFailure::at(LintReason::HourOutOfRange, 6, 2));
    }
    Ok(())
}

fn lint_hhmm(val: &str) -> Result<(), LintFailure> {
    if let Some(pos) = first_non_digit(val) {
        return Err(LintFailure::at(LintReason::IllegalCharacter, pos, 1));
    }
    if val.len() != 4 {
        return Err(LintFailure::whole(LintReason::WrongLength, val));
    }
    if val[0..2].parse::<u32>().unwrap_or(99) > 23 {
        return Err(LintFailure::at(LintReason::HourOutOfRange, 0, 2));
    }
    if val[2..4].parse::<u32>().unwrap_or(99) > 59 {
        return Err(LintFailure::at(LintReason::MinuteOutOfRange, 2, 2));
    }
    Ok(())
}

fn lint_iso3166(val: &str) -> Result<(), LintFailure> {
    if let Some(pos) = first_non_digit(val) {
        return Err(LintFailure::at(LintReason::IllegalCharacter, pos, 1));
    }
    if val.len() != 3 {
        return Err(LintFailure::whole(LintReason::WrongLength, val));
    }
    let code: u16 = val.parse().unwrap_or(0);
    if ISO3166_NUMERIC.binary_search(&code).is_err() {
        return Err(LintFailure::whole(LintReason::NotIso3166, val));
    }
    Ok(())
}

fn lint_iso3166_list(val: &str) -> Result<(), LintFailure> {
    if let Some(pos) = first_non_digit(val) {
        return Err(LintFailure::at(LintReason::IllegalCharacter, pos, 1));
    }
    if val.is_empty() || val.len() % 3 != 0 {
        return Err(LintFailure::whole(LintReason::WrongLength, val));
    }
    for (i, chunk) in val.as_bytes().chunks(3).enumerate() {
        let code: u16 = std::str::from_utf8(chunk)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        if ISO3166_NUMERIC.binary_search(&code).is_err() {
            return Err(LintFailure::at(LintReason::NotIso3166, i * 3, 3));
        }
    }
    Ok(())
}

fn lint_iso4217(val: &str) -> Result<(), LintFailure> {
    if let Some(pos) = first_non_digit(val) {
        return Err(LintFailure::at(LintReason::IllegalCharacter, pos, 1));
    }
    if val.len() != 3 {
        return Err(LintFailure::whole(LintReason::WrongLength, val));
    }
    let code: u16 = val.parse().unwrap_or(0);
    if ISO4217_NUMERIC.binary_search(&code).is_err() {
        return Err(LintFailure::whole(LintReason::NotIso4217, val));
    }
    Ok(())
}

fn lint_pcenc(val: &str) -> Result<(), LintFailure> {
    let bytes = val.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                let len = (bytes.len() - i).min(3);
                return Err(LintFailure::at(LintReason::InvalidPercentEncoding, i, len));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn lint_nonzero(val: &str) -> Result<(), LintFailure> {
    if !val.is_empty() && val.bytes().all(|b| b == b'0') {
        return Err(LintFailure::whole(LintReason::MustBeNonZero, val));
    }
    Ok(())
}

fn lint_zero(val: &str) -> Result<(), LintFailure> {
    if let Some(pos) = val.bytes().position(|b| b != b'0') {
        return Err(LintFailure::at(LintReason::MustBeZero, pos, 1));
    }
    Ok(())
}

/// ISO 3166-1 numeric country codes, sorted.
static ISO3166_NUMERIC: &[u16] = &[
    4, 8, 10, 12, 16, 20, 24, 28, 31, 32, 36, 40, 44, 48, 50, 51, 52, 56, 60, 64, 68, 70, 72, 74,
    76, 84, 86, 90, 92, 96, 100, 104, 108, 112, 116, 120, 124, 132, 136, 140, 144, 148, 152, 156,
    158, 162, 166, 170, 174, 175, 178, 180, 184, 188, 191, 192, 196, 203, 204, 208, 212, 214, 218,
    222, 226, 231, 232, 233, 234, 238, 239, 242, 246, 248, 250, 254, 258, 260, 262, 266, 268, 270,
    275, 276, 288, 292, 296, 300, 304, 308, 312, 316, 320, 324, 328, 332, 334, 336, 340, 344, 348,
    352, 356, 360, 364, 368, 372, 376, 380, 384, 388, 392, 398, 400, 404, 408, 410, 414, 417, 418,
    422, 426, 428, 430, 434, 438, 440, 442, 446, 450, 454, 458, 462, 466, 470, 474, 478, 480, 484,
    492, 496, 498, 499, 500, 504, 508, 512, 516, 520, 524, 528, 531, 533, 534, 535, 540, 548, 554,
    558, 562, 566, 570, 574, 578, 580, 581, 583, 584, 585, 586, 591, 598, 600, 604, 608, 612, 616,
    620, 624, 626, 630, 634, 638, 642, 643, 646, 652, 654, 659, 660, 662, 663, 666, 670, 674, 678,
    682, 686, 688, 690, 694, 702, 703, 704, 705, 706, 710, 716, 724, 728, 729, 732, 740, 744, 748,
    752, 756, 760, 762, 764, 768, 772, 776, 780, 784, 788, 792, 795, 796, 798, 800, 804, 807, 818,
    826, 831, 832, 833, 834, 840, 850, 854, 858, 860, 862, 876, 882, 887, 894,
];

/// ISO 4217 numeric currency codes, sorted.
static ISO4217_NUMERIC: &[u16] = &[
    8, 12, 32, 36, 44, 48, 50, 51, 52, 60, 64, 68, 72, 84, 90, 96, 104, 108, 116, 124, 132, 136,
    144, 152, 156, 170, 174, 188, 191, 192, 203, 208, 214, 222, 230, 232, 238, 242, 262, 270, 292,
    320, 324, 328, 332, 340, 344, 348, 352, 356, 360, 364, 368, 376, 388, 392, 398, 400, 404, 408,
    410, 414, 417, 418, 422, 426, 430, 434, 446, 454, 458, 462, 480, 484, 496, 498, 504, 512, 516,
    524, 532, 533, 548, 554, 558, 566, 578, 586, 590, 598, 600, 604, 608, 634, 643, 646, 654, 682,
    690, 694, 702, 704, 748, 752, 756, 760, 764, 776, 780, 784, 788, 800, 807, 818, 826, 834, 840,
    858, 860, 882, 886, 901, 927, 928, 929, 930, 931, 932, 933, 934, 936, 938, 940, 941, 943, 944,
    946, 947, 948, 949, 950, 951, 952, 953, 955, 956, 957, 958, 959, 960, 961, 962, 963, 964, 965,
    967, 968, 969, 970, 971, 972, 973, 975, 976, 977, 978, 979, 980, 981, 984, 985, 986, 990, 994,
    997, 999,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cset82_accepts_full_alphabet() {
        assert!(Cset::X.check("!\"%&'()*+,-./0129:;<=>?AZ_az").is_ok());
        let err = Cset::X.check("ABC DEF").unwrap_err();
        assert_eq!(err.reason, LintReason::IllegalCharacter);
        assert_eq!((err.pos, err.len), (3, 1));
        assert!(Cset::X.check("caf\u{e9}").is_err());
    }

    #[test]
    fn cset39_is_upper_case_only() {
        assert!(Cset::Y.check("#-/09AZ").is_ok());
        assert!(Cset::Y.check("az").is_err());
    }

    #[test]
    fn cset64_permits_trailing_padding() {
        assert!(Cset::Z.check("Ab0-_==").is_ok());
        assert!(Cset::Z.check("Ab=0").is_err());
    }

    #[test]
    fn parity_matches_known_keys() {
        assert_eq!(parity_digit("1231231231233"), Some('3'));
        assert!(validate_parity("12312312312333"));
        assert!(!validate_parity("12312312312334"));
        assert!(validate_parity("2112345678900"));
        assert!(validate_parity("416000336108"));
        assert!(validate_parity("02345673"));
    }

    #[test]
    fn csum_reports_final_digit() {
        assert!(Linter::Csum.lint("12312312312333").is_ok());
        let err = Linter::Csum.lint("12312312312334").unwrap_err();
        assert_eq!(err.reason, LintReason::IncorrectCheckDigit);
        assert_eq!((err.pos, err.len), (13, 1));
    }

    #[test]
    fn key_requires_company_prefix() {
        assert!(Linter::Key.lint("9526").is_ok());
        assert_eq!(Linter::Key.lint("952").unwrap_err().reason, LintReason::KeyTooShort);
        assert_eq!(
            Linter::Key.lint("95A6").unwrap_err().reason,
            LintReason::KeyMissingCompanyPrefix
        );
    }

    #[test]
    fn dates_respect_month_lengths() {
        assert!(Linter::Yymmdd.lint("991231").is_ok());
        assert!(Linter::Yymmdd.lint("240229").is_ok());
        assert_eq!(
            Linter::Yymmdd.lint("230229").unwrap_err().reason,
            LintReason::DayOutOfRange
        );
        assert_eq!(
            Linter::Yymmdd.lint("991331").unwrap_err().reason,
            LintReason::MonthOutOfRange
        );
        assert_eq!(
            Linter::Yymmdd.lint("991200").unwrap_err().reason,
            LintReason::DayOutOfRange
        );
    }

    #[test]
    fn zero_day_denotes_whole_month() {
        assert!(Linter::Yymmd0.lint("991200").is_ok());
        assert_eq!(
            Linter::Yymmd0.lint("990031").unwrap_err().reason,
            LintReason::MonthOutOfRange
        );
    }

    #[test]
    fn hours_and_minutes_bounded() {
        assert!(Linter::Yymmddhh.lint("99123123").is_ok());
        assert_eq!(
            Linter::Yymmddhh.lint("99123124").unwrap_err().reason,
            LintReason::HourOutOfRange
        );
        assert!(Linter::Hhmm.lint("2359").is_ok());
        assert_eq!(Linter::Hhmm.lint("2360").unwrap_err().reason, LintReason::MinuteOutOfRange);
        assert_eq!(Linter::Hhmm.lint("2400").unwrap_err().reason, LintReason::HourOutOfRange);
    }

    #[test]
    fn iso_code_lists() {
        assert!(Linter::Iso3166.lint("276").is_ok());
        assert!(Linter::Iso3166.lint("999").is_err());
        assert!(Linter::Iso3166List.lint("276250826").is_ok());
        let err = Linter::Iso3166List.lint("276999826").unwrap_err();
        assert_eq!((err.pos, err.len), (3, 3));
        assert!(Linter::Iso4217.lint("978").is_ok());
        assert!(Linter::Iso4217.lint("000").is_err());
    }

    #[test]
    fn percent_encoding() {
        assert!(Linter::Pcenc.lint("ABC%2Fdef%20").is_ok());
        let err = Linter::Pcenc.lint("ABC%2").unwrap_err();
        assert_eq!(err.reason, LintReason::InvalidPercentEncoding);
        assert_eq!(err.pos, 3);
        assert!(Linter::Pcenc.lint("%GG").is_err());
    }

    #[test]
    fn zero_and_nonzero() {
        assert!(Linter::NonZero.lint("0001").is_ok());
        assert_eq!(
            Linter::NonZero.lint("0000").unwrap_err().reason,
            LintReason::MustBeNonZero
        );
        assert!(Linter::Zero.lint("0000").is_ok());
        assert_eq!(Linter::Zero.lint("0100").unwrap_err().pos, 1);
    }
}
