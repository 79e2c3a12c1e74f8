//! AI syntax dictionary.
//!
//! A static table describing the syntax of every known GS1 Application
//! Identifier: its components (character set, length range, extra linters),
//! whether a variable-length value must be terminated by FNC1, its
//! association constraints, its Digital Link primary-key qualifiers and its
//! data title for HRI text.
//!
//! The table is compiled in and never mutated. The "permit unknown AIs"
//! mode is handled at lookup time by returning one of a small set of
//! placeholder entries, chosen by the fixed-length rules that apply to the
//! AI's two-digit prefix.

use crate::lint::{Cset, Linter};

pub const MIN_AI_LEN: usize = 2;
pub const MAX_AI_LEN: usize = 4;
pub const MAX_AI_VALUE_LEN: usize = 90;
pub const MAX_AIS: usize = 64;

/// One component of an AI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub cset: Cset,
    pub min: u8,
    pub max: u8,
    pub opt: bool,
    pub linters: &'static [Linter],
}

/// A dictionary entry.
///
/// `ai` is the AI code, possibly with a trailing `n` standing for any final
/// digit (a numeric family such as `310n`, where the final digit encodes
/// the implied decimal point position).
///
/// `ex` lists AI prefix patterns that must not co-occur with this AI.
/// `req` lists requisite groups; each group is satisfied when at least one
/// AI matching one of its prefix patterns is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiEntry {
    pub ai: &'static str,
    pub fnc1: bool,
    pub parts: &'static [Component],
    pub ex: &'static [&'static str],
    pub req: &'static [&'static [&'static str]],
    /// `Some` when this AI is a Digital Link primary key; the slices are
    /// the permitted key-qualifier AI sequences.
    pub dlpkey: Option<&'static [&'static [&'static str]]>,
    pub title: &'static str,
}

impl AiEntry {
    /// Shortest permitted value length (optional components excluded).
    pub fn min_length(&self) -> usize {
        self.parts.iter().filter(|p| !p.opt).map(|p| p.min as usize).sum()
    }

    /// Longest permitted value length.
    pub fn max_length(&self) -> usize {
        self.parts.iter().map(|p| p.max as usize).sum()
    }

    /// Whether `code` matches this entry's AI pattern exactly.
    pub fn matches(&self, code: &str) -> bool {
        pattern_matches(self.ai, code)
    }

    /// Placeholder entry vivified for an AI absent from the table.
    pub fn is_unknown(&self) -> bool {
        self.ai.is_empty() || self.ai.as_bytes()[0] == b'X'
    }

    /// For a numeric family (pattern ending `n`), the implied decimal point
    /// position encoded by the final digit of `code`.
    pub fn decimal_places(&self, code: &str) -> Option<u32> {
        if self.ai.ends_with('n') && self.matches(code) {
            code.chars().last().and_then(|c| c.to_digit(10))
        } else {
            None
        }
    }
}

/// Pattern match with `n` in the pattern standing for any digit.
fn pattern_matches(pattern: &str, code: &str) -> bool {
    pattern.len() == code.len()
        && pattern
            .bytes()
            .zip(code.bytes())
            .all(|(p, c)| p == c || (p == b'n' && c.is_ascii_digit()))
}

const fn c(cset: Cset, min: u8, max: u8, linters: &'static [Linter]) -> Component {
    Component { cset, min, max, opt: false, linters }
}

const fn opt(part: Component) -> Component {
    Component { opt: true, ..part }
}

// AIs in these prefix ranges are fixed length and not FNC1 terminated.
const FNC1: bool = true;
const NO_FNC1: bool = false;

macro_rules! ai {
    ($code:literal, $fnc1:expr, [$($part:expr),+ $(,)?]
     $(, ex = $ex:expr)? $(, req = $req:expr)? $(, dlpkey = $dl:expr)? ; $title:literal) => {
        AiEntry {
            ai: $code,
            fnc1: $fnc1,
            parts: &[$($part),+],
            ex: {
                let e: &'static [&'static str] = &[];
                $(let e: &'static [&'static str] = $ex;)?
                e
            },
            req: {
                let r: &'static [&'static [&'static str]] = &[];
                $(let r: &'static [&'static [&'static str]] = $req;)?
                r
            },
            dlpkey: {
                let d: Option<&'static [&'static [&'static str]]> = None;
                $(let d: Option<&'static [&'static [&'static str]]> = Some($dl);)?
                d
            },
            title: $title,
        }
    };
}

use Cset::{N, X, Y, Z};
use Linter::*;

/// The embedded AI table, sorted by AI code.
///
/// All AIs sharing a two-digit prefix have the same AI code length; a unit
/// test enforces this, since prefix lookup in the raw data string reader
/// depends on it.
#[rustfmt::skip]
pub static AI_TABLE: &[AiEntry] = &[
    ai!("00",   NO_FNC1, [c(N, 18, 18, &[Csum, Key])], dlpkey = &[&[]]; "SSCC"),
    ai!("01",   NO_FNC1, [c(N, 14, 14, &[Csum, Key])], ex = &["02", "03", "255"],
        dlpkey = &[&["22", "10", "21"], &["235"]]; "GTIN"),
    ai!("02",   NO_FNC1, [c(N, 14, 14, &[Csum, Key])], ex = &["01", "03"], req = &[&["37"]]; "CONTENT"),
    ai!("03",   NO_FNC1, [c(N, 14, 14, &[Csum, Key])], ex = &["01", "02"]; "MTO GTIN"),
    ai!("10",   FNC1, [c(X, 1, 20, &[])], req = &[&["01", "02", "03", "8006", "8026"]]; "BATCH/LOT"),
    ai!("11",   NO_FNC1, [c(N, 6, 6, &[Yymmd0])], req = &[&["01", "02", "8006", "8026"]]; "PROD DATE"),
    ai!("12",   NO_FNC1, [c(N, 6, 6, &[Yymmd0])], req = &[&["8020"]]; "DUE DATE"),
    ai!("13",   NO_FNC1, [c(N, 6, 6, &[Yymmd0])], req = &[&["01", "02", "8006", "8026"]]; "PACK DATE"),
    ai!("15",   NO_FNC1, [c(N, 6, 6, &[Yymmd0])], req = &[&["01", "02", "8006", "8026"]]; "BEST BEFORE or BEST BY"),
    ai!("16",   NO_FNC1, [c(N, 6, 6, &[Yymmd0])], req = &[&["01", "02", "8006", "8026"]]; "SELL BY"),
    ai!("17",   NO_FNC1, [c(N, 6, 6, &[Yymmd0])], req = &[&["01", "02", "255", "8006", "8026"]]; "USE BY or EXPIRY"),
    ai!("20",   NO_FNC1, [c(N, 2, 2, &[])], req = &[&["01", "02", "8006", "8026"]]; "VARIANT"),
    ai!("21",   FNC1, [c(X, 1, 20, &[])], ex = &["235"], req = &[&["01", "03", "8006"]]; "SERIAL"),
    ai!("22",   FNC1, [c(X, 1, 20, &[])], req = &[&["01"]]; "CPV"),
    ai!("235",  FNC1, [c(X, 1, 28, &[])], ex = &["21"], req = &[&["01"]]; "TPX"),
    ai!("240",  FNC1, [c(X, 1, 30, &[])], req = &[&["01", "02", "8006", "8026"]]; "ADDITIONAL ID"),
    ai!("241",  FNC1, [c(X, 1, 30, &[])], req = &[&["01", "02", "8006", "8026"]]; "CUST. PART No."),
    ai!("242",  FNC1, [c(N, 1, 6, &[])], req = &[&["01", "02", "8006", "8026"]]; "MTO VARIANT"),
    ai!("243",  FNC1, [c(X, 1, 20, &[])], req = &[&["01"]]; "PCN"),
    ai!("250",  FNC1, [c(X, 1, 30, &[])], req = &[&["01", "02", "8006", "8026"], &["21"]]; "SECONDARY SERIAL"),
    ai!("251",  FNC1, [c(X, 1, 30, &[])], req = &[&["01", "02", "8006", "8026"]]; "REF. TO SOURCE"),
    ai!("253",  FNC1, [c(N, 13, 13, &[Csum, Key]), opt(c(X, 1, 17, &[]))], dlpkey = &[&[]]; "GDTI"),
    ai!("254",  FNC1, [c(X, 1, 20, &[])], req = &[&["414"]]; "GLN EXTENSION COMPONENT"),
    ai!("255",  FNC1, [c(N, 13, 13, &[Csum, Key]), opt(c(N, 1, 12, &[]))],
        ex = &["01", "02", "8006", "8026"], dlpkey = &[&[]]; "GCN"),
    ai!("30",   FNC1, [c(N, 1, 8, &[])], ex = &["37"], req = &[&["01", "02"]]; "VAR. COUNT"),
    ai!("310n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET WEIGHT (kg)"),
    ai!("311n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "LENGTH (m)"),
    ai!("312n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "WIDTH (m)"),
    ai!("313n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "HEIGHT (m)"),
    ai!("314n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "AREA (m2)"),
    ai!("315n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET VOLUME (l)"),
    ai!("316n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET VOLUME (m3)"),
    ai!("320n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET WEIGHT (lb)"),
    ai!("321n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "LENGTH (in)"),
    ai!("322n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "LENGTH (ft)"),
    ai!("323n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "LENGTH (yd)"),
    ai!("324n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "WIDTH (in)"),
    ai!("325n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "WIDTH (ft)"),
    ai!("326n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "WIDTH (yd)"),
    ai!("327n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "HEIGHT (in)"),
    ai!("328n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "HEIGHT (ft)"),
    ai!("329n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "HEIGHT (yd)"),
    ai!("330n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "GROSS WEIGHT (kg)"),
    ai!("331n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "LENGTH (m), log"),
    ai!("332n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "WIDTH (m), log"),
    ai!("333n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "HEIGHT (m), log"),
    ai!("334n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "AREA (m2), log"),
    ai!("335n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "VOLUME (l), log"),
    ai!("336n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "VOLUME (m3), log"),
    ai!("337n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "KG PER m2"),
    ai!("340n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "GROSS WEIGHT (lb)"),
    ai!("341n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "LENGTH (in), log"),
    ai!("342n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "LENGTH (ft), log"),
    ai!("343n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "LENGTH (yd), log"),
    ai!("344n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "WIDTH (in), log"),
    ai!("345n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "WIDTH (ft), log"),
    ai!("346n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "WIDTH (yd), log"),
    ai!("347n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "HEIGHT (in), log"),
    ai!("348n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "HEIGHT (ft), log"),
    ai!("349n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "HEIGHT (yd), log"),
    ai!("350n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "AREA (in2)"),
    ai!("351n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "AREA (ft2)"),
    ai!("352n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "AREA (yd2)"),
    ai!("353n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "AREA (in2), log"),
    ai!("354n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "AREA (ft2), log"),
    ai!("355n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "AREA (yd2), log"),
    ai!("356n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET WEIGHT (t oz)"),
    ai!("357n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET VOLUME (oz)"),
    ai!("360n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET VOLUME (qt)"),
    ai!("361n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "NET VOLUME (gal.)"),
    ai!("362n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "VOLUME (qt), log"),
    ai!("363n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "VOLUME (gal.), log"),
    ai!("364n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "VOLUME (in3)"),
    ai!("365n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "VOLUME (ft3)"),
    ai!("366n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "VOLUME (yd3)"),
    ai!("367n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "VOLUME (in3), log"),
    ai!("368n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "VOLUME (ft3), log"),
    ai!("369n", NO_FNC1, [c(N, 6, 6, &[])], req = &[&["00"]]; "VOLUME (yd3), log"),
    ai!("37",   FNC1, [c(N, 1, 8, &[])], ex = &["30"], req = &[&["00", "02", "8026"]]; "COUNT"),
    ai!("390n", FNC1, [c(N, 1, 15, &[])], ex = &["391"], req = &[&["8020"]]; "AMOUNT"),
    ai!("391n", FNC1, [c(N, 3, 3, &[Iso4217]), c(N, 1, 15, &[])], ex = &["390"], req = &[&["8020"]]; "AMOUNT"),
    ai!("392n", FNC1, [c(N, 1, 15, &[])], ex = &["393"], req = &[&["01"]]; "PRICE"),
    ai!("393n", FNC1, [c(N, 3, 3, &[Iso4217]), c(N, 1, 15, &[])], ex = &["392"], req = &[&["01"]]; "PRICE"),
    ai!("394n", FNC1, [c(N, 4, 4, &[])], req = &[&["8020"]]; "PRCNT OFF"),
    ai!("395n", FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "PRICE/UoM"),
    ai!("400",  FNC1, [c(X, 1, 30, &[])]; "ORDER NUMBER"),
    ai!("401",  FNC1, [c(X, 1, 30, &[Key])], dlpkey = &[&[]]; "GINC"),
    ai!("402",  FNC1, [c(N, 17, 17, &[Csum, Key])], dlpkey = &[&[]]; "GSIN"),
    ai!("403",  FNC1, [c(X, 1, 30, &[])], req = &[&["00"]]; "ROUTE"),
    ai!("410",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])]; "SHIP TO LOC"),
    ai!("411",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])]; "BILL TO"),
    ai!("412",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])]; "PURCHASE FROM"),
    ai!("413",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])]; "SHIP FOR LOC"),
    ai!("414",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])], dlpkey = &[&["254"], &["7040"]]; "LOC No."),
    ai!("415",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])], dlpkey = &[&["8020"]]; "PAY TO"),
    ai!("416",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])]; "PROD/SERV LOC"),
    ai!("417",  NO_FNC1, [c(N, 13, 13, &[Csum, Key])], dlpkey = &[&["7040"]]; "PARTY"),
    ai!("420",  FNC1, [c(X, 1, 20, &[])], ex = &["421"]; "SHIP TO POST"),
    ai!("421",  FNC1, [c(N, 3, 3, &[Iso3166]), c(X, 1, 9, &[])], ex = &["420"]; "SHIP TO POST"),
    ai!("422",  FNC1, [c(N, 3, 3, &[Iso3166])], req = &[&["01", "02", "8006", "8026"]]; "ORIGIN"),
    ai!("423",  FNC1, [c(N, 3, 15, &[Iso3166List])]; "COUNTRY - INITIAL PROCESS"),
    ai!("424",  FNC1, [c(N, 3, 3, &[Iso3166])]; "COUNTRY - PROCESS"),
    ai!("425",  FNC1, [c(N, 3, 15, &[Iso3166List])]; "COUNTRY - DISASSEMBLY"),
    ai!("426",  FNC1, [c(N, 3, 3, &[Iso3166])]; "COUNTRY - FULL PROCESS"),
    ai!("427",  FNC1, [c(X, 1, 3, &[])], req = &[&["422"]]; "ORIGIN SUBDIVISION"),
    ai!("4300", FNC1, [c(X, 1, 35, &[Pcenc])], req = &[&["00"]]; "SHIP TO COMP"),
    ai!("4301", FNC1, [c(X, 1, 35, &[Pcenc])], req = &[&["00"]]; "SHIP TO NAME"),
    ai!("4302", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "SHIP TO ADD1"),
    ai!("4303", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["4302"]]; "SHIP TO ADD2"),
    ai!("4304", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "SHIP TO SUB"),
    ai!("4305", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "SHIP TO LOC"),
    ai!("4306", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "SHIP TO REG"),
    ai!("4308", FNC1, [c(X, 1, 30, &[])], req = &[&["00"]]; "SHIP TO PHONE"),
    ai!("4310", FNC1, [c(X, 1, 35, &[Pcenc])], req = &[&["00"]]; "RTN TO COMP"),
    ai!("4311", FNC1, [c(X, 1, 35, &[Pcenc])], req = &[&["00"]]; "RTN TO NAME"),
    ai!("4312", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "RTN TO ADD1"),
    ai!("4313", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["4312"]]; "RTN TO ADD2"),
    ai!("4314", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "RTN TO SUB"),
    ai!("4315", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "RTN TO LOC"),
    ai!("4316", FNC1, [c(X, 1, 70, &[Pcenc])], req = &[&["00"]]; "RTN TO REG"),
    ai!("4318", FNC1, [c(X, 1, 30, &[])], req = &[&["00"]]; "RTN TO PHONE"),
    ai!("4320", FNC1, [c(X, 1, 35, &[Pcenc])], req = &[&["00"]]; "SRV DESCRIPTION"),
    ai!("4321", FNC1, [c(N, 1, 1, &[])], req = &[&["00"]]; "DANGEROUS GOODS"),
    ai!("4322", FNC1, [c(N, 1, 1, &[])], req = &[&["00"]]; "AUTH LEAVE"),
    ai!("4323", FNC1, [c(N, 1, 1, &[])], req = &[&["00"]]; "SIG REQUIRED"),
    ai!("4324", FNC1, [c(N, 6, 6, &[Yymmd0]), c(N, 4, 4, &[Hhmm])], req = &[&["00"]]; "NBEF DEL DT"),
    ai!("4325", FNC1, [c(N, 6, 6, &[Yymmd0]), c(N, 4, 4, &[Hhmm])], req = &[&["00"]]; "NAFT DEL DT"),
    ai!("4326", FNC1, [c(N, 6, 6, &[Yymmdd])], req = &[&["00"]]; "REL DATE"),
    ai!("7001", FNC1, [c(N, 13, 13, &[])], req = &[&["01", "02", "8006", "8026"]]; "NSN"),
    ai!("7002", FNC1, [c(X, 1, 30, &[])], req = &[&["01", "02"]]; "MEAT CUT"),
    ai!("7003", FNC1, [c(N, 6, 6, &[Yymmdd]), c(N, 4, 4, &[Hhmm])], req = &[&["01", "02"]]; "EXPIRY TIME"),
    ai!("7004", FNC1, [c(N, 1, 4, &[])], req = &[&["01", "10"]]; "ACTIVE POTENCY"),
    ai!("7005", FNC1, [c(X, 1, 12, &[])], req = &[&["01", "02"]]; "CATCH AREA"),
    ai!("7006", FNC1, [c(N, 6, 6, &[Yymmdd])], req = &[&["01", "02"]]; "FIRST FREEZE DATE"),
    ai!("7007", FNC1, [c(N, 6, 6, &[Yymmdd]), opt(c(N, 6, 6, &[Yymmdd]))], req = &[&["01", "02"]]; "HARVEST DATE"),
    ai!("7008", FNC1, [c(X, 1, 3, &[])], req = &[&["01", "02"]]; "AQUATIC SPECIES"),
    ai!("7009", FNC1, [c(X, 1, 10, &[])], req = &[&["01", "02"]]; "FISHING GEAR TYPE"),
    ai!("7010", FNC1, [c(X, 1, 2, &[])], req = &[&["01", "02"]]; "PROD METHOD"),
    ai!("7011", FNC1, [c(N, 6, 6, &[Yymmdd]), opt(c(N, 4, 4, &[Hhmm]))], req = &[&["01", "02"]]; "TEST BY DATE"),
    ai!("7020", FNC1, [c(X, 1, 20, &[])], req = &[&["01", "8006"]]; "REFURB LOT"),
    ai!("7021", FNC1, [c(X, 1, 20, &[])], req = &[&["01", "8006"]]; "FUNC STAT"),
    ai!("7022", FNC1, [c(X, 1, 20, &[])], req = &[&["7021"]]; "REV STAT"),
    ai!("7023", FNC1, [c(X, 1, 30, &[Key])]; "GIAI - ASSEMBLY"),
    ai!("703n", FNC1, [c(N, 3, 3, &[Iso3166]), c(X, 1, 27, &[])], req = &[&["01", "02"]]; "PROCESSOR #"),
    ai!("7040", FNC1, [c(N, 1, 1, &[]), c(X, 1, 1, &[]), c(X, 1, 1, &[]), c(X, 1, 1, &[])]; "UIC+EXT"),
    ai!("710",  FNC1, [c(X, 1, 20, &[])], req = &[&["01", "02"]]; "NHRN PZN"),
    ai!("711",  FNC1, [c(X, 1, 20, &[])], req = &[&["01", "02"]]; "NHRN CIP"),
    ai!("712",  FNC1, [c(X, 1, 20, &[])], req = &[&["01", "02"]]; "NHRN CN"),
    ai!("713",  FNC1, [c(X, 1, 20, &[])], req = &[&["01", "02"]]; "NHRN DRN"),
    ai!("714",  FNC1, [c(X, 1, 20, &[])], req = &[&["01", "02"]]; "NHRN AIM"),
    ai!("715",  FNC1, [c(X, 1, 20, &[])], req = &[&["01", "02"]]; "NHRN NDC"),
    ai!("723n", FNC1, [c(X, 2, 2, &[]), c(X, 1, 28, &[])], req = &[&["01", "02"]]; "CERT #"),
    ai!("7240", FNC1, [c(X, 1, 20, &[])], req = &[&["01", "8006"]]; "PROTOCOL"),
    ai!("8001", FNC1, [c(N, 4, 4, &[]), c(N, 5, 5, &[]), c(N, 3, 3, &[]), c(N, 1, 1, &[]), c(N, 1, 1, &[])],
        req = &[&["01"]]; "DIMENSIONS"),
    ai!("8002", FNC1, [c(X, 1, 20, &[])]; "CMT No."),
    ai!("8003", FNC1, [c(N, 1, 1, &[Zero]), c(N, 13, 13, &[Csum, Key]), opt(c(X, 1, 16, &[]))],
        dlpkey = &[&[]]; "GRAI"),
    ai!("8004", FNC1, [c(X, 1, 30, &[Key])], dlpkey = &[&["7040"]]; "GIAI"),
    ai!("8005", FNC1, [c(N, 6, 6, &[])], req = &[&["01", "02"]]; "PRICE PER UNIT"),
    ai!("8006", FNC1, [c(N, 14, 14, &[Csum, Key]), c(N, 2, 2, &[NonZero]), c(N, 2, 2, &[NonZero])],
        ex = &["01", "03", "8026"], dlpkey = &[&["22", "10", "21"]]; "ITIP"),
    ai!("8007", FNC1, [c(X, 1, 34, &[])], req = &[&["415"]]; "IBAN"),
    ai!("8008", FNC1, [c(N, 6, 6, &[Yymmdd]), c(N, 2, 2, &[]), opt(c(N, 2, 2, &[])), opt(c(N, 2, 2, &[]))],
        req = &[&["01", "02"]]; "PROD TIME"),
    ai!("8009", FNC1, [c(X, 1, 50, &[])], req = &[&["00", "01"]]; "OPTSEN"),
    ai!("8010", FNC1, [c(Y, 1, 30, &[Key])], dlpkey = &[&["8011"]]; "CPID"),
    ai!("8011", FNC1, [c(N, 1, 12, &[])], req = &[&["8010"]]; "CPID SERIAL"),
    ai!("8012", FNC1, [c(X, 1, 20, &[])], req = &[&["01", "8006"]]; "VERSION"),
    ai!("8013", FNC1, [c(X, 1, 25, &[Key])], dlpkey = &[&[]]; "GMN"),
    ai!("8017", FNC1, [c(N, 18, 18, &[Csum, Key])], ex = &["8018"], dlpkey = &[&["8019"]]; "GSRN - PROVIDER"),
    ai!("8018", FNC1, [c(N, 18, 18, &[Csum, Key])], ex = &["8017"], dlpkey = &[&["8019"]]; "GSRN - RECIPIENT"),
    ai!("8019", FNC1, [c(N, 1, 10, &[])], req = &[&["8017", "8018"]]; "SRIN"),
    ai!("8020", FNC1, [c(X, 1, 25, &[])], req = &[&["415"]]; "REF No."),
    ai!("8026", FNC1, [c(N, 14, 14, &[Csum, Key]), c(N, 2, 2, &[NonZero]), c(N, 2, 2, &[NonZero])],
        ex = &["02", "8006"], req = &[&["37"]]; "ITIP CONTENT"),
    ai!("8030", FNC1, [c(Z, 1, 90, &[])],
        req = &[&["00", "01", "253", "255", "8003", "8004", "8006", "8010", "8017", "8018"]]; "DIGSIG"),
    ai!("8110", FNC1, [c(X, 1, 70, &[])]; "COUPON CODE"),
    ai!("8111", FNC1, [c(N, 4, 4, &[])], req = &[&["255"]]; "POINTS"),
    ai!("8112", FNC1, [c(X, 1, 70, &[])]; "PAPERLESS COUPON"),
    ai!("8200", FNC1, [c(X, 1, 70, &[])], req = &[&["01"]]; "PRODUCT URL"),
    ai!("90",   FNC1, [c(X, 1, 30, &[])]; "INTERNAL"),
    ai!("91",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("92",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("93",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("94",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("95",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("96",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("97",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("98",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
    ai!("99",   FNC1, [c(X, 1, 90, &[])]; "INTERNAL"),
];

/*
 * Placeholder entries for AIs absent from the table, vivified at lookup
 * time when permit-unknown-AIs is enabled. Fixed-length variants exist for
 * prefixes that the GS1 General Specifications pre-define as fixed length.
 *
 */
pub static UNKNOWN_AI: AiEntry = ai!("", FNC1, [c(X, 1, 90, &[])]; "UNKNOWN");
static UNKNOWN_AI2: AiEntry = ai!("XX", FNC1, [c(X, 1, 90, &[])]; "UNKNOWN");
static UNKNOWN_AI3: AiEntry = ai!("XXX", FNC1, [c(X, 1, 90, &[])]; "UNKNOWN");
static UNKNOWN_AI4: AiEntry = ai!("XXXX", FNC1, [c(X, 1, 90, &[])]; "UNKNOWN");
static UNKNOWN_AI2_FIXED2: AiEntry = ai!("XX", NO_FNC1, [c(X, 2, 2, &[])]; "UNKNOWN");
static UNKNOWN_AI2_FIXED14: AiEntry = ai!("XX", NO_FNC1, [c(X, 14, 14, &[])]; "UNKNOWN");
static UNKNOWN_AI2_FIXED16: AiEntry = ai!("XX", NO_FNC1, [c(X, 16, 16, &[])]; "UNKNOWN");
static UNKNOWN_AI2_FIXED18: AiEntry = ai!("XX", NO_FNC1, [c(X, 18, 18, &[])]; "UNKNOWN");
static UNKNOWN_AI3_FIXED13: AiEntry = ai!("XXX", NO_FNC1, [c(X, 13, 13, &[])]; "UNKNOWN");
static UNKNOWN_AI4_FIXED6: AiEntry = ai!("XXXX", NO_FNC1, [c(X, 6, 6, &[])]; "UNKNOWN");

/// Fixed value lengths pre-assigned to two-digit AI prefixes, used when
/// vivifying an unknown AI. Zero means variable length.
#[rustfmt::skip]
static FIXED_PREFIX_VALLEN: [u8; 100] = [
    18, 14, 14, 14, 16,                          // (00) - (04)
     0,  0,  0,  0,  0,  0,
     6,  6,  6,  6,  6,  6,  6,  6,  6,  2,      // (11) - (20)
     0,  0,
     0,                                          // (23) now allocated variable length
     0,  0,  0,  0,  0,  0,  0,
     6,  6,  6,  6,  6,  6,                      // (31) - (36)
     0,  0,  0,  0,
    13,                                          // (41)
     0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
];

// Byte-indexed so that a multi-byte character in the data cannot land a
// string slice off a character boundary
fn all_digits(b: &[u8]) -> bool {
    !b.is_empty() && b.iter().all(u8::is_ascii_digit)
}

fn prefix_index(data: &str) -> Option<usize> {
    let b = data.as_bytes();
    if b.len() < 2 || !b[0].is_ascii_digit() || !b[1].is_ascii_digit() {
        return None;
    }
    Some(usize::from(b[0] - b'0') * 10 + usize::from(b[1] - b'0'))
}

/// AI code length for a two-digit prefix, derived from the table. Zero when
/// no known AI starts with the prefix.
pub(crate) fn ai_length_by_prefix(data: &str) -> usize {
    match data.get(..2) {
        Some(prefix) => AI_TABLE
            .iter()
            .find(|e| e.ai.starts_with(prefix))
            .map(|e| e.ai.len())
            .unwrap_or(0),
        None => 0,
    }
}

/// Look up the AI table entry for an AI, or for an AI at the start of raw
/// data.
///
/// For an exact lookup `ailen` gives the AI length; `ailen == 0` instead
/// finds an entry whose AI code is a prefix of `data`. When the table has
/// no match and `permit_unknown` is set, a placeholder entry is vivified,
/// but only if the AI length and value length rules for its prefix allow
/// it. An AI that extends a known AI code is never vivified.
pub fn lookup_ai_entry(data: &str, ailen: usize, permit_unknown: bool) -> Option<&'static AiEntry> {
    if ailen == 1 || ailen > MAX_AI_LEN {
        return None;
    }
    let digits = if ailen != 0 { ailen } else { MIN_AI_LEN };
    if data.len() < digits || !all_digits(&data.as_bytes()[..digits]) {
        return None;
    }

    for entry in AI_TABLE {
        let entrylen = entry.ai.len();
        if let Some(prefix) = data.get(..entrylen) {
            if pattern_matches(entry.ai, prefix) {
                if ailen != 0 && entrylen != ailen {
                    return None; // prefix match, but incorrect length
                }
                return Some(entry);
            }
        }
        // Don't vivify an AI that is a prefix of a known AI
        if ailen != 0 && ailen < entrylen && pattern_matches(&entry.ai[..ailen], &data[..ailen]) {
            return None;
        }
    }

    if !permit_unknown {
        return None;
    }

    // Vivify the AI only when its length agrees with the length that its
    // prefix dictates, where one is defined.
    let ai_len_by_prefix = ai_length_by_prefix(data);
    if ailen != 0 && ai_len_by_prefix != 0 && ai_len_by_prefix != ailen {
        return None;
    }
    if ai_len_by_prefix != 0
        && (data.len() < ai_len_by_prefix
            || !all_digits(&data.as_bytes()[..ai_len_by_prefix]))
    {
        return None;
    }

    let val_len_by_prefix = prefix_index(data).map(|i| FIXED_PREFIX_VALLEN[i]).unwrap_or(0);
    let entry = match (ai_len_by_prefix, val_len_by_prefix) {
        (2, 0) => &UNKNOWN_AI2,
        (2, 2) => &UNKNOWN_AI2_FIXED2,
        (2, 14) => &UNKNOWN_AI2_FIXED14,
        (2, 16) => &UNKNOWN_AI2_FIXED16,
        (2, 18) => &UNKNOWN_AI2_FIXED18,
        (3, 0) => &UNKNOWN_AI3,
        (3, 13) => &UNKNOWN_AI3_FIXED13,
        (4, 0) => &UNKNOWN_AI4,
        (4, 6) => &UNKNOWN_AI4_FIXED6,
        _ => &UNKNOWN_AI, // unknown AI length
    };
    Some(entry)
}
