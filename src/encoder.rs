//! The stateful conversion session: one canonical element buffer, set from
//! any of the input representations and read back in any of the output
//! representations.
//!
//! A failed setter reports its error and leaves the previously committed
//! buffer untouched; the recorded diagnostic is overwritten by the next
//! operation.

use crate::ai::{self, AiValue, ElementKind};
use crate::dl;
use crate::error::{Diagnostic, Gs1Error};
use crate::scandata::{self, Symbology};

/// The cross-AI validations applied after every successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Mutually exclusive AI pairings. Locked on.
    MutexAis,
    /// Requisite AI associations.
    RequisiteAis,
    /// Repeated AIs must carry the same value. Locked on.
    RepeatedAis,
}

struct ValidationEntry {
    validation: Validation,
    locked: bool,
    enabled: bool,
    run: fn(&[AiValue]) -> Result<(), Gs1Error>,
}

/// A conversion session.
///
/// ```
/// use gs1syntax::Gs1Encoder;
///
/// let mut enc = Gs1Encoder::new();
/// enc.set_ai_data_str("(01)12312312312333(10)ABC123")?;
/// assert_eq!(enc.data_str(), "^011231231231233310ABC123");
/// assert_eq!(enc.dl_uri(None)?, "https://id.gs1.org/01/12312312312333/10/ABC123");
/// # Ok::<(), gs1syntax::Gs1Error>(())
/// ```
pub struct Gs1Encoder {
    sym: Symbology,
    add_check_digit: bool,
    permit_unknown_ais: bool,
    include_data_titles_in_hri: bool,
    validations: [ValidationEntry; 3],
    data_str: String,
    elems: Vec<AiValue>,
    diag: Diagnostic,
    dl_key_qualifiers: Vec<String>,
}

impl Default for Gs1Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Gs1Encoder {
    /// Create a session with all validations at their defaults and no
    /// data. Builds the Digital Link key-qualifier list from the
    /// dictionary.
    pub fn new() -> Self {
        Gs1Encoder {
            sym: Symbology::None,
            add_check_digit: false,
            permit_unknown_ais: false,
            include_data_titles_in_hri: false,
            validations: [
                ValidationEntry {
                    validation: Validation::MutexAis,
                    locked: true,
                    enabled: true,
                    run: ai::validate_ai_mutex,
                },
                ValidationEntry {
                    validation: Validation::RequisiteAis,
                    locked: false,
                    enabled: true,
                    run: ai::validate_ai_requisites,
                },
                ValidationEntry {
                    validation: Validation::RepeatedAis,
                    locked: true,
                    enabled: true,
                    run: ai::validate_ai_repeats,
                },
            ],
            data_str: String::new(),
            elems: Vec::new(),
            diag: Diagnostic::default(),
            dl_key_qualifiers: dl::build_dl_key_qualifiers(),
        }
    }

    fn fail(&mut self, err: Gs1Error) -> Gs1Error {
        self.diag = Diagnostic::from_error(&err);
        err
    }

    /// Lint every element, then apply the enabled cross-AI validations.
    fn validate(&self, elems: &[AiValue]) -> Result<(), Gs1Error> {
        ai::validate_elements(elems)?;
        for v in &self.validations {
            if v.enabled {
                (v.run)(elems)?;
            }
        }
        Ok(())
    }

    fn check_too_many(elems: &[AiValue]) -> Result<(), Gs1Error> {
        match ai::too_many_ais(elems) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Set the session data from a bracketed AI data string, e.g.
    /// `(01)12312312312333(10)ABC123`, with `|` separating the linear and
    /// composite components.
    pub fn set_ai_data_str(&mut self, ai_data: &str) -> Result<(), Gs1Error> {
        self.diag.clear();
        let permit = self.permit_unknown_ais;

        let parse = |elems: &mut Vec<AiValue>| -> Result<(), Gs1Error> {
            match ai_data.find('|') {
                Some(cc) => {
                    ai::parse_ai_data(&ai_data[..cc], 0, ai_data, permit, elems)?;
                    elems.push(AiValue::composite_separator(cc));
                    ai::parse_ai_data(&ai_data[cc + 1..], cc + 1, ai_data, permit, elems)
                }
                None => ai::parse_ai_data(ai_data, 0, ai_data, permit, elems),
            }
        };

        let mut elems = Vec::new();
        let result = parse(&mut elems)
            .and_then(|_| Self::check_too_many(&elems))
            .and_then(|_| self.validate(&elems));
        if let Err(err) = result {
            return Err(self.fail(err));
        }

        self.data_str = ai::build_data_str(&elems);
        self.elems = elems;
        Ok(())
    }

    /// The bracketed AI data string for the buffer, or `None` when the
    /// session holds plain (non-AI) data.
    pub fn ai_data_str(&self) -> Option<String> {
        if self.elems.is_empty() {
            return None;
        }
        Some(ai::build_ai_data_str(&self.elems))
    }

    /// Set the session data from a raw data string with `^` representing
    /// FNC1, a GS1 Digital Link URI, or plain (non-AI) data.
    pub fn set_data_str(&mut self, data_str: &str) -> Result<(), Gs1Error> {
        self.diag.clear();
        let permit = self.permit_unknown_ais;

        let parse = |enc: &Self, elems: &mut Vec<AiValue>| -> Result<(), Gs1Error> {
            if data_str.starts_with("https://") || data_str.starts_with("http://") {
                return dl::parse_dl_uri(data_str, permit, &enc.dl_key_qualifiers, elems);
            }
            match data_str.find('|') {
                Some(cc) => {
                    if data_str.starts_with('^') {
                        ai::process_data_str(&data_str[..cc], 0, data_str, permit, elems)?;
                    }
                    elems.push(AiValue::composite_separator(cc));
                    ai::process_data_str(&data_str[cc + 1..], cc + 1, data_str, permit, elems)
                }
                None if data_str.starts_with('^') => {
                    ai::process_data_str(data_str, 0, data_str, permit, elems)
                }
                None => Ok(()), // plain data is retained as-is
            }
        };

        let mut elems = Vec::new();
        let result = parse(self, &mut elems)
            .and_then(|_| Self::check_too_many(&elems))
            .and_then(|_| self.validate(&elems));
        if let Err(err) = result {
            return Err(self.fail(err));
        }

        self.data_str = data_str.to_string();
        self.elems = elems;
        Ok(())
    }

    /// The raw data string for the buffer. For Digital Link input this is
    /// the URI itself.
    pub fn data_str(&self) -> &str {
        &self.data_str
    }

    /// Generate a Digital Link URI from the buffer. `stem` defaults to
    /// the canonical `https://id.gs1.org`.
    pub fn dl_uri(&mut self, stem: Option<&str>) -> Result<String, Gs1Error> {
        self.diag.clear();
        dl::generate_dl_uri(&self.elems, stem, &self.dl_key_qualifiers)
            .map_err(|err| self.fail(err))
    }

    /// Generate scan data for the session's symbology.
    pub fn scan_data(&mut self) -> Result<String, Gs1Error> {
        self.diag.clear();
        scandata::generate_scan_data(self.sym, self.add_check_digit, &self.data_str, &self.elems)
            .map_err(|err| self.fail(err))
    }

    /// Set the session data from scan data, deriving the symbology from
    /// the symbology identifier.
    pub fn set_scan_data(&mut self, scan_data: &str) -> Result<(), Gs1Error> {
        self.diag.clear();

        let result = scandata::process_scan_data(
            scan_data,
            self.permit_unknown_ais,
            &self.dl_key_qualifiers,
        )
        .and_then(|(sym, data_str, elems)| {
            self.validate(&elems)?;
            Ok((sym, data_str, elems))
        });
        match result {
            Ok((sym, data_str, elems)) => {
                self.sym = sym;
                self.data_str = data_str;
                self.elems = elems;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Human-readable interpretation lines for the buffer.
    pub fn hri(&self) -> Vec<String> {
        ai::build_hri(&self.elems, self.include_data_titles_in_hri)
    }

    /// Non-AI query parameters that were ignored when parsing a Digital
    /// Link URI, undecoded.
    pub fn dl_ignored_query_params(&self) -> Vec<String> {
        self.elems
            .iter()
            .filter(|v| v.kind == ElementKind::IgnoredQueryParam)
            .map(|v| v.value.clone())
            .collect()
    }

    /// Message of the last failed operation, empty after a success.
    pub fn err_msg(&self) -> &str {
        &self.diag.message
    }

    /// Markup for the last failure when it pinpoints a span of the input,
    /// empty otherwise.
    pub fn err_markup(&self) -> &str {
        &self.diag.markup
    }

    pub fn sym(&self) -> Symbology {
        self.sym
    }

    pub fn set_sym(&mut self, sym: Symbology) {
        self.sym = sym;
    }

    pub fn add_check_digit(&self) -> bool {
        self.add_check_digit
    }

    /// When set, EAN/UPC and DataBar primary data is given without its
    /// final digit and the mod-10 check digit is computed.
    pub fn set_add_check_digit(&mut self, add_check_digit: bool) {
        self.add_check_digit = add_check_digit;
    }

    pub fn permit_unknown_ais(&self) -> bool {
        self.permit_unknown_ais
    }

    pub fn set_permit_unknown_ais(&mut self, permit_unknown_ais: bool) {
        self.permit_unknown_ais = permit_unknown_ais;
    }

    pub fn include_data_titles_in_hri(&self) -> bool {
        self.include_data_titles_in_hri
    }

    pub fn set_include_data_titles_in_hri(&mut self, include_data_titles: bool) {
        self.include_data_titles_in_hri = include_data_titles;
    }

    fn entry(&self, validation: Validation) -> &ValidationEntry {
        // The table always carries one entry per variant.
        self.validations
            .iter()
            .find(|v| v.validation == validation)
            .unwrap_or(&self.validations[0])
    }

    pub fn validation_enabled(&self, validation: Validation) -> bool {
        self.entry(validation).enabled
    }

    /// Enable or disable a validation. Locked validations cannot be
    /// amended.
    pub fn set_validation_enabled(
        &mut self,
        validation: Validation,
        enabled: bool,
    ) -> Result<(), Gs1Error> {
        self.diag.clear();
        let Some(entry) = self.validations.iter_mut().find(|v| v.validation == validation) else {
            return Err(self.fail(Gs1Error::Config("unknown validation".into())));
        };
        if entry.locked {
            return Err(self.fail(Gs1Error::Config("this validation cannot be amended".into())));
        }
        entry.enabled = enabled;
        Ok(())
    }

    /// Whether requisite AI associations are checked. Shorthand for the
    /// `RequisiteAis` validation.
    pub fn validate_ai_associations(&self) -> bool {
        self.validation_enabled(Validation::RequisiteAis)
    }

    pub fn set_validate_ai_associations(&mut self, validate: bool) {
        // RequisiteAis is never locked.
        let _ = self.set_validation_enabled(Validation::RequisiteAis, validate);
    }
}
