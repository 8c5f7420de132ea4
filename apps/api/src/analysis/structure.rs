//! Structure validation: an ordered battery of independent layout and
//! formatting rules over the segmented resume text.
//!
//! Every rule contributes at most one finding, except the section check which
//! reports each missing expected section. Rules never suppress each other and
//! never fail; output order is the battery order, so repeated runs serialize
//! identically.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Escalation order: `Ord` follows parsing impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Stable identifier of the rule that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    MissingSection,
    TabularLayout,
    NonStandardCharacters,
    ContactInfo,
    ExcessiveCaps,
    OverlongLines,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureFinding {
    pub rule: RuleId,
    pub severity: Severity,
    pub description: String,
    /// 1-based index into the non-empty line segments, when one line is at fault.
    pub line: Option<usize>,
}

/// Section headers an ATS anchors its parsing on.
const EXPECTED_SECTIONS: &[&str] = &["experience", "education", "skills"];

/// Tolerated beyond alphanumerics, whitespace and ASCII punctuation:
/// en dash, em dash, curly quotes. Common word-processor output, harmless
/// to parsers.
const ALLOWED_TYPOGRAPHY: &[char] = &[
    '\u{2013}', '\u{2014}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
];

/// Columnar lines needed before the tabular-layout rule fires.
const COLUMNAR_LINE_THRESHOLD: usize = 2;
/// All-caps words tolerated before the caps rule fires.
const CAPS_WORD_THRESHOLD: usize = 5;
const LONG_LINE_LIMIT: usize = 120;
/// Overlong lines tolerated before the long-line rule fires.
const LONG_LINE_THRESHOLD: usize = 3;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str = r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}";
const CAPS_RUN_PATTERN: &str = r"\b[A-Z]{4,}\b";

/// Compiled structure rules. Built once at startup and shared by every run.
#[derive(Debug)]
pub struct StructureValidator {
    email: Regex,
    phone: Regex,
    caps_run: Regex,
    /// Leading line segments counted as the header zone for contact details.
    contact_zone_lines: usize,
}

impl StructureValidator {
    pub fn new(contact_zone_lines: usize) -> Self {
        Self {
            email: Regex::new(EMAIL_PATTERN).expect("email pattern is valid"),
            phone: Regex::new(PHONE_PATTERN).expect("phone pattern is valid"),
            caps_run: Regex::new(CAPS_RUN_PATTERN).expect("caps pattern is valid"),
            contact_zone_lines,
        }
    }

    /// Runs the full battery in declaration order.
    pub fn validate(&self, lines: &[String], raw: &str) -> Vec<StructureFinding> {
        let mut findings = Vec::new();
        self.check_sections(raw, &mut findings);
        self.check_columnar_layout(lines, &mut findings);
        self.check_nonstandard_characters(lines, &mut findings);
        self.check_contact_info(lines, &mut findings);
        self.check_excessive_caps(raw, &mut findings);
        self.check_overlong_lines(lines, &mut findings);
        findings
    }

    fn check_sections(&self, raw: &str, findings: &mut Vec<StructureFinding>) {
        let haystack = raw.to_lowercase();
        for section in EXPECTED_SECTIONS {
            if !haystack.contains(section) {
                findings.push(StructureFinding {
                    rule: RuleId::MissingSection,
                    severity: Severity::Warning,
                    description: format!(
                        "No '{section}' section found. ATS parsers anchor on standard section names."
                    ),
                    line: None,
                });
            }
        }
    }

    fn check_columnar_layout(&self, lines: &[String], findings: &mut Vec<StructureFinding>) {
        let mut count = 0usize;
        let mut first_line = None;
        for (idx, line) in lines.iter().enumerate() {
            if is_columnar(line) {
                count += 1;
                if first_line.is_none() {
                    first_line = Some(idx + 1);
                }
            }
        }
        if count >= COLUMNAR_LINE_THRESHOLD {
            findings.push(StructureFinding {
                rule: RuleId::TabularLayout,
                severity: Severity::Critical,
                description: format!(
                    "{count} lines use tabs or column-style spacing. Tables and multi-column \
                     layouts scramble ATS text extraction."
                ),
                line: first_line,
            });
        }
    }

    fn check_nonstandard_characters(&self, lines: &[String], findings: &mut Vec<StructureFinding>) {
        let mut count = 0usize;
        let mut first_line = None;
        let mut examples: Vec<char> = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            for c in line.chars() {
                if is_standard_char(c) {
                    continue;
                }
                count += 1;
                if first_line.is_none() {
                    first_line = Some(idx + 1);
                }
                if examples.len() < 5 && !examples.contains(&c) {
                    examples.push(c);
                }
            }
        }

        if count > 0 {
            let glyphs: String = examples
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            findings.push(StructureFinding {
                rule: RuleId::NonStandardCharacters,
                severity: Severity::Info,
                description: format!(
                    "{count} non-standard characters ({glyphs}) may come out as garbage in older \
                     ATS parsers."
                ),
                line: first_line,
            });
        }
    }

    fn check_contact_info(&self, lines: &[String], findings: &mut Vec<StructureFinding>) {
        let zone = lines.len().min(self.contact_zone_lines);
        if lines[..zone].iter().any(|l| self.has_contact(l)) {
            return;
        }

        let elsewhere = lines[zone..]
            .iter()
            .position(|l| self.has_contact(l))
            .map(|offset| zone + offset + 1);

        match elsewhere {
            Some(line) => findings.push(StructureFinding {
                rule: RuleId::ContactInfo,
                severity: Severity::Warning,
                description: format!(
                    "Contact details first appear on line {line}, not at the top. Parsers and \
                     recruiters expect them in the header."
                ),
                line: Some(line),
            }),
            None => findings.push(StructureFinding {
                rule: RuleId::ContactInfo,
                severity: Severity::Critical,
                description: "No email address or phone number found anywhere. Without contact \
                              details the application is unreachable."
                    .to_string(),
                line: None,
            }),
        }
    }

    fn check_excessive_caps(&self, raw: &str, findings: &mut Vec<StructureFinding>) {
        let count = self.caps_run.find_iter(raw).count();
        if count >= CAPS_WORD_THRESHOLD {
            findings.push(StructureFinding {
                rule: RuleId::ExcessiveCaps,
                severity: Severity::Info,
                description: format!(
                    "{count} fully capitalized words of four letters or more. Heavy caps read \
                     poorly to screeners and some parsers."
                ),
                line: None,
            });
        }
    }

    fn check_overlong_lines(&self, lines: &[String], findings: &mut Vec<StructureFinding>) {
        let mut count = 0usize;
        let mut first_line = None;
        for (idx, line) in lines.iter().enumerate() {
            if line.chars().count() > LONG_LINE_LIMIT {
                count += 1;
                if first_line.is_none() {
                    first_line = Some(idx + 1);
                }
            }
        }
        if count >= LONG_LINE_THRESHOLD {
            findings.push(StructureFinding {
                rule: RuleId::OverlongLines,
                severity: Severity::Warning,
                description: format!(
                    "{count} lines exceed {LONG_LINE_LIMIT} characters. Dense paragraph blocks \
                     often get truncated by ATS field limits."
                ),
                line: first_line,
            });
        }
    }

    fn has_contact(&self, line: &str) -> bool {
        self.email.is_match(line) || self.phone.is_match(line)
    }
}

/// Line segments arrive end-trimmed, so every space run counted here is
/// interior. Tabs or two-plus runs of three-plus spaces read as columns.
fn is_columnar(line: &str) -> bool {
    if line.contains('\t') {
        return true;
    }
    let mut runs = 0usize;
    let mut current = 0usize;
    for c in line.chars() {
        if c == ' ' {
            current += 1;
        } else {
            if current >= 3 {
                runs += 1;
            }
            current = 0;
        }
    }
    runs >= COLUMNAR_LINE_THRESHOLD
}

fn is_standard_char(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || c.is_ascii_punctuation()
        || ALLOWED_TYPOGRAPHY.contains(&c)
}
