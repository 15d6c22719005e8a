//! Content scanner for review comments
//!
//! Pure, deterministic text analysis. A set of independent detectors each
//! contribute an additive toxicity increment and set a named risk flag on
//! match; the total drives a suggested moderation status. No I/O.
//!
//! The pattern vocabulary is content policy, not structure: `ScanRules`
//! carries the word lists and patterns, `Default` provides the canonical
//! bilingual (English/Arabic) set, and a `Scanner` can be built from any
//! replacement rule set.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::status::ReviewStatus;

/// Risk flag names as persisted in the review's `risk_flags` column.
pub const FLAG_PROFANITY: &str = "profanity";
pub const FLAG_DOXXING: &str = "doxxing";
pub const FLAG_DEFAMATION: &str = "defamation_risk";
pub const FLAG_THREAT: &str = "threat";
pub const FLAG_ALL_CAPS: &str = "all_caps";
pub const FLAG_SPAM: &str = "spam_pattern";
pub const FLAG_LOW_EFFORT: &str = "low_effort_negativity";
pub const FLAG_BRIGADING: &str = "brigading_suspect";

/// Toxicity increments per detector.
const PROFANITY_BASE: f32 = 0.4;
const PROFANITY_PER_EXTRA_HIT: f32 = 0.1;
const DOXXING_INCREMENT: f32 = 0.5;
const DEFAMATION_INCREMENT: f32 = 0.3;
const THREAT_INCREMENT: f32 = 0.5;
const SHOUTING_INCREMENT: f32 = 0.15;
const SPAM_INCREMENT: f32 = 0.1;
const LOW_EFFORT_INCREMENT: f32 = 0.1;

/// At or above this total, content is at least flagged; combined with a
/// profanity hit it is removed outright.
const TOXICITY_THRESHOLD: f32 = 0.5;

/// Shouting detection floor: comments with this many letters or fewer are
/// never marked for capitalization alone.
const SHOUTING_MIN_LETTERS: usize = 10;

/// Low-effort detection: comments shorter than this that lean on strong
/// negative vocabulary get a small bump for the queue.
const LOW_EFFORT_MAX_LENGTH: usize = 20;

const DEFAULT_PROFANITY_EN: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "bastard", "damn", "crap", "dick", "piss",
];

/// Arabic-script terms plus common Gulf chat transliterations.
const DEFAULT_PROFANITY_AR: &[&str] = &[
    "كلب", "حمار", "خنزير", "حقير", "زبالة", "kalb", "hmar", "khanzeer", "zbala",
];

const DEFAULT_DOXXING_PATTERNS: &[&str] = &[
    r"\b\d{8}\b",                                            // local 8-digit phone
    r"\+?973\s?\d{8}",                                       // country-code-prefixed phone
    r"[\w.+-]+@[\w-]+\.[\w.]+",                              // email
    r"(?i)\b\d{1,5}\s\w+\s(?:st|street|rd|road|ave|avenue|blvd)\b", // street address
    r"\b\d{9}\b",                                            // CPR-style ID number
    r"(?i)\b(?:block|flat|house|bldg|building)\s*(?:no\.?\s*)?\d+", // block/flat idiom
];

const DEFAULT_DEFAMATION_PATTERNS: &[&str] = &[
    r"(?i)\b(?:he|she|they)\s+(?:is|are)\s+(?:a\s+)?(?:racist|sexist|harasser|predator|criminal)\b",
    r"(?i)\bsexual\s+(?:harass|assault|misconduct)",
    r"(?i)\b(?:corrupt|bribe|bribery|steal|stole|embezzle)",
    r"(?i)\b(?:slept|sleeping|affair)\s+with\s+(?:a\s+)?student",
];

const DEFAULT_THREAT_PATTERNS: &[&str] = &[
    r"(?i)\b(?:kill|hurt|beat|attack|stab)\s+(?:him|her|them|you)\b",
    r"(?i)\b(?:bomb|gun|knife|weapon|shoot)\b",
    r"(?i)\byou(?:'ll|\s+will)\s+(?:pay|regret)\b",
    r"(?i)\bwatch\s+your\s+back\b",
];

const DEFAULT_NEGATIVE_TERMS: &[&str] = &[
    "trash", "garbage", "worst", "awful", "terrible", "useless", "hate",
];

/// Replaceable pattern vocabulary for the scanner.
pub struct ScanRules {
    pub profanity: Vec<String>,
    pub doxxing_patterns: Vec<String>,
    pub defamation_patterns: Vec<String>,
    pub threat_patterns: Vec<String>,
    pub negative_terms: Vec<String>,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            profanity: DEFAULT_PROFANITY_EN
                .iter()
                .chain(DEFAULT_PROFANITY_AR)
                .map(|s| s.to_string())
                .collect(),
            doxxing_patterns: DEFAULT_DOXXING_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            defamation_patterns: DEFAULT_DEFAMATION_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            threat_patterns: DEFAULT_THREAT_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            negative_terms: DEFAULT_NEGATIVE_TERMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Result of scanning a single comment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// True iff no risk flags were set.
    pub clean: bool,
    /// Total toxicity in [0.0, 1.0], rounded to two decimal places.
    pub toxicity_score: f32,
    /// Named flags set by triggered detectors.
    pub risk_flags: BTreeSet<String>,
    /// Initial status the admission pipeline should use, before any
    /// guard-level override.
    pub suggested_status: ReviewStatus,
}

impl ScanResult {
    fn clean_pending() -> Self {
        Self {
            clean: true,
            toxicity_score: 0.0,
            risk_flags: BTreeSet::new(),
            suggested_status: ReviewStatus::Pending,
        }
    }
}

/// Compiled scanner over a rule set.
pub struct Scanner {
    profanity_regex: Regex,
    doxxing: Vec<Regex>,
    defamation: Vec<Regex>,
    threat: Vec<Regex>,
    negative_terms: Vec<String>,
}

impl Scanner {
    /// Compile a scanner from a rule set.
    ///
    /// Fails if any configured pattern is not a valid regex; the canonical
    /// default rules always compile.
    pub fn new(rules: &ScanRules) -> Result<Self, regex::Error> {
        let alternation = rules
            .profanity
            .iter()
            .map(|term| regex::escape(term))
            .collect::<Vec<_>>()
            .join("|");
        let profanity_regex = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?;

        let compile = |patterns: &[String]| -> Result<Vec<Regex>, regex::Error> {
            patterns.iter().map(|p| Regex::new(p)).collect()
        };

        Ok(Self {
            profanity_regex,
            doxxing: compile(&rules.doxxing_patterns)?,
            defamation: compile(&rules.defamation_patterns)?,
            threat: compile(&rules.threat_patterns)?,
            negative_terms: rules.negative_terms.iter().map(|t| t.to_lowercase()).collect(),
        })
    }

    /// Scan a comment. Pure and deterministic.
    pub fn scan(&self, comment: &str) -> ScanResult {
        let text = comment.trim();
        if text.is_empty() {
            return ScanResult::clean_pending();
        }

        let mut flags = BTreeSet::new();
        let mut toxicity = 0.0f32;

        // Profanity: each distinct matched term adds to the base increment
        let distinct_hits: BTreeSet<String> = self
            .profanity_regex
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect();
        if !distinct_hits.is_empty() {
            flags.insert(FLAG_PROFANITY.to_string());
            toxicity +=
                PROFANITY_BASE + (distinct_hits.len() - 1) as f32 * PROFANITY_PER_EXTRA_HIT;
        }

        // Doxxing: one fixed increment no matter how many pattern types hit
        if self.doxxing.iter().any(|p| p.is_match(text)) {
            flags.insert(FLAG_DOXXING.to_string());
            toxicity += DOXXING_INCREMENT;
        }

        if self.defamation.iter().any(|p| p.is_match(text)) {
            flags.insert(FLAG_DEFAMATION.to_string());
            toxicity += DEFAMATION_INCREMENT;
        }

        if self.threat.iter().any(|p| p.is_match(text)) {
            flags.insert(FLAG_THREAT.to_string());
            toxicity += THREAT_INCREMENT;
        }

        if is_shouting(text) {
            flags.insert(FLAG_ALL_CAPS.to_string());
            toxicity += SHOUTING_INCREMENT;
        }

        if has_spam_pattern(text) {
            flags.insert(FLAG_SPAM.to_string());
            toxicity += SPAM_INCREMENT;
        }

        if self.is_low_effort_negativity(text) {
            flags.insert(FLAG_LOW_EFFORT.to_string());
            toxicity += LOW_EFFORT_INCREMENT;
        }

        let toxicity = (toxicity.clamp(0.0, 1.0) * 100.0).round() / 100.0;

        // Priority order: first match wins
        let suggested_status = if flags.contains(FLAG_DOXXING) || flags.contains(FLAG_THREAT) {
            ReviewStatus::Removed
        } else if flags.contains(FLAG_PROFANITY) && toxicity >= TOXICITY_THRESHOLD {
            ReviewStatus::Removed
        } else if toxicity >= TOXICITY_THRESHOLD || flags.contains(FLAG_DEFAMATION) {
            ReviewStatus::Flagged
        } else {
            ReviewStatus::Pending
        };

        ScanResult {
            clean: flags.is_empty(),
            toxicity_score: toxicity,
            risk_flags: flags,
            suggested_status,
        }
    }

    fn is_low_effort_negativity(&self, text: &str) -> bool {
        if text.chars().count() >= LOW_EFFORT_MAX_LENGTH {
            return false;
        }
        let lower = text.to_lowercase();
        self.negative_terms.iter().any(|term| lower.contains(term))
    }
}

/// Letters-only subsequence is >60% uppercase, above a minimum length floor
/// to avoid false positives on short text.
fn is_shouting(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() <= SHOUTING_MIN_LETTERS {
        return false;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    upper as f32 / letters.len() as f32 > 0.6
}

/// Any character repeated five or more times consecutively, or four or more
/// consecutive exclamation/question marks.
fn has_spam_pattern(text: &str) -> bool {
    let mut prev = '\0';
    let mut run = 0usize;
    let mut punct_run = 0usize;

    for c in text.chars() {
        if c == prev {
            run += 1;
        } else {
            run = 1;
            prev = c;
        }
        if run >= 5 {
            return true;
        }

        if c == '!' || c == '?' {
            punct_run += 1;
            if punct_run >= 4 {
                return true;
            }
        } else {
            punct_run = 0;
        }
    }

    false
}

static DEFAULT_SCANNER: Lazy<Scanner> =
    Lazy::new(|| Scanner::new(&ScanRules::default()).expect("Default scan rules must compile"));

/// Scan a comment with the canonical rule set.
pub fn scan(comment: &str) -> ScanResult {
    DEFAULT_SCANNER.scan(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_are_clean() {
        for text in ["", "   ", "\n\t "] {
            let result = scan(text);
            assert!(result.clean);
            assert_eq!(result.toxicity_score, 0.0);
            assert!(result.risk_flags.is_empty());
            assert_eq!(result.suggested_status, ReviewStatus::Pending);
        }
    }

    #[test]
    fn test_benign_comment_is_clean() {
        let result = scan("Great teacher, very clear lectures");
        assert!(result.clean);
        assert_eq!(result.toxicity_score, 0.0);
        assert_eq!(result.suggested_status, ReviewStatus::Pending);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let text = "shit lectures but he is a criminal";
        assert_eq!(scan(text), scan(text));
    }

    #[test]
    fn test_single_profanity_stays_below_removal() {
        let result = scan("the grading was complete shit but lectures were okay");
        assert!(result.risk_flags.contains(FLAG_PROFANITY));
        assert_eq!(result.toxicity_score, 0.4);
        assert_eq!(result.suggested_status, ReviewStatus::Pending);
    }

    #[test]
    fn test_two_profanity_terms_reach_removal() {
        let result = scan("this shit course is taught by an asshole");
        assert!(result.risk_flags.contains(FLAG_PROFANITY));
        assert!(result.toxicity_score >= 0.5);
        assert_eq!(result.suggested_status, ReviewStatus::Removed);
    }

    #[test]
    fn test_repeated_term_counts_once() {
        let result = scan("shit shit shit");
        assert_eq!(result.toxicity_score, 0.4);
    }

    #[test]
    fn test_profanity_requires_word_boundary() {
        // "class" contains no listed term as a standalone word
        let result = scan("the class assignment on Scunthorpe was fine");
        assert!(!result.risk_flags.contains(FLAG_PROFANITY));
    }

    #[test]
    fn test_arabic_profanity_detected() {
        let result = scan("هذا الاستاذ حمار");
        assert!(result.risk_flags.contains(FLAG_PROFANITY));
    }

    #[test]
    fn test_email_is_doxxing_and_removed() {
        let result = scan("reach me at test@example.com");
        assert!(result.risk_flags.contains(FLAG_DOXXING));
        assert_eq!(result.suggested_status, ReviewStatus::Removed);
    }

    #[test]
    fn test_local_phone_is_doxxing() {
        let result = scan("call me at 39991234");
        assert!(result.risk_flags.contains(FLAG_DOXXING));
        assert_eq!(result.suggested_status, ReviewStatus::Removed);
    }

    #[test]
    fn test_multiple_doxxing_types_increment_once() {
        let result = scan("call 39991234 or mail test@example.com");
        assert_eq!(result.toxicity_score, 0.5);
    }

    #[test]
    fn test_block_flat_idiom_is_doxxing() {
        let result = scan("he lives in block 338 flat 12");
        assert!(result.risk_flags.contains(FLAG_DOXXING));
    }

    #[test]
    fn test_defamation_is_flagged_not_removed() {
        let result = scan("honestly he is a racist and everyone knows it");
        assert!(result.risk_flags.contains(FLAG_DEFAMATION));
        assert_eq!(result.suggested_status, ReviewStatus::Flagged);
    }

    #[test]
    fn test_corruption_vocabulary_is_defamation() {
        let result = scan("he will take a bribe for grades");
        assert!(result.risk_flags.contains(FLAG_DEFAMATION));
    }

    #[test]
    fn test_threat_is_removed() {
        let result = scan("fail me again and you will regret it");
        assert!(result.risk_flags.contains(FLAG_THREAT));
        assert_eq!(result.suggested_status, ReviewStatus::Removed);
    }

    #[test]
    fn test_weapon_vocabulary_is_threat() {
        let result = scan("someone should bring a knife to his office");
        assert!(result.risk_flags.contains(FLAG_THREAT));
        assert_eq!(result.suggested_status, ReviewStatus::Removed);
    }

    #[test]
    fn test_shouting_detected_above_floor() {
        let result = scan("WORST LECTURER IN THE WHOLE UNIVERSITY");
        assert!(result.risk_flags.contains(FLAG_ALL_CAPS));
    }

    #[test]
    fn test_short_caps_not_shouting() {
        let result = scan("CHEM 101 OK");
        assert!(!result.risk_flags.contains(FLAG_ALL_CAPS));
    }

    #[test]
    fn test_repeated_characters_are_spam() {
        let result = scan("sooooooo boring every single week");
        assert!(result.risk_flags.contains(FLAG_SPAM));
    }

    #[test]
    fn test_exclamation_run_is_spam() {
        let result = scan("never take this course!!!!");
        assert!(result.risk_flags.contains(FLAG_SPAM));
    }

    #[test]
    fn test_low_effort_negativity() {
        let result = scan("worst prof");
        assert!(result.risk_flags.contains(FLAG_LOW_EFFORT));
        assert_eq!(result.suggested_status, ReviewStatus::Pending);
    }

    #[test]
    fn test_longer_negative_comment_not_low_effort() {
        let result = scan("worst course structure I have seen, but the labs helped");
        assert!(!result.risk_flags.contains(FLAG_LOW_EFFORT));
    }

    #[test]
    fn test_toxicity_clamped_to_one() {
        let result =
            scan("fuck this shit bitch asshole, he is a criminal, call 39991234, kill him");
        assert_eq!(result.toxicity_score, 1.0);
        assert_eq!(result.suggested_status, ReviewStatus::Removed);
    }

    #[test]
    fn test_clean_means_no_flags() {
        let dirty = scan("worst prof");
        assert!(!dirty.clean);
        let benign = scan("A thorough and fair grader");
        assert!(benign.clean);
    }

    #[test]
    fn test_custom_rules_replace_vocabulary() {
        let rules = ScanRules {
            profanity: vec!["blargh".to_string()],
            ..ScanRules::default()
        };
        let scanner = Scanner::new(&rules).unwrap();
        assert!(scanner
            .scan("what a blargh lecture")
            .risk_flags
            .contains(FLAG_PROFANITY));
        assert!(scanner.scan("what a shit lecture").clean);
    }
}
