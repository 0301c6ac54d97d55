use serde::{Deserialize, Serialize};

use crate::advice;

pub const MCHAT_VOCAB: [&str; 2] = ["yes", "no"];
pub const FOUR_POINT_VOCAB: [&str; 4] = ["excellent", "good", "fair", "poor"];
pub const FIVE_POINT_VOCAB: [&str; 5] = ["always", "often", "sometimes", "rarely", "never"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssessmentKind {
    Mchat,
    MotorSkills,
    SpeechLanguage,
    SocialSkills,
}

impl AssessmentKind {
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "mchat" => Some(AssessmentKind::Mchat),
            "motorSkills" => Some(AssessmentKind::MotorSkills),
            "speechLanguage" => Some(AssessmentKind::SpeechLanguage),
            "socialSkills" => Some(AssessmentKind::SocialSkills),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            AssessmentKind::Mchat => "mchat",
            AssessmentKind::MotorSkills => "motorSkills",
            AssessmentKind::SpeechLanguage => "speechLanguage",
            AssessmentKind::SocialSkills => "socialSkills",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Score units differ by kind: M-CHAT reports a raw count of "no"
/// answers, the scale-based kinds report a rounded percentage.
/// Both serialize as a bare integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Score {
    Count(u32),
    Percent(u32),
}

impl Score {
    pub fn value(&self) -> u32 {
        match self {
            Score::Count(v) | Score::Percent(v) => *v,
        }
    }
}

/// One answered M-CHAT item. `answer` is kept as the raw wire string
/// so the scorer's coercion rules (unknown values are ignored) hold;
/// the validator is the layer that rejects out-of-vocabulary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MchatAnswer {
    pub question_id: i64,
    pub answer: String,
    /// Accepted but inert: every item scores identically regardless of
    /// this flag. The tiers below assume unweighted counting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorSkillsAnswer {
    pub question_id: i64,
    pub answer: String,
    pub age_group: String,
}

/// Answer shape shared by the Speech-Language and Social-Skills
/// questionnaires; the two kinds differ only in advice text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyAnswer {
    pub question_id: i64,
    pub answer: String,
    pub category: String,
    pub age_group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub score: Score,
    pub total_questions: usize,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
}

fn finish(kind: AssessmentKind, score: Score, total_questions: usize, risk: RiskLevel) -> AssessmentResult {
    let set = advice::advice_for(kind, risk);
    AssessmentResult {
        score,
        total_questions,
        risk_level: risk,
        recommendations: set.recommendations.iter().map(|s| s.to_string()).collect(),
        next_steps: set.next_steps.iter().map(|s| s.to_string()).collect(),
    }
}

/// Final percentage, rounded half-up once at the end (never per item).
fn round_percent(sum_points: f64, max_per_question: f64, total_questions: usize) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    let pct = 100.0 * sum_points / (max_per_question * total_questions as f64);
    pct.round() as u32
}

/// M-CHAT tiers run on the raw "no" count, not a percentage, so short
/// questionnaires can never reach the higher tiers.
fn mchat_risk(no_count: u32) -> RiskLevel {
    match no_count {
        0..=2 => RiskLevel::Low,
        3..=4 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

fn four_point_risk(percent: u32) -> RiskLevel {
    if percent >= 75 {
        RiskLevel::Low
    } else if percent >= 50 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

fn five_point_risk(percent: u32) -> RiskLevel {
    if percent >= 80 {
        RiskLevel::Low
    } else if percent >= 60 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

fn four_point_points(answer: &str) -> f64 {
    match answer {
        "excellent" => 4.0,
        "good" => 3.0,
        "fair" => 2.0,
        "poor" => 1.0,
        _ => 0.0,
    }
}

fn five_point_points(answer: &str) -> f64 {
    match answer {
        "always" => 5.0,
        "often" => 4.0,
        "sometimes" => 3.0,
        "rarely" => 2.0,
        "never" => 1.0,
        _ => 0.0,
    }
}

pub fn calculate_mchat_score(answers: &[MchatAnswer]) -> AssessmentResult {
    let no_count = answers.iter().filter(|a| a.answer == "no").count() as u32;
    finish(
        AssessmentKind::Mchat,
        Score::Count(no_count),
        answers.len(),
        mchat_risk(no_count),
    )
}

pub fn calculate_motor_skills_score(answers: &[MotorSkillsAnswer]) -> AssessmentResult {
    let sum: f64 = answers.iter().map(|a| four_point_points(&a.answer)).sum();
    let percent = round_percent(sum, 4.0, answers.len());
    finish(
        AssessmentKind::MotorSkills,
        Score::Percent(percent),
        answers.len(),
        four_point_risk(percent),
    )
}

/// Shared five-point frequency scorer; the kind only selects which
/// advice table the result text is drawn from.
fn score_five_point(kind: AssessmentKind, answers: &[FrequencyAnswer]) -> AssessmentResult {
    let sum: f64 = answers.iter().map(|a| five_point_points(&a.answer)).sum();
    let percent = round_percent(sum, 5.0, answers.len());
    finish(
        kind,
        Score::Percent(percent),
        answers.len(),
        five_point_risk(percent),
    )
}

pub fn calculate_speech_language_score(answers: &[FrequencyAnswer]) -> AssessmentResult {
    score_five_point(AssessmentKind::SpeechLanguage, answers)
}

pub fn calculate_social_skills_score(answers: &[FrequencyAnswer]) -> AssessmentResult {
    score_five_point(AssessmentKind::SocialSkills, answers)
}

fn all_in_vocab<'a, I>(answers: I, vocab: &[&str]) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut any = false;
    for a in answers {
        if !vocab.contains(&a) {
            return false;
        }
        any = true;
    }
    any
}

pub fn validate_mchat_answers(answers: &[MchatAnswer]) -> bool {
    all_in_vocab(answers.iter().map(|a| a.answer.as_str()), &MCHAT_VOCAB)
}

pub fn validate_motor_skills_answers(answers: &[MotorSkillsAnswer]) -> bool {
    all_in_vocab(answers.iter().map(|a| a.answer.as_str()), &FOUR_POINT_VOCAB)
}

pub fn validate_speech_language_answers(answers: &[FrequencyAnswer]) -> bool {
    all_in_vocab(answers.iter().map(|a| a.answer.as_str()), &FIVE_POINT_VOCAB)
}

pub fn validate_social_skills_answers(answers: &[FrequencyAnswer]) -> bool {
    all_in_vocab(answers.iter().map(|a| a.answer.as_str()), &FIVE_POINT_VOCAB)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mchat(answers: &[&str]) -> Vec<MchatAnswer> {
        answers
            .iter()
            .enumerate()
            .map(|(i, a)| MchatAnswer {
                question_id: i as i64 + 1,
                answer: a.to_string(),
                is_critical: None,
            })
            .collect()
    }

    fn motor(answers: &[&str]) -> Vec<MotorSkillsAnswer> {
        answers
            .iter()
            .enumerate()
            .map(|(i, a)| MotorSkillsAnswer {
                question_id: i as i64 + 1,
                answer: a.to_string(),
                age_group: "3-4".to_string(),
            })
            .collect()
    }

    fn freq(answers: &[&str]) -> Vec<FrequencyAnswer> {
        answers
            .iter()
            .enumerate()
            .map(|(i, a)| FrequencyAnswer {
                question_id: i as i64 + 1,
                answer: a.to_string(),
                category: "expressive".to_string(),
                age_group: "3-4".to_string(),
            })
            .collect()
    }

    #[test]
    fn mchat_empty_is_zero_low() {
        let r = calculate_mchat_score(&[]);
        assert_eq!(r.score, Score::Count(0));
        assert_eq!(r.total_questions, 0);
        assert_eq!(r.risk_level, RiskLevel::Low);
    }

    #[test]
    fn mchat_tier_boundaries_on_raw_count() {
        let r = calculate_mchat_score(&mchat(&["no", "yes", "yes", "yes", "yes"]));
        assert_eq!(r.score, Score::Count(1));
        assert_eq!(r.risk_level, RiskLevel::Low);

        let r = calculate_mchat_score(&mchat(&["no", "no", "yes", "yes", "yes"]));
        assert_eq!(r.score, Score::Count(2));
        assert_eq!(r.risk_level, RiskLevel::Low);

        let r = calculate_mchat_score(&mchat(&["no", "no", "no", "yes", "yes"]));
        assert_eq!(r.score, Score::Count(3));
        assert_eq!(r.risk_level, RiskLevel::Medium);

        let r = calculate_mchat_score(&mchat(&["no", "no", "no", "no", "yes"]));
        assert_eq!(r.score, Score::Count(4));
        assert_eq!(r.risk_level, RiskLevel::Medium);

        let r = calculate_mchat_score(&mchat(&["no", "no", "no", "no", "no"]));
        assert_eq!(r.score, Score::Count(5));
        assert_eq!(r.risk_level, RiskLevel::High);
    }

    #[test]
    fn mchat_critical_flag_never_changes_the_score() {
        let plain = mchat(&["no", "no", "no", "yes", "yes"]);
        let mut flagged = plain.clone();
        for a in &mut flagged {
            a.is_critical = Some(true);
        }
        assert_eq!(calculate_mchat_score(&plain), calculate_mchat_score(&flagged));
    }

    #[test]
    fn mchat_unknown_values_are_not_counted_as_no() {
        let r = calculate_mchat_score(&mchat(&["no", "maybe", "no", ""]));
        assert_eq!(r.score, Score::Count(2));
        assert_eq!(r.total_questions, 4);
    }

    #[test]
    fn motor_skills_rounds_half_up_on_the_final_percentage() {
        // 4+4+3+4 = 15 of 16 -> 93.75 -> 94.
        let r = calculate_motor_skills_score(&motor(&["excellent", "excellent", "good", "excellent"]));
        assert_eq!(r.score, Score::Percent(94));
        assert_eq!(r.total_questions, 4);
        assert_eq!(r.risk_level, RiskLevel::Low);

        // 4+3 = 7 of 8 -> 87.5 -> 88.
        let r = calculate_motor_skills_score(&motor(&["excellent", "good"]));
        assert_eq!(r.score, Score::Percent(88));
    }

    #[test]
    fn motor_skills_tier_boundaries_are_inclusive_below() {
        // good -> 3 of 4 -> exactly 75.
        let r = calculate_motor_skills_score(&motor(&["good"]));
        assert_eq!(r.score, Score::Percent(75));
        assert_eq!(r.risk_level, RiskLevel::Low);

        // fair -> 2 of 4 -> exactly 50.
        let r = calculate_motor_skills_score(&motor(&["fair"]));
        assert_eq!(r.score, Score::Percent(50));
        assert_eq!(r.risk_level, RiskLevel::Medium);

        let r = calculate_motor_skills_score(&motor(&["poor"]));
        assert_eq!(r.score, Score::Percent(25));
        assert_eq!(r.risk_level, RiskLevel::High);

        // 3+3+3+3+2 = 14 of 20 -> 70, just under the low tier.
        let r = calculate_motor_skills_score(&motor(&["good", "good", "good", "good", "fair"]));
        assert_eq!(r.score, Score::Percent(70));
        assert_eq!(r.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn motor_skills_unknown_values_contribute_zero_points() {
        // 4+0 = 4 of 8 -> 50 -> medium.
        let r = calculate_motor_skills_score(&motor(&["excellent", "superb"]));
        assert_eq!(r.score, Score::Percent(50));
        assert_eq!(r.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn five_point_tier_boundaries_are_inclusive_below() {
        // often -> 4 of 5 -> exactly 80.
        let r = calculate_speech_language_score(&freq(&["often"]));
        assert_eq!(r.score, Score::Percent(80));
        assert_eq!(r.risk_level, RiskLevel::Low);

        // sometimes -> 3 of 5 -> exactly 60.
        let r = calculate_speech_language_score(&freq(&["sometimes"]));
        assert_eq!(r.score, Score::Percent(60));
        assert_eq!(r.risk_level, RiskLevel::Medium);

        let r = calculate_speech_language_score(&freq(&["rarely"]));
        assert_eq!(r.score, Score::Percent(40));
        assert_eq!(r.risk_level, RiskLevel::High);

        // 4+4+4+4+3 = 19 of 25 -> 76, just under the low tier.
        let r = calculate_speech_language_score(&freq(&[
            "often", "often", "often", "often", "sometimes",
        ]));
        assert_eq!(r.score, Score::Percent(76));
        assert_eq!(r.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn speech_and_social_share_arithmetic_but_not_advice() {
        let answers = freq(&["always", "sometimes", "never", "often"]);
        let speech = calculate_speech_language_score(&answers);
        let social = calculate_social_skills_score(&answers);
        assert_eq!(speech.score, social.score);
        assert_eq!(speech.risk_level, social.risk_level);
        assert_ne!(speech.recommendations, social.recommendations);
    }

    #[test]
    fn percentage_scorers_treat_empty_input_as_high_tier_zero() {
        let r = calculate_motor_skills_score(&[]);
        assert_eq!(r.score, Score::Percent(0));
        assert_eq!(r.total_questions, 0);
        assert_eq!(r.risk_level, RiskLevel::High);

        let r = calculate_social_skills_score(&[]);
        assert_eq!(r.score, Score::Percent(0));
        assert_eq!(r.risk_level, RiskLevel::High);
    }

    #[test]
    fn scorers_are_idempotent() {
        let answers = mchat(&["no", "no", "yes"]);
        assert_eq!(calculate_mchat_score(&answers), calculate_mchat_score(&answers));

        let answers = freq(&["always", "rarely", "often"]);
        assert_eq!(
            calculate_social_skills_score(&answers),
            calculate_social_skills_score(&answers)
        );
    }

    #[test]
    fn advice_lists_always_have_exactly_three_entries() {
        for r in [
            calculate_mchat_score(&[]),
            calculate_mchat_score(&mchat(&["no"; 6])),
            calculate_motor_skills_score(&motor(&["good"])),
            calculate_speech_language_score(&freq(&["never", "never"])),
            calculate_social_skills_score(&freq(&["always"])),
        ] {
            assert_eq!(r.recommendations.len(), 3);
            assert_eq!(r.next_steps.len(), 3);
        }
    }

    #[test]
    fn validators_reject_empty_lists() {
        assert!(!validate_mchat_answers(&[]));
        assert!(!validate_motor_skills_answers(&[]));
        assert!(!validate_speech_language_answers(&[]));
        assert!(!validate_social_skills_answers(&[]));
    }

    #[test]
    fn validators_require_exact_vocabulary() {
        assert!(validate_mchat_answers(&mchat(&["yes", "no"])));
        assert!(!validate_mchat_answers(&mchat(&["yes", "No"])));
        assert!(!validate_mchat_answers(&mchat(&["yes", "nope"])));

        assert!(validate_motor_skills_answers(&motor(&[
            "excellent", "good", "fair", "poor"
        ])));
        assert!(!validate_motor_skills_answers(&motor(&["excellent", "ok"])));

        assert!(validate_speech_language_answers(&freq(&[
            "always", "often", "sometimes", "rarely", "never"
        ])));
        assert!(!validate_speech_language_answers(&freq(&["always", ""])));
        assert!(!validate_social_skills_answers(&freq(&["Sometimes"])));
    }

    #[test]
    fn score_serializes_as_a_bare_integer() {
        let r = calculate_mchat_score(&mchat(&["no", "no", "no"]));
        let v = serde_json::to_value(&r).expect("serialize result");
        assert_eq!(v.get("score"), Some(&serde_json::json!(3)));
        assert_eq!(v.get("riskLevel"), Some(&serde_json::json!("medium")));
        assert_eq!(v.get("totalQuestions"), Some(&serde_json::json!(3)));
    }
}
