use crate::advice;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use crate::scoring::{
    self, AssessmentKind, AssessmentResult, FrequencyAnswer, MchatAnswer, MotorSkillsAnswer,
    RiskLevel,
};
use serde_json::json;

pub(crate) struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub(crate) fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

fn parse_kind(req: &Request) -> Result<AssessmentKind, serde_json::Value> {
    let raw = get_required_str(req, "kind")?;
    AssessmentKind::from_wire(&raw).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            "kind must be one of: mchat, motorSkills, speechLanguage, socialSkills",
            Some(json!({ "kind": raw })),
        )
    })
}

fn parse_answers<T: serde::de::DeserializeOwned>(
    params: &serde_json::Value,
) -> Result<Vec<T>, HandlerErr> {
    let Some(raw) = params.get("answers") else {
        return Err(HandlerErr {
            code: "bad_params",
            message: "missing answers".to_string(),
            details: None,
        });
    };
    if !raw.is_array() {
        return Err(HandlerErr {
            code: "bad_params",
            message: "answers must be an array".to_string(),
            details: None,
        });
    }
    serde_json::from_value(raw.clone()).map_err(|e| HandlerErr {
        code: "bad_params",
        message: format!("answers do not match the requested kind: {}", e),
        details: None,
    })
}

pub(crate) fn score_from_params(
    kind: AssessmentKind,
    params: &serde_json::Value,
) -> Result<AssessmentResult, HandlerErr> {
    Ok(match kind {
        AssessmentKind::Mchat => {
            let answers: Vec<MchatAnswer> = parse_answers(params)?;
            scoring::calculate_mchat_score(&answers)
        }
        AssessmentKind::MotorSkills => {
            let answers: Vec<MotorSkillsAnswer> = parse_answers(params)?;
            scoring::calculate_motor_skills_score(&answers)
        }
        AssessmentKind::SpeechLanguage => {
            let answers: Vec<FrequencyAnswer> = parse_answers(params)?;
            scoring::calculate_speech_language_score(&answers)
        }
        AssessmentKind::SocialSkills => {
            let answers: Vec<FrequencyAnswer> = parse_answers(params)?;
            scoring::calculate_social_skills_score(&answers)
        }
    })
}

pub(crate) fn validate_from_params(
    kind: AssessmentKind,
    params: &serde_json::Value,
) -> Result<bool, HandlerErr> {
    Ok(match kind {
        AssessmentKind::Mchat => {
            let answers: Vec<MchatAnswer> = parse_answers(params)?;
            scoring::validate_mchat_answers(&answers)
        }
        AssessmentKind::MotorSkills => {
            let answers: Vec<MotorSkillsAnswer> = parse_answers(params)?;
            scoring::validate_motor_skills_answers(&answers)
        }
        AssessmentKind::SpeechLanguage => {
            let answers: Vec<FrequencyAnswer> = parse_answers(params)?;
            scoring::validate_speech_language_answers(&answers)
        }
        AssessmentKind::SocialSkills => {
            let answers: Vec<FrequencyAnswer> = parse_answers(params)?;
            scoring::validate_social_skills_answers(&answers)
        }
    })
}

fn handle_assess_score(req: &Request) -> serde_json::Value {
    let kind = match parse_kind(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match score_from_params(kind, &req.params) {
        Ok(result) => ok(
            &req.id,
            serde_json::to_value(&result).unwrap_or_else(|_| json!({})),
        ),
        Err(e) => e.response(&req.id),
    }
}

fn handle_assess_validate(req: &Request) -> serde_json::Value {
    let kind = match parse_kind(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match validate_from_params(kind, &req.params) {
        Ok(valid) => ok(&req.id, json!({ "valid": valid })),
        Err(e) => e.response(&req.id),
    }
}

fn handle_assess_recommendations(req: &Request) -> serde_json::Value {
    let kind = match parse_kind(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let raw_risk = match get_required_str(req, "riskLevel") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(risk) = RiskLevel::from_wire(&raw_risk) else {
        return err(
            &req.id,
            "bad_params",
            "riskLevel must be one of: low, medium, high",
            Some(json!({ "riskLevel": raw_risk })),
        );
    };
    let set = advice::advice_for(kind, risk);
    ok(
        &req.id,
        json!({
            "kind": kind.as_wire(),
            "riskLevel": risk.as_wire(),
            "recommendations": set.recommendations,
            "nextSteps": set.next_steps
        }),
    )
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    // Scoring is pure and needs no workspace.
    match req.method.as_str() {
        "assess.score" => Some(handle_assess_score(req)),
        "assess.validate" => Some(handle_assess_validate(req)),
        "assess.recommendations" => Some(handle_assess_recommendations(req)),
        _ => None,
    }
}
