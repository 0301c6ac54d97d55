use crate::advice;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::assess;
use crate::ipc::helpers::{get_optional_str, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::scoring::{AssessmentKind, RiskLevel};
use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde_json::json;
use uuid::Uuid;

struct HandlerErr {
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
}

impl HandlerErr {
    fn response(self, id: &str) -> serde_json::Value {
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

/// Whole months elapsed between two dates, clamped at zero.
fn age_in_months(birth: NaiveDate, on: NaiveDate) -> i64 {
    let mut months = (on.year() as i64 - birth.year() as i64) * 12
        + (on.month() as i64 - birth.month() as i64);
    if on.day() < birth.day() {
        months -= 1;
    }
    months.max(0)
}

fn child_age_months(
    conn: &Connection,
    child_id: &str,
    taken_at: Option<&str>,
) -> Result<Option<i64>, HandlerErr> {
    let birth_date: Option<String> = conn
        .query_row(
            "SELECT birth_date FROM children WHERE id = ?",
            [child_id],
            |r| r.get::<_, Option<String>>(0),
        )
        .optional()
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?
        .flatten();
    let Some(birth_raw) = birth_date else {
        return Ok(None);
    };
    let Ok(birth) = NaiveDate::parse_from_str(&birth_raw, "%Y-%m-%d") else {
        return Ok(None);
    };
    // takenAt may be a full RFC3339 stamp; the date prefix is enough.
    let on = taken_at
        .and_then(|t| t.get(..10))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());
    Ok(Some(age_in_months(birth, on)))
}

fn handle_submissions_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let child_id = match get_required_str(req, "childId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let kind = match parse_kind(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let child_ok = match conn
        .query_row("SELECT 1 FROM children WHERE id = ?", [&child_id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()
    {
        Ok(v) => v.is_some(),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if !child_ok {
        return err(&req.id, "not_found", "child not found", None);
    }

    let valid = match assess::validate_from_params(kind, &req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    if !valid {
        return err(
            &req.id,
            "invalid_answers",
            "answers are empty or contain out-of-vocabulary values",
            Some(json!({ "kind": kind.as_wire() })),
        );
    }

    let result = match assess::score_from_params(kind, &req.params) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let taken_at = get_optional_str(&req.params, "takenAt");
    let age_months = match child_age_months(conn, &child_id, taken_at.as_deref()) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let answers_json = req
        .params
        .get("answers")
        .cloned()
        .unwrap_or(serde_json::Value::Null)
        .to_string();

    let submission_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO submissions(
            id, child_id, kind, answers, score, total_questions,
            risk_level, age_months, taken_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?,
                COALESCE(?, strftime('%Y-%m-%dT%H:%M:%SZ','now')))",
        (
            &submission_id,
            &child_id,
            kind.as_wire(),
            &answers_json,
            result.score.value() as i64,
            result.total_questions as i64,
            result.risk_level.as_wire(),
            age_months,
            &taken_at,
        ),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "submissions" })),
        );
    }

    let result_json = serde_json::to_value(&result).unwrap_or_else(|_| json!({}));
    ok(
        &req.id,
        json!({
            "submissionId": submission_id,
            "ageMonths": age_months,
            "result": result_json
        }),
    )
}

fn handle_submissions_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let child_filter = get_optional_str(&req.params, "childId");

    let sql = "SELECT id, child_id, kind, score, total_questions, risk_level, age_months, taken_at
               FROM submissions
               WHERE (?1 IS NULL OR child_id = ?1)
               ORDER BY taken_at DESC, id";
    let mut stmt = match conn.prepare(sql) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let rows = match stmt
        .query_map([&child_filter], |r| {
            Ok(json!({
                "id": r.get::<_, String>(0)?,
                "childId": r.get::<_, String>(1)?,
                "kind": r.get::<_, String>(2)?,
                "score": r.get::<_, i64>(3)?,
                "totalQuestions": r.get::<_, i64>(4)?,
                "riskLevel": r.get::<_, String>(5)?,
                "ageMonths": r.get::<_, Option<i64>>(6)?,
                "takenAt": r.get::<_, String>(7)?,
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    ok(&req.id, json!({ "submissions": rows }))
}

fn handle_submissions_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let submission_id = match get_required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let row = match conn
        .query_row(
            "SELECT id, child_id, kind, answers, score, total_questions, risk_level,
                    age_months, taken_at
             FROM submissions WHERE id = ?",
            [&submission_id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, i64>(4)?,
                    r.get::<_, i64>(5)?,
                    r.get::<_, String>(6)?,
                    r.get::<_, Option<i64>>(7)?,
                    r.get::<_, String>(8)?,
                ))
            },
        )
        .optional()
    {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "not_found", "submission not found", None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let (id, child_id, kind_raw, answers_raw, score, total, risk_raw, age_months, taken_at) = row;

    let answers: serde_json::Value =
        serde_json::from_str(&answers_raw).unwrap_or(serde_json::Value::Null);

    // Advice text is static lookup data, so it is re-attached from the
    // table rather than stored per row.
    let advice_json = match (
        AssessmentKind::from_wire(&kind_raw),
        RiskLevel::from_wire(&risk_raw),
    ) {
        (Some(kind), Some(risk)) => {
            let set = advice::advice_for(kind, risk);
            json!({
                "score": score,
                "totalQuestions": total,
                "riskLevel": risk_raw,
                "recommendations": set.recommendations,
                "nextSteps": set.next_steps
            })
        }
        _ => serde_json::Value::Null,
    };

    ok(
        &req.id,
        json!({
            "id": id,
            "childId": child_id,
            "kind": kind_raw,
            "answers": answers,
            "ageMonths": age_months,
            "takenAt": taken_at,
            "result": advice_json
        }),
    )
}

fn handle_submissions_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let submission_id = match get_required_str(req, "submissionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match conn.execute("DELETE FROM submissions WHERE id = ?", [&submission_id]) {
        Ok(0) => err(&req.id, "not_found", "submission not found", None),
        Ok(_) => ok(&req.id, json!({ "ok": true })),
        Err(e) => err(
            &req.id,
            "db_delete_failed",
            e.to_string(),
            Some(json!({ "table": "submissions" })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "submissions.record" => Some(handle_submissions_record(state, req)),
        "submissions.list" => Some(handle_submissions_list(state, req)),
        "submissions.get" => Some(handle_submissions_get(state, req)),
        "submissions.delete" => Some(handle_submissions_delete(state, req)),
        _ => None,
    }
}
