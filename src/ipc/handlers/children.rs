use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{get_optional_str, get_required_str};
use crate::ipc::types::{AppState, Request};
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

fn child_exists(conn: &Connection, child_id: &str) -> Result<bool, HandlerErr> {
    conn.query_row("SELECT 1 FROM children WHERE id = ?", [child_id], |r| {
        r.get::<_, i64>(0)
    })
    .optional()
    .map(|v| v.is_some())
    .map_err(|e| HandlerErr {
        code: "db_query_failed",
        message: e.to_string(),
        details: None,
    })
}

fn child_row_json(conn: &Connection, child_id: &str) -> Result<serde_json::Value, HandlerErr> {
    conn.query_row(
        "SELECT id, last_name, first_name, birth_date, active, sort_order, updated_at
         FROM children WHERE id = ?",
        [child_id],
        |r| {
            let last: String = r.get(1)?;
            let first: String = r.get(2)?;
            Ok(json!({
                "id": r.get::<_, String>(0)?,
                "displayName": format!("{}, {}", last, first),
                "lastName": last,
                "firstName": first,
                "birthDate": r.get::<_, Option<String>>(3)?,
                "active": r.get::<_, i64>(4)? != 0,
                "sortOrder": r.get::<_, i64>(5)?,
                "updatedAt": r.get::<_, Option<String>>(6)?,
            }))
        },
    )
    .map_err(|e| HandlerErr {
        code: "db_query_failed",
        message: e.to_string(),
        details: None,
    })
}

fn children_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let mut stmt = conn
        .prepare(
            "SELECT id, last_name, first_name, birth_date, active, sort_order
             FROM children
             ORDER BY sort_order",
        )
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?;
    let rows: Vec<serde_json::Value> = stmt
        .query_map([], |r| {
            let last: String = r.get(1)?;
            let first: String = r.get(2)?;
            Ok(json!({
                "id": r.get::<_, String>(0)?,
                "displayName": format!("{}, {}", last, first),
                "lastName": last,
                "firstName": first,
                "birthDate": r.get::<_, Option<String>>(3)?,
                "active": r.get::<_, i64>(4)? != 0,
                "sortOrder": r.get::<_, i64>(5)?,
            }))
        })
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?;
    Ok(json!({ "children": rows }))
}

fn children_create(
    conn: &Connection,
    params: &serde_json::Value,
    last_name: String,
    first_name: String,
) -> Result<serde_json::Value, HandlerErr> {
    let birth_date = get_optional_str(params, "birthDate");
    let active = params
        .get("active")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    let next_sort: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM children",
            [],
            |r| r.get(0),
        )
        .map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?;

    let child_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO children(id, last_name, first_name, birth_date, active, sort_order, updated_at)
         VALUES(?, ?, ?, ?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))",
        (
            &child_id,
            &last_name,
            &first_name,
            &birth_date,
            active as i64,
            next_sort,
        ),
    )
    .map_err(|e| HandlerErr {
        code: "db_insert_failed",
        message: e.to_string(),
        details: Some(json!({ "table": "children" })),
    })?;

    Ok(json!({ "childId": child_id, "sortOrder": next_sort }))
}

fn children_update(
    conn: &Connection,
    params: &serde_json::Value,
    child_id: &str,
) -> Result<serde_json::Value, HandlerErr> {
    if !child_exists(conn, child_id)? {
        return Err(HandlerErr {
            code: "not_found",
            message: "child not found".to_string(),
            details: None,
        });
    }
    let Some(patch) = params.get("patch").and_then(|v| v.as_object()) else {
        return Err(HandlerErr {
            code: "bad_params",
            message: "missing patch object".to_string(),
            details: None,
        });
    };

    let mut set_parts: Vec<String> = Vec::new();
    let mut bind: Vec<rusqlite::types::Value> = Vec::new();
    if let Some(v) = patch.get("lastName").and_then(|v| v.as_str()) {
        set_parts.push("last_name = ?".into());
        bind.push(rusqlite::types::Value::Text(v.to_string()));
    }
    if let Some(v) = patch.get("firstName").and_then(|v| v.as_str()) {
        set_parts.push("first_name = ?".into());
        bind.push(rusqlite::types::Value::Text(v.to_string()));
    }
    if let Some(v) = patch.get("birthDate") {
        if v.is_null() {
            set_parts.push("birth_date = NULL".into());
        } else if let Some(s) = v.as_str() {
            set_parts.push("birth_date = ?".into());
            bind.push(rusqlite::types::Value::Text(s.to_string()));
        }
    }
    if let Some(v) = patch.get("active").and_then(|v| v.as_bool()) {
        set_parts.push("active = ?".into());
        bind.push(rusqlite::types::Value::Integer(v as i64));
    }
    if let Some(v) = patch.get("sortOrder").and_then(|v| v.as_i64()) {
        set_parts.push("sort_order = ?".into());
        bind.push(rusqlite::types::Value::Integer(v));
    }
    if set_parts.is_empty() {
        return Err(HandlerErr {
            code: "bad_params",
            message: "patch has no recognized fields".to_string(),
            details: None,
        });
    }
    set_parts.push("updated_at = strftime('%Y-%m-%dT%H:%M:%SZ','now')".into());
    bind.push(rusqlite::types::Value::Text(child_id.to_string()));

    let sql = format!("UPDATE children SET {} WHERE id = ?", set_parts.join(", "));
    conn.execute(&sql, rusqlite::params_from_iter(bind))
        .map_err(|e| HandlerErr {
            code: "db_update_failed",
            message: e.to_string(),
            details: Some(json!({ "table": "children" })),
        })?;

    child_row_json(conn, child_id).map(|child| json!({ "child": child }))
}

fn children_delete(conn: &Connection, child_id: &str) -> Result<serde_json::Value, HandlerErr> {
    if !child_exists(conn, child_id)? {
        return Err(HandlerErr {
            code: "not_found",
            message: "child not found".to_string(),
            details: None,
        });
    }
    let tx = conn.unchecked_transaction().map_err(|e| HandlerErr {
        code: "db_tx_failed",
        message: e.to_string(),
        details: None,
    })?;
    let submissions_deleted = tx
        .execute("DELETE FROM submissions WHERE child_id = ?", [child_id])
        .map_err(|e| HandlerErr {
            code: "db_delete_failed",
            message: e.to_string(),
            details: Some(json!({ "table": "submissions" })),
        })?;
    tx.execute("DELETE FROM children WHERE id = ?", [child_id])
        .map_err(|e| HandlerErr {
            code: "db_delete_failed",
            message: e.to_string(),
            details: Some(json!({ "table": "children" })),
        })?;
    tx.commit().map_err(|e| HandlerErr {
        code: "db_commit_failed",
        message: e.to_string(),
        details: None,
    })?;
    Ok(json!({ "ok": true, "submissionsDeleted": submissions_deleted }))
}

fn handle_children_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match children_list(conn) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_children_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let last_name = match get_required_str(req, "lastName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let first_name = match get_required_str(req, "firstName") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match children_create(conn, &req.params, last_name, first_name) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_children_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let child_id = match get_required_str(req, "childId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match children_update(conn, &req.params, &child_id) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_children_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let child_id = match get_required_str(req, "childId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match children_delete(conn, &child_id) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "children.list" => Some(handle_children_list(state, req)),
        "children.create" => Some(handle_children_create(state, req)),
        "children.update" => Some(handle_children_update(state, req)),
        "children.delete" => Some(handle_children_delete(state, req)),
        _ => None,
    }
}
