use axum::{
    extract::{Path, State},
    response::Response,
};
use dentaldesk_models::{NewAttendance, NewSalary, NewStaff};

use super::{created, deleted, found, merged, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::StaffStore,
    state::AppState,
    Result,
};

pub async fn list_staff(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_staff().await?)
}

pub async fn get_staff(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(state.store.get_staff(id).await?, "Staff member")?)
}

pub async fn create_staff(
    State(state): State<AppState>,
    ValidatedJson(staff): ValidatedJson<NewStaff>,
) -> Result<Response> {
    created(state.store.create_staff(staff).await?)
}

pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_staff(id).await?, "Staff member")?;
    let staff = merged(&current.data, &patch)?;
    ok(found(state.store.update_staff(id, staff).await?, "Staff member")?)
}

pub async fn delete_staff(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_staff(id).await?, "Staff member")
}

pub async fn list_staff_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.store.list_attendance_by_staff(id).await?)
}

pub async fn create_attendance(
    State(state): State<AppState>,
    ValidatedJson(attendance): ValidatedJson<NewAttendance>,
) -> Result<Response> {
    created(state.store.create_attendance(attendance).await?)
}

pub async fn update_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_attendance(id).await?, "Attendance record")?;
    let attendance = merged(&current.data, &patch)?;
    ok(found(
        state.store.update_attendance(id, attendance).await?,
        "Attendance record",
    )?)
}

pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_attendance(id).await?, "Attendance record")
}

pub async fn list_staff_salary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.store.list_salary_by_staff(id).await?)
}

pub async fn create_salary(
    State(state): State<AppState>,
    ValidatedJson(salary): ValidatedJson<NewSalary>,
) -> Result<Response> {
    if (salary.net_amount - salary.computed_net()).abs() > 0.005 {
        tracing::debug!(
            staff_id = salary.staff_id,
            net_amount = salary.net_amount,
            computed = salary.computed_net(),
            "Salary net amount differs from base + bonus - deduction"
        );
    }
    created(state.store.create_salary(salary).await?)
}

pub async fn update_salary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_salary(id).await?, "Salary record")?;
    let salary = merged(&current.data, &patch)?;
    ok(found(
        state.store.update_salary(id, salary).await?,
        "Salary record",
    )?)
}

pub async fn delete_salary(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_salary(id).await?, "Salary record")
}
