// src/stores/employee_store.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stores::{Resource, Store};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub employee_display_number: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub job_title_id: Option<Uuid>,
    /// Login account linked to this employee, if any.
    pub user_id: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    pub job_title_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title_id: Option<Uuid>,
}

impl Resource for Employee {
    const PATH: &'static str = "/employees";
    const LABEL: &'static str = "employee";
    type Draft = EmployeeDraft;
    type Patch = EmployeePatch;
    type Filter = EmployeeFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type EmployeeStore = Store<Employee>;
