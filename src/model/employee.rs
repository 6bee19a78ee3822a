use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "role": "employee",
        "reporting_head_id": 7,
        "join_date": "2024-01-01",
        "last_working_day": null,
        "active": true
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Engineering")]
    pub department: String,

    #[sqlx(try_from = "String")]
    pub role: Role,

    /// Approver for this employee's leave. Not enforced as a foreign key.
    #[schema(example = 7, nullable = true)]
    pub reporting_head_id: Option<u64>,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub join_date: NaiveDate,

    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub last_working_day: Option<NaiveDate>,

    pub active: bool,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// True when `date` falls between the join date and the last working day.
    pub fn employed_on(&self, date: NaiveDate) -> bool {
        if date < self.join_date {
            return false;
        }
        match self.last_working_day {
            Some(last) => date <= last,
            None => true,
        }
    }
}

/// Fields needed to register an employee.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: String,
    pub role: Role,
    #[schema(example = 7, nullable = true)]
    pub reporting_head_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub join_date: NaiveDate,
}

/// Partial update applied by admins and managers.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub role: Option<Role>,
    /// `Some(None)` clears the reporting head.
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<u64>)]
    pub reporting_head_id: Option<Option<u64>>,
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub join_date: Option<NaiveDate>,
}

impl EmployeePatch {
    pub fn apply(self, employee: &mut Employee) {
        if let Some(v) = self.first_name {
            employee.first_name = v;
        }
        if let Some(v) = self.last_name {
            employee.last_name = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.department {
            employee.department = v;
        }
        if let Some(v) = self.role {
            employee.role = v;
        }
        if let Some(v) = self.reporting_head_id {
            employee.reporting_head_id = v;
        }
        if let Some(v) = self.join_date {
            employee.join_date = v;
        }
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<u64>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> Employee {
        Employee {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@company.com".into(),
            department: "Engineering".into(),
            role: Role::Employee,
            reporting_head_id: Some(7),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            last_working_day: Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()),
            active: true,
        }
    }

    #[test]
    fn employed_on_respects_join_and_exit() {
        let e = employee();
        assert!(!e.employed_on(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()));
        assert!(e.employed_on(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()));
        assert!(e.employed_on(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
        assert!(!e.employed_on(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    }

    #[test]
    fn patch_distinguishes_absent_and_null_head() {
        let mut e = employee();
        let keep: EmployeePatch = serde_json::from_str(r#"{"department":"HR"}"#).unwrap();
        keep.apply(&mut e);
        assert_eq!(e.department, "HR");
        assert_eq!(e.reporting_head_id, Some(7));

        let clear: EmployeePatch = serde_json::from_str(r#"{"reporting_head_id":null}"#).unwrap();
        clear.apply(&mut e);
        assert_eq!(e.reporting_head_id, None);
    }
}
