//! Who may act on a leave request, and whose records a user may see.
//!
//! Manager authority comes from the reporting head stored on the request when
//! it was submitted. Later org-chart changes do not move already-submitted
//! requests, and there is no delegation or escalation.

use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::role::Role;

pub fn can_approve(reviewer: &Employee, leave: &LeaveRequest) -> bool {
    if leave.status != LeaveStatus::Pending {
        return false;
    }
    match reviewer.role {
        Role::Admin => true,
        Role::Manager => leave.employee_reporting_head_id == Some(reviewer.id),
        Role::Employee => false,
    }
}

pub fn approvable_requests(reviewer: &Employee, leaves: Vec<LeaveRequest>) -> Vec<LeaveRequest> {
    leaves
        .into_iter()
        .filter(|leave| can_approve(reviewer, leave))
        .collect()
}

/// Owner, admin, or the manager named on the request.
pub fn can_view_leave(viewer: &Employee, leave: &LeaveRequest) -> bool {
    leave.employee_id == viewer.id
        || viewer.role == Role::Admin
        || (viewer.role == Role::Manager && leave.employee_reporting_head_id == Some(viewer.id))
}

pub fn visible_leaves(viewer: &Employee, leaves: Vec<LeaveRequest>) -> Vec<LeaveRequest> {
    leaves
        .into_iter()
        .filter(|leave| can_view_leave(viewer, leave))
        .collect()
}

/// Admins see everyone, managers their direct reports and themselves, employees themselves.
pub fn can_view_employee(viewer: &Employee, target: &Employee) -> bool {
    match viewer.role {
        Role::Admin => true,
        Role::Manager => target.id == viewer.id || target.reporting_head_id == Some(viewer.id),
        Role::Employee => target.id == viewer.id,
    }
}

pub fn accessible_employees(viewer: &Employee, all: Vec<Employee>) -> Vec<Employee> {
    all.into_iter()
        .filter(|target| can_view_employee(viewer, target))
        .collect()
}

/// Direct reports only, regardless of the viewer's role.
pub fn team_of(head: &Employee, all: Vec<Employee>) -> Vec<Employee> {
    all.into_iter()
        .filter(|e| e.reporting_head_id == Some(head.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{at, date, employee};
    use crate::model::leave_request::LeaveType;

    fn leave(id: u64, employee_id: u64, head: Option<u64>, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id,
            employee_reporting_head_id: head,
            leave_type: LeaveType::Casual,
            start_date: date(2024, 1, 20),
            end_date: date(2024, 1, 21),
            days: 2,
            reason: "family".into(),
            status,
            applied_date: at(2024, 1, 2, 10, 0),
            reviewed_by: None,
            reviewed_date: None,
            reviewer_comments: None,
            cancelled_date: None,
        }
    }

    #[test]
    fn admin_approves_any_pending() {
        let admin = employee(1, Role::Admin, None);
        assert!(can_approve(&admin, &leave(1, 5, Some(9), LeaveStatus::Pending)));
        assert!(can_approve(&admin, &leave(2, 5, None, LeaveStatus::Pending)));
        for status in [LeaveStatus::Approved, LeaveStatus::Rejected, LeaveStatus::Cancelled] {
            assert!(!can_approve(&admin, &leave(3, 5, None, status)));
        }
    }

    #[test]
    fn manager_needs_snapshot_match() {
        let manager = employee(7, Role::Manager, None);
        assert!(can_approve(&manager, &leave(1, 5, Some(7), LeaveStatus::Pending)));
        assert!(!can_approve(&manager, &leave(2, 5, Some(8), LeaveStatus::Pending)));
        assert!(!can_approve(&manager, &leave(3, 5, None, LeaveStatus::Pending)));
        assert!(!can_approve(&manager, &leave(4, 5, Some(7), LeaveStatus::Approved)));
    }

    #[test]
    fn employees_never_approve() {
        let e = employee(7, Role::Employee, None);
        assert!(!can_approve(&e, &leave(1, 5, Some(7), LeaveStatus::Pending)));
    }

    #[test]
    fn approvable_filters_by_role() {
        let leaves = vec![
            leave(1, 5, Some(7), LeaveStatus::Pending),
            leave(2, 6, Some(8), LeaveStatus::Pending),
            leave(3, 5, Some(7), LeaveStatus::Rejected),
        ];
        let admin = employee(1, Role::Admin, None);
        let manager = employee(7, Role::Manager, None);
        let worker = employee(5, Role::Employee, Some(7));

        let ids = |v: Vec<LeaveRequest>| v.into_iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(ids(approvable_requests(&admin, leaves.clone())), vec![1, 2]);
        assert_eq!(ids(approvable_requests(&manager, leaves.clone())), vec![1]);
        assert!(approvable_requests(&worker, leaves).is_empty());
    }

    #[test]
    fn visibility_follows_reporting_line() {
        let all = vec![
            employee(1, Role::Admin, None),
            employee(7, Role::Manager, Some(1)),
            employee(5, Role::Employee, Some(7)),
            employee(6, Role::Employee, Some(8)),
        ];
        let ids = |v: Vec<Employee>| v.into_iter().map(|e| e.id).collect::<Vec<_>>();

        assert_eq!(ids(accessible_employees(&all[0], all.clone())), vec![1, 7, 5, 6]);
        assert_eq!(ids(accessible_employees(&all[1], all.clone())), vec![7, 5]);
        assert_eq!(ids(accessible_employees(&all[2], all.clone())), vec![5]);
        assert_eq!(ids(team_of(&all[1], all.clone())), vec![5]);
        let admin = all[0].clone();
        assert_eq!(ids(team_of(&admin, all)), vec![7]);
    }

    #[test]
    fn leave_visibility() {
        let l = leave(1, 5, Some(7), LeaveStatus::Approved);
        assert!(can_view_leave(&employee(5, Role::Employee, Some(7)), &l));
        assert!(can_view_leave(&employee(7, Role::Manager, None), &l));
        assert!(can_view_leave(&employee(1, Role::Admin, None), &l));
        assert!(!can_view_leave(&employee(8, Role::Manager, None), &l));
        assert!(!can_view_leave(&employee(6, Role::Employee, Some(7)), &l));
    }

    #[test]
    fn visible_leaves_follow_the_snapshot_not_the_current_team() {
        // 5 moved to manager 8 after filing request 1; 6 joined 7's team after filing request 2
        let leaves = vec![
            leave(1, 5, Some(7), LeaveStatus::Approved),
            leave(2, 6, Some(8), LeaveStatus::Pending),
            leave(3, 7, Some(1), LeaveStatus::Pending),
        ];
        let ids = |v: Vec<LeaveRequest>| v.into_iter().map(|l| l.id).collect::<Vec<_>>();

        let manager = employee(7, Role::Manager, Some(1));
        assert_eq!(ids(visible_leaves(&manager, leaves.clone())), vec![1, 3]);
        assert_eq!(ids(visible_leaves(&employee(8, Role::Manager, None), leaves.clone())), vec![2]);
        assert_eq!(ids(visible_leaves(&employee(1, Role::Admin, None), leaves.clone())), vec![1, 2, 3]);
        assert_eq!(ids(visible_leaves(&employee(6, Role::Employee, Some(7)), leaves)), vec![2]);
    }
}
