use strum_macros::{AsRefStr, Display};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    LeaveRequest,
    LeaveApproved,
    LeaveRejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient_id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub leave_id: u64,
}

/// Delivery channel for leave lifecycle events.
pub trait Notifier {
    async fn notify(&self, notification: &Notification) -> Result<(), StoreError>;
}

/// Fire-and-forget: a failed delivery is logged and otherwise ignored.
pub async fn dispatch<N: Notifier>(notifier: &N, notification: Notification) {
    match notifier.notify(&notification).await {
        Ok(()) => debug!(
            recipient_id = notification.recipient_id,
            kind = %notification.kind,
            leave_id = notification.leave_id,
            "Notification sent"
        ),
        Err(e) => warn!(
            error = %e,
            recipient_id = notification.recipient_id,
            kind = %notification.kind,
            leave_id = notification.leave_id,
            "Notification delivery failed"
        ),
    }
}

/// Event for the reporting head captured on the request, if there is one.
pub fn leave_submitted(leave: &LeaveRequest, applicant: &Employee) -> Option<Notification> {
    let head = leave.employee_reporting_head_id?;
    Some(Notification {
        recipient_id: head,
        kind: NotificationKind::LeaveRequest,
        title: "New Leave Request".to_string(),
        message: format!(
            "{} has requested {} leave from {} to {} ({} days)",
            applicant.full_name(),
            leave.leave_type,
            leave.start_date,
            leave.end_date,
            leave.days
        ),
        leave_id: leave.id,
    })
}

/// Event for the submitter once a reviewer decided.
pub fn leave_reviewed(leave: &LeaveRequest) -> Option<Notification> {
    let (kind, verb) = match leave.status {
        LeaveStatus::Approved => (NotificationKind::LeaveApproved, "approved"),
        LeaveStatus::Rejected => (NotificationKind::LeaveRejected, "rejected"),
        _ => return None,
    };
    let mut message = format!(
        "Your {} leave from {} to {} has been {}",
        leave.leave_type, leave.start_date, leave.end_date, verb
    );
    if let Some(comments) = leave.reviewer_comments.as_deref().filter(|c| !c.is_empty()) {
        message.push_str(&format!(": {comments}"));
    }
    Some(Notification {
        recipient_id: leave.employee_id,
        kind,
        title: format!("Leave Request {}", if verb == "approved" { "Approved" } else { "Rejected" }),
        message,
        leave_id: leave.id,
    })
}
