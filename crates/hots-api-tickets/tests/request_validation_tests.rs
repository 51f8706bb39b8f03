//! Validation and assembly tests for the ticket API models.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use hots_api_tickets::models::{
    ApproveTicketRequest, CreateTicketRequest, CreateWorkflowGroupRequest, RejectTicketRequest,
    StepInput, TicketDetailInput, TicketResponse, WorkflowGroupResponse,
};
use hots_db::models::{
    ApprovalEvent, ApproverKind, EventStatus, Ticket, TicketDetail, TicketStatus, WorkflowGroup,
    WorkflowStep,
};

fn detail(label: &str) -> TicketDetailInput {
    TicketDetailInput {
        label: label.to_string(),
        value: "value".to_string(),
    }
}

#[test]
fn test_create_ticket_request_accepts_sixteen_details() {
    let request = CreateTicketRequest {
        service_id: Uuid::new_v4(),
        details: (0..16).map(|i| detail(&format!("field-{i}"))).collect(),
    };
    assert!(request.validate().is_ok());
}

#[test]
fn test_create_ticket_request_rejects_seventeen_details() {
    let request = CreateTicketRequest {
        service_id: Uuid::new_v4(),
        details: (0..17).map(|i| detail(&format!("field-{i}"))).collect(),
    };
    assert!(request.validate().is_err());
}

#[test]
fn test_create_ticket_request_rejects_empty_label() {
    let request = CreateTicketRequest {
        service_id: Uuid::new_v4(),
        details: vec![detail("")],
    };
    assert!(request.validate().is_err());
}

#[test]
fn test_create_ticket_request_details_default_empty() {
    let json = format!(r#"{{"service_id":"{}"}}"#, Uuid::new_v4());
    let request: CreateTicketRequest = serde_json::from_str(&json).unwrap();
    assert!(request.details.is_empty());
    assert!(request.validate().is_ok());
}

#[test]
fn test_approve_request_rejects_zero_step() {
    let request = ApproveTicketRequest {
        step_order: 0,
        note: None,
    };
    assert!(request.validate().is_err());

    let request = ApproveTicketRequest {
        step_order: 1,
        note: Some("looks fine".to_string()),
    };
    assert!(request.validate().is_ok());
}

#[test]
fn test_reject_request_requires_remark() {
    let request = RejectTicketRequest {
        step_order: 1,
        remark: String::new(),
    };
    assert!(request.validate().is_err());

    let request = RejectTicketRequest {
        step_order: 1,
        remark: "budget not approved".to_string(),
    };
    assert!(request.validate().is_ok());
}

#[test]
fn test_workflow_group_request_validates_nested_steps() {
    let request = CreateWorkflowGroupRequest {
        name: "Hardware requests".to_string(),
        description: None,
        steps: vec![StepInput {
            step_order: 0,
            approver_kind: ApproverKind::Superior,
            target_id: None,
            custom_query: None,
            override_user_id: None,
        }],
    };
    assert!(request.validate().is_err());
}

fn ticket(status: TicketStatus) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: Uuid::new_v4(),
        creator_id: Uuid::new_v4(),
        service_id: Uuid::new_v4(),
        status,
        assigned_team_id: None,
        assigned_user_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_ticket_response_assembly() {
    let t = ticket(TicketStatus::New);
    let ticket_id = t.id;
    let details = vec![TicketDetail {
        ticket_id,
        slot: 1,
        label: "Reason".to_string(),
        value: "New laptop".to_string(),
    }];
    let events = vec![ApprovalEvent {
        id: Uuid::new_v4(),
        ticket_id,
        approver_id: Uuid::new_v4(),
        step_order: 1,
        status: EventStatus::Waiting,
        note: None,
        decided_at: None,
        created_at: Utc::now(),
    }];

    let response = TicketResponse::assemble(t, details, events);
    assert_eq!(response.id, ticket_id);
    assert_eq!(response.details.len(), 1);
    assert_eq!(response.details[0].slot, 1);
    assert_eq!(response.approval_events.len(), 1);
    assert_eq!(response.approval_events[0].status, EventStatus::Waiting);
}

#[test]
fn test_workflow_group_response_assembly() {
    let now = Utc::now();
    let group = WorkflowGroup {
        id: Uuid::new_v4(),
        name: "Two-level".to_string(),
        description: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let group_id = group.id;
    let target = Uuid::new_v4();
    let steps = vec![
        WorkflowStep {
            id: Uuid::new_v4(),
            workflow_group_id: group_id,
            step_order: 1,
            approver_kind: ApproverKind::Superior,
            target_id: None,
            custom_query: None,
            override_user_id: None,
            created_at: now,
        },
        WorkflowStep {
            id: Uuid::new_v4(),
            workflow_group_id: group_id,
            step_order: 2,
            approver_kind: ApproverKind::Team,
            target_id: Some(target),
            custom_query: None,
            override_user_id: None,
            created_at: now,
        },
    ];

    let response = WorkflowGroupResponse::assemble(group, steps);
    assert_eq!(response.id, group_id);
    assert_eq!(response.steps.len(), 2);
    assert_eq!(response.steps[1].target_id, Some(target));
}
