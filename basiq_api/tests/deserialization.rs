use basiq_api::types::{Job, StepStatus, TokenResponse, TransactionList, User};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_token() {
    let json = load_fixture("token.json");
    let resp: TokenResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.access_token, "eyJhbGciOiJIUzI1NiJ9.sandbox.token");
    assert_eq!(resp.token_type.as_deref(), Some("Bearer"));
    assert_eq!(resp.expires_in, Some(3600));
}

#[test]
fn deserialize_user() {
    let json = load_fixture("user.json");
    let user: User = serde_json::from_str(&json).unwrap();
    assert_eq!(user.id, "ea3a81c5-8d1a-4f05-a0a0-ccc4c4b4a1f7");
    assert_eq!(user.email.as_deref(), Some("gilfoyle@ppipper.com"));
}

#[test]
fn user_without_id_is_rejected() {
    let result = serde_json::from_str::<User>(r#"{"email": "a@b.c"}"#);
    assert!(result.is_err());
}

#[test]
fn deserialize_pending_job() {
    let json = load_fixture("job_pending.json");
    let job: Job = serde_json::from_str(&json).unwrap();
    assert_eq!(job.id, "e9132638");
    assert_eq!(job.job_type, "job");
    assert_eq!(job.steps.len(), 3);
    assert_eq!(job.steps[1].status, StepStatus::InProgress);

    let step = job.find_step("retrieve-transactions").unwrap();
    assert_eq!(step.status, StepStatus::Pending);
    assert!(step.result.is_none());
    assert_eq!(step.result_url(), None);
}

#[test]
fn deserialize_successful_job() {
    let json = load_fixture("job_success.json");
    let job: Job = serde_json::from_str(&json).unwrap();

    let step = job.find_step("retrieve-transactions").unwrap();
    assert_eq!(step.status, StepStatus::Success);
    assert_eq!(
        step.result_url(),
        Some("/users/ea3a81c5/transactions?filter=connection.id.eq('8fce3b')")
    );
    assert_eq!(step.result.as_ref().unwrap().result_type, "link");
}

#[test]
fn job_without_steps_decodes_empty() {
    let job: Job = serde_json::from_str(r#"{"type": "job", "id": "x"}"#).unwrap();
    assert!(job.steps.is_empty());
    assert!(job.find_step("retrieve-transactions").is_none());
}

#[test]
fn deserialize_transactions() {
    let json = load_fixture("transactions.json");
    let list: TransactionList = serde_json::from_str(&json).unwrap();
    assert_eq!(list.list_type, "list");
    assert_eq!(list.count, 4);
    assert_eq!(list.size, 500);
    assert_eq!(list.data.len(), 4);

    assert_eq!(list.data[0].amount, "-12.50");
    assert_eq!(list.data[0].category_code(), "G1");
    assert_eq!(list.data[0].category_title(), "Groceries");
    assert_eq!(list.data[2].category_code(), "");
}

#[test]
fn null_sub_class_decodes_as_unattributed() {
    let json = load_fixture("transactions.json");
    let list: TransactionList = serde_json::from_str(&json).unwrap();
    let txn = &list.data[3];
    assert_eq!(txn.amount, "-80.00");
    assert_eq!(txn.category_code(), "");
    assert_eq!(txn.category_title(), "");
}

#[test]
fn null_amount_and_code_decode_as_empty() {
    let list: TransactionList = serde_json::from_str(
        r#"{"data": [{"amount": null, "subClass": {"title": null, "code": null}}]}"#,
    )
    .unwrap();
    assert_eq!(list.data[0].amount, "");
    assert_eq!(list.data[0].category_code(), "");
}
