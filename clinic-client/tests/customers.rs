mod common;

use axum::http::{Method, StatusCode};
use chrono::Months;
use clinic_client::ClientError;
use clinic_client::badge::badge_key;
use clinic_client::managers::{RenewOutcome, RenewRequest};
use common::{MockApi, connect, member_customer, plain_customer};
use rust_decimal::Decimal;
use serde_json::json;
use shared::dates;
use shared::error::ErrorCode;
use shared::models::{
    CustomerCreate, CustomerFilter, CustomerRegistration, MembershipIssue, MembershipTemplate,
    MembershipType, PaymentMethod,
};
use tempfile::TempDir;

fn customer_rows() -> serde_json::Value {
    json!([
        member_customer(5, "Basic", "1800.00", 12, "2099-12-31"),
        member_customer(6, "Pro", "0.00", 20, "2020-01-31"),
        plain_customer(8, "Walk In")
    ])
}

fn membership_history() -> serde_json::Value {
    json!([
        { "id": "3", "customer_id": "5", "type": "basic", "coverage": "5000.00", "remaining_balance": "0.00",
          "date_registered": "2025-02-01", "expire_date": "2025-03-01" },
        { "id": "12", "customer_id": "5", "type": "basic", "coverage": "5000.00", "remaining_balance": "1800.00",
          "date_registered": "2026-01-05 10:30:00", "expire_date": "2099-12-31" }
    ])
}

fn basic_template() -> MembershipTemplate {
    MembershipTemplate {
        id: 1,
        kind: MembershipType::Basic,
        name: "Basic Glow".into(),
        price: Decimal::from(3000),
        consumable_amount: Decimal::from(5000),
        valid_until: None,
        no_expiration: true,
    }
}

async fn setup() -> (MockApi, TempDir, clinic_client::Console) {
    let api = MockApi::start().await;
    api.with_staff_user();
    api.on(Method::GET, "customers.php", &[], customer_rows());
    let dir = TempDir::new().unwrap();
    let console = connect(&api, &dir).await;
    (api, dir, console)
}

#[tokio::test]
async fn test_list_is_decorated() {
    let (api, _dir, console) = setup().await;
    console
        .badges()
        .record(5, MembershipType::Basic, Some(12))
        .unwrap();
    let mut customers = console.customers();

    let list = customers.list(CustomerFilter::Member).await.unwrap();
    assert_eq!(list.len(), 3);
    assert!(list[0].is_new_member);
    assert!(!list[0].is_expired);
    assert!(!list[1].is_new_member);
    assert!(list[1].is_expired);
    assert!(!list[2].customer.is_member());
    assert!(list[2].customer.membership_details.is_none());

    let get = api.requests_to(Method::GET, "customers.php");
    assert_eq!(get[0].param("filter"), Some("member"));
    assert_eq!(customers.filter(), CustomerFilter::Member);
}

#[tokio::test]
async fn test_stale_badge_is_dropped_after_renewal_elsewhere() {
    let (_api, _dir, console) = setup().await;
    // Badge recorded for an older membership than the one now listed
    console
        .badges()
        .record(5, MembershipType::Basic, Some(3))
        .unwrap();
    let mut customers = console.customers();

    let list = customers.list(CustomerFilter::All).await.unwrap();
    assert!(!list[0].is_new_member);
    assert!(!console.store().contains(&badge_key(5)));
}

#[tokio::test]
async fn test_search_and_debounce() {
    let (_api, _dir, console) = setup().await;
    let mut customers = console.customers();
    customers.refresh().await.unwrap();

    assert_eq!(customers.search("cust-0006").len(), 1);
    assert_eq!(customers.search("walk").len(), 1);
    assert_eq!(customers.search("").len(), 3);

    let (first, second) = tokio::join!(customers.search_debounced("customer"), async {
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        customers.search_debounced("walk").await
    });
    assert!(first.is_none());
    assert_eq!(second.unwrap().len(), 1);
}

#[tokio::test]
async fn test_issue_membership_records_badge() {
    let (api, _dir, console) = setup().await;
    api.on(
        Method::POST,
        "members.php",
        &[],
        json!({ "success": true, "membership_id": "90" }),
    );
    let mut customers = console.customers();
    customers.refresh().await.unwrap();

    let issue = MembershipIssue::from_template(8, &basic_template(), PaymentMethod::GCash);
    let membership_id = customers.issue_membership(issue).await.unwrap();
    assert_eq!(membership_id, Some(90));

    let posted = api.requests_to(Method::POST, "members.php");
    let body = posted[0].body.as_ref().unwrap();
    assert_eq!(body["customer_id"], 8);
    assert_eq!(body["type"], "basic");
    assert_eq!(body["payment_method"], "gcash");
    assert_eq!(body["coverage"].as_f64(), Some(5000.0));
    assert!(body["expire_date"].is_null());
    assert_eq!(body["branch_id"], 2);
    assert_eq!(body["performed_by"], "Ana Reyes");

    let entry = customers.badges().entry(8).unwrap();
    assert_eq!(entry.membership_id, Some(90));
    assert!(customers.find(8).unwrap().is_new_member);
}

#[tokio::test]
async fn test_issue_from_template() {
    let (api, _dir, console) = setup().await;
    api.on(
        Method::GET,
        "members.php",
        &[("action", "templates")],
        json!({ "data": [
            { "id": "1", "type": "basic", "name": "Basic Glow", "price": "3000.00",
              "consumable_amount": "5000.00", "valid_until": "", "no_expiration": "1" },
            { "id": "2", "type": "pro", "name": "Pro Glow", "price": "8000.00",
              "consumable_amount": "10000.00", "valid_until": "2027-06-30", "no_expiration": "0" }
        ]}),
    );
    api.on(
        Method::POST,
        "members.php",
        &[],
        json!({ "success": true, "membership_id": 95 }),
    );
    let mut customers = console.customers();

    assert_eq!(customers.membership_templates().await.unwrap().len(), 2);
    let membership_id = customers
        .issue_from_template(8, 2, PaymentMethod::Card)
        .await
        .unwrap();
    assert_eq!(membership_id, Some(95));

    let issued = &api.requests_to(Method::POST, "members.php")[0];
    let body = issued.body.as_ref().unwrap();
    assert_eq!(body["type"], "pro");
    assert_eq!(body["template_id"], 2);
    assert_eq!(body["coverage"].as_f64(), Some(10000.0));
    assert_eq!(body["expire_date"], "2027-06-30");
    assert!(customers.badges().should_show(8, Some(95)));

    let err = customers
        .issue_from_template(8, 99, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::NotFound));
    assert_eq!(api.requests_to(Method::POST, "members.php").len(), 1);
}

#[tokio::test]
async fn test_register_with_membership() {
    let (api, _dir, console) = setup().await;
    api.on(
        Method::POST,
        "customers.php",
        &[],
        json!({ "success": true, "customer_id": 42 }),
    );
    api.on(
        Method::POST,
        "members.php",
        &[],
        json!({ "success": true, "membership_id": 91 }),
    );
    let mut customers = console.customers();

    let registered = customers
        .register(CustomerRegistration {
            customer: CustomerCreate {
                name: " Maria Santos ".into(),
                email: Some("maria@example.com".into()),
                ..Default::default()
            },
            membership: Some(MembershipIssue::from_template(
                0,
                &basic_template(),
                PaymentMethod::Cash,
            )),
        })
        .await
        .unwrap();
    assert_eq!(registered.customer_id, 42);
    assert_eq!(registered.membership_id, Some(91));

    let created = api.requests_to(Method::POST, "customers.php");
    assert_eq!(created[0].body.as_ref().unwrap()["name"], "Maria Santos");
    let issued = api.requests_to(Method::POST, "members.php");
    assert_eq!(issued[0].body.as_ref().unwrap()["customer_id"], 42);
    assert!(customers.badges().should_show(42, Some(91)));
}

#[tokio::test]
async fn test_register_survives_list_reload_failure() {
    let (api, _dir, console) = setup().await;
    api.on(
        Method::POST,
        "customers.php",
        &[],
        json!({ "success": true, "customer_id": 42 }),
    );
    api.on(
        Method::POST,
        "members.php",
        &[],
        json!({ "success": true, "membership_id": 91 }),
    );
    api.on_raw(
        Method::GET,
        "customers.php",
        &[],
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"Database unavailable"}"#,
    );
    let mut customers = console.customers();

    let registered = customers
        .register(CustomerRegistration {
            customer: CustomerCreate {
                name: "Maria Santos".into(),
                ..Default::default()
            },
            membership: Some(MembershipIssue::from_template(
                0,
                &basic_template(),
                PaymentMethod::Cash,
            )),
        })
        .await
        .unwrap();
    assert_eq!(registered.customer_id, 42);
    assert_eq!(registered.membership_id, Some(91));
    assert_eq!(api.requests_to(Method::POST, "customers.php").len(), 1);
    assert_eq!(api.requests_to(Method::POST, "members.php").len(), 1);
    assert!(customers.customers().is_empty());
}

#[tokio::test]
async fn test_create_rejects_bad_email() {
    let (api, _dir, console) = setup().await;
    let mut customers = console.customers();

    let err = customers
        .create(CustomerCreate {
            name: "Maria".into(),
            email: Some("maria.example.com".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ValidationFailed));
    assert!(api.requests_to(Method::POST, "customers.php").is_empty());
}

#[tokio::test]
async fn test_renew_latest_membership() {
    let (api, _dir, console) = setup().await;
    api.on(Method::GET, "members.php", &[("customer_id", "5")], membership_history());
    api.on(
        Method::POST,
        "members.php",
        &[("action", "renew")],
        json!({ "success": true, "membership_id": 13 }),
    );
    api.on(Method::POST, "membership_logs.php", &[], json!({ "success": true }));
    console
        .badges()
        .record(5, MembershipType::Basic, Some(12))
        .unwrap();
    let mut customers = console.customers();

    let outcome = customers
        .renew_membership(5, RenewRequest::default())
        .await
        .unwrap();
    let expected_expiry = dates::today().checked_add_months(Months::new(1));
    match outcome {
        RenewOutcome::Renewed {
            membership_id,
            terms,
        } => {
            assert_eq!(membership_id, Some(13));
            assert_eq!(terms.coverage, Decimal::from(5000));
            assert_eq!(terms.expire_date, expected_expiry);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let renew = api
        .requests_to(Method::POST, "members.php")
        .into_iter()
        .find(|r| r.param("action") == Some("renew"))
        .unwrap();
    let body = renew.body.unwrap();
    assert_eq!(body["previous_membership_id"], 12);
    assert_eq!(body["remaining_balance"].as_f64(), Some(5000.0));
    assert_eq!(body["performed_by"], "Ana Reyes");

    let log = &api.requests_to(Method::POST, "membership_logs.php")[0];
    let log = log.body.as_ref().unwrap();
    assert_eq!(log["action"], "renew");
    assert_eq!(log["membership_id"], 13);

    assert!(!console.store().contains(&badge_key(5)));
    // Customer list reloaded after the renewal
    assert_eq!(customers.customers().len(), 3);
}

#[tokio::test]
async fn test_renew_survives_log_failure() {
    let (api, _dir, console) = setup().await;
    api.on(Method::GET, "members.php", &[("customer_id", "5")], membership_history());
    api.on(
        Method::POST,
        "members.php",
        &[("action", "renew")],
        json!({ "success": true, "membership_id": 13 }),
    );
    api.on_raw(
        Method::POST,
        "membership_logs.php",
        &[],
        StatusCode::INTERNAL_SERVER_ERROR,
        "Fatal error",
    );
    let mut customers = console.customers();

    let outcome = customers
        .renew_membership(5, RenewRequest::default())
        .await
        .unwrap();
    assert!(matches!(outcome, RenewOutcome::Renewed { .. }));
}

#[tokio::test]
async fn test_renew_without_history() {
    let (api, _dir, console) = setup().await;
    api.on(Method::GET, "members.php", &[("customer_id", "8")], json!([]));
    let mut customers = console.customers();

    let outcome = customers
        .renew_membership(8, RenewRequest::default())
        .await
        .unwrap();
    assert_eq!(outcome, RenewOutcome::NoPriorMembership);
    assert!(api.requests_to(Method::POST, "members.php").is_empty());
}

#[tokio::test]
async fn test_renew_promo_requires_coverage() {
    let (api, _dir, console) = setup().await;
    api.on(
        Method::GET,
        "members.php",
        &[("customer_id", "5")],
        json!({ "data": [
            { "id": 30, "customer_id": 5, "type": "Promo", "coverage": 2500, "remaining_balance": 0,
              "date_registered": "2026-03-01", "expire_date": "" }
        ]}),
    );
    let mut customers = console.customers();

    let err = customers
        .renew_membership(5, RenewRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::MembershipCoverageRequired));
    assert!(api.requests_to(Method::POST, "members.php").is_empty());
}

#[tokio::test]
async fn test_membership_list_falls_back_to_cache() {
    let (api, _dir, console) = setup().await;
    api.on(Method::GET, "members.php", &[("customer_id", "5")], membership_history());
    let customers = console.customers();

    let fresh = customers.memberships(5).await.unwrap();
    assert_eq!(fresh.len(), 2);

    api.on_raw(
        Method::GET,
        "members.php",
        &[("customer_id", "5")],
        StatusCode::BAD_GATEWAY,
        "upstream down",
    );
    let cached = customers.memberships(5).await.unwrap();
    assert_eq!(cached, fresh);

    // Nothing cached for this customer: the fetch error surfaces
    let err = customers.memberships(6).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}
